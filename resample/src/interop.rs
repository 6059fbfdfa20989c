//! Conversions between [`Raster`] and the `image` crate.

use image_lib::{DynamicImage, ImageBuffer, Pixel};

use crate::error::{Error, Result};
use crate::raster::{codec, PixelLayout, Raster};

impl TryFrom<&DynamicImage> for Raster {
    type Error = Error;

    fn try_from(image: &DynamicImage) -> Result<Self> {
        let (width, height) = (image.width(), image.height());

        match image {
            DynamicImage::ImageLuma8(buffer) => {
                Raster::from_packed(width, height, PixelLayout::Gray8, buffer.as_raw().clone())
            }
            DynamicImage::ImageLuma16(buffer) => {
                let bytes = buffer
                    .as_raw()
                    .iter()
                    .flat_map(|sample| sample.to_le_bytes())
                    .collect();
                Raster::from_packed(width, height, PixelLayout::Gray16, bytes)
            }
            DynamicImage::ImageRgb8(buffer) => {
                Raster::from_packed(width, height, PixelLayout::Rgb8, buffer.as_raw().clone())
            }
            DynamicImage::ImageRgba8(buffer) => {
                Raster::from_packed(width, height, PixelLayout::Rgba8, buffer.as_raw().clone())
            }
            other => Raster::from_packed(
                width,
                height,
                PixelLayout::Rgba8,
                other.to_rgba8().into_raw(),
            ),
        }
    }
}

impl Raster {
    /// Converts into the closest `image` buffer type.
    ///
    /// Gray, RGB and RGBA layouts map directly. Every other layout goes
    /// through its canonical form and becomes RGB or RGBA.
    pub fn into_dynamic_image(self) -> Result<DynamicImage> {
        let (width, height) = (self.width(), self.height());

        let image = match self.layout() {
            PixelLayout::Gray8 => {
                DynamicImage::ImageLuma8(from_raw(width, height, self.to_packed_bytes())?)
            }
            PixelLayout::Gray16 => {
                let samples = self
                    .to_packed_bytes()
                    .chunks_exact(2)
                    .map(|b| u16::from_le_bytes([b[0], b[1]]))
                    .collect();
                DynamicImage::ImageLuma16(from_raw(width, height, samples)?)
            }
            PixelLayout::GrayAlpha8 => {
                DynamicImage::ImageLumaA8(from_raw(width, height, self.to_packed_bytes())?)
            }
            PixelLayout::Rgb8 => {
                DynamicImage::ImageRgb8(from_raw(width, height, self.to_packed_bytes())?)
            }
            PixelLayout::Rgba8 => {
                DynamicImage::ImageRgba8(from_raw(width, height, self.to_packed_bytes())?)
            }
            _ => {
                let channels = codec::channel_count(&self);
                let mut bytes = vec![0u8; width as usize * height as usize * channels];
                for (y, row) in bytes
                    .chunks_exact_mut(width as usize * channels)
                    .enumerate()
                {
                    codec::unpack_row(&self, y, row);
                    // canonical rows are BGR(A)
                    for pixel in row.chunks_exact_mut(channels) {
                        pixel.swap(0, 2);
                    }
                }
                match channels {
                    3 => DynamicImage::ImageRgb8(from_raw(width, height, bytes)?),
                    _ => DynamicImage::ImageRgba8(from_raw(width, height, bytes)?),
                }
            }
        };

        Ok(image)
    }
}

fn from_raw<P: Pixel>(
    width: u32,
    height: u32,
    samples: Vec<P::Subpixel>,
) -> Result<ImageBuffer<P, Vec<P::Subpixel>>> {
    let expected = width as usize * height as usize * P::CHANNEL_COUNT as usize;
    let actual = samples.len();
    ImageBuffer::from_raw(width, height, samples).ok_or(Error::InvalidBuffer { expected, actual })
}

#[cfg(test)]
mod tests {
    use image_lib::{GrayImage, Luma, LumaA, Rgb, RgbImage, Rgba};

    use super::*;

    #[test]
    fn rgb_image_converts_both_ways() {
        let image = RgbImage::from_fn(5, 3, |x, y| Rgb([x as u8, y as u8, 200]));
        let raster = Raster::try_from(&DynamicImage::ImageRgb8(image.clone())).unwrap();

        assert_eq!(raster.layout(), PixelLayout::Rgb8);
        assert_eq!(raster.row(2)[..3], [0, 2, 200]);

        let back = raster.into_dynamic_image().unwrap();
        assert_eq!(back.to_rgb8(), image);
    }

    #[test]
    fn gray16_keeps_full_precision() {
        let image = ImageBuffer::from_fn(3, 3, |x, _| Luma([0x1234u16 + x as u16]));
        let raster = Raster::try_from(&DynamicImage::ImageLuma16(image.clone())).unwrap();
        assert_eq!(raster.layout(), PixelLayout::Gray16);

        match raster.into_dynamic_image().unwrap() {
            DynamicImage::ImageLuma16(back) => assert_eq!(back, image),
            other => panic!("expected Luma16, got {:?}", other.color()),
        }
    }

    #[test]
    fn other_variants_become_rgba() {
        let image = ImageBuffer::from_pixel(4, 4, LumaA([90u8, 10]));
        let raster = Raster::try_from(&DynamicImage::ImageLumaA8(image)).unwrap();

        assert_eq!(raster.layout(), PixelLayout::Rgba8);
        assert_eq!(raster.row(0)[..4], [90, 90, 90, 10]);
    }

    #[test]
    fn bgr_raster_is_reordered_to_rgb() {
        let raster = Raster::from_packed(2, 1, PixelLayout::Bgr8, vec![1, 2, 3, 4, 5, 6]).unwrap();
        let image = raster.into_dynamic_image().unwrap().to_rgb8();
        assert_eq!(image.get_pixel(0, 0), &Rgb([3, 2, 1]));
        assert_eq!(image.get_pixel(1, 0), &Rgb([6, 5, 4]));
    }

    #[test]
    fn translucent_palette_becomes_rgba() {
        let palette = vec![[10, 20, 30, 40]];
        let raster = Raster::new_indexed(2, 2, vec![0; 4], palette).unwrap();
        let image = raster.into_dynamic_image().unwrap();
        assert_eq!(image.to_rgba8().get_pixel(1, 1), &Rgba([10, 20, 30, 40]));
    }

    #[test]
    fn resampled_gray_image_round_trips() {
        let image = GrayImage::from_pixel(12, 12, Luma([77]));
        let raster = Raster::try_from(&DynamicImage::ImageLuma8(image)).unwrap();
        let out = crate::resample(
            &raster,
            None,
            &crate::Lanczos3,
            &crate::AbsoluteDimension::new(6, 4),
        )
        .unwrap();

        let back = out.into_dynamic_image().unwrap().to_luma8();
        assert_eq!(back.dimensions(), (6, 4));
        assert!(back.pixels().all(|p| p.0[0].abs_diff(77) <= 1));
    }
}
