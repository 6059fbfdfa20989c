pub mod codec;
mod stride;


use crate::error::{Error, Result};

use stride::{add_stride_padding, align_stride, strip_stride_padding};

/// Native byte layout of a raster's pixels.
///
/// 16-bit layouts are little-endian. `Indexed8` pixels are indices into the
/// raster's RGBA palette.
#[derive(Debug, Hash, PartialEq, Eq, Copy, Clone)]
pub enum PixelLayout {
    Gray8,
    Gray16,
    Bgr8,
    Rgb8,
    Bgra8,
    Rgba8,
    Argb8,
    Rgb565,
    Indexed8,
    GrayAlpha8,
}

impl PixelLayout {
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            PixelLayout::Gray8 | PixelLayout::Indexed8 => 1,
            PixelLayout::Gray16 | PixelLayout::Rgb565 | PixelLayout::GrayAlpha8 => 2,
            PixelLayout::Bgr8 | PixelLayout::Rgb8 => 3,
            PixelLayout::Bgra8 | PixelLayout::Rgba8 | PixelLayout::Argb8 => 4,
        }
    }

    /// Returns true if every channel of a pixel occupies whole bytes, so rows
    /// can be read and written without a lookup table or bit unpacking.
    pub fn is_byte_addressable(&self) -> bool {
        !matches!(self, PixelLayout::Rgb565 | PixelLayout::Indexed8)
    }
}

impl std::fmt::Display for PixelLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PixelLayout::Gray8 => "GRAY8",
            PixelLayout::Gray16 => "GRAY16",
            PixelLayout::Bgr8 => "BGR8",
            PixelLayout::Rgb8 => "RGB8",
            PixelLayout::Bgra8 => "BGRA8",
            PixelLayout::Rgba8 => "RGBA8",
            PixelLayout::Argb8 => "ARGB8",
            PixelLayout::Rgb565 => "RGB565",
            PixelLayout::Indexed8 => "INDEXED8",
            PixelLayout::GrayAlpha8 => "GRAY_ALPHA8",
        };
        write!(f, "{}", name)
    }
}

#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash)]
pub struct RasterDesc {
    pub width: u32,
    pub height: u32,
    pub stride: usize,
    pub layout: PixelLayout,
}

impl RasterDesc {
    /// Creates a descriptor with a 4-byte aligned stride.
    pub fn new(width: u32, height: u32, layout: PixelLayout) -> Self {
        let stride = align_stride(width as usize * layout.bytes_per_pixel());

        Self {
            width,
            height,
            stride,
            layout,
        }
    }

    pub fn size_in_bytes(&self) -> usize {
        self.height as usize * self.stride
    }

    /// Returns the number of bytes per row without padding.
    pub fn row_bytes(&self) -> usize {
        self.width as usize * self.layout.bytes_per_pixel()
    }

    /// Returns true if stride equals row bytes (no padding).
    pub fn is_packed(&self) -> bool {
        self.stride == self.row_bytes()
    }

    fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::EmptyRaster {
                width: self.width,
                height: self.height,
            });
        }
        if self.stride < self.row_bytes() {
            return Err(Error::InvalidBuffer {
                expected: self.row_bytes(),
                actual: self.stride,
            });
        }
        Ok(())
    }
}

impl std::fmt::Display for RasterDesc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{} {}", self.width, self.height, self.layout)
    }
}

/// A 2D grid of 8-bit (or 16-bit gray) samples with rows `desc.stride` bytes apart.
#[derive(Clone, Debug)]
pub struct Raster {
    desc: RasterDesc,
    bytes: Vec<u8>,
    palette: Option<Vec<[u8; 4]>>,
}

impl Raster {
    /// Returns the raster descriptor.
    pub fn desc(&self) -> &RasterDesc {
        &self.desc
    }

    pub fn width(&self) -> u32 {
        self.desc.width
    }

    pub fn height(&self) -> u32 {
        self.desc.height
    }

    pub fn layout(&self) -> PixelLayout {
        self.desc.layout
    }

    /// Returns the raster bytes as a slice, including stride padding.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns the raster bytes as a mutable slice, including stride padding.
    pub fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    pub fn take_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// RGBA palette entries of an `Indexed8` raster.
    pub fn palette(&self) -> Option<&[[u8; 4]]> {
        self.palette.as_deref()
    }

    /// Returns the bytes of row `y` without stride padding.
    pub fn row(&self, y: usize) -> &[u8] {
        let start = y * self.desc.stride;
        &self.bytes[start..start + self.desc.row_bytes()]
    }

    /// Returns the mutable bytes of row `y` without stride padding.
    pub fn row_mut(&mut self, y: usize) -> &mut [u8] {
        let start = y * self.desc.stride;
        let row_bytes = self.desc.row_bytes();
        &mut self.bytes[start..start + row_bytes]
    }

    pub fn new_empty(desc: RasterDesc) -> Result<Raster> {
        desc.validate()?;
        reject_indexed(desc.layout)?;

        let bytes = vec![0; desc.size_in_bytes()];

        Ok(Raster {
            desc,
            bytes,
            palette: None,
        })
    }

    pub fn new_with_data(desc: RasterDesc, bytes: Vec<u8>) -> Result<Raster> {
        desc.validate()?;
        reject_indexed(desc.layout)?;

        if bytes.len() != desc.size_in_bytes() {
            return Err(Error::InvalidBuffer {
                expected: desc.size_in_bytes(),
                actual: bytes.len(),
            });
        }

        Ok(Raster {
            desc,
            bytes,
            palette: None,
        })
    }

    /// Creates a raster from tightly packed rows, inserting stride padding.
    pub fn from_packed(
        width: u32,
        height: u32,
        layout: PixelLayout,
        bytes: Vec<u8>,
    ) -> Result<Raster> {
        let desc = RasterDesc::new(width, height, layout);
        let expected = desc.row_bytes() * height as usize;
        if bytes.len() != expected {
            return Err(Error::InvalidBuffer {
                expected,
                actual: bytes.len(),
            });
        }

        let bytes = add_stride_padding(bytes, desc.row_bytes(), height as usize, desc.stride);
        Raster::new_with_data(desc, bytes)
    }

    /// Creates an `Indexed8` raster from tightly packed palette indices.
    pub fn new_indexed(
        width: u32,
        height: u32,
        indices: Vec<u8>,
        palette: Vec<[u8; 4]>,
    ) -> Result<Raster> {
        let desc = RasterDesc::new(width, height, PixelLayout::Indexed8);
        desc.validate()?;

        if palette.is_empty() || palette.len() > 256 {
            return Err(Error::InvalidPalette(format!(
                "palette must have 1 to 256 entries, got {}",
                palette.len()
            )));
        }
        let expected = desc.row_bytes() * height as usize;
        if indices.len() != expected {
            return Err(Error::InvalidBuffer {
                expected,
                actual: indices.len(),
            });
        }
        if let Some(&index) = indices.iter().find(|&&i| i as usize >= palette.len()) {
            return Err(Error::InvalidPalette(format!(
                "index {} is out of range for a palette of {} entries",
                index,
                palette.len()
            )));
        }

        let bytes = add_stride_padding(indices, desc.row_bytes(), height as usize, desc.stride);
        Ok(Raster {
            desc,
            bytes,
            palette: Some(palette),
        })
    }

    /// Returns the pixel data without stride padding.
    pub fn to_packed_bytes(&self) -> Vec<u8> {
        strip_stride_padding(
            &self.bytes,
            self.desc.row_bytes(),
            self.desc.height as usize,
            self.desc.stride,
        )
    }
}

fn reject_indexed(layout: PixelLayout) -> Result<()> {
    if layout == PixelLayout::Indexed8 {
        return Err(Error::InvalidPalette(
            "indexed rasters must be created with Raster::new_indexed".to_string(),
        ));
    }
    Ok(())
}
