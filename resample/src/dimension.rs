//! Policies that choose the destination size from the source size.

/// Computes the destination size for a source of `src_width` x `src_height`.
pub trait DimensionPolicy: Send + Sync {
    fn compute(&self, src_width: u32, src_height: u32) -> (u32, u32);
}

impl<F> DimensionPolicy for F
where
    F: Fn(u32, u32) -> (u32, u32) + Send + Sync,
{
    fn compute(&self, src_width: u32, src_height: u32) -> (u32, u32) {
        self(src_width, src_height)
    }
}

/// A fixed destination size regardless of the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AbsoluteDimension {
    width: u32,
    height: u32,
}

impl AbsoluteDimension {
    pub fn new(width: u32, height: u32) -> Self {
        assert!(width > 0, "width must be positive");
        assert!(height > 0, "height must be positive");
        Self { width, height }
    }
}

impl DimensionPolicy for AbsoluteDimension {
    fn compute(&self, _src_width: u32, _src_height: u32) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// A target size where a zero side is derived from the other one, keeping the
/// source aspect ratio. If both sides are zero the source size is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AspectFit {
    pub width: u32,
    pub height: u32,
}

impl AspectFit {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn width(width: u32) -> Self {
        Self { width, height: 0 }
    }

    pub fn height(height: u32) -> Self {
        Self { width: 0, height }
    }
}

impl DimensionPolicy for AspectFit {
    fn compute(&self, src_width: u32, src_height: u32) -> (u32, u32) {
        match (self.width, self.height) {
            (0, 0) => (src_width, src_height),
            (0, h) => {
                let w = src_width as f64 * (h as f64 / src_height as f64);
                (w as u32, h)
            }
            (w, 0) => {
                let h = src_height as f64 * (w as f64 / src_width as f64);
                (w, h as u32)
            }
            (w, h) => (w, h),
        }
    }
}

/// Uniformly shrinks the source to fit inside a bounding box. Never upscales.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaxDimension {
    max_width: u32,
    max_height: u32,
}

impl MaxDimension {
    pub fn new(max_width: u32, max_height: u32) -> Self {
        assert!(max_width > 0, "max width must be positive");
        assert!(max_height > 0, "max height must be positive");
        Self {
            max_width,
            max_height,
        }
    }
}

impl DimensionPolicy for MaxDimension {
    fn compute(&self, src_width: u32, src_height: u32) -> (u32, u32) {
        let scale = (self.max_width as f64 / src_width as f64)
            .min(self.max_height as f64 / src_height as f64)
            .min(1.0);

        let w = (src_width as f64 * scale).round().max(1.0) as u32;
        let h = (src_height as f64 * scale).round().max(1.0) as u32;
        (w.min(self.max_width), h.min(self.max_height))
    }
}
