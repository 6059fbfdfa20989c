//! Resampling filter kernels.
//!
//! All kernels are even, peak at zero and vanish outside
//! `[-support_radius, support_radius]`.


use std::f32::consts::PI;

use serde::{Deserialize, Serialize};

/// A convolution kernel used to weight source samples.
pub trait Filter: Send + Sync + std::fmt::Debug {
    /// Weight of a sample `distance` source pixels away from the center.
    fn weight(&self, distance: f32) -> f32;

    /// Half-width beyond which [`weight`](Self::weight) is zero.
    fn support_radius(&self) -> f32;

    fn name(&self) -> &'static str {
        "custom"
    }
}

/// Normalized sinc, `sin(pi x) / (pi x)`.
///
/// Uses a Taylor expansion around the removable singularity at zero.
#[inline]
pub(crate) fn sinc(x: f32) -> f32 {
    let x = x * PI;
    if x.abs() < 0.01 {
        let xx = x * x;
        return 1.0 + xx * (-1.0 / 6.0 + xx / 120.0);
    }
    x.sin() / x
}

/// Lanczos windowed sinc with a = 3.
#[derive(Debug, Clone, Copy, Default)]
pub struct Lanczos3;

impl Filter for Lanczos3 {
    fn weight(&self, distance: f32) -> f32 {
        let x = distance.abs();
        if x < 3.0 {
            sinc(x) * sinc(x / 3.0)
        } else {
            0.0
        }
    }

    fn support_radius(&self) -> f32 {
        3.0
    }

    fn name(&self) -> &'static str {
        "lanczos3"
    }
}

/// Box filter, nearest neighbour when upsampling and area average when downsampling.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoxFilter;

impl Filter for BoxFilter {
    fn weight(&self, distance: f32) -> f32 {
        if distance.abs() <= 0.5 {
            1.0
        } else {
            0.0
        }
    }

    fn support_radius(&self) -> f32 {
        0.5
    }

    fn name(&self) -> &'static str {
        "box"
    }
}

/// Tent filter, bilinear interpolation.
#[derive(Debug, Clone, Copy, Default)]
pub struct Triangle;

impl Filter for Triangle {
    fn weight(&self, distance: f32) -> f32 {
        let x = distance.abs();
        if x < 1.0 {
            1.0 - x
        } else {
            0.0
        }
    }

    fn support_radius(&self) -> f32 {
        1.0
    }

    fn name(&self) -> &'static str {
        "triangle"
    }
}

/// Hermite cubic, smoothstep shaped with no overshoot.
#[derive(Debug, Clone, Copy, Default)]
pub struct Hermite;

impl Filter for Hermite {
    fn weight(&self, distance: f32) -> f32 {
        let x = distance.abs();
        if x < 1.0 {
            (2.0 * x - 3.0) * x * x + 1.0
        } else {
            0.0
        }
    }

    fn support_radius(&self) -> f32 {
        1.0
    }

    fn name(&self) -> &'static str {
        "hermite"
    }
}

/// Quadratic B-spline.
#[derive(Debug, Clone, Copy, Default)]
pub struct Bell;

impl Filter for Bell {
    fn weight(&self, distance: f32) -> f32 {
        let x = distance.abs();
        if x < 0.5 {
            0.75 - x * x
        } else if x < 1.5 {
            let t = x - 1.5;
            0.5 * t * t
        } else {
            0.0
        }
    }

    fn support_radius(&self) -> f32 {
        1.5
    }

    fn name(&self) -> &'static str {
        "bell"
    }
}

/// Cubic B-spline, the smoothest of the cubic family.
#[derive(Debug, Clone, Copy, Default)]
pub struct BSpline;

impl Filter for BSpline {
    fn weight(&self, distance: f32) -> f32 {
        let x = distance.abs();
        if x < 1.0 {
            let xx = x * x;
            0.5 * xx * x - xx + 2.0 / 3.0
        } else if x < 2.0 {
            let t = 2.0 - x;
            t * t * t / 6.0
        } else {
            0.0
        }
    }

    fn support_radius(&self) -> f32 {
        2.0
    }

    fn name(&self) -> &'static str {
        "bspline"
    }
}

/// Mitchell-Netravali cubic with B = C = 1/3.
#[derive(Debug, Clone, Copy, Default)]
pub struct Mitchell;

impl Filter for Mitchell {
    fn weight(&self, distance: f32) -> f32 {
        let x = distance.abs();
        if x >= 2.0 {
            0.0
        } else if x >= 1.0 {
            // (-B - 6C)|x|³ + (6B + 30C)|x|² + (-12B - 48C)|x| + (8B + 24C), divided by 6
            (-7.0 / 18.0) * x * x * x + 2.0 * x * x - (10.0 / 3.0) * x + 16.0 / 9.0
        } else {
            // (12 - 9B - 6C)|x|³ + (-18 + 12B + 6C)|x|² + (6 - 2B), divided by 6
            (7.0 / 6.0) * x * x * x - 2.0 * x * x + 8.0 / 9.0
        }
    }

    fn support_radius(&self) -> f32 {
        2.0
    }

    fn name(&self) -> &'static str {
        "mitchell"
    }
}

/// Keys cubic convolution with a = -0.5 (Catmull-Rom).
#[derive(Debug, Clone, Copy, Default)]
pub struct BiCubic;

impl BiCubic {
    const A: f32 = -0.5;
}

impl Filter for BiCubic {
    fn weight(&self, distance: f32) -> f32 {
        let a = Self::A;
        let x = distance.abs();
        let xx = x * x;
        if x <= 1.0 {
            (a + 2.0) * xx * x - (a + 3.0) * xx + 1.0
        } else if x < 2.0 {
            a * xx * x - 5.0 * a * xx + 8.0 * a * x - 4.0 * a
        } else {
            0.0
        }
    }

    fn support_radius(&self) -> f32 {
        2.0
    }

    fn name(&self) -> &'static str {
        "bicubic"
    }
}

/// Built-in kernels, selectable from configuration.
#[derive(Debug, Hash, PartialEq, Eq, Copy, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterType {
    #[default]
    Lanczos3,
    Box,
    Triangle,
    Hermite,
    Bell,
    BSpline,
    Mitchell,
    BiCubic,
}

impl FilterType {
    pub const ALL: &'static [FilterType] = &[
        FilterType::Lanczos3,
        FilterType::Box,
        FilterType::Triangle,
        FilterType::Hermite,
        FilterType::Bell,
        FilterType::BSpline,
        FilterType::Mitchell,
        FilterType::BiCubic,
    ];

    pub fn kernel(self) -> &'static dyn Filter {
        match self {
            FilterType::Lanczos3 => &Lanczos3,
            FilterType::Box => &BoxFilter,
            FilterType::Triangle => &Triangle,
            FilterType::Hermite => &Hermite,
            FilterType::Bell => &Bell,
            FilterType::BSpline => &BSpline,
            FilterType::Mitchell => &Mitchell,
            FilterType::BiCubic => &BiCubic,
        }
    }
}

impl std::fmt::Display for FilterType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.kernel().name())
    }
}
