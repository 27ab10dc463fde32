//! Units of length used throughout layout.
//!
//! Everything is laid out in [`Pt`] (PDF points, 1/72 of an inch). The other
//! units exist for configuration and convert into points with `.into()`.

use derive_more::{Add, AddAssign, Deref, Display, From, Into, Sub, SubAssign, Sum};
use std::ops::{Div, Mul};

/// PDF points, 1/72 of an inch
#[derive(
    Debug,
    Default,
    Copy,
    Clone,
    PartialEq,
    PartialOrd,
    Add,
    Sub,
    AddAssign,
    SubAssign,
    Deref,
    Display,
    From,
    Into,
    Sum,
)]
pub struct Pt(pub f32);

/// Inches
#[derive(Debug, Default, Copy, Clone, PartialEq, PartialOrd, Display, From)]
pub struct In(pub f32);

/// Millimetres
#[derive(Debug, Default, Copy, Clone, PartialEq, PartialOrd, Display, From)]
pub struct Mm(pub f32);

/// CSS pixels, 96 to the inch
#[derive(Debug, Default, Copy, Clone, PartialEq, PartialOrd, Display, From)]
pub struct Px(pub f32);

impl From<In> for Pt {
    fn from(value: In) -> Self {
        Pt(value.0 * 72.0)
    }
}

impl From<Mm> for Pt {
    fn from(value: Mm) -> Self {
        Pt(value.0 * 72.0 / 25.4)
    }
}

impl From<Px> for Pt {
    fn from(value: Px) -> Self {
        Pt(value.0 * 72.0 / 96.0)
    }
}

impl Mul<f32> for Pt {
    type Output = Pt;

    fn mul(self, rhs: f32) -> Pt {
        Pt(self.0 * rhs)
    }
}

impl Div<f32> for Pt {
    type Output = Pt;

    fn div(self, rhs: f32) -> Pt {
        Pt(self.0 / rhs)
    }
}

/// Dividing two lengths yields a unitless ratio
impl Div<Pt> for Pt {
    type Output = f32;

    fn div(self, rhs: Pt) -> f32 {
        self.0 / rhs.0
    }
}

impl Pt {
    /// The smaller of two lengths
    pub fn min(self, other: Pt) -> Pt {
        Pt(self.0.min(other.0))
    }

    /// True for lengths greater than zero that are neither infinite nor NaN
    pub fn is_positive_finite(self) -> bool {
        self.0 > 0.0 && self.0.is_finite()
    }
}
