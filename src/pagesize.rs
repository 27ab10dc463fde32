//! Pre-defined page sizes for common paper formats.
//!
//! All sizes are provided in portrait orientation where width ≤ height.
//! Use the [`PageOrientation`](crate::pagesize::PageOrientation) trait to convert between portrait and landscape.
//!
//! # Example
//!
//! ```
//! use topdf::pagesize::{PageOrientation, PageSize, A4, LETTER};
//!
//! let page_size = LETTER;
//! let landscape = A4.landscape();
//! assert!(landscape.width > landscape.height);
//! assert_eq!(PageSize::from_name("letter"), Some(LETTER));
//! ```

use crate::error::Error;
use crate::units::*;

/// Page dimensions in points
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PageSize {
    pub width: Pt,
    pub height: Pt,
}

impl PageSize {
    pub const fn new(width: Pt, height: Pt) -> PageSize {
        PageSize { width, height }
    }

    /// Fails with [`Error::InvalidLayout`] unless both dimensions are positive and finite
    pub fn validate(&self) -> Result<(), Error> {
        if self.width.is_positive_finite() && self.height.is_positive_finite() {
            Ok(())
        } else {
            Err(Error::invalid_layout(self.width.0, self.height.0))
        }
    }

    /// Look up a predefined size by its (case-insensitive) name, e.g. `"a4"` or `"half-letter"`
    pub fn from_name(name: &str) -> Option<PageSize> {
        let name = name.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        let size = match name.as_str() {
            "letter" => LETTER,
            "half_letter" => HALF_LETTER,
            "junior_legal" => JUNIOR_LEGAL,
            "legal" => LEGAL,
            "tabloid" => TABLOID,
            "ledger" => LEDGER,
            "a0" => A0,
            "a1" => A1,
            "a2" => A2,
            "a3" => A3,
            "a4" => A4,
            "a5" => A5,
            "a6" => A6,
            _ => return None,
        };
        Some(size)
    }
}

// north american sizes
pub const LETTER: PageSize = PageSize::new(Pt(8.5 * 72.0), Pt(11.0 * 72.0));
pub const HALF_LETTER: PageSize = PageSize::new(Pt(5.5 * 72.0), Pt(8.5 * 72.0));
pub const JUNIOR_LEGAL: PageSize = PageSize::new(Pt(5.0 * 72.0), Pt(8.0 * 72.0));
pub const LEGAL: PageSize = PageSize::new(Pt(8.5 * 72.0), Pt(13.0 * 72.0));
pub const TABLOID: PageSize = PageSize::new(Pt(11.0 * 72.0), Pt(17.0 * 72.0));
pub const LEDGER: PageSize = PageSize::new(Pt(17.0 * 72.0), Pt(11.0 * 72.0));

// iso a-series
pub const A0: PageSize = PageSize::new(Pt(841.0 * 72.0 / 25.4), Pt(1189.0 * 72.0 / 25.4));
pub const A1: PageSize = PageSize::new(Pt(594.0 * 72.0 / 25.4), Pt(841.0 * 72.0 / 25.4));
pub const A2: PageSize = PageSize::new(Pt(420.0 * 72.0 / 25.4), Pt(594.0 * 72.0 / 25.4));
pub const A3: PageSize = PageSize::new(Pt(297.0 * 72.0 / 25.4), Pt(420.0 * 72.0 / 25.4));
pub const A4: PageSize = PageSize::new(Pt(210.0 * 72.0 / 25.4), Pt(297.0 * 72.0 / 25.4));
pub const A5: PageSize = PageSize::new(Pt(148.0 * 72.0 / 25.4), Pt(210.0 * 72.0 / 25.4));
pub const A6: PageSize = PageSize::new(Pt(105.0 * 72.0 / 25.4), Pt(148.0 * 72.0 / 25.4));

/// Convert page sizes between portrait and landscape orientations.
pub trait PageOrientation {
    /// Returns the size in portrait orientation (width ≤ height).
    fn portrait(self) -> Self;
    /// Returns the size in landscape orientation (width ≥ height).
    fn landscape(self) -> Self;
}

impl PageOrientation for PageSize {
    fn portrait(self) -> Self {
        if self.width <= self.height {
            self
        } else {
            PageSize::new(self.height, self.width)
        }
    }

    fn landscape(self) -> Self {
        if self.width >= self.height {
            self
        } else {
            PageSize::new(self.height, self.width)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orientation_swaps_only_when_needed() {
        assert_eq!(A4.portrait(), A4);
        let landscape = A4.landscape();
        assert_eq!(landscape.width, A4.height);
        assert_eq!(landscape.landscape(), landscape);
        assert_eq!(LEDGER.portrait().width, Pt(11.0 * 72.0));
    }

    #[test]
    fn names_are_case_insensitive() {
        assert_eq!(PageSize::from_name(" A4 "), Some(A4));
        assert_eq!(PageSize::from_name("Half-Letter"), Some(HALF_LETTER));
        assert_eq!(PageSize::from_name("b5"), None);
    }

    #[test]
    fn zero_sized_pages_are_rejected() {
        assert!(PageSize::new(Pt(0.0), Pt(10.0)).validate().is_err());
        assert!(A6.validate().is_ok());
        assert!(PageSize::new(Pt(f32::INFINITY), Pt(10.0)).validate().is_err());
        assert!(PageSize::new(Pt(10.0), Pt(f32::NAN)).validate().is_err());
    }
}
