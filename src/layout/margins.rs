use crate::error::Error;
use crate::pagesize::PageSize;
use crate::rect::Rect;
use crate::units::Pt;

/// Margins are used when laying out content on a page. The space left between
/// them is the usable area, which both paginators fill. Margins themselves are
/// never drawn on.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Margins {
    pub top: Pt,
    pub right: Pt,
    pub bottom: Pt,
    pub left: Pt,
}

impl Margins {
    /// Create margins by specifying individual components in a clockwise fashion
    /// starting at the top (in the same order as CSS margins)
    pub fn trbl(top: Pt, right: Pt, bottom: Pt, left: Pt) -> Margins {
        Margins {
            top,
            right,
            bottom,
            left,
        }
    }

    /// Create margins where all values are equal
    pub fn all<D: Into<Pt>>(value: D) -> Margins {
        let value: Pt = value.into();
        Margins {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }

    /// Create margins by specifying different values for vertical (top and bottom)
    /// and horizontal (left and right) margins
    pub fn symmetric(vertical: Pt, horizontal: Pt) -> Margins {
        Margins {
            top: vertical,
            right: horizontal,
            bottom: vertical,
            left: horizontal,
        }
    }

    /// Create margins where all values are 0.0
    pub fn empty() -> Margins {
        Margins::all(Pt(0.0))
    }

    /// Compute the area left for content on `page` once these margins are
    /// applied. Fails with [`Error::InvalidLayout`] when the page is not
    /// positive, any margin is negative or not finite, or the margins consume the whole
    /// width or height of the page.
    pub fn usable_area(&self, page: PageSize) -> Result<ContentArea, Error> {
        let width = page.width - self.left - self.right;
        let height = page.height - self.top - self.bottom;

        let bad_margin = [self.top, self.right, self.bottom, self.left]
            .iter()
            .any(|m| !(m.0 >= 0.0 && m.0.is_finite()));
        if bad_margin
            || page.validate().is_err()
            || !width.is_positive_finite()
            || !height.is_positive_finite()
        {
            return Err(Error::invalid_layout(width.0, height.0));
        }

        Ok(ContentArea {
            left: self.left,
            top: self.top,
            width,
            height,
        })
    }
}

/// The usable area of a page, measured from the top-left corner of the page
/// with y growing downwards
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ContentArea {
    pub left: Pt,
    pub top: Pt,
    pub width: Pt,
    pub height: Pt,
}

impl ContentArea {
    /// The bottom edge of the area, measured from the top of the page
    pub fn bottom(&self) -> Pt {
        self.top + self.height
    }
}

/// Map a rectangle given from the top-left of a page (y growing downwards)
/// into PDF space, where the origin is the bottom-left corner
pub fn top_down_rect(page_height: Pt, x: Pt, y: Pt, width: Pt, height: Pt) -> Rect {
    Rect {
        x1: x,
        y1: page_height - y - height,
        x2: x + width,
        y2: page_height - y,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usable_area_subtracts_every_side() {
        let page = PageSize::new(Pt(200.0), Pt(300.0));
        let area = Margins::trbl(Pt(10.0), Pt(20.0), Pt(30.0), Pt(40.0))
            .usable_area(page)
            .expect("valid layout");
        assert_eq!(area.left, Pt(40.0));
        assert_eq!(area.top, Pt(10.0));
        assert_eq!(area.width, Pt(140.0));
        assert_eq!(area.height, Pt(260.0));
        assert_eq!(area.bottom(), Pt(270.0));
    }

    #[test]
    fn margins_consuming_the_page_are_rejected() {
        let page = PageSize::new(Pt(100.0), Pt(100.0));
        let err = Margins::symmetric(Pt(0.0), Pt(50.0))
            .usable_area(page)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidLayout { width, .. } if width == 0.0));
        assert!(Margins::symmetric(Pt(60.0), Pt(0.0)).usable_area(page).is_err());
        assert!(Margins::all(Pt(-1.0)).usable_area(page).is_err());
    }

    #[test]
    fn non_finite_values_are_rejected() {
        let page = PageSize::new(Pt(100.0), Pt(100.0));
        assert!(Margins::all(Pt(f32::NAN)).usable_area(page).is_err());
        assert!(Margins::symmetric(Pt(f32::INFINITY), Pt(0.0))
            .usable_area(page)
            .is_err());

        let endless = PageSize::new(Pt(f32::INFINITY), Pt(100.0));
        assert!(matches!(
            Margins::empty().usable_area(endless),
            Err(Error::InvalidLayout { .. })
        ));
    }

    #[test]
    fn top_down_rects_flip_into_pdf_space() {
        let rect = top_down_rect(Pt(800.0), Pt(10.0), Pt(20.0), Pt(100.0), Pt(50.0));
        assert_eq!(rect.x1, Pt(10.0));
        assert_eq!(rect.y2, Pt(780.0));
        assert_eq!(rect.y1, Pt(730.0));
        assert_eq!(rect.width(), Pt(100.0));
    }
}
