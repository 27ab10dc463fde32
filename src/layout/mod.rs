//! Pagination of long content onto fixed-size pages.
//!
//! Two paginators live here, both pure functions of their inputs:
//!
//! - [`paginate_image`](crate::layout::paginate_image) cuts a tall raster image into page-high
//!   slices, each placed across the usable width of its own page. [`fit_image`](crate::layout::fit_image)
//!   is the single-page alternative which scales an image down to fit and centres it.
//! - [`paginate_text`](crate::layout::paginate_text) wraps plain text to the usable width and
//!   distributes the lines over pages, never splitting a line between two pages.
//!
//! All coordinates produced here are measured from the top-left corner of the
//! page with y growing downwards. [`Document`](crate::Document) flips them into PDF
//! space when the pages are written.
//!
//! # Example
//!
//! ```
//! use topdf::layout::{monospace, paginate_text, Margins};
//! use topdf::{pagesize, Pt};
//!
//! let metrics = monospace(Pt(12.0), Pt(14.0), Pt(7.2));
//! let pages = paginate_text(
//!     "Hello, world!",
//!     pagesize::A4,
//!     &Margins::all(Pt(72.0)),
//!     &metrics,
//! )
//! .expect("A4 with 1in margins is a valid layout");
//!
//! assert_eq!(pages.len(), 1);
//! assert_eq!(pages[0].lines[0].baseline, Pt(86.0));
//! ```

mod image;
mod margins;
mod text;

pub use self::image::*;
pub use margins::*;
pub use text::*;
