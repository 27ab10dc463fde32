//! Convert documents, plain text, HTML and raster images into paginated PDFs.
//!
//! The interesting part lives in [`layout`]: one paginator cuts a tall image
//! into page-high slices, the other wraps and distributes text over pages.
//! [`Document`] turns their output into a PDF, and [`convert`] ties it all
//! together for whole files.

pub mod convert;

mod content;

mod document;
pub use document::*;

mod font;
pub use font::*;

mod image;
pub use self::image::*;

mod info;
pub use info::*;

pub mod layout;

mod page;
pub use page::*;

pub mod pagesize;

mod rect;
pub use rect::*;

pub(crate) mod refs;

mod units;
pub use units::*;

mod error;
pub use error::*;

/// Re-export PDF-writer functionality
pub use pdf_writer;
