use std::ops::Range;

use image::{DynamicImage, GenericImageView};

use crate::error::Error;
use crate::layout::margins::{ContentArea, Margins};
use crate::pagesize::PageSize;
use crate::units::Pt;

/// Remaining heights at or below this are float drift, not content
const HEIGHT_EPSILON: f32 = 1e-3;

/// A decoded raster image to be placed onto pages. The paginators only read
/// from it; every slice gets its own copy of the pixels it covers.
#[derive(Debug, Clone)]
pub struct SourceImage {
    pixels: DynamicImage,
}

impl SourceImage {
    pub fn new(pixels: DynamicImage) -> SourceImage {
        SourceImage { pixels }
    }

    /// Width in pixels
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &DynamicImage {
        &self.pixels
    }

    fn ensure_not_empty(&self) -> Result<(), Error> {
        if self.width() == 0 || self.height() == 0 {
            return Err(Error::EmptyImage {
                width: self.width(),
                height: self.height(),
            });
        }
        Ok(())
    }
}

impl From<DynamicImage> for SourceImage {
    fn from(pixels: DynamicImage) -> Self {
        SourceImage::new(pixels)
    }
}

/// Where a slice is drawn, measured from the top-left corner of the page
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Placement {
    pub x: Pt,
    pub y: Pt,
    pub width: Pt,
    pub height: Pt,
}

/// One page worth of a source image
#[derive(Debug, Clone)]
pub struct ImageSlice {
    /// 0-based index of the page this slice lands on
    pub index: usize,
    /// The pixels of the source image covered by this slice, at full width
    pub pixels: DynamicImage,
    /// The rows of the source image that `pixels` was cut from
    pub rows: Range<u32>,
    pub placement: Placement,
}

impl PartialEq for ImageSlice {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
            && self.rows == other.rows
            && self.placement == other.placement
            && self.pixels.dimensions() == other.pixels.dimensions()
            && self.pixels.as_bytes() == other.pixels.as_bytes()
    }
}

/// Scale an image down (never up) to fit inside the usable area of a single
/// page and centre it there. Image pixels count as points before scaling.
///
/// ```
/// use image::DynamicImage;
/// use topdf::layout::{fit_image, Margins, SourceImage};
/// use topdf::{pagesize::PageSize, Pt};
///
/// let image = SourceImage::new(DynamicImage::new_rgb8(400, 100));
/// let page = PageSize::new(Pt(300.0), Pt(300.0));
/// let slice = fit_image(&image, page, &Margins::all(Pt(50.0))).unwrap();
/// assert_eq!(slice.placement.width, Pt(200.0));
/// assert_eq!(slice.placement.y, Pt(125.0));
/// ```
pub fn fit_image(
    image: &SourceImage,
    page: PageSize,
    margins: &Margins,
) -> Result<ImageSlice, Error> {
    let area = margins.usable_area(page)?;
    image.ensure_not_empty()?;

    let width = Pt(image.width() as f32);
    let height = Pt(image.height() as f32);
    let scale = (area.width / width).min(area.height / height).min(1.0);
    let (scaled_width, scaled_height) = (width * scale, height * scale);

    Ok(ImageSlice {
        index: 0,
        pixels: image.pixels.clone(),
        rows: 0..image.height(),
        placement: Placement {
            x: area.left + (area.width - scaled_width) / 2.0,
            y: area.top + (area.height - scaled_height) / 2.0,
            width: scaled_width,
            height: scaled_height,
        },
    })
}

/// Split a tall image into consecutive page-high bands. The image is scaled
/// so its width fills the usable width of the page; each band is then as tall
/// as the usable height, except for the last one which holds whatever is left.
///
/// Either every slice is returned or, if the layout or image is degenerate,
/// none are.
///
/// ```
/// use image::DynamicImage;
/// use topdf::layout::{paginate_image, Margins, SourceImage};
/// use topdf::{pagesize::PageSize, Pt};
///
/// let image = SourceImage::new(DynamicImage::new_rgba8(595, 3000));
/// let page = PageSize::new(Pt(595.0), Pt(842.0));
/// let slices = paginate_image(&image, page, &Margins::empty()).unwrap();
/// assert_eq!(slices.len(), 4);
/// assert_eq!(slices[3].rows, 2526..3000);
/// ```
pub fn paginate_image(
    image: &SourceImage,
    page: PageSize,
    margins: &Margins,
) -> Result<Vec<ImageSlice>, Error> {
    Ok(slice_image(image, page, margins)?.collect())
}

/// Lazy form of [`paginate_image`]. All validation happens up front, so once
/// this returns `Ok` the iterator yields exactly the slices `paginate_image`
/// would, in the same order. Callers that want to do work between pages
/// (report progress, embed as they go) can drive it themselves.
pub fn slice_image<'a>(
    image: &'a SourceImage,
    page: PageSize,
    margins: &Margins,
) -> Result<ImageSlices<'a>, Error> {
    let area = margins.usable_area(page)?;
    image.ensure_not_empty()?;

    // pixels per point; the image width always maps onto the usable width
    let ratio = image.width() as f32 / area.width.0;
    let total = Pt(image.height() as f32 / ratio);

    Ok(ImageSlices {
        image,
        area,
        ratio,
        remaining: total,
        src_y: Pt(0.0),
        index: 0,
    })
}

/// Iterator returned by [`slice_image`]
pub struct ImageSlices<'a> {
    image: &'a SourceImage,
    area: ContentArea,
    ratio: f32,
    remaining: Pt,
    src_y: Pt,
    index: usize,
}

impl ImageSlices<'_> {
    /// Pixels per point used to map the source onto the page
    pub fn ratio(&self) -> f32 {
        self.ratio
    }

    /// How many slices are still to come
    pub fn pages_remaining(&self) -> usize {
        if self.remaining.0 <= HEIGHT_EPSILON {
            0
        } else {
            ((self.remaining.0 - HEIGHT_EPSILON) / self.area.height.0).ceil() as usize
        }
    }

    fn row_at(&self, y: Pt) -> u32 {
        ((y.0 * self.ratio).round().max(0.0) as u32).min(self.image.height())
    }
}

impl Iterator for ImageSlices<'_> {
    type Item = ImageSlice;

    fn next(&mut self) -> Option<ImageSlice> {
        if self.remaining.0 <= HEIGHT_EPSILON {
            return None;
        }

        let slice_height = self.remaining.min(self.area.height);

        // row boundaries are rounded from cumulative positions so that bands
        // tile the source; a band thinner than one pixel still shows the
        // row it falls on
        let height = self.image.height();
        let first_row = self.row_at(self.src_y).min(height - 1);
        let is_last = (self.remaining - slice_height).0 <= HEIGHT_EPSILON;
        let last_row = if is_last {
            height
        } else {
            self.row_at(self.src_y + slice_height).clamp(first_row + 1, height)
        };

        let pixels = self.image.pixels.crop_imm(
            0,
            first_row,
            self.image.width(),
            last_row - first_row,
        );

        let slice = ImageSlice {
            index: self.index,
            pixels,
            rows: first_row..last_row,
            placement: Placement {
                x: self.area.left,
                y: self.area.top,
                width: self.area.width,
                height: slice_height,
            },
        };

        self.index += 1;
        self.src_y += slice_height;
        self.remaining -= slice_height;

        Some(slice)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.pages_remaining();
        (0, Some(remaining))
    }
}
