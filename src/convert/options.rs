use crate::font::PdfFont;
use crate::layout::Margins;
use crate::pagesize::{self, PageSize};
use crate::units::Pt;

/// Default margin on every side of the page
pub const DEFAULT_MARGIN: Pt = Pt(40.0);
pub const DEFAULT_FONT_SIZE: Pt = Pt(12.0);
/// Line height as a multiple of the font size
pub const DEFAULT_LINE_SPACING: f32 = 1.15;
/// Width in pixels HTML is rendered at, about the width of an A4 page on screen
pub const DEFAULT_VIEWPORT_WIDTH: u32 = 794;

/// Layout parameters for a conversion
#[derive(Clone)]
pub struct ConvertOptions {
    pub page_size: PageSize,
    pub margins: Margins,
    pub font_size: Pt,
    /// Distance between baselines. See [`ConvertOptions::effective_line_height`] for the default.
    pub line_height: Option<Pt>,
    pub viewport_width: u32,
    pub font: PdfFont,
    /// Written to the document information; defaults to the input's file name
    pub title: Option<String>,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        ConvertOptions {
            page_size: pagesize::A4,
            margins: Margins::all(DEFAULT_MARGIN),
            font_size: DEFAULT_FONT_SIZE,
            line_height: None,
            viewport_width: DEFAULT_VIEWPORT_WIDTH,
            font: PdfFont::default(),
            title: None,
        }
    }
}

impl ConvertOptions {
    pub fn new() -> ConvertOptions {
        ConvertOptions::default()
    }

    pub fn page_size(&mut self, page_size: PageSize) -> &mut Self {
        self.page_size = page_size;
        self
    }

    pub fn margins(&mut self, margins: Margins) -> &mut Self {
        self.margins = margins;
        self
    }

    pub fn font_size<D: Into<Pt>>(&mut self, size: D) -> &mut Self {
        self.font_size = size.into();
        self
    }

    pub fn line_height<D: Into<Pt>>(&mut self, line_height: D) -> &mut Self {
        self.line_height = Some(line_height.into());
        self
    }

    pub fn viewport_width(&mut self, width: u32) -> &mut Self {
        self.viewport_width = width;
        self
    }

    pub fn font(&mut self, font: PdfFont) -> &mut Self {
        self.font = font;
        self
    }

    pub fn title<S: ToString>(&mut self, title: S) -> &mut Self {
        self.title = Some(title.to_string());
        self
    }

    /// The line height in effect. Without an explicit one, an embedded font
    /// uses its own ascent, descent and line gap, and Courier uses
    /// [`DEFAULT_LINE_SPACING`] times the font size.
    pub fn effective_line_height(&self) -> Pt {
        self.line_height.unwrap_or_else(|| match &self.font {
            PdfFont::Courier => self.font_size * DEFAULT_LINE_SPACING,
            PdfFont::Embedded(font) => font.line_height(self.font_size),
        })
    }
}
