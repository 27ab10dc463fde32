//! The conversion pipeline: pick up an input, turn it into pages, and write
//! them out as a PDF.
//!
//! A [`Converter`] holds the layout options and the collaborators it hands
//! work off to, and runs one [`Session`] at a time through the stages of
//! [`ConversionState`]. Progress is reported to a [`ProgressSink`] between
//! stages.
//!
//! ```
//! use topdf::convert::{Converter, ConvertOptions, NoProgress, Session};
//!
//! let mut session = Session::with_input("notes.txt", b"Hello, world!".to_vec()).unwrap();
//! let converter = Converter::new(ConvertOptions::default());
//! let pdf = converter.convert(&mut session, &mut NoProgress).unwrap();
//! assert!(pdf.starts_with(b"%PDF-"));
//! ```

mod extract;
mod input;
mod options;
mod progress;
mod session;

pub use extract::*;
pub use input::*;
pub use options::*;
pub use progress::*;
pub use session::*;

use crate::document::Document;
use crate::error::Error;
use crate::image::Image;
use crate::info::Info;
use crate::layout::{fit_image, paginate_text, slice_image, SourceImage};
use log::{debug, info, warn};
use std::time::Instant;

/// Runs conversions with a fixed set of options
pub struct Converter {
    pub options: ConvertOptions,
    extractor: Box<dyn Extractor>,
    renderer: Option<Box<dyn HtmlRenderer>>,
}

impl Default for Converter {
    fn default() -> Self {
        Converter::new(ConvertOptions::default())
    }
}

impl Converter {
    /// A converter that extracts `.docx` files with [`DocxExtractor`] and,
    /// having no HTML renderer, converts HTML as plain text
    pub fn new(options: ConvertOptions) -> Converter {
        Converter {
            options,
            extractor: Box::new(DocxExtractor),
            renderer: None,
        }
    }

    pub fn with_extractor<E: Extractor + 'static>(mut self, extractor: E) -> Converter {
        self.extractor = Box::new(extractor);
        self
    }

    /// Render HTML and documents to an image and paginate that, instead of
    /// falling back to their text
    pub fn with_renderer<R: HtmlRenderer + 'static>(mut self, renderer: R) -> Converter {
        self.renderer = Some(Box::new(renderer));
        self
    }

    /// Convert the session's input into a PDF. On success the PDF is also
    /// stored in the session; on failure the session ends up `Failed`.
    pub fn convert(
        &self,
        session: &mut Session,
        progress: &mut dyn ProgressSink,
    ) -> Result<Vec<u8>, Error> {
        let started = Instant::now();

        match self.run(session, progress) {
            Ok(pdf) => {
                enter(session, progress, ConversionState::Done)?;
                info!(
                    "converted {} into {} bytes of PDF in {:?}",
                    session.input().map_or("input", |i| i.name.as_str()),
                    pdf.len(),
                    started.elapsed()
                );
                session.set_output(pdf.clone());
                Ok(pdf)
            }
            Err(err) => {
                warn!("conversion failed: {err}");
                if session.state().can_advance_to(ConversionState::Failed) {
                    enter(session, progress, ConversionState::Failed)?;
                }
                Err(err)
            }
        }
    }

    fn run(&self, session: &mut Session, progress: &mut dyn ProgressSink) -> Result<Vec<u8>, Error> {
        let input = session.input().cloned().ok_or(Error::NoInput)?;
        enter(session, progress, ConversionState::Reading)?;

        let mut document = Document::new(self.options.font.clone());
        let mut info = Info::new();
        info.title(self.options.title.as_deref().unwrap_or(&input.name));
        document.set_info(info);

        match input.kind {
            InputKind::Text => {
                let text = String::from_utf8_lossy(&input.bytes);
                self.add_text(&mut document, &text, session, progress)?;
            }
            InputKind::Html => {
                let html = String::from_utf8_lossy(&input.bytes);
                self.add_html(&mut document, &html, session, progress)?;
            }
            InputKind::Docx => {
                enter(session, progress, ConversionState::Extracting)?;
                let html = self.extractor.extract(&input.bytes)?;
                self.add_html(&mut document, &html, session, progress)?;
            }
            InputKind::Image => self.add_image(&mut document, &input.bytes, session, progress)?,
        }

        let mut pdf: Vec<u8> = Vec::new();
        document.write(&mut pdf)?;
        Ok(pdf)
    }

    fn add_text(
        &self,
        document: &mut Document,
        text: &str,
        session: &mut Session,
        progress: &mut dyn ProgressSink,
    ) -> Result<(), Error> {
        let options = &self.options;

        enter(session, progress, ConversionState::Paginating)?;
        let metrics = options
            .font
            .metrics(options.font_size, options.effective_line_height());
        let pages = paginate_text(text, options.page_size, &options.margins, &metrics)?;
        debug!("text runs to {} pages", pages.len());

        enter(session, progress, ConversionState::Embedding)?;
        document.add_text_pages(&pages, options.page_size, &options.margins, options.font_size);
        Ok(())
    }

    fn add_html(
        &self,
        document: &mut Document,
        html: &str,
        session: &mut Session,
        progress: &mut dyn ProgressSink,
    ) -> Result<(), Error> {
        let Some(renderer) = &self.renderer else {
            warn!("no HTML renderer available, converting the text content only");
            let text = extract::html_to_text(html);
            return self.add_text(document, &text, session, progress);
        };

        enter(session, progress, ConversionState::Rendering)?;
        let rendered = renderer.render(html, self.options.viewport_width)?;
        self.add_tall_image(document, &rendered, session, progress)
    }

    fn add_tall_image(
        &self,
        document: &mut Document,
        image: &SourceImage,
        session: &mut Session,
        progress: &mut dyn ProgressSink,
    ) -> Result<(), Error> {
        let options = &self.options;

        enter(session, progress, ConversionState::Paginating)?;
        let slices = slice_image(image, options.page_size, &options.margins)?;
        debug!(
            "slicing {}x{} image at {} px/pt into {} pages",
            image.width(),
            image.height(),
            slices.ratio(),
            slices.pages_remaining()
        );

        enter(session, progress, ConversionState::Embedding)?;
        document.add_image_slices(slices, options.page_size);
        Ok(())
    }

    fn add_image(
        &self,
        document: &mut Document,
        bytes: &[u8],
        session: &mut Session,
        progress: &mut dyn ProgressSink,
    ) -> Result<(), Error> {
        let options = &self.options;
        let decoded = decode_image(bytes)?;

        enter(session, progress, ConversionState::Paginating)?;
        let fitted = fit_image(&decoded.source, options.page_size, &options.margins)?;

        enter(session, progress, ConversionState::Embedding)?;
        let placement = fitted.placement;
        let image = match decoded.jpeg {
            Some(jpeg) => Image::from_jpeg(jpeg, decoded.source.width(), decoded.source.height()),
            None => Image::from_slice(fitted),
        };
        document.add_placed_image(image, &placement, options.page_size);
        Ok(())
    }
}

fn enter(
    session: &mut Session,
    progress: &mut dyn ProgressSink,
    state: ConversionState,
) -> Result<(), Error> {
    session.advance(state)?;
    progress.report(state.progress(), state.label());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Margins;
    use crate::pagesize::PageSize;
    use crate::units::Pt;
    use image::DynamicImage;

    /// Renders every HTML document as a plain image 10 pixels tall per byte
    struct StubRenderer;

    impl HtmlRenderer for StubRenderer {
        fn render(&self, html: &str, viewport_width: u32) -> Result<SourceImage, Error> {
            let height = html.len() as u32 * 10;
            Ok(SourceImage::new(DynamicImage::new_rgb8(viewport_width, height)))
        }
    }

    struct FailingRenderer;

    impl HtmlRenderer for FailingRenderer {
        fn render(&self, _html: &str, _viewport_width: u32) -> Result<SourceImage, Error> {
            Err(Error::Render("out of memory".to_string()))
        }
    }

    fn recorded(converter: &Converter, session: &mut Session) -> (Result<Vec<u8>, Error>, Vec<f32>) {
        let mut fractions = Vec::new();
        let mut sink = |fraction: f32, _label: &str| fractions.push(fraction);
        let result = converter.convert(session, &mut sink);
        (result, fractions)
    }

    #[test]
    fn text_skips_the_extraction_stages() {
        let mut session = Session::with_input("notes.txt", b"one two three".to_vec()).unwrap();
        let (result, fractions) = recorded(&Converter::default(), &mut session);

        let pdf = result.unwrap();
        assert_eq!(session.state(), ConversionState::Done);
        assert_eq!(session.output(), Some(pdf.as_slice()));
        assert_eq!(fractions, vec![0.1, 0.7, 0.85, 1.0]);
    }

    #[test]
    fn rendered_html_is_sliced_into_pages() {
        let mut options = ConvertOptions::new();
        options
            .page_size(PageSize::new(Pt(100.0), Pt(100.0)))
            .margins(Margins::empty())
            .viewport_width(100);
        let converter = Converter::new(options).with_renderer(StubRenderer);

        // 25 bytes of HTML render 250 pixels tall, three 100pt pages
        let mut session = Session::with_input("page.html", b"<p>twenty-five bytes!</p>".to_vec()).unwrap();
        let (result, fractions) = recorded(&converter, &mut session);

        let pdf = result.unwrap();
        let text = String::from_utf8_lossy(&pdf);
        assert_eq!(text.matches("/Subtype /Image").count(), 3);
        assert_eq!(fractions, vec![0.1, 0.5, 0.7, 0.85, 1.0]);
    }

    #[test]
    fn failures_leave_the_session_failed() {
        let converter = Converter::default().with_renderer(FailingRenderer);
        let mut session = Session::with_input("page.html", b"<p>hi</p>".to_vec()).unwrap();
        let (result, fractions) = recorded(&converter, &mut session);

        assert!(matches!(result, Err(Error::Render(_))));
        assert_eq!(session.state(), ConversionState::Failed);
        assert!(session.output().is_none());
        assert_eq!(fractions.last(), Some(&1.0));
    }

    #[test]
    fn converting_without_input_fails() {
        let mut session = Session::new();
        let result = Converter::default().convert(&mut session, &mut NoProgress);
        assert!(matches!(result, Err(Error::NoInput)));
        assert_eq!(session.state(), ConversionState::Failed);
    }

    #[test]
    fn a_session_converts_only_once() {
        let converter = Converter::default();
        let mut session = Session::with_input("notes.txt", b"hello".to_vec()).unwrap();
        converter.convert(&mut session, &mut NoProgress).unwrap();
        assert!(matches!(
            converter.convert(&mut session, &mut NoProgress),
            Err(Error::InvalidTransition { .. })
        ));
        assert_eq!(session.state(), ConversionState::Done);
    }
}
