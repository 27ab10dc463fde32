use crate::content::render_contents;
use crate::font::PdfFont;
use crate::layout::{top_down_rect, Placement, TextPage};
use crate::pagesize::PageSize;
use crate::rect::Rect;
use crate::refs::{ObjectReferences, RefType};
use crate::units::Pt;
use pdf_writer::{Finish, Name, Pdf};

/// A line of text in PDF space. `baseline` is measured from the bottom of the page.
#[derive(Clone, PartialEq, Debug)]
pub struct SpanLayout {
    pub text: String,
    pub size: Pt,
    pub x: Pt,
    pub baseline: Pt,
}

/// Where an image from the document lands on a page, in PDF space
#[derive(Clone, PartialEq, Debug)]
pub struct ImageLayout {
    pub image_index: usize,
    pub position: Rect,
}

#[derive(Clone, PartialEq, Debug)]
pub enum PageContents {
    Text(Vec<SpanLayout>),
    Image(ImageLayout),
}

pub struct Page {
    /// The size of the page
    pub media_box: Rect,
    pub contents: Vec<PageContents>,
}

impl Page {
    pub fn new(size: PageSize) -> Page {
        Page {
            media_box: Rect {
                x1: Pt(0.0),
                y1: Pt(0.0),
                x2: size.width,
                y2: size.height,
            },
            contents: Vec::default(),
        }
    }

    pub fn height(&self) -> Pt {
        self.media_box.height()
    }

    /// Place an image using a placement measured from the top of the page
    pub fn add_image(&mut self, image_index: usize, placement: &Placement) {
        let position = top_down_rect(
            self.height(),
            placement.x,
            placement.y,
            placement.width,
            placement.height,
        );
        self.contents.push(PageContents::Image(ImageLayout {
            image_index,
            position,
        }));
    }

    /// Place the lines of a paginated text page, starting each one at `left`.
    /// Empty lines only advance the baseline, so nothing is drawn for them.
    pub fn add_text(&mut self, text: &TextPage, left: Pt, size: Pt) {
        let height = self.height();
        let spans: Vec<SpanLayout> = text
            .lines
            .iter()
            .filter(|line| !line.text.is_empty())
            .map(|line| SpanLayout {
                text: line.text.to_string(),
                size,
                x: left,
                baseline: height - line.baseline,
            })
            .collect();

        if !spans.is_empty() {
            self.contents.push(PageContents::Text(spans));
        }
    }

    fn has_text(&self) -> bool {
        self.contents
            .iter()
            .any(|c| matches!(c, PageContents::Text(_)))
    }

    pub(crate) fn write(
        &self,
        refs: &mut ObjectReferences,
        page_index: usize,
        font: &PdfFont,
        writer: &mut Pdf,
    ) {
        let id = refs.get_or_gen(RefType::Page(page_index));
        let parent = refs.get_or_gen(RefType::PageTree);
        let content_id = refs.gen(RefType::ContentForPage(page_index));

        let mut page = writer.page(id);
        page.media_box(self.media_box.into());
        page.parent(parent);

        let mut resources = page.resources();
        if self.has_text() {
            resources
                .fonts()
                .pair(Name(b"F0"), refs.get_or_gen(RefType::Font));
        }
        let mut resource_xobjects = resources.x_objects();
        for content in self.contents.iter() {
            if let PageContents::Image(image) = content {
                resource_xobjects.pair(
                    Name(format!("I{}", image.image_index).as_bytes()),
                    refs.get_or_gen(RefType::Image(image.image_index)),
                );
            }
        }
        resource_xobjects.finish();
        resources.finish();

        page.contents(content_id);
        page.finish();

        let rendered = render_contents(&self.contents, font);
        writer.stream(content_id, rendered.as_slice());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{PlacedLine, TextLine};

    #[test]
    fn placements_are_flipped_into_pdf_space() {
        let mut page = Page::new(PageSize::new(Pt(200.0), Pt(300.0)));
        page.add_image(
            3,
            &Placement {
                x: Pt(10.0),
                y: Pt(20.0),
                width: Pt(100.0),
                height: Pt(50.0),
            },
        );

        let PageContents::Image(image) = &page.contents[0] else {
            panic!("expected an image");
        };
        assert_eq!(image.image_index, 3);
        assert_eq!(image.position.y2, Pt(280.0));
        assert_eq!(image.position.y1, Pt(230.0));
        assert_eq!(image.position.x2, Pt(110.0));
    }

    #[test]
    fn blank_lines_are_not_drawn() {
        let mut page = Page::new(PageSize::new(Pt(200.0), Pt(300.0)));
        let text = TextPage {
            index: 0,
            lines: vec![
                PlacedLine {
                    text: TextLine::from("first".to_string()),
                    baseline: Pt(20.0),
                },
                PlacedLine {
                    text: TextLine::default(),
                    baseline: Pt(34.0),
                },
                PlacedLine {
                    text: TextLine::from("third".to_string()),
                    baseline: Pt(48.0),
                },
            ],
        };
        page.add_text(&text, Pt(15.0), Pt(12.0));

        let PageContents::Text(spans) = &page.contents[0] else {
            panic!("expected text");
        };
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].baseline, Pt(280.0));
        assert_eq!(spans[1].baseline, Pt(252.0));
        assert!(spans.iter().all(|s| s.x == Pt(15.0)));
    }

    #[test]
    fn an_empty_text_page_has_no_contents() {
        let mut page = Page::new(PageSize::new(Pt(200.0), Pt(300.0)));
        page.add_text(
            &TextPage {
                index: 0,
                lines: Vec::new(),
            },
            Pt(10.0),
            Pt(12.0),
        );
        assert!(page.contents.is_empty());
    }
}
