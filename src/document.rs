use crate::{
    font::PdfFont,
    image::Image,
    info::Info,
    layout::{ImageSlice, Margins, Placement, TextPage},
    page::{Page, PageContents},
    pagesize::PageSize,
    refs::{ObjectReferences, RefType},
    units::Pt,
};
use id_arena::{Arena, Id};
use log::debug;
use pdf_writer::{Finish, Pdf, Ref};
use std::io::Write;

/// A document is the main object that stores all the contents of the PDF
/// then renders it out with a call to [Document::write]
#[derive(Default)]
pub struct Document {
    pub info: Option<Info>,
    pub pages: Arena<Page>,
    pub page_order: Vec<Id<Page>>,
    pub images: Arena<Image>,
    /// The font every text page is drawn with
    pub font: PdfFont,
}

impl Document {
    pub fn new(font: PdfFont) -> Document {
        Document {
            font,
            ..Document::default()
        }
    }

    /// Sets information about the document. If not provided, no information block will be
    /// written to the PDF
    pub fn set_info(&mut self, info: Info) {
        self.info = Some(info);
    }

    /// Add a page to the end of the document
    pub fn add_page(&mut self, page: Page) -> Id<Page> {
        let id = self.pages.alloc(page);
        self.page_order.push(id);
        id
    }

    pub fn page_count(&self) -> usize {
        self.page_order.len()
    }

    /// Add an image to the document. Images are stored once and referred to by id
    /// from the pages they are drawn on.
    pub fn add_image(&mut self, image: Image) -> Id<Image> {
        self.images.alloc(image)
    }

    /// Add a new page showing `image` at `placement`
    pub fn add_placed_image(
        &mut self,
        image: Image,
        placement: &Placement,
        page_size: PageSize,
    ) -> Id<Page> {
        let image_id = self.add_image(image);
        let mut page = Page::new(page_size);
        page.add_image(image_id.index(), placement);
        self.add_page(page)
    }

    /// Add one page per slice, in slice order
    pub fn add_image_slices<I>(&mut self, slices: I, page_size: PageSize) -> Vec<Id<Page>>
    where
        I: IntoIterator<Item = ImageSlice>,
    {
        slices
            .into_iter()
            .map(|slice| {
                debug!(
                    "embedding slice {} (rows {}..{})",
                    slice.index, slice.rows.start, slice.rows.end
                );
                let placement = slice.placement;
                self.add_placed_image(Image::from_slice(slice), &placement, page_size)
            })
            .collect()
    }

    /// Add one page per paginated text page, drawing every line at the left margin
    pub fn add_text_pages(
        &mut self,
        pages: &[TextPage],
        page_size: PageSize,
        margins: &Margins,
        font_size: Pt,
    ) -> Vec<Id<Page>> {
        pages
            .iter()
            .map(|text| {
                let mut page = Page::new(page_size);
                page.add_text(text, margins.left, font_size);
                self.add_page(page)
            })
            .collect()
    }

    fn has_text(&self) -> bool {
        self.pages.iter().any(|(_, page)| {
            page.contents
                .iter()
                .any(|c| matches!(c, PageContents::Text(_)))
        })
    }

    /// Write the entire document to the writer. The whole PDF is assembled in
    /// memory first, so very large documents need a matching amount of memory.
    pub fn write<W: Write>(self, mut w: W) -> Result<(), crate::Error> {
        let has_text = self.has_text();
        let Document {
            info,
            pages,
            page_order,
            images,
            font,
        } = self;

        let mut refs = ObjectReferences::new();

        let catalog_id = refs.gen(RefType::Catalog);
        let page_tree_id = refs.gen(RefType::PageTree);

        let mut writer = Pdf::new();
        if let Some(info) = info {
            info.write(&mut refs, &mut writer);
        }

        // page refs follow page_order, not arena order
        let page_refs: Vec<Ref> = (0..page_order.len())
            .map(|i| refs.gen(RefType::Page(i)))
            .collect();

        writer
            .pages(page_tree_id)
            .count(page_refs.len() as i32)
            .kids(page_refs);

        if has_text {
            font.write(&mut refs, &mut writer);
        }

        for (i, image) in images.iter() {
            image.write(&mut refs, i.index(), &mut writer);
        }

        for (page_index, id) in page_order.iter().enumerate() {
            if let Some(page) = pages.get(*id) {
                page.write(&mut refs, page_index, &font, &mut writer);
            }
        }

        let mut catalog = writer.catalog(catalog_id);
        catalog.pages(page_tree_id);
        catalog.finish();

        let bytes = writer.finish();
        debug!(
            "wrote {} pages, {} images, {} bytes",
            page_order.len(),
            images.len(),
            bytes.len()
        );
        w.write_all(bytes.as_slice()).map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{paginate_image, SourceImage};
    use image::DynamicImage;

    fn count(haystack: &[u8], needle: &str) -> usize {
        haystack
            .windows(needle.len())
            .filter(|w| *w == needle.as_bytes())
            .count()
    }

    #[test]
    fn one_page_per_slice_in_order() {
        let page_size = PageSize::new(Pt(100.0), Pt(100.0));
        let source = SourceImage::new(DynamicImage::new_rgb8(100, 250));
        let slices = paginate_image(&source, page_size, &Margins::empty()).unwrap();

        let mut document = Document::default();
        let ids = document.add_image_slices(slices, page_size);
        assert_eq!(ids.len(), 3);
        assert_eq!(document.page_order, ids);

        for (i, id) in ids.iter().enumerate() {
            let PageContents::Image(layout) = &document.pages[*id].contents[0] else {
                panic!("expected an image");
            };
            assert_eq!(layout.image_index, i);
        }
    }

    #[test]
    fn written_documents_contain_every_page() {
        let page_size = PageSize::new(Pt(100.0), Pt(100.0));
        let source = SourceImage::new(DynamicImage::new_rgb8(100, 250));
        let slices = paginate_image(&source, page_size, &Margins::empty()).unwrap();

        let mut document = Document::default();
        document.add_image_slices(slices, page_size);
        let mut info = Info::new();
        info.title("Slices");
        document.set_info(info);

        let mut out: Vec<u8> = Vec::new();
        document.write(&mut out).unwrap();

        assert!(out.starts_with(b"%PDF-"));
        assert_eq!(count(&out, "/Type /Page") - count(&out, "/Type /Pages"), 3);
        assert_eq!(count(&out, "/Subtype /Image"), 3);
        assert_eq!(count(&out, "/Courier"), 0);
        assert_eq!(count(&out, "(Slices)"), 1);
    }
}
