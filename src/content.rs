//! Content stream rendering for pages.

use crate::font::PdfFont;
use crate::page::{ImageLayout, PageContents, SpanLayout};
use pdf_writer::{Content, Name, Str};

/// Renders page contents to a PDF content stream
pub(crate) fn render_contents(contents: &[PageContents], font: &PdfFont) -> Vec<u8> {
    let mut content = Content::new();

    for page_content in contents.iter() {
        match page_content {
            PageContents::Text(spans) => render_text_spans(&mut content, spans, font),
            PageContents::Image(image) => render_image(&mut content, image),
        }
    }

    content.finish()
}

fn render_text_spans(content: &mut Content, spans: &[SpanLayout], font: &PdfFont) {
    let Some(first) = spans.first() else {
        return;
    };

    content.save_state();
    content.set_fill_gray(0.0);

    let mut current_size = first.size;
    content.set_font(Name(b"F0"), *current_size);

    for span in spans.iter() {
        if span.size != current_size {
            current_size = span.size;
            content.set_font(Name(b"F0"), *current_size);
        }

        let encoded = font.encode(&span.text);
        content.begin_text();
        content.next_line(*span.x, *span.baseline);
        content.show(Str(&encoded));
        content.end_text();
    }

    content.restore_state();
}

fn render_image(content: &mut Content, image: &ImageLayout) {
    let position = &image.position;
    content.save_state();
    content.transform([
        *position.width(),
        0.0,
        0.0,
        *position.height(),
        *position.x1,
        *position.y1,
    ]);
    content.x_object(Name(format!("I{}", image.image_index).as_bytes()));
    content.restore_state();
}
