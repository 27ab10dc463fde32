//! Turning documents into HTML, and HTML into something that can be paginated.

use crate::error::Error;
use crate::layout::SourceImage;
use log::debug;
use roxmltree::Node;
use std::io::{Cursor, Read};

const WML_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// Converts a word-processor document into an HTML string
pub trait Extractor {
    fn extract(&self, document: &[u8]) -> Result<String, Error>;
}

/// Lays out HTML at a fixed viewport width and rasterises the result into
/// a single, arbitrarily tall image
pub trait HtmlRenderer {
    fn render(&self, html: &str, viewport_width: u32) -> Result<SourceImage, Error>;
}

/// Extracts the paragraphs of a `.docx` file. Headings become `<h1>` to
/// `<h6>`, every other paragraph a `<p>`. Formatting, tables and images are
/// not carried over.
#[derive(Debug, Default, Clone, Copy)]
pub struct DocxExtractor;

impl Extractor for DocxExtractor {
    fn extract(&self, document: &[u8]) -> Result<String, Error> {
        let mut zip = zip::ZipArchive::new(Cursor::new(document))?;
        let mut xml = String::new();
        zip.by_name("word/document.xml")?.read_to_string(&mut xml)?;

        let xml = roxmltree::Document::parse(&xml)?;
        let body = xml
            .descendants()
            .find(|n| is_wml(n, "body"))
            .ok_or_else(|| Error::Extraction("document has no body".to_string()))?;

        let mut html = String::new();
        let mut paragraphs = 0;
        for paragraph in body.descendants().filter(|n| is_wml(n, "p")) {
            let tag = match heading_level(paragraph) {
                Some(level) => format!("h{level}"),
                None => "p".to_string(),
            };
            html.push_str(&format!(
                "<{tag}>{}</{tag}>\n",
                escape_html(&paragraph_text(paragraph))
            ));
            paragraphs += 1;
        }

        debug!("extracted {paragraphs} paragraphs");
        Ok(html)
    }
}

fn is_wml(node: &Node, name: &str) -> bool {
    node.tag_name().name() == name && node.tag_name().namespace() == Some(WML_NS)
}

fn wml_child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|n| is_wml(n, name))
}

/// `Heading1` to `Heading6` styles (and `Title`) map onto HTML heading levels
fn heading_level(paragraph: Node) -> Option<u8> {
    let style = wml_child(paragraph, "pPr")
        .and_then(|ppr| wml_child(ppr, "pStyle"))
        .and_then(|s| s.attribute((WML_NS, "val")))?;

    if style.eq_ignore_ascii_case("title") {
        return Some(1);
    }
    let level: u8 = style
        .strip_prefix("Heading")
        .or_else(|| style.strip_prefix("heading"))?
        .trim()
        .parse()
        .ok()?;
    (1..=6).contains(&level).then_some(level)
}

fn paragraph_text(paragraph: Node) -> String {
    let mut text = String::new();
    for node in paragraph.descendants() {
        if node.tag_name().namespace() != Some(WML_NS) {
            continue;
        }
        match node.tag_name().name() {
            "t" => text.push_str(node.text().unwrap_or_default()),
            "tab" if node.parent().is_some_and(|p| is_wml(&p, "r")) => text.push('\t'),
            "br" | "cr" => text.push('\n'),
            "noBreakHyphen" => text.push('\u{2011}'),
            _ => {}
        }
    }
    text
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('\n', "<br>")
}

const BLOCK_TAGS: &[&str] = &[
    "p", "div", "br", "h1", "h2", "h3", "h4", "h5", "h6", "li", "tr", "table", "ul", "ol", "pre",
    "blockquote", "section", "article", "header", "footer", "hr",
];

/// Reduce HTML to the text it shows. Block-level elements end up on their
/// own lines; the head, scripts, styles and comments are dropped.
pub fn html_to_text(html: &str) -> String {
    let mut text = String::new();
    let mut rest = html;
    let mut skip_until: Option<&str> = None;

    while !rest.is_empty() {
        if let Some(closing) = skip_until {
            match find_ascii_case_insensitive(rest, closing) {
                Some(end) => rest = &rest[end..],
                None => break,
            }
            skip_until = None;
        }

        let Some(start) = rest.find('<') else {
            push_text(&mut text, rest);
            break;
        };
        push_text(&mut text, &rest[..start]);
        rest = &rest[start..];

        if let Some(comment) = rest.strip_prefix("<!--") {
            rest = comment.find("-->").map_or("", |end| &comment[end + 3..]);
            continue;
        }

        let Some(end) = rest.find('>') else {
            break;
        };
        let tag = &rest[1..end];
        rest = &rest[end + 1..];

        let name: String = tag
            .trim_start_matches('/')
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();

        if !tag.starts_with('/') {
            match name.as_str() {
                "head" => skip_until = Some("</head"),
                "title" => skip_until = Some("</title"),
                "script" => skip_until = Some("</script"),
                "style" => skip_until = Some("</style"),
                _ => {}
            }
        }
        if BLOCK_TAGS.contains(&name.as_str()) && !text.is_empty() && !text.ends_with('\n') {
            text.push('\n');
        }
    }

    text.trim().to_string()
}

fn find_ascii_case_insensitive(haystack: &str, needle: &str) -> Option<usize> {
    haystack
        .as_bytes()
        .windows(needle.len())
        .position(|w| w.eq_ignore_ascii_case(needle.as_bytes()))
}

/// Append text content, collapsing runs of whitespace the way a browser does
fn push_text(out: &mut String, raw: &str) {
    let decoded = decode_entities(raw);
    for (i, word) in decoded.split_ascii_whitespace().enumerate() {
        let at_line_start = out.is_empty() || out.ends_with('\n');
        let needs_space = i > 0 || (decoded.starts_with(|c: char| c.is_ascii_whitespace()));
        if needs_space && !at_line_start && !out.ends_with(' ') {
            out.push(' ');
        }
        out.push_str(word);
    }
    if decoded.ends_with(|c: char| c.is_ascii_whitespace())
        && !out.is_empty()
        && !out.ends_with(['\n', ' '])
    {
        out.push(' ');
    }
}

fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        rest = &rest[start..];

        let decoded = rest.find(';').filter(|&end| end <= 10).and_then(|end| {
            let ch = match &rest[1..end] {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some('\u{00A0}'),
                entity => entity
                    .strip_prefix("#x")
                    .or_else(|| entity.strip_prefix("#X"))
                    .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                    .or_else(|| entity.strip_prefix('#').and_then(|dec| dec.parse().ok()))
                    .and_then(char::from_u32),
            }?;
            Some((ch, end))
        });

        match decoded {
            Some((ch, end)) => {
                out.push(ch);
                rest = &rest[end + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn docx(body: &str) -> Vec<u8> {
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        zip.start_file("word/document.xml", SimpleFileOptions::default())
            .unwrap();
        write!(
            zip,
            r#"<?xml version="1.0" encoding="UTF-8"?><w:document xmlns:w="{WML_NS}"><w:body>{body}</w:body></w:document>"#
        )
        .unwrap();
        zip.finish().unwrap().into_inner()
    }

    #[test]
    fn paragraphs_and_headings_become_html() {
        let bytes = docx(concat!(
            r#"<w:p><w:pPr><w:pStyle w:val="Heading2"/></w:pPr><w:r><w:t>Intro</w:t></w:r></w:p>"#,
            r#"<w:p><w:r><w:t xml:space="preserve">Fish &amp; </w:t></w:r><w:r><w:t>chips</w:t></w:r></w:p>"#,
            r#"<w:p/>"#,
        ));
        let html = DocxExtractor.extract(&bytes).unwrap();
        assert_eq!(html, "<h2>Intro</h2>\n<p>Fish &amp; chips</p>\n<p></p>\n");
    }

    #[test]
    fn tabs_and_breaks_are_kept() {
        let bytes = docx(r#"<w:p><w:r><w:t>a</w:t><w:tab/><w:t>b</w:t><w:br/><w:t>c</w:t></w:r></w:p>"#);
        let html = DocxExtractor.extract(&bytes).unwrap();
        assert_eq!(html, "<p>a\tb<br>c</p>\n");
    }

    #[test]
    fn non_documents_fail_to_extract() {
        assert!(matches!(
            DocxExtractor.extract(b"plain text"),
            Err(Error::Zip(_))
        ));
    }

    #[test]
    fn html_is_reduced_to_lines_of_text() {
        let html = r#"<!DOCTYPE html><html><head><title>T</title><style>p { color: red }</style></head>
            <body><h1>Hello</h1><p>Fish &amp;   <b>chips</b>&#33;</p><!-- hidden --><script>var x = "<p>";</script><p>a&lt;b</p></body></html>"#;
        assert_eq!(html_to_text(html), "Hello\nFish & chips!\na<b");
    }

    #[test]
    fn titles_are_not_body_text() {
        assert_eq!(
            html_to_text("<HEAD><meta charset=utf-8><Title>Report</Title></HEAD><p>Body</p>"),
            "Body"
        );
        assert_eq!(html_to_text("<title>Bare</title><header>Top</header>"), "Top");
    }

    #[test]
    fn unknown_entities_are_left_alone() {
        assert_eq!(decode_entities("AT&T &bogus; &#x41;"), "AT&T &bogus; A");
    }
}
