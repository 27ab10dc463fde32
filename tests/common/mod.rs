#![allow(dead_code)]

use std::io::{Cursor, Write};

/// Count the non-overlapping occurrences of `needle` in a PDF
pub fn count(pdf: &[u8], needle: &str) -> usize {
    String::from_utf8_lossy(pdf).matches(needle).count()
}

/// Number of page objects in a PDF written by this crate
pub fn page_count(pdf: &[u8]) -> usize {
    count(pdf, "/Type /Page") - count(pdf, "/Type /Pages")
}

/// A minimal `.docx` holding the given `w:body` contents
pub fn docx(body: &str) -> Vec<u8> {
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    zip.start_file("word/document.xml", zip::write::SimpleFileOptions::default())
        .unwrap();
    write!(
        zip,
        r#"<?xml version="1.0" encoding="UTF-8"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}</w:body></w:document>"#
    )
    .unwrap();
    zip.finish().unwrap().into_inner()
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
