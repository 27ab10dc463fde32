use crate::layout::FontMetrics;
use crate::refs::{ObjectReferences, RefType};
use crate::{Error, Pt};
use owned_ttf_parser::{AsFaceRef, GlyphId, OwnedFace};
use pdf_writer::{
    types::{CidFontType, FontFlags, SystemInfo},
    Filter, Name, Pdf, Str,
};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Advance width of every glyph in the Courier family, in 1/1000 em
const COURIER_ADVANCE: f32 = 600.0;

/// The font text pages are drawn with.
///
/// Without a font file the standard Courier font is used. It is available in
/// every PDF reader, so nothing needs to be embedded, and its glyphs are all
/// the same width which makes measuring exact. It only covers the WinAnsi
/// character set; anything else is drawn as `?`.
#[derive(Default, Clone)]
pub enum PdfFont {
    #[default]
    Courier,
    Embedded(Arc<Font>),
}

impl From<Font> for PdfFont {
    fn from(font: Font) -> Self {
        PdfFont::Embedded(Arc::new(font))
    }
}

impl PdfFont {
    /// Width and line metrics for laying out text in this font at `size`
    pub fn metrics(&self, size: Pt, line_height: Pt) -> FontMetrics<Box<dyn Fn(&str) -> Pt + '_>> {
        let measure: Box<dyn Fn(&str) -> Pt + '_> = match self {
            PdfFont::Courier => Box::new(move |text: &str| {
                size * text.chars().count() as f32 * COURIER_ADVANCE / 1000.0
            }),
            PdfFont::Embedded(font) => Box::new(move |text: &str| font.width_of_text(text, size)),
        };
        FontMetrics::new(size, line_height, measure)
    }


    /// Encode text as the bytes a content stream shows with this font
    pub(crate) fn encode(&self, text: &str) -> Vec<u8> {
        match self {
            PdfFont::Courier => text.chars().map(to_winansi).collect(),
            PdfFont::Embedded(font) => text
                .chars()
                .flat_map(|ch| {
                    font.glyph_id(ch)
                        .or_else(|| font.replacement_glyph_id())
                        .unwrap_or_default()
                        .to_be_bytes()
                })
                .collect(),
        }
    }

    pub(crate) fn write(&self, refs: &mut ObjectReferences, writer: &mut Pdf) {
        match self {
            PdfFont::Courier => {
                let id = refs.gen(RefType::Font);
                writer
                    .type1_font(id)
                    .base_font(Name(b"Courier"))
                    .encoding_predefined(Name(b"WinAnsiEncoding"));
            }
            PdfFont::Embedded(font) => font.write(refs, writer),
        }
    }
}

/// Map a character to its WinAnsi (Windows-1252) byte, using `?` for anything unmappable
fn to_winansi(ch: char) -> u8 {
    match ch as u32 {
        0x20..=0x7E | 0xA0..=0xFF => ch as u8,
        0x20AC => 0x80,
        0x201A => 0x82,
        0x0192 => 0x83,
        0x201E => 0x84,
        0x2026 => 0x85,
        0x2020 => 0x86,
        0x2021 => 0x87,
        0x02C6 => 0x88,
        0x2030 => 0x89,
        0x0160 => 0x8A,
        0x2039 => 0x8B,
        0x0152 => 0x8C,
        0x017D => 0x8E,
        0x2018 => 0x91,
        0x2019 => 0x92,
        0x201C => 0x93,
        0x201D => 0x94,
        0x2022 => 0x95,
        0x2013 => 0x96,
        0x2014 => 0x97,
        0x02DC => 0x98,
        0x2122 => 0x99,
        0x0161 => 0x9A,
        0x203A => 0x9B,
        0x0153 => 0x9C,
        0x017E => 0x9E,
        0x0178 => 0x9F,
        _ => b'?',
    }
}

/// A parsed TrueType or OpenType font. The font is embedded in its entirety
/// in the generated PDF, so large fonts noticeably increase the file size.
pub struct Font {
    pub face: OwnedFace,
}

impl Font {
    /// Load a font from raw bytes, returning an error if the font could not be parsed
    pub fn load(bytes: Vec<u8>) -> Result<Font, Error> {
        let face = OwnedFace::from_vec(bytes, 0)?;
        Ok(Font { face })
    }

    /// The PostScript-friendly full name of the font, if it has one
    pub fn name(&self) -> Option<String> {
        self.face
            .as_face_ref()
            .names()
            .into_iter()
            .find(|name| name.name_id == owned_ttf_parser::name_id::FULL_NAME && name.is_unicode())
            .and_then(|name| name.to_string())
            .map(|name| name.replace(' ', ""))
    }

    fn scaling(&self, size: Pt) -> Pt {
        size / self.face.as_face_ref().units_per_em() as f32
    }

    /// Calculate the ascent (distance from the baseline to the top of the font) for the given font size
    pub fn ascent(&self, size: Pt) -> Pt {
        self.scaling(size) * self.face.as_face_ref().ascender() as f32
    }

    /// Calculate the descent (distance from the baseline to the bottom of the font) for the given font size.
    /// Note: this is usually negative
    pub fn descent(&self, size: Pt) -> Pt {
        self.scaling(size) * self.face.as_face_ref().descender() as f32
    }

    /// The default distance between two baselines for the given size
    pub fn line_height(&self, size: Pt) -> Pt {
        let leading = self.scaling(size) * self.face.as_face_ref().line_gap() as f32;
        leading + self.ascent(size) - self.descent(size)
    }

    /// Calculate the width of a string of text at the given size. Characters
    /// missing from the font are measured as the replacement glyph.
    pub fn width_of_text(&self, text: &str, size: Pt) -> Pt {
        let scaling = self.scaling(size);
        text.chars()
            .filter_map(|ch| self.glyph_id(ch).or_else(|| self.replacement_glyph_id()))
            .map(|gid| {
                scaling
                    * self
                        .face
                        .as_face_ref()
                        .glyph_hor_advance(GlyphId(gid))
                        .unwrap_or_default() as f32
            })
            .sum()
    }

    pub fn glyph_id(&self, ch: char) -> Option<u16> {
        self.face.as_face_ref().glyph_index(ch).map(|i| i.0)
    }

    pub fn replacement_glyph_id(&self) -> Option<u16> {
        self.glyph_id('\u{FFFD}').or_else(|| self.glyph_id('?'))
    }

    /// Every glyph reachable from a unicode codepoint, keyed by glyph id
    fn glyph_chars(&self) -> BTreeMap<u16, char> {
        let mut map: BTreeMap<u16, char> = BTreeMap::new();
        let Some(cmap) = self.face.as_face_ref().tables().cmap else {
            return map;
        };

        for subtable in cmap.subtables.into_iter().filter(|t| t.is_unicode()) {
            subtable.codepoints(|codepoint| {
                if let Ok(ch) = char::try_from(codepoint) {
                    if let Some(gid) = subtable.glyph_index(codepoint).filter(|g| g.0 > 0) {
                        map.entry(gid.0).or_insert(ch);
                    }
                }
            });
        }
        map
    }

    fn write(&self, refs: &mut ObjectReferences, writer: &mut Pdf) {
        let face = self.face.as_face_ref();
        let name = self.name().unwrap_or_else(|| "EmbeddedFont".to_string());
        let scaling = 1000.0 / face.units_per_em() as f32;
        let glyphs = self.glyph_chars();

        let font_id = refs.gen(RefType::Font);
        let cid_font_id = refs.gen(RefType::CidFont);
        let descriptor_id = refs.gen(RefType::FontDescriptor);
        let data_id = refs.gen(RefType::FontData);
        let to_unicode_id = refs.gen(RefType::ToUnicode);

        writer
            .stream(data_id, self.face.as_slice())
            .pair(Name(b"Length1"), self.face.as_slice().len() as i32);

        let mut flags = FontFlags::NON_SYMBOLIC;
        if face.is_monospaced() {
            flags.insert(FontFlags::FIXED_PITCH);
        }
        if face.is_italic() {
            flags.insert(FontFlags::ITALIC);
        }
        let bbox = face.global_bounding_box();
        let mut descriptor = writer.font_descriptor(descriptor_id);
        descriptor
            .name(Name(name.as_bytes()))
            .flags(flags)
            .bbox(pdf_writer::Rect::new(
                bbox.x_min as f32 * scaling,
                bbox.y_min as f32 * scaling,
                bbox.x_max as f32 * scaling,
                bbox.y_max as f32 * scaling,
            ))
            .italic_angle(0.0)
            .ascent(face.ascender() as f32 * scaling)
            .descent(face.descender() as f32 * scaling)
            .cap_height(
                face.capital_height()
                    .map(|h| h as f32 * scaling)
                    .unwrap_or(700.0),
            )
            .stem_v(80.0)
            .font_file2(data_id);
        drop(descriptor);

        let mut cid_font = writer.cid_font(cid_font_id);
        cid_font
            .subtype(CidFontType::Type2)
            .base_font(Name(name.as_bytes()))
            .system_info(SystemInfo {
                registry: Str(b"Adobe"),
                ordering: Str(b"Identity"),
                supplement: 0,
            })
            .font_descriptor(descriptor_id)
            .default_width(
                face.glyph_hor_advance(GlyphId(0)).unwrap_or_default() as f32 * scaling,
            )
            .cid_to_gid_map_predefined(Name(b"Identity"));
        let mut widths = cid_font.widths();
        for &gid in glyphs.keys() {
            let advance = face.glyph_hor_advance(GlyphId(gid)).unwrap_or_default();
            widths.consecutive(gid, [advance as f32 * scaling]);
        }
        drop(widths);
        drop(cid_font);

        writer
            .type0_font(font_id)
            .base_font(Name(name.as_bytes()))
            .encoding_predefined(Name(b"Identity-H"))
            .descendant_font(cid_font_id)
            .to_unicode(to_unicode_id);

        let cmap = to_unicode_cmap(&glyphs);
        let compressed = miniz_oxide::deflate::compress_to_vec_zlib(
            cmap.as_bytes(),
            miniz_oxide::deflate::CompressionLevel::DefaultLevel as u8,
        );
        writer
            .stream(to_unicode_id, compressed.as_slice())
            .filter(Filter::FlateDecode);
    }
}

/// Build a ToUnicode CMap so text drawn with glyph ids can be copied back out of the PDF
fn to_unicode_cmap(glyphs: &BTreeMap<u16, char>) -> String {
    let mut map = String::from(
        "/CIDInit /ProcSet findresource begin\n\
         12 dict begin\n\
         begincmap\n\
         /CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n\
         /CMapName /Adobe-Identity-UCS def\n\
         /CMapType 2 def\n\
         1 begincodespacerange\n\
         <0000> <FFFF>\n\
         endcodespacerange\n",
    );

    // bfchar blocks hold at most 100 entries
    let entries: Vec<(&u16, &char)> = glyphs.iter().collect();
    for block in entries.chunks(100) {
        map.push_str(&format!("{} beginbfchar\n", block.len()));
        for (gid, ch) in block {
            let mut units = [0u16; 2];
            let hex: String = ch
                .encode_utf16(&mut units)
                .iter()
                .map(|u| format!("{u:04x}"))
                .collect();
            map.push_str(&format!("<{gid:04x}> <{hex}>\n"));
        }
        map.push_str("endbfchar\n");
    }

    map.push_str("endcmap CMapName currentdict /CMap defineresource pop end end\n");
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn courier_measures_every_character_the_same() {
        let font = PdfFont::Courier;
        let metrics = font.metrics(Pt(10.0), Pt(12.0));
        assert_eq!(metrics.width_of("abc"), Pt(18.0));
        assert_eq!(metrics.width_of("WWW"), metrics.width_of("iii"));
        assert_eq!(metrics.width_of("é"), Pt(6.0));
    }

    #[test]
    fn winansi_encoding_replaces_unmappable_characters() {
        let font = PdfFont::Courier;
        assert_eq!(font.encode("a€é"), vec![b'a', 0x80, 0xE9]);
        assert_eq!(font.encode("日本"), b"??".to_vec());
    }

    #[test]
    fn cmap_blocks_are_limited_to_one_hundred_entries() {
        let glyphs: BTreeMap<u16, char> = (1..=150u16)
            .map(|gid| (gid, char::from_u32(0x40 + gid as u32).unwrap()))
            .collect();
        let cmap = to_unicode_cmap(&glyphs);
        assert!(cmap.contains("100 beginbfchar"));
        assert!(cmap.contains("50 beginbfchar"));
        assert!(cmap.contains("<0001> <0041>"));
    }

    #[test]
    fn garbage_is_not_a_font() {
        assert!(matches!(
            Font::load(vec![0, 1, 2, 3]),
            Err(Error::FaceParsing(_))
        ));
    }
}
