use derive_more::{Deref, Display, From};

use crate::error::Error;
use crate::layout::margins::Margins;
use crate::pagesize::PageSize;
use crate::units::Pt;

const TABSIZE: usize = 4;

/// Font size, line spacing, and a function measuring how wide a string of
/// text is when drawn. The measuring function depends on the font backend,
/// so the caller supplies it.
pub struct FontMetrics<M> {
    pub size: Pt,
    /// Vertical distance between consecutive baselines
    pub line_height: Pt,
    pub measure: M,
}

impl<M> FontMetrics<M>
where
    M: Fn(&str) -> Pt,
{
    pub fn new(size: Pt, line_height: Pt, measure: M) -> Self {
        FontMetrics {
            size,
            line_height,
            measure,
        }
    }

    /// Calculate the width of a given string of text
    pub fn width_of(&self, text: &str) -> Pt {
        (self.measure)(text)
    }
}

/// Metrics for a fixed-pitch font where every character advances by `advance`
pub fn monospace(size: Pt, line_height: Pt, advance: Pt) -> FontMetrics<impl Fn(&str) -> Pt> {
    FontMetrics::new(size, line_height, move |text: &str| {
        advance * text.chars().count() as f32
    })
}

/// A single wrapped line of text
#[derive(Debug, Default, Clone, PartialEq, Eq, Deref, Display, From)]
pub struct TextLine(pub String);

/// A line of text and the baseline it is drawn on, measured from the top of the page
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub text: TextLine,
    pub baseline: Pt,
}

/// The lines of text that land on a single page
#[derive(Debug, Clone, PartialEq)]
pub struct TextPage {
    pub index: usize,
    pub lines: Vec<PlacedLine>,
}

impl TextPage {
    fn new(index: usize) -> TextPage {
        TextPage {
            index,
            lines: Vec::new(),
        }
    }
}

fn normalize(text: &str) -> String {
    text.replace("\r\n", "\n")
        .replace('\r', "\n")
        .replace('\t', &" ".repeat(TABSIZE))
}

/// Wraps text into lines no wider than `max_width`, breaking at spaces.
///
/// Words are added to a line for as long as the line still measures within
/// `max_width`. A word that is wider than `max_width` on its own gets a line
/// to itself and is left to overflow rather than being split. Newlines in
/// the source always end the current line; blank source lines are kept as
/// empty lines. Leading indentation of a source line (tabs count as four
/// spaces) is kept on its first wrapped line, while runs of spaces between
/// words collapse into one.
pub fn wrap_text<M>(text: &str, max_width: Pt, metrics: &FontMetrics<M>) -> Vec<TextLine>
where
    M: Fn(&str) -> Pt,
{
    if text.is_empty() {
        return Vec::new();
    }

    let text = normalize(text);
    let mut lines: Vec<TextLine> = Vec::new();

    for source_line in text.split('\n') {
        let mut words = source_line.split(' ').filter(|w| !w.is_empty());
        let Some(first) = words.next() else {
            lines.push(TextLine::default());
            continue;
        };

        let indent = source_line.len() - source_line.trim_start_matches(' ').len();
        let mut current = format!("{}{first}", &source_line[..indent]);
        for word in words {
            let candidate = format!("{current} {word}");
            if metrics.width_of(&candidate) <= max_width {
                current = candidate;
            } else {
                lines.push(TextLine(std::mem::replace(&mut current, word.to_string())));
            }
        }
        lines.push(TextLine(current));
    }

    lines
}

/// Wraps text to the usable width of the page and distributes the lines over
/// as many pages as it takes.
///
/// The first baseline of every page sits one line height below the top
/// margin, and each following line one line height further down. A line is
/// only placed if its baseline plus one line height stays above the bottom
/// margin, otherwise it starts the next page. Lines are never split across
/// pages, and empty text produces a single page with no lines.
///
/// ```
/// use topdf::layout::{monospace, paginate_text, Margins};
/// use topdf::{pagesize::PageSize, Pt};
///
/// let metrics = monospace(Pt(10.0), Pt(12.0), Pt(6.0));
/// let page = PageSize::new(Pt(200.0), Pt(100.0));
/// let pages = paginate_text("one\ntwo\nthree\nfour\nfive\nsix", page, &Margins::all(Pt(10.0)), &metrics)
///     .unwrap();
///
/// assert_eq!(pages.len(), 2);
/// assert_eq!(pages[0].lines[0].baseline, Pt(22.0));
/// assert_eq!(pages[0].lines.len(), 5);
/// assert_eq!(pages[1].lines[0].text.as_str(), "six");
/// ```
pub fn paginate_text<M>(
    text: &str,
    page: PageSize,
    margins: &Margins,
    metrics: &FontMetrics<M>,
) -> Result<Vec<TextPage>, Error>
where
    M: Fn(&str) -> Pt,
{
    let area = margins.usable_area(page)?;
    let line_height = metrics.line_height;
    let limit = area.bottom();

    if !line_height.is_positive_finite() {
        return Err(Error::invalid_layout(area.width.0, area.height.0));
    }
    if text.is_empty() {
        return Ok(vec![TextPage::new(0)]);
    }
    // the layout must fit at least one line per page, or nothing would progress
    if area.top + line_height * 2.0 > limit {
        return Err(Error::invalid_layout(area.width.0, area.height.0));
    }

    let lines = wrap_text(text, area.width, metrics);

    let mut pages: Vec<TextPage> = Vec::new();
    let mut current = TextPage::new(0);

    for line in lines {
        let mut baseline = area.top + line_height * (current.lines.len() + 1) as f32;
        if baseline + line_height > limit && !current.lines.is_empty() {
            let next = TextPage::new(current.index + 1);
            pages.push(std::mem::replace(&mut current, next));
            baseline = area.top + line_height;
        }

        current.lines.push(PlacedLine {
            text: line,
            baseline,
        });
    }

    pages.push(current);
    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every character is 7 points wide
    fn stub() -> FontMetrics<impl Fn(&str) -> Pt> {
        monospace(Pt(12.0), Pt(14.0), Pt(7.0))
    }

    fn texts(lines: &[TextLine]) -> Vec<&str> {
        lines.iter().map(|l| l.as_str()).collect()
    }

    #[test]
    fn words_are_packed_greedily() {
        // 70pt fits 10 characters
        let lines = wrap_text("the quick brown fox jumps over", Pt(70.0), &stub());
        assert_eq!(texts(&lines), vec!["the quick", "brown fox", "jumps over"]);
    }

    #[test]
    fn overwide_words_get_their_own_line() {
        let lines = wrap_text("a supercalifragilistic b", Pt(70.0), &stub());
        assert_eq!(texts(&lines), vec!["a", "supercalifragilistic", "b"]);
    }

    #[test]
    fn newlines_force_breaks_and_blank_lines_survive() {
        let lines = wrap_text("first\r\n\r\nsecond\rthird\n", Pt(700.0), &stub());
        assert_eq!(texts(&lines), vec!["first", "", "second", "third", ""]);
    }

    #[test]
    fn leading_indentation_survives_wrapping() {
        let lines = wrap_text("a\tb\n\tindented code\n  two", Pt(700.0), &stub());
        assert_eq!(texts(&lines), vec!["a b", "    indented code", "  two"]);

        // 70pt fits 10 characters, the indent stays on the first line only
        let lines = wrap_text("  alpha beta gamma", Pt(70.0), &stub());
        assert_eq!(texts(&lines), vec!["  alpha", "beta gamma"]);
    }

    #[test]
    fn no_line_exceeds_the_width_unless_it_is_one_word() {
        let metrics = stub();
        let text = lipsum::lipsum(400);
        let lines = wrap_text(&text, Pt(150.0), &metrics);
        for line in &lines {
            assert!(
                metrics.width_of(line) <= Pt(150.0) || !line.contains(' '),
                "{line:?} is too wide"
            );
        }
    }

    #[test]
    fn pages_conserve_the_wrapped_lines() {
        let metrics = stub();
        let text = format!("{}\n\n{}", lipsum::lipsum(300), lipsum::lipsum(150));
        let page = PageSize::new(Pt(300.0), Pt(400.0));
        let margins = Margins::all(Pt(30.0));

        let pages = paginate_text(&text, page, &margins, &metrics).unwrap();
        let wrapped = wrap_text(&text, Pt(240.0), &metrics);

        let placed: Vec<TextLine> = pages
            .iter()
            .flat_map(|p| p.lines.iter().map(|l| l.text.clone()))
            .collect();
        assert_eq!(placed, wrapped);
        assert!(pages.len() > 1);
        assert!(pages.iter().all(|p| !p.lines.is_empty()));
    }

    #[test]
    fn baselines_stay_inside_the_margins() {
        let metrics = stub();
        let page = PageSize::new(Pt(300.0), Pt(400.0));
        let margins = Margins::trbl(Pt(20.0), Pt(30.0), Pt(50.0), Pt(30.0));
        let pages = paginate_text(&lipsum::lipsum(500), page, &margins, &metrics).unwrap();

        for (i, page_lines) in pages.iter().enumerate() {
            assert_eq!(page_lines.index, i);
            assert_eq!(page_lines.lines[0].baseline, Pt(34.0));
            for pair in page_lines.lines.windows(2) {
                assert!(pair[0].baseline < pair[1].baseline);
            }
            let last = page_lines.lines.last().unwrap();
            assert!(last.baseline + Pt(14.0) <= Pt(350.0));
        }
        // (350 - 20) / 14 = 23.57 slots, the first of which is left empty
        assert_eq!(pages[0].lines.len(), 22);
    }

    #[test]
    fn empty_text_is_one_empty_page() {
        let page = PageSize::new(Pt(300.0), Pt(400.0));
        let pages = paginate_text("", page, &Margins::all(Pt(10.0)), &stub()).unwrap();
        assert_eq!(
            pages,
            vec![TextPage {
                index: 0,
                lines: Vec::new()
            }]
        );
    }

    #[test]
    fn zero_usable_width_fails_before_wrapping() {
        use std::cell::Cell;

        let calls = Cell::new(0);
        let metrics = FontMetrics::new(Pt(12.0), Pt(14.0), |text: &str| {
            calls.set(calls.get() + 1);
            Pt(text.len() as f32)
        });
        let page = PageSize::new(Pt(100.0), Pt(400.0));
        let margins = Margins::symmetric(Pt(10.0), Pt(50.0));

        let result = paginate_text("some words here", page, &margins, &metrics);
        assert!(matches!(result, Err(Error::InvalidLayout { .. })));
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn a_page_too_short_for_one_line_is_rejected() {
        let page = PageSize::new(Pt(300.0), Pt(40.0));
        let result = paginate_text("text", page, &Margins::all(Pt(10.0)), &stub());
        assert!(matches!(result, Err(Error::InvalidLayout { .. })));
    }

    #[test]
    fn empty_text_fits_on_any_valid_page() {
        let page = PageSize::new(Pt(300.0), Pt(40.0));
        let pages = paginate_text("", page, &Margins::all(Pt(10.0)), &stub()).unwrap();
        assert_eq!(pages.len(), 1);
        assert!(pages[0].lines.is_empty());
    }

    #[test]
    fn unusable_line_heights_are_rejected() {
        let page = PageSize::new(Pt(300.0), Pt(400.0));
        for line_height in [0.0, -14.0, f32::NAN, f32::INFINITY] {
            let metrics = monospace(Pt(12.0), Pt(line_height), Pt(7.0));
            let result = paginate_text("text", page, &Margins::all(Pt(10.0)), &metrics);
            assert!(matches!(result, Err(Error::InvalidLayout { .. })), "{line_height}");
        }
    }

    #[test]
    fn pagination_is_deterministic() {
        let text = lipsum::lipsum(200);
        let page = PageSize::new(Pt(250.0), Pt(300.0));
        let first = paginate_text(&text, page, &Margins::all(Pt(20.0)), &stub()).unwrap();
        let second = paginate_text(&text, page, &Margins::all(Pt(20.0)), &stub()).unwrap();
        assert_eq!(first, second);
    }
}
