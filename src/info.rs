use crate::refs::{ObjectReferences, RefType};
use chrono::{DateTime, Datelike, Local, Offset, TimeZone, Timelike};
use pdf_writer::{Date, Pdf, TextStr};

const CREATOR: &str = concat!(env!("CARGO_PKG_NAME"), " v", env!("CARGO_PKG_VERSION"));

/// Document metadata written to the PDF information dictionary
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Info {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    /// Adobe Acrobat suggests a comma separated list
    pub keywords: Option<String>,
}

impl Info {
    pub fn new() -> Info {
        Info::default()
    }

    pub fn title<S: ToString>(&mut self, title: S) -> &mut Self {
        self.title = Some(title.to_string());
        self
    }

    pub fn author<S: ToString>(&mut self, author: S) -> &mut Self {
        self.author = Some(author.to_string());
        self
    }

    pub fn subject<S: ToString>(&mut self, subject: S) -> &mut Self {
        self.subject = Some(subject.to_string());
        self
    }

    pub fn keywords<S: ToString>(&mut self, keywords: S) -> &mut Self {
        self.keywords = Some(keywords.to_string());
        self
    }

    pub(crate) fn write(&self, refs: &mut ObjectReferences, writer: &mut Pdf) {
        let id = refs.gen(RefType::Info);
        let mut info = writer.document_info(id);

        if let Some(title) = &self.title {
            info.title(TextStr(title));
        }
        if let Some(author) = &self.author {
            info.author(TextStr(author));
        }
        if let Some(subject) = &self.subject {
            info.subject(TextStr(subject));
        }
        if let Some(keywords) = &self.keywords {
            info.keywords(TextStr(keywords));
        }

        info.creator(TextStr(CREATOR));
        info.producer(TextStr(CREATOR));
        info.creation_date(pdf_date(&Local::now()));
    }
}

/// Convert a timestamp into a PDF date, keeping its UTC offset
fn pdf_date<Tz: TimeZone>(time: &DateTime<Tz>) -> Date {
    let offset = time.offset().fix().local_minus_utc();
    let offset_hours = offset / 3600;
    let offset_minutes = ((offset % 3600) / 60).abs();

    Date::new(time.year() as u16)
        .month(time.month() as u8)
        .day(time.day() as u8)
        .hour(time.hour() as u8)
        .minute(time.minute() as u8)
        .second(time.second() as u8)
        .utc_offset_hour(offset_hours as i8)
        .utc_offset_minute(offset_minutes as u8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    #[test]
    fn builder_sets_fields() {
        let mut info = Info::new();
        info.title("Report").keywords("a, b");
        assert_eq!(info.title.as_deref(), Some("Report"));
        assert_eq!(info.keywords.as_deref(), Some("a, b"));
        assert_eq!(info.author, None);
    }

    #[test]
    fn dates_keep_their_offset() {
        let zone = FixedOffset::west_opt(5 * 3600 + 30 * 60).unwrap();
        let time = zone.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        let mut pdf = Pdf::new();
        pdf.document_info(pdf_writer::Ref::new(1))
            .creation_date(pdf_date(&time));
        let bytes = pdf.finish();
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("(D:20240309140507-05'30"), "{text}");
    }
}
