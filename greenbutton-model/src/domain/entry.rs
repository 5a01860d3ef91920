use std::collections::BTreeMap;

use time::OffsetDateTime;

use super::{IntervalBlock, LocalTimeParameters, ReadingType, UsagePoint};

/// Content of a `MeterReading` entry. ESPI carries no fields here; the
/// reading is only a link hub for its `ReadingType` and `IntervalBlock`s.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MeterReading {}

/// Typed content of an entry, keyed by the ESPI element name.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EntryPayload {
    UsagePoint(UsagePoint),
    MeterReading(MeterReading),
    IntervalBlock(IntervalBlock),
    ReadingType(ReadingType),
    LocalTimeParameters(LocalTimeParameters),
}

/// One decoded Atom entry of a feed.
///
/// `entry_type` and the keys of `related_links` are inferred from the URLs
/// with [`entry_type_of`], so building entries through [`Entry::new`] and
/// [`Entry::with_related`] keeps them consistent.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub self_link: String,
    pub up_link: Option<String>,
    pub related_links: BTreeMap<String, String>,
    pub entry_type: Option<String>,
    pub content: Option<EntryPayload>,
    pub updated: OffsetDateTime,
}

impl Entry {
    pub fn new<S: Into<String>>(self_link: S, updated: OffsetDateTime) -> Self {
        let self_link = self_link.into();
        let entry_type = entry_type_of(&self_link).map(str::to_string);
        Self {
            self_link,
            up_link: None,
            related_links: BTreeMap::new(),
            entry_type,
            content: None,
            updated,
        }
    }

    pub fn with_up_link<S: Into<String>>(mut self, up_link: S) -> Self {
        self.up_link = Some(up_link.into());
        self
    }

    /// Adds a `rel="related"` href. Hrefs without an inferable type are
    /// dropped; a later href of the same type replaces the earlier one.
    pub fn with_related<S: Into<String>>(mut self, href: S) -> Self {
        let href = href.into();
        if let Some(kind) = entry_type_of(&href) {
            self.related_links.insert(kind.to_string(), href);
        }
        self
    }

    pub fn with_content(mut self, content: EntryPayload) -> Self {
        self.content = Some(content);
        self
    }

    pub fn is_type(&self, entry_type: &str) -> bool {
        self.entry_type.as_deref() == Some(entry_type)
    }

    pub fn usage_point(&self) -> Option<&UsagePoint> {
        match &self.content {
            Some(EntryPayload::UsagePoint(u)) => Some(u),
            _ => None,
        }
    }

    pub fn reading_type(&self) -> Option<&ReadingType> {
        match &self.content {
            Some(EntryPayload::ReadingType(r)) => Some(r),
            _ => None,
        }
    }

    pub fn interval_block(&self) -> Option<&IntervalBlock> {
        match &self.content {
            Some(EntryPayload::IntervalBlock(b)) => Some(b),
            _ => None,
        }
    }

    pub fn local_time_parameters(&self) -> Option<&LocalTimeParameters> {
        match &self.content {
            Some(EntryPayload::LocalTimeParameters(p)) => Some(p),
            _ => None,
        }
    }
}

fn is_numeric_id(segment: &str) -> bool {
    !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit())
}

fn is_word(segment: &str) -> bool {
    !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

/// Infers the ESPI resource type from a link URL: the last path segment
/// that is not a numeric id, e.g. `.../UsagePoint/1/MeterReading/2` gives
/// `MeterReading`.
pub fn entry_type_of(url: &str) -> Option<&str> {
    url.rsplit('/')
        .find(|segment| !is_numeric_id(segment))
        .filter(|segment| is_word(segment))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    const BASE: &str = "https://utility.example/DataCustodian/espi/1_1/resource/Subscription/5";

    #[test]
    fn entry_type_is_last_non_numeric_segment() {
        assert_eq!(entry_type_of(&format!("{BASE}/UsagePoint/1")), Some("UsagePoint"));
        assert_eq!(
            entry_type_of(&format!("{BASE}/UsagePoint/1/MeterReading")),
            Some("MeterReading")
        );
        assert_eq!(
            entry_type_of(&format!("{BASE}/UsagePoint/1/MeterReading/3/IntervalBlock/17")),
            Some("IntervalBlock")
        );
        assert_eq!(
            entry_type_of("https://utility.example/espi/LocalTimeParameters/1"),
            Some("LocalTimeParameters")
        );
    }

    #[test]
    fn entry_type_absent_for_trailing_slash_or_punctuation() {
        assert_eq!(entry_type_of(&format!("{BASE}/UsagePoint/")), None);
        assert_eq!(entry_type_of("https://utility.example/usage-point/1"), None);
    }

    #[test]
    fn related_links_are_keyed_by_inferred_type() {
        let entry = Entry::new(format!("{BASE}/UsagePoint/1"), datetime!(2024-01-01 00:00:00 UTC))
            .with_related(format!("{BASE}/UsagePoint/1/MeterReading"))
            .with_related("https://utility.example/espi/LocalTimeParameters/1")
            .with_related("https://utility.example/not-typed/");

        assert_eq!(entry.entry_type.as_deref(), Some("UsagePoint"));
        assert_eq!(entry.related_links.len(), 2);
        assert_eq!(
            entry.related_links.get("MeterReading").map(String::as_str),
            Some(format!("{BASE}/UsagePoint/1/MeterReading").as_str())
        );
        assert!(entry.related_links.contains_key("LocalTimeParameters"));
    }

    #[test]
    fn payload_accessors_match_content_variant() {
        let entry = Entry::new(format!("{BASE}/UsagePoint/1"), datetime!(2024-01-01 00:00:00 UTC))
            .with_content(EntryPayload::UsagePoint(UsagePoint { kind: 0 }));

        assert_eq!(entry.usage_point().map(|u| u.kind), Some(0));
        assert!(entry.reading_type().is_none());
        assert!(entry.is_type("UsagePoint"));
    }
}
