use greenbutton_model::{Entry, EntryPayload};
use serde::Deserialize;
use time::OffsetDateTime;

/// A feed as handed over by the XML decoder: its Atom entries with link
/// hrefs, typed content and update time.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedDocument {
    #[serde(default)]
    pub user_id: Option<String>,
    pub entries: Vec<EntryRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EntryRecord {
    pub self_link: String,
    #[serde(default)]
    pub up_link: Option<String>,
    /// `rel="related"` hrefs, in document order.
    #[serde(default)]
    pub related: Vec<String>,
    #[serde(default)]
    pub content: Option<EntryPayload>,
    #[serde(with = "time::serde::rfc3339")]
    pub updated: OffsetDateTime,
}

impl From<EntryRecord> for Entry {
    fn from(r: EntryRecord) -> Self {
        let mut entry = Entry::new(r.self_link, r.updated);
        if let Some(up) = r.up_link {
            entry = entry.with_up_link(up);
        }
        for href in r.related {
            entry = entry.with_related(href);
        }
        entry.content = r.content;
        entry
    }
}

impl FeedDocument {
    pub fn into_entries(self) -> Vec<Entry> {
        self.entries.into_iter().map(Entry::from).collect()
    }
}
