use std::collections::HashMap;

use greenbutton_model::Entry;

/// What a link URL resolves to in a [`FeedGraph`].
#[derive(Debug, Clone, PartialEq)]
pub enum Related<'a> {
    /// The entry whose self-link is the URL.
    One(&'a Entry),
    /// The entries grouped under the URL as their parent key, in feed order.
    Many(Vec<&'a Entry>),
}

impl<'a> Related<'a> {
    /// Normalizes to a sequence; a single entry becomes a one-element vec.
    pub fn into_vec(self) -> Vec<&'a Entry> {
        match self {
            Related::One(entry) => vec![entry],
            Related::Many(entries) => entries,
        }
    }

    /// The single entry, or the first of a group.
    pub fn first(&self) -> Option<&'a Entry> {
        match self {
            Related::One(entry) => Some(*entry),
            Related::Many(entries) => entries.first().copied(),
        }
    }
}

/// Lookup structure over the entries of one feed, keyed by link URL.
///
/// Every entry is registered under its self-link and appended to the group
/// of its parent key. The parent key is the self-link with a trailing
/// `/<numeric-id>` removed, or the up-link when there is no such suffix.
/// Built once per feed and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct FeedGraph {
    entries: Vec<Entry>,
    by_self: HashMap<String, usize>,
    children: HashMap<String, Vec<usize>>,
}

fn strip_numeric_id(link: &str) -> Option<&str> {
    let (head, id) = link.rsplit_once('/')?;
    if !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()) {
        Some(head)
    } else {
        None
    }
}

/// Key of the group an entry belongs to.
pub fn parent_key(entry: &Entry) -> Option<&str> {
    strip_numeric_id(&entry.self_link).or(entry.up_link.as_deref())
}

impl FeedGraph {
    pub fn build<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = Entry>,
    {
        let mut graph = FeedGraph::default();

        for entry in entries {
            let idx = graph.entries.len();
            graph.by_self.insert(entry.self_link.clone(), idx);

            match parent_key(&entry) {
                Some(key) => graph.children.entry(key.to_string()).or_default().push(idx),
                None => tracing::debug!(self_link = %entry.self_link, "entry has no parent key"),
            }

            graph.entries.push(entry);
        }

        graph
    }

    /// Resolves a URL. A self-link takes precedence over a group with the
    /// same key.
    pub fn get(&self, url: &str) -> Option<Related<'_>> {
        if let Some(&idx) = self.by_self.get(url) {
            return Some(Related::One(&self.entries[idx]));
        }
        self.children
            .get(url)
            .map(|group| Related::Many(group.iter().map(|&i| &self.entries[i]).collect()))
    }

    /// Follows the `related_type` link of `entry`. `None` when the entry has
    /// no such link or nothing in the feed is stored under it.
    pub fn get_related(&self, entry: &Entry, related_type: &str) -> Option<Related<'_>> {
        let url = entry.related_links.get(related_type)?;
        self.get(url)
    }

    /// Entries in feed order. When self-links repeat, only the last entry
    /// registered under that link is yielded.
    pub fn entries(&self) -> impl Iterator<Item = &Entry> + '_ {
        self.entries
            .iter()
            .enumerate()
            .filter(|(idx, entry)| self.by_self.get(&entry.self_link) == Some(idx))
            .map(|(_, entry)| entry)
    }

    pub fn entries_of_type<'a>(&'a self, entry_type: &'a str) -> impl Iterator<Item = &'a Entry> + 'a {
        self.entries().filter(move |entry| entry.is_type(entry_type))
    }

    /// Every key the graph resolves, self-links and parent keys alike.
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.by_self
            .keys()
            .chain(self.children.keys().filter(|k| !self.by_self.contains_key(*k)))
            .map(String::as_str)
    }

    pub fn children(&self, key: &str) -> Vec<&Entry> {
        self.children
            .get(key)
            .map(|group| group.iter().map(|&i| &self.entries[i]).collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
