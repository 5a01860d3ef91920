pub mod feed_file;
pub mod feed_ndjson;

pub use feed_file::FeedFileSource;
pub use feed_ndjson::FeedNdjsonSource;
