/// Threshold comparison for resource snapshots
pub mod thresholds;

/// Keyword-based log line classification
pub mod keyword_filter;

pub use keyword_filter::KeywordFilter;
