//! Topic naming shared by the core and every pane.

/// Topic fired for every slice write, regardless of key.
pub const CHANGE_TOPIC: &str = "state:change";

/// Prefix of key-scoped change topics: `state:change:<key>`.
pub const CHANGE_TOPIC_PREFIX: &str = "state:change:";

/// Returns the key-scoped change topic for `key`.
///
/// ```
/// assert_eq!(panevisor::key_topic("N"), "state:change:N");
/// ```
#[inline]
pub fn key_topic(key: &str) -> String {
    let mut topic = String::with_capacity(CHANGE_TOPIC_PREFIX.len() + key.len());
    topic.push_str(CHANGE_TOPIC_PREFIX);
    topic.push_str(key);
    topic
}

/// Extracts the key from a key-scoped change topic.
///
/// Returns `None` for the generic topic and for application topics.
#[inline]
pub fn key_from_topic(topic: &str) -> Option<&str> {
    topic.strip_prefix(CHANGE_TOPIC_PREFIX)
}
