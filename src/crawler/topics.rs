//! Topic registry
//!
//! Maps a topic name (the last non-empty path segment of its section URL)
//! to the section URL. Iteration follows discovery order.

use crate::{HarvestError, Result};
use serde::Deserialize;

/// What happens when two topic links derive the same name
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicateTopicPolicy {
    /// Later link wins; the name keeps its first position
    #[default]
    Overwrite,
    /// Fail with [`HarvestError::DuplicateTopic`]
    Reject,
}

/// Derives the topic name from a section URL
///
/// # Example
///
/// ```
/// use topic_harvest::crawler::topic_name;
///
/// assert_eq!(topic_name("https://x.test/a/b/"), Some("b"));
/// assert_eq!(topic_name("https://x.test/a/b"), Some("b"));
/// assert_eq!(topic_name("/"), None);
/// ```
pub fn topic_name(url: &str) -> Option<&str> {
    url.split('/').rfind(|segment| !segment.is_empty())
}

/// Ordered topic name → section URL mapping
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopicMap {
    entries: Vec<(String, String)>,
}

impl TopicMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a map from topic links in discovery order
    ///
    /// Links without a non-empty path segment are skipped.
    pub fn build<I, S>(links: I, policy: DuplicateTopicPolicy) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut map = Self::new();
        for link in links {
            let link = link.as_ref();
            match topic_name(link) {
                Some(name) => map.insert(name, link, policy)?,
                None => tracing::debug!("Skipping topic link without a name: {:?}", link),
            }
        }
        Ok(map)
    }

    /// Adds or replaces one topic according to `policy`
    pub fn insert(&mut self, name: &str, url: &str, policy: DuplicateTopicPolicy) -> Result<()> {
        match self.entries.iter_mut().find(|(key, _)| key == name) {
            None => self.entries.push((name.to_string(), url.to_string())),
            Some((_, existing)) if existing == url => {}
            Some((_, existing)) => match policy {
                DuplicateTopicPolicy::Overwrite => {
                    tracing::debug!("Topic '{}' now points at {} (was {})", name, url, existing);
                    *existing = url.to_string();
                }
                DuplicateTopicPolicy::Reject => {
                    return Err(HarvestError::DuplicateTopic {
                        name: name.to_string(),
                        first: existing.clone(),
                        second: url.to_string(),
                    });
                }
            },
        }
        Ok(())
    }

    /// Removes the named topics; names not present are ignored
    pub fn drop_topics<S: AsRef<str>>(&mut self, names: &[S]) {
        self.entries
            .retain(|(key, _)| !names.iter().any(|name| name.as_ref() == key));
    }

    /// Keeps only the named topics that are present
    pub fn keep_topics<S: AsRef<str>>(&mut self, names: &[S]) {
        self.entries
            .retain(|(key, _)| names.iter().any(|name| name.as_ref() == key));
    }

    /// Looks up a topic URL, failing with `UnknownTopic`
    pub fn resolve(&self, name: &str) -> Result<&str> {
        self.get(name).ok_or_else(|| HarvestError::UnknownTopic {
            name: name.to_string(),
        })
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, url)| url.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, url)| (name.as_str(), url.as_str()))
    }
}
