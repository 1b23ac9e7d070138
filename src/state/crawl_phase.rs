/// Crawl phase definitions
///
/// A run moves `Init → TopicsDiscovered → [TopicSelected → ArticlesDiscovered
/// → ArticlesDownloaded]* → Done`.
use std::fmt;

/// Represents where a crawl run currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlPhase {
    /// Nothing fetched yet
    Init,

    /// Root page fetched and the topic map built
    TopicsDiscovered,

    /// A topic was chosen for crawling
    TopicSelected,

    /// The chosen topic's article links are known
    ArticlesDiscovered,

    /// Every article of the chosen topic was fetched and extracted
    ArticlesDownloaded,

    /// Run finished; no further transitions
    Done,
}

impl CrawlPhase {
    /// Returns true if the orchestrator may move from `self` to `next`
    ///
    /// `TopicSelected → TopicSelected` and `TopicSelected → Done` cover a
    /// topic whose page could not be fetched. Topics may be rediscovered
    /// until the first topic is selected.
    pub fn can_transition_to(&self, next: CrawlPhase) -> bool {
        use CrawlPhase::*;

        matches!(
            (self, next),
            (Init, TopicsDiscovered)
                | (TopicsDiscovered, TopicsDiscovered)
                | (TopicsDiscovered, TopicSelected)
                | (TopicsDiscovered, Done)
                | (TopicSelected, TopicSelected)
                | (TopicSelected, ArticlesDiscovered)
                | (TopicSelected, Done)
                | (ArticlesDiscovered, ArticlesDownloaded)
                | (ArticlesDownloaded, TopicSelected)
                | (ArticlesDownloaded, Done)
        )
    }

    /// Returns true once the run has finished
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Stable lowercase name, used in logs and errors
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::TopicsDiscovered => "topics_discovered",
            Self::TopicSelected => "topic_selected",
            Self::ArticlesDiscovered => "articles_discovered",
            Self::ArticlesDownloaded => "articles_downloaded",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
