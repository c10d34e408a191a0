use std::collections::HashSet;
use url::Url;

/// Set of normalized URLs ever enqueued during one crawl session
///
/// The set only grows. Once it holds `cap` URLs, new links are refused, which
/// bounds memory even when pages link to far more URLs than `max_pages`.
#[derive(Debug, Clone)]
pub struct VisitedSet {
    urls: HashSet<String>,
    cap: usize,
}

impl VisitedSet {
    pub fn new(cap: usize) -> Self {
        Self {
            urls: HashSet::new(),
            cap,
        }
    }

    pub fn contains(&self, url: &Url) -> bool {
        self.urls.contains(url.as_str())
    }

    /// True once no further URL may be admitted
    pub fn is_full(&self) -> bool {
        self.urls.len() >= self.cap
    }

    /// Marks a URL visited; returns false if it was already present
    ///
    /// The cap is not checked here so the seed can always be inserted.
    /// Admission policy lives in the scheduler.
    pub fn insert(&mut self, url: &Url) -> bool {
        self.urls.insert(url.as_str().to_string())
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    pub fn cap(&self) -> usize {
        self.cap
    }
}
