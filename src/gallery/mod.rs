/// Slot discovery module
///
/// This module handles:
/// - Probing extension candidates for one slot (resolver.rs)
/// - Memoizing each slot's resolution for the session (cache.rs)
/// - Resolving a whole page of slots concurrently (loader.rs)
///
/// Nothing here knows about iced; the UI consumes `PageResult`s.

pub mod cache;
pub mod loader;
pub mod resolver;

pub use cache::ResolutionCache;
pub use loader::{PageLoader, PageResult};
pub use resolver::{FsProbe, Probe, SlotResolver};

/// Terminal outcome of probing one slot.
///
/// Once settled for a slot it never changes for the lifetime of the session.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Resolution {
    /// The first candidate that loaded.
    Resolved(String),
    /// Every candidate missed. Not an error: the slot is simply skipped.
    Absent,
}

impl Resolution {
    /// The resolved URL, if any
    pub fn url(&self) -> Option<&str> {
        match self {
            Resolution::Resolved(url) => Some(url),
            Resolution::Absent => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Resolution::Resolved(_))
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::{HashMap, HashSet};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use super::Probe;

    /// In-memory file layout that records every probe it receives.
    #[derive(Clone, Default)]
    pub struct MockProbe {
        existing: Arc<HashSet<String>>,
        delays: Arc<HashMap<String, Duration>>,
        panic_on: Arc<HashSet<String>>,
        attempts: Arc<Mutex<Vec<String>>>,
    }

    impl MockProbe {
        pub fn with_files<I, S>(files: I) -> Self
        where
            I: IntoIterator<Item = S>,
            S: Into<String>,
        {
            Self {
                existing: Arc::new(files.into_iter().map(Into::into).collect()),
                ..Self::default()
            }
        }

        /// Delay the answer for `url` by `delay`
        pub fn delay(mut self, url: &str, delay: Duration) -> Self {
            Arc::make_mut(&mut self.delays).insert(url.to_owned(), delay);
            self
        }

        /// Panic when `url` is probed, to simulate a broken pipeline
        pub fn panic_on(mut self, url: &str) -> Self {
            Arc::make_mut(&mut self.panic_on).insert(url.to_owned());
            self
        }

        pub fn attempts(&self) -> Vec<String> {
            self.attempts.lock().unwrap().clone()
        }

        pub fn attempt_count(&self, url: &str) -> usize {
            self.attempts.lock().unwrap().iter().filter(|a| *a == url).count()
        }
    }

    impl Probe for MockProbe {
        async fn probe(&self, url: &str) -> bool {
            self.attempts.lock().unwrap().push(url.to_owned());
            if let Some(delay) = self.delays.get(url) {
                tokio::time::sleep(*delay).await;
            }
            if self.panic_on.contains(url) {
                panic!("probe exploded on {url}");
            }
            self.existing.contains(url)
        }
    }
}
