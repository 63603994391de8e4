/// Page loading
///
/// Maps a page number to its slot range and resolves every slot in it,
/// answering from the cache where possible and probing the rest concurrently.

use std::ops::RangeInclusive;
use std::sync::Arc;

use tokio::task::JoinSet;

use super::{Probe, Resolution, ResolutionCache, SlotResolver};
use crate::error::LoadError;

/// Number of pages needed for `total` slots, never less than one
pub fn total_pages(total: u32, page_size: u32) -> u32 {
    total.div_ceil(page_size.max(1)).max(1)
}

/// The inclusive slot range covered by one page.
///
/// `start > end` when the page holds no slots (e.g. an empty gallery).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
    pub page: u32,
    pub start: u32,
    pub end: u32,
}

impl PageRange {
    pub fn new(page: u32, page_size: u32, total: u32) -> Self {
        let page_size = page_size.max(1);
        let start = page.saturating_sub(1).saturating_mul(page_size).saturating_add(1);
        let end = total.min(page.saturating_mul(page_size));
        Self { page, start, end }
    }

    pub fn slots(&self) -> RangeInclusive<u32> {
        self.start..=self.end
    }

    pub fn len(&self) -> usize {
        if self.start > self.end {
            0
        } else {
            (self.end - self.start + 1) as usize
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One slot of a loaded page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotResult {
    pub slot: u32,
    pub resolution: Resolution,
}

/// Every slot of a page, ascending by slot index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageResult {
    pub range: PageRange,
    pub slots: Vec<SlotResult>,
}

impl PageResult {
    /// Slots that resolved to an image, in slot order
    pub fn resolved(&self) -> impl Iterator<Item = (u32, &str)> {
        self.slots
            .iter()
            .filter_map(|s| s.resolution.url().map(|url| (s.slot, url)))
    }
}

pub struct PageLoader<P> {
    resolver: Arc<SlotResolver<P>>,
    cache: Arc<ResolutionCache>,
    total: u32,
    page_size: u32,
}

impl<P: Probe> PageLoader<P> {
    pub fn new(
        resolver: Arc<SlotResolver<P>>,
        cache: Arc<ResolutionCache>,
        total: u32,
        page_size: u32,
    ) -> Self {
        Self {
            resolver,
            cache,
            total,
            page_size: page_size.max(1),
        }
    }

    pub fn total_pages(&self) -> u32 {
        total_pages(self.total, self.page_size)
    }

    pub fn range(&self, page: u32) -> PageRange {
        PageRange::new(page, self.page_size, self.total)
    }

    pub fn cache(&self) -> &ResolutionCache {
        &self.cache
    }

    /// Resolve every slot on `page`.
    ///
    /// Cached slots are answered without probing. The rest are resolved
    /// concurrently and the output is in ascending slot order whatever order
    /// the probes finish in. If any resolution task fails to join the whole
    /// page fails.
    pub async fn load_page(&self, page: u32) -> Result<PageResult, LoadError> {
        let total_pages = self.total_pages();
        if page < 1 || page > total_pages {
            return Err(LoadError::PageOutOfRange { page, total_pages });
        }

        let range = self.range(page);
        let mut slots = Vec::with_capacity(range.len());
        let mut tasks = JoinSet::new();

        for slot in range.slots() {
            if let Some(resolution) = self.cache.lookup(slot) {
                slots.push(SlotResult { slot, resolution });
                continue;
            }

            let resolver = Arc::clone(&self.resolver);
            let cache = Arc::clone(&self.cache);
            tasks.spawn(async move {
                let (resolution, probed) = cache
                    .get_or_resolve(slot, move || async move { resolver.resolve(slot).await })
                    .await;
                (SlotResult { slot, resolution }, probed)
            });
        }

        let hits = slots.len();
        let mut probed = 0;
        while let Some(joined) = tasks.join_next().await {
            let (result, ran_probe) = joined?;
            probed += usize::from(ran_probe);
            slots.push(result);
        }

        slots.sort_by_key(|s| s.slot);

        tracing::info!(
            page,
            start = range.start,
            end = range.end,
            cache_hits = hits,
            probed,
            found = slots.iter().filter(|s| s.resolution.is_resolved()).count(),
            "page loaded"
        );

        Ok(PageResult { range, slots })
    }
}
