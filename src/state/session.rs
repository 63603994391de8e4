/// One gallery session: a fresh cache, the page loader and the pagination
/// controller for a single configured folder.
///
/// Opening another folder builds a new session, so nothing resolved for one
/// folder leaks into another.

use std::future::Future;
use std::sync::Arc;

use crate::config::GalleryConfig;
use crate::error::LoadError;
use crate::gallery::{PageLoader, PageResult, Probe, ResolutionCache, SlotResolver};
use crate::state::pagination::{Navigation, PaginationController};
use crate::ui::render::{self, GalleryView};

pub type PageOutcome = Result<PageResult, LoadError>;

pub struct GallerySession<P> {
    loader: Arc<PageLoader<P>>,
    pagination: PaginationController,
    view: GalleryView,
    columns: u32,
}

impl<P: Probe> GallerySession<P> {
    /// Create a session from a validated config
    pub fn new(config: &GalleryConfig, probe: P) -> Self {
        let cache = Arc::new(ResolutionCache::new());
        let resolver = Arc::new(SlotResolver::new(
            probe,
            config.folder.clone(),
            config.extensions.clone(),
        ));
        let loader = Arc::new(PageLoader::new(
            resolver,
            cache,
            config.total,
            config.page_size,
        ));
        let pagination =
            PaginationController::new(config.total, config.page_size, config.max_buttons);

        tracing::info!(
            folder = %config.folder,
            total = config.total,
            page_size = config.page_size,
            total_pages = pagination.total_pages(),
            extensions = ?config.extensions,
            "gallery session started"
        );

        Self {
            loader,
            pagination,
            view: GalleryView::Loading,
            columns: config.columns.max(1),
        }
    }

    pub fn pagination(&self) -> &PaginationController {
        &self.pagination
    }

    pub fn view(&self) -> &GalleryView {
        &self.view
    }

    pub fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of slots resolved so far in this session
    pub fn cached_slots(&self) -> usize {
        self.loader.cache().len()
    }

    /// Start loading the first page
    pub fn begin(&mut self) -> Navigation {
        let nav = self.pagination.start();
        self.view = GalleryView::Loading;
        nav
    }

    pub fn go_to_page(&mut self, target: i64) -> Option<Navigation> {
        let nav = self.pagination.go_to_page(target);
        self.loading(nav)
    }

    pub fn previous(&mut self) -> Option<Navigation> {
        let nav = self.pagination.previous();
        self.loading(nav)
    }

    pub fn next(&mut self) -> Option<Navigation> {
        let nav = self.pagination.next();
        self.loading(nav)
    }

    fn loading(&mut self, nav: Option<Navigation>) -> Option<Navigation> {
        if nav.is_some() {
            self.view = GalleryView::Loading;
        }
        nav
    }

    /// The load for an accepted navigation, detached from `self`
    pub fn fetch(&self, nav: Navigation) -> impl Future<Output = (u64, PageOutcome)> + Send + 'static {
        let loader = Arc::clone(&self.loader);
        async move { (nav.generation, loader.load_page(nav.page).await) }
    }

    /// Apply a settled load.
    ///
    /// Returns false, changing nothing, when a newer navigation has
    /// superseded `generation`.
    pub fn complete(&mut self, generation: u64, outcome: &PageOutcome) -> bool {
        if !self.pagination.finish(generation) {
            return false;
        }
        if let Err(err) = outcome {
            tracing::error!(page = self.pagination.current_page(), error = %err, "error loading page images");
        }
        self.view = render::render(outcome);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gallery::testing::MockProbe;
    use crate::ui::render::Card;

    fn config(total: u32, page_size: u32) -> GalleryConfig {
        GalleryConfig {
            folder: "g".to_string(),
            total,
            page_size,
            ..GalleryConfig::default()
        }
    }

    #[tokio::test]
    async fn test_first_page_renders_cards() {
        let probe = MockProbe::with_files(["g/2.png", "g/5.png"]);
        let mut session = GallerySession::new(&config(20, 9), probe.clone());

        let nav = session.begin();
        assert_eq!(session.view(), &GalleryView::Loading);
        assert!(session.pagination().is_loading());

        let (generation, outcome) = session.fetch(nav).await;
        assert!(session.complete(generation, &outcome));

        assert!(!session.pagination().is_loading());
        assert_eq!(
            session.view(),
            &GalleryView::Cards(vec![
                Card { slot: 2, url: "g/2.png".to_string() },
                Card { slot: 5, url: "g/5.png".to_string() },
            ])
        );
        assert!(!probe.attempts().contains(&"g/5.jpeg".to_string()));
        assert_eq!(session.cached_slots(), 9);
    }

    #[tokio::test]
    async fn test_empty_page_state() {
        let probe = MockProbe::with_files(["g/1.jpg"]);
        let mut session = GallerySession::new(&config(20, 9), probe);
        session.begin();

        let nav = session.go_to_page(3).unwrap();
        let (generation, outcome) = session.fetch(nav).await;
        session.complete(generation, &outcome);

        assert_eq!(session.view(), &GalleryView::Empty);
    }

    #[tokio::test]
    async fn test_stale_result_is_not_rendered() {
        let probe = MockProbe::with_files(["g/1.jpg", "g/10.jpg"]);
        let mut session = GallerySession::new(&config(20, 9), probe);

        let first = session.begin();
        let second = session.go_to_page(2).unwrap();

        let stale = session.fetch(first).await;
        assert!(!session.complete(stale.0, &stale.1));
        assert_eq!(session.view(), &GalleryView::Loading);
        assert!(session.pagination().is_loading());

        let fresh = session.fetch(second).await;
        assert!(session.complete(fresh.0, &fresh.1));
        assert_eq!(
            session.view(),
            &GalleryView::Cards(vec![Card { slot: 10, url: "g/10.jpg".to_string() }])
        );
    }

    #[tokio::test]
    async fn test_failure_releases_lock() {
        let probe = MockProbe::with_files(["g/1.jpg"]).panic_on("g/3.jpg");
        let mut session = GallerySession::new(&config(9, 9), probe);

        let nav = session.begin();
        let (generation, outcome) = session.fetch(nav).await;
        assert!(session.complete(generation, &outcome));

        assert!(!session.pagination().is_loading());
        assert!(matches!(session.view(), GalleryView::Error(_)));
    }

    #[test]
    fn test_invalid_navigation_keeps_view() {
        let mut session = GallerySession::new(&config(20, 9), MockProbe::default());
        let nav = session.begin();
        session.complete(nav.generation, &Ok(PageResult {
            range: crate::gallery::loader::PageRange::new(1, 9, 20),
            slots: Vec::new(),
        }));

        assert!(session.previous().is_none());
        assert!(session.go_to_page(4).is_none());
        assert_eq!(session.view(), &GalleryView::Empty);
        assert_eq!(session.pagination().current_page(), 1);
    }
}
