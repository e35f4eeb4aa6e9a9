#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Interactive prefecture comparison session.
//!
//! A [`Session`] owns all mutable state: the prefecture directory, the
//! user's selection, the active category, and the fetched series. Selection
//! operations return immediately after spawning whatever fetches they need.
//! Spawned requests report back through a channel as [`SessionEvent`]s,
//! which the session applies one at a time in arrival order via
//! [`Session::pump`], [`Session::process_next`], or [`Session::settle`].

pub mod directory;
pub mod fetcher;
pub mod selection;

use std::collections::BTreeSet;
use std::sync::Arc;

use resas_chart_api::PopulationProvider;
use resas_chart_chart::ChartView;
use resas_chart_population_models::{PopulationCategory, Prefecture, SeriesStore};
use resas_chart_region_models::{PrefCode, RegionIndex};
use tokio::sync::mpsc;

pub use directory::{DirectoryError, DirectoryState};
pub use fetcher::{SeriesError, SeriesFetcher, SeriesResponse, WritePolicy};
pub use selection::SelectionState;

/// Completion messages from spawned requests.
#[derive(Debug)]
pub enum SessionEvent {
    /// The directory request finished.
    Directory(Result<Vec<Prefecture>, DirectoryError>),
    /// A series request finished.
    Series(SeriesResponse),
}

/// Top-level view: the directory error replaces everything else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionView {
    /// Directory still loading.
    Loading,
    /// Directory failed; show this message instead of the UI.
    Failed(String),
    /// Directory loaded; chart area state.
    Ready(ChartView),
}

/// State owner for one comparison session.
pub struct Session {
    directory: DirectoryState,
    selection: SelectionState,
    fetcher: SeriesFetcher,
    rx: mpsc::UnboundedReceiver<SessionEvent>,
    index: &'static RegionIndex,
}

impl Session {
    /// Starts a session with [`WritePolicy::LastWriteWins`] and issues the
    /// directory request.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn new(provider: Arc<dyn PopulationProvider>) -> Self {
        Self::with_policy(provider, WritePolicy::default())
    }

    /// Starts a session with an explicit write policy.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn with_policy(provider: Arc<dyn PopulationProvider>, policy: WritePolicy) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();

        directory::spawn_load(Arc::clone(&provider), tx.clone());

        Self {
            directory: DirectoryState::Loading,
            selection: SelectionState::new(),
            fetcher: SeriesFetcher::new(provider, tx, policy),
            rx,
            index: RegionIndex::canonical(),
        }
    }

    /// Directory lifecycle state.
    #[must_use]
    pub const fn directory(&self) -> &DirectoryState {
        &self.directory
    }

    /// Loaded prefectures (empty until the directory arrives).
    #[must_use]
    pub fn prefectures(&self) -> &[Prefecture] {
        self.directory.prefectures()
    }

    /// Currently selected codes.
    #[must_use]
    pub const fn selected(&self) -> &BTreeSet<PrefCode> {
        self.selection.selected()
    }

    /// Active category.
    #[must_use]
    pub const fn category(&self) -> PopulationCategory {
        self.selection.category()
    }

    /// Fetched series.
    #[must_use]
    pub const fn store(&self) -> &SeriesStore {
        self.fetcher.store()
    }

    /// Returns `true` while the directory or any series request is pending.
    #[must_use]
    pub const fn is_busy(&self) -> bool {
        matches!(self.directory, DirectoryState::Loading) || self.fetcher.in_flight() > 0
    }

    /// Number of series requests not yet applied.
    #[must_use]
    pub const fn pending_fetches(&self) -> usize {
        self.fetcher.in_flight()
    }

    /// Selects `code` and fetches it, or deselects it without fetching.
    pub fn toggle(&mut self, code: PrefCode) {
        if self.selection.toggle(code) {
            self.fetcher.fetch_series(code, self.selection.category());
        }
    }

    /// Selects every loaded prefecture and fetches each one.
    pub fn select_all(&mut self) {
        let codes = self
            .selection
            .select_all(self.directory.prefectures().iter().map(|p| p.code));
        let category = self.selection.category();
        for code in codes {
            self.fetcher.fetch_series(code, category);
        }
    }

    /// Clears the selection and every stored series.
    pub fn reset(&mut self) {
        self.selection.reset();
        self.fetcher.clear_series();
    }

    /// Switches category and re-fetches every selected prefecture.
    pub fn change_category(&mut self, category: PopulationCategory) {
        log::info!("Switching category to {category}");
        for code in self.selection.change_category(category) {
            self.fetcher.fetch_series(code, category);
        }
    }

    fn apply(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Directory(outcome) => self.directory.apply(outcome),
            SessionEvent::Series(response) => self.fetcher.apply(response),
        }
    }

    /// Applies every event already queued without waiting. Returns how many
    /// were applied.
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.rx.try_recv() {
            self.apply(event);
            applied += 1;
        }
        applied
    }

    /// Waits for the next event and applies it.
    ///
    /// Returns `false` if the channel is closed.
    pub async fn process_next(&mut self) -> bool {
        match self.rx.recv().await {
            Some(event) => {
                self.apply(event);
                true
            }
            None => false,
        }
    }

    /// Waits until the directory and every issued series request have
    /// completed.
    ///
    /// Requests carry no timeout of their own, so a hung request keeps this
    /// pending.
    pub async fn settle(&mut self) {
        while self.is_busy() {
            if !self.process_next().await {
                break;
            }
        }
    }

    /// Derives what should be displayed right now.
    #[must_use]
    pub fn view(&self) -> SessionView {
        match &self.directory {
            DirectoryState::Loading => SessionView::Loading,
            DirectoryState::Failed(e) => SessionView::Failed(e.to_string()),
            DirectoryState::Loaded(prefectures) => SessionView::Ready(ChartView::build(
                self.selection.selected(),
                self.fetcher.store(),
                prefectures,
                self.index,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, VecDeque};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use resas_chart_api::ApiError;
    use resas_chart_population_models::{
        CompositionBucket, CompositionResponse, CompositionResult, SeriesPoint,
    };
    use tokio::sync::oneshot;

    use super::*;

    fn prefectures(codes: &[PrefCode]) -> Vec<Prefecture> {
        codes
            .iter()
            .map(|&code| Prefecture {
                code,
                name: format!("pref-{code}"),
            })
            .collect()
    }

    /// Composition whose bucket `i` holds one point valued `base + i`.
    fn composition(year: i32, base: i64) -> CompositionResponse {
        CompositionResponse {
            result: CompositionResult {
                boundary_year: None,
                data: PopulationCategory::ALL
                    .iter()
                    .map(|c| CompositionBucket {
                        label: c.label_ja().to_string(),
                        data: vec![SeriesPoint {
                            year,
                            value: base + i64::try_from(c.bucket_index()).unwrap(),
                        }],
                    })
                    .collect(),
            },
        }
    }

    /// Answers immediately from fixed tables.
    struct StaticProvider {
        directory: Result<Vec<Prefecture>, u16>,
        series: BTreeMap<PrefCode, CompositionResponse>,
        directory_calls: AtomicUsize,
        calls: AtomicUsize,
    }

    impl StaticProvider {
        fn new(codes: &[PrefCode]) -> Self {
            Self {
                directory: Ok(prefectures(codes)),
                series: codes
                    .iter()
                    .map(|&c| (c, composition(2000, i64::from(c) * 100)))
                    .collect(),
                directory_calls: AtomicUsize::new(0),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl PopulationProvider for StaticProvider {
        async fn prefectures(&self) -> Result<Vec<Prefecture>, ApiError> {
            self.directory_calls.fetch_add(1, Ordering::SeqCst);
            self.directory.clone().map_err(|status| ApiError::Status {
                status,
                url: "test://prefectures".to_string(),
            })
        }

        async fn composition(&self, code: PrefCode) -> Result<CompositionResponse, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.series
                .get(&code)
                .cloned()
                .ok_or_else(|| ApiError::Status {
                    status: 404,
                    url: format!("test://composition/{code}"),
                })
        }
    }

    /// Holds each composition call until the test releases it.
    struct GatedProvider {
        directory: Vec<Prefecture>,
        gates: Mutex<VecDeque<oneshot::Receiver<CompositionResponse>>>,
    }

    impl GatedProvider {
        fn new(codes: &[PrefCode], calls: usize) -> (Self, Vec<oneshot::Sender<CompositionResponse>>) {
            let (senders, receivers): (Vec<_>, VecDeque<_>) =
                (0..calls).map(|_| oneshot::channel()).unzip();
            (
                Self {
                    directory: prefectures(codes),
                    gates: Mutex::new(receivers),
                },
                senders,
            )
        }
    }

    #[async_trait]
    impl PopulationProvider for GatedProvider {
        async fn prefectures(&self) -> Result<Vec<Prefecture>, ApiError> {
            Ok(self.directory.clone())
        }

        async fn composition(&self, code: PrefCode) -> Result<CompositionResponse, ApiError> {
            let gate = self.gates.lock().unwrap().pop_front();
            let Some(gate) = gate else {
                return Err(ApiError::Payload {
                    message: format!("unexpected call for {code}"),
                });
            };
            gate.await.map_err(|_| ApiError::Payload {
                message: "gate dropped".to_string(),
            })
        }
    }

    /// Panics inside the directory request.
    #[derive(Default)]
    struct PanickingProvider {
        directory_calls: AtomicUsize,
    }

    #[async_trait]
    impl PopulationProvider for PanickingProvider {
        async fn prefectures(&self) -> Result<Vec<Prefecture>, ApiError> {
            self.directory_calls.fetch_add(1, Ordering::SeqCst);
            panic!("directory loader crashed");
        }

        async fn composition(&self, code: PrefCode) -> Result<CompositionResponse, ApiError> {
            Err(ApiError::Payload {
                message: format!("unexpected call for {code}"),
            })
        }
    }

    async fn loaded(provider: Arc<dyn PopulationProvider>, policy: WritePolicy) -> Session {
        let mut session = Session::with_policy(provider, policy);
        session.settle().await;
        session
    }

    fn stored_value(session: &Session, code: PrefCode) -> Option<i64> {
        session.store().get(code).map(|s| s[0].value)
    }

    #[tokio::test]
    async fn directory_loads_once() {
        let provider = Arc::new(StaticProvider::new(&[1, 2]));
        let mut session = loaded(provider.clone(), WritePolicy::default()).await;
        assert_eq!(session.prefectures().len(), 2);
        assert_eq!(
            session.view(),
            SessionView::Ready(ChartView::NoSelection)
        );

        session.toggle(1);
        session.select_all();
        session.change_category(PopulationCategory::Youth);
        session.reset();
        session.settle().await;

        assert_eq!(provider.directory_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn crashed_directory_loader_reports_unknown_error() {
        let provider = Arc::new(PanickingProvider::default());
        let session = loaded(provider.clone(), WritePolicy::default()).await;

        assert_eq!(
            session.view(),
            SessionView::Failed("An unknown error occurred".to_string())
        );
        assert!(!session.is_busy());
        assert!(session.prefectures().is_empty());
        assert_eq!(provider.directory_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn directory_status_failure_replaces_view() {
        let provider = StaticProvider {
            directory: Err(500),
            series: BTreeMap::new(),
            directory_calls: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
        };
        let session = loaded(Arc::new(provider), WritePolicy::default()).await;
        assert_eq!(
            session.view(),
            SessionView::Failed("Failed to fetch prefectures".to_string())
        );
    }

    #[tokio::test]
    async fn view_is_loading_before_directory_arrives() {
        let session = Session::new(Arc::new(StaticProvider::new(&[1])));
        assert_eq!(session.view(), SessionView::Loading);
        assert!(session.is_busy());
    }

    #[tokio::test]
    async fn toggle_fetches_and_charts() {
        let provider = Arc::new(StaticProvider::new(&[13, 27]));
        let mut session = loaded(provider.clone(), WritePolicy::default()).await;

        session.toggle(27);
        session.toggle(13);
        assert_eq!(session.pending_fetches(), 2);
        session.settle().await;

        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
        assert_eq!(stored_value(&session, 13), Some(1300));
        assert_eq!(stored_value(&session, 27), Some(2700));

        let SessionView::Ready(ChartView::Chart { series, table }) = session.view() else {
            panic!("expected chart");
        };
        assert_eq!(series.iter().map(|s| s.code).collect::<Vec<_>>(), vec![13, 27]);
        assert_eq!(table.len(), 1);
    }

    #[tokio::test]
    async fn toggle_off_removes_from_chart_but_keeps_store() {
        let mut session = loaded(
            Arc::new(StaticProvider::new(&[13, 27])),
            WritePolicy::default(),
        )
        .await;

        session.toggle(13);
        session.toggle(27);
        session.settle().await;
        session.toggle(13);
        assert_eq!(session.pending_fetches(), 0);

        assert!(session.store().get(13).is_some());
        let SessionView::Ready(view) = session.view() else {
            panic!("expected ready view");
        };
        assert_eq!(view.series().iter().map(|s| s.code).collect::<Vec<_>>(), vec![27]);
        let ChartView::Chart { table, .. } = view else {
            panic!("expected chart");
        };
        assert!(table.rows().iter().all(|row| row.value(13).is_none()));
    }

    #[tokio::test]
    async fn pending_selection_shows_no_data() {
        let (provider, gates) = GatedProvider::new(&[13], 1);
        let mut session = loaded(Arc::new(provider), WritePolicy::default()).await;

        session.toggle(13);
        session.pump();
        assert_eq!(session.view(), SessionView::Ready(ChartView::NoData));
        drop(gates);
    }

    #[tokio::test]
    async fn failed_series_is_silent() {
        let mut provider = StaticProvider::new(&[13, 27]);
        provider.series.remove(&27);
        let mut session = loaded(Arc::new(provider), WritePolicy::default()).await;

        session.toggle(13);
        session.toggle(27);
        session.settle().await;

        assert!(session.store().get(27).is_none());
        let SessionView::Ready(view) = session.view() else {
            panic!("expected ready view");
        };
        assert!(matches!(view, ChartView::Chart { .. }));
    }

    #[tokio::test]
    async fn change_category_refetches_selection() {
        let provider = Arc::new(StaticProvider::new(&[1, 2, 3]));
        let mut session = loaded(provider.clone(), WritePolicy::default()).await;

        session.toggle(1);
        session.toggle(3);
        session.settle().await;
        session.change_category(PopulationCategory::Elderly);
        assert_eq!(session.pending_fetches(), 2);
        session.settle().await;

        assert_eq!(provider.calls.load(Ordering::SeqCst), 4);
        assert_eq!(session.category(), PopulationCategory::Elderly);
        assert_eq!(stored_value(&session, 1), Some(103));
        assert_eq!(stored_value(&session, 3), Some(303));
        assert!(session.store().get(2).is_none());
    }

    #[tokio::test]
    async fn select_all_then_reset_clears_everything() {
        let provider = Arc::new(StaticProvider::new(&[1, 2, 3]));
        let mut session = loaded(provider.clone(), WritePolicy::default()).await;

        session.select_all();
        assert_eq!(session.selected().len(), 3);
        session.settle().await;
        assert_eq!(session.store().len(), 3);

        session.reset();
        assert!(session.selected().is_empty());
        assert!(session.store().is_empty());
        assert_eq!(session.view(), SessionView::Ready(ChartView::NoSelection));
    }

    #[tokio::test]
    async fn stale_response_arriving_last_overwrites() {
        let (provider, mut gates) = GatedProvider::new(&[13], 2);
        let mut session = loaded(Arc::new(provider), WritePolicy::LastWriteWins).await;

        session.toggle(13);
        session.change_category(PopulationCategory::Youth);

        let old = gates.remove(0);
        let new = gates.remove(0);

        new.send(composition(2000, 500)).unwrap();
        assert!(session.process_next().await);
        assert_eq!(stored_value(&session, 13), Some(501));

        old.send(composition(2000, 900)).unwrap();
        session.settle().await;
        // Total bucket of the older request.
        assert_eq!(stored_value(&session, 13), Some(900));
    }

    #[tokio::test]
    async fn latest_request_policy_discards_stale_response() {
        let (provider, mut gates) = GatedProvider::new(&[13], 2);
        let mut session = loaded(Arc::new(provider), WritePolicy::LatestRequestWins).await;

        session.toggle(13);
        session.change_category(PopulationCategory::Youth);

        let old = gates.remove(0);
        let new = gates.remove(0);

        new.send(composition(2000, 500)).unwrap();
        assert!(session.process_next().await);
        old.send(composition(2000, 900)).unwrap();
        session.settle().await;

        assert_eq!(stored_value(&session, 13), Some(501));
        assert_eq!(session.pending_fetches(), 0);
    }

    #[tokio::test]
    async fn in_order_responses_converge_to_active_category() {
        let (provider, mut gates) = GatedProvider::new(&[13], 2);
        let mut session = loaded(Arc::new(provider), WritePolicy::LastWriteWins).await;

        session.toggle(13);
        session.change_category(PopulationCategory::WorkingAge);

        let old = gates.remove(0);
        let new = gates.remove(0);

        old.send(composition(2000, 900)).unwrap();
        assert!(session.process_next().await);
        new.send(composition(2000, 500)).unwrap();
        session.settle().await;

        assert_eq!(stored_value(&session, 13), Some(502));
    }
}
