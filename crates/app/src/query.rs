//! Debounced search and pagination over the notes list.
//!
//! [`QueryController`] is an actor task that owns the search input, the
//! debounced search text and the page number. The effective [`QueryKey`]
//! is `(debounced search, page)`; whenever it changes the controller serves
//! the cached page or fetches it, showing the last successful page as a
//! placeholder meanwhile. Front ends talk to the actor through a cloneable
//! [`QueryHandle`] and observe [`QueryView`] snapshots through a `watch`
//! channel.
//!
//! Ordering: every fetch carries a request id, and a completion is applied
//! only if it belongs to the latest request for the current key. Results
//! for superseded keys are dropped without touching the cache.

use std::sync::Arc;
use std::time::Duration;

use notehub_client::{NotesApi, NotesApiError, DEFAULT_PAGE_SIZE};
use notehub_core::{Note, NotePage};
use notehub_events::{EventBus, NotesEvent};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::cache::QueryCache;
use crate::debounce::Debouncer;

/// Cache namespace for every notes list query.
pub const NOTES_NAMESPACE: &str = "notes";

/// Default quiet period before a search edit takes effect.
pub const DEFAULT_SEARCH_DEBOUNCE: Duration = Duration::from_millis(1000);

/// Cache of list results keyed by [`QueryKey`].
pub type NotesCache = QueryCache<QueryKey, NotePage>;

// ---------------------------------------------------------------------------
// Key / view types
// ---------------------------------------------------------------------------

/// Inputs that identify one list result.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    /// Debounced search text, untrimmed.
    pub search: String,
    /// 1-based page number.
    pub page: u32,
}

impl QueryKey {
    pub fn new(search: impl Into<String>, page: u32) -> Self {
        Self {
            search: search.into(),
            page,
        }
    }
}

impl Default for QueryKey {
    fn default() -> Self {
        Self::new("", 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
    Idle,
    Loading,
    Success,
    Error,
}

/// Pagination widget input; only produced when there is more than one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub current_page: u32,
    pub total_pages: u32,
}

/// Snapshot of everything a list view needs to render.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryView {
    /// Text currently shown in the search box.
    pub search_input: String,
    /// Effective key: debounced search and current page.
    pub key: QueryKey,
    pub status: QueryStatus,
    /// Result for `key`, or the previous key's result while loading.
    pub data: Option<NotePage>,
    /// `data` belongs to a previous key.
    pub is_placeholder: bool,
    /// A request for `key` is in flight.
    pub is_fetching: bool,
    /// Failure of the latest request for `key`.
    pub error: Option<NotesApiError>,
}

impl QueryView {
    fn initial() -> Self {
        Self {
            search_input: String::new(),
            key: QueryKey::default(),
            status: QueryStatus::Idle,
            data: None,
            is_placeholder: false,
            is_fetching: false,
            error: None,
        }
    }

    /// Loading with nothing to show yet.
    pub fn is_loading(&self) -> bool {
        self.status == QueryStatus::Loading && self.data.is_none()
    }

    pub fn total_pages(&self) -> Option<u32> {
        self.data.as_ref().map(|page| page.total_pages)
    }

    pub fn pagination(&self) -> Option<Pagination> {
        match self.total_pages() {
            Some(total_pages) if total_pages > 1 => Some(Pagination {
                current_page: self.key.page,
                total_pages,
            }),
            _ => None,
        }
    }

    /// Notes to render; empty while loading.
    pub fn notes(&self) -> &[Note] {
        match &self.data {
            Some(page) if !self.is_loading() => &page.notes,
            _ => &[],
        }
    }
}

#[derive(Debug, Clone)]
pub struct QueryConfig {
    /// `perPage` for list requests.
    pub page_size: u32,
    /// Quiet period before a search edit becomes the effective search.
    pub search_debounce: Duration,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            search_debounce: DEFAULT_SEARCH_DEBOUNCE,
        }
    }
}

// ---------------------------------------------------------------------------
// Handle
// ---------------------------------------------------------------------------

enum Message {
    SetSearch(String),
    SetPage(u32),
    NextPage,
    PrevPage,
    Refetch,
    SearchSettled {
        generation: u64,
        search: String,
    },
    FetchDone {
        request_id: u64,
        key: QueryKey,
        result: Result<NotePage, NotesApiError>,
    },
}

/// Cloneable front-end handle to a running [`QueryController`].
///
/// Intents are fire-and-forget; their effect shows up in the next
/// [`QueryView`]. Intents sent after the controller stopped are dropped.
#[derive(Clone)]
pub struct QueryHandle {
    tx: mpsc::UnboundedSender<Message>,
    view: watch::Receiver<QueryView>,
}

impl QueryHandle {
    /// Edit the search text. Resets the page to 1 immediately; the search
    /// itself takes effect after the quiet period.
    pub fn set_search(&self, text: impl Into<String>) {
        self.send(Message::SetSearch(text.into()));
    }

    /// Jump to `page` (clamped to at least 1) without debounce.
    pub fn set_page(&self, page: u32) {
        self.send(Message::SetPage(page));
    }

    pub fn next_page(&self) {
        self.send(Message::NextPage);
    }

    pub fn prev_page(&self) {
        self.send(Message::PrevPage);
    }

    /// Refetch the current key regardless of cache state.
    pub fn refetch(&self) {
        self.send(Message::Refetch);
    }

    /// Current snapshot.
    pub fn view(&self) -> QueryView {
        self.view.borrow().clone()
    }

    /// A receiver notified on every view change.
    pub fn subscribe(&self) -> watch::Receiver<QueryView> {
        self.view.clone()
    }

    fn send(&self, message: Message) {
        if self.tx.send(message).is_err() {
            tracing::debug!("Query controller stopped; intent dropped");
        }
    }
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

/// Actor owning the search/page state and the list fetch lifecycle.
pub struct QueryController {
    api: Arc<dyn NotesApi>,
    cache: Arc<NotesCache>,
    config: QueryConfig,
    tx: mpsc::UnboundedSender<Message>,
    debouncer: Debouncer,
    state: watch::Sender<QueryView>,
    view: QueryView,
    latest_request: u64,
    /// Invalidation epoch already reflected by the shown data or the
    /// in-flight request for the current key.
    served_epoch: Option<u64>,
    /// Last applied successful result, used as placeholder data.
    last_success: Option<NotePage>,
}

impl QueryController {
    /// Start the controller and fetch the initial key `("", 1)`.
    ///
    /// The actor runs until `cancel` is triggered. It subscribes to `bus`
    /// and refetches its active key whenever the notes namespace is
    /// invalidated.
    pub fn spawn(
        api: Arc<dyn NotesApi>,
        cache: Arc<NotesCache>,
        bus: &EventBus,
        config: QueryConfig,
        cancel: CancellationToken,
    ) -> (QueryHandle, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let (state, view_rx) = watch::channel(QueryView::initial());
        let events = bus.subscribe();

        let controller = Self {
            api,
            cache,
            debouncer: Debouncer::new(config.search_debounce),
            config,
            tx: tx.clone(),
            state,
            view: QueryView::initial(),
            latest_request: 0,
            served_epoch: None,
            last_success: None,
        };

        let task = tokio::spawn(controller.run(rx, events, cancel));
        (QueryHandle { tx, view: view_rx }, task)
    }

    async fn run(
        mut self,
        mut rx: mpsc::UnboundedReceiver<Message>,
        mut events: broadcast::Receiver<NotesEvent>,
        cancel: CancellationToken,
    ) {
        tracing::info!(
            page_size = self.config.page_size,
            debounce_ms = self.config.search_debounce.as_millis() as u64,
            "Query controller started",
        );

        let initial = self.view.key.clone();
        self.change_key(initial).await;

        let mut events_open = true;
        loop {
            // Invalidations are applied before queued intents.
            tokio::select! {
                biased;

                _ = cancel.cancelled() => {
                    tracing::info!("Query controller stopping");
                    break;
                }
                event = events.recv(), if events_open => match event {
                    Ok(event) if event.invalidates(NOTES_NAMESPACE) => self.on_invalidated().await,
                    Ok(_) => {}
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Event receiver lagged, refetching");
                        self.start_fetch().await;
                    }
                    Err(RecvError::Closed) => events_open = false,
                },
                message = rx.recv() => match message {
                    Some(message) => self.handle(message).await,
                    None => break,
                },
            }
        }

        self.debouncer.cancel();
    }

    async fn handle(&mut self, message: Message) {
        match message {
            Message::SetSearch(text) => self.on_search_input(text).await,
            Message::SetPage(page) => {
                let key = QueryKey::new(self.view.key.search.clone(), page.max(1));
                self.change_key(key).await;
            }
            Message::NextPage => {
                let page = self.view.key.page;
                let has_next = self.view.total_pages().is_some_and(|total| page < total);
                if has_next {
                    let key = QueryKey::new(self.view.key.search.clone(), page + 1);
                    self.change_key(key).await;
                }
            }
            Message::PrevPage => {
                let page = self.view.key.page;
                if page > 1 {
                    let key = QueryKey::new(self.view.key.search.clone(), page - 1);
                    self.change_key(key).await;
                }
            }
            Message::Refetch => self.start_fetch().await,
            Message::SearchSettled { generation, search } => {
                if !self.debouncer.settle(generation) {
                    tracing::trace!(generation, "Ignoring superseded search timer");
                    return;
                }
                let key = QueryKey::new(search, self.view.key.page);
                self.change_key(key).await;
            }
            Message::FetchDone {
                request_id,
                key,
                result,
            } => self.on_fetch_done(request_id, key, result).await,
        }
    }

    async fn on_search_input(&mut self, text: String) {
        self.view.search_input = text.clone();

        let tx = self.tx.clone();
        self.debouncer.schedule(move |generation| {
            let _ = tx.send(Message::SearchSettled {
                generation,
                search: text,
            });
        });

        // The page resets now; the search text follows after the quiet period.
        let key = QueryKey::new(self.view.key.search.clone(), 1);
        self.change_key(key).await;
    }

    /// Make `key` the effective key and serve it from cache or network.
    async fn change_key(&mut self, key: QueryKey) {
        if key == self.view.key && self.view.status != QueryStatus::Idle {
            self.publish();
            return;
        }

        tracing::debug!(search = %key.search, page = key.page, "Query key changed");
        self.view.key = key.clone();
        self.view.error = None;

        match self.cache.get(NOTES_NAMESPACE, &key).await {
            Some(cached) if !cached.stale => {
                // Nothing in flight may land on top of a cache hit.
                self.latest_request += 1;
                self.view.status = QueryStatus::Success;
                self.view.is_placeholder = false;
                self.view.is_fetching = false;
                self.view.data = Some(cached.value.clone());
                self.served_epoch = Some(cached.epoch);
                self.last_success = Some(cached.value);
                self.publish();
            }
            Some(cached) => {
                self.view.status = QueryStatus::Loading;
                self.view.is_placeholder = false;
                self.view.data = Some(cached.value);
                self.start_fetch().await;
            }
            None => {
                self.view.status = QueryStatus::Loading;
                self.view.is_placeholder = self.last_success.is_some();
                self.view.data = self.last_success.clone();
                self.start_fetch().await;
            }
        }
    }

    /// Refetch the current key unless what is shown or in flight already
    /// postdates the latest invalidation.
    async fn on_invalidated(&mut self) {
        let epoch = self.cache.epoch(NOTES_NAMESPACE).await;
        if self.served_epoch == Some(epoch) {
            tracing::debug!(epoch, key = ?self.view.key, "Invalidation already covered");
            return;
        }
        tracing::debug!(epoch, key = ?self.view.key, "Notes invalidated, refetching");
        self.start_fetch().await;
    }

    /// Issue a list request for the current key. Earlier requests stay on
    /// the wire but their results will be ignored.
    async fn start_fetch(&mut self) {
        self.served_epoch = Some(self.cache.epoch(NOTES_NAMESPACE).await);
        self.latest_request += 1;
        let request_id = self.latest_request;
        let key = self.view.key.clone();
        let per_page = self.config.page_size;

        self.view.is_fetching = true;
        self.publish();

        tracing::debug!(request_id, search = %key.search, page = key.page, "Fetching notes");

        let api = self.api.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = api.list(&key.search, key.page, per_page).await;
            let _ = tx.send(Message::FetchDone {
                request_id,
                key,
                result,
            });
        });
    }

    async fn on_fetch_done(
        &mut self,
        request_id: u64,
        key: QueryKey,
        result: Result<NotePage, NotesApiError>,
    ) {
        if key != self.view.key || request_id != self.latest_request {
            tracing::debug!(
                request_id,
                latest = self.latest_request,
                search = %key.search,
                page = key.page,
                "Dropping superseded list result",
            );
            return;
        }

        self.view.is_fetching = false;
        match result {
            Ok(page) => {
                tracing::debug!(
                    request_id,
                    notes = page.notes.len(),
                    total_pages = page.total_pages,
                    "List result applied",
                );
                self.cache
                    .insert(NOTES_NAMESPACE, key, page.clone())
                    .await;
                self.view.status = QueryStatus::Success;
                self.view.is_placeholder = false;
                self.view.error = None;
                self.view.data = Some(page.clone());
                self.last_success = Some(page);
            }
            Err(err) => {
                tracing::warn!(request_id, error = %err, "List request failed");
                self.view.status = QueryStatus::Error;
                self.view.error = Some(err);
            }
        }
        self.publish();
    }

    fn publish(&self) {
        self.state.send_replace(self.view.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(total_pages: u32) -> NotePage {
        NotePage {
            notes: Vec::new(),
            total_pages,
        }
    }

    #[test]
    fn pagination_hidden_for_single_page() {
        let mut view = QueryView::initial();
        view.status = QueryStatus::Success;
        view.data = Some(page(1));
        assert!(view.pagination().is_none());

        view.data = Some(page(4));
        view.key.page = 2;
        assert_eq!(
            view.pagination(),
            Some(Pagination {
                current_page: 2,
                total_pages: 4
            })
        );
    }

    #[test]
    fn loading_only_without_data() {
        let mut view = QueryView::initial();
        view.status = QueryStatus::Loading;
        assert!(view.is_loading());

        view.data = Some(page(2));
        view.is_placeholder = true;
        assert!(!view.is_loading());
    }

    #[test]
    fn default_key_is_first_page_without_search() {
        assert_eq!(QueryKey::default(), QueryKey::new("", 1));
    }
}
