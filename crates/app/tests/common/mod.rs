#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{watch, Notify};
use tokio_util::sync::CancellationToken;

use notehub_app::mutation::MutationController;
use notehub_app::query::{NotesCache, QueryConfig, QueryController, QueryHandle, QueryView};
use notehub_client::{NotesApi, NotesApiError};
use notehub_core::{CreateNote, Note, NoteId, NotePage, Tag};
use notehub_events::EventBus;

/// Total pages reported for every search.
pub const TOTAL_PAGES: u32 = 5;

/// Search text whose list requests fail.
pub const FAILING_SEARCH: &str = "boom";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListCall {
    pub search: String,
    pub page: u32,
    pub per_page: u32,
}

/// Title of the single note on a fake page.
pub fn page_title(search: &str, page: u32) -> String {
    let label = if search.is_empty() { "all" } else { search };
    format!("{label}-{page}")
}

fn note(id: &str, title: &str, tag: Tag) -> Note {
    Note {
        id: NoteId::from(id),
        title: title.to_string(),
        content: String::new(),
        tag,
        created_at: Utc::now(),
        updated_at: None,
    }
}

/// In-memory [`NotesApi`] with controllable latency.
///
/// List requests for a held search block until [`release`](Self::release)
/// is called for it. Mutations block while [`hold_mutations`] is active.
#[derive(Default)]
pub struct FakeNotesApi {
    calls: Mutex<Vec<ListCall>>,
    completed: Mutex<Vec<ListCall>>,
    held: Mutex<HashMap<String, Arc<Notify>>>,
    failing_mutations: AtomicBool,
    mutation_gate: Mutex<Option<Arc<Notify>>>,
    created: Mutex<Vec<CreateNote>>,
    deleted: Mutex<Vec<NoteId>>,
    next_id: AtomicU32,
    missing: Mutex<HashSet<String>>,
}

impl FakeNotesApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Hold list responses for `search` until released.
    pub fn hold(&self, search: &str) {
        self.held
            .lock()
            .unwrap()
            .insert(search.to_string(), Arc::new(Notify::new()));
    }

    /// Let one held response for `search` through.
    pub fn release(&self, search: &str) {
        if let Some(gate) = self.held.lock().unwrap().get(search) {
            gate.notify_one();
        }
    }

    pub fn hold_mutations(&self) {
        *self.mutation_gate.lock().unwrap() = Some(Arc::new(Notify::new()));
    }

    pub fn release_mutations(&self) {
        if let Some(gate) = self.mutation_gate.lock().unwrap().take() {
            gate.notify_one();
        }
    }

    /// Make deletes of `id` answer 404.
    pub fn mark_missing(&self, id: &str) {
        self.missing.lock().unwrap().insert(id.to_string());
    }

    pub fn fail_mutations(&self) {
        self.failing_mutations.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<ListCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_for(&self, search: &str, page: u32) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.search == search && call.page == page)
            .count()
    }

    pub fn completed_for(&self, search: &str) -> usize {
        self.completed
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.search == search)
            .count()
    }

    pub fn created(&self) -> Vec<CreateNote> {
        self.created.lock().unwrap().clone()
    }

    pub fn deleted(&self) -> Vec<NoteId> {
        self.deleted.lock().unwrap().clone()
    }

    async fn mutation_barrier(&self) -> Result<(), NotesApiError> {
        let gate = self.mutation_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if self.failing_mutations.load(Ordering::SeqCst) {
            return Err(NotesApiError::Api {
                status: 400,
                body: "Bad Request".into(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl NotesApi for FakeNotesApi {
    async fn list(
        &self,
        search: &str,
        page: u32,
        per_page: u32,
    ) -> Result<NotePage, NotesApiError> {
        let call = ListCall {
            search: search.to_string(),
            page,
            per_page,
        };
        self.calls.lock().unwrap().push(call.clone());

        let gate = self.held.lock().unwrap().get(search).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.completed.lock().unwrap().push(call);

        if search == FAILING_SEARCH {
            return Err(NotesApiError::Network("connection reset".into()));
        }

        Ok(NotePage {
            notes: vec![note(
                &format!("{search}:{page}"),
                &page_title(search, page),
                Tag::Work,
            )],
            total_pages: TOTAL_PAGES,
        })
    }

    async fn create(&self, body: &CreateNote) -> Result<Note, NotesApiError> {
        self.mutation_barrier().await?;
        self.created.lock().unwrap().push(body.clone());
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(note(&format!("note-{id}"), &body.title, body.tag))
    }

    async fn delete(&self, id: &NoteId) -> Result<Note, NotesApiError> {
        self.mutation_barrier().await?;
        if self.missing.lock().unwrap().contains(id.as_str()) {
            return Err(NotesApiError::Api {
                status: 404,
                body: "Note not found".into(),
            });
        }
        self.deleted.lock().unwrap().push(id.clone());
        Ok(note(id.as_str(), "Deleted", Tag::Todo))
    }
}

/// A running query controller wired to a fake API.
pub struct Harness {
    pub api: Arc<FakeNotesApi>,
    pub bus: Arc<EventBus>,
    pub cache: Arc<NotesCache>,
    pub query: QueryHandle,
    pub views: watch::Receiver<QueryView>,
    pub cancel: CancellationToken,
}

impl Harness {
    pub fn start(api: Arc<FakeNotesApi>) -> Self {
        let bus = Arc::new(EventBus::default());
        let cache = Arc::new(NotesCache::with_events(bus.clone()));
        let cancel = CancellationToken::new();
        let (query, _task) = QueryController::spawn(
            api.clone(),
            cache.clone(),
            &bus,
            QueryConfig::default(),
            cancel.clone(),
        );
        let views = query.subscribe();

        Self {
            api,
            bus,
            cache,
            query,
            views,
            cancel,
        }
    }

    pub fn mutations(&self) -> Arc<MutationController> {
        Arc::new(MutationController::new(
            self.api.clone(),
            self.cache.clone(),
            self.bus.clone(),
        ))
    }

    /// Wait (in virtual time) for a view matching `predicate`.
    pub async fn wait_for<F>(&mut self, predicate: F) -> QueryView
    where
        F: Fn(&QueryView) -> bool,
    {
        let view = tokio::time::timeout(Duration::from_secs(60), self.views.wait_for(|v| predicate(v)))
            .await
            .expect("timed out waiting for query view")
            .expect("query controller stopped");
        view.clone()
    }

    /// Wait until the initial unfiltered first page is shown.
    pub async fn ready(&mut self) -> QueryView {
        self.wait_for(|v| v.key.search.is_empty() && has_title(v, &page_title("", 1)))
            .await
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Whether the view currently shows the page titled `title`.
pub fn has_title(view: &QueryView, title: &str) -> bool {
    view.data
        .as_ref()
        .and_then(|page| page.notes.first())
        .is_some_and(|note| note.title == title)
}

/// Let every pending timer, request and completion run out.
pub async fn settle() {
    tokio::time::sleep(Duration::from_secs(5)).await;
}

/// Wait until `condition` holds, polling in virtual time.
pub async fn eventually<F>(condition: F)
where
    F: Fn() -> bool,
{
    tokio::time::timeout(Duration::from_secs(60), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}
