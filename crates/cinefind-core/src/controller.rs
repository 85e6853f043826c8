//! Session driver wiring debounce, fetches and telemetry together.

use std::sync::Arc;
use std::time::Duration;

use cinefind_api::appwrite::DocumentStore;
use cinefind_api::tmdb::TmdbApi;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::catalog::{FetchState, SearchService};
use crate::debounce::Debouncer;
use crate::session::{SearchSession, StaleResponsePolicy, Ticket};
use crate::trending::{DEFAULT_TRENDING_LIMIT, TrendingSearch, get_trending};

/// Default quiescence window between the last keystroke and a fetch.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Tunables for a `SearchController`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Debounce window.
    pub debounce: Duration,
    /// Number of trending entries loaded at mount.
    pub trending_limit: u32,
    /// Stale completion handling.
    pub stale_policy: StaleResponsePolicy,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            trending_limit: DEFAULT_TRENDING_LIMIT,
            stale_policy: StaleResponsePolicy::default(),
        }
    }
}

/// What one `step` changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepEvent {
    /// The debounce window passed for `term`; `fetch` is the load started
    /// for it, `None` when the value had not changed.
    Settled {
        /// Debounced value.
        term: String,
        /// Load issued for the value.
        fetch: Option<Ticket>,
    },
    /// A load finished; `applied` is `false` when it was superseded.
    MoviesApplied {
        /// Load that finished.
        ticket: Ticket,
        /// Whether the session took the result.
        applied: bool,
    },
    /// The trending list arrived with this many entries.
    TrendingLoaded(usize),
    /// No further events can arrive.
    Closed,
}

/// Results posted back by spawned work.
#[derive(Debug)]
enum EngineEvent {
    Movies { ticket: Ticket, state: FetchState },
    Trending(Vec<TrendingSearch>),
}

/// Owns a `SearchSession` and feeds it from the debouncer and from
/// spawned catalog and store requests.
///
/// Input methods only touch the typed query; the session changes further
/// when `step` is awaited. Requests are never cancelled: a superseded load
/// runs to completion and its result is handled by the session's
/// `StaleResponsePolicy`.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct SearchController<C, S> {
    /// Catalog and telemetry.
    service: Arc<SearchService<C, S>>,
    /// State shown to the user.
    session: SearchSession,
    /// Raw query debouncer.
    debouncer: Debouncer,
    /// Debounced values.
    settled: UnboundedReceiver<String>,
    /// Sender handed to spawned work.
    events_tx: UnboundedSender<EngineEvent>,
    /// Results of spawned work.
    events_rx: UnboundedReceiver<EngineEvent>,
}

impl<C, S> SearchController<C, S>
where
    C: TmdbApi + Sync + 'static,
    S: DocumentStore + Sync + 'static,
{
    /// Mounts a session: starts the popular-list load and, when a store
    /// is configured, the trending load.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn start(service: Arc<SearchService<C, S>>, config: &ControllerConfig) -> Self {
        let (debouncer, settled) = Debouncer::spawn(config.debounce);
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let mut controller = Self {
            service,
            session: SearchSession::new(config.stale_policy),
            debouncer,
            settled,
            events_tx,
            events_rx,
        };

        let ticket = controller.session.mount();
        controller.spawn_load(ticket, String::new());
        controller.spawn_trending(config.trending_limit);
        controller
    }

    /// Current session state.
    #[must_use]
    pub const fn session(&self) -> &SearchSession {
        &self.session
    }

    /// Replaces the typed query.
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.session.set_query(query);
        self.debouncer.push(self.session.query());
    }

    /// Appends a typed character.
    pub fn push_char(&mut self, c: char) {
        self.session.push_char(c);
        self.debouncer.push(self.session.query());
    }

    /// Deletes the last typed character.
    pub fn backspace(&mut self) {
        self.session.pop_char();
        self.debouncer.push(self.session.query());
    }

    /// Clears the typed query.
    pub fn clear_query(&mut self) {
        self.session.clear_query();
        self.debouncer.push(self.session.query());
    }

    /// Waits for the next debounce expiry or request completion and
    /// applies it to the session.
    ///
    /// Cancel safe: dropping the future loses nothing.
    pub async fn step(&mut self) -> StepEvent {
        tokio::select! {
            Some(term) = self.settled.recv() => {
                let fetch = self.session.settle(&term);
                if let Some(ticket) = fetch {
                    self.spawn_load(ticket, term.clone());
                }
                StepEvent::Settled { term, fetch }
            }
            Some(event) = self.events_rx.recv() => match event {
                EngineEvent::Movies { ticket, state } => {
                    let applied = self.session.apply(ticket, state);
                    StepEvent::MoviesApplied { ticket, applied }
                }
                EngineEvent::Trending(trending) => {
                    let count = trending.len();
                    self.session.set_trending(trending);
                    StepEvent::TrendingLoaded(count)
                }
            },
            else => StepEvent::Closed,
        }
    }

    fn spawn_load(&self, ticket: Ticket, term: String) {
        let service = Arc::clone(&self.service);
        let events = self.events_tx.clone();
        tokio::spawn(async move {
            // Telemetry stays detached.
            let outcome = service.load_movies(&term).await;
            let event = EngineEvent::Movies {
                ticket,
                state: outcome.state,
            };
            if events.send(event).is_err() {
                tracing::debug!(ticket = ticket.value(), "controller gone; result dropped");
            }
        });
    }

    fn spawn_trending(&self, limit: u32) {
        let Some(store) = self.service.store().map(Arc::clone) else {
            tracing::debug!("no document store; trending disabled");
            return;
        };
        let events = self.events_tx.clone();
        tokio::spawn(async move {
            let trending = get_trending(store.as_ref(), limit).await;
            if events.send(EngineEvent::Trending(trending)).is_err() {
                tracing::debug!("controller gone; trending dropped");
            }
        });
    }
}
