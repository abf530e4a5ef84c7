//! Suggestion runtime - drives the orchestrator on a tokio task
//!
//! One task owns the [`Orchestrator`] and handles events strictly one at a
//! time. Effects are executed as detached tasks (debounce timers, remote
//! calls, schema fetches) whose outcomes come back through the same channel.
//! Consumers read the latest state from a `watch` snapshot.

use futures::future::BoxFuture;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::context::Context;
use super::engine::SuggestionEngine;
use super::orchestrator::{Effect, Orchestrator, SuggestionEvent, SuggestionSettings, ghost_text};
use super::popup::SuggestionPopup;
use super::query::QueryState;
use super::session::{GenerationTag, SuggestionSession};
use crate::catalog::{SchemaFetcher, TableLister};
use crate::error::{CatalogError, RemoteError};
use crate::remote::{RemoteRequest, RemoteSuggester};

/// Source of delays for debounce timers
pub trait Timer: Send + Sync + 'static {
    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()>;
}

/// Timer backed by `tokio::time`
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioTimer;

impl Timer for TokioTimer {
    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()> {
        Box::pin(tokio::time::sleep(duration))
    }
}

/// External collaborators; any of them may be absent
#[derive(Clone, Default)]
pub struct Collaborators {
    pub tables: Option<Arc<dyn TableLister>>,
    pub schemas: Option<Arc<dyn SchemaFetcher>>,
    pub remote: Option<Arc<dyn RemoteSuggester>>,
}

/// Published view of the suggestion state
#[derive(Debug, Clone, Default)]
pub struct SuggestionSnapshot {
    pub query: QueryState,
    pub context: Context,
    pub popup: SuggestionPopup,
    pub ai_suggestion: Option<String>,
    pub loading: bool,
    pub tag: GenerationTag,
    /// Point-in-time copy of the known tables and schema cache
    pub engine: SuggestionEngine,
}

impl SuggestionSnapshot {
    fn capture(orchestrator: &Orchestrator) -> Self {
        Self {
            query: orchestrator.query().clone(),
            context: orchestrator.context().clone(),
            popup: orchestrator.popup().clone(),
            ai_suggestion: orchestrator.ai_suggestion().map(str::to_string),
            loading: orchestrator.is_loading(),
            tag: orchestrator.current_tag(),
            engine: orchestrator.engine().clone(),
        }
    }

    /// Part of the AI suggestion that extends `line`
    pub fn ghost_text(&self, line: &str) -> Option<&str> {
        ghost_text(self.ai_suggestion.as_deref(), line)
    }
}

/// Entry point for starting the suggestion runtime
pub struct SuggestionService;

impl SuggestionService {
    /// Spawn the control task on the current tokio runtime.
    ///
    /// # Arguments
    /// * `session` - Initial session state
    /// * `settings` - Debounce, limits and deadlines
    /// * `collaborators` - Table lister, schema fetcher and remote suggester
    /// * `timer` - Delay source for debounce timers
    pub fn spawn(
        session: SuggestionSession,
        settings: SuggestionSettings,
        collaborators: Collaborators,
        timer: Arc<dyn Timer>,
    ) -> SuggestionHandle {
        let orchestrator = Orchestrator::new(
            session,
            settings.clone(),
            collaborators.remote.is_some(),
        );
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(SuggestionSnapshot::capture(&orchestrator));
        let cancel = CancellationToken::new();

        let executor = EffectExecutor {
            events: events_tx.downgrade(),
            collaborators,
            timer,
            settings,
            cancel: cancel.clone(),
        };
        let task = tokio::spawn(run(orchestrator, events_rx, snapshot_tx, executor));

        SuggestionHandle {
            events: events_tx,
            snapshot: snapshot_rx,
            cancel,
            task,
        }
    }
}

/// Handle to a running suggestion runtime.
///
/// Dropping the handle stops the control task once pending work drains;
/// [`SuggestionHandle::shutdown`] stops it right away.
pub struct SuggestionHandle {
    events: mpsc::UnboundedSender<SuggestionEvent>,
    snapshot: watch::Receiver<SuggestionSnapshot>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl SuggestionHandle {
    /// Queue an event. Returns false once the runtime has stopped.
    pub fn send(&self, event: SuggestionEvent) -> bool {
        self.events.send(event).is_ok()
    }

    pub fn keystroke(&self, text: impl Into<String>, cursor: usize) -> bool {
        self.send(SuggestionEvent::Keystroke(QueryState::new(text, cursor)))
    }

    pub fn manual_trigger(&self) -> bool {
        self.send(SuggestionEvent::ManualTrigger)
    }

    /// A sender that can be moved into editor components
    pub fn sender(&self) -> mpsc::UnboundedSender<SuggestionEvent> {
        self.events.clone()
    }

    /// Latest published state
    pub fn snapshot(&self) -> SuggestionSnapshot {
        self.snapshot.borrow().clone()
    }

    /// A receiver notified on every published state
    pub fn subscribe(&self) -> watch::Receiver<SuggestionSnapshot> {
        self.snapshot.clone()
    }

    /// Cancel in-flight work and wait for the control task to finish
    pub async fn shutdown(self) {
        self.cancel.cancel();
        drop(self.events);
        if let Err(e) = self.task.await {
            tracing::warn!("Suggestion runtime ended abnormally: {}", e);
        }
    }
}

async fn run(
    mut orchestrator: Orchestrator,
    mut events: mpsc::UnboundedReceiver<SuggestionEvent>,
    snapshot: watch::Sender<SuggestionSnapshot>,
    executor: EffectExecutor,
) {
    for effect in orchestrator.start() {
        executor.execute(effect);
    }

    loop {
        let event = tokio::select! {
            _ = executor.cancel.cancelled() => break,
            event = events.recv() => match event {
                Some(event) => event,
                None => break,
            },
        };

        let effects = orchestrator.handle(event);
        snapshot.send_replace(SuggestionSnapshot::capture(&orchestrator));
        for effect in effects {
            executor.execute(effect);
        }
    }

    executor.cancel.cancel();
    tracing::debug!("Suggestion runtime stopped");
}

/// Runs effects as detached tasks and reports back through the event channel
struct EffectExecutor {
    events: mpsc::WeakUnboundedSender<SuggestionEvent>,
    collaborators: Collaborators,
    timer: Arc<dyn Timer>,
    settings: SuggestionSettings,
    cancel: CancellationToken,
}

impl EffectExecutor {
    fn execute(&self, effect: Effect) {
        match effect {
            Effect::ArmDebounce { tag, delay } => self.arm_debounce(tag, delay),
            Effect::RequestRemote(request) => self.request_remote(request),
            Effect::FetchSchema(table) => self.fetch_schema(table),
            Effect::ListTables => self.list_tables(),
        }
    }

    fn arm_debounce(&self, tag: GenerationTag, delay: Duration) {
        let sleep = self.timer.sleep(delay);
        let events = self.events.clone();
        let cancel = self.cancel.clone();

        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {}
                _ = sleep => deliver(&events, SuggestionEvent::DebounceElapsed(tag)),
            }
        });
    }

    fn request_remote(&self, request: RemoteRequest) {
        let tag = request.tag;
        let Some(remote) = self.collaborators.remote.clone() else {
            deliver(
                &self.events,
                SuggestionEvent::RemoteResult {
                    tag,
                    result: Err(RemoteError::Unavailable),
                },
            );
            return;
        };

        let events = self.events.clone();
        let cancel = self.cancel.clone();
        let deadline = self.settings.remote_timeout;

        tokio::spawn(async move {
            tracing::debug!("Requesting remote suggestion {}", tag);
            let result = tokio::select! {
                _ = cancel.cancelled() => Err(RemoteError::Cancelled),
                outcome = tokio::time::timeout(deadline, remote.suggest(&request)) => {
                    outcome.unwrap_or(Err(RemoteError::Timeout))
                }
            };
            deliver(&events, SuggestionEvent::RemoteResult { tag, result });
        });
    }

    fn fetch_schema(&self, table: String) {
        let Some(fetcher) = self.collaborators.schemas.clone() else {
            deliver(
                &self.events,
                SuggestionEvent::SchemaFetched {
                    table,
                    result: Err(CatalogError::NotConnected),
                },
            );
            return;
        };

        let events = self.events.clone();
        let cancel = self.cancel.clone();
        let deadline = self.settings.schema_timeout;

        tokio::spawn(async move {
            let result = tokio::select! {
                _ = cancel.cancelled() => return,
                outcome = tokio::time::timeout(deadline, fetcher.fetch_schema(&table)) => {
                    outcome.unwrap_or_else(|_| Err(CatalogError::Timeout(table.clone())))
                }
            };
            deliver(&events, SuggestionEvent::SchemaFetched { table, result });
        });
    }

    fn list_tables(&self) {
        let Some(lister) = self.collaborators.tables.clone() else {
            tracing::debug!("No table lister configured");
            return;
        };

        let events = self.events.clone();
        let cancel = self.cancel.clone();
        let deadline = self.settings.schema_timeout;

        tokio::spawn(async move {
            let result = tokio::select! {
                _ = cancel.cancelled() => return,
                outcome = tokio::time::timeout(deadline, lister.list_tables()) => {
                    outcome.unwrap_or_else(|_| Err(CatalogError::Timeout("table list".to_string())))
                }
            };
            deliver(&events, SuggestionEvent::TablesListed(result));
        });
    }
}

/// Send an event back to the control task if it is still running
fn deliver(events: &mpsc::WeakUnboundedSender<SuggestionEvent>, event: SuggestionEvent) {
    match events.upgrade() {
        Some(sender) => {
            let _ = sender.send(event);
        }
        None => tracing::trace!("Suggestion runtime gone, dropping event"),
    }
}
