//! Suggestion orchestrator - debounce and stale-result state machine
//!
//! The orchestrator owns all suggestion state (query, popup, AI suggestion,
//! session) and reacts to one event at a time. Transitions are plain method
//! calls that return the side effects to perform; the runtime executes those
//! effects and feeds their outcomes back in as new events.
//!
//! Every keystroke and manual trigger issues a new [`GenerationTag`]. Debounce
//! timers and remote results carry the tag they were issued for and are dropped
//! when it is no longer current, whatever order they arrive in.

use std::collections::{BTreeMap, HashSet};
use std::time::Duration;

use super::context::{Context, referenced_tables};
use super::engine::SuggestionEngine;
use super::popup::{DEFAULT_VISIBLE_ROWS, SuggestionPopup};
use super::query::QueryState;
use super::session::{GenerationTag, SuggestionSession};
use crate::catalog::Column;
use crate::config::Config;
use crate::error::{CatalogError, RemoteError};
use crate::remote::RemoteRequest;

/// Tunables for the orchestrator and its runtime
#[derive(Debug, Clone, PartialEq)]
pub struct SuggestionSettings {
    /// Quiet period before a remote request is issued
    pub debounce: Duration,
    /// Maximum local suggestions in the popup (0 = unlimited)
    pub popup_limit: usize,
    /// Rows the popup shows at once
    pub visible_rows: usize,
    /// Schemas fetched eagerly once tables are listed
    pub prefetch_limit: usize,
    /// Deadline for one remote suggestion call
    pub remote_timeout: Duration,
    /// Deadline for one schema fetch
    pub schema_timeout: Duration,
}

impl Default for SuggestionSettings {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(500),
            popup_limit: 10,
            visible_rows: DEFAULT_VISIBLE_ROWS,
            prefetch_limit: 10,
            remote_timeout: Duration::from_secs(30),
            schema_timeout: Duration::from_secs(10),
        }
    }
}

impl From<&Config> for SuggestionSettings {
    fn from(config: &Config) -> Self {
        Self {
            debounce: config.debounce(),
            popup_limit: config.suggest.popup_limit,
            visible_rows: config.suggest.visible_rows,
            prefetch_limit: config.suggest.prefetch_limit,
            remote_timeout: config.remote_timeout(),
            schema_timeout: config.schema_timeout(),
        }
    }
}

/// Side effect requested by a transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Deliver `DebounceElapsed(tag)` after `delay`
    ArmDebounce { tag: GenerationTag, delay: Duration },
    /// Call the remote suggester and deliver `RemoteResult`
    RequestRemote(RemoteRequest),
    /// Fetch one table schema and deliver `SchemaFetched`
    FetchSchema(String),
    /// List the data source tables and deliver `TablesListed`
    ListTables,
}

/// Input to the orchestrator
#[derive(Debug, Clone)]
pub enum SuggestionEvent {
    /// The buffer was edited
    Keystroke(QueryState),
    /// Ask for a remote suggestion now
    ManualTrigger,
    DebounceElapsed(GenerationTag),
    RemoteResult {
        tag: GenerationTag,
        result: Result<String, RemoteError>,
    },
    TablesListed(Result<Vec<String>, CatalogError>),
    SchemaFetched {
        table: String,
        result: Result<Vec<Column>, CatalogError>,
    },
    SelectNext,
    SelectPrevious,
    /// Accept popup row `index`
    AcceptSuggestion(usize),
    AcceptAiSuggestion,
    HidePopup,
}

/// Suggestion state machine
#[derive(Debug, Clone)]
pub struct Orchestrator {
    session: SuggestionSession,
    settings: SuggestionSettings,
    remote_available: bool,
    query: QueryState,
    context: Context,
    popup: SuggestionPopup,
    ai_suggestion: Option<String>,
    loading: bool,
    pending_fetches: HashSet<String>,
}

impl Orchestrator {
    /// Create an orchestrator.
    ///
    /// # Arguments
    /// * `session` - Session state (catalog, schema cache, tag counter)
    /// * `settings` - Debounce delay and popup limits
    /// * `remote_available` - Whether a remote suggester is configured
    pub fn new(
        session: SuggestionSession,
        settings: SuggestionSettings,
        remote_available: bool,
    ) -> Self {
        let popup = SuggestionPopup::new(settings.visible_rows);
        Self {
            session,
            settings,
            remote_available,
            query: QueryState::default(),
            context: Context::default(),
            popup,
            ai_suggestion: None,
            loading: false,
            pending_fetches: HashSet::new(),
        }
    }

    /// Effects to run once a data source becomes available
    pub fn start(&self) -> Vec<Effect> {
        vec![Effect::ListTables]
    }

    /// Dispatch an event to its transition
    pub fn handle(&mut self, event: SuggestionEvent) -> Vec<Effect> {
        match event {
            SuggestionEvent::Keystroke(query) => self.on_keystroke(query),
            SuggestionEvent::ManualTrigger => self.on_manual_trigger(),
            SuggestionEvent::DebounceElapsed(tag) => self.on_debounce_elapsed(tag),
            SuggestionEvent::RemoteResult { tag, result } => {
                self.on_remote_result(tag, result);
                Vec::new()
            }
            SuggestionEvent::TablesListed(result) => self.on_tables_listed(result),
            SuggestionEvent::SchemaFetched { table, result } => {
                self.on_schema_fetched(table, result);
                Vec::new()
            }
            SuggestionEvent::SelectNext => {
                self.popup.next();
                Vec::new()
            }
            SuggestionEvent::SelectPrevious => {
                self.popup.previous();
                Vec::new()
            }
            SuggestionEvent::AcceptSuggestion(index) => {
                self.accept_suggestion(index);
                Vec::new()
            }
            SuggestionEvent::AcceptAiSuggestion => {
                self.accept_ai_suggestion();
                Vec::new()
            }
            SuggestionEvent::HidePopup => {
                self.popup.hide();
                Vec::new()
            }
        }
    }

    /// The buffer changed: refresh the popup and restart the debounce window
    pub fn on_keystroke(&mut self, query: QueryState) -> Vec<Effect> {
        self.query = query;
        self.refresh_local();
        self.ai_suggestion = None;

        let tag = self.session.next_generation();
        vec![Effect::ArmDebounce {
            tag,
            delay: self.settings.debounce,
        }]
    }

    /// Request a remote suggestion immediately
    pub fn on_manual_trigger(&mut self) -> Vec<Effect> {
        let tag = self.session.next_generation();
        self.popup.hide();
        self.ai_suggestion = None;
        self.request_remote(tag)
    }

    pub fn on_debounce_elapsed(&mut self, tag: GenerationTag) -> Vec<Effect> {
        if !self.session.is_current(tag) {
            tracing::debug!(
                "Debounce {} elapsed after {} was issued, ignoring",
                tag,
                self.session.current_generation()
            );
            return Vec::new();
        }
        self.request_remote(tag)
    }

    /// Apply a remote result. Returns whether it was current.
    ///
    /// A stale result leaves the state exactly as it was.
    pub fn on_remote_result(
        &mut self,
        tag: GenerationTag,
        result: Result<String, RemoteError>,
    ) -> bool {
        if !self.session.is_current(tag) {
            tracing::debug!(
                "Discarding remote result {} (current is {})",
                tag,
                self.session.current_generation()
            );
            return false;
        }

        self.loading = false;
        self.ai_suggestion = match result {
            Ok(suggestion) if !suggestion.trim().is_empty() => Some(suggestion),
            Ok(_) => None,
            Err(e) => {
                tracing::debug!("No AI suggestion for {}: {}", tag, e);
                None
            }
        };
        true
    }

    /// Store the listed tables and prefetch the first few schemas
    pub fn on_tables_listed(&mut self, result: Result<Vec<String>, CatalogError>) -> Vec<Effect> {
        let tables = match result {
            Ok(tables) => tables,
            Err(e) => {
                tracing::warn!("Failed to list tables: {}", e);
                return Vec::new();
            }
        };

        tracing::debug!("Catalog lists {} tables", tables.len());
        let prefetch: Vec<String> = tables
            .iter()
            .take(self.settings.prefetch_limit)
            .cloned()
            .collect();
        self.session.engine_mut().set_tables(tables);

        prefetch
            .into_iter()
            .filter_map(|table| self.fetch_if_missing(table))
            .collect()
    }

    /// Store a fetched schema; failures only leave the table uncached
    pub fn on_schema_fetched(&mut self, table: String, result: Result<Vec<Column>, CatalogError>) {
        self.pending_fetches.remove(&table);
        match result {
            Ok(columns) => {
                tracing::debug!("Cached {} columns for {}", columns.len(), table);
                self.session.schemas_mut().set(table, columns);
            }
            Err(e) => tracing::warn!("Failed to fetch schema for {}: {}", table, e),
        }
    }

    /// Splice popup row `index` into the query and hide the popup
    pub fn accept_suggestion(&mut self, index: usize) -> Option<&QueryState> {
        let text = self.popup.accept(index)?;
        self.query = self.query.splice(self.context.token_start, &text);
        self.popup.hide();
        self.refresh_context();
        Some(&self.query)
    }

    /// Replace the whole query with the AI suggestion
    pub fn accept_ai_suggestion(&mut self) -> Option<&QueryState> {
        let suggestion = self.ai_suggestion.take()?;
        self.query = QueryState::at_end(suggestion);
        self.popup.hide();
        self.refresh_context();
        Some(&self.query)
    }

    pub fn popup(&self) -> &SuggestionPopup {
        &self.popup
    }

    pub fn popup_mut(&mut self) -> &mut SuggestionPopup {
        &mut self.popup
    }

    pub fn query(&self) -> &QueryState {
        &self.query
    }

    /// Context of the last keystroke
    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn ai_suggestion(&self) -> Option<&str> {
        self.ai_suggestion.as_deref()
    }

    /// Part of the AI suggestion that extends the current query
    pub fn ghost_text(&self) -> Option<&str> {
        ghost_text(self.ai_suggestion.as_deref(), self.query.text())
    }

    /// Whether a remote request is in flight
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn current_tag(&self) -> GenerationTag {
        self.session.current_generation()
    }

    pub fn session(&self) -> &SuggestionSession {
        &self.session
    }

    pub fn engine(&self) -> &SuggestionEngine {
        self.session.engine()
    }

    pub fn settings(&self) -> &SuggestionSettings {
        &self.settings
    }

    pub fn remote_available(&self) -> bool {
        self.remote_available
    }

    /// Tables with a schema fetch in flight
    pub fn pending_fetches(&self) -> &HashSet<String> {
        &self.pending_fetches
    }

    fn refresh_local(&mut self) {
        self.refresh_context();
        let suggestions = self
            .session
            .engine()
            .suggestions(&self.context, self.settings.popup_limit);
        self.popup.set_suggestions(suggestions);
    }

    /// Re-parse the context for the stored query; the popup is left alone
    fn refresh_context(&mut self) {
        self.context = self
            .session
            .engine()
            .parse_context(self.query.text(), self.query.cursor());
    }

    /// Assemble a remote request for `tag` from what is cached right now
    fn request_remote(&mut self, tag: GenerationTag) -> Vec<Effect> {
        if !self.remote_available || self.query.is_blank() {
            self.loading = false;
            return Vec::new();
        }

        let tables = self.session.engine().tables().to_vec();
        let referenced = referenced_tables(self.query.text(), &tables);

        let mut effects = Vec::new();
        let mut schemas = BTreeMap::new();
        for table in referenced {
            match self.session.schemas().get(&table) {
                Some(columns) => {
                    schemas.insert(table, columns.to_vec());
                }
                None => effects.extend(self.fetch_if_missing(table)),
            }
        }

        self.loading = true;
        effects.push(Effect::RequestRemote(RemoteRequest {
            tag,
            query: self.query.text().to_string(),
            tables,
            schemas,
        }));
        effects
    }

    fn fetch_if_missing(&mut self, table: String) -> Option<Effect> {
        if self.session.schemas().contains(&table) || self.pending_fetches.contains(&table) {
            return None;
        }
        self.pending_fetches.insert(table.clone());
        Some(Effect::FetchSchema(table))
    }
}

/// Suffix of `suggestion` that extends `line`, if any
pub fn ghost_text<'a>(suggestion: Option<&'a str>, line: &str) -> Option<&'a str> {
    suggestion?
        .strip_prefix(line)
        .filter(|rest| !rest.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repl::completion::{ContextKind, SchemaCache, SuggestionKind};

    fn tables() -> Vec<String> {
        ["AzureActivity", "Heartbeat", "SigninLogs"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn create_orchestrator() -> Orchestrator {
        let mut schemas = SchemaCache::new();
        schemas.set(
            "AzureActivity",
            vec![
                Column::new("TimeGenerated", "datetime"),
                Column::new("OperationName", "string"),
            ],
        );
        let engine = SuggestionEngine::new(tables(), schemas);
        Orchestrator::new(
            SuggestionSession::with_engine(engine),
            SuggestionSettings::default(),
            true,
        )
    }

    fn debounce_tag(effects: &[Effect]) -> GenerationTag {
        match effects {
            [Effect::ArmDebounce { tag, delay }] => {
                assert_eq!(*delay, Duration::from_millis(500));
                *tag
            }
            other => panic!("expected a single debounce, got {other:?}"),
        }
    }

    fn remote_request(effects: &[Effect]) -> &RemoteRequest {
        effects
            .iter()
            .find_map(|e| match e {
                Effect::RequestRemote(req) => Some(req),
                _ => None,
            })
            .expect("no remote request")
    }

    #[test]
    fn test_start_lists_tables() {
        assert_eq!(create_orchestrator().start(), vec![Effect::ListTables]);
    }

    #[test]
    fn test_keystroke_updates_popup_and_arms_debounce() {
        let mut orch = create_orchestrator();
        let effects = orch.on_keystroke(QueryState::at_end("A"));
        let tag = debounce_tag(&effects);

        assert_eq!(tag, orch.current_tag());
        assert!(orch.popup().is_visible());
        assert_eq!(orch.popup().selected_text(), Some("AzureActivity"));
        assert_eq!(orch.popup().suggestions()[0].kind, SuggestionKind::Table);
    }

    #[test]
    fn test_keystroke_clears_ai_suggestion() {
        let mut orch = create_orchestrator();
        let tag = debounce_tag(&orch.on_keystroke(QueryState::at_end("Heartbeat")));
        orch.on_debounce_elapsed(tag);
        assert!(orch.on_remote_result(tag, Ok("Heartbeat | take 10".to_string())));
        assert_eq!(orch.ai_suggestion(), Some("Heartbeat | take 10"));

        orch.on_keystroke(QueryState::at_end("Heartbeat "));
        assert_eq!(orch.ai_suggestion(), None);
    }

    #[test]
    fn test_each_keystroke_issues_a_newer_tag() {
        let mut orch = create_orchestrator();
        let first = debounce_tag(&orch.on_keystroke(QueryState::at_end("H")));
        let second = debounce_tag(&orch.on_keystroke(QueryState::at_end("He")));
        assert!(second > first);
    }

    #[test]
    fn test_stale_debounce_is_ignored() {
        let mut orch = create_orchestrator();
        let first = debounce_tag(&orch.on_keystroke(QueryState::at_end("H")));
        orch.on_keystroke(QueryState::at_end("He"));

        assert!(orch.on_debounce_elapsed(first).is_empty());
        assert!(!orch.is_loading());
    }

    #[test]
    fn test_current_debounce_requests_remote() {
        let mut orch = create_orchestrator();
        let text = "AzureActivity | where ";
        let tag = debounce_tag(&orch.on_keystroke(QueryState::at_end(text)));

        let effects = orch.on_debounce_elapsed(tag);
        assert_eq!(effects.len(), 1);
        let req = remote_request(&effects);
        assert_eq!(req.tag, tag);
        assert_eq!(req.query, text);
        assert_eq!(req.tables, tables());
        assert_eq!(req.schemas["AzureActivity"].len(), 2);
        assert!(orch.is_loading());
    }

    #[test]
    fn test_uncached_tables_are_fetched_alongside_the_request() {
        let mut orch = create_orchestrator();
        let text = "Heartbeat | union AzureActivity, SigninLogs | union SigninLogs";
        let tag = debounce_tag(&orch.on_keystroke(QueryState::at_end(text)));

        let effects = orch.on_debounce_elapsed(tag);
        assert_eq!(effects[0], Effect::FetchSchema("Heartbeat".to_string()));
        assert_eq!(effects[1], Effect::FetchSchema("SigninLogs".to_string()));

        // The request goes out with what is cached now
        let req = remote_request(&effects);
        assert_eq!(req.schemas.keys().collect::<Vec<_>>(), vec!["AzureActivity"]);
        assert!(orch.pending_fetches().contains("Heartbeat"));
    }

    #[test]
    fn test_in_flight_fetch_is_not_repeated() {
        let mut orch = create_orchestrator();
        let tag = debounce_tag(&orch.on_keystroke(QueryState::at_end("Heartbeat | take 1")));
        let effects = orch.on_debounce_elapsed(tag);
        assert_eq!(effects.len(), 2);

        let effects = orch.on_manual_trigger();
        assert_eq!(effects.len(), 1);
        assert!(matches!(effects[0], Effect::RequestRemote(_)));
    }

    #[test]
    fn test_failed_fetch_can_be_retried() {
        let mut orch = create_orchestrator();
        orch.on_keystroke(QueryState::at_end("Heartbeat | take 1"));
        orch.on_manual_trigger();
        orch.on_schema_fetched(
            "Heartbeat".to_string(),
            Err(CatalogError::Timeout("Heartbeat".to_string())),
        );
        assert!(orch.pending_fetches().is_empty());
        assert!(!orch.session().schemas().contains("Heartbeat"));

        let effects = orch.on_manual_trigger();
        assert_eq!(effects[0], Effect::FetchSchema("Heartbeat".to_string()));
    }

    #[test]
    fn test_blank_query_never_requests() {
        let mut orch = create_orchestrator();
        let tag = debounce_tag(&orch.on_keystroke(QueryState::at_end("   ")));
        assert!(orch.on_debounce_elapsed(tag).is_empty());
        assert!(orch.on_manual_trigger().is_empty());
        assert!(!orch.is_loading());
    }

    #[test]
    fn test_no_remote_means_local_only() {
        let mut orch = Orchestrator::new(
            SuggestionSession::with_engine(SuggestionEngine::new(tables(), SchemaCache::new())),
            SuggestionSettings::default(),
            false,
        );
        let tag = debounce_tag(&orch.on_keystroke(QueryState::at_end("Heart")));
        assert!(orch.on_debounce_elapsed(tag).is_empty());
        assert_eq!(orch.popup().selected_text(), Some("Heartbeat"));
    }

    #[test]
    fn test_manual_trigger_bypasses_debounce() {
        let mut orch = create_orchestrator();
        let typed = debounce_tag(&orch.on_keystroke(QueryState::at_end("Heartbeat | ")));
        assert!(orch.popup().is_visible());

        let effects = orch.on_manual_trigger();
        let req = remote_request(&effects);
        assert!(req.tag > typed);
        assert!(!orch.popup().is_visible());
        assert!(orch.is_loading());

        // The pending debounce is now stale
        assert!(orch.on_debounce_elapsed(typed).is_empty());
    }

    #[test]
    fn test_out_of_order_result_is_inert() {
        let mut orch = create_orchestrator();
        orch.on_keystroke(QueryState::at_end("Heartbeat"));
        let g1 = remote_request(&orch.on_manual_trigger()).tag;
        let g2 = remote_request(&orch.on_manual_trigger()).tag;
        assert!(g1 < g2);

        assert!(orch.on_remote_result(g2, Ok("Heartbeat | take 5".to_string())));
        let before = format!("{orch:?}");

        assert!(!orch.on_remote_result(g1, Ok("Heartbeat | count".to_string())));
        assert_eq!(format!("{orch:?}"), before);
        assert_eq!(orch.ai_suggestion(), Some("Heartbeat | take 5"));
    }

    #[test]
    fn test_stale_result_does_not_end_loading() {
        let mut orch = create_orchestrator();
        orch.on_keystroke(QueryState::at_end("Heartbeat"));
        let g1 = remote_request(&orch.on_manual_trigger()).tag;
        orch.on_manual_trigger();

        orch.on_remote_result(g1, Ok("stale".to_string()));
        assert!(orch.is_loading());
        assert_eq!(orch.ai_suggestion(), None);
    }

    #[test]
    fn test_remote_error_clears_suggestion() {
        let mut orch = create_orchestrator();
        orch.on_keystroke(QueryState::at_end("Heartbeat"));
        let tag = remote_request(&orch.on_manual_trigger()).tag;

        assert!(orch.on_remote_result(tag, Err(RemoteError::Timeout)));
        assert!(!orch.is_loading());
        assert_eq!(orch.ai_suggestion(), None);
    }

    #[test]
    fn test_blank_result_is_no_suggestion() {
        let mut orch = create_orchestrator();
        orch.on_keystroke(QueryState::at_end("Heartbeat"));
        let tag = remote_request(&orch.on_manual_trigger()).tag;
        orch.on_remote_result(tag, Ok("  \n".to_string()));
        assert_eq!(orch.ai_suggestion(), None);
    }

    #[test]
    fn test_tables_listed_prefetches_first_schemas() {
        let mut orch = Orchestrator::new(
            SuggestionSession::new(),
            SuggestionSettings {
                prefetch_limit: 2,
                ..Default::default()
            },
            true,
        );
        let effects = orch.on_tables_listed(Ok(tables()));
        assert_eq!(
            effects,
            vec![
                Effect::FetchSchema("AzureActivity".to_string()),
                Effect::FetchSchema("Heartbeat".to_string()),
            ]
        );
        assert_eq!(orch.engine().tables(), tables().as_slice());
    }

    #[test]
    fn test_tables_listed_skips_cached_schemas() {
        let mut orch = create_orchestrator();
        let effects = orch.on_tables_listed(Ok(tables()));
        assert_eq!(
            effects,
            vec![
                Effect::FetchSchema("Heartbeat".to_string()),
                Effect::FetchSchema("SigninLogs".to_string()),
            ]
        );
    }

    #[test]
    fn test_tables_listing_failure_keeps_state() {
        let mut orch = create_orchestrator();
        assert!(orch.on_tables_listed(Err(CatalogError::NotConnected)).is_empty());
        assert_eq!(orch.engine().tables(), tables().as_slice());
    }

    #[test]
    fn test_fetched_schema_feeds_local_suggestions() {
        let mut orch = create_orchestrator();
        orch.on_schema_fetched(
            "Heartbeat".to_string(),
            Ok(vec![Column::new("Computer", "string")]),
        );
        orch.on_keystroke(QueryState::at_end("Heartbeat | where Co"));
        assert_eq!(orch.popup().selected_text(), Some("Computer"));
    }

    #[test]
    fn test_accept_splices_token() {
        let mut orch = create_orchestrator();
        orch.on_keystroke(QueryState::at_end("Table | wh"));
        assert_eq!(orch.popup().selected_text(), Some("where"));

        let query = orch.accept_suggestion(0).cloned().unwrap();
        assert_eq!(query.text(), "Table | where");
        assert!(!orch.popup().is_visible());
    }

    #[test]
    fn test_accept_keeps_text_after_cursor() {
        let mut orch = create_orchestrator();
        orch.on_keystroke(QueryState::new("Heartbeat | ta | count", 14));
        let query = orch.accept_suggestion(0).cloned().unwrap();
        assert_eq!(query.text(), "Heartbeat | take | count");
        assert_eq!(query.cursor(), 16);
    }

    #[test]
    fn test_first_character_end_to_end() {
        let mut orch = create_orchestrator();
        orch.on_keystroke(QueryState::at_end("A"));
        assert_eq!(orch.popup().suggestions()[0].text, "AzureActivity");

        let query = orch.accept_suggestion(0).cloned().unwrap();
        assert_eq!(query.text(), "AzureActivity");
    }

    #[test]
    fn test_accept_recomputes_context() {
        let mut orch = create_orchestrator();
        orch.on_keystroke(QueryState::at_end("A"));
        orch.accept_suggestion(0);

        assert_eq!(orch.context().token, "AzureActivity");
        assert_eq!(orch.context().token_start, 0);
        assert_eq!(orch.context().current_table.as_deref(), Some("AzureActivity"));
        assert!(!orch.popup().is_visible());
    }

    #[test]
    fn test_accept_ai_suggestion_recomputes_context() {
        let mut orch = create_orchestrator();
        orch.on_keystroke(QueryState::at_end("AzureActivity | wh"));
        let tag = remote_request(&orch.on_manual_trigger()).tag;
        orch.on_remote_result(tag, Ok("AzureActivity | where Op".to_string()));
        orch.accept_ai_suggestion();

        assert_eq!(orch.context().kind, ContextKind::ColumnName);
        assert_eq!(orch.context().token, "Op");
        assert!(!orch.popup().is_visible());
    }

    #[test]
    fn test_accept_ai_suggestion_replaces_buffer() {
        let mut orch = create_orchestrator();
        orch.on_keystroke(QueryState::at_end("Heartbeat | wh"));
        let tag = remote_request(&orch.on_manual_trigger()).tag;
        orch.on_remote_result(tag, Ok("Heartbeat | where Computer != ''".to_string()));

        assert_eq!(orch.ghost_text(), Some("ere Computer != ''"));
        let query = orch.accept_ai_suggestion().cloned().unwrap();
        assert_eq!(query.text(), "Heartbeat | where Computer != ''");
        assert_eq!(query.cursor(), query.text().len());
        assert_eq!(orch.ai_suggestion(), None);
    }

    #[test]
    fn test_handle_routes_popup_events() {
        let mut orch = create_orchestrator();
        orch.handle(SuggestionEvent::Keystroke(QueryState::at_end("Heartbeat | ")));
        orch.handle(SuggestionEvent::SelectNext);
        assert_eq!(orch.popup().selected_index(), 1);
        orch.handle(SuggestionEvent::SelectPrevious);
        orch.handle(SuggestionEvent::SelectPrevious);
        assert_eq!(
            orch.popup().selected_index(),
            orch.popup().suggestions().len() - 1
        );
        orch.handle(SuggestionEvent::HidePopup);
        assert!(!orch.popup().is_visible());
    }

    #[test]
    fn test_ghost_text() {
        assert_eq!(ghost_text(Some("T | take 5"), "T | ta"), Some("ke 5"));
        assert_eq!(ghost_text(Some("T | take 5"), "T | take 5"), None);
        assert_eq!(ghost_text(Some("Other"), "T"), None);
        assert_eq!(ghost_text(None, "T"), None);
    }
}
