//! Completer for reedline - ranked local suggestions for the composer

use reedline::{Completer, Span, Suggestion};
use tokio::sync::watch;

use super::completion::{SuggestionSnapshot, clamp_cursor};

/// KQL completer for reedline
///
/// Reads the known tables and cached schemas from the latest runtime snapshot,
/// so completing never waits on the catalog.
pub struct KqlCompleter {
    snapshot: watch::Receiver<SuggestionSnapshot>,
    limit: usize,
}

impl KqlCompleter {
    /// Create a new completer
    ///
    /// # Arguments
    /// * `snapshot` - Receiver for the suggestion runtime state
    /// * `limit` - Maximum number of suggestions (0 = unlimited)
    pub fn new(snapshot: watch::Receiver<SuggestionSnapshot>, limit: usize) -> Self {
        Self { snapshot, limit }
    }
}

impl Completer for KqlCompleter {
    fn complete(&mut self, line: &str, pos: usize) -> Vec<Suggestion> {
        let engine = self.snapshot.borrow().engine.clone();
        let pos = clamp_cursor(line, pos);
        let (context, suggestions) = engine.complete(line, pos, self.limit);

        suggestions
            .into_iter()
            .map(|s| Suggestion {
                value: s.text,
                description: Some(s.description),
                style: None,
                extra: None,
                span: Span::new(context.token_start, pos),
                append_whitespace: false,
                match_indices: None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Column;
    use crate::repl::completion::{SchemaCache, SuggestionEngine};

    fn create_test_completer() -> (watch::Sender<SuggestionSnapshot>, KqlCompleter) {
        let mut schemas = SchemaCache::new();
        schemas.set(
            "AzureActivity",
            vec![
                Column::new("Caller", "string"),
                Column::new("TimeGenerated", "datetime"),
            ],
        );
        let snapshot = SuggestionSnapshot {
            engine: SuggestionEngine::new(
                vec!["AzureActivity".to_string(), "Heartbeat".to_string()],
                schemas,
            ),
            ..Default::default()
        };
        let (tx, rx) = watch::channel(snapshot);
        (tx, KqlCompleter::new(rx, 10))
    }

    #[test]
    fn test_complete_table() {
        let (_tx, mut completer) = create_test_completer();
        let suggestions = completer.complete("Az", 2);
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].value, "AzureActivity");
        assert_eq!(suggestions[0].description.as_deref(), Some("Table"));
    }

    #[test]
    fn test_complete_column_with_type() {
        let (_tx, mut completer) = create_test_completer();
        let line = "AzureActivity | where Ti";
        let suggestions = completer.complete(line, line.len());
        assert_eq!(suggestions[0].value, "TimeGenerated");
        assert_eq!(suggestions[0].description.as_deref(), Some("datetime"));
    }

    #[test]
    fn test_span_position() {
        let (_tx, mut completer) = create_test_completer();
        let suggestions = completer.complete("Heartbeat | wh", 14);

        for suggestion in suggestions {
            assert_eq!(suggestion.span.start, 12);
            assert_eq!(suggestion.span.end, 14);
        }
    }

    #[test]
    fn test_sees_newly_published_tables() {
        let (tx, mut completer) = create_test_completer();
        assert!(completer.complete("Sig", 3).is_empty());

        tx.send_modify(|snapshot| {
            snapshot.engine.set_tables(vec!["SigninLogs".to_string()]);
        });
        assert_eq!(completer.complete("Sig", 3)[0].value, "SigninLogs");
    }
}
