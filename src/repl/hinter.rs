//! Hinter for reedline - forwards edits and shows AI suggestions as ghost text

use nu_ansi_term::{Color, Style};
use reedline::{Hinter, History};
use tokio::sync::{mpsc, watch};

use super::completion::{QueryState, SuggestionEvent, SuggestionSnapshot};

/// Hinter bridging the editor and the suggestion runtime.
///
/// Reedline calls the hinter on every repaint. A changed line is forwarded to
/// the runtime as a keystroke, which restarts the debounce window and drops
/// any AI suggestion. A repaint without an edit shows the latest AI suggestion
/// when it extends the current line.
pub struct KqlHinter {
    events: mpsc::UnboundedSender<SuggestionEvent>,
    snapshot: watch::Receiver<SuggestionSnapshot>,
    style: Style,
    last_line: String,
    current_hint: String,
}

impl KqlHinter {
    /// Create a new hinter
    ///
    /// # Arguments
    /// * `events` - Sender into the suggestion runtime
    /// * `snapshot` - Receiver for the runtime state
    pub fn new(
        events: mpsc::UnboundedSender<SuggestionEvent>,
        snapshot: watch::Receiver<SuggestionSnapshot>,
    ) -> Self {
        Self {
            events,
            snapshot,
            style: Style::new().italic().fg(Color::DarkGray),
            last_line: String::new(),
            current_hint: String::new(),
        }
    }
}

impl Hinter for KqlHinter {
    fn handle(
        &mut self,
        line: &str,
        pos: usize,
        _history: &dyn History,
        use_ansi_coloring: bool,
        _cwd: &str,
    ) -> String {
        self.current_hint.clear();

        if line != self.last_line {
            self.last_line = line.to_string();
            let _ = self
                .events
                .send(SuggestionEvent::Keystroke(QueryState::new(line, pos)));
            return String::new();
        }

        // Ghost text only makes sense at the end of the line
        if pos != line.len() || line.trim().is_empty() {
            return String::new();
        }

        let Some(hint) = self.snapshot.borrow().ghost_text(line).map(str::to_string) else {
            return String::new();
        };
        self.current_hint = hint;

        if use_ansi_coloring {
            self.style.paint(&self.current_hint).to_string()
        } else {
            self.current_hint.clone()
        }
    }

    fn complete_hint(&self) -> String {
        self.current_hint.clone()
    }

    fn next_hint_token(&self) -> String {
        let hint = &self.current_hint;
        let start = hint.len() - hint.trim_start().len();
        let end = hint[start..]
            .find(char::is_whitespace)
            .map(|i| start + i)
            .unwrap_or(hint.len());
        hint[..end].to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reedline::FileBackedHistory;

    struct Fixture {
        hinter: KqlHinter,
        events: mpsc::UnboundedReceiver<SuggestionEvent>,
        snapshot: watch::Sender<SuggestionSnapshot>,
        history: FileBackedHistory,
    }

    fn fixture() -> Fixture {
        let (events_tx, events) = mpsc::unbounded_channel();
        let (snapshot, snapshot_rx) = watch::channel(SuggestionSnapshot::default());
        Fixture {
            hinter: KqlHinter::new(events_tx, snapshot_rx),
            events,
            snapshot,
            history: FileBackedHistory::new(10).unwrap(),
        }
    }

    impl Fixture {
        fn hint(&mut self, line: &str) -> String {
            self.hinter
                .handle(line, line.len(), &self.history, false, "/tmp")
        }

        fn suggest(&self, text: &str) {
            self.snapshot
                .send_modify(|s| s.ai_suggestion = Some(text.to_string()));
        }
    }

    #[test]
    fn test_edit_is_forwarded_as_keystroke() {
        let mut f = fixture();
        assert_eq!(f.hint("Heart"), "");

        match f.events.try_recv() {
            Ok(SuggestionEvent::Keystroke(query)) => {
                assert_eq!(query.text(), "Heart");
                assert_eq!(query.cursor(), 5);
            }
            other => panic!("expected keystroke, got {other:?}"),
        }
    }

    #[test]
    fn test_initial_empty_line_is_not_forwarded() {
        let mut f = fixture();
        assert_eq!(f.hint(""), "");
        assert!(f.events.try_recv().is_err());
    }

    #[test]
    fn test_repaint_shows_ghost_text() {
        let mut f = fixture();
        f.hint("Heartbeat");
        f.suggest("Heartbeat | take 10");

        assert_eq!(f.hint("Heartbeat"), " | take 10");
        assert_eq!(f.hinter.complete_hint(), " | take 10");
        assert_eq!(f.hinter.next_hint_token(), " |");
        // Only the edit was forwarded
        assert!(f.events.try_recv().is_ok());
        assert!(f.events.try_recv().is_err());
    }

    #[test]
    fn test_edit_hides_ghost_text() {
        let mut f = fixture();
        f.hint("Heartbeat");
        f.suggest("Heartbeat | take 10");
        f.hint("Heartbeat");

        assert_eq!(f.hint("Heartbeat |"), "");
        assert_eq!(f.hinter.complete_hint(), "");
    }

    #[test]
    fn test_unrelated_suggestion_is_not_shown() {
        let mut f = fixture();
        f.hint("Heartbeat");
        f.suggest("SigninLogs | take 10");
        assert_eq!(f.hint("Heartbeat"), "");
    }

    #[test]
    fn test_cursor_not_at_end_no_hint() {
        let mut f = fixture();
        f.hint("Heartbeat");
        f.suggest("Heartbeat | take 10");
        let hint = f.hinter.handle("Heartbeat", 2, &f.history, false, "/tmp");
        assert_eq!(hint, "");
    }
}
