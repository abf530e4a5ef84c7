//! Interactive query composer for kqlsh
//!
//! This module wires the suggestion runtime into a reedline editor:
//! - Tab opens a menu of ranked local suggestions
//! - Edits are forwarded to the runtime, which debounces remote requests
//! - The latest AI suggestion is shown as ghost text and accepted with →
//! - Alt+S or Ctrl+Space asks for an AI suggestion right away
//! - KQL syntax highlighting
//! - Multi-line input while brackets are open or the query ends with a pipe
//! - File-backed history

pub mod completion;
mod completer;
mod highlighter;
mod hinter;
mod prompt;
mod validator;

use reedline::{
    ColumnarMenu, Emacs, FileBackedHistory, History, KeyCode, KeyModifiers, Keybindings,
    MenuBuilder, Reedline, ReedlineEvent, ReedlineMenu, Signal, default_emacs_keybindings,
};
use std::fs;
use tokio::sync::mpsc;

use crate::config::{Config, HistoryConfig};
use crate::error::Result;
use completion::{SuggestionEvent, SuggestionHandle};

pub use completer::KqlCompleter;
pub use highlighter::KqlHighlighter;
pub use hinter::KqlHinter;
pub use prompt::KqlPrompt;
pub use validator::KqlValidator;

const COMPLETION_MENU: &str = "completion_menu";

/// Host command emitted by the suggest-now key binding. The leading NUL keeps
/// it from colliding with anything a user can submit.
const MANUAL_TRIGGER_COMMAND: &str = "\u{0}kqlsh:suggest";

/// REPL engine reading queries from the terminal
pub struct ReplEngine {
    /// Line editor
    editor: Reedline,
    /// Prompt shown before each query
    prompt: KqlPrompt,
    /// Events into the suggestion runtime
    events: mpsc::UnboundedSender<SuggestionEvent>,
}

/// What one editor read produced
#[derive(Debug, PartialEq, Eq)]
enum ReadOutcome {
    /// Submitted buffer, empty on Ctrl-C, `None` on Ctrl-D
    Line(Option<String>),
    /// The suggest-now binding fired; the buffer is still being edited
    Triggered,
}

impl ReplEngine {
    /// Create a new REPL engine
    ///
    /// # Arguments
    /// * `config` - Application configuration
    /// * `suggestions` - Handle to the running suggestion runtime
    /// * `catalog_name` - Name shown in the prompt
    /// * `ai_enabled` - Whether a remote suggester is configured
    pub fn new(
        config: &Config,
        suggestions: &SuggestionHandle,
        catalog_name: &str,
        ai_enabled: bool,
    ) -> Result<Self> {
        let completer = KqlCompleter::new(suggestions.subscribe(), config.suggest.popup_limit);
        let hinter = KqlHinter::new(suggestions.sender(), suggestions.subscribe());
        let highlighter = KqlHighlighter::new(
            config.display.syntax_highlighting && config.display.color_output,
        );

        let menu = ColumnarMenu::default().with_name(COMPLETION_MENU);

        let editor = Reedline::create()
            .with_history(create_history(&config.history)?)
            .with_completer(Box::new(completer))
            .with_menu(ReedlineMenu::EngineCompleter(Box::new(menu)))
            .with_hinter(Box::new(hinter))
            .with_highlighter(Box::new(highlighter))
            .with_validator(Box::new(KqlValidator::new()))
            .with_edit_mode(Box::new(Emacs::new(keybindings())));

        Ok(Self {
            editor,
            prompt: KqlPrompt::new(catalog_name, ai_enabled),
            events: suggestions.sender(),
        })
    }

    /// Read one query
    ///
    /// # Returns
    /// * `Result<Option<String>>` - The submitted query, empty on Ctrl-C, `None` on Ctrl-D
    pub fn read_line(&mut self) -> Result<Option<String>> {
        loop {
            let signal = self.editor.read_line(&self.prompt)?;
            match route_signal(signal, &self.events) {
                ReadOutcome::Line(line) => return Ok(line),
                ReadOutcome::Triggered => continue,
            }
        }
    }
}

/// Emacs bindings plus the completion menu and the suggest-now keys
fn keybindings() -> Keybindings {
    let mut keybindings = default_emacs_keybindings();
    keybindings.add_binding(
        KeyModifiers::NONE,
        KeyCode::Tab,
        ReedlineEvent::UntilFound(vec![
            ReedlineEvent::Menu(COMPLETION_MENU.to_string()),
            ReedlineEvent::MenuNext,
        ]),
    );
    keybindings.add_binding(
        KeyModifiers::SHIFT,
        KeyCode::BackTab,
        ReedlineEvent::MenuPrevious,
    );

    let suggest_now = ReedlineEvent::ExecuteHostCommand(MANUAL_TRIGGER_COMMAND.to_string());
    keybindings.add_binding(KeyModifiers::ALT, KeyCode::Char('s'), suggest_now.clone());
    keybindings.add_binding(KeyModifiers::CONTROL, KeyCode::Char(' '), suggest_now);
    keybindings
}

/// Turn an editor signal into a submitted line, forwarding the suggest-now
/// command to the runtime
fn route_signal(signal: Signal, events: &mpsc::UnboundedSender<SuggestionEvent>) -> ReadOutcome {
    match signal {
        Signal::Success(buffer) if buffer == MANUAL_TRIGGER_COMMAND => {
            let _ = events.send(SuggestionEvent::ManualTrigger);
            ReadOutcome::Triggered
        }
        Signal::Success(buffer) => ReadOutcome::Line(Some(buffer)),
        Signal::CtrlD => ReadOutcome::Line(None),
        _ => ReadOutcome::Line(Some(String::new())),
    }
}

/// Open the history file, or an in-memory history when persistence is off
fn create_history(config: &HistoryConfig) -> Result<Box<dyn History>> {
    if !config.persist {
        return Ok(Box::new(FileBackedHistory::new(config.max_size)?));
    }

    if let Some(parent) = config.file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let history = FileBackedHistory::with_file(config.max_size, config.file_path.clone())?;
    Ok(Box::new(history))
}
