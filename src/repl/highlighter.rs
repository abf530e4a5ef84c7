//! Syntax highlighter for KQL queries

use nu_ansi_term::{Color, Style};
use reedline::{Highlighter, StyledText};

use super::completion::vocabulary::{is_function, is_operator, is_word_operator};

/// KQL syntax highlighter
pub struct KqlHighlighter {
    enabled: bool,
}

impl KqlHighlighter {
    /// Create a highlighter; a disabled one returns the line unstyled
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    fn word_style(word: &str, next: Option<char>) -> Style {
        if word.starts_with(|c: char| c.is_ascii_digit()) {
            Color::Purple.into()
        } else if next == Some('(') && is_function(word) {
            Color::Green.into()
        } else if is_operator(word) {
            Color::Blue.bold()
        } else if is_word_operator(word) {
            Color::Cyan.into()
        } else {
            Style::default()
        }
    }

    fn symbol_style(ch: char) -> Style {
        match ch {
            '|' => Color::Magenta.bold(),
            '(' | ')' | '[' | ']' | '{' | '}' => Color::Cyan.into(),
            ',' | ';' | '.' => Color::DarkGray.into(),
            '=' | '!' | '<' | '>' | '+' | '-' | '*' | '/' | '%' => Color::Magenta.into(),
            _ => Style::default(),
        }
    }

    fn highlight_kql(line: &str) -> StyledText {
        let mut styled = StyledText::new();
        let chars: Vec<char> = line.chars().collect();
        let mut i = 0;

        while i < chars.len() {
            let ch = chars[i];

            // Line comment runs to the end of the line
            if ch == '/' && chars.get(i + 1) == Some(&'/') {
                let end = chars[i..]
                    .iter()
                    .position(|&c| c == '\n')
                    .map(|p| i + p)
                    .unwrap_or(chars.len());
                let comment: String = chars[i..end].iter().collect();
                styled.push((Color::DarkGray.dimmed(), comment));
                i = end;
                continue;
            }

            if ch == '"' || ch == '\'' {
                let mut j = i + 1;
                while j < chars.len() && chars[j] != ch {
                    if chars[j] == '\\' {
                        j += 1;
                    }
                    j += 1;
                }
                let end = (j + 1).min(chars.len());
                let literal: String = chars[i..end].iter().collect();
                styled.push((Color::Yellow.into(), literal));
                i = end;
                continue;
            }

            if ch.is_alphanumeric() || ch == '_' {
                let mut j = i + 1;
                while j < chars.len() {
                    let c = chars[j];
                    let dashed = c == '-' && chars.get(j + 1).is_some_and(|n| n.is_alphanumeric());
                    if c.is_alphanumeric() || c == '_' || dashed {
                        j += 1;
                    } else {
                        break;
                    }
                }
                let word: String = chars[i..j].iter().collect();
                let style = Self::word_style(&word, chars.get(j).copied());
                styled.push((style, word));
                i = j;
                continue;
            }

            styled.push((Self::symbol_style(ch), ch.to_string()));
            i += 1;
        }

        styled
    }
}

impl Default for KqlHighlighter {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Highlighter for KqlHighlighter {
    fn highlight(&self, line: &str, _cursor: usize) -> StyledText {
        if !self.enabled {
            let mut styled = StyledText::new();
            styled.push((Style::default(), line.to_string()));
            return styled;
        }

        Self::highlight_kql(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segments(line: &str) -> Vec<(Style, String)> {
        KqlHighlighter::default().highlight(line, 0).buffer
    }

    fn style_of(line: &str, token: &str) -> Style {
        segments(line)
            .into_iter()
            .find(|(_, text)| text == token)
            .map(|(style, _)| style)
            .unwrap_or_else(|| panic!("token {token:?} not found"))
    }

    #[test]
    fn test_roundtrip_text() {
        let line = "AzureActivity\n| where Caller has \"adm\\\"in\" // recent\n| take 10";
        let joined: String = segments(line).into_iter().map(|(_, t)| t).collect();
        assert_eq!(joined, line);
    }

    #[test]
    fn test_operators_and_pipes() {
        let line = "Heartbeat | mv-expand Tags | take 5";
        assert_eq!(style_of(line, "mv-expand"), Color::Blue.bold());
        assert_eq!(style_of(line, "take"), Color::Blue.bold());
        assert_eq!(style_of(line, "|"), Color::Magenta.bold());
        assert_eq!(style_of(line, "5"), Color::Purple.into());
        assert_eq!(style_of(line, "Heartbeat"), Style::default());
    }

    #[test]
    fn test_functions_need_parenthesis() {
        let line = "T | summarize count() by bin(TimeGenerated, 1h)";
        assert_eq!(style_of(line, "count"), Color::Green.into());
        assert_eq!(style_of(line, "bin"), Color::Green.into());
        assert_eq!(style_of(line, "summarize"), Color::Blue.bold());
        assert_eq!(style_of(line, "1h"), Color::Purple.into());
    }

    #[test]
    fn test_strings_and_comments() {
        let line = "T | where Name contains 'web' // filter\n| take 1";
        assert_eq!(style_of(line, "'web'"), Color::Yellow.into());
        assert_eq!(style_of(line, "contains"), Color::Cyan.into());
        assert_eq!(style_of(line, "// filter"), Color::DarkGray.dimmed());
    }

    #[test]
    fn test_unclosed_string() {
        let line = "T | where Name == 'we";
        assert_eq!(style_of(line, "'we"), Color::Yellow.into());
    }

    #[test]
    fn test_disabled() {
        let styled = KqlHighlighter::new(false).highlight("T | take 1", 0);
        assert_eq!(styled.buffer.len(), 1);
        assert_eq!(styled.buffer[0].1, "T | take 1");
    }
}
