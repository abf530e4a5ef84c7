//! Validator for reedline - decides when a query is ready to submit

use reedline::{ValidationResult, Validator};

/// KQL validator for reedline.
///
/// Input is incomplete while brackets or string literals are open, or while
/// it ends with a pipe, so Enter starts a new line instead of submitting.
#[derive(Debug, Default)]
pub struct KqlValidator;

impl KqlValidator {
    pub fn new() -> Self {
        Self
    }

    /// Check if input has balanced brackets and closed strings
    fn is_balanced(input: &str) -> bool {
        let mut depth: i32 = 0;
        let mut in_string = false;
        let mut string_char = ' ';
        let mut escape_next = false;

        for ch in input.chars() {
            if escape_next {
                escape_next = false;
                continue;
            }

            if in_string {
                match ch {
                    '\\' => escape_next = true,
                    c if c == string_char => in_string = false,
                    _ => {}
                }
                continue;
            }

            match ch {
                '"' | '\'' => {
                    in_string = true;
                    string_char = ch;
                }
                '(' | '[' | '{' => depth += 1,
                ')' | ']' | '}' => depth -= 1,
                _ => {}
            }
        }

        !in_string && depth <= 0
    }
}

impl Validator for KqlValidator {
    fn validate(&self, line: &str) -> ValidationResult {
        let trimmed = line.trim();

        if trimmed.is_empty() {
            return ValidationResult::Complete;
        }

        if trimmed.ends_with('|') || !Self::is_balanced(trimmed) {
            return ValidationResult::Incomplete;
        }

        ValidationResult::Complete
    }
}
