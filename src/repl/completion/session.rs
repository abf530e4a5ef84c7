//! Per-session suggestion state: schema cache, known tables and generation tags

use serde::Serialize;
use std::fmt;

use super::engine::SuggestionEngine;
use super::schema_cache::SchemaCache;

/// Identifies one suggestion request; later requests carry larger tags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct GenerationTag(u64);

impl GenerationTag {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for GenerationTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// State that lives as long as a data source session.
///
/// Owned by the orchestrator; tests build one directly to start from a known
/// catalog and tag.
#[derive(Debug, Clone, Default)]
pub struct SuggestionSession {
    engine: SuggestionEngine,
    generation: GenerationTag,
}

impl SuggestionSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an engine that already knows some tables and schemas
    pub fn with_engine(engine: SuggestionEngine) -> Self {
        Self {
            engine,
            generation: GenerationTag::default(),
        }
    }

    pub fn engine(&self) -> &SuggestionEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut SuggestionEngine {
        &mut self.engine
    }

    pub fn schemas(&self) -> &SchemaCache {
        self.engine.schemas()
    }

    pub fn schemas_mut(&mut self) -> &mut SchemaCache {
        self.engine.schemas_mut()
    }

    /// Most recently issued tag
    pub fn current_generation(&self) -> GenerationTag {
        self.generation
    }

    /// Issue a new tag, making every earlier one stale
    pub fn next_generation(&mut self) -> GenerationTag {
        self.generation = GenerationTag(self.generation.0 + 1);
        self.generation
    }

    /// Whether `tag` is the most recently issued one
    pub fn is_current(&self, tag: GenerationTag) -> bool {
        tag == self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_strictly_increase() {
        let mut session = SuggestionSession::new();
        let first = session.next_generation();
        let second = session.next_generation();
        assert!(second > first);
        assert!(session.is_current(second));
        assert!(!session.is_current(first));
        assert_eq!(second.value(), 2);
        assert_eq!(second.to_string(), "#2");
    }

    #[test]
    fn test_session_owns_cache() {
        let mut session = SuggestionSession::new();
        session.schemas_mut().set("Heartbeat", Vec::new());
        assert!(session.engine().schemas().contains("Heartbeat"));
    }
}
