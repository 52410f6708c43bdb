//! Runtime configuration.

/// Default limit on nested constructions and body calls.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Settings for a [`Runtime`](crate::Runtime).
///
/// ```
/// use objmodel_runtime::RuntimeConfig;
///
/// let config = RuntimeConfig::new()
///     .with_max_depth(32)
///     .with_strict_uninitialized(true);
/// assert_eq!(config.max_depth, 32);
/// assert!(config.journal);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Maximum nesting of constructor levels and body calls.
    pub max_depth: usize,
    /// Record `emit` lines in the journal.
    pub journal: bool,
    /// Reading a stored property before its initializer ran is an error
    /// instead of yielding `null`.
    pub strict_uninitialized: bool,
}

impl RuntimeConfig {
    pub fn new() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            journal: true,
            strict_uninitialized: false,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_journal(mut self, enabled: bool) -> Self {
        self.journal = enabled;
        self
    }

    pub fn with_strict_uninitialized(mut self, strict: bool) -> Self {
        self.strict_uninitialized = strict;
        self
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self::new()
    }
}
