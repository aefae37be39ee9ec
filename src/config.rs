//! Execution configuration.
//!
//! Every limit is optional except the call depth, which mirrors a conventional interpreter recursion limit.

use std::time::Duration;

/// Default maximum depth of nested user-function calls.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 200;
/// Default stack size of the worker thread an execution runs on.
pub const DEFAULT_STACK_SIZE: usize = 32 * 1024 * 1024;

/// What the engine does with globals that have no [`crate::Value`] equivalent when it reads the namespace back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnrepresentablePolicy {
    /// Report them as `Value::Unrepresentable { type_name }`.
    #[default]
    Placeholder,
    /// Leave them out (also inside nested sequences and mappings).
    Omit,
}

/// Execution configuration
#[derive(Debug, Clone)]
pub struct ExecConfig {
    /// Maximum depth of nested function calls before `RecursionError`
    pub max_call_depth: usize,
    /// Wall-clock budget for one execution
    pub deadline: Option<Duration>,
    /// Budget of executed statements and loop iterations
    pub max_steps: Option<u64>,
    /// Stack size of the worker thread
    pub stack_size: usize,
    /// Read-back policy for non-representable globals
    pub unrepresentable: UnrepresentablePolicy,
}

impl Default for ExecConfig {
    fn default() -> Self {
        Self {
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            deadline: None,
            max_steps: None,
            stack_size: DEFAULT_STACK_SIZE,
            unrepresentable: UnrepresentablePolicy::Placeholder,
        }
    }
}

impl ExecConfig {
    /// Create a new config with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum call depth
    pub fn with_max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = depth;
        self
    }

    /// Set the wall-clock budget
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Set the statement/iteration budget
    pub fn with_max_steps(mut self, steps: u64) -> Self {
        self.max_steps = Some(steps);
        self
    }

    /// Set the worker thread stack size (bytes)
    pub fn with_stack_size(mut self, bytes: usize) -> Self {
        self.stack_size = bytes;
        self
    }

    /// Set the read-back policy for non-representable globals
    pub fn with_unrepresentable(mut self, policy: UnrepresentablePolicy) -> Self {
        self.unrepresentable = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ExecConfig::default();
        assert_eq!(config.max_call_depth, 200);
        assert_eq!(config.deadline, None);
        assert_eq!(config.max_steps, None);
        assert_eq!(config.stack_size, 32 * 1024 * 1024);
        assert_eq!(config.unrepresentable, UnrepresentablePolicy::Placeholder);
    }

    #[test]
    fn test_builder_chain() {
        let config = ExecConfig::new()
            .with_max_call_depth(50)
            .with_deadline(Duration::from_millis(250))
            .with_max_steps(10_000)
            .with_unrepresentable(UnrepresentablePolicy::Omit);

        assert_eq!(config.max_call_depth, 50);
        assert_eq!(config.deadline, Some(Duration::from_millis(250)));
        assert_eq!(config.max_steps, Some(10_000));
        assert_eq!(config.unrepresentable, UnrepresentablePolicy::Omit);
        // Other fields unchanged
        assert_eq!(config.stack_size, DEFAULT_STACK_SIZE);
    }

    #[test]
    fn test_builder_override() {
        let config = ExecConfig::new().with_max_steps(1).with_max_steps(2);
        assert_eq!(config.max_steps, Some(2)); // Last value wins
    }
}
