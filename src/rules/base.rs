//! Base trait for all lint rules

use crate::models::{MethodContext, Violation};

/// Base trait that all lint rules must implement
pub trait LintRule: Send + Sync {
    /// The unique identifier for this rule (e.g., "SUP001")
    fn rule_id(&self) -> &str;

    /// Short description of what the rule checks
    fn description(&self) -> &str;

    /// Perform the lint check on one lifecycle method
    fn check(&self, context: &MethodContext) -> Vec<Violation>;
}
