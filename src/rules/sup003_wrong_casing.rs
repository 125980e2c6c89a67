//! SUP003: Wrong casing
//!
//! unittest only discovers `setUp` and `tearDown` under their exact spelling.
//! This rule has no autofix.

use crate::models::{MethodContext, Violation, ViolationKind};
use crate::rules::base::LintRule;

pub struct WrongCasingRule;

impl WrongCasingRule {
    pub fn new() -> Self {
        Self
    }
}

impl LintRule for WrongCasingRule {
    fn rule_id(&self) -> &str {
        ViolationKind::WrongCasing.code()
    }

    fn description(&self) -> &str {
        "Lifecycle methods must be spelled setUp / tearDown"
    }

    fn check(&self, context: &MethodContext) -> Vec<Violation> {
        if context.method.casing_ok {
            return Vec::new();
        }

        vec![Violation::new(
            ViolationKind::WrongCasing,
            format!(
                "use correct casing: {} (found {})",
                context.method.role.expected_name(),
                context.method.name()
            ),
            context.method.node.header_offset,
            context.file_path,
            context.source,
        )
        .with_symbol(context.symbol())]
    }
}
