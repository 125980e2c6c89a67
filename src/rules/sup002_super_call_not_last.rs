//! SUP002: super() call not last
//!
//! The delegating call must be the final statement of setUp/tearDown.

use crate::models::{MethodContext, Violation, ViolationKind};
use crate::rules::base::LintRule;
use crate::rules::delegation::{classify, Delegation};

pub struct SuperCallNotLastRule;

impl SuperCallNotLastRule {
    pub fn new() -> Self {
        Self
    }
}

impl LintRule for SuperCallNotLastRule {
    fn rule_id(&self) -> &str {
        ViolationKind::SuperCallNotLast.code()
    }

    fn description(&self) -> &str {
        "The super() call in setUp/tearDown must be the last statement"
    }

    fn check(&self, context: &MethodContext) -> Vec<Violation> {
        let Delegation::NotLast { .. } = classify(context.method) else {
            return Vec::new();
        };

        vec![Violation::new(
            ViolationKind::SuperCallNotLast,
            format!(
                "{} must be the last line of {}",
                context.method.role.super_call(),
                context.method.name()
            ),
            context.method.node.header_offset,
            context.file_path,
            context.source,
        )
        .with_symbol(context.symbol())]
    }
}
