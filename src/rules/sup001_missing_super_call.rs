//! SUP001: Missing super() call
//!
//! setUp/tearDown overrides must call the parent implementation.

use crate::models::{MethodContext, Violation, ViolationKind};
use crate::rules::base::LintRule;
use crate::rules::delegation::{classify, Delegation};

pub struct MissingSuperCallRule;

impl MissingSuperCallRule {
    pub fn new() -> Self {
        Self
    }
}

impl LintRule for MissingSuperCallRule {
    fn rule_id(&self) -> &str {
        ViolationKind::MissingSuperCall.code()
    }

    fn description(&self) -> &str {
        "setUp/tearDown must call super() as their last statement"
    }

    fn check(&self, context: &MethodContext) -> Vec<Violation> {
        if classify(context.method) != Delegation::Missing {
            return Vec::new();
        }

        let role = context.method.role;
        vec![Violation::new(
            ViolationKind::MissingSuperCall,
            format!(
                "{} must be the last line of {} (call is missing)",
                role.super_call(),
                context.method.name()
            ),
            context.method.node.header_offset,
            context.file_path,
            context.source,
        )
        .with_symbol(context.symbol())]
    }
}
