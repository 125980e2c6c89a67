//! Where (if anywhere) a lifecycle method delegates to its parent

use crate::locator::MethodRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delegation {
    /// The matching `super()` call is the final statement
    Ok,
    /// No matching `super()` call in the body
    Missing,
    /// The last matching `super()` call sits at `call`, before other statements
    NotLast { call: usize },
}

/// Classify a method body. Only the last matching call counts; earlier duplicates
/// are ignored.
pub fn classify(method: &MethodRecord) -> Delegation {
    let statements = method.statements();
    match statements
        .iter()
        .rposition(|stmt| method.is_matching_call(stmt))
    {
        None => Delegation::Missing,
        Some(idx) if idx + 1 == statements.len() => Delegation::Ok,
        Some(idx) => Delegation::NotLast { call: idx },
    }
}
