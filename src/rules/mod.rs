//! Lint rules for super-hooks

pub mod base;
pub mod delegation;

// Rule implementations
pub mod sup001_missing_super_call;
pub mod sup002_super_call_not_last;
pub mod sup003_wrong_casing;

use base::LintRule;

/// Get all available rules
pub fn get_all_rules() -> Vec<Box<dyn LintRule>> {
    vec![
        Box::new(sup001_missing_super_call::MissingSuperCallRule::new()),
        Box::new(sup002_super_call_not_last::SuperCallNotLastRule::new()),
        Box::new(sup003_wrong_casing::WrongCasingRule::new()),
    ]
}

/// Get all available rule IDs
pub fn get_all_rule_ids() -> Vec<String> {
    get_all_rules()
        .iter()
        .map(|rule| rule.rule_id().to_string())
        .collect()
}

/// Get rules filtered by enabled IDs
pub fn get_enabled_rules(enabled_ids: Option<&[String]>) -> Vec<Box<dyn LintRule>> {
    let all_rules = get_all_rules();

    match enabled_ids {
        Some(ids) => all_rules
            .into_iter()
            .filter(|rule| ids.iter().any(|id| id.eq_ignore_ascii_case(rule.rule_id())))
            .collect(),
        None => all_rules,
    }
}
