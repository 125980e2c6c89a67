//! `# noqa` suppression comments
//!
//! - `# noqa` on a method's `def` line suppresses every rule for that method
//! - `# noqa: SUP002` suppresses only the listed rules
//!
//! Suppressed violations are neither reported nor fixed.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};

/// Codes are letters followed by digits; anything after the last code is an
/// explanation (`# noqa: SUP003 legacy runner`)
static NOQA_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)#\s*noqa(?:\s*:\s*([A-Z]+[0-9]+(?:[\s,]+[A-Z]+[0-9]+)*))?").unwrap()
});

#[derive(Debug, Clone, PartialEq, Eq)]
enum Suppression {
    All,
    Rules(HashSet<String>),
}

/// noqa directives of one file, keyed by 1-indexed line
#[derive(Debug, Default)]
pub struct NoqaDirectives {
    lines: HashMap<usize, Suppression>,
}

impl NoqaDirectives {
    pub fn parse(source: &str) -> Self {
        let mut lines = HashMap::new();

        for (idx, line) in source.lines().enumerate() {
            let Some(caps) = NOQA_REGEX.captures(line) else {
                continue;
            };
            let rules: HashSet<String> = caps
                .get(1)
                .map(|codes| {
                    codes
                        .as_str()
                        .split(|c: char| c == ',' || c.is_whitespace())
                        .map(|code| code.trim().to_uppercase())
                        .filter(|code| !code.is_empty())
                        .collect()
                })
                .unwrap_or_default();

            let suppression = if rules.is_empty() {
                Suppression::All
            } else {
                Suppression::Rules(rules)
            };
            lines.insert(idx + 1, suppression);
        }

        Self { lines }
    }

    pub fn is_suppressed(&self, line: usize, rule_id: &str) -> bool {
        match self.lines.get(&line) {
            Some(Suppression::All) => true,
            Some(Suppression::Rules(rules)) => rules.contains(rule_id),
            None => false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blanket_noqa() {
        let source = r#"
class T(TestCase):
    def setUp(self):  # noqa
        pass
"#;
        let directives = NoqaDirectives::parse(source);
        assert!(directives.is_suppressed(3, "SUP001"));
        assert!(directives.is_suppressed(3, "SUP003"));
        assert!(!directives.is_suppressed(4, "SUP001"));
    }

    #[test]
    fn test_specific_rules() {
        let source = "def setup(self):  # noqa: SUP003, sup001\n";
        let directives = NoqaDirectives::parse(source);
        assert!(directives.is_suppressed(1, "SUP003"));
        assert!(directives.is_suppressed(1, "SUP001"));
        assert!(!directives.is_suppressed(1, "SUP002"));
    }

    #[test]
    fn test_no_directives() {
        let directives = NoqaDirectives::parse("x = 1\n# just a comment\n");
        assert!(directives.is_empty());
    }

    #[test]
    fn test_explanation_after_codes() {
        let directives = NoqaDirectives::parse("def setup(self):  # noqa: SUP003 legacy runner\n");
        assert!(directives.is_suppressed(1, "SUP003"));
        assert!(!directives.is_suppressed(1, "SUP001"));
    }

    #[test]
    fn test_space_separated_codes() {
        let directives = NoqaDirectives::parse("def setup(self):  # noqa:SUP001 SUP003\n");
        assert!(directives.is_suppressed(1, "SUP001"));
        assert!(directives.is_suppressed(1, "SUP003"));
        assert!(!directives.is_suppressed(1, "SUP002"));
    }
}
