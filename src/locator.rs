//! Finds test classes and their lifecycle methods

use crate::parser::{ClassNode, ClassTree, MethodNode, StatementSpan};
use std::fmt;

/// The conventional `unittest` base class
pub const DEFAULT_BASE_CLASS: &str = "TestCase";

/// Base class names that make a class test-relevant.
///
/// An entry without a dot matches the last segment of a base (`TestCase` matches
/// `unittest.TestCase`); a dotted entry must match the whole base as written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseClasses {
    names: Vec<String>,
}

impl Default for BaseClasses {
    fn default() -> Self {
        Self::new([DEFAULT_BASE_CLASS])
    }
}

impl BaseClasses {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Self { names: Vec::new() };
        set.extend(names);
        set
    }

    pub fn extend<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            let name = name.into().trim().to_string();
            if !name.is_empty() && !self.names.contains(&name) {
                self.names.push(name);
            }
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn matches(&self, base: &str) -> bool {
        let last_segment = base.rsplit('.').next().unwrap_or(base);
        self.names.iter().any(|name| {
            if name.contains('.') {
                name == base
            } else {
                name == last_segment
            }
        })
    }
}

/// Which lifecycle hook a method overrides, by case-insensitive name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    SetUp,
    TearDown,
}

impl Role {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "setup" => Some(Role::SetUp),
            "teardown" => Some(Role::TearDown),
            _ => None,
        }
    }

    /// The exact spelling test runners look up
    pub fn expected_name(self) -> &'static str {
        match self {
            Role::SetUp => "setUp",
            Role::TearDown => "tearDown",
        }
    }

    /// The delegating statement every override must end with
    pub fn super_call(self) -> String {
        format!("super().{}()", self.expected_name())
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.expected_name())
    }
}

/// A test-relevant class with its lifecycle methods
#[derive(Debug)]
pub struct ClassRecord<'a> {
    /// Dotted path through every enclosing class, `Outer.Inner`
    pub qualified_name: String,
    pub methods: Vec<MethodRecord<'a>>,
}

#[derive(Debug)]
pub struct MethodRecord<'a> {
    pub node: &'a MethodNode,
    pub role: Role,
    pub casing_ok: bool,
}

impl<'a> MethodRecord<'a> {
    pub fn name(&self) -> &'a str {
        &self.node.name
    }

    pub fn statements(&self) -> &'a [StatementSpan] {
        &self.node.statements
    }

    /// Whether `stmt` is a delegating call this method can end with. The declared
    /// name counts as well as the exact spelling, so a mis-cased `setup` ending in
    /// `super().setUp()` only gets the casing complaint.
    pub fn is_matching_call(&self, stmt: &StatementSpan) -> bool {
        stmt.callee()
            .is_some_and(|callee| callee == self.name() || callee == self.role.expected_name())
    }
}

/// Test-relevant classes of `tree`, in pre-order. Relevance is decided per class;
/// a nested class is visited whether or not its enclosing class is relevant.
pub fn locate<'a>(tree: &'a ClassTree, base_classes: &BaseClasses) -> Vec<ClassRecord<'a>> {
    let mut records = Vec::new();
    for class in &tree.classes {
        visit(class, "", base_classes, &mut records);
    }
    records
}

fn visit<'a>(
    class: &'a ClassNode,
    prefix: &str,
    base_classes: &BaseClasses,
    records: &mut Vec<ClassRecord<'a>>,
) {
    let qualified_name = if prefix.is_empty() {
        class.name.clone()
    } else {
        format!("{}.{}", prefix, class.name)
    };

    if class.bases.iter().any(|base| base_classes.matches(base)) {
        let methods = class
            .methods
            .iter()
            .filter_map(|method| {
                Role::from_name(&method.name).map(|role| MethodRecord {
                    node: method,
                    role,
                    casing_ok: method.name == role.expected_name(),
                })
            })
            .collect();

        records.push(ClassRecord {
            qualified_name: qualified_name.clone(),
            methods,
        });
    }

    for nested in &class.nested {
        visit(nested, &qualified_name, base_classes, records);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use crate::source::SourceFile;

    fn locate_names(code: &str, base_classes: &BaseClasses) -> Vec<(String, Vec<String>)> {
        let source = SourceFile::new(code);
        let tree = parse(&source, "test.py").unwrap();
        locate(&tree, base_classes)
            .iter()
            .map(|record| {
                (
                    record.qualified_name.clone(),
                    record.methods.iter().map(|m| m.name().to_string()).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn test_base_class_matching() {
        let bases = BaseClasses::default();
        assert!(bases.matches("TestCase"));
        assert!(bases.matches("unittest.TestCase"));
        assert!(!bases.matches("SimpleTestCase"));
        assert!(!bases.matches("TestCaseMixin"));

        let dotted = BaseClasses::new(["django.test.TestCase"]);
        assert!(dotted.matches("django.test.TestCase"));
        assert!(!dotted.matches("TestCase"));
        assert!(!dotted.matches("unittest.TestCase"));
    }

    #[test]
    fn test_role_from_name() {
        assert_eq!(Role::from_name("setUp"), Some(Role::SetUp));
        assert_eq!(Role::from_name("SETUP"), Some(Role::SetUp));
        assert_eq!(Role::from_name("Teardown"), Some(Role::TearDown));
        assert_eq!(Role::from_name("setUpClass"), None);
        assert_eq!(Role::from_name("asyncSetUp"), None);
        assert_eq!(Role::SetUp.super_call(), "super().setUp()");
    }

    #[test]
    fn test_only_lifecycle_methods_collected() {
        let code = r#"
class T(TestCase):
    def setUp(self):
        pass
    def setUpClass(cls):
        pass
    def test_it(self):
        pass
    def teardown(self):
        pass
"#;
        let found = locate_names(code, &BaseClasses::default());
        assert_eq!(
            found,
            vec![("T".to_string(), vec!["setUp".to_string(), "teardown".to_string()])]
        );
    }

    #[test]
    fn test_non_test_classes_skipped_but_nested_visited() {
        let code = r#"
class Helper:
    def setUp(self):
        pass

    class InnerTest(unittest.TestCase):
        def setUp(self):
            pass
"#;
        let found = locate_names(code, &BaseClasses::default());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].0, "Helper.InnerTest");
    }

    #[test]
    fn test_custom_base_classes() {
        let code = r#"
class A(APITestCase):
    def setUp(self):
        pass

class B(TestCase):
    def setUp(self):
        pass
"#;
        let mut bases = BaseClasses::default();
        bases.extend(["APITestCase"]);
        let found = locate_names(code, &bases);
        assert_eq!(found.len(), 2);

        let only_api = locate_names(code, &BaseClasses::new(["APITestCase"]));
        assert_eq!(only_api.len(), 1);
        assert_eq!(only_api[0].0, "A");
    }

    #[test]
    fn test_qualified_names_in_pre_order() {
        let code = r#"
class O(TestCase):
    class I(TestCase):
        class J(TestCase):
            pass

    def setUp(self):
        class Local(TestCase):
            pass
        super().setUp()
"#;
        let names: Vec<String> = locate_names(code, &BaseClasses::default())
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(names, vec!["O", "O.I", "O.I.J", "O.Local"]);
    }
}
