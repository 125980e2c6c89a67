//! Structural view of a Python module
//!
//! Reduces the full rustpython AST to what the lifecycle rules need: classes
//! (nested at any depth), their methods, and the top-level statements of each
//! method body with byte spans into the original text.

use crate::error::CheckError;
use crate::source::SourceFile;
use rustpython_ast::text_size::TextRange;
use rustpython_ast::{Constant, ExceptHandler, Expr, Mod, Ranged, Stmt, StmtClassDef};
use rustpython_parser::{parse as parse_python, Mode};

/// Half-open byte range `[start, end)` into the original text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl From<TextRange> for Span {
    fn from(range: TextRange) -> Self {
        Self {
            start: usize::from(range.start()),
            end: usize::from(range.end()),
        }
    }
}

/// All classes of a module, outermost first
#[derive(Debug, Default)]
pub struct ClassTree {
    pub classes: Vec<ClassNode>,
}

#[derive(Debug)]
pub struct ClassNode {
    pub name: String,
    /// Base classes as written (`unittest.TestCase`, `Base[int]`); keywords such as
    /// `metaclass=` are not bases
    pub bases: Vec<String>,
    pub methods: Vec<MethodNode>,
    /// Classes defined anywhere inside this class body, including inside its methods
    pub nested: Vec<ClassNode>,
}

#[derive(Debug)]
pub struct MethodNode {
    pub name: String,
    /// Decorators as written; they never affect detection
    pub decorators: Vec<String>,
    /// Offset of the `def` (or `async`) keyword
    pub header_offset: usize,
    /// Offset of the first body statement, docstring included
    pub body_start: usize,
    pub docstring: Option<Span>,
    /// Top-level body statements in order, docstring excluded
    pub statements: Vec<StatementSpan>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementSpan {
    pub span: Span,
    pub kind: StatementKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatementKind {
    /// `super().<callee>()` as a standalone expression statement
    DelegatingCall(String),
    /// `pass` or `...`
    Placeholder,
    Other,
}

impl StatementSpan {
    pub fn callee(&self) -> Option<&str> {
        match &self.kind {
            StatementKind::DelegatingCall(callee) => Some(callee),
            _ => None,
        }
    }
}

/// Parse `source` into a class tree. A syntax error anywhere yields no tree at all.
pub fn parse(source: &SourceFile, file_path: &str) -> Result<ClassTree, CheckError> {
    let ast = match parse_python(source.text(), Mode::Module, file_path) {
        Ok(ast) => ast,
        Err(err) => {
            let offset = usize::from(err.offset);
            let (line, column) = source.line_col(offset);
            return Err(CheckError::Parse {
                offset,
                line,
                column,
                message: err.error.to_string(),
            });
        }
    };

    let mut tree = ClassTree::default();
    if let Mod::Module(module) = &ast {
        collect_classes(&module.body, source, &mut tree.classes);
    }
    Ok(tree)
}

fn collect_classes(body: &[Stmt], source: &SourceFile, out: &mut Vec<ClassNode>) {
    for stmt in body {
        match stmt {
            Stmt::ClassDef(class_def) => out.push(build_class(class_def, source)),
            other => {
                for nested in child_bodies(other) {
                    collect_classes(nested, source, out);
                }
            }
        }
    }
}

fn build_class(class_def: &StmtClassDef, source: &SourceFile) -> ClassNode {
    let mut methods = Vec::new();
    let mut nested = Vec::new();

    for stmt in &class_def.body {
        match stmt {
            Stmt::FunctionDef(func) => {
                methods.push(build_method(
                    func.name.as_str(),
                    func.range,
                    &func.decorator_list,
                    &func.body,
                    source,
                ));
                collect_classes(&func.body, source, &mut nested);
            }
            Stmt::AsyncFunctionDef(func) => {
                methods.push(build_method(
                    func.name.as_str(),
                    func.range,
                    &func.decorator_list,
                    &func.body,
                    source,
                ));
                collect_classes(&func.body, source, &mut nested);
            }
            Stmt::ClassDef(inner) => nested.push(build_class(inner, source)),
            other => {
                for body in child_bodies(other) {
                    collect_classes(body, source, &mut nested);
                }
            }
        }
    }

    ClassNode {
        name: class_def.name.as_str().to_string(),
        bases: class_def
            .bases
            .iter()
            .map(|base| base_name(base, source))
            .collect(),
        methods,
        nested,
    }
}

fn build_method(
    name: &str,
    range: TextRange,
    decorators: &[Expr],
    body: &[Stmt],
    source: &SourceFile,
) -> MethodNode {
    let span = Span::from(range);
    let decorator_end = decorators
        .last()
        .map(|decorator| usize::from(decorator.end()));

    let (docstring, rest) = match body.split_first() {
        Some((first, rest)) if is_docstring(first) => (Some(Span::from(first.range())), rest),
        _ => (None, body),
    };

    MethodNode {
        name: name.to_string(),
        decorators: expr_texts(decorators, source),
        header_offset: header_offset(source, span.start, decorator_end),
        body_start: body
            .first()
            .map_or(span.end, |stmt| usize::from(stmt.start())),
        docstring,
        statements: rest.iter().map(statement_span).collect(),
    }
}

/// Locate the `def` line. Depending on the grammar, a function's range may start at
/// its first decorator, so skip past the decorators and any comment lines after them.
fn header_offset(source: &SourceFile, start: usize, decorator_end: Option<usize>) -> usize {
    let Some(mut cursor) = decorator_end.filter(|&end| end > start) else {
        return start;
    };

    loop {
        cursor = source.next_line_start(cursor);
        if cursor >= source.len() {
            return start;
        }
        let line = source.slice(cursor, source.line_end(cursor));
        let trimmed = line.trim_start();
        if is_def_line(trimmed) {
            return cursor + (line.len() - trimmed.len());
        }
    }
}

/// `def` or `async` as a keyword, not as the start of a name like `default`
fn is_def_line(line: &str) -> bool {
    ["def", "async"].iter().any(|keyword| {
        line.strip_prefix(keyword)
            .is_some_and(|rest| rest.starts_with([' ', '\t']))
    })
}

fn statement_span(stmt: &Stmt) -> StatementSpan {
    let kind = if let Some(callee) = delegating_callee(stmt) {
        StatementKind::DelegatingCall(callee.to_string())
    } else if is_placeholder(stmt) {
        StatementKind::Placeholder
    } else {
        StatementKind::Other
    };

    StatementSpan {
        span: stmt.range().into(),
        kind,
    }
}

/// Callee name of a `super().<name>()` statement, if `stmt` is one.
/// Both calls must have no arguments.
fn delegating_callee(stmt: &Stmt) -> Option<&str> {
    let Stmt::Expr(expr_stmt) = stmt else {
        return None;
    };
    let Expr::Call(call) = &*expr_stmt.value else {
        return None;
    };
    if !call.args.is_empty() || !call.keywords.is_empty() {
        return None;
    }
    let Expr::Attribute(attr) = &*call.func else {
        return None;
    };
    let Expr::Call(accessor) = &*attr.value else {
        return None;
    };
    let Expr::Name(name) = &*accessor.func else {
        return None;
    };

    if name.id.as_str() == "super" && accessor.args.is_empty() && accessor.keywords.is_empty() {
        Some(attr.attr.as_str())
    } else {
        None
    }
}

fn is_docstring(stmt: &Stmt) -> bool {
    if let Stmt::Expr(expr_stmt) = stmt {
        if let Expr::Constant(constant) = &*expr_stmt.value {
            return matches!(constant.value, Constant::Str(_));
        }
    }
    false
}

fn is_placeholder(stmt: &Stmt) -> bool {
    match stmt {
        Stmt::Pass(_) => true,
        Stmt::Expr(expr_stmt) => matches!(
            &*expr_stmt.value,
            Expr::Constant(constant) if matches!(constant.value, Constant::Ellipsis)
        ),
        _ => false,
    }
}

fn base_name(expr: &Expr, source: &SourceFile) -> String {
    dotted_name(expr).unwrap_or_else(|| {
        let span = Span::from(expr.range());
        source.slice(span.start, span.end).trim().to_string()
    })
}

fn dotted_name(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Name(name) => Some(name.id.as_str().to_string()),
        Expr::Attribute(attr) => {
            dotted_name(&attr.value).map(|prefix| format!("{}.{}", prefix, attr.attr.as_str()))
        }
        _ => None,
    }
}

fn expr_texts(exprs: &[Expr], source: &SourceFile) -> Vec<String> {
    exprs
        .iter()
        .map(|expr| {
            let span = Span::from(expr.range());
            source.slice(span.start, span.end).to_string()
        })
        .collect()
}

/// Statement blocks nested directly inside a compound statement
fn child_bodies(stmt: &Stmt) -> Vec<&[Stmt]> {
    match stmt {
        Stmt::FunctionDef(func) => vec![&func.body[..]],
        Stmt::AsyncFunctionDef(func) => vec![&func.body[..]],
        Stmt::ClassDef(class_def) => vec![&class_def.body[..]],
        Stmt::If(if_stmt) => vec![&if_stmt.body[..], &if_stmt.orelse[..]],
        Stmt::For(for_stmt) => vec![&for_stmt.body[..], &for_stmt.orelse[..]],
        Stmt::AsyncFor(for_stmt) => vec![&for_stmt.body[..], &for_stmt.orelse[..]],
        Stmt::While(while_stmt) => vec![&while_stmt.body[..], &while_stmt.orelse[..]],
        Stmt::With(with_stmt) => vec![&with_stmt.body[..]],
        Stmt::AsyncWith(with_stmt) => vec![&with_stmt.body[..]],
        Stmt::Try(try_stmt) => {
            let mut bodies = vec![&try_stmt.body[..]];
            for handler in &try_stmt.handlers {
                let ExceptHandler::ExceptHandler(h) = handler;
                bodies.push(&h.body[..]);
            }
            bodies.push(&try_stmt.orelse[..]);
            bodies.push(&try_stmt.finalbody[..]);
            bodies
        }
        Stmt::TryStar(try_stmt) => {
            let mut bodies = vec![&try_stmt.body[..]];
            for handler in &try_stmt.handlers {
                let ExceptHandler::ExceptHandler(h) = handler;
                bodies.push(&h.body[..]);
            }
            bodies.push(&try_stmt.orelse[..]);
            bodies.push(&try_stmt.finalbody[..]);
            bodies
        }
        Stmt::Match(match_stmt) => match_stmt.cases.iter().map(|case| &case.body[..]).collect(),
        _ => Vec::new(),
    }
}
