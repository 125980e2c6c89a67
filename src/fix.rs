//! Automatic fixing of missing and misplaced super() calls
//!
//! Every patch is addressed by offsets into the unmodified text. Patches for a
//! file are validated as a set and applied from the end of the file backwards,
//! so earlier offsets stay valid while later ones are rewritten.
//!
//! Wrong casing is never fixed: renaming a lifecycle method changes which
//! method the test runner calls.

use crate::error::CheckError;
use crate::locator::{locate, MethodRecord};
use crate::models::{FixPatch, Violation, ViolationKind};
use crate::noqa::NoqaDirectives;
use crate::parser::{self, Span, StatementKind};
use crate::rules::delegation::{classify, Delegation};
use crate::source::SourceFile;
use crate::{evaluate, sort_violations, Settings};

/// Result of fixing one file
#[derive(Debug, Default)]
pub struct FixOutcome {
    /// The patched text; equal to the input when nothing was fixable
    pub text: String,
    /// Corrected violations, each carrying the patch that fixed it
    pub fixed: Vec<Violation>,
    /// Violations left in place
    pub unresolved: Vec<Violation>,
}

/// Fix the fixable violations in `text`. The result depends only on `text` and
/// `settings`, and fixing already-fixed text changes nothing.
pub fn fix(file_path: &str, text: &str, settings: &Settings) -> Result<FixOutcome, CheckError> {
    let source = SourceFile::new(text);
    let tree = parser::parse(&source, file_path)?;
    let records = locate(&tree, &settings.base_classes);
    let noqa = NoqaDirectives::parse(text);

    let mut fixed = Vec::new();
    let mut unresolved = Vec::new();

    for (method, violations) in evaluate(&records, file_path, &source, settings, &noqa) {
        for mut violation in violations {
            let patches = if violation.kind.is_fixable() {
                plan_patches(&source, file_path, method, violation.kind)
            } else {
                Vec::new()
            };
            if patches.is_empty() {
                unresolved.push(violation);
            } else {
                violation.fix = patches;
                fixed.push(violation);
            }
        }
    }

    let patches: Vec<FixPatch> = fixed.iter().flat_map(|v| v.fix.iter().cloned()).collect();
    let patch_count = patches.len();
    let patched = apply_patches(text, patches)?;

    if !fixed.is_empty() {
        let check = SourceFile::new(&patched);
        if let Err(err) = parser::parse(&check, file_path) {
            return Err(CheckError::Internal(format!(
                "fixed text no longer parses ({}); no changes applied",
                err
            )));
        }
        log::debug!(
            "{}: {} patch(es) for {} violation(s)",
            file_path,
            patch_count,
            fixed.len()
        );
    }

    sort_violations(&mut fixed);
    sort_violations(&mut unresolved);

    Ok(FixOutcome {
        text: patched,
        fixed,
        unresolved,
    })
}

/// Apply patches in one pass, from the highest start offset down. Insertions
/// sharing an offset are applied outer method first, which leaves the inner
/// method's text in front.
///
/// Overlapping or out-of-range patches mean the planner broke an invariant;
/// the whole set is rejected rather than producing corrupted text.
pub fn apply_patches(text: &str, mut patches: Vec<FixPatch>) -> Result<String, CheckError> {
    for patch in &patches {
        if patch.start > patch.end
            || patch.end > text.len()
            || !text.is_char_boundary(patch.start)
            || !text.is_char_boundary(patch.end)
        {
            return Err(CheckError::Internal(format!(
                "invalid patch range {}..{} for text length {}",
                patch.start,
                patch.end,
                text.len()
            )));
        }
    }

    for (i, a) in patches.iter().enumerate() {
        if let Some(b) = patches[i + 1..].iter().find(|b| a.overlaps(b)) {
            log::warn!(
                "{}: discarding all fixes, patches {}..{} and {}..{} overlap",
                a.file_path,
                a.start,
                a.end,
                b.start,
                b.end
            );
            return Err(CheckError::Internal(format!(
                "overlapping patches at {}..{} and {}..{}",
                a.start, a.end, b.start, b.end
            )));
        }
    }

    patches.sort_by(|a, b| b.start.cmp(&a.start).then(a.anchor.cmp(&b.anchor)));

    let mut out = text.to_string();
    for patch in &patches {
        out.replace_range(patch.start..patch.end, &patch.replacement);
    }
    Ok(out)
}

fn plan_patches(
    source: &SourceFile,
    file_path: &str,
    method: &MethodRecord,
    kind: ViolationKind,
) -> Vec<FixPatch> {
    let planner = Planner {
        source,
        file_path,
        method,
    };
    match (kind, classify(method)) {
        (ViolationKind::MissingSuperCall, Delegation::Missing) => vec![planner.missing()],
        (ViolationKind::SuperCallNotLast, Delegation::NotLast { call }) => {
            planner.not_last(call).to_vec()
        }
        _ => Vec::new(),
    }
}

/// Builds the patches for one method
struct Planner<'p> {
    source: &'p SourceFile<'p>,
    file_path: &'p str,
    method: &'p MethodRecord<'p>,
}

impl Planner<'_> {
    fn patch(&self, start: usize, end: usize, replacement: String) -> FixPatch {
        FixPatch {
            file_path: self.file_path.to_string(),
            start,
            end,
            replacement,
            anchor: self.method.node.header_offset,
        }
    }

    /// The body is written on the `def` line itself (`def setUp(self): pass`)
    fn is_inline_body(&self) -> bool {
        !self.source.starts_line(self.method.node.body_start)
    }

    fn body_indent(&self) -> &str {
        self.source.indentation(self.method.node.body_start)
    }

    /// Insertion of `statement` as the new final statement, after `last`
    fn append(&self, last: Span, statement: &str) -> FixPatch {
        if self.is_inline_body() {
            self.patch(last.end, last.end, format!("; {}", statement))
        } else {
            let at = self.source.line_end(last.end);
            self.patch(
                at,
                at,
                format!("{}{}{}", self.source.newline(), self.body_indent(), statement),
            )
        }
    }

    fn missing(&self) -> FixPatch {
        let node = self.method.node;
        let call = self.method.role.super_call();

        if let [only] = node.statements.as_slice() {
            if only.kind == StatementKind::Placeholder {
                return self.replace_placeholder(only.span, &call);
            }
        }

        let last = node
            .statements
            .last()
            .map(|stmt| stmt.span)
            .or(node.docstring)
            .unwrap_or(Span {
                start: node.body_start,
                end: node.body_start,
            });
        self.append(last, &call)
    }

    fn replace_placeholder(&self, placeholder: Span, call: &str) -> FixPatch {
        if !self.source.starts_line(placeholder.start) {
            return self.patch(placeholder.start, placeholder.end, call.to_string());
        }

        // A docstring shares the block, so its indentation must be kept
        let indent = if self.method.node.docstring.is_some() {
            self.body_indent().to_string()
        } else {
            let header = self.source.indentation(self.method.node.header_offset);
            let level = if header.contains('\t') { "\t" } else { "    " };
            format!("{}{}", header, level)
        };

        self.patch(
            self.source.line_start(placeholder.start),
            placeholder.end,
            format!("{}{}", indent, call),
        )
    }

    /// Move the call at `call` behind the last statement: one deletion where it
    /// stands, one insertion after the last statement. The call's text is kept
    /// verbatim.
    fn not_last(&self, call: usize) -> [FixPatch; 2] {
        let source = self.source;
        let statements = self.method.statements();
        let stmt = statements[call].span;
        let last = statements[statements.len() - 1].span;
        let next = statements[call + 1].span;

        if source.starts_line(stmt.start) && source.ends_line(stmt.end) {
            // Whole physical lines, trailing comment included
            let start = source.line_start(stmt.start);
            let moved = source.slice(start, source.line_end(stmt.end));
            let at = source.line_end(last.end);
            return [
                self.patch(start, source.next_line_start(stmt.end), String::new()),
                self.patch(at, at, format!("{}{}", source.newline(), moved)),
            ];
        }

        let deletion = if call > 0 && !source.starts_line(stmt.start) && source.ends_line(stmt.end)
        {
            // `x = 1; super().setUp()` drops the separator before the call
            self.patch(statements[call - 1].span.end, stmt.end, String::new())
        } else {
            // `super().setUp(); x = 1` drops the call and its separator up to the next statement
            self.patch(stmt.start, next.start, String::new())
        };
        [deletion, self.append(last, source.slice(stmt.start, stmt.end))]
    }
}
