//! Emitter
//!
//! Rebuilds source text from the untouched token sequence and a [RewritePlan]. Every
//! token is written with its original text unless the plan removes it (a relocated
//! qualifier) or replaces it (a whitespace adjustment); qualifiers are appended after
//! their anchor token. With an empty plan the output is the input, byte for byte.

use crate::diagnostics::Diagnostic;
use crate::relocate::{PlannedStream, RewritePlan};
use crate::token::Token;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

/// Result of rewriting one translation unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transformed {
    pub output: String,
    pub diagnostics: Vec<Diagnostic>,
}

impl Transformed {
    pub fn has_diagnostics(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}

/// Apply a plan that has already been validated against `tokens`.
pub fn emit(tokens: &[Token], plan: &RewritePlan) -> String {
    let removed: HashSet<usize> = plan.edits.iter().map(|e| e.remove_at).collect();
    let mut insertions: BTreeMap<usize, Vec<&str>> = BTreeMap::new();
    for edit in &plan.edits {
        insertions
            .entry(edit.insert_after)
            .or_default()
            .push(edit.qualifier.as_str());
    }

    let capacity = tokens.iter().map(|t| t.text.len()).sum::<usize>();
    let mut output = String::with_capacity(capacity);
    for (index, token) in tokens.iter().enumerate() {
        if removed.contains(&index) {
            if let Some(spacer) = plan.whitespace.get(&index) {
                output.push_str(spacer);
            }
            continue;
        }
        match plan.whitespace.get(&index) {
            Some(replacement) => output.push_str(replacement),
            None => output.push_str(&token.text),
        }
        if let Some(qualifiers) = insertions.get(&index) {
            for qualifier in qualifiers {
                output.push(' ');
                output.push_str(qualifier);
            }
            if plan.padded.contains(&index) {
                output.push(' ');
            }
        }
    }
    output
}

pub fn emit_stream(planned: PlannedStream) -> Transformed {
    let output = emit(&planned.tokens, &planned.plan);
    Transformed {
        output,
        diagnostics: planned.diagnostics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::Qualifier;
    use crate::lexing::tokenize;
    use crate::relocate::Edit;

    #[test]
    fn test_empty_plan_is_identity() {
        let source = "int main() {\r\n  return 0; // done\r\n}";
        let tokens = tokenize(source).tokens;
        assert_eq!(emit(&tokens, &RewritePlan::default()), source);
    }

    #[test]
    fn test_move_and_trim() {
        let tokens = tokenize("const int x;").tokens;
        let mut plan = RewritePlan {
            edits: vec![Edit {
                remove_at: 0,
                insert_after: 2,
                qualifier: Qualifier::Const,
            }],
            ..RewritePlan::default()
        };
        plan.whitespace.insert(1, String::new());
        assert_eq!(emit(&tokens, &plan), "int const x;");
    }

    #[test]
    fn test_pad_follows_all_qualifiers() {
        let tokens = tokenize("const volatile int*p;").tokens;
        let mut plan = RewritePlan {
            edits: vec![
                Edit {
                    remove_at: 0,
                    insert_after: 4,
                    qualifier: Qualifier::Const,
                },
                Edit {
                    remove_at: 2,
                    insert_after: 4,
                    qualifier: Qualifier::Volatile,
                },
            ],
            ..RewritePlan::default()
        };
        plan.whitespace.insert(1, String::new());
        plan.whitespace.insert(3, String::new());
        plan.padded.insert(4);
        assert_eq!(emit(&tokens, &plan), "int const volatile *p;");
    }

    #[test]
    fn test_removed_qualifier_can_leave_a_space() {
        let tokens = tokenize(":const::T x;").tokens;
        let mut plan = RewritePlan {
            edits: vec![Edit {
                remove_at: 1,
                insert_after: 3,
                qualifier: Qualifier::Const,
            }],
            ..RewritePlan::default()
        };
        plan.whitespace.insert(1, " ".to_string());
        assert_eq!(emit(&tokens, &plan), ": ::T const x;");
    }
}
