//! Qualifier Relocator
//!
//!     Turns the leading qualifiers found by the classifier into a [RewritePlan]. Each
//!     leading qualifier starts a group: the scan steps over further qualifiers and
//!     declaration specifiers, every relocatable qualifier met on the way joins the group,
//!     and the first other token starts the base type. The group is then removed from its
//!     slots and reinserted, in original order, right after the type extent.
//!
//! Whitespace
//!
//!     Removing a qualifier also removes the horizontal whitespace that followed it. When a
//!     line break follows instead, the horizontal tail of the whitespace before it is
//!     trimmed. Line breaks are never touched, so line numbers survive. Neighbours that
//!     would lex as something else once they touch (`public:const ::T`) keep a space
//!     between them. The inserted text is a space
//!     followed by the qualifiers, plus a pad space when the next token would otherwise
//!     touch them (see [Spacing]).
//!
//! Refusals
//!
//!     When no extent can be found the group is left alone and a soft diagnostic with the
//!     [Refusal] code is recorded at the first qualifier of the group.

pub mod extent;

use crate::classify::{ClassifiedStream, Qualifier, QualifierOccurrence};
use crate::diagnostics::Diagnostic;
use crate::options::{RewriteOptions, Spacing};
use crate::token::core::RawToken;
use crate::token::keywords;
use crate::token::{Token, TokenKind};
use extent::{ExtentScanner, Refusal, TypeExtent};
use logos::Logos;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

/// Move the qualifier at `remove_at` to just after the token at `insert_after`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Edit {
    pub remove_at: usize,
    pub insert_after: usize,
    pub qualifier: Qualifier,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RewritePlan {
    /// Ordered by `remove_at`.
    pub edits: Vec<Edit>,
    /// Replacement text for whitespace tokens, and for removed qualifiers that have to
    /// leave a space behind.
    pub whitespace: BTreeMap<usize, String>,
    /// Insertion anchors followed by a pad space.
    pub padded: BTreeSet<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanError {
    #[error("token {index} is not a qualifier")]
    NotAQualifier { index: usize },
    #[error("token {index} is removed twice")]
    DuplicateRemoval { index: usize },
    #[error("insertion anchor {index} is out of range")]
    AnchorOutOfRange { index: usize },
    #[error("insertion anchor {index} is itself removed")]
    AnchorRemoved { index: usize },
    #[error("insertion anchor {anchor} does not follow removed token {index}")]
    BackwardMove { index: usize, anchor: usize },
    #[error("token {index} is neither whitespace nor a removed qualifier")]
    NotWhitespace { index: usize },
    #[error("replacement for token {index} is not blank")]
    NonBlankReplacement { index: usize },
}

impl RewritePlan {
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Check that the plan only moves qualifiers forward and only edits whitespace.
    pub fn validate(&self, tokens: &[Token]) -> Result<(), PlanError> {
        let mut removed = HashSet::new();
        for edit in &self.edits {
            let index = edit.remove_at;
            let is_qualifier = tokens
                .get(index)
                .and_then(Qualifier::from_token)
                .is_some_and(|q| q == edit.qualifier);
            if !is_qualifier {
                return Err(PlanError::NotAQualifier { index });
            }
            if !removed.insert(index) {
                return Err(PlanError::DuplicateRemoval { index });
            }
        }
        for edit in &self.edits {
            let anchor = edit.insert_after;
            if anchor >= tokens.len() {
                return Err(PlanError::AnchorOutOfRange { index: anchor });
            }
            if removed.contains(&anchor) {
                return Err(PlanError::AnchorRemoved { index: anchor });
            }
            if anchor <= edit.remove_at {
                return Err(PlanError::BackwardMove {
                    index: edit.remove_at,
                    anchor,
                });
            }
        }
        for (&index, replacement) in &self.whitespace {
            let is_whitespace = tokens.get(index).map(|t| t.kind) == Some(TokenKind::Whitespace);
            if !is_whitespace && !removed.contains(&index) {
                return Err(PlanError::NotWhitespace { index });
            }
            if !replacement.chars().all(char::is_whitespace) {
                return Err(PlanError::NonBlankReplacement { index });
            }
        }
        Ok(())
    }
}

/// Output of the relocation stage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedStream {
    pub tokens: Vec<Token>,
    pub plan: RewritePlan,
    /// Tokenizer diagnostics followed by refusals, ordered by offset.
    pub diagnostics: Vec<Diagnostic>,
}

struct Relocator<'a> {
    tokens: &'a [Token],
    options: &'a RewriteOptions,
    roles: HashMap<usize, &'a QualifierOccurrence>,
    decl_macros: HashSet<&'a str>,
    grouped: HashSet<usize>,
    removed: HashSet<usize>,
    plan: RewritePlan,
    refusals: Vec<Diagnostic>,
}

impl<'a> Relocator<'a> {
    fn new(
        tokens: &'a [Token],
        occurrences: &'a [QualifierOccurrence],
        options: &'a RewriteOptions,
    ) -> Self {
        Self {
            tokens,
            options,
            roles: occurrences.iter().map(|o| (o.token_index, o)).collect(),
            decl_macros: options.decl_macros.iter().map(String::as_str).collect(),
            grouped: HashSet::new(),
            removed: HashSet::new(),
            plan: RewritePlan::default(),
            refusals: Vec::new(),
        }
    }

    fn relocate(&mut self, occurrence: &QualifierOccurrence) {
        if !occurrence.is_leading() || self.grouped.contains(&occurrence.token_index) {
            return;
        }
        let (group, type_start) = self.collect_group(occurrence);
        if group.is_empty() {
            return;
        }

        let mut scanner = ExtentScanner::new(
            self.tokens,
            occurrence.boundary,
            self.options.max_extent_tokens,
        );
        match scanner.scan(type_start) {
            Ok(extent) => self.plan_group(&group, extent),
            Err(refusal) => self.refuse(&group, refusal),
        }
    }

    /// Relocatable qualifiers of the group starting at `occurrence`, and the index where
    /// the type scan begins.
    fn collect_group(&mut self, occurrence: &QualifierOccurrence) -> (Vec<usize>, usize) {
        let mut group = Vec::new();
        let mut at = occurrence.token_index;
        let boundary = occurrence.boundary.min(self.tokens.len());

        while at < boundary {
            let token = &self.tokens[at];
            if token.is_trivia() {
                at += 1;
                continue;
            }
            if let Some(qualifier) = Qualifier::from_token(token) {
                let leading = self.roles.get(&at).is_some_and(|o| o.is_leading());
                self.grouped.insert(at);
                if leading && self.options.relocates(qualifier) {
                    group.push(at);
                }
            } else if !self.is_prefix_word(token) {
                break;
            }
            at += 1;
        }
        (group, at)
    }

    /// Words stepped over between a leading qualifier and its type.
    fn is_prefix_word(&self, token: &Token) -> bool {
        match token.kind {
            TokenKind::Keyword => {
                keywords::is_cv_like(&token.text) || keywords::is_decl_specifier(&token.text)
            }
            TokenKind::Identifier => self.decl_macros.contains(token.text.as_str()),
            _ => false,
        }
    }

    fn plan_group(&mut self, group: &[usize], extent: TypeExtent) {
        let anchor = extent.end_index;
        for &index in group {
            let qualifier = match Qualifier::from_token(&self.tokens[index]) {
                Some(qualifier) => qualifier,
                None => continue,
            };
            self.plan.edits.push(Edit {
                remove_at: index,
                insert_after: anchor,
                qualifier,
            });
            self.removed.insert(index);
            tracing::trace!(
                qualifier = %qualifier,
                from = self.tokens[index].start(),
                to = self.tokens[anchor].end(),
                "relocating qualifier"
            );
        }
        // Neighbours are only known once the whole group is marked removed
        for &index in group {
            self.close_gap(index);
        }
        if self.needs_pad(anchor) {
            self.plan.padded.insert(anchor);
        }
    }

    /// Whether the token at `index` leaves nothing behind in the output.
    fn is_gone(&self, index: usize) -> bool {
        match self.plan.whitespace.get(&index) {
            Some(replacement) => replacement.is_empty(),
            None => self.removed.contains(&index),
        }
    }

    fn surviving_before(&self, index: usize) -> Option<usize> {
        (0..index).rev().find(|&i| !self.is_gone(i))
    }

    /// First token at or after `from` that stays, counting the horizontal whitespace right
    /// after a removed qualifier as gone.
    fn surviving_after(&self, from: usize) -> Option<usize> {
        (from..self.tokens.len()).find(|&i| {
            let pending = self.tokens[i].is_horizontal_space()
                && i > 0
                && self.removed.contains(&(i - 1));
            !self.is_gone(i) && !pending
        })
    }

    /// Whether the surviving tokens `left` and `right` stay separate tokens side by side.
    fn stays_apart(&self, left: usize, right: usize) -> bool {
        self.plan.whitespace.contains_key(&left)
            || lexes_apart(&self.tokens[left], &self.tokens[right])
    }

    /// Drop the whitespace left behind by the qualifier at `index`.
    fn close_gap(&mut self, index: usize) {
        let tokens = self.tokens;
        let Some(next) = tokens.get(index + 1) else {
            return;
        };
        let left = self.surviving_before(index);

        if next.is_horizontal_space() {
            let apart = match (left, self.surviving_after(index + 2)) {
                (Some(left), Some(right)) => self.stays_apart(left, right),
                _ => true,
            };
            if apart {
                self.plan.whitespace.insert(index + 1, String::new());
            }
            return;
        }

        if next.kind == TokenKind::Whitespace {
            // A line break follows: trim the horizontal tail before the qualifier instead
            let trimmable = index.checked_sub(1).filter(|&prev| {
                tokens[prev].kind == TokenKind::Whitespace
                    && !self.plan.whitespace.contains_key(&prev)
            });
            if let Some(prev) = trimmable {
                let text = &tokens[prev].text;
                let keep = text.rfind('\n').map_or(0, |i| i + 1);
                if keep < text.len() {
                    self.plan.whitespace.insert(prev, text[..keep].to_string());
                }
            }
            return;
        }

        if let Some(left) = left {
            if !self.stays_apart(left, index + 1) {
                self.plan.whitespace.insert(index, " ".to_string());
            }
        }
    }

    fn needs_pad(&self, anchor: usize) -> bool {
        let Some(next) = self.tokens.get(anchor + 1) else {
            return false;
        };
        match next.kind {
            TokenKind::Keyword
            | TokenKind::Identifier
            | TokenKind::Literal
            | TokenKind::Comment => true,
            TokenKind::Punctuation => {
                self.options.spacing == Spacing::Padded
                    && matches!(next.text.as_str(), "*" | "&" | "&&" | "[" | "(" | "{" | "::")
            }
            TokenKind::Whitespace | TokenKind::EndOfInput => false,
        }
    }

    fn refuse(&mut self, group: &[usize], refusal: Refusal) {
        let offset = self.tokens[group[0]].start();
        tracing::debug!(offset, code = refusal.code(), "refusing to relocate qualifier");
        self.refusals
            .push(Diagnostic::warning(offset, refusal.message()).with_code(refusal.code()));
    }
}

/// Whether `left` written directly before `right` still lexes as `left` alone.
fn lexes_apart(left: &Token, right: &Token) -> bool {
    if left.kind == TokenKind::Whitespace || right.kind == TokenKind::EndOfInput {
        return true;
    }
    let joined = format!("{}{}", left.text, right.text);
    let mut lexer = RawToken::lexer(&joined);
    lexer.next();
    lexer.span() == (0..left.text.len())
}

/// Plan the relocation of every leading qualifier group.
pub fn plan(
    tokens: &[Token],
    occurrences: &[QualifierOccurrence],
    options: &RewriteOptions,
) -> (RewritePlan, Vec<Diagnostic>) {
    let mut relocator = Relocator::new(tokens, occurrences, options);
    for occurrence in occurrences {
        relocator.relocate(occurrence);
    }
    let Relocator {
        mut plan, refusals, ..
    } = relocator;
    plan.edits.sort_by_key(|e| e.remove_at);
    (plan, refusals)
}

pub fn relocate(classified: ClassifiedStream, options: &RewriteOptions) -> PlannedStream {
    let ClassifiedStream {
        stream,
        occurrences,
    } = classified;
    let (plan, refusals) = plan(&stream.tokens, &occurrences, options);
    tracing::debug!(
        edits = plan.edits.len(),
        refusals = refusals.len(),
        "planned relocations"
    );

    let mut diagnostics = stream.diagnostics;
    diagnostics.extend(refusals);
    diagnostics.sort_by_key(|d| d.offset);

    PlannedStream {
        tokens: stream.tokens,
        plan,
        diagnostics,
    }
}
