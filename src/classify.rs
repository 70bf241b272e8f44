//! Context Classifier
//!
//!     Walks the token sequence once and tags every `const`/`volatile` keyword with a
//!     [QualifierRole]. Only leading type qualifiers are rewrite targets; trailing ones are
//!     already east-style (or qualify a member function), and ignored ones sit in a
//!     context where moving them would change meaning or where no rule has been settled.
//!
//! Decision Table
//!
//!     The role depends on two things only: what kind of significant token came right
//!     before the qualifier ([Preceding]) and whether the qualifier sits inside a
//!     suppressed region (a template header, a `decltype` operand or a trailing return
//!     type after `) ->`). [classify_occurrence] is the whole table; the walker just
//!     computes its inputs.
//!
//!         start, `(`, `{`, argument `<`, `,` `;` `}` `=` `:` `?`,
//!         declaration specifiers, header `>`, `]]`          -> leading
//!         `)`, a type name, `*` `&` `&&`                      -> trailing
//!         another qualifier                                   -> that qualifier's role
//!         `->`, operators, literals, other keywords           -> ignored
//!
//! Nesting
//!
//!     A bracket stack tracks parentheses, square brackets, braces and angle brackets.
//!     Since `<` is also less-than, an angle entry is only opened after an identifier,
//!     `template` or a cast keyword, and `;`, `{`, `}` and closing parentheses drop any
//!     angle entries left open by comparisons.
//!
//! Preprocessor
//!
//!     A `#` that starts a line opens a directive running to the first unescaped newline.
//!     `#define` bodies are classified like the start of a declaration and carry the
//!     directive end as their boundary; every other directive is skipped. The context
//!     before the directive is restored afterwards.

use crate::options::RewriteOptions;
use crate::token::keywords;
use crate::token::{Token, TokenKind, TokenStream};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Qualifier {
    Const,
    Volatile,
}

impl Qualifier {
    pub fn from_token(token: &Token) -> Option<Self> {
        if token.kind != TokenKind::Keyword {
            return None;
        }
        match token.text.as_str() {
            "const" => Some(Qualifier::Const),
            "volatile" => Some(Qualifier::Volatile),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Qualifier::Const => "const",
            Qualifier::Volatile => "volatile",
        }
    }
}

impl fmt::Display for Qualifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum QualifierRole {
    LeadingTypeQualifier,
    TrailingQualifier,
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QualifierOccurrence {
    pub token_index: usize,
    pub qualifier: Qualifier,
    pub role: QualifierRole,
    /// First token index the relocator may not scan into.
    pub boundary: usize,
}

impl QualifierOccurrence {
    pub fn is_leading(&self) -> bool {
        self.role == QualifierRole::LeadingTypeQualifier
    }
}

/// The significant token before a qualifier, as far as the decision table cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preceding {
    /// Start of input or of a `#define` body.
    Start,
    /// `(`, `{` or the `<` of a template argument list.
    Opener,
    /// `,` `;` `}` `=` `:` `?`
    Separator,
    /// `static`, `typedef`, ..., `operator`, `new`, configured macros, `extern "C"`.
    DeclSpecifier,
    /// The `>` closing `template<...>`.
    TemplateHeaderClose,
    /// The second `]` of `[[attribute]]`.
    AttributeClose,
    CloseParen,
    /// An identifier, a builtin type, or the `>` closing a template argument list.
    TypeName,
    /// `*`, `&`, `&&`
    Declarator,
    Qualifier(QualifierRole),
    /// `->` of a trailing return type.
    TrailingReturn,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Context {
    pub preceding: Preceding,
    pub suppressed: bool,
}

pub fn classify_occurrence(context: Context) -> QualifierRole {
    use Preceding::*;
    use QualifierRole::*;

    if context.suppressed {
        return Ignored;
    }
    match context.preceding {
        Start | Opener | Separator | DeclSpecifier | TemplateHeaderClose | AttributeClose => {
            LeadingTypeQualifier
        }
        CloseParen | TypeName | Declarator => TrailingQualifier,
        Qualifier(role) => role,
        TrailingReturn | Other => Ignored,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bracket {
    Paren { decltype: bool },
    Square,
    Brace,
    Angle { header: bool },
}

impl Bracket {
    fn suppresses(self) -> bool {
        matches!(
            self,
            Bracket::Paren { decltype: true } | Bracket::Angle { header: true }
        )
    }
}

#[derive(Debug, Default)]
struct Nesting {
    stack: Vec<Bracket>,
    suppressed: usize,
}

impl Nesting {
    fn depth(&self) -> usize {
        self.stack.len()
    }

    fn is_suppressed(&self) -> bool {
        self.suppressed > 0
    }

    fn push(&mut self, bracket: Bracket) {
        if bracket.suppresses() {
            self.suppressed += 1;
        }
        self.stack.push(bracket);
    }

    fn pop(&mut self) -> Option<Bracket> {
        let bracket = self.stack.pop()?;
        if bracket.suppresses() {
            self.suppressed -= 1;
        }
        Some(bracket)
    }

    fn truncate(&mut self, depth: usize) {
        while self.stack.len() > depth {
            self.pop();
        }
    }

    fn drop_angles(&mut self) {
        while matches!(self.stack.last(), Some(Bracket::Angle { .. })) {
            self.pop();
        }
    }

    fn close_angle(&mut self) -> Option<Bracket> {
        match self.stack.last() {
            Some(Bracket::Angle { .. }) => self.pop(),
            _ => None,
        }
    }

    fn close_paren(&mut self) {
        self.drop_angles();
        if matches!(self.stack.last(), Some(Bracket::Paren { .. })) {
            self.pop();
        }
    }

    fn close_square(&mut self) {
        self.drop_angles();
        if matches!(self.stack.last(), Some(Bracket::Square)) {
            self.pop();
        }
    }

    fn close_brace(&mut self) {
        if let Some(at) = self.stack.iter().rposition(|b| *b == Bracket::Brace) {
            self.truncate(at);
        }
    }
}

/// Whether a text contains a line break that is not a backslash continuation.
fn ends_line(text: &str) -> bool {
    let bytes = text.as_bytes();
    bytes.iter().enumerate().any(|(i, &b)| {
        if b != b'\n' {
            return false;
        }
        let mut j = i;
        if j > 0 && bytes[j - 1] == b'\r' {
            j -= 1;
        }
        !(j > 0 && bytes[j - 1] == b'\\')
    })
}

struct Classifier<'a> {
    tokens: &'a [Token],
    decl_macros: HashSet<&'a str>,
    nesting: Nesting,
    prev: Preceding,
    prev_index: Option<usize>,
    line_start: bool,
    /// Nesting depth where the trailing return type being walked started.
    trailing_return: Option<usize>,
    occurrences: Vec<QualifierOccurrence>,
}

impl<'a> Classifier<'a> {
    fn new(tokens: &'a [Token], options: &'a RewriteOptions) -> Self {
        Self {
            tokens,
            decl_macros: options.decl_macros.iter().map(String::as_str).collect(),
            nesting: Nesting::default(),
            prev: Preceding::Start,
            prev_index: None,
            line_start: true,
            trailing_return: None,
            occurrences: Vec::new(),
        }
    }

    fn walk(&mut self, start: usize, end: usize, boundary: usize, in_directive: bool) {
        let tokens = self.tokens;
        let mut i = start;
        while i < end {
            let token = &tokens[i];
            match token.kind {
                TokenKind::Whitespace => {
                    if ends_line(&token.text) {
                        self.line_start = true;
                    }
                    i += 1;
                    continue;
                }
                TokenKind::Comment => {
                    i += 1;
                    continue;
                }
                TokenKind::EndOfInput => break,
                _ => {}
            }

            if !in_directive && self.line_start && token.is_punct("#") {
                i = self.directive(i, end);
                continue;
            }
            self.line_start = false;

            if let Some(qualifier) = Qualifier::from_token(token) {
                let role = classify_occurrence(Context {
                    preceding: self.prev,
                    suppressed: self.nesting.is_suppressed() || self.trailing_return.is_some(),
                });
                self.occurrences.push(QualifierOccurrence {
                    token_index: i,
                    qualifier,
                    role,
                    boundary,
                });
                self.prev = Preceding::Qualifier(role);
            } else {
                self.prev = self.advance(i);
            }
            self.prev_index = Some(i);
            i += 1;
        }
    }

    /// Handles the directive starting at `hash`; returns the index to resume from.
    fn directive(&mut self, hash: usize, limit: usize) -> usize {
        let end = self.directive_end(hash, limit);
        let define = self
            .next_significant(hash + 1, end)
            .filter(|&n| self.tokens[n].text == "define");

        if let Some(name) = define {
            if let Some(macro_name) = self.next_significant(name + 1, end) {
                let mut body = macro_name + 1;
                // Function-like only when `(` touches the name
                if body < end && self.tokens[body].is_punct("(") {
                    body = self.skip_parens(body, end);
                }
                let saved = (self.prev, self.prev_index, self.trailing_return);
                let depth = self.nesting.depth();
                self.prev = Preceding::Start;
                self.prev_index = None;
                self.trailing_return = None;
                self.line_start = false;
                self.walk(body, end, end, true);
                self.nesting.truncate(depth);
                (self.prev, self.prev_index, self.trailing_return) = saved;
            }
        }
        tracing::trace!(
            start = self.tokens[hash].start(),
            define = define.is_some(),
            "skipped preprocessor directive"
        );
        end
    }

    /// Index of the whitespace token that ends the directive line, or `limit`.
    fn directive_end(&self, hash: usize, limit: usize) -> usize {
        (hash + 1..limit)
            .find(|&j| {
                let token = &self.tokens[j];
                token.kind == TokenKind::EndOfInput
                    || (token.kind == TokenKind::Whitespace && ends_line(&token.text))
            })
            .unwrap_or(limit)
    }

    fn next_significant(&self, from: usize, limit: usize) -> Option<usize> {
        (from..limit).find(|&j| {
            let token = &self.tokens[j];
            !token.is_trivia() && token.kind != TokenKind::EndOfInput
        })
    }

    /// Index just past the parenthesis matching the one at `open`.
    fn skip_parens(&self, open: usize, limit: usize) -> usize {
        let mut depth = 0usize;
        for j in open..limit {
            let token = &self.tokens[j];
            if token.is_punct("(") {
                depth += 1;
            } else if token.is_punct(")") {
                depth -= 1;
                if depth == 0 {
                    return j + 1;
                }
            }
        }
        limit
    }

    /// Updates nesting for the significant token at `i` and describes it for the table.
    fn advance(&mut self, i: usize) -> Preceding {
        let tokens = self.tokens;
        let token = &tokens[i];
        let prev_token = self.prev_index.map(|p| &tokens[p]);

        match token.kind {
            TokenKind::Punctuation => self.advance_punct(token, prev_token),
            TokenKind::Identifier if self.decl_macros.contains(token.text.as_str()) => {
                Preceding::DeclSpecifier
            }
            TokenKind::Identifier => Preceding::TypeName,
            TokenKind::Keyword => {
                let word = token.text.as_str();
                if keywords::is_builtin_type(word) {
                    Preceding::TypeName
                } else if keywords::is_decl_specifier(word) || word == "operator" || word == "new"
                {
                    Preceding::DeclSpecifier
                } else {
                    Preceding::Other
                }
            }
            // `extern "C" const int x;`
            TokenKind::Literal
                if token.text.starts_with('"')
                    && prev_token.is_some_and(|p| p.is_keyword("extern")) =>
            {
                Preceding::DeclSpecifier
            }
            _ => Preceding::Other,
        }
    }

    fn advance_punct(&mut self, token: &Token, prev_token: Option<&Token>) -> Preceding {
        self.end_trailing_return(&token.text);
        match token.text.as_str() {
            "(" => {
                let decltype = prev_token.is_some_and(|p| p.is_keyword("decltype"));
                self.nesting.push(Bracket::Paren { decltype });
                Preceding::Opener
            }
            "[" => {
                self.nesting.push(Bracket::Square);
                Preceding::Other
            }
            "{" => {
                self.nesting.drop_angles();
                self.nesting.push(Bracket::Brace);
                Preceding::Opener
            }
            ")" => {
                self.nesting.close_paren();
                Preceding::CloseParen
            }
            "]" => {
                self.nesting.close_square();
                if prev_token.is_some_and(|p| p.is_punct("]")) {
                    Preceding::AttributeClose
                } else {
                    Preceding::Other
                }
            }
            "}" => {
                self.nesting.close_brace();
                Preceding::Separator
            }
            ";" => {
                self.nesting.drop_angles();
                Preceding::Separator
            }
            "," | "=" | ":" | "?" => Preceding::Separator,
            "<" => match prev_token {
                Some(p) if opens_angle(p) => {
                    let header = p.is_keyword("template");
                    self.nesting.push(Bracket::Angle { header });
                    Preceding::Opener
                }
                _ => Preceding::Other,
            },
            ">" => closed_angle(self.nesting.close_angle()),
            ">>" => {
                let inner = self.nesting.close_angle();
                let outer = self.nesting.close_angle();
                closed_angle(outer.or(inner))
            }
            "*" | "&" | "&&" => Preceding::Declarator,
            "->" => {
                if prev_token.is_some_and(|p| p.is_punct(")")) && self.trailing_return.is_none() {
                    self.trailing_return = Some(self.nesting.depth());
                }
                Preceding::TrailingReturn
            }
            _ => Preceding::Other,
        }
    }
}

impl Classifier<'_> {
    /// A trailing return type runs until the declarator ends at its own depth.
    fn end_trailing_return(&mut self, punct: &str) {
        let Some(depth) = self.trailing_return else {
            return;
        };
        let ends = match punct {
            ";" => true,
            "{" | "}" | "=" | "," | ")" | "]" => self.nesting.depth() <= depth,
            _ => false,
        };
        if ends {
            self.trailing_return = None;
        }
    }
}

fn opens_angle(prev: &Token) -> bool {
    match prev.kind {
        TokenKind::Identifier => true,
        TokenKind::Keyword => prev.text == "template" || keywords::is_cast(&prev.text),
        _ => false,
    }
}

fn closed_angle(bracket: Option<Bracket>) -> Preceding {
    match bracket {
        Some(Bracket::Angle { header: true }) => Preceding::TemplateHeaderClose,
        Some(_) => Preceding::TypeName,
        None => Preceding::Other,
    }
}

/// Classify every qualifier in a token sequence.
pub fn classify_tokens(tokens: &[Token], options: &RewriteOptions) -> Vec<QualifierOccurrence> {
    let boundary = tokens.len().saturating_sub(1);
    let mut classifier = Classifier::new(tokens, options);
    classifier.walk(0, tokens.len(), boundary, false);
    classifier.occurrences
}

/// Output of the classification stage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifiedStream {
    pub stream: TokenStream,
    pub occurrences: Vec<QualifierOccurrence>,
}

pub fn classify(stream: TokenStream, options: &RewriteOptions) -> ClassifiedStream {
    let occurrences = classify_tokens(&stream.tokens, options);
    tracing::debug!(
        qualifiers = occurrences.len(),
        leading = occurrences.iter().filter(|o| o.is_leading()).count(),
        "classified qualifiers"
    );
    ClassifiedStream {
        stream,
        occurrences,
    }
}
