//! Token types shared by every stage of the rewrite pipeline.
//!
//! Token Layers
//!
//!     Core Lexemes:
//!         Character-level tokens produced by the logos lexer. See [core](core). They are
//!         coarse on purpose (one `Word` for identifiers and keywords, one `Punct` for all
//!         operators) and carry only the closure state of delimited constructs.
//!
//!     Tokens:
//!         The public [Token]: a classified lexeme that owns its exact source text and its
//!         byte range. Whitespace and comments are first-class tokens, so concatenating the
//!         text of every token reproduces the input byte for byte. A stream always ends with
//!         one zero-width [TokenKind::EndOfInput] token.
//!
//! Immutability
//!
//!     Tokens are never edited after the tokenizer produces them. Later stages refer to them
//!     by index; the relocator describes moves and whitespace adjustments in a separate plan
//!     and the emitter applies that plan while walking the untouched sequence.

pub mod core;
pub mod keywords;

use crate::diagnostics::Diagnostic;
use serde::Serialize;
use std::fmt;
use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TokenKind {
    Keyword,
    Identifier,
    Punctuation,
    Literal,
    Whitespace,
    Comment,
    EndOfInput,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Keyword => "keyword",
            TokenKind::Identifier => "identifier",
            TokenKind::Punctuation => "punctuation",
            TokenKind::Literal => "literal",
            TokenKind::Whitespace => "whitespace",
            TokenKind::Comment => "comment",
            TokenKind::EndOfInput => "end-of-input",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub span: Range<usize>,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, span: Range<usize>) -> Self {
        Self {
            kind,
            text: text.into(),
            span,
        }
    }

    pub fn start(&self) -> usize {
        self.span.start
    }

    pub fn end(&self) -> usize {
        self.span.end
    }

    /// Whitespace and comments: tokens the classifier looks through.
    pub fn is_trivia(&self) -> bool {
        matches!(self.kind, TokenKind::Whitespace | TokenKind::Comment)
    }

    pub fn is_word(&self) -> bool {
        matches!(self.kind, TokenKind::Keyword | TokenKind::Identifier)
    }

    pub fn is_punct(&self, text: &str) -> bool {
        self.kind == TokenKind::Punctuation && self.text == text
    }

    pub fn is_keyword(&self, text: &str) -> bool {
        self.kind == TokenKind::Keyword && self.text == text
    }

    /// Whitespace without a line break.
    pub fn is_horizontal_space(&self) -> bool {
        self.kind == TokenKind::Whitespace && !self.text.contains('\n')
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({:?})@{}..{}", self.kind, self.text, self.start(), self.end())
    }
}

/// Output of the tokenization stage: the full token sequence plus the soft diagnostics
/// raised while delimiting comments and literals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenStream {
    pub tokens: Vec<Token>,
    pub diagnostics: Vec<Diagnostic>,
}

impl TokenStream {
    /// Index of the trailing [TokenKind::EndOfInput] token.
    pub fn end_index(&self) -> usize {
        self.tokens.len().saturating_sub(1)
    }

    /// Concatenated token text; equal to the tokenized source.
    pub fn source_text(&self) -> String {
        self.tokens.iter().map(|t| t.text.as_str()).collect()
    }
}
