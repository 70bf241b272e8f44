//! Tokenizer
//!
//!     Turns one translation unit into an ordered sequence of [Token]s that covers every
//!     byte of the input exactly once. Raw lexing is done by the logos lexer in
//!     [core](crate::token::core); this module classifies each lexeme (keyword, identifier,
//!     punctuation, literal, whitespace, comment), attaches its exact text and byte range,
//!     and turns unterminated constructs into soft diagnostics.
//!
//! Laziness
//!
//!     [Tokenizer] is an iterator over the source; it is cheap to create, so restarting is
//!     just building a new one over the same text. [tokenize] drains it into a
//!     [TokenStream] for the rest of the pipeline, which needs random access.
//!
//! Failure Mode
//!
//!     Nothing here is fatal. An unterminated block comment or raw string runs to the end of
//!     the input, an unterminated string or character literal stops at the end of its line,
//!     and in both cases a diagnostic is recorded and no byte is lost. Bytes no rule matches
//!     become single punctuation tokens.

use crate::diagnostics::Diagnostic;
use crate::token::core::RawToken;
use crate::token::keywords;
use crate::token::{Token, TokenKind, TokenStream};
use logos::Logos;

pub struct Tokenizer<'src> {
    lexer: logos::Lexer<'src, RawToken>,
    diagnostics: Vec<Diagnostic>,
    finished: bool,
}

impl<'src> Tokenizer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            lexer: RawToken::lexer(source),
            diagnostics: Vec::new(),
            finished: false,
        }
    }

    /// Diagnostics raised by the tokens produced so far.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    fn report_unterminated(&mut self, raw: RawToken, offset: usize) {
        let (code, what) = match raw {
            RawToken::BlockComment(_) => ("unterminated-comment", "block comment"),
            RawToken::String(_) => ("unterminated-string", "string literal"),
            RawToken::Char(_) => ("unterminated-char", "character literal"),
            RawToken::RawString(_) => ("unterminated-raw-string", "raw string literal"),
            _ => return,
        };
        self.diagnostics.push(
            Diagnostic::warning(offset, format!("Unterminated {what}, closed implicitly"))
                .with_code(code),
        );
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.finished {
            return None;
        }
        match self.lexer.next() {
            Some(result) => {
                let raw = result.unwrap_or(RawToken::Stray);
                let span = self.lexer.span();
                let text = self.lexer.slice();
                if !raw.closure().is_terminated() {
                    self.report_unterminated(raw, span.start);
                }
                Some(Token::new(kind_of(raw, text), text, span))
            }
            None => {
                self.finished = true;
                let end = self.lexer.source().len();
                Some(Token::new(TokenKind::EndOfInput, "", end..end))
            }
        }
    }
}

fn kind_of(raw: RawToken, text: &str) -> TokenKind {
    match raw {
        RawToken::Whitespace => TokenKind::Whitespace,
        RawToken::LineComment | RawToken::BlockComment(_) => TokenKind::Comment,
        RawToken::String(_) | RawToken::Char(_) | RawToken::RawString(_) | RawToken::Number => {
            TokenKind::Literal
        }
        RawToken::Word if keywords::is_keyword(text) => TokenKind::Keyword,
        RawToken::Word => TokenKind::Identifier,
        RawToken::Punct | RawToken::Stray => TokenKind::Punctuation,
    }
}

/// Tokenize a whole translation unit.
pub fn tokenize(source: &str) -> TokenStream {
    let mut tokenizer = Tokenizer::new(source);
    let tokens: Vec<Token> = tokenizer.by_ref().collect();
    let diagnostics = tokenizer.into_diagnostics();
    tracing::trace!(
        tokens = tokens.len(),
        diagnostics = diagnostics.len(),
        "tokenized source"
    );
    TokenStream {
        tokens,
        diagnostics,
    }
}
