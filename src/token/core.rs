//! Core lexemes produced by the logos lexer.
//!
//!     These are the raw, character-level tokens of a C/C++ translation unit. They are
//!     deliberately coarse: every identifier-shaped run is a `Word` (keywords are told apart
//!     later by [keywords](super::keywords)), every operator is `Punct`, and the constructs a
//!     regular expression cannot delimit (block comments, raw strings, escaped literals) are
//!     finished by callbacks that bump the lexer by hand.
//!
//!     The lexer never drops input. Constructs left open at the end of a line or of the
//!     input carry [Closure::Unterminated] so the tokenizer can report them, and bytes that
//!     match no rule come back as `Stray` (or as a logos error, which the tokenizer maps to
//!     the same thing).

use logos::{Lexer, Logos};

/// Whether a delimited construct found its closing delimiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Closure {
    Terminated,
    Unterminated,
}

impl Closure {
    pub fn is_terminated(self) -> bool {
        matches!(self, Closure::Terminated)
    }
}

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawToken {
    // Spaces, newlines, backslash-newline continuations and a byte-order mark
    #[regex(r"([ \t\r\n\x0B\x0C]|\\\r?\n|\x{FEFF})+")]
    Whitespace,

    #[token("//", line_comment)]
    LineComment,

    #[token("/*", block_comment)]
    BlockComment(Closure),

    #[regex(r#"(u8|u|U|L)?""#, string_literal)]
    String(Closure),

    #[regex(r#"(u8|u|U|L)?'"#, char_literal)]
    Char(Closure),

    #[regex(r#"(u8|u|U|L)?R""#, raw_string)]
    RawString(Closure),

    #[regex(r"[A-Za-z_$\x{80}-\x{FEFE}\x{FF00}-\x{10FFFF}][A-Za-z0-9_$\x{80}-\x{FEFE}\x{FF00}-\x{10FFFF}]*")]
    Word,

    // Preprocessing numbers: digit separators, exponents with signs, suffixes
    #[regex(r"\.?[0-9]([0-9A-Za-z_.]|'[0-9A-Za-z_]|[eEpP][+-])*")]
    Number,

    #[token("{")]
    #[token("}")]
    #[token("[")]
    #[token("]")]
    #[token("(")]
    #[token(")")]
    #[token(";")]
    #[token(":")]
    #[token("::")]
    #[token("...")]
    #[token("?")]
    #[token(".")]
    #[token(".*")]
    #[token("->")]
    #[token("->*")]
    #[token(",")]
    #[token("+")]
    #[token("-")]
    #[token("*")]
    #[token("/")]
    #[token("%")]
    #[token("^")]
    #[token("&")]
    #[token("|")]
    #[token("~")]
    #[token("!")]
    #[token("=")]
    #[token("<")]
    #[token(">")]
    #[token("+=")]
    #[token("-=")]
    #[token("*=")]
    #[token("/=")]
    #[token("%=")]
    #[token("^=")]
    #[token("&=")]
    #[token("|=")]
    #[token("<<")]
    #[token(">>")]
    #[token("<<=")]
    #[token(">>=")]
    #[token("==")]
    #[token("!=")]
    #[token("<=")]
    #[token(">=")]
    #[token("<=>")]
    #[token("&&")]
    #[token("||")]
    #[token("++")]
    #[token("--")]
    #[token("#")]
    #[token("##")]
    Punct,

    #[token("\\")]
    #[token("@")]
    #[token("`")]
    #[regex(r"[\x00-\x08\x0E-\x1F\x7F]")]
    Stray,
}

impl RawToken {
    /// The closure state for delimited constructs; everything else is trivially closed.
    pub fn closure(&self) -> Closure {
        match self {
            RawToken::BlockComment(c)
            | RawToken::String(c)
            | RawToken::Char(c)
            | RawToken::RawString(c) => *c,
            _ => Closure::Terminated,
        }
    }
}

/// Consumes a line comment up to, but not including, the end of its line.
///
/// A backslash right before the newline continues the comment, as the C preprocessor
/// splices the lines before comments are stripped.
fn line_comment(lex: &mut Lexer<RawToken>) -> bool {
    let rest = lex.remainder().as_bytes();
    let mut pos = 0;
    loop {
        match rest[pos..].iter().position(|&b| b == b'\n') {
            None => {
                lex.bump(rest.len());
                return true;
            }
            Some(offset) => {
                let newline = pos + offset;
                let mut body_end = newline;
                if body_end > 0 && rest[body_end - 1] == b'\r' {
                    body_end -= 1;
                }
                if body_end > 0 && rest[body_end - 1] == b'\\' {
                    pos = newline + 1;
                    continue;
                }
                lex.bump(body_end);
                return true;
            }
        }
    }
}

fn block_comment(lex: &mut Lexer<RawToken>) -> Closure {
    let rest = lex.remainder();
    match rest.find("*/") {
        Some(end) => {
            lex.bump(end + 2);
            Closure::Terminated
        }
        None => {
            lex.bump(rest.len());
            Closure::Unterminated
        }
    }
}

fn string_literal(lex: &mut Lexer<RawToken>) -> Closure {
    quoted(lex, b'"')
}

fn char_literal(lex: &mut Lexer<RawToken>) -> Closure {
    quoted(lex, b'\'')
}

/// Scans an escaped literal body. An unescaped newline ends the literal early; the newline
/// (and a preceding carriage return) stays outside the token.
fn quoted(lex: &mut Lexer<RawToken>, quote: u8) -> Closure {
    let rest = lex.remainder().as_bytes();
    let mut pos = 0;
    while pos < rest.len() {
        match rest[pos] {
            b'\\' => {
                pos += 1;
                if rest.get(pos) == Some(&b'\r') && rest.get(pos + 1) == Some(&b'\n') {
                    pos += 1;
                }
                pos += 1;
            }
            b'\n' => {
                let end = if pos > 0 && rest[pos - 1] == b'\r' {
                    pos - 1
                } else {
                    pos
                };
                lex.bump(end);
                return Closure::Unterminated;
            }
            b if b == quote => {
                lex.bump(pos + 1);
                return Closure::Terminated;
            }
            _ => pos += 1,
        }
    }
    // Escapes only ever skip ASCII-led sequences, so `rest.len()` is a char boundary.
    lex.bump(rest.len());
    Closure::Unterminated
}

/// Longest delimiter the standard allows between `R"` and `(`.
const MAX_RAW_DELIMITER: usize = 16;

/// Scans `delim( ... )delim"` after the `R"` prefix.
fn raw_string(lex: &mut Lexer<RawToken>) -> Closure {
    let rest = lex.remainder();
    let open = rest
        .bytes()
        .take(MAX_RAW_DELIMITER + 1)
        .position(|b| b == b'(');
    let Some(open) = open else {
        return Closure::Unterminated;
    };
    let delimiter = &rest[..open];
    if delimiter
        .bytes()
        .any(|b| matches!(b, b' ' | b')' | b'\\' | b'\t' | b'\n' | b'\r' | b'"'))
    {
        return Closure::Unterminated;
    }

    let closing = format!("){delimiter}\"");
    match rest[open + 1..].find(&closing) {
        Some(end) => {
            lex.bump(open + 1 + end + closing.len());
            Closure::Terminated
        }
        None => {
            lex.bump(rest.len());
            Closure::Unterminated
        }
    }
}
