//! # westerly
//!
//! Rewrites west-const C and C++ (`const int x`) into east-const (`int const x`).
//!
//!     The output is byte-identical to the input everywhere except where a qualifier was
//!     moved: whitespace, comments, literals, macros and line numbers all survive. Placement
//!     is decided with token-level heuristics, never a full parser, so preprocessor-laden
//!     code is handled as written.
//!
//! Pipeline
//!
//!     bytes -> [Decoding] -> [Tokenization] -> [Classification] -> [Relocation] -> [Emission]
//!
//!     - [lexing]: the tokenizer, built on a logos lexer ([token::core]).
//!     - [classify]: tags each `const`/`volatile` as leading, trailing or ignored.
//!     - [relocate]: finds the type each leading group qualifies and plans the move.
//!     - [emit]: writes the tokens back, applying the plan.
//!
//!     Stages compose through [transforms]; [transforms::standard::STANDARD] is the default
//!     pipeline.
//!
//! Usage
//!
//!     ```rust,ignore
//!     let result = westerly::transform(b"const char* p = \"const text\";")?;
//!     assert_eq!(result.output, "char const* p = \"const text\";");
//!     ```
//!
//! [Decoding]: transforms::stages::Decoding
//! [Tokenization]: transforms::stages::Tokenization
//! [Classification]: transforms::stages::Classification
//! [Relocation]: transforms::stages::Relocation
//! [Emission]: transforms::stages::Emission

pub mod classify;
pub mod config;
pub mod diagnostics;
pub mod emit;
pub mod lexing;
pub mod options;
pub mod relocate;
pub mod testing;
pub mod token;
pub mod transforms;

pub use diagnostics::{Diagnostic, DiagnosticSeverity};
pub use emit::Transformed;
pub use lexing::tokenize;
pub use options::{RewriteOptions, Spacing};
pub use token::{Token, TokenKind, TokenStream};
pub use transforms::TransformError;

use transforms::standard::{pipeline, STANDARD};

/// Rewrite one translation unit with the default options.
pub fn transform(source: &[u8]) -> Result<Transformed, TransformError> {
    STANDARD.run(source.to_vec())
}

/// Rewrite one translation unit with `options`.
pub fn transform_with(
    source: &[u8],
    options: &RewriteOptions,
) -> Result<Transformed, TransformError> {
    if *options == RewriteOptions::default() {
        return transform(source);
    }
    pipeline(options).run(source.to_vec())
}
