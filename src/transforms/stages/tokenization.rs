//! Tokenization stage
//!
//! Converts source text into a [TokenStream] using the logos lexer.

use crate::lexing::tokenize;
use crate::token::TokenStream;
use crate::transforms::{Runnable, TransformError};

/// Source text to [TokenStream]. First stage after decoding.
pub struct Tokenization;

impl Tokenization {
    pub fn new() -> Self {
        Tokenization
    }
}

impl Default for Tokenization {
    fn default() -> Self {
        Self::new()
    }
}

impl Runnable<String, TokenStream> for Tokenization {
    fn run(&self, input: String) -> Result<TokenStream, TransformError> {
        Ok(tokenize(&input))
    }
}

// Also implement for &str for convenience
impl Runnable<&str, TokenStream> for Tokenization {
    fn run(&self, input: &str) -> Result<TokenStream, TransformError> {
        Ok(tokenize(input))
    }
}
