//! Standard transform definitions
//!
//! Prebuilt pipelines. [STANDARD] uses the default options and is built once; [pipeline]
//! builds one for any other [RewriteOptions].

use crate::emit::Transformed;
use crate::options::RewriteOptions;
use crate::token::TokenStream;
use crate::transforms::stages::{Classification, Decoding, Emission, Relocation, Tokenization};
use crate::transforms::Transform;
use once_cell::sync::Lazy;

/// Type alias for the full rewrite transform
pub type RewriteTransform = Transform<Vec<u8>, Transformed>;

/// Type alias for the text-to-tokens transform
pub type LexingTransform = Transform<String, TokenStream>;

/// Tokenization only: String → TokenStream
///
/// # Example
///
/// ```rust,ignore
/// use westerly::transforms::standard::LEXING;
///
/// let stream = LEXING.run("const int x;".to_string()).unwrap();
/// assert_eq!(stream.source_text(), "const int x;");
/// ```
pub static LEXING: Lazy<LexingTransform> =
    Lazy::new(|| Transform::from_fn(Ok).then(Tokenization::new()));

/// Full rewrite with default options: bytes → Transformed
///
/// 1. Decoding (UTF-8)
/// 2. Tokenization (logos)
/// 3. Classification
/// 4. Relocation
/// 5. Emission
pub static STANDARD: Lazy<RewriteTransform> = Lazy::new(|| pipeline(&RewriteOptions::default()));

/// Build the full rewrite pipeline for `options`.
pub fn pipeline(options: &RewriteOptions) -> RewriteTransform {
    Transform::from_fn(Ok)
        .then(Decoding::new())
        .then_transform(&LEXING)
        .then(Classification::new(options.clone()))
        .then(Relocation::new(options.clone()))
        .then(Emission::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Spacing;
    use crate::transforms::TransformError;

    #[test]
    fn test_standard_pipeline() {
        let transformed = STANDARD.run(b"const int x;".to_vec()).unwrap();
        assert_eq!(transformed.output, "int const x;");
        assert!(transformed.diagnostics.is_empty());
    }

    #[test]
    fn test_custom_pipeline() {
        let options = RewriteOptions::default().with_spacing(Spacing::Padded);
        let transformed = pipeline(&options).run(b"const char* p;".to_vec()).unwrap();
        assert_eq!(transformed.output, "char const * p;");
    }

    #[test]
    fn test_decoding_failure_is_hard() {
        let result = STANDARD.run(vec![b'c', 0xFF]);
        assert_eq!(result, Err(TransformError::InvalidEncoding { offset: 1 }));
    }

    #[test]
    fn test_lexing() {
        let stream = LEXING.run("int x;".to_string()).unwrap();
        assert_eq!(stream.source_text(), "int x;");
    }
}
