//! Decoding stage
//!
//! Turns raw file bytes into text. Invalid UTF-8 is the only hard error of the pipeline.

use crate::transforms::{Runnable, TransformError};

pub struct Decoding;

impl Decoding {
    pub fn new() -> Self {
        Decoding
    }
}

impl Default for Decoding {
    fn default() -> Self {
        Self::new()
    }
}

impl Runnable<Vec<u8>, String> for Decoding {
    fn run(&self, input: Vec<u8>) -> Result<String, TransformError> {
        String::from_utf8(input).map_err(|err| TransformError::InvalidEncoding {
            offset: err.utf8_error().valid_up_to(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_utf8() {
        let text = Decoding::new().run("int é;".as_bytes().to_vec()).unwrap();
        assert_eq!(text, "int é;");
    }

    #[test]
    fn test_first_invalid_byte_is_reported() {
        let bytes = b"const int x;\xff\xfe".to_vec();
        assert_eq!(
            Decoding::new().run(bytes),
            Err(TransformError::InvalidEncoding { offset: 12 })
        );
    }

    #[test]
    fn test_truncated_sequence() {
        let bytes = vec![b'a', 0xC3];
        assert_eq!(
            Decoding::new().run(bytes),
            Err(TransformError::InvalidEncoding { offset: 1 })
        );
    }
}
