//! Classification stage
//!
//! Tags every `const`/`volatile` token with its role.

use crate::classify::{classify, ClassifiedStream};
use crate::options::RewriteOptions;
use crate::token::TokenStream;
use crate::transforms::{Runnable, TransformError};

pub struct Classification {
    options: RewriteOptions,
}

impl Classification {
    pub fn new(options: RewriteOptions) -> Self {
        Self { options }
    }
}

impl Default for Classification {
    fn default() -> Self {
        Self::new(RewriteOptions::default())
    }
}

impl Runnable<TokenStream, ClassifiedStream> for Classification {
    fn run(&self, input: TokenStream) -> Result<ClassifiedStream, TransformError> {
        Ok(classify(input, &self.options))
    }
}
