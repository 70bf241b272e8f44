//! Emission stage
//!
//! Validates the plan against the token sequence and writes the output text. A plan that
//! fails validation is an internal error and stops the pipeline.

use crate::emit::{emit_stream, Transformed};
use crate::relocate::PlannedStream;
use crate::transforms::{Runnable, TransformError};

pub struct Emission;

impl Emission {
    pub fn new() -> Self {
        Emission
    }
}

impl Default for Emission {
    fn default() -> Self {
        Self::new()
    }
}

impl Runnable<PlannedStream, Transformed> for Emission {
    fn run(&self, input: PlannedStream) -> Result<Transformed, TransformError> {
        input
            .plan
            .validate(&input.tokens)
            .map_err(|err| TransformError::StageFailed {
                stage: "emission".to_string(),
                message: err.to_string(),
            })?;
        Ok(emit_stream(input))
    }
}
