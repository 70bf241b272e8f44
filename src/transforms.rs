//! Transform pipeline infrastructure
//!
//! The rewrite engine is a chain of typed stages. Each stage implements [Runnable], and a
//! [Transform] composes them with [Transform::then]; the compiler checks that every
//! stage's output type is the next stage's input type.
//!
//! ```rust,ignore
//! let pipeline = Transform::from_fn(Ok)
//!     .then(Decoding::new())                 // Vec<u8> → String
//!     .then(Tokenization::new())             // String → TokenStream
//!     .then(Classification::new(options))    // TokenStream → ClassifiedStream
//!     .then(Relocation::new(options))        // ClassifiedStream → PlannedStream
//!     .then(Emission::new());                // PlannedStream → Transformed
//! ```
//!
//! The default pipeline is prebuilt as an immutable static; see [standard].
//!
//! # Module Organization
//!
//! - [`stages`]: the individual stages
//! - [`standard`]: prebuilt pipelines

pub mod stages;
pub mod standard;

/// Hard failure of a pipeline run. Soft problems travel as diagnostics instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransformError {
    /// Input bytes are not UTF-8; `offset` is the first invalid byte.
    #[error("input is not valid UTF-8 (first invalid byte at offset {offset})")]
    InvalidEncoding { offset: usize },
    /// A stage detected a broken internal invariant.
    #[error("Stage '{stage}' failed: {message}")]
    StageFailed { stage: String, message: String },
}

/// Trait for anything that can transform an input to an output
pub trait Runnable<I, O> {
    fn run(&self, input: I) -> Result<O, TransformError>;
}

/// A composable transformation pipeline from `I` to `O`.
pub struct Transform<I, O> {
    run_fn: Box<dyn Fn(I) -> Result<O, TransformError> + Send + Sync>,
}

impl<I, O> Transform<I, O> {
    /// Create a transform from a function
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(I) -> Result<O, TransformError> + Send + Sync + 'static,
    {
        Transform {
            run_fn: Box::new(f),
        }
    }

    /// Chain a stage after this transform, extending its output type.
    pub fn then<O2, S>(self, stage: S) -> Transform<I, O2>
    where
        S: Runnable<O, O2> + Send + Sync + 'static,
        I: 'static,
        O: 'static,
        O2: 'static,
    {
        let prev_run = self.run_fn;
        Transform {
            run_fn: Box::new(move |input| {
                let intermediate = prev_run(input)?;
                stage.run(intermediate)
            }),
        }
    }

    /// Chain a prebuilt static transform after this one.
    pub fn then_transform<O2>(self, next: &'static Transform<O, O2>) -> Transform<I, O2>
    where
        I: 'static,
        O: 'static,
        O2: 'static,
    {
        let prev_run = self.run_fn;
        Transform {
            run_fn: Box::new(move |input| {
                let intermediate = prev_run(input)?;
                next.run(intermediate)
            }),
        }
    }

    pub fn run(&self, input: I) -> Result<O, TransformError> {
        (self.run_fn)(input)
    }
}

impl<I, O> Runnable<I, O> for Transform<I, O>
where
    I: 'static,
    O: 'static,
{
    fn run(&self, input: I) -> Result<O, TransformError> {
        Transform::run(self, input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use once_cell::sync::Lazy;

    struct Count;
    impl Runnable<String, usize> for Count {
        fn run(&self, input: String) -> Result<usize, TransformError> {
            Ok(input.len())
        }
    }

    struct Double;
    impl Runnable<usize, usize> for Double {
        fn run(&self, input: usize) -> Result<usize, TransformError> {
            Ok(input * 2)
        }
    }

    struct Broken;
    impl Runnable<usize, usize> for Broken {
        fn run(&self, _input: usize) -> Result<usize, TransformError> {
            Err(TransformError::StageFailed {
                stage: "broken".to_string(),
                message: "always fails".to_string(),
            })
        }
    }

    static DOUBLE: Lazy<Transform<usize, usize>> =
        Lazy::new(|| Transform::from_fn(Ok).then(Double));

    #[test]
    fn test_type_changing_chain() {
        let transform = Transform::from_fn(|s: String| Ok(s)).then(Count).then(Double);
        assert_eq!(transform.run("abc".to_string()).unwrap(), 6);
    }

    #[test]
    fn test_then_transform() {
        let transform = Transform::from_fn(|s: String| Ok(s)).then(Count).then_transform(&DOUBLE);
        assert_eq!(transform.run("ab".to_string()).unwrap(), 4);
    }

    #[test]
    fn test_error_stops_the_chain() {
        let transform = Transform::from_fn(|s: String| Ok(s)).then(Count).then(Broken).then(Double);
        let err = transform.run("abc".to_string()).unwrap_err();
        assert_eq!(err.to_string(), "Stage 'broken' failed: always fails");
    }

    #[test]
    fn test_encoding_error_display() {
        let err = TransformError::InvalidEncoding { offset: 7 };
        assert_eq!(
            err.to_string(),
            "input is not valid UTF-8 (first invalid byte at offset 7)"
        );
    }
}
