//! Individual transformation stages
//!
//! Each stage implements [Runnable](crate::transforms::Runnable) for one step of the
//! rewrite. Stages that depend on [RewriteOptions](crate::options::RewriteOptions) own a
//! copy, so a pipeline can be built once and shared across threads.

pub mod classification;
pub mod decoding;
pub mod emission;
pub mod relocation;
pub mod tokenization;

pub use classification::Classification;
pub use decoding::Decoding;
pub use emission::Emission;
pub use relocation::Relocation;
pub use tokenization::Tokenization;
