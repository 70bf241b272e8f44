//! Knobs of the rewrite engine.
//!
//! These are plain values passed into each pipeline invocation; nothing here is global.
//! The [config](crate::config) module layers files and environment variables on top of
//! [RewriteOptions::default] before handing the result to the pipeline.

use crate::classify::Qualifier;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How the relocated qualifier is separated from the token that follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Spacing {
    /// `const char* p` becomes `char const* p`: pad only before words, literals and comments.
    #[default]
    Compact,
    /// `const char* p` becomes `char const * p`: also pad before `*`, `&`, `[`, `(`, `{`, `::`.
    Padded,
}

impl fmt::Display for Spacing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Spacing::Compact => write!(f, "compact"),
            Spacing::Padded => write!(f, "padded"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RewriteOptions {
    pub spacing: Spacing,
    /// Move `volatile` along with `const`. When off, `volatile` stays put and is only
    /// stepped over while looking for the type.
    pub relocate_volatile: bool,
    /// Identifiers that behave like declaration specifiers, e.g. `EXPORT_API`.
    pub decl_macros: Vec<String>,
    /// Upper bound on significant tokens scanned per type extent.
    pub max_extent_tokens: usize,
}

impl Default for RewriteOptions {
    fn default() -> Self {
        Self {
            spacing: Spacing::Compact,
            relocate_volatile: true,
            decl_macros: Vec::new(),
            max_extent_tokens: 256,
        }
    }
}

impl RewriteOptions {
    pub fn with_spacing(mut self, spacing: Spacing) -> Self {
        self.spacing = spacing;
        self
    }

    pub fn with_decl_macro(mut self, name: impl Into<String>) -> Self {
        self.decl_macros.push(name.into());
        self
    }

    pub fn relocates(&self, qualifier: Qualifier) -> bool {
        match qualifier {
            Qualifier::Const => true,
            Qualifier::Volatile => self.relocate_volatile,
        }
    }
}
