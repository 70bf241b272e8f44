//! Testing utilities
//!
//!     Helpers shared by unit tests and the integration tests under `tests/`.
//!
//! Golden Fixtures
//!
//!     Fixtures live in `tests/fixtures/<style>/` as pairs of files: `<name>.in.cc` is fed
//!     to the rewriter with the spacing style named by the directory, and the result must
//!     equal `<name>.out.cc` byte for byte. [Fixture::discover] finds every pair in a
//!     directory, in file name order.
//!
//! Conservation
//!
//!     [significant_multiset] is the check behind the promise that a rewrite only moves
//!     qualifiers around: the sorted texts of all significant tokens of input and output
//!     must be equal.

use crate::lexing::tokenize;
use crate::options::{RewriteOptions, Spacing};
use crate::token::TokenKind;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const INPUT_SUFFIX: &str = ".in.cc";
const OUTPUT_SUFFIX: &str = ".out.cc";

/// `foo.in.cc` -> `foo.out.cc`; `None` for anything else.
pub fn expected_output_path(input: &Path) -> Option<PathBuf> {
    let file_name = input.file_name()?.to_str()?;
    let stem = file_name.strip_suffix(INPUT_SUFFIX)?;
    Some(input.with_file_name(format!("{stem}{OUTPUT_SUFFIX}")))
}

#[derive(Debug, Clone)]
pub struct Fixture {
    pub name: String,
    pub input_path: PathBuf,
    pub input: String,
    pub expected: String,
    pub options: RewriteOptions,
}

impl Fixture {
    pub fn load(input_path: &Path, options: RewriteOptions) -> io::Result<Self> {
        let expected_path = expected_output_path(input_path).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not a {INPUT_SUFFIX} file", input_path.display()),
            )
        })?;
        let name = input_path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| n.strip_suffix(INPUT_SUFFIX))
            .unwrap_or_default()
            .to_string();
        Ok(Self {
            name,
            input_path: input_path.to_path_buf(),
            input: fs::read_to_string(input_path)?,
            expected: fs::read_to_string(expected_path)?,
            options,
        })
    }

    /// Every fixture pair in `dir`, using the spacing style named by the directory.
    pub fn discover(dir: &Path) -> io::Result<Vec<Self>> {
        let options = RewriteOptions::default().with_spacing(style_of(dir));
        let mut inputs: Vec<PathBuf> = fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| expected_output_path(path).is_some())
            .collect();
        inputs.sort();
        inputs
            .iter()
            .map(|path| Fixture::load(path, options.clone()))
            .collect()
    }
}

fn style_of(dir: &Path) -> Spacing {
    match dir.file_name().and_then(|n| n.to_str()) {
        Some("padded") => Spacing::Padded,
        _ => Spacing::Compact,
    }
}

/// Sorted texts of all significant tokens.
pub fn significant_multiset(source: &str) -> Vec<String> {
    let mut texts: Vec<String> = tokenize(source)
        .tokens
        .into_iter()
        .filter(|t| !t.is_trivia() && t.kind != TokenKind::EndOfInput)
        .map(|t| t.text)
        .collect();
    texts.sort();
    texts
}

/// Source with every whitespace token removed, keeping comments and the rest in order.
///
/// Outside of moved qualifiers, a rewrite may only change whitespace; comparing this form
/// of input and output with the qualifiers stripped checks that.
pub fn without_whitespace_and_qualifiers(source: &str) -> String {
    tokenize(source)
        .tokens
        .into_iter()
        .filter(|t| {
            t.kind != TokenKind::Whitespace
                && !t.is_keyword("const")
                && !t.is_keyword("volatile")
        })
        .map(|t| t.text)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expected_output_path() {
        assert_eq!(
            expected_output_path(Path::new("tests/fixtures/compact/001.in.cc")),
            Some(PathBuf::from("tests/fixtures/compact/001.out.cc"))
        );
        assert_eq!(expected_output_path(Path::new("001.out.cc")), None);
        assert_eq!(expected_output_path(Path::new("main.cc")), None);
    }

    #[test]
    fn test_multiset_ignores_order() {
        assert_eq!(
            significant_multiset("const int x;"),
            significant_multiset("int const  x;")
        );
        assert_ne!(
            significant_multiset("const int x;"),
            significant_multiset("int x;")
        );
    }

    #[test]
    fn test_discover_pairs() {
        let dir = tempfile::tempdir().unwrap();
        let padded = dir.path().join("padded");
        fs::create_dir(&padded).unwrap();
        fs::write(padded.join("b.in.cc"), "const int b;").unwrap();
        fs::write(padded.join("b.out.cc"), "int const b;").unwrap();
        fs::write(padded.join("a.in.cc"), "const int a;").unwrap();
        fs::write(padded.join("a.out.cc"), "int const a;").unwrap();
        fs::write(padded.join("notes.txt"), "ignored").unwrap();

        let fixtures = Fixture::discover(&padded).unwrap();
        let names: Vec<_> = fixtures.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(fixtures[0].options.spacing, Spacing::Padded);
        assert_eq!(fixtures[1].expected, "int const b;");
    }

    #[test]
    fn test_missing_expected_output_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("lonely.in.cc"), "int x;").unwrap();
        assert!(Fixture::discover(dir.path()).is_err());
    }
}
