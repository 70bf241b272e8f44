//! End-to-end tests for the `westerly` binary.

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// A scratch directory holding `name` with `contents`; the binary runs inside it so no
/// stray `.westerly.toml` is picked up.
fn workspace(name: &str, contents: &[u8]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join(name), contents).unwrap();
    dir
}

fn westerly(dir: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("westerly");
    cmd.current_dir(dir).env_remove("RUST_LOG");
    cmd
}

fn read(dir: &TempDir, name: &str) -> String {
    fs::read_to_string(dir.path().join(name)).unwrap()
}

#[test]
fn rewrites_in_place() {
    let dir = workspace("a.cc", b"const int x;\nstatic const char* s;\n");
    westerly(dir.path()).arg("a.cc").assert().success().stdout("");
    assert_eq!(read(&dir, "a.cc"), "int const x;\nstatic char const* s;\n");
}

#[test]
fn stdout_leaves_the_file_alone() {
    let dir = workspace("a.cc", b"const int x;\n");
    westerly(dir.path())
        .args(["--stdout", "a.cc"])
        .assert()
        .success()
        .stdout("int const x;\n");
    assert_eq!(read(&dir, "a.cc"), "const int x;\n");
}

#[test]
fn check_reports_files_that_would_change() {
    let dir = workspace("a.cc", b"const int x;\n");
    fs::write(dir.path().join("b.cc"), "int const y;\n").unwrap();
    westerly(dir.path())
        .args(["--check", "a.cc", "b.cc"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("would rewrite a.cc"))
        .stderr(predicate::str::contains("b.cc").not());
    assert_eq!(read(&dir, "a.cc"), "const int x;\n");

    westerly(dir.path())
        .args(["--check", "b.cc"])
        .assert()
        .success();
}

#[test]
fn diagnostics_are_printed_with_location() {
    let dir = workspace("m.cc", b"int a;\nSOME_MACRO(const);\n");
    westerly(dir.path())
        .args(["--stdout", "m.cc"])
        .assert()
        .success()
        .stdout("int a;\nSOME_MACRO(const);\n")
        .stderr(predicate::str::contains("m.cc:2:12: warning[missing-type]"));
}

#[test]
fn strict_turns_diagnostics_into_failure() {
    let dir = workspace("m.cc", b"SOME_MACRO(const);\n");
    westerly(dir.path())
        .args(["--strict", "--stdout", "m.cc"])
        .assert()
        .code(1);
}

#[test]
fn json_diagnostics() {
    let dir = workspace("m.cc", b"const x = 1;\n");
    westerly(dir.path())
        .args(["--diagnostics", "json", "--stdout", "m.cc"])
        .assert()
        .success()
        .stderr(predicate::str::contains(r#""code":"implicit-int""#))
        .stderr(predicate::str::contains(r#""line":1"#))
        .stderr(predicate::str::contains(r#""path":"m.cc""#));
}

#[test]
fn spacing_and_macros_from_flags() {
    let dir = workspace("a.cc", b"EXPORT const char* p;\n");
    westerly(dir.path())
        .args(["--stdout", "--spacing", "padded", "--decl-macro", "EXPORT", "a.cc"])
        .assert()
        .success()
        .stdout("EXPORT char const * p;\n");
}

#[test]
fn no_volatile_keeps_volatile_in_place() {
    let dir = workspace("a.cc", b"volatile const int x;\n");
    westerly(dir.path())
        .args(["--stdout", "--no-volatile", "a.cc"])
        .assert()
        .success()
        .stdout("volatile int const x;\n");
}

#[test]
fn project_file_and_config_flag() {
    let dir = workspace("a.cc", b"const char* p;\n");
    fs::write(
        dir.path().join(".westerly.toml"),
        "[rewrite]\nspacing = \"padded\"\n",
    )
    .unwrap();
    westerly(dir.path())
        .args(["--stdout", "a.cc"])
        .assert()
        .success()
        .stdout("char const * p;\n");

    fs::write(
        dir.path().join("compact.toml"),
        "[rewrite]\nspacing = \"compact\"\n",
    )
    .unwrap();
    westerly(dir.path())
        .args(["--stdout", "--config", "compact.toml", "a.cc"])
        .assert()
        .success()
        .stdout("char const* p;\n");
}

#[test]
fn invalid_configuration_fails() {
    let dir = workspace("a.cc", b"const int x;\n");
    fs::write(dir.path().join("bad.toml"), "[rewrite]\nspacing = \"wide\"\n").unwrap();
    westerly(dir.path())
        .args(["--config", "bad.toml", "a.cc"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid configuration"));
    assert_eq!(read(&dir, "a.cc"), "const int x;\n");
}

#[test]
fn dump_tokens() {
    let dir = workspace("a.cc", b"const int x;");
    westerly(dir.path())
        .args(["--dump-tokens", "a.cc"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""kind": "keyword""#))
        .stdout(predicate::str::contains(r#""text": "const""#))
        .stdout(predicate::str::contains("end-of-input"));
}

#[test]
fn unreadable_input_fails_but_others_are_processed() {
    let dir = workspace("bad.cc", b"const int \xC0 x;\n");
    fs::write(dir.path().join("good.cc"), "const int y;\n").unwrap();
    westerly(dir.path())
        .args(["bad.cc", "missing.cc", "good.cc"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("cannot rewrite bad.cc"))
        .stderr(predicate::str::contains("cannot read missing.cc"));
    assert_eq!(read(&dir, "good.cc"), "int const y;\n");
    assert_eq!(
        fs::read(dir.path().join("bad.cc")).unwrap(),
        b"const int \xC0 x;\n"
    );
}

#[test]
fn check_and_stdout_conflict() {
    let dir = workspace("a.cc", b"const int x;\n");
    westerly(dir.path())
        .args(["--check", "--stdout", "a.cc"])
        .assert()
        .failure();
}
