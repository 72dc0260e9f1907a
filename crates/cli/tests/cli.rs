//! End-to-end checks of the `slatec` binary: exit codes, stream
//! separation and the diagnostics formats.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

fn slatec() -> Command {
    Command::cargo_bin("slatec").expect("binary builds")
}

fn write_source(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).expect("write source");
    path
}

const CLEAN: &str = r#"stylesheet {
  version "1.0"
  match using "/" {
    element "html" { text "hi" }
  }
}"#;

#[test]
fn clean_input_prints_markup_and_exits_zero() {
    let dir = tempdir().unwrap();
    let input = write_source(&dir, "clean.slt", CLEAN);
    slatec()
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("<xsl:stylesheet"))
        .stdout(predicate::str::contains("<xsl:text>hi</xsl:text>"))
        .stderr(predicate::str::is_empty());
}

#[test]
fn defective_input_reports_on_stderr_and_exits_one() {
    let dir = tempdir().unwrap();
    let input = write_source(&dir, "bad.slt", "stylesheet { version \"1.0\" value-of }");
    slatec()
        .arg(&input)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("**** ("))
        .stderr(predicate::str::contains("line 1:"));
}

#[test]
fn markup_still_generated_alongside_errors() {
    let dir = tempdir().unwrap();
    let input = write_source(
        &dir,
        "bad.slt",
        "stylesheet { version \"1.0\" match using \"/\" { value-of } }",
    );
    slatec()
        .arg(&input)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("<xsl:value-of"));
}

#[test]
fn output_file_receives_the_markup() {
    let dir = tempdir().unwrap();
    let input = write_source(&dir, "clean.slt", CLEAN);
    let out = dir.path().join("result.xsl");
    slatec()
        .arg(&input)
        .arg("-o")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
    let markup = fs::read_to_string(&out).unwrap();
    assert!(markup.contains("<xsl:stylesheet"));
}

#[test]
fn missing_file_exits_two() {
    slatec()
        .arg("no-such-file.slt")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("slatec:"));
}

#[test]
fn bad_target_version_exits_two() {
    let dir = tempdir().unwrap();
    let input = write_source(&dir, "clean.slt", CLEAN);
    slatec()
        .arg(&input)
        .arg("--target")
        .arg("2.0")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unsupported target version"));
}

#[test]
fn undefined_reference_is_advisory_unless_strict() {
    let dir = tempdir().unwrap();
    let input = write_source(
        &dir,
        "undef.slt",
        "stylesheet { version \"1.0\" match using \"/\" { value-of \"$missing\" } }",
    );
    slatec()
        .arg(&input)
        .assert()
        .success()
        .stderr(predicate::str::contains("could not find variable '$missing'"));

    slatec()
        .arg(&input)
        .arg("--strict-undefined")
        .assert()
        .code(1);

    slatec()
        .arg(&input)
        .arg("--no-undefined-warnings")
        .assert()
        .success()
        .stderr(predicate::str::is_empty());
}

#[test]
fn symbols_listing_goes_to_stderr() {
    let dir = tempdir().unwrap();
    let input = write_source(
        &dir,
        "syms.slt",
        "stylesheet { version \"1.0\" match using \"/\" { variable v \"1\" value-of \"$v\" } }",
    );
    slatec()
        .arg(&input)
        .arg("--symbols")
        .assert()
        .success()
        .stderr(predicate::str::contains("-- stylesheet"))
        .stderr(predicate::str::contains("variable 'v'"));
}

#[test]
fn json_diagnostics_are_machine_readable() {
    let dir = tempdir().unwrap();
    let input = write_source(&dir, "bad.slt", "stylesheet { version \"1.0\" value-of }");
    let assert = slatec()
        .arg(&input)
        .arg("--output")
        .arg("json")
        .assert()
        .code(1);
    let stderr = String::from_utf8_lossy(&assert.get_output().stderr).into_owned();
    let report: serde_json::Value = serde_json::from_str(stderr.trim()).expect("valid JSON");
    assert!(report["blocking"].as_u64().unwrap() >= 1);
    assert!(report["errors"].as_array().unwrap().len() >= 1);
}

#[test]
fn line_comments_flag_annotates_the_markup() {
    let dir = tempdir().unwrap();
    let input = write_source(&dir, "clean.slt", CLEAN);
    slatec()
        .arg(&input)
        .arg("--line-comments")
        .assert()
        .success()
        .stdout(predicate::str::contains("<!-- Line: 1 -->"));
}

#[test]
fn custom_prefix_applies_to_generated_tags() {
    let dir = tempdir().unwrap();
    let input = write_source(&dir, "clean.slt", CLEAN);
    slatec()
        .arg(&input)
        .arg("--prefix")
        .arg("x")
        .assert()
        .success()
        .stdout(predicate::str::contains("<x:stylesheet"))
        .stdout(predicate::str::contains("xmlns:x="));
}
