//! Command-line tests against the built `jstep` binary

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

const SIMPLE: &str = r#"{
  "name": "jpamb.cases.Simple",
  "methods": [
    {
      "name": "divideByN",
      "descriptor": "(II)I",
      "static": true,
      "code": [
        {"opr": "load", "type": "I", "index": 0},
        {"opr": "load", "type": "I", "index": 1},
        {"opr": "binary", "operant": "div"},
        {"opr": "return", "type": "I"}
      ]
    },
    {
      "name": "assertBoolean",
      "descriptor": "(Z)V",
      "static": true,
      "code": [
        {"opr": "get", "static": true, "field": {"class": "jpamb.cases.Simple", "name": "$assertionsDisabled", "type": "Z"}},
        {"opr": "ifz", "condition": "ne", "target": 7},
        {"opr": "load", "type": "Z", "index": 0},
        {"opr": "ifz", "condition": "ne", "target": 7},
        {"opr": "new", "class": "java.lang.AssertionError"},
        {"opr": "dup"},
        {"opr": "invoke", "access": "special", "method": "java.lang.AssertionError.<init>:()V"},
        {"opr": "return"}
      ]
    },
    {
      "name": "allocate",
      "descriptor": "(I)I",
      "static": true,
      "code": [
        {"opr": "load", "type": "I", "index": 0},
        {"opr": "new_array", "type": "I"},
        {"opr": "array_length"},
        {"opr": "return", "type": "I"}
      ]
    },
    {
      "name": "spin",
      "descriptor": "()V",
      "static": true,
      "code": [
        {"opr": "goto", "target": 0}
      ]
    }
  ]
}"#;

/// Lay out `classes/jpamb/cases/Simple.json` under `root`
fn write_suite(root: &Path) {
    let dir = root.join("classes/jpamb/cases");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("Simple.json"), SIMPLE).unwrap();
}

fn jstep(cwd: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_jstep"))
        .current_dir(cwd)
        .args(args)
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_run_prints_outcome() {
    let dir = tempfile::tempdir().unwrap();
    write_suite(dir.path());

    let output = jstep(
        dir.path(),
        &[
            "run",
            "jpamb.cases.Simple.divideByN:(II)I",
            "(10, 0)",
            "--classpath",
            "classes",
        ],
    );
    assert!(output.status.success());
    assert_eq!(stdout(&output), "divide by zero\n");

    let output = jstep(
        dir.path(),
        &[
            "run",
            "jpamb.cases.Simple.divideByN:(II)I",
            "(10, 2)",
            "--classpath",
            "classes",
        ],
    );
    assert_eq!(stdout(&output), "ok\n");
}

#[test]
fn test_fault_exits_without_label() {
    let dir = tempfile::tempdir().unwrap();
    write_suite(dir.path());

    let output = jstep(
        dir.path(),
        &[
            "run",
            "jpamb.cases.Simple.divideByN:(II)I",
            "(10)",
            "--classpath",
            "classes",
        ],
    );
    assert_eq!(output.status.code(), Some(2));
    assert!(stdout(&output).is_empty());
    assert!(!output.stderr.is_empty());
}

#[test]
fn test_huge_array_is_a_fault() {
    let dir = tempfile::tempdir().unwrap();
    write_suite(dir.path());

    let output = jstep(
        dir.path(),
        &[
            "run",
            "jpamb.cases.Simple.allocate:(I)I",
            "(2147483647)",
            "--classpath",
            "classes",
        ],
    );
    assert_eq!(output.status.code(), Some(2));
    assert!(stdout(&output).is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("too large"));

    let output = jstep(
        dir.path(),
        &[
            "run",
            "jpamb.cases.Simple.allocate:(I)I",
            "(3)",
            "--classpath",
            "classes",
        ],
    );
    assert_eq!(stdout(&output), "ok\n");
}

#[test]
fn test_config_file_step_limit() {
    let dir = tempfile::tempdir().unwrap();
    write_suite(dir.path());
    fs::write(
        dir.path().join("jstep.toml"),
        "[interpreter]\nstep_limit = 5\nclasspath = \"classes\"\n",
    )
    .unwrap();

    let output = jstep(dir.path(), &["run", "jpamb.cases.Simple.spin:()V"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "*\n");
}

#[test]
fn test_analyze_reports_confidences() {
    let dir = tempfile::tempdir().unwrap();
    write_suite(dir.path());

    let output = jstep(
        dir.path(),
        &[
            "analyze",
            "jpamb.cases.Simple.assertBoolean:(Z)V",
            "--classpath",
            "classes",
        ],
    );
    assert!(output.status.success());
    assert_eq!(
        stdout(&output),
        "ok;98%\ndivide by zero;0%\nassertion error;98%\nout of bounds;0%\nnull pointer;0%\n*;0%\n"
    );
}

#[test]
fn test_info_lists_instructions() {
    let dir = tempfile::tempdir().unwrap();
    write_suite(dir.path());

    let output = jstep(
        dir.path(),
        &[
            "info",
            "jpamb.cases.Simple.spin:()V",
            "--classpath",
            "classes",
        ],
    );
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.starts_with("jpamb.cases.Simple.spin:()V\n"));
    assert_eq!(text.lines().count(), 2);
}
