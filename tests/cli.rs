use predicates::prelude::*;
use std::io::Write;
use std::process::Command;
use tempfile::{NamedTempFile, TempDir};

fn cmd() -> assert_cmd::Command {
    assert_cmd::Command::from(Command::new(env!("CARGO_BIN_EXE_codedoc")))
}

fn fixture_path(name: &str) -> String {
    format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
}

// -- formats --

#[test]
fn json_is_the_default_format() {
    let assert = cmd().arg(fixture_path("go_examples.go")).assert().success();
    let output = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let json: serde_json::Value = serde_json::from_str(&output).unwrap();

    let entities = json["model"]["entities"].as_array().unwrap();
    assert_eq!(entities.len(), 5);
    assert_eq!(entities[0]["name"], "Server");
    assert_eq!(entities[0]["kind"], "struct");
    assert_eq!(entities[1]["params"][0]["type"], "context.Context");
    assert_eq!(json["model"]["groups"]["HTTP"]["members"], serde_json::json!([0, 1]));
    assert_eq!(json["issues"], serde_json::json!([]));
    assert_eq!(json["skipped"], 0);
}

#[test]
fn text_format_is_lint_style() {
    let mut file = NamedTempFile::with_suffix(".go").unwrap();
    write!(
        file,
        "/**\n * @code Hash\n * @codeName Hash\n * @codeName Other\n */\nfunc Hash() {{}}\n"
    )
    .unwrap();

    cmd()
        .args(["-f", "text"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(format!(
            "{}:4: error[duplicate-tag]: Hash: duplicate @codeName (first declared on line 3)",
            file.path().display()
        )))
        .stdout(predicate::str::contains("1 entities in 0 groups, 1 errors, 0 warnings"));
}

#[test]
fn annotations_format_can_be_extracted_again() {
    let dir = TempDir::new().unwrap();
    let emitted = dir.path().join("emitted.rs");

    cmd()
        .args(["-f", "annotations", "-o"])
        .arg(&emitted)
        .arg(fixture_path("rust_examples.rs"))
        .assert()
        .success();

    let text = std::fs::read_to_string(&emitted).unwrap();
    assert!(text.starts_with("/**\n * @code {struct} BufferPool\n"));
    assert!(text.contains(
        " * @codeGeneric {T: Send + Sync} Buffer element type that is thread-safe\n"
    ));

    cmd()
        .args(["-f", "text"])
        .arg(&emitted)
        .assert()
        .success()
        .stdout(predicate::str::contains("5 entities in 4 groups, 0 errors, 1 warnings"));
}

#[test]
fn unknown_format_fails() {
    cmd()
        .args(["-f", "xml"])
        .arg(fixture_path("go_examples.go"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown format: xml"));
}

// -- inputs --

#[test]
fn directory_input_scans_known_sources() {
    let dir = TempDir::new().unwrap();
    std::fs::copy(fixture_path("go_examples.go"), dir.path().join("a.go")).unwrap();
    std::fs::copy(fixture_path("python_examples.py"), dir.path().join("b.py")).unwrap();
    std::fs::write(dir.path().join("README"), "/** @code Ignored */").unwrap();

    cmd()
        .args(["-f", "text"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("10 entities"));
}

#[test]
fn glob_input() {
    let pattern = format!("{}/tests/fixtures/*.py", env!("CARGO_MANIFEST_DIR"));
    cmd()
        .args(["-f", "text", &pattern])
        .assert()
        .success()
        .stdout(predicate::str::contains("5 entities in 4 groups"));
}

#[test]
fn forced_language() {
    let mut file = NamedTempFile::with_suffix(".txt").unwrap();
    write!(file, "# @code greet\n# @codeGroup Shell\ngreet() {{ :; }}\n").unwrap();

    cmd()
        .args(["-f", "text", "-l", "bash"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("1 entities in 1 groups"));
}

#[test]
fn no_matching_files_fails() {
    cmd()
        .arg("/nonexistent/*.go")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no input files found"));
}

#[test]
fn missing_files_argument_is_a_usage_error() {
    cmd().assert().failure().code(2);
}

// -- exit status --

#[test]
fn strict_fails_only_on_errors() {
    let mut file = NamedTempFile::with_suffix(".go").unwrap();
    write!(file, "/**\n * @code f\n * @codeParam x no type\n */\n").unwrap();

    cmd().arg(file.path()).assert().success();
    cmd()
        .arg("--strict")
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("1 errors"));

    // Only a warning here.
    cmd().arg("--strict").arg(fixture_path("rust_examples.rs")).assert().success();
}

#[test]
fn deny_warnings_fails_on_warnings() {
    cmd()
        .arg("--deny-warnings")
        .arg(fixture_path("rust_examples.rs"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("0 errors, 1 warnings"));
}

#[test]
fn output_is_written_before_failing() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("model.json");

    cmd()
        .args(["--deny-warnings", "-o"])
        .arg(&out)
        .arg(fixture_path("rust_examples.rs"))
        .assert()
        .failure();

    let json = std::fs::read_to_string(&out).unwrap();
    assert!(json.contains("\"inherited-generic\""));
}

// -- configuration --

#[test]
fn config_file_adds_languages() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("codedoc.json");
    std::fs::write(
        &config,
        r###"{"jobs": 2, "languages": {"nim": [{"kind": "line", "marker": "##"}]}}"###,
    )
    .unwrap();
    let source = dir.path().join("hello.nim");
    std::fs::write(
        &source,
        "## @code greet\n## @codeGroup Hello\nproc greet() = discard\n",
    )
    .unwrap();

    cmd()
        .args(["-f", "text", "-l", "nim", "-c"])
        .arg(&config)
        .arg(&source)
        .assert()
        .success()
        .stdout(predicate::str::contains("1 entities in 1 groups"));
}

#[test]
fn invalid_config_fails() {
    let mut config = NamedTempFile::with_suffix(".json").unwrap();
    write!(config, "{{\"jobs\": \"many\"}}").unwrap();

    cmd()
        .arg("-c")
        .arg(config.path())
        .arg(fixture_path("go_examples.go"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid config"));
}

#[test]
fn unknown_tags_can_be_silenced() {
    let mut source = NamedTempFile::with_suffix(".go").unwrap();
    write!(source, "/**\n * @code f\n * @codeFoo bar\n */\n").unwrap();
    let mut config = NamedTempFile::with_suffix(".json").unwrap();
    write!(config, "{{\"warn_unknown_tags\": false}}").unwrap();

    cmd()
        .arg("--deny-warnings")
        .arg(source.path())
        .assert()
        .failure();
    cmd()
        .args(["--deny-warnings", "-c"])
        .arg(config.path())
        .arg(source.path())
        .assert()
        .success();
}
