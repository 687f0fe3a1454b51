mod common;

use assert_cmd::Command;
use common::TestWorkspace;
use predicates::str::contains;

fn concat_cmd() -> Command {
    let mut cmd = Command::cargo_bin("csv-concat").expect("binary exists");
    cmd.env_remove("RUST_LOG").arg("concat");
    cmd
}

#[test]
fn concat_with_legacy_flags_reorders_columns() {
    let ws = TestWorkspace::new();
    let a = ws.write("a.csv", "id,name\n1,Alice\n");
    let b = ws.write("b.csv", "name,id\nBob,2\n");
    let out = ws.join("out.csv");

    concat_cmd()
        .args([
            "-ihh",
            "-ohh",
            "-or",
            "\\n",
            "-out",
            out.to_str().unwrap(),
            a.to_str().unwrap(),
            b.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stderr(contains("Appended"));

    assert_eq!(ws.read("out.csv"), "id,name\n1,Alice\n2,Bob\n");
}

#[test]
fn concat_accepts_double_dash_flags() {
    let ws = TestWorkspace::new();
    let a = ws.write("a.tsv", "1\tx\n");
    let b = ws.write("b.tsv", "2\ty\n");
    let out = ws.join("out.csv");

    concat_cmd()
        .args([
            "--itype",
            "tdf",
            "--od",
            "semicolon",
            "--or",
            "lf",
            "--out",
            out.to_str().unwrap(),
            a.to_str().unwrap(),
            b.to_str().unwrap(),
        ])
        .assert()
        .success();

    assert_eq!(ws.read("out.csv"), "1;x\n2;y\n");
}

#[test]
fn single_input_reports_config_error_code() {
    let ws = TestWorkspace::new();
    let a = ws.write("a.csv", "1\n");
    let out = ws.join("out.csv");

    concat_cmd()
        .args(["-out", out.to_str().unwrap(), a.to_str().unwrap()])
        .assert()
        .failure()
        .code(1)
        .stderr(contains("SINGLE_INPUT_FILE"));

    assert!(!out.exists());
}

#[test]
fn output_headers_require_input_headers() {
    let ws = TestWorkspace::new();
    let a = ws.write("a.csv", "1\n");
    let b = ws.write("b.csv", "2\n");
    let out = ws.join("out.csv");

    concat_cmd()
        .args([
            "-ohh",
            "-out",
            out.to_str().unwrap(),
            a.to_str().unwrap(),
            b.to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stderr(contains("NO_INPUT_HEADERS"));
}

#[test]
fn preset_with_explicit_delimiter_is_rejected() {
    let ws = TestWorkspace::new();
    let out = ws.join("out.csv");

    concat_cmd()
        .args([
            "-itype",
            "excel",
            "-id",
            ";",
            "-out",
            out.to_str().unwrap(),
            "a.csv",
            "b.csv",
        ])
        .assert()
        .failure()
        .stderr(contains("INPUT_FORMAT_AND_DELIMITER"));

    assert!(!out.exists());
}

#[test]
fn unknown_type_is_rejected() {
    let ws = TestWorkspace::new();
    let out = ws.join("out.csv");

    concat_cmd()
        .args(["-otype", "json", "-out", out.to_str().unwrap(), "a.csv", "b.csv"])
        .assert()
        .failure()
        .stderr(contains("INVALID_CSV_TYPE"))
        .stderr(contains("json"));
}

#[test]
fn header_mismatch_names_the_offending_file() {
    let ws = TestWorkspace::new();
    let a = ws.write("a.csv", "id,name\n1,Alice\n");
    let b = ws.write("odd.csv", "id,title\n2,Bob\n");
    let out = ws.join("out.csv");

    concat_cmd()
        .args([
            "-ihh",
            "-out",
            out.to_str().unwrap(),
            a.to_str().unwrap(),
            b.to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stderr(contains("CONCAT_INPUT_HEADERS_NO_MATCH"))
        .stderr(contains("odd.csv"));
}

#[test]
fn missing_out_flag_is_a_usage_error() {
    concat_cmd()
        .args(["a.csv", "b.csv"])
        .assert()
        .failure()
        .stderr(contains("--out"));
}

#[test]
fn io_cause_is_logged_at_debug_level() {
    let ws = TestWorkspace::new();
    let a = ws.write("a.csv", "1\n");
    let out = ws.join("out.csv");
    let missing = ws.join("missing.csv");

    Command::cargo_bin("csv-concat")
        .expect("binary exists")
        .env("RUST_LOG", "csv_concat=debug")
        .args([
            "concat",
            "-out",
            out.to_str().unwrap(),
            a.to_str().unwrap(),
            missing.to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stderr(contains("INPUT_OPEN_ERROR"))
        .stderr(contains("Caused by"));
}
