use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::tempdir;

fn super_hooks(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_super-hooks"))
        .args(args)
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run super-hooks")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

const MISSING: &str = "class T(TestCase):\n    def setUp(self):\n        self.value = 42\n";
const CORRECT: &str = "class T(TestCase):\n    def setUp(self):\n        self.value = 42\n        super().setUp()\n";

#[test]
fn clean_tree_exits_zero() {
    let tmp = tempdir().expect("tmpdir");
    fs::write(tmp.path().join("test_ok.py"), CORRECT).expect("write");

    let output = super_hooks(tmp.path(), &["--no-config", "."]);
    assert!(output.status.success());
    assert!(stdout(&output).is_empty());
}

#[test]
fn violations_exit_one_with_diagnostics() {
    let tmp = tempdir().expect("tmpdir");
    fs::write(tmp.path().join("test_a.py"), MISSING).expect("write");

    let output = super_hooks(tmp.path(), &["--no-config", "test_a.py"]);
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(
        stdout(&output),
        "test_a.py:2:5: SUP001 super().setUp() must be the last line of setUp (call is missing)\n"
    );
    assert_eq!(fs::read_to_string(tmp.path().join("test_a.py")).expect("read"), MISSING);
}

#[test]
fn fix_rewrites_and_exits_zero() {
    let tmp = tempdir().expect("tmpdir");
    let path = tmp.path().join("test_a.py");
    fs::write(&path, MISSING).expect("write");

    let output = super_hooks(tmp.path(), &["--no-config", "--fix", "test_a.py"]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(fs::read_to_string(&path).expect("read"), CORRECT);
}

#[test]
fn fix_with_unfixable_casing_exits_one() {
    let tmp = tempdir().expect("tmpdir");
    let path = tmp.path().join("test_a.py");
    fs::write(&path, "class T(TestCase):\n    def setup(self):\n        pass\n").expect("write");

    let output = super_hooks(tmp.path(), &["--no-config", "--fix", "test_a.py"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).contains("SUP003 use correct casing: setUp (found setup)"));
    assert_eq!(
        fs::read_to_string(&path).expect("read"),
        "class T(TestCase):\n    def setup(self):\n        super().setUp()\n"
    );
}

#[test]
fn parse_error_exits_one() {
    let tmp = tempdir().expect("tmpdir");
    fs::write(tmp.path().join("test_bad.py"), "class T(TestCase:\n    pass\n").expect("write");

    let output = super_hooks(tmp.path(), &["--no-config", "test_bad.py"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).starts_with("test_bad.py:"));
    assert!(stdout(&output).contains(": error: parse error"));
}

#[test]
fn config_base_classes_and_excludes() {
    let tmp = tempdir().expect("tmpdir");
    fs::write(
        tmp.path().join("pyproject.toml"),
        "[tool.super-hooks]\nbase-classes = [\"ServiceTest\"]\nexclude = [\"generated\"]\n",
    )
    .expect("write");
    fs::write(
        tmp.path().join("test_service.py"),
        "class T(ServiceTest):\n    def tearDown(self):\n        pass\n",
    )
    .expect("write");
    // TestCase is no longer recognized
    fs::write(tmp.path().join("test_plain.py"), MISSING).expect("write");
    fs::create_dir(tmp.path().join("generated")).expect("mkdir");
    fs::write(
        tmp.path().join("generated").join("test_gen.py"),
        "class G(ServiceTest):\n    def setUp(self):\n        pass\n",
    )
    .expect("write");

    let output = super_hooks(tmp.path(), &["."]);
    assert_eq!(output.status.code(), Some(1));
    let out = stdout(&output);
    assert_eq!(out.lines().count(), 1, "unexpected output: {}", out);
    assert!(out.contains("test_service.py:2:5: SUP001"));
}

#[test]
fn cli_flags_override_config() {
    let tmp = tempdir().expect("tmpdir");
    fs::write(
        tmp.path().join("pyproject.toml"),
        "[tool.super-hooks]\ndisable = [\"SUP001\"]\n",
    )
    .expect("write");
    fs::write(tmp.path().join("test_a.py"), MISSING).expect("write");

    let quiet = super_hooks(tmp.path(), &["test_a.py"]);
    assert!(quiet.status.success());

    let loud = super_hooks(tmp.path(), &["--enable", "ALL", "test_a.py"]);
    assert_eq!(loud.status.code(), Some(1));
}

#[test]
fn json_output() {
    let tmp = tempdir().expect("tmpdir");
    fs::write(tmp.path().join("test_a.py"), MISSING).expect("write");

    let output = super_hooks(
        tmp.path(),
        &["--no-config", "--output-format", "json", "test_a.py"],
    );
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid json");
    assert_eq!(value[0]["code"], "SUP001");
    assert_eq!(value[0]["line"], 2);
}

#[test]
fn run_log_appended() {
    let tmp = tempdir().expect("tmpdir");
    fs::write(tmp.path().join("test_a.py"), MISSING).expect("write");

    super_hooks(tmp.path(), &["--no-config", "--log-file", "runs.jsonl", "test_a.py"]);
    super_hooks(tmp.path(), &["--no-config", "--log-file", "runs.jsonl", "--fix", "test_a.py"]);

    let log = fs::read_to_string(tmp.path().join("runs.jsonl")).expect("log written");
    let entries: Vec<serde_json::Value> = log
        .lines()
        .map(|line| serde_json::from_str(line).expect("json line"))
        .collect();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["mode"], "check");
    assert_eq!(entries[0]["total_violations"], 1);
    assert_eq!(entries[1]["mode"], "fix");
    assert_eq!(entries[1]["fixed_count"], 1);
}

#[test]
fn missing_explicit_config_is_startup_error() {
    let tmp = tempdir().expect("tmpdir");
    let output = super_hooks(tmp.path(), &["--config", "nope.toml", "."]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("failed to load configuration"));
}

#[test]
fn unopenable_log_file_exits_one() {
    let tmp = tempdir().expect("tmpdir");
    fs::write(tmp.path().join("test_ok.py"), CORRECT).expect("write");
    fs::write(tmp.path().join("blocker"), "").expect("write");

    let output = super_hooks(
        tmp.path(),
        &["--no-config", "--log-file", "blocker/runs.jsonl", "test_ok.py"],
    );
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("cannot open log file"));
}
