use std::io::Write;
use std::process::{Command, Output, Stdio};

fn jsonline() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_jsonline"));
    cmd.env_remove("RUST_LOG");
    cmd
}

fn with_stdin(cmd: Command, input: &str) -> Output {
    with_stdin_bytes(cmd, input.as_bytes())
}

fn with_stdin_bytes(mut cmd: Command, input: &[u8]) -> Output {
    let mut child = cmd
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn jsonline");
    child
        .stdin
        .take()
        .expect("stdin")
        .write_all(input)
        .expect("write stdin");
    child.wait_with_output().expect("wait")
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).into_owned()
}

#[test]
fn extract_from_stdin_prints_last_json_line() {
    let mut cmd = jsonline();
    cmd.arg("extract");
    let out = with_stdin(cmd, "info: warmup\n{\"schema_version\":1,\"code\":\"E001\"}\n");
    assert!(out.status.success(), "{out:?}");
    assert_eq!(stdout(&out), "{\"schema_version\":1,\"code\":\"E001\"}\n");
}

#[test]
fn extract_exits_1_when_absent() {
    let mut cmd = jsonline();
    cmd.arg("extract");
    let out = with_stdin(cmd, "plain text output");
    assert_eq!(out.status.code(), Some(1));
    assert!(out.stdout.is_empty());
}

#[test]
fn extract_tolerates_non_utf8_log_lines() {
    let mut cmd = jsonline();
    cmd.arg("extract");
    let out = with_stdin_bytes(cmd, b"progress \xff\xfe\n{\"ok\":true}\n");
    assert!(out.status.success(), "{out:?}");
    assert_eq!(stdout(&out), "{\"ok\":true}\n");

    let dir = tempfile::tempdir().expect("tempdir");
    let p = dir.path().join("out.log");
    std::fs::write(&p, b"\xc3\x28 bad byte\n{\"code\":\"E002\"}").expect("write");
    let out = jsonline().arg("extract").arg(&p).output().expect("run");
    assert!(out.status.success(), "{out:?}");
    assert_eq!(stdout(&out), "{\"code\":\"E002\"}\n");
}

#[test]
fn extract_from_file_with_pretty() {
    let dir = tempfile::tempdir().expect("tempdir");
    let p = dir.path().join("out.log");
    std::fs::write(&p, "recpart plan\n{\"ok\":true}\n").expect("write");

    let out = jsonline()
        .args(["extract", "--pretty"])
        .arg(&p)
        .output()
        .expect("run");
    assert!(out.status.success(), "{out:?}");
    assert_eq!(stdout(&out), "{\n  \"ok\": true\n}\n");
}

#[test]
fn extract_pretty_on_heuristic_only_match_fails() {
    let mut cmd = jsonline();
    cmd.args(["extract", "--pretty"]);
    let out = with_stdin(cmd, "log\n{not json");
    assert_eq!(out.status.code(), Some(2));
}

#[test]
fn extract_missing_file_fails() {
    let out = jsonline()
        .args(["extract", "/definitely/not/here.log"])
        .output()
        .expect("run");
    assert_eq!(out.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&out.stderr).contains("read /definitely/not/here.log"));
}

#[test]
fn run_captures_command_output() {
    let out = jsonline()
        .args([
            "run",
            "--",
            "sh",
            "-c",
            "echo starting; echo '{\"code\":\"E004\"}' >&2; exit 4",
        ])
        .output()
        .expect("run");
    assert!(out.status.success(), "{out:?}");
    assert_eq!(stdout(&out), "{\"code\":\"E004\"}\n");
}

#[test]
fn run_uses_preset_from_config() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(
        dir.path().join("jsonline.toml"),
        r#"
[commands.hello]
program = "sh"
args = ["-c", "echo hi; echo '{\"hello\":\"world\"}'"]
"#,
    )
    .expect("write");

    let out = jsonline()
        .args(["run", "--preset", "hello", "--root"])
        .arg(dir.path())
        .output()
        .expect("run");
    assert!(out.status.success(), "{out:?}");
    assert_eq!(stdout(&out), "{\"hello\":\"world\"}\n");
}

#[test]
fn run_unknown_preset_fails() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("jsonline.toml"), "").expect("write");
    let out = jsonline()
        .args(["run", "--preset", "nope", "--root"])
        .arg(dir.path())
        .output()
        .expect("run");
    assert_eq!(out.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&out.stderr).contains("no preset named `nope`"));
}

#[test]
fn run_times_out() {
    let out = jsonline()
        .args(["run", "--timeout-ms", "100", "--", "sleep", "5"])
        .output()
        .expect("run");
    assert_eq!(out.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&out.stderr).contains("did not finish within 100ms"));
}

#[test]
fn run_without_command_fails() {
    let out = jsonline().arg("run").output().expect("run");
    assert_eq!(out.status.code(), Some(2));
}

#[test]
fn paths_reports_existing_core_manifest() {
    let out = jsonline().arg("paths").output().expect("run");
    assert!(out.status.success(), "{out:?}");

    let v: serde_json::Value = serde_json::from_str(stdout(&out).trim()).expect("json line");
    assert_eq!(v["component"], "jsonline-core");
    assert_eq!(v["manifest_exists"], true);
    let root = v["root"].as_str().expect("root");
    assert!(root.ends_with("jsonline-core"), "{root}");
}

#[test]
fn closed_stdout_is_not_a_crash() {
    let mut child = jsonline()
        .arg("paths")
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn jsonline");
    drop(child.stdout.take());
    let out = child.wait_with_output().expect("wait");
    assert_eq!(out.status.code(), Some(0), "{out:?}");
    assert!(!String::from_utf8_lossy(&out.stderr).contains("panicked"), "{out:?}");
}
