use assert_cmd::Command;
use predicates::boolean::PredicateBooleanExt;
use predicates::str::contains;
use std::process::{Command as StdCommand, Stdio};
use std::{fs, thread, time::Duration};
use tempfile::tempdir;

fn stlog() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("stlog"))
}

fn run(args: &[&str]) -> std::process::Output {
    let mut cmd = stlog();
    cmd.args(args);
    cmd.output().expect("failed to run stlog")
}

/// Payloads of output lines carrying the given stream tag, in order.
fn tagged_lines(stdout: &str, tag: u32) -> Vec<String> {
    stdout
        .lines()
        .filter_map(|line| {
            let rest = line.strip_prefix(&format!("[{},", tag))?;
            let (_, payload) = rest.split_once("] ")?;
            Some(payload.to_string())
        })
        .collect()
}

/// Timestamps of output lines carrying the given stream tag, in order,
/// as (seconds, nanoseconds) pairs.
fn tagged_stamps(stdout: &str, tag: u32) -> Vec<(u64, u64)> {
    stdout
        .lines()
        .filter_map(|line| {
            let rest = line.strip_prefix(&format!("[{},", tag))?;
            let (stamp, _) = rest.split_once("] ")?;
            let (secs, nanos) = stamp.split_once('.')?;
            assert_eq!(nanos.len(), 9, "timestamp must have 9 decimal places");
            Some((secs.parse().unwrap(), nanos.parse().unwrap()))
        })
        .collect()
}

#[test]
fn test_banners_and_zero_exit() {
    let mut cmd = stlog();
    cmd.arg("true");
    cmd.assert()
        .success()
        .stdout(contains(":exec:'true'").and(contains(":rc:0")));
}

#[test]
fn test_forwards_child_exit_code() {
    for code in [1, 42] {
        let mut cmd = stlog();
        cmd.args(["sh", "-c", &format!("exit {code}")]);
        cmd.assert()
            .failure()
            .code(code)
            .stdout(contains(format!(":rc:{code}")));
    }
}

#[test]
fn test_tags_streams_in_arrival_order() {
    let output = run(&["sh", "-c", "echo out1; sleep 1; echo err1 >&2"]);
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(tagged_lines(&stdout, 1), vec!["out1"]);
    assert_eq!(tagged_lines(&stdout, 2), vec!["err1"]);

    // out1 arrived a second before err1 and must be printed first.
    // (The exec banner also mentions the script, so match tagged
    // payloads, not bare words.)
    let out_pos = stdout.find("] out1").unwrap();
    let err_pos = stdout.find("] err1").unwrap();
    assert!(out_pos < err_pos);

    // Banners frame the stream.
    let exec_pos = stdout.find(":exec:").unwrap();
    let rc_pos = stdout.find(":rc:0").unwrap();
    assert!(exec_pos < out_pos);
    assert!(err_pos < rc_pos);
}

#[test]
fn test_delivers_every_line_exactly_once_in_stream_order() {
    let script = "for i in 0 1 2 3 4 5 6 7 8 9; do echo o$i; echo e$i >&2; done";
    let output = run(&["sh", "-c", script]);
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();

    let expected_out: Vec<String> = (0..10).map(|i| format!("o{i}")).collect();
    let expected_err: Vec<String> = (0..10).map(|i| format!("e{i}")).collect();

    // Per-stream program order is preserved and nothing is duplicated
    // or lost, regardless of how the two streams interleave.
    assert_eq!(tagged_lines(&stdout, 1), expected_out);
    assert_eq!(tagged_lines(&stdout, 2), expected_err);
}

#[test]
fn test_timestamps_non_decreasing_within_stream() {
    let output = run(&["sh", "-c", "echo a; echo b; echo c; echo d"]);
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let stamps = tagged_stamps(&stdout, 1);
    assert_eq!(stamps.len(), 4);
    for pair in stamps.windows(2) {
        assert!(pair[0] <= pair[1]);
    }
}

#[test]
fn test_tee_file_matches_stdout() {
    let temp = tempdir().expect("failed to create tempdir");
    let log_path = temp.path().join("run.log");
    let log_arg = log_path.to_str().unwrap();

    let output = run(&["-t", log_arg, "sh", "-c", "echo out; echo err >&2"]);
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains(":log:'"));

    // The file receives the identical byte sequence.
    let logged = fs::read_to_string(&log_path).unwrap();
    assert_eq!(logged, stdout);
}

#[test]
fn test_append_keeps_previous_content() {
    let temp = tempdir().expect("failed to create tempdir");
    let log_path = temp.path().join("run.log");
    let log_arg = log_path.to_str().unwrap();

    run(&["-t", log_arg, "-a", "true"]);
    run(&["-t", log_arg, "-a", "true"]);

    let logged = fs::read_to_string(&log_path).unwrap();
    assert_eq!(logged.matches(":exec:").count(), 2);
}

#[test]
fn test_truncates_by_default() {
    let temp = tempdir().expect("failed to create tempdir");
    let log_path = temp.path().join("run.log");
    let log_arg = log_path.to_str().unwrap();

    run(&["-t", log_arg, "true"]);
    run(&["-t", log_arg, "true"]);

    let logged = fs::read_to_string(&log_path).unwrap();
    assert_eq!(logged.matches(":exec:").count(), 1);
}

#[test]
fn test_delivers_final_partial_line() {
    let output = run(&["sh", "-c", "printf 'no newline'"]);
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("] no newline"));
    assert!(stdout.contains(":rc:0"));
}

#[test]
fn test_spawn_failure_reports_error_without_rc_banner() {
    let mut cmd = stlog();
    cmd.arg("/nonexistent/definitely-not-a-command");
    cmd.assert()
        .failure()
        .code(126)
        .stderr(contains("can't execute command"))
        .stdout(contains(":rc:").not());
}

#[test]
fn test_unopenable_tee_file_is_fatal_before_spawn() {
    let temp = tempdir().expect("failed to create tempdir");
    let log_path = temp.path().join("no-such-dir").join("run.log");

    let mut cmd = stlog();
    cmd.args(["-t", log_path.to_str().unwrap(), "true"]);
    cmd.assert()
        .failure()
        .code(1)
        .stderr(contains("can't open output file"))
        .stdout(contains(":exec:").not());
}

#[test]
fn test_missing_command_is_usage_error() {
    let mut cmd = stlog();
    cmd.assert().failure().code(2).stderr(contains("Usage"));
}

#[test]
fn test_child_flags_are_not_consumed() {
    // "-n" belongs to echo, not to the wrapper.
    let output = run(&["echo", "-n", "hello"]);
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("] hello"));
    assert!(stdout.contains(":exec:'echo -n hello'"));
}

#[test]
fn test_interrupt_exits_with_128_plus_signum() {
    let mut child = StdCommand::new(assert_cmd::cargo::cargo_bin!("stlog"))
        .args(["sleep", "5"])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .expect("failed to spawn stlog");

    // Give the wrapper time to install its signal handling.
    thread::sleep(Duration::from_millis(500));

    unsafe {
        libc::kill(child.id() as i32, libc::SIGINT);
    }

    let status = child.wait().unwrap();
    assert_eq!(status.code(), Some(128 + libc::SIGINT));
}
