#![cfg(all(unix, feature = "cli"))]

use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

fn unique_temp_dir(tag: &str) -> PathBuf {
    let dir = PathBuf::from(format!(
        "/tmp/pevent-{tag}-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
    dir
}

fn spawn_listener(sock: &Path, extra: &[&str]) -> Child {
    Command::new(env!("CARGO_BIN_EXE_pevent"))
        .arg("--log-level")
        .arg("error")
        .arg("--format")
        .arg("json")
        .arg("listen")
        .arg(sock)
        .args(extra)
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("listen command should start")
}

fn wait_for_socket(path: &Path, timeout: Duration) {
    let start = Instant::now();
    while !path.exists() {
        if start.elapsed() >= timeout {
            panic!("listener socket did not appear");
        }
        thread::sleep(Duration::from_millis(25));
    }
    // Give bind time to finish applying permissions.
    thread::sleep(Duration::from_millis(50));
}

#[test]
fn file_replay_against_simulated_controller() {
    let dir = unique_temp_dir("listen-file");
    let sock = dir.join("bmc.sock");
    let events = dir.join("events.txt");
    std::fs::write(
        &events,
        "0x04 0x01 0x30 0x01 0x59 0x00 0x00\n0x04\n0x04 0x02 0x60 0x01 0x52 0x00 0x00\n",
    )
    .expect("event file should be writable");

    let listener = spawn_listener(&sock, &["--count", "2"]);
    wait_for_socket(&sock, Duration::from_secs(3));

    let output = Command::new(env!("CARGO_BIN_EXE_pevent"))
        .arg("--log-level")
        .arg("error")
        .arg("--format")
        .arg("json")
        .arg("--socket")
        .arg(&sock)
        .arg("file")
        .arg(&events)
        .output()
        .expect("file command should run");
    assert_eq!(output.status.code(), Some(1), "one line is malformed");

    let listened = listener.wait_with_output().expect("listener should exit");
    assert!(listened.status.success());
    let received: Vec<serde_json::Value> = String::from_utf8_lossy(&listened.stdout)
        .lines()
        .map(|l| serde_json::from_str(l).expect("listener output should be json"))
        .collect();
    assert_eq!(received.len(), 2);
    assert_eq!(received[0]["status"], "received");
    assert_eq!(received[1]["record"]["sensor_num"], 0x60);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn rejected_event_reports_completion_code() {
    let dir = unique_temp_dir("listen-reject");
    let sock = dir.join("bmc.sock");

    let listener = spawn_listener(&sock, &["--count", "1", "--completion-code", "0xc0"]);
    wait_for_socket(&sock, Duration::from_secs(3));

    let output = Command::new(env!("CARGO_BIN_EXE_pevent"))
        .arg("--log-level")
        .arg("error")
        .arg("--socket")
        .arg(&sock)
        .arg("send")
        .arg("2")
        .output()
        .expect("send command should run");
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Node busy"));

    let listened = listener.wait_with_output().expect("listener should exit");
    assert!(String::from_utf8_lossy(&listened.stdout).contains("\"rejected\""));

    let _ = std::fs::remove_dir_all(&dir);
}
