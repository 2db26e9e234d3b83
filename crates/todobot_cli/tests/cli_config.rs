use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_path(file_name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("todobot-{nanos}-{file_name}"))
}

fn run_with_config_env(config_path: &PathBuf, args: &[&str], input: &str) -> std::process::Output {
    let exe = env!("CARGO_BIN_EXE_todobot");
    let mut child = Command::new(exe)
        .args(args)
        .env("TODOBOT_CONFIG_PATH", config_path)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn todobot");

    {
        let stdin = child.stdin.as_mut().expect("stdin");
        stdin
            .write_all(input.as_bytes())
            .expect("failed to write to stdin");
    }

    child.wait_with_output().expect("failed to read output")
}

#[test]
fn config_file_sets_prefix() {
    let path = temp_path("prefix-config.json");
    let content = serde_json::json!({ "command_prefix": "/todo" });
    std::fs::write(&path, serde_json::to_string(&content).unwrap()).unwrap();

    let output = run_with_config_env(&path, &[], "/todo add milk\n");
    std::fs::remove_file(&path).ok();

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "TODO added: milk");
}

#[test]
fn invalid_default_config_falls_back() {
    let path = temp_path("broken-config.json");
    std::fs::write(&path, "{ not json").unwrap();

    let output = run_with_config_env(&path, &[], "!todo add milk\n");
    std::fs::remove_file(&path).ok();

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "TODO added: milk");
}

#[test]
fn invalid_explicit_config_is_fatal() {
    let path = temp_path("explicit-broken-config.json");
    std::fs::write(&path, "{ not json").unwrap();
    let missing = temp_path("unused-config.json");

    let output = run_with_config_env(
        &missing,
        &["--config", path.to_str().unwrap()],
        "!todo add milk\n",
    );
    std::fs::remove_file(&path).ok();

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_data"));
}

#[test]
fn bad_override_is_fatal() {
    let missing = temp_path("unused-config.json");
    let output = run_with_config_env(&missing, &["--config-override", "theme=dark"], "");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_input - unknown config field 'theme'"));
}

#[test]
fn bad_utc_offset_is_fatal() {
    let missing = temp_path("unused-config.json");
    let output = run_with_config_env(
        &missing,
        &["--config-override", "utc_offset=two hours"],
        "",
    );

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_data"));
}
