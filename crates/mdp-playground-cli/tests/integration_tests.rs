use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

fn config_file(json: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(json.as_bytes()).unwrap();
    file
}

const DISCRETE: &str = r#"{
    "seed": 42,
    "state_space_size": 10,
    "action_space_size": 3,
    "delay": 2,
    "horizon": 20
}"#;

#[test]
fn test_cli_help() {
    let mut cmd = Command::cargo_bin("mdpp").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("MDP Playground"));
}

#[test]
fn test_cli_run_random() {
    let file = config_file(DISCRETE);
    let mut cmd = Command::cargo_bin("mdpp").unwrap();
    cmd.arg("run")
        .arg("--config")
        .arg(file.path())
        .arg("--episodes")
        .arg("2")
        .assert()
        .success()
        .stdout(predicate::str::contains("Starting run"))
        .stdout(predicate::str::contains("Episodes: 2"));
}

#[test]
fn test_cli_run_logs_episodes_unless_quiet() {
    let file = config_file(DISCRETE);
    Command::cargo_bin("mdpp")
        .unwrap()
        .args(["run", "--episodes", "2", "--config"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Episode 1: episode_length=20"));

    Command::cargo_bin("mdpp")
        .unwrap()
        .args(["run", "--episodes", "2", "--quiet", "--config"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Episode 1:").not())
        .stdout(predicate::str::contains("Episodes: 2"));
}

#[test]
fn test_cli_run_constant_is_reproducible() {
    let file = config_file(DISCRETE);
    let run = || {
        let output = Command::cargo_bin("mdpp")
            .unwrap()
            .args(["run", "--policy", "constant", "--action", "1", "--config"])
            .arg(file.path())
            .output()
            .unwrap();
        assert!(output.status.success());
        let stdout = String::from_utf8(output.stdout).unwrap();
        stdout
            .lines()
            .find(|line| line.starts_with("Episodes:"))
            .map(str::to_string)
            .unwrap()
    };
    assert_eq!(run(), run());
}

#[test]
fn test_cli_run_rejects_out_of_range_constant() {
    let file = config_file(DISCRETE);
    let mut cmd = Command::cargo_bin("mdpp").unwrap();
    cmd.args(["run", "--policy", "constant", "--action", "3", "--config"])
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("outside"));
}

#[test]
fn test_cli_run_continuous() {
    let file = config_file(
        r#"{
            "state_space_type": "continuous",
            "seed": 3,
            "state_space_dim": 2,
            "time_unit": 0.1,
            "horizon": 15
        }"#,
    );
    let mut cmd = Command::cargo_bin("mdpp").unwrap();
    cmd.arg("run")
        .arg("--config")
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Episodes: 1"));
}

#[test]
fn test_cli_describe() {
    let file = config_file(DISCRETE);
    let mut cmd = Command::cargo_bin("mdpp").unwrap();
    cmd.arg("describe")
        .arg("--config")
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Discrete toy MDP"))
        .stdout(predicate::str::contains("delay 2"));
}

#[test]
fn test_cli_describe_rejects_mixed_config() {
    let file = config_file(r#"{ "seed": 1, "time_unit": 0.5 }"#);
    let mut cmd = Command::cargo_bin("mdpp").unwrap();
    cmd.arg("describe")
        .arg("--config")
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("time_unit"));
}

#[test]
fn test_cli_defaults() {
    let mut cmd = Command::cargo_bin("mdpp").unwrap();
    cmd.arg("defaults")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"horizon\": 100"));

    let mut cmd = Command::cargo_bin("mdpp").unwrap();
    cmd.args(["defaults", "--continuous"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"state_space_type\": \"continuous\""));
}
