use assert_cmd::Command;
use predicates::prelude::*;

const LOG: &str = "\
 Scenario simple_spread Algo rmappo Exp check updates 0/200 episodes, total num timesteps 400/80000, FPS 790.

average episode rewards is -61.73
policy entropy is 1.6093
eval average episode rewards of agent: -58.10
 Scenario simple_spread Algo rmappo Exp check updates 5/200 episodes, total num timesteps 2400/80000, FPS 802.

average episode rewards is -52.40
policy entropy is 1.5512
";

#[test]
fn test_cli_help() {
    let mut cmd = Command::cargo_bin("mpe").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("MPE - Cooperative navigation reward regimes"));
}

#[test]
fn test_cli_list() {
    let mut cmd = Command::cargo_bin("mpe").unwrap();
    cmd.arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Available reward modes:"))
        .stdout(predicate::str::contains("partially_shared"));
}

#[test]
fn test_cli_eval() {
    let mut cmd = Command::cargo_bin("mpe").unwrap();
    cmd.arg("eval")
        .arg("--reward-type")
        .arg("shared")
        .arg("--episodes")
        .arg("1") // Run just 1 episode for speed
        .assert()
        .success()
        .stdout(predicate::str::contains("Starting evaluation"))
        .stdout(predicate::str::contains("[shared] Step 0"));
}

#[test]
fn test_cli_eval_writes_metrics() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("metrics.jsonl");

    let mut cmd = Command::cargo_bin("mpe").unwrap();
    cmd.arg("eval")
        .arg("--reward-type")
        .arg("partially_shared")
        .arg("--episodes")
        .arg("2")
        .arg("--episode-length")
        .arg("5")
        .arg("--metrics-out")
        .arg(&out)
        .assert()
        .success();

    let text = std::fs::read_to_string(&out).unwrap();
    let lines: Vec<serde_json::Value> = text
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[1]["step"], 1);
    assert_eq!(lines[0]["metrics"]["episode_length"], 5.0);
}

#[test]
fn test_cli_unknown_reward_type() {
    let mut cmd = Command::cargo_bin("mpe").unwrap();
    cmd.arg("eval")
        .arg("--reward-type")
        .arg("greedy")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown reward_type: greedy"));
}

#[test]
fn test_cli_demo() {
    let mut cmd = Command::cargo_bin("mpe").unwrap();
    cmd.arg("demo")
        .arg("--steps")
        .arg("3")
        .arg("--reward-type")
        .arg("original")
        .assert()
        .success()
        .stdout(predicate::str::contains("mode: original"))
        .stdout(predicate::str::contains("team="));
}

#[test]
fn test_cli_plot_log() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("train.log");
    std::fs::write(&log, LOG).unwrap();
    let out_dir = dir.path().join("charts");

    let mut cmd = Command::cargo_bin("mpe").unwrap();
    cmd.arg("plot-log")
        .arg("--log-file")
        .arg(&log)
        .arg("--reward-type")
        .arg("shared")
        .arg("--out-dir")
        .arg(&out_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("shared.png"));

    assert!(out_dir.join("shared.png").exists());
}

#[test]
fn test_cli_plot_log_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut cmd = Command::cargo_bin("mpe").unwrap();
    cmd.arg("plot-log")
        .arg("--log-file")
        .arg(dir.path().join("absent.log"))
        .arg("--reward-type")
        .arg("shared")
        .assert()
        .failure();
}
