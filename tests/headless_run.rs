use std::path::Path;
use std::process::{Command, Output, Stdio};

fn run_headless(args: &[&str]) -> Output {
    let bin = env!("CARGO_BIN_EXE_minerworks");
    Command::new(bin)
        .args(args)
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .stdin(Stdio::null())
        .output()
        .expect("spawn minerworks")
}

fn read_json_lines(path: &Path) -> Vec<serde_json::Value> {
    std::fs::read_to_string(path)
        .expect("read event log")
        .lines()
        .map(|line| serde_json::from_str(line).expect("parse event line"))
        .collect()
}

#[test]
fn headless_run_writes_events_and_metrics() {
    let dir = tempfile::tempdir().expect("temp dir");
    let events = dir.path().join("logs/events.jsonl");
    let metrics = dir.path().join("logs/metrics.json");

    let output = run_headless(&[
        "--ticks",
        "400",
        "--world-seed",
        "9",
        "--events",
        events.to_str().unwrap(),
        "--metrics",
        metrics.to_str().unwrap(),
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("ores_remaining=0"), "{stdout}");

    let lines = read_json_lines(&events);
    let kinds: Vec<&str> = lines.iter().filter_map(|l| l["kind"].as_str()).collect();
    assert!(kinds.contains(&"BackpackEquipped"));
    assert!(kinds.contains(&"SweepStarted"));
    assert_eq!(kinds.iter().filter(|k| **k == "block_set").count(), 6);
    assert_eq!(kinds.iter().filter(|k| **k == "command").count(), 30);

    let block_ticks: Vec<u64> = lines
        .iter()
        .filter(|l| l["kind"] == "block_set")
        .filter_map(|l| l["tick"].as_u64())
        .collect();
    assert_eq!(block_ticks, vec![10, 80, 150, 220, 290, 360]);

    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&metrics).expect("read metrics"))
            .expect("parse metrics");
    assert_eq!(report["result"], "pass");
    assert_eq!(report["automation"]["companions_spawned"], 1);
    assert_eq!(report["automation"]["companions_hidden"], 1);
    assert_eq!(report["automation"]["companions_reused"], 0);
    assert_eq!(
        report["test_execution"]["events_recorded"].as_u64(),
        Some(lines.len() as u64)
    );
}

#[test]
fn headless_run_is_deterministic_per_seed() {
    let dir = tempfile::tempdir().expect("temp dir");
    let first = dir.path().join("a.jsonl");
    let second = dir.path().join("b.jsonl");
    for path in [&first, &second] {
        let output = run_headless(&["--ticks", "200", "--world-seed", "77", "--events", path.to_str().unwrap()]);
        assert!(output.status.success());
    }
    assert_eq!(
        std::fs::read_to_string(&first).unwrap(),
        std::fs::read_to_string(&second).unwrap()
    );
}

#[test]
fn custom_config_changes_step_interval() {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = dir.path().join("automation.toml");
    std::fs::write(&config, "[ore_radar]\nstep_interval = 10\n").unwrap();
    let events = dir.path().join("events.jsonl");

    let output = run_headless(&[
        "--config",
        config.to_str().unwrap(),
        "--ticks",
        "100",
        "--events",
        events.to_str().unwrap(),
    ]);
    assert!(output.status.success());

    let block_ticks: Vec<u64> = read_json_lines(&events)
        .iter()
        .filter(|l| l["kind"] == "block_set")
        .filter_map(|l| l["tick"].as_u64())
        .collect();
    assert_eq!(block_ticks, vec![10, 20, 30, 40, 50, 60]);
}
