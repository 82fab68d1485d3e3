use std::{
    env,
    fs,
    path::PathBuf,
    process::{Command, Output},
};

fn norm_newlines(s: &str) -> String {
    s.replace("\r\n", "\n").replace('\r', "")
}

fn temp_store(name: &str) -> PathBuf {
    let path = env::temp_dir().join(format!(
        "posestrike_cli_{}_{}.json",
        name,
        std::process::id()
    ));
    let _ = fs::remove_file(&path);
    path
}

fn run(store: &PathBuf, args: &[&str]) -> Output {
    let exe = env!("CARGO_BIN_EXE_posestrike");
    Command::new(exe)
        .arg("--store")
        .arg(store)
        .args(["--log-level", "error"])
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    norm_newlines(&String::from_utf8_lossy(&output.stdout))
}

fn stderr(output: &Output) -> String {
    norm_newlines(&String::from_utf8_lossy(&output.stderr))
}

const ARMS_DOWN: &str = r#"[
  {"id": 11, "x": 100.0, "y": 100.0}, {"id": 12, "x": 200.0, "y": 100.0},
  {"id": 13, "x": 80.0, "y": 150.0}, {"id": 14, "x": 220.0, "y": 150.0},
  {"id": 15, "x": 80.0, "y": 200.0}, {"id": 16, "x": 220.0, "y": 200.0},
  {"id": 23, "x": 120.0, "y": 250.0}, {"id": 24, "x": 180.0, "y": 250.0}
]"#;

const ARMS_OUT: &str = r#"[
  {"id": 11, "x": 100.0, "y": 100.0}, {"id": 12, "x": 200.0, "y": 100.0},
  {"id": 13, "x": 80.0, "y": 150.0}, {"id": 14, "x": 220.0, "y": 150.0},
  {"id": 15, "x": 30.0, "y": 150.0}, {"id": 16, "x": 270.0, "y": 150.0},
  {"id": 23, "x": 120.0, "y": 250.0}, {"id": 24, "x": 180.0, "y": 250.0}
]"#;

fn write_script(name: &str) -> PathBuf {
    let path = env::temp_dir().join(format!(
        "posestrike_cli_script_{}_{}.json",
        name,
        std::process::id()
    ));
    let script = format!(
        r#"{{
  "config": {{"sample_attempts": 2}},
  "references": [
    {{"image": "star", "landmarks": {down}}},
    {{"image": "tee", "landmarks": {out}}}
  ],
  "frames": [
    {{"at": 0.0, "landmarks": {down}}},
    {{"at": 1.0, "landmarks": {out}}},
    {{"at": 7.0}},
    {{"at": 8.0, "landmarks": [{{"id": 11, "x": 1.0, "y": 1.0}}]}}
  ]
}}"#,
        down = ARMS_DOWN,
        out = ARMS_OUT
    );
    fs::write(&path, script).unwrap();
    path
}

#[test]
fn add_then_show_player() {
    let store = temp_store("add_show");

    let output = run(&store, &["add", "Ann", "A"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).contains("added Ann (A) with 2 attempts"));

    let output = run(&store, &["show", "Ann", "A"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "Ann (A): score 0, attempts left 2\n");

    let _ = fs::remove_file(&store);
}

#[test]
fn duplicate_player_is_rejected() {
    let store = temp_store("duplicate");

    assert!(run(&store, &["add", "Ann", "A"]).status.success());
    let output = run(&store, &["add", "Ann", "A"]);

    assert!(!output.status.success());
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Error: player Ann (A) already exists"));

    let _ = fs::remove_file(&store);
}

#[test]
fn rank_of_unknown_player_fails() {
    let store = temp_store("rank_unknown");

    let output = run(&store, &["rank", "Nobody", "Z"]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("player Nobody (Z) is not on the leaderboard"));
}

#[test]
fn top_on_empty_store() {
    let store = temp_store("top_empty");

    let output = run(&store, &["top"]);

    assert!(output.status.success());
    assert_eq!(stdout(&output), "Leaderboard is empty.\n");
}

#[test]
fn simulate_prints_match_timeline() {
    let store = temp_store("simulate");
    let script = write_script("timeline");

    let output = run(&store, &["simulate", script.to_str().unwrap()]);
    assert!(output.status.success(), "{}", stderr(&output));

    let out = stdout(&output);
    assert!(out.starts_with("Simulation Start (4 steps)"));
    assert!(out.contains("  0.00 | reference #0 star\n"));
    assert!(out.contains("  0.00 | score 1\n"));
    assert!(out.contains("  0.00 | reference #1 tee\n"));
    assert!(out.contains("  1.00 | score 3\n"));
    assert!(out.contains("  1.00 | combo x2\n"));
    assert!(out.contains("  7.00 | combo x1\n"));
    assert!(out.contains("  8.00 | incomplete pose, frame skipped\n"));
    assert!(out.ends_with("Final score 3\n"));

    // Without a player nothing is written.
    assert!(!store.exists());

    let _ = fs::remove_file(&script);
}

#[test]
fn simulate_credits_player_and_updates_leaderboard() {
    let store = temp_store("simulate_player");
    let script = write_script("player");

    let output = run(
        &store,
        &["simulate", script.to_str().unwrap(), "--player", "Zoë", "--group", "x:y"],
    );
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).contains("Zoë (x:y): best 3, rank #1, attempts left 1 - You Did It!"));

    let output = run(&store, &["rank", "Zoë", "x:y"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "Zoë (x:y) is ranked #1 with 3\n");

    let output = run(&store, &["top", "--limit", "1"]);
    assert_eq!(stdout(&output), "  1. Zoë (x:y)  3\n");

    let _ = fs::remove_file(&store);
    let _ = fs::remove_file(&script);
}

#[test]
fn simulate_logs_to_stderr_only() {
    let store = temp_store("simulate_logs");
    let script = write_script("logs");

    let output = Command::new(env!("CARGO_BIN_EXE_posestrike"))
        .arg("--store")
        .arg(&store)
        .args(["--log-level", "info", "simulate"])
        .arg(&script)
        .env_remove("RUST_LOG")
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", stderr(&output));

    assert!(stderr(&output).contains("simulation started"));
    assert!(!stdout(&output).contains("simulation started"));
    assert!(stdout(&output).ends_with("Final score 3\n"));

    let _ = fs::remove_file(&script);
}
