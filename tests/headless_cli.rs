use std::path::{Path, PathBuf};
use std::process::Command;

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("voxelwalk-cli-{name}-{}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("create scratch dir");
    dir
}

fn write_small_config(dir: &Path) -> PathBuf {
    let path = dir.join("voxelwalk.toml");
    std::fs::write(
        &path,
        "[world]\nworld_size = 2\nchunk_size = 8\nworld_depth = 16\nrender_distance = 8.0\nseed = 3\n",
    )
    .expect("write config");
    path
}

fn run_binary(args: &[&str]) -> String {
    let output = Command::new(env!("CARGO_BIN_EXE_voxelwalk"))
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .expect("spawn voxelwalk");
    assert!(
        output.status.success(),
        "voxelwalk failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).expect("utf8 stdout")
}

#[test]
fn headless_run_writes_one_trace_line_per_tick() {
    let dir = scratch_dir("trace");
    let config = write_small_config(&dir);
    let trace = dir.join("trace.jsonl");

    let stdout = run_binary(&[
        "--config",
        config.to_str().unwrap(),
        "--ticks",
        "25",
        "--trace",
        trace.to_str().unwrap(),
    ]);
    assert!(stdout.contains("ticks=25"), "unexpected summary: {stdout}");

    let contents = std::fs::read_to_string(&trace).expect("trace written");
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 25);
    let last: serde_json::Value = serde_json::from_str(lines[24]).expect("json line");
    assert_eq!(last["tick"], 25);
    assert_eq!(last["kind"], "tick");
    assert!(last["payload"]["player"]["position"].is_array());
}

#[test]
fn identical_runs_produce_identical_traces() {
    let dir = scratch_dir("determinism");
    let config = write_small_config(&dir);
    let script = dir.join("script.json");
    std::fs::write(
        &script,
        r#"{"steps": [{"ticks": 10, "forward": true}, {"ticks": 10, "jump": true, "look_x": 0.05}]}"#,
    )
    .expect("write script");

    let mut traces = Vec::new();
    for run in 0..2 {
        let trace = dir.join(format!("trace-{run}.jsonl"));
        run_binary(&[
            "--config",
            config.to_str().unwrap(),
            "--script",
            script.to_str().unwrap(),
            "--exit-when-script-finished",
            "--ticks",
            "100",
            "--trace",
            trace.to_str().unwrap(),
        ]);
        traces.push(std::fs::read_to_string(&trace).expect("trace written"));
    }
    assert_eq!(traces[0], traces[1]);
    assert_eq!(traces[0].lines().count(), 20);
}

#[test]
fn write_default_config_round_trips() {
    let dir = scratch_dir("default-config");
    let config = dir.join("written.toml");
    run_binary(&["--config", config.to_str().unwrap(), "--write-default-config"]);

    let contents = std::fs::read_to_string(&config).expect("config written");
    assert!(contents.contains("[world]"));
    assert!(contents.contains("[player]"));

    let stdout = run_binary(&["--config", config.to_str().unwrap(), "--ticks", "1"]);
    assert!(stdout.contains("ticks=1"));
}
