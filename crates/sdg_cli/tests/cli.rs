//! End-to-end runs of the `sdg` binary against the compiled-in `Widget`/
//! `Order` demo schema, covering spec.md §8's scenario 1 (clustered value
//! boundaries), scenario 2 (clustered reference `InvalidRecord` skipping),
//! and the two-node partition split.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Widget cardinality 1000, Order cardinality 10000 (10 slots per widget, 7
/// valid each) — small enough to assert on exact line counts and content.
fn write_config(dir: &Path, extra: &str) -> PathBuf {
    let out = dir.join("out");
    let text = format!(
        "application.scaling-factor = 1.0\n\
         application.node-id = 0\n\
         application.node-count = 1\n\
         application.output-base = {}\n\
         application.output-type = file\n\
         application.job-id = job1\n\
         application.config-dir = {}\n\
         common.master.seed = 1,2,3,4,5,6\n\
         partitioning.Widget.cardinality = 1000\n\
         partitioning.Order.cardinality = 10000\n\
         {extra}",
        out.display(),
        dir.display(),
    );
    let path = dir.join("sdg.properties");
    fs::write(&path, text).unwrap();
    path
}

fn widget_tbl(dir: &Path) -> PathBuf {
    dir.join("out").join("job1").join("node000").join("Widget.tbl")
}

fn order_tbl(dir: &Path) -> PathBuf {
    dir.join("out").join("job1").join("node000").join("Order.tbl")
}

#[test]
fn full_run_produces_both_tables_with_expected_line_counts() {
    let dir = TempDir::new().unwrap();
    write_config(dir.path(), "");

    Command::cargo_bin("sdg")
        .unwrap()
        .arg("-c")
        .arg(dir.path())
        .assert()
        .success();

    let widgets = fs::read_to_string(widget_tbl(dir.path())).unwrap();
    assert_eq!(widgets.lines().count(), 1000);

    // 10000 / 10 slots per widget = 1000 periods, 7 valid slots each.
    let orders = fs::read_to_string(order_tbl(dir.path())).unwrap();
    assert_eq!(orders.lines().count(), 7000);
}

#[test]
fn scenario_one_tier_boundaries_match_the_clustered_partition() {
    let dir = TempDir::new().unwrap();
    write_config(dir.path(), "");

    Command::cargo_bin("sdg").unwrap().arg("-c").arg(dir.path()).assert().success();

    let widgets = fs::read_to_string(widget_tbl(dir.path())).unwrap();
    let lines: Vec<&str> = widgets.lines().collect();
    assert_eq!(lines[0], "0\tlow");
    assert_eq!(lines[332], "332\tlow");
    assert_eq!(lines[333], "333\tmid");
    assert_eq!(lines[665], "665\tmid");
    assert_eq!(lines[666], "666\thigh");
    assert_eq!(lines[999], "999\thigh");
}

#[test]
fn scenario_two_order_rows_skip_the_invalid_tail_of_each_block() {
    let dir = TempDir::new().unwrap();
    write_config(dir.path(), "");

    Command::cargo_bin("sdg").unwrap().arg("-c").arg(dir.path()).assert().success();

    let orders = fs::read_to_string(order_tbl(dir.path())).unwrap();
    let first_block: Vec<&str> = orders.lines().take(7).collect();
    // gen_ids 0..=6 are the valid slots of parent widget 0; 7, 8, 9 are the
    // dead tail and never appear.
    for (i, line) in first_block.iter().enumerate() {
        let mut fields = line.split('\t');
        let gen_id: u64 = fields.next().unwrap().parse().unwrap();
        let parent: u64 = fields.next().unwrap().parse().unwrap();
        let slot: u64 = fields.next().unwrap().parse().unwrap();
        assert_eq!(gen_id, i as u64);
        assert_eq!(parent, 0);
        assert_eq!(slot, i as u64);
    }
    // The 8th line jumps straight to the next block (gen_id 10, parent 1).
    let eighth = orders.lines().nth(7).unwrap();
    assert!(eighth.starts_with("10\t1\t"));
}

#[test]
fn stage_selection_runs_only_the_named_record_type() {
    let dir = TempDir::new().unwrap();
    write_config(dir.path(), "");

    Command::cargo_bin("sdg")
        .unwrap()
        .args(["-c", dir.path().to_str().unwrap(), "-x", "Widget"])
        .assert()
        .success();

    assert!(widget_tbl(dir.path()).exists());
    assert!(!order_tbl(dir.path()).exists());
}

#[test]
fn unknown_stage_name_fails_without_running_anything() {
    let dir = TempDir::new().unwrap();
    write_config(dir.path(), "");

    Command::cargo_bin("sdg")
        .unwrap()
        .args(["-c", dir.path().to_str().unwrap(), "-x", "Nonexistent"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Nonexistent"));

    assert!(!widget_tbl(dir.path()).exists());
}

#[test]
fn missing_config_directory_fails_fast() {
    Command::cargo_bin("sdg")
        .unwrap()
        .args(["-c", "/no/such/directory"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("config directory not found"));
}

#[test]
fn scaling_override_flag_beats_the_properties_file() {
    let dir = TempDir::new().unwrap();
    // Linear partitioning so `-s` actually changes the resolved cardinality;
    // base 500 * scaling 2.0 = 1000, same tier boundaries as the fixed case.
    let out = dir.path().join("out");
    let text = format!(
        "application.scaling-factor = 1.0\n\
         application.node-id = 0\n\
         application.node-count = 1\n\
         application.output-base = {}\n\
         application.output-type = file\n\
         application.job-id = job1\n\
         application.config-dir = {}\n\
         common.master.seed = 1,2,3,4,5,6\n\
         partitioning.Widget.base-cardinality = 500\n\
         partitioning.Order.cardinality = 10000\n",
        out.display(),
        dir.path().display(),
    );
    fs::write(dir.path().join("sdg.properties"), text).unwrap();

    Command::cargo_bin("sdg")
        .unwrap()
        .args(["-c", dir.path().to_str().unwrap(), "-s", "2.0", "-x", "Widget"])
        .assert()
        .success();

    let widgets = fs::read_to_string(widget_tbl(dir.path())).unwrap();
    assert_eq!(widgets.lines().count(), 1000);
}

#[test]
fn two_node_partition_of_a_linear_type_is_contiguous_and_covers_every_position() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("out");
    let text = format!(
        "application.scaling-factor = 1.0\n\
         application.node-id = 0\n\
         application.node-count = 2\n\
         application.output-base = {}\n\
         application.output-type = file\n\
         application.job-id = job1\n\
         application.config-dir = {}\n\
         common.master.seed = 1,2,3,4,5,6\n\
         partitioning.Widget.base-cardinality = 1000\n\
         partitioning.Order.cardinality = 10000\n",
        out.display(),
        dir.path().display(),
    );
    fs::write(dir.path().join("sdg.properties"), text).unwrap();

    for node in [0u32, 1] {
        Command::cargo_bin("sdg")
            .unwrap()
            .args([
                "-c",
                dir.path().to_str().unwrap(),
                "-i",
                &node.to_string(),
                "-x",
                "Widget",
            ])
            .assert()
            .success();
        let node_dir = out.join("job1").join(format!("node{node:03}"));
        fs::rename(node_dir.join("Widget.tbl"), dir.path().join(format!("node{node}.tbl"))).unwrap();
    }

    let node0: Vec<u64> = fs::read_to_string(dir.path().join("node0.tbl"))
        .unwrap()
        .lines()
        .map(|l| l.split('\t').next().unwrap().parse().unwrap())
        .collect();
    let node1: Vec<u64> = fs::read_to_string(dir.path().join("node1.tbl"))
        .unwrap()
        .lines()
        .map(|l| l.split('\t').next().unwrap().parse().unwrap())
        .collect();

    assert_eq!(node0, (0..500).collect::<Vec<_>>());
    assert_eq!(node1, (500..1000).collect::<Vec<_>>());
}
