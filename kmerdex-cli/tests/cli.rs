//! End-to-end runs of the kmerdex binary

use assert_cmd::Command;
use kmerdex_test::TestEnvironment;
use predicates::prelude::*;
use pretty_assertions::assert_eq;

fn kmerdex(env: &TestEnvironment) -> Command {
    let mut cmd = Command::cargo_bin("kmerdex").unwrap();
    cmd.env("KMERDEX_HOME", env.root())
        .env_remove("KMERDEX_INDEX_URL")
        .env_remove("KMERDEX_LOG")
        .current_dir(env.root());
    cmd
}

fn planned_env() -> TestEnvironment {
    let env = TestEnvironment::new().unwrap();
    env.write_file("counts.txt", "AAAAAAA\t100\nGGGGGGG\t50\nCCCCCCC\t50\nTTTTTTT\t20\n")
        .unwrap();
    kmerdex(&env)
        .args(["partition", "counts.txt", "-p", "2", "-r", "3", "--seed", "11", "--format", "json"])
        .assert()
        .success();
    env
}

#[test]
fn test_partition_writes_artifacts() {
    let env = TestEnvironment::new().unwrap();
    env.write_file("counts.txt", "AAAAAAA\t100\nCCCCCCC\t50\nGGGGGGG\t50\n")
        .unwrap();

    kmerdex(&env)
        .args(["partition", "counts.txt", "-p", "2", "--seed", "1", "-o", "out", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"spread\": 0"))
        .stdout(predicate::str::contains("\"suffix_width\": 7"));

    assert_eq!(
        env.read_file("out/partition.info").unwrap(),
        "AAAAAAA\t1\t100\nCCCCCCC\t2\t100\n"
    );
    assert_eq!(
        env.read_file("out/partition.txt").unwrap(),
        "AAAAAAA\tAAAAAAA\nCCCCCCC\tCCCCCCC\nCCCCCCC\tGGGGGGG\n"
    );
}

#[test]
fn test_partition_malformed_counts_exit_code() {
    let env = TestEnvironment::new().unwrap();
    env.write_file("counts.txt", "AAAAAAA\tlots\n").unwrap();

    kmerdex(&env)
        .args(["partition", "counts.txt"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("line 1"));
    assert!(!env.root().join("partition.txt").exists());
}

#[test]
fn test_partition_mixed_width_corpus_writes_nothing() {
    let env = TestEnvironment::new().unwrap();
    env.write_file("counts.txt", "AAAAAAA\t50\nCC\t30\nACGTNNN\t20\n")
        .unwrap();

    kmerdex(&env)
        .args(["partition", "counts.txt", "-p", "2"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("line 2"));
    assert!(!env.root().join("partition.info").exists());
    assert!(!env.root().join("partition.txt").exists());
}

#[test]
fn test_route_reports_partitions() {
    let env = planned_env();
    kmerdex(&env)
        .args(["route", &"A".repeat(31), "--both", "--format", "tsv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("forward"))
        .stdout(predicate::str::contains("reverse"));
}

#[test]
fn test_route_unroutable_exit_code() {
    let env = TestEnvironment::new().unwrap();
    env.write_file("partition.txt", "P1\tAAAAAAA\n").unwrap();
    kmerdex(&env)
        .args(["route", &"C".repeat(31)])
        .assert()
        .code(6);
}

#[test]
fn test_split_writes_partition_files() {
    let env = planned_env();
    let kmer = "C".repeat(24) + "AAAAAAA";
    env.write_file("dump.txt", &format!("{} 3\n{} 1\n", kmer, "G".repeat(31)))
        .unwrap();

    kmerdex(&env)
        .args(["split", "dump.txt", "-o", "parts", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"written\": 1"));

    let table = std::fs::read_to_string(env.root().join("partition.txt")).unwrap();
    let partition = table
        .lines()
        .find(|line| line.ends_with("\tAAAAAAA"))
        .and_then(|line| line.split('\t').next())
        .unwrap()
        .to_string();
    assert_eq!(
        env.read_file(&format!("parts/{}.txt", partition)).unwrap(),
        format!("{}\n", kmer)
    );
}

#[test]
fn test_split_count_first_input() {
    let env = planned_env();
    let kmer = "C".repeat(24) + "AAAAAAA";
    env.write_file("uniq.txt", &format!("      4 {}\n      1 {}\n", kmer, "G".repeat(31)))
        .unwrap();

    kmerdex(&env)
        .args(["split", "uniq.txt", "--count-first", "-o", "parts", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"written\": 1"))
        .stdout(predicate::str::contains("\"skipped\": 1"));
}

#[test]
fn test_lookup_without_samples_returns_envelope() {
    let env = planned_env();
    kmerdex(&env)
        .args(["lookup", "kmer", &"A".repeat(31), "--format", "json", "--url", "http://127.0.0.1:9"])
        .assert()
        .code(4)
        .stdout(predicate::str::contains("\"has_errors\": \"MISSING_SAMPLES\""));
}

#[test]
fn test_indices_dry_run() {
    let env = planned_env();
    kmerdex(&env)
        .args(["indices", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("number_of_shards"))
        .stdout(predicate::str::contains("PUT http://localhost:9200/kmer_"));
}

#[test]
fn test_config_init_and_show() {
    let env = TestEnvironment::new().unwrap();
    kmerdex(&env).args(["config", "init"]).assert().success();
    assert!(env.root().join("config.toml").exists());

    kmerdex(&env).args(["config", "init"]).assert().code(2);

    kmerdex(&env)
        .args(["config", "show", "--format", "json"])
        .env("KMERDEX_INDEX_URL", "http://es.example:9200")
        .assert()
        .success()
        .stdout(predicate::str::contains("http://es.example:9200"))
        .stdout(predicate::str::contains("\"partitions\": 10"));
}
