//! Command-line smoke tests against the built binary

mod common;

use assert_cmd::Command;
use common::{random_acgt, RawTree};
use predicates::prelude::*;

fn metadataset() -> Command {
    Command::cargo_bin("metadataset").expect("binary builds")
}

#[test]
fn test_config_prints_defaults() {
    metadataset()
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("min_len = 1000"))
        .stdout(predicate::str::contains("mash_threshold = 0.05"));
}

#[test]
fn test_curate_without_mash() {
    let tree = RawTree::new();
    tree.write_fasta(
        "train",
        "bacteria",
        "asm1.fna",
        &[("chr1 chromosome", &random_acgt(1500, 41))],
    );

    metadataset()
        .arg("curate")
        .arg("--base-dir")
        .arg(&tree.base)
        .arg("--out-dir")
        .arg(&tree.out)
        .args(["--category", "bacteria", "--no-mash", "--quiet"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Curation Summary"))
        .stdout(predicate::str::contains("files_processed"))
        .stdout(predicate::str::contains("skipped_mash_duplicate"))
        .stdout(predicate::str::contains("records_written"));

    assert!(tree.out_path("metadata/bacteria_manifest.csv").is_file());
    assert!(tree.out_path("metadata/bacteria_host_map.json").is_file());
    assert!(tree.out_path("train/prokaryote/asm1__chr1.fna").is_file());
}

#[test]
fn test_invalid_threshold_exits_with_config_code() {
    let tree = RawTree::new();

    metadataset()
        .arg("curate")
        .arg("--base-dir")
        .arg(&tree.base)
        .arg("--out-dir")
        .arg(&tree.out)
        .args(["--category", "bacteria", "--max-ambig", "1.5", "--no-mash"])
        .assert()
        .code(2);
}

#[test]
fn test_dedup_requires_manifest() {
    let tree = RawTree::new();

    metadataset()
        .arg("dedup")
        .arg("--out-dir")
        .arg(&tree.out)
        .args(["--category", "bacteria"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Manifest not found"));
}

#[test]
fn test_dedup_rejects_missing_mash_binary() {
    let tree = RawTree::new();
    tree.write_fasta(
        "train",
        "bacteria",
        "asm1.fna",
        &[("chr1 chromosome", &random_acgt(1500, 42))],
    );

    metadataset()
        .arg("curate")
        .arg("--base-dir")
        .arg(&tree.base)
        .arg("--out-dir")
        .arg(&tree.out)
        .args(["--category", "bacteria", "--no-mash", "--quiet"])
        .assert()
        .success();

    metadataset()
        .arg("dedup")
        .arg("--out-dir")
        .arg(&tree.out)
        .args(["--category", "bacteria"])
        .arg("--mash-binary")
        .arg(tree.out_path("no-such-mash"))
        .assert()
        .code(5)
        .stderr(predicate::str::contains("mash binary not found"));
}
