//! Cross-split near-duplicate removal driven through full curation runs

mod common;

use common::{random_acgt, RawTree};
use metadataset::processing::manifest::read_manifest;
use metadataset::processing::split::Split;
use metadataset::processing::stats::Counter;
use metadataset::tools::testing::StaticSketchTool;
use metadataset::Curator;
use std::fs;

fn directional_tree() -> RawTree {
    let tree = RawTree::new();
    tree.write_fasta("train", "bacteria", "t.fna", &[("t1 chromosome", &random_acgt(1500, 21))]);
    tree.write_fasta("val", "bacteria", "v.fna", &[("v1 chromosome", &random_acgt(1500, 22))]);
    tree.write_fasta("test", "bacteria", "x.fna", &[("x1 chromosome", &random_acgt(1500, 23))]);
    tree
}

fn directional_tool() -> StaticSketchTool {
    StaticSketchTool::new()
        .with_distance("t__t1.fna", "v__v1.fna", 0.01)
        .with_distance("v__v1.fna", "x__x1.fna", 0.01)
        .with_distance("t__t1.fna", "x__x1.fna", 0.5)
}

#[test]
fn test_removed_file_is_not_a_reference_later() {
    let tree = directional_tree();

    let report = Curator::with_sketch_tool(tree.config("bacteria"), Box::new(directional_tool()))
        .unwrap()
        .run()
        .unwrap();

    let resolution = report.resolution.as_ref().unwrap();
    assert!(resolution.is_complete());
    assert_eq!(resolution.removed.len(), 1);
    assert_eq!(resolution.removed[0].split, Split::Val);

    assert!(tree.out_path("train/prokaryote/t__t1.fna").is_file());
    assert!(!tree.out_path("val/prokaryote/v__v1.fna").exists());
    assert!(tree.out_path("test/prokaryote/x__x1.fna").is_file());
    assert_eq!(report.stats.get(Counter::SkippedMashDuplicate), 1);

    // Removed files keep their manifest rows unless pruning is requested
    assert_eq!(read_manifest(&report.manifest_path).unwrap().len(), 3);
    assert_eq!(report.manifest_rows_pruned, 0);
}

#[test]
fn test_prune_manifest_drops_removed_rows() {
    let tree = directional_tree();
    let mut config = tree.config("bacteria");
    config.prune_manifest = true;

    let report = Curator::with_sketch_tool(config, Box::new(directional_tool()))
        .unwrap()
        .run()
        .unwrap();

    assert_eq!(report.manifest_rows_pruned, 1);
    let rows = read_manifest(&report.manifest_path).unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| r.split != Split::Val));
}

#[test]
fn test_threshold_is_inclusive() {
    let tree = RawTree::new();
    tree.write_fasta("train", "bacteria", "a.fna", &[("a1 chromosome", &random_acgt(1500, 31))]);
    tree.write_fasta("test", "bacteria", "b.fna", &[("b1 chromosome", &random_acgt(1500, 32))]);
    let tool = StaticSketchTool::new().with_distance("a__a1.fna", "b__b1.fna", 0.05);

    let report = Curator::with_sketch_tool(tree.config("bacteria"), Box::new(tool))
        .unwrap()
        .run()
        .unwrap();

    assert_eq!(report.stats.get(Counter::SkippedMashDuplicate), 1);
    assert!(!tree.out_path("test/prokaryote/b__b1.fna").exists());
}

#[test]
fn test_missing_tool_leaves_files_in_place() {
    let tree = directional_tree();

    let report = Curator::with_sketch_tool(
        tree.config("bacteria"),
        Box::new(StaticSketchTool::unavailable()),
    )
    .unwrap()
    .run()
    .unwrap();

    let resolution = report.resolution.as_ref().unwrap();
    assert!(resolution.skipped_unavailable);
    assert!(resolution.removed.is_empty());
    assert_eq!(report.stats.get(Counter::SkippedMashDuplicate), 0);
    assert!(tree.out_path("val/prokaryote/v__v1.fna").is_file());
}

#[test]
fn test_tool_failure_keeps_curated_output() {
    let tree = directional_tree();

    let report = Curator::with_sketch_tool(tree.config("bacteria"), Box::new(StaticSketchTool::failing()))
        .unwrap()
        .run()
        .unwrap();

    let resolution = report.resolution.as_ref().unwrap();
    assert!(resolution.aborted.is_some());
    assert!(!resolution.is_complete());
    assert_eq!(report.stats.get(Counter::RecordsWritten), 3);
    assert!(report.host_map_path.is_file());
}

#[test]
fn test_disabled_pass_reports_nothing() {
    let tree = directional_tree();

    let report = Curator::with_sketch_tool(tree.config("bacteria"), Box::new(directional_tool()))
        .unwrap()
        .without_near_duplicate_pass()
        .run()
        .unwrap();

    assert!(report.resolution.is_none());
    assert!(tree.out_path("val/prokaryote/v__v1.fna").is_file());
}

#[test]
fn test_sketches_are_not_left_behind() {
    let tree = directional_tree();

    let report = Curator::with_sketch_tool(tree.config("bacteria"), Box::new(directional_tool()))
        .unwrap()
        .run()
        .unwrap();

    let meta_dir = report.manifest_path.parent().unwrap().to_path_buf();
    let leftovers: Vec<_> = fs::read_dir(&meta_dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().map(|x| x == "msh").unwrap_or(false))
        .collect();
    assert!(leftovers.is_empty());
}
