//! Golden fixture tests for builder synthesis.
//!
//! Each fixture under `tests/fixtures/<name>/` contains:
//!
//! - `unit.json` - the declaration tree before synthesis
//! - `case.json` - target class path and the fields to pick (`null` picks every candidate)
//! - `expected/` - expected output (plan.json, patch.diff, after.java)
//!
//! Expected files are committed. Set `BUILDERGEN_BLESS=1` (or run
//! `cargo run -p xtask -- bless-fixtures`) to write or rewrite them.

use buildergen_domain::{BuilderSynthesizer, FieldEligibilityResolver, SynthesisConfig};
use buildergen_edit::{ApplyOptions, apply_plan, attach_preconditions};
use buildergen_render::render_unit;
use buildergen_types::decl::{CompilationUnit, DeclPath, FieldDecl};
use buildergen_types::plan::{FieldScope, ToolInfo};
use fs_err as fs;
use pretty_assertions::assert_eq;
use std::path::{Path, PathBuf};

#[derive(serde::Deserialize)]
struct FixtureCase {
    target: String,
    #[serde(default)]
    fields: Option<Vec<String>>,
    #[serde(default)]
    field_scope: FieldScope,
}

fn fixtures_dir() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    let workspace_root = manifest_dir.parent().expect("workspace root");
    workspace_root.join("tests").join("fixtures")
}

fn bless() -> bool {
    std::env::var("BUILDERGEN_BLESS").is_ok_and(|v| v == "1")
}

const EXPECTED_FILES: [&str; 3] = ["plan.json", "patch.diff", "after.java"];

fn check_or_write(path: &Path, actual: &str, fixture_name: &str) {
    if bless() {
        fs::create_dir_all(path.parent().expect("parent")).expect("create expected dir");
        fs::write(path, actual).expect("write expected");
        println!("Wrote {} for '{}'", path.display(), fixture_name);
        return;
    }

    assert!(
        path.exists(),
        "{} missing for fixture '{}'; run with BUILDERGEN_BLESS=1 and review the output",
        path.display(),
        fixture_name
    );
    let expected = fs::read_to_string(path).expect("read expected");
    assert_eq!(
        actual,
        expected,
        "{} mismatch for fixture '{}'",
        path.display(),
        fixture_name
    );
}

fn run_fixture_test(fixture_name: &str) {
    let fixture_path = fixtures_dir().join(fixture_name);
    assert!(
        fixture_path.exists(),
        "Fixture directory does not exist: {}",
        fixture_path.display()
    );

    let unit_json = fs::read_to_string(fixture_path.join("unit.json")).expect("read unit");
    let mut unit: CompilationUnit = serde_json::from_str(&unit_json).expect("parse unit");
    let case_json = fs::read_to_string(fixture_path.join("case.json")).expect("read case");
    let case: FixtureCase = serde_json::from_str(&case_json).expect("parse case");

    let target = DeclPath::parse(&case.target).expect("target path");
    let owner = unit.class_at(&target).expect("target class");

    let candidates = FieldEligibilityResolver::new(case.field_scope).resolve(owner, &unit);
    let chosen: Vec<FieldDecl> = match &case.fields {
        None => candidates,
        Some(names) => candidates
            .into_iter()
            .filter(|f| names.contains(&f.name))
            .collect(),
    };

    let tool = ToolInfo {
        name: "buildergen".to_string(),
        version: Some("test".to_string()),
    };
    let synth = BuilderSynthesizer::new(
        SynthesisConfig {
            field_scope: case.field_scope,
        },
        tool.clone(),
    );
    let mut plan = synth
        .synthesize(&target, owner, &chosen)
        .expect("synthesize")
        .expect("non-empty selection");
    plan.target.unit_path = Some(format!("{fixture_name}/unit.json"));
    attach_preconditions(&unit, &mut plan).expect("attach preconditions");

    let (report, patch) =
        apply_plan(&mut unit, &plan, tool, &ApplyOptions::default()).expect("apply plan");
    assert!(report.committed);
    assert_eq!(report.summary.applied, plan.summary.ops_total);
    assert_eq!(plan.summary.ops_total, plan.ops.len() as u64);

    let expected_dir = fixture_path.join("expected");
    let plan_json = serde_json::to_string_pretty(&plan).expect("serialize plan") + "\n";
    let outputs = [plan_json, patch, render_unit(&unit)];
    for (file, actual) in EXPECTED_FILES.iter().zip(&outputs) {
        check_or_write(&expected_dir.join(file), actual, fixture_name);
    }
}

#[test]
fn every_fixture_has_committed_expectations() {
    if bless() {
        return;
    }
    let mut names: Vec<String> = fs::read_dir(fixtures_dir())
        .expect("read fixtures dir")
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_dir())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert!(!names.is_empty(), "no fixtures found");

    for name in &names {
        let expected_dir = fixtures_dir().join(name).join("expected");
        for file in EXPECTED_FILES {
            assert!(
                expected_dir.join(file).is_file(),
                "fixture '{}' has no committed expected/{}",
                name,
                file
            );
        }
    }
}

#[test]
fn golden_fresh_point() {
    run_fixture_test("fresh_point");
}

#[test]
fn golden_incremental_point() {
    run_fixture_test("incremental_point");
}

#[test]
fn golden_stale_constructors() {
    run_fixture_test("stale_constructors");
}

#[test]
fn golden_inherited_fields() {
    run_fixture_test("inherited_fields");
}

#[test]
fn golden_declared_only() {
    run_fixture_test("declared_only");
}
