//! Pipeline tests against in-memory and file-backed stores.

use buildergen_core::adapters::{
    AllFieldsSelector, CancelledSelector, FsDocumentStore, FsWritePort, InMemoryDocumentStore,
    NamedFieldsSelector,
};
use buildergen_core::pipeline::{
    GenerateStatus, PlanStatus, ToolError, run_apply, run_candidates, run_generate, run_plan,
    write_apply_artifacts, write_plan_artifacts,
};
use buildergen_core::ports::DocumentStore;
use buildergen_core::settings::Settings;
use buildergen_core::{Target, UnitLocks};
use buildergen_edit::EditResult;
use buildergen_types::decl::{ClassDecl, CompilationUnit, FieldDecl, Span};
use buildergen_types::plan::{EditPlan, ToolInfo};
use camino::Utf8PathBuf;
use pretty_assertions::assert_eq;
use std::cell::Cell;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tempfile::TempDir;

fn tool() -> ToolInfo {
    ToolInfo {
        name: "buildergen".to_string(),
        version: Some("test".to_string()),
    }
}

fn point_unit() -> CompilationUnit {
    let mut point = ClassDecl::new("Point");
    point.fields = vec![FieldDecl::new("x", "int"), FieldDecl::new("y", "int")];
    point.span = Some(Span::new(0, 100));
    CompilationUnit::new(vec![point])
}

fn point() -> Target {
    Target::Path("Point".to_string())
}

fn field_names(unit: &CompilationUnit, path: &str) -> Vec<String> {
    let path = buildergen_types::decl::DeclPath::parse(path).expect("path");
    unit.class_at(&path)
        .expect("class")
        .fields
        .iter()
        .map(|f| f.name.clone())
        .collect()
}

#[test]
fn candidates_by_offset() {
    let store = InMemoryDocumentStore::new("unit", point_unit());
    let outcome =
        run_candidates(&Settings::default(), &store, &Target::Offset(10)).expect("candidates");
    assert_eq!(outcome.class.to_string(), "Point");
    assert_eq!(outcome.candidates.len(), 2);
}

#[test]
fn offset_outside_class_is_target_not_found() {
    let store = InMemoryDocumentStore::new("unit", point_unit());
    let err = run_candidates(&Settings::default(), &store, &Target::Offset(500))
        .err()
        .expect("no class");
    assert!(matches!(err, ToolError::TargetNotFound(_)));
    assert_eq!(err.exit_code(), 1);
}

#[test]
fn plan_does_not_touch_store() {
    let store = InMemoryDocumentStore::new("unit", point_unit());
    let outcome = run_plan(
        &Settings::default(),
        &store,
        &point(),
        &AllFieldsSelector,
        tool(),
    )
    .expect("plan");

    assert_eq!(outcome.status, PlanStatus::Planned);
    assert!(outcome.plan.preconditions.target_sha256.is_some());
    assert_eq!(outcome.plan.target.unit_path.as_deref(), Some("memory:unit"));
    assert!(outcome.patch.contains("+    static final class Builder {"));
    assert_eq!(store.snapshot(), point_unit());
}

#[test]
fn cancelled_and_empty_selections_plan_nothing() {
    let store = InMemoryDocumentStore::new("unit", point_unit());

    let cancelled = run_plan(
        &Settings::default(),
        &store,
        &point(),
        &CancelledSelector,
        tool(),
    )
    .expect("plan");
    assert_eq!(cancelled.status, PlanStatus::Cancelled);
    assert!(cancelled.plan.is_empty());
    assert_eq!(cancelled.patch, "");

    let empty = run_plan(
        &Settings::default(),
        &store,
        &point(),
        &NamedFieldsSelector::new(["nope"]),
        tool(),
    )
    .expect("plan");
    assert_eq!(empty.status, PlanStatus::NoOp);
    assert!(empty.plan.is_empty());
}

#[test]
fn plan_then_apply_commits() {
    let store = InMemoryDocumentStore::new("unit", point_unit());
    let settings = Settings::default();
    let planned =
        run_plan(&settings, &store, &point(), &AllFieldsSelector, tool()).expect("plan");

    let outcome = run_apply(&settings, &store, &planned.plan, tool()).expect("apply");
    assert!(outcome.blocked.is_none());
    assert!(outcome.report.committed);
    assert_eq!(outcome.patch, planned.patch);
    assert_eq!(field_names(&store.snapshot(), "Point.Builder"), vec!["x", "y"]);
}

#[test]
fn stale_plan_is_blocked_and_store_untouched() {
    let store = InMemoryDocumentStore::new("unit", point_unit());
    let settings = Settings::default();
    let planned = run_plan(
        &settings,
        &store,
        &point(),
        &NamedFieldsSelector::new(["x"]),
        tool(),
    )
    .expect("plan");

    let mut changed = store.snapshot();
    changed.types[0].fields.push(FieldDecl::new("z", "int"));
    store.commit(&changed).expect("edit between plan and apply");

    let outcome = run_apply(&settings, &store, &planned.plan, tool()).expect("apply");
    let blocked = outcome.blocked.expect("blocked");
    assert_eq!(blocked.exit_code(), 2);
    assert!(!outcome.report.committed);
    assert!(outcome.report.preconditions.mismatch.is_some());
    assert_eq!(store.snapshot(), changed);
}

#[test]
fn dry_run_apply_reports_without_commit() {
    let store = InMemoryDocumentStore::new("unit", point_unit());
    let settings = Settings {
        dry_run: true,
        ..Settings::default()
    };
    let planned =
        run_plan(&settings, &store, &point(), &AllFieldsSelector, tool()).expect("plan");
    let outcome = run_apply(&settings, &store, &planned.plan, tool()).expect("apply");

    assert!(outcome.blocked.is_none());
    assert!(!outcome.report.committed);
    assert_eq!(outcome.report.summary.skipped, outcome.report.summary.attempted);
    assert_eq!(store.snapshot(), point_unit());
}

#[test]
fn read_only_store_blocks_commit() {
    let store = InMemoryDocumentStore::new("unit", point_unit()).read_only(true);
    let settings = Settings::default();

    let err = run_generate(
        &settings,
        &store,
        &point(),
        &AllFieldsSelector,
        tool(),
        &UnitLocks::new(),
    )
    .err()
    .expect("read-only");
    assert_eq!(err.exit_code(), 2);
    assert_eq!(store.snapshot(), point_unit());
}

#[test]
fn generate_statuses() {
    let store = InMemoryDocumentStore::new("unit", point_unit());
    let locks = UnitLocks::new();
    let settings = Settings::default();

    let cancelled = run_generate(
        &settings,
        &store,
        &point(),
        &CancelledSelector,
        tool(),
        &locks,
    )
    .expect("generate");
    assert_eq!(cancelled.status, GenerateStatus::Cancelled);

    let dry = run_generate(
        &Settings {
            dry_run: true,
            ..Settings::default()
        },
        &store,
        &point(),
        &AllFieldsSelector,
        tool(),
        &locks,
    )
    .expect("generate");
    assert_eq!(dry.status, GenerateStatus::DryRun);
    assert!(!dry.patch.is_empty());
    assert_eq!(store.snapshot(), point_unit());

    let committed = run_generate(
        &settings,
        &store,
        &point(),
        &AllFieldsSelector,
        tool(),
        &locks,
    )
    .expect("generate");
    assert_eq!(committed.status, GenerateStatus::Committed);

    let again = run_generate(
        &settings,
        &store,
        &point(),
        &AllFieldsSelector,
        tool(),
        &locks,
    )
    .expect("generate");
    assert_eq!(again.status, GenerateStatus::NoOp);
}

#[test]
fn concurrent_generate_on_one_class_converges() {
    let mut owner = ClassDecl::new("User");
    owner.fields = ["id", "name", "email", "age"]
        .iter()
        .map(|n| FieldDecl::new(*n, "String"))
        .collect();
    let store = InMemoryDocumentStore::new("users", CompilationUnit::new(vec![owner]));
    let locks = UnitLocks::new();
    let settings = Settings::default();
    let target = Target::Path("User".to_string());

    std::thread::scope(|s| {
        for name in ["id", "name", "email", "age"] {
            let (store, locks, settings, target) = (&store, &locks, &settings, &target);
            s.spawn(move || {
                run_generate(
                    settings,
                    store,
                    target,
                    &NamedFieldsSelector::new([name]),
                    tool(),
                    locks,
                )
                .expect("generate");
            });
        }
    });

    let unit = store.snapshot();
    let mut mirrored = field_names(&unit, "User.Builder");
    mirrored.sort();
    assert_eq!(mirrored, vec!["age", "email", "id", "name"]);

    let owner = &unit.types[0];
    let builder_ctors: Vec<_> = owner
        .constructors
        .iter()
        .filter(|c| buildergen_domain::templates::is_builder_constructor(c))
        .collect();
    assert_eq!(builder_ctors.len(), 1);
    assert_eq!(builder_ctors[0].body.len(), 4);
    assert_eq!(owner.methods.iter().filter(|m| m.name == "newUser").count(), 1);
}

/// Counts how many read-modify-commit sequences overlap. Each worker's first load opens a
/// sequence and its commit closes it.
struct OverlapTrackingStore {
    inner: InMemoryDocumentStore,
    open: AtomicUsize,
    max_open: AtomicUsize,
}

thread_local! {
    static LOADS: Cell<usize> = const { Cell::new(0) };
}

impl DocumentStore for OverlapTrackingStore {
    fn load(&self) -> anyhow::Result<CompilationUnit> {
        let unit = self.inner.load()?;
        let first = LOADS.with(|n| {
            n.set(n.get() + 1);
            n.get() == 1
        });
        if first {
            let open = self.open.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_open.fetch_max(open, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(50));
        }
        Ok(unit)
    }

    fn commit(&self, unit: &CompilationUnit) -> EditResult<()> {
        self.inner.commit(unit)?;
        self.open.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    }

    fn describe(&self) -> String {
        self.inner.describe()
    }
}

#[test]
fn concurrent_generate_on_sibling_classes_keeps_both_builders() {
    let mut point = ClassDecl::new("Point");
    point.fields = vec![FieldDecl::new("x", "int")];
    let mut line = ClassDecl::new("Line");
    line.fields = vec![FieldDecl::new("len", "int")];

    let store = OverlapTrackingStore {
        inner: InMemoryDocumentStore::new("shapes", CompilationUnit::new(vec![point, line])),
        open: AtomicUsize::new(0),
        max_open: AtomicUsize::new(0),
    };
    let locks = UnitLocks::new();
    let settings = Settings::default();

    std::thread::scope(|s| {
        for class in ["Point", "Line"] {
            let (store, locks, settings) = (&store, &locks, &settings);
            s.spawn(move || {
                let outcome = run_generate(
                    settings,
                    store,
                    &Target::Path(class.to_string()),
                    &AllFieldsSelector,
                    tool(),
                    locks,
                )
                .expect("generate");
                assert_eq!(outcome.status, GenerateStatus::Committed);
            });
        }
    });

    assert_eq!(store.max_open.load(Ordering::SeqCst), 1);
    let unit = store.inner.snapshot();
    let mut with_builder: Vec<&str> = unit
        .types
        .iter()
        .filter(|c| c.nested("Builder").is_some())
        .map(|c| c.name.as_str())
        .collect();
    with_builder.sort();
    assert_eq!(with_builder, vec!["Line", "Point"]);
    assert_eq!(field_names(&unit, "Point.Builder"), vec!["x"]);
    assert_eq!(field_names(&unit, "Line.Builder"), vec!["len"]);
}

#[test]
fn fs_store_plan_apply_with_artifacts() {
    let dir = TempDir::new().expect("tempdir");
    let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf8");
    let unit_path = root.join("Point.json");
    std::fs::write(
        &unit_path,
        serde_json::to_string_pretty(&point_unit()).expect("json"),
    )
    .expect("seed unit");

    let store = FsDocumentStore::new(unit_path.clone()).with_backup(".bak");
    let settings = Settings::default();
    let out_dir = root.join("artifacts").join("buildergen");

    let planned =
        run_plan(&settings, &store, &point(), &AllFieldsSelector, tool()).expect("plan");
    write_plan_artifacts(&planned, &out_dir, &FsWritePort).expect("write plan artifacts");
    for name in ["plan.json", "plan.md", "patch.diff"] {
        assert!(out_dir.join(name).exists(), "{name} written");
    }

    let plan_text = std::fs::read_to_string(out_dir.join("plan.json")).expect("read plan");
    let plan: EditPlan = serde_json::from_str(&plan_text).expect("parse plan");

    let applied = run_apply(&settings, &store, &plan, tool()).expect("apply");
    write_apply_artifacts(&applied, &out_dir, &FsWritePort).expect("write apply artifacts");
    assert!(applied.report.committed);
    assert!(out_dir.join("apply.json").exists());
    assert!(Utf8PathBuf::from(format!("{unit_path}.bak")).exists());

    let reloaded = store.load().expect("reload");
    assert_eq!(field_names(&reloaded, "Point.Builder"), vec!["x", "y"]);
}
