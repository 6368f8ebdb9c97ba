use buildergen_types::apply::{ApplyReport, PlanRef};
use buildergen_types::decl::{ConstructorDecl, DeclPath, MethodDecl, Param, TypeRef};
use buildergen_types::plan::{EditPlan, FieldScope, PlanPolicy, PlanTarget, ToolInfo};

fn tool() -> ToolInfo {
    ToolInfo {
        name: "buildergen".to_string(),
        version: Some("1.2.3".to_string()),
    }
}

#[test]
fn edit_plan_new_sets_schema_and_defaults() {
    let target = PlanTarget {
        class: DeclPath::root("Point"),
        unit_path: Some("src/Point.json".to_string()),
    };
    let policy = PlanPolicy {
        field_scope: FieldScope::DeclaredOnly,
    };

    let plan = EditPlan::new(tool(), target, policy);

    assert_eq!(plan.schema, buildergen_types::schema::BUILDERGEN_PLAN_V1);
    assert_eq!(plan.tool, tool());
    assert_eq!(plan.target.class.to_string(), "Point");
    assert_eq!(plan.policy.field_scope, FieldScope::DeclaredOnly);
    assert!(plan.preconditions.target_sha256.is_none());
    assert!(plan.ops.is_empty());
    assert!(plan.is_empty());
    assert_eq!(plan.summary.ops_total, 0);
    assert!(!plan.summary.builder_created);
    assert!(plan.summary.assigned_fields.is_empty());
}

#[test]
fn apply_report_new_sets_schema_and_defaults() {
    let report = ApplyReport::new(
        tool(),
        PlanRef {
            target: DeclPath::root("Point"),
            ops: 3,
            path: None,
        },
    );

    assert_eq!(report.schema, buildergen_types::schema::BUILDERGEN_APPLY_V1);
    assert!(!report.committed);
    assert!(!report.preconditions.verified);
    assert!(report.preconditions.mismatch.is_none());
    assert!(report.results.is_empty());
    assert_eq!(report.summary.attempted, 0);
    assert!(report.run.started_at.is_none());
}

#[test]
fn field_scope_defaults_to_inherited() {
    assert_eq!(FieldScope::default(), FieldScope::Inherited);
    assert!(FieldScope::Inherited.includes_inherited());
    assert!(!FieldScope::DeclaredOnly.includes_inherited());
}

#[test]
fn method_signature_uses_param_types_only() {
    let a = MethodDecl {
        name: "x".to_string(),
        modifiers: Default::default(),
        return_type: Some(TypeRef::new("Builder")),
        params: vec![Param::new("x", TypeRef::new("int"))],
        body: vec![],
    };
    let mut b = a.clone();
    b.params[0].name = "value".to_string();
    b.return_type = None;

    assert_eq!(a.signature(), b.signature());
}

#[test]
fn sole_param_type_requires_exactly_one_param() {
    let none = ConstructorDecl::default();
    assert!(none.sole_param_type().is_none());

    let one = ConstructorDecl {
        params: vec![Param::new("builder", TypeRef::new("Builder"))],
        ..Default::default()
    };
    assert_eq!(one.sole_param_type().map(TypeRef::as_str), Some("Builder"));

    let two = ConstructorDecl {
        params: vec![
            Param::new("a", TypeRef::new("Builder")),
            Param::new("b", TypeRef::new("int")),
        ],
        ..Default::default()
    };
    assert!(two.sole_param_type().is_none());
}
