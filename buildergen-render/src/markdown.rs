use buildergen_types::apply::{ApplyReport, ApplyStatus};
use buildergen_types::decl::FieldDecl;
use buildergen_types::plan::{EditPlan, FieldScope};

pub const CANDIDATES_HEADING: &str = "Fields to include in builder";

pub fn render_candidates(fields: &[FieldDecl]) -> String {
    let mut out = format!("{CANDIDATES_HEADING}:\n");
    if fields.is_empty() {
        out.push_str("  (none)\n");
        return out;
    }
    for f in fields {
        out.push_str(&format!("  - {}: {}\n", f.name, f.ty));
    }
    out
}

pub fn render_plan_md(plan: &EditPlan) -> String {
    let mut out = String::new();
    out.push_str("# buildergen plan\n\n");
    out.push_str(&format!("- Target: `{}`\n", plan.target.class));
    if let Some(path) = &plan.target.unit_path {
        out.push_str(&format!("- Unit: `{}`\n", path));
    }
    out.push_str(&format!(
        "- Field scope: `{}`\n",
        scope_label(plan.policy.field_scope)
    ));
    out.push_str(&format!("- Ops: {}\n", plan.summary.ops_total));
    out.push_str(&format!(
        "- Builder created: {}\n",
        yes_no(plan.summary.builder_created)
    ));
    out.push_str(&format!("- Fields added: {}\n", plan.summary.fields_added));
    out.push_str(&format!(
        "- Stale constructors removed: {}\n",
        plan.summary.constructors_removed
    ));
    out.push_str(&format!(
        "- Factory added: {}\n",
        yes_no(plan.summary.factory_added)
    ));
    if !plan.summary.assigned_fields.is_empty() {
        out.push_str(&format!(
            "- Constructor assigns: {}\n",
            plan.summary.assigned_fields.join(", ")
        ));
    }
    out.push('\n');

    out.push_str("## Ops\n\n");
    if plan.ops.is_empty() {
        out.push_str("_No ops planned._\n");
        return out;
    }

    for (i, op) in plan.ops.iter().enumerate() {
        out.push_str(&format!("### {}. {}\n\n", i + 1, op.id));
        out.push_str(&format!("- Step: `{}`\n", op.rationale.step.as_str()));
        out.push_str(&format!("- Target: `{}`\n", op.target));
        out.push_str(&format!("- Kind: `{}`\n", op.kind.label()));
        out.push_str(&format!("- Member: `{}`\n", op.kind.member_key()));
        if let Some(desc) = &op.rationale.description {
            out.push_str(&format!("\n{}\n", desc));
        }
        out.push('\n');
    }

    out
}

pub fn render_apply_md(report: &ApplyReport) -> String {
    let mut out = String::new();
    out.push_str("# buildergen apply\n\n");
    out.push_str(&format!("- Target: `{}`\n", report.plan_ref.target));
    out.push_str(&format!(
        "- Attempted: {}\n- Applied: {}\n- Skipped: {}\n- Failed: {}\n- Committed: {}\n\n",
        report.summary.attempted,
        report.summary.applied,
        report.summary.skipped,
        report.summary.failed,
        yes_no(report.committed)
    ));

    if let Some(m) = &report.preconditions.mismatch {
        out.push_str("## Precondition mismatch\n\n");
        out.push_str(&format!(
            "- `{}` expected `{}`, found `{}`\n\n",
            m.target, m.expected, m.actual
        ));
    }

    if !report.errors.is_empty() {
        out.push_str("## Errors\n\n");
        for e in &report.errors {
            out.push_str(&format!("- {}\n", e));
        }
        out.push('\n');
    }

    out.push_str("## Results\n\n");
    if report.results.is_empty() {
        out.push_str("_No results._\n");
        return out;
    }

    for (i, r) in report.results.iter().enumerate() {
        out.push_str(&format!("### {}. {}\n\n", i + 1, r.op_id));
        out.push_str(&format!("- Status: `{}`\n", status_label(r.status)));
        if let Some(msg) = &r.message {
            out.push_str(&format!("- Message: {}\n", msg));
        }
        out.push('\n');
    }

    out
}

fn yes_no(b: bool) -> &'static str {
    if b { "yes" } else { "no" }
}

fn scope_label(s: FieldScope) -> &'static str {
    match s {
        FieldScope::Inherited => "inherited",
        FieldScope::DeclaredOnly => "declared_only",
    }
}

fn status_label(s: ApplyStatus) -> &'static str {
    match s {
        ApplyStatus::Applied => "applied",
        ApplyStatus::Skipped => "skipped",
        ApplyStatus::Failed => "failed",
    }
}
