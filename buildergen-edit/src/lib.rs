//! Edit engine for buildergen plans.
//!
//! Responsibilities:
//! - Attach the target-class fingerprint to a plan.
//! - Apply a plan's ops to a declaration tree as one all-or-nothing transaction.
//! - Generate a unified diff preview over the rendered source.

mod error;

pub use error::{ConflictError, EditError, EditResult, PolicyBlockError};

use anyhow::Context;
use buildergen_hash::fingerprint;
use buildergen_render::render_unit;
use buildergen_types::apply::{
    ApplyReport, ApplyResult, ApplyStatus, ApplySummary, PlanRef, PreconditionMismatch,
};
use buildergen_types::decl::{CompilationUnit, DeclPath, TypeRef};
use buildergen_types::ops::EditOp;
use buildergen_types::plan::{EditPlan, PlanOp, ToolInfo};
use chrono::Utc;
use diffy::PatchFormatter;
use tracing::{debug, info};

/// Marker used as the "actual" fingerprint when the target class is gone.
pub const MISSING_TARGET: &str = "<missing>";

#[derive(Debug, Clone)]
pub struct ApplyOptions {
    pub dry_run: bool,
    pub require_clean_hashes: bool,
}

impl Default for ApplyOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            require_clean_hashes: true,
        }
    }
}

/// Record the sha256 of the target class as it is now.
pub fn attach_preconditions(unit: &CompilationUnit, plan: &mut EditPlan) -> anyhow::Result<()> {
    let class = unit
        .class_at(&plan.target.class)
        .with_context(|| format!("target class `{}` not found", plan.target.class))?;
    plan.preconditions.target_sha256 =
        Some(fingerprint(class).context("fingerprint target class")?);
    Ok(())
}

/// Unified diff of the rendered unit before and after the plan. Preconditions are not checked.
pub fn preview_patch(unit: &CompilationUnit, plan: &EditPlan) -> EditResult<String> {
    let mut scratch = unit.clone();
    for op in &plan.ops {
        apply_op(&mut scratch, op)?;
    }
    Ok(render_patch(&patch_label(unit, plan), unit, &scratch))
}

/// Apply a plan.
///
/// Every op runs against a scratch copy; `unit` is replaced only when all of them succeed and
/// `opts.dry_run` is false. On error `unit` is untouched.
pub fn apply_plan(
    unit: &mut CompilationUnit,
    plan: &EditPlan,
    tool: ToolInfo,
    opts: &ApplyOptions,
) -> EditResult<(ApplyReport, String)> {
    let started_at = Utc::now();

    let verified = if opts.require_clean_hashes {
        verify_preconditions(unit, plan)?
    } else {
        false
    };

    let mut scratch = unit.clone();
    for op in &plan.ops {
        apply_op(&mut scratch, op)?;
        debug!(op = op.id.as_str(), kind = op.kind.label(), target = %op.target, "op applied");
    }

    let patch = render_patch(&patch_label(unit, plan), unit, &scratch);

    let mut report = ApplyReport::new(tool, plan_ref(plan));
    report.preconditions.verified = verified;
    report.run.started_at = Some(started_at);

    let (status, message) = if opts.dry_run {
        (ApplyStatus::Skipped, Some("dry-run: not written".to_string()))
    } else {
        (ApplyStatus::Applied, None)
    };
    report.results = plan
        .ops
        .iter()
        .map(|op| ApplyResult {
            op_id: op.id.clone(),
            status,
            message: message.clone(),
        })
        .collect();
    report.summary = summarize(&report.results);

    if !opts.dry_run {
        *unit = scratch;
        report.committed = true;
        info!(
            target = %plan.target.class,
            ops = plan.ops.len(),
            "edit transaction applied"
        );
    }

    report.run.ended_at = Some(Utc::now());
    Ok((report, patch))
}

/// Report for a transaction that was abandoned with `err`; nothing was written.
pub fn aborted_report(plan: &EditPlan, tool: ToolInfo, err: &EditError) -> ApplyReport {
    let mut report = ApplyReport::new(tool, plan_ref(plan));

    if let EditError::PolicyBlock(PolicyBlockError::PreconditionMismatch {
        target,
        expected,
        actual,
    }) = err
    {
        report.preconditions.mismatch = Some(PreconditionMismatch {
            target: target.clone(),
            expected: expected.clone(),
            actual: actual.clone(),
        });
    }

    let failed_op = match err {
        EditError::Conflict { op_id, .. } => Some(op_id.as_str()),
        _ => None,
    };
    report.results = plan
        .ops
        .iter()
        .map(|op| {
            if Some(op.id.as_str()) == failed_op {
                ApplyResult {
                    op_id: op.id.clone(),
                    status: ApplyStatus::Failed,
                    message: Some(err.to_string()),
                }
            } else {
                ApplyResult {
                    op_id: op.id.clone(),
                    status: ApplyStatus::Skipped,
                    message: Some("transaction aborted".to_string()),
                }
            }
        })
        .collect();
    report.summary = summarize(&report.results);
    report.errors.push(err.to_string());
    report.run.ended_at = Some(Utc::now());
    report
}

fn verify_preconditions(unit: &CompilationUnit, plan: &EditPlan) -> EditResult<bool> {
    let Some(expected) = &plan.preconditions.target_sha256 else {
        return Ok(false);
    };
    let target = &plan.target.class;

    let actual = match unit.class_at(target) {
        Some(class) => fingerprint(class).context("fingerprint target class")?,
        None => MISSING_TARGET.to_string(),
    };

    if &actual != expected {
        return Err(PolicyBlockError::PreconditionMismatch {
            target: target.clone(),
            expected: expected.clone(),
            actual,
        }
        .into());
    }
    Ok(true)
}

fn plan_ref(plan: &EditPlan) -> PlanRef {
    PlanRef {
        target: plan.target.class.clone(),
        ops: plan.ops.len() as u64,
        path: None,
    }
}

fn summarize(results: &[ApplyResult]) -> ApplySummary {
    let mut summary = ApplySummary::default();
    for r in results {
        summary.attempted += 1;
        match r.status {
            ApplyStatus::Applied => summary.applied += 1,
            ApplyStatus::Skipped => summary.skipped += 1,
            ApplyStatus::Failed => summary.failed += 1,
        }
    }
    summary
}

fn apply_op(unit: &mut CompilationUnit, op: &PlanOp) -> EditResult<()> {
    apply_kind(unit, &op.target, &op.kind).map_err(|source| EditError::Conflict {
        op_id: op.id.clone(),
        source,
    })
}

fn apply_kind(
    unit: &mut CompilationUnit,
    target: &DeclPath,
    kind: &EditOp,
) -> Result<(), ConflictError> {
    let class = unit
        .class_at_mut(target)
        .ok_or_else(|| ConflictError::MissingTarget {
            target: target.clone(),
        })?;

    match kind {
        EditOp::InsertNestedType { class: nested } => {
            if class.nested(&nested.name).is_some() {
                return Err(ConflictError::DuplicateNestedType {
                    target: target.clone(),
                    name: nested.name.clone(),
                });
            }
            class.nested.push(nested.clone());
        }
        EditOp::InsertField { field } => {
            if class.field(&field.name).is_some() {
                return Err(ConflictError::DuplicateField {
                    target: target.clone(),
                    name: field.name.clone(),
                });
            }
            class.fields.push(field.clone());
        }
        EditOp::InsertMethod { method } => {
            let signature = method.signature();
            if class.has_method(&signature) {
                return Err(ConflictError::DuplicateMethod {
                    target: target.clone(),
                    signature: signature.to_string(),
                });
            }
            class.methods.push(method.clone());
        }
        EditOp::InsertConstructor { constructor } => {
            let params = constructor.param_types();
            if class.has_constructor(&params) {
                return Err(ConflictError::DuplicateConstructor {
                    target: target.clone(),
                    params: join_types(&params),
                });
            }
            class.constructors.push(constructor.clone());
        }
        EditOp::DeleteConstructor { params } => {
            let before = class.constructors.len();
            class
                .constructors
                .retain(|c| c.param_types().as_slice() != params.as_slice());
            if class.constructors.len() == before {
                return Err(ConflictError::NoMatchingConstructor {
                    target: target.clone(),
                    params: join_types(params),
                });
            }
        }
    }
    Ok(())
}

fn join_types(types: &[TypeRef]) -> String {
    types
        .iter()
        .map(TypeRef::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

fn patch_label(unit: &CompilationUnit, plan: &EditPlan) -> String {
    unit.path
        .clone()
        .or_else(|| plan.target.unit_path.clone())
        .unwrap_or_else(|| {
            let root = plan.target.class.segments().first().map(String::as_str);
            format!("{}.java", root.unwrap_or("Unit"))
        })
}

fn render_patch(label: &str, before: &CompilationUnit, after: &CompilationUnit) -> String {
    let old = render_unit(before);
    let new = render_unit(after);
    if old == new {
        return String::new();
    }

    let mut out = String::new();
    out.push_str(&format!("diff --git a/{0} b/{0}\n", label));
    out.push_str(&format!("--- a/{0}\n+++ b/{0}\n", label));

    let formatter = PatchFormatter::new();
    let patch = diffy::create_patch(&old, &new);
    let body = formatter.fmt_patch(&patch).to_string();
    // diffy repeats its own ---/+++ header; keep only the hunks.
    let hunks = body
        .split_once("\n@@")
        .map(|(_, rest)| format!("@@{rest}"))
        .unwrap_or(body);
    out.push_str(&hunks);
    if !out.ends_with('\n') {
        out.push('\n');
    }
    out
}
