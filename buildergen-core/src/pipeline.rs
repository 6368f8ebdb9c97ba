//! Candidates, plan, apply and one-shot generate pipelines.
//!
//! These entry points are I/O-agnostic: the declaration tree is read and committed through
//! [`DocumentStore`], the field choice comes from a [`FieldSelector`], and artifacts are
//! written through [`WritePort`].

use crate::locator::Target;
use crate::locks::UnitLocks;
use crate::ports::{DocumentStore, FieldSelector, Selection, WritePort};
use crate::settings::Settings;
use anyhow::Context;
use buildergen_domain::{
    BuilderSynthesizer, FieldEligibilityResolver, SynthesisConfig, SynthesisError,
};
use buildergen_edit::{
    ApplyOptions, EditError, aborted_report, apply_plan, attach_preconditions, preview_patch,
};
use buildergen_render::{render_apply_md, render_plan_md};
use buildergen_types::apply::ApplyReport;
use buildergen_types::decl::{CompilationUnit, DeclPath, FieldDecl};
use buildergen_types::plan::{EditPlan, PlanPolicy, PlanTarget, ToolInfo};
use camino::Utf8Path;
use std::sync::PoisonError;
use tracing::{debug, info};

/// Exit code 2 = policy block, 1 = everything else.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("no class found at {0}")]
    TargetNotFound(String),

    #[error(transparent)]
    Synthesis(#[from] SynthesisError),

    #[error(transparent)]
    Edit(#[from] EditError),

    #[error("{0:#}")]
    Internal(#[from] anyhow::Error),
}

impl ToolError {
    pub fn exit_code(&self) -> u8 {
        match self {
            ToolError::Edit(e) => e.exit_code(),
            ToolError::TargetNotFound(_) | ToolError::Synthesis(_) | ToolError::Internal(_) => 1,
        }
    }
}

pub struct CandidatesOutcome {
    pub class: DeclPath,
    pub candidates: Vec<FieldDecl>,
}

/// Eligible fields for the class at `target`.
pub fn run_candidates(
    settings: &Settings,
    store: &dyn DocumentStore,
    target: &Target,
) -> Result<CandidatesOutcome, ToolError> {
    let unit = store.load()?;
    let class = resolve_target(&unit, target)?;
    let candidates = candidates_for(settings, &unit, &class)?;
    Ok(CandidatesOutcome { class, candidates })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanStatus {
    Cancelled,
    NoOp,
    Planned,
}

pub struct PlanOutcome {
    pub class: DeclPath,
    pub candidates: Vec<FieldDecl>,
    pub status: PlanStatus,
    /// Empty unless `status` is `Planned`.
    pub plan: EditPlan,
    pub patch: String,
}

/// Resolve, select and synthesize without touching the store.
pub fn run_plan(
    settings: &Settings,
    store: &dyn DocumentStore,
    target: &Target,
    selector: &dyn FieldSelector,
    tool: ToolInfo,
) -> Result<PlanOutcome, ToolError> {
    let unit = store.load()?;
    let class = resolve_target(&unit, target)?;
    let candidates = candidates_for(settings, &unit, &class)?;

    let (status, plan) = match synthesize(settings, &unit, &class, &candidates, selector, &tool)? {
        Synthesized::Cancelled => (PlanStatus::Cancelled, empty_plan(settings, store, &class, tool)),
        Synthesized::Nothing => (PlanStatus::NoOp, empty_plan(settings, store, &class, tool)),
        Synthesized::Plan(mut plan) => {
            plan.target.unit_path = Some(store.describe());
            if settings.require_clean_hashes {
                attach_preconditions(&unit, &mut plan).context("attach preconditions")?;
            }
            (PlanStatus::Planned, plan)
        }
    };

    let patch = preview_patch(&unit, &plan)?;
    debug!(class = %class, ops = plan.ops.len(), status = ?status, "plan ready");

    Ok(PlanOutcome {
        class,
        candidates,
        status,
        plan,
        patch,
    })
}

/// Write `plan.json`, `plan.md` and `patch.diff` to `out_dir`.
pub fn write_plan_artifacts(
    outcome: &PlanOutcome,
    out_dir: &Utf8Path,
    writer: &dyn WritePort,
) -> anyhow::Result<()> {
    writer.create_dir_all(out_dir)?;

    let plan_json = serde_json::to_string_pretty(&outcome.plan).context("serialize plan")?;
    writer.write_file(&out_dir.join("plan.json"), plan_json.as_bytes())?;

    let plan_md = render_plan_md(&outcome.plan);
    writer.write_file(&out_dir.join("plan.md"), plan_md.as_bytes())?;

    writer.write_file(&out_dir.join("patch.diff"), outcome.patch.as_bytes())?;
    Ok(())
}

pub struct ApplyOutcome {
    pub report: ApplyReport,
    pub patch: String,
    /// Why nothing was committed, when the transaction was abandoned.
    pub blocked: Option<EditError>,
}

/// Apply a saved plan and commit the result through the store.
///
/// A stale plan, a conflicting op or a refused commit is not an `Err`: it comes back in
/// `blocked` alongside a report so the caller can still write artifacts.
pub fn run_apply(
    settings: &Settings,
    store: &dyn DocumentStore,
    plan: &EditPlan,
    tool: ToolInfo,
) -> Result<ApplyOutcome, ToolError> {
    let mut unit = store.load()?;
    let opts = ApplyOptions {
        dry_run: settings.dry_run,
        require_clean_hashes: settings.require_clean_hashes,
    };

    match apply_plan(&mut unit, plan, tool.clone(), &opts) {
        Ok((mut report, patch)) => {
            let mut blocked = None;
            if report.committed
                && let Err(err) = store.commit(&unit)
            {
                report.committed = false;
                report.errors.push(err.to_string());
                blocked = Some(err);
            }
            Ok(ApplyOutcome {
                report,
                patch,
                blocked,
            })
        }
        Err(err) => {
            debug!(error = %err, "apply aborted");
            Ok(ApplyOutcome {
                report: aborted_report(plan, tool, &err),
                patch: String::new(),
                blocked: Some(err),
            })
        }
    }
}

/// Write `apply.json`, `apply.md` and `patch.diff` to `out_dir`.
pub fn write_apply_artifacts(
    outcome: &ApplyOutcome,
    out_dir: &Utf8Path,
    writer: &dyn WritePort,
) -> anyhow::Result<()> {
    writer.create_dir_all(out_dir)?;

    let apply_json = serde_json::to_string_pretty(&outcome.report).context("serialize apply")?;
    writer.write_file(&out_dir.join("apply.json"), apply_json.as_bytes())?;

    let apply_md = render_apply_md(&outcome.report);
    writer.write_file(&out_dir.join("apply.md"), apply_md.as_bytes())?;

    writer.write_file(&out_dir.join("patch.diff"), outcome.patch.as_bytes())?;
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerateStatus {
    Cancelled,
    NoOp,
    DryRun,
    Committed,
}

pub struct GenerateOutcome {
    pub class: DeclPath,
    pub status: GenerateStatus,
    pub plan: Option<EditPlan>,
    pub report: Option<ApplyReport>,
    pub patch: String,
}

/// Locate, resolve, select, synthesize, apply and commit in one transaction.
///
/// The store's lock is held from the first read of the unit through the commit, so
/// concurrent callers on the same unit, whatever class they target, see each other's results.
pub fn run_generate(
    settings: &Settings,
    store: &dyn DocumentStore,
    target: &Target,
    selector: &dyn FieldSelector,
    tool: ToolInfo,
    locks: &UnitLocks,
) -> Result<GenerateOutcome, ToolError> {
    let lock = locks.lock_for(&store.describe());
    let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

    let mut unit = store.load()?;
    let class = resolve_target(&unit, target)?;
    let candidates = candidates_for(settings, &unit, &class)?;

    let mut plan = match synthesize(settings, &unit, &class, &candidates, selector, &tool)? {
        Synthesized::Cancelled => return Ok(unchanged(class, GenerateStatus::Cancelled)),
        Synthesized::Nothing => return Ok(unchanged(class, GenerateStatus::NoOp)),
        Synthesized::Plan(plan) => plan,
    };
    plan.target.unit_path = Some(store.describe());
    attach_preconditions(&unit, &mut plan).context("attach preconditions")?;

    let opts = ApplyOptions {
        dry_run: settings.dry_run,
        require_clean_hashes: true,
    };
    let (report, patch) = apply_plan(&mut unit, &plan, tool, &opts)?;

    let status = if settings.dry_run {
        GenerateStatus::DryRun
    } else {
        store.commit(&unit)?;
        info!(
            class = %class,
            store = store.describe().as_str(),
            ops = plan.ops.len(),
            "builder committed"
        );
        GenerateStatus::Committed
    };

    Ok(GenerateOutcome {
        class,
        status,
        plan: Some(plan),
        report: Some(report),
        patch,
    })
}

enum Synthesized {
    Cancelled,
    Nothing,
    Plan(EditPlan),
}

fn resolve_target(unit: &CompilationUnit, target: &Target) -> Result<DeclPath, ToolError> {
    target
        .resolve(unit)
        .ok_or_else(|| ToolError::TargetNotFound(target.to_string()))
}

fn candidates_for(
    settings: &Settings,
    unit: &CompilationUnit,
    class: &DeclPath,
) -> Result<Vec<FieldDecl>, ToolError> {
    let owner = unit
        .class_at(class)
        .ok_or_else(|| ToolError::TargetNotFound(class.to_string()))?;
    Ok(FieldEligibilityResolver::new(settings.field_scope).resolve(owner, unit))
}

fn synthesize(
    settings: &Settings,
    unit: &CompilationUnit,
    class: &DeclPath,
    candidates: &[FieldDecl],
    selector: &dyn FieldSelector,
    tool: &ToolInfo,
) -> Result<Synthesized, ToolError> {
    let chosen = match selector.select(candidates) {
        Selection::Cancelled => {
            debug!(class = %class, "selection cancelled");
            return Ok(Synthesized::Cancelled);
        }
        Selection::Chosen(chosen) => chosen,
    };

    let owner = unit
        .class_at(class)
        .ok_or_else(|| ToolError::TargetNotFound(class.to_string()))?;
    let synth = BuilderSynthesizer::new(
        SynthesisConfig {
            field_scope: settings.field_scope,
        },
        tool.clone(),
    );
    Ok(match synth.synthesize(class, owner, &chosen)? {
        Some(plan) => Synthesized::Plan(plan),
        None => Synthesized::Nothing,
    })
}

fn empty_plan(
    settings: &Settings,
    store: &dyn DocumentStore,
    class: &DeclPath,
    tool: ToolInfo,
) -> EditPlan {
    EditPlan::new(
        tool,
        PlanTarget {
            class: class.clone(),
            unit_path: Some(store.describe()),
        },
        PlanPolicy {
            field_scope: settings.field_scope,
        },
    )
}

fn unchanged(class: DeclPath, status: GenerateStatus) -> GenerateOutcome {
    GenerateOutcome {
        class,
        status,
        plan: None,
        report: None,
        patch: String::new(),
    }
}
