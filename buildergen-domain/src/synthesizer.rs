use crate::templates::{self, BUILDER_CLASS};
use buildergen_types::decl::{ClassDecl, DeclPath, FieldDecl, TypeRef};
use buildergen_types::ops::{EditOp, SynthesisStep};
use buildergen_types::plan::{
    EditPlan, FieldScope, PlanOp, PlanPolicy, PlanSummary, PlanTarget, Rationale, ToolInfo,
};
use std::collections::BTreeSet;
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

/// Rejected selections. Both indicate the caller skipped the eligibility step.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SynthesisError {
    #[error("field `{field}` is already mirrored on `{builder}`")]
    AlreadyMirrored { field: String, builder: DeclPath },

    #[error("field `{field}` was chosen more than once")]
    DuplicateChoice { field: String },
}

#[derive(Debug, Clone, Default)]
pub struct SynthesisConfig {
    pub field_scope: FieldScope,
}

/// Turns an owner class and a confirmed field selection into one edit plan.
pub struct BuilderSynthesizer {
    config: SynthesisConfig,
    tool: ToolInfo,
}

impl BuilderSynthesizer {
    pub fn new(config: SynthesisConfig, tool: ToolInfo) -> Self {
        Self { config, tool }
    }

    /// Plans the builder edits for `owner`, addressed by `target`.
    ///
    /// Returns `Ok(None)` for an empty selection. Ops are ordered: builder type (or its
    /// field and setter insertions), stale constructor deletions, the fresh builder
    /// constructor, then the factory when it is missing.
    pub fn synthesize(
        &self,
        target: &DeclPath,
        owner: &ClassDecl,
        chosen: &[FieldDecl],
    ) -> Result<Option<EditPlan>, SynthesisError> {
        if chosen.is_empty() {
            debug!(class = %target, "empty selection; nothing to synthesize");
            return Ok(None);
        }

        let mut seen = BTreeSet::new();
        for field in chosen {
            if !seen.insert(field.name.as_str()) {
                return Err(SynthesisError::DuplicateChoice {
                    field: field.name.clone(),
                });
            }
        }

        let builder_path = target.child(BUILDER_CLASS);
        let mut ops: Vec<PlanOp> = Vec::new();
        let mut summary = PlanSummary::default();

        let assigned: Vec<String> = match owner.nested(BUILDER_CLASS) {
            None => {
                ops.push(plan_op(
                    target,
                    EditOp::InsertNestedType {
                        class: templates::new_builder(&owner.name, chosen),
                    },
                    SynthesisStep::CreateBuilder,
                    format!("create {BUILDER_CLASS} with {} field(s)", chosen.len()),
                ));
                summary.builder_created = true;
                summary.fields_added = chosen.len() as u64;
                chosen.iter().map(|f| f.name.clone()).collect()
            }
            Some(existing) => {
                if let Some(field) = chosen.iter().find(|f| existing.field(&f.name).is_some()) {
                    return Err(SynthesisError::AlreadyMirrored {
                        field: field.name.clone(),
                        builder: builder_path,
                    });
                }

                for field in chosen {
                    ops.push(plan_op(
                        &builder_path,
                        EditOp::InsertField {
                            field: templates::mirror_field(field),
                        },
                        SynthesisStep::MirrorField,
                        format!("mirror `{}`", field.name),
                    ));

                    let setter = templates::setter(field);
                    if existing.has_method(&setter.signature()) {
                        debug!(setter = %setter.signature(), "setter already present; keeping it");
                    } else {
                        ops.push(plan_op(
                            &builder_path,
                            EditOp::InsertMethod { method: setter },
                            SynthesisStep::MirrorField,
                            format!("setter for `{}`", field.name),
                        ));
                    }
                }
                summary.fields_added = chosen.len() as u64;

                existing
                    .fields
                    .iter()
                    .chain(chosen)
                    .map(|f| f.name.clone())
                    .collect()
            }
        };

        let stale: Vec<Vec<TypeRef>> = owner
            .constructors
            .iter()
            .filter(|c| templates::is_builder_constructor(c))
            .map(|c| c.param_types())
            .collect();
        if stale.len() > 1 {
            warn!(
                class = %target,
                count = stale.len(),
                "several builder constructors found; replacing all of them"
            );
        }
        let distinct: BTreeSet<Vec<TypeRef>> = stale.iter().cloned().collect();
        for params in distinct {
            ops.push(plan_op(
                target,
                EditOp::DeleteConstructor { params },
                SynthesisStep::ReplaceConstructor,
                "drop stale builder constructor".to_string(),
            ));
        }
        summary.constructors_removed = stale.len() as u64;

        ops.push(plan_op(
            target,
            EditOp::InsertConstructor {
                constructor: templates::builder_constructor(&assigned),
            },
            SynthesisStep::ReplaceConstructor,
            format!("assign {} field(s) from builder", assigned.len()),
        ));

        let factory = templates::factory_method(&owner.name);
        if owner.has_method(&factory.signature()) {
            debug!(factory = %factory.signature(), "factory already present");
        } else {
            ops.push(plan_op(
                target,
                EditOp::InsertMethod { method: factory },
                SynthesisStep::EnsureFactory,
                format!("add {}()", templates::factory_name(&owner.name)),
            ));
            summary.factory_added = true;
        }

        summary.ops_total = ops.len() as u64;
        summary.assigned_fields = assigned;

        let plan_target = PlanTarget {
            class: target.clone(),
            unit_path: None,
        };
        let policy = PlanPolicy {
            field_scope: self.config.field_scope,
        };
        let mut plan = EditPlan::new(self.tool.clone(), plan_target, policy);
        plan.ops = ops;
        plan.summary = summary;

        debug!(
            class = %target,
            ops = plan.summary.ops_total,
            builder_created = plan.summary.builder_created,
            "synthesized builder plan"
        );
        Ok(Some(plan))
    }
}

fn plan_op(target: &DeclPath, kind: EditOp, step: SynthesisStep, description: String) -> PlanOp {
    PlanOp {
        id: deterministic_op_id(target, &kind, step).to_string(),
        target: target.clone(),
        kind,
        rationale: Rationale {
            step,
            description: Some(description),
        },
    }
}

fn deterministic_op_id(target: &DeclPath, kind: &EditOp, step: SynthesisStep) -> Uuid {
    const NAMESPACE: Uuid = Uuid::from_bytes([
        0x4b, 0x5d, 0x35, 0x58, 0x06, 0x58, 0x4c, 0x05, 0x8e, 0x8c, 0x0b, 0x1a, 0x44, 0x53, 0x52,
        0xd1,
    ]);

    let stable_key = format!(
        "{}|{}|{}|{}",
        target,
        kind.label(),
        kind.member_key(),
        step.as_str()
    );
    Uuid::new_v5(&NAMESPACE, stable_key.as_bytes())
}
