use crate::decl::DeclPath;
use crate::ops::{EditOp, SynthesisStep};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Which fields count as visible on a class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldScope {
    /// Own fields followed by the superclass chain's fields.
    #[default]
    Inherited,
    /// Own fields only; nested-type lookup is restricted the same way.
    DeclaredOnly,
}

impl FieldScope {
    pub fn includes_inherited(self) -> bool {
        matches!(self, FieldScope::Inherited)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditPlan {
    pub schema: String,
    pub tool: ToolInfo,
    pub target: PlanTarget,

    #[serde(default)]
    pub policy: PlanPolicy,

    #[serde(default)]
    pub preconditions: PlanPreconditions,

    #[serde(default)]
    pub ops: Vec<PlanOp>,

    pub summary: PlanSummary,
}

impl EditPlan {
    pub fn new(tool: ToolInfo, target: PlanTarget, policy: PlanPolicy) -> Self {
        Self {
            schema: crate::schema::BUILDERGEN_PLAN_V1.to_string(),
            tool,
            target,
            policy,
            preconditions: PlanPreconditions::default(),
            ops: vec![],
            summary: PlanSummary::default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanTarget {
    /// Owner class the builder is synthesized for.
    pub class: DeclPath,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_path: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlanPolicy {
    #[serde(default)]
    pub field_scope: FieldScope,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlanPreconditions {
    /// sha256 of the owner class's canonical JSON at planning time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_sha256: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanSummary {
    pub ops_total: u64,
    pub builder_created: bool,
    pub fields_added: u64,
    pub constructors_removed: u64,
    pub factory_added: bool,

    /// Fields the regenerated builder constructor assigns, in order.
    #[serde(default)]
    pub assigned_fields: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanOp {
    pub id: String,
    pub target: DeclPath,
    pub kind: EditOp,
    pub rationale: Rationale,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rationale {
    pub step: SynthesisStep,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}
