use crate::decl::DeclPath;
use crate::plan::ToolInfo;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyReport {
    pub schema: String,
    pub tool: ToolInfo,
    pub plan_ref: PlanRef,
    pub preconditions: ApplyPreconditions,

    #[serde(default)]
    pub results: Vec<ApplyResult>,

    pub summary: ApplySummary,

    /// True once the edited tree replaced the original.
    #[serde(default)]
    pub committed: bool,

    #[serde(default)]
    pub run: ApplyRunInfo,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl ApplyReport {
    pub fn new(tool: ToolInfo, plan_ref: PlanRef) -> Self {
        Self {
            schema: crate::schema::BUILDERGEN_APPLY_V1.to_string(),
            tool,
            plan_ref,
            preconditions: ApplyPreconditions::default(),
            results: vec![],
            summary: ApplySummary::default(),
            committed: false,
            run: ApplyRunInfo::default(),
            errors: vec![],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanRef {
    pub target: DeclPath,
    pub ops: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApplyPreconditions {
    pub verified: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mismatch: Option<PreconditionMismatch>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreconditionMismatch {
    pub target: DeclPath,
    pub expected: String,
    pub actual: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyResult {
    pub op_id: String,
    pub status: ApplyStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplyStatus {
    Applied,
    Skipped,
    Failed,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplySummary {
    pub attempted: u64,
    pub applied: u64,
    pub skipped: u64,
    pub failed: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApplyRunInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
}
