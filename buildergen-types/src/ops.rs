use crate::decl::{ClassDecl, ConstructorDecl, FieldDecl, MethodDecl, TypeRef};
use serde::{Deserialize, Serialize};

/// Structural edit applied to the class addressed by the op's target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EditOp {
    InsertNestedType { class: ClassDecl },
    InsertField { field: FieldDecl },
    InsertMethod { method: MethodDecl },
    InsertConstructor { constructor: ConstructorDecl },
    /// Removes every constructor whose parameter types equal `params` exactly.
    DeleteConstructor { params: Vec<TypeRef> },
}

impl EditOp {
    pub fn label(&self) -> &'static str {
        match self {
            EditOp::InsertNestedType { .. } => "insert_nested_type",
            EditOp::InsertField { .. } => "insert_field",
            EditOp::InsertMethod { .. } => "insert_method",
            EditOp::InsertConstructor { .. } => "insert_constructor",
            EditOp::DeleteConstructor { .. } => "delete_constructor",
        }
    }

    /// Short member key used for stable ids and previews.
    pub fn member_key(&self) -> String {
        match self {
            EditOp::InsertNestedType { class } => class.name.clone(),
            EditOp::InsertField { field } => field.name.clone(),
            EditOp::InsertMethod { method } => method.signature().to_string(),
            EditOp::InsertConstructor { constructor } => {
                format!("<init>({})", join_types(&constructor.param_types()))
            }
            EditOp::DeleteConstructor { params } => format!("<init>({})", join_types(params)),
        }
    }

    pub fn is_deletion(&self) -> bool {
        matches!(self, EditOp::DeleteConstructor { .. })
    }
}

fn join_types(types: &[TypeRef]) -> String {
    types
        .iter()
        .map(TypeRef::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Which synthesis step produced an op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SynthesisStep {
    CreateBuilder,
    MirrorField,
    ReplaceConstructor,
    EnsureFactory,
}

impl SynthesisStep {
    pub fn as_str(self) -> &'static str {
        match self {
            SynthesisStep::CreateBuilder => "create_builder",
            SynthesisStep::MirrorField => "mirror_field",
            SynthesisStep::ReplaceConstructor => "replace_constructor",
            SynthesisStep::EnsureFactory => "ensure_factory",
        }
    }
}
