//! Declaration tree: the host-owned structure buildergen reads and edits.
//!
//! The tree is deliberately syntax-light. Type descriptors are opaque tokens that
//! are re-emitted verbatim, and statement bodies only model the shapes the
//! synthesizer produces; anything else is carried as a raw statement.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    #[default]
    Package,
    Private,
    Protected,
    Public,
}

impl Visibility {
    pub fn keyword(self) -> Option<&'static str> {
        match self {
            Visibility::Package => None,
            Visibility::Private => Some("private"),
            Visibility::Protected => Some("protected"),
            Visibility::Public => Some("public"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Modifiers {
    #[serde(default)]
    pub visibility: Visibility,

    #[serde(default, skip_serializing_if = "is_false")]
    pub is_static: bool,

    #[serde(default, skip_serializing_if = "is_false")]
    pub is_final: bool,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl Modifiers {
    pub fn private() -> Self {
        Self {
            visibility: Visibility::Private,
            ..Self::default()
        }
    }

    pub fn public() -> Self {
        Self {
            visibility: Visibility::Public,
            ..Self::default()
        }
    }

    pub fn with_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    pub fn with_final(mut self) -> Self {
        self.is_final = true;
        self
    }
}

/// Opaque type descriptor, e.g. `int`, `String`, `Point.Builder`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeRef(pub String);

impl TypeRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last dot-separated segment: `Point.Builder` -> `Builder`.
    pub fn simple_name(&self) -> &str {
        let s = self.0.trim();
        s.rsplit('.').next().unwrap_or(s)
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Half-open byte range `[start, end)` of a declaration within its source unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset < self.end
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDecl {
    pub name: String,

    #[serde(rename = "type")]
    pub ty: TypeRef,

    #[serde(default)]
    pub modifiers: Modifiers,
}

impl FieldDecl {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: TypeRef::new(ty),
            modifiers: Modifiers::default(),
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,

    #[serde(rename = "type")]
    pub ty: TypeRef,
}

impl Param {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Expr {
    This,
    Ident {
        name: String,
    },
    Field {
        receiver: Box<Expr>,
        name: String,
    },
    New {
        #[serde(rename = "type")]
        ty: TypeRef,
        #[serde(default)]
        args: Vec<Expr>,
    },
}

impl Expr {
    pub fn ident(name: impl Into<String>) -> Self {
        Expr::Ident { name: name.into() }
    }

    pub fn field(receiver: Expr, name: impl Into<String>) -> Self {
        Expr::Field {
            receiver: Box::new(receiver),
            name: name.into(),
        }
    }

    pub fn new_instance(ty: TypeRef, args: Vec<Expr>) -> Self {
        Expr::New { ty, args }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Stmt {
    Assign { target: Expr, value: Expr },
    Return { value: Expr },
    /// Hand-written code carried through untouched.
    Raw { text: String },
}

/// Name plus parameter types; the identity used for duplicate detection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Signature {
    pub name: String,
    pub params: Vec<TypeRef>,
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params: Vec<&str> = self.params.iter().map(TypeRef::as_str).collect();
        write!(f, "{}({})", self.name, params.join(", "))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDecl {
    pub name: String,

    #[serde(default)]
    pub modifiers: Modifiers,

    /// `None` renders as `void`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_type: Option<TypeRef>,

    #[serde(default)]
    pub params: Vec<Param>,

    #[serde(default)]
    pub body: Vec<Stmt>,
}

impl MethodDecl {
    pub fn signature(&self) -> Signature {
        Signature {
            name: self.name.clone(),
            params: self.params.iter().map(|p| p.ty.clone()).collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstructorDecl {
    #[serde(default)]
    pub modifiers: Modifiers,

    #[serde(default)]
    pub params: Vec<Param>,

    #[serde(default)]
    pub body: Vec<Stmt>,
}

impl ConstructorDecl {
    pub fn param_types(&self) -> Vec<TypeRef> {
        self.params.iter().map(|p| p.ty.clone()).collect()
    }

    /// The parameter type when the constructor takes exactly one parameter.
    pub fn sole_param_type(&self) -> Option<&TypeRef> {
        match self.params.as_slice() {
            [only] => Some(&only.ty),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDecl {
    pub name: String,

    #[serde(default)]
    pub modifiers: Modifiers,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extends: Option<TypeRef>,

    #[serde(default)]
    pub fields: Vec<FieldDecl>,

    #[serde(default)]
    pub constructors: Vec<ConstructorDecl>,

    #[serde(default)]
    pub methods: Vec<MethodDecl>,

    /// Nested classes; names are unique within one declaration.
    #[serde(default)]
    pub nested: Vec<ClassDecl>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,
}

impl ClassDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            modifiers: Modifiers::default(),
            extends: None,
            fields: vec![],
            constructors: vec![],
            methods: vec![],
            nested: vec![],
            span: None,
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldDecl> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn nested(&self, name: &str) -> Option<&ClassDecl> {
        self.nested.iter().find(|c| c.name == name)
    }

    pub fn nested_mut(&mut self, name: &str) -> Option<&mut ClassDecl> {
        self.nested.iter_mut().find(|c| c.name == name)
    }

    pub fn has_method(&self, signature: &Signature) -> bool {
        self.methods.iter().any(|m| &m.signature() == signature)
    }

    pub fn has_constructor(&self, params: &[TypeRef]) -> bool {
        self.constructors
            .iter()
            .any(|c| c.param_types().as_slice() == params)
    }
}

/// Address of a class from the unit root, e.g. `Point` or `Point.Builder`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeclPath(Vec<String>);

impl DeclPath {
    pub fn root(name: impl Into<String>) -> Self {
        Self(vec![name.into()])
    }

    /// Parse a dot-separated path. Empty segments are rejected.
    pub fn parse(s: &str) -> Option<Self> {
        let segments: Vec<String> = s.split('.').map(|p| p.trim().to_string()).collect();
        if segments.iter().any(|p| p.is_empty()) {
            return None;
        }
        Some(Self(segments))
    }

    pub fn child(&self, name: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(name.into());
        Self(segments)
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn leaf(&self) -> &str {
        self.0.last().map(String::as_str).unwrap_or_default()
    }
}

impl fmt::Display for DeclPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

fn default_unit_schema() -> String {
    crate::schema::BUILDERGEN_UNIT_V1.to_string()
}

/// One source unit: the root of a declaration tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilationUnit {
    #[serde(default = "default_unit_schema")]
    pub schema: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(default)]
    pub types: Vec<ClassDecl>,
}

impl CompilationUnit {
    pub fn new(types: Vec<ClassDecl>) -> Self {
        Self {
            schema: default_unit_schema(),
            path: None,
            types,
        }
    }

    pub fn class_at(&self, path: &DeclPath) -> Option<&ClassDecl> {
        let (first, rest) = path.segments().split_first()?;
        let mut cur = self.types.iter().find(|c| &c.name == first)?;
        for seg in rest {
            cur = cur.nested(seg)?;
        }
        Some(cur)
    }

    pub fn class_at_mut(&mut self, path: &DeclPath) -> Option<&mut ClassDecl> {
        let (first, rest) = path.segments().split_first()?;
        let mut cur = self.types.iter_mut().find(|c| &c.name == first)?;
        for seg in rest {
            cur = cur.nested_mut(seg)?;
        }
        Some(cur)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_name_strips_qualifier() {
        assert_eq!(TypeRef::new("Builder").simple_name(), "Builder");
        assert_eq!(TypeRef::new("Point.Builder").simple_name(), "Builder");
        assert_eq!(TypeRef::new(" com.acme.Point.Builder ").simple_name(), "Builder");
    }

    #[test]
    fn decl_path_parse_and_display() {
        let p = DeclPath::parse("Point.Builder").expect("path");
        assert_eq!(p.segments(), &["Point".to_string(), "Builder".to_string()]);
        assert_eq!(p.leaf(), "Builder");
        assert_eq!(p.to_string(), "Point.Builder");
        assert!(DeclPath::parse("Point..Builder").is_none());
        assert!(DeclPath::parse("").is_none());
    }

    #[test]
    fn class_at_walks_nested() {
        let mut outer = ClassDecl::new("Point");
        outer.nested.push(ClassDecl::new("Builder"));
        let mut unit = CompilationUnit::new(vec![outer]);

        let path = DeclPath::root("Point").child("Builder");
        assert_eq!(unit.class_at(&path).map(|c| c.name.as_str()), Some("Builder"));
        assert!(unit.class_at(&DeclPath::root("Missing")).is_none());

        unit.class_at_mut(&path)
            .expect("builder")
            .fields
            .push(FieldDecl::new("x", "int"));
        assert!(unit.class_at(&path).and_then(|c| c.field("x")).is_some());
    }

    #[test]
    fn span_contains_is_half_open() {
        let span = Span::new(10, 20);
        assert!(span.contains(10));
        assert!(span.contains(19));
        assert!(!span.contains(20));
        assert_eq!(span.len(), 10);
        assert!(Span::new(5, 5).is_empty());
    }

    #[test]
    fn signature_display() {
        let sig = Signature {
            name: "of".to_string(),
            params: vec![TypeRef::new("int"), TypeRef::new("String")],
        };
        assert_eq!(sig.to_string(), "of(int, String)");
    }
}
