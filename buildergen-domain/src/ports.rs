use buildergen_types::decl::{ClassDecl, CompilationUnit, DeclPath, TypeRef};

/// Read-only type resolution used when walking superclass chains.
///
/// buildergen-domain only needs to turn an `extends` reference back into a declaration,
/// so hosts with a richer symbol table can plug it in here.
pub trait TypeLookup {
    fn find_class(&self, ty: &TypeRef) -> Option<&ClassDecl>;
}

/// Resolves against a single compilation unit.
///
/// A dotted reference is tried as a declaration path first; otherwise the first class
/// (pre-order) whose name equals the reference's simple name wins.
impl TypeLookup for CompilationUnit {
    fn find_class(&self, ty: &TypeRef) -> Option<&ClassDecl> {
        if let Some(path) = DeclPath::parse(ty.as_str().trim())
            && let Some(class) = self.class_at(&path)
        {
            return Some(class);
        }
        find_by_name(&self.types, ty.simple_name())
    }
}

fn find_by_name<'a>(classes: &'a [ClassDecl], name: &str) -> Option<&'a ClassDecl> {
    for class in classes {
        if class.name == name {
            return Some(class);
        }
        if let Some(found) = find_by_name(&class.nested, name) {
            return Some(found);
        }
    }
    None
}

/// Lookup that knows no types; hierarchy walks stop at the class itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTypes;

impl TypeLookup for NoTypes {
    fn find_class(&self, _ty: &TypeRef) -> Option<&ClassDecl> {
        None
    }
}
