//! Map a caret offset or a dotted name onto a class in the unit.

use buildergen_types::decl::{ClassDecl, CompilationUnit, DeclPath};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Byte offset within the source unit.
    Offset(usize),
    /// Dotted class path, e.g. `Outer.Inner`.
    Path(String),
}

impl Target {
    pub fn resolve(&self, unit: &CompilationUnit) -> Option<DeclPath> {
        match self {
            Target::Offset(offset) => locate_class_at(unit, *offset),
            Target::Path(path) => find_class(unit, path),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Offset(offset) => write!(f, "offset {offset}"),
            Target::Path(path) => write!(f, "class `{path}`"),
        }
    }
}

/// Innermost class whose span contains `offset`. Classes without a span never match.
pub fn locate_class_at(unit: &CompilationUnit, offset: usize) -> Option<DeclPath> {
    innermost(&unit.types, offset, None)
}

fn innermost(classes: &[ClassDecl], offset: usize, parent: Option<&DeclPath>) -> Option<DeclPath> {
    for class in classes {
        let Some(span) = class.span else {
            continue;
        };
        if !span.contains(offset) {
            continue;
        }
        let path = match parent {
            Some(p) => p.child(class.name.clone()),
            None => DeclPath::root(class.name.clone()),
        };
        return innermost(&class.nested, offset, Some(&path)).or(Some(path));
    }
    None
}

pub fn find_class(unit: &CompilationUnit, path: &str) -> Option<DeclPath> {
    let path = DeclPath::parse(path)?;
    unit.class_at(&path).map(|_| path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use buildergen_types::decl::Span;

    fn unit() -> CompilationUnit {
        let mut inner = ClassDecl::new("Inner");
        inner.span = Some(Span::new(40, 80));
        let mut outer = ClassDecl::new("Outer");
        outer.span = Some(Span::new(0, 120));
        outer.nested.push(inner);
        let mut other = ClassDecl::new("Other");
        other.span = Some(Span::new(130, 160));
        CompilationUnit::new(vec![outer, other])
    }

    #[test]
    fn offset_picks_innermost_class() {
        let unit = unit();
        assert_eq!(
            locate_class_at(&unit, 50).map(|p| p.to_string()),
            Some("Outer.Inner".to_string())
        );
        assert_eq!(
            locate_class_at(&unit, 10).map(|p| p.to_string()),
            Some("Outer".to_string())
        );
        assert_eq!(
            locate_class_at(&unit, 140).map(|p| p.to_string()),
            Some("Other".to_string())
        );
    }

    #[test]
    fn offset_outside_every_class_is_unavailable() {
        let unit = unit();
        assert!(locate_class_at(&unit, 125).is_none());
        assert!(locate_class_at(&unit, 500).is_none());
    }

    #[test]
    fn path_targets_must_exist() {
        let unit = unit();
        assert!(find_class(&unit, "Outer.Inner").is_some());
        assert!(find_class(&unit, "Outer.Missing").is_none());
        assert!(Target::Path("Inner".to_string()).resolve(&unit).is_none());
        assert_eq!(
            Target::Offset(45).resolve(&unit),
            Some(DeclPath::root("Outer").child("Inner"))
        );
    }
}
