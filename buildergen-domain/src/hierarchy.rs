//! Superclass walks and visibility queries over a declaration tree.

use crate::ports::TypeLookup;
use buildergen_types::decl::{ClassDecl, FieldDecl};
use buildergen_types::plan::FieldScope;
use std::collections::BTreeSet;
use tracing::warn;

/// Superclasses of `class`, nearest first. Unresolvable references end the walk.
pub fn superclass_chain<'a>(class: &'a ClassDecl, lookup: &'a dyn TypeLookup) -> Vec<&'a ClassDecl> {
    let mut chain: Vec<&'a ClassDecl> = Vec::new();
    let mut current = class;

    while let Some(parent_ref) = &current.extends {
        let Some(parent) = lookup.find_class(parent_ref) else {
            break;
        };
        let seen = std::ptr::eq(parent, class) || chain.iter().any(|c| std::ptr::eq(*c, parent));
        if seen {
            warn!(
                class = class.name.as_str(),
                parent = parent_ref.as_str(),
                "inheritance cycle; stopping superclass walk"
            );
            break;
        }
        chain.push(parent);
        current = parent;
    }

    chain
}

/// Fields visible on `class` under `scope`, in declaration order.
///
/// Inherited fields follow the class's own, nearest superclass first. A field hidden by a
/// nearer declaration of the same name is left out.
pub fn visible_fields<'a>(
    class: &'a ClassDecl,
    lookup: &'a dyn TypeLookup,
    scope: FieldScope,
) -> Vec<&'a FieldDecl> {
    let mut seen: BTreeSet<&str> = BTreeSet::new();
    let mut out = Vec::new();

    for field in &class.fields {
        if seen.insert(field.name.as_str()) {
            out.push(field);
        }
    }

    if scope.includes_inherited() {
        for parent in superclass_chain(class, lookup) {
            for field in &parent.fields {
                if seen.insert(field.name.as_str()) {
                    out.push(field);
                }
            }
        }
    }

    out
}

/// Nested class `name` declared on `class` or, under the inherited scope, on a superclass.
pub fn find_nested<'a>(
    class: &'a ClassDecl,
    name: &str,
    lookup: &'a dyn TypeLookup,
    scope: FieldScope,
) -> Option<&'a ClassDecl> {
    if let Some(own) = class.nested(name) {
        return Some(own);
    }
    if !scope.includes_inherited() {
        return None;
    }
    superclass_chain(class, lookup)
        .into_iter()
        .find_map(|parent| parent.nested(name))
}
