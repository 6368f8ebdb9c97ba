use crate::hierarchy::{find_nested, visible_fields};
use crate::ports::TypeLookup;
use crate::templates::BUILDER_CLASS;
use buildergen_types::decl::{ClassDecl, FieldDecl};
use buildergen_types::plan::FieldScope;
use std::collections::BTreeSet;
use tracing::debug;

/// Computes the fields a user may add to the builder on this run.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldEligibilityResolver {
    scope: FieldScope,
}

impl FieldEligibilityResolver {
    pub fn new(scope: FieldScope) -> Self {
        Self { scope }
    }

    pub fn scope(&self) -> FieldScope {
        self.scope
    }

    /// Fields visible on `owner`, minus those already mirrored by name on its `Builder`.
    ///
    /// Only names are compared; a builder field with a different type still excludes the
    /// owner field. Order follows [`visible_fields`].
    pub fn resolve(&self, owner: &ClassDecl, lookup: &dyn TypeLookup) -> Vec<FieldDecl> {
        let visible = visible_fields(owner, lookup, self.scope);

        let Some(builder) = find_nested(owner, BUILDER_CLASS, lookup, self.scope) else {
            debug!(
                class = owner.name.as_str(),
                candidates = visible.len(),
                "no builder yet; every visible field is eligible"
            );
            return visible.into_iter().cloned().collect();
        };

        let mirrored: BTreeSet<&str> = visible_fields(builder, lookup, self.scope)
            .into_iter()
            .map(|f| f.name.as_str())
            .collect();

        let candidates: Vec<FieldDecl> = visible
            .into_iter()
            .filter(|f| !mirrored.contains(f.name.as_str()))
            .cloned()
            .collect();

        debug!(
            class = owner.name.as_str(),
            mirrored = mirrored.len(),
            candidates = candidates.len(),
            "resolved builder candidates"
        );
        candidates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::NoTypes;
    use buildergen_types::decl::{CompilationUnit, TypeRef};
    use pretty_assertions::assert_eq;

    fn point() -> ClassDecl {
        let mut point = ClassDecl::new("Point");
        point.fields = vec![FieldDecl::new("x", "int"), FieldDecl::new("y", "int")];
        point
    }

    fn names(fields: &[FieldDecl]) -> Vec<&str> {
        fields.iter().map(|f| f.name.as_str()).collect()
    }

    #[test]
    fn without_builder_all_fields_are_candidates() {
        let resolver = FieldEligibilityResolver::default();
        assert_eq!(names(&resolver.resolve(&point(), &NoTypes)), vec!["x", "y"]);
    }

    #[test]
    fn mirrored_names_are_excluded() {
        let mut owner = point();
        let mut builder = ClassDecl::new("Builder");
        builder.fields.push(FieldDecl::new("x", "int"));
        owner.nested.push(builder);

        let resolver = FieldEligibilityResolver::default();
        assert_eq!(names(&resolver.resolve(&owner, &NoTypes)), vec!["y"]);
    }

    #[test]
    fn type_mismatch_on_builder_still_excludes() {
        let mut owner = point();
        let mut builder = ClassDecl::new("Builder");
        builder.fields.push(FieldDecl::new("y", "String"));
        owner.nested.push(builder);

        let resolver = FieldEligibilityResolver::default();
        assert_eq!(names(&resolver.resolve(&owner, &NoTypes)), vec!["x"]);
    }

    #[test]
    fn inherited_fields_follow_own_fields() {
        let mut base = ClassDecl::new("Shape");
        base.fields.push(FieldDecl::new("color", "String"));
        let mut owner = point();
        owner.extends = Some(TypeRef::new("Shape"));
        let unit = CompilationUnit::new(vec![base, owner]);

        let inherited = FieldEligibilityResolver::new(FieldScope::Inherited);
        assert_eq!(
            names(&inherited.resolve(&unit.types[1], &unit)),
            vec!["x", "y", "color"]
        );

        let declared = FieldEligibilityResolver::new(FieldScope::DeclaredOnly);
        assert_eq!(names(&declared.resolve(&unit.types[1], &unit)), vec!["x", "y"]);
    }

    #[test]
    fn resolve_does_not_mutate_and_is_repeatable() {
        let owner = point();
        let before = owner.clone();
        let resolver = FieldEligibilityResolver::default();

        let first = resolver.resolve(&owner, &NoTypes);
        let second = resolver.resolve(&owner, &NoTypes);

        assert_eq!(first, second);
        assert_eq!(owner, before);
    }
}
