#![no_main]

//! Fuzz target for incremental synthesis.
//!
//! Two rounds over an arbitrary field set must converge: one builder constructor
//! assigning every mirrored field, one factory, and nothing left to add.

use buildergen_domain::templates::{factory_name, is_builder_constructor};
use buildergen_domain::{BuilderSynthesizer, FieldEligibilityResolver, SynthesisConfig};
use buildergen_edit::{ApplyOptions, apply_plan};
use buildergen_types::decl::{ClassDecl, CompilationUnit, DeclPath, FieldDecl};
use buildergen_types::plan::{FieldScope, ToolInfo};
use libfuzzer_sys::fuzz_target;
use std::collections::BTreeSet;

#[derive(Debug, arbitrary::Arbitrary)]
struct FuzzInput {
    fields: Vec<(String, bool)>,
}

fn is_ident(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        && s != "Builder"
}

fn tool() -> ToolInfo {
    ToolInfo {
        name: "buildergen-fuzz".to_string(),
        version: None,
    }
}

fn round(unit: &mut CompilationUnit, target: &DeclPath, pick: &BTreeSet<String>) {
    let synth = BuilderSynthesizer::new(SynthesisConfig::default(), tool());
    let Some(owner) = unit.class_at(target) else {
        return;
    };
    let chosen: Vec<FieldDecl> = FieldEligibilityResolver::new(FieldScope::Inherited)
        .resolve(owner, unit)
        .into_iter()
        .filter(|f| pick.contains(&f.name))
        .collect();
    let plan = synth
        .synthesize(target, owner, &chosen)
        .expect("eligible choice never conflicts");
    if let Some(plan) = plan {
        apply_plan(unit, &plan, tool(), &ApplyOptions::default()).expect("fresh plan applies");
    }
}

fuzz_target!(|input: FuzzInput| {
    let mut seen = BTreeSet::new();
    let mut first = BTreeSet::new();
    let mut second = BTreeSet::new();
    for (name, early) in input.fields.into_iter().take(16) {
        if !is_ident(&name) || !seen.insert(name.clone()) {
            continue;
        }
        if early {
            first.insert(name);
        } else {
            second.insert(name);
        }
    }

    let mut owner = ClassDecl::new("Point");
    owner.fields = seen.iter().map(|n| FieldDecl::new(n.clone(), "int")).collect();
    let mut unit = CompilationUnit::new(vec![owner]);
    let target = DeclPath::root("Point");

    round(&mut unit, &target, &first);
    round(&mut unit, &target, &second);

    let owner = unit.class_at(&target).expect("owner survives");
    let left = FieldEligibilityResolver::new(FieldScope::Inherited).resolve(owner, &unit);
    assert!(left.is_empty(), "unmirrored fields left: {left:?}");

    if seen.is_empty() {
        assert!(owner.nested.is_empty());
        return;
    }

    let ctors: Vec<_> = owner
        .constructors
        .iter()
        .filter(|c| is_builder_constructor(c))
        .collect();
    assert_eq!(ctors.len(), 1);
    assert_eq!(ctors[0].body.len(), seen.len());

    let factory = factory_name("Point");
    assert_eq!(owner.methods.iter().filter(|m| m.name == factory).count(), 1);
});
