//! Canonical shapes of the generated builder members.

use buildergen_types::decl::{
    ClassDecl, ConstructorDecl, Expr, FieldDecl, MethodDecl, Modifiers, Param, Stmt, TypeRef,
};

pub const BUILDER_CLASS: &str = "Builder";
pub const BUILDER_PARAM: &str = "builder";
pub const BUILD_METHOD: &str = "build";

pub fn builder_type() -> TypeRef {
    TypeRef::new(BUILDER_CLASS)
}

/// `static final class Builder` with a private no-arg constructor, one mirror field and
/// setter per chosen field, and `build()`.
pub fn new_builder(owner: &str, chosen: &[FieldDecl]) -> ClassDecl {
    let mut builder = ClassDecl::new(BUILDER_CLASS);
    builder.modifiers = Modifiers::default().with_static().with_final();
    builder.constructors.push(ConstructorDecl {
        modifiers: Modifiers::private(),
        params: vec![],
        body: vec![],
    });
    builder.fields = chosen.iter().map(mirror_field).collect();
    builder.methods = chosen.iter().map(setter).collect();
    builder.methods.push(build_method(owner));
    builder
}

pub fn mirror_field(field: &FieldDecl) -> FieldDecl {
    FieldDecl::new(field.name.clone(), field.ty.as_str()).with_modifiers(Modifiers::private())
}

/// `public Builder x(int x) { this.x = x; return this; }`
pub fn setter(field: &FieldDecl) -> MethodDecl {
    MethodDecl {
        name: field.name.clone(),
        modifiers: Modifiers::public(),
        return_type: Some(builder_type()),
        params: vec![Param::new(field.name.clone(), field.ty.clone())],
        body: vec![
            Stmt::Assign {
                target: Expr::field(Expr::This, field.name.clone()),
                value: Expr::ident(field.name.clone()),
            },
            Stmt::Return { value: Expr::This },
        ],
    }
}

/// `public Owner build() { return new Owner(this); }`
pub fn build_method(owner: &str) -> MethodDecl {
    MethodDecl {
        name: BUILD_METHOD.to_string(),
        modifiers: Modifiers::public(),
        return_type: Some(TypeRef::new(owner)),
        params: vec![],
        body: vec![Stmt::Return {
            value: Expr::new_instance(TypeRef::new(owner), vec![Expr::This]),
        }],
    }
}

/// `private Owner(Builder builder) { this.f = builder.f; ... }`
pub fn builder_constructor(assigned: &[String]) -> ConstructorDecl {
    ConstructorDecl {
        modifiers: Modifiers::private(),
        params: vec![Param::new(BUILDER_PARAM, builder_type())],
        body: assigned
            .iter()
            .map(|name| Stmt::Assign {
                target: Expr::field(Expr::This, name.clone()),
                value: Expr::field(Expr::ident(BUILDER_PARAM), name.clone()),
            })
            .collect(),
    }
}

pub fn factory_name(owner: &str) -> String {
    format!("new{owner}")
}

/// `public static Builder newOwner() { return new Builder(); }`
pub fn factory_method(owner: &str) -> MethodDecl {
    MethodDecl {
        name: factory_name(owner),
        modifiers: Modifiers::public().with_static(),
        return_type: Some(builder_type()),
        params: vec![],
        body: vec![Stmt::Return {
            value: Expr::new_instance(builder_type(), vec![]),
        }],
    }
}

/// A constructor whose single parameter's type name is `Builder`, qualified or not.
pub fn is_builder_constructor(ctor: &ConstructorDecl) -> bool {
    ctor.sole_param_type()
        .is_some_and(|ty| ty.simple_name() == BUILDER_CLASS)
}
