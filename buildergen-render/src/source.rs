//! Java-like source printer for declaration trees.
//!
//! Members print as fields, constructors, methods, then nested classes, each group in
//! declaration order. The output is what previews and diffs are computed over.

use buildergen_types::decl::{
    ClassDecl, CompilationUnit, ConstructorDecl, Expr, FieldDecl, MethodDecl, Modifiers, Param,
    Stmt,
};

const INDENT: &str = "    ";

pub fn render_unit(unit: &CompilationUnit) -> String {
    let blocks: Vec<String> = unit
        .types
        .iter()
        .map(|class| join_lines(&class_lines(class, 0)))
        .collect();
    blocks.join("\n")
}

pub fn render_class(class: &ClassDecl) -> String {
    join_lines(&class_lines(class, 0))
}

fn join_lines(lines: &[String]) -> String {
    let mut out = String::new();
    for line in lines {
        out.push_str(line);
        out.push('\n');
    }
    out
}

fn class_lines(class: &ClassDecl, depth: usize) -> Vec<String> {
    let pad = INDENT.repeat(depth);
    let mut header = format!("{pad}{}class {}", modifiers(&class.modifiers), class.name);
    if let Some(parent) = &class.extends {
        header.push_str(&format!(" extends {parent}"));
    }
    header.push_str(" {");

    let mut blocks: Vec<Vec<String>> = Vec::new();
    if !class.fields.is_empty() {
        blocks.push(
            class
                .fields
                .iter()
                .map(|f| field_line(f, depth + 1))
                .collect(),
        );
    }
    for ctor in &class.constructors {
        blocks.push(constructor_lines(&class.name, ctor, depth + 1));
    }
    for method in &class.methods {
        blocks.push(method_lines(method, depth + 1));
    }
    for nested in &class.nested {
        blocks.push(class_lines(nested, depth + 1));
    }

    let mut lines = vec![header];
    for (i, block) in blocks.into_iter().enumerate() {
        if i > 0 {
            lines.push(String::new());
        }
        lines.extend(block);
    }
    lines.push(format!("{pad}}}"));
    lines
}

fn modifiers(m: &Modifiers) -> String {
    let mut out = String::new();
    if let Some(kw) = m.visibility.keyword() {
        out.push_str(kw);
        out.push(' ');
    }
    if m.is_static {
        out.push_str("static ");
    }
    if m.is_final {
        out.push_str("final ");
    }
    out
}

fn field_line(field: &FieldDecl, depth: usize) -> String {
    format!(
        "{}{}{} {};",
        INDENT.repeat(depth),
        modifiers(&field.modifiers),
        field.ty,
        field.name
    )
}

fn params(params: &[Param]) -> String {
    params
        .iter()
        .map(|p| format!("{} {}", p.ty, p.name))
        .collect::<Vec<_>>()
        .join(", ")
}

fn constructor_lines(owner: &str, ctor: &ConstructorDecl, depth: usize) -> Vec<String> {
    let head = format!(
        "{}{}{}({})",
        INDENT.repeat(depth),
        modifiers(&ctor.modifiers),
        owner,
        params(&ctor.params)
    );
    body_lines(head, &ctor.body, depth)
}

fn method_lines(method: &MethodDecl, depth: usize) -> Vec<String> {
    let ret = method
        .return_type
        .as_ref()
        .map(|t| t.as_str())
        .unwrap_or("void");
    let head = format!(
        "{}{}{} {}({})",
        INDENT.repeat(depth),
        modifiers(&method.modifiers),
        ret,
        method.name,
        params(&method.params)
    );
    body_lines(head, &method.body, depth)
}

fn body_lines(head: String, body: &[Stmt], depth: usize) -> Vec<String> {
    if body.is_empty() {
        return vec![format!("{head} {{}}")];
    }
    let inner = INDENT.repeat(depth + 1);
    let mut lines = vec![format!("{head} {{")];
    for stmt in body {
        match stmt {
            Stmt::Raw { text } => {
                for raw in text.lines() {
                    lines.push(format!("{inner}{}", raw.trim_end()));
                }
            }
            other => lines.push(format!("{inner}{}", stmt_text(other))),
        }
    }
    lines.push(format!("{}}}", INDENT.repeat(depth)));
    lines
}

fn stmt_text(stmt: &Stmt) -> String {
    match stmt {
        Stmt::Assign { target, value } => format!("{} = {};", expr(target), expr(value)),
        Stmt::Return { value } => format!("return {};", expr(value)),
        Stmt::Raw { text } => text.clone(),
    }
}

fn expr(e: &Expr) -> String {
    match e {
        Expr::This => "this".to_string(),
        Expr::Ident { name } => name.clone(),
        Expr::Field { receiver, name } => format!("{}.{}", expr(receiver), name),
        Expr::New { ty, args } => {
            let args: Vec<String> = args.iter().map(expr).collect();
            format!("new {}({})", ty, args.join(", "))
        }
    }
}
