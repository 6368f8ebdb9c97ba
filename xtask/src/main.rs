use anyhow::Context;
use buildergen_types::decl::{ClassDecl, CompilationUnit, FieldDecl};
use clap::{Parser, Subcommand};
use fs_err as fs;
use std::path::Path;
use std::process::Command as ProcessCommand;

#[derive(Debug, Parser)]
#[command(name = "xtask", about = "Workspace helper tasks")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print schema identifiers used by buildergen.
    PrintSchemas,
    /// Create a golden fixture skeleton under tests/fixtures/<name>.
    NewFixture {
        name: String,
        #[arg(long, default_value = "tests/fixtures")]
        dir: String,
    },
    /// Bless golden fixtures (overwrite expected outputs).
    BlessFixtures,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::PrintSchemas => {
            println!("{}", buildergen_types::schema::BUILDERGEN_UNIT_V1);
            println!("{}", buildergen_types::schema::BUILDERGEN_PLAN_V1);
            println!("{}", buildergen_types::schema::BUILDERGEN_APPLY_V1);
        }
        Command::NewFixture { name, dir } => {
            let root = Path::new(&dir).join(&name);
            if root.exists() {
                anyhow::bail!("fixture {} already exists", root.display());
            }
            fs::create_dir_all(&root).with_context(|| format!("create {}", root.display()))?;

            let mut owner = ClassDecl::new("Point");
            owner.fields = vec![FieldDecl::new("x", "int"), FieldDecl::new("y", "int")];
            let unit = CompilationUnit::new(vec![owner]);
            fs::write(
                root.join("unit.json"),
                serde_json::to_string_pretty(&unit).context("serialize unit")?,
            )?;

            let case = serde_json::json!({
                "target": "Point",
                "fields": null,
                "field_scope": "inherited",
            });
            fs::write(
                root.join("case.json"),
                serde_json::to_string_pretty(&case).context("serialize case")?,
            )?;
            println!("initialized {}/{{unit.json,case.json}}", root.display());
            println!("add a golden test for `{name}`, then run `bless-fixtures` and review expected/");
        }
        Command::BlessFixtures => {
            let status = ProcessCommand::new("cargo")
                .args(["test", "-p", "buildergen-domain", "--test", "golden_fixtures"])
                .env("BUILDERGEN_BLESS", "1")
                .status()
                .context("run golden fixture blessing")?;
            if !status.success() {
                anyhow::bail!("bless-fixtures failed");
            }
        }
    }
    Ok(())
}
