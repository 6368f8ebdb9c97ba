use anyhow::Context;
use buildergen_cli::config::{self, ConfigMerger, MergedConfig};
use buildergen_core::adapters::{
    AllFieldsSelector, FsDocumentStore, FsWritePort, NamedFieldsSelector,
};
use buildergen_core::pipeline::{
    GenerateStatus, PlanStatus, ToolError, run_apply, run_candidates, run_generate, run_plan,
    write_apply_artifacts, write_plan_artifacts,
};
use buildergen_core::ports::{DocumentStore, FieldSelector};
use buildergen_core::{Target, UnitLocks};
use buildergen_edit::EditError;
use buildergen_render::{render_candidates, render_class, render_unit};
use buildergen_types::decl::DeclPath;
use buildergen_types::plan::{EditPlan, FieldScope, ToolInfo};
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Args, Parser, Subcommand};
use fs_err as fs;
use std::process::ExitCode;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "buildergen",
    version,
    about = "Incrementally synthesize nested Builder classes over declaration trees."
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the fields eligible for the builder of the target class.
    Candidates(CandidatesArgs),
    /// Synthesize an edit plan and preview patch without touching the unit.
    Plan(PlanArgs),
    /// Apply a saved plan (default: dry-run).
    Apply(ApplyArgs),
    /// Synthesize and commit the builder in one step.
    Generate(GenerateArgs),
    /// Print the unit, or one class, as source.
    Render(RenderArgs),
}

#[derive(Debug, Args)]
struct UnitArgs {
    /// Compilation unit JSON file.
    #[arg(long)]
    unit: Utf8PathBuf,

    /// Directory holding buildergen.toml (default: current directory).
    #[arg(long, default_value = ".")]
    root: Utf8PathBuf,

    /// Which fields count as visible on the target class.
    #[arg(long, value_enum)]
    field_scope: Option<ScopeArg>,

    /// Disable sha256 preconditions (not recommended).
    #[arg(long, default_value_t = false)]
    no_clean_hashes: bool,

    /// Do not copy the unit aside before overwriting it.
    #[arg(long, default_value_t = false)]
    no_backup: bool,

    /// Refuse every commit to the unit file.
    #[arg(long, default_value_t = false)]
    read_only: bool,
}

#[derive(Debug, Args)]
#[group(required = true, multiple = false)]
struct TargetArgs {
    /// Dotted class path, e.g. `Outer.Inner`.
    #[arg(long)]
    class: Option<String>,

    /// Byte offset of the caret; the innermost enclosing class is the target.
    #[arg(long)]
    offset: Option<usize>,
}

#[derive(Debug, Args)]
#[group(required = true, multiple = false)]
struct SelectionArgs {
    /// Comma-separated field names to mirror.
    #[arg(long, value_delimiter = ',')]
    fields: Vec<String>,

    /// Mirror every eligible field.
    #[arg(long)]
    all: bool,
}

#[derive(Debug, Parser)]
struct CandidatesArgs {
    #[command(flatten)]
    unit: UnitArgs,

    #[command(flatten)]
    target: TargetArgs,

    /// Output format (text, json).
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
}

#[derive(Debug, Parser)]
struct PlanArgs {
    #[command(flatten)]
    unit: UnitArgs,

    #[command(flatten)]
    target: TargetArgs,

    #[command(flatten)]
    selection: SelectionArgs,

    /// Output directory for artifacts (default: <unit dir>/artifacts/buildergen).
    #[arg(long)]
    out_dir: Option<Utf8PathBuf>,
}

#[derive(Debug, Parser)]
struct ApplyArgs {
    #[command(flatten)]
    unit: UnitArgs,

    /// plan.json written by `buildergen plan`.
    #[arg(long)]
    plan: Utf8PathBuf,

    /// Commit changes to the unit. If omitted, runs a dry-run and only emits artifacts.
    #[arg(long, default_value_t = false)]
    apply: bool,

    /// Output directory for artifacts (default: the plan's directory).
    #[arg(long)]
    out_dir: Option<Utf8PathBuf>,
}

#[derive(Debug, Parser)]
struct GenerateArgs {
    #[command(flatten)]
    unit: UnitArgs,

    #[command(flatten)]
    target: TargetArgs,

    #[command(flatten)]
    selection: SelectionArgs,

    /// Print the patch instead of committing it.
    #[arg(long, default_value_t = false)]
    dry_run: bool,
}

#[derive(Debug, Parser)]
struct RenderArgs {
    /// Compilation unit JSON file.
    #[arg(long)]
    unit: Utf8PathBuf,

    /// Render only this class.
    #[arg(long)]
    class: Option<String>,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum ScopeArg {
    Inherited,
    DeclaredOnly,
}

impl From<ScopeArg> for FieldScope {
    fn from(arg: ScopeArg) -> Self {
        match arg {
            ScopeArg::Inherited => FieldScope::Inherited,
            ScopeArg::DeclaredOnly => FieldScope::DeclaredOnly,
        }
    }
}

fn main() -> ExitCode {
    if let Err(e) = real_main() {
        error!("{:?}", e);
        return ExitCode::from(exit_code(&e));
    }
    ExitCode::from(0)
}

fn exit_code(err: &anyhow::Error) -> u8 {
    if let Some(tool) = err.downcast_ref::<ToolError>() {
        return tool.exit_code();
    }
    err.downcast_ref::<EditError>()
        .map(EditError::exit_code)
        .unwrap_or(1)
}

fn real_main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Candidates(args) => cmd_candidates(args),
        Command::Plan(args) => cmd_plan(args),
        Command::Apply(args) => cmd_apply(args),
        Command::Generate(args) => cmd_generate(args),
        Command::Render(args) => cmd_render(args),
    }
}

fn cmd_candidates(args: CandidatesArgs) -> anyhow::Result<()> {
    let merged = merged_config(&args.unit)?;
    let store = open_store(&args.unit, &merged);
    let target = target_of(&args.target);

    let outcome = match run_candidates(&merged.settings(true), &store, &target) {
        Ok(outcome) => outcome,
        Err(ToolError::TargetNotFound(at)) => {
            debug!("no class at {}", at);
            match args.format {
                OutputFormat::Text => println!("Generate Builder is unavailable: no class at {at}"),
                OutputFormat::Json => println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({
                        "available": false,
                        "class": null,
                        "fields": [],
                    }))?
                ),
            }
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    match args.format {
        OutputFormat::Text => {
            println!("Select Fields for Builder: {}", outcome.class);
            print!("{}", render_candidates(&outcome.candidates));
        }
        OutputFormat::Json => {
            let json = serde_json::json!({
                "available": true,
                "class": outcome.class.to_string(),
                "fields": outcome.candidates,
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
    }
    Ok(())
}

fn cmd_plan(args: PlanArgs) -> anyhow::Result<()> {
    let merged = merged_config(&args.unit)?;
    let store = open_store(&args.unit, &merged);
    let out_dir = args
        .out_dir
        .unwrap_or_else(|| unit_dir(&args.unit.unit).join("artifacts").join("buildergen"));
    let selector = selector_of(&args.selection);

    let outcome = run_plan(
        &merged.settings(true),
        &store,
        &target_of(&args.target),
        selector.as_ref(),
        tool_info(),
    )?;
    write_plan_artifacts(&outcome, &out_dir, &FsWritePort)
        .with_context(|| format!("write plan artifacts to {}", out_dir))?;

    match outcome.status {
        PlanStatus::Planned => println!(
            "planned {} op(s) for {}",
            outcome.plan.ops.len(),
            outcome.class
        ),
        PlanStatus::NoOp => println!("{} builder is up to date", outcome.class),
        PlanStatus::Cancelled => println!("selection cancelled"),
    }
    info!("wrote plan to {}", out_dir);
    Ok(())
}

fn cmd_apply(args: ApplyArgs) -> anyhow::Result<()> {
    let merged = merged_config(&args.unit)?;
    let store = open_store(&args.unit, &merged);
    let out_dir = args
        .out_dir
        .unwrap_or_else(|| unit_dir(&args.plan).to_path_buf());

    let plan_str = fs::read_to_string(&args.plan).with_context(|| format!("read {}", args.plan))?;
    let plan: EditPlan = serde_json::from_str(&plan_str).context("parse plan.json")?;

    let outcome = run_apply(&merged.settings(!args.apply), &store, &plan, tool_info())?;
    write_apply_artifacts(&outcome, &out_dir, &FsWritePort)
        .with_context(|| format!("write apply artifacts to {}", out_dir))?;
    info!("wrote apply artifacts to {}", out_dir);

    if let Some(blocked) = outcome.blocked {
        return Err(ToolError::Edit(blocked).into());
    }

    let summary = &outcome.report.summary;
    if outcome.report.committed {
        println!("applied {} op(s) to {}", summary.applied, store.describe());
    } else {
        println!("dry-run: {} op(s) checked, nothing written", summary.attempted);
    }
    Ok(())
}

fn cmd_generate(args: GenerateArgs) -> anyhow::Result<()> {
    let merged = merged_config(&args.unit)?;
    let store = open_store(&args.unit, &merged);
    let selector = selector_of(&args.selection);

    let outcome = run_generate(
        &merged.settings(args.dry_run),
        &store,
        &target_of(&args.target),
        selector.as_ref(),
        tool_info(),
        &UnitLocks::new(),
    )?;

    match outcome.status {
        GenerateStatus::Committed => println!("updated builder for {}", outcome.class),
        GenerateStatus::DryRun => print!("{}", outcome.patch),
        GenerateStatus::NoOp => println!("{} builder is up to date", outcome.class),
        GenerateStatus::Cancelled => println!("selection cancelled"),
    }
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let unit = FsDocumentStore::new(args.unit).load()?;
    let out = match args.class {
        None => render_unit(&unit),
        Some(name) => {
            let class = DeclPath::parse(&name)
                .and_then(|path| unit.class_at(&path))
                .ok_or_else(|| ToolError::TargetNotFound(Target::Path(name.clone()).to_string()))?;
            render_class(class)
        }
    };
    print!("{out}");
    Ok(())
}

fn merged_config(args: &UnitArgs) -> anyhow::Result<MergedConfig> {
    let file_config = config::load_or_default(&args.root).context("load buildergen.toml config")?;
    let merged = ConfigMerger::new(file_config).merge_args(
        args.field_scope.map(FieldScope::from),
        args.no_clean_hashes,
        args.no_backup,
    );
    debug!(
        "merged config: field_scope={:?}, require_clean_hashes={}, backups={:?}",
        merged.field_scope, merged.require_clean_hashes, merged.backups
    );
    Ok(merged)
}

fn open_store(args: &UnitArgs, merged: &MergedConfig) -> FsDocumentStore {
    let store = FsDocumentStore::new(args.unit.clone()).read_only(args.read_only);
    match merged.backup_suffix() {
        Some(suffix) => store.with_backup(suffix),
        None => store,
    }
}

fn target_of(args: &TargetArgs) -> Target {
    match (&args.class, args.offset) {
        (Some(class), _) => Target::Path(class.clone()),
        (None, Some(offset)) => Target::Offset(offset),
        // clap's group makes exactly one of the two present
        (None, None) => Target::Offset(usize::MAX),
    }
}

fn selector_of(args: &SelectionArgs) -> Box<dyn FieldSelector> {
    if args.all {
        Box::new(AllFieldsSelector)
    } else {
        Box::new(NamedFieldsSelector::new(args.fields.iter().cloned()))
    }
}

fn unit_dir(path: &Utf8Path) -> &Utf8Path {
    path.parent()
        .filter(|p| !p.as_str().is_empty())
        .unwrap_or(Utf8Path::new("."))
}

fn tool_info() -> ToolInfo {
    ToolInfo {
        name: "buildergen".to_string(),
        version: Some(env!("CARGO_PKG_VERSION").to_string()),
    }
}
