use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Args, CommandFactory, Parser, Subcommand};
use relink_core::config::load_config;
use relink_core::convert::{ConvertOptions, ConvertReport, convert_export};
use relink_core::corpus::corpus_stats;
use relink_core::extract::extract_archive;
use relink_core::runtime::{
    PathOverrides, ResolutionContext, ensure_export_root, inspect_runtime, resolve_paths,
};

#[derive(Debug, Parser)]
#[command(
    name = "relink",
    version,
    about = "Convert a linked-notes export into an import-ready tree (rename documents, fix links)"
)]
struct Cli {
    #[arg(long, global = true, value_name = "PATH")]
    export_root: Option<PathBuf>,
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    #[arg(long, global = true, help = "Print resolved runtime diagnostics")]
    diagnostics: bool,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Clone)]
struct RuntimeOptions {
    export_root: Option<PathBuf>,
    config: Option<PathBuf>,
    diagnostics: bool,
}

impl RuntimeOptions {
    fn from_cli(cli: &Cli) -> Self {
        Self {
            export_root: cli.export_root.clone(),
            config: cli.config.clone(),
            diagnostics: cli.diagnostics,
        }
    }
}

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Unpack an export archive into the export root")]
    Extract(ExtractArgs),
    #[command(about = "Rename documents and folders, then rewrite all links")]
    Convert(ConvertArgs),
    #[command(about = "Report corpus statistics for the export root")]
    Status(StatusArgs),
}

#[derive(Debug, Args)]
struct ExtractArgs {
    archive: PathBuf,
}

#[derive(Debug, Args)]
struct ConvertArgs {
    #[arg(
        long,
        value_name = "ARCHIVE",
        help = "Extract this export archive into the export root first"
    )]
    zip: Option<PathBuf>,
    #[arg(
        long,
        value_name = "N",
        help = "Leading lines stripped from each document (overrides config)"
    )]
    strip_lines: Option<usize>,
    #[arg(long, help = "Report planned renames and rewrites without touching the tree")]
    dry_run: bool,
}

#[derive(Debug, Args)]
struct StatusArgs {
    #[arg(long, help = "Print corpus statistics as JSON")]
    json: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let runtime = RuntimeOptions::from_cli(&cli);

    match cli.command {
        Some(Commands::Extract(args)) => run_extract(&runtime, args),
        Some(Commands::Convert(args)) => run_convert(&runtime, args),
        Some(Commands::Status(args)) => run_status(&runtime, args),
        None => {
            let mut command = Cli::command();
            command.print_help()?;
            println!();
            Ok(())
        }
    }
}

fn run_extract(runtime: &RuntimeOptions, args: ExtractArgs) -> Result<()> {
    let paths = resolve_runtime_paths(runtime)?;
    let report = extract_archive(&args.archive, &paths.export_root)?;

    println!("extract");
    println!("archive: {}", normalize_path(&args.archive));
    println!("export_root: {}", normalize_path(&paths.export_root));
    println!("files: {}", report.files);
    println!("directories: {}", report.directories);
    if runtime.diagnostics {
        println!("\n[diagnostics]\n{}", paths.diagnostics());
    }
    Ok(())
}

fn run_convert(runtime: &RuntimeOptions, args: ConvertArgs) -> Result<()> {
    let paths = resolve_runtime_paths(runtime)?;

    if let Some(archive) = &args.zip {
        let report = extract_archive(archive, &paths.export_root)?;
        println!(
            "extracted: {} ({} files, {} directories)",
            normalize_path(archive),
            report.files,
            report.directories
        );
    }

    let status = inspect_runtime(&paths);
    ensure_export_root(&paths, &status)?;
    let config = load_config(&paths.config_path)?;
    let options = ConvertOptions {
        heading_lines_to_strip: args
            .strip_lines
            .unwrap_or_else(|| config.heading_lines_to_strip()),
        dry_run: args.dry_run,
        ..ConvertOptions::from_config(&config)
    };

    let report = convert_export(&paths, &options)?;
    print_convert_report(&paths, &options, &report);

    if !status.warnings.is_empty() {
        println!("warnings:");
        for warning in &status.warnings {
            println!("  - {warning}");
        }
    }
    if runtime.diagnostics {
        println!("\n[diagnostics]\n{}", paths.diagnostics());
    }
    Ok(())
}

fn print_convert_report(
    paths: &relink_core::runtime::ResolvedPaths,
    options: &ConvertOptions,
    report: &ConvertReport,
) {
    println!("convert");
    println!("export_root: {}", normalize_path(&paths.export_root));
    println!("extension: {}", options.extension);
    println!("heading_lines_to_strip: {}", options.heading_lines_to_strip);
    println!("dry_run: {}", options.dry_run);

    for document in &report.rename.renamed {
        println!(
            "renamed: {} -> {}",
            document.old_relative, document.new_relative
        );
    }
    for document in &report.rename.skipped {
        println!("skipped: {} ({})", document.relative_path, document.reason);
    }
    println!("documents.renamed: {}", report.rename.renamed.len());
    println!("documents.skipped: {}", report.rename.skipped.len());
    println!("links.files_scanned: {}", report.links.files_scanned);
    println!("links.files_changed: {}", report.links.files_changed);

    for folder in &report.folders.renamed {
        println!(
            "folder renamed: {} -> {} ({} files patched)",
            folder.old_relative, folder.new_relative, folder.files_changed
        );
    }
    for folder in &report.folders.skipped {
        println!(
            "folder skipped: {} ({})",
            folder.relative_path, folder.reason
        );
    }
    println!("folders.renamed: {}", report.folders.renamed.len());
    println!("folders.skipped: {}", report.folders.skipped.len());
    println!("folders.files_changed: {}", report.folders.files_changed);
}

fn run_status(runtime: &RuntimeOptions, args: StatusArgs) -> Result<()> {
    let paths = resolve_runtime_paths(runtime)?;
    let status = inspect_runtime(&paths);
    ensure_export_root(&paths, &status)?;
    let config = load_config(&paths.config_path)?;
    let stats = corpus_stats(&paths.export_root, &config.extension())?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("status");
    println!("export_root: {}", normalize_path(&paths.export_root));
    println!("config_path: {}", normalize_path(&paths.config_path));
    println!("config_exists: {}", format_flag(status.config_exists));
    println!("extension: {}", config.extension());
    println!("documents: {}", stats.total_documents);
    println!("folders: {}", stats.total_folders);
    println!("folders_with_suffix: {}", stats.folders_with_suffix);
    println!("total_bytes: {}", stats.total_bytes);
    if !status.warnings.is_empty() {
        println!("warnings:");
        for warning in &status.warnings {
            println!("  - {warning}");
        }
    }
    if runtime.diagnostics {
        println!("\n[diagnostics]\n{}", paths.diagnostics());
    }
    Ok(())
}

fn resolve_runtime_paths(runtime: &RuntimeOptions) -> Result<relink_core::runtime::ResolvedPaths> {
    dotenvy::dotenv().ok();

    let context = ResolutionContext::from_process()?;
    let overrides = PathOverrides {
        export_root: runtime.export_root.clone(),
        config: runtime.config.clone(),
    };

    let initial = resolve_paths(&context, &overrides)?;
    let root_env = initial.export_root.join(".env");
    if root_env.exists() {
        let _ = dotenvy::from_path_override(&root_env);
    }

    resolve_paths(&context, &overrides)
}

fn normalize_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

fn format_flag(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}
