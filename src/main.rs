use anyhow::{bail, Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueHint};
use clap_complete::{generate, Shell};
use console::style;
use dialoguer::{theme::ColorfulTheme, Input};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use genotype_traits::catalog::{
    export_model, filter_rows, load_catalog_rows, CatalogFacets, CatalogQuery,
};
use genotype_traits::config::LlmConfig;
use genotype_traits::llm::{self, ChatModel};
use genotype_traits::{
    analyze_batch, analyze_file, load_catalog, render_html, render_text, Config,
    FileDiscovery, Report, ReportFormat, ReportGenerator, ReportSession, TraitCatalog,
};

/// Educational genotype-to-lifestyle-trait reports
#[derive(Parser, Debug)]
#[command(
    name = "genotype-traits",
    version,
    about = "Turn a raw genotype export into an educational lifestyle-trait report",
    long_about = r#"
Matches a 23andMe-style raw data file against a curated trait catalog and
renders the result as text, HTML and JSON, optionally with a narrative
summary written by a language model.

For education only. Nothing in these reports is a diagnosis or medical advice.
"#
)]
#[command(arg_required_else_help = true)]
struct Cli {
    /// Configuration file (defaults to ./genotype-traits.toml when present)
    #[arg(long, global = true, value_name = "PATH", value_hint = ValueHint::FilePath)]
    config: Option<PathBuf>,

    /// JSON trait model (primary catalog source)
    #[arg(long, global = true, value_name = "PATH", value_hint = ValueHint::FilePath)]
    catalog_json: Option<PathBuf>,

    /// CSV trait table (fallback catalog source)
    #[arg(long, global = true, value_name = "PATH", value_hint = ValueHint::FilePath)]
    catalog_csv: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build a trait report for one genotype file
    Report {
        #[arg(value_name = "FILE", value_hint = ValueHint::FilePath)]
        file: PathBuf,

        /// Output format
        #[arg(short, long, value_enum)]
        format: Option<ReportFormat>,

        /// Output directory for reports
        #[arg(short, long, value_hint = ValueHint::DirPath)]
        output: Option<PathBuf>,

        /// Skip the language-model summary
        #[arg(long)]
        no_summary: bool,

        /// Print the report instead of writing files
        #[arg(long)]
        stdout: bool,
    },

    /// Build reports for many files or directories in parallel
    Batch {
        #[arg(value_name = "PATHS", required = true, num_args = 1.., value_hint = ValueHint::AnyPath)]
        paths: Vec<PathBuf>,

        /// Recursively search directories
        #[arg(short, long)]
        recursive: bool,

        /// Number of threads (0 = auto)
        #[arg(short, long, default_value = "0")]
        threads: usize,

        /// Output format
        #[arg(short, long, value_enum)]
        format: Option<ReportFormat>,

        /// Output directory for reports
        #[arg(short, long, value_hint = ValueHint::DirPath)]
        output: Option<PathBuf>,

        /// Request a language-model summary for every report
        #[arg(long)]
        summaries: bool,
    },

    /// Search and filter the CSV trait table
    Explore {
        /// Text matched against rsID, gene and trait name
        #[arg(short, long)]
        query: Option<String>,

        /// Keep only these categories (repeatable)
        #[arg(long = "category", value_name = "CATEGORY")]
        categories: Vec<String>,

        /// Keep only these evidence levels (repeatable)
        #[arg(long, value_name = "LEVEL")]
        evidence: Vec<String>,

        /// Print matching rows as JSON
        #[arg(long)]
        json: bool,
    },

    /// Export (filtered) CSV rows as the JSON trait model
    ExportModel {
        #[arg(short, long)]
        query: Option<String>,

        #[arg(long = "category", value_name = "CATEGORY")]
        categories: Vec<String>,

        #[arg(long, value_name = "LEVEL")]
        evidence: Vec<String>,

        /// Destination (defaults to the configured JSON model path)
        #[arg(long, value_hint = ValueHint::FilePath)]
        out: Option<PathBuf>,
    },

    /// Talk to a lifestyle coach about a report (/plan, /summary, /clear, /quit)
    Chat {
        #[arg(value_name = "FILE", value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Generate shell completions
    Completions { shell: Shell },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Commands::Completions { shell } = cli.command {
        generate_completions(shell);
        return Ok(());
    }

    init_logging(cli.verbose);

    let mut config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(path) = cli.catalog_json {
        config.catalog.json_path = path;
    }
    if let Some(path) = cli.catalog_csv {
        config.catalog.csv_path = path;
    }

    match cli.command {
        Commands::Report {
            file,
            format,
            output,
            no_summary,
            stdout,
        } => {
            apply_output_overrides(&mut config, format, output);
            if no_summary {
                config.llm.enabled = false;
            }
            run_report(&config, &file, stdout)
        }
        Commands::Batch {
            paths,
            recursive,
            threads,
            format,
            output,
            summaries,
        } => {
            apply_output_overrides(&mut config, format, output);
            config.llm.enabled &= summaries;
            init_thread_pool(threads)?;
            run_batch(&config, &paths, recursive)
        }
        Commands::Explore {
            query,
            categories,
            evidence,
            json,
        } => run_explore(
            &config,
            &CatalogQuery {
                text: query,
                categories,
                evidence,
            },
            json,
        ),
        Commands::ExportModel {
            query,
            categories,
            evidence,
            out,
        } => {
            let out = out.unwrap_or_else(|| config.catalog.json_path.clone());
            run_export(
                &config,
                &CatalogQuery {
                    text: query,
                    categories,
                    evidence,
                },
                &out,
            )
        }
        Commands::Chat { file } => run_chat(&config, &file),
        Commands::Completions { .. } => Ok(()),
    }
}

fn generate_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(format!("genotype_traits={}", level))
        .with_writer(io::stderr)
        .init();
}

fn init_thread_pool(threads: usize) -> Result<()> {
    let num_threads = if threads == 0 {
        num_cpus::get()
    } else {
        threads
    };

    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()
        .map_err(|e| anyhow::anyhow!("Failed to initialize thread pool: {}", e))?;

    info!("Using {} threads", rayon::current_num_threads());
    Ok(())
}

fn apply_output_overrides(config: &mut Config, format: Option<ReportFormat>, output: Option<PathBuf>) {
    if let Some(format) = format {
        config.output.format = format;
    }
    if let Some(dir) = output {
        config.output.dir = dir;
    }
}

fn load_trait_catalog(config: &Config) -> TraitCatalog {
    let catalog = load_catalog(&config.catalog.json_path, &config.catalog.csv_path);
    if catalog.is_empty() {
        warn!(
            "Trait catalog is empty (looked for {} and {})",
            config.catalog.json_path.display(),
            config.catalog.csv_path.display()
        );
    }
    catalog
}

#[cfg(feature = "http")]
fn build_model(config: &LlmConfig) -> Option<Box<dyn ChatModel>> {
    if !config.enabled {
        return None;
    }

    match llm::OpenAiClient::from_config(config) {
        Ok(client) => Some(Box::new(client)),
        Err(e) => {
            warn!("AI summary disabled: {}", e);
            None
        }
    }
}

#[cfg(not(feature = "http"))]
fn build_model(config: &LlmConfig) -> Option<Box<dyn ChatModel>> {
    if config.enabled {
        warn!("AI summary disabled: built without the `http` feature");
    }
    None
}

fn spinner(message: &str) -> Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    Ok(pb)
}

fn summarize_with_spinner(model: &dyn ChatModel, report: &Report) -> Result<Option<String>> {
    let pb = spinner("Generating AI summary...")?;
    let summary = llm::try_summarize(model, report);
    pb.finish_and_clear();
    Ok(summary)
}

fn print_no_traits_warning(path: &Path) {
    println!(
        "{} No catalog traits matched the variants in {}",
        style("!").yellow().bold(),
        style(path.display()).cyan()
    );
}

fn run_report(config: &Config, file: &Path, to_stdout: bool) -> Result<()> {
    let catalog = load_trait_catalog(config);
    info!("Loaded {} traits from {}", catalog.len(), catalog.source());

    let report = analyze_file(&catalog, file)
        .with_context(|| format!("Failed to analyze {}", file.display()))?;

    let summary = match build_model(&config.llm) {
        Some(model) if !report.is_empty() => summarize_with_spinner(&model, &report)?,
        _ => None,
    };

    if report.is_empty() {
        print_no_traits_warning(file);
    }

    if to_stdout {
        match config.output.format {
            ReportFormat::Json => println!("{}", report.to_json()?),
            ReportFormat::Html => println!("{}", render_html(&report, summary.as_deref())?),
            ReportFormat::Text | ReportFormat::All => {
                print!("{}", render_text(&report));
                if let Some(summary) = &summary {
                    println!("\n{}\n\n{}", style("Personalized overview").bold(), summary);
                }
            }
        }
        return Ok(());
    }

    let generator = ReportGenerator::new(&config.output.dir, config.output.escape_html)?;
    let written = generator.generate(
        &report,
        summary.as_deref(),
        config.output.format,
        &report_stem(file),
    )?;

    println!(
        "{} {} traits in {} categories",
        style("✓").green().bold(),
        report.summary().num_traits_found,
        report.summary().categories.len()
    );
    for path in written {
        println!("  {}", style(path.display()).cyan());
    }

    Ok(())
}

fn run_batch(config: &Config, paths: &[PathBuf], recursive: bool) -> Result<()> {
    let files = FileDiscovery::new(recursive).discover(paths)?;
    if files.is_empty() {
        bail!("No genotype files found");
    }
    info!("Found {} files to analyze", files.len());

    let catalog = load_trait_catalog(config);
    let generator = ReportGenerator::new(&config.output.dir, config.output.escape_html)?;
    let model = build_model(&config.llm);

    let pb = spinner(&format!("Analyzing {} files...", files.len()))?;
    let outcomes = analyze_batch(&catalog, &files);
    pb.finish_and_clear();

    let mut stems: HashMap<String, usize> = HashMap::new();
    let mut failed = 0;

    for outcome in outcomes {
        let report = match outcome.report {
            Ok(report) => report,
            Err(e) => {
                failed += 1;
                println!("{} {}: {}", style("✗").red(), outcome.path.display(), e);
                continue;
            }
        };

        let summary = match &model {
            Some(model) if !report.is_empty() => summarize_with_spinner(model, &report)?,
            _ => None,
        };

        let stem = report_stem(&outcome.path);
        let seen = stems.entry(stem.clone()).or_insert(0);
        *seen += 1;
        let stem = if *seen > 1 {
            format!("{}_{}", stem, seen)
        } else {
            stem
        };

        let written = generator.generate(&report, summary.as_deref(), config.output.format, &stem)?;
        println!(
            "{} {}: {} traits -> {}",
            style("✓").green(),
            outcome.path.display(),
            report.summary().num_traits_found,
            written
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    println!(
        "\n{} {} of {} files analyzed, reports saved to: {}",
        style("✓").green().bold(),
        files.len() - failed,
        files.len(),
        style(config.output.dir.display()).cyan()
    );

    Ok(())
}

fn run_explore(config: &Config, query: &CatalogQuery, as_json: bool) -> Result<()> {
    let path = &config.catalog.csv_path;
    let rows = load_catalog_rows(path)
        .with_context(|| format!("Failed to read trait table {}", path.display()))?;
    let matches = filter_rows(&rows, query);

    if as_json {
        println!("{}", serde_json::to_string_pretty(&matches)?);
        return Ok(());
    }

    for row in &matches {
        println!(
            "{} {} {} — {}",
            style(&row.rsid).green().bold(),
            style(&row.genotype).yellow(),
            style(&row.gene).dim(),
            row.trait_name
        );
        println!(
            "    {} [{}] · {} · evidence: {}",
            row.effect_label, row.effect_level, row.category, row.evidence_strength
        );
    }

    let facets = CatalogFacets::from_rows(&rows);
    println!();
    println!(
        "{} of {} traits shown",
        style(matches.len()).bold(),
        rows.len()
    );
    println!("{} {}", style("Categories:").cyan(), facets.categories.join(", "));
    println!("{} {}", style("Evidence levels:").cyan(), facets.evidence.join(", "));

    Ok(())
}

fn run_export(config: &Config, query: &CatalogQuery, out: &Path) -> Result<()> {
    let path = &config.catalog.csv_path;
    let rows = load_catalog_rows(path)
        .with_context(|| format!("Failed to read trait table {}", path.display()))?;
    let matches = filter_rows(&rows, query);

    let count = export_model(&matches, out)
        .with_context(|| format!("Failed to export model to {}", out.display()))?;

    println!(
        "{} Exported {} traits to {}",
        style("✓").green().bold(),
        count,
        style(out.display()).cyan()
    );
    Ok(())
}

fn run_chat(config: &Config, file: &Path) -> Result<()> {
    let Some(model) = build_model(&config.llm) else {
        bail!(
            "Chat needs a language model: enable [llm] and set ${}",
            config.llm.api_key_env
        );
    };

    let catalog = load_trait_catalog(config);
    let report = analyze_file(&catalog, file)
        .with_context(|| format!("Failed to analyze {}", file.display()))?;
    if report.is_empty() {
        print_no_traits_warning(file);
    }

    let summary = summarize_with_spinner(&model, &report)?;
    let mut session = ReportSession::with_summary(report, summary);

    println!(
        "{}",
        style(format!(
            "{} traits in: {}",
            session.report().summary().num_traits_found,
            session.report().summary().categories.join(", ")
        ))
        .cyan()
        .bold()
    );
    if let Some(summary) = session.summary() {
        println!("\n{}\n", summary);
    }
    println!(
        "{}",
        style("Ask a question, or /plan, /summary, /clear, /quit. Not medical advice.").dim()
    );

    let theme = ColorfulTheme::default();
    loop {
        let line: String = Input::with_theme(&theme)
            .with_prompt("You")
            .allow_empty(true)
            .interact_text()?;

        let pb = spinner("Thinking...")?;
        let reply = match line.trim() {
            "" => {
                pb.finish_and_clear();
                continue;
            }
            "/quit" | "/exit" => {
                pb.finish_and_clear();
                break;
            }
            "/clear" => {
                pb.finish_and_clear();
                session.clear_history();
                println!("{}", style("Conversation cleared.").dim());
                continue;
            }
            "/summary" => session.generate_summary(&model).map(str::to_string),
            "/plan" => session.generate_plan(&model).map(str::to_string),
            question => session.ask(&model, question),
        };
        pb.finish_and_clear();

        match reply {
            Ok(text) => println!("\n{}\n", text),
            Err(e) => println!("{} {}", style("AI generation failed:").red(), e),
        }
    }

    Ok(())
}

/// Base file name for reports written for `path`
fn report_stem(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "report".to_string());
    let stem = name
        .trim_end_matches(".gz")
        .trim_end_matches(".txt")
        .trim_end_matches(".tsv");
    format!("{}_traits", stem)
}
