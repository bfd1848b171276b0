//! unexam CLI - exam structure extraction tool

use std::fs;
use std::path::{Path, PathBuf};
use std::thread;

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use unexam::batch::{
    load_media_dir, BatchEvent, BatchOptions, BatchProcessor, BatchStatus, DocumentSource,
    DocumentStatus, JsonDocumentFile,
};
use unexam::outline::extract_from_text;
use unexam::rules::{presets, PresetCategory, RawRuleConfig};
use unexam::{render, ExtractOptions, JsonFormat, MediaContext, RuleConfig, RuleSet, Unexam};

#[derive(Parser)]
#[command(name = "unexam")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Extract exam question outlines, merged tables and reading order", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Infer the question outline from styled runs (JSON) or plain text
    Outline {
        /// Styled runs JSON file, or a text file with --plain
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Rule configuration file (any supported shape)
        #[arg(short, long, value_name = "FILE", env = "UNEXAM_RULES")]
        rules: Option<PathBuf>,

        /// Treat the input as plain text, one line per item
        #[arg(long)]
        plain: bool,

        /// Drop questions deeper than this level
        #[arg(long)]
        max_level: Option<u32>,

        /// Output JSON instead of an indented listing
        #[arg(long)]
        json: bool,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Parse the tables of a document body
    Tables {
        #[command(flatten)]
        body: BodyArgs,

        /// Output HTML instead of JSON
        #[arg(long)]
        html: bool,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Emit paragraphs, tables and images in reading order
    Blocks {
        #[command(flatten)]
        body: BodyArgs,

        /// Output Markdown instead of JSON
        #[arg(long)]
        markdown: bool,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Rule configuration tools
    Rules {
        #[command(subcommand)]
        command: RulesCommand,
    },

    /// Process many document JSON files concurrently
    Batch {
        /// Document JSON files
        #[arg(value_name = "FILES", required = true)]
        inputs: Vec<PathBuf>,

        /// Rule configuration file (any supported shape)
        #[arg(short, long, value_name = "FILE", env = "UNEXAM_RULES")]
        rules: Option<PathBuf>,

        /// Documents processed at the same time
        #[arg(short, long, default_value_t = unexam::batch::DEFAULT_WORKERS)]
        workers: usize,

        /// Output directory for per-document results
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,
    },

    /// Show version information
    Version,
}

#[derive(Subcommand)]
enum RulesCommand {
    /// Upgrade a legacy rule configuration to the current shape
    Migrate {
        /// Rule configuration file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// List the built-in pattern presets
    Presets {
        /// Only show one category (question, score, bracket, underline, ignore)
        #[arg(short, long)]
        category: Option<PresetCategory>,
    },
}

#[derive(clap::Args)]
struct BodyArgs {
    /// Document body markup (word/document.xml)
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Relationships part (word/_rels/document.xml.rels)
    #[arg(long, value_name = "FILE")]
    rels: Option<PathBuf>,

    /// Unpacked package directory holding the media parts
    #[arg(long, value_name = "DIR")]
    media_dir: Option<PathBuf>,
}

impl BodyArgs {
    fn load(&self) -> Result<(String, MediaContext), Box<dyn std::error::Error>> {
        let body = fs::read_to_string(&self.input)?;
        let mut media = match &self.rels {
            Some(path) => MediaContext::from_relationships_xml(&fs::read_to_string(path)?),
            None => MediaContext::new(),
        };
        if let Some(dir) = &self.media_dir {
            let loaded = load_media_dir(&mut media, dir)?;
            log::debug!("Loaded {} media parts from {}", loaded, dir.display());
        }
        Ok((body, media))
    }
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let result = match cli.command {
        Commands::Outline {
            input,
            rules,
            plain,
            max_level,
            json,
            compact,
            output,
        } => cmd_outline(
            &input,
            rules.as_deref(),
            plain,
            max_level,
            json || compact,
            compact,
            output.as_deref(),
        ),
        Commands::Tables { body, html, output } => cmd_tables(&body, html, output.as_deref()),
        Commands::Blocks {
            body,
            markdown,
            output,
        } => cmd_blocks(&body, markdown, output.as_deref()),
        Commands::Rules { command } => match command {
            RulesCommand::Migrate { input, output } => cmd_migrate(&input, output.as_deref()),
            RulesCommand::Presets { category } => {
                cmd_presets(category);
                Ok(())
            }
        },
        Commands::Batch {
            inputs,
            rules,
            workers,
            output,
        } => cmd_batch(&inputs, rules.as_deref(), workers, output.as_deref()),
        Commands::Version => {
            cmd_version();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn load_rules(path: Option<&Path>) -> Result<RuleSet, Box<dyn std::error::Error>> {
    Ok(match path {
        Some(path) => RuleSet::from_config(&RuleConfig::from_file(path)?.validated()),
        None => RuleSet::default(),
    })
}

fn write_output(output: Option<&Path>, content: &str) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(path) = output {
        fs::write(path, content)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", content);
    }
    Ok(())
}

fn json_format(compact: bool) -> JsonFormat {
    if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    }
}

fn cmd_outline(
    input: &Path,
    rules: Option<&Path>,
    plain: bool,
    max_level: Option<u32>,
    json: bool,
    compact: bool,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let rules = load_rules(rules)?;

    let content = if plain {
        let text = fs::read_to_string(input)?;
        let outline = extract_from_text(&text, &rules);
        if json {
            render::to_json(&outline, json_format(compact))?
        } else {
            render::outline_to_text(&outline.questions)
        }
    } else {
        let runs = unexam::runs_from_file(input)?;
        let mut options = ExtractOptions::new();
        if let Some(max) = max_level {
            options = options.with_max_level(max);
        }
        let outline = Unexam::new()
            .with_rules(rules)
            .with_options(options)
            .outline(&runs);

        if json {
            render::to_json(&outline, json_format(compact))?
        } else {
            let mut text = render::outline_to_text(&outline.questions);
            text.push_str(&format!(
                "\n\n{} {} questions, {} style groups",
                "Summary:".cyan().bold(),
                outline.question_count(),
                outline.levels.len()
            ));
            text
        }
    };

    write_output(output, &content)
}

fn cmd_tables(
    body: &BodyArgs,
    html: bool,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let (markup, media) = body.load()?;
    let tables = Unexam::new().tables(&markup, &media);

    let content = if html {
        tables
            .iter()
            .map(render::table_to_html)
            .collect::<Vec<_>>()
            .join("\n")
    } else {
        render::to_json(&tables, JsonFormat::Pretty)?
    };

    write_output(output, &content)
}

fn cmd_blocks(
    body: &BodyArgs,
    markdown: bool,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let (markup, media) = body.load()?;
    let blocks = Unexam::new().blocks(&markup, &media);

    let content = if markdown {
        render::blocks_to_markdown(&blocks)
    } else {
        render::to_json(&blocks, JsonFormat::Pretty)?
    };

    write_output(output, &content)
}

fn cmd_migrate(input: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let json = fs::read_to_string(input)?;
    let raw: RawRuleConfig = serde_json::from_str(&json)?;
    if raw.is_current() {
        eprintln!("{}", "Already in the current shape".yellow());
    }

    let config = raw.migrate().validated();
    write_output(output, &config.to_json()?)
}

fn cmd_presets(category: Option<PresetCategory>) {
    let categories = match category {
        Some(c) => vec![c],
        None => PresetCategory::ALL.to_vec(),
    };

    for category in categories {
        println!("{}", category.to_string().cyan().bold());
        println!("{}", "─".repeat(40).dimmed());
        for preset in presets::presets(category) {
            println!(
                "  {:<20} {}  {}",
                preset.id.bold(),
                preset.label,
                preset.pattern.dimmed()
            );
        }
        println!();
    }
}

fn cmd_batch(
    inputs: &[PathBuf],
    rules: Option<&Path>,
    workers: usize,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let pipeline = Unexam::new().with_rules(load_rules(rules)?);
    let sources: Vec<Box<dyn DocumentSource>> = inputs
        .iter()
        .map(|p| Box::new(JsonDocumentFile::new(p)) as Box<dyn DocumentSource>)
        .collect();

    let pb = ProgressBar::new(sources.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );

    let (tx, rx) = crossbeam_channel::unbounded();
    let progress = pb.clone();
    let listener = thread::spawn(move || {
        for event in rx {
            match event {
                BatchEvent::Started { name, .. } => progress.set_message(name),
                BatchEvent::Finished { .. } => progress.inc(1),
            }
        }
    });

    let options = BatchOptions::new()
        .with_workers(workers)
        .with_pipeline(pipeline)
        .with_events(tx);
    let report = BatchProcessor::new(options)?.run(&sources);
    // The processor owned the only sender; the listener ends once it is gone.
    let _ = listener.join();
    pb.finish_with_message("Done!");

    if let Some(dir) = output {
        fs::create_dir_all(dir)?;
        for doc in &report.documents {
            if let Some(result) = &doc.result {
                let stem = Path::new(&doc.name)
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_else(|| format!("document_{}", doc.index));
                let json = render::to_json(result, JsonFormat::Pretty)?;
                fs::write(dir.join(format!("{}.result.json", stem)), json)?;
            }
        }
        fs::write(
            dir.join("report.json"),
            render::to_json(&report, JsonFormat::Pretty)?,
        )?;
    }

    println!();
    for doc in &report.documents {
        let mark = match doc.status {
            DocumentStatus::Completed => "✓".green(),
            DocumentStatus::Error => "✗".red(),
            DocumentStatus::Cancelled => "-".yellow(),
        };
        match &doc.error {
            Some(error) => println!("  {} {} {}", mark, doc.name, error.dimmed()),
            None => println!("  {} {} ({} ms)", mark, doc.name, doc.elapsed_ms),
        }
    }

    let status = match report.status {
        BatchStatus::Completed => "completed".green().bold(),
        BatchStatus::Partial => "partial".yellow().bold(),
        BatchStatus::Cancelled => "cancelled".yellow().bold(),
        BatchStatus::Failed => "failed".red().bold(),
    };
    println!(
        "\n{} {}: {} ok, {} failed",
        "Batch".bold(),
        status,
        report.succeeded(),
        report.failed()
    );

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "unexam".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Exam structure extraction tool");
    println!();
    println!("Repository: {}", "https://github.com/iyulab/unexam".dimmed());
    println!("License: MIT");
}
