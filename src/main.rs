use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use specsheet::config::{ConfigManager, SheetConfig};
use specsheet::core::{
    format_output_path, load_document_file, print_error_message, print_info_message, ExportReport,
    SheetResult,
};
use specsheet::document::{Document, DocumentSnapshot, Row};
use specsheet::env::{self, EnvVar};
use specsheet::jobs::{spawn_export, spawn_scrape};
use specsheet::scrape::{HttpFetcher, ScrapeOutcome};
use specsheet::translation::{LabelTranslator, Translator};

#[derive(Parser, Debug)]
#[command(name = "specsheet", version, about = "Build, re-export, scrape and translate specification sheets")]
struct Cli {
    /// Path to config file
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load an exported or legacy file and print its rows
    Import { file: PathBuf },

    /// Re-export a file, optionally together with its translated counterpart
    Export {
        file: PathBuf,

        /// Output path template (%title%, %timestamp%, %lang%)
        #[arg(short = 'o', long)]
        output: Option<String>,

        /// Title used for %title%
        #[arg(short = 't', long)]
        title: Option<String>,

        /// Also write the translated file
        #[arg(long)]
        translate: bool,
    },

    /// Scrape a product datasheet page into rows
    Scrape {
        url: String,

        /// Export the scraped rows using this path template
        #[arg(short = 'o', long)]
        output: Option<String>,

        #[arg(short = 't', long)]
        title: Option<String>,

        #[arg(long)]
        translate: bool,
    },

    /// Translate a single label or rich fragment
    Translate {
        text: String,

        /// Treat the input as an HTML fragment
        #[arg(long)]
        fragment: bool,
    },

    /// Write an example configuration file
    Config {
        #[arg(long)]
        example: PathBuf,
    },

    /// Print documentation for all environment variables
    EnvDocs,
}

fn init_logging() {
    let level = env::core::LogLevel::get()
        .ok()
        .and_then(|level| level.parse::<tracing::Level>().ok())
        .unwrap_or(tracing::Level::INFO);
    let no_color = env::core::NoColor::get().unwrap_or(false);

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .with_ansi(!no_color)
        .with_target(false)
        .init();
}

fn load_config(path: Option<&Path>) -> SheetResult<SheetConfig> {
    let manager = match path {
        Some(path) => ConfigManager::from_path(path)?,
        None => ConfigManager::new()?,
    };
    Ok(manager.into_config())
}

fn print_rows(document: &Document) {
    println!("{} | {}", document.header_left(), document.header_right());
    for (_, row) in document.iter() {
        match row {
            Row::Section { title } => println!("== {} ==", title),
            Row::Category { title } => println!("-- {} --", title),
            Row::Entry { key, value } => println!("{}: {}", key, value),
        }
    }
}

fn print_report(report: &ExportReport) {
    print_info_message(&format!(
        "Wrote {} ({} rows)",
        report.source_path.display(),
        report.rows_written
    ));
    if let Some(target_path) = &report.target_path {
        print_info_message(&format!("Wrote {}", target_path.display()));
    }
    if !report.missing_translations.is_empty() {
        println!("Missing translations ({}):", report.missing_translations.len());
        for label in &report.missing_translations {
            println!("  {}", label);
        }
    }
}

fn run_export(
    snapshot: DocumentSnapshot,
    config: &SheetConfig,
    output: Option<&str>,
    title: Option<&str>,
    translate: bool,
) -> SheetResult<ExportReport> {
    let template = output.unwrap_or(&config.export.output_template);
    let path = format_output_path(
        template,
        title.unwrap_or_default(),
        &config.export.default_title,
        &config.translation.source_lang,
    );

    let translator = translate.then(|| Arc::new(Translator::from_config(config.translation.clone())));
    let handle = spawn_export(
        snapshot,
        PathBuf::from(&path),
        translator,
        config.export.target_suffix.clone(),
    )?;

    handle.wait_for_export()
}

fn run(cli: Cli) -> SheetResult<()> {
    match cli.command {
        Command::EnvDocs => {
            println!("{}", env::generate_env_docs());
            match env::EnvConfig::from_env() {
                Ok(env_config) => env_config.print_summary(),
                Err(e) => print_error_message(&format!("Invalid environment: {}", e)),
            }
            return Ok(());
        }
        Command::Config { example } => {
            ConfigManager::generate_example_config(&example)?;
            print_info_message(&format!("Wrote example config to {}", example.display()));
            return Ok(());
        }
        _ => {}
    }

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Import { file } => {
            let document = load_document_file(&file)?;
            print_rows(&document);
        }
        Command::Export {
            file,
            output,
            title,
            translate,
        } => {
            let document = load_document_file(&file)?;
            let report = run_export(
                document.snapshot(),
                &config,
                output.as_deref(),
                title.as_deref(),
                translate,
            )?;
            print_report(&report);
        }
        Command::Scrape {
            url,
            output,
            title,
            translate,
        } => {
            let fetcher = HttpFetcher::new(&config.scrape)?;
            let handle = spawn_scrape(url, config.scrape.clone(), Arc::new(fetcher))?;

            match handle.wait_for_scrape()? {
                ScrapeOutcome::Rows(rows) => {
                    let document = Document::from_snapshot(DocumentSnapshot {
                        rows,
                        ..DocumentSnapshot::default()
                    });
                    print_rows(&document);
                    if output.is_some() || translate {
                        let report = run_export(
                            document.snapshot(),
                            &config,
                            output.as_deref(),
                            title.as_deref(),
                            translate,
                        )?;
                        print_report(&report);
                    }
                }
                ScrapeOutcome::Empty => print_info_message("No rows found on the page"),
                ScrapeOutcome::Canceled => print_info_message("Scrape canceled"),
                ScrapeOutcome::Failed(e) => return Err(e.into()),
            }
        }
        Command::Translate { text, fragment } => {
            let translator = Translator::from_config(config.translation.clone());
            if !translator.warm_up() {
                tracing::info!("No machine translation engine available; dictionary only");
            }
            let translation = if fragment {
                translator.translate_fragment(&text)
            } else {
                translator.translate_label(&text)
            };
            println!("{}", translation.text);
            if translation.is_missing() {
                print_error_message(&format!("Not translated ({:?})", translation.status));
            }
        }
        Command::Config { .. } | Command::EnvDocs => {}
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_logging();

    if let Err(e) = run(cli) {
        print_error_message(&format!("Error: {}", e));
        process::exit(1);
    }
}
