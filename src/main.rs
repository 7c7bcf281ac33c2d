use clap::{Args, Parser, Subcommand};
use feedmark::model::Document;
use feedmark::render::{atom, html, json, markdown, toc};
use feedmark::schema::Schema;
use feedmark::{config, links, loader, output, refdex};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "feedmark")]
#[command(about = "Tools for the Feedmark Markdown subformat")]
#[command(long_about = "\
Tools for the Feedmark Markdown subformat

A Feedmark document is a Markdown file with a title, optional properties,
a preamble, and a list of `###` sections. Each section may carry images,
properties and reference links:

  Recent Llama Sightings
  ======================

  *   author: Alfred J. Prufrock
  *   url: http://example.com/llama.xml

  ### 2 Llamas Spotted Near Mall

  *   date: Jan 1 2024 10:00:00
  *   witness @ Jim

  They were near the food court.

Every command takes files or directories; directories are searched for
*.md files. Machine-readable output goes to stdout, logs to stderr.

Run 'feedmark gen-config' to generate a documented feedmark.toml.")]
#[command(version)]
struct Cli {
    /// Config file (default: ./feedmark.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Rewrite reference links using this refdex (repeatable; later files win)
    #[arg(long, global = true)]
    input_refdex: Vec<PathBuf>,

    /// Prepended to every filename read from --input-refdex
    #[arg(long, global = true)]
    input_refdex_filename_prefix: Option<String>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Warnings and errors only
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

/// Documents to operate on.
#[derive(Args, Clone)]
struct Inputs {
    /// Feedmark files or directories
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Print documents as JSON
    Json(Inputs),
    /// Print documents as normalized Feedmark
    Markdown {
        #[command(flatten)]
        inputs: Inputs,
        /// Rewrite each file in place instead of printing
        #[arg(long)]
        in_place: bool,
        /// Order properties as in this schema document
        #[arg(long)]
        schema: Option<PathBuf>,
    },
    /// Print documents as HTML
    Html {
        #[command(flatten)]
        inputs: Inputs,
        /// Print a list of the newest sections instead
        #[arg(long)]
        snippet: bool,
        /// Maximum number of snippet entries
        #[arg(long)]
        limit: Option<usize>,
        /// Wrap each document in a full HTML page
        #[arg(long)]
        standalone: bool,
    },
    /// Write an Atom feed of the newest sections
    Atom {
        #[command(flatten)]
        inputs: Inputs,
        /// Feed file to write
        #[arg(long)]
        output: PathBuf,
        /// Maximum number of entries
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Check section properties against a schema document
    Check {
        #[command(flatten)]
        inputs: Inputs,
        /// Schema document
        #[arg(long)]
        schema: PathBuf,
    },
    /// Print a reference index of every section
    Refdex {
        #[command(flatten)]
        inputs: Inputs,
        /// List every filename per entry
        #[arg(long)]
        multi: bool,
    },
    /// List links, or check that local ones resolve
    Links {
        #[command(flatten)]
        inputs: Inputs,
        /// Check relative links against files under this directory
        #[arg(long, value_name = "ROOT")]
        check_local: Option<PathBuf>,
    },
    /// Print a Markdown table of contents
    Toc(Inputs),
    /// Summarize documents and sections
    Inspect(Inputs),
    /// Print a stock feedmark.toml with all options documented
    GenConfig,
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let config = config::load_config(cli.config.as_deref())?;
    init_thread_pool(&config.processing);

    let prefix = cli
        .input_refdex_filename_prefix
        .as_deref()
        .or(config.refdex.filename_prefix.as_deref());
    let load = |inputs: &Inputs| load_inputs(inputs, &cli.input_refdex, prefix);

    match &cli.command {
        Command::Json(inputs) => {
            let documents = load(inputs)?;
            println!("{}", json::render_documents(&documents)?);
        }
        Command::Markdown {
            inputs,
            in_place,
            schema,
        } => {
            let documents = load(inputs)?;
            let schema = match schema {
                Some(path) => Some(Schema::from_document(&loader::read_document_from(path)?)),
                None => None,
            };
            let order = schema.as_ref().map(|s| s.order());
            for document in &documents {
                let text = markdown::render_document(document, order);
                match (&document.filename, *in_place) {
                    (Some(filename), true) => {
                        std::fs::write(filename, text)?;
                        info!(file = %filename, "rewrote document");
                    }
                    _ => print!("{}", text),
                }
            }
        }
        Command::Html {
            inputs,
            snippet,
            limit,
            standalone,
        } => {
            let documents = load(inputs)?;
            if *snippet {
                let limit = limit.or(config.html.snippet_limit);
                println!("{}", html::render_snippet(&documents, limit)?);
            } else {
                let options = html::HtmlOptions {
                    standalone: *standalone || config.html.standalone,
                };
                for document in &documents {
                    println!("{}", html::render_document(document, options));
                }
            }
        }
        Command::Atom {
            inputs,
            output,
            limit,
        } => {
            let documents = load(inputs)?;
            let limit = limit.or(config.feed.limit);
            let feed = atom::render_feed(&documents, limit, chrono::Utc::now())?;
            std::fs::write(output, feed)?;
            info!(file = %output.display(), "wrote atom feed");
        }
        Command::Check { inputs, schema } => {
            let documents = load(inputs)?;
            let schema = Schema::from_document(&loader::read_document_from(schema)?);
            let reports = schema.rules().check_documents(&documents);
            println!("{}", serde_json::to_string_pretty(&reports)?);
            output::print_schema_report(&reports);
            if !reports.is_empty() {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Refdex { inputs, multi } => {
            let documents = load(inputs)?;
            let index = refdex::build_refdex(&documents);
            let json = if *multi {
                serde_json::to_string_pretty(&refdex::to_multi(&index))?
            } else {
                serde_json::to_string_pretty(&index)?
            };
            println!("{}", json);
        }
        Command::Links {
            inputs,
            check_local,
        } => {
            let documents = load(inputs)?;
            let found = links::extract_links(&documents);
            match check_local {
                Some(root) => {
                    let failures = links::check_local_links(&found, root);
                    println!("{}", serde_json::to_string_pretty(&failures)?);
                    output::print_link_failures(&failures);
                    if !failures.is_empty() {
                        return Ok(ExitCode::FAILURE);
                    }
                }
                None => println!("{}", serde_json::to_string_pretty(&found)?),
            }
        }
        Command::Toc(inputs) => {
            let documents = load(inputs)?;
            print!("{}", toc::render_toc(&documents));
        }
        Command::Inspect(inputs) => {
            let documents = load(inputs)?;
            output::print_inspect_output(&documents);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Load every input, then apply the input refdexes if any were given.
fn load_inputs(
    inputs: &Inputs,
    refdex_paths: &[PathBuf],
    filename_prefix: Option<&str>,
) -> Result<Vec<Document>, Box<dyn std::error::Error>> {
    let files = loader::expand_inputs(&inputs.files)?;
    let mut documents = loader::load_documents(&files)?;
    if !refdex_paths.is_empty() {
        let index = refdex::read_refdex_from(refdex_paths, filename_prefix)?;
        let rewritten: usize = documents
            .iter_mut()
            .map(|document| refdex::rewrite_reference_links(document, &index))
            .sum();
        info!(entries = index.len(), rewritten, "applied input refdex");
    }
    Ok(documents)
}

/// `RUST_LOG` wins; otherwise `--quiet` and `--verbose` pick the level.
fn init_logging(verbose: bool, quiet: bool) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if quiet {
        EnvFilter::new("warn")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores; config can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
