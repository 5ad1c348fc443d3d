use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use rust_sqlscript::{
    collect_script_files, parse_script_file, parse_script_files, FilterField, ScriptConfig,
    ScriptFilter, StatementId,
};

#[derive(Parser)]
#[command(name = "rust-sqlscript")]
#[command(author, version, about = "Split SQL scripts into tagged, addressable statements")]
struct Cli {
    /// Path to a sqlscript.toml (defaults to the nearest one above the script)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List statements with their tags
    List {
        /// Path to the .sql script
        script: PathBuf,

        /// Print records as JSON
        #[arg(long)]
        json: bool,

        /// Keep only kinds matching this regex (repeatable)
        #[arg(long)]
        include_kind: Vec<String>,

        /// Drop kinds matching this regex (repeatable)
        #[arg(long)]
        exclude_kind: Vec<String>,
    },

    /// Print one statement, by index (1-based, negative from the end) or tag
    Show {
        /// Path to the .sql script
        script: PathBuf,

        /// Statement index or `kind~name` tag
        id: String,
    },

    /// Print the script rebuilt from its parsed statements
    Render {
        /// Path to the .sql script
        script: PathBuf,
    },

    /// Parse scripts and directories, failing on the first error
    Check {
        /// Files or directories to check
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// File name pattern used inside directories
        #[arg(long, default_value = "*.sql")]
        pattern: String,
    },
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn load_config(explicit: Option<&Path>, near: &Path) -> Result<ScriptConfig> {
    if let Some(path) = explicit {
        return Ok(ScriptConfig::from_file(path)?);
    }
    let dir = if near.is_dir() {
        near
    } else {
        near.parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."))
    };
    Ok(ScriptConfig::discover_or_default(dir)?)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::List {
            script,
            json,
            include_kind,
            exclude_kind,
        } => {
            let config = load_config(cli.config.as_deref(), &script)?;
            let parsed = parse_script_file(&script, &config)?;

            let mut filter = ScriptFilter::new();
            for pattern in &include_kind {
                filter = filter.include(FilterField::Kind, pattern)?;
            }
            for pattern in &exclude_kind {
                filter = filter.exclude(FilterField::Kind, pattern)?;
            }
            let kept = parsed.filter(&filter);

            if json {
                let records: Vec<_> = parsed
                    .records()
                    .into_iter()
                    .filter(|r| kept.iter().any(|s| s.index == r.index))
                    .collect();
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else {
                for statement in kept {
                    println!(
                        "{:>4}  {}",
                        statement.index,
                        statement.tag.render(&config.patterns.name_delimiter)
                    );
                }
            }
        }

        Commands::Show { script, id } => {
            let config = load_config(cli.config.as_deref(), &script)?;
            let parsed = parse_script_file(&script, &config)?;
            let statement = parsed.statement(&StatementId::parse(&id))?;

            println!(
                "-- {} (line {})",
                statement.tag.render(&config.patterns.name_delimiter),
                statement.line
            );
            println!("{};", statement.text);
        }

        Commands::Render { script } => {
            let config = load_config(cli.config.as_deref(), &script)?;
            let parsed = parse_script_file(&script, &config)?;
            print!("{}", parsed.render());
        }

        Commands::Check { paths, pattern } => {
            let near = paths.first().map(PathBuf::as_path).unwrap_or(Path::new("."));
            let config = load_config(cli.config.as_deref(), near)?;
            let files = collect_script_files(&paths, &pattern)?;
            let scripts = parse_script_files(&files, &config)?;

            let mut total = 0;
            for script in &scripts {
                total += script.depth();
                for (tag, count) in script.duplicates() {
                    tracing::info!(script = script.name(), tag = %tag, count, "duplicate tag");
                }
            }
            println!("Checked {} scripts, {} statements", scripts.len(), total);
        }
    }

    Ok(())
}
