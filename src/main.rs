use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use affetto::{
    DataLayout, EditorConfig, OpenAiClient, OpenAiConfig, RuleSet, Selection, run_classify,
    run_consolidate, run_edit, run_split,
};

#[derive(Parser)]
#[command(name = "affetto")]
#[command(author, version, about = "Game dialogue emotion-annotation pipeline", long_about = None)]
struct Cli {
    /// Root of the data tree (csv/, audio/, output/)
    #[arg(long, default_value = "data", global = true)]
    data_root: PathBuf,

    /// Rule file (defaults to <data-root>/csv/rules.json)
    #[arg(long, global = true)]
    rules: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply deletion/narrator/gibberish edits and custom inserts to the raw transcripts
    Edit {
        /// Keep the narrator lines
        #[arg(long)]
        keep_narrator: bool,

        /// Do not add a "(gibberish)" prefix to lines in constructed languages
        #[arg(long)]
        keep_gibberish: bool,
    },

    /// Split edited transcripts and audio into aligned segments
    Split,

    /// Send each segment pair to the emotion model and write scored outputs
    Classify {
        /// Restrict to specific chapters: "<stem>" or "<stem>:<i>,<j>"
        #[arg(long = "chapter")]
        chapters: Vec<String>,
    },

    /// Combine the latest scored run of every chapter into one dataset
    Consolidate,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let layout = DataLayout::new(&cli.data_root);
    let rules_path = cli.rules.unwrap_or_else(|| layout.rules_file());

    match cli.command {
        Commands::Edit {
            keep_narrator,
            keep_gibberish,
        } => {
            let rules = RuleSet::load(&rules_path)?;
            let config = EditorConfig {
                keep_narrator,
                keep_gibberish,
                ..EditorConfig::default()
            };
            info!("Beginning custom edits");
            run_edit(&layout, &rules, &config)
        }
        Commands::Split => {
            let rules = RuleSet::load(&rules_path)?;
            run_split(&layout, &rules)
        }
        Commands::Classify { chapters } => {
            let selections = chapters
                .iter()
                .map(|c| Selection::parse(c))
                .collect::<Result<Vec<_>>>()
                .context("Invalid --chapter selection")?;

            let config = OpenAiConfig::from_env()?;
            let client = OpenAiClient::new(config);
            run_classify(&layout, &client, &selections).await
        }
        Commands::Consolidate => run_consolidate(&layout),
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}
