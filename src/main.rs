//! linfa-sentiment CLI binary.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use linfa_sentiment::config::ExperimentSettings;
use linfa_sentiment::experiment::{run_experiments, run_single};
use linfa_sentiment::report::{single_report, write_report};
use linfa_sentiment::vectorizer::VectorizerKind;
use linfa_sentiment::Result;
use sentiment_datasets::{load_sst2, Sst2Source};

/// Sentiment classifier comparison on SST-2
#[derive(Parser, Debug)]
#[command(name = "linfa-sentiment", version, about)]
struct Args {
    /// Directory receiving tables, charts and models
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// Read the parquet splits from this directory instead of downloading them
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Skip rendering PNG charts
    #[arg(long)]
    no_plots: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum Command {
    /// Run all eight classifier and vectorizer combinations (default)
    Compare,
    /// Train, evaluate and save a single random forest
    Single {
        #[arg(long, value_enum, default_value_t = VectorizerArg::Bow)]
        vectorizer: VectorizerArg,

        /// Remove English stop words before counting terms
        #[arg(long)]
        remove_stop_words: bool,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum VectorizerArg {
    Tfidf,
    Bow,
}

impl From<VectorizerArg> for VectorizerKind {
    fn from(arg: VectorizerArg) -> Self {
        match arg {
            VectorizerArg::Tfidf => VectorizerKind::Tfidf,
            VectorizerArg::Bow => VectorizerKind::BagOfWords,
        }
    }
}

impl Args {
    fn settings(&self) -> ExperimentSettings {
        let source = match &self.data_dir {
            Some(dir) => Sst2Source::Local { dir: dir.clone() },
            None => Sst2Source::default(),
        };

        ExperimentSettings {
            source,
            output_dir: self.output_dir.clone(),
            plots: !self.no_plots,
            ..Default::default()
        }
    }
}

fn run(args: Args) -> Result<()> {
    let settings = args.settings();
    std::fs::create_dir_all(&settings.output_dir)?;

    match args.command.unwrap_or(Command::Compare) {
        Command::Compare => {
            println!("Starting sentiment analysis classifier comparison...");
            let data = load_sst2(&settings.source)?;
            let records = run_experiments(&data, &settings)?;
            write_report(&records, &settings)?;
            println!("\nExperiment completed successfully.");
        }
        Command::Single {
            vectorizer,
            remove_stop_words,
        } => {
            println!("Starting sentiment analysis with Random Forest classification...");
            let data = load_sst2(&settings.source)?;
            let run = run_single(vectorizer.into(), remove_stop_words, &data, &settings)?;
            print!("{}", single_report(&run));
        }
    }

    Ok(())
}

fn main() {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
