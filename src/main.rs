use anyhow::Context;
use clap::{Parser, Subcommand};
use log::info;
use std::path::PathBuf;

use reviewguard::{corpus, pipeline, ArtifactStore, Detector, ScrapeOptions, TrainOptions};

#[derive(Parser)]
#[command(name = "reviewguard", about = "Fake product-review detector", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Train a detector from a labeled CSV corpus and save the artifact
    Train {
        /// CSV file with `review` and `label` columns
        #[arg(long)]
        corpus: PathBuf,
        /// Directory for the model artifact (defaults to the cache dir)
        #[arg(long)]
        model_dir: Option<PathBuf>,
        /// Fold username, rating and date columns into the classified text
        #[arg(long)]
        include_metadata: bool,
    },
    /// Classify a single review
    Predict {
        text: String,
        #[arg(long)]
        model_dir: Option<PathBuf>,
    },
    /// Scrape a product's reviews and classify the whole batch
    Analyze {
        url: String,
        /// Review pages to fetch
        #[arg(long, default_value_t = 5)]
        pages: usize,
        #[arg(long)]
        model_dir: Option<PathBuf>,
    },
    /// Generate a synthetic labeled corpus CSV
    Synth {
        /// Base CSV of templates (built-in templates when omitted)
        #[arg(long)]
        input: Option<PathBuf>,
        #[arg(long)]
        output: PathBuf,
        /// Copies of the base set to emit
        #[arg(long, default_value_t = 5)]
        multiplier: usize,
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },
}

fn open_store(model_dir: Option<PathBuf>) -> anyhow::Result<ArtifactStore> {
    let store = match model_dir {
        Some(dir) => ArtifactStore::new(dir)?,
        None => ArtifactStore::new_default()?,
    };
    Ok(store)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Train {
            corpus: corpus_path,
            model_dir,
            include_metadata,
        } => {
            let records = corpus::load_csv(&corpus_path)
                .with_context(|| format!("reading corpus {}", corpus_path.display()))?;
            info!("loaded {} labeled reviews", records.len());

            let options = corpus::CorpusOptions { include_metadata };
            let prepared = corpus::prepare(&records, &options);

            let started = std::time::Instant::now();
            let (trained, report) = pipeline::train(&prepared, &TrainOptions::default())?;
            info!("training finished in {:.1}s", started.elapsed().as_secs_f64());

            let store = open_store(model_dir)?;
            store.save(&trained)?;
            println!("{report}");
            println!("model saved to {}", store.artifact_path().display());
        }
        Command::Predict { text, model_dir } => {
            let detector = Detector::open(&open_store(model_dir)?);
            let prediction = detector.predict(&text)?;
            println!(
                "{}",
                serde_json::json!({
                    "prediction": prediction.label.as_str(),
                    "confidence": prediction.confidence_display(),
                })
            );
        }
        Command::Analyze {
            url,
            pages,
            model_dir,
        } => {
            let detector = Detector::open(&open_store(model_dir)?);
            let options = ScrapeOptions {
                max_pages: pages,
                ..ScrapeOptions::default()
            };
            let reviews = reviewguard::scraper::scrape_reviews(&url, &options).await?;
            info!("scraped {} reviews", reviews.len());

            let report = detector.analyze(&reviews)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Synth {
            input,
            output,
            multiplier,
            seed,
        } => {
            let base = match input {
                Some(path) => corpus::load_csv(&path)
                    .with_context(|| format!("reading templates {}", path.display()))?,
                None => corpus::synth::base_templates(),
            };
            let records = corpus::synth::enhance(&base, multiplier, seed);
            corpus::write_csv(&output, &records)?;
            println!("wrote {} reviews to {}", records.len(), output.display());
        }
    }

    Ok(())
}
