//! # Retrosynth CLI
//!
//! Command-line interface for predicting reactants from a product molecule.
//!
//! Usage:
//!   retrosynth predict <SMILES> --class <name>
//!   retrosynth runs
//!   retrosynth check <SMILES>
//!
//! Examples:
//!   retrosynth predict "C1=CC=CC=C1" --class Hydrogenation
//!   retrosynth predict "CC(=O)Oc1ccccc1C(=O)O" --class Esterification --store .retrosynth_runs
//!   retrosynth runs --store .retrosynth_runs
//!   retrosynth check "C1=CC=CC=C1"
//!
//! Configuration comes from the environment (a `.env` file is loaded if
//! present): `OPENAI_API_KEY` is required for `predict`; `RETROSYNTH_MODEL`
//! and `RETROSYNTH_BASE_URL` select the fine-tuned model and endpoint.

use clap::{Parser, Subcommand};
use retrosynth_agent::{LoopOutcome, RefineConfig, Refiner};
use retrosynth_core::{
    FileStore, OpenAiPredictor, PredictorConfig, PubChemRegistry, RegistryConfig, RunRecord,
    RunStore, SmilesChecker, ValidityOracle,
};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "retrosynth")]
#[command(author, version, about = "Retrosynth - reactant prediction from product molecules")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Quiet mode - only show the predicted reactants
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Predict precursor reactants for a product molecule
    Predict {
        /// Product molecule in SMILES notation (e.g., C1=CC=CC=C1)
        product: String,

        /// Reaction class (e.g., Hydrogenation)
        #[arg(short = 'c', long = "class")]
        reaction_class: String,

        /// Maximum predictor calls before giving up
        #[arg(long, default_value = "25")]
        max_iterations: u32,

        /// Persist the run transcript into this directory
        #[arg(long)]
        store: Option<String>,
    },
    /// List persisted run transcripts
    Runs {
        /// Directory holding run transcripts
        #[arg(long, default_value = ".retrosynth_runs")]
        store: String,
    },
    /// Check whether a SMILES string is structurally well-formed
    Check {
        /// Molecule in SMILES notation
        smiles: String,
    },
}

async fn run_predict(
    product: &str,
    reaction_class: &str,
    max_iterations: u32,
    store: Option<&str>,
    quiet: bool,
) {
    let oracle = SmilesChecker::new();
    if !oracle.is_valid(product) {
        eprintln!("Invalid product SMILES: {}", product);
        eprintln!("Please enter a structurally well-formed SMILES string.");
        std::process::exit(1);
    }

    let api_key = match std::env::var("OPENAI_API_KEY") {
        Ok(key) => key,
        Err(_) => {
            eprintln!("No OpenAI API key found. Set OPENAI_API_KEY in .env or the environment.");
            std::process::exit(1);
        }
    };

    let mut config = PredictorConfig::openai(api_key);
    if let Ok(model) = std::env::var("RETROSYNTH_MODEL") {
        config = config.with_model(model);
    }
    if let Ok(base_url) = std::env::var("RETROSYNTH_BASE_URL") {
        config = config.with_base_url(base_url);
    }

    let predictor = match OpenAiPredictor::new(config) {
        Ok(predictor) => predictor,
        Err(e) => {
            eprintln!("Failed to initialize predictor: {}", e);
            std::process::exit(1);
        }
    };

    let registry = match PubChemRegistry::new(RegistryConfig::default()) {
        Ok(registry) => registry,
        Err(e) => {
            eprintln!("Failed to initialize registry: {}", e);
            std::process::exit(1);
        }
    };

    let refiner = Refiner::new(Arc::new(predictor), Arc::new(oracle), Arc::new(registry))
        .with_config(RefineConfig::default().with_max_iterations(max_iterations));

    if !quiet {
        println!("Predicting reactants for {} ({})...", product, reaction_class);
    }

    let record = RunRecord::begin(product, reaction_class);
    let outcome = refiner.run(product, reaction_class).await;

    render_outcome(&outcome, quiet);

    if let Some(dir) = store {
        save_record(record, &outcome, dir, quiet);
    }

    if !outcome.is_accepted() {
        std::process::exit(1);
    }
}

fn render_outcome(outcome: &LoopOutcome, quiet: bool) {
    let trace = outcome.trace();

    if trace.is_empty() {
        println!("No reactants predicted.");
    } else {
        if !quiet {
            println!("\nPredicted reactants:");
        }
        for (i, reactant) in trace.iter().enumerate() {
            // only an accepted run's final candidate is registry-known
            let label = if outcome.is_accepted() && i == trace.len() - 1 {
                "Commercially Known"
            } else {
                "Not Commercially Known"
            };
            println!("  Reactant {}: {} ({})", i + 1, reactant, label);
        }
    }

    if !quiet {
        println!("\nOutcome: {}", outcome.summary());
    }
}

fn save_record(record: RunRecord, outcome: &LoopOutcome, dir: &str, quiet: bool) {
    let record = record.finish(
        outcome.trace().to_vec(),
        outcome.summary(),
        outcome.iterations(),
    );

    match FileStore::new(dir) {
        Ok(store) => match store.save(&record) {
            Ok(()) => {
                if !quiet {
                    println!("Saved run {} to {}", record.id, dir);
                }
            }
            Err(e) => eprintln!("Failed to save run record: {}", e),
        },
        Err(e) => eprintln!("Failed to open run store {}: {}", dir, e),
    }
}

fn list_runs(dir: &str) {
    let store = match FileStore::new(dir) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Failed to open run store {}: {}", dir, e);
            std::process::exit(1);
        }
    };

    let ids = match store.list() {
        Ok(ids) => ids,
        Err(e) => {
            eprintln!("Failed to list runs: {}", e);
            std::process::exit(1);
        }
    };

    println!("Runs in {}:", dir);
    if ids.is_empty() {
        println!("  (no runs found)");
        return;
    }

    for id in ids {
        match store.load(&id) {
            Ok(record) => println!(
                "  - {}: {} [{}] -> {} candidate(s), {}",
                record.id,
                record.product,
                record.reaction_class,
                record.trace.len(),
                record.outcome
            ),
            Err(e) => println!("  - {}: (unreadable: {})", id, e),
        }
    }
}

fn check_smiles(smiles: &str) {
    if SmilesChecker::new().is_valid(smiles) {
        println!("{} is structurally well-formed", smiles);
    } else {
        println!("{} is NOT structurally well-formed", smiles);
        std::process::exit(1);
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Predict {
            product,
            reaction_class,
            max_iterations,
            store,
        } => {
            run_predict(
                &product,
                &reaction_class,
                max_iterations,
                store.as_deref(),
                cli.quiet,
            )
            .await;
        }
        Commands::Runs { store } => {
            list_runs(&store);
        }
        Commands::Check { smiles } => {
            check_smiles(&smiles);
        }
    }
}
