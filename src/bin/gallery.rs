//! Inspect a persisted embedding gallery: list registered identities,
//! the model that produced each embedding, and its dimensionality.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser;

use facematch::EmbeddingStore;

#[derive(Parser, Debug)]
#[command(name = "gallery")]
#[command(about = "List identities registered in a face embedding gallery")]
struct Args {
    /// Path to the persisted embedding store
    #[arg(long, default_value = "gallery/embeddings.bin")]
    store: PathBuf,
}

fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> anyhow::Result<()> {
    let store = EmbeddingStore::load(&args.store)
        .with_context(|| format!("cannot open gallery at {}", args.store.display()))?;

    println!("Registered faces: {}", store.len());
    let mut entries: Vec<_> = store.records().collect();
    entries.sort_by(|(a, _), (b, _)| a.cmp(b));
    for (id, record) in entries {
        println!(
            "  - {id} (model: {}, dimension: {})",
            record.model_id,
            record.embedding.len()
        );
    }

    Ok(())
}
