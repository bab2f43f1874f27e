use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use dupfinder::store::SledStore;
use dupfinder::{config, disposal, fingerprint, index, resolve, review, FingerprintStore, Settings};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "dupfinder", version, about = "Find and remove duplicate pictures")]
struct Cli {
    /// Location of the fingerprint database
    #[arg(long, value_name = "PATH", default_value = "./db", global = true)]
    db: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Hash images under the given paths into the database
    Add {
        #[arg(required = true, value_name = "PATH")]
        paths: Vec<PathBuf>,

        /// Number of parallel hashing workers (default: CPU count)
        #[arg(long, value_name = "N")]
        parallel: Option<usize>,

        /// Perceptual hash size, rounded up to the next power of two
        #[arg(long, value_name = "N", default_value_t = config::DEFAULT_HASH_SIZE)]
        hash_size: u32,
    },

    /// Drop database entries for images under the given paths
    Remove {
        #[arg(required = true, value_name = "PATH")]
        paths: Vec<PathBuf>,
    },

    /// Delete every record in the database
    Clear,

    /// Print all records and a total
    Show,

    /// Resolve duplicate clusters, then review, print, or delete them
    Find {
        /// Only print duplicate clusters as JSON
        #[arg(long)]
        print: bool,

        /// Move all redundant cluster members to the trash
        /// (takes priority over --print)
        #[arg(long)]
        delete: bool,

        /// Require matching capture times within a cluster
        #[arg(long)]
        match_time: bool,

        /// Where disposed files are moved
        #[arg(long, value_name = "PATH", default_value = config::DEFAULT_TRASH)]
        trash: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    // The store is the single source of truth; nothing runs without it.
    let store = SledStore::open(&cli.db)
        .with_context(|| format!("Failed to open database at {}", cli.db.display()))?;

    match cli.command {
        Commands::Add {
            paths,
            parallel,
            hash_size,
        } => {
            check_paths(&paths)?;
            let settings = Settings {
                hash_size: fingerprint::normalize_hash_size(hash_size),
                parallelism: parallel.unwrap_or_else(num_cpus::get),
                ..Settings::default()
            };
            let added = index::add(&paths, &store, &settings)?;
            println!("Added {} file(s)", added);
        }

        Commands::Remove { paths } => {
            check_paths(&paths)?;
            let removed = index::remove(&paths, &store)?;
            println!("Removed {} record(s)", removed);
        }

        Commands::Clear => {
            store.clear()?;
            println!("Database cleared");
        }

        Commands::Show => {
            let records = store.all()?;
            for record in &records {
                println!("{}", serde_json::to_string(record)?);
            }
            println!("Total: {}", records.len());
        }

        Commands::Find {
            print,
            delete,
            match_time,
            trash,
        } => {
            let clusters = resolve::find(&store, match_time)?;

            if delete {
                let report = disposal::delete_duplicates(&clusters, &store, &trash);
                println!("Deleted {}/{} files", report.deleted, report.attempted);
            } else if print {
                println!("{}", serde_json::to_string_pretty(&clusters)?);
                println!("Number of duplicates: {}", clusters.len());
            } else {
                review::run(&clusters, &store, &trash)?;
            }
        }
    }

    Ok(())
}

fn check_paths(paths: &[PathBuf]) -> Result<()> {
    for path in paths {
        if !path.exists() {
            bail!("Path does not exist: {}", path.display());
        }
    }
    Ok(())
}
