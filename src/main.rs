use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use private_ledger::cli::{
    decrypt::HintArgs, handle_decrypt_command, handle_inspect_command, handle_seal_command,
};
use private_ledger::config::{LedgerPaths, Settings};

#[derive(Parser)]
#[command(
    name = "pledger",
    version,
    about = "Inspect, recover, and seal FHE-encrypted expense records",
    long_about = "pledger works with the ciphertext blobs of an FHE-encrypted \
                  expense ledger: it classifies their envelopes, runs the \
                  decryption/recovery ladder offline, and seals new records \
                  into the local ciphertext store."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify a blob's envelope and report its canonical form
    Inspect {
        /// Path to the blob file
        file: PathBuf,
        /// Treat the file as base64-encoded
        #[arg(long)]
        base64: bool,
    },

    /// Run the decryption/recovery ladder over a blob
    Decrypt {
        /// Path to the blob file
        #[arg(required_unless_present = "cid", conflicts_with = "cid")]
        file: Option<PathBuf>,
        /// Fetch the blob from the local ciphertext store instead
        #[arg(long)]
        cid: Option<String>,
        /// Treat the file as base64-encoded
        #[arg(long)]
        base64: bool,
        /// Contract address override
        #[arg(short, long, env = "PRIVATE_LEDGER_CONTRACT")]
        contract: Option<String>,
        /// Fallback amount used when no tier can recover the record
        #[arg(long)]
        hint_amount: Option<f64>,
        /// Currency for the fallback amount
        #[arg(long)]
        hint_currency: Option<String>,
        /// Category for the fallback amount
        #[arg(long)]
        hint_category: Option<String>,
    },

    /// Seal an expense and store its blob locally
    Seal {
        /// Expense amount
        amount: f64,
        /// Spending category
        category: String,
        /// ISO currency code
        #[arg(short = 'u', long)]
        currency: Option<String>,
        /// Free-form note
        #[arg(short, long)]
        note: Option<String>,
        /// Contract address override
        #[arg(short, long, env = "PRIVATE_LEDGER_CONTRACT")]
        contract: Option<String>,
    },

    /// Show current configuration and paths
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let paths = LedgerPaths::new()?;
    let settings = Settings::load_or_create(&paths)?;

    match cli.command {
        Commands::Inspect { file, base64 } => {
            handle_inspect_command(&settings, &file, base64)?;
        }
        Commands::Decrypt {
            file,
            cid,
            base64,
            contract,
            hint_amount,
            hint_currency,
            hint_category,
        } => {
            handle_decrypt_command(
                &paths,
                &settings,
                file.as_deref(),
                cid.as_deref(),
                base64,
                contract.as_deref(),
                HintArgs {
                    amount: hint_amount,
                    currency: hint_currency,
                    category: hint_category,
                },
            )
            .await?;
        }
        Commands::Seal {
            amount,
            category,
            currency,
            note,
            contract,
        } => {
            handle_seal_command(
                &paths,
                &settings,
                amount,
                category,
                currency,
                note,
                contract.as_deref(),
            )
            .await?;
        }
        Commands::Config => {
            println!("Base directory:  {}", paths.base_dir().display());
            println!("Settings file:   {}", paths.settings_file().display());
            println!("Ciphertext dir:  {}", paths.cipher_dir().display());
            println!("Relayer URL:     {}", settings.relayer_url);
            println!(
                "Contract:        {}",
                settings.contract_address.as_deref().unwrap_or("(not set)")
            );
            println!("Cipher cutoff:   {} bytes", settings.min_cipher_bytes);
        }
    }

    Ok(())
}
