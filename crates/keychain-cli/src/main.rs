//! Keychain command line front end.
//!
//! # Usage
//!
//! ```bash
//! export KEYCHAIN_MASTER_PASSWORD='master-password'
//!
//! keychain --vault vault.json init
//! keychain --vault vault.json set example.com securePassword123
//! keychain --vault vault.json get example.com
//! keychain --vault vault.json remove example.com
//! keychain --vault vault.json check
//! ```

mod vault_file;

use std::{
    io::{self, Write},
    num::NonZeroU32,
    path::PathBuf,
    process::ExitCode,
};

use clap::{Parser, Subcommand};
use keychain_core::{KdfParams, Keychain, KeychainConfig, SystemEnv};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use vault_file::{CliError, VaultFile};

/// Encrypted domain→password keychain
#[derive(Parser, Debug)]
#[command(name = "keychain")]
#[command(about = "Blinded, tamper-evident password keychain")]
#[command(version)]
struct Args {
    /// Path to the vault file
    #[arg(short, long, default_value = "keychain.json")]
    vault: PathBuf,

    /// Environment variable holding the master password
    #[arg(long, default_value = "KEYCHAIN_MASTER_PASSWORD")]
    password_env: String,

    /// Skip checksum verification when opening the vault (read-only
    /// commands only; `set` and `remove` refuse to run with it)
    #[arg(long)]
    no_verify: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an empty vault
    Init {
        /// PBKDF2 iteration count
        #[arg(long, default_value_t = KdfParams::default().iterations)]
        iterations: NonZeroU32,
    },
    /// Store or replace the password for a domain
    Set {
        /// Domain name
        domain: String,
        /// Password to store
        password: String,
    },
    /// Print the password for a domain
    Get {
        /// Domain name
        domain: String,
    },
    /// Delete the entry for a domain
    Remove {
        /// Domain name
        domain: String,
    },
    /// Verify the vault and report its entry count
    Check,
}

fn main() -> ExitCode {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer().with_writer(io::stderr)).with(filter).init();

    match run(&args) {
        Ok(code) => code,
        Err(err) => {
            tracing::error!(error = %err, "command failed");
            let _ = writeln!(io::stderr(), "keychain: {err}");
            ExitCode::from(2)
        },
    }
}

fn run(args: &Args) -> Result<ExitCode, CliError> {
    let password = std::env::var(&args.password_env)
        .map_err(|_| CliError::MissingPassword(args.password_env.clone()))?;
    let mut stdout = io::stdout().lock();
    let io_err = |source| CliError::Io { path: PathBuf::from("<stdout>"), source };

    match &args.command {
        Command::Init { iterations } => {
            if args.vault.exists() {
                return Err(CliError::VaultExists(args.vault.clone()));
            }
            let config = KeychainConfig { kdf: KdfParams { iterations: *iterations } };
            let keychain = Keychain::init_with(&password, None, config, SystemEnv::new())?;
            VaultFile::from_keychain(&keychain, config).write(&args.vault)?;

            tracing::info!(vault = %args.vault.display(), "vault created");
            Ok(ExitCode::SUCCESS)
        },
        Command::Set { domain, password: value } => {
            refuse_unverified_write(args)?;
            let vault = VaultFile::read(&args.vault)?;
            let mut keychain = vault.open(&password, true)?;
            keychain.set(domain, value);
            VaultFile::from_keychain(&keychain, vault.config).write(&args.vault)?;
            Ok(ExitCode::SUCCESS)
        },
        Command::Get { domain } => {
            let keychain = VaultFile::read(&args.vault)?.open(&password, !args.no_verify)?;
            match keychain.get(domain) {
                Some(value) => {
                    writeln!(stdout, "{}", value.as_str()).map_err(io_err)?;
                    Ok(ExitCode::SUCCESS)
                },
                None => Ok(ExitCode::FAILURE),
            }
        },
        Command::Remove { domain } => {
            refuse_unverified_write(args)?;
            let vault = VaultFile::read(&args.vault)?;
            let mut keychain = vault.open(&password, true)?;
            if !keychain.remove(domain) {
                return Ok(ExitCode::FAILURE);
            }
            VaultFile::from_keychain(&keychain, vault.config).write(&args.vault)?;
            Ok(ExitCode::SUCCESS)
        },
        Command::Check => {
            let keychain = VaultFile::read(&args.vault)?.open(&password, true)?;
            writeln!(stdout, "ok: {} entries", keychain.len()).map_err(io_err)?;
            Ok(ExitCode::SUCCESS)
        },
    }
}

// Rewriting re-checksums the store, which would bless unverified contents
fn refuse_unverified_write(args: &Args) -> Result<(), CliError> {
    if args.no_verify {
        return Err(CliError::UnverifiedWrite);
    }
    Ok(())
}
