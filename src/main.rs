//! Fortify SSL command line
//!
//! ```bash
//! # Generate CA + localhost certificate into ./ssl
//! fortify-ssl generate
//!
//! # Generate elsewhere and trust the CA right away
//! fortify-ssl generate --out-dir ~/.fortify --install
//!
//! # Trust an existing CA certificate
//! fortify-ssl install ~/.fortify/ca.pem
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fortify_ssl::configs::AppConfig;
use fortify_ssl::trust_store::{install_trusted_certificate, Platform};
use fortify_ssl::ChainGenerator;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Local CA and localhost certificate generator
#[derive(Parser, Debug)]
#[command(name = "fortify-ssl")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a new CA and localhost certificate
    Generate {
        /// Directory for ca.pem, cert.pem and key.pem
        #[arg(short, long)]
        out_dir: Option<PathBuf>,
        /// Install the CA into the trust stores after generation
        #[arg(long)]
        install: bool,
    },
    /// Install a CA certificate into the OS and browser trust stores
    Install {
        /// PEM certificate to trust
        cert_path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::load()?,
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match args.command {
        Command::Generate { out_dir, install } => {
            if let Some(dir) = out_dir {
                config.output.directory = dir;
            }
            let chain = ChainGenerator::default()
                .generate()
                .await
                .context("Failed to generate certificate chain")?;
            let paths = chain
                .write_to_dir(&config.output)
                .context("Failed to write certificate chain")?;
            println!("✓ CA certificate:        {}", paths.root.display());
            println!("✓ localhost certificate: {}", paths.cert.display());
            println!("✓ localhost private key: {}", paths.key.display());

            if install || config.trust.install {
                install_ca(&paths.root, &config)?;
            }
        }
        Command::Install { cert_path } => install_ca(&cert_path, &config)?,
    }

    Ok(())
}

fn install_ca(cert_path: &std::path::Path, config: &AppConfig) -> Result<()> {
    let platform = Platform::current();
    info!(%platform, cert = %cert_path.display(), "installing CA into trust stores");
    install_trusted_certificate(cert_path, &platform, &config.trust)
        .with_context(|| format!("Failed to install {} as a trusted CA", cert_path.display()))?;
    println!("✓ CA installed into {platform} trust stores");
    Ok(())
}
