// src/main.rs

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use pkgident::locate::find_installer_item;
use pkgident::Resolver;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "pkgident")]
#[command(author, version, about = "Identify Apple installer items and installed package versions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve an installer item's canonical identity
    Inspect {
        /// Path to the installer item (.pkg, .mpkg, .dist, or a download dir)
        item_path: PathBuf,
        /// Emit the metadata as JSON
        #[arg(short, long, action = clap::ArgAction::SetTrue)]
        json: bool,
    },
    /// List the sub-package receipts an installer item would register
    Receipts {
        /// Path to the installer item
        item_path: PathBuf,
    },
    /// Look up the installed version of a package id
    Installed {
        /// Package id (e.g. com.example.app)
        package_id: String,
    },
    /// Show which sub-path of a download is the installable unit
    Locate {
        /// Path to the downloaded item
        path: PathBuf,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell type
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() -> Result<()> {
    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Inspect { item_path, json }) => {
            info!("Inspecting installer item: {}", item_path.display());

            let resolver = Resolver::new()?;
            let metadata = resolver.package_metadata(&item_path);

            if json {
                println!("{}", serde_json::to_string_pretty(&metadata)?);
                return Ok(());
            }

            if metadata.name.is_empty() && metadata.receipts.is_empty() {
                println!("No installer item found at: {}", item_path.display());
                return Ok(());
            }

            println!("Name:    {}", metadata.name);
            println!("Version: {}", metadata.version);
            if let Some(display_name) = &metadata.display_name {
                println!("Title:   {}", display_name);
            }
            if let Some(description) = &metadata.description {
                println!("About:   {}", description);
            }
            if let Some(action) = &metadata.restart_action {
                println!("Restart: {}", action.as_str());
            }
            if let Some(kb) = metadata.installed_size_kb {
                println!("Size:    {} KB installed", kb);
            }
            println!("Receipts: {}", metadata.receipts.len());
            for receipt in &metadata.receipts {
                println!("  {} {}", receipt.package_id, receipt.version);
            }
            Ok(())
        }
        Some(Commands::Receipts { item_path }) => {
            let resolver = Resolver::new()?;
            let receipts = match find_installer_item(&item_path) {
                Some(item) => resolver.receipt_info(&item),
                None => Vec::new(),
            };

            if receipts.is_empty() {
                println!("No sub-package receipts found");
            }
            for receipt in receipts {
                match receipt.installed_size_kb {
                    Some(kb) => {
                        println!("{} {} ({} KB)", receipt.package_id, receipt.version, kb)
                    }
                    None => println!("{} {}", receipt.package_id, receipt.version),
                }
            }
            Ok(())
        }
        Some(Commands::Installed { package_id }) => {
            let resolver = Resolver::new()?;
            let version = resolver.installed_version(&package_id);

            if version.is_empty() {
                println!("{} is not installed", package_id);
            } else {
                println!("{} {}", package_id, version);
            }
            Ok(())
        }
        Some(Commands::Locate { path }) => {
            match find_installer_item(&path) {
                Some(item) => println!("{}", item.display()),
                None => println!("No installer item found at: {}", path.display()),
            }
            Ok(())
        }
        Some(Commands::Completions { shell }) => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "pkgident", &mut std::io::stdout());
            Ok(())
        }
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    }
}
