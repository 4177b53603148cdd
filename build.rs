// build.rs

use clap::{Arg, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

fn build_cli() -> Command {
    Command::new("pkgident")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Pkgident Contributors")
        .about("Identify Apple installer items and installed package versions")
        .subcommand_required(false)
        .subcommand(
            Command::new("inspect")
                .about("Resolve an installer item's canonical identity")
                .arg(
                    Arg::new("item_path")
                        .required(true)
                        .help("Path to the installer item (.pkg, .mpkg, .dist, or a download dir)"),
                )
                .arg(
                    Arg::new("json")
                        .short('j')
                        .long("json")
                        .action(clap::ArgAction::SetTrue)
                        .help("Emit the metadata as JSON"),
                ),
        )
        .subcommand(
            Command::new("receipts")
                .about("List the sub-package receipts an installer item would register")
                .arg(Arg::new("item_path").required(true).help("Path to the installer item")),
        )
        .subcommand(
            Command::new("installed")
                .about("Look up the installed version of a package id")
                .arg(
                    Arg::new("package_id")
                        .required(true)
                        .help("Package id (e.g. com.example.app)"),
                ),
        )
        .subcommand(
            Command::new("locate")
                .about("Show which sub-path of a download is the installable unit")
                .arg(Arg::new("path").required(true).help("Path to the downloaded item")),
        )
        .subcommand(
            Command::new("completions")
                .about("Generate shell completion scripts")
                .arg(
                    Arg::new("shell")
                        .required(true)
                        .value_parser(["bash", "zsh", "fish", "powershell"])
                        .help("Shell type"),
                ),
        )
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Create man directory
    let out_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap());
    let man_dir = out_dir.join("man");
    fs::create_dir_all(&man_dir).expect("Failed to create man directory");

    // Generate main man page
    let cmd = build_cli();
    let man = Man::new(cmd);
    let mut buffer = Vec::new();
    man.render(&mut buffer).expect("Failed to render man page");

    let man_path = man_dir.join("pkgident.1");
    fs::write(&man_path, buffer).expect("Failed to write man page");

    println!("cargo:warning=Man page generated at {}", man_path.display());
}
