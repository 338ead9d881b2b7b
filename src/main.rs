//! # palaver - Encrypted Peer-to-Peer Messaging
//!
//! Entry point for the interactive tool.

use clap::Parser;
use console::style;
use std::path::PathBuf;
use std::process;

use palaver::cli::{menu, setup_logging};
use palaver::Config;

/// palaver - encrypted peer-to-peer messaging over AES and Diffie-Hellman
#[derive(Parser)]
#[command(
    name = "palaver",
    version,
    about = "Encrypted peer-to-peer messaging over AES and Diffie-Hellman",
    long_about = None,
    after_help = "Examples:\n  \
        palaver\n  \
        palaver -c palaver.toml\n  \
        palaver --init-config > palaver.toml\n  \
        palaver -v\n\n\
        One peer chooses \"Listen\", the other \"Request new connection\";\n\
        the shared key is negotiated automatically on connect.",
    styles = get_styles(),
)]
struct Cli {
    /// Config file path (compiled-in defaults when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Minimal output
    #[arg(short, long)]
    quiet: bool,

    /// Print a config template and exit
    #[arg(long)]
    init_config: bool,
}

fn get_styles() -> clap::builder::Styles {
    clap::builder::Styles::styled()
        .usage(
            clap::builder::styling::AnsiColor::BrightCyan
                .on_default()
                .bold(),
        )
        .header(
            clap::builder::styling::AnsiColor::BrightCyan
                .on_default()
                .bold(),
        )
        .literal(clap::builder::styling::AnsiColor::BrightGreen.on_default())
        .placeholder(clap::builder::styling::AnsiColor::Cyan.on_default())
}

fn main() {
    let cli = Cli::parse();

    if cli.init_config {
        print!("{}", palaver::config::example_config());
        return;
    }

    setup_logging(cli.verbose, cli.quiet);

    let result = Config::load(cli.config.as_deref()).and_then(|config| menu::run(&config));

    if let Err(e) = result {
        eprintln!("{} Error: {}", style("✗").red().bold(), e);
        process::exit(1);
    }
}
