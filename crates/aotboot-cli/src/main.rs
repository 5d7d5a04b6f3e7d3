use clap::{Parser, Subcommand};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use std::path::PathBuf;

mod commands;
mod error;

use commands::layout::LayoutFormat;

#[derive(Parser, Debug)]
#[command(name = "aotboot")]
#[command(about = "Inspect the native image bootstrap", long_about = None)]
struct Cli {
    #[command(flatten)]
    verbose: Verbosity<WarnLevel>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the object layout this runtime reads managed objects with
    Layout {
        /// Output format
        #[arg(long, value_enum, default_value_t = LayoutFormat::Text)]
        format: LayoutFormat,
    },

    /// Load, validate and print the effective bootstrap configuration
    Config {
        /// Config file to load instead of the one named by AOTBOOT_CONFIG
        #[arg(short, long, value_name = "PATH")]
        file: Option<PathBuf>,
    },

    /// List the diagnostic fallback stubs and their exported symbols
    Stubs,

    /// List the callback table slots in registration order
    Classlib,
}

fn main() -> miette::Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.verbose.log_level_filter())
        .parse_env(aotboot_rt::config::LOG_ENV)
        .init();

    let output = match cli.command {
        Command::Layout { format } => commands::layout::handle_layout(format)?,
        Command::Config { file } => commands::config::handle_config(file.as_deref())?,
        Command::Stubs => commands::stubs::handle_stubs(),
        Command::Classlib => commands::classlib::handle_classlib(),
    };
    print!("{}", output);
    Ok(())
}
