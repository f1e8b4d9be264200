// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! PinSchema CLI entry point

use clap::Parser;
use colored::Colorize;

mod cli;
use cli::{Cli, Commands};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments first to get log level
    let cli = Cli::parse();

    // -v wins over --log-level; RUST_LOG can still override the default
    let log_level = if cli.verbose {
        log::LevelFilter::Debug
    } else if let Some(level) = cli.log_level {
        level.to_level_filter()
    } else {
        log::LevelFilter::Warn
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    match cli.command {
        Commands::Version => {
            println!("{} {}", "PinSchema".bold().green(), pinschema::VERSION);
            println!("Pin type compatibility and autocast resolution");
            Ok(())
        }

        Commands::Resolve {
            output,
            input,
            catalog,
            context,
            config,
            format,
        } => cli::handle_resolve(catalog, config, output, input, context, format),

        Commands::Autocasts {
            catalog,
            config,
            format,
        } => cli::handle_autocasts(catalog, config, format),

        Commands::Categories { format } => cli::handle_categories(format),
    }
}
