// Copyright (C) 2025 Nuwaira
// All Rights Reserved.
//
// NOTICE: All information contained herein is, and remains
// the property of Nuwaira.
// The intellectual and technical concepts contained
// herein are proprietary to Nuwaira
// and are protected by trade secret or copyright law.
// Dissemination of this information or reproduction of this material
// is strictly forbidden unless prior written permission is obtained
// from Nuwaira.
use clap::{Parser, Subcommand};
use std::process::exit;

use databricks_mcp::config::{Config, DEFAULT_CONFIG_FILE};
use databricks_mcp::{check, server};

#[derive(Parser, Debug)]
#[command(name = "databricks-mcp")]
#[command(about = "MCP server exposing Databricks SQL warehouses and jobs to agentic AI")]
#[command(author, version, long_about=None)]
struct Args {
    /// Settings file (default: databricks-mcp.conf, optional)
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<CommandEnum>,
}

/// Enum of subcommands
#[derive(Subcommand, Debug)]
enum CommandEnum {
    /// Run the MCP server over stdio (default)
    Run,
    /// Check the Databricks credentials, REST API and SQL warehouse connectivity
    Check,
    /// Print version info
    Version,
}

fn parse_args() -> (Args, Config) {
    dotenv::dotenv().ok();

    let args = Args::parse();

    let config: Config = Config::from_arg(args.config.as_deref()).unwrap_or_else(|err| {
        eprintln!(
            "Error reading config file {}: {}",
            args.config.as_deref().unwrap_or(DEFAULT_CONFIG_FILE),
            err
        );
        exit(1);
    });

    (args, config)
}

#[tokio::main]
async fn main() {
    let (args, config) = parse_args();

    match args.command.unwrap_or(CommandEnum::Run) {
        CommandEnum::Run => {
            server::init_logging();
            if let Err(e) = server::run(config).await {
                eprintln!("Server error: {}", e);
                exit(1);
            }
        }
        CommandEnum::Check => {
            server::init_logging();
            if !check::check_connection(&config).await {
                exit(1);
            }
        }
        CommandEnum::Version => {
            println!("databricks-mcp {}", env!("CARGO_PKG_VERSION"));
        }
    }
}
