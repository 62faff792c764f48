//! # CLI
//!
//! This module defines the command-line interface of `todo-web` using `clap`.
//!
//! It is responsible for parsing user input and performing validation (e.g., ensuring headers are `key:value`);
use clap::{Parser, Subcommand, ValueEnum};
use std::time::Duration;
use todo_web_core::grpc_web::WireFormat;

#[derive(Parser, Debug)]
#[command(name = "todo-web", version, about = "gRPC-Web Todo client")]
pub struct Cli {
    /// Base URL of the gRPC-Web gateway
    #[arg(
        long,
        env = "TODO_WEB_URL",
        default_value = "http://localhost:8000",
        global = true
    )]
    pub url: String,

    /// Wire format used to talk to the gateway
    #[arg(long, value_enum, default_value_t = Format::Text, global = true)]
    pub format: Format,

    /// Give up on the call after this many seconds
    #[arg(long, value_parser = parse_timeout, global = true)]
    pub timeout: Option<Duration>,

    /// Metadata sent with the call (e.g. -H 'authorization: Bearer X')
    #[arg(short = 'H', long = "header", value_parser = parse_header, global = true)]
    pub headers: Vec<(String, String)>,

    /// Print responses as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Log every call to stderr (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// List every todo
    List,

    /// Show a single todo
    Get {
        /// Id of the todo
        id: String,
    },

    /// Add a new todo
    ///
    /// ## Examples:
    ///
    /// ```bash
    /// todo-web create --title "Buy milk" --description "2 litres"
    /// ```
    Create {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Mark the todo as completed
        #[arg(long)]
        completed: bool,
    },

    /// Replace an existing todo
    Update {
        /// Id of the todo
        id: String,
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Mark the todo as completed
        #[arg(long)]
        completed: bool,
    },

    /// Delete a todo
    Delete {
        /// Id of the todo
        id: String,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    /// application/grpc-web-text (base64)
    Text,
    /// application/grpc-web+proto
    Binary,
}

impl From<Format> for WireFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Text => WireFormat::Text,
            Format::Binary => WireFormat::Binary,
        }
    }
}

fn parse_header(s: &str) -> Result<(String, String), String> {
    s.split_once(':')
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .ok_or_else(|| "Format must be 'key:value'".to_string())
}

fn parse_timeout(value: &str) -> Result<Duration, String> {
    let secs: f64 = value
        .parse()
        .map_err(|_| format!("Invalid timeout '{value}': expected a number of seconds"))?;

    if !secs.is_finite() || secs <= 0.0 {
        return Err("Timeout must be a positive number of seconds".to_string());
    }

    Ok(Duration::from_secs_f64(secs))
}
