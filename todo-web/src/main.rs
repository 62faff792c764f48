//! # Todo Web CLI Entry Point
//!
//! The main executable for the `todo-web` tool. This file drives the application lifecycle:
//!
//! 1. **Initialization**: Parses command-line arguments using [`cli::Cli`] and installs logging.
//! 2. **Configuration**: Builds a `TodoServiceClient` for the gateway URL and wire format.
//! 3. **Execution**: Builds the request message and performs exactly one call.
//! 4. **Presentation**: Formats and prints the decoded response or error to standard output/error.

mod cli;
mod formatter;

use anyhow::Context;
use clap::Parser;
use cli::{Cli, Commands};
use formatter::{FormattedString, GenericError};
use serde::Serialize;
use std::{future::Future, process, time::Duration};
use todo_web_core::{
    grpc_web::{CallError, GrpcWebClient},
    todo::{
        TodoService, TodoServiceClient,
        pb::{Empty, Todo, TodoId},
    },
};
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() {
    let args = Cli::parse();

    init_tracing(args.verbose);

    let client = match build_client(&args) {
        Ok(client) => client,
        Err(err) => {
            eprintln!("{}", FormattedString::from(err));
            process::exit(1);
        }
    };

    let output = Output {
        json: args.json,
        timeout: args.timeout,
    };
    let headers = args.headers;

    match args.command {
        Commands::List => {
            let list = output.call(client.get_all(Empty {}, headers)).await;
            output.print(list);
        }
        Commands::Get { id } => {
            let todo = output.call(client.get_by_id(TodoId { id }, headers)).await;
            output.print(todo);
        }
        Commands::Create {
            title,
            description,
            completed,
        } => {
            let request = Todo {
                id: String::new(),
                title,
                description,
                completed,
            };
            let todo = output.call(client.create(request, headers)).await;
            output.print(todo);
        }
        Commands::Update {
            id,
            title,
            description,
            completed,
        } => {
            let request = Todo {
                id,
                title,
                description,
                completed,
            };
            let todo = output.call(client.update(request, headers)).await;
            output.print(todo);
        }
        Commands::Delete { id } => {
            output
                .call(client.delete(TodoId { id: id.clone() }, headers))
                .await;
            if output.json {
                println!("{}", FormattedString::from(serde_json::json!({ "deleted": id })));
            } else {
                println!("{}", FormattedString(format!("Deleted todo #{id}")));
            }
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn build_client(args: &Cli) -> anyhow::Result<TodoServiceClient> {
    let client = GrpcWebClient::http(&args.url)
        .with_context(|| format!("Failed to configure a client for '{}'", args.url))?
        .format(args.format.into());

    debug!(url = %args.url, format = ?args.format, "client configured");

    Ok(TodoServiceClient::new(client))
}

/// Presentation settings shared by every command.
struct Output {
    json: bool,
    timeout: Option<Duration>,
}

impl Output {
    /// Awaits a call, exiting the process with a formatted error on failure.
    async fn call<T>(&self, call: impl Future<Output = Result<T, CallError>>) -> T {
        let result = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(result) => result,
                Err(elapsed) => {
                    eprintln!("{}", FormattedString::from(GenericError("Call timed out", elapsed)));
                    process::exit(1);
                }
            },
            None => call.await,
        };

        match result {
            Ok(value) => value,
            Err(err) => {
                eprintln!("{}", FormattedString::from(err));
                process::exit(1);
            }
        }
    }

    fn render<T>(&self, value: T) -> Result<FormattedString, serde_json::Error>
    where
        T: Serialize + Into<FormattedString>,
    {
        if self.json {
            serde_json::to_value(&value).map(FormattedString::from)
        } else {
            Ok(value.into())
        }
    }

    fn print<T>(&self, value: T)
    where
        T: Serialize + Into<FormattedString>,
    {
        match self.render(value) {
            Ok(formatted) => println!("{formatted}"),
            Err(err) => {
                eprintln!("{}", FormattedString::from(GenericError("Invalid response", err)));
                process::exit(1);
            }
        }
    }
}
