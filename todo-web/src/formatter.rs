use colored::*;
use std::fmt::Display;
use todo_web_core::{
    grpc_web::CallError,
    todo::pb::{Todo, TodoList},
};

/// A wrapper struct for a formatted, colored string.
///
/// Implements `Display` so it can be printed directly.
pub struct FormattedString(pub String);

pub struct GenericError<T: Display>(pub &'static str, pub T);

impl std::fmt::Display for FormattedString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f)?;
        writeln!(f, "{}", self.0)?;
        Ok(())
    }
}

impl From<serde_json::Value> for FormattedString {
    fn from(value: serde_json::Value) -> Self {
        FormattedString(serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string()))
    }
}

impl From<Todo> for FormattedString {
    fn from(todo: Todo) -> Self {
        let status = if todo.completed {
            "Completed".green()
        } else {
            "Not completed".yellow()
        };

        let mut out = format!("{} {}", format!("#{}", todo.id).cyan(), todo.title.bold());
        if !todo.description.is_empty() {
            out.push_str(&format!("\n  {}", todo.description));
        }
        out.push_str(&format!("\n  {status}"));
        FormattedString(out)
    }
}

impl From<TodoList> for FormattedString {
    fn from(TodoList { todos }: TodoList) -> Self {
        if todos.is_empty() {
            return FormattedString("No todos found.".yellow().to_string());
        }

        let out = todos
            .into_iter()
            .map(|todo| FormattedString::from(todo).0)
            .collect::<Vec<_>>()
            .join("\n\n");
        FormattedString(out)
    }
}

impl From<CallError> for FormattedString {
    fn from(err: CallError) -> Self {
        match err {
            CallError::Status(status) => FormattedString(format!(
                "{} code={:?} message={:?}",
                "gRPC Failed:".red().bold(),
                status.code(),
                status.message()
            )),
            err => FormattedString(format!("{}\n\n'{}'", "Call Failed:".red().bold(), err)),
        }
    }
}

impl From<anyhow::Error> for FormattedString {
    fn from(err: anyhow::Error) -> Self {
        FormattedString(format!("{}\n\n'{:#}'", "Error:".red().bold(), err))
    }
}

impl<T: Display> From<GenericError<T>> for FormattedString {
    fn from(GenericError(msg, err): GenericError<T>) -> Self {
        FormattedString(format!("{}:\n\n'{}'", msg.red().bold(), err))
    }
}
