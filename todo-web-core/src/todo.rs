//! # Todo Service
//!
//! Typed bindings for the remote `TodoService`.
//!
//! [`TodoService`] exposes one method per RPC. Each takes the request message and the call
//! metadata (an empty vector sends none) and resolves to the response message or a
//! [`CallError`].
//!
//! ## Example
//!
//! ```rust,no_run
//! use todo_web_core::todo::{TodoService, TodoServiceClient, pb::Empty};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = TodoServiceClient::http("http://localhost:8000")?;
//!
//! let list = client
//!     .get_all(Empty {}, vec![("authorization".to_string(), "Bearer X".to_string())])
//!     .await?;
//!
//! for todo in list.todos {
//!     println!("{} {}", todo.id, todo.title);
//! }
//! # Ok(())
//! # }
//! ```
mod client;
pub mod methods;
pub mod pb;

pub use client::TodoServiceClient;

use crate::grpc_web::CallError;
use pb::{Empty, Todo, TodoId, TodoList};

/// The remote methods of the `TodoService`.
#[tonic::async_trait]
pub trait TodoService {
    /// `/TodoService/GetAll`: every stored todo.
    async fn get_all(
        &self,
        request: Empty,
        metadata: Vec<(String, String)>,
    ) -> Result<TodoList, CallError>;

    /// `/TodoService/GetById`
    async fn get_by_id(
        &self,
        request: TodoId,
        metadata: Vec<(String, String)>,
    ) -> Result<Todo, CallError>;

    /// `/TodoService/Create`: the server assigns the id.
    async fn create(
        &self,
        request: Todo,
        metadata: Vec<(String, String)>,
    ) -> Result<Todo, CallError>;

    /// `/TodoService/Update`
    async fn update(
        &self,
        request: Todo,
        metadata: Vec<(String, String)>,
    ) -> Result<Todo, CallError>;

    /// `/TodoService/Delete`
    async fn delete(
        &self,
        request: TodoId,
        metadata: Vec<(String, String)>,
    ) -> Result<Empty, CallError>;
}
