//! Method table of the `TodoService`.
use super::pb::{Empty, Todo, TodoId, TodoList};
use crate::grpc_web::MethodDescriptor;

/// The service name as it appears in every method path.
pub const SERVICE_NAME: &str = "TodoService";

pub static GET_ALL: MethodDescriptor<Empty, TodoList> =
    MethodDescriptor::new(SERVICE_NAME, "GetAll");

pub static GET_BY_ID: MethodDescriptor<TodoId, Todo> =
    MethodDescriptor::new(SERVICE_NAME, "GetById");

pub static CREATE: MethodDescriptor<Todo, Todo> = MethodDescriptor::new(SERVICE_NAME, "Create");

pub static UPDATE: MethodDescriptor<Todo, Todo> = MethodDescriptor::new(SERVICE_NAME, "Update");

pub static DELETE: MethodDescriptor<TodoId, Empty> = MethodDescriptor::new(SERVICE_NAME, "Delete");
