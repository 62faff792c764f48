//! # Todo Web Core
//!
//! `todo-web-core` is a small gRPC-Web client library. It speaks the gRPC-Web wire protocol
//! (the flavour of gRPC that browsers and HTTP/1.1 gateways such as Envoy understand) and ships
//! typed bindings for the `TodoService`.
//!
//! ## Key Components
//!
//! * **[`grpc_web::GrpcWebClient`]:** A generic unary client. It owns a base hostname and a
//!   transport (any `tower` service speaking `http`) and performs one round trip per call.
//! * **[`grpc_web::MethodDescriptor`]:** A static binding of `/<Service>/<Method>` to a request
//!   type, a response type and the functions used to encode and decode them.
//! * **[`todo::TodoService`]:** One async method per remote Todo RPC, implemented by
//!   [`todo::TodoServiceClient`].
//!
//! ## Wire formats
//!
//! Both `application/grpc-web-text` (base64 wrapped, the default) and
//! `application/grpc-web+proto` are supported. See [`grpc_web::codec`].
//!
//! ## Re-exports
//!
//! This crate re-exports `prost` and `tonic` to ensure that consumers
//! use compatible versions of these underlying dependencies.
pub mod grpc_web;
pub mod todo;

// Re-exports
pub use prost;
pub use tonic;

/// Type alias for the standard boxed error used in generic bounds.
pub(crate) type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;
