//! # gRPC-Web Transport
//!
//! This module contains the building blocks for performing unary gRPC-Web calls.
//!
//! Unlike a `tonic` client, which speaks HTTP/2 gRPC, the components here frame messages
//! the way the gRPC-Web protocol expects so that calls can travel through HTTP/1.1 proxies.
pub mod callback;
pub mod client;
pub mod codec;
pub mod method;

pub use callback::spawn_with_callback;
pub use client::{CallError, ClientBuildError, ClientOptions, GrpcWebClient, HttpTransport};
pub use codec::WireFormat;
pub use method::MethodDescriptor;
