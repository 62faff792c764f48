//! # Method Descriptors
//!
//! A [`MethodDescriptor`] binds a remote method (`/<Service>/<Method>`) to its request and
//! response types together with the functions used to encode and decode them.
//!
//! Descriptors are plain data built in `const` context, so every method of a service can be
//! declared once as a `static` and shared by reference between concurrent calls.
//!
//! ```rust
//! use todo_web_core::grpc_web::MethodDescriptor;
//! use todo_web_core::todo::pb::{Empty, TodoList};
//!
//! static GET_ALL: MethodDescriptor<Empty, TodoList> = MethodDescriptor::new("TodoService", "GetAll");
//!
//! assert_eq!(GET_ALL.path(), "/TodoService/GetAll");
//! ```
use bytes::{Bytes, BytesMut};
use prost::{DecodeError, EncodeError, Message};
use std::fmt;

/// Serializes a request message into the payload of a data frame.
pub type EncodeFn<Req> = fn(&Req) -> Result<Bytes, EncodeError>;
/// Deserializes the payload of a data frame into a response message.
pub type DecodeFn<Res> = fn(Bytes) -> Result<Res, DecodeError>;

/// Immutable binding of a unary method to its message types and codec functions.
pub struct MethodDescriptor<Req, Res> {
    service: &'static str,
    method: &'static str,
    encode: EncodeFn<Req>,
    decode: DecodeFn<Res>,
}

impl<Req, Res> MethodDescriptor<Req, Res>
where
    Req: Message,
    Res: Message + Default,
{
    /// Creates a descriptor that uses the protobuf binary encoding in both directions.
    pub const fn new(service: &'static str, method: &'static str) -> Self {
        Self::with_codec(service, method, encode_message::<Req>, decode_message::<Res>)
    }
}

impl<Req, Res> MethodDescriptor<Req, Res> {
    /// Creates a descriptor with custom codec functions.
    pub const fn with_codec(
        service: &'static str,
        method: &'static str,
        encode: EncodeFn<Req>,
        decode: DecodeFn<Res>,
    ) -> Self {
        Self {
            service,
            method,
            encode,
            decode,
        }
    }

    /// The service name (e.g. `TodoService`).
    pub fn service(&self) -> &'static str {
        self.service
    }

    /// The method name (e.g. `GetAll`).
    pub fn method(&self) -> &'static str {
        self.method
    }

    /// The HTTP path the method is served under (e.g. `/TodoService/GetAll`).
    pub fn path(&self) -> String {
        format!("/{}/{}", self.service, self.method)
    }

    pub fn encode(&self, request: &Req) -> Result<Bytes, EncodeError> {
        (self.encode)(request)
    }

    pub fn decode(&self, payload: Bytes) -> Result<Res, DecodeError> {
        (self.decode)(payload)
    }
}

// Manual impls: deriving would require `Req: Clone` and `Res: Clone`.
impl<Req, Res> Clone for MethodDescriptor<Req, Res> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<Req, Res> Copy for MethodDescriptor<Req, Res> {}

impl<Req, Res> fmt::Debug for MethodDescriptor<Req, Res> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDescriptor")
            .field("service", &self.service)
            .field("method", &self.method)
            .finish_non_exhaustive()
    }
}

fn encode_message<M: Message>(message: &M) -> Result<Bytes, EncodeError> {
    let mut buf = BytesMut::with_capacity(message.encoded_len());
    message.encode(&mut buf)?;
    Ok(buf.freeze())
}

fn decode_message<M: Message + Default>(payload: Bytes) -> Result<M, DecodeError> {
    M::decode(payload)
}
