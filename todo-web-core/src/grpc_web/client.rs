//! # gRPC-Web Client
//!
//! This module wraps any HTTP `tower` service to provide unary gRPC-Web calls.
//!
//! ## How it works
//!
//! The [`GrpcWebClient`] encodes the request with the [`MethodDescriptor`] of the method being
//! called, frames it (see [`super::codec`]), and POSTs it to `<hostname>/<Service>/<Method>`.
//! The response body is unframed, the `grpc-status` is resolved and the single response
//! message is decoded with the same descriptor.
//!
//! The client never retries and never caches: each call is exactly one HTTP round trip.
//! Timeouts and retry policies belong to the transport (for example a `tower` layer).
//!
//! # Error Handling
//!
//! Every failure is reported as a [`CallError`]:
//!
//! - Encoding and metadata errors are raised **before** anything is sent.
//! - Transport errors (connection refused, reset, timeouts enforced by the transport) and
//!   non-2xx HTTP statuses are raised as soon as the response head is known.
//! - A non-`OK` `grpc-status` is surfaced as [`CallError::Status`].
//! - Malformed bodies and undecodable messages are surfaced as errors, never panics.
use super::{
    codec::{self, Frame, FrameError, WireFormat},
    method::MethodDescriptor,
};
use crate::BoxError;
use bytes::Bytes;
use http::{HeaderMap, HeaderValue, Method, StatusCode, Uri, header};
use http_body::Body as HttpBody;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper_util::{
    client::legacy::{Client, connect::HttpConnector},
    rt::TokioExecutor,
};
use std::{future::poll_fn, str::FromStr};
use tonic::{
    Code, Status,
    client::GrpcService,
    metadata::{
        MetadataKey, MetadataMap, MetadataValue,
        errors::{InvalidMetadataKey, InvalidMetadataValue},
    },
};
use tracing::{debug, warn};

/// Default limit for decoded response messages, the same one `tonic` applies.
pub const DEFAULT_MAX_DECODING_MESSAGE_SIZE: usize = 4 * 1024 * 1024;
/// Default limit for encoded request messages: the largest length a frame can describe.
pub const DEFAULT_MAX_ENCODING_MESSAGE_SIZE: usize = u32::MAX as usize;

const DEFAULT_USER_AGENT: &str = concat!("todo-web-core/", env!("CARGO_PKG_VERSION"));

/// Room left in a response body for frame headers and the trailer block.
const MAX_FRAMING_OVERHEAD: usize = 16 * 1024;

/// The default HTTP/1.1 transport.
pub type HttpTransport = Client<HttpConnector, tonic::body::Body>;

/// Errors raised while building a client.
#[derive(thiserror::Error, Debug)]
pub enum ClientBuildError {
    #[error("Invalid hostname '{hostname}': '{source}'")]
    InvalidUri {
        hostname: String,
        source: http::uri::InvalidUri,
    },
    #[error("Hostname '{0}' must include a scheme and an authority (e.g. 'http://localhost:8000')")]
    MissingAuthority(String),
    #[error("Hostname '{0}' must not carry a query or a fragment")]
    UnexpectedQuery(String),
}

/// Errors raised by a single call. None of them are retried by the client.
#[derive(thiserror::Error, Debug)]
pub enum CallError {
    #[error("Invalid metadata (header) key '{key}': '{source}'")]
    InvalidMetadataKey {
        key: String,
        source: InvalidMetadataKey,
    },
    #[error("Invalid metadata (header) value for key '{key}': '{source}'")]
    InvalidMetadataValue {
        key: String,
        source: InvalidMetadataValue,
    },
    #[error("Failed to encode the request message: '{0}'")]
    Encode(#[from] prost::EncodeError),
    #[error("Message of {size} bytes exceeds the limit of {limit} bytes")]
    MessageTooLarge { size: usize, limit: usize },
    #[error("Invalid request uri '{uri}': '{source}'")]
    InvalidUri {
        uri: String,
        source: http::uri::InvalidUri,
    },
    #[error("Internal error, the transport was not ready: '{0}'")]
    ClientNotReady(#[source] BoxError),
    #[error("Transport error: '{0}'")]
    Transport(#[source] BoxError),
    #[error("Server responded with HTTP status {0}")]
    HttpStatus(StatusCode),
    #[error("Failed to read the response body: '{0}'")]
    Body(#[source] BoxError),
    #[error("Response body exceeds the limit of {limit} bytes")]
    BodyTooLarge { limit: usize },
    #[error("Response body is not valid base64: '{0}'")]
    Base64(#[from] base64::DecodeError),
    #[error("Malformed gRPC-Web response: '{0}'")]
    Frame(#[from] FrameError),
    #[error("Response did not carry a grpc-status")]
    MissingStatus,
    #[error("Expected exactly one response message, found {0}")]
    UnexpectedMessageCount(usize),
    #[error("gRPC call failed: {0}")]
    Status(Status),
    #[error("Failed to decode the response message: '{0}'")]
    Decode(#[from] prost::DecodeError),
}

/// Read-only settings shared by every call of a client.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub format: WireFormat,
    pub max_decoding_message_size: usize,
    pub max_encoding_message_size: usize,
    pub user_agent: HeaderValue,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            format: WireFormat::default(),
            max_decoding_message_size: DEFAULT_MAX_DECODING_MESSAGE_SIZE,
            max_encoding_message_size: DEFAULT_MAX_ENCODING_MESSAGE_SIZE,
            user_agent: HeaderValue::from_static(DEFAULT_USER_AGENT),
        }
    }
}

/// A unary gRPC-Web client bound to one hostname.
///
/// The client is configured once and then only read: calls take `&self` and clone the
/// transport handle, so a single client can drive any number of concurrent calls.
#[derive(Debug, Clone)]
pub struct GrpcWebClient<S = HttpTransport> {
    hostname: String,
    service: S,
    options: ClientOptions,
}

impl GrpcWebClient<HttpTransport> {
    /// Creates a client backed by a plain HTTP/1.1 connection pool.
    ///
    /// No connection is opened until the first call.
    ///
    /// # Arguments
    /// * `hostname` - The base URL of the gRPC-Web gateway (e.g., `http://localhost:8000`).
    pub fn http(hostname: &str) -> Result<Self, ClientBuildError> {
        let transport = Client::builder(TokioExecutor::new()).build_http();
        Self::new(hostname, transport)
    }
}

impl<S> GrpcWebClient<S> {
    /// Creates a client that sends its requests through `service`.
    ///
    /// # Arguments
    /// * `hostname` - The base URL every method path is appended to.
    /// * `service` - The HTTP transport.
    pub fn new(hostname: &str, service: S) -> Result<Self, ClientBuildError> {
        let uri = Uri::from_str(hostname).map_err(|source| ClientBuildError::InvalidUri {
            hostname: hostname.to_string(),
            source,
        })?;

        if uri.scheme().is_none() || uri.authority().is_none() {
            return Err(ClientBuildError::MissingAuthority(hostname.to_string()));
        }

        if uri.query().is_some() || hostname.contains('#') {
            return Err(ClientBuildError::UnexpectedQuery(hostname.to_string()));
        }

        Ok(Self {
            hostname: hostname.trim_end_matches('/').to_string(),
            service,
            options: ClientOptions::default(),
        })
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Selects the wire format used for requests and expected for responses.
    pub fn format(mut self, format: WireFormat) -> Self {
        self.options.format = format;
        self
    }

    /// Limits the size of a decoded response message.
    ///
    /// Default: `4MB`
    pub fn max_decoding_message_size(mut self, limit: usize) -> Self {
        self.options.max_decoding_message_size = limit;
        self
    }

    /// Limits the size of an encoded request message.
    ///
    /// Default: `u32::MAX`, values above it are clamped.
    pub fn max_encoding_message_size(mut self, limit: usize) -> Self {
        self.options.max_encoding_message_size = limit.min(DEFAULT_MAX_ENCODING_MESSAGE_SIZE);
        self
    }

    /// Overrides the `x-user-agent` header.
    pub fn user_agent(mut self, user_agent: HeaderValue) -> Self {
        self.options.user_agent = user_agent;
        self
    }

    /// Largest response body accepted on the wire: one message of the decoding limit plus
    /// framing, inflated by base64 in the text format.
    fn body_limit(&self) -> usize {
        let framed = self
            .options
            .max_decoding_message_size
            .saturating_add(MAX_FRAMING_OVERHEAD);

        match self.options.format {
            WireFormat::Binary => framed,
            // Each padded chunk adds at most one quad.
            WireFormat::Text => framed.div_ceil(3).saturating_mul(4).saturating_add(8),
        }
    }
}

impl<S> GrpcWebClient<S>
where
    S: GrpcService<tonic::body::Body> + Clone,
    S::Error: Into<BoxError>,
    S::ResponseBody: HttpBody<Data = Bytes> + Send + 'static,
    <S::ResponseBody as HttpBody>::Error: Into<BoxError> + Send,
{
    /// Performs a unary gRPC-Web call (Single Request -> Single Response).
    ///
    /// # Arguments
    /// * `method` - The descriptor of the method to call.
    /// * `request` - The request message.
    /// * `headers` - Metadata sent as HTTP headers. An empty vector sends none.
    ///
    /// # Returns
    /// * `Ok(Res)` - The decoded response message.
    /// * `Err(CallError)` - Anything else, including a non-`OK` gRPC status.
    pub async fn unary<Req, Res>(
        &self,
        method: &MethodDescriptor<Req, Res>,
        request: &Req,
        headers: Vec<(String, String)>,
    ) -> Result<Res, CallError> {
        let path = method.path();

        let message = method.encode(request)?;
        if message.len() > self.options.max_encoding_message_size {
            return Err(CallError::MessageTooLarge {
                size: message.len(),
                limit: self.options.max_encoding_message_size,
            });
        }

        let body = self.options.format.encode_body(codec::encode_frame(&message)?);
        let request = self.build_request(&path, body, headers)?;

        debug!(
            %path,
            format = ?self.options.format,
            message_len = message.len(),
            "dispatching gRPC-Web unary call"
        );

        let mut service = self.service.clone();
        poll_fn(|cx| service.poll_ready(cx))
            .await
            .map_err(|e| CallError::ClientNotReady(e.into()))?;

        let response = service
            .call(request)
            .await
            .map_err(|e| CallError::Transport(e.into()))?;

        let (parts, body) = response.into_parts();

        if !parts.status.is_success() {
            warn!(%path, status = %parts.status, "gRPC-Web call rejected by the server");
            return Err(CallError::HttpStatus(parts.status));
        }

        let body_limit = self.body_limit();
        let collected = Limited::new(body, body_limit)
            .collect()
            .await
            .map_err(|e| {
                if e.is::<LengthLimitError>() {
                    CallError::BodyTooLarge { limit: body_limit }
                } else {
                    CallError::Body(e)
                }
            })?;
        let http_trailers = collected.trailers().cloned();
        let framed = self.options.format.decode_body(collected.to_bytes())?;

        let frames = codec::decode_frames(framed, self.options.max_decoding_message_size)
            .map_err(|e| match e {
                FrameError::Oversized { size, limit } => CallError::MessageTooLarge { size, limit },
                e => CallError::Frame(e),
            })?;

        let mut messages = Vec::new();
        let mut trailers = None;

        for frame in frames {
            match frame {
                Frame::Data(payload) => messages.push(payload),
                Frame::Trailers(map) => trailers = Some(map),
            }
        }

        let status = resolve_status(trailers.as_ref(), http_trailers.as_ref(), &parts.headers)
            .ok_or(CallError::MissingStatus)?;

        debug!(%path, http_status = %parts.status, code = ?status.code(), "gRPC-Web unary call completed");

        if status.code() != Code::Ok {
            warn!(%path, code = ?status.code(), grpc_message = status.message(), "gRPC-Web call failed");
            return Err(CallError::Status(status));
        }

        let [payload] = <[Bytes; 1]>::try_from(messages)
            .map_err(|messages| CallError::UnexpectedMessageCount(messages.len()))?;

        Ok(method.decode(payload)?)
    }

    fn build_request(
        &self,
        path: &str,
        body: Bytes,
        headers: Vec<(String, String)>,
    ) -> Result<http::Request<tonic::body::Body>, CallError> {
        let uri = format!("{}{}", self.hostname, path);
        let uri = Uri::from_str(&uri).map_err(|source| CallError::InvalidUri {
            uri: uri.clone(),
            source,
        })?;

        let mut request = http::Request::new(tonic::body::Body::new(Full::new(body)));
        *request.method_mut() = Method::POST;
        *request.uri_mut() = uri;
        *request.headers_mut() = build_metadata(headers)?.into_headers();

        // Protocol headers go last so metadata cannot replace them.
        let content_type = HeaderValue::from_static(self.options.format.content_type());
        let request_headers = request.headers_mut();
        request_headers.insert(header::CONTENT_TYPE, content_type.clone());
        request_headers.insert(header::ACCEPT, content_type);
        request_headers.insert("x-grpc-web", HeaderValue::from_static("1"));
        request_headers.insert("x-user-agent", self.options.user_agent.clone());

        Ok(request)
    }
}

fn build_metadata(headers: Vec<(String, String)>) -> Result<MetadataMap, CallError> {
    let mut metadata = MetadataMap::new();
    for (k, v) in headers {
        let key = MetadataKey::from_str(&k).map_err(|source| CallError::InvalidMetadataKey {
            key: k.clone(),
            source,
        })?;
        let val = MetadataValue::from_str(&v)
            .map_err(|source| CallError::InvalidMetadataValue { key: k, source })?;
        metadata.insert(key, val);
    }
    Ok(metadata)
}

/// Trailer frame first, then real HTTP trailers, then the response head
/// (trailers-only responses).
fn resolve_status(
    trailer_frame: Option<&HeaderMap>,
    http_trailers: Option<&HeaderMap>,
    headers: &HeaderMap,
) -> Option<Status> {
    trailer_frame
        .and_then(Status::from_header_map)
        .or_else(|| http_trailers.and_then(Status::from_header_map))
        .or_else(|| Status::from_header_map(headers))
}
