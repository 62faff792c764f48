//! In-memory transports that answer gRPC-Web requests without a network.
#![allow(dead_code)]

use bytes::{BufMut, Bytes, BytesMut};
use http::{HeaderMap, HeaderValue, Request, Response, StatusCode, header};
use http_body_util::{BodyExt, Full, combinators::WithTrailers};
use std::{
    collections::HashMap,
    convert::Infallible,
    future::{Ready, ready},
    io,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    task::{Context, Poll},
};
use todo_web_core::{
    grpc_web::codec::{self, Frame, WireFormat},
    prost::Message,
    todo::pb::{Empty, Todo, TodoId, TodoList},
};
use tokio::sync::oneshot;
use tonic::{
    Code,
    codegen::{BoxFuture, Service},
};

type StubBody = Full<Bytes>;

/// Body of a successful unary response: one data frame and an `OK` trailer frame.
pub fn grpc_ok_body(format: WireFormat, message: &[u8]) -> Bytes {
    let mut framed = BytesMut::new();
    framed.put(codec::encode_frame(message).unwrap());
    framed.put(codec::encode_trailer_frame(&status_trailers(Code::Ok, "")).unwrap());
    format.encode_body(framed.freeze())
}

/// Body of a failed unary response: only the trailer frame.
pub fn grpc_error_body(format: WireFormat, code: Code, message: &str) -> Bytes {
    format.encode_body(codec::encode_trailer_frame(&status_trailers(code, message)).unwrap())
}

pub fn status_trailers(code: Code, message: &str) -> HeaderMap {
    let mut trailers = HeaderMap::new();
    trailers.insert("grpc-status", HeaderValue::from(code as i32));
    trailers.insert("grpc-message", HeaderValue::from_str(message).unwrap());
    trailers
}

fn http_response(status: StatusCode, content_type: &'static str, body: Bytes) -> Response<StubBody> {
    let mut response = Response::new(Full::new(body));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}

/// A request as observed by a stub transport.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub path: String,
    pub headers: HeaderMap,
}

/// An in-memory `TodoService` served over gRPC-Web, in whichever format the request uses.
#[derive(Clone, Default)]
pub struct TodoStubServer {
    todos: Arc<Mutex<Vec<Todo>>>,
    next_id: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<Recorded>>>,
    gates: Arc<Mutex<HashMap<String, oneshot::Receiver<()>>>>,
}

impl TodoStubServer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_todos(todos: Vec<Todo>) -> Self {
        let server = Self::new();
        server.next_id.store(todos.len(), Ordering::SeqCst);
        *server.todos.lock().unwrap() = todos;
        server
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    /// Holds the next response for `path` until the returned sender fires.
    pub fn gate(&self, path: &str) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().insert(path.to_string(), rx);
        tx
    }

    async fn handle(self, request: Request<tonic::body::Body>) -> Response<StubBody> {
        let (parts, body) = request.into_parts();
        let path = parts.uri.path().to_string();

        self.requests.lock().unwrap().push(Recorded {
            path: path.clone(),
            headers: parts.headers.clone(),
        });

        let gate = self.gates.lock().unwrap().remove(&path);
        if let Some(gate) = gate {
            let _ = gate.await;
        }

        let Some(format) = parts
            .headers
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .and_then(WireFormat::from_content_type)
        else {
            return http_response(StatusCode::UNSUPPORTED_MEDIA_TYPE, "text/plain", Bytes::new());
        };

        let body = body.collect().await.unwrap().to_bytes();
        let framed = format.decode_body(body).unwrap();

        let payload = match codec::decode_frames(framed, usize::MAX).unwrap().into_iter().next() {
            Some(Frame::Data(payload)) => payload,
            _ => {
                let body = grpc_error_body(format, Code::InvalidArgument, "missing request");
                return http_response(StatusCode::OK, format.content_type(), body);
            }
        };

        let body = match self.dispatch(&path, payload) {
            Ok(message) => grpc_ok_body(format, &message),
            Err((code, message)) => grpc_error_body(format, code, &message),
        };

        http_response(StatusCode::OK, format.content_type(), body)
    }

    fn dispatch(&self, path: &str, payload: Bytes) -> Result<Vec<u8>, (Code, String)> {
        let mut todos = self.todos.lock().unwrap();
        let not_found = |id: &str| (Code::NotFound, format!("todo {id} not found"));

        match path {
            "/TodoService/GetAll" => Ok(TodoList {
                todos: todos.clone(),
            }
            .encode_to_vec()),
            "/TodoService/GetById" => {
                let TodoId { id } = TodoId::decode(payload).unwrap();
                todos
                    .iter()
                    .find(|todo| todo.id == id)
                    .map(Todo::encode_to_vec)
                    .ok_or_else(|| not_found(&id))
            }
            "/TodoService/Create" => {
                let mut todo = Todo::decode(payload).unwrap();
                todo.id = (self.next_id.fetch_add(1, Ordering::SeqCst) + 1).to_string();
                todos.push(todo.clone());
                Ok(todo.encode_to_vec())
            }
            "/TodoService/Update" => {
                let todo = Todo::decode(payload).unwrap();
                let stored = todos
                    .iter_mut()
                    .find(|stored| stored.id == todo.id)
                    .ok_or_else(|| not_found(&todo.id))?;
                *stored = todo.clone();
                Ok(todo.encode_to_vec())
            }
            "/TodoService/Delete" => {
                let TodoId { id } = TodoId::decode(payload).unwrap();
                let before = todos.len();
                todos.retain(|todo| todo.id != id);
                if todos.len() == before {
                    return Err(not_found(&id));
                }
                Ok(Empty {}.encode_to_vec())
            }
            _ => Err((Code::Unimplemented, format!("unknown method {path}"))),
        }
    }
}

impl Service<Request<tonic::body::Body>> for TodoStubServer {
    type Response = Response<StubBody>;
    type Error = Infallible;
    type Future = BoxFuture<Self::Response, Self::Error>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request<tonic::body::Body>) -> Self::Future {
        let server = self.clone();
        Box::pin(async move { Ok(server.handle(request).await) })
    }
}

/// Answers every request with the same canned response.
#[derive(Clone)]
pub struct FixedResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
    hits: Arc<AtomicUsize>,
}

impl FixedResponse {
    pub fn new(status: StatusCode, body: Bytes) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body,
            hits: Arc::default(),
        }
    }

    pub fn header(mut self, name: &'static str, value: &'static str) -> Self {
        self.headers.insert(name, HeaderValue::from_static(value));
        self
    }

    /// Number of requests that reached the transport.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

impl Service<Request<tonic::body::Body>> for FixedResponse {
    type Response = Response<StubBody>;
    type Error = Infallible;
    type Future = BoxFuture<Self::Response, Self::Error>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, _request: Request<tonic::body::Body>) -> Self::Future {
        self.hits.fetch_add(1, Ordering::SeqCst);

        let mut response = Response::new(Full::new(self.body.clone()));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers.clone();

        Box::pin(async move { Ok(response) })
    }
}

/// A transport whose connection attempts are always refused.
#[derive(Clone, Copy)]
pub struct RefusingTransport;

impl Service<Request<tonic::body::Body>> for RefusingTransport {
    type Response = Response<StubBody>;
    type Error = io::Error;
    type Future = BoxFuture<Self::Response, Self::Error>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, _request: Request<tonic::body::Body>) -> Self::Future {
        Box::pin(async { Err(io::Error::from(io::ErrorKind::ConnectionRefused)) })
    }
}

type TrailersFuture = Ready<Option<Result<HeaderMap, Infallible>>>;

/// Answers with a body followed by real HTTP trailers, as an HTTP/2 capable gateway may.
#[derive(Clone)]
pub struct HttpTrailersResponse {
    body: Bytes,
    trailers: HeaderMap,
}

impl HttpTrailersResponse {
    pub fn new(body: Bytes, trailers: HeaderMap) -> Self {
        Self { body, trailers }
    }
}

impl Service<Request<tonic::body::Body>> for HttpTrailersResponse {
    type Response = Response<WithTrailers<StubBody, TrailersFuture>>;
    type Error = Infallible;
    type Future = BoxFuture<Self::Response, Self::Error>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, _request: Request<tonic::body::Body>) -> Self::Future {
        let body = Full::new(self.body.clone()).with_trailers(ready(Some(Ok(self.trailers.clone()))));

        let mut response = Response::new(body);
        response
            .headers_mut()
            .insert(header::CONTENT_TYPE, HeaderValue::from_static(codec::GRPC_WEB_TEXT));

        Box::pin(async move { Ok(response) })
    }
}
