use super::{
    TodoService, methods,
    pb::{Empty, Todo, TodoId, TodoList},
};
use crate::{
    BoxError,
    grpc_web::{CallError, ClientBuildError, GrpcWebClient, HttpTransport},
};
use bytes::Bytes;
use http_body::Body as HttpBody;
use tonic::client::GrpcService;

/// [`TodoService`] implementation backed by a [`GrpcWebClient`].
#[derive(Debug, Clone)]
pub struct TodoServiceClient<S = HttpTransport> {
    inner: GrpcWebClient<S>,
}

impl TodoServiceClient<HttpTransport> {
    /// Creates a client for the gateway at `hostname` using the default HTTP/1.1 transport.
    pub fn http(hostname: &str) -> Result<Self, ClientBuildError> {
        Ok(Self::new(GrpcWebClient::http(hostname)?))
    }
}

impl<S> TodoServiceClient<S> {
    pub fn new(inner: GrpcWebClient<S>) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &GrpcWebClient<S> {
        &self.inner
    }
}

#[tonic::async_trait]
impl<S> TodoService for TodoServiceClient<S>
where
    S: GrpcService<tonic::body::Body> + Clone + Send + Sync,
    S::Future: Send,
    S::Error: Into<BoxError>,
    S::ResponseBody: HttpBody<Data = Bytes> + Send + 'static,
    <S::ResponseBody as HttpBody>::Error: Into<BoxError> + Send,
{
    async fn get_all(
        &self,
        request: Empty,
        metadata: Vec<(String, String)>,
    ) -> Result<TodoList, CallError> {
        self.inner.unary(&methods::GET_ALL, &request, metadata).await
    }

    async fn get_by_id(
        &self,
        request: TodoId,
        metadata: Vec<(String, String)>,
    ) -> Result<Todo, CallError> {
        self.inner.unary(&methods::GET_BY_ID, &request, metadata).await
    }

    async fn create(
        &self,
        request: Todo,
        metadata: Vec<(String, String)>,
    ) -> Result<Todo, CallError> {
        self.inner.unary(&methods::CREATE, &request, metadata).await
    }

    async fn update(
        &self,
        request: Todo,
        metadata: Vec<(String, String)>,
    ) -> Result<Todo, CallError> {
        self.inner.unary(&methods::UPDATE, &request, metadata).await
    }

    async fn delete(
        &self,
        request: TodoId,
        metadata: Vec<(String, String)>,
    ) -> Result<Empty, CallError> {
        self.inner.unary(&methods::DELETE, &request, metadata).await
    }
}
