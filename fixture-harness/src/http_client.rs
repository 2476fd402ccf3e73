use crate::error::Error;
use async_trait::async_trait;
use futures::future;
use hyper::{client::HttpConnector, service::Service, Body, Request, Response, Uri};
use std::fmt::Debug;

/// Sends fixture requests to the service under test.
#[async_trait]
pub trait ApiClient: Debug {
    async fn send(&mut self, request: Request<Body>) -> Result<Response<Body>, Error>;
}

/// Calls a hyper service directly, without going through a socket.
#[derive(Debug, Clone)]
pub struct ServiceClient<S> {
    service: S,
}

impl<S> ServiceClient<S> {
    pub fn new(service: S) -> Self {
        Self { service }
    }
}

#[async_trait]
impl<S> ApiClient for ServiceClient<S>
where
    S: Service<Request<Body>, Response = Response<Body>> + Debug + Send,
    S::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    S::Future: Send,
{
    async fn send(&mut self, request: Request<Body>) -> Result<Response<Body>, Error> {
        future::poll_fn(|cx| self.service.poll_ready(cx))
            .await
            .map_err(transport_error)?;

        self.service.call(request).await.map_err(transport_error)
    }
}

fn transport_error<E>(error: E) -> Error
where
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let error: Box<dyn std::error::Error + Send + Sync> = error.into();
    Error::Transport(error.to_string())
}

/// Sends requests over HTTP to a running server, e.g. `http://127.0.0.1:8000`.
#[derive(Debug, Clone)]
pub struct RemoteClient {
    base_url: String,
    client: hyper::Client<HttpConnector>,
}

impl RemoteClient {
    pub fn new<S: Into<String>>(base_url: S) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').into(),
            client: hyper::Client::new(),
        }
    }
}

#[async_trait]
impl ApiClient for RemoteClient {
    async fn send(&mut self, mut request: Request<Body>) -> Result<Response<Body>, Error> {
        let url = format!("{}{}", self.base_url, request.uri());
        *request.uri_mut() = url
            .parse::<Uri>()
            .map_err(|_| Error::InvalidUri(url.clone()))?;

        Ok(self.client.request(request).await?)
    }
}
