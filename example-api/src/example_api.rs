use crate::id_generator::{IdGenerator, RandomIdGenerator};
use hyper::{
    body,
    header::{self, HeaderValue},
    service::Service,
    Body, Method, Request, Response, StatusCode,
};
use serde::{Deserialize, Serialize};
use std::{
    convert::Infallible,
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};
use tracing::{debug, info};

pub const AUTH_TOKEN_HEADER: &str = "x-auth-token";
const EXAMPLES_PATH: &str = "/api/examples";
const STORED_EXAMPLE_ID: i64 = 1;
const STORED_EXAMPLE_TITLE: &str = "Test";

/// Whether reading an example requires the `X-Auth-Token` header.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthPolicy {
    #[default]
    Disabled,
    Token(String),
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Example {
    pub id: i64,
    pub title: String,
}

#[derive(Debug, Deserialize)]
struct NewExample {
    title: String,
}

/// Builder used to build an ExampleApi instance
#[derive(Debug, Default)]
pub struct ExampleApiBuilder {
    auth_policy: AuthPolicy,
    id_generator: Option<Arc<dyn IdGenerator + Send + Sync>>,
}

impl ExampleApiBuilder {
    /// Create a new ExampleApiBuilder instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Require the given token in the `X-Auth-Token` header when reading an example.
    ///
    /// # Arguments
    /// `token` - the only accepted token value.
    ///
    /// # Returns
    /// This builder.
    pub fn with_auth_token<T: Into<String>>(mut self, token: T) -> Self {
        self.auth_policy = AuthPolicy::Token(token.into());
        self
    }

    pub fn with_auth_policy(mut self, auth_policy: AuthPolicy) -> Self {
        self.auth_policy = auth_policy;
        self
    }

    /// Use the given generator for the ids of created examples.
    ///
    /// # Arguments
    /// `id_generator` - e.g. a `FixedIdGenerator` in tests that assert on ids.
    ///
    /// # Returns
    /// This builder.
    pub fn with_id_generator<G: IdGenerator + Send + Sync + 'static>(
        mut self,
        id_generator: G,
    ) -> Self {
        self.id_generator = Some(Arc::new(id_generator));
        self
    }

    /// Consume the builder and create an ExampleApi instance using all of the previously configured values or
    /// their defaults.
    pub fn build(self) -> ExampleApi {
        ExampleApi {
            auth_policy: self.auth_policy,
            id_generator: self
                .id_generator
                .unwrap_or_else(|| Arc::new(RandomIdGenerator)),
        }
    }
}

/// The example resource API as a hyper service.
#[derive(Debug, Clone)]
pub struct ExampleApi {
    auth_policy: AuthPolicy,
    id_generator: Arc<dyn IdGenerator + Send + Sync>,
}

impl ExampleApi {
    pub fn builder() -> ExampleApiBuilder {
        ExampleApiBuilder::new()
    }

    pub fn auth_policy(&self) -> &AuthPolicy {
        &self.auth_policy
    }

    /// Routes one request.
    pub async fn handle(&self, request: Request<Body>) -> Response<Body> {
        let method = request.method().clone();
        let path = request.uri().path().to_owned();

        let response = if path == EXAMPLES_PATH {
            match method {
                Method::POST => self.create_example(request).await,
                _ => method_not_allowed(Method::POST),
            }
        } else if let Some(id) = path
            .strip_prefix(EXAMPLES_PATH)
            .and_then(|rest| rest.strip_prefix('/'))
            .filter(|id| !id.is_empty() && !id.contains('/'))
        {
            match method {
                Method::GET => self.get_example(&request, id),
                _ => method_not_allowed(Method::GET),
            }
        } else {
            empty(StatusCode::NOT_FOUND)
        };

        info!(%method, %path, status = response.status().as_u16(), "request handled");
        response
    }

    fn get_example(&self, request: &Request<Body>, id: &str) -> Response<Body> {
        if let AuthPolicy::Token(expected_token) = &self.auth_policy {
            match request.headers().get(AUTH_TOKEN_HEADER) {
                None => return text(StatusCode::FORBIDDEN, "Invalid credentials"),
                Some(token) if token.as_bytes() != expected_token.as_bytes() => {
                    return text(StatusCode::UNAUTHORIZED, "Invalid credentials")
                }
                Some(_) => {}
            }
        }

        match id.parse::<i64>() {
            Ok(STORED_EXAMPLE_ID) => json(
                StatusCode::OK,
                &Example {
                    id: STORED_EXAMPLE_ID,
                    title: STORED_EXAMPLE_TITLE.into(),
                },
            ),
            _ => empty(StatusCode::NOT_FOUND),
        }
    }

    async fn create_example(&self, request: Request<Body>) -> Response<Body> {
        let new_example = match body::to_bytes(request.into_body()).await {
            Ok(bytes) => serde_json::from_slice::<NewExample>(&bytes),
            Err(e) => {
                debug!(error = %e, "couldn't read request body");
                return text(StatusCode::BAD_REQUEST, "Invalid body");
            }
        };

        match new_example {
            Ok(NewExample { title }) => json(
                StatusCode::CREATED,
                &Example {
                    id: self.id_generator.next_id(),
                    title,
                },
            ),
            Err(e) => {
                debug!(error = %e, "rejected example payload");
                text(StatusCode::BAD_REQUEST, "Invalid body")
            }
        }
    }
}

impl Default for ExampleApi {
    fn default() -> Self {
        ExampleApiBuilder::new().build()
    }
}

impl Service<Request<Body>> for ExampleApi {
    type Response = Response<Body>;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Response<Body>, Infallible>> + Send>>;

    fn poll_ready(&mut self, _: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request<Body>) -> Self::Future {
        let api = self.clone();
        Box::pin(async move { Ok(api.handle(request).await) })
    }
}

fn json<T: Serialize>(status: StatusCode, value: &T) -> Response<Body> {
    match serde_json::to_vec(value) {
        Ok(body) => with_content_type(status, body.into(), "application/json"),
        Err(_) => empty(StatusCode::INTERNAL_SERVER_ERROR),
    }
}

fn text(status: StatusCode, message: &'static str) -> Response<Body> {
    with_content_type(status, message.into(), "text/plain; charset=utf-8")
}

fn with_content_type(status: StatusCode, body: Body, content_type: &'static str) -> Response<Body> {
    let mut response = Response::new(body);
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}

fn empty(status: StatusCode) -> Response<Body> {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = status;
    response
}

fn method_not_allowed(allowed: Method) -> Response<Body> {
    let mut response = empty(StatusCode::METHOD_NOT_ALLOWED);
    if let Ok(allow) = HeaderValue::from_str(allowed.as_str()) {
        response.headers_mut().insert(header::ALLOW, allow);
    }
    response
}
