mod error;
mod example_api;
mod id_generator;
pub mod server;

pub use error::{Error, Result};
pub use example_api::{AuthPolicy, Example, ExampleApi, ExampleApiBuilder, AUTH_TOKEN_HEADER};
pub use id_generator::{FixedIdGenerator, IdGenerator, RandomIdGenerator};
pub use server::ServerConfiguration;
