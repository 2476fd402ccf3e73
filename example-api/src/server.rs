use crate::{
    error::{Error, Result},
    example_api::{AuthPolicy, ExampleApi},
};
use hyper::{server::conn::AddrStream, service::make_service_fn, Server};
use std::{
    convert::Infallible,
    env,
    future::Future,
    net::SocketAddr,
};

pub const ADDRESS_VARIABLE: &str = "EXAMPLE_API_ADDR";
pub const AUTH_TOKEN_VARIABLE: &str = "EXAMPLE_API_AUTH_TOKEN";
const DEFAULT_ADDRESS: &str = "127.0.0.1:8000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfiguration {
    pub address: SocketAddr,
    pub auth_policy: AuthPolicy,
}

impl ServerConfiguration {
    /// Reads `EXAMPLE_API_ADDR` and `EXAMPLE_API_AUTH_TOKEN`.
    pub fn from_env() -> Result<Self> {
        Self::from_values(
            env::var(ADDRESS_VARIABLE).ok(),
            env::var(AUTH_TOKEN_VARIABLE).ok(),
        )
    }

    fn from_values(address: Option<String>, auth_token: Option<String>) -> Result<Self> {
        let address = address.unwrap_or_else(|| DEFAULT_ADDRESS.into());
        let auth_policy = match auth_token {
            Some(token) if !token.is_empty() => AuthPolicy::Token(token),
            _ => AuthPolicy::Disabled,
        };

        Ok(Self {
            address: address
                .parse()
                .map_err(|source| Error::InvalidAddress { address, source })?,
            auth_policy,
        })
    }
}

/// Binds `address` and returns the bound address with the server future.
pub fn bind(
    address: SocketAddr,
    api: ExampleApi,
) -> Result<(SocketAddr, impl Future<Output = std::result::Result<(), hyper::Error>>)> {
    let server = Server::try_bind(&address)?.serve(make_service_fn(move |_: &AddrStream| {
        let api = api.clone();
        async move { Ok::<_, Infallible>(api) }
    }));

    Ok((server.local_addr(), server))
}
