//! `reqwest`-backed [`Transport`] with manual redirect handling.
//!
//! The client carries no cookie store and no per-request timeout: cookies are
//! tracked by the auth module's allow-listed jar and the only deadline is the
//! driver's global watchdog.

use std::panic::{AssertUnwindSafe, catch_unwind};

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, LOCATION, SET_COOKIE};
use reqwest::redirect::Policy;
use reqwest::{Client, ClientBuilder, Proxy};
use tracing::{debug, instrument, warn};
use url::Url;

use super::{HttpRequest, HttpResponse, Method, Transport, TransportError};
use crate::user_agent;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Production transport built on a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Builds a transport with the browser User-Agent and redirects disabled.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Client`] when client construction fails.
    pub fn new() -> Result<Self, TransportError> {
        Self::with_user_agent(user_agent::browser_user_agent())
    }

    /// Builds a transport with a custom User-Agent.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Client`] when client construction fails.
    pub fn with_user_agent(user_agent: impl Into<String>) -> Result<Self, TransportError> {
        let user_agent = user_agent.into();
        match try_build_client(&user_agent, false) {
            Ok(client) => Ok(Self { client }),
            Err(BuildClientFailure::Panic) => {
                // Some sandboxed environments panic when querying system proxy
                // settings; fall back to env-only proxy configuration.
                warn!("HTTP client hit system proxy panic; using env-proxy fallback builder");
                match try_build_client(&user_agent, true) {
                    Ok(client) => Ok(Self { client }),
                    Err(BuildClientFailure::Panic) => Err(TransportError::client(
                        "client construction panicked while reading proxy settings",
                    )),
                    Err(BuildClientFailure::Build(error)) => {
                        Err(TransportError::client(error.to_string()))
                    }
                }
            }
            Err(BuildClientFailure::Build(error)) => Err(TransportError::client(error.to_string())),
        }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    #[instrument(level = "debug", skip(self, request), fields(method = request.method.as_str(), url = %request.url))]
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let url = build_url(&request)?;
        let url_text = url.to_string();

        let mut builder = match request.method {
            Method::Get => self.client.get(url),
            Method::Post => self.client.post(url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(*name, value.as_str());
        }
        if let Some(fields) = &request.form {
            builder = builder
                .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
                .body(encode_form(fields));
        }

        let response = builder
            .send()
            .await
            .map_err(|error| TransportError::network(&url_text, error))?;

        let status = response.status();
        let set_cookies: Vec<String> = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .map(str::to_string)
            .collect();
        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        debug!(
            status = status.as_u16(),
            reason = status.canonical_reason().unwrap_or(""),
            cookies = set_cookies.len(),
            "response received"
        );

        let body = response
            .text()
            .await
            .map_err(|error| TransportError::body(&url_text, error))?;

        Ok(HttpResponse {
            status: status.as_u16(),
            set_cookies,
            location,
            body,
        })
    }
}

/// Joins the request URL with its query parameters.
fn build_url(request: &HttpRequest) -> Result<Url, TransportError> {
    let mut url = Url::parse(&request.url).map_err(|_| TransportError::invalid_url(&request.url))?;
    if !request.query.is_empty() {
        url.query_pairs_mut().extend_pairs(
            request
                .query
                .iter()
                .map(|(name, value)| (*name, value.as_str())),
        );
    }
    Ok(url)
}

fn encode_form(fields: &[(&'static str, String)]) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(fields.iter().map(|(name, value)| (*name, value.as_str())))
        .finish()
}

enum BuildClientFailure {
    Panic,
    Build(reqwest::Error),
}

fn try_build_client(
    user_agent: &str,
    disable_system_proxy_lookup: bool,
) -> Result<Client, BuildClientFailure> {
    let user_agent = user_agent.to_string();
    catch_unwind(AssertUnwindSafe(move || {
        let mut builder = base_builder(user_agent);
        if disable_system_proxy_lookup {
            builder = apply_env_proxy_fallback(builder.no_proxy());
        }
        builder.build().map_err(BuildClientFailure::Build)
    }))
    .map_err(|_| BuildClientFailure::Panic)?
}

fn base_builder(user_agent: String) -> ClientBuilder {
    Client::builder()
        .redirect(Policy::none())
        .user_agent(user_agent)
        .gzip(true)
}

fn apply_env_proxy_fallback(mut builder: ClientBuilder) -> ClientBuilder {
    if let Some(proxy) =
        find_first_env_var(&["HTTPS_PROXY", "https_proxy", "ALL_PROXY", "all_proxy"])
        && let Ok(resolved) = Proxy::https(&proxy)
    {
        builder = builder.proxy(resolved);
    }
    if let Some(proxy) = find_first_env_var(&["HTTP_PROXY", "http_proxy", "ALL_PROXY", "all_proxy"])
        && let Ok(resolved) = Proxy::http(&proxy)
    {
        builder = builder.proxy(resolved);
    }
    builder
}

fn find_first_env_var(names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| {
        std::env::var(name)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    })
}
