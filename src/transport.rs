use std::sync::Arc;

use reqwest::blocking::{Client, Response};
use reqwest::cookie::Jar;
use reqwest::{Identity, StatusCode};
use url::Url;

use crate::error::{Error, Result};

/// One conversation with a hub: a blocking HTTP client plus the cookie jar
/// that carries the hub session cookie between calls.
///
/// The jar is the only mutable state shared across requests. A session is
/// meant to be used from one build sequentially; it is not a connection pool
/// for concurrent callers.
pub struct HubSession {
    cookies: Arc<Jar>,
    client: Client,
}

impl HubSession {
    /// Fresh session with an empty cookie jar and no client certificate.
    pub fn anonymous() -> Result<Self> {
        let cookies = Arc::new(Jar::default());
        let client = build_client(cookies.clone(), None)?;
        Ok(HubSession { cookies, client })
    }

    /// Swap in a client bound to a TLS client identity. The cookie jar is
    /// kept, so cookies set before or after the swap stay with the session.
    pub fn install_identity(&mut self, identity: Identity) -> Result<()> {
        self.client = build_client(self.cookies.clone(), Some(identity))?;
        Ok(())
    }

    pub fn get(&self, url: Url) -> Result<Response> {
        log::debug!("GET {url}");
        Ok(self.client.get(url).send()?)
    }

    pub fn post_form(&self, url: Url, form: &[(&str, &str)]) -> Result<Response> {
        log::debug!("POST {url}");
        Ok(self.client.post(url).form(form).send()?)
    }

    /// GET that insists on HTTP 200 and returns the body text. The hub
    /// reports errors with non-200 statuses, never with error documents.
    pub fn get_ok(&self, url: Url) -> Result<String> {
        let response = self.get(url.clone())?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(Error::Transport(format!(
                "hub returned HTTP {} for {url}",
                status.as_u16()
            )));
        }
        Ok(response.text()?)
    }
}

fn build_client(cookies: Arc<Jar>, identity: Option<Identity>) -> Result<Client> {
    let mut builder = Client::builder()
        .cookie_provider(cookies)
        .user_agent(concat!("codesonar-gate/", env!("CARGO_PKG_VERSION")));

    if let Some(identity) = identity {
        builder = builder.identity(identity);
    }

    builder.build().map_err(Error::from)
}
