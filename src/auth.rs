//! Hub sign-in and sign-out.
//!
//! The hub accepts three kinds of callers: trusted-network anonymous,
//! form-credential, and mutual-TLS client-certificate. All three share one
//! contract: after `authenticate` returns `Ok`, the session's cookie jar
//! holds whatever the hub needs to recognise later requests. Failures are
//! terminal for the build; nothing here retries.

use std::path::PathBuf;

use reqwest::{Identity, StatusCode};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Error, Result};
use crate::transport::HubSession;

const SIGN_IN_PATH: &str = "/sign_in.html";
const SIGN_OUT_PATH: &str = "/sign_out.html";

/// How to introduce ourselves to the hub, selected by configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AuthMethod {
    /// The hub trusts the network; no sign-in round trip at all.
    Anonymous,
    /// Form-based sign-in with hub credentials.
    Password { username: String, password: String },
    /// Mutual-TLS sign-in with a PKCS#12 client keystore on disk.
    Certificate { keystore: PathBuf, password: String },
}

impl AuthMethod {
    pub fn authenticate(&self, session: &mut HubSession, base: &Url) -> Result<()> {
        match self {
            AuthMethod::Anonymous => Ok(()),
            AuthMethod::Password { username, password } => sign_in(
                session,
                base,
                &[
                    ("sif_username", username.as_str()),
                    ("sif_password", password.as_str()),
                    ("sif_sign_in", "yes"),
                    ("sif_log_out_competitor", "yes"),
                ],
            ),
            AuthMethod::Certificate { keystore, password } => {
                let bundle = std::fs::read(keystore).map_err(|e| {
                    Error::Auth(format!("cannot read keystore {}: {e}", keystore.display()))
                })?;
                authenticate_with_certificate(session, base, &bundle, password)
            }
        }
    }
}

/// Certificate sign-in with already-loaded key material. Binds the TLS
/// identity to the session's client (keeping its cookie jar), then performs
/// the TLS-flagged sign-in POST.
pub fn authenticate_with_certificate(
    session: &mut HubSession,
    base: &Url,
    pkcs12: &[u8],
    password: &str,
) -> Result<()> {
    let identity = Identity::from_pkcs12_der(pkcs12, password)
        .map_err(|e| Error::Auth(format!("unusable client-certificate keystore: {e}")))?;
    session.install_identity(identity)?;

    sign_in(
        session,
        base,
        &[
            ("sif_use_tls", "yes"),
            ("sif_sign_in", "yes"),
            ("sif_log_out_competitor", "yes"),
        ],
    )
}

fn sign_in(session: &HubSession, base: &Url, form: &[(&str, &str)]) -> Result<()> {
    let url = endpoint(base, SIGN_IN_PATH)?;
    let response = session
        .post_form(url, form)
        .map_err(|e| Error::Auth(format!("sign-in request failed: {e}")))?;

    let status = response.status();
    if status != StatusCode::OK {
        return Err(Error::Auth(format!(
            "hub rejected sign-in with HTTP {}",
            status.as_u16()
        )));
    }

    log::info!("signed in to {base}");
    Ok(())
}

/// Ends the hub session. A failed sign-out is still a hard error: it leaves
/// a session slot occupied on the hub.
pub fn sign_out(session: &HubSession, base: &Url) -> Result<()> {
    let url = endpoint(base, SIGN_OUT_PATH)?;
    let response = session
        .get(url)
        .map_err(|e| Error::Auth(format!("sign-out request failed: {e}")))?;

    let status = response.status();
    if status != StatusCode::OK {
        return Err(Error::Auth(format!(
            "hub rejected sign-out with HTTP {}",
            status.as_u16()
        )));
    }

    log::info!("signed out from {base}");
    Ok(())
}

fn endpoint(base: &Url, path: &str) -> Result<Url> {
    base.join(path)
        .map_err(|e| Error::Config(format!("bad hub address '{base}': {e}")))
}
