use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Everything the gate can fail with. Each variant maps to a distinct
/// operator action: fix the configuration, fix the credentials, check the
/// network, or check the hub version.
#[derive(Error, Debug)]
pub enum Error {
    /// Bad input: malformed URL, unknown project, invalid gate configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Sign-in or sign-out rejected, or unusable client-certificate material.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Network failure or an unexpected HTTP status from the hub.
    #[error("hub transport error: {0}")]
    Transport(String),

    /// Malformed or schema-mismatched XML in a hub response.
    #[error("malformed hub response: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Transport(err.to_string())
    }
}

impl From<roxmltree::Error> for Error {
    fn from(err: roxmltree::Error) -> Self {
        Error::Parse(err.to_string())
    }
}
