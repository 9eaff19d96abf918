use std::fmt;

#[derive(Debug)]
pub enum Error {
    Http(reqwest::Error),
    Authentication { status: u16 },
    Api { status: u16 },
    Json(serde_json::Error),
    Io(std::io::Error),
}

impl Error {
    /// Failures at the API level: transport errors, bad credentials, and
    /// non-2xx statuses. A poll cycle tolerates these per feed; decode and
    /// IO failures are outside this class and abort the cycle.
    pub fn is_api(&self) -> bool {
        matches!(
            self,
            Error::Http(_) | Error::Authentication { .. } | Error::Api { .. }
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Http(e) => write!(f, "HTTP error: {e}"),
            Error::Authentication { status } => write!(f, "authentication failed: {status}"),
            Error::Api { status } => write!(f, "API request failed: {status}"),
            Error::Json(e) => write!(f, "decode error: {e}"),
            Error::Io(e) => write!(f, "IO error: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Http(e) => Some(e),
            Error::Json(e) => Some(e),
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Http(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Json(e)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
