//! Error types for ebb

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Import error: {0}")]
    Import(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Sheets API error ({status}): {message}")]
    SheetsApi { status: u16, message: String },
}

impl Error {
    /// Whether retrying the same request could succeed
    ///
    /// Network failures, rate limiting and server-side errors are transient.
    /// Auth, permission and not-found failures are not.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Http(e) => {
                e.is_timeout()
                    || e.is_connect()
                    || e.is_request()
                    || e.status().is_some_and(|s| s.as_u16() == 429 || s.is_server_error())
            }
            Error::SheetsApi { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sheets_api_transient_statuses() {
        let rate_limited = Error::SheetsApi {
            status: 429,
            message: "quota".into(),
        };
        let unavailable = Error::SheetsApi {
            status: 503,
            message: "backend".into(),
        };
        assert!(rate_limited.is_transient());
        assert!(unavailable.is_transient());
    }

    #[test]
    fn test_permanent_errors() {
        let forbidden = Error::SheetsApi {
            status: 403,
            message: "caller does not have permission".into(),
        };
        let not_found = Error::SheetsApi {
            status: 404,
            message: "Requested entity was not found".into(),
        };
        assert!(!forbidden.is_transient());
        assert!(!not_found.is_transient());
        assert!(!Error::Auth("bad key".into()).is_transient());
        assert!(!Error::Import("Missing date".into()).is_transient());
    }

    #[test]
    fn test_error_display() {
        let err = Error::SheetsApi {
            status: 404,
            message: "Unable to parse range".into(),
        };
        assert_eq!(
            err.to_string(),
            "Sheets API error (404): Unable to parse range"
        );
    }
}
