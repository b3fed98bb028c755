//! Coarse classification of numeric response status codes.

use std::fmt;

/// Status family of a response code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusFamily {
    /// 1xx
    Informational,
    /// 2xx
    Success,
    /// 3xx
    Redirection,
    /// 4xx
    ClientError,
    /// 5xx
    ServerError,
    /// Any code outside `100..=599`.
    Other,
}

impl StatusFamily {
    #[must_use]
    pub fn of(status: u16) -> Self {
        match status {
            100..=199 => StatusFamily::Informational,
            200..=299 => StatusFamily::Success,
            300..=399 => StatusFamily::Redirection,
            400..=499 => StatusFamily::ClientError,
            500..=599 => StatusFamily::ServerError,
            _ => StatusFamily::Other,
        }
    }

    #[must_use]
    pub fn is_success(self) -> bool {
        self == StatusFamily::Success
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            StatusFamily::Informational => "informational",
            StatusFamily::Success => "success",
            StatusFamily::Redirection => "redirection",
            StatusFamily::ClientError => "client-error",
            StatusFamily::ServerError => "server-error",
            StatusFamily::Other => "other",
        }
    }
}

impl fmt::Display for StatusFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status code used to look up the declared success response type.
pub const STATUS_OK: u16 = 200;
