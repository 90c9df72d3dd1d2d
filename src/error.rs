use thiserror::Error;

/// Field names probed, in order, when extracting a human-readable message
/// from an error response body.
pub const ERROR_MESSAGE_FIELDS: [&str; 2] = ["error", "message"];

/// The single error shape every call surfaces.
///
/// Displaying any variant yields only the human-readable message; callers
/// that need the HTTP status use [`ClientError::status`].
#[derive(Debug, Error)]
pub enum ClientError {
    /// The connection could not be established, or the call timed out.
    #[error("{message}")]
    Transport { message: String },

    /// The backend answered with a non-2xx status.
    #[error("{message}")]
    Http { status: u16, message: String },

    /// A 2xx response whose envelope reported `success: false`.
    #[error("{message}")]
    Api { message: String },
}

impl ClientError {
    pub(crate) fn transport<E: std::fmt::Display>(error: E) -> Self {
        Self::Transport {
            message: error.to_string(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Transport { message } | Self::Http { message, .. } | Self::Api { message } => {
                message
            }
        }
    }

    /// HTTP status code, when a response was obtained at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::Transport { .. } | Self::Api { .. } => None,
        }
    }

    /// Stringified status code; absent for pure network failures.
    pub fn code(&self) -> Option<String> {
        self.status().map(|s| s.to_string())
    }
}

/// Build the error for a non-2xx response.
///
/// Probes the body's JSON fields in [`ERROR_MESSAGE_FIELDS`] order and falls
/// back to `HTTP Error: <status>` when the body is not JSON, the fields are
/// absent, or the matched field is empty.
pub(crate) fn http_error(status: u16, body: &str) -> ClientError {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            ERROR_MESSAGE_FIELDS.iter().find_map(|field| {
                value
                    .get(field)
                    .and_then(|m| m.as_str())
                    .filter(|m| !m.is_empty())
                    .map(str::to_owned)
            })
        })
        .unwrap_or_else(|| format!("HTTP Error: {status}"));

    ClientError::Http { status, message }
}
