//! What the CLI prints for each dispatched intent.
//!
//! One JSON object per intent, on stdout:
//!
//! ```text
//! {"status":"ok","result":{...}}
//! {"status":"cancelled"}
//! {"status":"error","error":{"kind":"hook","message":"...","code":"WORKSPACE_..."}}
//! ```

use hydra_runtime::DispatchError;
use serde::Serialize;
use serde_json::Value;

/// Transportable form of a failed dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorPayload {
    /// `routing`, `hook`, `operation`, `engine` or `request`.
    pub kind: String,
    pub message: String,
    /// Most specific machine code available.
    pub code: String,
}

impl ErrorPayload {
    /// A request line that never became an intent.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            kind: "request".to_string(),
            message: message.into(),
            code: "CLI_INVALID_REQUEST".to_string(),
        }
    }
}

impl From<&DispatchError> for ErrorPayload {
    fn from(err: &DispatchError) -> Self {
        Self {
            kind: err.kind().to_string(),
            message: err.to_string(),
            code: err.detail_code().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Response {
    Ok { result: Value },
    /// An interceptor dropped the intent. Not a failure.
    Cancelled,
    Error { error: ErrorPayload },
}

impl Response {
    pub fn from_dispatch(outcome: Result<Option<Value>, DispatchError>) -> Self {
        match outcome {
            Ok(Some(result)) => Self::Ok { result },
            Ok(None) => Self::Cancelled,
            Err(err) => Self::Error {
                error: ErrorPayload::from(&err),
            },
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    /// Single-line JSON.
    pub fn to_line(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            r#"{"status":"error","error":{"kind":"engine","message":"unencodable result","code":"CLI_ENCODE"}}"#
                .to_string()
        })
    }
}
