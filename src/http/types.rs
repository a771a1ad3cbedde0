use serde::{Deserialize, Serialize};

/// Application-level status the backend uses for "payload present".
pub const SUCCESS_STATUS: u16 = 200;

/// The `{ status, data }` wrapper every explorer endpoint responds with.
///
/// `status` is independent of the HTTP status line: the backend answers
/// `200 OK` at the transport level and signals "no usable payload" with a
/// different `status` here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub status: u16,
    #[serde(default)]
    pub data: serde_json::Value,
}

impl Envelope {
    pub fn new(status: u16, data: serde_json::Value) -> Self {
        Self { status, data }
    }

    pub fn is_success(&self) -> bool {
        self.status == SUCCESS_STATUS
    }
}
