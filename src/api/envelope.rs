//! Response envelope
//!
//! Every v4 endpoint wraps its payload in the same JSON object:
//!
//! ```json
//! {
//!   "success": true,
//!   "errors": [],
//!   "messages": [],
//!   "result": { ... },
//!   "result_info": { "page": 1, "per_page": 20, "count": 1, "total_count": 1, "total_pages": 1 }
//! }
//! ```

use crate::error::{ApiErrorDetail, Error, Result};
use crate::pagination::ResultInfo;
use serde::{Deserialize, Serialize};

/// Informational message attached to a response
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResponseMessage {
    /// Message code
    #[serde(default)]
    pub code: i64,
    /// Message text
    #[serde(default)]
    pub message: String,
}

/// Standard response wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    /// Whether the call succeeded
    pub success: bool,
    /// Errors reported by the service
    #[serde(default)]
    pub errors: Vec<ApiErrorDetail>,
    /// Informational messages
    #[serde(default)]
    pub messages: Vec<ResponseMessage>,
    /// Payload
    pub result: Option<T>,
    /// Pagination descriptor, present on list endpoints
    #[serde(default)]
    pub result_info: Option<ResultInfo>,
}

impl<T> Envelope<T> {
    /// Turn `success: false` into an error
    pub fn into_success(self, status: u16) -> Result<Self> {
        if self.success {
            Ok(self)
        } else {
            Err(Error::api(status, self.errors))
        }
    }

    /// Take the payload, failing when it is absent
    pub fn into_result(self) -> Result<T> {
        self.result
            .ok_or_else(|| Error::Other("response envelope has no result".to_string()))
    }
}
