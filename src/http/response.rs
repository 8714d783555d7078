//! Buffered HTTP responses

use crate::error::{ApiErrorDetail, Error, Result};
use bytes::Bytes;
use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// A fully read 2xx response
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: HeaderMap,
    /// Response body
    pub body: Bytes,
}

impl RawResponse {
    /// Decode the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(Error::JsonParse)
    }

    /// Body as UTF-8 text, lossily
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    errors: Vec<ApiErrorDetail>,
}

/// Extract the `errors` array from a failed response body
///
/// Bodies that are not an envelope yield a single detail carrying the raw
/// text, or nothing when the body is empty.
pub(crate) fn error_details(body: &[u8]) -> Vec<ApiErrorDetail> {
    if let Ok(parsed) = serde_json::from_slice::<ErrorBody>(body) {
        return parsed.errors;
    }

    let text = String::from_utf8_lossy(body).trim().to_string();
    if text.is_empty() {
        Vec::new()
    } else {
        vec![ApiErrorDetail {
            code: 0,
            message: text,
        }]
    }
}
