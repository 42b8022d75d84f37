use crate::transport::TransportResult;
use serde::de::DeserializeOwned;

/// Raw response from one API call
///
/// The body is kept as bytes; JSON is only decoded when a caller asks for a
/// view of it, and can be decoded into different shapes from the same bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    status: u16,
    status_text: String,
    url: String,
    body: Vec<u8>,
}

impl ApiResponse {
    pub fn new(
        status: u16,
        status_text: impl Into<String>,
        url: impl Into<String>,
        body: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            status,
            status_text: status_text.into(),
            url: url.into(),
            body: body.into(),
        }
    }

    /// HTTP status code
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Canonical reason phrase, e.g. `"OK"`; empty for unknown codes
    pub fn status_text(&self) -> &str {
        &self.status_text
    }

    /// Final URL the response came from
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Returns true for 2xx statuses
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body as text, with invalid UTF-8 replaced
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Decodes the body as JSON into `T`
    ///
    /// # Errors
    ///
    /// Returns `TransportError::Json` when the body is not valid JSON or
    /// does not match `T`. An empty body (e.g. a 204) always fails here.
    pub fn json<T: DeserializeOwned>(&self) -> TransportResult<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}
