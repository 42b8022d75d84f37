//! Transport module
//!
//! HTTP capability consumed by the API client, the response type it returns,
//! and the `reqwest` implementation used outside of tests.

mod reqwest_transport;
mod response;
mod traits;

pub use reqwest_transport::{ReqwestTransport, TransportSettings, GITHUB_MEDIA_TYPE};
pub use response::ApiResponse;
pub use traits::{HttpMethod, Transport, TransportError, TransportRequest, TransportResult};
