//! Page access module
//!
//! Capability traits for navigating pages and reading elements, and a
//! static-HTML implementation built on `reqwest` and `scraper`.

mod static_page;
mod traits;

pub use static_page::{
    StaticElement, StaticLauncher, StaticPage, StaticSession, DEFAULT_BROWSER_USER_AGENT,
};
pub use traits::{
    BrowserSession, ElementHandle, PageAccessor, PageError, PageResult, SessionLauncher,
};
