//! Catalog backends: the HTTP listing provider and the synthetic
//! generator used for local development and transport-failure fallback.

pub mod http;
pub mod synthetic;

pub use http::HttpCatalog;
pub use synthetic::{synthetic_page, SyntheticCatalog};
