//! Service layer for image I/O and source retrieval
//!
//! This module separates byte-level concerns from the pipeline logic:
//! - Image codec (decode, PNG encode, base64 transport)
//! - Source image fetching over HTTP

pub mod fetch;
pub mod io;

pub use fetch::{HttpImageFetcher, ImageFetcher};
pub use io::{ImageIOService, PNG_DATA_URL_PREFIX};
