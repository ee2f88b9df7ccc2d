//! Backend implementations for segmentation inference
//!
//! - Tract backend (pure Rust, no native dependencies)

#[cfg(feature = "tract")]
pub mod tract;

#[cfg(feature = "tract")]
pub use self::tract::TractBackend;
