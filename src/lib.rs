//! Core functionality for finding and removing duplicate pictures.
//!
//! The pieces fit together as a pipeline:
//! - [`discovery`] walks directories for image files
//! - [`pipeline`] fingerprints them in parallel
//! - [`store`] persists one record per indexed file
//! - [`resolve`] clusters records that share a fingerprint
//! - [`disposal`] quarantines the redundant members of each cluster
//!
//! The fingerprint itself ([`fingerprint::fingerprint`]) is canonicalized over
//! the four right-angle rotations of an image, so two copies of the same
//! picture match even when one of them was saved rotated.

pub mod config;
pub mod discovery;
pub mod disposal;
pub mod fingerprint;
pub mod index;
pub mod metadata;
pub mod pipeline;
pub mod resolve;
pub mod review;
pub mod store;

pub use config::Settings;
pub use store::{DuplicateCluster, FingerprintStore, ImageRecord, StoreError};
