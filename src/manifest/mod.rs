//! The manifest: one record per tracked path, written by build and read back
//! by patch and restore.
pub mod record;
pub mod store;

pub use record::{DIRECTORY_SENTINEL, Fingerprint, ManifestRecord, Ownership};
pub use store::{ManifestStore, ManifestWriter};
