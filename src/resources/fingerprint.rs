//! Content fingerprints for change detection.
use std::fmt::Write as _;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::error::PatchError;

const CHUNK: usize = 64 * 1024;

/// Compute the lowercase hex SHA-256 digest of the file at `path`.
///
/// The content is streamed, so large files are never held in memory.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or read.
pub fn fingerprint_file(path: &Path) -> Result<String, PatchError> {
    let file = File::open(path).map_err(|e| PatchError::io(path, e))?;
    fingerprint_reader(file).map_err(|e| PatchError::io(path, e))
}

/// Compute the digest of everything readable from `reader`.
///
/// # Errors
///
/// Returns an error if reading fails.
pub fn fingerprint_reader(mut reader: impl Read) -> io::Result<String> {
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; CHUNK];
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(buf.get(..n).unwrap_or_default());
    }
    Ok(to_hex(&hasher.finalize()))
}

/// Compute the digest of an in-memory byte slice.
#[must_use]
pub fn fingerprint_bytes(bytes: &[u8]) -> String {
    to_hex(&Sha256::digest(bytes))
}

fn to_hex(digest: &[u8]) -> String {
    let mut hex = String::with_capacity(digest.len() * 2);
    for b in digest {
        // write! to a String is infallible; unwrap_or(()) makes that explicit.
        write!(hex, "{b:02x}").unwrap_or(());
    }
    hex
}
