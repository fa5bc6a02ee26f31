//! Manifest records and their line encoding.
//!
//! One record per line, fields comma-separated in the fixed order
//! `hash,path[,ownerId,groupId,permissionBits]`. Directories carry the
//! [`DIRECTORY_SENTINEL`] hash. The three ownership fields are present only
//! when the record was collected on a platform with POSIX ownership.
//!
//! Paths are percent-escaped for `%`, `,`, LF and CR so they cannot break
//! the field split. A path without those characters encodes verbatim.
use std::borrow::Cow;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::PatchError;

/// Hash field value used for directory records.
pub const DIRECTORY_SENTINEL: &str = "-";

/// Content fingerprint stored in a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fingerprint {
    /// Directories have no content fingerprint.
    Directory,
    /// Lowercase hex digest of a regular file's content.
    Content(String),
}

impl Fingerprint {
    /// The value written to the hash field.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Directory => DIRECTORY_SENTINEL,
            Self::Content(hash) => hash,
        }
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// POSIX owner, group and permission bits of a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ownership {
    /// Numeric owner id.
    pub uid: u32,
    /// Numeric group id.
    pub gid: u32,
    /// Permission bits, including setuid/setgid/sticky (`0o7777` mask).
    pub mode: u32,
}

/// One tracked filesystem entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestRecord {
    /// Content fingerprint, or the directory sentinel.
    pub fingerprint: Fingerprint,
    /// Absolute live path.
    pub path: PathBuf,
    /// Ownership metadata; `None` on platforms without POSIX ownership.
    pub ownership: Option<Ownership>,
}

impl ManifestRecord {
    /// Returns `true` for directory records.
    #[must_use]
    pub const fn is_directory(&self) -> bool {
        matches!(self.fingerprint, Fingerprint::Directory)
    }

    /// Encode the record as a manifest line, without the trailing newline.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is not valid UTF-8.
    pub fn to_line(&self) -> Result<String, PatchError> {
        let path = self.path.to_str().ok_or_else(|| PatchError::Io {
            path: self.path.clone(),
            source: io::Error::new(io::ErrorKind::InvalidData, "path is not valid UTF-8"),
        })?;
        let mut line = format!("{},{}", self.fingerprint, escape_path(path));
        if let Some(own) = &self.ownership {
            line.push_str(&format!(",{},{},{:04o}", own.uid, own.gid, own.mode));
        }
        Ok(line)
    }

    /// Decode a manifest line. `line_no` is one-based and only used for
    /// error reporting.
    ///
    /// # Errors
    ///
    /// Returns [`PatchError::ManifestFormat`] if the line is malformed.
    pub fn parse_line(line: &str, line_no: usize) -> Result<Self, PatchError> {
        let malformed = |reason: String| PatchError::ManifestFormat {
            line: line_no,
            reason,
        };

        let fields: Vec<&str> = line.split(',').collect();
        let (hash, path, ownership) = match fields.as_slice() {
            [hash, path] => (*hash, *path, None),
            [hash, path, uid, gid, mode] => {
                let uid = uid
                    .parse::<u32>()
                    .map_err(|_| malformed(format!("invalid owner id '{uid}'")))?;
                let gid = gid
                    .parse::<u32>()
                    .map_err(|_| malformed(format!("invalid group id '{gid}'")))?;
                let mode = u32::from_str_radix(mode, 8)
                    .ok()
                    .filter(|m| *m <= 0o7777)
                    .ok_or_else(|| malformed(format!("invalid permission bits '{mode}'")))?;
                (*hash, *path, Some(Ownership { uid, gid, mode }))
            }
            other => {
                return Err(malformed(format!(
                    "expected 2 or 5 fields, found {}",
                    other.len()
                )));
            }
        };

        let fingerprint = match hash {
            "" => return Err(malformed("empty hash field".to_string())),
            DIRECTORY_SENTINEL => Fingerprint::Directory,
            h => Fingerprint::Content(h.to_string()),
        };

        let path = unescape_path(path).map_err(malformed)?;
        if path.is_empty() {
            return Err(malformed("empty path field".to_string()));
        }
        let path = PathBuf::from(path);
        if !path.is_absolute() {
            return Err(malformed(format!("path is not absolute: {}", path.display())));
        }

        Ok(Self {
            fingerprint,
            path,
            ownership,
        })
    }

    /// Live path of the record.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn escape_path(path: &str) -> Cow<'_, str> {
    if !path.contains(['%', ',', '\n', '\r']) {
        return Cow::Borrowed(path);
    }
    let mut out = String::with_capacity(path.len() + 8);
    for c in path.chars() {
        match c {
            '%' => out.push_str("%25"),
            ',' => out.push_str("%2C"),
            '\n' => out.push_str("%0A"),
            '\r' => out.push_str("%0D"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

fn unescape_path(field: &str) -> Result<String, String> {
    let mut out = String::with_capacity(field.len());
    let mut rest = field;
    while let Some(pos) = rest.find('%') {
        let (head, tail) = rest.split_at(pos);
        out.push_str(head);
        let code = tail
            .get(1..3)
            .ok_or_else(|| format!("truncated escape in path '{field}'"))?;
        let decoded = match code {
            "25" => '%',
            "2C" | "2c" => ',',
            "0A" | "0a" => '\n',
            "0D" | "0d" => '\r',
            other => return Err(format!("unknown escape '%{other}' in path '{field}'")),
        };
        out.push(decoded);
        rest = tail.get(3..).unwrap_or_default();
    }
    out.push_str(rest);
    Ok(out)
}
