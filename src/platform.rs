//! Platform detection and capability flags.
use std::fmt;

/// Detected operating system platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Os {
    /// Linux and other Unix-like systems.
    Linux,
    /// Windows.
    Windows,
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linux => write!(f, "linux"),
            Self::Windows => write!(f, "windows"),
        }
    }
}

/// Platform information for the current system.
///
/// Components switch on [`supports_ownership`](Self::supports_ownership)
/// rather than on the OS name when deciding whether owner, group and
/// permission bits are recorded and re-applied.
#[derive(Debug, Clone)]
pub struct Platform {
    /// Operating system family.
    pub os: Os,
    /// Whether the filesystem exposes POSIX owner/group/mode metadata.
    pub supports_ownership: bool,
}

impl Platform {
    /// Detect the current platform.
    #[must_use]
    pub fn detect() -> Self {
        Self {
            os: Self::detect_os(),
            supports_ownership: cfg!(unix),
        }
    }

    /// Create a platform with explicit values.
    #[must_use]
    pub const fn new(os: Os, supports_ownership: bool) -> Self {
        Self {
            os,
            supports_ownership,
        }
    }

    /// Returns `true` on Windows.
    #[must_use]
    pub fn is_windows(&self) -> bool {
        self.os == Os::Windows
    }

    fn detect_os() -> Os {
        if cfg!(target_os = "windows") {
            Os::Windows
        } else {
            Os::Linux
        }
    }
}
