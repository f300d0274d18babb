use std::fmt;
use std::path::Path;

use crate::actions::package::PackageManager;

/// Detected operating system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Os {
    /// Any Linux distribution.
    Linux,
    /// macOS.
    MacOs,
    /// Anything else (BSDs, unknown Unix).
    Other,
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linux => write!(f, "linux"),
            Self::MacOs => write!(f, "macos"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// Linux distribution family, as far as package management is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Distro {
    /// Debian, Ubuntu and derivatives (apt).
    Debian,
    /// Arch Linux and derivatives (pacman).
    Arch,
    /// No supported system package manager detected.
    Unknown,
}

impl fmt::Display for Distro {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Debian => write!(f, "debian"),
            Self::Arch => write!(f, "arch"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Platform information for the current host.
#[derive(Debug, Clone)]
pub struct Platform {
    /// Operating system.
    pub os: Os,
    /// Distribution family (always [`Distro::Unknown`] off Linux).
    pub distro: Distro,
}

impl Platform {
    /// Detect the current platform.
    #[must_use]
    pub fn detect() -> Self {
        let os = Self::detect_os();
        let distro = if os == Os::Linux {
            Self::detect_distro(Path::new("/etc"))
        } else {
            Distro::Unknown
        };
        Self { os, distro }
    }

    /// Create a platform with explicit values.
    #[must_use]
    pub const fn new(os: Os, distro: Distro) -> Self {
        Self { os, distro }
    }

    /// `true` on Linux.
    #[must_use]
    pub fn is_linux(&self) -> bool {
        self.os == Os::Linux
    }

    /// The system package manager used for `os_packages` actions.
    #[must_use]
    pub const fn os_package_manager(&self) -> Option<PackageManager> {
        match self.distro {
            Distro::Debian => Some(PackageManager::Apt),
            Distro::Arch => Some(PackageManager::Pacman),
            Distro::Unknown => None,
        }
    }

    fn detect_os() -> Os {
        if cfg!(target_os = "linux") {
            Os::Linux
        } else if cfg!(target_os = "macos") {
            Os::MacOs
        } else {
            Os::Other
        }
    }

    /// Identify the distribution family from marker files under `etc`.
    fn detect_distro(etc: &Path) -> Distro {
        if etc.join("arch-release").exists() {
            Distro::Arch
        } else if etc.join("debian_version").exists() {
            Distro::Debian
        } else {
            Distro::Unknown
        }
    }
}
