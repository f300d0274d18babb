//! Batched package installation through system and external managers.
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use super::error::{ActionError, describe_status};
use crate::steps::Context;

/// Supported package managers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManager {
    /// Debian/Ubuntu packages (dpkg + apt-get).
    Apt,
    /// Official Arch Linux packages (pacman).
    Pacman,
    /// Homebrew formulae.
    Brew,
    /// AUR packages (paru).
    Paru,
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Apt => write!(f, "apt"),
            Self::Pacman => write!(f, "pacman"),
            Self::Brew => write!(f, "brew"),
            Self::Paru => write!(f, "paru"),
        }
    }
}

impl FromStr for PackageManager {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "apt" => Ok(Self::Apt),
            "pacman" => Ok(Self::Pacman),
            "brew" | "homebrew" => Ok(Self::Brew),
            "paru" => Ok(Self::Paru),
            other => Err(other.to_string()),
        }
    }
}

impl PackageManager {
    /// Binary that must be on `PATH` for installs to work.
    #[must_use]
    pub const fn binary(self) -> &'static str {
        match self {
            Self::Apt => "apt-get",
            Self::Pacman => "pacman",
            Self::Brew => "brew",
            Self::Paru => "paru",
        }
    }

    /// System managers install as root; external ones refuse to.
    #[must_use]
    pub const fn needs_root(self) -> bool {
        matches!(self, Self::Apt | Self::Pacman)
    }

    /// Full install command line (program first) for `names`.
    fn install_argv<'a>(self, names: &[&'a str]) -> Vec<&'a str> {
        let mut argv = match self {
            Self::Apt => vec![
                "env",
                "DEBIAN_FRONTEND=noninteractive",
                "apt-get",
                "install",
                "-y",
            ],
            Self::Pacman => vec!["pacman", "-S", "--needed", "--noconfirm"],
            Self::Brew => vec!["brew", "install"],
            Self::Paru => vec!["paru", "-S", "--needed", "--noconfirm"],
        };
        argv.extend_from_slice(names);
        argv
    }
}

/// Query the full set of installed package names for a given manager.
///
/// Runs a single command regardless of how many packages are checked. A
/// failing query yields an empty set, so every requested name is treated as
/// missing and handed to the installer, which tolerates reinstalls.
///
/// # Errors
///
/// Returns an error if the query command cannot be spawned.
pub fn installed_packages(
    manager: PackageManager,
    ctx: &Context,
) -> Result<HashSet<String>, ActionError> {
    let (program, args): (&str, &[&str]) = match manager {
        // Only fully installed packages; removed-but-configured ones show as `rc`.
        PackageManager::Apt => ("dpkg-query", &["-W", "-f=${db:Status-Abbrev} ${Package}\n"]),
        PackageManager::Pacman | PackageManager::Paru => ("pacman", &["-Qq"]),
        PackageManager::Brew => ("brew", &["list", "-1"]),
    };
    let result = ctx
        .executor
        .run_unchecked(program, args)
        .map_err(|e| ActionError::Spawn {
            command: program.to_string(),
            reason: format!("{e:#}"),
        })?;
    if !result.success {
        ctx.log.debug(&format!(
            "{program} query failed, assuming nothing installed"
        ));
        return Ok(HashSet::new());
    }
    Ok(parse_installed(manager, &result.stdout))
}

fn parse_installed(manager: PackageManager, stdout: &str) -> HashSet<String> {
    let mut set = HashSet::new();
    for line in stdout.lines() {
        match manager {
            PackageManager::Apt => {
                let mut fields = line.split_whitespace();
                if let (Some(status), Some(name)) = (fields.next(), fields.next())
                    && status == "ii"
                {
                    set.insert(name.to_string());
                }
            }
            PackageManager::Pacman | PackageManager::Paru | PackageManager::Brew => {
                if let Some(name) = line.split_whitespace().next() {
                    set.insert(name.to_string());
                }
            }
        }
    }
    set
}

/// The name a package shows up under once installed.
///
/// Homebrew tap references (`owner/tap/formula`) list as `formula`.
fn installed_name(manager: PackageManager, requested: &str) -> &str {
    match manager {
        PackageManager::Brew => requested.rsplit('/').next().unwrap_or(requested),
        PackageManager::Apt | PackageManager::Pacman | PackageManager::Paru => requested,
    }
}

/// Install whichever of `names` are not yet installed, in one batch.
///
/// Duplicate names are collapsed. When everything is already installed no
/// install command is spawned.
///
/// # Errors
///
/// Returns an error if the manager binary is missing, the query cannot be
/// spawned, or the install command fails.
pub fn install_missing(
    manager: PackageManager,
    names: &[String],
    ctx: &Context,
) -> Result<(), ActionError> {
    if !ctx.executor.which(manager.binary()) {
        return Err(ActionError::ManagerUnavailable {
            manager: manager.to_string(),
        });
    }

    let installed = installed_packages(manager, ctx)?;
    let mut seen = HashSet::new();
    let missing: Vec<&str> = names
        .iter()
        .map(String::as_str)
        .filter(|name| seen.insert(*name))
        .filter(|name| !installed.contains(installed_name(manager, name)))
        .collect();

    if missing.is_empty() {
        ctx.log.debug(&format!(
            "all {} {manager} packages already installed",
            seen.len()
        ));
        return Ok(());
    }

    ctx.log
        .info(&format!("installing via {manager}: {}", missing.join(" ")));

    let mut argv = manager.install_argv(&missing);
    if manager.needs_root() && ctx.elevate {
        argv.insert(0, "sudo");
    }
    let Some((program, args)) = argv.split_first() else {
        return Ok(());
    };
    let command = argv.join(" ");
    let result = ctx
        .executor
        .run_unchecked(program, args)
        .map_err(|e| ActionError::Spawn {
            command: command.clone(),
            reason: format!("{e:#}"),
        })?;
    if result.success {
        Ok(())
    } else {
        Err(ActionError::CommandFailed {
            command,
            status: describe_status(result.code),
            output: result.combined_output(),
        })
    }
}
