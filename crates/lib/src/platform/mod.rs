//! Build platform specifiers (`os/arch[/variant]`).

pub mod arch;
pub mod os;

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

pub use arch::Arch;
pub use os::Os;

/// Specifier that stands for the host platform.
pub const LOCAL: &str = "local";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlatformError {
  #[error("invalid platform '{value}': expected os/arch[/variant]")]
  Format { value: String },

  #[error("invalid platform '{value}': unknown operating system '{os}'")]
  UnknownOs { value: String, os: String },

  #[error("invalid platform '{value}': unknown architecture '{arch}'")]
  UnknownArch { value: String, arch: String },

  #[error("host platform is not supported")]
  UnsupportedHost,
}

/// A normalized build platform.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Platform {
  pub os: Os,
  pub arch: Arch,
  pub variant: Option<String>,
}

impl Platform {
  pub fn new(os: Os, arch: Arch, variant: Option<String>) -> Self {
    let mut platform = Self { os, arch, variant };
    platform.normalize();
    platform
  }

  /// Detect the current platform at runtime
  ///
  /// Returns `None` if the OS or architecture is not supported
  pub fn current() -> Option<Self> {
    Some(Self::new(Os::current()?, Arch::current()?, None))
  }

  /// Parse a specifier such as `linux/arm64`, `linux/arm/v6` or `local`.
  pub fn parse(value: &str) -> Result<Self, PlatformError> {
    let trimmed = value.trim();
    if trimmed.eq_ignore_ascii_case(LOCAL) {
      return Self::current().ok_or(PlatformError::UnsupportedHost);
    }

    let parts: Vec<&str> = trimmed.split('/').collect();
    let (os, arch, variant) = match parts.as_slice() {
      [os, arch] => (*os, *arch, None),
      [os, arch, variant] if !variant.is_empty() => (*os, *arch, Some(variant.to_ascii_lowercase())),
      _ => return Err(PlatformError::Format { value: value.to_string() }),
    };

    let os = Os::parse(os).ok_or_else(|| PlatformError::UnknownOs {
      value: value.to_string(),
      os: os.to_string(),
    })?;
    let arch = Arch::parse(arch).ok_or_else(|| PlatformError::UnknownArch {
      value: value.to_string(),
      arch: arch.to_string(),
    })?;

    Ok(Self::new(os, arch, variant))
  }

  fn normalize(&mut self) {
    match (self.arch, self.variant.as_deref()) {
      (Arch::Arm, None) => self.variant = Some("v7".to_string()),
      (Arch::Arm64, Some("v8")) => self.variant = None,
      (Arch::Amd64, Some("v1")) => self.variant = None,
      _ => {}
    }
  }
}

impl FromStr for Platform {
  type Err = PlatformError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::parse(s)
  }
}

impl fmt::Display for Platform {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self.variant {
      Some(variant) => write!(f, "{}/{}/{}", self.os, self.arch, variant),
      None => write!(f, "{}/{}", self.os, self.arch),
    }
  }
}

/// The value of the `BAKE_LOCAL_PLATFORM` built-in.
///
/// Falls back to the raw std identifiers on hosts without a known mapping.
pub fn default_platform_string() -> String {
  match Platform::current() {
    Some(platform) => platform.to_string(),
    None => format!("{}/{}", std::env::consts::OS, std::env::consts::ARCH),
  }
}
