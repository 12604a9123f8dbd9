use std::fmt;

/// CPU architectures a build can target, using OCI names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Arch {
  Amd64,
  Arm64,
  Arm,
  I386,
  Ppc64le,
  S390x,
  Riscv64,
}

impl Arch {
  /// Detect the current CPU architecture at runtime
  pub fn current() -> Option<Self> {
    Self::parse(std::env::consts::ARCH)
  }

  /// Parse an architecture name, accepting toolchain aliases
  /// (`x86_64`, `aarch64`, `i686`).
  pub fn parse(name: &str) -> Option<Self> {
    match name.to_ascii_lowercase().as_str() {
      "amd64" | "x86_64" | "x86-64" => Some(Self::Amd64),
      "arm64" | "aarch64" => Some(Self::Arm64),
      "arm" => Some(Self::Arm),
      "386" | "i386" | "i686" | "x86" => Some(Self::I386),
      "ppc64le" | "powerpc64le" => Some(Self::Ppc64le),
      "s390x" => Some(Self::S390x),
      "riscv64" => Some(Self::Riscv64),
      _ => None,
    }
  }

  /// Returns the OCI string identifier for this architecture
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Amd64 => "amd64",
      Self::Arm64 => "arm64",
      Self::Arm => "arm",
      Self::I386 => "386",
      Self::Ppc64le => "ppc64le",
      Self::S390x => "s390x",
      Self::Riscv64 => "riscv64",
    }
  }
}

impl fmt::Display for Arch {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}
