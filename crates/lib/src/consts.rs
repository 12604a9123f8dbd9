/// Name requested when no target is given on the command line.
pub const DEFAULT_GROUP: &str = "default";

/// Dockerfile used when a target does not name one.
pub const DEFAULT_DOCKERFILE: &str = "Dockerfile";

/// Configuration files probed when none are given explicitly.
pub const DEFAULT_FILES: &[&str] = &[
  "docker-bake.json",
  "docker-bake.override.json",
  "docker-bake.yaml",
  "docker-bake.yml",
  "docker-bake.override.yaml",
  "docker-bake.override.yml",
];

/// Built-in variable naming the invocation's working context.
pub const VAR_CMD_CONTEXT: &str = "BAKE_CMD_CONTEXT";

/// Built-in variable naming the host's default platform.
pub const VAR_LOCAL_PLATFORM: &str = "BAKE_LOCAL_PLATFORM";

/// Default value of [`VAR_CMD_CONTEXT`].
pub const DEFAULT_CMD_CONTEXT: &str = "cwd://";

/// Prefix marking a path as relative to the invocation directory.
pub const CWD_PREFIX: &str = "cwd://";

/// Prefix marking a context as shared with another target.
pub const TARGET_CONTEXT_PREFIX: &str = "target:";

/// Length of the truncated plan digest.
pub const PLAN_HASH_PREFIX_LEN: usize = 20;
