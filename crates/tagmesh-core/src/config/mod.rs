use std::time::Duration;

mod env;

pub const ENV_CONTENT_GLOB: &str = "TAGMESH_CONTENT_GLOB";
pub const ENV_CONTENT_TTL_SECS: &str = "TAGMESH_CONTENT_TTL_SECS";
pub const ENV_GRAPH: &str = "TAGMESH_GRAPH";
pub const ENV_PRELOAD_STRICT: &str = "TAGMESH_PRELOAD_STRICT";
pub const ENV_RELATED_LIMIT: &str = "TAGMESH_RELATED_LIMIT";

pub const DEFAULT_CONTENT_GLOB: &str = "*.md";
pub const DEFAULT_CONTENT_TTL_SECS: u64 = 3600;
pub const DEFAULT_RELATED_LIMIT: usize = 12;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Glob (matched against file names) selecting which stored objects are items.
    pub content_glob: String,
    /// `None` keeps cached content bytes forever.
    pub content_ttl: Option<Duration>,
    pub graph_enabled: bool,
    pub strict_preload: bool,
    pub related_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            content_glob: DEFAULT_CONTENT_GLOB.to_string(),
            content_ttl: resolve_content_ttl(None),
            graph_enabled: true,
            strict_preload: true,
            related_limit: DEFAULT_RELATED_LIMIT,
        }
    }
}

impl EngineConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            content_glob: env::read_non_empty_env(ENV_CONTENT_GLOB)
                .unwrap_or_else(|| DEFAULT_CONTENT_GLOB.to_string()),
            content_ttl: resolve_content_ttl(env::read_env_u64(ENV_CONTENT_TTL_SECS)),
            graph_enabled: env::parse_enabled_default_true(
                env::read_non_empty_env(ENV_GRAPH).as_deref(),
            ),
            strict_preload: env::parse_enabled_default_true(
                env::read_non_empty_env(ENV_PRELOAD_STRICT).as_deref(),
            ),
            related_limit: env::read_env_usize(ENV_RELATED_LIMIT, DEFAULT_RELATED_LIMIT, 0),
        }
    }
}

#[must_use]
pub(crate) fn resolve_content_ttl(raw_secs: Option<u64>) -> Option<Duration> {
    match raw_secs.unwrap_or(DEFAULT_CONTENT_TTL_SECS) {
        0 => None,
        secs => Some(Duration::from_secs(secs)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_ttl_defaults_to_one_hour_and_zero_disables_expiry() {
        assert_eq!(resolve_content_ttl(None), Some(Duration::from_secs(3600)));
        assert_eq!(resolve_content_ttl(Some(0)), None);
        assert_eq!(resolve_content_ttl(Some(5)), Some(Duration::from_secs(5)));
    }

    #[test]
    fn enabled_flags_default_on_and_accept_common_off_spellings() {
        assert!(env::parse_enabled_default_true(None));
        assert!(env::parse_enabled_default_true(Some("yes")));
        for raw in ["off", "none", "0", "FALSE", " false "] {
            assert!(!env::parse_enabled_default_true(Some(raw)), "{raw}");
        }
    }
}
