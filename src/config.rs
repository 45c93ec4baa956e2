//! Per-invocation configuration.
//!
//! Settings come from the environment (optionally seeded from a `.env`
//! file by the binary) with command-line flags taking precedence. A
//! [`Config`] is built once per invocation and passed down explicitly.

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::error::ConfigError;
use crate::sprint::{LabelScheme, OverrideMap, ShiftPolicy, SprintScheme};

/// Default lifetime of a signed download link.
pub const DEFAULT_LINK_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Default sprint offset: ten builds are numbered 11 down to 2.
pub const DEFAULT_SPRINT_OFFSET: i64 = 1;

/// Default page title.
pub const DEFAULT_TITLE: &str = "Builds";

/// Which audience the page is rendered for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ViewMode {
    /// Commit metadata and revision identifiers.
    #[default]
    Dev,
    /// Sequential sprint numbers.
    Qa,
}

impl FromStr for ViewMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dev" | "developer" => Ok(Self::Dev),
            "qa" => Ok(Self::Qa),
            other => Err(ConfigError::Invalid {
                key: "BUILDS_MODE",
                value: other.to_string(),
                reason: "expected dev or qa".into(),
            }),
        }
    }
}

impl FromStr for ShiftPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "absorb" => Ok(Self::Absorb),
            "preserve" => Ok(Self::Preserve),
            other => Err(ConfigError::Invalid {
                key: "SPRINT_SHIFT",
                value: other.to_string(),
                reason: "expected absorb or preserve".into(),
            }),
        }
    }
}

/// Where builds are enumerated from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageLocation {
    /// A local directory tree.
    Directory(PathBuf),
    /// An HTTP(S) URL serving a JSON manifest.
    Http(String),
    /// A YAML snapshot previously written by `buildlist snapshot`.
    Snapshot(PathBuf),
}

impl FromStr for StorageLocation {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ConfigError::Missing("BUILDS_STORAGE"));
        }
        if let Some(path) = s.strip_prefix("snapshot:") {
            return Ok(Self::Snapshot(PathBuf::from(path)));
        }
        if s.starts_with("http://") || s.starts_with("https://") {
            return Ok(Self::Http(s.to_string()));
        }
        let path = PathBuf::from(s);
        if matches!(path.extension().and_then(|e| e.to_str()), Some("yaml" | "yml")) {
            return Ok(Self::Snapshot(path));
        }
        Ok(Self::Directory(path))
    }
}

impl fmt::Display for StorageLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Directory(path) => write!(f, "{}", path.display()),
            Self::Http(url) => f.write_str(url),
            Self::Snapshot(path) => write!(f, "snapshot:{}", path.display()),
        }
    }
}

/// Settings given on the command line; each wins over its environment variable.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Storage location (`BUILDS_STORAGE`).
    pub storage: Option<String>,
    /// View mode (`BUILDS_MODE`).
    pub mode: Option<ViewMode>,
    /// Override table (`SPRINT_OVERRIDES`).
    pub overrides: Option<String>,
    /// Sprint offset (`SPRINT_OFFSET`).
    pub offset: Option<i64>,
    /// Shift policy (`SPRINT_SHIFT`).
    pub shift: Option<ShiftPolicy>,
}

/// Everything one invocation needs.
#[derive(Debug, Clone)]
pub struct Config {
    /// Where builds come from.
    pub storage: StorageLocation,
    /// Audience.
    pub mode: ViewMode,
    /// Sprint index renames.
    pub overrides: OverrideMap,
    /// Base added to raw sprint indices.
    pub offset: i64,
    /// Renumbering above the overridden range.
    pub shift: ShiftPolicy,
    /// Lifetime of signed links.
    pub link_ttl: Duration,
    /// Base URL for download links; derived from storage when absent.
    pub link_base_url: Option<String>,
    /// Secret mixed into link signatures.
    pub signing_secret: String,
    /// Fixed "now" for reproducible output.
    pub now: Option<DateTime<Utc>>,
    /// Page title.
    pub title: String,
}

impl Config {
    /// Loads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the storage location is missing or any
    /// setting is malformed.
    pub fn from_env(cli: &ConfigOverrides) -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok(), cli)
    }

    /// Loads configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Same as [`Config::from_env`].
    pub fn from_lookup<F>(lookup: F, cli: &ConfigOverrides) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let storage: StorageLocation = cli
            .storage
            .clone()
            .or_else(|| get("BUILDS_STORAGE"))
            .ok_or(ConfigError::Missing("BUILDS_STORAGE"))?
            .parse()?;

        let mode = match cli.mode {
            Some(mode) => mode,
            None => get("BUILDS_MODE").map(|v| v.parse()).transpose()?.unwrap_or_default(),
        };

        let overrides = OverrideMap::parse(
            &cli.overrides.clone().or_else(|| get("SPRINT_OVERRIDES")).unwrap_or_default(),
        );
        overrides.validate()?;

        let offset = match cli.offset {
            Some(offset) => offset,
            None => parse_number(get("SPRINT_OFFSET"), "SPRINT_OFFSET")?
                .unwrap_or(DEFAULT_SPRINT_OFFSET),
        };

        let shift = match cli.shift {
            Some(shift) => shift,
            None => get("SPRINT_SHIFT").map(|v| v.parse()).transpose()?.unwrap_or_default(),
        };

        let link_ttl = parse_number::<u64>(get("LINK_TTL_SECS"), "LINK_TTL_SECS")?
            .map_or(DEFAULT_LINK_TTL, Duration::from_secs);

        let now = get("BUILDLIST_NOW")
            .map(|v| {
                DateTime::parse_from_rfc3339(v.trim())
                    .map(|t| t.with_timezone(&Utc))
                    .map_err(|e| ConfigError::Invalid {
                        key: "BUILDLIST_NOW",
                        value: v.clone(),
                        reason: e.to_string(),
                    })
            })
            .transpose()?;

        Ok(Self {
            storage,
            mode,
            overrides,
            offset,
            shift,
            link_ttl,
            link_base_url: get("LINK_BASE_URL"),
            signing_secret: lookup("LINK_SIGNING_SECRET").unwrap_or_default(),
            now,
            title: get("PAGE_TITLE").unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        })
    }

    /// The labelling scheme implied by the view mode.
    #[must_use]
    pub fn label_scheme(&self) -> LabelScheme {
        match self.mode {
            ViewMode::Dev => LabelScheme::Revision,
            ViewMode::Qa => LabelScheme::Sprint(SprintScheme {
                overrides: self.overrides.clone(),
                offset: self.offset,
                shift: self.shift,
            }),
        }
    }
}

fn parse_number<T: FromStr>(
    value: Option<String>,
    key: &'static str,
) -> Result<Option<T>, ConfigError>
where
    T::Err: std::fmt::Display,
{
    value
        .map(|v| {
            v.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
                key,
                value: v.clone(),
                reason: e.to_string(),
            })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)], cli: &ConfigOverrides) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> =
            vars.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
        Config::from_lookup(|key| vars.get(key).cloned(), cli)
    }

    #[test]
    fn missing_storage_fails_fast() {
        let err = load(&[], &ConfigOverrides::default()).unwrap_err();
        assert_eq!(err, ConfigError::Missing("BUILDS_STORAGE"));
    }

    #[test]
    fn defaults_apply() {
        let config = load(&[("BUILDS_STORAGE", "/srv/builds")], &ConfigOverrides::default())
            .unwrap();
        assert_eq!(config.storage, StorageLocation::Directory(PathBuf::from("/srv/builds")));
        assert_eq!(config.mode, ViewMode::Dev);
        assert!(config.overrides.is_empty());
        assert_eq!(config.offset, DEFAULT_SPRINT_OFFSET);
        assert_eq!(config.offset, 1);
        assert_eq!(config.shift, ShiftPolicy::Absorb);
        assert_eq!(config.link_ttl, DEFAULT_LINK_TTL);
        assert_eq!(config.title, DEFAULT_TITLE);
        assert!(config.now.is_none());
        assert_eq!(config.label_scheme(), LabelScheme::Revision);
    }

    #[test]
    fn reads_qa_settings_from_environment() {
        let config = load(
            &[
                ("BUILDS_STORAGE", "https://cdn.example.com/builds/manifest.json"),
                ("BUILDS_MODE", "QA"),
                ("SPRINT_OVERRIDES", "8:8A,9:8B,x:bad"),
                ("SPRINT_OFFSET", "1"),
                ("SPRINT_SHIFT", "preserve"),
                ("LINK_TTL_SECS", "3600"),
                ("BUILDLIST_NOW", "2024-05-01T12:00:00Z"),
            ],
            &ConfigOverrides::default(),
        )
        .unwrap();
        assert!(matches!(config.storage, StorageLocation::Http(_)));
        assert_eq!(config.mode, ViewMode::Qa);
        assert_eq!(config.overrides.len(), 2);
        assert_eq!(config.link_ttl, Duration::from_secs(3600));
        assert_eq!(config.now.unwrap().to_rfc3339(), "2024-05-01T12:00:00+00:00");
        match config.label_scheme() {
            LabelScheme::Sprint(scheme) => {
                assert_eq!(scheme.offset, 1);
                assert_eq!(scheme.shift, ShiftPolicy::Preserve);
            }
            LabelScheme::Revision => panic!("expected sprint scheme"),
        }
    }

    #[test]
    fn command_line_wins_over_environment() {
        let cli = ConfigOverrides {
            storage: Some("snapshot:/tmp/listing.yaml".into()),
            mode: Some(ViewMode::Qa),
            overrides: Some("3:3A".into()),
            offset: Some(5),
            shift: Some(ShiftPolicy::Preserve),
        };
        let config = load(
            &[
                ("BUILDS_STORAGE", "/srv/builds"),
                ("BUILDS_MODE", "dev"),
                ("SPRINT_OVERRIDES", "8:8A"),
                ("SPRINT_OFFSET", "1"),
            ],
            &cli,
        )
        .unwrap();
        assert_eq!(config.storage, StorageLocation::Snapshot(PathBuf::from("/tmp/listing.yaml")));
        assert_eq!(config.mode, ViewMode::Qa);
        assert_eq!(config.overrides.get(3), Some("3A"));
        assert_eq!(config.overrides.get(8), None);
        assert_eq!(config.offset, 5);
        assert_eq!(config.shift, ShiftPolicy::Preserve);
    }

    #[test]
    fn gapped_overrides_are_a_configuration_error() {
        let err = load(
            &[("BUILDS_STORAGE", "/srv/builds"), ("SPRINT_OVERRIDES", "5:5A,9:8A")],
            &ConfigOverrides::default(),
        )
        .unwrap_err();
        assert_eq!(err, ConfigError::NonContiguousOverrides { starts: vec![5, 9] });
    }

    #[test]
    fn malformed_numbers_are_rejected() {
        let err = load(
            &[("BUILDS_STORAGE", "/srv/builds"), ("SPRINT_OFFSET", "one")],
            &ConfigOverrides::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "SPRINT_OFFSET", .. }));
    }

    #[test]
    fn unknown_mode_is_rejected() {
        let err = load(
            &[("BUILDS_STORAGE", "/srv/builds"), ("BUILDS_MODE", "ops")],
            &ConfigOverrides::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "BUILDS_MODE", .. }));
    }

    #[test]
    fn storage_location_display_parses_back() {
        for raw in ["/srv/builds", "https://cdn.example.com/m.json", "snapshot:/tmp/l.yaml"] {
            let location: StorageLocation = raw.parse().unwrap();
            assert_eq!(location.to_string(), raw);
            assert_eq!(location.to_string().parse::<StorageLocation>().unwrap(), location);
        }
    }

    #[test]
    fn yaml_paths_are_snapshots() {
        let location: StorageLocation = "fixtures/listing.yml".parse().unwrap();
        assert_eq!(location, StorageLocation::Snapshot(PathBuf::from("fixtures/listing.yml")));
    }
}
