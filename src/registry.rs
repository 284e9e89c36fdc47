//! Startup selection of package managers.

use std::collections::BTreeMap;
use std::process::ExitCode;
use std::sync::Arc;

use tracing::{debug, info};

use crate::backend::{Apt, Backend, Demo, Docker, Gem, Homebrew, Npm};
use crate::cli::Args;
use crate::config::AppConfig;
use crate::model::{ManagerEntry, ManagerId};

/// Managers that are on unless excluded.
pub const BASE_MANAGERS: [&str; 4] = ["apt", "gem", "homebrew", "npm"];
/// Managers that are off unless enabled as a feature.
pub const OPTIONAL_MANAGERS: [&str; 1] = ["docker"];

/// Misconfiguration detected before the dashboard starts.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid exclude option. Valid values: {}", BASE_MANAGERS.join(", "))]
    InvalidExclude(String),

    #[error("Invalid enable-feature option. Valid values: {}", OPTIONAL_MANAGERS.join(", "))]
    InvalidFeature(String),

    #[error("No package managers are available")]
    NoBackends,
}

impl ConfigError {
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::NoBackends => ExitCode::SUCCESS,
            Self::InvalidExclude(_) | Self::InvalidFeature(_) => ExitCode::FAILURE,
        }
    }
}

/// Manager selection merged from the config file and the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManagerOptions {
    pub exclude: Vec<String>,
    pub enable_features: Vec<String>,
    pub demo: bool,
}

impl ManagerOptions {
    /// Command-line values extend the ones from the file.
    pub fn new(config: &AppConfig, args: &Args) -> Self {
        let mut exclude = config.managers.exclude.clone();
        exclude.extend(args.exclude.iter().cloned());
        let mut enable_features = config.managers.enable_features.clone();
        enable_features.extend(args.enable_feature.iter().cloned());

        Self {
            exclude,
            enable_features,
            demo: args.demo,
        }
    }

    /// Names of the managers to try, in alphabetical order.
    pub fn validate(&self) -> Result<Vec<&'static str>, ConfigError> {
        if let Some(name) = self
            .exclude
            .iter()
            .find(|name| !BASE_MANAGERS.contains(&name.as_str()))
        {
            return Err(ConfigError::InvalidExclude(name.clone()));
        }
        if let Some(name) = self
            .enable_features
            .iter()
            .find(|name| !OPTIONAL_MANAGERS.contains(&name.as_str()))
        {
            return Err(ConfigError::InvalidFeature(name.clone()));
        }

        let mut names: Vec<&'static str> = BASE_MANAGERS
            .into_iter()
            .filter(|name| !self.exclude.iter().any(|e| e == name))
            .chain(
                OPTIONAL_MANAGERS
                    .into_iter()
                    .filter(|name| self.enable_features.iter().any(|f| f == name)),
            )
            .collect();
        names.sort_unstable();
        Ok(names)
    }
}

/// Candidate managers keyed by id, before availability is known.
#[derive(Default)]
pub struct ManagerRegistry {
    candidates: BTreeMap<ManagerId, (char, Arc<dyn Backend>)>,
}

impl ManagerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a backend. A second registration under the same id replaces the first.
    pub fn register(&mut self, id: impl Into<ManagerId>, icon: char, backend: Arc<dyn Backend>) {
        self.candidates.insert(id.into(), (icon, backend));
    }

    /// Every registered manager whose tool exists on this host, sorted by id.
    pub async fn available(self) -> Result<Vec<ManagerEntry>, ConfigError> {
        let mut entries = Vec::with_capacity(self.candidates.len());
        for (id, (icon, backend)) in self.candidates {
            if backend.is_available().await {
                entries.push(ManagerEntry { id, icon, backend });
            } else {
                debug!("Skipping unavailable manager {id}");
            }
        }

        if entries.is_empty() {
            return Err(ConfigError::NoBackends);
        }
        info!(
            "Using managers: {}",
            entries
                .iter()
                .map(|entry| entry.id.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
        Ok(entries)
    }
}

/// Build the managers the dashboard will show.
pub async fn build_managers(options: &ManagerOptions) -> Result<Vec<ManagerEntry>, ConfigError> {
    let mut registry = ManagerRegistry::new();
    for name in options.validate()? {
        let backend = if options.demo {
            demo_backend(name)
        } else {
            real_backend(name)
        };
        if let Some(backend) = backend {
            registry.register(name, icon(name), backend);
        }
    }
    registry.available().await
}

fn real_backend(name: &str) -> Option<Arc<dyn Backend>> {
    let backend: Arc<dyn Backend> = match name {
        "apt" => Arc::new(Apt),
        "gem" => Arc::new(Gem),
        "homebrew" => Arc::new(Homebrew),
        "npm" => Arc::new(Npm),
        "docker" => Arc::new(Docker),
        _ => return None,
    };
    Some(backend)
}

fn demo_backend(name: &str) -> Option<Arc<dyn Backend>> {
    let backend: Arc<dyn Backend> = match name {
        "apt" => Arc::new(Demo::apt()),
        "homebrew" => Arc::new(Demo::homebrew()),
        "npm" => Arc::new(Demo::npm()),
        _ => return None,
    };
    Some(backend)
}

fn icon(name: &str) -> char {
    match name {
        "apt" => '\u{ebc6}',
        "homebrew" => '\u{f0fc}',
        "docker" => '\u{f21f}',
        "npm" => '\u{ed0d}',
        "gem" => '\u{f219}',
        _ => '?',
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::mock::MockBackend;

    fn options(exclude: &[&str], enable_features: &[&str]) -> ManagerOptions {
        ManagerOptions {
            exclude: exclude.iter().map(ToString::to_string).collect(),
            enable_features: enable_features.iter().map(ToString::to_string).collect(),
            demo: false,
        }
    }

    #[test]
    fn test_validate_defaults() {
        assert_eq!(
            options(&[], &[]).validate().unwrap(),
            vec!["apt", "gem", "homebrew", "npm"]
        );
    }

    #[test]
    fn test_validate_exclude_and_feature() {
        assert_eq!(
            options(&["gem", "apt"], &["docker"]).validate().unwrap(),
            vec!["docker", "homebrew", "npm"]
        );
    }

    #[test]
    fn test_invalid_options() {
        let err = options(&["pip"], &[]).validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidExclude(ref name) if name == "pip"));
        assert_eq!(
            err.to_string(),
            "Invalid exclude option. Valid values: apt, gem, homebrew, npm"
        );
        assert_eq!(err.exit_code(), ExitCode::FAILURE);

        // Base managers are not features.
        let err = options(&[], &["apt"]).validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidFeature(_)));
    }

    #[tokio::test]
    async fn test_unavailable_managers_are_skipped() {
        let mut registry = ManagerRegistry::new();
        registry.register("npm", 'n', Arc::new(MockBackend::default()));
        registry.register("apt", 'a', Arc::new(MockBackend::default().unavailable()));
        registry.register("gem", 'g', Arc::new(MockBackend::default()));

        let ids: Vec<_> = registry
            .available()
            .await
            .unwrap()
            .into_iter()
            .map(|entry| entry.id)
            .collect();
        assert_eq!(ids, vec![ManagerId::from("gem"), ManagerId::from("npm")]);
    }

    #[tokio::test]
    async fn test_no_backends_exits_cleanly() {
        let mut registry = ManagerRegistry::new();
        registry.register("apt", 'a', Arc::new(MockBackend::default().unavailable()));

        let err = registry.available().await.unwrap_err();
        assert!(matches!(err, ConfigError::NoBackends));
        assert_eq!(err.exit_code(), ExitCode::SUCCESS);
    }

    #[tokio::test]
    async fn test_demo_managers() {
        let options = ManagerOptions {
            demo: true,
            ..options(&["npm"], &[])
        };
        let managers = build_managers(&options).await.unwrap();
        let ids: Vec<_> = managers.iter().map(|entry| entry.id.as_str()).collect();
        assert_eq!(ids, vec!["apt", "homebrew"]);
    }
}
