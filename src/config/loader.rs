use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::AppConfig;

const CONFIG_DIR: &str = "lazypkg";
const CONFIG_FILE: &str = "config.toml";

pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join(CONFIG_DIR).join(CONFIG_FILE))
}

/// Load the user configuration, falling back to defaults when there is none.
pub fn load() -> color_eyre::Result<AppConfig> {
    match config_path() {
        Some(path) => load_from(&path),
        None => {
            debug!("No config directory found, using defaults");
            Ok(AppConfig::default())
        }
    }
}

pub fn load_from(path: &Path) -> color_eyre::Result<AppConfig> {
    if !path.exists() {
        debug!("Config file not found at {}, using defaults", path.display());
        return Ok(AppConfig::default());
    }

    let content = fs::read_to_string(path)?;
    let config: AppConfig = toml::from_str(&content)?;
    debug!("Loaded config from {}", path.display());
    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    use super::*;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_from(&dir.path().join(CONFIG_FILE)).unwrap();

        assert!(!config.dry_run);
        assert_eq!(config.log.capacity, crate::log_ring::DEFAULT_CAPACITY);
        assert!(config.managers.exclude.is_empty());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
dry_run = true

[managers]
exclude = ["gem"]

[keybindings.packages]
update_all = "A"
"#
        )
        .unwrap();

        let config = load_from(file.path()).unwrap();

        assert!(config.dry_run);
        assert_eq!(config.managers.exclude, vec!["gem".to_string()]);
        let update_all = &config.keybindings.packages.update_all;
        assert!(update_all.matches(&KeyEvent::new(KeyCode::Char('A'), KeyModifiers::SHIFT)));
        assert!(
            config
                .keybindings
                .packages
                .back
                .matches(&KeyEvent::new(KeyCode::Char('h'), KeyModifiers::NONE))
        );
    }

    #[test]
    fn test_invalid_key_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[keybindings.global]\nquit = \"hyper+q\"").unwrap();

        assert!(load_from(file.path()).is_err());
    }
}
