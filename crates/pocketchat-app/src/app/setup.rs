use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use pocketchat_types::ChatConfig;

use crate::cli::Cli;

const DEFAULT_DATA_DIR: &str = "~/.pocketchat";

/// Application configuration derived from CLI arguments, environment and config file
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub chat: ChatConfig,
    pub data_dir: PathBuf,
}

/// Contents of the optional TOML config file
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub data_dir: Option<String>,
    pub chat: ChatConfig,
}

/// Set up application configuration from CLI arguments
pub fn setup_from_cli(cli: &Cli) -> Result<AppConfig> {
    let file_config = match &cli.config {
        Some(path) => load_file_config(&expand_tilde(Path::new(path))?)?,
        None => FileConfig::default(),
    };

    // Precedence: CLI flags > POCKETCHAT_* env (resolved by clap) > config file > defaults
    let data_dir = cli
        .data_dir
        .clone()
        .or(file_config.data_dir)
        .unwrap_or_else(|| DEFAULT_DATA_DIR.to_string());

    let mut chat = file_config.chat;
    if let Some(delay) = cli.reply_delay_ms {
        chat = chat.with_reply_delay_ms(delay);
    }

    Ok(AppConfig {
        chat,
        data_dir: expand_tilde(Path::new(&data_dir))?,
    })
}

/// Read a TOML config file
pub fn load_file_config(path: &Path) -> Result<FileConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("Failed to parse config file {}", path.display()))
}

/// Expand ~ to home directory
pub fn expand_tilde(path: &Path) -> Result<PathBuf> {
    let path_str = path.to_string_lossy();
    if let Some(rest) = path_str.strip_prefix("~/") {
        let home = std::env::var("HOME").context("HOME environment variable not set")?;
        Ok(PathBuf::from(home).join(rest))
    } else if path_str == "~" {
        let home = std::env::var("HOME").context("HOME environment variable not set")?;
        Ok(PathBuf::from(home))
    } else {
        Ok(path.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, contents: &str) -> String {
        let path = dir.path().join("pocketchat.toml");
        fs::write(&path, contents).unwrap();
        path.to_string_lossy().to_string()
    }

    #[test]
    fn test_expand_tilde_leaves_plain_paths() {
        assert_eq!(expand_tilde(Path::new("/var/data")).unwrap(), PathBuf::from("/var/data"));
        assert_eq!(expand_tilde(Path::new("rel/dir")).unwrap(), PathBuf::from("rel/dir"));
    }

    #[test]
    fn test_file_config_fills_missing_fields() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            r#"
data_dir = "/srv/pocketchat"

[chat]
reply_delay_ms = 250
"#,
        );

        let config = load_file_config(Path::new(&path)).unwrap();
        assert_eq!(config.data_dir.as_deref(), Some("/srv/pocketchat"));
        assert_eq!(config.chat.reply_delay_ms, 250);
        assert_eq!(config.chat.title_max_chars, 20);
        assert_eq!(config.chat.conversations_key, "chat-conversations");
    }

    #[test]
    fn test_flags_override_config_file() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "data_dir = \"/from/file\"\n[chat]\nreply_delay_ms = 250\n");

        let cli = Cli::try_parse_from([
            "pocketchat",
            "--config",
            path.as_str(),
            "--data-dir",
            "/from/flag",
            "--reply-delay-ms",
            "5",
        ])
        .unwrap();
        let app = setup_from_cli(&cli).unwrap();
        assert_eq!(app.data_dir, PathBuf::from("/from/flag"));
        assert_eq!(app.chat.reply_delay_ms, 5);
    }

    #[test]
    fn test_config_file_overrides_defaults() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "data_dir = \"/from/file\"\n[chat]\ntitle_suffix = \"~\"\n");

        let cli = Cli {
            command: None,
            data_dir: None,
            reply_delay_ms: None,
            config: Some(path),
        };
        let app = setup_from_cli(&cli).unwrap();
        assert_eq!(app.chat.title_suffix, "~");
        assert_eq!(app.chat.reply_delay_ms, 1500);
        assert_eq!(app.data_dir, PathBuf::from("/from/file"));
    }

    #[test]
    fn test_malformed_config_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "[chat]\nreply_delay_ms = \"soon\"\n");
        assert!(load_file_config(Path::new(&path)).is_err());
    }
}
