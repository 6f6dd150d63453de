//! Settings resolution.
//!
//! Values are merged with precedence: command-line flags and environment
//! variables (handled by clap in `main`) > TOML config file > built-in
//! defaults. The config file is searched at:
//! 1. the explicit `--config` / `$MAILGRAB_CONFIG` path
//! 2. `./mailgrab.toml`
//! 3. `<config_dir>/mailgrab/config.toml` (e.g. `~/.config/mailgrab/` on Linux)

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{MailgrabError, Result};

/// Disposal action applied to a message after it was marked processed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PostAction {
    /// Leave the message where it is.
    #[default]
    None,
    /// Flag the message `\Deleted` and expunge it.
    Delete,
    /// Move the message to another mailbox.
    Move,
}

/// Values carried by command-line flags and environment variables.
///
/// Everything is optional here; requiredness is checked only after the
/// config file has been merged in.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub server: Option<String>,
    pub port: Option<u16>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub mailbox: Option<String>,
    pub output: Option<PathBuf>,
    pub post_action: Option<PostAction>,
    pub move_to: Option<String>,
    pub insecure: bool,
    pub verbose: bool,
    pub quiet: bool,
    pub json_output: Option<PathBuf>,
}

/// Shape of the TOML config file. All keys optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub server: Option<String>,
    pub port: Option<u16>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub mailbox: Option<String>,
    pub output: Option<PathBuf>,
    pub post_action: Option<PostAction>,
    pub move_to: Option<String>,
    pub insecure: Option<bool>,
    pub verbose: Option<bool>,
    pub quiet: Option<bool>,
    pub json_output: Option<PathBuf>,
}

/// Fully resolved and validated run settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub mailbox: String,
    pub output: PathBuf,
    pub post_action: PostAction,
    pub move_to: Option<String>,
    pub insecure: bool,
    pub verbose: bool,
    pub quiet: bool,
    pub json_output: Option<PathBuf>,
}

impl Settings {
    /// Merge overrides over file values over defaults, then validate.
    pub fn resolve(overrides: Overrides, file: FileConfig) -> Result<Settings> {
        let settings = Settings {
            server: overrides
                .server
                .or(file.server)
                .ok_or_else(|| MailgrabError::Config("server is required".into()))?,
            port: overrides.port.or(file.port).unwrap_or(993),
            username: overrides
                .username
                .or(file.username)
                .ok_or_else(|| MailgrabError::Config("username is required".into()))?,
            password: overrides
                .password
                .or(file.password)
                .ok_or_else(|| MailgrabError::Config("password is required".into()))?,
            mailbox: overrides
                .mailbox
                .or(file.mailbox)
                .unwrap_or_else(|| "Inbox".to_string()),
            output: overrides
                .output
                .or(file.output)
                .ok_or_else(|| MailgrabError::Config("output directory is required".into()))?,
            post_action: overrides
                .post_action
                .or(file.post_action)
                .unwrap_or_default(),
            move_to: overrides.move_to.or(file.move_to),
            insecure: overrides.insecure || file.insecure.unwrap_or(false),
            verbose: overrides.verbose || file.verbose.unwrap_or(false),
            quiet: overrides.quiet || file.quiet.unwrap_or(false),
            json_output: overrides.json_output.or(file.json_output),
        };

        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        if self.post_action == PostAction::Move
            && self.move_to.as_deref().unwrap_or("").is_empty()
        {
            return Err(MailgrabError::Config(
                "move-to is required when post-action is 'move'".into(),
            ));
        }
        if self.verbose && self.quiet {
            return Err(MailgrabError::Config(
                "verbose and quiet cannot both be set".into(),
            ));
        }
        Ok(())
    }
}

/// Locate the config file, if any.
///
/// An explicit path that does not exist is an error; the fallback
/// locations are simply skipped when absent.
pub fn find_config_file(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
    if let Some(path) = explicit {
        if !path.exists() {
            return Err(MailgrabError::Config(format!(
                "config file not found: {}",
                path.display()
            )));
        }
        return Ok(Some(path.to_path_buf()));
    }

    let local = Path::new("mailgrab.toml");
    if local.exists() {
        return Ok(Some(local.to_path_buf()));
    }

    if let Some(dir) = dirs::config_dir() {
        let path = dir.join("mailgrab").join("config.toml");
        if path.exists() {
            return Ok(Some(path));
        }
    }

    Ok(None)
}

/// Read and parse a config file.
///
/// Unlike a missing optional file, a file that exists but cannot be read
/// or parsed is a configuration error: it may carry the credentials the
/// run depends on.
pub fn load_file(path: &Path) -> Result<FileConfig> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        MailgrabError::Config(format!("reading config file '{}': {e}", path.display()))
    })?;
    let cfg = toml::from_str::<FileConfig>(&contents).map_err(|e| {
        MailgrabError::Config(format!("parsing config file '{}': {e}", path.display()))
    })?;
    tracing::info!(path = %path.display(), "Loaded config file");
    Ok(cfg)
}
