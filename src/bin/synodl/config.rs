use crate::cli::Cli;
use anyhow::{Context, Result};
use ini::Ini;
use std::path::{Path, PathBuf};
use std::time::Duration;
use synodl::client::DEFAULT_PORT;

const SECTION: &str = "synology";
const DEFAULT_USER: &str = "admin";
const DEFAULT_HOST: &str = "syno";

/// Values read from the `[synology]` section of the configuration file
#[derive(Debug, Default, PartialEq)]
pub struct Settings {
    pub user: Option<String>,
    pub password: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub secure: Option<bool>,
    pub timeout: Option<u64>,
}

impl Settings {
    /// `~/.synodl.ini`
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".synodl.ini"))
    }

    /// Reads the settings, a missing file or section yields empty settings
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Ok(Self::default());
        }

        let conf = Ini::load_from_file(path)
            .with_context(|| format!("Failed to read configuration file {}", path.display()))?;
        let Some(section) = conf.section(Some(SECTION)) else {
            return Ok(Self::default());
        };

        let port = section
            .get("port")
            .map(|port| port.trim().parse::<u16>())
            .transpose()
            .with_context(|| format!("Invalid port in {}", path.display()))?;
        let timeout = section
            .get("timeout")
            .map(|timeout| timeout.trim().parse::<u64>())
            .transpose()
            .with_context(|| format!("Invalid timeout in {}", path.display()))?;

        Ok(Self {
            user: section.get("user").map(String::from),
            password: section.get("password").map(String::from),
            host: section.get("host").map(String::from),
            port,
            secure: section.get("secure").map(parse_flag),
            timeout,
        })
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "true" | "yes" | "1" | "on")
}

/// Connection parameters once options, file and defaults are merged
#[derive(Debug, PartialEq)]
pub struct Connection {
    pub user: String,
    pub password: Option<String>,
    pub host: String,
    pub port: u16,
    pub secure: bool,
    pub insecure: bool,
    pub timeout: Option<Duration>,
}

impl Connection {
    /// Command-line options win over the configuration file
    pub fn resolve(cli: &Cli, settings: Settings) -> Self {
        Self {
            user: cli
                .user
                .clone()
                .or(settings.user)
                .unwrap_or_else(|| DEFAULT_USER.into()),
            password: cli.password.clone().or(settings.password),
            host: cli
                .host
                .clone()
                .or(settings.host)
                .unwrap_or_else(|| DEFAULT_HOST.into()),
            port: cli.port.or(settings.port).unwrap_or(DEFAULT_PORT),
            secure: cli.secure || settings.secure.unwrap_or(false),
            insecure: cli.insecure,
            timeout: settings.timeout.map(Duration::from_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load(&dir.path().join("missing.ini")).unwrap();
        assert_eq!(Settings::default(), settings);
    }

    #[test]
    fn test_missing_section() {
        let file = write_config("[other]\nuser = bob\n");
        assert_eq!(Settings::default(), Settings::load(file.path()).unwrap());
    }

    #[test]
    fn test_load() {
        let file = write_config(
            "[synology]\nuser = bob\npassword = secret\nhost = nas.local\nport = 5001\nsecure = yes\ntimeout = 30\n",
        );
        let settings = Settings::load(file.path()).unwrap();
        assert_eq!(
            Settings {
                user: Some("bob".into()),
                password: Some("secret".into()),
                host: Some("nas.local".into()),
                port: Some(5001),
                secure: Some(true),
                timeout: Some(30),
            },
            settings
        );

        let file = write_config("[synology]\nsecure = no\n");
        assert_eq!(Some(false), Settings::load(file.path()).unwrap().secure);
    }

    #[test]
    fn test_invalid_port() {
        let file = write_config("[synology]\nport = http\n");
        assert!(Settings::load(file.path()).is_err());
    }

    #[test]
    fn test_resolve() {
        let cli = Cli::parse_from(["synodl", "-u", "alice", "list"]);
        let settings = Settings {
            user: Some("bob".into()),
            host: Some("nas.local".into()),
            secure: Some(true),
            ..Default::default()
        };

        let connection = Connection::resolve(&cli, settings);
        assert_eq!("alice", connection.user);
        assert_eq!("nas.local", connection.host);
        assert_eq!(DEFAULT_PORT, connection.port);
        assert!(connection.secure);
        assert_eq!(None, connection.password);

        let connection = Connection::resolve(&cli, Settings::default());
        assert_eq!("syno", connection.host);
        assert!(!connection.secure);
    }
}
