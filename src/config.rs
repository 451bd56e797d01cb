use std::fs::File;
use std::path::{Path, PathBuf};

use log::LevelFilter;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Configuration for a subforum instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Address to bind to
    pub address: String,
    /// Port to bind to
    pub port: u16,
    /// Path of the SQLite database file
    pub database_url: String,
    /// Maximum number of open database connections
    pub pool_size: u32,
    /// How long a connection waits for a locked database, in milliseconds
    pub busy_timeout_ms: u64,
    /// How long a request waits for a free connection, in milliseconds
    pub pool_timeout_ms: u64,
    /// Lowest level of log messages to keep
    pub log_level: LevelFilter,
    /// File to log to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
    /// Origins allowed to make cross-origin requests, `*` for any
    pub allowed_origins: Vec<String>,
}

impl Config {
    /// Open a config file at the given path.
    pub fn open<P>(path: P) -> Result<Config>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let msg = format!("Couldn't open config file at {}", path.display());

        let reader = File::open(path).map_err(|err| Error::from_io_error(err, msg))?;

        Ok(serde_yaml::from_reader(reader)?)
    }

    /// Open the config file at `path` if one was given, otherwise the one at
    /// the default path. If there's no file at the default path, the default
    /// configuration is used.
    pub fn load<P>(path: Option<P>) -> Result<Config>
    where
        P: AsRef<Path>,
    {
        match path {
            Some(path) => Config::open(path),
            None if Config::default_path().exists() => {
                Config::open(Config::default_path())
            }
            None => Ok(Config::default()),
        }
    }

    /// Generate a new config file from default values.
    pub fn generate<W>(mut out: W) -> Result<()>
    where
        W: std::io::Write,
    {
        writeln!(&mut out, "# Configuration for subforum")?;
        serde_yaml::to_writer(&mut out, &Config::default())?;
        writeln!(&mut out)?;
        Ok(())
    }

    /// Get the default location of the config file.
    pub fn default_path() -> PathBuf {
        if cfg!(debug_assertions) {
            PathBuf::from("contrib/dev-config.yaml")
        } else {
            PathBuf::from("/etc/subforum/config.yaml")
        }
    }

    /// Dump configuration info to the log.
    pub fn debug_log(&self) {
        use log::debug;

        debug!("  address {}", self.address);
        debug!("  port {}", self.port);
        debug!("  database url {}", self.database_url);
        debug!("  pool size {}", self.pool_size);
        debug!("  busy timeout {}ms", self.busy_timeout_ms);
        debug!("  pool timeout {}ms", self.pool_timeout_ms);
        debug!("  log level {}", self.log_level);
        if let Some(ref log_file) = self.log_file {
            debug!("  log file {}", log_file.display());
        }
        debug!("  allowed origins:");
        for origin in &self.allowed_origins {
            debug!("    origin: {}", origin);
        }
    }
}

impl Default for Config {
    fn default() -> Config {
        if cfg!(debug_assertions) {
            Config {
                address: "127.0.0.1".into(),
                port: 8000,
                database_url: "subforum.db".into(),
                pool_size: 8,
                busy_timeout_ms: 5000,
                pool_timeout_ms: 5000,
                log_level: LevelFilter::Debug,
                log_file: None,
                allowed_origins: vec!["*".into()],
            }
        } else {
            Config {
                address: "0.0.0.0".into(),
                port: 8000,
                database_url: "/var/lib/subforum/subforum.db".into(),
                pool_size: 8,
                busy_timeout_ms: 5000,
                pool_timeout_ms: 5000,
                log_level: LevelFilter::Info,
                log_file: Some(PathBuf::from("/var/log/subforum/subforum.log")),
                allowed_origins: vec!["*".into()],
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let config: Config = serde_yaml::from_str("port: 9000\nlog_level: warn\n").unwrap();

        assert_eq!(config.port, 9000);
        assert_eq!(config.log_level, LevelFilter::Warn);
        assert_eq!(config.database_url, Config::default().database_url);
        assert_eq!(config.allowed_origins, vec!["*".to_string()]);
    }

    #[test]
    fn generated_file_can_be_opened() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");

        Config::generate(File::create(&path).unwrap()).unwrap();

        assert_eq!(Config::open(&path).unwrap(), Config::default());
    }

    #[test]
    fn open_reports_missing_file() {
        let dir = tempfile::TempDir::new().unwrap();

        match Config::open(dir.path().join("nope.yaml")) {
            Err(Error::IoErrorMsg { msg, .. }) => {
                assert!(msg.starts_with("Couldn't open config file"))
            }
            other => panic!("expected IoErrorMsg, got {:?}", other),
        }
    }
}
