//! Configuration management for campus-records
//!
//! This module handles loading, parsing, and validation of configuration files.

use crate::constants::{
    APP_NAME, CONFIG_FILE_NAME, CONFIG_GENERATED, DATABASE_FILE_NAME, DEFAULT_COURSES_PAGE_SIZE,
    DEFAULT_ENROLLMENTS_PAGE_SIZE, DEFAULT_MAX_CONNECTIONS, DEFAULT_PROGRAMS_PAGE_SIZE, DEFAULT_STUDENTS_PAGE_SIZE,
    LOG_FILE_NAME, MAX_CONNECTIONS_LIMIT, MAX_PAGE_SIZE,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub pagination: PaginationConfig,
    pub logging: LoggingConfig,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite file path; defaults to the user data directory
    pub path: Option<PathBuf>,
    /// Keep everything in memory (nothing survives the process)
    pub in_memory: bool,
    /// Pool size for file-backed databases
    pub max_connections: u32,
}

/// Default page sizes per listing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    pub programs: u64,
    pub courses: u64,
    pub students: u64,
    pub enrollments: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Enable logging
    pub enabled: bool,
    /// One of error, warn, info, debug, trace
    pub level: String,
    /// Log file path; defaults to the user cache directory
    pub file: Option<PathBuf>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: None,
            in_memory: false,
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            programs: DEFAULT_PROGRAMS_PAGE_SIZE,
            courses: DEFAULT_COURSES_PAGE_SIZE,
            students: DEFAULT_STUDENTS_PAGE_SIZE,
            enrollments: DEFAULT_ENROLLMENTS_PAGE_SIZE,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            level: "info".to_string(),
            file: None,
        }
    }
}

impl DatabaseConfig {
    /// Resolve the database file path, falling back to the data directory.
    pub fn resolved_path(&self) -> Result<PathBuf> {
        match &self.path {
            Some(path) => Ok(path.clone()),
            None => dirs::data_dir()
                .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))
                .map(|dir| dir.join(APP_NAME).join(DATABASE_FILE_NAME)),
        }
    }
}

impl LoggingConfig {
    /// Parse the configured level.
    pub fn level_filter(&self) -> Result<log::LevelFilter> {
        self.level
            .parse::<log::LevelFilter>()
            .map_err(|_| anyhow::anyhow!("Invalid logging level '{}'", self.level))
    }

    /// Resolve the log file path, falling back to the cache directory.
    pub fn resolved_file(&self) -> Result<PathBuf> {
        match &self.file {
            Some(path) => Ok(path.clone()),
            None => dirs::cache_dir()
                .ok_or_else(|| anyhow::anyhow!("Could not determine cache directory"))
                .map(|dir| dir.join(APP_NAME).join(LOG_FILE_NAME)),
        }
    }
}

impl Config {
    /// Load configuration from file or return defaults
    pub fn load() -> Result<Self> {
        let config_path = Self::find_config_file()?;

        if let Some(path) = config_path {
            Self::load_from_file(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Find configuration file in order of precedence
    fn find_config_file() -> Result<Option<PathBuf>> {
        // 1. Check current directory
        let current_dir_config = PathBuf::from(CONFIG_FILE_NAME);
        if current_dir_config.exists() {
            return Ok(Some(current_dir_config));
        }

        // 2. Check XDG config directory
        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join(APP_NAME).join("config.toml");
            if xdg_config.exists() {
                return Ok(Some(xdg_config));
            }
        }

        Ok(None)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.database.max_connections == 0 || self.database.max_connections > MAX_CONNECTIONS_LIMIT {
            anyhow::bail!(
                "max_connections must be between 1 and {}, got {}",
                MAX_CONNECTIONS_LIMIT,
                self.database.max_connections
            );
        }

        let page_sizes = [
            ("programs", self.pagination.programs),
            ("courses", self.pagination.courses),
            ("students", self.pagination.students),
            ("enrollments", self.pagination.enrollments),
        ];
        for (listing, size) in page_sizes {
            if size == 0 || size > MAX_PAGE_SIZE {
                anyhow::bail!(
                    "pagination.{} must be between 1 and {}, got {}",
                    listing,
                    MAX_PAGE_SIZE,
                    size
                );
            }
        }

        self.logging.level_filter()?;

        Ok(())
    }

    /// Generate default configuration file
    pub fn generate_default_config<P: AsRef<Path>>(path: P) -> Result<()> {
        let config = Self::default();
        let toml_content = toml::to_string_pretty(&config).context("Failed to serialize default config")?;

        let header = format!(
            "# campus-records Configuration File\n# Generated on {}\n\n",
            chrono::Local::now().format("%Y-%m-%d")
        );

        let full_content = header + &toml_content;

        // Ensure the parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }

        std::fs::write(&path, full_content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        log::info!("{}: {}", CONFIG_GENERATED, path.as_ref().display());
        Ok(())
    }
}
