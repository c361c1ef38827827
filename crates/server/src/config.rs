// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Server configuration from a TOML file.
//!
//! Every key is optional. The raw file is checked once at startup and
//! turned into [`Settings`], so a bad timezone or time string stops the
//! daemon before the first cycle.

use chrono::NaiveTime;
use chrono_tz::Tz;
use schulplan_api::RefreshOptions;
use schulplan_domain::{ScheduleTiming, parse_wall_time};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Reasons the configuration cannot be used.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Unknown timezone '{0}'")]
    InvalidTimezone(String),

    #[error("Invalid time '{value}' for '{key}'")]
    InvalidTime { key: &'static str, value: String },

    #[error("'{0}' must be greater than zero")]
    Zero(&'static str),
}

/// The `[timing]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingConfig {
    #[serde(default = "default_school_start")]
    pub school_start: String,
    #[serde(default = "default_lesson_duration")]
    pub lesson_duration_minutes: u32,
    #[serde(default = "default_short_break")]
    pub short_break_minutes: u32,
    #[serde(default = "default_long_break_1")]
    pub long_break_1_minutes: u32,
    #[serde(default = "default_long_break_2")]
    pub long_break_2_minutes: u32,
    #[serde(default = "default_lunch_break")]
    pub lunch_break_minutes: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            school_start: default_school_start(),
            lesson_duration_minutes: default_lesson_duration(),
            short_break_minutes: default_short_break(),
            long_break_1_minutes: default_long_break_1(),
            long_break_2_minutes: default_long_break_2(),
            lunch_break_minutes: default_lunch_break(),
        }
    }
}

impl TimingConfig {
    fn resolve(&self) -> Result<ScheduleTiming, ConfigError> {
        let school_start: NaiveTime =
            parse_wall_time(&self.school_start).map_err(|_| ConfigError::InvalidTime {
                key: "timing.school_start",
                value: self.school_start.clone(),
            })?;
        if self.lesson_duration_minutes == 0 {
            return Err(ConfigError::Zero("timing.lesson_duration_minutes"));
        }
        Ok(ScheduleTiming {
            school_start,
            lesson_duration_minutes: self.lesson_duration_minutes,
            short_break_minutes: self.short_break_minutes,
            long_break_1_minutes: self.long_break_1_minutes,
            long_break_2_minutes: self.long_break_2_minutes,
            lunch_break_minutes: self.lunch_break_minutes,
        })
    }
}

/// The configuration file as written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default = "default_update_interval")]
    pub update_interval_secs: u64,
    #[serde(default = "default_refresh_cooldown")]
    pub refresh_cooldown_secs: u64,
    #[serde(default = "default_lookahead_weeks")]
    pub lookahead_weeks: u32,
    #[serde(default = "default_true")]
    pub include_homework: bool,
    #[serde(default)]
    pub include_grades: bool,
    #[serde(default = "default_true")]
    pub include_exams: bool,
    #[serde(default = "default_true")]
    pub include_letters: bool,
    /// Keys kept per seen-set. Zero keeps every key.
    #[serde(default = "default_novelty_capacity")]
    pub novelty_capacity: usize,
    #[serde(default = "default_source_dir")]
    pub source_dir: PathBuf,
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub timing: TimingConfig,
}

fn default_timezone() -> String {
    String::from("Europe/Berlin")
}

const fn default_update_interval() -> u64 {
    900
}

const fn default_refresh_cooldown() -> u64 {
    30
}

const fn default_lookahead_weeks() -> u32 {
    2
}

const fn default_true() -> bool {
    true
}

const fn default_novelty_capacity() -> usize {
    5000
}

fn default_source_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_bind() -> String {
    String::from("127.0.0.1")
}

const fn default_port() -> u16 {
    3000
}

fn default_school_start() -> String {
    String::from("08:00")
}

const fn default_lesson_duration() -> u32 {
    45
}

const fn default_short_break() -> u32 {
    5
}

const fn default_long_break_1() -> u32 {
    20
}

const fn default_long_break_2() -> u32 {
    10
}

const fn default_lunch_break() -> u32 {
    45
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            update_interval_secs: default_update_interval(),
            refresh_cooldown_secs: default_refresh_cooldown(),
            lookahead_weeks: default_lookahead_weeks(),
            include_homework: true,
            include_grades: false,
            include_exams: true,
            include_letters: true,
            novelty_capacity: default_novelty_capacity(),
            source_dir: default_source_dir(),
            bind: default_bind(),
            port: default_port(),
            timing: TimingConfig::default(),
        }
    }
}

/// Validated settings the daemon runs with.
#[derive(Debug, Clone)]
pub struct Settings {
    pub timezone: Tz,
    pub update_interval: Duration,
    pub refresh_cooldown: Duration,
    pub novelty_capacity: Option<usize>,
    pub source_dir: PathBuf,
    pub bind: String,
    pub port: u16,
    pub options: RefreshOptions,
}

impl ServerConfig {
    /// Loads a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content: String = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parses a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid TOML for this schema.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The timezone is not an IANA name
    /// - `timing.school_start` is not a wall-clock time
    /// - The update interval or lesson duration is zero
    pub fn resolve(&self) -> Result<Settings, ConfigError> {
        let timezone: Tz = self
            .timezone
            .parse::<Tz>()
            .map_err(|_| ConfigError::InvalidTimezone(self.timezone.clone()))?;
        if self.update_interval_secs == 0 {
            return Err(ConfigError::Zero("update_interval_secs"));
        }
        let timing: ScheduleTiming = self.timing.resolve()?;

        Ok(Settings {
            timezone,
            update_interval: Duration::from_secs(self.update_interval_secs),
            refresh_cooldown: Duration::from_secs(self.refresh_cooldown_secs),
            novelty_capacity: (self.novelty_capacity > 0).then_some(self.novelty_capacity),
            source_dir: self.source_dir.clone(),
            bind: self.bind.clone(),
            port: self.port,
            options: RefreshOptions {
                timing,
                lookahead_weeks: self.lookahead_weeks,
                include_homework: self.include_homework,
                include_grades: self.include_grades,
                include_exams: self.include_exams,
                include_letters: self.include_letters,
            },
        })
    }
}
