use std::fs;
use std::path::Path;

use chrono::{TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::service::BusinessHours;

const DEFAULT_OPENING_HOUR: u32 = 9;
const DEFAULT_CLOSING_HOUR: u32 = 17;
const DEFAULT_TOKEN_TTL_SECONDS: i64 = 24 * 60 * 60;

/// Contents of `petclinic.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClinicConfig {
    #[serde(default)]
    pub clinic: ClinicSettings,
    #[serde(default)]
    pub auth: AuthSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClinicSettings {
    /// Offset of clinic-local time from UTC, in minutes.
    pub utc_offset_minutes: i32,
    /// First bookable hour (inclusive).
    pub opening_hour: u32,
    /// Hour at which booking stops (exclusive).
    pub closing_hour: u32,
}

impl Default for ClinicSettings {
    fn default() -> Self {
        Self {
            utc_offset_minutes: 0,
            opening_hour: DEFAULT_OPENING_HOUR,
            closing_hour: DEFAULT_CLOSING_HOUR,
        }
    }
}

impl ClinicSettings {
    pub fn business_hours(&self) -> Result<BusinessHours> {
        BusinessHours::new(self.utc_offset_minutes, self.opening_hour, self.closing_hour)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    /// Lifetime of issued bearer credentials.
    pub token_ttl_seconds: i64,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            token_ttl_seconds: DEFAULT_TOKEN_TTL_SECONDS,
        }
    }
}

impl AuthSettings {
    /// The credential lifetime. It must be positive and small enough that
    /// an expiry computed from the current time stays representable.
    pub fn token_ttl(&self) -> Result<TimeDelta> {
        let ttl = TimeDelta::try_seconds(self.token_ttl_seconds)
            .filter(|ttl| *ttl > TimeDelta::zero())
            .ok_or_else(|| {
                Error::Config(format!(
                    "token_ttl_seconds must be positive and in range, got {}",
                    self.token_ttl_seconds
                ))
            })?;
        Utc::now()
            .checked_add_signed(ttl)
            .ok_or_else(|| Error::Config(format!("token_ttl_seconds {} is too large", self.token_ttl_seconds)))?;
        Ok(ttl)
    }
}

impl ClinicConfig {
    /// Loads the config file, falling back to defaults when it does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("failed to encode config: {e}")))?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.clinic.business_hours()?;
        self.auth.token_ttl()?;
        Ok(())
    }
}
