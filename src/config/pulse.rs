// src/config/pulse.rs
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::pipeline::TopicMode;

pub const ENV_CONFIG_PATH: &str = "PULSE_CONFIG_PATH";
pub const ENV_API_URL: &str = "PULSE_API_URL";
pub const ENV_BIND_ADDR: &str = "PULSE_BIND_ADDR";
pub const DEFAULT_CONFIG_PATH: &str = "config/pulse.toml";

fn default_api_base_url() -> String {
    "http://localhost:8000".to_string()
}
fn default_timeout_secs() -> u64 {
    10
}
fn default_connect_timeout_secs() -> u64 {
    4
}
fn default_limit() -> u32 {
    20
}
fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PulseConfig {
    /// Backend root, without the `/api` prefix.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Topics per page when the caller gives no `limit`.
    #[serde(default = "default_limit")]
    pub default_limit: u32,
    /// How topics are obtained when the caller gives no `mode`.
    #[serde(default)]
    pub mode: TopicMode,
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

impl Default for PulseConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            default_limit: default_limit(),
            mode: TopicMode::default(),
            bind_addr: default_bind_addr(),
        }
    }
}

impl PulseConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading pulse config from {}", path.display()))?;
        let mut cfg: PulseConfig = toml::from_str(&data)
            .with_context(|| format!("parsing pulse config {}", path.display()))?;
        cfg.sanitize();
        Ok(cfg)
    }

    /// Resolve configuration:
    /// 1) $PULSE_CONFIG_PATH (must exist)
    /// 2) config/pulse.toml
    /// 3) built-in defaults
    ///
    /// Then `PULSE_API_URL` / `PULSE_BIND_ADDR` override the file.
    pub fn load_default() -> Result<Self> {
        let mut cfg = if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
            }
            Self::load_from_file(&pb)?
        } else {
            let default_p = PathBuf::from(DEFAULT_CONFIG_PATH);
            if default_p.exists() {
                Self::load_from_file(&default_p)?
            } else {
                Self::default()
            }
        };

        if let Ok(url) = std::env::var(ENV_API_URL) {
            if !url.trim().is_empty() {
                cfg.api_base_url = url.trim().to_string();
            }
        }
        if let Ok(addr) = std::env::var(ENV_BIND_ADDR) {
            if !addr.trim().is_empty() {
                cfg.bind_addr = addr.trim().to_string();
            }
        }
        Ok(cfg)
    }

    fn sanitize(&mut self) {
        if self.timeout_secs == 0 {
            self.timeout_secs = default_timeout_secs();
        }
        if self.connect_timeout_secs == 0 {
            self.connect_timeout_secs = default_connect_timeout_secs();
        }
        // Backend caps topic listings at 100.
        self.default_limit = self.default_limit.clamp(1, 100);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn partial_file_keeps_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let p = tmp.path().join("pulse.toml");
        fs::write(&p, "api_base_url = \"http://pulse-api:8000\"\nmode = \"fallback\"\n").unwrap();
        let cfg = PulseConfig::load_from_file(&p).unwrap();
        assert_eq!(cfg.api_base_url, "http://pulse-api:8000");
        assert_eq!(cfg.mode, TopicMode::Fallback);
        assert_eq!(cfg.timeout_secs, 10);
        assert_eq!(cfg.default_limit, 20);
    }

    #[test]
    fn out_of_range_values_are_sanitized() {
        let tmp = tempfile::tempdir().unwrap();
        let p = tmp.path().join("pulse.toml");
        fs::write(&p, "timeout_secs = 0\ndefault_limit = 500\n").unwrap();
        let cfg = PulseConfig::load_from_file(&p).unwrap();
        assert_eq!(cfg.timeout_secs, 10);
        assert_eq!(cfg.default_limit, 100);
    }

    #[test]
    fn unknown_mode_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let p = tmp.path().join("pulse.toml");
        fs::write(&p, "mode = \"bertopic\"\n").unwrap();
        assert!(PulseConfig::load_from_file(&p).is_err());
    }

    #[serial_test::serial]
    #[test]
    fn default_uses_env_then_fallbacks() {
        let old = env::current_dir().unwrap();
        let tmp = tempfile::tempdir().unwrap();
        env::set_current_dir(tmp.path()).unwrap();
        env::remove_var(ENV_CONFIG_PATH);
        env::remove_var(ENV_API_URL);
        env::remove_var(ENV_BIND_ADDR);

        // Nothing on disk → defaults
        let cfg = PulseConfig::load_default().unwrap();
        assert_eq!(cfg.api_base_url, "http://localhost:8000");

        // ./config/pulse.toml
        fs::create_dir_all(tmp.path().join("config")).unwrap();
        fs::write(
            tmp.path().join("config/pulse.toml"),
            "api_base_url = \"http://from-file:8000\"\n",
        )
        .unwrap();
        assert_eq!(
            PulseConfig::load_default().unwrap().api_base_url,
            "http://from-file:8000"
        );

        // env override wins over the file
        env::set_var(ENV_API_URL, "http://from-env:9000");
        assert_eq!(
            PulseConfig::load_default().unwrap().api_base_url,
            "http://from-env:9000"
        );
        env::remove_var(ENV_API_URL);

        // explicit path that does not exist
        env::set_var(ENV_CONFIG_PATH, tmp.path().join("nope.toml").display().to_string());
        assert!(PulseConfig::load_default().is_err());
        env::remove_var(ENV_CONFIG_PATH);

        env::set_current_dir(&old).unwrap();
    }
}
