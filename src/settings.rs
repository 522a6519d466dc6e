use std::path::PathBuf;
use std::time::Duration;

use config::{Config, ConfigError, Environment};
use serde::Deserialize;

pub const DEFAULT_OUTPUT: &str = "instructors_data.json";
const DEFAULT_CONCURRENCY: u64 = 10;
const MAX_CONCURRENCY: usize = 256;
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Runtime settings, read from `SIBA_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub output: PathBuf,
    pub concurrency: usize,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_env(Environment::with_prefix("SIBA"))
    }

    fn from_env(env: Environment) -> Result<Self, ConfigError> {
        let settings: Settings = Config::builder()
            .set_default("output", DEFAULT_OUTPUT)?
            .set_default("concurrency", DEFAULT_CONCURRENCY)?
            .set_default("timeout_secs", DEFAULT_TIMEOUT_SECS)?
            .set_default("user_agent", DEFAULT_USER_AGENT)?
            .add_source(env)
            .build()?
            .try_deserialize()?;
        settings.validate()
    }

    /// Apply command-line overrides on top of the environment.
    pub fn with_overrides(
        mut self,
        output: Option<PathBuf>,
        concurrency: Option<usize>,
    ) -> Result<Self, ConfigError> {
        if let Some(output) = output {
            self.output = output;
        }
        if let Some(concurrency) = concurrency {
            self.concurrency = concurrency;
        }
        self.validate()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if self.concurrency == 0 {
            return Err(ConfigError::Message("concurrency must be at least 1".into()));
        }
        if self.concurrency > MAX_CONCURRENCY {
            return Err(ConfigError::Message(format!(
                "concurrency must be at most {}",
                MAX_CONCURRENCY
            )));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Message("timeout_secs must be at least 1".into()));
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(vars: &[(&str, &str)]) -> Environment {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Environment::with_prefix("SIBA").source(Some(map))
    }

    #[test]
    fn defaults_when_env_is_empty() {
        let s = Settings::from_env(env(&[])).unwrap();
        assert_eq!(s.output, PathBuf::from("instructors_data.json"));
        assert_eq!(s.concurrency, 10);
        assert_eq!(s.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn env_overrides_defaults() {
        let s = Settings::from_env(env(&[
            ("SIBA_OUTPUT", "out/faculty.json"),
            ("SIBA_CONCURRENCY", "4"),
        ]))
        .unwrap();
        assert_eq!(s.output, PathBuf::from("out/faculty.json"));
        assert_eq!(s.concurrency, 4);
    }

    #[test]
    fn cli_overrides_win() {
        let s = Settings::from_env(env(&[("SIBA_CONCURRENCY", "4")]))
            .unwrap()
            .with_overrides(Some("x.json".into()), Some(2))
            .unwrap();
        assert_eq!(s.output, PathBuf::from("x.json"));
        assert_eq!(s.concurrency, 2);
    }

    #[test]
    fn out_of_range_concurrency_rejected() {
        assert!(Settings::from_env(env(&[("SIBA_CONCURRENCY", "0")])).is_err());
        assert!(Settings::from_env(env(&[("SIBA_CONCURRENCY", "257")])).is_err());
        assert!(Settings::from_env(env(&[("SIBA_CONCURRENCY", "18446744073709551615")])).is_err());

        let s = Settings::from_env(env(&[])).unwrap();
        assert!(s.clone().with_overrides(None, Some(0)).is_err());
        assert!(s.clone().with_overrides(None, Some(usize::MAX)).is_err());
        assert_eq!(s.with_overrides(None, Some(256)).unwrap().concurrency, 256);
    }
}
