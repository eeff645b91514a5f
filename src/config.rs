use std::collections::HashSet;
use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use teloxide::types::ChatId;

const DEFAULT_DATABASE_URL: &str = "sqlite://grooming.db?mode=rwc";
const DEFAULT_DASHBOARD_ADDR: &str = "0.0.0.0:8000";
const DEFAULT_SPAM_TIMEOUT_MINUTES: i64 = 3;
const DEFAULT_SESSION_TTL_MINUTES: u64 = 30;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{key} has invalid value {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bot_token: String,
    pub database_url: String,
    /// Белый список сотрудников, которым доступны кнопки подтверждения
    pub admin_ids: HashSet<ChatId>,
    pub spam_timeout_minutes: i64,
    pub session_ttl: Duration,
    pub dashboard_addr: SocketAddr,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bot_token = lookup("TELOXIDE_TOKEN")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("TELOXIDE_TOKEN"))?;

        let database_url = lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let admin_ids = match lookup("ADMIN_IDS") {
            Some(raw) => parse_admin_ids(&raw)?,
            None => HashSet::new(),
        };

        let spam_timeout_minutes = match lookup("SPAM_TIMEOUT_MINUTES") {
            Some(raw) => parse_number::<i64>("SPAM_TIMEOUT_MINUTES", &raw)?,
            None => DEFAULT_SPAM_TIMEOUT_MINUTES,
        };

        let ttl_minutes = match lookup("SESSION_TTL_MINUTES") {
            Some(raw) => parse_number::<u64>("SESSION_TTL_MINUTES", &raw)?,
            None => DEFAULT_SESSION_TTL_MINUTES,
        };

        let addr_raw = lookup("DASHBOARD_ADDR").unwrap_or_else(|| DEFAULT_DASHBOARD_ADDR.to_string());
        let dashboard_addr = addr_raw.parse().map_err(|_| ConfigError::Invalid {
            key: "DASHBOARD_ADDR",
            value: addr_raw.clone(),
        })?;

        Ok(Self {
            bot_token,
            database_url,
            admin_ids,
            spam_timeout_minutes,
            session_ttl: Duration::from_secs(ttl_minutes * 60),
            dashboard_addr,
        })
    }

    pub fn is_staff(&self, chat_id: ChatId) -> bool {
        self.admin_ids.contains(&chat_id)
    }
}

fn parse_admin_ids(raw: &str) -> Result<HashSet<ChatId>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| parse_number::<i64>("ADMIN_IDS", part).map(ChatId))
        .collect()
}

fn parse_number<T: std::str::FromStr>(key: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::Invalid {
        key,
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_only_token_is_set() {
        let cfg = AppConfig::from_lookup(lookup_from(&[("TELOXIDE_TOKEN", "123:abc")])).unwrap();
        assert_eq!(cfg.database_url, DEFAULT_DATABASE_URL);
        assert!(cfg.admin_ids.is_empty());
        assert_eq!(cfg.spam_timeout_minutes, 3);
        assert_eq!(cfg.session_ttl, Duration::from_secs(30 * 60));
        assert_eq!(cfg.dashboard_addr.port(), 8000);
    }

    #[test]
    fn admin_ids_are_parsed_and_trimmed() {
        let cfg = AppConfig::from_lookup(lookup_from(&[
            ("TELOXIDE_TOKEN", "t"),
            ("ADMIN_IDS", " 111, 222 ,,"),
        ]))
        .unwrap();
        assert!(cfg.is_staff(ChatId(111)));
        assert!(cfg.is_staff(ChatId(222)));
        assert!(!cfg.is_staff(ChatId(333)));
    }

    #[test]
    fn missing_token_is_an_error() {
        let err = AppConfig::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("TELOXIDE_TOKEN")));
    }

    #[test]
    fn malformed_number_names_the_key() {
        let err = AppConfig::from_lookup(lookup_from(&[
            ("TELOXIDE_TOKEN", "t"),
            ("SPAM_TIMEOUT_MINUTES", "three"),
        ]))
        .unwrap_err();
        assert_eq!(err.to_string(), "SPAM_TIMEOUT_MINUTES has invalid value \"three\"");
    }
}
