use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use chrono::{FixedOffset, Offset, Utc};
use ipnet::IpNet;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub site_dir: PathBuf,
    pub contact_page: String,
    pub fragment_base_url: Option<String>,
    pub contact: ContactConfig,
    pub max_body_size: usize,
    pub rate_limit: u32,
    pub rate_window_secs: u64,
    pub trusted_proxies: Vec<IpNet>,
    pub log_level: String,
    pub smtp: Option<SmtpConfig>,
}

/// Settings for composing and presenting a quote request.
#[derive(Debug, Clone)]
pub struct ContactConfig {
    pub to_address: String,
    pub site_name: String,
    pub send_delay: Duration,
    pub alert_dismiss: Duration,
    pub utc_offset: FixedOffset,
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub pass: String,
    pub from: String,
    pub tls: TlsMode,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TlsMode {
    StartTls,
    Tls,
    None,
}

impl TlsMode {
    fn parse(s: &str) -> Self {
        match s {
            "tls" => TlsMode::Tls,
            "none" => TlsMode::None,
            _ => TlsMode::StartTls,
        }
    }
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            to_address: "info@servicecargue.com".to_string(),
            site_name: "www.servicecargue.com".to_string(),
            send_delay: Duration::from_millis(1500),
            alert_dismiss: Duration::from_millis(8000),
            utc_offset: bogota_offset(),
        }
    }
}

fn bogota_offset() -> FixedOffset {
    FixedOffset::west_opt(5 * 3600).unwrap_or_else(|| Utc.fix())
}

/// Whole-hour offset east of UTC. `None` outside chrono's ±24h range.
fn offset_from_hours(hours: i32) -> Option<FixedOffset> {
    hours.checked_mul(3600).and_then(FixedOffset::east_opt)
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let host: IpAddr = env_or("SERVICECARGUE_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid SERVICECARGUE_HOST: {e}"))?;

        let port: u16 = env_or("SERVICECARGUE_PORT", "3000")
            .parse()
            .map_err(|e| format!("Invalid SERVICECARGUE_PORT: {e}"))?;

        let site_dir = PathBuf::from(env_or("SERVICECARGUE_SITE_DIR", "site"));
        let contact_page = env_or("SERVICECARGUE_CONTACT_PAGE", "contacto.html");

        let fragment_base_url = std::env::var("SERVICECARGUE_FRAGMENT_BASE_URL")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(|s| s.trim_end_matches('/').to_string());

        let send_delay_ms: u64 = env_or("SERVICECARGUE_SEND_DELAY_MS", "1500")
            .parse()
            .map_err(|e| format!("Invalid SERVICECARGUE_SEND_DELAY_MS: {e}"))?;

        let alert_dismiss_ms: u64 = env_or("SERVICECARGUE_ALERT_DISMISS_MS", "8000")
            .parse()
            .map_err(|e| format!("Invalid SERVICECARGUE_ALERT_DISMISS_MS: {e}"))?;

        let offset_hours: i32 = env_or("SERVICECARGUE_UTC_OFFSET_HOURS", "-5")
            .parse()
            .map_err(|e| format!("Invalid SERVICECARGUE_UTC_OFFSET_HOURS: {e}"))?;
        let utc_offset = offset_from_hours(offset_hours).ok_or_else(|| {
            format!("Invalid SERVICECARGUE_UTC_OFFSET_HOURS: {offset_hours} out of range")
        })?;

        let contact = ContactConfig {
            to_address: env_or("SERVICECARGUE_CONTACT_TO", "info@servicecargue.com"),
            site_name: env_or("SERVICECARGUE_SITE_NAME", "www.servicecargue.com"),
            send_delay: Duration::from_millis(send_delay_ms),
            alert_dismiss: Duration::from_millis(alert_dismiss_ms),
            utc_offset,
        };

        let max_body_size: usize = env_or("SERVICECARGUE_MAX_BODY_SIZE", "65536")
            .parse()
            .map_err(|e| format!("Invalid SERVICECARGUE_MAX_BODY_SIZE: {e}"))?;

        let rate_limit: u32 = env_or("SERVICECARGUE_RATE_LIMIT", "5")
            .parse()
            .map_err(|e| format!("Invalid SERVICECARGUE_RATE_LIMIT: {e}"))?;

        let rate_window_secs: u64 = env_or("SERVICECARGUE_RATE_WINDOW_SECS", "60")
            .parse()
            .map_err(|e| format!("Invalid SERVICECARGUE_RATE_WINDOW_SECS: {e}"))?;

        let trusted_proxies: Vec<IpNet> = env_or("SERVICECARGUE_TRUSTED_PROXIES", "")
            .split(',')
            .filter(|s| !s.trim().is_empty())
            .map(|s| {
                s.trim()
                    .parse()
                    .map_err(|e| format!("Invalid SERVICECARGUE_TRUSTED_PROXIES entry '{s}': {e}"))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let log_level = env_or("SERVICECARGUE_LOG_LEVEL", "info");

        let smtp = match (
            std::env::var("SERVICECARGUE_SMTP_HOST").ok(),
            std::env::var("SERVICECARGUE_SMTP_PORT").ok(),
            std::env::var("SERVICECARGUE_SMTP_USER").ok(),
            std::env::var("SERVICECARGUE_SMTP_PASS").ok(),
            std::env::var("SERVICECARGUE_SMTP_FROM").ok(),
        ) {
            (Some(host), Some(port), Some(user), Some(pass), Some(from)) => Some(SmtpConfig {
                host,
                port: port
                    .parse()
                    .map_err(|e| format!("Invalid SERVICECARGUE_SMTP_PORT: {e}"))?,
                user,
                pass,
                from,
                tls: TlsMode::parse(&env_or("SERVICECARGUE_SMTP_TLS", "starttls")),
            }),
            _ => None,
        };

        Ok(Config {
            host,
            port,
            site_dir,
            contact_page,
            fragment_base_url,
            contact,
            max_body_size,
            rate_limit,
            rate_window_secs,
            trusted_proxies,
            log_level,
            smtp,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
