use anyhow::{anyhow, Context, Result};
use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

/// Everything the bot reads from the environment, resolved once at startup.
/// Nothing else in the crate touches `env::var`.
#[derive(Clone, Debug)]
pub struct BotConfig {
    pub api_base_url: String,
    pub access_token: String,
    pub ftp: Option<FtpConfig>,
    pub dont_upload_logs: bool,
    pub archive_interval_secs: i64,
    pub archive_path: PathBuf,
    /// None means the option is absent; the threat decider warns and falls
    /// back to its default.
    pub threat_probability: Option<f64>,
}

#[derive(Clone, Debug)]
pub struct FtpConfig {
    pub host: String,
    pub user: String,
    pub pass: String,
}

fn must(key: &str) -> Result<String> {
    env::var(key).with_context(|| format!("missing required env: {key}"))
}

fn opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}

fn parse<T: FromStr>(key: &str, default: T) -> Result<T>
where
    <T as FromStr>::Err: Display,
{
    match opt(key) {
        Some(s) => s
            .parse::<T>()
            .map_err(|e| anyhow!("failed to parse {key}='{s}': {e}")),
        None => Ok(default),
    }
}

impl BotConfig {
    pub fn from_env() -> Result<Self> {
        let api_base_url = must("API_URL")?;
        let access_token = must("ACCESS_TOKEN")?;

        let ftp = match (opt("FTP_HOST"), opt("FTP_USER"), opt("FTP_PASS")) {
            (Some(host), Some(user), Some(pass)) => Some(FtpConfig { host, user, pass }),
            _ => None,
        };

        let dont_upload_logs: bool = parse("DONT_UPLOAD_LOGS", false)?;
        let archive_interval_secs: i64 = parse("ARCHIVE_INTERVAL_SECONDS", 86_400)?;
        let archive_path =
            PathBuf::from(opt("ARCHIVE_FILE_PATH").unwrap_or_else(|| "archive.json".into()));

        let threat_probability = match opt("THREAT_PROBABILITY") {
            Some(s) => Some(
                s.parse::<f64>()
                    .map_err(|e| anyhow!("failed to parse THREAT_PROBABILITY='{s}': {e}"))?,
            ),
            None => None,
        };

        Ok(Self {
            api_base_url,
            access_token,
            ftp,
            dont_upload_logs,
            archive_interval_secs,
            archive_path,
            threat_probability,
        })
    }
}
