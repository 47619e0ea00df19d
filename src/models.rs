use anyhow::bail;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// The possible visibilities for a post according to the Mastodon API.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Visibility {
    Private,
    Direct,
    Unlisted,
    Public,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Private => "private",
            Visibility::Direct => "direct",
            Visibility::Unlisted => "unlisted",
            Visibility::Public => "public",
        }
    }
}

impl FromStr for Visibility {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "private" => Ok(Self::Private),
            "direct" => Ok(Self::Direct),
            "unlisted" => Ok(Self::Unlisted),
            "public" => Ok(Self::Public),
            other => bail!("unknown visibility: {other}"),
        }
    }
}

impl Display for Visibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A treat pool entry, decoded once when the pool is loaded.
///
/// Most entries are literal text. An entry may instead be a JSON object
/// `{"alt_wording": "True", "text": ...}`, which switches the composer to
/// the alternate sentence form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TreatEntry {
    Plain(String),
    AltWording(String),
}

#[derive(Deserialize)]
struct RawAltWording {
    alt_wording: Option<String>,
    text: Option<String>,
}

impl TreatEntry {
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        if raw.starts_with('{') && raw.ends_with('}') {
            let parsed: RawAltWording = serde_json::from_str(raw)
                .map_err(|e| anyhow::anyhow!("treat formatting error - invalid JSON: {raw}: {e}"))?;
            if parsed.alt_wording.as_deref() == Some("True") {
                if let Some(text) = parsed.text {
                    return Ok(TreatEntry::AltWording(text));
                }
            }
            bail!("treat formatting error - missing alt_wording/text fields: {raw}");
        }
        Ok(TreatEntry::Plain(raw.to_string()))
    }

    pub fn text(&self) -> &str {
        match self {
            TreatEntry::Plain(text) | TreatEntry::AltWording(text) => text,
        }
    }
}

/// The bot's own account, as returned by verify_credentials.
#[derive(Debug, Clone, Deserialize)]
pub struct Account {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub statuses_count: u64,
}

/// A status as fetched from the API. Only the fields the bot cares about;
/// everything else in the payload is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Status {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub favourites_count: u64,
    #[serde(default)]
    pub reblogs_count: u64,
    #[serde(default)]
    pub replies_count: u64,
}

/// A simplified snapshot of one posted status, keyed by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchivedStatus {
    pub id: String,
    pub timestamp: i64,
    pub content: String,
    pub likes: u64,
    pub boosts: u64,
    pub replies: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveMeta {
    #[serde(default)]
    pub last_archived: i64,
}

/// The on-disk archive document. Missing keys default so older or partial
/// files still load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveDocument {
    #[serde(default)]
    pub statuses: Vec<ArchivedStatus>,
    #[serde(default)]
    pub meta: ArchiveMeta,
}
