use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One row of the full provider catalog (id + name only).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppEntry {
    pub id: i64,
    pub name: String,
}

/// A genre or category entry attached to an app detail payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LabelEntry {
    pub id: i64,
    pub name: String,
}

/// Per-platform availability flags.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlatformFlags {
    pub windows: bool,
    pub mac: bool,
    pub linux: bool,
}

impl PlatformFlags {
    /// Derive flags by substring-testing a stored free-text descriptor.
    pub fn from_descriptor(descriptor: &str) -> Self {
        let lower = descriptor.to_lowercase();
        Self {
            windows: lower.contains("windows"),
            mac: lower.contains("mac"),
            linux: lower.contains("linux"),
        }
    }

    /// Render flags back into the free-text token list stored locally.
    pub fn descriptor(&self) -> String {
        let mut tokens = Vec::new();
        if self.windows {
            tokens.push("windows");
        }
        if self.mac {
            tokens.push("mac");
        }
        if self.linux {
            tokens.push("linux");
        }
        tokens.join(" ")
    }

    /// Case-insensitive substring match against the descriptor form.
    pub fn matches(&self, needle: &str) -> bool {
        self.descriptor().contains(&needle.to_lowercase())
    }
}

/// Normalized app detail as consumed by promotion and the merge engine.
///
/// Every field the provider may omit defaults to empty/None; parsing
/// never fails an entire payload over a missing field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppDetail {
    pub id: i64,
    pub name: String,
    /// Provider content type ("game", "dlc", "demo", ...)
    pub kind: String,
    pub short_description: String,
    pub long_description: String,
    pub header_image: String,
    pub developers: Vec<String>,
    pub publishers: Vec<String>,
    pub age_rating: String,
    pub platforms: PlatformFlags,
    pub genres: Vec<LabelEntry>,
    /// Provider "categories", stored locally as tags
    pub tags: Vec<LabelEntry>,
    pub release_date: Option<NaiveDate>,
    /// Raw provider date string, kept for display when unparsed
    pub release_date_raw: String,
    pub coming_soon: bool,
}

impl AppDetail {
    pub fn developer(&self) -> String {
        self.developers.join(", ")
    }

    /// Downloadable-content screen: matches the name, or any genre or
    /// tag description, against "dlc" case-insensitively.
    pub fn is_dlc_like(&self) -> bool {
        if self.kind.eq_ignore_ascii_case("dlc") || self.name.to_lowercase().contains("dlc") {
            return true;
        }
        self.genres
            .iter()
            .chain(self.tags.iter())
            .any(|entry| entry.name.to_lowercase().contains("dlc"))
    }

    /// AND semantics: the detail must carry every requested genre id.
    pub fn has_all_genres(&self, ids: &[i64]) -> bool {
        ids.iter()
            .all(|id| self.genres.iter().any(|g| g.id == *id))
    }

    /// AND semantics: the detail must carry every requested tag id.
    pub fn has_all_tags(&self, ids: &[i64]) -> bool {
        ids.iter().all(|id| self.tags.iter().any(|t| t.id == *id))
    }
}

/// Date formats observed in provider payloads, tried in order.
const RELEASE_DATE_FORMATS: &[&str] = &["%d %b, %Y", "%b %d, %Y", "%Y-%m-%d", "%d %B, %Y"];

/// Parse a provider release-date string, falling back to None rather
/// than failing the surrounding import.
pub fn parse_release_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    for format in RELEASE_DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Some(date);
        }
    }

    // Bare year ("2013") becomes January 1st of that year
    if let Ok(year) = trimmed.parse::<i32>() {
        return NaiveDate::from_ymd_opt(year, 1, 1);
    }

    None
}
