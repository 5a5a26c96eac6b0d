use crate::{OsintError, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Platforms reported while a search is in flight, indexed by `progress / 12.5`.
pub const SCAN_PLATFORMS: [&str; 8] = [
    "Twitter",
    "GitHub",
    "LinkedIn",
    "Instagram",
    "Reddit",
    "Facebook",
    "Discord",
    "YouTube",
];

pub const PLATFORM_FINALIZING: &str = "Finalizing...";
pub const PLATFORM_COMPLETED: &str = "Completed";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    #[default]
    Basic,
    Comprehensive,
    Deep,
}

impl SearchType {
    pub fn estimated_time_seconds(self) -> u32 {
        match self {
            SearchType::Basic => 30,
            SearchType::Comprehensive => 120,
            SearchType::Deep => 300,
        }
    }

    /// Number of platforms the search claims to have scanned.
    pub fn platforms_scanned(self) -> u32 {
        match self {
            SearchType::Basic => 8,
            SearchType::Comprehensive => 15,
            SearchType::Deep => 25,
        }
    }

    pub fn includes_extended_platforms(self) -> bool {
        matches!(self, SearchType::Comprehensive | SearchType::Deep)
    }
}

impl FromStr for SearchType {
    type Err = OsintError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basic" => Ok(SearchType::Basic),
            "comprehensive" => Ok(SearchType::Comprehensive),
            "deep" => Ok(SearchType::Deep),
            other => Err(OsintError::Validation(format!(
                "unknown search type: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for SearchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SearchType::Basic => "basic",
            SearchType::Comprehensive => "comprehensive",
            SearchType::Deep => "deep",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl SearchStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, SearchStatus::Completed | SearchStatus::Failed)
    }
}

impl FromStr for SearchStatus {
    type Err = OsintError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(SearchStatus::Pending),
            "running" => Ok(SearchStatus::Running),
            "completed" => Ok(SearchStatus::Completed),
            "failed" => Ok(SearchStatus::Failed),
            other => Err(OsintError::Validation(format!("unknown status: {}", other))),
        }
    }
}

impl fmt::Display for SearchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SearchStatus::Pending => "pending",
            SearchStatus::Running => "running",
            SearchStatus::Completed => "completed",
            SearchStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Raw search request as submitted by a client, before sanitization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub search_type: Option<String>,
}

impl SearchQuery {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            ..Self::default()
        }
    }

    pub fn with_search_type(mut self, search_type: impl Into<String>) -> Self {
        self.search_type = Some(search_type.into());
        self
    }

    /// Trims every field, drops empty optionals and resolves the search type.
    ///
    /// Fails when the username is missing or blank. An unrecognised search
    /// type falls back to [`SearchType::Basic`].
    pub fn sanitize(self) -> Result<SearchInput> {
        let username = self
            .username
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or_else(|| OsintError::Validation("Username is required".to_string()))?
            .to_string();

        let search_type = match self.search_type.as_deref().map(str::trim) {
            None | Some("") => SearchType::Basic,
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                tracing::warn!(search_type = raw, "Unknown search type, using basic");
                SearchType::Basic
            }),
        };

        Ok(SearchInput {
            username,
            email: non_empty(self.email),
            name: non_empty(self.name),
            search_type,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Sanitized search input carried by every record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchInput {
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub search_type: SearchType,
}

impl SearchInput {
    pub fn new(username: impl Into<String>, search_type: SearchType) -> Self {
        Self {
            username: username.into(),
            email: None,
            name: None,
            search_type,
        }
    }
}

/// Lifecycle state for one submitted search.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRecord {
    pub id: String,
    #[serde(flatten)]
    pub input: SearchInput,
    pub status: SearchStatus,
    pub progress: u8,
    pub start_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_platform: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_time_remaining: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<ResultPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Unclamped progress accumulated across ticks.
    #[serde(skip)]
    pub(crate) accumulated: f64,
    #[serde(skip)]
    pub(crate) ticks: u32,
}

impl SearchRecord {
    pub fn new(id: impl Into<String>, input: SearchInput) -> Self {
        Self {
            id: id.into(),
            input,
            status: SearchStatus::Pending,
            progress: 0,
            start_time: Utc::now(),
            completed_at: None,
            current_platform: None,
            estimated_time_remaining: None,
            results: None,
            error: None,
            accumulated: 0.0,
            ticks: 0,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn summary(&self) -> SearchSummary {
        let (platforms, results_count, risk_score) = match &self.results {
            Some(results) => (
                results.summary.platforms_found.clone(),
                results.accounts.len(),
                Some(results.summary.risk_score),
            ),
            None => (Vec::new(), 0, None),
        };

        SearchSummary {
            id: self.id.clone(),
            query: self.input.username.clone(),
            search_type: self.input.search_type,
            status: self.status,
            progress: self.progress,
            timestamp: self.start_time,
            platforms,
            results_count,
            risk_score,
            error: self.error.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    Twitter,
    GitHub,
    LinkedIn,
    Reddit,
    Instagram,
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Platform::Twitter => "Twitter",
            Platform::GitHub => "GitHub",
            Platform::LinkedIn => "LinkedIn",
            Platform::Reddit => "Reddit",
            Platform::Instagram => "Instagram",
        };
        f.write_str(s)
    }
}

/// A fabricated profile on one platform. Only the fields the platform
/// exposes are populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub platform: Platform,
    pub username: String,
    pub url: String,
    pub verified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub followers: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub following: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub posts: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repositories: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connections: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub karma: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_karma: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment_karma: Option<u64>,
    /// Account age in days.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_active: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
}

impl Account {
    pub fn new(platform: Platform, username: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            platform,
            username: username.into(),
            url: url.into(),
            verified: false,
            display_name: None,
            followers: None,
            following: None,
            posts: None,
            repositories: None,
            connections: None,
            karma: None,
            post_karma: None,
            comment_karma: None,
            account_age: None,
            last_active: None,
            join_date: None,
            bio: None,
            profile_image: None,
            location: None,
            website: None,
            company: None,
            position: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionType {
    SameEmail,
    SameName,
    SimilarBio,
    CrossReference,
    TimingCorrelation,
}

impl ConnectionType {
    pub const ALL: [ConnectionType; 5] = [
        ConnectionType::SameEmail,
        ConnectionType::SameName,
        ConnectionType::SimilarBio,
        ConnectionType::CrossReference,
        ConnectionType::TimingCorrelation,
    ];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    #[serde(rename = "from")]
    pub from_platform: Platform,
    #[serde(rename = "to")]
    pub to_platform: Platform,
    #[serde(rename = "type")]
    pub relation_type: ConnectionType,
    pub confidence: f64,
    pub evidence: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimelineEventType {
    AccountCreated,
    Activity,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEvent {
    pub date: NaiveDate,
    pub event: String,
    pub platform: Platform,
    #[serde(rename = "type")]
    pub event_type: TimelineEventType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskScore {
    Low,
    Medium,
    High,
}

impl RiskScore {
    /// Buckets a raw risk point total. There is no upper bound on `High`.
    pub fn from_points(points: i64) -> Self {
        if points < 30 {
            RiskScore::Low
        } else if points < 60 {
            RiskScore::Medium
        } else {
            RiskScore::High
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultSummary {
    pub username: String,
    pub total_accounts: usize,
    pub verified_accounts: usize,
    pub risk_score: RiskScore,
    pub last_active: NaiveDate,
    pub first_seen: NaiveDate,
    pub total_followers: u64,
    pub platforms_found: Vec<Platform>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultMetadata {
    /// Reported duration in seconds.
    pub search_duration: u32,
    pub platforms_scanned: u32,
    pub confidence: f64,
}

/// Fabricated cross-platform findings attached to a completed search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultPayload {
    pub summary: ResultSummary,
    pub accounts: Vec<Account>,
    pub connections: Vec<Connection>,
    pub timeline: Vec<TimelineEvent>,
    pub metadata: ResultMetadata,
}

/// Compact history entry for listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchSummary {
    pub id: String,
    pub query: String,
    pub search_type: SearchType,
    pub status: SearchStatus,
    pub progress: u8,
    pub timestamp: DateTime<Utc>,
    pub platforms: Vec<Platform>,
    pub results_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_score: Option<RiskScore>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchStats {
    pub total: usize,
    pub pending: usize,
    pub running: usize,
    pub completed: usize,
    pub failed: usize,
    /// Sum of accounts found across completed searches.
    pub total_results: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_trims_and_defaults() {
        let query = SearchQuery {
            username: Some("  alice ".to_string()),
            email: Some("   ".to_string()),
            name: Some(" Alice A ".to_string()),
            search_type: None,
        };
        let input = query.sanitize().unwrap();
        assert_eq!(input.username, "alice");
        assert_eq!(input.email, None);
        assert_eq!(input.name.as_deref(), Some("Alice A"));
        assert_eq!(input.search_type, SearchType::Basic);
    }

    #[test]
    fn test_sanitize_rejects_blank_username() {
        for username in [None, Some(""), Some("   "), Some("\t\n")] {
            let query = SearchQuery {
                username: username.map(str::to_string),
                ..SearchQuery::default()
            };
            assert!(matches!(query.sanitize(), Err(OsintError::Validation(_))));
        }
    }

    #[test]
    fn test_unknown_search_type_falls_back_to_basic() {
        let input = SearchQuery::new("bob")
            .with_search_type("exhaustive")
            .sanitize()
            .unwrap();
        assert_eq!(input.search_type, SearchType::Basic);
        assert_eq!(input.search_type.estimated_time_seconds(), 30);
    }

    #[test]
    fn test_estimated_time_table() {
        assert_eq!(SearchType::Basic.estimated_time_seconds(), 30);
        assert_eq!(SearchType::Comprehensive.estimated_time_seconds(), 120);
        assert_eq!(SearchType::Deep.estimated_time_seconds(), 300);
    }

    #[test]
    fn test_risk_buckets() {
        assert_eq!(RiskScore::from_points(-10), RiskScore::Low);
        assert_eq!(RiskScore::from_points(29), RiskScore::Low);
        assert_eq!(RiskScore::from_points(30), RiskScore::Medium);
        assert_eq!(RiskScore::from_points(59), RiskScore::Medium);
        assert_eq!(RiskScore::from_points(60), RiskScore::High);
        assert_eq!(RiskScore::from_points(600), RiskScore::High);
    }

    #[test]
    fn test_record_serializes_flattened_input() {
        let input = SearchInput::new("alice", SearchType::Deep);
        let record = SearchRecord::new("search_1_abc", input);
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["id"], "search_1_abc");
        assert_eq!(value["username"], "alice");
        assert_eq!(value["searchType"], "deep");
        assert_eq!(value["status"], "pending");
        assert_eq!(value["progress"], 0);
        assert!(value.get("startTime").is_some());
        assert!(value.get("results").is_none());
        assert!(value.get("accumulated").is_none());
    }
}
