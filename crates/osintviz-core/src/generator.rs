//! Result shape generator.
//!
//! Fabricates the cross-platform findings attached to a completed search.
//! Randomness comes only from the injected RNG and dates are relative to the
//! supplied `today`, so a seeded RNG reproduces the exact same payload.

use crate::types::{
    Account, Connection, ConnectionType, Platform, ResultMetadata, ResultPayload, ResultSummary,
    RiskScore, SearchInput, TimelineEvent, TimelineEventType,
};
use chrono::{Days, NaiveDate};
use rand::Rng;

pub const MAX_TIMELINE_EVENTS: usize = 20;

/// Probability that any given pair of accounts is linked.
pub const CONNECTION_PROBABILITY: f64 = 0.6;

const CONNECTION_EVIDENCE: [&str; 5] = [
    "Matching email hash patterns",
    "Similar profile creation dates",
    "Cross-platform username references",
    "Identical profile information",
    "Correlated activity patterns",
];

pub fn generate_results<R: Rng + ?Sized>(
    input: &SearchInput,
    rng: &mut R,
    today: NaiveDate,
) -> ResultPayload {
    let accounts = generate_accounts(input, rng, today);
    let connections = generate_connections(&accounts, rng);
    let timeline = build_timeline(&accounts, rng, today);
    let summary = summarize(&input.username, &accounts, today);

    let metadata = ResultMetadata {
        search_duration: rng.random_range(30..150),
        platforms_scanned: input.search_type.platforms_scanned(),
        confidence: rng.random_range(0.8..1.0),
    };

    ResultPayload {
        summary,
        accounts,
        connections,
        timeline,
        metadata,
    }
}

fn generate_accounts<R: Rng + ?Sized>(
    input: &SearchInput,
    rng: &mut R,
    today: NaiveDate,
) -> Vec<Account> {
    let username = input.username.as_str();
    let mut accounts = Vec::with_capacity(5);

    let mut twitter = Account::new(
        Platform::Twitter,
        username,
        format!("https://twitter.com/{}", username),
    );
    twitter.display_name = Some(
        input
            .name
            .clone()
            .unwrap_or_else(|| format!("{}_dev", username)),
    );
    twitter.verified = true;
    twitter.followers = Some(rng.random_range(100..5100));
    twitter.following = Some(rng.random_range(50..1050));
    twitter.posts = Some(rng.random_range(10..2010));
    twitter.last_active = Some(random_date(rng, today, 30, 0));
    twitter.bio = Some("Software developer and tech enthusiast".to_string());
    twitter.profile_image = Some(format!(
        "https://api.dicebear.com/7.x/avataaars/svg?seed={}",
        username
    ));
    twitter.join_date = Some(random_date(rng, today, 1500, 365));
    twitter.location = Some("San Francisco, CA".to_string());
    twitter.website = Some(format!("https://{}.dev", username));
    accounts.push(twitter);

    let mut github = Account::new(
        Platform::GitHub,
        username,
        format!("https://github.com/{}", username),
    );
    github.display_name = Some(input.name.clone().unwrap_or_else(|| username.to_string()));
    github.verified = true;
    github.followers = Some(rng.random_range(20..520));
    github.following = Some(rng.random_range(10..210));
    github.repositories = Some(rng.random_range(5..55));
    github.last_active = Some(random_date(rng, today, 7, 0));
    github.bio = Some("Full-stack developer passionate about open source".to_string());
    github.profile_image = Some(format!(
        "https://api.dicebear.com/7.x/identicon/svg?seed={}",
        username
    ));
    github.join_date = Some(random_date(rng, today, 1200, 365));
    github.location = Some("California, USA".to_string());
    github.company = Some("TechCorp".to_string());
    accounts.push(github);

    let mut linkedin = Account::new(
        Platform::LinkedIn,
        format!("{}-dev", username),
        format!("https://linkedin.com/in/{}-dev", username),
    );
    linkedin.display_name = Some(
        input
            .name
            .clone()
            .unwrap_or_else(|| format!("{} Developer", capitalize(username))),
    );
    linkedin.connections = Some(rng.random_range(100..1100));
    linkedin.last_active = Some(random_date(rng, today, 14, 0));
    linkedin.bio = Some("Senior Software Engineer | React | Node.js".to_string());
    linkedin.profile_image = Some(format!(
        "https://api.dicebear.com/7.x/personas/svg?seed={}",
        username
    ));
    linkedin.position = Some("Senior Software Engineer".to_string());
    linkedin.company = Some("Tech Solutions Inc.".to_string());
    accounts.push(linkedin);

    if input.search_type.includes_extended_platforms() {
        let mut reddit = Account::new(
            Platform::Reddit,
            username,
            format!("https://reddit.com/u/{}", username),
        );
        reddit.karma = Some(rng.random_range(100..10100));
        reddit.post_karma = Some(rng.random_range(50..5050));
        reddit.comment_karma = Some(rng.random_range(50..5050));
        reddit.last_active = Some(random_date(rng, today, 3, 0));
        reddit.account_age = Some(rng.random_range(100..1100));
        accounts.push(reddit);

        let mut instagram = Account::new(
            Platform::Instagram,
            username,
            format!("https://instagram.com/{}", username),
        );
        instagram.followers = Some(rng.random_range(50..2050));
        instagram.following = Some(rng.random_range(20..520));
        instagram.posts = Some(rng.random_range(10..210));
        instagram.last_active = Some(random_date(rng, today, 5, 0));
        instagram.bio = Some("📸 Developer life | ☕ Coffee enthusiast".to_string());
        accounts.push(instagram);
    }

    accounts
}

fn generate_connections<R: Rng + ?Sized>(accounts: &[Account], rng: &mut R) -> Vec<Connection> {
    let mut connections = Vec::new();
    for (i, from) in accounts.iter().enumerate() {
        for to in &accounts[i + 1..] {
            if !rng.random_bool(CONNECTION_PROBABILITY) {
                continue;
            }
            let relation_type = ConnectionType::ALL[rng.random_range(0..ConnectionType::ALL.len())];
            let evidence = CONNECTION_EVIDENCE[rng.random_range(0..CONNECTION_EVIDENCE.len())];
            connections.push(Connection {
                from_platform: from.platform,
                to_platform: to.platform,
                relation_type,
                confidence: rng.random_range(0.7..1.0),
                evidence: evidence.to_string(),
            });
        }
    }
    connections
}

fn build_timeline<R: Rng + ?Sized>(
    accounts: &[Account],
    rng: &mut R,
    today: NaiveDate,
) -> Vec<TimelineEvent> {
    let mut timeline = Vec::with_capacity(accounts.len() * 2);
    for account in accounts {
        let created = account
            .join_date
            .unwrap_or_else(|| random_date(rng, today, 365, 0));
        timeline.push(TimelineEvent {
            date: created,
            event: format!("Account created on {}", account.platform),
            platform: account.platform,
            event_type: TimelineEventType::AccountCreated,
        });

        if let Some(last_active) = account.last_active {
            timeline.push(TimelineEvent {
                date: last_active,
                event: format!("Recent activity on {}", account.platform),
                platform: account.platform,
                event_type: TimelineEventType::Activity,
            });
        }
    }

    // Stable, newest first.
    timeline.sort_by(|a, b| b.date.cmp(&a.date));
    timeline.truncate(MAX_TIMELINE_EVENTS);
    timeline
}

fn summarize(username: &str, accounts: &[Account], today: NaiveDate) -> ResultSummary {
    let last_active = accounts
        .iter()
        .filter_map(|a| a.last_active)
        .max()
        .unwrap_or_else(|| NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or(today));
    let first_seen = accounts
        .iter()
        .filter_map(|a| a.join_date)
        .min()
        .unwrap_or(today);

    ResultSummary {
        username: username.to_string(),
        total_accounts: accounts.len(),
        verified_accounts: accounts.iter().filter(|a| a.verified).count(),
        risk_score: risk_score(accounts),
        last_active,
        first_seen,
        total_followers: total_followers(accounts),
        platforms_found: accounts.iter().map(|a| a.platform).collect(),
    }
}

pub fn total_followers(accounts: &[Account]) -> u64 {
    accounts.iter().filter_map(|a| a.followers).sum()
}

/// Raw exposure points: more accounts raise risk, verified accounts lower it,
/// and a large combined audience adds a visibility bonus.
pub fn risk_points(accounts: &[Account]) -> i64 {
    let account_count = accounts.len() as i64;
    let verified_count = accounts.iter().filter(|a| a.verified).count() as i64;
    let followers = total_followers(accounts);

    let visibility = if followers > 10_000 {
        20
    } else if followers > 1_000 {
        10
    } else {
        0
    };

    10 * account_count - 5 * verified_count + visibility
}

pub fn risk_score(accounts: &[Account]) -> RiskScore {
    RiskScore::from_points(risk_points(accounts))
}

/// A date between `min_days_ago` (inclusive) and `days_ago` (exclusive)
/// days before `today`.
fn random_date<R: Rng + ?Sized>(
    rng: &mut R,
    today: NaiveDate,
    days_ago: u64,
    min_days_ago: u64,
) -> NaiveDate {
    let offset = rng.random_range(min_days_ago..days_ago);
    today.checked_sub_days(Days::new(offset)).unwrap_or(today)
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
