//! Plain-text rendering of roster reports and solve announcements.
//!
//! Pure functions over roster state; delivery to an outer surface (chat,
//! log, anything) is the caller's concern.

use std::fmt::Write;

use platform_api::UserSummary;
use roster::Roster;

use crate::sync::SolveEvent;

/// Announcement for a newly observed validation.
pub fn solve_announcement(event: &SolveEvent) -> String {
    match &event.challenge {
        Some(challenge) => format!(
            "New challenge solved by {}\nTitle: {} ({} points)\nCategory: {}\nDifficulty: {}",
            event.display_name,
            challenge.title,
            challenge.score,
            challenge.category,
            challenge.difficulty,
        ),
        None => format!(
            "New challenge solved by {}: challenge {}",
            event.display_name, event.challenge_id,
        ),
    }
}

/// Scoreboard of tracked users, ordered by display name.
pub fn scoreboard(roster: &Roster) -> String {
    let mut rows: Vec<(&str, &str)> = roster
        .profiles()
        .map(|profile| (profile.display_name.as_str(), profile.score.as_str()))
        .collect();
    rows.sort_by(|a, b| a.0.cmp(b.0));

    let mut out = String::from("Scoreboard\n");
    for (position, (name, score)) in rows.iter().enumerate() {
        let _ = writeln!(out, "{} - {} : {} points", position + 1, name, score);
    }
    out
}

/// Listing of tracked users as `name : id` lines.
pub fn registered_users(roster: &Roster) -> String {
    let mut out = String::from("Registered users\n");
    for profile in roster.profiles() {
        let _ = writeln!(out, "{} : {}", profile.display_name, profile.id);
    }
    out
}

/// Listing of search matches as `name : id` lines.
pub fn search_results(matches: &[UserSummary]) -> String {
    if matches.is_empty() {
        return "No user matches your search\n".to_string();
    }

    let mut out = String::from("Users matching your search\n");
    for user in matches {
        let _ = writeln!(out, "{} : {}", user.name, user.id);
    }
    out
}
