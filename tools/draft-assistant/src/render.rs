//! Text rendering for the session
//!
//! Every function builds a `String`; printing is left to the session loop.
//! Cells are padded before they are colored so ANSI codes never skew columns.

use colored::*;
use player_registry::{BoardSummary, RankedPlayer};
use ranking_store::ConsensusRow;
use std::fmt::Write;

use crate::app::RefreshReport;
use crate::config::UserProfile;

const NAME_WIDTH: usize = 26;

/// Positions called out in the board summary line
const SUMMARY_POSITIONS: [&str; 4] = ["QB", "RB", "WR", "TE"];

fn stat(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.1}")).unwrap_or_else(|| "-".to_string())
}

fn whole(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.0}")).unwrap_or_else(|| "-".to_string())
}

fn ecr_vs_adp(value: Option<i32>) -> String {
    match value {
        Some(v) if v > 0 => format!("+{v}"),
        Some(v) => v.to_string(),
        None => "-".to_string(),
    }
}

fn truncate(name: &str, width: usize) -> String {
    if name.chars().count() <= width {
        name.to_string()
    } else {
        let mut short: String = name.chars().take(width - 1).collect();
        short.push('…');
        short
    }
}

/// The ranking board; drafted rows are struck through in red
pub fn board(rows: &[&RankedPlayer]) -> String {
    if rows.is_empty() {
        return "No players match.".yellow().to_string();
    }

    let mut out = String::new();
    let header = format!(
        "{:>4} {:>4}  {:<NAME_WIDTH$} {:<4} {:<5} {:>3} {:>4} {:>5} {:>6} {:>5} {:>5}  {}",
        "RK", "TIER", "PLAYER", "TEAM", "POS", "AGE", "BEST", "WORST", "AVG", "STD", "ECR", "STATUS"
    );
    let _ = writeln!(out, "{}", header.bold());

    for player in rows {
        let line = format!(
            "{:>4} {:>4}  {:<NAME_WIDTH$} {:<4} {:<5} {:>3} {:>4} {:>5} {:>6} {:>5} {:>5}",
            player.rank,
            player.tier,
            truncate(&player.name, NAME_WIDTH),
            player.team,
            player.position,
            whole(player.age),
            whole(player.best),
            whole(player.worst),
            stat(player.average),
            stat(player.std_dev),
            ecr_vs_adp(player.ecr_vs_adp),
        );
        if player.drafted {
            let _ = writeln!(out, "{}  {}", line.red().strikethrough(), "DRAFTED".red().bold());
        } else {
            let _ = writeln!(out, "{}  {}", line, "available".green());
        }
    }

    out
}

/// Counts line shown above the board
pub fn summary(summary: &BoardSummary) -> String {
    let positions: Vec<String> = SUMMARY_POSITIONS
        .iter()
        .map(|pos| format!("{} {}", pos, summary.position_count(pos)))
        .collect();

    format!(
        "📊 {} shown | {} available | {} drafted | {}",
        summary.total,
        summary.available.to_string().green(),
        summary.drafted.to_string().red(),
        positions.join(" · ")
    )
}

/// The active member's list, numbered from 1
pub fn my_rankings(label: &str, rows: &[&RankedPlayer]) -> String {
    let mut out = format!("{}\n", format!("📝 {label}'s rankings").cyan().bold());
    if rows.is_empty() {
        out.push_str("  (empty) add players with 'add <player>'\n");
        return out;
    }

    for (index, player) in rows.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>3}. {:<NAME_WIDTH$} {:<4} {:<5} board #{}",
            index + 1,
            truncate(&player.name, NAME_WIDTH),
            player.team,
            player.position,
            player.rank
        );
    }
    out
}

/// Consensus table with each member's position for the player
pub fn consensus(rows: &[ConsensusRow], users: &[UserProfile]) -> String {
    let mut out = format!("{}\n", "🤝 Team consensus".cyan().bold());
    if rows.is_empty() {
        out.push_str("  Nobody has ranked an available player yet.\n");
        return out;
    }

    let mut header = format!("{:>3}  {:<NAME_WIDTH$} {:>6} {:>6}", "#", "PLAYER", "AVG", "VOTES");
    for user in users {
        let _ = write!(header, " {:>9}", truncate(&user.key, 9));
    }
    let _ = writeln!(out, "{}", header.bold());

    for (index, row) in rows.iter().enumerate() {
        let _ = write!(
            out,
            "{:>3}  {:<NAME_WIDTH$} {:>6.2} {:>6}",
            index + 1,
            truncate(&row.name, NAME_WIDTH),
            row.average_rank,
            row.voters()
        );
        for user in users {
            let cell = row
                .ranks
                .iter()
                .find(|r| r.user == user.key)
                .map(|r| r.rank.to_string())
                .unwrap_or_else(|| "-".to_string());
            let _ = write!(out, " {cell:>9}");
        }
        out.push('\n');
    }
    out
}

pub fn users(users: &[UserProfile], active: &str) -> String {
    let mut out = String::new();
    for user in users {
        if user.key == active {
            let _ = writeln!(out, "{}", format!("▶ {} ({})", user.label, user.key).green().bold());
        } else {
            let _ = writeln!(out, "  {} ({})", user.label, user.key);
        }
    }
    out
}

/// One refresh outcome, including how every board row was matched
pub fn refresh_report(report: &RefreshReport) -> String {
    let s = &report.summary;
    format!(
        "🔄 Refreshed at {} | {} picks, {} players drafted ({} on this board)\n   \
         matched {} (exact {}, alias {}, suffix {}, override {}), unmatched {}",
        report.refreshed_at.format("%H:%M:%S"),
        report.pick_count,
        report.drafted_ids,
        s.drafted.to_string().red(),
        s.matched(),
        s.exact,
        s.alias,
        s.suffix,
        s.overrides,
        s.unmatched
    )
}

/// Identity, storage and the last refresh
pub fn status(label: &str, storage: &str, draft_id: &str, last: Option<&RefreshReport>) -> String {
    let refreshed = match last {
        Some(report) => report.refreshed_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => "never".yellow().to_string(),
    };
    format!(
        "👤 {}\n💾 {}\n🏈 draft {}\n🕒 last refresh: {}",
        label.cyan().bold(),
        storage,
        draft_id,
        refreshed
    )
}
