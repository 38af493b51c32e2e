//! Plain-text rendering of users, tokens, token stats and scan summaries
//!
//! Everything here returns lines; commands decide where they go.

use diradmin_core::{lookup_scope, TokenStats};
use diradmin_domain::{DirectoryUser, OAuthToken, ScanOutcome, ScanReport};

pub const DISPLAY_WIDTH: usize = 80;
const TAB_WIDTH: usize = 4;
const TOKEN_COLUMN: usize = 40;

fn border() -> String {
    "-".repeat(DISPLAY_WIDTH)
}

fn separator() -> String {
    "-".repeat(DISPLAY_WIDTH / 2)
}

/// Expand tabs to the next multiple of [`TAB_WIDTH`].
fn expand_tabs(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut column = 0;
    for ch in text.chars() {
        match ch {
            '\t' => {
                let pad = TAB_WIDTH - column % TAB_WIDTH;
                out.extend(std::iter::repeat(' ').take(pad));
                column += pad;
            }
            '\n' => {
                out.push(ch);
                column = 0;
            }
            _ => {
                out.push(ch);
                column += 1;
            }
        }
    }
    out
}

fn report_line(text: &str, level: usize) -> String {
    expand_tabs(&format!("{}{text}", "\t".repeat(level)))
}

/// Greedy word wrap at [`DISPLAY_WIDTH`] with a three level indent.
fn wrap_indented(text: &str) -> Vec<String> {
    let indent = " ".repeat(3 * TAB_WIDTH);
    let mut lines = Vec::new();
    let mut current = indent.clone();
    for word in text.split_whitespace() {
        let fits = current.len() + 1 + word.len() <= DISPLAY_WIDTH;
        if current.len() > indent.len() && !fits {
            lines.push(std::mem::replace(&mut current, indent.clone()));
        }
        if current.len() > indent.len() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if current.len() > indent.len() {
        lines.push(current);
    }
    lines
}

/// Which parts of the token stats report to print.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportOptions {
    pub top_n: usize,
    pub long: bool,
    pub show_users: bool,
}

fn stats_section(
    title: &str,
    key_column: &str,
    stats: &TokenStats,
    options: ReportOptions,
    primary_label: impl Fn(&str) -> String,
    secondary_label: impl Fn(&str) -> String,
) -> Vec<String> {
    let mut lines = vec![String::new(), border(), title.to_string(), border()];
    lines.push(report_line(&format!("NUM_USERS\t{key_column}"), 1));

    for (primary, count) in stats.top_n(options.top_n) {
        lines.push(report_line(&format!("{count}:\t{}", primary_label(primary.as_str())), 1));
        if !options.long {
            continue;
        }
        for group in stats.groups(&primary) {
            let labels: Vec<String> =
                group.secondaries.iter().map(|s| secondary_label(s.as_str())).collect();
            let Some((first, rest)) = labels.split_first() else {
                continue;
            };
            lines.push(report_line(&format!("{:2}: {first}", group.users.len()), 2));
            lines.extend(rest.iter().map(|label| report_line(label, 3)));
            if options.show_users {
                lines.push(report_line(&separator(), 3));
                let users: Vec<&str> = group.users.iter().map(String::as_str).collect();
                lines.extend(wrap_indented(&users.join(", ")));
            }
        }
    }
    lines
}

/// Client ids ranked by the number of users that granted them a token.
pub fn client_report(stats: &TokenStats, options: ReportOptions) -> Vec<String> {
    stats_section(
        "MOST COMMON CLIENT IDs:",
        "CLIENT_ID",
        stats,
        options,
        str::to_string,
        lookup_scope,
    )
}

/// Scopes ranked by the number of users that granted them.
pub fn scope_report(stats: &TokenStats, options: ReportOptions) -> Vec<String> {
    stats_section("MOST COMMON SCOPES:", "SCOPE", stats, options, lookup_scope, str::to_string)
}

/// `(count, key)` rows of a ranking, for the CSV reports.
pub fn ranking_rows(stats: &TokenStats, top_n: usize) -> Vec<Vec<String>> {
    stats.top_n(top_n).into_iter().map(|(key, count)| vec![count.to_string(), key]).collect()
}

fn user_line(id: &str, email: &str, full_name: &str) -> String {
    format!("{id:<22} {email:<40} {full_name}").trim_end().to_string()
}

pub fn user_header() -> String {
    user_line("ID", "Email", "Full Name")
}

pub fn user_row(user: &DirectoryUser) -> String {
    user_line(user.id.as_deref().unwrap_or(""), &user.primary_email, user.full_name().unwrap_or(""))
}

/// Every field of `user` except the ones already on its row, sorted by name.
pub fn user_details(user: &DirectoryUser) -> Vec<String> {
    let Ok(serde_json::Value::Object(fields)) = serde_json::to_value(user) else {
        return Vec::new();
    };
    let mut names: Vec<&String> =
        fields.keys().filter(|k| !matches!(k.as_str(), "primaryEmail" | "id")).collect();
    names.sort();
    names
        .into_iter()
        .map(|name| {
            let value = match &fields[name.as_str()] {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            format!("    {name}: {value}")
        })
        .collect()
}

fn token_line(client_id: &str, display_text: Option<&str>) -> Vec<String> {
    let Some(display) = display_text.filter(|d| !d.is_empty()) else {
        return vec![client_id.to_string()];
    };
    if client_id.chars().count() <= TOKEN_COLUMN {
        return vec![format!("{client_id:<TOKEN_COLUMN$} {display}")];
    }
    let head: String = client_id.chars().take(TOKEN_COLUMN).collect();
    let tail: String = client_id.chars().skip(TOKEN_COLUMN).collect();
    vec![format!("{head} {display}"), format!("  {tail}")]
}

/// Token table: header, then one entry per token, scopes indented when `long`.
pub fn token_lines(tokens: &[OAuthToken], long: bool) -> Vec<String> {
    let mut lines = token_line("Client ID", Some("Display Text"));
    for token in tokens {
        lines.extend(token_line(&token.client_id, token.display_text.as_deref()));
        if long {
            let mut scopes: Vec<&String> = token.scopes.iter().collect();
            scopes.sort();
            lines.extend(scopes.into_iter().map(|scope| format!("    {}", lookup_scope(scope))));
        }
    }
    lines
}

/// One-line outcome of a batch run.
pub fn scan_summary(report: &ScanReport) -> String {
    let status = match &report.outcome {
        ScanOutcome::Completed => "completed".to_string(),
        ScanOutcome::Aborted { reason } => format!("aborted ({reason})"),
    };
    let resumed = if report.resumed { ", resumed" } else { "" };
    format!(
        "Scan {} {status}{resumed}: {} succeeded, {} failed, {} skipped \
         ({} results, {} failures recorded).",
        report.scan,
        report.succeeded,
        report.failed,
        report.skipped,
        report.total_results,
        report.total_failures
    )
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    fn users(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|n| format!("{n}@example.com")).collect()
    }

    fn sample_stats() -> TokenStats {
        let mut stats = TokenStats::default();
        stats.add("busy.example.net", "https://mail.google.com/", &users(&["a", "b"]));
        stats.add("busy.example.net", "custom-scope", &users(&["a", "b"]));
        stats.add("quiet.example.net", "custom-scope", &users(&["c"]));
        stats
    }

    #[test]
    fn tabs_expand_to_four_column_stops() {
        assert_eq!(expand_tabs("\t5:\tx"), "    5:  x");
        assert_eq!(expand_tabs("\t12:\tx"), "    12: x");
    }

    #[test]
    fn client_report_ranks_by_user_count() {
        let lines = client_report(&sample_stats(), ReportOptions::default());
        assert_eq!(lines[0], "");
        assert_eq!(lines[1], "-".repeat(80));
        assert_eq!(lines[2], "MOST COMMON CLIENT IDs:");
        assert_eq!(lines[4], "    NUM_USERS   CLIENT_ID");
        assert_eq!(lines[5], "    2:  busy.example.net");
        assert_eq!(lines[6], "    1:  quiet.example.net");
        assert_eq!(lines.len(), 7);
    }

    #[test]
    fn long_report_lists_groups_and_users() {
        let options = ReportOptions { top_n: 1, long: true, show_users: true };
        let lines = client_report(&sample_stats(), options);

        assert_eq!(lines[5], "    2:  busy.example.net");
        // one group: both scopes share the same two users
        assert!(lines[6].starts_with("         2: "));
        assert_eq!(lines[7], format!("            {}", lookup_scope("https://mail.google.com/")));
        assert_eq!(lines[8], format!("            {}", "-".repeat(40)));
        assert_eq!(lines[9], "            a@example.com, b@example.com");
        assert_eq!(lines.len(), 10);
    }

    /// Scope as primary, client as secondary.
    fn scope_stats() -> TokenStats {
        let mut stats = TokenStats::default();
        stats.add("https://mail.google.com/", "busy.example.net", &users(&["a", "b"]));
        stats.add("custom-scope", "busy.example.net", &users(&["a", "b"]));
        stats.add("custom-scope", "quiet.example.net", &users(&["c"]));
        stats
    }

    #[test]
    fn scope_report_labels_the_primary() {
        let options = ReportOptions { top_n: 0, long: true, show_users: false };
        let lines = scope_report(&scope_stats(), options);

        assert_eq!(lines[2], "MOST COMMON SCOPES:");
        assert_eq!(lines[4], "    NUM_USERS   SCOPE");
        assert_eq!(lines[5], "    3:  custom-scope");
        let mail = lines.iter().position(|l| l.contains(&lookup_scope("https://mail.google.com/")));
        let mail = mail.expect("mail scope is ranked");
        assert!(lines[mail].starts_with("    2:  "));
        // secondaries stay raw client ids
        assert_eq!(lines[mail + 1], "         2: busy.example.net");
    }

    #[test]
    fn ranking_rows_put_the_count_first() {
        let rows = ranking_rows(&sample_stats(), 0);
        assert_eq!(rows[0], vec!["2".to_string(), "busy.example.net".to_string()]);
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn long_user_lists_wrap_at_display_width() {
        let text =
            (0..20).map(|i| format!("user{i:02}@example.com")).collect::<Vec<_>>().join(", ");
        let lines = wrap_indented(&text);
        assert!(lines.len() > 1);
        assert!(lines.iter().all(|l| l.len() <= DISPLAY_WIDTH && l.starts_with("            ")));
    }

    #[test]
    fn long_client_ids_continue_on_the_next_line() {
        let id = format!("{}.apps.googleusercontent.com", "1".repeat(30));
        let lines = token_line(&id, Some("Some App"));
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with(" Some App"));
        assert_eq!(lines[1], format!("  {}", &id[40..]));
        assert_eq!(token_line("plain.com", None), vec!["plain.com".to_string()]);
    }

    #[test]
    fn user_rows_are_column_aligned() {
        let header = user_header();
        assert!(header.starts_with("ID "));
        assert_eq!(header.find("Email"), Some(23));
        assert_eq!(header.find("Full Name"), Some(64));
    }
}
