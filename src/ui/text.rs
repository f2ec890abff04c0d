//! Display-width aware text helpers

use chrono::{DateTime, Utc};
use ratatui::text::{Line, Span};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Truncate `s` to at most `max` display columns, appending `suffix` when cut
pub fn truncate(s: &str, max: usize, suffix: &str) -> String {
    if s.width() <= max {
        return s.to_string();
    }
    let suffix_width = suffix.width();
    if max <= suffix_width {
        return take_width(s, max);
    }
    let mut out = take_width(s, max - suffix_width);
    out.push_str(suffix);
    out
}

fn take_width(s: &str, max: usize) -> String {
    let mut out = String::new();
    let mut used = 0;
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > max {
            break;
        }
        used += w;
        out.push(c);
    }
    out
}

/// Greedy word wrap to `width` display columns; long words are split
pub fn wrap(s: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in s.split_whitespace() {
        let sep = usize::from(!current.is_empty());
        if current.width() + sep + word.width() <= width {
            if sep == 1 {
                current.push(' ');
            }
            current.push_str(word);
            continue;
        }
        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        let mut rest = word;
        while rest.width() > width {
            let head = take_width(rest, width);
            if head.is_empty() {
                break;
            }
            rest = &rest[head.len()..];
            lines.push(head);
        }
        current.push_str(rest);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Wrap a styled line into rows of at most `width` display columns
///
/// Span styles carry over to every piece. Whitespace at a row break is
/// dropped; indentation on the first row is kept.
pub fn wrap_line(line: &Line<'static>, width: usize) -> Vec<Line<'static>> {
    let width = width.max(1);
    let mut rows: Vec<Vec<Span<'static>>> = Vec::new();
    let mut row: Vec<Span<'static>> = Vec::new();
    let mut used = 0;
    for span in &line.spans {
        for token in split_runs(&span.content) {
            let token_width = token.width();
            let blank = token.chars().all(char::is_whitespace);
            if used + token_width <= width {
                if !(blank && used == 0 && !rows.is_empty()) {
                    row.push(Span::styled(token.to_string(), span.style));
                    used += token_width;
                }
                continue;
            }
            if used > 0 {
                rows.push(std::mem::take(&mut row));
                used = 0;
            }
            if blank {
                continue;
            }
            let mut rest = token;
            while rest.width() > width {
                let head = take_width(rest, width);
                if head.is_empty() {
                    break;
                }
                rest = &rest[head.len()..];
                rows.push(vec![Span::styled(head, span.style)]);
            }
            if !rest.is_empty() {
                used = rest.width();
                row.push(Span::styled(rest.to_string(), span.style));
            }
        }
    }
    if !row.is_empty() || rows.is_empty() {
        rows.push(row);
    }
    rows.into_iter()
        .map(|spans| {
            let mut wrapped = Line::from(spans).style(line.style);
            wrapped.alignment = line.alignment;
            wrapped
        })
        .collect()
}

/// Alternating runs of whitespace and non-whitespace
fn split_runs(s: &str) -> Vec<&str> {
    let mut runs = Vec::new();
    let mut start = 0;
    let mut prev = None;
    for (idx, c) in s.char_indices() {
        let blank = c.is_whitespace();
        if prev.is_some_and(|p| p != blank) {
            runs.push(&s[start..idx]);
            start = idx;
        }
        prev = Some(blank);
    }
    if start < s.len() {
        runs.push(&s[start..]);
    }
    runs
}

/// Relative time like "5m ago"; "unknown" when absent
pub fn format_time_rel(t: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(t) = t else {
        return "unknown".to_string();
    };
    let delta = now - t;
    let minutes = delta.num_minutes();
    if minutes < 1 {
        return "now".to_string();
    }
    if minutes < 60 {
        return format!("{minutes}m ago");
    }
    let hours = delta.num_hours();
    if hours < 24 {
        return format!("{hours}h ago");
    }
    let days = delta.num_days();
    if days < 7 {
        format!("{days}d ago")
    } else if days < 30 {
        format!("{}w ago", days / 7)
    } else {
        format!("{}mo ago", days / 30)
    }
}
