//! Parser for bullet-formatted analysis text
//!
//! Each non-empty line becomes one [`InsightItem`] after leading bullet/number
//! markers and markdown emphasis/code markers are removed.

use serde::Serialize;

/// One parsed insight
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InsightItem {
    /// Text before the first `": "`, when present
    pub label: Option<String>,
    pub body: String,
    /// Full cleaned line
    pub text: String,
}

impl InsightItem {
    pub fn from_text(text: String) -> Self {
        match text.split_once(": ") {
            Some((label, body)) => Self {
                label: Some(label.to_string()),
                body: body.to_string(),
                text,
            },
            None => Self {
                label: None,
                body: text.clone(),
                text,
            },
        }
    }
}

fn is_marker(c: char) -> bool {
    c == '•' || c == '-' || c == '.' || c.is_ascii_digit()
}

/// Clean one raw line; empty result means the line carries no insight
pub fn clean_line(line: &str) -> String {
    let unmarked = line.trim_start().trim_start_matches(is_marker).trim_start();
    unmarked
        .chars()
        .filter(|c| *c != '*' && *c != '`')
        .collect::<String>()
        .trim()
        .to_string()
}

/// Parse analysis output into insight items, in order
///
/// The returned collection may be empty; callers decide whether that is a failure.
pub fn parse_insights(raw: &str) -> Vec<InsightItem> {
    raw.lines()
        .map(clean_line)
        .filter(|line| !line.is_empty())
        .map(InsightItem::from_text)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bullets_split_into_label_and_body() {
        let items = parse_insights("• Theme: You write often about work\n• Focus: balance");
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].label.as_deref(), Some("Theme"));
        assert_eq!(items[0].body, "You write often about work");
        assert_eq!(items[1].label.as_deref(), Some("Focus"));
        assert_eq!(items[1].body, "balance");
    }

    #[test]
    fn test_strips_numbers_dashes_and_markdown() {
        let raw = "1. **Rest**: sleep more\n- `Move` daily\n  2. *Read*";
        let texts: Vec<String> = parse_insights(raw).into_iter().map(|i| i.text).collect();
        assert_eq!(texts, vec!["Rest: sleep more", "Move daily", "Read"]);
    }

    #[test]
    fn test_empty_and_marker_only_lines_dropped() {
        assert!(parse_insights("").is_empty());
        assert!(parse_insights("\n\n•\n  -  \n**\n").is_empty());
    }

    #[test]
    fn test_label_splits_on_first_separator_only() {
        let item = InsightItem::from_text("Goal: run: a marathon".to_string());
        assert_eq!(item.label.as_deref(), Some("Goal"));
        assert_eq!(item.body, "run: a marathon");
    }

    #[test]
    fn test_line_without_separator_has_no_label() {
        let item = InsightItem::from_text("Keep going".to_string());
        assert_eq!(item.label, None);
        assert_eq!(item.body, "Keep going");
    }
}
