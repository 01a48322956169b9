//! Issue and ticket reference linking.
//!
//! Two independent passes run over every changelog line, in order:
//!
//! 1. Issue pass: every `ABC-123` token becomes `[ABC-123](<issue_url>BC-123)`.
//! 2. Ticket pass: a token standing alone between whitespace or line edges
//!    (bare, or already linked by the issue pass) is wrapped again as
//!    `[<token or link>](<ticket_url>BC-123)`.
//!
//! A token matched by both passes ends up as a nested link. The passes are
//! not idempotent: running them again wraps the links again.

use std::sync::LazyLock;

use regex_lite::{Captures, Regex};

use crate::config::LinkTargets;

static ISSUE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Z]+-[0-9]+").expect("issue pattern is valid"));

static LINK_TAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\]\([^()\s]*\)").expect("link tail pattern is valid"));

/// Decode raw bytes, dropping any invalid UTF-8 sequences.
pub fn sanitize(raw: &[u8]) -> String {
    let mut text = String::with_capacity(raw.len());
    for chunk in raw.utf8_chunks() {
        text.push_str(chunk.valid());
    }
    text
}

/// Apply the issue pass and then the ticket pass to one line.
pub fn rewrite_line(line: &str, links: &LinkTargets) -> String {
    let issues = link_issues(line, &links.issue_url);
    link_tickets(&issues, &links.issue_url, &links.ticket_url)
}

/// Link every issue-shaped token to the issue tracker.
pub fn link_issues(line: &str, issue_url: &str) -> String {
    ISSUE_RE
        .replace_all(line, |caps: &Captures| {
            let token = &caps[0];
            format!("[{}]({}{})", token, issue_url, suffix(token))
        })
        .into_owned()
}

/// Link whitespace-delimited tokens to the external ticket tracker.
///
/// A token already wrapped as a Markdown link (by the issue pass with
/// `issue_url`, or any `[TOKEN](target)` without spaces or parentheses in the
/// target) is wrapped as a whole.
pub fn link_tickets(line: &str, issue_url: &str, ticket_url: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut copied = 0;

    for token in ISSUE_RE.find_iter(line) {
        // Part of a link wrapped on an earlier iteration.
        if token.start() < copied {
            continue;
        }

        let (start, end) = match link_end(line, token.start(), token.end(), issue_url) {
            Some(end) => (token.start() - 1, end),
            None => (token.start(), token.end()),
        };

        let isolated = is_boundary(line[..start].chars().next_back())
            && is_boundary(line[end..].chars().next());
        if !isolated {
            continue;
        }

        out.push_str(&line[copied..start]);
        out.push_str(&format!(
            "[{}]({}{})",
            &line[start..end],
            ticket_url,
            suffix(token.as_str())
        ));
        copied = end;
    }

    out.push_str(&line[copied..]);
    out
}

/// End of the Markdown link around the token at `start..end`, if it is the
/// visible text of one.
fn link_end(line: &str, start: usize, end: usize, issue_url: &str) -> Option<usize> {
    if !line[..start].ends_with('[') {
        return None;
    }

    let token = &line[start..end];
    let issue_tail = format!("]({}{})", issue_url, suffix(token));
    if line[end..].starts_with(&issue_tail) {
        return Some(end + issue_tail.len());
    }

    LINK_TAIL_RE.find(&line[end..]).map(|m| end + m.end())
}

/// Line edges and Unicode whitespace delimit ticket tokens.
fn is_boundary(c: Option<char>) -> bool {
    c.is_none_or(char::is_whitespace)
}

/// Link target suffix: the token without its first character.
fn suffix(token: &str) -> &str {
    let mut chars = token.chars();
    chars.next();
    chars.as_str()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ISSUES: &str = "../../issues/";
    const TICKETS: &str = "https://tracker.example.com/browse/";

    fn targets() -> LinkTargets {
        LinkTargets {
            commit_url: "../../commit/".to_string(),
            issue_url: ISSUES.to_string(),
            ticket_url: TICKETS.to_string(),
        }
    }

    #[test]
    fn test_issue_link_drops_first_character() {
        assert_eq!(
            link_issues("fixes AB-123 today", ISSUES),
            "fixes [AB-123](../../issues/B-123) today"
        );
    }

    #[test]
    fn test_issue_link_inside_word() {
        assert_eq!(
            link_issues("refAB-1x", ISSUES),
            "ref[AB-1](../../issues/B-1)x"
        );
    }

    #[test]
    fn test_ticket_link_requires_isolation() {
        assert_eq!(
            link_tickets("see AB-123", ISSUES, TICKETS),
            "see [AB-123](https://tracker.example.com/browse/B-123)"
        );
        assert_eq!(link_tickets("see AB-123,", ISSUES, TICKETS), "see AB-123,");
        assert_eq!(link_tickets("see(AB-123)", ISSUES, TICKETS), "see(AB-123)");
    }

    #[test]
    fn test_ticket_link_at_line_start() {
        assert_eq!(
            link_tickets("AB-1 done", ISSUES, TICKETS),
            "[AB-1](https://tracker.example.com/browse/B-1) done"
        );
    }

    #[test]
    fn test_ticket_link_adjacent_tokens() {
        assert_eq!(
            link_tickets("AB-1 CD-2", ISSUES, TICKETS),
            "[AB-1](https://tracker.example.com/browse/B-1) [CD-2](https://tracker.example.com/browse/D-2)"
        );
    }

    #[test]
    fn test_rewrite_nests_issue_link_inside_ticket_link() {
        let line = rewrite_line("Fix AB-123 crash", &targets());
        assert_eq!(
            line,
            "Fix [[AB-123](../../issues/B-123)](https://tracker.example.com/browse/B-123) crash"
        );
    }

    #[test]
    fn test_rewrite_only_issue_when_not_isolated() {
        let line = rewrite_line("Fix (AB-123)", &targets());
        assert_eq!(line, "Fix ([AB-123](../../issues/B-123))");
    }

    #[test]
    fn test_rewrite_without_tokens_is_identity() {
        let line = " * 2024-01-02 [abc1234](../../commit/abc1234) - __(Jane)__ plain subject";
        assert_eq!(rewrite_line(line, &targets()), line);
    }

    #[test]
    fn test_lowercase_and_missing_digits_are_ignored() {
        let line = "ab-12 AB- -12 AB12";
        assert_eq!(rewrite_line(line, &targets()), line);
    }

    #[test]
    fn test_rewrite_is_not_idempotent() {
        let once = rewrite_line("AB-1", &targets());
        let twice = rewrite_line(&once, &targets());
        assert_ne!(once, twice);
    }

    #[test]
    fn test_sanitize_drops_invalid_bytes() {
        let raw = b"caf\xc3\xa9 \xff\xfeAB-1";
        assert_eq!(sanitize(raw), "café AB-1");
    }

    #[test]
    fn test_rewrite_after_sanitizing() {
        let line = rewrite_line(&sanitize(b"fix \xffAB-7"), &targets());
        assert_eq!(
            line,
            "fix [[AB-7](../../issues/B-7)](https://tracker.example.com/browse/B-7)"
        );
    }

    #[test]
    fn test_non_ascii_whitespace_delimits_on_both_sides() {
        assert_eq!(
            link_tickets("see\u{a0}AB-1\u{a0}now", ISSUES, TICKETS),
            "see\u{a0}[AB-1](https://tracker.example.com/browse/B-1)\u{a0}now"
        );
        assert_eq!(
            link_tickets("see\u{2003}AB-1", ISSUES, TICKETS),
            "see\u{2003}[AB-1](https://tracker.example.com/browse/B-1)"
        );
    }

    #[test]
    fn test_issue_url_with_spaces_and_parens_still_nests() {
        let links = LinkTargets {
            issue_url: "https://git.example.com/a (b)/".to_string(),
            ..targets()
        };
        assert_eq!(
            rewrite_line("Fix AB-1 now", &links),
            "Fix [[AB-1](https://git.example.com/a (b)/B-1)](https://tracker.example.com/browse/B-1) now"
        );
    }

    #[test]
    fn test_existing_markdown_link_is_wrapped_whole() {
        assert_eq!(
            link_tickets("see [AB-1](https://elsewhere.example.com/x) now", ISSUES, TICKETS),
            "see [[AB-1](https://elsewhere.example.com/x)](https://tracker.example.com/browse/B-1) now"
        );
    }
}
