//! Gitignore-style matching of compiled rules against relative paths.
//!
//! Paths are `/`-separated and relative to the scanned root. Supported
//! syntax is `*` and `?` inside a segment plus `**` as a whole segment.
//! Character classes and backslash escapes are not supported; `[`, `]` and
//! `\` are ordinary characters.

use crate::patterns::{Rule, RuleSet};

/// Decide whether a path is ignored. The last matching rule wins.
pub fn is_ignored(rules: &RuleSet, relative_path: &str, is_dir: bool) -> bool {
    let mut ignored = false;

    for rule in rules {
        if rule_matches(rule, relative_path, is_dir) {
            ignored = !rule.negated();
        }
    }

    ignored
}

/// Check a single rule against a path, ignoring its negation flag.
pub fn rule_matches(rule: &Rule, relative_path: &str, is_dir: bool) -> bool {
    if rule.dir_only() && !is_dir {
        return false;
    }

    let mut path = relative_path;
    if !rule.dir_only() {
        if let Some(stripped) = path.strip_suffix('/') {
            path = stripped;
        }
    }

    if rule.anchored() {
        return match_path(rule.segments(), path);
    }

    if match_path(rule.segments(), path) {
        return true;
    }

    // Unanchored rules may start at any directory boundary
    path.match_indices('/')
        .map(|(i, _)| &path[i + 1..])
        .filter(|suffix| !suffix.is_empty())
        .any(|suffix| match_path(rule.segments(), suffix))
}

fn match_path(pattern: &[String], path: &str) -> bool {
    let segments: Vec<&str> = path.split('/').collect();
    match_segments(pattern, &segments)
}

/// Match pattern tokens against path segments, where a `**` token absorbs
/// zero or more whole segments.
///
/// Bottom-up over pattern indices: `next[si]` holds whether
/// `pattern[pi + 1..]` matches `path[si..]`, so the whole table costs
/// `O(pattern.len() * path.len())` and never recurses.
pub fn match_segments(pattern: &[String], path: &[&str]) -> bool {
    let n = path.len();

    // Empty pattern only matches an empty path
    let mut next = vec![false; n + 1];
    next[n] = true;

    for token in pattern.iter().rev() {
        let mut cur = vec![false; n + 1];

        if token == "**" {
            cur[n] = next[n];
            for si in (0..n).rev() {
                cur[si] = next[si] || cur[si + 1];
            }
        } else {
            for si in 0..n {
                cur[si] = next[si + 1] && match_segment(token, path[si]);
            }
        }

        next = cur;
    }

    next[0]
}

/// Glob match within a single path segment.
///
/// `*` matches any run of characters (including none) and `?` exactly one
/// character. Uses the usual backtrack-to-last-star scan.
pub fn match_segment(pattern: &str, text: &str) -> bool {
    let pat: Vec<char> = pattern.chars().collect();
    let txt: Vec<char> = text.chars().collect();

    let (mut pi, mut ti) = (0, 0);
    let mut star: Option<(usize, usize)> = None;

    while ti < txt.len() {
        if pi < pat.len() && (pat[pi] == '?' || pat[pi] == txt[ti]) {
            pi += 1;
            ti += 1;
        } else if pi < pat.len() && pat[pi] == '*' {
            pi += 1;
            star = Some((pi, ti));
        } else if let Some((star_pi, star_ti)) = star {
            pi = star_pi;
            ti = star_ti + 1;
            star = Some((star_pi, ti));
        } else {
            return false;
        }
    }

    while pi < pat.len() && pat[pi] == '*' {
        pi += 1;
    }

    pi == pat.len()
}
