//! Ignore rule compilation from the root `.gitignore`.

use std::fs;
use std::path::Path;

use crate::matcher;

/// Name of the single rules file read from the scanned root
pub const RULES_FILE: &str = ".gitignore";

/// Characters stripped from both ends of a rule line
const LINE_PADDING: &[char] = &[' ', '\t', '\r', '\n'];

/// One compiled ignore directive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    /// Pattern split on `/`, never empty
    segments: Vec<String>,
    /// Re-includes a path an earlier rule excluded (`!pattern`)
    negated: bool,
    /// Only matches directories (`pattern/`)
    dir_only: bool,
    /// Must match from the root (`/pattern`)
    anchored: bool,
}

impl Rule {
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn negated(&self) -> bool {
        self.negated
    }

    pub fn dir_only(&self) -> bool {
        self.dir_only
    }

    pub fn anchored(&self) -> bool {
        self.anchored
    }

    /// Parse a single rules-file line. Returns `None` for blank lines,
    /// comments, a bare `!`, and patterns that reduce to nothing.
    pub fn parse(line: &str) -> Option<Self> {
        let mut line = line.trim_matches(LINE_PADDING);

        if line.is_empty() || line.starts_with('#') {
            return None;
        }

        let mut negated = false;
        if let Some(rest) = line.strip_prefix('!') {
            negated = true;
            line = rest.trim_matches(LINE_PADDING);
            if line.is_empty() {
                return None;
            }
        }

        let mut dir_only = false;
        if let Some(rest) = line.strip_suffix('/') {
            dir_only = true;
            line = rest;
        }

        let mut anchored = false;
        if line.starts_with('/') {
            anchored = true;
            line = line.trim_start_matches('/');
        }

        let pattern = line.replace('\\', "/");

        // A bare double-star denotes everything below, files included
        if pattern == "**" {
            dir_only = false;
        }

        // Lines that were only slashes carry no pattern
        if pattern.is_empty() {
            return None;
        }

        Some(Rule {
            segments: pattern.split('/').map(str::to_string).collect(),
            negated,
            dir_only,
            anchored,
        })
    }
}

/// Ordered rule list. Later rules take precedence over earlier ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.rules.iter()
    }

    /// Check whether `relative_path` (`/`-separated, relative to the root)
    /// is excluded by this rule set.
    pub fn is_ignored(&self, relative_path: &str, is_dir: bool) -> bool {
        matcher::is_ignored(self, relative_path, is_dir)
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

impl FromIterator<Rule> for RuleSet {
    fn from_iter<I: IntoIterator<Item = Rule>>(iter: I) -> Self {
        RuleSet {
            rules: iter.into_iter().collect(),
        }
    }
}

/// Compile rules-file contents into a rule set.
///
/// Never fails: unusable lines are skipped. `str::lines` already strips the
/// `\r` of CRLF endings, and `Rule::parse` trims whatever is left.
pub fn compile(contents: &str) -> RuleSet {
    contents.lines().filter_map(Rule::parse).collect()
}

/// Load and compile `<root>/.gitignore`.
///
/// A missing or non-regular rules file means nothing is ignored. Read errors
/// are logged and treated the same way.
pub fn load_rules(root: &Path) -> RuleSet {
    let path = root.join(RULES_FILE);

    match fs::metadata(&path) {
        Ok(meta) if meta.is_file() => {}
        _ => {
            tracing::debug!(path = %path.display(), "no rules file, nothing ignored");
            return RuleSet::new();
        }
    }

    match fs::read(&path) {
        Ok(bytes) => {
            let rules = compile(&String::from_utf8_lossy(&bytes));
            tracing::debug!(path = %path.display(), rules = rules.len(), "loaded ignore rules");
            rules
        }
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "could not read rules file");
            RuleSet::new()
        }
    }
}
