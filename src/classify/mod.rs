//! Version and phase classification.
//!
//! Issue metadata is free text, so assignment is heuristic and layered
//! (first match wins):
//! 1. Explicit per-issue override table
//! 2. Regex extraction over `title + description + notes`
//! 3. Fallback: the Backlog sentinel (versions) or the default phase
//!
//! Classification never fails and never drops an issue. Each `Classifier`
//! owns its lookup tables; there is no process-wide state.

use crate::error::SyncError;
use crate::model::Issue;
use regex::Regex;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Label used for issues with no resolvable version.
pub const BACKLOG_LABEL: &str = "Backlog";
/// Phase used when nothing in the issue text names one.
pub const DEFAULT_PHASE: &str = "Phase 1";
/// Sort key for phase labels without a number.
pub const UNNUMBERED_PHASE_KEY: u32 = 999;

const VERSION_PATTERNS: &[&str] = &[
    r"(?i)v(\d+\.\d+\.\d+)",
    r"(?i)version\s+(\d+\.\d+\.\d+)",
    r"(?i)v(\d+\.\d+)",
    r"(?i)version\s+(\d+\.\d+)",
];

const PHASE_PATTERNS: &[&str] = &[
    r"phase\s+(\d+)",
    r"Phase\s+(\d+)",
    r"phase\s+(\w+)",
    r"Phase\s+(\w+)",
];

/// How version sections are ordered (always newest first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionOrder {
    /// Descending string comparison.
    #[default]
    Lexical,
    /// Descending semantic-version comparison; unparsable labels go last.
    Semver,
}

impl VersionOrder {
    /// Compare two labels so that sorting with this comparator yields
    /// newest-first order.
    #[must_use]
    pub fn compare(self, a: &str, b: &str) -> Ordering {
        match self {
            Self::Lexical => b.cmp(a),
            Self::Semver => match (parse_version_label(a), parse_version_label(b)) {
                (Some(va), Some(vb)) => vb.cmp(&va).then_with(|| b.cmp(a)),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => b.cmp(a),
            },
        }
    }
}

impl fmt::Display for VersionOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lexical => write!(f, "lexical"),
            Self::Semver => write!(f, "semver"),
        }
    }
}

impl FromStr for VersionOrder {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "lexical" | "lex" | "string" => Ok(Self::Lexical),
            "semver" | "semantic" => Ok(Self::Semver),
            other => Err(SyncError::InvalidVersionOrder {
                value: other.to_string(),
            }),
        }
    }
}

fn parse_version_label(label: &str) -> Option<semver::Version> {
    let bare = label.trim().trim_start_matches(['v', 'V']);
    semver::Version::parse(bare)
        .ok()
        .or_else(|| semver::Version::parse(&format!("{bare}.0")).ok())
}

/// Tables that drive classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifierConfig {
    /// Issue ID -> version label, returned verbatim.
    pub version_overrides: BTreeMap<String, String>,
    /// Issue ID -> phase label, returned verbatim.
    pub phase_overrides: BTreeMap<String, String>,
    pub backlog_label: String,
    pub default_phase: String,
    pub version_order: VersionOrder,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            version_overrides: BTreeMap::new(),
            phase_overrides: BTreeMap::new(),
            backlog_label: BACKLOG_LABEL.to_string(),
            default_phase: DEFAULT_PHASE.to_string(),
            version_order: VersionOrder::default(),
        }
    }
}

/// Which rule produced a classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchSource {
    Override,
    Pattern,
    Fallback,
}

impl fmt::Display for MatchSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Override => write!(f, "override"),
            Self::Pattern => write!(f, "pattern"),
            Self::Fallback => write!(f, "fallback"),
        }
    }
}

/// Resolved version for one issue. `version` is `None` for Backlog issues.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionMatch {
    pub version: Option<String>,
    pub source: MatchSource,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhaseMatch {
    pub phase: String,
    pub source: MatchSource,
}

/// Issues grouped by resolved version.
#[derive(Debug, Clone, Default)]
pub struct VersionGroups<'a> {
    /// Issues with no resolved version, in input order.
    pub backlog: Vec<&'a Issue>,
    /// Version label -> issues, each group in input order.
    pub versions: BTreeMap<String, Vec<&'a Issue>>,
}

impl<'a> VersionGroups<'a> {
    /// Version groups newest first.
    #[must_use]
    pub fn ordered(&self, order: VersionOrder) -> Vec<(&str, &[&'a Issue])> {
        let mut groups: Vec<(&str, &[&'a Issue])> = self
            .versions
            .iter()
            .map(|(label, issues)| (label.as_str(), issues.as_slice()))
            .collect();
        groups.sort_by(|a, b| order.compare(a.0, b.0));
        groups
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.backlog.len() + self.versions.values().map(Vec::len).sum::<usize>()
    }
}

/// Issues sharing a phase label.
#[derive(Debug, Clone)]
pub struct PhaseGroup<'a> {
    pub label: String,
    pub issues: Vec<&'a Issue>,
}

/// Layered version/phase classifier.
#[derive(Debug, Clone)]
pub struct Classifier {
    config: ClassifierConfig,
    version_patterns: Vec<Regex>,
    phase_patterns: Vec<Regex>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(ClassifierConfig::default())
    }
}

impl Classifier {
    #[must_use]
    pub fn new(config: ClassifierConfig) -> Self {
        Self {
            config,
            version_patterns: compile(VERSION_PATTERNS),
            phase_patterns: compile(PHASE_PATTERNS),
        }
    }

    #[must_use]
    pub const fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    #[must_use]
    pub fn backlog_label(&self) -> &str {
        &self.config.backlog_label
    }

    #[must_use]
    pub const fn version_order(&self) -> VersionOrder {
        self.config.version_order
    }

    /// Resolve the version of an issue.
    #[must_use]
    pub fn classify_version(&self, issue: &Issue) -> VersionMatch {
        if let Some(version) = self.config.version_overrides.get(&issue.id) {
            let version = (version != &self.config.backlog_label).then(|| version.clone());
            return VersionMatch {
                version,
                source: MatchSource::Override,
            };
        }

        let text = issue.search_text();
        for pattern in &self.version_patterns {
            if let Some(caps) = pattern.captures(&text) {
                return VersionMatch {
                    version: Some(format!("v{}", &caps[1])),
                    source: MatchSource::Pattern,
                };
            }
        }

        VersionMatch {
            version: None,
            source: MatchSource::Fallback,
        }
    }

    /// Resolve the phase of an issue.
    #[must_use]
    pub fn classify_phase(&self, issue: &Issue) -> PhaseMatch {
        if let Some(phase) = self.config.phase_overrides.get(&issue.id) {
            return PhaseMatch {
                phase: phase.clone(),
                source: MatchSource::Override,
            };
        }

        let text = issue.search_text();
        for pattern in &self.phase_patterns {
            if let Some(caps) = pattern.captures(&text) {
                return PhaseMatch {
                    phase: format!("Phase {}", &caps[1]),
                    source: MatchSource::Pattern,
                };
            }
        }

        PhaseMatch {
            phase: self.config.default_phase.clone(),
            source: MatchSource::Fallback,
        }
    }

    /// Version label for display: the resolved version or the Backlog label.
    #[must_use]
    pub fn version_label(&self, issue: &Issue) -> String {
        self.classify_version(issue)
            .version
            .unwrap_or_else(|| self.config.backlog_label.clone())
    }

    /// Group issues by version. Every issue lands in exactly one group.
    #[must_use]
    pub fn group_by_version<'a, I>(&self, issues: I) -> VersionGroups<'a>
    where
        I: IntoIterator<Item = &'a Issue>,
    {
        let mut groups = VersionGroups::default();
        for issue in issues {
            match self.classify_version(issue).version {
                Some(version) => groups.versions.entry(version).or_default().push(issue),
                None => groups.backlog.push(issue),
            }
        }
        groups
    }

    /// Group issues by phase, ordered by [`phase_sort_key`] then label.
    #[must_use]
    pub fn group_by_phase<'a, I>(&self, issues: I) -> Vec<PhaseGroup<'a>>
    where
        I: IntoIterator<Item = &'a Issue>,
    {
        let mut by_label: BTreeMap<String, Vec<&'a Issue>> = BTreeMap::new();
        for issue in issues {
            by_label
                .entry(self.classify_phase(issue).phase)
                .or_default()
                .push(issue);
        }

        let mut groups: Vec<PhaseGroup<'a>> = by_label
            .into_iter()
            .map(|(label, issues)| PhaseGroup { label, issues })
            .collect();
        groups.sort_by(|a, b| {
            phase_sort_key(&a.label)
                .cmp(&phase_sort_key(&b.label))
                .then_with(|| a.label.cmp(&b.label))
        });
        groups
    }
}

/// Numeric sort key for a phase label: its first integer, or
/// [`UNNUMBERED_PHASE_KEY`] when there is none.
#[must_use]
pub fn phase_sort_key(label: &str) -> u32 {
    let digits: String = label
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().unwrap_or(UNNUMBERED_PHASE_KEY)
}

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|pattern| Regex::new(pattern).expect("built-in classifier pattern"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titled(id: &str, title: &str) -> Issue {
        Issue::new(id, title)
    }

    #[test]
    fn test_version_from_title() {
        let classifier = Classifier::default();
        let m = classifier.classify_version(&titled("a", "Implement v0.6.0 features"));
        assert_eq!(m.version.as_deref(), Some("v0.6.0"));
        assert_eq!(m.source, MatchSource::Pattern);
    }

    #[test]
    fn test_override_wins_over_pattern() {
        let mut config = ClassifierConfig::default();
        config
            .version_overrides
            .insert("a".to_string(), "v1.0.0".to_string());
        let classifier = Classifier::new(config);

        let m = classifier.classify_version(&titled("a", "Implement v0.6.0 features"));
        assert_eq!(m.version.as_deref(), Some("v1.0.0"));
        assert_eq!(m.source, MatchSource::Override);
    }

    #[test]
    fn test_override_to_backlog_label() {
        let mut config = ClassifierConfig::default();
        config
            .version_overrides
            .insert("a".to_string(), "Backlog".to_string());
        let classifier = Classifier::new(config);
        let m = classifier.classify_version(&titled("a", "Implement v0.6.0"));
        assert_eq!(m.version, None);
        assert_eq!(m.source, MatchSource::Override);
    }

    #[test]
    fn test_pattern_precedence() {
        let classifier = Classifier::default();
        // Three-part patterns are tried before two-part ones.
        let issue = titled("a", "Follow-up for version 1.2 and v1.2.3");
        assert_eq!(
            classifier.classify_version(&issue).version.as_deref(),
            Some("v1.2.3")
        );

        let issue = titled("b", "Targets version 2.4.1");
        assert_eq!(
            classifier.classify_version(&issue).version.as_deref(),
            Some("v2.4.1")
        );

        let issue = titled("c", "Ship in v3.1");
        assert_eq!(
            classifier.classify_version(&issue).version.as_deref(),
            Some("v3.1")
        );

        let issue = titled("d", "Planned for VERSION 4.2");
        assert_eq!(
            classifier.classify_version(&issue).version.as_deref(),
            Some("v4.2")
        );
    }

    #[test]
    fn test_version_case_insensitive() {
        let classifier = Classifier::default();
        let issue = titled("a", "Release V0.7.0");
        assert_eq!(
            classifier.classify_version(&issue).version.as_deref(),
            Some("v0.7.0")
        );
    }

    #[test]
    fn test_version_from_notes() {
        let classifier = Classifier::default();
        let mut issue = titled("a", "Refactor loader");
        issue.notes = "Slipped to v0.9.1".to_string();
        assert_eq!(
            classifier.classify_version(&issue).version.as_deref(),
            Some("v0.9.1")
        );
    }

    #[test]
    fn test_unversioned_falls_back() {
        let classifier = Classifier::default();
        let m = classifier.classify_version(&titled("a", "Test"));
        assert_eq!(m.version, None);
        assert_eq!(m.source, MatchSource::Fallback);
        assert_eq!(classifier.version_label(&titled("a", "Test")), "Backlog");
    }

    #[test]
    fn test_phase_patterns() {
        let classifier = Classifier::default();
        assert_eq!(
            classifier.classify_phase(&titled("a", "Wire up phase 3")).phase,
            "Phase 3"
        );
        assert_eq!(
            classifier.classify_phase(&titled("a", "Phase 2: storage")).phase,
            "Phase 2"
        );
        assert_eq!(
            classifier.classify_phase(&titled("a", "Phase beta hardening")).phase,
            "Phase beta"
        );
        let m = classifier.classify_phase(&titled("a", "No phase info"));
        assert_eq!(m.phase, "Phase info");

        let m = classifier.classify_phase(&titled("a", "Nothing here"));
        assert_eq!(m.phase, "Phase 1");
        assert_eq!(m.source, MatchSource::Fallback);
    }

    #[test]
    fn test_phase_override() {
        let mut config = ClassifierConfig::default();
        config
            .phase_overrides
            .insert("a".to_string(), "Phase 4".to_string());
        let classifier = Classifier::new(config);
        let m = classifier.classify_phase(&titled("a", "phase 2 work"));
        assert_eq!(m.phase, "Phase 4");
        assert_eq!(m.source, MatchSource::Override);
    }

    #[test]
    fn test_phase_sort_key() {
        assert_eq!(phase_sort_key("Phase 1"), 1);
        assert_eq!(phase_sort_key("Phase 12"), 12);
        assert_eq!(phase_sort_key("Phase 2b"), 2);
        assert_eq!(phase_sort_key("Phase beta"), UNNUMBERED_PHASE_KEY);
    }

    #[test]
    fn test_group_by_phase_numeric_order() {
        let classifier = Classifier::default();
        let issues = vec![
            titled("a", "phase 10 polish"),
            titled("b", "Phase beta"),
            titled("c", "phase 2 core"),
            titled("d", "unlabelled"),
        ];
        let groups = classifier.group_by_phase(&issues);
        let labels: Vec<&str> = groups.iter().map(|g| g.label.as_str()).collect();
        assert_eq!(labels, vec!["Phase 1", "Phase 2", "Phase 10", "Phase beta"]);
    }

    #[test]
    fn test_group_by_version_keeps_every_issue() {
        let classifier = Classifier::default();
        let issues = vec![
            titled("a", "v0.5.0 sync"),
            titled("b", "misc"),
            titled("c", "v0.6.0 ui"),
            titled("d", "more v0.5.0"),
        ];
        let groups = classifier.group_by_version(&issues);
        assert_eq!(groups.total(), 4);
        assert_eq!(groups.backlog.len(), 1);
        let v05: Vec<&str> = groups.versions["v0.5.0"].iter().map(|i| i.id.as_str()).collect();
        assert_eq!(v05, vec!["a", "d"]);

        let ordered: Vec<&str> = groups
            .ordered(VersionOrder::Lexical)
            .iter()
            .map(|(label, _)| *label)
            .collect();
        assert_eq!(ordered, vec!["v0.6.0", "v0.5.0"]);
    }

    #[test]
    fn test_version_order_lexical_vs_semver() {
        let mut labels = vec!["v0.9.0", "v0.10.0", "v1.2", "next"];
        labels.sort_by(|a, b| VersionOrder::Lexical.compare(a, b));
        assert_eq!(labels, vec!["v1.2", "v0.9.0", "v0.10.0", "next"]);

        labels.sort_by(|a, b| VersionOrder::Semver.compare(a, b));
        assert_eq!(labels, vec!["v1.2", "v0.10.0", "v0.9.0", "next"]);
    }

    #[test]
    fn test_version_order_from_str() {
        assert_eq!("semver".parse::<VersionOrder>().unwrap(), VersionOrder::Semver);
        assert_eq!(" Lexical ".parse::<VersionOrder>().unwrap(), VersionOrder::Lexical);
        assert!("newest".parse::<VersionOrder>().is_err());
    }
}
