//! Configuration management for `cody_sync`.
//!
//! Configuration sources and precedence (highest wins):
//! 1. CLI overrides
//! 2. Environment variables (`CODY_SYNC_*`)
//! 3. Project config (`<root>/.beads/cody-sync.yaml`)
//! 4. User config (`~/.config/cody-sync/config.yaml`)
//! 5. Defaults
//!
//! YAML nesting flattens to dotted keys, so
//!
//! ```yaml
//! build-root: .cody/project/build
//! version-overrides:
//!   owk-56u: v0.5.0
//! ```
//!
//! yields `build-root` and `version-overrides.owk-56u`.
//!
//! Keys are canonicalized on insert: `build_root`, `BUILD-ROOT` and
//! `build.root` are one key, so a higher layer always replaces a lower one
//! regardless of spelling. Override ids under a section keep their case.

use crate::classify::{Classifier, ClassifierConfig, VersionOrder};
use crate::error::{Result, SyncError};
use crate::sync::SyncConfig;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable prefix for config keys.
pub const ENV_PREFIX: &str = "CODY_SYNC_";
/// Project config file, relative to the project root.
pub const PROJECT_CONFIG_PATH: &str = ".beads/cody-sync.yaml";
/// Default issue store, relative to the project root.
pub const DEFAULT_ISSUES_PATH: &str = ".beads/issues.jsonl";
/// Default build-output root, relative to the project root.
pub const DEFAULT_BUILD_ROOT: &str = ".cody/project/build";
pub const DEFAULT_BACKLOG_FILE: &str = "feature-backlog.md";
pub const DEFAULT_TASKLIST_FILE: &str = "tasklist.md";

const VERSION_OVERRIDES: &str = "version-overrides";
const PHASE_OVERRIDES: &str = "phase-overrides";
const SECTIONS: &[&str] = &[VERSION_OVERRIDES, PHASE_OVERRIDES];

/// Alternate spellings folded into their canonical key.
const KEY_ALIASES: &[(&str, &str)] = &[
    ("issues", "issues-path"),
    ("jsonl", "issues-path"),
    ("build-dir", "build-root"),
    ("include-closed", "tasklist-include-closed"),
];

/// Directories that mark a project root during discovery.
const ROOT_MARKERS: &[&str] = &[".beads", ".cody"];

/// A flat configuration layer (dotted key -> value).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigLayer {
    pub values: HashMap<String, String>,
}

impl ConfigLayer {
    /// Set `key` under its canonical spelling, replacing any earlier value.
    pub fn insert(&mut self, key: &str, value: impl Into<String>) {
        self.values.insert(canonical_key(key), value.into());
    }

    /// Merge another layer on top of this one (higher precedence wins).
    pub fn merge_from(&mut self, other: &Self) {
        for (key, value) in &other.values {
            self.insert(key, value.clone());
        }
    }

    /// Merge multiple layers in precedence order (lowest to highest).
    #[must_use]
    pub fn merge_layers(layers: &[Self]) -> Self {
        let mut merged = Self::default();
        for layer in layers {
            merged.merge_from(layer);
        }
        merged
    }

    /// Build a layer from a YAML file path. Missing files return empty config.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn from_yaml(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Build a layer from YAML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid YAML.
    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        let value: serde_yaml::Value = serde_yaml::from_str(contents)?;
        Ok(layer_from_yaml_value(&value))
    }

    /// Build a layer from `CODY_SYNC_*` environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_vars(env::vars())
    }

    fn from_vars<I>(vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut layer = Self::default();
        for (key, value) in vars {
            if let Some(stripped) = key.strip_prefix(ENV_PREFIX) {
                layer.insert(stripped, value);
            }
        }
        layer
    }

    /// Value for `key` under any spelling or alias.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&String> {
        self.values.get(&canonical_key(key))
    }

    /// Entries under `section.` with the remainder kept verbatim.
    ///
    /// Only the section name is normalized; issue IDs are case-sensitive.
    #[must_use]
    pub fn section(&self, section: &str) -> BTreeMap<String, String> {
        let wanted = normalize_key(section);
        self.values
            .iter()
            .filter_map(|(key, value)| {
                let (head, rest) = key.split_once('.')?;
                (normalize_key(head) == wanted && !rest.is_empty())
                    .then(|| (rest.to_string(), value.trim().to_string()))
            })
            .filter(|(_, value)| !value.is_empty())
            .collect()
    }
}

/// CLI overrides for config loading (optional).
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub root: Option<PathBuf>,
    pub issues: Option<PathBuf>,
    pub build_root: Option<PathBuf>,
    pub include_closed: Option<bool>,
    pub version_order: Option<String>,
}

impl CliOverrides {
    #[must_use]
    pub fn as_layer(&self) -> ConfigLayer {
        let mut layer = ConfigLayer::default();

        if let Some(path) = &self.issues {
            layer.insert("issues-path", path.to_string_lossy());
        }
        if let Some(path) = &self.build_root {
            layer.insert("build-root", path.to_string_lossy());
        }
        if let Some(include) = self.include_closed {
            layer.insert("tasklist.include-closed", include.to_string());
        }
        if let Some(order) = &self.version_order {
            layer.insert("version-order", order.as_str());
        }

        layer
    }
}

/// Fully resolved settings for one invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Settings {
    pub root: PathBuf,
    pub issues_path: PathBuf,
    pub build_root: PathBuf,
    pub backlog_file: String,
    pub tasklist_file: String,
    pub include_closed_in_tasklists: bool,
    pub backlog_label: String,
    pub default_phase: String,
    pub version_order: VersionOrder,
    pub version_overrides: BTreeMap<String, String>,
    pub phase_overrides: BTreeMap<String, String>,
}

impl Settings {
    /// Resolve typed settings from a merged layer.
    ///
    /// Relative paths are resolved against `root`.
    ///
    /// # Errors
    ///
    /// Returns an error if a value cannot be parsed.
    pub fn from_layer(root: &Path, layer: &ConfigLayer) -> Result<Self> {
        let issues_path = resolve_path(root, layer.get("issues-path"), DEFAULT_ISSUES_PATH);
        let build_root = resolve_path(root, layer.get("build-root"), DEFAULT_BUILD_ROOT);

        let include_closed_in_tasklists = match layer.get("tasklist.include-closed") {
            Some(value) => parse_bool(value).ok_or_else(|| {
                SyncError::Config(format!(
                    "tasklist.include-closed must be a boolean, got '{value}'"
                ))
            })?,
            None => false,
        };

        let version_order = layer
            .get("version-order")
            .map_or_else(|| Ok(VersionOrder::default()), |value| value.parse())?;

        let defaults = ClassifierConfig::default();

        Ok(Self {
            root: root.to_path_buf(),
            issues_path,
            build_root,
            backlog_file: non_empty(layer.get("backlog-file"), DEFAULT_BACKLOG_FILE),
            tasklist_file: non_empty(layer.get("tasklist-file"), DEFAULT_TASKLIST_FILE),
            include_closed_in_tasklists,
            backlog_label: non_empty(layer.get("backlog-label"), &defaults.backlog_label),
            default_phase: non_empty(layer.get("default-phase"), &defaults.default_phase),
            version_order,
            version_overrides: layer.section(VERSION_OVERRIDES),
            phase_overrides: layer.section(PHASE_OVERRIDES),
        })
    }

    #[must_use]
    pub fn classifier_config(&self) -> ClassifierConfig {
        ClassifierConfig {
            version_overrides: self.version_overrides.clone(),
            phase_overrides: self.phase_overrides.clone(),
            backlog_label: self.backlog_label.clone(),
            default_phase: self.default_phase.clone(),
            version_order: self.version_order,
        }
    }

    #[must_use]
    pub fn classifier(&self) -> Classifier {
        Classifier::new(self.classifier_config())
    }

    #[must_use]
    pub fn sync_config(&self, dry_run: bool) -> SyncConfig {
        SyncConfig {
            issues_path: self.issues_path.clone(),
            build_root: self.build_root.clone(),
            backlog_file: self.backlog_file.clone(),
            tasklist_file: self.tasklist_file.clone(),
            include_closed_in_tasklists: self.include_closed_in_tasklists,
            dry_run,
        }
    }
}

/// Discover the project root.
///
/// Honors `CODY_SYNC_ROOT` when set, otherwise walks up from `start` (or the
/// CWD) looking for a `.beads` or `.cody` directory. Falls back to the
/// starting directory when nothing is found.
///
/// # Errors
///
/// Returns an error if the CWD cannot be read.
pub fn discover_project_root(start: Option<&Path>) -> Result<PathBuf> {
    if let Ok(value) = env::var(format!("{ENV_PREFIX}ROOT")) {
        if !value.trim().is_empty() {
            let path = PathBuf::from(value);
            if path.is_dir() {
                return Ok(path);
            }
        }
    }

    let origin = match start {
        Some(path) => path.to_path_buf(),
        None => env::current_dir()?,
    };

    let mut current = origin.clone();
    loop {
        if ROOT_MARKERS
            .iter()
            .any(|marker| current.join(marker).is_dir())
        {
            return Ok(current);
        }

        if !current.pop() {
            break;
        }
    }

    Ok(origin)
}

/// Load project config (`<root>/.beads/cody-sync.yaml`).
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_project_config(root: &Path) -> Result<ConfigLayer> {
    ConfigLayer::from_yaml(&root.join(PROJECT_CONFIG_PATH))
}

/// Load user config (`~/.config/cody-sync/config.yaml`).
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_user_config() -> Result<ConfigLayer> {
    let Ok(home) = env::var("HOME") else {
        return Ok(ConfigLayer::default());
    };
    let path = Path::new(&home)
        .join(".config")
        .join("cody-sync")
        .join("config.yaml");
    ConfigLayer::from_yaml(&path)
}

/// Default config layer (lowest precedence).
#[must_use]
pub fn default_config_layer() -> ConfigLayer {
    let mut layer = ConfigLayer::default();
    layer.insert("issues-path", DEFAULT_ISSUES_PATH);
    layer.insert("build-root", DEFAULT_BUILD_ROOT);
    layer
}

/// Load configuration with the standard precedence order.
///
/// # Errors
///
/// Returns an error if any config file cannot be read or parsed.
pub fn load_config(root: &Path, cli: &CliOverrides) -> Result<ConfigLayer> {
    Ok(ConfigLayer::merge_layers(&[
        default_config_layer(),
        load_user_config()?,
        load_project_config(root)?,
        ConfigLayer::from_env(),
        cli.as_layer(),
    ]))
}

/// Discover the root, merge every layer, and resolve typed settings.
///
/// # Errors
///
/// Returns an error if discovery fails, a config file is invalid, or a value
/// cannot be parsed.
pub fn load_settings(cli: &CliOverrides) -> Result<Settings> {
    let root = match &cli.root {
        Some(root) => root.clone(),
        None => discover_project_root(None)?,
    };
    let layer = load_config(&root, cli)?;
    Settings::from_layer(&root, &layer)
}

fn resolve_path(root: &Path, value: Option<&String>, default: &str) -> PathBuf {
    let raw = value
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .unwrap_or(default);
    let path = PathBuf::from(raw);
    if path.is_absolute() {
        path
    } else {
        root.join(path)
    }
}

fn non_empty(value: Option<&String>, default: &str) -> String {
    value
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .unwrap_or(default)
        .to_string()
}

fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase().replace(['_', '.'], "-")
}

/// One spelling per setting. Section entries keep their id verbatim.
fn canonical_key(key: &str) -> String {
    if let Some((head, rest)) = key.split_once('.') {
        let head = normalize_key(head);
        if SECTIONS.contains(&head.as_str()) {
            return format!("{head}.{}", rest.trim());
        }
    }

    let normalized = normalize_key(key);
    KEY_ALIASES
        .iter()
        .find(|(alias, _)| *alias == normalized)
        .map_or(normalized, |(_, canonical)| (*canonical).to_string())
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "on" => Some(true),
        "0" | "false" | "no" | "n" | "off" => Some(false),
        _ => None,
    }
}

fn layer_from_yaml_value(value: &serde_yaml::Value) -> ConfigLayer {
    let mut flat = HashMap::new();
    flatten_yaml(value, "", &mut flat);
    let mut layer = ConfigLayer::default();
    for (key, value) in flat {
        layer.insert(&key, value);
    }
    layer
}

fn flatten_yaml(value: &serde_yaml::Value, prefix: &str, out: &mut HashMap<String, String>) {
    match value {
        serde_yaml::Value::Mapping(map) => {
            for (key, value) in map {
                let Some(key_str) = yaml_scalar_to_string(key) else {
                    continue;
                };
                let next_prefix = if prefix.is_empty() {
                    key_str
                } else {
                    format!("{prefix}.{key_str}")
                };
                flatten_yaml(value, &next_prefix, out);
            }
        }
        serde_yaml::Value::Sequence(values) => {
            let joined = values
                .iter()
                .filter_map(yaml_scalar_to_string)
                .collect::<Vec<_>>()
                .join(",");
            out.insert(prefix.to_string(), joined);
        }
        _ => {
            if let Some(value) = yaml_scalar_to_string(value) {
                out.insert(prefix.to_string(), value);
            }
        }
    }
}

fn yaml_scalar_to_string(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::Bool(v) => Some(v.to_string()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Null
        | serde_yaml::Value::Sequence(_)
        | serde_yaml::Value::Mapping(_) => None,
        serde_yaml::Value::Tagged(tagged) => yaml_scalar_to_string(&tagged.value),
    }
}
