use serde::{Deserialize, Serialize};
use std::path::Path;

// ===== HIERARCHY TYPES =====

/// One record of the static organizational hierarchy.
///
/// `level` is an informational depth hint supplied by the data author; the
/// authoritative depth is derived by walking `parent_id`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    pub id: String,
    pub label: String,
    #[serde(default, alias = "parentId", alias = "parent", skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub level: u32,
}

impl TreeNode {
    pub fn root(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            parent_id: None,
            level: 0,
        }
    }

    pub fn child(
        id: impl Into<String>,
        label: impl Into<String>,
        parent_id: impl Into<String>,
        level: u32,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            parent_id: Some(parent_id.into()),
            level,
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Ordered sequence of hierarchy records as authored.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Hierarchy {
    #[serde(default)]
    pub nodes: Vec<TreeNode>,
}

impl Hierarchy {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Toml(e.to_string()))
    }

    /// Accepts either `{"nodes": [...]}` or a bare array of records.
    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        if let Ok(nodes) = serde_json::from_str::<Vec<TreeNode>>(content) {
            return Ok(Self { nodes });
        }
        serde_json::from_str(content).map_err(|e| ConfigError::Json(e.to_string()))
    }

    /// Picks the parser from the file extension; anything but `.json` is TOML.
    pub fn from_path_str(path: &Path, content: &str) -> Result<Self, ConfigError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::from_json_str(content),
            _ => Self::from_toml_str(content),
        }
    }
}

// ===== PERSISTED EXPANSION FORMAT =====

/// Serializes expanded ids as a JSON array of strings, preserving order.
pub fn encode_expanded_ids<'a>(ids: impl IntoIterator<Item = &'a String>) -> String {
    let ids: Vec<&String> = ids.into_iter().collect();
    // Vec<&String> always serializes
    serde_json::to_string(&ids).unwrap_or_else(|_| "[]".to_string())
}

/// Inverse of [`encode_expanded_ids`]. Returns `None` for anything that is not
/// a JSON array of strings.
pub fn decode_expanded_ids(raw: &str) -> Option<Vec<String>> {
    serde_json::from_str::<Vec<String>>(raw).ok()
}

// ===== CONFIG TYPES =====

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSection,
    #[serde(default)]
    pub view: ViewSection,
    #[serde(default)]
    pub storage: StorageSection,
    #[serde(default)]
    pub navigation: NavigationSection,
}

impl AppConfig {
    /// Parses a TOML config. Unsupported versions fall back to defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: AppConfig =
            toml::from_str(content).map_err(|e| ConfigError::Toml(e.to_string()))?;
        match config.app.migration_strategy() {
            MigrationStrategy::None => Ok(config),
            MigrationStrategy::Recreate => Ok(AppConfig::default()),
        }
    }
}

// AppSection carries the config format version so older files can be migrated
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AppSection {
    pub version: String,
}

impl AppSection {
    /// Current configuration format version
    pub const CURRENT_VERSION: &'static str = "1.0.0";

    pub fn needs_migration(&self) -> bool {
        self.version != Self::CURRENT_VERSION
    }

    pub fn migration_strategy(&self) -> MigrationStrategy {
        match self.version.as_str() {
            "1.0.0" => MigrationStrategy::None,
            _ => MigrationStrategy::Recreate,
        }
    }
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            version: Self::CURRENT_VERSION.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MigrationStrategy {
    /// No migration needed
    None,
    /// Unknown version, start from defaults
    Recreate,
}

/// Whether root nodes take part in expand/collapse.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RootPolicy {
    /// Roots are expanded by definition; their children are always shown.
    #[default]
    AlwaysExpanded,
    /// Roots start collapsed and toggle like any other node.
    Collapsible,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ViewSection {
    pub base_zoom: f64,
    pub zoom_ceiling: f64,
    pub zoom_step: f64,
    pub layout_duration_ms: u64,
    /// Used as the layout-finished proxy when the renderer has no completion
    /// signal, and as the upper bound when it does.
    pub settle_delay_ms: u64,
    pub fade_duration_ms: u64,
    pub spacing_factor: f64,
    pub padding: u32,
    pub root_policy: RootPolicy,
}

impl Default for ViewSection {
    fn default() -> Self {
        Self {
            base_zoom: 1.0,
            zoom_ceiling: 1.2,
            zoom_step: 0.1,
            layout_duration_ms: 500,
            settle_delay_ms: 600,
            fade_duration_ms: 500,
            spacing_factor: 1.5,
            padding: 30,
            root_policy: RootPolicy::AlwaysExpanded,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct StorageSection {
    pub key: String,
    pub clear_on_teardown: bool,
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            key: "expandedNodes".to_string(),
            clear_on_teardown: true,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct NavigationSection {
    pub detail_segment: String,
}

impl Default for NavigationSection {
    fn default() -> Self {
        Self {
            detail_segment: "detalhes".to_string(),
        }
    }
}

// ===== ERRORS =====

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid TOML: {0}")]
    Toml(String),
    #[error("invalid JSON: {0}")]
    Json(String),
}
