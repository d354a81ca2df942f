use anyhow::{Context, Result};
use frontend::TreeStore;
use shared::{AppConfig, Hierarchy};
use std::path::Path;

pub const DEMO_HIERARCHY: &str = include_str!("../../demos/prefeitura.toml");

pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    let Some(path) = path else {
        return Ok(AppConfig::default());
    };

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config = AppConfig::from_toml_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

    Ok(config)
}

/// Loads and validates a hierarchy, falling back to the bundled demo.
pub fn load_hierarchy(path: Option<&Path>) -> Result<TreeStore> {
    let hierarchy = match path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read hierarchy file: {}", path.display()))?;
            Hierarchy::from_path_str(path, &content)
                .with_context(|| format!("Failed to parse hierarchy file: {}", path.display()))?
        }
        None => Hierarchy::from_toml_str(DEMO_HIERARCHY)
            .context("Bundled demo hierarchy is invalid")?,
    };

    let store = TreeStore::from_hierarchy(hierarchy).context("Invalid hierarchy")?;
    log::debug!("Loaded hierarchy with {} nodes", store.len());
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_hierarchy_is_valid() {
        let store = load_hierarchy(None).unwrap();
        assert_eq!(store.len(), 9);
        assert_eq!(store.roots().len(), 1);
        assert_eq!(store.children("cultura").len(), 2);
    }

    #[test]
    fn missing_config_uses_defaults() {
        let config = load_config(None).unwrap();
        assert_eq!(config.storage.key, "expandedNodes");
    }

    #[test]
    fn unreadable_file_names_the_path() {
        let err = load_hierarchy(Some(Path::new("/nonexistent/org.toml"))).unwrap_err();
        assert!(format!("{:#}", err).contains("/nonexistent/org.toml"));
    }
}
