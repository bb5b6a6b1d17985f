//! Run configuration (loaded from an optional TOML file)
//!
//! ```toml
//! cooperative_sentinel = "N"
//! uncooperative_sentinel = "Y"
//!
//! [trim]
//! drop_leading_start = true
//! drop_leading_wall = false
//!
//! [layout]
//! experiment_fields = ["Id", "Species", "Sex"]
//! action_states = ["wall", "apple", "snowberry"]
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::durations::TrimPolicy;
use crate::error::{NotebookError, Result};
use crate::notebook::DEFAULT_SENTINEL;
use crate::report::ReportLayout;

/// Settings shared by every CLI mode; each field has a default
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// `Uncooperative` value of subjects included in reports
    pub cooperative_sentinel: String,
    /// `Uncooperative` value counted as uncooperative in the counts mode
    pub uncooperative_sentinel: String,
    pub trim: TrimPolicy,
    pub layout: ReportLayout,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            cooperative_sentinel: DEFAULT_SENTINEL.to_string(),
            uncooperative_sentinel: "Y".to_string(),
            trim: TrimPolicy::default(),
            layout: ReportLayout::default(),
        }
    }
}

impl RunConfig {
    /// Parse a TOML document
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: RunConfig =
            toml::from_str(text).map_err(|e| NotebookError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.cooperative_sentinel.is_empty() {
            return Err(NotebookError::ConfigError(
                "cooperative_sentinel must not be empty".to_string(),
            ));
        }
        if self.layout.experiment_fields.is_empty() && self.layout.action_states.is_empty() {
            return Err(NotebookError::ConfigError(
                "layout must name at least one column".to_string(),
            ));
        }
        Ok(())
    }
}

/// Load configuration from a file
pub fn load_config(path: &Path) -> Result<RunConfig> {
    log::info!("Loading configuration from {:?}", path);
    let text = fs::read_to_string(path)?;
    RunConfig::from_toml(&text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_document_gives_defaults() {
        let config = RunConfig::from_toml("").unwrap();
        assert_eq!(config, RunConfig::default());
        assert_eq!(config.cooperative_sentinel, "N");
        assert!(config.trim.drop_leading_start);
    }

    #[test]
    fn test_partial_override() {
        let config = RunConfig::from_toml(
            r#"
            uncooperative_sentinel = "yes"

            [trim]
            drop_leading_wall = true

            [layout]
            action_states = ["wall"]
            "#,
        )
        .unwrap();

        assert_eq!(config.uncooperative_sentinel, "yes");
        assert!(config.trim.drop_leading_start);
        assert!(config.trim.drop_leading_wall);
        assert_eq!(config.layout.action_states, vec!["wall".to_string()]);
        assert_eq!(config.layout.experiment_fields.len(), 9);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let result = RunConfig::from_toml("sentinel = \"N\"");
        assert!(matches!(result, Err(NotebookError::ConfigError(_))));
    }

    #[test]
    fn test_empty_layout_rejected() {
        let result = RunConfig::from_toml(
            r#"
            [layout]
            experiment_fields = []
            action_states = []
            "#,
        );
        assert!(matches!(result, Err(NotebookError::ConfigError(_))));
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notebook.toml");
        fs::write(&path, "cooperative_sentinel = \"no\"\n").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.cooperative_sentinel, "no");
    }
}
