use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    pub limits: Option<LimitsConfig>,
    pub vocabulary: Option<VocabularyConfig>,
    pub display: Option<DisplayConfig>,
}

/// Numeric thresholds for an extraction run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LimitsConfig {
    pub title_min_len: Option<usize>,
    pub title_max_len: Option<usize>,
    pub dedup_window: Option<usize>,
    pub toc_scan_pages: Option<usize>,
    pub parallel_sections: Option<bool>,
}

/// Extra vocabulary entries appended to the built-in defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VocabularyConfig {
    pub extra_units: Option<Vec<String>>,
    pub extra_action_verbs: Option<Vec<String>>,
    pub extra_categories: Option<Vec<String>>,
    pub extra_ingredients_markers: Option<Vec<String>>,
    pub extra_instructions_markers: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DisplayConfig {
    pub color: Option<bool>,
}

/// Platform config directory path: `<config_dir>/ladle/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("ladle").join("config.toml"))
}

/// Load config by cascading CWD `.ladle.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(Path::new(".ladle.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &Path) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unparseable config file");
            None
        }
    }
}

fn overlay_opt<T: Clone>(overlay: Option<T>, base: Option<T>) -> Option<T> {
    overlay.or(base)
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    let (bl, ol) = (base.limits.unwrap_or_default(), overlay.limits.unwrap_or_default());
    let (bv, ov) = (
        base.vocabulary.unwrap_or_default(),
        overlay.vocabulary.unwrap_or_default(),
    );
    let (bd, od) = (base.display.unwrap_or_default(), overlay.display.unwrap_or_default());

    ConfigFile {
        limits: Some(LimitsConfig {
            title_min_len: overlay_opt(ol.title_min_len, bl.title_min_len),
            title_max_len: overlay_opt(ol.title_max_len, bl.title_max_len),
            dedup_window: overlay_opt(ol.dedup_window, bl.dedup_window),
            toc_scan_pages: overlay_opt(ol.toc_scan_pages, bl.toc_scan_pages),
            parallel_sections: overlay_opt(ol.parallel_sections, bl.parallel_sections),
        }),
        vocabulary: Some(VocabularyConfig {
            extra_units: overlay_opt(ov.extra_units, bv.extra_units),
            extra_action_verbs: overlay_opt(ov.extra_action_verbs, bv.extra_action_verbs),
            extra_categories: overlay_opt(ov.extra_categories, bv.extra_categories),
            extra_ingredients_markers: overlay_opt(
                ov.extra_ingredients_markers,
                bv.extra_ingredients_markers,
            ),
            extra_instructions_markers: overlay_opt(
                ov.extra_instructions_markers,
                bv.extra_instructions_markers,
            ),
        }),
        display: Some(DisplayConfig {
            color: overlay_opt(od.color, bd.color),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_partial_config() {
        let config: ConfigFile = toml::from_str(
            r#"
            [limits]
            dedup_window = 8
            "#,
        )
        .unwrap();
        let limits = config.limits.unwrap();
        assert_eq!(limits.dedup_window, Some(8));
        assert_eq!(limits.title_min_len, None);
        assert!(config.vocabulary.is_none());
    }

    #[test]
    fn merge_overlay_wins() {
        let base: ConfigFile = toml::from_str(
            r#"
            [limits]
            dedup_window = 8
            toc_scan_pages = 10
            "#,
        )
        .unwrap();
        let overlay: ConfigFile = toml::from_str(
            r#"
            [limits]
            dedup_window = 3
            "#,
        )
        .unwrap();
        let merged = merge(base, overlay);
        let limits = merged.limits.unwrap();
        assert_eq!(limits.dedup_window, Some(3));
        assert_eq!(limits.toc_scan_pages, Some(10));
    }

    #[test]
    fn merge_vocabulary_lists() {
        let base: ConfigFile = toml::from_str(
            r#"
            [vocabulary]
            extra_units = ["dollop"]
            "#,
        )
        .unwrap();
        let merged = merge(base, ConfigFile::default());
        assert_eq!(
            merged.vocabulary.unwrap().extra_units,
            Some(vec!["dollop".to_string()])
        );
    }
}
