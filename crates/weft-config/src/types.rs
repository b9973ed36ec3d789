//! Configuration types.
//!
//! Copyright (c) 2025 Posit, PBC
//!
//! The top-level type is [`BuildConfig`], deserialized from `weft.yml`:
//!
//! ```yaml
//! entry: theme/main.css
//! output: public/css/site.css
//! search_roots:
//!   - theme
//!   - vendor/css
//! content_globs:
//!   - "layouts/**/*.html"
//!   - "content/**/*.md"
//! design_tokens:
//!   spacing:
//!     "4": 1rem
//!   colors:
//!     red: "#ef4444"
//!   breakpoints:
//!     - name: sm
//!       min_width: 640px
//! browser_targets:
//!   - safari 8
//!   - ie 10
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Complete configuration for one build invocation.
///
/// Constructed once (from file or [`Default`]) and passed by reference into
/// every pipeline stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Default entry file when the CLI doesn't name one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry: Option<PathBuf>,

    /// Default output path when the CLI doesn't name one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,

    /// Directories consulted, in order, when resolving `@import` targets.
    /// First match wins. The entry file's own directory is prepended at
    /// build time, so these are the theme/library roots beyond it.
    pub search_roots: Vec<PathBuf>,

    /// Glob patterns for content files scanned for utility-class tokens
    pub content_globs: Vec<String>,

    /// Design-token scales driving utility-class generation
    pub design_tokens: DesignTokens,

    /// Browser-support matrix for vendor prefixing, e.g. `["safari 8"]`.
    /// Empty means no prefixing.
    pub browser_targets: Vec<String>,

    /// Directory content globs are resolved against: the config file's
    /// directory when loaded from file, the process working directory
    /// otherwise. Not part of the file format.
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            entry: None,
            output: None,
            search_roots: Vec::new(),
            content_globs: Vec::new(),
            design_tokens: DesignTokens::default(),
            browser_targets: Vec::new(),
            base_dir: None,
        }
    }
}

impl BuildConfig {
    /// Load a configuration from a YAML file.
    ///
    /// Relative paths in the file (`entry`, `output`, `search_roots`) are
    /// anchored to the directory containing the config file, so a build can
    /// be invoked from anywhere.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: BuildConfig =
            serde_yaml::from_str(&text).map_err(|source| ConfigError::Yaml {
                path: path.to_path_buf(),
                source,
            })?;
        let base = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        config.anchor_paths(base);
        config.base_dir = Some(base.to_path_buf());
        Ok(config)
    }

    /// Rewrite relative paths to be relative to `base`.
    fn anchor_paths(&mut self, base: &Path) {
        let anchor = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        if let Some(entry) = &mut self.entry {
            anchor(entry);
        }
        if let Some(output) = &mut self.output {
            anchor(output);
        }
        for root in &mut self.search_roots {
            anchor(root);
        }
    }

    /// Parse the configured browser targets into a support matrix.
    pub fn browser_matrix(&self) -> Result<BrowserTargets, ConfigError> {
        BrowserTargets::parse(&self.browser_targets)
    }
}

/// Design-token scales: the enumerations of allowed values used to generate
/// utility rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DesignTokens {
    /// Spacing steps, e.g. `"4"` → `"1rem"`. Drives margin/padding/size
    /// utilities.
    pub spacing: BTreeMap<String, String>,

    /// Color palette, e.g. `"red"` → `"#ef4444"`. Drives text/background
    /// utilities.
    pub colors: BTreeMap<String, String>,

    /// Responsive breakpoints in ascending order. Order here is the order
    /// generated `@media` blocks appear in the output.
    pub breakpoints: Vec<Breakpoint>,
}

impl Default for DesignTokens {
    fn default() -> Self {
        // Quarter-rem spacing scale, steps 0-12
        let spacing = (0u32..=12)
            .map(|step| {
                let value = if step == 0 {
                    "0".to_string()
                } else {
                    format!("{}rem", f64::from(step) * 0.25)
                };
                (step.to_string(), value)
            })
            .collect();
        Self {
            spacing,
            colors: BTreeMap::new(),
            breakpoints: vec![
                Breakpoint::new("sm", "640px"),
                Breakpoint::new("md", "768px"),
                Breakpoint::new("lg", "1024px"),
                Breakpoint::new("xl", "1280px"),
            ],
        }
    }
}

impl DesignTokens {
    /// Look up a breakpoint by name.
    pub fn breakpoint(&self, name: &str) -> Option<&Breakpoint> {
        self.breakpoints.iter().find(|b| b.name == name)
    }
}

/// A named responsive breakpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breakpoint {
    pub name: String,
    pub min_width: String,
}

impl Breakpoint {
    pub fn new(name: impl Into<String>, min_width: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            min_width: min_width.into(),
        }
    }
}

/// Browser engines recognized in target strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Browser {
    Chrome,
    Firefox,
    Safari,
    Edge,
    Ie,
    Opera,
}

impl Browser {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "chrome" => Some(Self::Chrome),
            "firefox" => Some(Self::Firefox),
            "safari" => Some(Self::Safari),
            "edge" => Some(Self::Edge),
            "ie" => Some(Self::Ie),
            "opera" => Some(Self::Opera),
            _ => None,
        }
    }
}

/// Parsed browser-support matrix.
///
/// Each entry is the *minimum* browser version the output must support;
/// the prefixer consults this to decide which vendor variants to add.
#[derive(Debug, Clone, Default)]
pub struct BrowserTargets {
    targets: Vec<(Browser, u32)>,
}

impl BrowserTargets {
    /// Parse target strings of the form `"safari 8"` (major version,
    /// optionally with a fractional part which is ignored).
    pub fn parse(targets: &[String]) -> Result<Self, ConfigError> {
        let mut parsed = Vec::with_capacity(targets.len());
        for target in targets {
            let mut parts = target.split_whitespace();
            let name = parts.next().unwrap_or_default().to_ascii_lowercase();
            let browser =
                Browser::from_name(&name).ok_or_else(|| ConfigError::UnknownBrowser {
                    target: target.clone(),
                })?;
            let version = parts
                .next()
                .and_then(|v| v.split('.').next())
                .and_then(|v| v.parse::<u32>().ok())
                .ok_or_else(|| ConfigError::InvalidBrowserVersion {
                    target: target.clone(),
                })?;
            parsed.push((browser, version));
        }
        Ok(Self { targets: parsed })
    }

    /// True when some target requires supporting `browser` at a version at
    /// or below `version` (i.e. a prefix needed up to `version` applies).
    pub fn supports_at_or_below(&self, browser: Browser, version: u32) -> bool {
        self.targets
            .iter()
            .any(|(b, v)| *b == browser && *v <= version)
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_spacing_scale() {
        let tokens = DesignTokens::default();
        assert_eq!(tokens.spacing.get("0").map(String::as_str), Some("0"));
        assert_eq!(tokens.spacing.get("4").map(String::as_str), Some("1rem"));
        assert_eq!(tokens.spacing.get("8").map(String::as_str), Some("2rem"));
        assert!(tokens.spacing.get("13").is_none());
    }

    #[test]
    fn test_default_breakpoints_ordered() {
        let tokens = DesignTokens::default();
        let names: Vec<_> = tokens.breakpoints.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, ["sm", "md", "lg", "xl"]);
        assert_eq!(tokens.breakpoint("md").unwrap().min_width, "768px");
    }

    #[test]
    fn test_parse_yaml_config() {
        let yaml = r##"
entry: theme/main.css
search_roots:
  - theme
  - vendor/css
content_globs:
  - "layouts/**/*.html"
design_tokens:
  spacing:
    "4": 1rem
  colors:
    red: "#ef4444"
  breakpoints:
    - name: sm
      min_width: 640px
browser_targets:
  - safari 8
"##;
        let config: BuildConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.entry.as_deref(), Some(Path::new("theme/main.css")));
        assert_eq!(config.search_roots.len(), 2);
        assert_eq!(
            config.design_tokens.colors.get("red").map(String::as_str),
            Some("#ef4444")
        );
        assert_eq!(config.design_tokens.breakpoints.len(), 1);
        assert_eq!(config.browser_targets, ["safari 8"]);
    }

    #[test]
    fn test_load_anchors_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("weft.yml");
        std::fs::write(
            &config_path,
            "entry: theme/main.css\nsearch_roots:\n  - theme\n  - /abs/vendor\n",
        )
        .unwrap();

        let config = BuildConfig::load(&config_path).unwrap();
        assert_eq!(
            config.entry.as_deref(),
            Some(dir.path().join("theme/main.css").as_path())
        );
        assert_eq!(config.search_roots[0], dir.path().join("theme"));
        assert_eq!(config.search_roots[1], PathBuf::from("/abs/vendor"));
    }

    #[test]
    fn test_browser_targets_parse() {
        let matrix = BrowserTargets::parse(&["safari 8".to_string(), "IE 10".to_string()]).unwrap();
        assert!(matrix.supports_at_or_below(Browser::Safari, 8));
        assert!(matrix.supports_at_or_below(Browser::Safari, 9));
        assert!(!matrix.supports_at_or_below(Browser::Safari, 7));
        assert!(matrix.supports_at_or_below(Browser::Ie, 11));
    }

    #[test]
    fn test_browser_targets_unknown_browser() {
        let err = BrowserTargets::parse(&["netscape 4".to_string()]).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownBrowser { .. }));
    }

    #[test]
    fn test_browser_targets_missing_version() {
        let err = BrowserTargets::parse(&["safari".to_string()]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBrowserVersion { .. }));
    }
}
