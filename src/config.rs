//! Site configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults are
//! the base layer, the user's `config.toml` overrides them key by key, and the
//! `PRISMIC_API_ENDPOINT` / `PRISMIC_ACCESS_TOKEN` environment variables win
//! over both so credentials can stay out of the file.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional except cms.endpoint - defaults shown below
//!
//! [site]
//! title = "spacetraveling"
//! lang = "pt-BR"
//! # logo = "/logo_full.svg"  # Image shown in the header instead of the title
//! assets_dir = "assets"     # Copied verbatim into the output root
//!
//! [cms]
//! endpoint = "https://your-repo.cdn.prismic.io/api/v2"
//! # access_token = "..."
//! document_type = "post"
//! page_size = 1             # Posts per listing page
//! timeout_secs = 30
//!
//! [listing]
//! max_pages = 50            # Listing pages fetched after the first one
//!
//! [posts]
//! revalidate_minutes = 30   # Age after which a post is fetched again
//!
//! [colors]
//! background = "#1a1d23"
//! surface = "#282a36"
//! heading = "#f8f8f8"
//! text = "#d7d7d7"
//! muted = "#bbbbbb"
//! accent = "#ff57b2"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

pub const ENDPOINT_ENV: &str = "PRISMIC_API_ENDPOINT";
pub const ACCESS_TOKEN_ENV: &str = "PRISMIC_ACCESS_TOKEN";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Site identity and static assets.
    pub site: SiteSection,
    /// Where and how posts are fetched.
    pub cms: CmsConfig,
    /// Listing pagination limits.
    pub listing: ListingConfig,
    /// Per-post regeneration settings.
    pub posts: PostsConfig,
    /// Palette injected as CSS custom properties.
    pub colors: ColorConfig,
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let endpoint = self.cms.endpoint.trim();
        if endpoint.is_empty() {
            return Err(ConfigError::Validation(format!(
                "cms.endpoint must be set (or export {ENDPOINT_ENV})"
            )));
        }
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(ConfigError::Validation(
                "cms.endpoint must be an http(s) URL".into(),
            ));
        }
        if self.cms.document_type.trim().is_empty() {
            return Err(ConfigError::Validation(
                "cms.document_type must not be empty".into(),
            ));
        }
        if !(1..=100).contains(&self.cms.page_size) {
            return Err(ConfigError::Validation(
                "cms.page_size must be 1-100".into(),
            ));
        }
        if self.cms.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "cms.timeout_secs must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteSection {
    /// Shown in the header and the `<title>` of the listing.
    pub title: String,
    /// Value of `<html lang>`.
    pub lang: String,
    /// Optional logo URL. When absent the header shows `title` as text.
    pub logo: Option<String>,
    /// Directory (relative to the config file) copied into the output root.
    pub assets_dir: String,
}

impl Default for SiteSection {
    fn default() -> Self {
        Self {
            title: "spacetraveling".to_string(),
            lang: "pt-BR".to_string(),
            logo: None,
            assets_dir: "assets".to_string(),
        }
    }
}

/// Prismic repository settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CmsConfig {
    /// API v2 entry point, e.g. `https://my-blog.cdn.prismic.io/api/v2`.
    pub endpoint: String,
    /// Permanent access token for private repositories. Never written to
    /// the build snapshot.
    #[serde(skip_serializing)]
    pub access_token: Option<String>,
    /// Custom type holding the posts.
    pub document_type: String,
    /// Number of summaries per listing page.
    pub page_size: u32,
    /// Per-request timeout.
    pub timeout_secs: u64,
}

impl Default for CmsConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            access_token: None,
            document_type: "post".to_string(),
            page_size: 1,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ListingConfig {
    /// How many pages past the first one the pull stage follows.
    pub max_pages: usize,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self { max_pages: 50 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PostsConfig {
    /// A cached post older than this is fetched again on the next build.
    /// `0` refetches every post on every build.
    pub revalidate_minutes: u64,
}

impl Default for PostsConfig {
    fn default() -> Self {
        Self {
            revalidate_minutes: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorConfig {
    pub background: String,
    /// Background of the header and cards.
    pub surface: String,
    pub heading: String,
    pub text: String,
    /// Dates, author and reading time.
    pub muted: String,
    /// Links and the "load more" button.
    pub accent: String,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            background: "#1a1d23".to_string(),
            surface: "#282a36".to_string(),
            heading: "#f8f8f8".to_string(),
            text: "#d7d7d7".to_string(),
            muted: "#bbbbbb".to_string(),
            accent: "#ff57b2".to_string(),
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// Tables merge key by key; any other overlay value replaces the base value.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file as a raw TOML value. `Ok(None)` if it does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Overwrite CMS settings with values from the environment.
///
/// Takes a lookup function so tests do not have to mutate the process
/// environment. Empty values are ignored.
pub fn apply_env_overrides(config: &mut SiteConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(endpoint) = lookup(ENDPOINT_ENV).filter(|v| !v.trim().is_empty()) {
        config.cms.endpoint = endpoint;
    }
    if let Some(token) = lookup(ACCESS_TOKEN_ENV).filter(|v| !v.trim().is_empty()) {
        config.cms.access_token = Some(token);
    }
}

/// Merge an optional overlay onto the stock defaults, apply environment
/// overrides, then validate.
pub fn resolve_config(
    overlay: Option<toml::Value>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value();
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let mut config: SiteConfig = merged.try_into()?;
    apply_env_overrides(&mut config, lookup);
    config.validate()?;
    Ok(config)
}

/// Load config from the given `config.toml` path and the process environment.
pub fn load_config(path: &Path) -> Result<SiteConfig, ConfigError> {
    let overlay = load_raw_config(path)?;
    resolve_config(overlay, |key| std::env::var(key).ok())
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# spacetraveling configuration
# ============================
# Values shown below are the defaults. Only cms.endpoint is required, and it
# can come from the PRISMIC_API_ENDPOINT environment variable instead.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Site
# ---------------------------------------------------------------------------
[site]
title = "spacetraveling"

# Value of <html lang>.
lang = "pt-BR"

# Header image URL. Without it the header shows the title as text.
# logo = "/logo_full.svg"

# Directory next to this file whose contents are copied into the output root.
assets_dir = "assets"

# ---------------------------------------------------------------------------
# Prismic repository
# ---------------------------------------------------------------------------
[cms]
endpoint = "https://your-repo.cdn.prismic.io/api/v2"

# Permanent access token for private repositories (or PRISMIC_ACCESS_TOKEN).
# access_token = ""

# Custom type holding the posts.
document_type = "post"

# Posts per listing page (1-100).
page_size = 1

# Per-request timeout in seconds.
timeout_secs = 30

# ---------------------------------------------------------------------------
# Listing
# ---------------------------------------------------------------------------
[listing]
# Listing pages fetched after the first one. Each becomes page/<n>/.
max_pages = 50

# ---------------------------------------------------------------------------
# Posts
# ---------------------------------------------------------------------------
[posts]
# A post fetched less than this many minutes ago is reused on the next build.
revalidate_minutes = 30

# ---------------------------------------------------------------------------
# Colors
# ---------------------------------------------------------------------------
[colors]
background = "#1a1d23"
surface = "#282a36"
heading = "#f8f8f8"
text = "#d7d7d7"
muted = "#bbbbbb"
accent = "#ff57b2"
"##
}

/// Generate CSS custom properties from the color config.
pub fn generate_color_css(colors: &ColorConfig) -> String {
    format!(
        r#":root {{
    --color-bg: {background};
    --color-surface: {surface};
    --color-heading: {heading};
    --color-text: {text};
    --color-muted: {muted};
    --color-accent: {accent};
}}"#,
        background = colors.background,
        surface = colors.surface,
        heading = colors.heading,
        text = colors.text,
        muted = colors.muted,
        accent = colors.accent,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const ENDPOINT: &str = "https://blog.cdn.prismic.io/api/v2";

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn endpoint_toml() -> toml::Value {
        toml::from_str(&format!("[cms]\nendpoint = \"{ENDPOINT}\"\n")).unwrap()
    }

    #[test]
    fn defaults_match_original_blog() {
        let config = SiteConfig::default();
        assert_eq!(config.site.title, "spacetraveling");
        assert_eq!(config.site.lang, "pt-BR");
        assert_eq!(config.cms.document_type, "post");
        assert_eq!(config.cms.page_size, 1);
        assert_eq!(config.posts.revalidate_minutes, 30);
        assert_eq!(config.colors.accent, "#ff57b2");
    }

    #[test]
    fn parse_partial_config() {
        let toml = r##"
[colors]
accent = "#00ff00"

[cms]
page_size = 10
"##;
        let config: SiteConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.colors.accent, "#00ff00");
        assert_eq!(config.cms.page_size, 10);
        // Defaults preserved
        assert_eq!(config.colors.background, "#1a1d23");
        assert_eq!(config.cms.document_type, "post");
    }

    #[test]
    fn unknown_key_is_rejected() {
        let result: Result<SiteConfig, _> = toml::from_str("[cms]\npagesize = 3\n");
        assert!(result.is_err());
    }

    #[test]
    fn merge_toml_overlay_wins_and_base_is_kept() {
        let base: toml::Value = toml::from_str("[a]\nx = 1\ny = 2\n").unwrap();
        let overlay: toml::Value = toml::from_str("[a]\ny = 3\n").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["a"]["x"].as_integer(), Some(1));
        assert_eq!(merged["a"]["y"].as_integer(), Some(3));
    }

    #[test]
    fn resolve_requires_endpoint() {
        let result = resolve_config(None, no_env);
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn resolve_with_endpoint_in_file() {
        let config = resolve_config(Some(endpoint_toml()), no_env).unwrap();
        assert_eq!(config.cms.endpoint, ENDPOINT);
        assert_eq!(config.cms.access_token, None);
    }

    #[test]
    fn env_overrides_file_values() {
        let config = resolve_config(Some(endpoint_toml()), |key| match key {
            ENDPOINT_ENV => Some("https://other.cdn.prismic.io/api/v2".to_string()),
            ACCESS_TOKEN_ENV => Some("secret".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.cms.endpoint, "https://other.cdn.prismic.io/api/v2");
        assert_eq!(config.cms.access_token.as_deref(), Some("secret"));
    }

    #[test]
    fn empty_env_values_are_ignored() {
        let config = resolve_config(Some(endpoint_toml()), |_| Some("  ".to_string())).unwrap();
        assert_eq!(config.cms.endpoint, ENDPOINT);
        assert_eq!(config.cms.access_token, None);
    }

    #[test]
    fn validate_rejects_non_http_endpoint() {
        let mut config = SiteConfig::default();
        config.cms.endpoint = "ftp://example.com".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn validate_rejects_page_size_out_of_range() {
        let mut config = SiteConfig::default();
        config.cms.endpoint = ENDPOINT.to_string();
        config.cms.page_size = 0;
        assert!(config.validate().is_err());
        config.cms.page_size = 101;
        assert!(config.validate().is_err());
        config.cms.page_size = 100;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(
            &path,
            format!("[site]\ntitle = \"My Blog\"\n\n[cms]\nendpoint = \"{ENDPOINT}\"\n"),
        )
        .unwrap();

        let overlay = load_raw_config(&path).unwrap();
        let config = resolve_config(overlay, no_env).unwrap();
        assert_eq!(config.site.title, "My Blog");
        assert_eq!(config.site.lang, "pt-BR");
    }

    #[test]
    fn load_raw_config_missing_file_is_none() {
        let tmp = TempDir::new().unwrap();
        assert!(load_raw_config(&tmp.path().join("config.toml")).unwrap().is_none());
    }

    #[test]
    fn load_raw_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "this is not valid toml [[[").unwrap();
        assert!(matches!(load_raw_config(&path), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn stock_config_parses_to_defaults() {
        let config: SiteConfig = toml::from_str(stock_config_toml()).unwrap();
        let defaults = SiteConfig::default();
        assert_eq!(config.site.title, defaults.site.title);
        assert_eq!(config.cms.page_size, defaults.cms.page_size);
        assert_eq!(config.listing.max_pages, defaults.listing.max_pages);
        assert_eq!(config.colors.accent, defaults.colors.accent);
    }

    #[test]
    fn color_css_has_all_variables() {
        let css = generate_color_css(&ColorConfig::default());
        for var in [
            "--color-bg:",
            "--color-surface:",
            "--color-heading:",
            "--color-text:",
            "--color-muted:",
            "--color-accent: #ff57b2",
        ] {
            assert!(css.contains(var), "missing {var}");
        }
    }
}
