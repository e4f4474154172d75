use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

pub const DEFAULT_SITE_TITLE: &str = "低山旅行";
pub const DEFAULT_BASE_URL: &str = "https://teizan.example.com/";
pub const DEFAULT_TIMEZONE: &str = "Asia/Tokyo";
pub const DEFAULT_RAKUTEN_ENDPOINT: &str = "https://app.rakuten.co.jp/services/api";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiteConfig {
    pub site: SiteMeta,
    pub build: BuildConfig,
    pub affiliate: AffiliateConfig,
    pub wordpress: WordpressConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiteMeta {
    pub title: String,
    pub base_url: String,
    pub language: String,
    pub timezone: String,
    pub description: String,
}

impl SiteMeta {
    pub fn tz(&self) -> Tz {
        // Validated at load time; the fallback only applies to hand-built configs.
        self.timezone.parse().unwrap_or(chrono_tz::Asia::Tokyo)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MountainPathStyle {
    #[default]
    Name,
    Id,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingElevation {
    #[default]
    Skip,
    Placeholder,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildConfig {
    pub mountain_path: MountainPathStyle,
    pub missing_elevation: MissingElevation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AffiliateConfig {
    pub max_products: usize,
    pub max_hotels: usize,
    pub rakuten: Option<RakutenConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RakutenConfig {
    pub application_id: String,
    pub affiliate_id: String,
    pub endpoint: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WordpressConfig {
    pub author_login: String,
    pub author_email: String,
    pub author_display_name: String,
    pub post_id_start: u64,
    pub category: String,
    pub category_nicename: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            site: SiteMeta {
                title: DEFAULT_SITE_TITLE.to_string(),
                base_url: DEFAULT_BASE_URL.to_string(),
                language: "ja".to_string(),
                timezone: DEFAULT_TIMEZONE.to_string(),
                description: "初心者でも安心して楽しめる日本全国の低山を紹介する旅行ガイド".to_string(),
            },
            build: BuildConfig {
                mountain_path: MountainPathStyle::default(),
                missing_elevation: MissingElevation::default(),
            },
            affiliate: AffiliateConfig {
                max_products: 4,
                max_hotels: 3,
                rakuten: None,
            },
            wordpress: WordpressConfig {
                author_login: "admin".to_string(),
                author_email: "admin@example.com".to_string(),
                author_display_name: "admin".to_string(),
                post_id_start: 2000,
                category: "エリア別".to_string(),
                category_nicename: "area".to_string(),
            },
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct SiteConfigRaw {
    site: Option<SiteMetaRaw>,
    build: Option<BuildConfigRaw>,
    affiliate: Option<AffiliateConfigRaw>,
    wordpress: Option<WordpressConfigRaw>,
}

#[derive(Debug, Deserialize)]
struct SiteMetaRaw {
    title: Option<String>,
    base_url: Option<String>,
    language: Option<String>,
    timezone: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BuildConfigRaw {
    mountain_path: Option<MountainPathStyle>,
    missing_elevation: Option<MissingElevation>,
}

#[derive(Debug, Deserialize)]
struct AffiliateConfigRaw {
    max_products: Option<usize>,
    max_hotels: Option<usize>,
    rakuten: Option<RakutenConfigRaw>,
}

#[derive(Debug, Deserialize)]
struct RakutenConfigRaw {
    application_id: Option<String>,
    affiliate_id: Option<String>,
    endpoint: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct WordpressConfigRaw {
    author_login: Option<String>,
    author_email: Option<String>,
    author_display_name: Option<String>,
    post_id_start: Option<u64>,
    category: Option<String>,
    category_nicename: Option<String>,
}

pub fn load_site_config(path: &Path) -> Result<SiteConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    parse_site_config(&raw)
        .with_context(|| format!("failed to parse YAML config {}", path.display()))
}

pub fn parse_site_config(raw: &str) -> Result<SiteConfig> {
    let parsed: SiteConfigRaw = if raw.trim().is_empty() {
        SiteConfigRaw::default()
    } else {
        serde_yaml::from_str(raw)?
    };
    let defaults = SiteConfig::default();

    let site = match parsed.site {
        None => defaults.site,
        Some(site) => SiteMeta {
            title: non_empty_or_default(site.title, &defaults.site.title, "site.title")?,
            base_url: normalize_base_url(non_empty_or_default(
                site.base_url,
                &defaults.site.base_url,
                "site.base_url",
            )?),
            language: non_empty_or_default(site.language, "ja", "site.language")?,
            timezone: non_empty_or_default(site.timezone, DEFAULT_TIMEZONE, "site.timezone")?,
            description: site.description.unwrap_or(defaults.site.description),
        },
    };
    if site.timezone.parse::<Tz>().is_err() {
        bail!("site.timezone '{}' is not a known timezone", site.timezone);
    }
    if !site.base_url.starts_with("http://") && !site.base_url.starts_with("https://") {
        bail!("site.base_url must start with http:// or https://");
    }

    let build = BuildConfig {
        mountain_path: parsed
            .build
            .as_ref()
            .and_then(|build| build.mountain_path)
            .unwrap_or_default(),
        missing_elevation: parsed
            .build
            .as_ref()
            .and_then(|build| build.missing_elevation)
            .unwrap_or_default(),
    };

    let affiliate = match parsed.affiliate {
        None => defaults.affiliate,
        Some(affiliate_raw) => {
            let max_products = affiliate_raw
                .max_products
                .unwrap_or(defaults.affiliate.max_products);
            if max_products == 0 {
                bail!("affiliate.max_products must be > 0");
            }
            let max_hotels = affiliate_raw
                .max_hotels
                .unwrap_or(defaults.affiliate.max_hotels);
            if !(1..=3).contains(&max_hotels) {
                bail!("affiliate.max_hotels must be between 1 and 3");
            }
            let rakuten = match affiliate_raw.rakuten {
                None => None,
                Some(rakuten_raw) => {
                    let timeout_secs = rakuten_raw.timeout_secs.unwrap_or(10);
                    if timeout_secs == 0 {
                        bail!("affiliate.rakuten.timeout_secs must be > 0");
                    }
                    Some(RakutenConfig {
                        application_id: required_string(
                            rakuten_raw.application_id,
                            "affiliate.rakuten.application_id",
                        )?,
                        affiliate_id: required_string(
                            rakuten_raw.affiliate_id,
                            "affiliate.rakuten.affiliate_id",
                        )?,
                        endpoint: non_empty_or_default(
                            rakuten_raw.endpoint,
                            DEFAULT_RAKUTEN_ENDPOINT,
                            "affiliate.rakuten.endpoint",
                        )?,
                        timeout_secs,
                    })
                }
            };
            AffiliateConfig {
                max_products,
                max_hotels,
                rakuten,
            }
        }
    };

    let wordpress = match parsed.wordpress {
        None => defaults.wordpress,
        Some(wp) => {
            let base = defaults.wordpress;
            WordpressConfig {
                author_login: non_empty_or_default(
                    wp.author_login,
                    &base.author_login,
                    "wordpress.author_login",
                )?,
                author_email: non_empty_or_default(
                    wp.author_email,
                    &base.author_email,
                    "wordpress.author_email",
                )?,
                author_display_name: non_empty_or_default(
                    wp.author_display_name,
                    &base.author_display_name,
                    "wordpress.author_display_name",
                )?,
                post_id_start: match wp.post_id_start {
                    Some(0) => bail!("wordpress.post_id_start must be > 0"),
                    Some(value) => value,
                    None => base.post_id_start,
                },
                category: non_empty_or_default(wp.category, &base.category, "wordpress.category")?,
                category_nicename: non_empty_or_default(
                    wp.category_nicename,
                    &base.category_nicename,
                    "wordpress.category_nicename",
                )?,
            }
        }
    };

    Ok(SiteConfig {
        site,
        build,
        affiliate,
        wordpress,
    })
}

fn normalize_base_url(value: String) -> String {
    if value.ends_with('/') {
        value
    } else {
        format!("{value}/")
    }
}

fn required_string(value: Option<String>, field: &str) -> Result<String> {
    match value {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => bail!("missing required field: {}", field),
    }
}

fn non_empty_or_default(value: Option<String>, default: &str, field: &str) -> Result<String> {
    match value {
        Some(text) => {
            if text.trim().is_empty() {
                bail!("{field} must not be empty");
            }
            Ok(text)
        }
        None => Ok(default.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_temp(dir: &TempDir, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join("teizan.yaml");
        fs::write(&path, contents).expect("write temp config");
        path
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config = parse_site_config("").expect("config should load");
        assert_eq!(config, SiteConfig::default());
        assert_eq!(config.site.title, "低山旅行");
        assert_eq!(config.wordpress.post_id_start, 2000);
    }

    #[test]
    fn valid_config_file_parses() {
        let dir = TempDir::new().expect("tempdir");
        let path = write_temp(
            &dir,
            "site:\n  title: \"テスト\"\n  base_url: \"https://example.com\"\nbuild:\n  mountain_path: id\n",
        );
        let config = load_site_config(&path).expect("config should load");
        assert_eq!(config.site.title, "テスト");
        assert_eq!(config.site.base_url, "https://example.com/");
        assert_eq!(config.site.timezone, "Asia/Tokyo");
        assert_eq!(config.build.mountain_path, MountainPathStyle::Id);
    }

    #[test]
    fn unknown_timezone_fails() {
        let err = parse_site_config("site:\n  timezone: \"Mars/Olympus\"\n")
            .expect_err("expected error");
        assert!(err.to_string().contains("site.timezone"));
    }

    #[test]
    fn empty_title_fails() {
        let err = parse_site_config("site:\n  title: \"  \"\n").expect_err("expected error");
        assert!(err.to_string().contains("site.title"));
    }

    #[test]
    fn rakuten_requires_application_id() {
        let err = parse_site_config("affiliate:\n  rakuten:\n    affiliate_id: \"abc\"\n")
            .expect_err("expected error");
        assert!(err.to_string().contains("affiliate.rakuten.application_id"));
    }

    #[test]
    fn rakuten_timeout_defaults_to_ten_seconds() {
        let config = parse_site_config(
            "affiliate:\n  rakuten:\n    application_id: \"app\"\n    affiliate_id: \"aff\"\n",
        )
        .expect("config should load");
        let rakuten = config.affiliate.rakuten.expect("rakuten present");
        assert_eq!(rakuten.timeout_secs, 10);
        assert_eq!(rakuten.endpoint, DEFAULT_RAKUTEN_ENDPOINT);
    }

    #[test]
    fn max_hotels_out_of_range_fails() {
        let err = parse_site_config("affiliate:\n  max_hotels: 5\n").expect_err("expected error");
        assert!(err.to_string().contains("affiliate.max_hotels"));
    }

    #[test]
    fn missing_file_reports_path() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("missing.yaml");
        let err = load_site_config(&path).expect_err("expected error");
        assert!(err.to_string().contains("missing.yaml"));
    }
}
