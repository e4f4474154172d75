use crate::config::{MountainPathStyle, SiteConfig};
use crate::model::Mountain;
use crate::prefecture::Region;
use crate::resolve::resolve_prefecture;
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlMapping {
    pub href: String,
    pub primary_output: PathBuf,
}

/// Maps logical page keys (`mountains/高尾山`) to root-relative hrefs and
/// output files. Every page is written as `<key>/index.html`.
#[derive(Debug, Clone, Copy)]
pub struct UrlMapper {
    mountain_path: MountainPathStyle,
}

impl UrlMapper {
    pub fn new(cfg: &SiteConfig) -> Self {
        Self {
            mountain_path: cfg.build.mountain_path,
        }
    }

    pub fn map(&self, logical_key: &str) -> UrlMapping {
        let logical = logical_key.trim_matches('/');
        if logical.is_empty() || logical == "index" {
            return UrlMapping {
                href: "/".to_string(),
                primary_output: PathBuf::from("index.html"),
            };
        }
        UrlMapping {
            href: format!("/{logical}/"),
            primary_output: PathBuf::from(format!("{logical}/index.html")),
        }
    }

    pub fn mountain_key(&self, mountain: &Mountain) -> String {
        let segment = match self.mountain_path {
            MountainPathStyle::Name => path_segment(&mountain.name),
            MountainPathStyle::Id => path_segment(&mountain.id),
        };
        if segment.is_empty() {
            format!("mountains/{}", path_segment(&mountain.id))
        } else {
            format!("mountains/{segment}")
        }
    }

    pub fn mountain(&self, mountain: &Mountain) -> UrlMapping {
        self.map(&self.mountain_key(mountain))
    }

    /// Keys for a whole dataset, in input order. Mountains sharing a key get
    /// the prefecture appended; if that still collides the id is used.
    pub fn assign_mountain_keys(&self, mountains: &[Mountain]) -> Vec<String> {
        let base: Vec<String> = mountains.iter().map(|m| self.mountain_key(m)).collect();
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for key in &base {
            *counts.entry(key.as_str()).or_default() += 1;
        }

        let mut taken = BTreeSet::new();
        let mut keys = Vec::with_capacity(base.len());
        for (mountain, key) in mountains.iter().zip(&base) {
            let mut candidate = key.clone();
            if counts.get(key.as_str()).copied().unwrap_or_default() > 1 {
                let prefecture = resolve_prefecture(mountain).unwrap_or_default();
                let suffix = path_segment(&prefecture);
                if !suffix.is_empty() {
                    candidate = format!("{key}-{suffix}");
                }
            }
            if taken.contains(&candidate) {
                candidate = format!("mountains/{}", path_segment(&mountain.id));
            }
            taken.insert(candidate.clone());
            keys.push(candidate);
        }
        keys
    }

    pub fn region_key(&self, region: Region) -> String {
        format!("regions/{}", region.slug())
    }

    pub fn prefecture_key(&self, prefecture: &str) -> String {
        format!("regions/{}", path_segment(prefecture))
    }
}

/// A single path segment: keeps letters and digits of any script, maps
/// whitespace and separators to `-`, collapses repeats.
pub fn path_segment(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut pending_dash = false;
    for ch in value.trim().chars() {
        if ch.is_alphanumeric() || ch == '_' || ch == 'ー' || ch == '々' {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(ch);
        } else {
            pending_dash = true;
        }
    }
    out
}

pub fn base_url_join(base_url: &str, href: &str) -> String {
    let base = base_url.trim_end_matches('/');
    let path = href.trim_start_matches('/');
    if path.is_empty() {
        format!("{base}/")
    } else {
        format!("{base}/{path}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mountain(id: &str, name: &str) -> Mountain {
        Mountain {
            id: id.to_string(),
            name: name.to_string(),
            ..Mountain::default()
        }
    }

    #[test]
    fn index_maps_to_root() {
        let mapper = UrlMapper::new(&SiteConfig::default());
        let mapping = mapper.map("index");
        assert_eq!(mapping.href, "/");
        assert_eq!(mapping.primary_output, PathBuf::from("index.html"));
    }

    #[test]
    fn mountain_uses_name_by_default() {
        let mapper = UrlMapper::new(&SiteConfig::default());
        let mapping = mapper.mountain(&mountain("mt_takao_tokyo", "高尾山"));
        assert_eq!(mapping.href, "/mountains/高尾山/");
        assert_eq!(
            mapping.primary_output,
            PathBuf::from("mountains/高尾山/index.html")
        );
    }

    #[test]
    fn mountain_can_use_id() {
        let mut config = SiteConfig::default();
        config.build.mountain_path = MountainPathStyle::Id;
        let mapper = UrlMapper::new(&config);
        assert_eq!(
            mapper.mountain_key(&mountain("mt_takao_tokyo", "高尾山")),
            "mountains/mt_takao_tokyo"
        );
    }

    #[test]
    fn unsafe_characters_are_collapsed() {
        assert_eq!(path_segment(" a/b  c "), "a-b-c");
        assert_eq!(path_segment("../etc"), "etc");
        assert_eq!(path_segment("鋸山（のこぎりやま）"), "鋸山-のこぎりやま");
    }

    #[test]
    fn punctuation_only_name_falls_back_to_id() {
        let mapper = UrlMapper::new(&SiteConfig::default());
        assert_eq!(
            mapper.mountain_key(&mountain("mt_x_tokyo", "??")),
            "mountains/mt_x_tokyo"
        );
    }

    #[test]
    fn shared_names_are_disambiguated_by_prefecture() {
        let mapper = UrlMapper::new(&SiteConfig::default());
        let mountains = vec![
            mountain("mt_oyama_kanagawa", "大山"),
            mountain("mt_oyama_tottori", "大山"),
            mountain("mt_takao_tokyo", "高尾山"),
        ];
        assert_eq!(
            mapper.assign_mountain_keys(&mountains),
            vec![
                "mountains/大山-神奈川県",
                "mountains/大山-鳥取県",
                "mountains/高尾山",
            ]
        );
    }

    #[test]
    fn base_url_join_handles_slashes() {
        assert_eq!(
            base_url_join("https://example.com/", "/mountains/a/"),
            "https://example.com/mountains/a/"
        );
        assert_eq!(base_url_join("https://example.com", "/"), "https://example.com/");
    }
}
