//! Canonical per-mountain articles and the optional JSON records that
//! override them.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::debug;
use minijinja::context;
use serde::Serialize;
use walkdir::WalkDir;

use crate::affiliate::{AffiliateSelection, seed_bucket};
use crate::catalog::{FEATURED_IMAGES, category_label};
use crate::error::PageRenderFailure;
use crate::model::{Article, FeaturedImage};
use crate::resolve::{PLACEHOLDER, ResolvedMountain};
use crate::templates::PageRenderer;

#[derive(Debug, Clone, Serialize)]
pub struct ProductView {
    pub id: String,
    pub name: String,
    pub description: String,
    pub url: String,
    pub image_url: String,
    pub category_label: &'static str,
    pub price_label: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct HotelView {
    pub id: String,
    pub name: String,
    pub description: String,
    pub url: String,
    pub location: String,
    pub price_label: String,
}

pub fn product_views(article: &Article) -> Vec<ProductView> {
    article
        .affiliate_products
        .iter()
        .map(|product| ProductView {
            id: product.id.clone(),
            name: product.name.clone(),
            description: product.description.clone(),
            url: product.url.clone(),
            image_url: product.image_url.clone(),
            category_label: category_label(&product.category),
            price_label: product.price_label(),
        })
        .collect()
}

pub fn hotel_views(article: &Article) -> Vec<HotelView> {
    article
        .affiliate_hotels
        .iter()
        .map(|hotel| HotelView {
            id: hotel.id.clone(),
            name: hotel.name.clone(),
            description: hotel.description.clone(),
            url: hotel.url.clone(),
            location: hotel.location.clone(),
            price_label: hotel.price_label(),
        })
        .collect()
}

pub fn article_title(mountain: &ResolvedMountain) -> String {
    if mountain.prefecture == PLACEHOLDER {
        format!("{}登山ガイド｜アクセス・見どころ・おすすめ装備", mountain.name)
    } else {
        format!(
            "{}（{}）登山ガイド｜アクセス・見どころ・おすすめ装備",
            mountain.name, mountain.prefecture
        )
    }
}

pub fn article_excerpt(mountain: &ResolvedMountain) -> String {
    format!(
        "{}は{}にある標高{}の山。難易度は{}、最寄り駅は{}です。アクセスや季節の見どころ、おすすめの装備を紹介します。",
        mountain.name,
        mountain.prefecture,
        mountain.elevation_label,
        mountain.difficulty_label,
        mountain.nearest_station
    )
}

/// Prefecture, region, difficulty, then up to three features. Placeholders
/// never become tags.
pub fn article_tags(mountain: &ResolvedMountain) -> Vec<String> {
    let mut candidates: Vec<&str> = vec![
        mountain.prefecture.as_str(),
        mountain.region_label,
        mountain.difficulty_label,
        "低山",
    ];
    candidates.extend(mountain.features.iter().take(3).map(String::as_str));

    let mut tags: Vec<String> = Vec::new();
    for tag in candidates {
        let tag = tag.trim();
        if tag.is_empty() || tag == PLACEHOLDER || tags.iter().any(|existing| existing == tag) {
            continue;
        }
        tags.push(tag.to_string());
    }
    tags
}

fn intro(mountain: &ResolvedMountain) -> String {
    let mut text = format!(
        "{}は{}に位置する標高{}の山です。",
        mountain.name, mountain.prefecture, mountain.elevation_label
    );
    if !mountain.features.is_empty() {
        text.push_str(&format!(
            "{}が魅力で、",
            mountain.features.iter().take(3).cloned().collect::<Vec<_>>().join("、")
        ));
    }
    text.push_str(&format!(
        "難易度は{}。{}",
        mountain.difficulty_label,
        if mountain.difficulty.is_beginner_friendly() {
            "初めての方でも挑戦しやすい山です。"
        } else {
            "しっかりとした準備で臨みたい山です。"
        }
    ));
    text
}

/// Picked from [`FEATURED_IMAGES`] by the blake3 bucket of the mountain id.
pub fn featured_image_for(mountain: &ResolvedMountain) -> FeaturedImage {
    let index = seed_bucket(mountain.id.as_bytes()) as usize % FEATURED_IMAGES.len();
    FeaturedImage {
        url: FEATURED_IMAGES[index].to_string(),
        alt: format!("{} 登山風景", mountain.name),
    }
}

/// Builds the canonical article for a resolved mountain and its affiliate
/// selection. A stored `record` is applied before the body is rendered, so
/// its product and hotel lists end up in the body; a record with its own
/// `content` replaces the body entirely.
pub fn compose_article(
    renderer: &PageRenderer,
    mountain: &ResolvedMountain,
    selection: &AffiliateSelection,
    record: Option<&Article>,
) -> Result<Article, PageRenderFailure> {
    let mut article = Article {
        mountain_id: mountain.id.clone(),
        title: article_title(mountain),
        content: String::new(),
        excerpt: article_excerpt(mountain),
        tags: article_tags(mountain),
        featured_image: Some(featured_image_for(mountain)),
        affiliate_products: selection.products.clone(),
        affiliate_hotels: selection.hotels.clone(),
    };
    if let Some(record) = record {
        apply_override(&mut article, record);
    }
    if article.content.trim().is_empty() {
        article.content = renderer.render(
            "article_body.html",
            context! {
                m => mountain,
                intro => intro(mountain),
                gear_label => mountain.gear_tier.label(),
                products => product_views(&article),
                hotels => hotel_views(&article),
            },
        )?;
    }
    Ok(article)
}

/// Replaces the generated fields with those of a stored record. Affiliate
/// lists are only replaced when the record carries them.
pub fn apply_override(article: &mut Article, record: &Article) {
    if !record.title.trim().is_empty() {
        article.title = record.title.clone();
    }
    if !record.content.trim().is_empty() {
        article.content = record.content.clone();
    }
    if !record.excerpt.trim().is_empty() {
        article.excerpt = record.excerpt.clone();
    }
    if !record.tags.is_empty() {
        article.tags = record.tags.clone();
    }
    if record.featured_image.is_some() {
        article.featured_image = record.featured_image.clone();
    }
    if !record.affiliate_products.is_empty() {
        article.affiliate_products = record.affiliate_products.clone();
    }
    if !record.affiliate_hotels.is_empty() {
        article.affiliate_hotels = record.affiliate_hotels.clone();
    }
}

/// Reads every `article_*.json` under `dir`, sorted by path.
pub fn load_article_records(dir: &Path) -> Result<Vec<Article>> {
    let mut paths = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry =
            entry.with_context(|| format!("failed to walk articles dir {}", dir.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if name.starts_with("article_") && name.ends_with(".json") {
            paths.push(entry.path().to_path_buf());
        }
    }

    let mut records = Vec::with_capacity(paths.len());
    for path in paths {
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("failed to read article {}", path.display()))?;
        let article: Article = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse article {}", path.display()))?;
        debug!("loaded article record for {} from {}", article.mountain_id, path.display());
        records.push(article);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::affiliate::select_affiliate_content;
    use crate::config::SiteConfig;
    use crate::model::{AffiliateProduct, Mountain};
    use crate::resolve::resolve_mountain;
    use tempfile::TempDir;

    fn takao() -> ResolvedMountain {
        let mountain: Mountain = serde_json::from_str(
            r#"{
                "id": "mt_takao_tokyo",
                "name": "高尾山",
                "elevation": 599,
                "difficulty": {"level": "初級", "hiking_time": "約3時間"},
                "features": ["ケーブルカー", "薬王院", "紅葉"],
                "location": {"nearest_station": "高尾山口駅", "access_time": "新宿から約50分"}
            }"#,
        )
        .expect("mountain");
        resolve_mountain(&mountain)
    }

    fn compose_with(mountain: &ResolvedMountain, record: Option<&Article>) -> Article {
        let config = SiteConfig::default();
        let renderer = PageRenderer::new(&config).expect("renderer");
        let selection = select_affiliate_content(mountain, &config.affiliate);
        compose_article(&renderer, mountain, &selection, record).expect("article")
    }

    fn compose(mountain: &ResolvedMountain) -> Article {
        compose_with(mountain, None)
    }

    fn empty_record() -> Article {
        Article {
            mountain_id: "mt_takao_tokyo".to_string(),
            title: String::new(),
            content: String::new(),
            excerpt: String::new(),
            tags: Vec::new(),
            featured_image: None,
            affiliate_products: Vec::new(),
            affiliate_hotels: Vec::new(),
        }
    }

    #[test]
    fn article_carries_core_facts() {
        let mountain = takao();
        let article = compose(&mountain);
        assert_eq!(article.mountain_id, "mt_takao_tokyo");
        assert!(article.title.starts_with("高尾山（東京都）登山ガイド"));
        assert!(article.content.contains("599m"));
        assert!(article.content.contains("東京都"));
        assert!(article.content.contains("高尾山口駅"));
        assert!(!article.affiliate_products.is_empty());
        assert!(!article.affiliate_hotels.is_empty());
    }

    #[test]
    fn tags_skip_placeholders_and_duplicates() {
        let mut mountain = takao();
        mountain.prefecture = PLACEHOLDER.to_string();
        mountain.features = vec!["低山".to_string(), "展望".to_string()];
        assert_eq!(article_tags(&mountain), vec!["関東", "初級", "低山", "展望"]);
    }

    #[test]
    fn override_replaces_only_present_fields() {
        let mountain = takao();
        let mut article = compose(&mountain);
        let generated_products = article.affiliate_products.clone();
        let record = Article {
            mountain_id: "mt_takao_tokyo".to_string(),
            title: "高尾山の歩き方".to_string(),
            content: String::new(),
            excerpt: String::new(),
            tags: vec!["東京".to_string()],
            featured_image: Some(FeaturedImage {
                url: "https://img.example.com/takao.jpg".to_string(),
                alt: "高尾山".to_string(),
            }),
            affiliate_products: Vec::new(),
            affiliate_hotels: Vec::new(),
        };
        apply_override(&mut article, &record);
        assert_eq!(article.title, "高尾山の歩き方");
        assert!(article.content.contains("599m"));
        assert_eq!(article.tags, vec!["東京"]);
        assert!(article.featured_image.is_some());
        assert_eq!(article.affiliate_products, generated_products);
    }

    #[test]
    fn record_products_are_rendered_into_the_body() {
        let mountain = takao();
        let record = Article {
            affiliate_products: vec![AffiliateProduct {
                id: "rec-1".to_string(),
                name: "記録済みトレッキングポール".to_string(),
                price: 6800,
                url: "https://shop.example.com/pole".to_string(),
                description: "伸縮式".to_string(),
                image_url: String::new(),
                category: "backpack".to_string(),
                shop_name: None,
            }],
            ..empty_record()
        };
        let article = compose_with(&mountain, Some(&record));
        assert_eq!(article.affiliate_products.len(), 1);
        assert!(article.content.contains("記録済みトレッキングポール"));
        assert!(article.content.contains("¥6,800"));
        assert!(article.content.contains("599m"));
    }

    #[test]
    fn record_content_replaces_the_body() {
        let mountain = takao();
        let record = Article {
            content: "<p>手書き</p>".to_string(),
            ..empty_record()
        };
        let article = compose_with(&mountain, Some(&record));
        assert_eq!(article.content, "<p>手書き</p>");
    }

    #[test]
    fn featured_image_is_stable_per_id() {
        let mountain = takao();
        let first = featured_image_for(&mountain);
        let second = featured_image_for(&takao());
        assert_eq!(first, second);
        assert!(FEATURED_IMAGES.contains(&first.url.as_str()));
        assert_eq!(first.alt, "高尾山 登山風景");
        assert_eq!(compose(&mountain).featured_image, Some(first));
    }

    #[test]
    fn records_are_loaded_from_matching_files() {
        let dir = TempDir::new().expect("tempdir");
        let nested = dir.path().join("2024");
        fs::create_dir_all(&nested).expect("mkdir");
        fs::write(
            nested.join("article_takao.json"),
            r#"{"mountain_id": "mt_takao_tokyo", "title": "T", "content": "<p>c</p>"}"#,
        )
        .expect("write");
        fs::write(dir.path().join("notes.json"), "not json").expect("write");
        let records = load_article_records(dir.path()).expect("load");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].mountain_id, "mt_takao_tokyo");
    }

    #[test]
    fn malformed_record_is_an_error() {
        let dir = TempDir::new().expect("tempdir");
        fs::write(dir.path().join("article_bad.json"), "{").expect("write");
        let err = load_article_records(dir.path()).expect_err("expected error");
        assert!(err.to_string().contains("failed to parse article"));
    }
}
