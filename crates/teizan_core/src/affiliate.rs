//! Deterministic per-mountain affiliate selection.
//!
//! Seed derivation: the mountain name's UTF-8 bytes are hashed with blake3.
//! The 32-byte digest seeds a `ChaCha12Rng`, whose output stream is fixed
//! across rand releases (`StdRng` makes no such promise). Its first four bytes read as a
//! little-endian `u32` modulo [`SEED_BUCKETS`] give the bucket used to pick
//! keyword sets. The same name always yields the same keywords, products and
//! hotels for a given catalog.

use log::{debug, warn};
use rand::prelude::*;
use rand_chacha::ChaCha12Rng;

use crate::catalog::{
    ADVANCED_KEYWORDS, BEGINNER_KEYWORDS, HIGH_ALTITUDE_KEYWORDS, KEYWORD_SETS,
    LOW_MOUNTAIN_KEYWORDS, category_for_keyword, category_label, fallback_hotels,
    hotels_for_prefecture, products_in_category,
};
use crate::config::AffiliateConfig;
use crate::error::AffiliateLookupFailure;
use crate::model::{AffiliateHotel, AffiliateProduct};
use crate::prefecture::Region;
use crate::resolve::ResolvedMountain;

pub const SEED_BUCKETS: u32 = 100;
const MAX_KEYWORDS: usize = 5;

/// Where product and hotel candidates come from. The static catalog is always
/// available; API-backed sources may fail and are backed by it.
pub trait ProductSource {
    fn name(&self) -> &'static str;

    fn search_products(
        &self,
        keyword: &str,
        category: &str,
        max_results: usize,
    ) -> Result<Vec<AffiliateProduct>, AffiliateLookupFailure>;

    fn search_hotels(
        &self,
        prefecture: &str,
        nearest_station: &str,
        max_results: usize,
    ) -> Result<Vec<AffiliateHotel>, AffiliateLookupFailure>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StaticCatalog;

impl ProductSource for StaticCatalog {
    fn name(&self) -> &'static str {
        "static"
    }

    fn search_products(
        &self,
        _keyword: &str,
        category: &str,
        _max_results: usize,
    ) -> Result<Vec<AffiliateProduct>, AffiliateLookupFailure> {
        Ok(products_in_category(category))
    }

    fn search_hotels(
        &self,
        prefecture: &str,
        _nearest_station: &str,
        _max_results: usize,
    ) -> Result<Vec<AffiliateHotel>, AffiliateLookupFailure> {
        Ok(hotels_for_prefecture(prefecture).unwrap_or_else(fallback_hotels))
    }
}

pub fn seed_digest(seed: &[u8]) -> [u8; 32] {
    *blake3::hash(seed).as_bytes()
}

pub fn seed_bucket(seed: &[u8]) -> u32 {
    let digest = seed_digest(seed);
    u32::from_le_bytes([digest[0], digest[1], digest[2], digest[3]]) % SEED_BUCKETS
}

pub fn seeded_rng(seed: &[u8]) -> ChaCha12Rng {
    ChaCha12Rng::from_seed(seed_digest(seed))
}

#[derive(Debug, Clone, PartialEq)]
pub struct AffiliateSelection {
    pub keywords: Vec<String>,
    pub products: Vec<AffiliateProduct>,
    pub hotels: Vec<AffiliateHotel>,
    /// Lookups that failed and were answered from the static catalog.
    pub fallbacks: Vec<String>,
}

impl AffiliateSelection {
    pub fn product_ids(&self) -> Vec<&str> {
        self.products.iter().map(|product| product.id.as_str()).collect()
    }

    pub fn hotel_ids(&self) -> Vec<&str> {
        self.hotels.iter().map(|hotel| hotel.id.as_str()).collect()
    }
}

pub struct AffiliateSelector<'a> {
    source: &'a dyn ProductSource,
    max_products: usize,
    max_hotels: usize,
}

impl<'a> AffiliateSelector<'a> {
    pub fn new(source: &'a dyn ProductSource, config: &AffiliateConfig) -> Self {
        Self {
            source,
            max_products: config.max_products.max(1),
            max_hotels: config.max_hotels.clamp(1, 3),
        }
    }

    pub fn select(&self, mountain: &ResolvedMountain) -> AffiliateSelection {
        let bucket = seed_bucket(mountain.name.as_bytes()) as usize;
        let mut rng = seeded_rng(mountain.name.as_bytes());
        let mut fallbacks = Vec::new();

        let keywords = product_keywords(mountain, bucket, &mut rng);
        let products = self.pick_products(mountain, &keywords, &mut rng, &mut fallbacks);
        let hotels = self.pick_hotels(mountain, &mut rng, &mut fallbacks);
        debug!(
            "affiliate selection for {}: bucket {bucket}, {} products, {} hotels",
            mountain.name,
            products.len(),
            hotels.len()
        );

        AffiliateSelection {
            keywords,
            products,
            hotels,
            fallbacks,
        }
    }

    fn pick_products(
        &self,
        mountain: &ResolvedMountain,
        keywords: &[String],
        rng: &mut ChaCha12Rng,
        fallbacks: &mut Vec<String>,
    ) -> Vec<AffiliateProduct> {
        let mut categories: Vec<&'static str> = Vec::new();
        for &category in mountain.gear_tier.categories() {
            push_unique(&mut categories, category);
        }
        for keyword in keywords {
            if let Some(category) = category_for_keyword(keyword) {
                push_unique(&mut categories, category);
            }
        }

        let mut picked: Vec<AffiliateProduct> = Vec::new();
        for category in categories {
            if picked.len() >= self.max_products {
                break;
            }
            let keyword = keywords
                .iter()
                .find(|keyword| category_for_keyword(keyword) == Some(category))
                .map(String::as_str)
                .unwrap_or_else(|| category_label(category));
            let candidates = match self.source.search_products(keyword, category, 3) {
                Ok(found) if !found.is_empty() => found,
                Ok(_) => {
                    let failure = AffiliateLookupFailure::Empty(keyword.to_string());
                    self.note_fallback(mountain, &failure, fallbacks);
                    products_in_category(category)
                }
                Err(failure) => {
                    self.note_fallback(mountain, &failure, fallbacks);
                    products_in_category(category)
                }
            };
            if let Some(product) = candidates.choose(rng) {
                if !picked.iter().any(|existing| existing.id == product.id) {
                    picked.push(product.clone());
                }
            }
        }
        picked
    }

    fn pick_hotels(
        &self,
        mountain: &ResolvedMountain,
        rng: &mut ChaCha12Rng,
        fallbacks: &mut Vec<String>,
    ) -> Vec<AffiliateHotel> {
        let candidates = match self.source.search_hotels(
            &mountain.prefecture,
            &mountain.nearest_station,
            self.max_hotels,
        ) {
            Ok(found) if !found.is_empty() => found,
            Ok(_) => {
                let failure = AffiliateLookupFailure::Empty(mountain.prefecture.clone());
                self.note_fallback(mountain, &failure, fallbacks);
                static_hotels(&mountain.prefecture)
            }
            Err(failure) => {
                self.note_fallback(mountain, &failure, fallbacks);
                static_hotels(&mountain.prefecture)
            }
        };
        let wanted = rng.random_range(1..=self.max_hotels).min(candidates.len());
        candidates.choose_multiple(rng, wanted).cloned().collect()
    }

    fn note_fallback(
        &self,
        mountain: &ResolvedMountain,
        failure: &AffiliateLookupFailure,
        fallbacks: &mut Vec<String>,
    ) {
        warn!(
            "{}: {} source failed, using static catalog: {failure}",
            mountain.name,
            self.source.name()
        );
        fallbacks.push(failure.to_string());
    }
}

/// Static-catalog selection; identical for identical mountain names.
pub fn select_affiliate_content(
    mountain: &ResolvedMountain,
    config: &AffiliateConfig,
) -> AffiliateSelection {
    AffiliateSelector::new(&StaticCatalog, config).select(mountain)
}

/// Up to five de-duplicated search keywords in seed-dependent order.
pub fn product_keywords(
    mountain: &ResolvedMountain,
    bucket: usize,
    rng: &mut ChaCha12Rng,
) -> Vec<String> {
    let mut unique = keyword_pool(mountain, bucket);
    unique.shuffle(rng);
    unique.truncate(MAX_KEYWORDS);
    unique
}

/// Every keyword the mountain qualifies for, de-duplicated, before shuffling.
pub fn keyword_pool(mountain: &ResolvedMountain, bucket: usize) -> Vec<String> {
    let mut keywords: Vec<&str> = Vec::new();
    let primary = &KEYWORD_SETS[bucket % KEYWORD_SETS.len()];
    keywords.extend(primary.keywords.iter().take(2));
    let secondary = &KEYWORD_SETS[(bucket + 1) % KEYWORD_SETS.len()];
    keywords.extend(secondary.keywords.iter().take(1));

    if mountain.difficulty.is_beginner_friendly() {
        keywords.push(BEGINNER_KEYWORDS[bucket % BEGINNER_KEYWORDS.len()]);
    } else {
        keywords.push(ADVANCED_KEYWORDS[bucket % ADVANCED_KEYWORDS.len()]);
    }

    match mountain.elevation {
        Some(value) if value > 1500 => {
            keywords.push(HIGH_ALTITUDE_KEYWORDS[bucket % HIGH_ALTITUDE_KEYWORDS.len()])
        }
        Some(value) if value < 500 => {
            keywords.push(LOW_MOUNTAIN_KEYWORDS[bucket % LOW_MOUNTAIN_KEYWORDS.len()])
        }
        _ => {}
    }

    if mountain.prefecture.contains("北海道") {
        keywords.push("防寒");
    } else if mountain.prefecture.contains("沖縄") {
        keywords.push("日焼け対策");
    } else if mountain.prefecture.contains("東京") || mountain.region == Region::Kanto {
        keywords.push("都市近郊 ハイキング");
    }

    let mut unique: Vec<String> = Vec::new();
    for keyword in keywords {
        if !unique.iter().any(|existing| existing == keyword) {
            unique.push(keyword.to_string());
        }
    }
    unique
}

fn static_hotels(prefecture: &str) -> Vec<AffiliateHotel> {
    hotels_for_prefecture(prefecture).unwrap_or_else(fallback_hotels)
}

fn push_unique(categories: &mut Vec<&'static str>, category: &'static str) {
    if !categories.contains(&category) {
        categories.push(category);
    }
}
