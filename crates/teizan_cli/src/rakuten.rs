//! Rakuten Ichiba / Travel lookups behind [`ProductSource`].

use std::time::Duration;

use log::debug;
use serde::Deserialize;
use teizan_core::affiliate::ProductSource;
use teizan_core::config::RakutenConfig;
use teizan_core::error::AffiliateLookupFailure;
use teizan_core::model::{AffiliateHotel, AffiliateProduct};
use teizan_core::resolve::PLACEHOLDER;

const ITEM_SEARCH_PATH: &str = "IchibaItem/Search/20170706";
const HOTEL_SEARCH_PATH: &str = "Travel/KeywordHotelSearch/20170426";
const MIN_PRICE: u32 = 1000;
const MAX_PRICE: u32 = 50000;
const DESCRIPTION_CHARS: usize = 150;

pub struct RakutenSource {
    agent: ureq::Agent,
    config: RakutenConfig,
}

impl RakutenSource {
    pub fn new(config: RakutenConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build();
        Self { agent, config }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.endpoint.trim_end_matches('/'), path)
    }

    fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, AffiliateLookupFailure> {
        let mut request = self
            .agent
            .get(&self.url(path))
            .query("applicationId", &self.config.application_id)
            .query("format", "json");
        if !self.config.affiliate_id.is_empty() {
            request = request.query("affiliateId", &self.config.affiliate_id);
        }
        for (key, value) in params {
            request = request.query(key, value);
        }
        let response = request
            .call()
            .map_err(|err| AffiliateLookupFailure::Request(err.to_string()))?;
        response
            .into_json::<T>()
            .map_err(|err| AffiliateLookupFailure::Decode(err.to_string()))
    }
}

impl ProductSource for RakutenSource {
    fn name(&self) -> &'static str {
        "rakuten"
    }

    fn search_products(
        &self,
        keyword: &str,
        category: &str,
        max_results: usize,
    ) -> Result<Vec<AffiliateProduct>, AffiliateLookupFailure> {
        debug!("rakuten item search: {keyword} ({category})");
        let response: ItemSearchResponse = self.get_json(
            ITEM_SEARCH_PATH,
            &[
                ("keyword", keyword.to_string()),
                ("hits", max_results.clamp(1, 30).to_string()),
                ("minPrice", MIN_PRICE.to_string()),
                ("maxPrice", MAX_PRICE.to_string()),
                ("sort", "standard".to_string()),
            ],
        )?;
        let products = products_from_response(response, category, max_results);
        if products.is_empty() {
            return Err(AffiliateLookupFailure::Empty(keyword.to_string()));
        }
        Ok(products)
    }

    fn search_hotels(
        &self,
        prefecture: &str,
        nearest_station: &str,
        max_results: usize,
    ) -> Result<Vec<AffiliateHotel>, AffiliateLookupFailure> {
        let keyword = hotel_keyword(prefecture, nearest_station);
        debug!("rakuten hotel search: {keyword}");
        let response: HotelSearchResponse = self.get_json(
            HOTEL_SEARCH_PATH,
            &[
                ("keyword", keyword.clone()),
                ("hits", max_results.clamp(1, 30).to_string()),
            ],
        )?;
        let hotels = hotels_from_response(response, max_results);
        if hotels.is_empty() {
            return Err(AffiliateLookupFailure::Empty(keyword));
        }
        Ok(hotels)
    }
}

/// Station first, then prefecture; placeholder values are not searched.
pub fn hotel_keyword(prefecture: &str, nearest_station: &str) -> String {
    let usable = |value: &str| !value.trim().is_empty() && value != PLACEHOLDER;
    if usable(nearest_station) {
        format!("{} ホテル", nearest_station.trim())
    } else if usable(prefecture) {
        format!("{} ホテル", prefecture.trim())
    } else {
        "登山 ホテル".to_string()
    }
}

#[derive(Debug, Deserialize)]
struct ItemSearchResponse {
    #[serde(rename = "Items", default)]
    items: Vec<ItemWrapper>,
}

#[derive(Debug, Deserialize)]
struct ItemWrapper {
    #[serde(rename = "Item")]
    item: Item,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Item {
    item_code: String,
    item_name: String,
    item_price: u32,
    item_url: String,
    #[serde(default)]
    affiliate_url: String,
    #[serde(default)]
    item_caption: String,
    #[serde(default)]
    shop_name: Option<String>,
    #[serde(default)]
    medium_image_urls: Vec<ImageUrl>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImageUrl {
    image_url: String,
}

#[derive(Debug, Deserialize)]
struct HotelSearchResponse {
    #[serde(default)]
    hotels: Vec<HotelWrapper>,
}

#[derive(Debug, Deserialize)]
struct HotelWrapper {
    #[serde(default)]
    hotel: Vec<HotelPart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HotelPart {
    #[serde(default)]
    hotel_basic_info: Option<HotelBasicInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HotelBasicInfo {
    hotel_no: u64,
    hotel_name: String,
    hotel_information_url: String,
    #[serde(default)]
    hotel_min_charge: Option<u32>,
    #[serde(default)]
    hotel_special: Option<String>,
    #[serde(default)]
    address1: Option<String>,
    #[serde(default)]
    address2: Option<String>,
    #[serde(default)]
    hotel_thumbnail_url: Option<String>,
}

fn truncate_chars(value: &str, max: usize) -> String {
    let trimmed = value.trim();
    if trimmed.chars().count() <= max {
        return trimmed.to_string();
    }
    let mut out: String = trimmed.chars().take(max).collect();
    out.push('…');
    out
}

fn products_from_response(
    response: ItemSearchResponse,
    category: &str,
    max_results: usize,
) -> Vec<AffiliateProduct> {
    response
        .items
        .into_iter()
        .map(|wrapper| wrapper.item)
        .take(max_results)
        .map(|item| AffiliateProduct {
            id: item.item_code,
            name: item.item_name,
            price: item.item_price,
            url: if item.affiliate_url.is_empty() {
                item.item_url
            } else {
                item.affiliate_url
            },
            description: truncate_chars(&item.item_caption, DESCRIPTION_CHARS),
            image_url: item
                .medium_image_urls
                .into_iter()
                .next()
                .map(|image| image.image_url)
                .unwrap_or_default(),
            category: category.to_string(),
            shop_name: item.shop_name,
        })
        .collect()
}

fn hotels_from_response(response: HotelSearchResponse, max_results: usize) -> Vec<AffiliateHotel> {
    response
        .hotels
        .into_iter()
        .filter_map(|wrapper| {
            wrapper
                .hotel
                .into_iter()
                .find_map(|part| part.hotel_basic_info)
        })
        .take(max_results)
        .map(|info| AffiliateHotel {
            id: info.hotel_no.to_string(),
            name: info.hotel_name,
            price: info.hotel_min_charge.unwrap_or(0),
            url: info.hotel_information_url,
            description: truncate_chars(
                info.hotel_special.as_deref().unwrap_or_default(),
                DESCRIPTION_CHARS,
            ),
            image_url: info.hotel_thumbnail_url.unwrap_or_default(),
            location: format!(
                "{}{}",
                info.address1.unwrap_or_default(),
                info.address2.unwrap_or_default()
            ),
        })
        .collect()
}
