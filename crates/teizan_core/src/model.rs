//! Mountain dataset records and the page/article models built from them.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::config::SiteConfig;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub metadata: DatasetMetadata,
    #[serde(default)]
    pub mountains: Vec<Mountain>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasetMetadata {
    #[serde(default)]
    pub total_mountains: usize,
    #[serde(default)]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
}

/// One mountain entry as it appears in the dataset file. Everything except
/// `id` and `name` may be missing and is resolved by [`crate::resolve`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mountain {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_en: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefecture: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevation: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seasons: Option<Seasons>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub trails: Vec<Trail>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_facilities"
    )]
    pub facilities: Option<Facilities>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nearby_attractions: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub article_themes: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Difficulty {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hiking_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevation_gain: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DifficultyLevel {
    #[serde(rename = "初級")]
    Beginner,
    #[serde(rename = "初級-中級")]
    BeginnerIntermediate,
    #[serde(rename = "中級")]
    Intermediate,
    #[serde(rename = "上級")]
    Advanced,
}

impl DifficultyLevel {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "初級" | "beginner" => Some(Self::Beginner),
            "初級-中級" | "初級〜中級" | "初中級" | "beginner-intermediate" => {
                Some(Self::BeginnerIntermediate)
            }
            "中級" | "intermediate" => Some(Self::Intermediate),
            "上級" | "advanced" => Some(Self::Advanced),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Beginner => "初級",
            Self::BeginnerIntermediate => "初級-中級",
            Self::Intermediate => "中級",
            Self::Advanced => "上級",
        }
    }

    pub fn is_beginner_friendly(self) -> bool {
        matches!(self, Self::Beginner | Self::BeginnerIntermediate)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nearest_station: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_time: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Seasons {
    #[serde(default, deserialize_with = "deserialize_one_or_many")]
    pub best: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cherry_blossom: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autumn_leaves: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trail {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub time: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Facilities {
    pub restrooms: bool,
    pub restaurant: bool,
    pub parking: bool,
    pub cable_car: bool,
    pub visitor_center: bool,
}

impl Facilities {
    /// Japanese labels of the facilities that are available.
    pub fn labels(&self) -> Vec<&'static str> {
        let mut out = Vec::new();
        if self.restrooms {
            out.push("トイレ");
        }
        if self.restaurant {
            out.push("飲食店");
        }
        if self.parking {
            out.push("駐車場");
        }
        if self.cable_car {
            out.push("ケーブルカー");
        }
        if self.visitor_center {
            out.push("ビジターセンター");
        }
        out
    }

    fn from_names(names: &[String]) -> Self {
        let mut facilities = Self::default();
        for name in names {
            match name.trim() {
                "restrooms" | "toilet" | "トイレ" => facilities.restrooms = true,
                "restaurant" | "飲食店" | "食堂" => facilities.restaurant = true,
                "parking" | "駐車場" => facilities.parking = true,
                "cable_car" | "ケーブルカー" | "ロープウェイ" => facilities.cable_car = true,
                "visitor_center" | "ビジターセンター" => facilities.visitor_center = true,
                _ => {}
            }
        }
        facilities
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FacilitiesRaw {
    Flags(Facilities),
    Names(Vec<String>),
}

fn deserialize_facilities<'de, D>(deserializer: D) -> Result<Option<Facilities>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Option<FacilitiesRaw> = Option::deserialize(deserializer)?;
    Ok(raw.map(|raw| match raw {
        FacilitiesRaw::Flags(flags) => flags,
        FacilitiesRaw::Names(names) => Facilities::from_names(&names),
    }))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

fn deserialize_one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Option<OneOrMany> = Option::deserialize(deserializer)?;
    Ok(match raw {
        None => Vec::new(),
        Some(OneOrMany::One(value)) => vec![value],
        Some(OneOrMany::Many(values)) => values,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeaturedImage {
    pub url: String,
    #[serde(default)]
    pub alt: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AffiliateProduct {
    pub id: String,
    pub name: String,
    pub price: u32,
    pub url: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shop_name: Option<String>,
}

impl AffiliateProduct {
    pub fn price_label(&self) -> String {
        format!("¥{}", group_thousands(self.price))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AffiliateHotel {
    pub id: String,
    pub name: String,
    pub price: u32,
    pub url: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub location: String,
}

impl AffiliateHotel {
    pub fn price_label(&self) -> String {
        format!("¥{}/泊", group_thousands(self.price))
    }
}

pub fn group_thousands(value: u32) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// A blog post tied to exactly one mountain. Serialized either as a static
/// page or as a WXR `<item>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub mountain_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub featured_image: Option<FeaturedImage>,
    #[serde(default)]
    pub affiliate_products: Vec<AffiliateProduct>,
    #[serde(default)]
    pub affiliate_hotels: Vec<AffiliateHotel>,
}

/// Input to the page shell: one page becomes `<path>/index.html`.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub path: String,
    pub title: String,
    pub meta_description: String,
    pub content: String,
    pub structured_data: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticLevel {
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    pub subject: Option<String>,
    pub message: String,
}

impl Diagnostic {
    pub fn warning(subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: DiagnosticLevel::Warning,
            subject: Some(subject.into()),
            message: message.into(),
        }
    }
}

/// Everything a build needs, loaded up front and never mutated.
#[derive(Debug, Clone)]
pub struct Project {
    pub root: PathBuf,
    pub config: SiteConfig,
    pub mountains: Vec<Mountain>,
    pub articles: Vec<Article>,
}

pub type TaskId = blake3::Hash;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskKind {
    WriteStylesheet,
    RenderMountain { mountain_id: String },
    RenderIndex,
    RenderMountainList,
    RenderRegionsOverview,
    RenderRegion { region: String },
    RenderPrefecture { prefecture: String },
    RenderEquipmentIndex,
    RenderEquipmentItem { item: String },
    RenderBeginnerIndex,
    RenderBeginnerTopic { topic: String },
    RenderStaticPage { page: String },
    GenerateSitemap,
}

#[derive(Debug, Clone)]
pub struct BuildTask {
    pub id: TaskId,
    pub kind: TaskKind,
    pub outputs: Vec<PathBuf>,
}

#[derive(Debug, Clone, Default)]
pub struct BuildPlan {
    pub tasks: Vec<BuildTask>,
    pub dirs: Vec<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thousands_are_grouped() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(12800), "12,800");
        assert_eq!(group_thousands(1234567), "1,234,567");
    }

    #[test]
    fn hotel_price_label_is_per_night() {
        let hotel = AffiliateHotel {
            id: "h".to_string(),
            name: "宿".to_string(),
            price: 8800,
            url: "https://example.com/".to_string(),
            description: String::new(),
            image_url: String::new(),
            location: String::new(),
        };
        assert_eq!(hotel.price_label(), "¥8,800/泊");
    }

    #[test]
    fn facilities_accept_list_form() {
        let raw = r#"{"id":"mt_a_tokyo","name":"A","facilities":["parking","トイレ"]}"#;
        let mountain: Mountain = serde_json::from_str(raw).expect("parse mountain");
        let facilities = mountain.facilities.expect("facilities");
        assert!(facilities.parking);
        assert!(facilities.restrooms);
        assert!(!facilities.cable_car);
    }

    #[test]
    fn season_best_accepts_single_string() {
        let raw = r#"{"id":"mt_a_tokyo","name":"A","seasons":{"best":"秋"}}"#;
        let mountain: Mountain = serde_json::from_str(raw).expect("parse mountain");
        assert_eq!(mountain.seasons.expect("seasons").best, vec!["秋"]);
    }

    #[test]
    fn difficulty_aliases_parse() {
        assert_eq!(DifficultyLevel::parse("初級"), Some(DifficultyLevel::Beginner));
        assert_eq!(
            DifficultyLevel::parse("beginner-intermediate"),
            Some(DifficultyLevel::BeginnerIntermediate)
        );
        assert_eq!(DifficultyLevel::parse("?"), None);
    }
}
