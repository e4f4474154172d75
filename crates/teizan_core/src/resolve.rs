//! Fills in everything a raw mountain record may omit. Pure and infallible:
//! gaps become placeholder text plus a warning.

use serde::Serialize;

use crate::model::{DifficultyLevel, Mountain, Trail};
use crate::prefecture::{self, Region};

pub const PLACEHOLDER: &str = "要確認";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum GearTier {
    Light,
    Standard,
    Full,
}

impl GearTier {
    pub fn for_elevation(elevation: Option<u32>) -> GearTier {
        match elevation {
            Some(value) if value < 200 => GearTier::Light,
            Some(value) if value < 400 => GearTier::Standard,
            Some(_) => GearTier::Full,
            None => GearTier::Standard,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            GearTier::Light => "軽装備",
            GearTier::Standard => "標準装備",
            GearTier::Full => "本格装備",
        }
    }

    /// Catalog categories recommended for the tier, most important first.
    pub fn categories(self) -> &'static [&'static str] {
        match self {
            GearTier::Light => &["shoes", "bottle"],
            GearTier::Standard => &["shoes", "backpack", "bottle"],
            GearTier::Full => &["shoes", "backpack", "rainwear", "bottle"],
        }
    }

    pub fn summary(self) -> &'static str {
        match self {
            GearTier::Light => "歩きやすいスニーカーと飲み物があれば十分楽しめます。",
            GearTier::Standard => {
                "滑りにくいトレッキングシューズと小型のリュック、十分な水分を用意しましょう。"
            }
            GearTier::Full => {
                "登山靴、レインウェア、行動食を含む日帰り登山の基本装備を揃えて臨みましょう。"
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeasonalText {
    pub best: String,
    pub spring: String,
    pub summer: String,
    pub autumn: String,
    pub winter: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedMountain {
    pub id: String,
    pub name: String,
    pub name_en: String,
    pub prefecture: String,
    pub region: Region,
    pub region_label: &'static str,
    pub elevation: Option<u32>,
    pub elevation_label: String,
    pub difficulty: DifficultyLevel,
    pub difficulty_label: &'static str,
    pub hiking_time: String,
    pub distance: String,
    pub elevation_gain: String,
    pub features: Vec<String>,
    pub nearest_station: String,
    pub access_time: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub seasons: SeasonalText,
    pub gear_tier: GearTier,
    pub gear_summary: &'static str,
    pub trails: Vec<Trail>,
    pub facilities: Vec<&'static str>,
    pub nearby_attractions: Vec<String>,
    pub keywords: Vec<String>,
    pub warnings: Vec<String>,
}

pub fn resolve_mountain(mountain: &Mountain) -> ResolvedMountain {
    let mut warnings = Vec::new();

    let prefecture = match resolve_prefecture(mountain) {
        Some(name) => name,
        None => {
            warnings.push(format!("{}: prefecture could not be determined", mountain.id));
            PLACEHOLDER.to_string()
        }
    };
    let region = resolve_region_for(mountain, &prefecture);

    let elevation_label = match mountain.elevation {
        Some(value) => format!("{value}m"),
        None => {
            warnings.push(format!("{}: elevation is missing", mountain.id));
            PLACEHOLDER.to_string()
        }
    };

    let difficulty_raw = mountain.difficulty.clone().unwrap_or_default();
    let difficulty = match difficulty_raw.level.as_deref().map(DifficultyLevel::parse) {
        Some(Some(level)) => level,
        Some(None) => {
            warnings.push(format!(
                "{}: unknown difficulty level '{}'",
                mountain.id,
                difficulty_raw.level.as_deref().unwrap_or_default()
            ));
            DifficultyLevel::Beginner
        }
        None => {
            warnings.push(format!("{}: difficulty level is missing", mountain.id));
            DifficultyLevel::Beginner
        }
    };

    let location = mountain.location.clone().unwrap_or_default();
    let gear_tier = GearTier::for_elevation(mountain.elevation);

    ResolvedMountain {
        id: mountain.id.clone(),
        name: mountain.name.clone(),
        name_en: or_placeholder(mountain.name_en.as_deref()),
        seasons: seasonal_text(mountain, region),
        prefecture,
        region,
        region_label: region.label(),
        elevation: mountain.elevation,
        elevation_label,
        difficulty,
        difficulty_label: difficulty.label(),
        hiking_time: or_placeholder(difficulty_raw.hiking_time.as_deref()),
        distance: or_placeholder(difficulty_raw.distance.as_deref()),
        elevation_gain: or_placeholder(difficulty_raw.elevation_gain.as_deref()),
        features: mountain.features.clone(),
        nearest_station: or_placeholder(location.nearest_station.as_deref()),
        access_time: or_placeholder(location.access_time.as_deref()),
        latitude: location.latitude,
        longitude: location.longitude,
        gear_tier,
        gear_summary: gear_tier.summary(),
        trails: mountain.trails.clone(),
        facilities: mountain
            .facilities
            .map(|facilities| facilities.labels())
            .unwrap_or_default(),
        nearby_attractions: mountain.nearby_attractions.clone(),
        keywords: mountain.keywords.clone(),
        warnings,
    }
}

/// Full prefecture name, from the record or inferred from the id suffix.
pub fn resolve_prefecture(mountain: &Mountain) -> Option<String> {
    if let Some(given) = non_blank(mountain.prefecture.as_deref()) {
        return Some(
            prefecture::lookup(given)
                .map(|pref| pref.name.to_string())
                .unwrap_or_else(|| given.to_string()),
        );
    }
    let token = mountain.id.rsplit('_').next()?;
    prefecture::lookup(token).map(|pref| pref.name.to_string())
}

/// Never empty: unknown prefectures land in [`Region::Other`].
pub fn resolve_region(mountain: &Mountain) -> Region {
    let prefecture = resolve_prefecture(mountain).unwrap_or_default();
    resolve_region_for(mountain, &prefecture)
}

fn resolve_region_for(mountain: &Mountain, prefecture: &str) -> Region {
    if let Some(region) = mountain.region.as_deref().and_then(Region::parse) {
        return region;
    }
    prefecture::region_for_prefecture(prefecture)
}

struct SeasonTemplate {
    best: &'static str,
    spring: &'static str,
    summer: &'static str,
    autumn: &'static str,
    winter: &'static str,
}

const HOKKAIDO_SEASONS: SeasonTemplate = SeasonTemplate {
    best: "夏・秋",
    spring: "雪解けは5月中旬以降。残雪に注意しながら新芽の季節を楽しめます。",
    summer: "本州より涼しく、高山植物が咲く快適な登山シーズンです。",
    autumn: "9月下旬から一足早い紅葉が始まります。朝晩の冷え込みに備えましょう。",
    winter: "積雪期は冬山の装備と経験が必要です。無理な入山は控えましょう。",
};

const KYUSHU_SEASONS: SeasonTemplate = SeasonTemplate {
    best: "春・秋・冬",
    spring: "3月から新緑が始まり、温暖な気候の中で歩きやすい季節です。",
    summer: "高温多湿になるため、早朝の出発とこまめな水分補給が欠かせません。",
    autumn: "11月前後が紅葉の見頃。澄んだ空気で展望も良好です。",
    winter: "比較的温暖で、冬でも低山ハイキングを楽しめます。",
};

const DEFAULT_SEASONS: SeasonTemplate = SeasonTemplate {
    best: "春・秋",
    spring: "新緑と花々が美しく、気温も穏やかで登山に最適な季節です。",
    summer: "暑さ対策と水分補給を忘れずに。朝の涼しい時間帯がおすすめです。",
    autumn: "紅葉と澄んだ空気が楽しめる、一年で最も人気のシーズンです。",
    winter: "空気が澄んで遠くまで見渡せます。防寒対策をして出かけましょう。",
};

fn season_template(region: Region) -> &'static SeasonTemplate {
    match region {
        Region::Hokkaido => &HOKKAIDO_SEASONS,
        Region::Kyushu => &KYUSHU_SEASONS,
        _ => &DEFAULT_SEASONS,
    }
}

#[derive(Clone, Copy)]
enum Season {
    Spring,
    Summer,
    Autumn,
    Winter,
}

const SEASON_KEYWORDS: &[(&str, Season)] = &[
    ("桜", Season::Spring),
    ("cherry", Season::Spring),
    ("新緑", Season::Summer),
    ("紅葉", Season::Autumn),
    ("autumn", Season::Autumn),
    ("夜景", Season::Winter),
    ("night", Season::Winter),
];

fn seasonal_text(mountain: &Mountain, region: Region) -> SeasonalText {
    let template = season_template(region);
    let seasons = mountain.seasons.clone().unwrap_or_default();
    let mut text = SeasonalText {
        best: if seasons.best.is_empty() {
            template.best.to_string()
        } else {
            seasons.best.join("・")
        },
        spring: template.spring.to_string(),
        summer: template.summer.to_string(),
        autumn: template.autumn.to_string(),
        winter: template.winter.to_string(),
    };

    for feature in &mountain.features {
        let lowered = feature.to_lowercase();
        let Some(season) = SEASON_KEYWORDS
            .iter()
            .find(|(keyword, _)| lowered.contains(keyword))
            .map(|(_, season)| *season)
        else {
            continue;
        };
        let extra = match season {
            Season::Spring => format!("{feature}の季節は特に多くの人で賑わいます。"),
            Season::Summer => format!("{feature}に包まれた登山道が爽やかです。"),
            Season::Autumn => format!("{feature}が山全体を彩ります。"),
            Season::Winter => format!("空気の澄んだ冬は{feature}が一段と美しく見えます。"),
        };
        let slot = match season {
            Season::Spring => &mut text.spring,
            Season::Summer => &mut text.summer,
            Season::Autumn => &mut text.autumn,
            Season::Winter => &mut text.winter,
        };
        if !slot.contains(&extra) {
            slot.push_str(&extra);
        }
    }

    if let Some(timing) = non_blank(seasons.cherry_blossom.as_deref()) {
        text.spring.push_str(&format!("桜の見頃は{timing}です。"));
    }
    if let Some(timing) = non_blank(seasons.autumn_leaves.as_deref()) {
        text.autumn.push_str(&format!("紅葉の見頃は{timing}です。"));
    }
    text
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|text| !text.is_empty())
}

fn or_placeholder(value: Option<&str>) -> String {
    non_blank(value).unwrap_or(PLACEHOLDER).to_string()
}
