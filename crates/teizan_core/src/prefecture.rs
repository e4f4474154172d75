//! Static prefecture and macro-region tables.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Region {
    Hokkaido,
    Tohoku,
    Kanto,
    Chubu,
    Kansai,
    Chugoku,
    Shikoku,
    Kyushu,
    Other,
}

impl Region {
    pub const KNOWN: [Region; 8] = [
        Region::Hokkaido,
        Region::Tohoku,
        Region::Kanto,
        Region::Chubu,
        Region::Kansai,
        Region::Chugoku,
        Region::Shikoku,
        Region::Kyushu,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Region::Hokkaido => "北海道",
            Region::Tohoku => "東北",
            Region::Kanto => "関東",
            Region::Chubu => "中部",
            Region::Kansai => "関西",
            Region::Chugoku => "中国",
            Region::Shikoku => "四国",
            Region::Kyushu => "九州",
            Region::Other => "その他",
        }
    }

    /// Path segment under `regions/`.
    pub fn slug(self) -> &'static str {
        match self {
            Region::Hokkaido => "hokkaido",
            Region::Tohoku => "tohoku",
            Region::Kanto => "kanto",
            Region::Chubu => "chubu",
            Region::Kansai => "kansai",
            Region::Chugoku => "chugoku",
            Region::Shikoku => "shikoku",
            Region::Kyushu => "kyushu",
            Region::Other => "other",
        }
    }

    /// Accepts the Japanese label, the romaji slug, or the common 近畿 alias.
    pub fn parse(value: &str) -> Option<Region> {
        let value = value.trim();
        match value {
            "近畿" => return Some(Region::Kansai),
            "九州・沖縄" | "九州沖縄" | "沖縄" => return Some(Region::Kyushu),
            _ => {}
        }
        Region::KNOWN.into_iter().find(|region| {
            region.label() == value
                || region.slug().eq_ignore_ascii_case(value)
                || format!("{}地方", region.label()) == value
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Prefecture {
    /// Full name, e.g. `東京都`.
    pub name: &'static str,
    /// Name without the 都/道/府/県 suffix, e.g. `東京`.
    pub short: &'static str,
    pub romaji: &'static str,
    pub region: Region,
}

macro_rules! pref {
    ($name:literal, $short:literal, $romaji:literal, $region:ident) => {
        Prefecture {
            name: $name,
            short: $short,
            romaji: $romaji,
            region: Region::$region,
        }
    };
}

pub const PREFECTURES: [Prefecture; 47] = [
    pref!("北海道", "北海道", "hokkaido", Hokkaido),
    pref!("青森県", "青森", "aomori", Tohoku),
    pref!("岩手県", "岩手", "iwate", Tohoku),
    pref!("宮城県", "宮城", "miyagi", Tohoku),
    pref!("秋田県", "秋田", "akita", Tohoku),
    pref!("山形県", "山形", "yamagata", Tohoku),
    pref!("福島県", "福島", "fukushima", Tohoku),
    pref!("茨城県", "茨城", "ibaraki", Kanto),
    pref!("栃木県", "栃木", "tochigi", Kanto),
    pref!("群馬県", "群馬", "gunma", Kanto),
    pref!("埼玉県", "埼玉", "saitama", Kanto),
    pref!("千葉県", "千葉", "chiba", Kanto),
    pref!("東京都", "東京", "tokyo", Kanto),
    pref!("神奈川県", "神奈川", "kanagawa", Kanto),
    pref!("新潟県", "新潟", "niigata", Chubu),
    pref!("富山県", "富山", "toyama", Chubu),
    pref!("石川県", "石川", "ishikawa", Chubu),
    pref!("福井県", "福井", "fukui", Chubu),
    pref!("山梨県", "山梨", "yamanashi", Chubu),
    pref!("長野県", "長野", "nagano", Chubu),
    pref!("岐阜県", "岐阜", "gifu", Chubu),
    pref!("静岡県", "静岡", "shizuoka", Chubu),
    pref!("愛知県", "愛知", "aichi", Chubu),
    pref!("三重県", "三重", "mie", Kansai),
    pref!("滋賀県", "滋賀", "shiga", Kansai),
    pref!("京都府", "京都", "kyoto", Kansai),
    pref!("大阪府", "大阪", "osaka", Kansai),
    pref!("兵庫県", "兵庫", "hyogo", Kansai),
    pref!("奈良県", "奈良", "nara", Kansai),
    pref!("和歌山県", "和歌山", "wakayama", Kansai),
    pref!("鳥取県", "鳥取", "tottori", Chugoku),
    pref!("島根県", "島根", "shimane", Chugoku),
    pref!("岡山県", "岡山", "okayama", Chugoku),
    pref!("広島県", "広島", "hiroshima", Chugoku),
    pref!("山口県", "山口", "yamaguchi", Chugoku),
    pref!("徳島県", "徳島", "tokushima", Shikoku),
    pref!("香川県", "香川", "kagawa", Shikoku),
    pref!("愛媛県", "愛媛", "ehime", Shikoku),
    pref!("高知県", "高知", "kochi", Shikoku),
    pref!("福岡県", "福岡", "fukuoka", Kyushu),
    pref!("佐賀県", "佐賀", "saga", Kyushu),
    pref!("長崎県", "長崎", "nagasaki", Kyushu),
    pref!("熊本県", "熊本", "kumamoto", Kyushu),
    pref!("大分県", "大分", "oita", Kyushu),
    pref!("宮崎県", "宮崎", "miyazaki", Kyushu),
    pref!("鹿児島県", "鹿児島", "kagoshima", Kyushu),
    pref!("沖縄県", "沖縄", "okinawa", Kyushu),
];

/// Looks a prefecture up by full name, short name or romaji.
pub fn lookup(token: &str) -> Option<&'static Prefecture> {
    let token = token.trim();
    if token.is_empty() {
        return None;
    }
    PREFECTURES.iter().find(|pref| {
        pref.name == token || pref.short == token || pref.romaji.eq_ignore_ascii_case(token)
    })
}

pub fn region_for_prefecture(name: &str) -> Region {
    lookup(name).map(|pref| pref.region).unwrap_or(Region::Other)
}

/// Position in the conventional north-to-south ordering; unknown names sort last.
pub fn sort_key(name: &str) -> usize {
    PREFECTURES
        .iter()
        .position(|pref| pref.name == name)
        .unwrap_or(PREFECTURES.len())
}
