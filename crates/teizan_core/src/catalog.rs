//! In-memory affiliate catalogs: products by category, hotels by prefecture.

use crate::model::{AffiliateHotel, AffiliateProduct};

pub struct KeywordSet {
    pub category: &'static str,
    pub keywords: &'static [&'static str],
}

/// Basic keyword sets; the affiliate seed picks one of these per mountain.
pub const KEYWORD_SETS: [KeywordSet; 8] = [
    KeywordSet {
        category: "shoes",
        keywords: &["登山靴", "トレッキングシューズ"],
    },
    KeywordSet {
        category: "wear",
        keywords: &["ハイキング ウェア", "アウトドア ジャケット", "登山 パンツ"],
    },
    KeywordSet {
        category: "backpack",
        keywords: &["リュック", "バックパック", "デイパック"],
    },
    KeywordSet {
        category: "bottle",
        keywords: &["水筒", "ボトル", "ハイドレーション"],
    },
    KeywordSet {
        category: "rainwear",
        keywords: &["レインウェア", "雨具", "ポンチョ"],
    },
    KeywordSet {
        category: "hat",
        keywords: &["帽子", "キャップ", "ハット"],
    },
    KeywordSet {
        category: "gloves",
        keywords: &["グローブ", "手袋", "軍手"],
    },
    KeywordSet {
        category: "towel",
        keywords: &["タオル", "手ぬぐい", "バンダナ"],
    },
];

pub const BEGINNER_KEYWORDS: [&str; 4] = ["初心者 登山", "ハイキング", "軽登山", "散策"];
pub const ADVANCED_KEYWORDS: [&str; 4] = ["登山 装備", "トレッキング ポール", "本格登山", "山岳装備"];
pub const HIGH_ALTITUDE_KEYWORDS: [&str; 3] = ["高山 装備", "アルパイン", "高地 対応"];
pub const LOW_MOUNTAIN_KEYWORDS: [&str; 3] = ["低山 ハイキング", "里山 散策", "ウォーキング"];

const EXTRA_KEYWORD_CATEGORIES: &[(&str, &str)] = &[
    ("防寒", "cold"),
    ("日焼け対策", "sun"),
    ("トレッキング ポール", "pole"),
    ("高山 装備", "cold"),
    ("アルパイン", "cold"),
];

/// Catalog category a search keyword points at, if any.
pub fn category_for_keyword(keyword: &str) -> Option<&'static str> {
    if let Some(set) = KEYWORD_SETS
        .iter()
        .find(|set| set.keywords.iter().any(|candidate| *candidate == keyword))
    {
        return Some(set.category);
    }
    EXTRA_KEYWORD_CATEGORIES
        .iter()
        .find(|(candidate, _)| *candidate == keyword)
        .map(|(_, category)| *category)
}

pub fn category_label(category: &str) -> &'static str {
    match category {
        "shoes" => "登山靴・トレッキングシューズ",
        "wear" => "ウェア",
        "backpack" => "リュック・バックパック",
        "bottle" => "水筒・ボトル",
        "rainwear" => "レインウェア",
        "hat" => "帽子",
        "gloves" => "グローブ",
        "towel" => "タオル",
        "cold" => "防寒具",
        "sun" => "日焼け対策",
        "pole" => "トレッキングポール",
        _ => "登山用品",
    }
}

struct ProductEntry {
    id: &'static str,
    category: &'static str,
    name: &'static str,
    price: u32,
    url: &'static str,
    image_url: &'static str,
    description: &'static str,
    shop_name: &'static str,
}

impl ProductEntry {
    fn to_product(&self) -> AffiliateProduct {
        AffiliateProduct {
            id: self.id.to_string(),
            name: self.name.to_string(),
            price: self.price,
            url: self.url.to_string(),
            description: self.description.to_string(),
            image_url: self.image_url.to_string(),
            category: self.category.to_string(),
            shop_name: Some(self.shop_name.to_string()),
        }
    }
}

const PRODUCTS: &[ProductEntry] = &[
    ProductEntry {
        id: "shoes-lad-waterproof",
        category: "shoes",
        name: "防水トレッキングシューズ 撥水・防汚加工",
        price: 4680,
        url: "https://item.rakuten.co.jp/vanilla-vague/ladshoes004/",
        image_url: "https://thumbnail.image.rakuten.co.jp/@0_gold/vanilla-vague/images/thumb/ladshoes004-thum740-001.jpg?_ex=128x128",
        description: "ドイツの撥水・防汚技術を使った軽量な防水シューズ。低山ハイキングに最適です。",
        shop_name: "vanilla vague",
    },
    ProductEntry {
        id: "shoes-mid-cut",
        category: "shoes",
        name: "ミッドカット 登山靴 ゴアテックス搭載",
        price: 16800,
        url: "https://search.rakuten.co.jp/search/mall/mid-cut-trekking-shoes/",
        image_url: "",
        description: "足首を守るミッドカット。岩場やぬかるみのある登山道でも安定します。",
        shop_name: "アウトドアショップ山と道具",
    },
    ProductEntry {
        id: "backpack-quechua-20l",
        category: "backpack",
        name: "ケシュア ハイキング バックパック 20L",
        price: 3990,
        url: "https://item.rakuten.co.jp/decathlon-japan/4287298535504/",
        image_url: "https://thumbnail.image.rakuten.co.jp/@0_mall/decathlon-japan/cabinet/thumb250704/4287298535504_thumb.jpg?_ex=128x128",
        description: "日帰りの低山ハイキングにちょうどよい容量の軽量リュック。",
        shop_name: "Decathlon Japan 楽天市場店",
    },
    ProductEntry {
        id: "backpack-daypack-25l",
        category: "backpack",
        name: "レインカバー付き デイパック 25L",
        price: 7980,
        url: "https://search.rakuten.co.jp/search/mall/daypack-25l/",
        image_url: "",
        description: "背面メッシュで蒸れにくく、レインカバーが付属する日帰り登山向けモデル。",
        shop_name: "アウトドアショップ山と道具",
    },
    ProductEntry {
        id: "bottle-nalgene-1l",
        category: "bottle",
        name: "ナルゲン 広口1.0L トライタンボトル",
        price: 2268,
        url: "https://item.rakuten.co.jp/canpanera/n16002/",
        image_url: "https://thumbnail.image.rakuten.co.jp/@0_mall/canpanera/cabinet/item206/item_n16002_0.jpg?_ex=128x128",
        description: "丈夫で気密性が高く、世界中のハイカーに愛用される定番ボトル。",
        shop_name: "CAMPANERAオンラインストア",
    },
    ProductEntry {
        id: "bottle-thermos-500",
        category: "bottle",
        name: "山専用 ステンレスボトル 500ml",
        price: 4400,
        url: "https://search.rakuten.co.jp/search/mall/thermos-mountain-bottle/",
        image_url: "",
        description: "保温・保冷に優れ、山頂で温かい飲み物を楽しめます。",
        shop_name: "アウトドアショップ山と道具",
    },
    ProductEntry {
        id: "rainwear-jacket",
        category: "rainwear",
        name: "防水透湿 レインジャケット 上下セット",
        price: 8980,
        url: "https://search.rakuten.co.jp/search/mall/rain-jacket-set/",
        image_url: "",
        description: "急な雨にも安心の上下セット。コンパクトに収納できます。",
        shop_name: "アウトドアショップ山と道具",
    },
    ProductEntry {
        id: "rainwear-poncho",
        category: "rainwear",
        name: "リュックごと覆える レインポンチョ",
        price: 2980,
        url: "https://search.rakuten.co.jp/search/mall/rain-poncho/",
        image_url: "",
        description: "リュックを背負ったまま着られる軽量ポンチョ。",
        shop_name: "雨具専門店",
    },
    ProductEntry {
        id: "wear-quickdry-shirt",
        category: "wear",
        name: "速乾 ロングスリーブ ハイキングシャツ",
        price: 3280,
        url: "https://search.rakuten.co.jp/search/mall/quick-dry-shirt/",
        image_url: "",
        description: "汗をすばやく乾かし、体の冷えを防ぐ吸汗速乾シャツ。",
        shop_name: "アウトドアウェア館",
    },
    ProductEntry {
        id: "wear-stretch-pants",
        category: "wear",
        name: "ストレッチ トレッキングパンツ",
        price: 5480,
        url: "https://search.rakuten.co.jp/search/mall/trekking-pants/",
        image_url: "",
        description: "足さばきの良いストレッチ素材。撥水加工で小雨にも対応。",
        shop_name: "アウトドアウェア館",
    },
    ProductEntry {
        id: "hat-uv-cap",
        category: "hat",
        name: "UVカット 登山キャップ",
        price: 2480,
        url: "https://search.rakuten.co.jp/search/mall/uv-cap-hiking/",
        image_url: "",
        description: "日差しと熱中症対策に。首元を守るたれ付き。",
        shop_name: "アウトドアウェア館",
    },
    ProductEntry {
        id: "gloves-light",
        category: "gloves",
        name: "滑り止め付き トレッキンググローブ",
        price: 1980,
        url: "https://search.rakuten.co.jp/search/mall/trekking-gloves/",
        image_url: "",
        description: "鎖場やロープ場で手を守る、通気性の良いグローブ。",
        shop_name: "アウトドアウェア館",
    },
    ProductEntry {
        id: "towel-quickdry",
        category: "towel",
        name: "速乾 マイクロファイバータオル",
        price: 1280,
        url: "https://search.rakuten.co.jp/search/mall/quick-dry-towel/",
        image_url: "",
        description: "軽くてすぐ乾く、汗拭きに便利なタオル。",
        shop_name: "雑貨のやまみち",
    },
    ProductEntry {
        id: "cold-fleece",
        category: "cold",
        name: "軽量 フリースジャケット",
        price: 4980,
        url: "https://search.rakuten.co.jp/search/mall/fleece-jacket/",
        image_url: "",
        description: "山頂での休憩時や朝夕の冷え込みに備える防寒着。",
        shop_name: "アウトドアウェア館",
    },
    ProductEntry {
        id: "sun-sunscreen",
        category: "sun",
        name: "ウォータープルーフ 日焼け止め SPF50+",
        price: 1580,
        url: "https://search.rakuten.co.jp/search/mall/sunscreen-spf50/",
        image_url: "",
        description: "汗に強い日焼け止め。日差しの強い南の山歩きに。",
        shop_name: "雑貨のやまみち",
    },
    ProductEntry {
        id: "pole-carbon",
        category: "pole",
        name: "カーボン トレッキングポール 2本セット",
        price: 6980,
        url: "https://search.rakuten.co.jp/search/mall/trekking-pole-carbon/",
        image_url: "",
        description: "下りの膝への負担を軽減する軽量カーボンポール。",
        shop_name: "アウトドアショップ山と道具",
    },
];

pub fn products_in_category(category: &str) -> Vec<AffiliateProduct> {
    PRODUCTS
        .iter()
        .filter(|entry| entry.category == category)
        .map(ProductEntry::to_product)
        .collect()
}

pub fn all_products() -> Vec<AffiliateProduct> {
    PRODUCTS.iter().map(ProductEntry::to_product).collect()
}

struct HotelEntry {
    id: &'static str,
    prefecture: &'static str,
    name: &'static str,
    price: u32,
    url: &'static str,
    location: &'static str,
    description: &'static str,
}

impl HotelEntry {
    fn to_hotel(&self) -> AffiliateHotel {
        AffiliateHotel {
            id: self.id.to_string(),
            name: self.name.to_string(),
            price: self.price,
            url: self.url.to_string(),
            description: self.description.to_string(),
            image_url: String::new(),
            location: self.location.to_string(),
        }
    }
}

const HOTELS: &[HotelEntry] = &[
    HotelEntry {
        id: "tokyo-takao-onsen",
        prefecture: "東京都",
        name: "高尾山麓 温泉旅館",
        price: 12800,
        url: "https://kw.travel.rakuten.co.jp/keyword/Search.do?f_query=takaosan",
        location: "京王線高尾山口駅徒歩5分",
        description: "下山後に立ち寄れる日帰り入浴も人気の温泉宿。",
    },
    HotelEntry {
        id: "tokyo-hachioji-hotel",
        prefecture: "東京都",
        name: "八王子駅前 ビジネスホテル",
        price: 7200,
        url: "https://kw.travel.rakuten.co.jp/keyword/Search.do?f_query=hachioji",
        location: "JR八王子駅徒歩3分",
        description: "奥多摩・高尾方面への前泊に便利な駅前ホテル。",
    },
    HotelEntry {
        id: "tokyo-okutama-minshuku",
        prefecture: "東京都",
        name: "奥多摩 渓谷の民宿",
        price: 9500,
        url: "https://kw.travel.rakuten.co.jp/keyword/Search.do?f_query=okutama",
        location: "JR奥多摩駅より車で10分",
        description: "渓流のせせらぎを聞きながら過ごせる家庭的な民宿。",
    },
    HotelEntry {
        id: "kanagawa-hakone-ryokan",
        prefecture: "神奈川県",
        name: "箱根湯本 源泉かけ流しの宿",
        price: 15800,
        url: "https://kw.travel.rakuten.co.jp/keyword/Search.do?f_query=hakoneyumoto",
        location: "箱根湯本駅徒歩7分",
        description: "金時山・明神ヶ岳の登山後に最適な温泉旅館。",
    },
    HotelEntry {
        id: "kanagawa-kamakura-hotel",
        prefecture: "神奈川県",
        name: "鎌倉 古都のホテル",
        price: 11200,
        url: "https://kw.travel.rakuten.co.jp/keyword/Search.do?f_query=kamakura",
        location: "JR鎌倉駅徒歩6分",
        description: "鎌倉アルプスのハイキング拠点に。",
    },
    HotelEntry {
        id: "saitama-chichibu-ryokan",
        prefecture: "埼玉県",
        name: "秩父 里山の湯宿",
        price: 10800,
        url: "https://kw.travel.rakuten.co.jp/keyword/Search.do?f_query=chichibu",
        location: "西武秩父駅より送迎あり",
        description: "宝登山や武甲山の登山後にゆっくり休める宿。",
    },
    HotelEntry {
        id: "tochigi-nikko-lodge",
        prefecture: "栃木県",
        name: "ロヂテ・サンボア（聖なる森）",
        price: 7500,
        url: "https://travel.rakuten.co.jp/HOTEL/2950/2950.html",
        location: "JR日光駅より車で3分",
        description: "男体山一望の静かな一軒宿。岩風呂で登山の疲れを癒やせます。",
    },
    HotelEntry {
        id: "chiba-makuhari-hotel",
        prefecture: "千葉県",
        name: "ホテルフランクス",
        price: 8800,
        url: "https://travel.rakuten.co.jp/HOTEL/4929/4929.html",
        location: "海浜幕張駅徒歩4分",
        description: "全室禁煙で快適。鋸山方面への前泊にも。",
    },
    HotelEntry {
        id: "hokkaido-hakodate-hotel",
        prefecture: "北海道",
        name: "函館ベイエリア ホテル",
        price: 9800,
        url: "https://kw.travel.rakuten.co.jp/keyword/Search.do?f_query=hakodate",
        location: "函館駅徒歩8分",
        description: "函館山の夜景鑑賞に便利なベイエリアのホテル。",
    },
    HotelEntry {
        id: "hokkaido-sapporo-hotel",
        prefecture: "北海道",
        name: "札幌 藻岩山麓ホテル",
        price: 8600,
        url: "https://kw.travel.rakuten.co.jp/keyword/Search.do?f_query=sapporo",
        location: "ロープウェイ山麓駅より車で5分",
        description: "藻岩山・円山登山の拠点に。",
    },
    HotelEntry {
        id: "nagano-matsumoto-inn",
        prefecture: "長野県",
        name: "松本 城下町の宿",
        price: 9200,
        url: "https://kw.travel.rakuten.co.jp/keyword/Search.do?f_query=matsumoto",
        location: "JR松本駅徒歩10分",
        description: "北アルプス前山や美ヶ原への観光拠点。",
    },
    HotelEntry {
        id: "kyoto-arashiyama-ryokan",
        prefecture: "京都府",
        name: "嵐山 川沿いの旅館",
        price: 16500,
        url: "https://kw.travel.rakuten.co.jp/keyword/Search.do?f_query=arashiyama",
        location: "嵐電嵐山駅徒歩5分",
        description: "大文字山・愛宕山ハイキングの後に京の風情を。",
    },
    HotelEntry {
        id: "osaka-minoo-hotel",
        prefecture: "大阪府",
        name: "箕面 温泉スパホテル",
        price: 11800,
        url: "https://kw.travel.rakuten.co.jp/keyword/Search.do?f_query=minoo",
        location: "阪急箕面駅徒歩3分",
        description: "箕面の滝と周辺の低山歩きに便利な温泉ホテル。",
    },
    HotelEntry {
        id: "hyogo-arima-ryokan",
        prefecture: "兵庫県",
        name: "有馬温泉 六甲山麓の宿",
        price: 18800,
        url: "https://kw.travel.rakuten.co.jp/keyword/Search.do?f_query=arima",
        location: "神戸電鉄有馬温泉駅徒歩5分",
        description: "六甲山縦走のゴールに最適な名湯の宿。",
    },
    HotelEntry {
        id: "nara-yoshino-inn",
        prefecture: "奈良県",
        name: "吉野山 宿坊",
        price: 13200,
        url: "https://kw.travel.rakuten.co.jp/keyword/Search.do?f_query=yoshino",
        location: "吉野山ロープウェイ山上駅徒歩10分",
        description: "千本桜を望む歴史ある宿坊。",
    },
    HotelEntry {
        id: "kagawa-shodoshima-ryokan",
        prefecture: "香川県",
        name: "旭屋旅館＜香川県・小豆島＞",
        price: 6800,
        url: "https://travel.rakuten.co.jp/HOTEL/13651/13651.html",
        location: "土庄港徒歩1分",
        description: "小豆島観光と寒霞渓ハイキングの拠点に最適。",
    },
    HotelEntry {
        id: "fukuoka-dazaifu-hotel",
        prefecture: "福岡県",
        name: "太宰府 天満宮門前の宿",
        price: 8900,
        url: "https://kw.travel.rakuten.co.jp/keyword/Search.do?f_query=dazaifu",
        location: "西鉄太宰府駅徒歩3分",
        description: "宝満山登山と太宰府観光を一度に楽しめます。",
    },
    HotelEntry {
        id: "okinawa-nago-resort",
        prefecture: "沖縄県",
        name: "やんばる 森のリゾート",
        price: 14800,
        url: "https://kw.travel.rakuten.co.jp/keyword/Search.do?f_query=yanbaru",
        location: "名護市街より車で30分",
        description: "やんばるの森歩きと海を満喫できるリゾート。",
    },
];

const FALLBACK_HOTELS: &[HotelEntry] = &[
    HotelEntry {
        id: "fallback-station-hotel",
        prefecture: "",
        name: "駅前 ビジネスホテル",
        price: 6800,
        url: "https://travel.rakuten.co.jp/",
        location: "最寄り駅周辺",
        description: "登山前の前泊に便利な駅前の宿泊施設。",
    },
    HotelEntry {
        id: "fallback-onsen-ryokan",
        prefecture: "",
        name: "山麓 温泉旅館",
        price: 12000,
        url: "https://travel.rakuten.co.jp/onsen/",
        location: "登山口周辺",
        description: "下山後に温泉で疲れを癒やせる旅館。",
    },
    HotelEntry {
        id: "fallback-guesthouse",
        prefecture: "",
        name: "里山 ゲストハウス",
        price: 4500,
        url: "https://travel.rakuten.co.jp/",
        location: "山麓の集落",
        description: "リーズナブルに泊まれるハイカー向けの宿。",
    },
];

/// Hotels for a prefecture; `None` when the catalog has no entries for it.
pub fn hotels_for_prefecture(prefecture: &str) -> Option<Vec<AffiliateHotel>> {
    let hotels: Vec<_> = HOTELS
        .iter()
        .filter(|entry| entry.prefecture == prefecture)
        .map(HotelEntry::to_hotel)
        .collect();
    if hotels.is_empty() { None } else { Some(hotels) }
}

pub fn fallback_hotels() -> Vec<AffiliateHotel> {
    FALLBACK_HOTELS.iter().map(HotelEntry::to_hotel).collect()
}

/// Landscape photos used as featured images when an article has none.
pub const FEATURED_IMAGES: &[&str] = &[
    "https://images.unsplash.com/photo-1506905925346-21bda4d32df4",
    "https://images.unsplash.com/photo-1464822759844-d150ad6d0e12",
    "https://images.unsplash.com/photo-1551632811-561732d1e306",
    "https://images.unsplash.com/photo-1506197603052-3cc9c3a201bd",
    "https://images.unsplash.com/photo-1578662996442-48f60103fc96",
    "https://images.unsplash.com/photo-1519904981063-b0cf448d479e",
    "https://images.unsplash.com/photo-1483728642387-6c3bdd6c93e5",
    "https://images.unsplash.com/photo-1544558635-667480601430",
    "https://images.unsplash.com/photo-1524712245354-2c4e5e7121c0",
    "https://images.unsplash.com/photo-1516655855035-d5215bcb5604",
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn product_ids_are_unique() {
        let ids: BTreeSet<_> = PRODUCTS.iter().map(|entry| entry.id).collect();
        assert_eq!(ids.len(), PRODUCTS.len());
    }

    #[test]
    fn every_keyword_set_has_products() {
        for set in &KEYWORD_SETS {
            assert!(
                !products_in_category(set.category).is_empty(),
                "no products for {}",
                set.category
            );
        }
    }

    #[test]
    fn extra_categories_have_products() {
        for (_, category) in EXTRA_KEYWORD_CATEGORIES {
            assert!(!products_in_category(category).is_empty());
        }
    }

    #[test]
    fn keyword_categories_resolve() {
        assert_eq!(category_for_keyword("リュック"), Some("backpack"));
        assert_eq!(category_for_keyword("防寒"), Some("cold"));
        assert_eq!(category_for_keyword("散策"), None);
    }

    #[test]
    fn hotel_prefectures_are_real() {
        for entry in HOTELS {
            assert!(crate::prefecture::lookup(entry.prefecture).is_some());
        }
    }

    #[test]
    fn missing_prefecture_has_no_hotels() {
        assert!(hotels_for_prefecture("要確認").is_none());
        assert_eq!(fallback_hotels().len(), 3);
    }
}
