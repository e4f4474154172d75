use chrono::{NaiveDate, TimeZone, Utc};
use teizan_core::config::SiteConfig;
use teizan_core::model::{Article, FeaturedImage};
use teizan_core::wxr::{ExportOptions, PostStatus, export_wxr};

const WP: &str = "http://wordpress.org/export/1.2/";
const CONTENT: &str = "http://purl.org/rss/1.0/modules/content/";

fn article(id: &str, title: &str, content: &str) -> Article {
    Article {
        mountain_id: id.to_string(),
        title: title.to_string(),
        content: content.to_string(),
        excerpt: format!("{title}の抜粋"),
        tags: vec!["東京都".to_string(), "初級".to_string()],
        featured_image: Some(FeaturedImage {
            url: "https://img.example.com/a.jpg?w=1&h=2".to_string(),
            alt: String::new(),
        }),
        affiliate_products: Vec::new(),
        affiliate_hotels: Vec::new(),
    }
}

fn options(status: PostStatus) -> ExportOptions {
    ExportOptions {
        start: NaiveDate::from_ymd_opt(2026, 3, 1)
            .and_then(|date| date.and_hms_opt(8, 0, 0))
            .expect("start"),
        interval_hours: 6,
        status,
        now: Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).single().expect("now"),
    }
}

fn child_text(node: roxmltree::Node<'_, '_>, ns: Option<&str>, name: &str) -> String {
    node.children()
        .find(|child| {
            child.is_element()
                && child.tag_name().name() == name
                && child.tag_name().namespace() == ns
        })
        .and_then(|child| child.text())
        .unwrap_or_default()
        .to_string()
}

#[test]
fn special_characters_round_trip() {
    let tricky = "<p>A & B</p><script>if (a < b && c > d) {}</script> ]]> end";
    let articles = vec![article("mt_a", "A&B <山> \"x\"", tricky)];
    let xml = export_wxr(&articles, &options(PostStatus::Future), &SiteConfig::default())
        .expect("export");
    let doc = roxmltree::Document::parse(&xml).expect("well-formed");
    let item = doc
        .descendants()
        .find(|node| node.has_tag_name("item"))
        .expect("item");
    assert_eq!(child_text(item, None, "title"), "A&B <山> \"x\"");
    assert_eq!(child_text(item, Some(CONTENT), "encoded"), tricky);

    let meta_values: Vec<String> = item
        .children()
        .filter(|node| node.has_tag_name((WP, "postmeta")))
        .map(|node| child_text(node, Some(WP), "meta_value"))
        .collect();
    assert_eq!(
        meta_values,
        vec![
            "https://img.example.com/a.jpg?w=1&h=2",
            "https://img.example.com/a.jpg?w=1&h=2",
            "A&B <山> \"x\"",
        ]
    );
}

#[test]
fn items_are_scheduled_in_order() {
    let articles = vec![
        article("mt_a", "一", "<p>1</p>"),
        article("mt_b", "二", "<p>2</p>"),
        article("mt_c", "三", "<p>3</p>"),
    ];
    let xml = export_wxr(&articles, &options(PostStatus::Future), &SiteConfig::default())
        .expect("export");
    let doc = roxmltree::Document::parse(&xml).expect("well-formed");
    let items: Vec<_> = doc
        .descendants()
        .filter(|node| node.has_tag_name("item"))
        .collect();
    let dates: Vec<String> = items
        .iter()
        .map(|item| child_text(*item, Some(WP), "post_date"))
        .collect();
    assert_eq!(
        dates,
        vec![
            "2026-03-01 08:00:00",
            "2026-03-01 14:00:00",
            "2026-03-01 20:00:00",
        ]
    );
    let ids: Vec<String> = items
        .iter()
        .map(|item| child_text(*item, Some(WP), "post_id"))
        .collect();
    assert_eq!(ids, vec!["2000", "2001", "2002"]);
    let tags = items[0]
        .children()
        .filter(|node| node.has_tag_name("category") && node.attribute("domain") == Some("post_tag"))
        .count();
    assert_eq!(tags, 2);
}

#[test]
fn publish_with_future_dates_is_rejected() {
    let articles = vec![article("mt_a", "一", "<p>1</p>")];
    let err = export_wxr(&articles, &options(PostStatus::Publish), &SiteConfig::default())
        .expect_err("expected error");
    assert!(err.to_string().contains("not in the past"));
}
