//! WordPress eXtended RSS (WXR 1.2) export of article records.
//!
//! Item `i` is scheduled at `start + i * interval_hours`, with `start` read in
//! the site timezone. `wp:post_date` is written in that timezone and
//! `wp:post_date_gmt` in UTC. The finished document is parsed back and
//! checked for the elements WordPress' importer needs before it is returned.

use std::collections::HashSet;
use std::str::FromStr;

use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use log::debug;

use crate::config::SiteConfig;
use crate::error::ExportError;
use crate::model::Article;
use crate::sitemap::escape_xml;

const NS_WP: &str = "http://wordpress.org/export/1.2/";
const NS_EXCERPT: &str = "http://wordpress.org/export/1.2/excerpt/";
const NS_CONTENT: &str = "http://purl.org/rss/1.0/modules/content/";
const NS_DC: &str = "http://purl.org/dc/elements/1.1/";
const MAX_SLUG_CHARS: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostStatus {
    Publish,
    Draft,
    Future,
}

impl PostStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PostStatus::Publish => "publish",
            PostStatus::Draft => "draft",
            PostStatus::Future => "future",
        }
    }
}

impl FromStr for PostStatus {
    type Err = ExportError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "publish" => Ok(PostStatus::Publish),
            "draft" => Ok(PostStatus::Draft),
            "future" => Ok(PostStatus::Future),
            other => Err(ExportError::InvalidSchedule(format!(
                "unknown post status '{other}' (expected publish, draft or future)"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// First post date, in the site timezone.
    pub start: NaiveDateTime,
    pub interval_hours: u32,
    pub status: PostStatus,
    /// Generation time; `publish` requires every date to precede it.
    pub now: DateTime<Utc>,
}

pub fn parse_start(value: &str) -> Result<NaiveDateTime, ExportError> {
    let value = value.trim();
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S"))
        .map_err(|_| {
            ExportError::InvalidSchedule(format!(
                "start '{value}' is not in YYYY-MM-DD HH:MM form"
            ))
        })
}

/// UTC instants for `count` posts starting at `start` in `tz`.
pub fn schedule(
    start: NaiveDateTime,
    interval_hours: u32,
    count: usize,
    tz: Tz,
) -> Result<Vec<DateTime<Utc>>, ExportError> {
    if interval_hours == 0 && count > 1 {
        return Err(ExportError::InvalidSchedule(
            "interval must be at least one hour when exporting several articles".to_string(),
        ));
    }
    let first = tz.from_local_datetime(&start).earliest().ok_or_else(|| {
        ExportError::InvalidSchedule(format!("start {start} does not exist in {tz}"))
    })?;
    let first = first.with_timezone(&Utc);
    (0..count)
        .map(|index| {
            i64::try_from(index)
                .ok()
                .and_then(|index| i64::from(interval_hours).checked_mul(index))
                .and_then(Duration::try_hours)
                .and_then(|offset| first.checked_add_signed(offset))
                .ok_or_else(|| {
                    ExportError::InvalidSchedule(format!(
                        "post {} at {interval_hours}h intervals falls outside the supported date range",
                        index + 1
                    ))
                })
        })
        .collect()
}

pub fn export_wxr(
    articles: &[Article],
    options: &ExportOptions,
    config: &SiteConfig,
) -> Result<String, ExportError> {
    if articles.is_empty() {
        return Err(ExportError::NoArticles);
    }
    let tz = config.site.tz();
    let dates = schedule(options.start, options.interval_hours, articles.len(), tz)?;
    if options.status == PostStatus::Publish {
        if let Some(date) = dates.iter().find(|date| **date >= options.now) {
            return Err(ExportError::PublishDateNotPast {
                date: date.with_timezone(&tz).format("%Y-%m-%d %H:%M").to_string(),
            });
        }
    }

    let wp = &config.wordpress;
    let base = config.site.base_url.trim_end_matches('/');
    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push_str(&format!(
        "<rss version=\"2.0\" xmlns:excerpt=\"{NS_EXCERPT}\" xmlns:content=\"{NS_CONTENT}\" xmlns:wfw=\"http://wellformedweb.org/CommentAPI/\" xmlns:dc=\"{NS_DC}\" xmlns:wp=\"{NS_WP}\">\n"
    ));
    out.push_str("<channel>\n");
    out.push_str(&format!("<title>{}</title>\n", escape_xml(&config.site.title)));
    out.push_str(&format!("<link>{}</link>\n", escape_xml(base)));
    out.push_str(&format!(
        "<description>{}</description>\n",
        escape_xml(&config.site.description)
    ));
    out.push_str(&format!("<pubDate>{}</pubDate>\n", options.now.to_rfc2822()));
    out.push_str(&format!(
        "<language>{}</language>\n",
        escape_xml(&config.site.language)
    ));
    out.push_str("<wp:wxr_version>1.2</wp:wxr_version>\n");
    out.push_str(&format!(
        "<wp:base_site_url>{}</wp:base_site_url>\n",
        escape_xml(base)
    ));
    out.push_str(&format!(
        "<wp:base_blog_url>{}</wp:base_blog_url>\n",
        escape_xml(base)
    ));
    out.push_str("<wp:author>");
    out.push_str("<wp:author_id>1</wp:author_id>");
    out.push_str(&format!(
        "<wp:author_login>{}</wp:author_login>",
        cdata(&wp.author_login)
    ));
    out.push_str(&format!(
        "<wp:author_email>{}</wp:author_email>",
        cdata(&wp.author_email)
    ));
    out.push_str(&format!(
        "<wp:author_display_name>{}</wp:author_display_name>",
        cdata(&wp.author_display_name)
    ));
    out.push_str("<wp:author_first_name><![CDATA[]]></wp:author_first_name>");
    out.push_str("<wp:author_last_name><![CDATA[]]></wp:author_last_name>");
    out.push_str("</wp:author>\n");
    out.push_str(&format!(
        "<wp:category><wp:term_id>1</wp:term_id><wp:category_nicename>{}</wp:category_nicename><wp:category_parent></wp:category_parent><wp:cat_name>{}</wp:cat_name></wp:category>\n",
        escape_xml(&wp.category_nicename),
        cdata(&wp.category)
    ));

    for (index, (article, date)) in articles.iter().zip(&dates).enumerate() {
        let post_id = wp.post_id_start + index as u64;
        let link = format!("{base}/?p={post_id}");
        let local = date.with_timezone(&tz);
        let slug = match slugify(&article.title) {
            slug if slug.is_empty() => format!("post-{post_id}"),
            slug => slug,
        };

        out.push_str("<item>\n");
        out.push_str(&format!("<title>{}</title>\n", escape_xml(&article.title)));
        out.push_str(&format!("<link>{}</link>\n", escape_xml(&link)));
        out.push_str(&format!("<pubDate>{}</pubDate>\n", date.to_rfc2822()));
        out.push_str(&format!(
            "<dc:creator>{}</dc:creator>\n",
            cdata(&wp.author_login)
        ));
        out.push_str(&format!(
            "<guid isPermaLink=\"false\">{}</guid>\n",
            escape_xml(&link)
        ));
        out.push_str("<description></description>\n");
        out.push_str(&format!(
            "<content:encoded>{}</content:encoded>\n",
            cdata(&article.content)
        ));
        out.push_str(&format!(
            "<excerpt:encoded>{}</excerpt:encoded>\n",
            cdata(&article.excerpt)
        ));
        out.push_str(&format!("<wp:post_id>{post_id}</wp:post_id>\n"));
        out.push_str(&format!(
            "<wp:post_date>{}</wp:post_date>\n",
            local.format("%Y-%m-%d %H:%M:%S")
        ));
        out.push_str(&format!(
            "<wp:post_date_gmt>{}</wp:post_date_gmt>\n",
            date.format("%Y-%m-%d %H:%M:%S")
        ));
        out.push_str("<wp:comment_status>open</wp:comment_status>\n");
        out.push_str("<wp:ping_status>open</wp:ping_status>\n");
        out.push_str(&format!(
            "<wp:post_name>{}</wp:post_name>\n",
            escape_xml(&slug)
        ));
        out.push_str(&format!(
            "<wp:status>{}</wp:status>\n",
            options.status.as_str()
        ));
        out.push_str("<wp:post_parent>0</wp:post_parent>\n");
        out.push_str("<wp:menu_order>0</wp:menu_order>\n");
        out.push_str("<wp:post_type>post</wp:post_type>\n");
        out.push_str("<wp:post_password></wp:post_password>\n");
        out.push_str("<wp:is_sticky>0</wp:is_sticky>\n");
        out.push_str(&format!(
            "<category domain=\"category\" nicename=\"{}\">{}</category>\n",
            escape_xml(&wp.category_nicename),
            escape_xml(&wp.category)
        ));
        for tag in &article.tags {
            out.push_str(&format!(
                "<category domain=\"post_tag\" nicename=\"{}\">{}</category>\n",
                escape_xml(&slugify(tag)),
                escape_xml(tag)
            ));
        }
        if let Some(image) = &article.featured_image {
            let alt = if image.alt.trim().is_empty() {
                article.title.as_str()
            } else {
                image.alt.as_str()
            };
            for (key, value) in [
                ("_thumbnail_url", image.url.as_str()),
                ("fifu_image_url", image.url.as_str()),
                ("fifu_image_alt", alt),
            ] {
                out.push_str(&format!(
                    "<wp:postmeta><wp:meta_key>{key}</wp:meta_key><wp:meta_value>{}</wp:meta_value></wp:postmeta>\n",
                    cdata(value)
                ));
            }
        }
        out.push_str("</item>\n");
    }

    out.push_str("</channel>\n</rss>\n");
    validate_wxr(&out, articles.len())?;
    debug!("exported {} articles as WXR", articles.len());
    Ok(out)
}

/// Wraps text in a CDATA section; `]]>` inside the text is split across two
/// sections so it survives.
pub fn cdata(value: &str) -> String {
    format!("<![CDATA[{}]]>", value.replace("]]>", "]]]]><![CDATA[>"))
}

/// Lowercased, non-word characters dropped, whitespace and hyphen runs
/// collapsed to `-`, at most 50 characters.
pub fn slugify(text: &str) -> String {
    let mut slug = String::new();
    let mut pending_dash = false;
    for ch in text.to_lowercase().chars() {
        if ch.is_alphanumeric() || ch == '_' {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch);
        } else if ch.is_whitespace() || ch == '-' {
            pending_dash = true;
        }
    }
    slug.chars().take(MAX_SLUG_CHARS).collect::<String>().trim_end_matches('-').to_string()
}

const CHANNEL_REQUIRED: &[(&str, Option<&str>)] = &[
    ("title", None),
    ("link", None),
    ("description", None),
    ("pubDate", None),
    ("language", None),
    ("wxr_version", Some(NS_WP)),
    ("base_site_url", Some(NS_WP)),
    ("base_blog_url", Some(NS_WP)),
    ("author", Some(NS_WP)),
    ("category", Some(NS_WP)),
];

const ITEM_REQUIRED: &[(&str, Option<&str>)] = &[
    ("title", None),
    ("link", None),
    ("pubDate", None),
    ("creator", Some(NS_DC)),
    ("guid", None),
    ("description", None),
    ("encoded", Some(NS_CONTENT)),
    ("encoded", Some(NS_EXCERPT)),
    ("post_id", Some(NS_WP)),
    ("post_date", Some(NS_WP)),
    ("post_date_gmt", Some(NS_WP)),
    ("comment_status", Some(NS_WP)),
    ("ping_status", Some(NS_WP)),
    ("post_name", Some(NS_WP)),
    ("status", Some(NS_WP)),
    ("post_type", Some(NS_WP)),
];

fn child<'a, 'input>(
    node: roxmltree::Node<'a, 'input>,
    name: &str,
    namespace: Option<&str>,
) -> Option<roxmltree::Node<'a, 'input>> {
    node.children().find(|candidate| {
        candidate.is_element()
            && candidate.tag_name().name() == name
            && candidate.tag_name().namespace() == namespace
    })
}

fn require_children(
    node: roxmltree::Node<'_, '_>,
    required: &[(&str, Option<&str>)],
    context: &str,
) -> Result<(), ExportError> {
    for (name, namespace) in required {
        if child(node, name, *namespace).is_none() {
            let prefix = match *namespace {
                Some(NS_WP) => "wp:",
                Some(NS_DC) => "dc:",
                Some(NS_CONTENT) => "content:",
                Some(NS_EXCERPT) => "excerpt:",
                _ => "",
            };
            return Err(ExportError::SchemaViolation(format!(
                "{context} is missing <{prefix}{name}>"
            )));
        }
    }
    Ok(())
}

/// Parses a WXR document and checks the elements the importer relies on.
pub fn validate_wxr(xml: &str, expected_items: usize) -> Result<(), ExportError> {
    let doc = roxmltree::Document::parse(xml)
        .map_err(|err| ExportError::SchemaViolation(format!("not well-formed XML: {err}")))?;
    let root = doc.root_element();
    if root.tag_name().name() != "rss" {
        return Err(ExportError::SchemaViolation(
            "root element is not <rss>".to_string(),
        ));
    }
    let channel = child(root, "channel", None)
        .ok_or_else(|| ExportError::SchemaViolation("missing <channel>".to_string()))?;
    require_children(channel, CHANNEL_REQUIRED, "channel")?;

    let items: Vec<_> = channel
        .children()
        .filter(|node| node.is_element() && node.tag_name().name() == "item")
        .collect();
    if items.len() != expected_items {
        return Err(ExportError::SchemaViolation(format!(
            "expected {expected_items} items, found {}",
            items.len()
        )));
    }

    let mut post_ids = HashSet::new();
    for (index, item) in items.iter().enumerate() {
        require_children(*item, ITEM_REQUIRED, &format!("item {index}"))?;
        let post_id = child(*item, "post_id", Some(NS_WP))
            .and_then(|node| node.text())
            .unwrap_or_default()
            .trim()
            .to_string();
        if post_id.parse::<u64>().is_err() {
            return Err(ExportError::SchemaViolation(format!(
                "item {index} has a non-numeric wp:post_id '{post_id}'"
            )));
        }
        if !post_ids.insert(post_id.clone()) {
            return Err(ExportError::SchemaViolation(format!(
                "duplicate wp:post_id {post_id}"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .and_then(|date| date.and_hms_opt(h, 0, 0))
            .expect("valid date")
    }

    fn article(title: &str) -> Article {
        Article {
            mountain_id: "mt_takao_tokyo".to_string(),
            title: title.to_string(),
            content: "<p>本文</p>".to_string(),
            excerpt: "抜粋".to_string(),
            tags: vec!["東京都".to_string()],
            featured_image: None,
            affiliate_products: Vec::new(),
            affiliate_hotels: Vec::new(),
        }
    }

    #[test]
    fn slug_rules() {
        assert_eq!(slugify("Mt. Takao  Guide -- 2024"), "mt-takao-guide-2024");
        assert_eq!(slugify("高尾山（東京都）登山ガイド"), "高尾山東京都登山ガイド");
        assert_eq!(slugify("--a--"), "a");
        assert!(slugify(&"あ".repeat(80)).chars().count() <= 50);
    }

    #[test]
    fn cdata_splits_terminator() {
        assert_eq!(cdata("a]]>b"), "<![CDATA[a]]]]><![CDATA[>b]]>");
    }

    #[test]
    fn schedule_steps_by_interval_in_site_timezone() {
        let dates = schedule(at(2026, 1, 1, 9), 24, 3, chrono_tz::Asia::Tokyo).expect("schedule");
        assert_eq!(dates[0].format("%Y-%m-%d %H:%M").to_string(), "2026-01-01 00:00");
        assert_eq!(dates[1] - dates[0], Duration::hours(24));
        assert_eq!(dates[2] - dates[1], Duration::hours(24));
    }

    #[test]
    fn oversized_interval_is_an_error() {
        let err = schedule(at(2026, 1, 1, 8), u32::MAX, 2, chrono_tz::Asia::Tokyo)
            .expect_err("expected error");
        assert!(matches!(err, ExportError::InvalidSchedule(_)));
    }

    #[test]
    fn zero_interval_with_many_articles_is_invalid() {
        let err = schedule(at(2026, 1, 1, 9), 0, 2, chrono_tz::Asia::Tokyo)
            .expect_err("expected error");
        assert!(matches!(err, ExportError::InvalidSchedule(_)));
    }

    #[test]
    fn publish_requires_past_dates() {
        let options = ExportOptions {
            start: at(2026, 1, 1, 9),
            interval_hours: 24,
            status: PostStatus::Publish,
            now: Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).single().expect("now"),
        };
        let err = export_wxr(
            &[article("a"), article("b")],
            &options,
            &SiteConfig::default(),
        )
        .expect_err("expected error");
        assert!(matches!(err, ExportError::PublishDateNotPast { .. }));
    }

    #[test]
    fn post_dates_use_local_and_gmt() {
        let options = ExportOptions {
            start: at(2026, 1, 1, 9),
            interval_hours: 1,
            status: PostStatus::Future,
            now: Utc.with_ymd_and_hms(2025, 12, 1, 0, 0, 0).single().expect("now"),
        };
        let xml = export_wxr(&[article("a")], &options, &SiteConfig::default()).expect("export");
        assert!(xml.contains("<wp:post_date>2026-01-01 09:00:00</wp:post_date>"));
        assert!(xml.contains("<wp:post_date_gmt>2026-01-01 00:00:00</wp:post_date_gmt>"));
        assert!(xml.contains("<wp:post_id>2000</wp:post_id>"));
        assert!(xml.contains("<wp:status>future</wp:status>"));
    }

    #[test]
    fn empty_export_is_an_error() {
        let options = ExportOptions {
            start: at(2026, 1, 1, 9),
            interval_hours: 1,
            status: PostStatus::Draft,
            now: Utc::now(),
        };
        let err = export_wxr(&[], &options, &SiteConfig::default()).expect_err("expected error");
        assert!(matches!(err, ExportError::NoArticles));
    }

    #[test]
    fn validation_reports_missing_elements() {
        let xml = "<rss><channel><title>t</title></channel></rss>";
        let err = validate_wxr(xml, 0).expect_err("expected error");
        assert!(err.to_string().contains("WXR schema violation"));
    }

    #[test]
    fn status_parses_known_values() {
        assert_eq!("future".parse::<PostStatus>().ok(), Some(PostStatus::Future));
        assert!("scheduled".parse::<PostStatus>().is_err());
    }

    #[test]
    fn start_accepts_minutes_or_seconds() {
        assert_eq!(parse_start("2026-01-01 09:00").expect("parse"), at(2026, 1, 1, 9));
        assert_eq!(parse_start("2026-01-01 09:00:00").expect("parse"), at(2026, 1, 1, 9));
        assert!(parse_start("tomorrow").is_err());
    }
}
