use std::fs;
use std::path::{Path, PathBuf};

use teizan_cli::exec::{BuildOpts, build_site};
use tempfile::TempDir;

const BUILD_DATE: &str = "2026-01-02";

fn fixture_data() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../teizan_core/tests/fixtures/mountains.json")
}

fn build_opts(temp: &TempDir) -> BuildOpts {
    BuildOpts {
        data: fixture_data(),
        out: temp.path().join("out"),
        articles: None,
        config: None,
        build_date: Some(BUILD_DATE.to_string()),
    }
}

#[test]
fn build_writes_site_layout() {
    let temp = TempDir::new().expect("tempdir");
    let opts = build_opts(&temp);
    let report = build_site(&opts).expect("build");
    let out = &opts.out;

    assert!(out.join("index.html").is_file());
    assert!(out.join("css/style.css").is_file());
    assert!(out.join("sitemap.xml").is_file());
    assert!(out.join("mountains/index.html").is_file());
    assert!(out.join("regions/kanto/index.html").is_file());
    assert!(out.join("equipment/shoes/index.html").is_file());
    assert!(out.join("beginner/index.html").is_file());
    assert!(out.join("about/index.html").is_file());

    let takao = fs::read_to_string(out.join("mountains/高尾山/index.html")).expect("takao");
    assert!(takao.contains("高尾山口駅"));
    assert!(takao.contains(BUILD_DATE));

    assert_eq!(report.attempted, report.written + 1);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].0, "mt_atago_tokyo");
    assert!(!out.join("mountains/愛宕山").exists());
}

#[test]
fn sitemap_lists_written_pages_only() {
    let temp = TempDir::new().expect("tempdir");
    let opts = build_opts(&temp);
    let report = build_site(&opts).expect("build");

    let sitemap = fs::read_to_string(opts.out.join("sitemap.xml")).expect("sitemap");
    let doc = roxmltree::Document::parse(&sitemap).expect("valid xml");
    let locs: Vec<&str> = doc
        .descendants()
        .filter(|node| node.has_tag_name("loc"))
        .filter_map(|node| node.text())
        .collect();
    assert_eq!(locs.len(), report.written);
    let takao = format!("/mountains/{}/", urlencoding::encode("高尾山"));
    let atago = urlencoding::encode("愛宕山").into_owned();
    assert!(locs.iter().any(|loc| loc.ends_with(&takao)));
    assert!(!locs.iter().any(|loc| loc.contains(&atago)));
    assert!(locs.iter().all(|loc| loc.is_ascii()));
    assert!(sitemap.contains(&format!("<lastmod>{BUILD_DATE}</lastmod>")));
}

#[test]
fn rebuild_produces_identical_output() {
    let first = TempDir::new().expect("tempdir");
    let second = TempDir::new().expect("tempdir");
    let first_opts = build_opts(&first);
    let second_opts = build_opts(&second);
    let first_report = build_site(&first_opts).expect("first build");
    build_site(&second_opts).expect("second build");

    for rel in &first_report.written_paths {
        let a = fs::read(first_opts.out.join(rel)).expect("first output");
        let b = fs::read(second_opts.out.join(rel)).expect("second output");
        assert!(a == b, "{} differs between builds", rel.display());
    }
}

#[test]
fn unreachable_affiliate_api_falls_back_to_catalog() {
    let temp = TempDir::new().expect("tempdir");
    let config_path = temp.path().join("teizan.yaml");
    fs::write(
        &config_path,
        "affiliate:\n  rakuten:\n    application_id: \"test\"\n    endpoint: \"http://127.0.0.1:1\"\n    timeout_secs: 1\n",
    )
    .expect("write config");
    let mut opts = build_opts(&temp);
    opts.config = Some(config_path);

    let report = build_site(&opts).expect("build");
    assert!(report.fallbacks > 0);
    let takao =
        fs::read_to_string(opts.out.join("mountains/高尾山/index.html")).expect("takao page");
    assert!(takao.contains("product-card"));
}

#[test]
fn article_records_override_generated_content() {
    let temp = TempDir::new().expect("tempdir");
    let articles = temp.path().join("articles");
    fs::create_dir_all(&articles).expect("mkdir");
    fs::write(
        articles.join("article_takao.json"),
        r#"{"mountain_id": "mt_takao_tokyo", "title": "高尾山を歩く", "content": "<h2>手書きの記事</h2><p>本文</p>"}"#,
    )
    .expect("write article");
    let mut opts = build_opts(&temp);
    opts.articles = Some(articles);

    build_site(&opts).expect("build");
    let takao =
        fs::read_to_string(opts.out.join("mountains/高尾山/index.html")).expect("takao page");
    assert!(takao.contains("手書きの記事"));
    assert!(takao.contains("高尾山を歩く"));
}

#[test]
fn article_record_products_reach_the_page() {
    let temp = TempDir::new().expect("tempdir");
    let articles = temp.path().join("articles");
    fs::create_dir_all(&articles).expect("mkdir");
    fs::write(
        articles.join("article_takao.json"),
        r#"{
            "mountain_id": "mt_takao_tokyo",
            "affiliate_products": [{
                "id": "rec-1",
                "name": "記録済みトレッキングポール",
                "price": 6800,
                "url": "https://shop.example.com/pole",
                "category": "backpack"
            }]
        }"#,
    )
    .expect("write article");
    let mut opts = build_opts(&temp);
    opts.articles = Some(articles);

    build_site(&opts).expect("build");
    let takao =
        fs::read_to_string(opts.out.join("mountains/高尾山/index.html")).expect("takao page");
    assert!(takao.contains("記録済みトレッキングポール"));
    assert!(takao.contains("高尾山口駅"));
    assert!(takao.contains("class=\"featured-image\""));
}

#[test]
fn missing_dataset_is_an_error() {
    let temp = TempDir::new().expect("tempdir");
    let mut opts = build_opts(&temp);
    opts.data = temp.path().join("missing.json");
    assert!(build_site(&opts).is_err());
    assert!(!opts.out.join("index.html").exists());
}
