//! Page shell and named content templates.
//!
//! Content templates produce HTML fragments; [`PageRenderer::render_page`]
//! wraps a fragment in the shared shell. Nothing here touches the filesystem,
//! and the only time-dependent input is the caller-supplied build date.

use anyhow::{Context, Result};
use minijinja::{AutoEscape, Environment, UndefinedBehavior, Value, context};
use serde::Serialize;
use serde_json::json;

use crate::config::SiteConfig;
use crate::error::PageRenderFailure;
use crate::model::Page;
use crate::url::base_url_join;

pub const STYLESHEET: &str = include_str!("../templates/style.css");

const TEMPLATE_SOURCES: &[(&str, &str)] = &[
    ("base.html", include_str!("../templates/base.html")),
    (
        "partials/header.html",
        include_str!("../templates/partials/header.html"),
    ),
    (
        "partials/footer.html",
        include_str!("../templates/partials/footer.html"),
    ),
    (
        "partials/mountain_card.html",
        include_str!("../templates/partials/mountain_card.html"),
    ),
    (
        "partials/products.html",
        include_str!("../templates/partials/products.html"),
    ),
    (
        "partials/breadcrumb.html",
        include_str!("../templates/partials/breadcrumb.html"),
    ),
    (
        "article_body.html",
        include_str!("../templates/article_body.html"),
    ),
    ("mountain.html", include_str!("../templates/mountain.html")),
    ("index.html", include_str!("../templates/index.html")),
    (
        "mountain_list.html",
        include_str!("../templates/mountain_list.html"),
    ),
    ("regions.html", include_str!("../templates/regions.html")),
    ("region.html", include_str!("../templates/region.html")),
    (
        "equipment_index.html",
        include_str!("../templates/equipment_index.html"),
    ),
    (
        "equipment_item.html",
        include_str!("../templates/equipment_item.html"),
    ),
    (
        "beginner_index.html",
        include_str!("../templates/beginner_index.html"),
    ),
    ("static_page.html", include_str!("../templates/static_page.html")),
];

#[derive(Debug, Clone, Serialize)]
struct SiteView {
    title: String,
    base_url: String,
    language: String,
    description: String,
}

#[derive(Debug, Clone, Serialize)]
struct NavItemView {
    label: &'static str,
    href: &'static str,
}

const NAV_ITEMS: &[NavItemView] = &[
    NavItemView {
        label: "ホーム",
        href: "/",
    },
    NavItemView {
        label: "山一覧",
        href: "/mountains/",
    },
    NavItemView {
        label: "地域別",
        href: "/regions/",
    },
    NavItemView {
        label: "装備ガイド",
        href: "/equipment/",
    },
    NavItemView {
        label: "初心者ガイド",
        href: "/beginner/",
    },
    NavItemView {
        label: "このサイトについて",
        href: "/about/",
    },
];

pub struct PageRenderer {
    env: Environment<'static>,
    site: SiteView,
}

impl PageRenderer {
    pub fn new(config: &SiteConfig) -> Result<Self> {
        Ok(Self {
            env: template_env().context("failed to initialize templates")?,
            site: SiteView {
                title: config.site.title.clone(),
                base_url: config.site.base_url.clone(),
                language: config.site.language.clone(),
                description: config.site.description.clone(),
            },
        })
    }

    /// Renders a named content template to an HTML fragment. Every variable
    /// the template references must be supplied.
    pub fn render(&self, template_id: &str, vars: Value) -> Result<String, PageRenderFailure> {
        let template_error = |source| PageRenderFailure::Template {
            subject: template_id.to_string(),
            source,
        };
        let template = self.env.get_template(template_id).map_err(template_error)?;
        template
            .render(context! { site => self.site.clone(), ..vars })
            .map_err(template_error)
    }

    /// Wraps a content fragment in the full HTML document.
    pub fn render_page(&self, page: &Page, build_date: &str) -> Result<String, PageRenderFailure> {
        let href = if page.path.is_empty() {
            "/".to_string()
        } else {
            format!("/{}/", page.path.trim_matches('/'))
        };
        let canonical_url = base_url_join(&self.site.base_url, &href);
        let full_title = if page.title == self.site.title {
            page.title.clone()
        } else {
            format!("{} | {}", page.title, self.site.title)
        };
        let structured = page
            .structured_data
            .clone()
            .unwrap_or_else(|| self.website_schema());
        let year = build_date.get(..4).unwrap_or(build_date).to_string();

        self.render(
            "base.html",
            context! {
                title => full_title,
                description => page.meta_description.clone(),
                canonical_url => canonical_url,
                og_type => if page.path.is_empty() { "website" } else { "article" },
                structured_data => json_for_script(&structured),
                nav_items => NAV_ITEMS,
                content => page.content.clone(),
                build_date => build_date,
                year => year,
            },
        )
    }

    pub fn website_schema(&self) -> serde_json::Value {
        json!({
            "@context": "https://schema.org",
            "@type": "WebSite",
            "name": self.site.title,
            "url": self.site.base_url,
            "description": self.site.description,
            "inLanguage": self.site.language,
        })
    }

    pub fn site_title(&self) -> &str {
        &self.site.title
    }

    pub fn base_url(&self) -> &str {
        &self.site.base_url
    }
}

/// JSON safe to embed in a `<script>` element.
fn json_for_script(value: &serde_json::Value) -> String {
    value.to_string().replace("</", "<\\/")
}

fn template_env() -> Result<Environment<'static>> {
    let mut env = Environment::new();
    env.set_auto_escape_callback(|name| {
        if name.ends_with(".html") {
            AutoEscape::Html
        } else {
            AutoEscape::None
        }
    });
    env.set_undefined_behavior(UndefinedBehavior::Strict);
    for (name, source) in TEMPLATE_SOURCES {
        env.add_template(name, source)
            .with_context(|| format!("failed to parse template {name}"))?;
    }
    Ok(env)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn renderer() -> PageRenderer {
        PageRenderer::new(&SiteConfig::default()).expect("renderer")
    }

    fn page(structured_data: Option<serde_json::Value>) -> Page {
        Page {
            path: "about".to_string(),
            title: "このサイトについて".to_string(),
            meta_description: "説明 & <概要>".to_string(),
            content: "<p>本文</p>".to_string(),
            structured_data,
        }
    }

    fn ld_json(html: &str) -> serde_json::Value {
        let start_tag = "<script type=\"application/ld+json\">";
        let start = html.find(start_tag).expect("ld+json block") + start_tag.len();
        let end = start + html[start..].find("</script>").expect("script end");
        serde_json::from_str(&html[start..end]).expect("valid json-ld")
    }

    #[test]
    fn shell_contains_required_head_elements() {
        let html = renderer()
            .render_page(&page(None), "2026-01-02")
            .expect("render");
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<html lang=\"ja\">"));
        assert!(html.contains("<meta charset=\"UTF-8\">"));
        assert!(html.contains("<title>このサイトについて | 低山旅行</title>"));
        assert!(html.contains("name=\"description\" content=\"説明 &amp; &lt;概要&gt;\""));
        assert!(html.contains("property=\"og:title\" content=\"このサイトについて | 低山旅行\""));
        assert!(html.contains("name=\"twitter:description\""));
        assert!(html.contains("<p>本文</p>"));
        assert!(html.contains("mobile-menu-toggle"));
        assert_eq!(html.matches("application/ld+json").count(), 1);
    }

    #[test]
    fn default_structured_data_is_website() {
        let html = renderer()
            .render_page(&page(None), "2026-01-02")
            .expect("render");
        let value = ld_json(&html);
        assert_eq!(value["@type"], "WebSite");
        assert_eq!(value["name"], "低山旅行");
    }

    #[test]
    fn structured_data_cannot_close_script() {
        let data = json!({"@type": "Article", "headline": "</script><b>x</b>"});
        let html = renderer()
            .render_page(&page(Some(data)), "2026-01-02")
            .expect("render");
        let value = ld_json(&html);
        assert_eq!(value["headline"], "</script><b>x</b>");
    }

    #[test]
    fn identical_inputs_render_identically() {
        let renderer = renderer();
        let first = renderer.render_page(&page(None), "2026-01-02").expect("render");
        let second = renderer.render_page(&page(None), "2026-01-02").expect("render");
        assert_eq!(first, second);
    }

    #[test]
    fn nav_and_footer_do_not_depend_on_page() {
        let renderer = renderer();
        let mut other = page(None);
        other.path = "contact".to_string();
        other.title = "お問い合わせ".to_string();
        let a = renderer.render_page(&page(None), "2026-01-02").expect("render");
        let b = renderer.render_page(&other, "2026-01-02").expect("render");
        let header = |html: &str| {
            let start = html.find("<header").expect("header");
            let end = html.find("</header>").expect("header end");
            html[start..end].to_string()
        };
        let footer = |html: &str| {
            let start = html.find("<footer").expect("footer");
            let end = html.find("</footer>").expect("footer end");
            html[start..end].to_string()
        };
        assert_eq!(header(&a), header(&b));
        assert_eq!(footer(&a), footer(&b));
    }

    #[test]
    fn missing_variable_is_render_failure() {
        let err = renderer()
            .render("static_page.html", context! { title => "x", breadcrumb => Vec::<String>::new() })
            .expect_err("expected error");
        assert!(matches!(err, PageRenderFailure::Template { .. }));
    }
}
