use crate::url::base_url_join;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitemapEntry {
    /// Root-relative href, e.g. `/mountains/高尾山/`.
    pub href: String,
    pub priority: &'static str,
}

impl SitemapEntry {
    pub fn for_page_path(path: &str) -> Self {
        let path = path.trim_matches('/');
        let href = if path.is_empty() {
            "/".to_string()
        } else {
            format!("/{path}/")
        };
        let priority = if path.is_empty() {
            "1.0"
        } else if path.starts_with("mountains/") {
            "0.8"
        } else if path.starts_with("regions") || path == "mountains" {
            "0.7"
        } else {
            "0.5"
        };
        Self { href, priority }
    }
}

/// Sitemap in the order given; duplicates are written once.
pub fn render_sitemap(entries: &[SitemapEntry], base_url: &str, lastmod: &str) -> String {
    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push_str("<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n");
    let mut seen = std::collections::HashSet::new();
    for entry in entries {
        if !seen.insert(entry.href.as_str()) {
            continue;
        }
        out.push_str("  <url>\n");
        out.push_str(&format!(
            "    <loc>{}</loc>\n",
            escape_xml(&base_url_join(base_url, &encode_path(&entry.href)))
        ));
        out.push_str(&format!("    <lastmod>{}</lastmod>\n", escape_xml(lastmod)));
        out.push_str("    <changefreq>weekly</changefreq>\n");
        out.push_str(&format!("    <priority>{}</priority>\n", entry.priority));
        out.push_str("  </url>\n");
    }
    out.push_str("</urlset>\n");
    out
}

/// Percent-encodes each path segment; `/` separators are kept.
pub fn encode_path(href: &str) -> String {
    href.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

pub fn escape_xml(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}
