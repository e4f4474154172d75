use pulldown_cmark::{Options, Parser, html};
use serde::Serialize;

pub fn render_markdown_to_html(md: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    let parser = Parser::new_ext(md, options);
    let mut html_out = String::new();
    html::push_html(&mut html_out, parser);
    html_out
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TocEntry {
    pub id: String,
    pub text: String,
}

/// Gives every `<h2>` without an id an `id="section-N"` (1-based, document
/// order) and returns the table of contents built from them.
pub fn add_heading_anchors(html: &str) -> (String, Vec<TocEntry>) {
    let mut out = String::with_capacity(html.len() + 64);
    let mut toc = Vec::new();
    let mut rest = html;

    while let Some(start) = rest.find("<h2") {
        let after_tag = &rest[start + 3..];
        let Some(open_end) = after_tag.find('>') else {
            break;
        };
        let attrs = &after_tag[..open_end];
        // `<h2x>` is not a heading
        if !(attrs.is_empty() || attrs.starts_with(char::is_whitespace)) {
            out.push_str(&rest[..start + 3]);
            rest = after_tag;
            continue;
        }
        let body = &after_tag[open_end + 1..];
        let Some(close) = body.find("</h2>") else {
            break;
        };
        let inner = &body[..close];

        out.push_str(&rest[..start]);
        let id = match existing_id(attrs) {
            Some(id) => {
                out.push_str(&format!("<h2{attrs}>"));
                id.to_string()
            }
            None => {
                let id = format!("section-{}", toc.len() + 1);
                out.push_str(&format!("<h2 id=\"{id}\"{attrs}>"));
                id
            }
        };
        out.push_str(inner);
        out.push_str("</h2>");
        toc.push(TocEntry {
            id,
            text: heading_text(inner),
        });
        rest = &body[close + 5..];
    }
    out.push_str(rest);
    (out, toc)
}

fn existing_id(attrs: &str) -> Option<&str> {
    let start = attrs.find("id=\"")? + 4;
    let len = attrs[start..].find('"')?;
    Some(&attrs[start..start + len])
}

/// Visible text of a heading: tags dropped, basic entities decoded.
fn heading_text(inner: &str) -> String {
    let mut text = String::with_capacity(inner.len());
    let mut in_tag = false;
    for ch in inner.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => text.push(ch),
            _ => {}
        }
    }
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#x27;", "'")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markdown_renders_tables() {
        let html = render_markdown_to_html("|a|b|\n|-|-|\n|1|2|\n");
        assert!(html.contains("<table>"));
    }

    #[test]
    fn headings_get_sequential_anchors() {
        let (html, toc) =
            add_heading_anchors("<p>x</p><h2>概要</h2><p>y</p><h2 class=\"c\">アクセス</h2>");
        assert!(html.contains("<h2 id=\"section-1\">概要</h2>"));
        assert!(html.contains("<h2 id=\"section-2\" class=\"c\">アクセス</h2>"));
        assert_eq!(
            toc,
            vec![
                TocEntry {
                    id: "section-1".to_string(),
                    text: "概要".to_string()
                },
                TocEntry {
                    id: "section-2".to_string(),
                    text: "アクセス".to_string()
                },
            ]
        );
    }

    #[test]
    fn heading_text_drops_markup() {
        let (_, toc) = add_heading_anchors("<h2><a href=\"/\">山 &amp; 川</a></h2>");
        assert_eq!(toc[0].text, "山 & 川");
    }

    #[test]
    fn existing_ids_are_kept() {
        let (html, toc) = add_heading_anchors("<h2 id=\"intro\">はじめに</h2>");
        assert_eq!(html, "<h2 id=\"intro\">はじめに</h2>");
        assert_eq!(toc[0].id, "intro");
    }

    #[test]
    fn text_without_headings_is_unchanged() {
        let (html, toc) = add_heading_anchors("<h3>x</h3><header>y</header>");
        assert_eq!(html, "<h3>x</h3><header>y</header>");
        assert!(toc.is_empty());
    }
}
