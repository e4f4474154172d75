//! Page builders: one [`Page`] per build task, wrapped later by the shell.

use std::collections::BTreeMap;

use log::warn;
use minijinja::{Value, context};
use serde::Serialize;
use serde_json::json;

use crate::affiliate::{AffiliateSelector, ProductSource};
use crate::article::{compose_article, product_views};
use crate::catalog::{category_label, products_in_category};
use crate::config::MissingElevation;
use crate::error::PageRenderFailure;
use crate::model::{Article, Mountain, Page, Project, TaskKind};
use crate::prefecture::{self, Region};
use crate::render::{add_heading_anchors, render_markdown_to_html};
use crate::resolve::{GearTier, PLACEHOLDER, ResolvedMountain, resolve_mountain};
use crate::templates::PageRenderer;
use crate::url::{UrlMapper, base_url_join};

pub struct StaticPageSource {
    pub slug: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub markdown: &'static str,
}

pub const STATIC_PAGES: &[StaticPageSource] = &[
    StaticPageSource {
        slug: "about",
        title: "このサイトについて",
        description: "低山旅行の運営方針と掲載情報について。",
        markdown: include_str!("../templates/content/about.md"),
    },
    StaticPageSource {
        slug: "contact",
        title: "お問い合わせ",
        description: "掲載内容の訂正や情報提供のお問い合わせ先。",
        markdown: include_str!("../templates/content/contact.md"),
    },
    StaticPageSource {
        slug: "privacy",
        title: "プライバシーポリシー",
        description: "個人情報とCookieの取り扱いについて。",
        markdown: include_str!("../templates/content/privacy.md"),
    },
    StaticPageSource {
        slug: "terms",
        title: "利用規約",
        description: "当サイトの免責事項と著作権について。",
        markdown: include_str!("../templates/content/terms.md"),
    },
];

pub const BEGINNER_TOPICS: &[StaticPageSource] = &[
    StaticPageSource {
        slug: "first-hike",
        title: "はじめての低山登山",
        description: "最初の山選びと計画の立て方。",
        markdown: include_str!("../templates/content/beginner-first-hike.md"),
    },
    StaticPageSource {
        slug: "gear",
        title: "初心者の装備と服装",
        description: "低山で最低限そろえたい装備と服装のポイント。",
        markdown: include_str!("../templates/content/beginner-gear.md"),
    },
    StaticPageSource {
        slug: "safety",
        title: "安全に歩くための基礎知識",
        description: "道迷いや天候の変化に備える方法。",
        markdown: include_str!("../templates/content/beginner-safety.md"),
    },
    StaticPageSource {
        slug: "manners",
        title: "登山のマナー",
        description: "山で気持ちよく過ごすための基本マナー。",
        markdown: include_str!("../templates/content/beginner-manners.md"),
    },
];

/// Equipment guide pages; the slug is also the catalog category.
pub const EQUIPMENT_ITEMS: &[StaticPageSource] = &[
    StaticPageSource {
        slug: "shoes",
        title: "登山靴・トレッキングシューズの選び方",
        description: "低山に合った登山靴の選び方と試し履きのポイント。",
        markdown: include_str!("../templates/content/equipment-shoes.md"),
    },
    StaticPageSource {
        slug: "backpack",
        title: "日帰り登山のリュックの選び方",
        description: "容量と背負い心地から選ぶ日帰りリュック。",
        markdown: include_str!("../templates/content/equipment-backpack.md"),
    },
    StaticPageSource {
        slug: "rainwear",
        title: "レインウェアの選び方",
        description: "急な雨と風に備えるレインウェア。",
        markdown: include_str!("../templates/content/equipment-rainwear.md"),
    },
    StaticPageSource {
        slug: "bottle",
        title: "水筒・ボトルの選び方",
        description: "季節と行動時間に合わせた水分補給の準備。",
        markdown: include_str!("../templates/content/equipment-bottle.md"),
    },
];

fn find_source<'a>(sources: &'a [StaticPageSource], slug: &str) -> Option<&'a StaticPageSource> {
    sources.iter().find(|source| source.slug == slug)
}

/// A built page plus the affiliate lookups that fell back to the static
/// catalog while building it.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub page: Page,
    pub fallbacks: Vec<String>,
}

impl RenderedPage {
    fn plain(page: Page) -> Self {
        Self {
            page,
            fallbacks: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct Crumb {
    label: String,
    href: Option<String>,
}

fn crumb(label: &str, href: &str) -> Crumb {
    Crumb {
        label: label.to_string(),
        href: Some(href.to_string()),
    }
}

fn current(label: &str) -> Crumb {
    Crumb {
        label: label.to_string(),
        href: None,
    }
}

#[derive(Debug, Clone, Serialize)]
struct MountainCard {
    name: String,
    href: String,
    prefecture: String,
    elevation_label: String,
    difficulty_label: &'static str,
    features: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
struct LinkCount {
    label: String,
    href: String,
    count: usize,
}

#[derive(Debug, Clone, Serialize)]
struct RegionOverview {
    label: &'static str,
    href: String,
    count: usize,
    prefectures: Vec<LinkCount>,
}

#[derive(Debug, Clone, Serialize)]
struct RegionGroup {
    label: &'static str,
    slug: &'static str,
    href: String,
    cards: Vec<MountainCard>,
}

#[derive(Debug, Clone, Serialize)]
struct TopicLink {
    label: &'static str,
    href: String,
    summary: &'static str,
}

#[derive(Debug, Clone, Serialize)]
struct TierView {
    label: &'static str,
    range: &'static str,
    summary: &'static str,
}

pub struct MountainEntry<'a> {
    pub record: &'a Mountain,
    pub resolved: ResolvedMountain,
    pub key: String,
    pub href: String,
    /// Whether the mountain gets its own page and appears in listings.
    pub listed: bool,
}

pub struct SiteContent<'a> {
    project: &'a Project,
    renderer: PageRenderer,
    selector: AffiliateSelector<'a>,
    mapper: UrlMapper,
    entries: Vec<MountainEntry<'a>>,
}

impl<'a> SiteContent<'a> {
    pub fn new(
        project: &'a Project,
        renderer: PageRenderer,
        source: &'a dyn ProductSource,
    ) -> Self {
        let mapper = UrlMapper::new(&project.config);
        let keys = mapper.assign_mountain_keys(&project.mountains);
        let skip_missing = project.config.build.missing_elevation == MissingElevation::Skip;
        let entries = project
            .mountains
            .iter()
            .zip(keys)
            .map(|(record, key)| {
                let href = mapper.map(&key).href;
                MountainEntry {
                    resolved: resolve_mountain(record),
                    listed: !(skip_missing && record.elevation.is_none()),
                    record,
                    key,
                    href,
                }
            })
            .collect();
        Self {
            project,
            renderer,
            selector: AffiliateSelector::new(source, &project.config.affiliate),
            mapper,
            entries,
        }
    }

    pub fn entries(&self) -> &[MountainEntry<'a>] {
        &self.entries
    }

    pub fn renderer(&self) -> &PageRenderer {
        &self.renderer
    }

    /// Resolver warnings for every record, in dataset order.
    pub fn warnings(&self) -> Vec<String> {
        self.entries
            .iter()
            .flat_map(|entry| entry.resolved.warnings.iter().cloned())
            .collect()
    }

    /// Builds the page for a render task. Non-page tasks have no page.
    pub fn page_for(&self, kind: &TaskKind) -> Option<Result<RenderedPage, PageRenderFailure>> {
        let result = match kind {
            TaskKind::RenderMountain { mountain_id } => self.mountain_page(mountain_id),
            TaskKind::RenderIndex => self.index_page().map(RenderedPage::plain),
            TaskKind::RenderMountainList => self.mountain_list_page().map(RenderedPage::plain),
            TaskKind::RenderRegionsOverview => self.regions_page().map(RenderedPage::plain),
            TaskKind::RenderRegion { region } => self.region_page(region).map(RenderedPage::plain),
            TaskKind::RenderPrefecture { prefecture } => {
                self.prefecture_page(prefecture).map(RenderedPage::plain)
            }
            TaskKind::RenderEquipmentIndex => self.equipment_index_page().map(RenderedPage::plain),
            TaskKind::RenderEquipmentItem { item } => {
                self.equipment_item_page(item).map(RenderedPage::plain)
            }
            TaskKind::RenderBeginnerIndex => self.beginner_index_page().map(RenderedPage::plain),
            TaskKind::RenderBeginnerTopic { topic } => {
                self.beginner_topic_page(topic).map(RenderedPage::plain)
            }
            TaskKind::RenderStaticPage { page } => self.static_page(page).map(RenderedPage::plain),
            TaskKind::WriteStylesheet | TaskKind::GenerateSitemap => return None,
        };
        Some(result)
    }

    /// The article for a mountain: generated, then overridden by a stored
    /// record with the same id.
    pub fn article_for(
        &self,
        entry: &MountainEntry<'_>,
    ) -> Result<(Article, Vec<String>), PageRenderFailure> {
        let selection = self.selector.select(&entry.resolved);
        let record = self
            .project
            .articles
            .iter()
            .find(|record| record.mountain_id == entry.record.id);
        let article = compose_article(&self.renderer, &entry.resolved, &selection, record)?;
        Ok((article, selection.fallbacks))
    }

    pub fn entry(&self, mountain_id: &str) -> Option<&MountainEntry<'a>> {
        self.entries
            .iter()
            .find(|entry| entry.record.id == mountain_id)
    }

    fn listed(&self) -> impl Iterator<Item = &MountainEntry<'a>> {
        self.entries.iter().filter(|entry| entry.listed)
    }

    fn mountain_page(&self, mountain_id: &str) -> Result<RenderedPage, PageRenderFailure> {
        let entry = self
            .entry(mountain_id)
            .ok_or_else(|| PageRenderFailure::MissingField {
                subject: mountain_id.to_string(),
                field: "id",
            })?;
        if !entry.listed {
            return Err(PageRenderFailure::MissingField {
                subject: mountain_id.to_string(),
                field: "elevation",
            });
        }
        let mountain = &entry.resolved;
        let (article, fallbacks) = self.article_for(entry)?;
        let (body, toc) = add_heading_anchors(&article.content);

        let region_href = self.mapper.map(&self.mapper.region_key(mountain.region)).href;
        let mut breadcrumb = vec![
            crumb("ホーム", "/"),
            crumb("地域別", "/regions/"),
            crumb(mountain.region_label, &region_href),
        ];
        if mountain.prefecture != PLACEHOLDER {
            let pref_href = self
                .mapper
                .map(&self.mapper.prefecture_key(&mountain.prefecture))
                .href;
            breadcrumb.push(crumb(&mountain.prefecture, &pref_href));
        }
        breadcrumb.push(current(&mountain.name));

        let related: Vec<MountainCard> = self
            .listed()
            .filter(|other| {
                other.record.id != entry.record.id && other.resolved.region == mountain.region
            })
            .take(3)
            .map(card)
            .collect();

        let content = self.render(
            mountain_id,
            "mountain.html",
            context! {
                breadcrumb => breadcrumb,
                title => article.title.clone(),
                m => mountain,
                featured_image => article.featured_image.clone(),
                toc => toc,
                body => body,
                tags => article.tags.clone(),
                related => related,
            },
        )?;

        let url = base_url_join(self.renderer.base_url(), &entry.href);
        let structured = json!({
            "@context": "https://schema.org",
            "@graph": [
                {
                    "@type": "Article",
                    "headline": article.title,
                    "description": article.excerpt,
                    "url": url,
                    "inLanguage": self.project.config.site.language,
                    "keywords": article.tags.join(","),
                    "publisher": {
                        "@type": "Organization",
                        "name": self.renderer.site_title(),
                    },
                },
                mountain_schema(mountain, &url),
            ],
        });

        Ok(RenderedPage {
            page: Page {
                path: entry.key.clone(),
                title: article.title,
                meta_description: article.excerpt,
                content,
                structured_data: Some(structured),
            },
            fallbacks,
        })
    }

    fn index_page(&self) -> Result<Page, PageRenderFailure> {
        let cards: Vec<MountainCard> = self.listed().take(6).map(card).collect();
        let regions: Vec<LinkCount> = self
            .region_counts()
            .into_iter()
            .map(|(region, count)| LinkCount {
                label: region.label().to_string(),
                href: self.mapper.map(&self.mapper.region_key(region)).href,
                count,
            })
            .collect();
        let beginner_count = self
            .listed()
            .filter(|entry| entry.resolved.difficulty.is_beginner_friendly())
            .count();
        let content = self.render(
            "index",
            "index.html",
            context! {
                mountain_count => self.listed().count(),
                region_count => regions.len(),
                beginner_count => beginner_count,
                regions => regions,
                cards => cards,
            },
        )?;
        Ok(Page {
            path: String::new(),
            title: self.renderer.site_title().to_string(),
            meta_description: self.project.config.site.description.clone(),
            content,
            structured_data: None,
        })
    }

    fn mountain_list_page(&self) -> Result<Page, PageRenderFailure> {
        let mut grouped: BTreeMap<Region, Vec<MountainCard>> = BTreeMap::new();
        for entry in self.listed() {
            grouped.entry(entry.resolved.region).or_default().push(card(entry));
        }
        let groups: Vec<RegionGroup> = grouped
            .into_iter()
            .map(|(region, cards)| RegionGroup {
                label: region.label(),
                slug: region.slug(),
                href: self.mapper.map(&self.mapper.region_key(region)).href,
                cards,
            })
            .collect();
        let title = "山一覧";
        let content = self.render(
            "mountains",
            "mountain_list.html",
            context! {
                breadcrumb => vec![crumb("ホーム", "/"), current(title)],
                title => title,
                mountain_count => self.listed().count(),
                groups => groups,
            },
        )?;
        Ok(Page {
            path: "mountains".to_string(),
            title: title.to_string(),
            meta_description: "全国の低山を地域別に一覧で紹介します。".to_string(),
            content,
            structured_data: None,
        })
    }

    fn regions_page(&self) -> Result<Page, PageRenderFailure> {
        let prefecture_counts = self.prefecture_counts();
        let regions: Vec<RegionOverview> = self
            .regions()
            .into_iter()
            .map(|region| {
                let count = self
                    .listed()
                    .filter(|entry| entry.resolved.region == region)
                    .count();
                RegionOverview {
                    label: region.label(),
                    href: self.mapper.map(&self.mapper.region_key(region)).href,
                    count,
                    prefectures: prefecture_counts
                        .iter()
                        .filter(|(name, _)| self.region_of_prefecture(name) == region)
                        .map(|(name, count)| self.prefecture_link(name, *count))
                        .collect(),
                }
            })
            .collect();
        let title = "地域から探す";
        let content = self.render(
            "regions",
            "regions.html",
            context! {
                breadcrumb => vec![crumb("ホーム", "/"), current(title)],
                title => title,
                regions => regions,
            },
        )?;
        Ok(Page {
            path: "regions".to_string(),
            title: title.to_string(),
            meta_description: "北海道から九州まで、地域と都道府県から低山を探せます。".to_string(),
            content,
            structured_data: None,
        })
    }

    fn region_page(&self, slug: &str) -> Result<Page, PageRenderFailure> {
        let region = self
            .regions()
            .into_iter()
            .find(|region| region.slug() == slug)
            .ok_or_else(|| PageRenderFailure::MissingField {
                subject: format!("region {slug}"),
                field: "region",
            })?;
        let cards: Vec<MountainCard> = self
            .listed()
            .filter(|entry| entry.resolved.region == region)
            .map(card)
            .collect();
        let prefectures: Vec<LinkCount> = self
            .prefecture_counts()
            .iter()
            .filter(|(name, _)| self.region_of_prefecture(name) == region)
            .map(|(name, count)| self.prefecture_link(name, *count))
            .collect();
        let title = format!("{}の低山", region.label());
        let lead = if cards.is_empty() {
            format!("{}の山は現在準備中です。", region.label())
        } else {
            format!("{}の低山{}山を紹介します。", region.label(), cards.len())
        };
        let content = self.render(
            &format!("region {slug}"),
            "region.html",
            context! {
                breadcrumb => vec![
                    crumb("ホーム", "/"),
                    crumb("地域別", "/regions/"),
                    current(region.label()),
                ],
                title => title.clone(),
                lead => lead.clone(),
                heading => format!("{}の山一覧", region.label()),
                prefectures => prefectures,
                cards => cards,
            },
        )?;
        Ok(Page {
            path: self.mapper.region_key(region),
            title,
            meta_description: lead,
            content,
            structured_data: None,
        })
    }

    fn prefecture_page(&self, prefecture: &str) -> Result<Page, PageRenderFailure> {
        let cards: Vec<MountainCard> = self
            .listed()
            .filter(|entry| entry.resolved.prefecture == prefecture)
            .map(card)
            .collect();
        if cards.is_empty() {
            return Err(PageRenderFailure::MissingField {
                subject: format!("prefecture {prefecture}"),
                field: "mountains",
            });
        }
        let region = self.region_of_prefecture(prefecture);
        let region_href = self.mapper.map(&self.mapper.region_key(region)).href;
        let title = format!("{prefecture}の低山");
        let lead = format!("{prefecture}の低山{}山を紹介します。", cards.len());
        let content = self.render(
            &format!("prefecture {prefecture}"),
            "region.html",
            context! {
                breadcrumb => vec![
                    crumb("ホーム", "/"),
                    crumb("地域別", "/regions/"),
                    crumb(region.label(), &region_href),
                    current(prefecture),
                ],
                title => title.clone(),
                lead => lead.clone(),
                heading => format!("{prefecture}の山一覧"),
                prefectures => Vec::<LinkCount>::new(),
                cards => cards,
            },
        )?;
        Ok(Page {
            path: self.mapper.prefecture_key(prefecture),
            title,
            meta_description: lead,
            content,
            structured_data: None,
        })
    }

    fn equipment_index_page(&self) -> Result<Page, PageRenderFailure> {
        let tiers: Vec<TierView> = [
            (GearTier::Light, "標高200m未満"),
            (GearTier::Standard, "標高200〜399m"),
            (GearTier::Full, "標高400m以上"),
        ]
        .into_iter()
        .map(|(tier, range)| TierView {
            label: tier.label(),
            range,
            summary: tier.summary(),
        })
        .collect();
        let items = topic_links(&self.mapper, "equipment", EQUIPMENT_ITEMS);
        let title = "装備ガイド";
        let content = self.render(
            "equipment",
            "equipment_index.html",
            context! {
                breadcrumb => vec![crumb("ホーム", "/"), current(title)],
                title => title,
                tiers => tiers,
                items => items,
            },
        )?;
        Ok(Page {
            path: "equipment".to_string(),
            title: title.to_string(),
            meta_description: "低山ハイキングに必要な装備を標高別に紹介します。".to_string(),
            content,
            structured_data: None,
        })
    }

    fn equipment_item_page(&self, item: &str) -> Result<Page, PageRenderFailure> {
        let source = find_source(EQUIPMENT_ITEMS, item).ok_or_else(|| {
            PageRenderFailure::MissingField {
                subject: format!("equipment {item}"),
                field: "item",
            }
        })?;
        let listing = Article {
            mountain_id: String::new(),
            title: String::new(),
            content: String::new(),
            excerpt: String::new(),
            tags: Vec::new(),
            featured_image: None,
            affiliate_products: products_in_category(source.slug),
            affiliate_hotels: Vec::new(),
        };
        let content = self.render(
            &format!("equipment {item}"),
            "equipment_item.html",
            context! {
                breadcrumb => vec![
                    crumb("ホーム", "/"),
                    crumb("装備ガイド", "/equipment/"),
                    current(source.title),
                ],
                title => source.title,
                label => category_label(source.slug),
                body => render_markdown_to_html(source.markdown),
                products => product_views(&listing),
            },
        )?;
        Ok(Page {
            path: format!("equipment/{}", source.slug),
            title: source.title.to_string(),
            meta_description: source.description.to_string(),
            content,
            structured_data: None,
        })
    }

    fn beginner_index_page(&self) -> Result<Page, PageRenderFailure> {
        let cards: Vec<MountainCard> = self
            .listed()
            .filter(|entry| entry.resolved.difficulty.is_beginner_friendly())
            .take(6)
            .map(card)
            .collect();
        let title = "初心者ガイド";
        let content = self.render(
            "beginner",
            "beginner_index.html",
            context! {
                breadcrumb => vec![crumb("ホーム", "/"), current(title)],
                title => title,
                topics => topic_links(&self.mapper, "beginner", BEGINNER_TOPICS),
                cards => cards,
            },
        )?;
        Ok(Page {
            path: "beginner".to_string(),
            title: title.to_string(),
            meta_description: "はじめての低山登山に役立つ基礎知識をまとめました。".to_string(),
            content,
            structured_data: None,
        })
    }

    fn beginner_topic_page(&self, topic: &str) -> Result<Page, PageRenderFailure> {
        let source =
            find_source(BEGINNER_TOPICS, topic).ok_or_else(|| PageRenderFailure::MissingField {
                subject: format!("beginner {topic}"),
                field: "topic",
            })?;
        self.markdown_page(
            source,
            format!("beginner/{}", source.slug),
            vec![
                crumb("ホーム", "/"),
                crumb("初心者ガイド", "/beginner/"),
                current(source.title),
            ],
        )
    }

    fn static_page(&self, slug: &str) -> Result<Page, PageRenderFailure> {
        let source =
            find_source(STATIC_PAGES, slug).ok_or_else(|| PageRenderFailure::MissingField {
                subject: format!("page {slug}"),
                field: "page",
            })?;
        self.markdown_page(
            source,
            source.slug.to_string(),
            vec![crumb("ホーム", "/"), current(source.title)],
        )
    }

    fn markdown_page(
        &self,
        source: &StaticPageSource,
        path: String,
        breadcrumb: Vec<Crumb>,
    ) -> Result<Page, PageRenderFailure> {
        let content = self.render(
            &path,
            "static_page.html",
            context! {
                breadcrumb => breadcrumb,
                title => source.title,
                body => render_markdown_to_html(source.markdown),
            },
        )?;
        Ok(Page {
            path,
            title: source.title.to_string(),
            meta_description: source.description.to_string(),
            content,
            structured_data: None,
        })
    }

    fn render(
        &self,
        subject: &str,
        template_id: &str,
        vars: Value,
    ) -> Result<String, PageRenderFailure> {
        self.renderer.render(template_id, vars).map_err(|err| {
            warn!("{subject}: failed to render {template_id}");
            match err {
                PageRenderFailure::Template { source, .. } => PageRenderFailure::Template {
                    subject: subject.to_string(),
                    source,
                },
                other => other,
            }
        })
    }

    /// The eight regions always, plus `Other` when a mountain landed there.
    pub fn regions(&self) -> Vec<Region> {
        let mut regions = Region::KNOWN.to_vec();
        if self
            .entries
            .iter()
            .any(|entry| entry.resolved.region == Region::Other)
        {
            regions.push(Region::Other);
        }
        regions
    }

    /// Prefectures with at least one listed mountain, in table order.
    pub fn prefectures(&self) -> Vec<String> {
        self.prefecture_counts()
            .into_iter()
            .map(|(name, _)| name)
            .collect()
    }

    fn prefecture_counts(&self) -> Vec<(String, usize)> {
        let mut counts: BTreeMap<(usize, String), usize> = BTreeMap::new();
        for entry in self.listed() {
            let name = &entry.resolved.prefecture;
            if name == PLACEHOLDER {
                continue;
            }
            *counts
                .entry((prefecture::sort_key(name), name.clone()))
                .or_default() += 1;
        }
        counts
            .into_iter()
            .map(|((_, name), count)| (name, count))
            .collect()
    }

    fn region_counts(&self) -> Vec<(Region, usize)> {
        self.regions()
            .into_iter()
            .map(|region| {
                let count = self
                    .listed()
                    .filter(|entry| entry.resolved.region == region)
                    .count();
                (region, count)
            })
            .filter(|(_, count)| *count > 0)
            .collect()
    }

    /// Region a prefecture page hangs under: the region its mountains were
    /// resolved to, which honours explicit `region` fields.
    fn region_of_prefecture(&self, name: &str) -> Region {
        self.entries
            .iter()
            .find(|entry| entry.resolved.prefecture == name)
            .map(|entry| entry.resolved.region)
            .unwrap_or_else(|| prefecture::region_for_prefecture(name))
    }

    fn prefecture_link(&self, name: &str, count: usize) -> LinkCount {
        LinkCount {
            label: name.to_string(),
            href: self.mapper.map(&self.mapper.prefecture_key(name)).href,
            count,
        }
    }
}

fn card(entry: &MountainEntry<'_>) -> MountainCard {
    MountainCard {
        name: entry.resolved.name.clone(),
        href: entry.href.clone(),
        prefecture: entry.resolved.prefecture.clone(),
        elevation_label: entry.resolved.elevation_label.clone(),
        difficulty_label: entry.resolved.difficulty_label,
        features: entry.resolved.features.iter().take(3).cloned().collect(),
    }
}

fn topic_links(mapper: &UrlMapper, section: &str, sources: &[StaticPageSource]) -> Vec<TopicLink> {
    sources
        .iter()
        .map(|source| TopicLink {
            label: source.title,
            href: mapper.map(&format!("{section}/{}", source.slug)).href,
            summary: source.description,
        })
        .collect()
}

fn mountain_schema(mountain: &ResolvedMountain, url: &str) -> serde_json::Value {
    let mut schema = json!({
        "@type": "Mountain",
        "name": mountain.name,
        "url": url,
        "address": {
            "@type": "PostalAddress",
            "addressRegion": mountain.prefecture,
            "addressCountry": "JP",
        },
    });
    if let Some(elevation) = mountain.elevation {
        schema["elevation"] = json!({
            "@type": "QuantitativeValue",
            "value": elevation,
            "unitCode": "MTR",
        });
    }
    if let (Some(latitude), Some(longitude)) = (mountain.latitude, mountain.longitude) {
        schema["geo"] = json!({
            "@type": "GeoCoordinates",
            "latitude": latitude,
            "longitude": longitude,
        });
    }
    schema
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::affiliate::StaticCatalog;
    use crate::config::SiteConfig;
    use std::path::PathBuf;

    fn project(raw: &str) -> Project {
        let mountains: Vec<Mountain> = serde_json::from_str(raw).expect("mountains");
        Project {
            root: PathBuf::from("."),
            config: SiteConfig::default(),
            mountains,
            articles: Vec::new(),
        }
    }

    const MOUNTAINS: &str = r#"[
        {"id": "mt_takao_tokyo", "name": "高尾山", "elevation": 599,
         "difficulty": {"level": "初級"}, "features": ["ケーブルカー"]},
        {"id": "mt_mitake_tokyo", "name": "御岳山", "elevation": 929,
         "difficulty": {"level": "初級-中級"}},
        {"id": "mt_moiwa_hokkaido", "name": "藻岩山", "elevation": 531},
        {"id": "mt_nameless_tokyo", "name": "名無し山"}
    ]"#;

    fn site(project: &Project) -> SiteContent<'_> {
        let renderer = PageRenderer::new(&project.config).expect("renderer");
        SiteContent::new(project, renderer, &StaticCatalog)
    }

    #[test]
    fn mountain_page_has_toc_and_structured_data() {
        let project = project(MOUNTAINS);
        let site = site(&project);
        let rendered = site
            .page_for(&TaskKind::RenderMountain {
                mountain_id: "mt_takao_tokyo".to_string(),
            })
            .expect("page task")
            .expect("rendered");
        let page = rendered.page;
        assert_eq!(page.path, "mountains/高尾山");
        assert!(page.content.contains("id=\"section-1\""));
        assert!(page.content.contains("href=\"#section-1\""));
        assert!(page.content.contains("御岳山"));
        let data = page.structured_data.expect("structured data");
        assert_eq!(data["@graph"][0]["@type"], "Article");
        assert_eq!(data["@graph"][1]["elevation"]["value"], 599);
    }

    #[test]
    fn missing_elevation_page_fails_and_is_not_listed() {
        let project = project(MOUNTAINS);
        let site = site(&project);
        let err = site
            .page_for(&TaskKind::RenderMountain {
                mountain_id: "mt_nameless_tokyo".to_string(),
            })
            .expect("page task")
            .expect_err("expected error");
        assert!(err.to_string().contains("elevation"));

        let list = site
            .page_for(&TaskKind::RenderMountainList)
            .expect("page task")
            .expect("rendered");
        assert!(list.page.content.contains("高尾山"));
        assert!(!list.page.content.contains("名無し山"));
    }

    #[test]
    fn placeholder_mode_lists_every_mountain() {
        let mut project = project(MOUNTAINS);
        project.config.build.missing_elevation = MissingElevation::Placeholder;
        let site = site(&project);
        let rendered = site
            .page_for(&TaskKind::RenderMountain {
                mountain_id: "mt_nameless_tokyo".to_string(),
            })
            .expect("page task")
            .expect("rendered");
        assert!(rendered.page.content.contains(PLACEHOLDER));
    }

    #[test]
    fn prefectures_follow_table_order() {
        let project = project(MOUNTAINS);
        let site = site(&project);
        assert_eq!(site.prefectures(), vec!["北海道", "東京都"]);
        assert_eq!(site.regions().len(), 8);
    }

    #[test]
    fn prefecture_page_lists_its_mountains() {
        let project = project(MOUNTAINS);
        let site = site(&project);
        let page = site
            .page_for(&TaskKind::RenderPrefecture {
                prefecture: "東京都".to_string(),
            })
            .expect("page task")
            .expect("rendered")
            .page;
        assert_eq!(page.path, "regions/東京都");
        assert!(page.content.contains("高尾山"));
        assert!(page.content.contains("御岳山"));
        assert!(!page.content.contains("藻岩山"));
    }

    #[test]
    fn empty_region_page_still_renders() {
        let project = project(MOUNTAINS);
        let site = site(&project);
        let page = site
            .page_for(&TaskKind::RenderRegion {
                region: "shikoku".to_string(),
            })
            .expect("page task")
            .expect("rendered")
            .page;
        assert!(page.content.contains("準備中"));
    }

    #[test]
    fn static_and_equipment_pages_render_markdown() {
        let project = project(MOUNTAINS);
        let site = site(&project);
        let about = site
            .page_for(&TaskKind::RenderStaticPage {
                page: "about".to_string(),
            })
            .expect("page task")
            .expect("rendered")
            .page;
        assert!(about.content.contains("<h2>低山旅行について</h2>"));

        let shoes = site
            .page_for(&TaskKind::RenderEquipmentItem {
                item: "shoes".to_string(),
            })
            .expect("page task")
            .expect("rendered")
            .page;
        assert_eq!(shoes.path, "equipment/shoes");
        assert!(shoes.content.contains("product-card"));
    }

    #[test]
    fn stylesheet_task_has_no_page() {
        let project = project(MOUNTAINS);
        let site = site(&project);
        assert!(site.page_for(&TaskKind::WriteStylesheet).is_none());
    }
}
