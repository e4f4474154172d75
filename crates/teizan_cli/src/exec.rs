//! Runs a build plan against the output directory.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use log::{debug, info, warn};
use teizan_core::affiliate::{ProductSource, StaticCatalog};
use teizan_core::article::load_article_records;
use teizan_core::config::SiteConfig;
use teizan_core::content::SiteContent;
use teizan_core::model::{BuildPlan, BuildTask, Project, TaskKind};
use teizan_core::plan::build_plan;
use teizan_core::sitemap::{SitemapEntry, render_sitemap};
use teizan_core::store::MountainStore;
use teizan_core::templates::{PageRenderer, STYLESHEET};

use crate::config_loader::load_config;
use crate::rakuten::RakutenSource;

#[derive(Debug, Default)]
pub struct BuildReport {
    /// HTML pages the plan asked for.
    pub attempted: usize,
    pub written: usize,
    /// Subject and reason for every page that could not be rendered.
    pub skipped: Vec<(String, String)>,
    pub fallbacks: usize,
    pub warnings: Vec<String>,
    pub written_paths: Vec<PathBuf>,
}

pub struct BuildOpts {
    pub data: PathBuf,
    pub out: PathBuf,
    pub articles: Option<PathBuf>,
    pub config: Option<PathBuf>,
    /// `YYYY-MM-DD`; today in the site timezone when absent.
    pub build_date: Option<String>,
}

/// Loads the dataset, optional article records and config into a project.
pub fn load_project(
    data: &Path,
    articles: Option<&Path>,
    config: Option<&Path>,
) -> Result<Project> {
    let root = std::env::current_dir().context("failed to resolve current directory")?;
    let config = load_config(config, &root)?;
    let store = MountainStore::load(data)?;
    info!("loaded {} mountains from {}", store.len(), data.display());
    let articles = match articles {
        Some(dir) => load_article_records(dir)?,
        None => Vec::new(),
    };
    Ok(Project {
        root,
        config,
        mountains: store.all().to_vec(),
        articles,
    })
}

/// Rakuten when credentials are configured, the built-in catalog otherwise.
pub fn product_source(config: &SiteConfig) -> Box<dyn ProductSource> {
    match &config.affiliate.rakuten {
        Some(rakuten) => Box::new(RakutenSource::new(rakuten.clone())),
        None => Box::new(StaticCatalog),
    }
}

pub fn today_in_site_tz(config: &SiteConfig) -> String {
    Utc::now()
        .with_timezone(&config.site.tz())
        .format("%Y-%m-%d")
        .to_string()
}

pub fn build_site(opts: &BuildOpts) -> Result<BuildReport> {
    let project = load_project(&opts.data, opts.articles.as_deref(), opts.config.as_deref())?;
    let source = product_source(&project.config);
    debug!("affiliate source: {}", source.name());
    let renderer = PageRenderer::new(&project.config)?;
    let site = SiteContent::new(&project, renderer, source.as_ref());
    let plan = build_plan(&project);
    let build_date = match &opts.build_date {
        Some(date) => date.clone(),
        None => today_in_site_tz(&project.config),
    };
    execute_plan(&site, &plan, &opts.out, &build_date)
}

/// Writes every task's output. A page that fails to render is logged and
/// skipped; filesystem errors abort the build.
pub fn execute_plan(
    site: &SiteContent<'_>,
    plan: &BuildPlan,
    out_dir: &Path,
    build_date: &str,
) -> Result<BuildReport> {
    let mut report = BuildReport {
        warnings: site.warnings(),
        ..BuildReport::default()
    };
    for warning in &report.warnings {
        warn!("{warning}");
    }

    for dir in &plan.dirs {
        let path = out_dir.join(dir);
        fs::create_dir_all(&path)
            .with_context(|| format!("failed to create {}", path.display()))?;
    }

    let mut sitemap_entries = Vec::new();
    for task in &plan.tasks {
        match &task.kind {
            TaskKind::WriteStylesheet => {
                write_output(out_dir, task, STYLESHEET, &mut report)?;
            }
            TaskKind::GenerateSitemap => {
                let xml = render_sitemap(&sitemap_entries, site.renderer().base_url(), build_date);
                write_output(out_dir, task, &xml, &mut report)?;
            }
            kind => {
                let Some(result) = site.page_for(kind) else {
                    continue;
                };
                report.attempted += 1;
                let rendered = match result {
                    Ok(rendered) => rendered,
                    Err(err) => {
                        warn!("skipping {}: {err}", task_subject(task));
                        report.skipped.push((task_subject(task), err.to_string()));
                        continue;
                    }
                };
                report.fallbacks += rendered.fallbacks.len();
                for fallback in &rendered.fallbacks {
                    debug!("affiliate fallback: {fallback}");
                }
                let html = match site.renderer().render_page(&rendered.page, build_date) {
                    Ok(html) => html,
                    Err(err) => {
                        warn!("skipping {}: {err}", task_subject(task));
                        report.skipped.push((task_subject(task), err.to_string()));
                        continue;
                    }
                };
                write_output(out_dir, task, &html, &mut report)?;
                report.written += 1;
                sitemap_entries.push(SitemapEntry::for_page_path(&rendered.page.path));
            }
        }
    }
    Ok(report)
}

fn write_output(
    out_dir: &Path,
    task: &BuildTask,
    contents: &str,
    report: &mut BuildReport,
) -> Result<()> {
    for output in &task.outputs {
        let path = out_dir.join(output);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        fs::write(&path, contents)
            .with_context(|| format!("failed to write {}", path.display()))?;
        debug!("wrote {}", path.display());
        report.written_paths.push(output.clone());
    }
    Ok(())
}

fn task_subject(task: &BuildTask) -> String {
    match &task.kind {
        TaskKind::RenderMountain { mountain_id } => mountain_id.clone(),
        TaskKind::RenderRegion { region } => format!("region {region}"),
        TaskKind::RenderPrefecture { prefecture } => format!("prefecture {prefecture}"),
        TaskKind::RenderEquipmentItem { item } => format!("equipment {item}"),
        TaskKind::RenderBeginnerTopic { topic } => format!("beginner {topic}"),
        TaskKind::RenderStaticPage { page } => format!("page {page}"),
        _ => task
            .outputs
            .first()
            .map(|path| path.display().to_string())
            .unwrap_or_default(),
    }
}
