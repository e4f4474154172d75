//! `teizan export-wxr`: articles to a WordPress import file.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use log::{debug, info};
use teizan_core::content::{MountainEntry, SiteContent};
use teizan_core::error::ExportError;
use teizan_core::templates::PageRenderer;
use teizan_core::wxr::{ExportOptions, PostStatus, export_wxr, parse_start, validate_wxr};

use crate::exec::{load_project, product_source};

pub struct ExportOpts {
    pub data: PathBuf,
    pub articles: Option<PathBuf>,
    pub config: Option<PathBuf>,
    /// Mountain ids in post order; every listed mountain when empty.
    pub ids: Vec<String>,
    pub start: String,
    pub interval_hours: u32,
    pub status: PostStatus,
    pub out: PathBuf,
    /// Reference time for the publish check; the current time when absent.
    pub now: Option<DateTime<Utc>>,
}

#[derive(Debug)]
pub struct ExportSummary {
    pub items: usize,
    pub fallbacks: usize,
    pub path: PathBuf,
}

/// Nothing is written unless the whole export succeeds.
pub fn export_articles(opts: &ExportOpts) -> Result<ExportSummary> {
    let project = load_project(&opts.data, opts.articles.as_deref(), opts.config.as_deref())?;
    let source = product_source(&project.config);
    let renderer = PageRenderer::new(&project.config)?;
    let site = SiteContent::new(&project, renderer, source.as_ref());

    let entries: Vec<&MountainEntry<'_>> = if opts.ids.is_empty() {
        site.entries().iter().filter(|entry| entry.listed).collect()
    } else {
        opts.ids
            .iter()
            .map(|id| {
                site.entry(id)
                    .ok_or_else(|| ExportError::UnknownMountain(id.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?
    };

    let mut articles = Vec::with_capacity(entries.len());
    let mut fallbacks = 0;
    for entry in entries {
        let (article, entry_fallbacks) = site.article_for(entry)?;
        debug!("composed article for {}", entry.record.id);
        fallbacks += entry_fallbacks.len();
        articles.push(article);
    }

    let options = ExportOptions {
        start: parse_start(&opts.start)?,
        interval_hours: opts.interval_hours,
        status: opts.status,
        now: opts.now.unwrap_or_else(Utc::now),
    };
    let xml = export_wxr(&articles, &options, &project.config)?;
    validate_wxr(&xml, articles.len())?;

    if let Some(parent) = opts.out.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }
    fs::write(&opts.out, xml)
        .with_context(|| format!("failed to write {}", opts.out.display()))?;
    info!("exported {} articles to {}", articles.len(), opts.out.display());

    Ok(ExportSummary {
        items: articles.len(),
        fallbacks,
        path: opts.out.clone(),
    })
}
