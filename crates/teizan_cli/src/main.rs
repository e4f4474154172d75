use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use teizan_cli::config_loader::load_config;
use teizan_cli::exec::{BuildOpts, build_site, load_project, today_in_site_tz};
use teizan_cli::export::{ExportOpts, export_articles};
use teizan_cli::logging::init_logging;
use teizan_cli::preview::{PreviewOpts, run_preview};
use teizan_core::affiliate::StaticCatalog;
use teizan_core::content::SiteContent;
use teizan_core::store::{append_mountains, read_mountain_records};
use teizan_core::templates::PageRenderer;
use teizan_core::wxr::PostStatus;

#[derive(Debug, Parser)]
#[command(name = "teizan", about = "Static guide site and WordPress export for low mountains.")]
struct Cli {
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StatusArg {
    Publish,
    Draft,
    Future,
}

impl From<StatusArg> for PostStatus {
    fn from(value: StatusArg) -> Self {
        match value {
            StatusArg::Publish => PostStatus::Publish,
            StatusArg::Draft => PostStatus::Draft,
            StatusArg::Future => PostStatus::Future,
        }
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Load the dataset and report what a build would contain.")]
    Scan {
        #[arg(long, value_name = "PATH", default_value = "data/mountains.json")]
        data: PathBuf,
    },
    #[command(about = "Render the static site.")]
    Build {
        #[arg(long, value_name = "PATH", default_value = "data/mountains.json")]
        data: PathBuf,
        #[arg(long, value_name = "PATH", default_value = "out")]
        out: PathBuf,
        #[arg(long, value_name = "DIR")]
        articles: Option<PathBuf>,
        #[arg(long, value_name = "YYYY-MM-DD")]
        build_date: Option<String>,
        #[arg(long)]
        preview: bool,
        #[arg(long, default_value = "127.0.0.1", requires = "preview")]
        preview_host: String,
        #[arg(long, default_value_t = 8080, requires = "preview")]
        preview_port: u16,
        #[arg(long, requires = "preview")]
        preview_no_open: bool,
    },
    #[command(about = "Export articles as a WordPress WXR file.")]
    ExportWxr {
        #[arg(long, value_name = "PATH", default_value = "data/mountains.json")]
        data: PathBuf,
        #[arg(long, value_name = "DIR")]
        articles: Option<PathBuf>,
        #[arg(long, value_delimiter = ',')]
        ids: Vec<String>,
        #[arg(long, value_name = "YYYY-MM-DD HH:MM")]
        start: String,
        #[arg(long, default_value_t = 24)]
        interval_hours: u32,
        #[arg(long, value_enum, default_value = "future")]
        status: StatusArg,
        #[arg(long, value_name = "PATH", default_value = "wordpress_import.xml")]
        out: PathBuf,
    },
    #[command(about = "Append new mountain records to the dataset.")]
    Ingest {
        #[arg(long, value_name = "PATH", default_value = "data/mountains.json")]
        data: PathBuf,
        #[arg(long, value_name = "PATH")]
        from: PathBuf,
    },
    #[command(about = "Serve a built site locally.")]
    Serve {
        #[arg(long, value_name = "PATH", default_value = "out")]
        out: PathBuf,
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        #[arg(long, default_value_t = 8080)]
        port: u16,
        #[arg(long)]
        no_open: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    validate_flags(&cli)?;
    match &cli.command {
        Command::Scan { data } => run_scan(&cli, data),
        Command::Build {
            data,
            out,
            articles,
            build_date,
            preview,
            preview_host,
            preview_port,
            preview_no_open,
        } => run_build(
            &cli,
            data,
            out,
            articles.as_ref(),
            build_date.as_ref(),
            *preview,
            preview_host,
            *preview_port,
            *preview_no_open,
        ),
        Command::ExportWxr {
            data,
            articles,
            ids,
            start,
            interval_hours,
            status,
            out,
        } => run_export(
            &cli,
            ExportOpts {
                data: data.clone(),
                articles: articles.clone(),
                config: cli.config.clone(),
                ids: ids.clone(),
                start: start.clone(),
                interval_hours: *interval_hours,
                status: (*status).into(),
                out: out.clone(),
                now: None,
            },
        ),
        Command::Ingest { data, from } => run_ingest(&cli, data, from),
        Command::Serve {
            out,
            host,
            port,
            no_open,
        } => run_preview(PreviewOpts {
            out_dir: out.clone(),
            host: host.clone(),
            port: *port,
            no_open: *no_open,
        }),
    }
}

fn run_scan(cli: &Cli, data: &Path) -> Result<()> {
    let project = load_project(data, None, cli.config.as_deref())?;
    let renderer = PageRenderer::new(&project.config)?;
    let site = SiteContent::new(&project, renderer, &StaticCatalog);
    let listed = site.entries().iter().filter(|entry| entry.listed).count();
    println!("mountains: {}", site.entries().len());
    println!("listed: {listed}");
    println!("unlisted: {}", site.entries().len() - listed);
    println!("regions: {}", site.regions().len());
    println!("prefectures: {}", site.prefectures().len());
    for warning in site.warnings() {
        eprintln!("warning: {warning}");
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn run_build(
    cli: &Cli,
    data: &Path,
    out: &Path,
    articles: Option<&PathBuf>,
    build_date: Option<&String>,
    preview: bool,
    preview_host: &str,
    preview_port: u16,
    preview_no_open: bool,
) -> Result<()> {
    let report = build_site(&BuildOpts {
        data: data.to_path_buf(),
        out: out.to_path_buf(),
        articles: articles.cloned(),
        config: cli.config.clone(),
        build_date: build_date.cloned(),
    })?;

    println!("out: {}", out.display());
    println!("wrote {}/{} pages", report.written, report.attempted);
    println!("skipped: {}", report.skipped.len());
    for (subject, reason) in &report.skipped {
        eprintln!("skipped: {subject}: {reason}");
    }
    println!("affiliate fallbacks: {}", report.fallbacks);
    println!("warnings: {}", report.warnings.len());

    if preview {
        run_preview(PreviewOpts {
            out_dir: out.to_path_buf(),
            host: preview_host.to_string(),
            port: preview_port,
            no_open: preview_no_open,
        })?;
    }
    Ok(())
}

fn run_export(_cli: &Cli, opts: ExportOpts) -> Result<()> {
    let summary = export_articles(&opts)?;
    println!("wrote {}", summary.path.display());
    println!("items: {}", summary.items);
    println!("affiliate fallbacks: {}", summary.fallbacks);
    Ok(())
}

fn run_ingest(cli: &Cli, data: &Path, from: &Path) -> Result<()> {
    let incoming = read_mountain_records(from)
        .with_context(|| format!("failed to read new records from {}", from.display()))?;
    let updated_at = ingest_date(cli)?;
    let summary = append_mountains(data, incoming, &updated_at)?;
    println!("added: {}", summary.added.len());
    println!("skipped: {}", summary.skipped.len());
    for id in &summary.skipped {
        eprintln!("warning: {id} already exists, not modified");
    }
    println!("total: {}", summary.total);
    Ok(())
}

/// Today in the configured site timezone; a broken config is an error.
fn ingest_date(cli: &Cli) -> Result<String> {
    let root = std::env::current_dir().context("failed to resolve current directory")?;
    let config = load_config(cli.config.as_deref(), &root)?;
    Ok(today_in_site_tz(&config))
}

fn validate_flags(cli: &Cli) -> Result<()> {
    match &cli.command {
        Command::Build {
            build_date: Some(date),
            ..
        } => {
            if NaiveDate::parse_from_str(date, "%Y-%m-%d").is_err() {
                anyhow::bail!("--build-date must be YYYY-MM-DD, got '{date}'");
            }
        }
        Command::ExportWxr {
            ids,
            interval_hours,
            ..
        } => {
            if ids.iter().any(|id| id.trim().is_empty()) {
                anyhow::bail!("--ids must not contain empty entries");
            }
            if *interval_hours == 0 && ids.len() > 1 {
                anyhow::bail!("--interval-hours must be at least 1 when exporting several articles");
            }
        }
        Command::Ingest { data, from } => {
            if data == from {
                anyhow::bail!("--from must differ from --data");
            }
        }
        _ => {}
    }
    Ok(())
}
