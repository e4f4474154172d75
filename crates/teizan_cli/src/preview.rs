//! Local preview server for a built site.

use std::fs::File;
use std::io::Read;
use std::net::SocketAddr;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::{Context, Result};
use log::{debug, warn};
use tiny_http::{Header, Method, Response, Server, StatusCode};

pub const INDEX_FILE: &str = "index.html";

pub struct PreviewOpts {
    pub out_dir: PathBuf,
    pub host: String,
    pub port: u16,
    pub no_open: bool,
}

pub struct PreviewHandle {
    pub url: String,
    shutdown: Arc<AtomicBool>,
    join: JoinHandle<Result<()>>,
}

impl PreviewHandle {
    pub fn stop(self) -> Result<()> {
        self.shutdown.store(true, Ordering::SeqCst);
        match self.join.join() {
            Ok(result) => result,
            Err(_) => anyhow::bail!("preview thread panicked"),
        }
    }
}

pub fn run_preview(opts: PreviewOpts) -> Result<()> {
    let out_dir = absolute_out_dir(opts.out_dir)?;
    validate_out_dir(&out_dir)?;

    let (server, addr) = bind_server(&opts.host, opts.port)?;
    let url = preview_url(&opts.host, addr);

    println!("Preview: {url}");
    println!("Serving: {}", out_dir.display());

    if !opts.no_open {
        if let Err(err) = webbrowser::open(&url) {
            eprintln!("warning: failed to open browser: {err}");
        }
    }

    serve_loop(server, out_dir, None)
}

pub fn spawn_preview(opts: PreviewOpts) -> Result<PreviewHandle> {
    let out_dir = absolute_out_dir(opts.out_dir)?;
    validate_out_dir(&out_dir)?;

    let (server, addr) = bind_server(&opts.host, opts.port)?;
    let url = preview_url(&opts.host, addr);
    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_thread = shutdown.clone();
    let join = thread::spawn(move || serve_loop(server, out_dir, Some(shutdown_thread)));

    Ok(PreviewHandle {
        url,
        shutdown,
        join,
    })
}

fn absolute_out_dir(out_dir: PathBuf) -> Result<PathBuf> {
    if out_dir.is_absolute() {
        return Ok(out_dir);
    }
    let cwd = std::env::current_dir().context("failed to resolve current directory")?;
    Ok(cwd.join(out_dir))
}

fn validate_out_dir(out_dir: &Path) -> Result<()> {
    if !out_dir.is_dir() {
        anyhow::bail!(
            "Output dir {} does not exist. Run `teizan build` first or pass --out.",
            out_dir.display()
        );
    }
    Ok(())
}

fn bind_server(host: &str, port: u16) -> Result<(Server, SocketAddr)> {
    let addr = format!("{host}:{port}");
    let server =
        Server::http(&addr).map_err(|err| anyhow::anyhow!("failed to bind to {addr}: {err}"))?;
    let actual = server
        .server_addr()
        .to_ip()
        .ok_or_else(|| anyhow::anyhow!("failed to resolve socket address"))?;
    Ok((server, actual))
}

fn preview_url(host: &str, addr: SocketAddr) -> String {
    format!("http://{host}:{}/", addr.port())
}

fn serve_loop(server: Server, out_dir: PathBuf, shutdown: Option<Arc<AtomicBool>>) -> Result<()> {
    loop {
        if let Some(flag) = &shutdown {
            if flag.load(Ordering::SeqCst) {
                break;
            }
        }

        let request = match server.recv_timeout(Duration::from_millis(200)) {
            Ok(Some(request)) => request,
            Ok(None) => continue,
            Err(err) => return Err(err.into()),
        };
        debug!("preview {} {}", request.method(), request.url());

        let response = match handle_request(&request, &out_dir) {
            Ok(response) => response,
            Err(err) => {
                warn!("preview request failed: {err}");
                Response::from_string("Internal Server Error")
                    .with_status_code(StatusCode(500))
                    .boxed()
            }
        };

        if let Err(err) = request.respond(response) {
            warn!("failed to send response: {err}");
        }
    }
    Ok(())
}

fn not_found() -> Response<Box<dyn Read + Send>> {
    Response::from_string("Not Found")
        .with_status_code(StatusCode(404))
        .boxed()
}

fn handle_request(
    request: &tiny_http::Request,
    out_dir: &Path,
) -> Result<Response<Box<dyn Read + Send>>> {
    if request.method() != &Method::Get && request.method() != &Method::Head {
        return Ok(Response::from_string("Method Not Allowed")
            .with_status_code(StatusCode(405))
            .boxed());
    }

    let Some(rel_path) = sanitize_path(request.url()) else {
        return Ok(not_found());
    };

    let mut full_path = out_dir.join(&rel_path);
    if full_path.is_dir() {
        full_path.push(INDEX_FILE);
    }
    if !full_path.is_file() {
        return Ok(not_found());
    }

    let file = File::open(&full_path)
        .with_context(|| format!("failed to open {}", full_path.display()))?;

    let mut response = if request.method() == &Method::Head {
        Response::empty(200).boxed()
    } else {
        Response::from_file(file).boxed()
    };
    if let Some(header) = content_type_header(&full_path) {
        response = response.with_header(header);
    }
    Ok(response)
}

/// Maps a request URL onto a path inside the output dir. Trailing slashes
/// resolve to the directory's `index.html`.
fn sanitize_path(url: &str) -> Option<PathBuf> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let decoded = urlencoding::decode(path).ok()?;
    if decoded.contains('\\') {
        return None;
    }
    let trimmed = decoded.trim_start_matches('/');

    let mut clean = PathBuf::new();
    for component in Path::new(trimmed).components() {
        match component {
            Component::Normal(part) => clean.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }

    if clean.as_os_str().is_empty() || decoded.ends_with('/') {
        clean.push(INDEX_FILE);
    }
    Some(clean)
}

fn content_type_for(path: &Path) -> &'static str {
    match path.extension().and_then(|ext| ext.to_str()).unwrap_or("") {
        "html" => "text/html; charset=utf-8",
        "css" => "text/css; charset=utf-8",
        "js" => "text/javascript; charset=utf-8",
        "xml" => "application/xml; charset=utf-8",
        "json" => "application/json",
        "svg" => "image/svg+xml",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

fn content_type_header(path: &Path) -> Option<Header> {
    Header::from_bytes("Content-Type", content_type_for(path)).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_maps_to_index() {
        assert_eq!(sanitize_path("/"), Some(PathBuf::from("index.html")));
    }

    #[test]
    fn directory_urls_map_to_their_index() {
        let encoded = format!("/mountains/{}/", urlencoding::encode("高尾山"));
        assert_eq!(
            sanitize_path(&encoded),
            Some(PathBuf::from("mountains/高尾山/index.html"))
        );
    }

    #[test]
    fn query_strings_are_ignored() {
        assert_eq!(
            sanitize_path("/css/style.css?v=2"),
            Some(PathBuf::from("css/style.css"))
        );
    }

    #[test]
    fn parent_components_are_rejected() {
        assert_eq!(sanitize_path("/../etc/passwd"), None);
        assert_eq!(sanitize_path("/a/%2e%2e/%2e%2e/b"), None);
        assert_eq!(sanitize_path("/a\\b"), None);
    }
}
