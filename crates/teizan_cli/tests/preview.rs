use std::fs;
use std::time::{Duration, Instant};

use teizan_cli::preview::{PreviewOpts, spawn_preview};
use tempfile::TempDir;

struct TerminalRestore;

impl Drop for TerminalRestore {
    fn drop(&mut self) {
        let _ = std::process::Command::new("stty")
            .arg("sane")
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .status();
    }
}

fn wait_for_ready(url: &str) {
    let start = Instant::now();
    loop {
        match ureq::get(url).call() {
            Ok(_) => return,
            Err(ureq::Error::Status(_, _)) => return,
            Err(_) => {
                if start.elapsed() > Duration::from_secs(2) {
                    panic!("preview server did not start in time");
                }
                std::thread::sleep(Duration::from_millis(50));
            }
        }
    }
}

#[test]
fn preview_serves_directory_indexes() {
    let _terminal_restore = TerminalRestore;
    let temp = TempDir::new().expect("tempdir");
    let out_dir = temp.path().join("out");
    fs::create_dir_all(out_dir.join("mountains/高尾山")).expect("create dirs");
    fs::create_dir_all(out_dir.join("css")).expect("create dirs");
    fs::write(out_dir.join("index.html"), "<h1>低山旅行</h1>").expect("write index");
    fs::write(
        out_dir.join("mountains/高尾山/index.html"),
        "<h1>高尾山</h1>",
    )
    .expect("write page");
    fs::write(out_dir.join("css/style.css"), "body { color: #2c5234; }").expect("write css");

    let handle = spawn_preview(PreviewOpts {
        out_dir: out_dir.clone(),
        host: "127.0.0.1".to_string(),
        port: 0,
        no_open: true,
    })
    .expect("spawn preview");

    let url = handle.url.clone();
    let result = std::panic::catch_unwind(|| {
        wait_for_ready(&url);
        let response = ureq::get(&url).call().expect("get /");
        assert_eq!(response.status(), 200);
        assert!(response.into_string().expect("body").contains("低山旅行"));

        let page_url = format!("{url}mountains/{}/", urlencoding::encode("高尾山"));
        let response = ureq::get(&page_url).call().expect("get mountain page");
        assert_eq!(response.status(), 200);
        assert!(response.into_string().expect("body").contains("高尾山"));

        let response = ureq::get(&format!("{url}css/style.css"))
            .call()
            .expect("get css");
        assert_eq!(response.content_type(), "text/css");

        match ureq::get(&format!("{url}missing/")).call() {
            Err(ureq::Error::Status(code, _)) => assert_eq!(code, 404),
            other => panic!("expected 404, got {other:?}"),
        }
    });

    handle.stop().expect("stop preview");
    if let Err(err) = result {
        std::panic::resume_unwind(err);
    }
}

#[test]
fn preview_requires_existing_out_dir() {
    let temp = TempDir::new().expect("tempdir");
    let err = spawn_preview(PreviewOpts {
        out_dir: temp.path().join("missing"),
        host: "127.0.0.1".to_string(),
        port: 0,
        no_open: true,
    })
    .err()
    .expect("expected error");
    assert!(err.to_string().contains("teizan build"));
}
