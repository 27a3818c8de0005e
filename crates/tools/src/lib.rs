//! Native host for the `<h3-map>` element: fetchers and a headless
//! render loop used by the `h3map` binary.

use std::path::Path;

use serde_json::Value;
use tracing::debug;
use widget::{FetchError, GeometryFetcher, H3Map, Task, load_world_geometry};

/// Fetches over http(s) with `reqwest`.
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl GeometryFetcher for HttpFetcher {
    async fn fetch_json(&self, src: &str) -> Result<Value, FetchError> {
        let resp = self
            .client
            .get(src)
            .send()
            .await
            .map_err(|e| FetchError::Transport {
                url: src.to_string(),
                message: e.to_string(),
            })?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: src.to_string(),
                status: status.as_u16(),
            });
        }
        resp.json::<Value>().await.map_err(|e| FetchError::Decode {
            url: src.to_string(),
            message: e.to_string(),
        })
    }
}

/// Reads local files; `file://` prefixes are accepted.
#[derive(Debug, Copy, Clone, Default)]
pub struct FileFetcher;

impl GeometryFetcher for FileFetcher {
    async fn fetch_json(&self, src: &str) -> Result<Value, FetchError> {
        let path = Path::new(src.strip_prefix("file://").unwrap_or(src));
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| FetchError::Transport {
                url: src.to_string(),
                message: e.to_string(),
            })?;
        serde_json::from_slice(&bytes).map_err(|e| FetchError::Decode {
            url: src.to_string(),
            message: e.to_string(),
        })
    }
}

/// Picks the http fetcher for `http://`/`https://` sources and the file
/// fetcher for everything else.
#[derive(Debug, Clone, Default)]
pub struct SourceFetcher {
    http: HttpFetcher,
    file: FileFetcher,
}

impl SourceFetcher {
    pub fn new(http: HttpFetcher) -> Self {
        Self {
            http,
            file: FileFetcher,
        }
    }
}

pub fn is_remote(src: &str) -> bool {
    src.starts_with("http://") || src.starts_with("https://")
}

impl GeometryFetcher for SourceFetcher {
    async fn fetch_json(&self, src: &str) -> Result<Value, FetchError> {
        if is_remote(src) {
            self.http.fetch_json(src).await
        } else {
            self.file.fetch_json(src).await
        }
    }
}

/// Drives the element the way a browser would: render, run the after-paint
/// tasks (the probe reports `width` x `height`), and render again until no
/// task is left. Returns the last rendered markup.
pub async fn render_headless<F>(map: &mut H3Map, fetcher: &F, width: f64, height: f64) -> String
where
    F: GeometryFetcher,
{
    let mut html = map.render();
    loop {
        let tasks = map.after_paint();
        if tasks.is_empty() {
            break;
        }
        let mut changed = false;
        for task in tasks {
            match task {
                Task::ProbeViewport => changed |= map.apply_viewport(width, height),
                Task::LoadWorldGeometry(source) => {
                    let result = load_world_geometry(fetcher, &source).await;
                    changed |= map.apply_world_geometry(&source, result);
                }
            }
        }
        debug!(frame = map.frame().index, changed, "after-paint tasks done");
        html = map.render();
        if !changed {
            break;
        }
    }
    html
}
