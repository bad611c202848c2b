//! Fake upstream release server

use std::path::Path;

use async_trait::async_trait;
use flate2::Compression;
use flate2::write::GzEncoder;
use mockito::{Mock, ServerGuard};

use release_matrix::artifact::error::TrunkError;
use release_matrix::artifact::trunk::TrunkSync;

/// Build a `.tar.gz` with every file under `root/`, all executable
fn tarball(root: &str, files: &[(&str, &str)]) -> Vec<u8> {
    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut builder = tar::Builder::new(encoder);
    for (name, body) in files {
        let mut header = tar::Header::new_gnu();
        header.set_size(body.len() as u64);
        header.set_mode(0o755);
        builder
            .append_data(&mut header, format!("{}/{}", root, name), body.as_bytes())
            .unwrap();
    }
    builder.into_inner().unwrap().finish().unwrap()
}

/// Release index served by mockito under `/releases`
pub struct ReleaseIndex {
    server: ServerGuard,
    archives: Vec<String>,
    mocks: Vec<Mock>,
    _index: Option<Mock>,
}

impl ReleaseIndex {
    pub async fn start() -> Self {
        Self {
            server: mockito::Server::new_async().await,
            archives: Vec::new(),
            mocks: Vec::new(),
            _index: None,
        }
    }

    pub fn releases_url(&self) -> String {
        format!("{}/releases", self.server.url())
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.server.url(), path)
    }

    /// Publish `<id>.tar.gz`, expecting it to be downloaded exactly once
    pub async fn publish(&mut self, id: &str, files: &[(&str, &str)]) {
        let mock = self
            .server
            .mock("GET", format!("/releases/{}.tar.gz", id).as_str())
            .with_status(200)
            .with_body(tarball(id, files))
            .expect(1)
            .create_async()
            .await;
        self.archives.push(id.to_string());
        self.mocks.push(mock);
    }

    /// Serve a file outside the release index
    pub async fn serve(&mut self, path: &str, body: &str, expected_hits: usize) {
        let mock = self
            .server
            .mock("GET", path)
            .with_status(200)
            .with_body(body)
            .expect(expected_hits)
            .create_async()
            .await;
        self.mocks.push(mock);
    }

    /// Serve the HTML index listing every published archive
    pub async fn serve_index(&mut self) {
        let mut html = String::from("<html><body>\n<a href=\"../\">../</a>\n");
        for id in &self.archives {
            html.push_str(&format!("<a href=\"{0}.tar.gz\">{0}.tar.gz</a>\n", id));
        }
        html.push_str("<a href=\"ansible-latest.tar.gz\">ansible-latest.tar.gz</a>\n");
        html.push_str("</body></html>\n");

        let mock = self
            .server
            .mock("GET", "/releases")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body(html)
            .create_async()
            .await;
        self._index = Some(mock);
    }

    /// Check every download expectation
    pub async fn assert(&self) {
        for mock in &self.mocks {
            mock.assert_async().await;
        }
    }
}

/// Trunk collaborator for matrices that never include the trunk
pub struct NoTrunk;

#[async_trait]
impl TrunkSync for NoTrunk {
    async fn sync(&self, dest: &Path) -> Result<(), TrunkError> {
        panic!("unexpected trunk sync into {:?}", dest);
    }
}
