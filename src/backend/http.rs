use reqwest::blocking::Client;
use tracing::{debug, info, warn};

use crate::backend::index_records;
use crate::backend::traits::PackageSource;
use crate::config::TransportConfig;
use crate::core::package::PackageRecord;
use crate::core::version::find_package;
use crate::error::{ApkgraphError, Result};

/// Paths tried under the repository root, in order; the first success wins.
pub const INDEX_CANDIDATES: [&str; 3] = ["x86_64/APKINDEX.tar.gz", "APKINDEX.tar.gz", "APKINDEX"];

/// Serves packages from an index document published over HTTP.
#[derive(Debug)]
pub struct HttpIndexBackend {
    root: String,
    client: Client,
    records: Option<Vec<PackageRecord>>,
}

impl HttpIndexBackend {
    pub fn new(root: impl Into<String>, transport: &TransportConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(transport.timeout)
            .user_agent(transport.user_agent.as_str())
            .danger_accept_invalid_certs(transport.accept_invalid_certs)
            .build()
            .map_err(|err| ApkgraphError::Other(anyhow::Error::new(err)))?;
        Ok(Self {
            root: root.into(),
            client,
            records: None,
        })
    }

    pub fn candidate_urls(&self) -> Vec<String> {
        let root = self.root.trim_end_matches('/');
        INDEX_CANDIDATES
            .iter()
            .map(|suffix| format!("{root}/{suffix}"))
            .collect()
    }

    /// Fetches the raw index bytes from the first candidate that answers.
    pub fn fetch_document(&self) -> Result<Vec<u8>> {
        let mut attempts = Vec::new();
        for url in self.candidate_urls() {
            debug!(%url, "fetching index candidate");
            match self.fetch(&url) {
                Ok(bytes) => {
                    info!(%url, bytes = bytes.len(), "fetched index");
                    return Ok(bytes);
                }
                Err(err) => {
                    warn!(%url, error = %err, "index candidate failed");
                    attempts.push(format!("{url}: {err}"));
                }
            }
        }
        Err(ApkgraphError::Unavailable {
            root: self.root.clone(),
            attempts,
        })
    }

    fn fetch(&self, url: &str) -> reqwest::Result<Vec<u8>> {
        let response = self.client.get(url).send()?.error_for_status()?;
        Ok(response.bytes()?.to_vec())
    }

    fn records(&mut self) -> Result<&[PackageRecord]> {
        let records = match self.records.take() {
            Some(records) => records,
            None => index_records(self.fetch_document()?, &self.root),
        };
        Ok(self.records.insert(records).as_slice())
    }
}

impl PackageSource for HttpIndexBackend {
    fn kind(&self) -> &'static str {
        "http"
    }

    fn lookup(&mut self, name: &str, version: Option<&str>) -> Result<Option<PackageRecord>> {
        find_package(self.records()?, name, version)
    }
}

#[cfg(test)]
mod tests {
    use crate::backend::http::HttpIndexBackend;
    use crate::config::TransportConfig;

    #[test]
    fn candidate_urls_follow_fixed_order() {
        let backend = HttpIndexBackend::new(
            "https://mirror.example/alpine/v3.19/main/",
            &TransportConfig::default(),
        )
        .expect("backend");
        assert_eq!(
            backend.candidate_urls(),
            vec![
                "https://mirror.example/alpine/v3.19/main/x86_64/APKINDEX.tar.gz",
                "https://mirror.example/alpine/v3.19/main/APKINDEX.tar.gz",
                "https://mirror.example/alpine/v3.19/main/APKINDEX",
            ]
        );
    }
}
