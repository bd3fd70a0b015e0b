use anyhow::{Context, Result};
use log::info;
use reqwest::{blocking::Client, StatusCode};
use std::{fs, path::Path, time::Duration};

/// Source of reference card art that is not on disk yet.
///
/// Called from blocking worker threads.
pub trait CardImageFetcher: Send + Sync {
    /// Stores the image for `code` at `dest`. `Ok(false)` means the source has
    /// no image for this code.
    fn fetch(&self, code: &str, dest: &Path) -> Result<bool>;
}

pub struct HttpImageFetcher {
    client: Client,
    url_template: String,
}

impl HttpImageFetcher {
    pub fn new(url_template: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            url_template: url_template.into(),
        })
    }

    fn url_for(&self, code: &str) -> String {
        self.url_template.replace("{code}", code)
    }
}

impl CardImageFetcher for HttpImageFetcher {
    fn fetch(&self, code: &str, dest: &Path) -> Result<bool> {
        let url = self.url_for(code);
        let response = self
            .client
            .get(&url)
            .send()
            .with_context(|| format!("Failed to request {url}"))?;

        if response.status() == StatusCode::NOT_FOUND {
            info!("Card image missing on web: {code}");
            return Ok(false);
        }
        let bytes = response
            .error_for_status()
            .with_context(|| format!("Bad response for {url}"))?
            .bytes()
            .with_context(|| format!("Failed to read body of {url}"))?;

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(dest, &bytes)
            .with_context(|| format!("Failed to write {}", dest.display()))?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DraftConfig;

    #[test]
    fn default_template_points_at_the_code() {
        let fetcher = HttpImageFetcher::new(DraftConfig::default().image_url_template).unwrap();
        assert!(fetcher.url_for("EX1_001").ends_with("/EX1_001.png"));
        assert!(!fetcher.url_for("EX1_001").contains("{code}"));
    }
}
