use crate::error::{Result, ScrapeError};
use crate::services::text_utils::slugify;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;
use rustc_hash::FxHashSet;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

/// Keeps a local copy of each poster next to the published data.
pub struct PosterService {
    client: Client,
    dir: PathBuf,
    prefix: String,
}

impl PosterService {
    /// Posters land in `<data_dir>/<poster_dir>` and are referenced as
    /// `<poster_dir>/<file>`.
    pub fn new(client: Client, data_dir: &Path, poster_dir: &str) -> Self {
        Self {
            client,
            dir: data_dir.join(poster_dir),
            prefix: poster_dir.trim_end_matches('/').to_string(),
        }
    }

    /// `<slug>.jpg`, numbered `<slug>-2.jpg`, `<slug>-3.jpg`, ... when an
    /// earlier title in the same batch already took the name.
    pub fn file_name(title: &str, taken: &mut FxHashSet<String>) -> String {
        let slug = slugify(title);
        let stem = if slug.is_empty() { "poster" } else { slug.as_str() };

        let mut name = format!("{}.jpg", stem);
        let mut n = 2;
        while !taken.insert(name.clone()) {
            name = format!("{}-{}.jpg", stem, n);
            n += 1;
        }
        name
    }

    /// Fetches every poster in `posters` (title, source URL) that is not
    /// cached yet. Returns the reference for each title in input order, empty
    /// where the download failed.
    pub async fn fetch_all(&self, posters: &[(String, Option<String>)]) -> Result<Vec<String>> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let pb = ProgressBar::new(posters.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
                .map_err(|e| ScrapeError::Other(e.to_string()))?,
        );

        let mut taken = FxHashSet::default();
        let mut references = Vec::with_capacity(posters.len());
        for (title, url) in posters {
            pb.set_message(format!("Poster for {}", title));
            let reference = match url {
                Some(url) => {
                    let file_name = Self::file_name(title, &mut taken);
                    self.fetch(title, url, file_name).await
                }
                None => String::new(),
            };
            references.push(reference);
            pb.inc(1);
        }
        pb.finish_with_message("Posters ready");

        Ok(references)
    }

    async fn fetch(&self, title: &str, url: &str, file_name: String) -> String {
        let path = self.dir.join(&file_name);

        let cached = tokio::fs::metadata(&path)
            .await
            .map(|m| m.len() > 0)
            .unwrap_or(false);

        if !cached {
            if let Err(e) = self.download_image(url, &path).await {
                warn!("Failed to download poster for {}: {}", title, e);
                return String::new();
            }
        }

        format!("{}/{}", self.prefix, file_name)
    }

    /// Writes to a `.part` file first so an interrupted download never
    /// leaves a truncated image under the final name.
    async fn download_image(&self, url: &str, path: &Path) -> Result<()> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        let bytes = response.bytes().await?;

        let partial = path.with_extension("jpg.part");
        if let Err(e) = write_file(&partial, &bytes).await {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(e);
        }
        tokio::fs::rename(&partial, path).await?;

        Ok(())
    }

    /// Deletes poster files no longer referenced by `references`.
    pub async fn remove_stale(&self, references: &[String]) -> Result<usize> {
        let keep: FxHashSet<&str> = references
            .iter()
            .filter_map(|r| r.rsplit('/').next())
            .filter(|name| !name.is_empty())
            .collect();

        let mut removed = 0;
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if !keep.contains(name.as_str()) {
                tokio::fs::remove_file(entry.path()).await?;
                info!("Removed stale poster {}", name);
                removed += 1;
            }
        }

        Ok(removed)
    }
}

async fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut file = tokio::fs::File::create(path).await?;
    file.write_all(bytes).await?;
    file.flush().await?;
    Ok(())
}
