use super::Catalog;
use crate::error::CatalogError;
use crate::models::challenge::ChallengeRecord;
use crate::models::map::MapConfig;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// On-disk layout of one challenge file.
#[derive(Debug, Deserialize)]
pub struct ChallengeFile {
    #[serde(default)]
    pub order: Option<u32>,
    pub challenge: ChallengeRecord,
    #[serde(default)]
    pub map: Option<MapConfig>,
}

/// Load every `*.json` challenge file under `root`. Files are ordered by their
/// `order` field (files without one go last), then by path.
pub fn load_catalog_dir(root: &Path) -> Result<Catalog, CatalogError> {
    let mut entries: Vec<PathBuf> = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry.map_err(|e| walk_error(root, e))?;
        let is_json = entry
            .path()
            .extension()
            .and_then(|s| s.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        if entry.file_type().is_file() && is_json {
            entries.push(entry.into_path());
        }
    }
    entries.sort();

    let pb = ProgressBar::new(entries.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg}\n[{bar:40.cyan/blue}] {pos}/{len} {percent}%")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▇▆▅▄▃▂▁  "),
    );

    let mut files = Vec::with_capacity(entries.len());
    for path in entries {
        pb.set_message(format!("Reading {}", path.display()));
        let file = read_challenge_file(&path)?;
        debug!(id = %file.challenge.id, path = %path.display(), "loaded challenge file");
        files.push((path, file));
        pb.inc(1);
    }
    pb.finish_with_message("✅ All challenges loaded!");

    files.sort_by(|(path_a, a), (path_b, b)| {
        let ka = a.order.unwrap_or(u32::MAX);
        let kb = b.order.unwrap_or(u32::MAX);
        ka.cmp(&kb).then_with(|| path_a.cmp(path_b))
    });

    let mut challenges = Vec::with_capacity(files.len());
    let mut maps = Vec::new();
    for (_, file) in files {
        if let Some(map) = file.map {
            maps.push((file.challenge.id.clone(), map));
        }
        challenges.push(file.challenge);
    }

    let catalog = Catalog::from_parts(challenges, maps)?;
    info!(
        challenges = catalog.len(),
        root = %root.display(),
        "catalog loaded from directory"
    );
    Ok(catalog)
}

fn walk_error(root: &Path, err: walkdir::Error) -> CatalogError {
    let path = err.path().unwrap_or(root).to_path_buf();
    CatalogError::Io {
        path,
        source: std::io::Error::from(err),
    }
}

fn read_challenge_file(path: &Path) -> Result<ChallengeFile, CatalogError> {
    let content = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| CatalogError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
