use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

pub fn tetrad_home() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".tetrad"))
}

pub fn ensure_tetrad_home() -> Result<PathBuf> {
    let dir = tetrad_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

pub async fn read_text(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("read {}", path.display()))
}

pub async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let s = read_text(path).await?;
    serde_json::from_str(&s).with_context(|| format!("parse {}", path.display()))
}

/// Read a JSON file if a path was given, otherwise return the default.
pub async fn read_json_or_default<T: DeserializeOwned + Default>(path: Option<&Path>) -> Result<T> {
    match path {
        Some(p) => read_json(p).await,
        None => Ok(T::default()),
    }
}
