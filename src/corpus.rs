use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::model::ApiObject;

pub const CORPUS_PATH: &str = "data/objects.json";

pub fn save(path: &Path, objects: &[ApiObject]) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }
    let json = serde_json::to_string_pretty(objects)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    info!("Saved {} objects to {}", objects.len(), path.display());
    Ok(())
}

pub fn load(path: &Path) -> Result<Vec<ApiObject>> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let objects: Vec<ApiObject> = serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse corpus {}", path.display()))?;
    info!("Loaded {} objects from {}", objects.len(), path.display());
    Ok(objects)
}
