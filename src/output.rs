use crate::models::Dataset;
use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// A rendered output file waiting to be written.
pub struct PendingFile<'a> {
    pub path: &'a str,
    pub contents: Vec<u8>,
}

pub fn render_json(dataset: &Dataset) -> Result<Vec<u8>> {
    let json = dataset.to_json().context("Failed to serialize dataset")?;
    Ok(json.into_bytes())
}

/// Flat `district,name,emis` rows in dataset order.
pub fn render_csv(dataset: &Dataset) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer.write_record(["district", "name", "emis"])?;
    for (district, schools) in &dataset.body.districts {
        for school in schools {
            writer.write_record([district.as_str(), school.name.as_str(), school.emis.as_str()])?;
        }
    }

    writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to finish CSV export: {}", e.error()))
}

/// Stage every file in a temp file next to its target, then move them all
/// into place. If any staging step fails nothing is written; the staged
/// temp files are removed on drop.
pub fn write_all(files: &[PendingFile<'_>]) -> Result<()> {
    let mut staged = Vec::with_capacity(files.len());
    for file in files {
        let target = Path::new(file.path);
        let dir = match target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut tmp = NamedTempFile::new_in(dir)
            .with_context(|| format!("Failed to create {}", file.path))?;
        tmp.write_all(&file.contents)
            .with_context(|| format!("Failed to write {}", file.path))?;
        staged.push((tmp, target));
    }

    for (tmp, target) in staged {
        tmp.persist(target)
            .with_context(|| format!("Failed to write {}", target.display()))?;
    }
    Ok(())
}
