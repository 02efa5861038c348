use std::{
    fs::File,
    io::{BufReader, BufWriter, Write as _},
    path::{Path, PathBuf},
};

use anyhow::Context;

use crate::{
    dna::sampler::Dna,
    foundation::error::{MintError, MintResult},
    metadata::record::{Attribute, EditionMetadata, MetadataTemplate, dna_hash},
};

/// File name of the collection-wide index inside the json directory.
pub const METADATA_INDEX_FILE: &str = "_metadata.json";

/// Builds per-edition records, writes them, and keeps the collection index.
#[derive(Clone, Debug)]
pub struct MetadataEmitter {
    json_dir: PathBuf,
    template: MetadataTemplate,
    records: Vec<EditionMetadata>,
}

impl MetadataEmitter {
    /// Emitter writing into `json_dir`, which must already exist.
    pub fn new(json_dir: impl Into<PathBuf>, template: MetadataTemplate) -> Self {
        Self {
            json_dir: json_dir.into(),
            template,
            records: Vec::new(),
        }
    }

    /// Record for an accepted DNA. `attributes` is consumed here and nowhere else.
    pub fn build_record(
        &self,
        dna: &Dna,
        attributes: Vec<Attribute>,
        edition: u32,
    ) -> EditionMetadata {
        EditionMetadata {
            name: self.template.name_for(edition),
            description: self.template.description.clone(),
            image: self.template.image_for(edition),
            dna: dna_hash(&dna.encoded()),
            edition,
            date: chrono::Utc::now().timestamp_millis(),
            attributes,
            extra: self.template.extra.clone(),
        }
    }

    /// Write `json/<edition>.json` and append the record to the index.
    pub fn emit(&mut self, record: EditionMetadata) -> MintResult<PathBuf> {
        let path = edition_path(&self.json_dir, record.edition);
        tracing::debug!(edition = record.edition, path = %path.display(), "writing metadata");
        write_json_pretty(&path, &record)?;
        self.records.push(record);
        Ok(path)
    }

    /// Serialize the full index to `json/_metadata.json`.
    pub fn write_index(&self) -> MintResult<PathBuf> {
        let path = self.json_dir.join(METADATA_INDEX_FILE);
        write_json_pretty(&path, &self.records)?;
        Ok(path)
    }
}

/// Location of one edition's metadata file.
pub fn edition_path(json_dir: &Path, edition: u32) -> PathBuf {
    json_dir.join(format!("{edition}.json"))
}

/// Re-derive name, description, image and extra fields of an existing collection.
///
/// Reads `_metadata.json`, applies `template` to every record, then rewrites each
/// per-edition file and the index. DNA hashes, dates and attributes are kept.
pub fn refresh_metadata(
    json_dir: &Path,
    template: &MetadataTemplate,
) -> MintResult<Vec<EditionMetadata>> {
    let index_path = json_dir.join(METADATA_INDEX_FILE);
    let f = File::open(&index_path)
        .with_context(|| format!("open metadata index '{}'", index_path.display()))?;
    let mut records: Vec<EditionMetadata> = serde_json::from_reader(BufReader::new(f))
        .map_err(|e| {
            MintError::serde(format!("parse '{}': {e}", index_path.display()))
        })?;

    for record in &mut records {
        template.apply(record);
        write_json_pretty(&edition_path(json_dir, record.edition), record)?;
    }
    write_json_pretty(&index_path, &records)?;

    tracing::info!(
        records = records.len(),
        base_uri = %template.base_uri,
        name_prefix = %template.name_prefix,
        "refreshed collection metadata"
    );
    Ok(records)
}

fn write_json_pretty<T: serde::Serialize + ?Sized>(path: &Path, value: &T) -> MintResult<()> {
    let f = File::create(path).with_context(|| format!("create '{}'", path.display()))?;
    let mut w = BufWriter::new(f);
    serde_json::to_writer_pretty(&mut w, value)?;
    w.flush()
        .with_context(|| format!("flush '{}'", path.display()))?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/metadata/emitter.rs"]
mod tests;
