use std::collections::BTreeMap;

use sha2::Digest as _;

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// One `(trait_type, value)` pair of an edition.
pub struct Attribute {
    /// Category name.
    pub trait_type: String,
    /// Display name of the selected option.
    pub value: String,
}

impl Attribute {
    /// Build an attribute from borrowed names.
    pub fn new(trait_type: &str, value: &str) -> Self {
        Self {
            trait_type: trait_type.to_string(),
            value: value.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Metadata record written for each edition and collected into `_metadata.json`.
pub struct EditionMetadata {
    /// `"{prefix} #{edition}"`.
    pub name: String,
    /// Collection description.
    pub description: String,
    /// `"{base_uri}/{edition}.png"`.
    pub image: String,
    /// SHA-256 hex of the raw DNA string.
    pub dna: String,
    /// Public edition number.
    pub edition: u32,
    /// Creation time in epoch milliseconds.
    pub date: i64,
    /// Traits bottom layer first.
    pub attributes: Vec<Attribute>,
    /// Configured extra fields, flattened into the top level.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
/// Collection-level strings every record is derived from.
pub struct MetadataTemplate {
    /// Name prefix.
    pub name_prefix: String,
    /// Description text.
    pub description: String,
    /// Base of the image URI.
    pub base_uri: String,
    /// Extra top-level fields.
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl MetadataTemplate {
    /// Public name of `edition`.
    pub fn name_for(&self, edition: u32) -> String {
        format!("{} #{edition}", self.name_prefix)
    }

    /// Image reference of `edition`.
    pub fn image_for(&self, edition: u32) -> String {
        format!("{}/{edition}.png", self.base_uri.trim_end_matches('/'))
    }

    /// Overwrite the template-derived fields of an existing record.
    pub fn apply(&self, record: &mut EditionMetadata) {
        record.name = self.name_for(record.edition);
        record.description = self.description.clone();
        record.image = self.image_for(record.edition);
        record.extra = self.extra.clone();
    }
}

/// Tamper-evident fingerprint of an encoded DNA.
pub fn dna_hash(encoded_dna: &str) -> String {
    hex::encode(sha2::Sha256::digest(encoded_dna.as_bytes()))
}
