use std::{
    collections::{BTreeMap, BTreeSet},
    fs::File,
    io::{BufReader, Read},
    path::{Path, PathBuf},
};

use crate::{
    foundation::core::{Canvas, Rgba8},
    foundation::error::{MintError, MintResult},
    metadata::record::MetadataTemplate,
};

/// Keys owned by the metadata record; `extra_metadata` may not shadow them.
const RESERVED_METADATA_KEYS: [&str; 7] = [
    "name",
    "description",
    "image",
    "dna",
    "edition",
    "date",
    "attributes",
];

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// Complete generator configuration, usually read from a JSON file.
///
/// Every field except `layer_configurations` has a default. Call [`GeneratorConfig::validate`]
/// (or use [`GeneratorConfig::from_path`], which does) before handing it to the generator.
pub struct GeneratorConfig {
    /// Root directory holding one sub-directory per trait category.
    pub layers_dir: PathBuf,
    /// Output root; `images/` and `json/` are recreated underneath on every run.
    pub build_dir: PathBuf,
    /// Prefix for each edition's `name`.
    pub name_prefix: String,
    /// Description copied into every record.
    pub description: String,
    /// Base URI the image reference is built from.
    pub base_uri: String,
    /// Size tiers, processed in order against one shared edition pool.
    pub layer_configurations: Vec<LayerConfiguration>,
    /// Canvas size and resize behaviour.
    pub format: Format,
    /// Solid straight-alpha RGBA the canvas is cleared to; transparent when absent.
    pub background: Option<Rgba8>,
    /// Shuffle the edition numbers handed out to produced items.
    pub shuffle_layer_configurations: bool,
    /// Emit debug-level progress logs.
    pub debug_logs: bool,
    /// Duplicate rejections tolerated before the run aborts.
    pub unique_dna_tolerance: u32,
    /// Separator between a display name and its rarity weight in file names.
    pub rarity_delimiter: String,
    /// How option weights are assigned.
    pub weights: WeightPolicy,
    /// Extra top-level fields merged into every metadata record.
    pub extra_metadata: BTreeMap<String, serde_json::Value>,
    /// Seed for a reproducible run; drawn from entropy when absent.
    pub seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            layers_dir: PathBuf::from("layers"),
            build_dir: PathBuf::from("build"),
            name_prefix: "Collection".to_string(),
            description: String::new(),
            base_uri: "ipfs://NewUriToReplace".to_string(),
            layer_configurations: Vec::new(),
            format: Format::default(),
            background: None,
            shuffle_layer_configurations: false,
            debug_logs: false,
            unique_dna_tolerance: 10_000,
            rarity_delimiter: "#".to_string(),
            weights: WeightPolicy::default(),
            extra_metadata: BTreeMap::new(),
            seed: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// One size tier: grow the collection to `grow_edition_size_to` using `layers_order`.
pub struct LayerConfiguration {
    /// Cumulative edition count reached at the end of this tier.
    pub grow_edition_size_to: u32,
    /// Categories bottom to top.
    pub layers_order: Vec<LayerSpec>,
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// A category entry in a tier's layer order.
pub struct LayerSpec {
    /// Directory name under `layers_dir`.
    pub name: String,
    /// Tag genes from this category with the `bypassDNA` modifier.
    #[serde(default)]
    pub bypass_dna: bool,
}

impl LayerSpec {
    /// Plain layer without modifiers.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bypass_dna: false,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// Canvas size and resize behaviour.
pub struct Format {
    /// Canvas width in pixels.
    pub width: u32,
    /// Canvas height in pixels.
    pub height: u32,
    /// Smooth (bilinear) scaling of layers; nearest-neighbour otherwise.
    pub smoothing: bool,
}

impl Default for Format {
    fn default() -> Self {
        Self {
            width: 512,
            height: 512,
            smoothing: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
/// Weight assignment for trait options.
pub enum WeightPolicy {
    /// Every option gets the same weight.
    Uniform {
        /// Weight assigned to each option; must be > 0.
        weight: u32,
    },
    /// Weight parsed from the file name suffix after the rarity delimiter (`Red#8.png`).
    FileName,
}

impl Default for WeightPolicy {
    fn default() -> Self {
        Self::Uniform { weight: 10 }
    }
}

impl GeneratorConfig {
    /// Read, resolve and validate a JSON config file.
    ///
    /// Relative `layers_dir`/`build_dir` are resolved against the file's directory.
    pub fn from_path(path: impl AsRef<Path>) -> MintResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            MintError::configuration(format!("open config '{}': {e}", path.display()))
        })?;
        let mut cfg = Self::from_reader(BufReader::new(f))?;
        if let Some(base) = path.parent() {
            cfg.resolve_relative_to(base);
        }
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse a JSON config without validating it.
    pub fn from_reader(r: impl Read) -> MintResult<Self> {
        serde_json::from_reader(r).map_err(|e| MintError::serde(format!("parse config JSON: {e}")))
    }

    /// Make relative directories absolute with respect to `base`.
    pub fn resolve_relative_to(&mut self, base: &Path) {
        if self.layers_dir.is_relative() {
            self.layers_dir = base.join(&self.layers_dir);
        }
        if self.build_dir.is_relative() {
            self.build_dir = base.join(&self.build_dir);
        }
    }

    /// Check structural constraints that do not need the filesystem.
    pub fn validate(&self) -> MintResult<()> {
        self.canvas()?;

        if self.layer_configurations.is_empty() {
            return Err(MintError::configuration(
                "layer_configurations must contain at least one tier",
            ));
        }

        let mut previous = 0u32;
        for (idx, tier) in self.layer_configurations.iter().enumerate() {
            if tier.grow_edition_size_to == 0 {
                return Err(MintError::configuration(format!(
                    "tier {idx}: grow_edition_size_to must be > 0"
                )));
            }
            if tier.grow_edition_size_to < previous {
                return Err(MintError::configuration(format!(
                    "tier {idx}: grow_edition_size_to ({}) must not be smaller than the previous \
                     tier ({previous})",
                    tier.grow_edition_size_to
                )));
            }
            previous = tier.grow_edition_size_to;

            if tier.layers_order.is_empty() {
                return Err(MintError::configuration(format!(
                    "tier {idx}: layers_order must be non-empty"
                )));
            }
            let mut seen = BTreeSet::new();
            for layer in &tier.layers_order {
                if layer.name.trim().is_empty() {
                    return Err(MintError::configuration(format!(
                        "tier {idx}: layer names must be non-empty"
                    )));
                }
                if layer.name.contains(['/', '\\']) || layer.name == ".." {
                    return Err(MintError::configuration(format!(
                        "tier {idx}: layer name '{}' must be a plain directory name",
                        layer.name
                    )));
                }
                if !seen.insert(layer.name.as_str()) {
                    return Err(MintError::configuration(format!(
                        "tier {idx}: layer '{}' listed twice",
                        layer.name
                    )));
                }
            }
        }

        if self.unique_dna_tolerance == 0 {
            return Err(MintError::configuration("unique_dna_tolerance must be > 0"));
        }
        if self.rarity_delimiter.is_empty() {
            return Err(MintError::configuration("rarity_delimiter must be non-empty"));
        }
        if let WeightPolicy::Uniform { weight: 0 } = self.weights {
            return Err(MintError::configuration("uniform weight must be > 0"));
        }
        for key in self.extra_metadata.keys() {
            if RESERVED_METADATA_KEYS.contains(&key.as_str()) {
                return Err(MintError::configuration(format!(
                    "extra_metadata key '{key}' collides with a record field"
                )));
            }
        }

        Ok(())
    }

    /// Validated canvas from `format`.
    pub fn canvas(&self) -> MintResult<Canvas> {
        Canvas::new(self.format.width, self.format.height)
    }

    /// Total editions across all tiers (the last tier's target).
    pub fn total_editions(&self) -> u32 {
        self.layer_configurations
            .last()
            .map_or(0, |t| t.grow_edition_size_to)
    }

    /// Directory receiving rendered PNGs.
    pub fn images_dir(&self) -> PathBuf {
        self.build_dir.join("images")
    }

    /// Directory receiving metadata JSON.
    pub fn json_dir(&self) -> PathBuf {
        self.build_dir.join("json")
    }

    /// Record-building parameters derived from this config.
    pub fn metadata_template(&self) -> MetadataTemplate {
        MetadataTemplate {
            name_prefix: self.name_prefix.clone(),
            description: self.description.clone(),
            base_uri: self.base_uri.clone(),
            extra: self.extra_metadata.clone(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/model.rs"]
mod tests;
