use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::{
    config::model::{LayerSpec, WeightPolicy},
    foundation::error::{MintError, MintResult},
};

#[derive(Clone, Debug, PartialEq, Eq)]
/// One selectable asset within a category.
pub struct TraitOption {
    /// Dense index within the category, in sorted file-name order.
    pub id: u32,
    /// File name with extension and rarity suffix stripped.
    pub display_name: String,
    /// Raw file name as found on disk.
    pub file_name: String,
    /// Full path of the source image.
    pub asset_path: PathBuf,
    /// Relative sampling weight, always > 0.
    pub weight: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// A named, z-ordered compositing layer with its option pool.
pub struct TraitCategory {
    /// Position in the layer order; lower ids are drawn first.
    pub id: u32,
    /// Directory name under the layers root.
    pub name: String,
    /// Genes from this category carry the `bypassDNA` modifier.
    pub bypass_dna: bool,
    /// Options in listing order.
    pub options: Vec<TraitOption>,
}

impl TraitCategory {
    /// Lookup an option by its id.
    pub fn option(&self, id: u32) -> Option<&TraitOption> {
        self.options.iter().find(|o| o.id == id)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// Ordered set of trait categories for one layer configuration.
pub struct LayerCatalog {
    categories: Vec<TraitCategory>,
}

impl LayerCatalog {
    /// Build a catalog from one sub-directory per configured layer under `layers_dir`.
    #[tracing::instrument(skip(layers, weights), fields(layer_count = layers.len()))]
    pub fn load(
        layers_dir: &Path,
        layers: &[LayerSpec],
        weights: &WeightPolicy,
        rarity_delimiter: &str,
    ) -> MintResult<Self> {
        let mut categories = Vec::with_capacity(layers.len());
        for (idx, layer) in layers.iter().enumerate() {
            let dir = layers_dir.join(&layer.name);
            let options = load_options(&dir, weights, rarity_delimiter)?;
            tracing::debug!(
                layer = %layer.name,
                options = options.len(),
                "loaded trait category"
            );
            categories.push(TraitCategory {
                id: u32::try_from(idx)
                    .map_err(|_| MintError::configuration("too many layers"))?,
                name: layer.name.clone(),
                bypass_dna: layer.bypass_dna,
                options,
            });
        }
        Self::from_categories(categories)
    }

    /// Build a catalog from in-memory categories, checking id and weight invariants.
    pub fn from_categories(categories: Vec<TraitCategory>) -> MintResult<Self> {
        if categories.is_empty() {
            return Err(MintError::configuration("catalog needs at least one category"));
        }
        for (idx, cat) in categories.iter().enumerate() {
            if cat.id as usize != idx {
                return Err(MintError::configuration(format!(
                    "category '{}' has id {} at position {idx}",
                    cat.name, cat.id
                )));
            }
            if cat.options.is_empty() {
                return Err(MintError::configuration(format!(
                    "category '{}' has no options",
                    cat.name
                )));
            }
            for (opt_idx, opt) in cat.options.iter().enumerate() {
                if opt.id as usize != opt_idx {
                    return Err(MintError::configuration(format!(
                        "option '{}' in '{}' has id {} at position {opt_idx}",
                        opt.file_name, cat.name, opt.id
                    )));
                }
                if opt.weight == 0 {
                    return Err(MintError::configuration(format!(
                        "option '{}' in '{}' has zero weight",
                        opt.file_name, cat.name
                    )));
                }
            }
        }
        Ok(Self { categories })
    }

    /// Categories bottom to top.
    pub fn categories(&self) -> &[TraitCategory] {
        &self.categories
    }

    /// Number of distinct option combinations, saturating at `u64::MAX`.
    pub fn combination_count(&self) -> u64 {
        self.categories
            .iter()
            .fold(1u64, |acc, c| acc.saturating_mul(c.options.len() as u64))
    }
}

fn load_options(
    dir: &Path,
    weights: &WeightPolicy,
    rarity_delimiter: &str,
) -> MintResult<Vec<TraitOption>> {
    if !dir.is_dir() {
        return Err(MintError::configuration(format!(
            "layer directory '{}' does not exist",
            dir.display()
        )));
    }

    let rd = std::fs::read_dir(dir)
        .with_context(|| format!("read layer directory '{}'", dir.display()))?;
    let mut files = Vec::new();
    for entry in rd {
        let entry = entry.with_context(|| format!("list layer directory '{}'", dir.display()))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(file_name) = entry.file_name().to_str().map(str::to_string) else {
            tracing::warn!(path = %path.display(), "skipping non UTF-8 file name");
            continue;
        };
        if is_hidden(&file_name) {
            continue;
        }
        files.push((file_name, path));
    }
    files.sort_by(|a, b| a.0.cmp(&b.0));

    if files.is_empty() {
        return Err(MintError::configuration(format!(
            "layer directory '{}' has no usable files",
            dir.display()
        )));
    }

    files
        .into_iter()
        .enumerate()
        .map(|(idx, (file_name, asset_path))| {
            let weight = match weights {
                WeightPolicy::Uniform { weight } => *weight,
                WeightPolicy::FileName => rarity_weight(&file_name, rarity_delimiter),
            };
            if weight == 0 {
                return Err(MintError::configuration(format!(
                    "'{}' has a zero rarity weight",
                    asset_path.display()
                )));
            }
            Ok(TraitOption {
                id: u32::try_from(idx)
                    .map_err(|_| MintError::configuration("too many options in layer"))?,
                display_name: clean_name(&file_name, rarity_delimiter),
                file_name,
                asset_path,
                weight,
            })
        })
        .collect()
}

fn is_hidden(file_name: &str) -> bool {
    file_name.starts_with('.')
}

fn strip_extension(file_name: &str) -> &str {
    match file_name.rfind('.') {
        Some(0) | None => file_name,
        Some(dot) => &file_name[..dot],
    }
}

/// Display name: extension-less file name up to the first rarity delimiter.
pub fn clean_name(file_name: &str, rarity_delimiter: &str) -> String {
    let stem = strip_extension(file_name);
    stem.split(rarity_delimiter)
        .next()
        .unwrap_or(stem)
        .to_string()
}

/// Weight encoded after the last rarity delimiter, or 1 when absent or not a number.
pub fn rarity_weight(file_name: &str, rarity_delimiter: &str) -> u32 {
    let stem = strip_extension(file_name);
    match stem.rsplit_once(rarity_delimiter) {
        Some((_, suffix)) => suffix.trim().parse::<u32>().unwrap_or(1),
        None => 1,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/catalog/loader.rs"]
mod tests;
