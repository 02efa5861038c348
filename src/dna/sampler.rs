use std::fmt;

use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::{
    catalog::loader::LayerCatalog,
    foundation::error::{MintError, MintResult},
};

/// Separator between genes in the encoded DNA.
pub const DNA_DELIMITER: char = '-';

/// Query modifier attached to genes of `bypass_dna` categories.
pub const BYPASS_DNA_MODIFIER: &str = "bypassDNA=true";

#[derive(Clone, Debug, PartialEq, Eq)]
/// One category's pick inside a DNA.
pub struct Gene {
    /// Option id within the category.
    pub option_id: u32,
    /// Source file name of the option.
    pub file_name: String,
    /// Query-string modifiers (without the leading `?`). Never part of the identity.
    pub modifiers: Option<String>,
}

impl fmt::Display for Gene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.option_id, self.file_name)?;
        if let Some(m) = &self.modifiers {
            write!(f, "?{m}")?;
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// Identity of one edition: one gene per category, in category order.
pub struct Dna {
    genes: Vec<Gene>,
}

impl Dna {
    /// Wrap an ordered gene list.
    pub fn from_genes(genes: Vec<Gene>) -> Self {
        Self { genes }
    }

    /// Genes in category order.
    pub fn genes(&self) -> &[Gene] {
        &self.genes
    }

    /// Raw encoded form, modifiers included. This is what the metadata hash covers.
    pub fn encoded(&self) -> String {
        self.to_string()
    }

    /// Canonical form used for duplicate detection.
    pub fn canonical(&self) -> String {
        canonicalize(&self.encoded())
    }
}

impl fmt::Display for Dna {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, gene) in self.genes.iter().enumerate() {
            if idx > 0 {
                write!(f, "{DNA_DELIMITER}")?;
            }
            write!(f, "{gene}")?;
        }
        Ok(())
    }
}

/// Strip every `?query` run from an encoded DNA, keeping the delimiters.
pub fn canonicalize(encoded: &str) -> String {
    let mut out = String::with_capacity(encoded.len());
    let mut in_query = false;
    for c in encoded.chars() {
        match c {
            '?' => in_query = true,
            DNA_DELIMITER => {
                in_query = false;
                out.push(c);
            }
            _ if !in_query => out.push(c),
            _ => {}
        }
    }
    out
}

/// Inverse-CDF pick over integer weights.
///
/// Draws `r` in `[0, total)` and walks the weights in order, subtracting until `r` would go
/// negative. Falls back to the last index if the walk completes without a pick. Returns
/// `None` only for an empty or all-zero slice.
pub fn pick_weighted_index<R: Rng>(weights: &[u32], rng: &mut R) -> Option<usize> {
    let total: u64 = weights.iter().map(|&w| u64::from(w)).sum();
    if total == 0 {
        return None;
    }

    let mut remaining = rng.gen_range(0..total);
    for (idx, &w) in weights.iter().enumerate() {
        let w = u64::from(w);
        if remaining < w {
            return Some(idx);
        }
        remaining -= w;
    }
    Some(weights.len() - 1)
}

/// Draws DNA from a catalog with an owned RNG.
pub struct DnaSampler<R = StdRng> {
    rng: R,
}

impl DnaSampler<StdRng> {
    /// Seeded sampler when `seed` is set, entropy-seeded otherwise.
    pub fn from_seed(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }
}

impl<R: Rng> DnaSampler<R> {
    /// Wrap an existing RNG.
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Borrow the RNG, e.g. to shuffle edition numbers from the same stream.
    pub fn rng_mut(&mut self) -> &mut R {
        &mut self.rng
    }

    /// Pick one option per category and encode the picks as a DNA.
    pub fn sample(&mut self, catalog: &LayerCatalog) -> MintResult<Dna> {
        let mut genes = Vec::with_capacity(catalog.categories().len());
        for cat in catalog.categories() {
            let weights: Vec<u32> = cat.options.iter().map(|o| o.weight).collect();
            let idx = pick_weighted_index(&weights, &mut self.rng).ok_or_else(|| {
                MintError::configuration(format!(
                    "category '{}' has no positive-weight options",
                    cat.name
                ))
            })?;
            let opt = &cat.options[idx];
            genes.push(Gene {
                option_id: opt.id,
                file_name: opt.file_name.clone(),
                modifiers: cat.bypass_dna.then(|| BYPASS_DNA_MODIFIER.to_string()),
            });
        }
        Ok(Dna::from_genes(genes))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/dna/sampler.rs"]
mod tests;
