//! layermint generates a layered NFT collection from a directory of trait images.
//!
//! # Pipeline overview
//!
//! 1. **Load**: `layers_dir/<category>/*` -> [`LayerCatalog`] (weighted options per layer)
//! 2. **Sample**: [`LayerCatalog`] -> [`Dna`] (one weighted pick per layer)
//! 3. **Deduplicate**: [`UniquenessTracker`] rejects DNA whose canonical form was seen before
//! 4. **Composite**: [`Dna`] -> [`RenderedEdition`] (flattened PNG pixels plus attributes)
//! 5. **Emit**: [`MetadataEmitter`] writes `json/<n>.json` and finally `json/_metadata.json`
//!
//! [`Generator`] runs these steps for every configured tier until the target edition count is
//! reached or the duplicate tolerance is exhausted.
//!
//! Constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Explicit data flow**: the compositor returns attributes with the image; nothing is kept
//!   between editions except the uniqueness set and the edition pool.
//! - **Reproducible when seeded**: a configured `seed` fixes every random draw of a run.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod catalog;
mod config;
mod dna;
mod foundation;
mod generate;
mod metadata;
mod render;

pub use assets::decode::{LayerPixels, ScaleFilter, decode_image, load_layer};
pub use catalog::loader::{LayerCatalog, TraitCategory, TraitOption, clean_name, rarity_weight};
pub use config::model::{Format, GeneratorConfig, LayerConfiguration, LayerSpec, WeightPolicy};
pub use dna::sampler::{
    BYPASS_DNA_MODIFIER, DNA_DELIMITER, Dna, DnaSampler, Gene, canonicalize, pick_weighted_index,
};
pub use dna::tracker::{DuplicateVerdict, UniquenessTracker};
pub use foundation::core::{Canvas, Rgba8};
pub use foundation::error::{MintError, MintResult};
pub use generate::driver::{
    EditionOutcome, GenerationReport, GenerationState, Generator, TierReport,
};
pub use metadata::emitter::{METADATA_INDEX_FILE, MetadataEmitter, edition_path, refresh_metadata};
pub use metadata::record::{Attribute, EditionMetadata, MetadataTemplate, dna_hash};
pub use render::compositor::{Compositor, RenderOptions, RenderedEdition, ResolvedLayer};
