use std::{
    collections::VecDeque,
    path::{Path, PathBuf},
};

use anyhow::Context;
use rand::{Rng, seq::SliceRandom};

use crate::{
    assets::decode::ScaleFilter,
    catalog::loader::LayerCatalog,
    config::model::{GeneratorConfig, LayerConfiguration},
    dna::sampler::{Dna, DnaSampler},
    dna::tracker::{DuplicateVerdict, UniquenessTracker},
    foundation::error::{MintError, MintResult},
    metadata::emitter::MetadataEmitter,
    metadata::record::Attribute,
    render::compositor::{Compositor, RenderOptions},
};

#[derive(Clone, Debug)]
/// One produced edition.
pub struct EditionOutcome {
    /// Public edition number.
    pub edition: u32,
    /// Index of the tier that produced it.
    pub tier: usize,
    /// DNA that produced it.
    pub dna: Dna,
    /// Traits bottom layer first.
    pub attributes: Vec<Attribute>,
    /// Written PNG.
    pub image_path: PathBuf,
    /// Written metadata JSON.
    pub metadata_path: PathBuf,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Per-tier production summary.
pub struct TierReport {
    /// Tier index.
    pub tier: usize,
    /// Cumulative target of the tier.
    pub grow_edition_size_to: u32,
    /// Editions this tier produced.
    pub produced: u32,
}

#[derive(Clone, Debug)]
/// Summary of a completed run.
pub struct GenerationReport {
    /// Editions in creation order.
    pub editions: Vec<EditionOutcome>,
    /// Duplicate DNA draws rejected over the whole run.
    pub duplicate_failures: u32,
    /// Per-tier counts.
    pub tiers: Vec<TierReport>,
    /// Location of `_metadata.json`.
    pub index_path: PathBuf,
}

impl GenerationReport {
    /// Edition numbers in creation order.
    pub fn edition_numbers(&self) -> Vec<u32> {
        self.editions.iter().map(|e| e.edition).collect()
    }
}

/// Mutable state of one run: the uniqueness set and the unassigned edition numbers.
#[derive(Clone, Debug)]
pub struct GenerationState {
    tracker: UniquenessTracker,
    pool: VecDeque<u32>,
    produced: u32,
}

impl GenerationState {
    /// Pool `[1, total]` in ascending order.
    pub fn new(total: u32, tolerance: u32) -> Self {
        Self {
            tracker: UniquenessTracker::new(tolerance),
            pool: (1..=total).collect(),
            produced: 0,
        }
    }

    /// Fisher-Yates shuffle of the remaining edition numbers.
    pub fn shuffle<R: Rng>(&mut self, rng: &mut R) {
        self.pool.make_contiguous().shuffle(rng);
    }

    /// The edition number the next accepted DNA receives.
    pub fn next_edition(&self) -> Option<u32> {
        self.pool.front().copied()
    }

    /// Remaining edition numbers in hand-out order.
    pub fn remaining(&self) -> impl Iterator<Item = u32> + '_ {
        self.pool.iter().copied()
    }

    /// Editions produced so far.
    pub fn produced(&self) -> u32 {
        self.produced
    }

    /// Uniqueness set and duplicate counter.
    pub fn tracker(&self) -> &UniquenessTracker {
        &self.tracker
    }

    fn complete_edition(&mut self, dna: &Dna) -> Option<u32> {
        let edition = self.pool.pop_front()?;
        self.tracker.accept(dna);
        self.produced += 1;
        Some(edition)
    }
}

/// Drives a full collection run from a validated config.
pub struct Generator {
    config: GeneratorConfig,
    sampler: DnaSampler,
    compositor: Compositor,
}

impl Generator {
    /// Validate `config` and set up the sampler and compositor.
    pub fn new(config: GeneratorConfig) -> MintResult<Self> {
        config.validate()?;
        let canvas = config.canvas()?;
        let opts = RenderOptions {
            filter: if config.format.smoothing {
                ScaleFilter::Smooth
            } else {
                ScaleFilter::Nearest
            },
            background: config.background,
        };
        Ok(Self {
            sampler: DnaSampler::from_seed(config.seed),
            compositor: Compositor::new(canvas, opts),
            config,
        })
    }

    /// Config the generator runs with.
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Remove the build directory and recreate `images/` and `json/`.
    pub fn prepare_output(&self) -> MintResult<()> {
        let build = &self.config.build_dir;
        if build.exists() {
            std::fs::remove_dir_all(build)
                .with_context(|| format!("clear build dir '{}'", build.display()))?;
        }
        for dir in [self.config.images_dir(), self.config.json_dir()] {
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("create output dir '{}'", dir.display()))?;
        }
        Ok(())
    }

    /// Load the catalog of every tier, in tier order.
    pub fn load_catalogs(&self) -> MintResult<Vec<LayerCatalog>> {
        self.config
            .layer_configurations
            .iter()
            .map(|tier| {
                LayerCatalog::load(
                    &self.config.layers_dir,
                    &tier.layers_order,
                    &self.config.weights,
                    &self.config.rarity_delimiter,
                )
            })
            .collect()
    }

    /// Produce the whole collection.
    ///
    /// All catalogs are loaded before the build directory is cleared, so a configuration
    /// error in any tier leaves the previous output untouched. Stops with
    /// [`MintError::Exhausted`] when the duplicate tolerance runs out; in that case the
    /// already written editions stay on disk and no index is written.
    #[tracing::instrument(skip(self), fields(total = self.config.total_editions()))]
    pub fn run(&mut self) -> MintResult<GenerationReport> {
        let catalogs = self.load_catalogs()?;
        self.prepare_output()?;

        let mut state = GenerationState::new(
            self.config.total_editions(),
            self.config.unique_dna_tolerance,
        );
        if self.config.shuffle_layer_configurations {
            state.shuffle(self.sampler.rng_mut());
        }
        tracing::debug!(
            editions = ?state.remaining().collect::<Vec<_>>(),
            "editions left to create"
        );

        let mut emitter =
            MetadataEmitter::new(self.config.json_dir(), self.config.metadata_template());
        let mut editions = Vec::new();
        let mut tiers = Vec::with_capacity(self.config.layer_configurations.len());

        let layer_configurations = self.config.layer_configurations.clone();
        for (idx, (tier, catalog)) in layer_configurations.iter().zip(&catalogs).enumerate() {
            let before = state.produced();
            self.run_tier(idx, tier, catalog, &mut state, &mut emitter, &mut editions)?;
            tiers.push(TierReport {
                tier: idx,
                grow_edition_size_to: tier.grow_edition_size_to,
                produced: state.produced() - before,
            });
        }

        let index_path = emitter.write_index()?;
        tracing::info!(
            editions = editions.len(),
            duplicates = state.tracker().failures(),
            index = %index_path.display(),
            "collection complete"
        );

        Ok(GenerationReport {
            editions,
            duplicate_failures: state.tracker().failures(),
            tiers,
            index_path,
        })
    }

    fn run_tier(
        &mut self,
        idx: usize,
        tier: &LayerConfiguration,
        catalog: &LayerCatalog,
        state: &mut GenerationState,
        emitter: &mut MetadataEmitter,
        editions: &mut Vec<EditionOutcome>,
    ) -> MintResult<()> {
        let wanted = u64::from(tier.grow_edition_size_to.saturating_sub(state.produced()));
        let combinations = catalog.combination_count();
        if combinations < wanted {
            tracing::warn!(
                tier = idx,
                combinations,
                wanted,
                "tier requests more editions than distinct trait combinations"
            );
        }

        let images_dir = self.config.images_dir();
        while state.produced() < tier.grow_edition_size_to {
            let dna = self.sampler.sample(catalog)?;
            if !state.tracker.is_unique(&dna) {
                tracing::debug!(dna = %dna, "DNA exists");
                if state.tracker.record_duplicate() == DuplicateVerdict::Exhausted {
                    tracing::warn!(
                        tier = idx,
                        requested = tier.grow_edition_size_to,
                        achieved = state.produced(),
                        "need more layers or options to grow the collection"
                    );
                    return Err(MintError::Exhausted {
                        tier: idx,
                        requested: tier.grow_edition_size_to,
                        achieved: state.produced(),
                        failures: state.tracker.failures(),
                    });
                }
                continue;
            }

            let edition = state.next_edition().ok_or_else(|| {
                MintError::configuration("edition pool ran out before the tier target")
            })?;
            let outcome = self.produce_edition(idx, edition, dna, catalog, &images_dir, emitter)?;
            state.complete_edition(&outcome.dna);
            editions.push(outcome);
        }
        Ok(())
    }

    fn produce_edition(
        &self,
        tier: usize,
        edition: u32,
        dna: Dna,
        catalog: &LayerCatalog,
        images_dir: &Path,
        emitter: &mut MetadataEmitter,
    ) -> MintResult<EditionOutcome> {
        let rendered = self.compositor.render(&dna, catalog)?;
        let image_path = images_dir.join(format!("{edition}.png"));
        rendered.write_png(&image_path)?;

        let attributes = rendered.attributes;
        let record = emitter.build_record(&dna, attributes.clone(), edition);
        let hash = record.dna.clone();
        let metadata_path = emitter.emit(record)?;

        tracing::info!(edition, tier, dna = %hash, "created edition");
        Ok(EditionOutcome {
            edition,
            tier,
            dna,
            attributes,
            image_path,
            metadata_path,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/generate/driver.rs"]
mod tests;
