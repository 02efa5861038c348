use std::path::Path;

use anyhow::Context;
use rayon::prelude::*;

use crate::{
    assets::decode::{LayerPixels, ScaleFilter, load_layer},
    catalog::loader::{LayerCatalog, TraitCategory, TraitOption},
    dna::sampler::Dna,
    foundation::core::{Canvas, Rgba8},
    foundation::error::{MintError, MintResult},
    foundation::math::{over, unpremultiply_rgba8_in_place},
    metadata::record::Attribute,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// Per-run rendering knobs.
pub struct RenderOptions {
    /// Resampling used to stretch layers onto the canvas.
    pub filter: ScaleFilter,
    /// Color the canvas starts from; transparent when `None`.
    pub background: Option<Rgba8>,
}

#[derive(Clone, Copy, Debug)]
/// A gene resolved back to its catalog entries.
pub struct ResolvedLayer<'a> {
    /// Category the gene belongs to.
    pub category: &'a TraitCategory,
    /// Option the gene selected.
    pub option: &'a TraitOption,
}

#[derive(Clone, Debug)]
/// Output of one render: the flattened image and the traits that went into it.
pub struct RenderedEdition {
    /// Straight-alpha RGBA8 image at canvas size.
    pub image: image::RgbaImage,
    /// One attribute per category, bottom layer first.
    pub attributes: Vec<Attribute>,
}

impl RenderedEdition {
    /// Encode the image as PNG at `path`.
    pub fn write_png(&self, path: &Path) -> MintResult<()> {
        image::save_buffer_with_format(
            path,
            self.image.as_raw(),
            self.image.width(),
            self.image.height(),
            image::ColorType::Rgba8,
            image::ImageFormat::Png,
        )
        .with_context(|| format!("write png '{}'", path.display()))?;
        Ok(())
    }
}

/// Turns a DNA into pixels. Holds no pixel state between calls.
#[derive(Clone, Debug)]
pub struct Compositor {
    canvas: Canvas,
    opts: RenderOptions,
}

impl Compositor {
    /// Compositor for a fixed canvas size.
    pub fn new(canvas: Canvas, opts: RenderOptions) -> Self {
        Self { canvas, opts }
    }

    /// Map every gene to its option by exact id within the matching category.
    pub fn resolve<'a>(
        &self,
        dna: &Dna,
        catalog: &'a LayerCatalog,
    ) -> MintResult<Vec<ResolvedLayer<'a>>> {
        let categories = catalog.categories();
        if dna.genes().len() != categories.len() {
            return Err(MintError::missing_asset(format!(
                "dna '{dna}' has {} genes but the catalog has {} layers",
                dna.genes().len(),
                categories.len()
            )));
        }

        dna.genes()
            .iter()
            .zip(categories)
            .map(|(gene, category)| {
                let option = category.option(gene.option_id).ok_or_else(|| {
                    MintError::missing_asset(format!(
                        "layer '{}' has no option with id {} ('{}')",
                        category.name, gene.option_id, gene.file_name
                    ))
                })?;
                Ok(ResolvedLayer { category, option })
            })
            .collect()
    }

    /// Resolve, load and flatten all layers of `dna`.
    ///
    /// Assets are loaded in parallel; drawing happens afterwards in ascending category id.
    pub fn render(&self, dna: &Dna, catalog: &LayerCatalog) -> MintResult<RenderedEdition> {
        let mut layers = self.resolve(dna, catalog)?;
        layers.sort_by_key(|l| l.category.id);

        let loaded: Vec<LayerPixels> = layers
            .par_iter()
            .map(|l| load_layer(&l.option.asset_path, self.canvas, self.opts.filter))
            .collect::<MintResult<_>>()?;

        let mut surface = self.blank_surface();
        for px in &loaded {
            draw_over(&mut surface, &px.rgba8_premul)?;
        }
        unpremultiply_rgba8_in_place(&mut surface);

        let image = image::RgbaImage::from_raw(self.canvas.width, self.canvas.height, surface)
            .ok_or_else(|| MintError::configuration("canvas buffer size mismatch"))?;
        let attributes = layers
            .iter()
            .map(|l| Attribute::new(&l.category.name, &l.option.display_name))
            .collect();

        tracing::debug!(dna = %dna, layers = layers.len(), "composited edition");
        Ok(RenderedEdition { image, attributes })
    }

    fn blank_surface(&self) -> Vec<u8> {
        let fill = self
            .opts
            .background
            .map_or([0, 0, 0, 0], Rgba8::premultiplied);
        fill.repeat(self.canvas.rgba8_len() / 4)
    }
}

fn draw_over(dst: &mut [u8], src: &[u8]) -> MintResult<()> {
    if dst.len() != src.len() {
        return Err(MintError::configuration(
            "layer pixels do not match canvas size",
        ));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]]);
        d.copy_from_slice(&out);
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
