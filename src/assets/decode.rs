use std::{
    path::Path,
    sync::{Arc, OnceLock},
};

use anyhow::Context;

use crate::{
    foundation::core::Canvas,
    foundation::error::{MintError, MintResult},
    foundation::math::premultiply_rgba8_in_place,
};

/// Layer pixels scaled to the canvas, premultiplied RGBA8, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LayerPixels {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes.
    pub rgba8_premul: Vec<u8>,
}

/// Resampling used when a layer's size differs from the canvas.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ScaleFilter {
    /// Nearest-neighbour; keeps pixel art crisp.
    #[default]
    Nearest,
    /// Bilinear.
    Smooth,
}

impl ScaleFilter {
    fn as_image_filter(self) -> image::imageops::FilterType {
        match self {
            Self::Nearest => image::imageops::FilterType::Nearest,
            Self::Smooth => image::imageops::FilterType::Triangle,
        }
    }
}

/// Read and decode the layer at `path`, stretched to `canvas`.
///
/// `.svg` files are rasterized directly at canvas size; everything else goes through
/// `image` format detection.
pub fn load_layer(path: &Path, canvas: Canvas, filter: ScaleFilter) -> MintResult<LayerPixels> {
    let bytes =
        std::fs::read(path).with_context(|| format!("read layer asset '{}'", path.display()))?;
    let is_svg = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("svg"));

    if is_svg {
        let tree = parse_svg(&bytes, path.parent())
            .with_context(|| format!("parse svg layer '{}'", path.display()))?;
        rasterize_svg(&tree, canvas)
    } else {
        decode_image(&bytes, canvas, filter)
            .with_context(|| format!("decode layer image '{}'", path.display()))
            .map_err(MintError::from)
    }
}

/// Decode encoded raster bytes into canvas-sized premultiplied RGBA8.
pub fn decode_image(
    bytes: &[u8],
    canvas: Canvas,
    filter: ScaleFilter,
) -> anyhow::Result<LayerPixels> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let mut rgba = dyn_img.to_rgba8();

    // Scale in premultiplied space so transparent edges do not pick up stray colour.
    premultiply_rgba8_in_place(&mut rgba);
    if rgba.dimensions() != (canvas.width, canvas.height) {
        rgba = image::imageops::resize(
            &rgba,
            canvas.width,
            canvas.height,
            filter.as_image_filter(),
        );
    }

    Ok(LayerPixels {
        width: canvas.width,
        height: canvas.height,
        rgba8_premul: rgba.into_raw(),
    })
}

fn parse_svg(bytes: &[u8], resources_dir: Option<&Path>) -> anyhow::Result<usvg::Tree> {
    let opts = usvg::Options {
        resources_dir: resources_dir.map(Path::to_path_buf),
        fontdb: svg_fontdb(),
        ..Default::default()
    };
    usvg::Tree::from_data(bytes, &opts).context("parse svg tree")
}

fn svg_fontdb() -> Arc<usvg::fontdb::Database> {
    static FONTDB: OnceLock<Arc<usvg::fontdb::Database>> = OnceLock::new();
    FONTDB
        .get_or_init(|| {
            let mut db = usvg::fontdb::Database::new();
            db.load_system_fonts();
            Arc::new(db)
        })
        .clone()
}

fn rasterize_svg(tree: &usvg::Tree, canvas: Canvas) -> MintResult<LayerPixels> {
    let size = tree.size();
    if !size.width().is_finite() || size.width() <= 0.0 || size.height() <= 0.0 {
        return Err(MintError::configuration("svg layer has invalid width/height"));
    }

    let mut pixmap = resvg::tiny_skia::Pixmap::new(canvas.width, canvas.height)
        .ok_or_else(|| MintError::configuration("failed to allocate svg pixmap"))?;
    let sx = (canvas.width as f32) / size.width();
    let sy = (canvas.height as f32) / size.height();
    resvg::render(
        tree,
        resvg::tiny_skia::Transform::from_scale(sx, sy),
        &mut pixmap.as_mut(),
    );

    Ok(LayerPixels {
        width: canvas.width,
        height: canvas.height,
        rgba8_premul: pixmap.take(),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
