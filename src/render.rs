use std::sync::Arc;

use crate::{
    assets::Texture,
    core::{Affine, Vec2},
    error::{VitrineError, VitrineResult},
    stage::{Layer, Stage},
};

/// One rasterized frame: tightly packed premultiplied RGBA8 rows.
#[derive(Clone, Debug)]
pub struct FrameRGBA {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub premultiplied: bool,
}

/// Rasterize the stage in painter's order into a single frame.
///
/// The canvas is cleared to the stage background first; layers composite
/// over it with their own opacity. Fully transparent layers are skipped.
pub fn render_stage(stage: &Stage) -> VitrineResult<FrameRGBA> {
    let canvas = stage.canvas();
    let width: u16 = canvas
        .width
        .try_into()
        .map_err(|_| VitrineError::render("canvas width exceeds u16"))?;
    let height: u16 = canvas
        .height
        .try_into()
        .map_err(|_| VitrineError::render("canvas height exceeds u16"))?;

    let mut ctx = vello_cpu::RenderContext::new(width, height);
    for (_, layer) in stage.iter() {
        draw_layer(&mut ctx, layer)?;
    }
    ctx.flush();

    let mut pixmap = vello_cpu::Pixmap::new(width, height);
    let [r, g, b, a] = stage.background_rgba();
    clear_pixmap(&mut pixmap, premul_rgba8(r, g, b, a));
    // render_to_pixmap composites over the cleared background.
    ctx.render_to_pixmap(&mut pixmap);

    Ok(FrameRGBA {
        width: canvas.width,
        height: canvas.height,
        data: pixmap.data_as_u8_slice().to_vec(),
        premultiplied: true,
    })
}

fn draw_layer(ctx: &mut vello_cpu::RenderContext, layer: &Layer) -> VitrineResult<()> {
    if layer.alpha <= 0.0 {
        return Ok(());
    }

    let texture = layer.texture.as_ref();
    let (tw, th) = (f64::from(texture.width), f64::from(texture.height));

    // Texture space has its origin at the top left; the anchor offset shifts
    // it so `position` lands on the anchor point after scaling.
    let offset = Vec2::new(
        layer.position.x - layer.scale * layer.anchor.x * tw,
        layer.position.y - layer.scale * layer.anchor.y * th,
    );
    let transform = Affine::translate(offset) * Affine::scale(layer.scale);

    ctx.set_transform(affine_to_cpu(transform));
    ctx.set_paint(texture_paint(texture)?);

    if layer.alpha < 1.0 {
        ctx.push_opacity_layer(layer.alpha);
    }
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, tw, th));
    if layer.alpha < 1.0 {
        ctx.pop_layer();
    }
    Ok(())
}

fn texture_paint(texture: &Texture) -> VitrineResult<vello_cpu::Image> {
    let pixmap = premul_bytes_to_pixmap(&texture.rgba8_premul, texture.width, texture.height)?;
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

fn premul_bytes_to_pixmap(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> VitrineResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| VitrineError::render("texture width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| VitrineError::render("texture height exceeds u16"))?;
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(VitrineError::render("texture byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    for px in rgba8_premul.chunks_exact(4) {
        let a = px[3];
        may_have_opacities |= a != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a,
        });
    }

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

fn premul_rgba8(r: u8, g: u8, b: u8, a: u8) -> [u8; 4] {
    let af = (a as u16) + 1;
    let premul = |c: u8| -> u8 { (((c as u16) * af) >> 8) as u8 };
    [premul(r), premul(g), premul(b), a]
}

fn clear_pixmap(pixmap: &mut vello_cpu::Pixmap, rgba: [u8; 4]) {
    let data = pixmap.data_as_u8_slice_mut();
    for px in data.chunks_exact_mut(4) {
        px.copy_from_slice(&rgba);
    }
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn premul_of_opaque_is_identity() {
        assert_eq!(premul_rgba8(255, 128, 7, 255), [255, 128, 7, 255]);
    }

    #[test]
    fn premul_of_transparent_is_zero_color() {
        assert_eq!(premul_rgba8(255, 255, 255, 0), [0, 0, 0, 0]);
    }

    #[test]
    fn pixmap_rejects_byte_length_mismatch() {
        let err = premul_bytes_to_pixmap(&[0u8; 3], 1, 1).unwrap_err();
        assert!(err.to_string().starts_with("render error:"));
    }
}
