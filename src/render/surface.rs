use std::sync::Arc;

use anyhow::Context as _;

use crate::{
    foundation::{
        core::{Affine, premultiply_rgba8_in_place},
        error::{FramefxError, FramefxResult},
    },
    render::composite,
};

/// Anything that can be drawn into a [`Surface`]: a decoded still or a raw video frame.
///
/// Pixels are premultiplied RGBA8, row-major, exactly `width * height * 4` bytes.
pub trait FrameSource {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn rgba8_premul(&self) -> &[u8];
}

impl<T: FrameSource + ?Sized> FrameSource for &T {
    fn width(&self) -> u32 {
        (**self).width()
    }

    fn height(&self) -> u32 {
        (**self).height()
    }

    fn rgba8_premul(&self) -> &[u8] {
        (**self).rgba8_premul()
    }
}

impl<T: FrameSource + ?Sized> FrameSource for Arc<T> {
    fn width(&self) -> u32 {
        (**self).width()
    }

    fn height(&self) -> u32 {
        (**self).height()
    }

    fn rgba8_premul(&self) -> &[u8] {
        (**self).rgba8_premul()
    }
}

/// A still image, typically one frame pulled out of the uploaded video.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceImage {
    width: u32,
    height: u32,
    rgba8_premul: Arc<Vec<u8>>,
}

impl SourceImage {
    pub fn from_premul(width: u32, height: u32, rgba8_premul: Vec<u8>) -> FramefxResult<Self> {
        check_len(width, height, rgba8_premul.len())?;
        Ok(Self {
            width,
            height,
            rgba8_premul: Arc::new(rgba8_premul),
        })
    }

    pub fn from_straight(width: u32, height: u32, mut rgba8: Vec<u8>) -> FramefxResult<Self> {
        check_len(width, height, rgba8.len())?;
        premultiply_rgba8_in_place(&mut rgba8);
        Self::from_premul(width, height, rgba8)
    }

    /// Decode any format the `image` crate understands (PNG, JPEG, ...).
    pub fn decode(bytes: &[u8]) -> FramefxResult<Self> {
        let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
        let rgba = dyn_img.to_rgba8();
        let (width, height) = rgba.dimensions();
        Self::from_straight(width, height, rgba.into_raw())
    }

    pub fn open(path: impl AsRef<std::path::Path>) -> FramefxResult<Self> {
        let path = path.as_ref();
        let bytes =
            std::fs::read(path).with_context(|| format!("read image '{}'", path.display()))?;
        Self::decode(&bytes)
    }

    /// Resampled copy at `width x height` (triangle filter, premultiplied so edges don't halo).
    pub fn resized(&self, width: u32, height: u32) -> FramefxResult<Self> {
        check_len(width, height, pixel_len(width, height)?)?;
        if (width, height) == (self.width, self.height) {
            return Ok(self.clone());
        }
        let img = image::RgbaImage::from_raw(
            self.width,
            self.height,
            self.rgba8_premul.as_ref().clone(),
        )
        .ok_or_else(|| FramefxError::validation("source data size mismatch"))?;
        let out = image::imageops::resize(
            &img,
            width,
            height,
            image::imageops::FilterType::Triangle,
        );
        Self::from_premul(width, height, out.into_raw())
    }

    /// Single-color image, handy for fixtures and placeholders.
    pub fn solid(width: u32, height: u32, premul: [u8; 4]) -> FramefxResult<Self> {
        let len = pixel_len(width, height)?;
        Self::from_premul(width, height, premul.repeat(len / 4))
    }
}

impl FrameSource for SourceImage {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn rgba8_premul(&self) -> &[u8] {
        &self.rgba8_premul
    }
}

/// A raw decoded video frame with its presentation timestamp.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VideoFrame {
    pub timestamp_us: u64,
    image: SourceImage,
}

impl VideoFrame {
    pub fn from_rgba8(
        width: u32,
        height: u32,
        rgba8: Vec<u8>,
        timestamp_us: u64,
    ) -> FramefxResult<Self> {
        Ok(Self {
            timestamp_us,
            image: SourceImage::from_straight(width, height, rgba8)?,
        })
    }

    pub fn image(&self) -> &SourceImage {
        &self.image
    }
}

impl FrameSource for VideoFrame {
    fn width(&self) -> u32 {
        self.image.width
    }

    fn height(&self) -> u32 {
        self.image.height
    }

    fn rgba8_premul(&self) -> &[u8] {
        &self.image.rgba8_premul
    }
}

/// Read-back of a surface's pixels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub premultiplied: bool,
}

/// A 2D raster target backed by a premultiplied `vello_cpu::Pixmap`.
pub struct Surface {
    width: u16,
    height: u16,
    pixmap: vello_cpu::Pixmap,
}

impl std::fmt::Debug for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Surface")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl Surface {
    pub fn new(width: u32, height: u32) -> FramefxResult<Self> {
        if width == 0 || height == 0 {
            return Err(FramefxError::surface(format!(
                "cannot allocate a {width}x{height} surface"
            )));
        }
        let width: u16 = width
            .try_into()
            .map_err(|_| FramefxError::surface("surface width exceeds u16"))?;
        let height: u16 = height
            .try_into()
            .map_err(|_| FramefxError::surface("surface height exceeds u16"))?;
        Ok(Self {
            width,
            height,
            pixmap: vello_cpu::Pixmap::new(width, height),
        })
    }

    /// A transparent surface with the source's dimensions.
    pub fn for_source(source: &dyn FrameSource) -> FramefxResult<Self> {
        Self::new(source.width(), source.height())
    }

    pub fn width(&self) -> u32 {
        u32::from(self.width)
    }

    pub fn height(&self) -> u32 {
        u32::from(self.height)
    }

    pub fn data(&self) -> &[u8] {
        self.pixmap.data_as_u8_slice()
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        self.pixmap.data_as_u8_slice_mut()
    }

    pub fn clear(&mut self) {
        self.fill([0, 0, 0, 0]);
    }

    pub fn fill(&mut self, premul: [u8; 4]) {
        for px in self.data_mut().chunks_exact_mut(4) {
            px.copy_from_slice(&premul);
        }
    }

    /// Copy of the current pixels as a drawable source.
    pub fn snapshot(&self) -> SourceImage {
        SourceImage {
            width: self.width(),
            height: self.height(),
            rgba8_premul: Arc::new(self.data().to_vec()),
        }
    }

    pub fn to_frame(&self) -> FrameRGBA {
        FrameRGBA {
            width: self.width(),
            height: self.height(),
            data: self.data().to_vec(),
            premultiplied: true,
        }
    }

    /// Draw `source` at its natural size under `transform`, source-over the current contents.
    ///
    /// Integer translations blit directly; everything else is rasterized through vello_cpu.
    /// Pixels that land outside the surface are dropped.
    pub fn draw_source(
        &mut self,
        source: &dyn FrameSource,
        transform: Affine,
        opacity: f32,
    ) -> FramefxResult<()> {
        check_len(source.width(), source.height(), source.rgba8_premul().len())?;
        if opacity <= 0.0 {
            return Ok(());
        }

        if let Some((dx, dy)) = integer_translation(transform) {
            self.blit_over(source, dx, dy, opacity);
            return Ok(());
        }

        let layer = self.rasterize(source, transform)?;
        composite::over_in_place(self.data_mut(), layer.data_as_u8_slice(), opacity)
    }

    fn rasterize(
        &self,
        source: &dyn FrameSource,
        transform: Affine,
    ) -> FramefxResult<vello_cpu::Pixmap> {
        let paint = image_paint(source)?;
        let mut layer = vello_cpu::Pixmap::new(self.width, self.height);
        let mut ctx = vello_cpu::RenderContext::new(self.width, self.height);
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_transform(affine_to_cpu(transform));
        ctx.set_paint(paint);
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(source.width()),
            f64::from(source.height()),
        ));
        ctx.flush();
        ctx.render_to_pixmap(&mut layer);
        Ok(layer)
    }

    fn blit_over(&mut self, source: &dyn FrameSource, dx: i64, dy: i64, opacity: f32) {
        let (sw, sh) = (i64::from(source.width()), i64::from(source.height()));
        let (dw, dh) = (i64::from(self.width), i64::from(self.height));

        let x0 = dx.max(0);
        let x1 = (dx + sw).min(dw);
        let y0 = dy.max(0);
        let y1 = (dy + sh).min(dh);
        if x0 >= x1 || y0 >= y1 {
            return;
        }

        let src = source.rgba8_premul();
        let row_len = ((x1 - x0) * 4) as usize;
        let dst = self.pixmap.data_as_u8_slice_mut();
        for y in y0..y1 {
            let s_off = (((y - dy) * sw + (x0 - dx)) * 4) as usize;
            let d_off = ((y * dw + x0) * 4) as usize;
            let s_row = &src[s_off..s_off + row_len];
            let d_row = &mut dst[d_off..d_off + row_len];
            for (d, s) in d_row.chunks_exact_mut(4).zip(s_row.chunks_exact(4)) {
                let out = composite::over(
                    [d[0], d[1], d[2], d[3]],
                    [s[0], s[1], s[2], s[3]],
                    opacity,
                );
                d.copy_from_slice(&out);
            }
        }
    }
}

fn integer_translation(t: Affine) -> Option<(i64, i64)> {
    let [a, b, c, d, e, f] = t.as_coeffs();
    const EPS: f64 = 1e-9;
    let is_int = |v: f64| v.is_finite() && (v - v.round()).abs() < EPS && v.abs() < 1e9;
    let linear_is_identity =
        (a - 1.0).abs() < EPS && b.abs() < EPS && c.abs() < EPS && (d - 1.0).abs() < EPS;
    if linear_is_identity && is_int(e) && is_int(f) {
        Some((e.round() as i64, f.round() as i64))
    } else {
        None
    }
}

fn image_paint(source: &dyn FrameSource) -> FramefxResult<vello_cpu::Image> {
    let w: u16 = source
        .width()
        .try_into()
        .map_err(|_| FramefxError::render("source width exceeds u16"))?;
    let h: u16 = source
        .height()
        .try_into()
        .map_err(|_| FramefxError::render("source height exceeds u16"))?;

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(source.rgba8_premul().len() / 4);
    for px in source.rgba8_premul().chunks_exact(4) {
        let a = px[3];
        may_have_opacities |= a != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a,
        });
    }

    let pixmap = vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, may_have_opacities);
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn pixel_len(width: u32, height: u32) -> FramefxResult<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| FramefxError::validation("image buffer size overflow"))
}

fn check_len(width: u32, height: u32, len: usize) -> FramefxResult<()> {
    if width == 0 || height == 0 {
        return Err(FramefxError::validation(format!(
            "source must be non-empty, got {width}x{height}"
        )));
    }
    let expected = pixel_len(width, height)?;
    if len != expected {
        return Err(FramefxError::validation(format!(
            "source byte length {len} does not match {width}x{height}x4"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
