use crate::gpu::GpuContext;

/// A GPU texture holding one image's pixels (`uTexture`).
#[derive(Debug)]
pub struct Texture {
    #[allow(dead_code)]
    pub(crate) texture: wgpu::Texture,
    pub(crate) view: wgpu::TextureView,
    pub(crate) sampler: wgpu::Sampler,
    pub width: u32,
    pub height: u32,
}

impl Texture {
    /// Create a texture from raw RGBA data.
    pub fn from_rgba(gpu: &GpuContext, data: &[u8], width: u32, height: u32, label: &str) -> Self {
        use wgpu::util::DeviceExt;

        let texture = gpu.device.create_texture_with_data(
            &gpu.queue,
            &wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            data,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        // Photos want smooth filtering, and the distortion samples near the
        // edges, so clamp instead of wrapping.
        let sampler = gpu.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(&format!("{} Sampler", label)),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
            width,
            height,
        }
    }

    /// Upload decoded pixels, downscaling first if either side exceeds the
    /// device's texture size limit.
    pub fn from_image(gpu: &GpuContext, pixels: &image::RgbaImage, label: &str) -> Self {
        let max_side = gpu.device.limits().max_texture_dimension_2d;
        match fit_within(pixels, max_side) {
            Some(scaled) => {
                log::warn!(
                    "{label}: {}x{} exceeds the {max_side}px texture limit, scaled to {}x{}",
                    pixels.width(),
                    pixels.height(),
                    scaled.width(),
                    scaled.height()
                );
                Self::from_rgba(gpu, &scaled, scaled.width(), scaled.height(), label)
            }
            None => Self::from_rgba(gpu, pixels, pixels.width(), pixels.height(), label),
        }
    }

    /// Decode an encoded image (PNG, JPEG, ...) and upload it.
    pub fn from_bytes(gpu: &GpuContext, bytes: &[u8], label: &str) -> crate::Result<Self> {
        let pixels = decode_rgba(bytes, label)?;
        Ok(Self::from_image(gpu, &pixels, label))
    }

    /// A 1x1 fully transparent texture, bound until an image finishes loading.
    pub fn placeholder(gpu: &GpuContext) -> Self {
        Self::from_rgba(gpu, &[0, 0, 0, 0], 1, 1, "Placeholder Texture")
    }
}

/// Decode image bytes into tightly packed RGBA8.
pub fn decode_rgba(bytes: &[u8], label: &str) -> crate::Result<image::RgbaImage> {
    image::load_from_memory(bytes)
        .map(|img| img.to_rgba8())
        .map_err(|source| crate::Error::Image {
            label: label.to_string(),
            source,
        })
}

/// Scale `pixels` down, keeping the aspect ratio, so neither side exceeds
/// `max_side`. Returns `None` when the image already fits.
pub fn fit_within(pixels: &image::RgbaImage, max_side: u32) -> Option<image::RgbaImage> {
    let max_side = max_side.max(1);
    let (width, height) = pixels.dimensions();
    if width <= max_side && height <= max_side {
        return None;
    }

    let scale = max_side as f64 / width.max(height) as f64;
    let side = |value: u32| ((value as f64 * scale).round() as u32).clamp(1, max_side);
    Some(image::imageops::resize(
        pixels,
        side(width),
        side(height),
        image::imageops::FilterType::Triangle,
    ))
}

/// Generate a procedural swatch: a soft diagonal gradient with blocky noise.
///
/// Used by the native host when no image files are given.
pub fn swatch(width: u32, height: u32, seed: u32) -> image::RgbaImage {
    // Two palette colors picked from the seed.
    let palette: &[[u8; 3]] = &[
        [233, 196, 106],
        [244, 162, 97],
        [231, 111, 81],
        [42, 157, 143],
        [38, 70, 83],
        [131, 56, 236],
        [58, 134, 255],
        [255, 190, 11],
    ];
    let from = palette[(hash(seed, 0, 7) % palette.len() as u32) as usize];
    let to = palette[(hash(seed, 1, 13) % palette.len() as u32) as usize];

    image::RgbaImage::from_fn(width, height, |x, y| {
        let t = (x as f32 / width.max(1) as f32 + y as f32 / height.max(1) as f32) * 0.5;
        let variation = ((hash(x / 16, y / 16, seed) % 24) as i32) - 12;
        let channel = |i: usize| {
            let mixed = from[i] as f32 + (to[i] as f32 - from[i] as f32) * t;
            (mixed as i32 + variation).clamp(0, 255) as u8
        };
        image::Rgba([channel(0), channel(1), channel(2), 255])
    })
}

/// Simple hash function for procedural generation.
fn hash(x: u32, y: u32, seed: u32) -> u32 {
    let mut h = seed;
    h = h.wrapping_add(x.wrapping_mul(374761393));
    h = h.wrapping_add(y.wrapping_mul(668265263));
    h ^= h >> 13;
    h = h.wrapping_mul(1274126177);
    h ^= h >> 16;
    h
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swatch_is_opaque_and_deterministic() {
        let a = swatch(64, 32, 7);
        let b = swatch(64, 32, 7);
        assert_eq!(a.dimensions(), (64, 32));
        assert_eq!(a.as_raw(), b.as_raw());
        assert!(a.pixels().all(|pixel| pixel.0[3] == 255));
    }

    #[test]
    fn oversized_images_are_scaled_to_the_limit() {
        let panorama = swatch(300, 100, 3);
        let scaled = fit_within(&panorama, 64).expect("wider than the limit");
        assert_eq!(scaled.dimensions(), (64, 21));

        let portrait = swatch(10, 90, 3);
        assert_eq!(fit_within(&portrait, 30).map(|img| img.dimensions()), Some((3, 30)));

        assert!(fit_within(&panorama, 300).is_none());
    }

    #[test]
    fn decoding_garbage_names_the_image() {
        let err = decode_rgba(b"definitely not a png", "hero.jpg").unwrap_err();
        assert!(err.to_string().contains("hero.jpg"));
    }

    #[test]
    fn decodes_png_round_trip() {
        let mut bytes = Vec::new();
        swatch(4, 2, 1)
            .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .expect("encode png");
        let decoded = decode_rgba(&bytes, "swatch.png").expect("decode png");
        assert_eq!(decoded.dimensions(), (4, 2));
    }
}
