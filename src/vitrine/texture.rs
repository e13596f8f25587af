use wgpu::{
    Device, Extent3d, FilterMode, ImageCopyTexture, ImageDataLayout, Origin3d, Queue, Sampler,
    SamplerDescriptor, Texture, TextureAspect, TextureDescriptor, TextureDimension, TextureFormat,
    TextureUsages, TextureView, TextureViewDescriptor,
};

// 1차원 계조 조회 텍스처. 디코딩이 끝나야만 만들어지므로
// 이 값을 들고 있다는 것 자체가 "텍스처 준비 완료"를 의미함
pub struct GradientMap {
    steps: Vec<u8>,
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl GradientMap {
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let decoded = image::load_from_memory(bytes).ok()?.to_rgba8();
        let (width, height) = decoded.dimensions();
        if width == 0 || height == 0 {
            return None;
        }

        // 가운데 행의 빨간 채널만 밝기 단계로 사용
        let row = height / 2;
        let steps = (0..width).map(|x| decoded.get_pixel(x, row)[0]).collect();

        Some(Self {
            steps,
            width,
            height,
            rgba: decoded.into_raw(),
        })
    }

    pub fn from_steps(steps: &[u8]) -> Self {
        let rgba = steps
            .iter()
            .flat_map(|&step| [step, step, step, 0xFF])
            .collect();

        Self {
            steps: steps.to_vec(),
            width: steps.len() as u32,
            height: 1,
            rgba,
        }
    }

    // 쉐이더의 nearest 샘플링과 같은 계단식 조회
    pub fn sample(&self, intensity: f32) -> f32 {
        let last = (self.width - 1) as f32;
        let x = (intensity.clamp(0.0, 1.0) * last).round() as usize;
        self.steps[x] as f32 / 255.0
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }
}

pub struct GpuImage {
    pub texture: Texture,
    pub view: TextureView,
    pub sampler: Sampler,
}

impl GpuImage {
    pub fn upload(device: &Device, queue: &Queue, map: &GradientMap, label: &str) -> Self {
        let texture = device.create_texture(&TextureDescriptor {
            label: Some(label),
            size: Extent3d {
                width: map.width,
                height: map.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: TextureDimension::D2,
            format: TextureFormat::Rgba8UnormSrgb,
            usage: TextureUsages::TEXTURE_BINDING | TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            ImageCopyTexture {
                texture: &texture,
                mip_level: 0,
                origin: Origin3d::ZERO,
                aspect: TextureAspect::All,
            },
            &map.rgba,
            ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(4 * map.width),
                rows_per_image: Some(map.height),
            },
            texture.size(),
        );

        let view = texture.create_view(&TextureViewDescriptor {
            label: Some(&format!("{} view", label)),
            ..Default::default()
        });

        // 단계가 뭉개지지 않게 둘 다 nearest
        let sampler = device.create_sampler(&SamplerDescriptor {
            label: Some(&format!("{} sampler", label)),
            mag_filter: FilterMode::Nearest,
            min_filter: FilterMode::Nearest,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_gradient_decodes() {
        let map = GradientMap::from_bytes(include_bytes!("../../static/gradients/3.png"))
            .expect("번들 텍스처가 깨짐");
        assert_eq!(map.step_count(), 3);
    }

    #[test]
    fn sample_hits_band_endpoints() {
        let map = GradientMap::from_steps(&[0x44, 0x88, 0xEE]);
        assert!((map.sample(0.0) - 0x44 as f32 / 255.0).abs() < 1e-6);
        assert!((map.sample(1.0) - 0xEE as f32 / 255.0).abs() < 1e-6);
        assert!((map.sample(0.5) - 0x88 as f32 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn sample_clamps_out_of_range_intensity() {
        let map = GradientMap::from_steps(&[0x00, 0xFF]);
        assert_eq!(map.sample(-2.0), 0.0);
        assert_eq!(map.sample(2.0), 1.0);
    }

    #[test]
    fn garbage_bytes_are_rejected() {
        assert!(GradientMap::from_bytes(&[0xDE, 0xAD, 0xBE, 0xEF]).is_none());
    }
}
