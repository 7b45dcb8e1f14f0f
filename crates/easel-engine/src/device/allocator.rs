use std::collections::HashMap;

use crate::error::{CanvasError, Result};
use crate::texture::{TextureAllocator, TextureHandle};

/// [`TextureAllocator`] over wgpu textures.
///
/// wgpu has no integer texture names, so handles are issued here and map to
/// the owned `wgpu::Texture`.
pub struct WgpuTextureAllocator {
    device: wgpu::Device,
    queue: wgpu::Queue,
    textures: HashMap<TextureHandle, wgpu::Texture>,
    next_id: u32,
}

impl WgpuTextureAllocator {
    pub fn new(device: wgpu::Device, queue: wgpu::Queue) -> Self {
        Self { device, queue, textures: HashMap::new(), next_id: 0 }
    }

    /// The texture behind `handle`, if it has not been deleted.
    pub fn texture(&self, handle: TextureHandle) -> Option<&wgpu::Texture> {
        self.textures.get(&handle)
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    fn issue_handle(&mut self) -> Result<TextureHandle> {
        self.next_id = self
            .next_id
            .checked_add(1)
            .ok_or_else(|| CanvasError::unavailable("texture handles exhausted"))?;
        TextureHandle::new(self.next_id).ok_or_else(|| CanvasError::unavailable("invalid texture handle"))
    }
}

impl TextureAllocator for WgpuTextureAllocator {
    fn allocate(&mut self, width: u32, height: u32) -> Result<TextureHandle> {
        let max = self.device.limits().max_texture_dimension_2d;
        if width == 0 || height == 0 || width > max || height > max {
            return Err(CanvasError::unavailable(format!(
                "texture size {width}x{height} outside 1..={max}"
            )));
        }

        let handle = self.issue_handle()?;
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("easel surface texture"),
            size: wgpu::Extent3d { width, height, depth_or_array_layers: 1 },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_DST
                | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        self.textures.insert(handle, texture);
        Ok(handle)
    }

    fn upload(&mut self, handle: TextureHandle, width: u32, height: u32, pixels: &[u8]) -> Result<()> {
        let texture = self
            .textures
            .get(&handle)
            .ok_or_else(|| CanvasError::unavailable(format!("texture {} not found", handle.get())))?;
        if pixels.len() < width as usize * height as usize * 4 {
            return Err(CanvasError::unavailable("pixel buffer smaller than texture"));
        }

        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(width * 4),
                rows_per_image: Some(height),
            },
            wgpu::Extent3d { width, height, depth_or_array_layers: 1 },
        );
        Ok(())
    }

    fn delete(&mut self, handle: TextureHandle) {
        if let Some(texture) = self.textures.remove(&handle) {
            texture.destroy();
        }
    }
}
