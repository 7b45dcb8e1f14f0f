//! GPU backend on wgpu.
//!
//! This module is responsible for:
//! - creating a headless wgpu Instance/Adapter/Device/Queue
//! - issuing wgpu textures through the [`crate::texture::TextureAllocator`] seam
//! - GPU surfaces that upload their pixels into pool-tracked textures

mod allocator;
mod gpu;
mod init;
mod surface;

pub use allocator::WgpuTextureAllocator;
pub use gpu::Gpu;
pub use init::GpuInit;
pub use surface::{GpuSurface, SharedAllocator};
