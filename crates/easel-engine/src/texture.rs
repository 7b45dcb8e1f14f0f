//! Native texture bookkeeping shared by GPU-backed surfaces.
//!
//! Textures may be dropped on any thread, but native deletion must happen on
//! the rendering thread. Dropping the last [`TextureLink`] therefore only
//! queues the handle; [`TexturePool::release_textures`] deletes the queue.

use std::num::NonZeroU32;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::{CanvasError, Result};

/// Native texture name. Zero is never a valid handle.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct TextureHandle(NonZeroU32);

impl TextureHandle {
    #[inline]
    pub fn new(raw: u32) -> Option<Self> {
        NonZeroU32::new(raw).map(Self)
    }

    #[inline]
    pub fn get(self) -> u32 {
        self.0.get()
    }
}

/// Native texture API seam.
pub trait TextureAllocator {
    fn allocate(&mut self, width: u32, height: u32) -> Result<TextureHandle>;

    /// Replaces the texture contents with premultiplied RGBA8 `pixels`.
    fn upload(&mut self, handle: TextureHandle, width: u32, height: u32, pixels: &[u8]) -> Result<()>;

    fn delete(&mut self, handle: TextureHandle);
}

#[derive(Debug, Default)]
struct PoolState {
    live: usize,
    pending: Vec<TextureHandle>,
}

/// Tracks live textures and handles waiting for native deletion.
#[derive(Debug, Default)]
pub struct TexturePool {
    state: Mutex<PoolState>,
}

impl TexturePool {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn lock(&self) -> MutexGuard<'_, PoolState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Allocates a native texture and returns the first link to it.
    ///
    /// A handle that is still queued for deletion is refused with
    /// [`CanvasError::ResourceUnavailable`], and the refused allocation is
    /// deleted right away.
    pub fn create_texture(
        self: &Arc<Self>,
        allocator: &mut dyn TextureAllocator,
        width: u32,
        height: u32,
    ) -> Result<TextureLink> {
        let handle = allocator.allocate(width, height)?;
        let refused = {
            let mut state = self.lock();
            let refused = state.pending.contains(&handle);
            if !refused {
                state.live += 1;
            }
            refused
        };
        if refused {
            allocator.delete(handle);
            log::warn!("TexturePool: refused texture {} still pending deletion", handle.get());
            return Err(CanvasError::unavailable(format!(
                "texture {} is still pending deletion",
                handle.get()
            )));
        }
        log::debug!("TexturePool: created texture {} ({width}x{height})", handle.get());
        Ok(TextureLink(Arc::new(Texture { handle, width, height, pool: Arc::clone(self) })))
    }

    /// Deletes every queued handle and returns how many were deleted.
    pub fn release_textures(&self, allocator: &mut dyn TextureAllocator) -> usize {
        let pending = std::mem::take(&mut self.lock().pending);
        for &handle in &pending {
            allocator.delete(handle);
        }
        if !pending.is_empty() {
            log::debug!("TexturePool: released {} texture(s)", pending.len());
        }
        pending.len()
    }

    pub fn live_count(&self) -> usize {
        self.lock().live
    }

    pub fn pending_count(&self) -> usize {
        self.lock().pending.len()
    }

    pub fn pending_handles(&self) -> Vec<TextureHandle> {
        self.lock().pending.clone()
    }

    fn retire(&self, handle: TextureHandle) {
        let mut state = self.lock();
        state.live = state.live.saturating_sub(1);
        state.pending.push(handle);
    }
}

/// A native texture owned by a pool.
#[derive(Debug)]
pub struct Texture {
    handle: TextureHandle,
    width: u32,
    height: u32,
    pool: Arc<TexturePool>,
}

impl Drop for Texture {
    fn drop(&mut self) {
        self.pool.retire(self.handle);
    }
}

/// Shared reference to a [`Texture`]. The handle is queued for deletion
/// when the last link is dropped.
#[derive(Debug, Clone)]
pub struct TextureLink(Arc<Texture>);

impl TextureLink {
    #[inline]
    pub fn handle(&self) -> TextureHandle {
        self.0.handle
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.0.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.0.height
    }

    pub fn upload(&self, allocator: &mut dyn TextureAllocator, pixels: &[u8]) -> Result<()> {
        allocator.upload(self.0.handle, self.0.width, self.0.height, pixels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[derive(Default)]
    struct FakeAllocator {
        next: u32,
        allocated: usize,
        reuse: Option<u32>,
        deleted: Vec<TextureHandle>,
        uploads: usize,
    }

    impl TextureAllocator for FakeAllocator {
        fn allocate(&mut self, _width: u32, _height: u32) -> Result<TextureHandle> {
            self.allocated += 1;
            let raw = self.reuse.unwrap_or_else(|| {
                self.next += 1;
                self.next
            });
            TextureHandle::new(raw).ok_or_else(|| CanvasError::unavailable("zero handle"))
        }

        fn upload(&mut self, _: TextureHandle, width: u32, height: u32, pixels: &[u8]) -> Result<()> {
            assert_eq!(pixels.len(), (width * height * 4) as usize);
            self.uploads += 1;
            Ok(())
        }

        fn delete(&mut self, handle: TextureHandle) {
            self.deleted.push(handle);
        }
    }

    // ── lifecycle ─────────────────────────────────────────────────────────

    #[test]
    fn dropped_textures_are_queued_then_released_once() {
        let pool = TexturePool::new();
        let mut alloc = FakeAllocator::default();

        let links: Vec<_> = (0..5)
            .map(|_| pool.create_texture(&mut alloc, 4, 4).unwrap())
            .collect();
        assert_eq!(pool.live_count(), 5);
        drop(links);

        assert_eq!(pool.live_count(), 0);
        let pending: HashSet<_> = pool.pending_handles().into_iter().collect();
        assert_eq!(pending.len(), 5);

        assert_eq!(pool.release_textures(&mut alloc), 5);
        assert_eq!(pool.pending_count(), 0);
        assert_eq!(alloc.deleted.len(), 5);
        assert_eq!(pool.release_textures(&mut alloc), 0);
        assert_eq!(alloc.deleted.len(), 5);
    }

    #[test]
    fn clones_share_one_texture() {
        let pool = TexturePool::new();
        let mut alloc = FakeAllocator::default();
        let link = pool.create_texture(&mut alloc, 2, 2).unwrap();
        let other = link.clone();
        drop(link);
        assert_eq!(pool.pending_count(), 0);
        other.upload(&mut alloc, &[0; 16]).unwrap();
        drop(other);
        assert_eq!(pool.pending_count(), 1);
        assert_eq!(alloc.uploads, 1);
    }

    #[test]
    fn drop_on_another_thread_queues_handle() {
        let pool = TexturePool::new();
        let mut alloc = FakeAllocator::default();
        let link = pool.create_texture(&mut alloc, 1, 1).unwrap();
        let handle = link.handle();
        std::thread::spawn(move || drop(link)).join().unwrap();
        assert_eq!(pool.pending_handles(), vec![handle]);
    }

    // ── pending reuse ─────────────────────────────────────────────────────

    #[test]
    fn pending_handle_is_refused() {
        let pool = TexturePool::new();
        let mut alloc = FakeAllocator { reuse: Some(7), ..FakeAllocator::default() };
        drop(pool.create_texture(&mut alloc, 1, 1).unwrap());
        let err = pool.create_texture(&mut alloc, 1, 1).unwrap_err();
        assert!(matches!(err, CanvasError::ResourceUnavailable(_)));
        assert_eq!(pool.live_count(), 0);

        pool.release_textures(&mut alloc);
        assert!(pool.create_texture(&mut alloc, 1, 1).is_ok());
    }

    #[test]
    fn refused_allocation_is_deleted() {
        let pool = TexturePool::new();
        let mut alloc = FakeAllocator { reuse: Some(3), ..FakeAllocator::default() };
        drop(pool.create_texture(&mut alloc, 1, 1).unwrap());
        assert!(pool.create_texture(&mut alloc, 1, 1).is_err());
        assert!(pool.create_texture(&mut alloc, 1, 1).is_err());
        assert_eq!(alloc.deleted.len(), 2);

        pool.release_textures(&mut alloc);
        assert_eq!(alloc.allocated, 3);
        assert_eq!(alloc.deleted.len(), alloc.allocated);
        assert_eq!(pool.live_count(), 0);
    }
}
