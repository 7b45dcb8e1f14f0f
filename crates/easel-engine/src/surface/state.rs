use crate::coords::Transform;
use crate::error::{CanvasError, Result};

/// Per-surface drawing state saved and restored as a unit.
///
/// `C` is the backend's clip representation; `None` means unclipped.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawState<C> {
    pub clip: Option<C>,
    pub transform: Transform,
    pub alpha: f32,
}

impl<C> Default for DrawState<C> {
    fn default() -> Self {
        Self { clip: None, transform: Transform::identity(), alpha: 1.0 }
    }
}

/// LIFO of saved [`DrawState`]s plus the current one.
#[derive(Debug, Clone)]
pub struct StateStack<C> {
    current: DrawState<C>,
    saved: Vec<DrawState<C>>,
}

impl<C> Default for StateStack<C> {
    fn default() -> Self {
        Self { current: DrawState::default(), saved: Vec::new() }
    }
}

impl<C: Clone> StateStack<C> {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn current(&self) -> &DrawState<C> {
        &self.current
    }

    #[inline]
    pub fn current_mut(&mut self) -> &mut DrawState<C> {
        &mut self.current
    }

    pub fn save(&mut self) {
        self.saved.push(self.current.clone());
    }

    pub fn restore(&mut self) -> Result<()> {
        self.current = self.saved.pop().ok_or(CanvasError::StateStackUnderflow)?;
        Ok(())
    }

    /// Number of saved states.
    #[inline]
    pub fn depth(&self) -> usize {
        self.saved.len()
    }

    /// Drops every saved state and returns to the default state.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
