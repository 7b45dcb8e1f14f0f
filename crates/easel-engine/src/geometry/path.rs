use crate::coords::Vec2;

/// A single path command.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum PathComponent {
    /// Starts a new subpath at the point.
    MoveTo(Vec2),
    /// Line from the current position to the point.
    LineTo(Vec2),
    /// Closes the most recent `MoveTo`-opened subpath.
    Close,
    /// Circular arc around `center`. Angles are in radians.
    ///
    /// A non-positive radius is degenerate and draws a line to `center`.
    Arc {
        center: Vec2,
        radius: f32,
        start_angle: f32,
        end_angle: f32,
        anticlockwise: bool,
    },
}

/// Ordered sequence of path commands. Insertion order is rendering order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    components: Vec<PathComponent>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn components(&self) -> &[PathComponent] {
        &self.components
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    #[inline]
    pub fn clear(&mut self) {
        self.components.clear();
    }

    #[inline]
    pub fn push(&mut self, component: PathComponent) -> &mut Self {
        self.components.push(component);
        self
    }

    pub fn move_to(&mut self, x: f32, y: f32) -> &mut Self {
        self.push(PathComponent::MoveTo(Vec2::new(x, y)))
    }

    pub fn line_to(&mut self, x: f32, y: f32) -> &mut Self {
        self.push(PathComponent::LineTo(Vec2::new(x, y)))
    }

    pub fn close_path(&mut self) -> &mut Self {
        self.push(PathComponent::Close)
    }

    pub fn arc(
        &mut self,
        x: f32,
        y: f32,
        radius: f32,
        start_angle: f32,
        end_angle: f32,
        anticlockwise: bool,
    ) -> &mut Self {
        self.push(PathComponent::Arc {
            center: Vec2::new(x, y),
            radius,
            start_angle,
            end_angle,
            anticlockwise,
        })
    }

    /// Closed axis-aligned rectangle subpath.
    pub fn rect(&mut self, x: f32, y: f32, w: f32, h: f32) -> &mut Self {
        self.move_to(x, y)
            .line_to(x + w, y)
            .line_to(x + w, y + h)
            .line_to(x, y + h)
            .close_path()
    }
}

impl FromIterator<PathComponent> for Path {
    fn from_iter<I: IntoIterator<Item = PathComponent>>(iter: I) -> Self {
        Self { components: iter.into_iter().collect() }
    }
}
