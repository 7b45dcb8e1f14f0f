//! Font description, font registry and text layout.

mod font;
mod font_system;
mod layout;

pub use font::{Font, FontSlant, FontWeight, TextAlign, TextBaseline, TextMetrics};
pub use font_system::{FontId, FontSystem};
pub use layout::{layout_text, PositionedGlyph, TextLayout};
