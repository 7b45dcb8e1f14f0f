use crate::error::{CanvasError, Result};

use super::Font;

/// Opaque handle to a font loaded into a [`FontSystem`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct FontId(pub(crate) usize);

#[derive(Debug, Clone)]
struct Face {
    /// Lowercased family name.
    family: String,
    bold: bool,
    italic: bool,
    id: FontId,
}

/// Owns the loaded fonts and maps family names to them.
///
/// Fonts are immutable after loading. Lookups fall back to another face of
/// the same family and then to the first font registered; with no fonts at
/// all, text measures zero wide and draws nothing.
#[derive(Clone, Default)]
pub struct FontSystem {
    fonts: Vec<fontdue::Font>,
    faces: Vec<Face>,
}

impl FontSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a TrueType or OpenType font and registers it as the regular
    /// face of `family`.
    pub fn load_font(&mut self, family: &str, bytes: &[u8]) -> Result<FontId> {
        self.load_face(family, false, false, bytes)
    }

    /// Parses a font and registers it under `family` with the given style.
    pub fn load_face(&mut self, family: &str, bold: bool, italic: bool, bytes: &[u8]) -> Result<FontId> {
        let font = fontdue::Font::from_bytes(bytes, fontdue::FontSettings::default())
            .map_err(|e| CanvasError::unavailable(format!("font '{family}': {e}")))?;
        let id = FontId(self.fonts.len());
        self.fonts.push(font);
        self.faces.push(Face { family: family.to_lowercase(), bold, italic, id });
        log::debug!("FontSystem: registered '{family}' (bold={bold}, italic={italic}) as {id:?}");
        Ok(id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }

    /// Picks the face that best matches `font`.
    pub fn resolve(&self, font: &Font) -> Option<FontId> {
        let family = font.family.to_lowercase();
        let family = family.as_str();
        let (bold, italic) = (font.weight.is_bold(), font.slant.is_italic());
        let in_family = move || self.faces.iter().filter(move |f| f.family == family);

        in_family()
            .find(|f| f.bold == bold && f.italic == italic)
            .or_else(|| in_family().next())
            .or_else(|| self.faces.first())
            .map(|f| f.id)
    }

    /// Returns the underlying `fontdue::Font`, if `id` is valid.
    pub(crate) fn get(&self, id: FontId) -> Option<&fontdue::Font> {
        self.fonts.get(id.0)
    }
}

impl std::fmt::Debug for FontSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontSystem").field("fonts", &self.fonts.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::{FontSlant, FontWeight};

    fn with_faces(entries: &[(&str, bool, bool)]) -> FontSystem {
        // Face matching only looks at the registry, so no real font data is needed.
        let mut system = FontSystem::new();
        for (i, &(family, bold, italic)) in entries.iter().enumerate() {
            system.faces.push(Face { family: family.to_lowercase(), bold, italic, id: FontId(i) });
        }
        system
    }

    #[test]
    fn empty_system_resolves_nothing() {
        assert_eq!(FontSystem::new().resolve(&Font::new("serif", 12.0)), None);
    }

    #[test]
    fn exact_style_wins() {
        let system = with_faces(&[("Sans", false, false), ("Sans", true, false), ("Sans", true, true)]);
        let font = Font::new("sans", 12.0).with_weight(FontWeight::Bold).with_slant(FontSlant::Oblique);
        assert_eq!(system.resolve(&font), Some(FontId(2)));
    }

    #[test]
    fn falls_back_within_family_then_to_first() {
        let system = with_faces(&[("Mono", false, false), ("Sans", false, true)]);
        assert_eq!(system.resolve(&Font::new("Sans", 10.0)), Some(FontId(1)));
        assert_eq!(system.resolve(&Font::new("Unknown", 10.0)), Some(FontId(0)));
    }

    #[test]
    fn invalid_bytes_are_unavailable() {
        let mut system = FontSystem::new();
        let err = system.load_font("broken", &[0, 1, 2, 3]).unwrap_err();
        assert!(matches!(err, CanvasError::ResourceUnavailable(_)));
        assert!(system.is_empty());
    }
}
