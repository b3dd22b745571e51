/// Value-typed font request. Used as the key of the engine's font cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FontDescription {
    pub family: String,
    pub point_size: u32,
    /// CSS-style weight, 100..=900.
    pub weight: u16,
    pub italic: bool,
    pub underline: bool,
    pub strikeout: bool,
}

impl FontDescription {
    pub fn new(family: impl Into<String>, point_size: u32) -> Self {
        Self {
            family: family.into(),
            point_size,
            ..Default::default()
        }
    }

    pub fn with_weight(mut self, weight: u16) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_italic(mut self, italic: bool) -> Self {
        self.italic = italic;
        self
    }
}

impl Default for FontDescription {
    fn default() -> Self {
        Self {
            family: String::new(),
            point_size: 12,
            weight: 400,
            italic: false,
            underline: false,
            strikeout: false,
        }
    }
}

/// A run of text drawn at a baseline position.
#[derive(Debug, Clone, PartialEq)]
pub struct TextItem {
    pub text: String,
    pub font: FontDescription,
}

impl TextItem {
    pub fn new(text: impl Into<String>, font: FontDescription) -> Self {
        Self {
            text: text.into(),
            font,
        }
    }
}

/// Em size in pixels of a font given in points.
pub(crate) fn em_size(point_size: u32, dpi_y: f32) -> f32 {
    point_size as f32 * dpi_y / 72.0
}

