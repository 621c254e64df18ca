/// The visual surface the driver reads from and renders into.
///
/// Owned by the interactive thread. Any getter may return `None` when the
/// value is not available; the driver then falls back or skips the action.
pub trait DisplaySurface {
    /// Text currently shown, used as reseed material
    fn text(&self) -> Option<String>;

    /// Viewport width in pixels
    fn viewport_width_px(&self) -> Option<f32>;

    /// Average rendered width of one character in pixels
    fn char_width_px(&self) -> Option<f32>;

    /// Replace the shown text
    fn set_text(&mut self, text: String);
}

/// In-memory surface with fixed geometry
#[derive(Debug, Clone, Default)]
pub struct MemorySurface {
    text: String,
    viewport_width_px: Option<f32>,
    char_width_px: Option<f32>,
    writes: usize,
}

impl MemorySurface {
    pub fn new(viewport_width_px: Option<f32>, char_width_px: Option<f32>) -> Self {
        MemorySurface { text: String::new(), viewport_width_px, char_width_px, writes: 0 }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn current_text(&self) -> &str {
        &self.text
    }

    /// Number of `set_text` calls so far
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl DisplaySurface for MemorySurface {
    fn text(&self) -> Option<String> {
        Some(self.text.clone())
    }

    fn viewport_width_px(&self) -> Option<f32> {
        self.viewport_width_px
    }

    fn char_width_px(&self) -> Option<f32> {
        self.char_width_px
    }

    fn set_text(&mut self, text: String) {
        self.text = text;
        self.writes += 1;
    }
}
