/// Blend mode for sprite rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendMode {
    /// Standard alpha blending.
    #[default]
    Alpha,
    /// Additive blending for glow effects.
    Additive,
}

/// An already-resolved atlas cell. The engine never loads textures; games hand
/// it the cell coordinates and the slice size in pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteComponent {
    /// Column in the atlas grid.
    pub col: f32,
    /// Row in the atlas grid.
    pub row: f32,
    /// Slice width in pixels, used to place the anchor.
    pub width: f32,
    /// Slice height in pixels.
    pub height: f32,
    pub blend: BlendMode,
}

impl SpriteComponent {
    pub fn new(col: f32, row: f32, width: f32, height: f32) -> Self {
        Self {
            col,
            row,
            width,
            height,
            ..Self::default()
        }
    }
}

impl Default for SpriteComponent {
    fn default() -> Self {
        Self {
            col: 0.0,
            row: 0.0,
            width: 8.0,
            height: 8.0,
            blend: BlendMode::Alpha,
        }
    }
}
