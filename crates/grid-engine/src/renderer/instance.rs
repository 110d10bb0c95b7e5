use bytemuck::{Pod, Zeroable};

/// One sprite draw handed to the host renderer. 8 floats = 32 bytes stride.
///
/// Position is the interpolated pixel position of the entity; the origin is the
/// anchor expressed in sprite pixels, so the host pivots and scales around it.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct RenderInstance {
    pub x: f32,
    pub y: f32,
    pub origin_x: f32,
    pub origin_y: f32,
    /// Signed: a negative X scale flips the sprite to face left.
    pub scale_x: f32,
    pub scale_y: f32,
    pub sprite_col: f32,
    pub atlas_row: f32,
}

impl RenderInstance {
    pub const FLOATS: usize = 8;
    pub const STRIDE_BYTES: usize = Self::FLOATS * 4;
}

/// Render buffer containing all sprite instances and metadata.
#[derive(Debug, Clone)]
pub struct RenderBuffer {
    /// Alpha-blended instances first, additive instances after `atlas_split`.
    pub instances: Vec<RenderInstance>,
    /// Index of the first additive instance.
    pub atlas_split: u32,
    max_instances: usize,
}

impl RenderBuffer {
    pub fn new() -> Self {
        Self::with_capacity(512)
    }

    /// A buffer that holds at most `max_instances` draws.
    pub fn with_capacity(max_instances: usize) -> Self {
        Self {
            instances: Vec::with_capacity(max_instances),
            atlas_split: 0,
            max_instances,
        }
    }

    pub fn clear(&mut self) {
        self.instances.clear();
        self.atlas_split = 0;
    }

    /// Append a draw. Returns false, leaving the buffer unchanged, once full.
    pub fn push(&mut self, instance: RenderInstance) -> bool {
        if self.is_full() {
            return false;
        }
        self.instances.push(instance);
        true
    }

    pub fn is_full(&self) -> bool {
        self.instances.len() >= self.max_instances
    }

    pub fn max_instances(&self) -> usize {
        self.max_instances
    }

    pub fn set_atlas_split(&mut self, split: u32) {
        self.atlas_split = split;
    }

    pub fn instance_count(&self) -> u32 {
        self.instances.len() as u32
    }

    /// Flat float view of every instance, in upload order.
    pub fn as_floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.instances)
    }
}

impl Default for RenderBuffer {
    fn default() -> Self {
        Self::new()
    }
}
