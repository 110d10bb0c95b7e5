use crate::components::entity::Entity;
use crate::components::sprite::BlendMode;
use crate::renderer::instance::{RenderBuffer, RenderInstance};

/// Build the render buffer from a set of entities.
/// Groups entities by blend mode: alpha-blended first, then additive.
/// Sets `atlas_split` at the boundary. Destroyed entities are skipped, and
/// draws past the buffer's `max_instances` are dropped, additive ones first.
pub fn build_render_buffer<'a>(entities: impl Iterator<Item = &'a Entity>, buffer: &mut RenderBuffer) {
    buffer.clear();

    let mut additive_instances: Vec<RenderInstance> = Vec::new();
    let mut dropped = 0usize;

    for entity in entities.filter(|e| !e.is_destroyed()) {
        let Some(instance) = entity.render_instance() else {
            continue;
        };
        let blend = entity
            .visual
            .sprite
            .as_ref()
            .map(|s| s.blend)
            .unwrap_or_default();

        match blend {
            BlendMode::Alpha => {
                if !buffer.push(instance) {
                    dropped += 1;
                }
            }
            BlendMode::Additive => additive_instances.push(instance),
        }
    }

    buffer.set_atlas_split(buffer.instance_count());
    for inst in additive_instances {
        if !buffer.push(inst) {
            dropped += 1;
        }
    }

    if dropped > 0 {
        log::warn!(
            "{} sprites dropped: {} render instances per frame max",
            dropped,
            buffer.max_instances()
        );
    }
}
