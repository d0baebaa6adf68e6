//! GPU-side light representation.
//!
//! [`LightUniform`] is the std140-compatible form of a
//! [`DirectionalLight`], written to a uniform buffer by the backend.

use bytemuck::{Pod, Zeroable};

use crate::light::{DirectionalLight, LightingState, MAX_LIGHTS};

/// GPU-side directional light, 32 bytes, std140-compatible.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Pod, Zeroable)]
pub struct LightUniform {
    /// xyz = direction toward the light (normalized), w = irradiance.
    pub direction_irradiance: [f32; 4],
    /// xyz = color (linear RGB), w = padding.
    pub color_padding: [f32; 4],
}

impl From<&DirectionalLight> for LightUniform {
    fn from(light: &DirectionalLight) -> Self {
        Self {
            direction_irradiance: [
                light.direction.x,
                light.direction.y,
                light.direction.z,
                light.irradiance,
            ],
            color_padding: [light.color.x, light.color.y, light.color.z, 0.0],
        }
    }
}

/// Pack a lighting state into a fixed-size light array plus the active
/// count, the layout the object shaders consume.
pub fn pack_lights(state: &LightingState) -> ([LightUniform; MAX_LIGHTS], u32) {
    let mut packed = [LightUniform::default(); MAX_LIGHTS];
    let n = state.lights.len().min(MAX_LIGHTS);
    for (slot, light) in packed.iter_mut().zip(&state.lights) {
        *slot = LightUniform::from(light);
    }
    (packed, n as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_uniform_layout() {
        assert_eq!(std::mem::size_of::<LightUniform>(), 32);
        assert_eq!(std::mem::align_of::<LightUniform>(), 4);
        assert_eq!(
            std::mem::size_of::<[LightUniform; MAX_LIGHTS]>(),
            32 * MAX_LIGHTS
        );
    }

    #[test]
    fn test_pack_preserves_order_and_count() {
        let mut state = LightingState::default();
        for i in 0..3 {
            state.lights.push(DirectionalLight {
                direction: Vec3::X,
                irradiance: 1.0 / (i + 1) as f32,
                color: Vec3::ONE,
                casts_shadows: false,
            });
        }
        let (packed, count) = pack_lights(&state);
        assert_eq!(count, 3);
        assert_eq!(packed[0].direction_irradiance[3], 1.0);
        assert_eq!(packed[2].direction_irradiance[3], 1.0 / 3.0);
        assert_eq!(packed[3].direction_irradiance, [0.0; 4]);
    }
}
