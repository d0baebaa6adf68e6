//! Light sources, per-object lighting state, and eclipse shadow testing.
//!
//! The renderer collects nearby stars into [`LightSource`]s once per
//! frame, then derives a [`LightingState`] for each rendered object:
//! normalized directional lights in object space, plus any eclipse and
//! ring shadows cast onto the object. Shadow testing is pure geometry
//! over position snapshots, so it can be exercised without a scene graph.

pub mod eclipse;
pub mod light;
pub mod setup;
pub mod uniforms;

pub use eclipse::{
    CasterSnapshot, EclipseShadow, LightSnapshot, ReceiverSnapshot, RingShadow, test_eclipse,
    test_ring_shadow, MIN_RELATIVE_OCCLUDER_RADIUS,
};
pub use light::{DirectionalLight, LightSource, LightingState, SecondaryIlluminator, MAX_LIGHTS};
pub use setup::{
    estimate_reflected_light_fraction, setup_light_sources, setup_object_lighting,
    setup_secondary_light_sources, star_tint, IlluminatingStar,
};
pub use uniforms::{pack_lights, LightUniform};
