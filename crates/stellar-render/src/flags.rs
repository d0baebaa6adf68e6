//! Render feature toggles.

use bitflags::bitflags;

use stellar_scene::BodyClassMask;

bitflags! {
    /// Which scene elements the frame driver produces.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct RenderFlags: u32 {
        const STARS = 1 << 0;
        const PLANETS = 1 << 1;
        const ORBITS = 1 << 2;
        const LABELS = 1 << 3;
        const MARKERS = 1 << 4;
        const COMET_TAILS = 1 << 5;
        const REFERENCE_MARKS = 1 << 6;
        const ECLIPSE_SHADOWS = 1 << 7;
        const RING_SHADOWS = 1 << 8;
        const PLANETSHINE = 1 << 9;
        const DSOS = 1 << 10;
        const AUTO_MAG = 1 << 11;
        const TINTED_ILLUMINATION = 1 << 12;
        /// Draw aperiodic trajectories only up to the current time.
        const PARTIAL_TRAJECTORIES = 1 << 13;
    }
}

impl Default for RenderFlags {
    fn default() -> Self {
        RenderFlags::STARS
            | RenderFlags::PLANETS
            | RenderFlags::COMET_TAILS
            | RenderFlags::ECLIPSE_SHADOWS
            | RenderFlags::RING_SHADOWS
            | RenderFlags::AUTO_MAG
    }
}

/// Which body classes get orbit paths and labels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClassFilters {
    pub orbits: BodyClassMask,
    pub labels: BodyClassMask,
}

impl Default for ClassFilters {
    fn default() -> Self {
        Self {
            orbits: BodyClassMask::PLANET | BodyClassMask::DWARF_PLANET | BodyClassMask::MOON,
            labels: BodyClassMask::all(),
        }
    }
}
