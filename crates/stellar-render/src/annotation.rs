//! Screen annotations: labels, markers, and the selection cursor.
//!
//! Annotations live in three queues. Background annotations draw before
//! everything (constellation labels and other far-field text),
//! foreground annotations draw after everything, and depth-sorted
//! annotations are interleaved with scene geometry by the depth
//! partitioner so a marker behind a planet is hidden by it.

use glam::DVec3;

/// Marker glyphs a backend can draw without fonts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarkerShape {
    Diamond,
    Square,
    Triangle,
    Plus,
    Crosshair,
    Disc,
}

#[derive(Clone, Debug)]
pub enum AnnotationContent {
    Label(String),
    Marker(MarkerShape),
}

/// One annotation, positioned camera-relative.
#[derive(Clone, Debug)]
pub struct Annotation {
    pub content: AnnotationContent,
    /// Position relative to the observer, world orientation, kilometers.
    pub position: DVec3,
    /// Depth along the view axis, used only by the depth-sorted queue.
    pub depth: f64,
    pub color: [f32; 4],
    /// Glyph or text size in pixels.
    pub size: f32,
}

/// Per-frame annotation queues.
#[derive(Debug, Default)]
pub struct AnnotationLists {
    pub background: Vec<Annotation>,
    pub foreground: Vec<Annotation>,
    depth_sorted: Vec<Annotation>,
    /// Object annotations are grouped per render-list entry between
    /// `begin_object` and `end_object`.
    objects: Vec<Annotation>,
    object_open: bool,
}

impl AnnotationLists {
    pub fn clear(&mut self) {
        self.background.clear();
        self.foreground.clear();
        self.depth_sorted.clear();
        self.objects.clear();
        debug_assert!(!self.object_open, "frame ended inside an object group");
        self.object_open = false;
    }

    pub fn add_depth_sorted(&mut self, annotation: Annotation) {
        self.depth_sorted.push(annotation);
    }

    /// Depth-sorted annotations, farthest first, ready for interleaving.
    pub fn sorted_by_depth(&mut self) -> &[Annotation] {
        self.depth_sorted
            .sort_by(|a, b| b.depth.total_cmp(&a.depth));
        &self.depth_sorted
    }

    /// Nearest depth among depth-sorted annotations, if any.
    pub fn nearest_depth(&self) -> Option<f64> {
        self.depth_sorted
            .iter()
            .map(|a| a.depth)
            .min_by(f64::total_cmp)
    }

    /// Open an object annotation group. Groups must not nest.
    pub fn begin_object(&mut self) {
        debug_assert!(!self.object_open, "object annotation groups must not nest");
        self.object_open = true;
    }

    pub fn add_object(&mut self, annotation: Annotation) {
        debug_assert!(self.object_open, "object annotation outside a group");
        self.objects.push(annotation);
    }

    /// Close the current object group, draining its annotations.
    pub fn end_object(&mut self) -> Vec<Annotation> {
        debug_assert!(self.object_open, "end_object without begin_object");
        self.object_open = false;
        std::mem::take(&mut self.objects)
    }
}
