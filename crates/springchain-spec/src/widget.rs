//! Widget shape styles for bone visualization.

use serde::{Deserialize, Serialize};

/// Widget shape styles for bone visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WidgetStyle {
    /// Wireframe circle (default, good for rotation controls).
    #[default]
    WireCircle,
    /// Bone-shaped outline (good for read-only previews).
    Bone,
    /// Wireframe cube.
    WireCube,
    /// Wireframe sphere.
    WireSphere,
}

impl WidgetStyle {
    /// Returns the Blender object name for this widget style.
    pub fn blender_name(&self) -> &'static str {
        match self {
            WidgetStyle::WireCircle => "WGT_circle",
            WidgetStyle::Bone => "WGT_bone",
            WidgetStyle::WireCube => "WGT_cube",
            WidgetStyle::WireSphere => "WGT_sphere",
        }
    }
}
