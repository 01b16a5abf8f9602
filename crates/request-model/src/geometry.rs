//! Output geometry and aspect-ratio presets.

use serde::{Deserialize, Serialize};

/// Pixel dimensions of an output frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Geometry {
    pub width: u32,
    pub height: u32,
}

impl Geometry {
    /// 9:16 portrait, 1080 wide.
    pub const VERTICAL: Geometry = Geometry {
        width: 1080,
        height: 1920,
    };

    /// 16:9 landscape, 1080p.
    pub const HORIZONTAL: Geometry = Geometry {
        width: 1920,
        height: 1080,
    };

    /// 1:1 square.
    pub const SQUARE: Geometry = Geometry {
        width: 1080,
        height: 1080,
    };

    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Round both dimensions down to even values (yuv420p needs even sizes),
    /// never below 2.
    pub fn even(self) -> Self {
        Self {
            width: (self.width & !1).max(2),
            height: (self.height & !1).max(2),
        }
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.width as f64 / self.height.max(1) as f64
    }
}

impl std::fmt::Display for Geometry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Aspect-ratio preset requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum AspectRatio {
    /// Keep source geometry.
    #[default]
    #[serde(rename = "original")]
    Original,
    #[serde(rename = "vertical-9x16")]
    Vertical9x16,
    #[serde(rename = "horizontal-16x9")]
    Horizontal16x9,
    #[serde(rename = "square-1x1")]
    Square1x1,
}

impl AspectRatio {
    /// Geometry target this preset maps to.
    pub fn geometry_target(self) -> GeometryTarget {
        match self {
            AspectRatio::Original => GeometryTarget::Source,
            AspectRatio::Vertical9x16 => GeometryTarget::Fixed(Geometry::VERTICAL),
            AspectRatio::Horizontal16x9 => GeometryTarget::Fixed(Geometry::HORIZONTAL),
            AspectRatio::Square1x1 => GeometryTarget::Fixed(Geometry::SQUARE),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AspectRatio::Original => "original",
            AspectRatio::Vertical9x16 => "vertical-9x16",
            AspectRatio::Horizontal16x9 => "horizontal-16x9",
            AspectRatio::Square1x1 => "square-1x1",
        }
    }
}

/// Where every stream of a plan is normalised to before concatenation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GeometryTarget {
    /// Letterbox/pillarbox into a fixed frame.
    Fixed(Geometry),
    /// Keep the geometry of the first clip in the plan.
    Source,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_map_to_expected_frames() {
        assert_eq!(
            AspectRatio::Vertical9x16.geometry_target(),
            GeometryTarget::Fixed(Geometry::new(1080, 1920))
        );
        assert_eq!(
            AspectRatio::Horizontal16x9.geometry_target(),
            GeometryTarget::Fixed(Geometry::new(1920, 1080))
        );
        assert_eq!(
            AspectRatio::Square1x1.geometry_target(),
            GeometryTarget::Fixed(Geometry::new(1080, 1080))
        );
        assert_eq!(AspectRatio::Original.geometry_target(), GeometryTarget::Source);
    }

    #[test]
    fn test_even_rounds_down() {
        assert_eq!(Geometry::new(1281, 721).even(), Geometry::new(1280, 720));
        assert_eq!(Geometry::new(1, 1).even(), Geometry::new(2, 2));
    }

    #[test]
    fn test_aspect_ratio_serde_names() {
        let parsed: AspectRatio = serde_json::from_str("\"vertical-9x16\"").unwrap();
        assert_eq!(parsed, AspectRatio::Vertical9x16);
        assert_eq!(
            serde_json::to_string(&AspectRatio::Square1x1).unwrap(),
            "\"square-1x1\""
        );
    }

    #[test]
    fn test_vertical_aspect() {
        assert!((Geometry::VERTICAL.aspect_ratio() - 9.0 / 16.0).abs() < 1e-9);
    }
}
