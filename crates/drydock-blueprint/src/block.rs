//! Block record - one placed block, flattened out of its grid.

/// Subtype assigned on import when a block has no `SubtypeName` element.
pub const DEFAULT_IMPORT_SUBTYPE: &str = "Unknown";

/// Subtype assigned on export when the input record does not name one.
pub const DEFAULT_EXPORT_SUBTYPE: &str = "LargeBlockArmorBlock";

/// Integer grid coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vector3I {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Vector3I {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }
}

/// Block rotation as a pair of direction names in the grid's local axes.
///
/// Real values are `Up`, `Down`, `Left`, `Right`, `Forward` and `Backward`.
/// The default is a placeholder filled in when a block carries no
/// orientation, not a rotation read from the file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlockOrientation {
    #[cfg_attr(feature = "serde", serde(rename = "Forward"))]
    pub forward: String,
    #[cfg_attr(feature = "serde", serde(rename = "Up"))]
    pub up: String,
}

impl BlockOrientation {
    pub const DEFAULT_FORWARD: &'static str = "Forward";
    pub const DEFAULT_UP: &'static str = "Up";

    pub fn new(forward: impl Into<String>, up: impl Into<String>) -> Self {
        Self {
            forward: forward.into(),
            up: up.into(),
        }
    }
}

impl Default for BlockOrientation {
    fn default() -> Self {
        Self::new(Self::DEFAULT_FORWARD, Self::DEFAULT_UP)
    }
}

/// HSV color offsets applied to a block's paint (`x` hue, `y` saturation, `z` value).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColorMaskHsv {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl ColorMaskHsv {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// One placed block.
///
/// Records produced by the importer always have every field populated;
/// missing source data is replaced by the documented defaults.
///
/// With the `serde` feature the record uses the blueprint's own field names
/// (`SubtypeName`, `Min`, `BlockOrientation`, `ColorMaskHSV`), which is the
/// JSON shape exchanged with editors.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlockRecord {
    #[cfg_attr(
        feature = "serde",
        serde(rename = "SubtypeName", default = "default_export_subtype")
    )]
    pub subtype_name: String,
    #[cfg_attr(feature = "serde", serde(rename = "Min"))]
    pub min: Vector3I,
    #[cfg_attr(feature = "serde", serde(rename = "BlockOrientation"))]
    pub orientation: BlockOrientation,
    #[cfg_attr(feature = "serde", serde(rename = "ColorMaskHSV"))]
    pub color_mask: ColorMaskHsv,
}

impl BlockRecord {
    /// Create a block with the given subtype at `min`, default orientation and color.
    pub fn new(subtype_name: impl Into<String>, min: Vector3I) -> Self {
        Self {
            subtype_name: subtype_name.into(),
            min,
            orientation: BlockOrientation::default(),
            color_mask: ColorMaskHsv::default(),
        }
    }

    pub fn with_orientation(mut self, orientation: BlockOrientation) -> Self {
        self.orientation = orientation;
        self
    }

    pub fn with_color_mask(mut self, color_mask: ColorMaskHsv) -> Self {
        self.color_mask = color_mask;
        self
    }
}

#[cfg(feature = "serde")]
fn default_export_subtype() -> String {
    DEFAULT_EXPORT_SUBTYPE.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let block = BlockRecord::new("LargeBlockArmorSlope", Vector3I::new(1, -2, 3));
        assert_eq!(block.orientation.forward, "Forward");
        assert_eq!(block.orientation.up, "Up");
        assert_eq!(block.color_mask, ColorMaskHsv::new(0.0, 0.0, 0.0));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_json_shape() {
        let block = BlockRecord::new("LargeBlockArmorBlock", Vector3I::new(1, 2, 3))
            .with_orientation(BlockOrientation::new("Down", "Left"))
            .with_color_mask(ColorMaskHsv::new(0.5, -0.25, 0.0));

        let value = serde_json::to_value(&block).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "SubtypeName": "LargeBlockArmorBlock",
                "Min": {"x": 1, "y": 2, "z": 3},
                "BlockOrientation": {"Forward": "Down", "Up": "Left"},
                "ColorMaskHSV": {"x": 0.5, "y": -0.25, "z": 0.0}
            })
        );

        let back: BlockRecord = serde_json::from_value(value).unwrap();
        assert_eq!(back, block);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_json_missing_subtype_uses_export_default() {
        let block: BlockRecord = serde_json::from_str(
            r#"{
                "Min": {"x": 0, "y": 0, "z": 0},
                "BlockOrientation": {"Forward": "Forward", "Up": "Up"},
                "ColorMaskHSV": {"x": 0, "y": 0, "z": 0}
            }"#,
        )
        .unwrap();
        assert_eq!(block.subtype_name, DEFAULT_EXPORT_SUBTYPE);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_json_missing_min_is_rejected() {
        let result: Result<BlockRecord, _> = serde_json::from_str(
            r#"{"SubtypeName": "A", "BlockOrientation": {"Forward": "Up", "Up": "Left"}, "ColorMaskHSV": {"x": 0, "y": 0, "z": 0}}"#,
        );
        assert!(result.is_err());
    }
}
