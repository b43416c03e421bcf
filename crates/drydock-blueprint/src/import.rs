//! Blueprint import: XML document to a flat list of block records.

use std::fmt::Display;
use std::path::Path;
use std::str::FromStr;

use tracing::{debug, info};

use crate::block::{BlockOrientation, BlockRecord, ColorMaskHsv, Vector3I, DEFAULT_IMPORT_SUBTYPE};
use crate::{Element, Error, Result};

pub(crate) const GRID_TAG: &str = "CubeGrid";
pub(crate) const BLOCKS_TAG: &str = "CubeBlocks";
pub(crate) const BLOCK_TAG: &str = "MyObjectBuilder_CubeBlock";

/// Parse a blueprint document and return every block of every grid.
///
/// Grids are found anywhere in the document. Blocks are returned grid by grid
/// in document order. A document without grids or blocks yields an empty list.
pub fn import_blocks(data: &[u8]) -> Result<Vec<BlockRecord>> {
    let root = Element::parse(data)?;

    let mut blocks = Vec::new();
    for (index, grid) in root.descendants(GRID_TAG).into_iter().enumerate() {
        let before = blocks.len();
        for container in grid.find_all(BLOCKS_TAG) {
            for block in container.find_all(BLOCK_TAG) {
                blocks.push(read_block(block)?);
            }
        }
        debug!(grid = index, blocks = blocks.len() - before, "imported grid");
    }

    info!(blocks = blocks.len(), "imported blueprint");
    Ok(blocks)
}

/// Read a blueprint file from disk and import its blocks.
pub fn import_file(path: impl AsRef<Path>) -> Result<Vec<BlockRecord>> {
    let path = path.as_ref();
    let data = std::fs::read(path).map_err(|e| Error::io(path, e))?;
    import_blocks(&data)
}

fn read_block(block: &Element) -> Result<BlockRecord> {
    let subtype_name = text_or(block, "SubtypeName", DEFAULT_IMPORT_SUBTYPE);

    let min = Vector3I {
        x: field_or(block, "Min", "x", 0)?,
        y: field_or(block, "Min", "y", 0)?,
        z: field_or(block, "Min", "z", 0)?,
    };

    let orientation = BlockOrientation {
        forward: field_or(block, "BlockOrientation", "Forward", BlockOrientation::DEFAULT_FORWARD.to_string())?,
        up: field_or(block, "BlockOrientation", "Up", BlockOrientation::DEFAULT_UP.to_string())?,
    };

    let color_mask = ColorMaskHsv {
        x: field_or(block, "ColorMaskHSV", "x", 0.0)?,
        y: field_or(block, "ColorMaskHSV", "y", 0.0)?,
        z: field_or(block, "ColorMaskHSV", "z", 0.0)?,
    };

    Ok(BlockRecord {
        subtype_name,
        min,
        orientation,
        color_mask,
    })
}

/// Text of the block's `child` element, or `default` when the element is absent.
///
/// A present but empty element yields an empty string.
fn text_or(block: &Element, child: &str, default: &str) -> String {
    block
        .find(child)
        .map_or(default, |e| e.text.trim())
        .to_string()
}

/// Raw value of component `key` of the block's `child` element.
///
/// Game files store components as attributes (`<Min x="1" .../>`); element
/// form (`<Min><x>1</x></Min>`) is accepted as well.
fn lookup<'a>(block: &'a Element, child: &str, key: &str) -> Option<&'a str> {
    let element = block.find(child)?;
    element
        .attribute(key)
        .or_else(|| element.find(key).map(|e| e.text.as_str()))
}

/// Look up a component and parse it, falling back to `default` when absent.
fn field_or<T>(block: &Element, child: &str, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match lookup(block, child, key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e| {
            Error::Parse(format!("invalid {}.{} value {:?}: {}", child, key, raw, e))
        }),
    }
}
