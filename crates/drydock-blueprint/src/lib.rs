//! Space Engineers ship blueprint import and export.
//!
//! A blueprint (`bp.sbc`) is an XML document describing one or more cube
//! grids, each holding a list of placed blocks. This crate flattens those
//! documents into [`BlockRecord`]s and writes block lists back out as a
//! blueprint folder the game can load.
//!
//! Only the minimal block schema is handled: subtype name, minimum corner,
//! orientation and HSV color mask. Everything else in a blueprint is ignored
//! on import and omitted on export.
//!
//! # Example
//!
//! ```no_run
//! use drydock_blueprint::{import_blocks, BlueprintPackage, Exporter};
//!
//! let data = std::fs::read("bp.sbc")?;
//! let blocks = import_blocks(&data)?;
//! println!("{} blocks", blocks.len());
//!
//! let package = BlueprintPackage::new("Copy.sbc", blocks);
//! let receipt = Exporter::new("blueprints").export(&package)?;
//! println!("{}", receipt);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod block;
mod element;
mod error;
mod export;
mod import;
mod package;

pub use block::{
    BlockOrientation, BlockRecord, ColorMaskHsv, Vector3I, DEFAULT_EXPORT_SUBTYPE,
    DEFAULT_IMPORT_SUBTYPE,
};
pub use element::Element;
pub use error::{Error, Result, ThumbnailError};
#[cfg(feature = "serde")]
pub use export::ExportRequest;
pub use export::{
    build_document, render_document, sanitize_name, BlueprintPackage, ExportReceipt, Exporter,
};
pub use import::{import_blocks, import_file};
pub use package::{decode_data_uri, BLUEPRINT_FILE_NAME, DEFAULT_ROOT, THUMBNAIL_FILE_NAME};
