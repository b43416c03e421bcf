//! Drydock - Space Engineers blueprint conversion library.
//!
//! This crate provides a unified interface to the Drydock crates.
//!
//! # Crates
//!
//! - [`drydock_common`] - Shared types (blueprint GUIDs)
//! - [`drydock_blueprint`] - Blueprint (`bp.sbc`) import and export
//!
//! # Example
//!
//! ```no_run
//! use drydock::prelude::*;
//!
//! let blocks = import_file("blueprints/MyShip/bp.sbc")?;
//! println!("Blocks: {}", blocks.len());
//!
//! let receipt = Exporter::default().export(&BlueprintPackage::new("MyShipCopy", blocks))?;
//! println!("{}", receipt);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

// Re-export all sub-crates
pub use drydock_blueprint as blueprint;
pub use drydock_common as common;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use drydock_blueprint::{
        import_blocks, import_file, BlockOrientation, BlockRecord, BlueprintPackage, ColorMaskHsv,
        ExportReceipt, Exporter, Vector3I,
    };
    #[cfg(feature = "full")]
    pub use drydock_blueprint::ExportRequest;
    pub use drydock_common::BlueprintGuid;
}

// Re-export commonly used types at the crate root
pub use drydock_blueprint::{Error, Exporter, Result};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
