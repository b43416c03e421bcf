//! Blueprint export: block records to an XML document and a blueprint folder.

use std::fmt;
use std::path::{Path, PathBuf};

use drydock_common::BlueprintGuid;
use tracing::{info, warn};

use crate::block::BlockRecord;
use crate::import::{BLOCKS_TAG, BLOCK_TAG, GRID_TAG};
use crate::package::{self, BLUEPRINT_FILE_NAME, DEFAULT_ROOT};
use crate::{Element, Error, Result};

const BLUEPRINT_EXTENSION: &str = ".sbc";
const XML_DECLARATION: &str = "<?xml version=\"1.0\"?>\n";
const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";
const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";
const BLUEPRINT_TYPE_ID: &str = "BlueprintDefinition";
const GRID_SIZE: &str = "Large";

/// Strip a trailing `.sbc` (any case) from a blueprint name.
pub fn sanitize_name(name: &str) -> String {
    let cut = name.len().wrapping_sub(BLUEPRINT_EXTENSION.len());
    match name.get(cut..) {
        Some(ext) if ext.eq_ignore_ascii_case(BLUEPRINT_EXTENSION) => name[..cut].to_string(),
        _ => name.to_string(),
    }
}

/// Build the blueprint document for an already sanitized name.
///
/// `Min`, `BlockOrientation` and `ColorMaskHSV` carry their components as
/// attributes (`<Min x="1" y="2" z="3"/>`), the form the game itself saves.
/// Older editor output used child elements (`<Min><x>1</x>...</Min>`);
/// consumers that expect that shape will not find the values. The importer
/// reads both forms.
pub fn build_document(name: &str, blocks: &[BlockRecord]) -> Element {
    let id = Element::new("Id")
        .child(Element::new("TypeId").text(BLUEPRINT_TYPE_ID))
        .child(Element::new("SubtypeId").text(BlueprintGuid::from_name(name).to_string()));

    let grid = Element::new(GRID_TAG)
        .child(Element::new("GridSizeEnum").text(GRID_SIZE))
        .child(Element::new(BLOCKS_TAG).children(blocks.iter().map(block_element)));

    Element::new("ShipBlueprint")
        .attr("xmlns:xsd", XSD_NAMESPACE)
        .attr("xmlns:xsi", XSI_NAMESPACE)
        .child(id)
        .child(Element::new("DisplayName").text(name))
        .child(Element::new("CubeGrids").child(grid))
}

fn block_element(block: &BlockRecord) -> Element {
    Element::new(BLOCK_TAG)
        .attr("xsi:type", BLOCK_TAG)
        .child(Element::new("SubtypeName").text(block.subtype_name.as_str()))
        .child(
            Element::new("Min")
                .attr("x", block.min.x.to_string())
                .attr("y", block.min.y.to_string())
                .attr("z", block.min.z.to_string()),
        )
        .child(
            Element::new("BlockOrientation")
                .attr("Forward", block.orientation.forward.as_str())
                .attr("Up", block.orientation.up.as_str()),
        )
        .child(
            Element::new("ColorMaskHSV")
                .attr("x", block.color_mask.x.to_string())
                .attr("y", block.color_mask.y.to_string())
                .attr("z", block.color_mask.z.to_string()),
        )
}

/// Serialize a document with an XML declaration, one tag per line.
pub fn render_document(document: &Element) -> Result<String> {
    let body = document.to_xml_string()?;
    Ok(format!("{}{}", XML_DECLARATION, body.replace("><", ">\n<")))
}

/// A blueprint to export: name, blocks and an optional thumbnail data URI.
#[derive(Debug, Clone, PartialEq)]
pub struct BlueprintPackage {
    /// Blueprint name; a trailing `.sbc` is stripped before use.
    pub name: String,
    pub blocks: Vec<BlockRecord>,
    /// Thumbnail as `data:<mime>;base64,<payload>`.
    pub thumbnail: Option<String>,
}

impl BlueprintPackage {
    pub fn new(name: impl Into<String>, blocks: Vec<BlockRecord>) -> Self {
        Self {
            name: name.into(),
            blocks,
            thumbnail: None,
        }
    }

    pub fn with_thumbnail(mut self, data_uri: impl Into<String>) -> Self {
        self.thumbnail = Some(data_uri.into());
        self
    }
}

/// Export request as sent by editors:
/// `{"blocks": [...], "filename": "MyShip.sbc", "thumbnail": "data:..."}`.
#[cfg(feature = "serde")]
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ExportRequest {
    #[serde(default)]
    pub blocks: Vec<BlockRecord>,
    #[serde(default = "default_filename")]
    pub filename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

#[cfg(feature = "serde")]
fn default_filename() -> String {
    "exported_ship".to_string()
}

#[cfg(feature = "serde")]
impl From<ExportRequest> for BlueprintPackage {
    fn from(request: ExportRequest) -> Self {
        Self {
            name: request.filename,
            blocks: request.blocks,
            thumbnail: request.thumbnail.filter(|t| !t.is_empty()),
        }
    }
}

/// Result of a successful export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReceipt {
    /// Sanitized blueprint name.
    pub name: String,
    /// Blueprint folder.
    pub folder: PathBuf,
    /// Path of the written `bp.sbc`.
    pub blueprint: PathBuf,
    /// Path of the written thumbnail, if one was supplied.
    pub thumbnail: Option<PathBuf>,
}

impl fmt::Display for ExportReceipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Blueprint '{}' exported successfully to {}/",
            self.name,
            self.folder.display()
        )
    }
}

/// Writes blueprint folders under a root directory.
///
/// Each export is independent. Exporting twice under the same name replaces
/// the earlier files; the last writer wins.
#[derive(Debug, Clone)]
pub struct Exporter {
    root: PathBuf,
}

impl Default for Exporter {
    fn default() -> Self {
        Self::new(DEFAULT_ROOT)
    }
}

impl Exporter {
    /// Create an exporter writing under `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory blueprint folders are created in.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Export a blueprint package.
    ///
    /// The XML document is written before the thumbnail. If the thumbnail
    /// cannot be decoded or written, [`Error::Thumbnail`] is returned and the
    /// document stays on disk. A `thumb.png` from an earlier export of the
    /// same name is removed whenever this export leaves none of its own.
    ///
    /// Block components are written as attributes, see [`build_document`].
    pub fn export(&self, package: &BlueprintPackage) -> Result<ExportReceipt> {
        let name = sanitize_name(&package.name);
        package::validate_folder_name(&name)?;

        let xml = render_document(&build_document(&name, &package.blocks))?;

        let folder = package::ensure_folder(&self.root, &name)?;
        let blueprint = folder.join(BLUEPRINT_FILE_NAME);
        package::write_atomic(&blueprint, xml.as_bytes()).map_err(|e| Error::io(&blueprint, e))?;

        let thumbnail = match package.thumbnail.as_deref() {
            None => {
                package::remove_thumbnail(&folder).map_err(|e| {
                    Error::io(folder.join(package::THUMBNAIL_FILE_NAME), e)
                })?;
                None
            }
            Some(uri) => match package::write_thumbnail(&folder, uri) {
                Ok(path) => Some(path),
                Err(source) => {
                    warn!(blueprint = %blueprint.display(), error = %source, "failed to save thumbnail");
                    // The folder must not pair the new document with an older image.
                    if let Err(e) = package::remove_thumbnail(&folder) {
                        warn!(folder = %folder.display(), error = %e, "failed to remove old thumbnail");
                    }
                    return Err(Error::Thumbnail { blueprint, source });
                }
            },
        };

        info!(
            name = %name,
            blocks = package.blocks.len(),
            folder = %folder.display(),
            thumbnail = thumbnail.is_some(),
            "exported blueprint"
        );

        Ok(ExportReceipt {
            name,
            folder,
            blueprint,
            thumbnail,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{BlockOrientation, ColorMaskHsv, Vector3I};
    use crate::package::THUMBNAIL_FILE_NAME;
    use crate::{import_blocks, import_file, ThumbnailError};

    fn sample_blocks() -> Vec<BlockRecord> {
        vec![
            BlockRecord::new("LargeBlockArmorBlock", Vector3I::new(0, 0, 0)),
            BlockRecord::new("LargeBlockArmorSlope", Vector3I::new(-1, 2, 30))
                .with_orientation(BlockOrientation::new("Down", "Left"))
                .with_color_mask(ColorMaskHsv::new(0.575, -0.1, 0.33)),
            BlockRecord::new("LargeBlockSmallGenerator", Vector3I::new(5, -6, 7))
                .with_orientation(BlockOrientation::new("Backward", "Right"))
                .with_color_mask(ColorMaskHsv::new(1.0, 0.0, -1.0)),
        ]
    }

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("MyShip.sbc"), "MyShip");
        assert_eq!(sanitize_name("MyShip.SBC"), "MyShip");
        assert_eq!(sanitize_name("MyShip"), "MyShip");
        assert_eq!(sanitize_name("My.sbc.Ship"), "My.sbc.Ship");
        assert_eq!(sanitize_name(".sbc"), "");
        assert_eq!(sanitize_name("sbc"), "sbc");
        assert_eq!(sanitize_name("Schiff.sbc"), "Schiff");
        assert_eq!(sanitize_name("Ünïcödé"), "Ünïcödé");
    }

    #[test]
    fn test_build_document_structure() {
        let doc = build_document("MyShip", &sample_blocks());

        assert_eq!(doc.tag, "ShipBlueprint");
        assert_eq!(doc.attribute("xmlns:xsd"), Some(XSD_NAMESPACE));
        assert_eq!(doc.attribute("xmlns:xsi"), Some(XSI_NAMESPACE));

        let id = doc.find("Id").unwrap();
        assert_eq!(id.find("TypeId").unwrap().text, "BlueprintDefinition");
        assert_eq!(
            id.find("SubtypeId").unwrap().text,
            "e8027399-9df7-1663-98d8-2c55662adb43"
        );
        assert_eq!(doc.find("DisplayName").unwrap().text, "MyShip");

        let grid = doc.find("CubeGrids").unwrap().find("CubeGrid").unwrap();
        assert_eq!(grid.find("GridSizeEnum").unwrap().text, "Large");
        let blocks: Vec<_> = grid.find("CubeBlocks").unwrap().find_all(BLOCK_TAG).collect();
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[1].attribute("xsi:type"), Some(BLOCK_TAG));
        assert_eq!(blocks[1].find("Min").unwrap().attribute("z"), Some("30"));
        assert_eq!(
            blocks[1].find("BlockOrientation").unwrap().attribute("Forward"),
            Some("Down")
        );
    }

    #[test]
    fn test_render_document() {
        let xml = render_document(&build_document("Tiny", &[])).unwrap();
        assert!(xml.starts_with("<?xml version=\"1.0\"?>\n<ShipBlueprint "));
        assert!(xml.contains("\n<DisplayName>Tiny</DisplayName>\n"));
        assert!(xml.contains("<CubeBlocks/>"));
        assert!(!xml.contains("><"));
    }

    #[test]
    fn test_subtype_id_is_deterministic() {
        let a = render_document(&build_document("Miner", &sample_blocks())).unwrap();
        let b = render_document(&build_document("Miner", &[])).unwrap();
        let id = |xml: &str| {
            let root = Element::parse(xml.as_bytes()).unwrap();
            root.find("Id").unwrap().find("SubtypeId").unwrap().text.clone()
        };
        assert_eq!(id(&a), id(&b));
        assert_eq!(id(&a), BlueprintGuid::from_name("Miner").to_string());
    }

    #[test]
    fn test_export_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = Exporter::new(dir.path().join("blueprints"));
        let blocks = sample_blocks();

        let receipt = exporter.export(&BlueprintPackage::new("RoundTrip", blocks.clone())).unwrap();

        assert_eq!(receipt.name, "RoundTrip");
        assert_eq!(receipt.folder, dir.path().join("blueprints").join("RoundTrip"));
        assert_eq!(receipt.blueprint, receipt.folder.join(BLUEPRINT_FILE_NAME));
        assert_eq!(receipt.thumbnail, None);
        assert_eq!(import_file(&receipt.blueprint).unwrap(), blocks);
    }

    #[test]
    fn test_export_strips_extension() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = Exporter::new(dir.path());

        let receipt = exporter.export(&BlueprintPackage::new("MyShip.sbc", sample_blocks())).unwrap();

        assert_eq!(receipt.folder, dir.path().join("MyShip"));
        assert!(dir.path().join("MyShip").join("bp.sbc").is_file());
        let root = Element::parse(&std::fs::read(&receipt.blueprint).unwrap()).unwrap();
        assert_eq!(root.find("DisplayName").unwrap().text, "MyShip");
        assert_eq!(
            receipt.to_string(),
            format!("Blueprint 'MyShip' exported successfully to {}/", receipt.folder.display())
        );
    }

    #[test]
    fn test_export_overwrites_previous() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = Exporter::new(dir.path());

        exporter.export(&BlueprintPackage::new("Ship", sample_blocks())).unwrap();
        let receipt = exporter.export(&BlueprintPackage::new("Ship", vec![])).unwrap();

        assert!(import_file(&receipt.blueprint).unwrap().is_empty());
    }

    #[test]
    fn test_export_with_thumbnail() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = Exporter::new(dir.path());
        let package = BlueprintPackage::new("Pic", sample_blocks())
            .with_thumbnail("data:image/png;base64,iVBORw0KGgo=");

        let receipt = exporter.export(&package).unwrap();

        let thumb = receipt.folder.join(THUMBNAIL_FILE_NAME);
        assert_eq!(receipt.thumbnail.as_deref(), Some(thumb.as_path()));
        assert_eq!(std::fs::read(thumb).unwrap(), b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn test_export_bad_thumbnail_keeps_blueprint() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = Exporter::new(dir.path());
        let package = BlueprintPackage::new("Partial.sbc", sample_blocks())
            .with_thumbnail("this is not a data uri");

        let err = exporter.export(&package).unwrap_err();

        assert!(err.is_partial());
        match err {
            Error::Thumbnail { blueprint, source } => {
                assert!(matches!(source, ThumbnailError::MissingPayload));
                assert_eq!(blueprint, dir.path().join("Partial").join("bp.sbc"));
                assert_eq!(import_file(&blueprint).unwrap(), sample_blocks());
            }
            other => panic!("expected thumbnail error, got {:?}", other),
        }
        assert!(!dir.path().join("Partial").join(THUMBNAIL_FILE_NAME).exists());
    }

    #[test]
    fn test_reexport_clears_old_thumbnail() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = Exporter::new(dir.path());
        let thumb = dir.path().join("Ship").join(THUMBNAIL_FILE_NAME);

        let with_thumb = BlueprintPackage::new("Ship", sample_blocks())
            .with_thumbnail("data:image/png;base64,iVBORw0KGgo=");
        exporter.export(&with_thumb).unwrap();
        assert!(thumb.is_file());

        let bad_thumb = BlueprintPackage::new("Ship", vec![]).with_thumbnail("garbage");
        assert!(exporter.export(&bad_thumb).unwrap_err().is_partial());
        assert!(!thumb.exists());
        assert!(import_file(dir.path().join("Ship").join("bp.sbc")).unwrap().is_empty());

        exporter.export(&with_thumb).unwrap();
        assert!(thumb.is_file());

        let receipt = exporter.export(&BlueprintPackage::new("Ship", vec![])).unwrap();
        assert_eq!(receipt.thumbnail, None);
        assert!(!thumb.exists());
    }

    #[test]
    fn test_build_document_writes_components_as_attributes() {
        let block = BlockRecord::new("A", Vector3I::new(1, 2, 3))
            .with_color_mask(ColorMaskHsv::new(0.25, 0.5, 0.75));
        let doc = build_document("Attrs", &[block]);
        let xml = doc.to_xml_string().unwrap();
        assert!(xml.contains(r#"<Min x="1" y="2" z="3"/>"#));
        assert!(xml.contains(r#"<BlockOrientation Forward="Forward" Up="Up"/>"#));
        assert!(xml.contains(r#"<ColorMaskHSV x="0.25" y="0.5" z="0.75"/>"#));
    }

    #[test]
    fn test_export_undecodable_thumbnail() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = Exporter::new(dir.path());
        let package = BlueprintPackage::new("Ship", vec![]).with_thumbnail("data:image/png;base64,!!!");

        let err = exporter.export(&package).unwrap_err();
        assert!(matches!(
            err,
            Error::Thumbnail {
                source: ThumbnailError::Decode(_),
                ..
            }
        ));
        assert!(dir.path().join("Ship").join("bp.sbc").is_file());
    }

    #[test]
    fn test_export_rejects_unsafe_names() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = Exporter::new(dir.path().join("root"));

        for name in ["", ".sbc", "..", "../outside", "a/b.sbc"] {
            let err = exporter.export(&BlueprintPackage::new(name, vec![])).unwrap_err();
            assert!(matches!(err, Error::InvalidName(_)), "name {:?}", name);
        }
        assert!(!dir.path().join("root").exists());
    }

    #[test]
    fn test_exporter_default_root() {
        assert_eq!(Exporter::default().root(), Path::new("blueprints"));
    }

    #[test]
    fn test_export_output_imports_as_document() {
        let xml = render_document(&build_document("Doc", &sample_blocks())).unwrap();
        assert_eq!(import_blocks(xml.as_bytes()).unwrap(), sample_blocks());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_export_request_defaults() {
        let request: ExportRequest = serde_json::from_str(r#"{"thumbnail": ""}"#).unwrap();
        let package = BlueprintPackage::from(request);
        assert_eq!(package.name, "exported_ship");
        assert!(package.blocks.is_empty());
        assert_eq!(package.thumbnail, None);

        let request: ExportRequest = serde_json::from_str(
            r#"{
                "filename": "Scout.sbc",
                "blocks": [{
                    "Min": {"x": 1, "y": 2, "z": 3},
                    "BlockOrientation": {"Forward": "Up", "Up": "Backward"},
                    "ColorMaskHSV": {"x": 0.1, "y": 0.2, "z": 0.3}
                }],
                "thumbnail": "data:image/png;base64,aGVsbG8="
            }"#,
        )
        .unwrap();
        let package = BlueprintPackage::from(request);
        assert_eq!(package.name, "Scout.sbc");
        assert_eq!(package.blocks[0].subtype_name, "LargeBlockArmorBlock");
        assert_eq!(package.blocks[0].orientation, BlockOrientation::new("Up", "Backward"));
        assert!(package.thumbnail.is_some());
    }
}
