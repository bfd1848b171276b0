//! Media resources and the per-document media context.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Extensions of preview rasters produced for embedded objects.
pub const PREVIEW_EXTENSIONS: &[&str] = &["emf", "wmf", "tif", "tiff"];

/// Extensions of pictures that are kept as content images.
pub const SUPPORTED_IMAGE_EXTENSIONS: &[&str] =
    &["png", "jpg", "jpeg", "gif", "bmp", "webp", "svg"];

/// An image placed in the document flow or inside a table cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRef {
    /// Relationship id referenced by the drawing (e.g. "rId5")
    pub relationship_id: String,

    /// Normalized media path (e.g. "word/media/image1.png")
    pub target: String,

    /// Ordinal of the image in its document
    pub position: usize,

    /// MIME type (e.g., "image/png")
    pub mime_type: String,

    /// Raw binary data
    #[serde(skip)]
    pub data: Vec<u8>,
}

impl ImageRef {
    /// File extension of the target, lowercased.
    pub fn extension(&self) -> Option<String> {
        extension_of(&self.target)
    }

    /// Get the size of the image data in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// Raw media bytes with their MIME type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaResource {
    /// Raw binary data
    #[serde(skip_serializing)]
    pub data: Vec<u8>,

    /// MIME type (e.g., "image/jpeg")
    pub mime_type: String,

    /// Normalized media path
    pub target: String,
}

impl MediaResource {
    /// Create a resource, inferring the MIME type from the extension and
    /// then from magic bytes.
    pub fn new(target: impl Into<String>, data: Vec<u8>) -> Self {
        let target = normalize_target(&target.into());
        let mime_type = extension_of(&target)
            .and_then(|ext| mime_for_extension(&ext))
            .or_else(|| Self::detect_mime_type(&data))
            .unwrap_or("application/octet-stream")
            .to_string();
        Self {
            data,
            mime_type,
            target,
        }
    }

    /// Get the size of the resource data in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Detect MIME type from data magic bytes.
    pub fn detect_mime_type(data: &[u8]) -> Option<&'static str> {
        if data.len() < 8 {
            return None;
        }

        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some("image/jpeg");
        }

        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
            return Some("image/png");
        }

        if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
            return Some("image/gif");
        }

        if data.starts_with(b"BM") {
            return Some("image/bmp");
        }

        // RIFF....WEBP
        if data.len() >= 12 && data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
            return Some("image/webp");
        }

        None
    }
}

/// Kind of a package relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipKind {
    /// Picture part
    Image,
    /// Embedded OLE object or package
    EmbeddedObject,
}

impl std::fmt::Display for RelationshipKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RelationshipKind::Image => write!(f, "image"),
            RelationshipKind::EmbeddedObject => write!(f, "embedded_object"),
        }
    }
}

/// A relationship from the document part to a media or object part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    /// Relationship id (e.g. "rId5")
    pub id: String,

    /// Normalized target path
    pub target: String,

    /// Relationship kind
    pub kind: RelationshipKind,
}

impl Relationship {
    /// Create a relationship, normalizing its target.
    pub fn new(id: impl Into<String>, target: &str, kind: RelationshipKind) -> Self {
        Self {
            id: id.into(),
            target: normalize_target(target),
            kind,
        }
    }
}

/// Relationships and media bytes of one document.
///
/// Built by the caller per document and passed explicitly to the markup
/// stages; nothing is cached between documents.
#[derive(Debug, Clone, Default)]
pub struct MediaContext {
    relationships: HashMap<String, Relationship>,
    media: HashMap<String, MediaResource>,
    embedded_targets: HashSet<String>,
}

impl MediaContext {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add relationships and return self.
    pub fn with_relationships(mut self, relationships: impl IntoIterator<Item = Relationship>) -> Self {
        for rel in relationships {
            self.add_relationship(rel);
        }
        self
    }

    /// Register a relationship.
    pub fn add_relationship(&mut self, rel: Relationship) {
        if rel.kind == RelationshipKind::EmbeddedObject {
            self.embedded_targets.insert(rel.target.clone());
        }
        self.relationships.insert(rel.id.clone(), rel);
    }

    /// Register media bytes under their target path.
    pub fn add_media(&mut self, target: impl Into<String>, data: Vec<u8>) {
        let resource = MediaResource::new(target, data);
        self.media.insert(resource.target.clone(), resource);
    }

    /// Add media bytes and return self.
    pub fn with_media(mut self, target: impl Into<String>, data: Vec<u8>) -> Self {
        self.add_media(target, data);
        self
    }

    /// Look up a relationship by id.
    pub fn relationship(&self, id: &str) -> Option<&Relationship> {
        self.relationships.get(id)
    }

    /// Look up media by target path.
    pub fn media(&self, target: &str) -> Option<&MediaResource> {
        self.media.get(&normalize_target(target))
    }

    /// Iterate over all relationships.
    pub fn relationships(&self) -> impl Iterator<Item = &Relationship> {
        self.relationships.values()
    }

    /// Number of registered media parts.
    pub fn media_count(&self) -> usize {
        self.media.len()
    }

    /// Check if a target is referenced by an embedded-object relationship.
    pub fn is_embedded_object_target(&self, target: &str) -> bool {
        self.embedded_targets.contains(&normalize_target(target))
    }

    /// Resolve a drawing's relationship id to a content image.
    ///
    /// Returns `None` for non-image relationships, embedded-object media,
    /// preview rasters, unsupported formats and missing bytes.
    pub fn resolve_image(&self, relationship_id: &str, position: usize) -> Option<ImageRef> {
        let rel = self.relationships.get(relationship_id)?;
        if rel.kind != RelationshipKind::Image {
            return None;
        }
        if self.embedded_targets.contains(&rel.target) {
            log::debug!("Skipping embedded object media {}", rel.target);
            return None;
        }

        let ext = extension_of(&rel.target)?;
        if PREVIEW_EXTENSIONS.contains(&ext.as_str())
            || !SUPPORTED_IMAGE_EXTENSIONS.contains(&ext.as_str())
        {
            log::debug!("Skipping non-content image {}", rel.target);
            return None;
        }

        let media = self.media.get(&rel.target)?;
        Some(ImageRef {
            relationship_id: relationship_id.to_string(),
            target: rel.target.clone(),
            position,
            mime_type: media.mime_type.clone(),
            data: media.data.clone(),
        })
    }
}

/// Normalize a relationship target to a package path under `word/`.
pub fn normalize_target(target: &str) -> String {
    let target = target.trim_start_matches('/');
    if let Some(rest) = target.strip_prefix("../") {
        format!("word/{}", rest)
    } else if target.starts_with("media/") {
        format!("word/{}", target)
    } else {
        target.to_string()
    }
}

/// Lowercased extension of a path.
pub fn extension_of(path: &str) -> Option<String> {
    let name = path.rsplit('/').next()?;
    let (_, ext) = name.rsplit_once('.')?;
    if ext.is_empty() {
        None
    } else {
        Some(ext.to_ascii_lowercase())
    }
}

/// MIME type for a supported picture extension.
pub fn mime_for_extension(ext: &str) -> Option<&'static str> {
    match ext {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "bmp" => Some("image/bmp"),
        "webp" => Some("image/webp"),
        "svg" => Some("image/svg+xml"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> MediaContext {
        MediaContext::new()
            .with_relationships([
                Relationship::new("rId1", "media/image1.png", RelationshipKind::Image),
                Relationship::new("rId2", "media/image2.emf", RelationshipKind::Image),
                Relationship::new("rId3", "media/image3.png", RelationshipKind::Image),
                Relationship::new("rId4", "media/image3.png", RelationshipKind::EmbeddedObject),
                Relationship::new("rId5", "media/missing.png", RelationshipKind::Image),
            ])
            .with_media("word/media/image1.png", vec![1, 2, 3])
            .with_media("word/media/image2.emf", vec![4])
            .with_media("word/media/image3.png", vec![5])
    }

    #[test]
    fn test_normalize_target() {
        assert_eq!(normalize_target("media/image1.png"), "word/media/image1.png");
        assert_eq!(normalize_target("../media/image1.png"), "word/media/image1.png");
        assert_eq!(normalize_target("word/media/a.png"), "word/media/a.png");
    }

    #[test]
    fn test_mime_from_extension_and_magic() {
        let res = MediaResource::new("media/a.JPG", vec![]);
        assert_eq!(res.mime_type, "image/jpeg");

        let png = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        let res = MediaResource::new("media/blob", png);
        assert_eq!(res.mime_type, "image/png");

        let res = MediaResource::new("media/blob", vec![0; 4]);
        assert_eq!(res.mime_type, "application/octet-stream");
    }

    #[test]
    fn test_resolve_image_filters() {
        let ctx = context();
        let image = ctx.resolve_image("rId1", 0).unwrap();
        assert_eq!(image.target, "word/media/image1.png");
        assert_eq!(image.mime_type, "image/png");
        assert_eq!(image.data, vec![1, 2, 3]);

        assert!(ctx.resolve_image("rId2", 0).is_none());
        assert!(ctx.resolve_image("rId3", 0).is_none());
        assert!(ctx.resolve_image("rId4", 0).is_none());
        assert!(ctx.resolve_image("rId5", 0).is_none());
        assert!(ctx.resolve_image("rId99", 0).is_none());
    }

    #[test]
    fn test_image_ref_skips_data_in_json() {
        let image = context().resolve_image("rId1", 0).unwrap();
        let json = serde_json::to_string(&image).unwrap();
        assert!(!json.contains("data"));
        assert_eq!(image.extension().as_deref(), Some("png"));
    }
}
