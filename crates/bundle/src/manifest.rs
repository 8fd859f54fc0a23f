//! manifest.json codec
//!
//! The in-memory [`ExportManifest`] uses this crate's domain names. The
//! document written to the archive uses a separate set of wire structs whose
//! field names are the stable contract, so renaming a Rust field never changes
//! the format.

use crate::archive::ArchiveReader;
use crate::error::{BundleError, BundleResult};
use crate::types::{paths, MANIFEST_FORMAT_VERSION};
use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use storybundle_core::{
    CollectionDescriptor, CollectionMetadata, LanguageDescriptor, OwnerDescriptor, OwnerType,
    TextDirection,
};

/// Metadata record embedded in every archive
#[derive(Debug, Clone, PartialEq)]
pub struct ExportManifest {
    /// Manifest format version
    pub format_version: String,
    /// Name of the exporting application
    pub app_name: String,
    /// Version of the exporting application
    pub app_version: String,
    /// When the archive was produced
    pub exported_at: DateTime<Utc>,
    /// The collection contained in the archive
    pub collection: CollectionDescriptor,
    /// Publisher, when known
    pub owner: Option<OwnerDescriptor>,
    /// Language of the collection
    pub language: LanguageDescriptor,
}

impl ExportManifest {
    /// Create a manifest stamped with the current format version and time
    pub fn new(
        app_name: impl Into<String>,
        app_version: impl Into<String>,
        collection: CollectionDescriptor,
        owner: Option<OwnerDescriptor>,
        language: LanguageDescriptor,
    ) -> Self {
        Self {
            format_version: MANIFEST_FORMAT_VERSION.to_string(),
            app_name: app_name.into(),
            app_version: app_version.into(),
            exported_at: Utc::now().trunc_subsecs(3),
            collection,
            owner,
            language,
        }
    }

    /// Whether this codec's format version matches exactly
    pub fn is_supported_format(&self) -> bool {
        self.format_version == MANIFEST_FORMAT_VERSION
    }
}

/// Reads and writes manifest.json
pub struct ManifestCodec;

impl ManifestCodec {
    /// Serialize to pretty-printed JSON
    pub fn encode(manifest: &ExportManifest) -> BundleResult<String> {
        let doc = ManifestDocument::from(manifest);
        Ok(serde_json::to_string_pretty(&doc)?)
    }

    /// Parse JSON text
    ///
    /// Any shape problem is [`BundleError::InvalidManifest`].
    pub fn decode(json: &str) -> BundleResult<ExportManifest> {
        let doc: ManifestDocument =
            serde_json::from_str(json).map_err(|e| BundleError::invalid_manifest(e.to_string()))?;

        if CollectionDescriptor::split_id(&doc.collection.id).is_none() {
            return Err(BundleError::invalid_manifest(format!(
                "collection id '{}' is not of the form owner/name",
                doc.collection.id
            )));
        }

        Ok(doc.into())
    }

    /// Locate and parse the manifest entry of an opened archive
    pub fn read_from(reader: &ArchiveReader) -> BundleResult<ExportManifest> {
        let data = reader
            .read_bytes(paths::MANIFEST)
            .ok_or(BundleError::MissingManifest)?;
        let json = std::str::from_utf8(data)
            .map_err(|e| BundleError::invalid_manifest(format!("not UTF-8: {}", e)))?;
        Self::decode(json)
    }
}

// =============================================================================
// Wire format
// =============================================================================

#[derive(Debug, Serialize, Deserialize)]
struct ManifestDocument {
    #[serde(rename = "manifestFormatVersion")]
    manifest_format_version: String,
    #[serde(rename = "appName", default)]
    app_name: String,
    #[serde(rename = "appVersion", default)]
    app_version: String,
    #[serde(rename = "exportedDate", default)]
    exported_date: DateTime<Utc>,
    collection: CollectionSection,
    #[serde(
        rename = "repositoryOwner",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    repository_owner: Option<OwnerSection>,
    language: LanguageSection,
}

#[derive(Debug, Serialize, Deserialize)]
struct CollectionSection {
    id: String,
    owner_username: String,
    language_code: String,
    display_name: String,
    version: String,
    #[serde(default)]
    image_set_id: String,
    last_updated_timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    metadata: Option<CollectionMetadata>,
}

#[derive(Debug, Serialize, Deserialize)]
struct OwnerSection {
    username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    avatar_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    location: Option<String>,
    #[serde(default)]
    owner_type: OwnerType,
}

#[derive(Debug, Serialize, Deserialize)]
struct LanguageSection {
    lc: String,
    #[serde(default)]
    ln: String,
    #[serde(default)]
    ang: String,
    #[serde(default)]
    ld: TextDirection,
    #[serde(default)]
    gw: bool,
    #[serde(default)]
    hc: String,
    #[serde(default)]
    lr: String,
    #[serde(default)]
    pk: Option<u64>,
    #[serde(default)]
    alt: Vec<String>,
    #[serde(default)]
    cc: Vec<String>,
}

impl From<&ExportManifest> for ManifestDocument {
    fn from(m: &ExportManifest) -> Self {
        let c = &m.collection;
        Self {
            manifest_format_version: m.format_version.clone(),
            app_name: m.app_name.clone(),
            app_version: m.app_version.clone(),
            exported_date: m.exported_at,
            collection: CollectionSection {
                id: c.id.clone(),
                owner_username: c.owner_username.clone(),
                language_code: c.language_code.clone(),
                display_name: c.display_name.clone(),
                version: c.version.clone(),
                image_set_id: c.image_set_id.clone(),
                last_updated_timestamp: c.last_updated,
                metadata: (!c.metadata.is_empty()).then(|| c.metadata.clone()),
            },
            repository_owner: m.owner.as_ref().map(|o| OwnerSection {
                username: o.username.clone(),
                full_name: o.full_name.clone(),
                avatar_url: o.avatar_url.clone(),
                description: o.description.clone(),
                website: o.website.clone(),
                location: o.location.clone(),
                owner_type: o.owner_type,
            }),
            language: LanguageSection {
                lc: m.language.code.clone(),
                ln: m.language.native_name.clone(),
                ang: m.language.english_name.clone(),
                ld: m.language.direction,
                gw: m.language.is_gateway,
                hc: m.language.home_country.clone(),
                lr: m.language.region.clone(),
                pk: m.language.catalog_id,
                alt: m.language.alternate_names.clone(),
                cc: m.language.country_codes.clone(),
            },
        }
    }
}

impl From<ManifestDocument> for ExportManifest {
    fn from(doc: ManifestDocument) -> Self {
        let c = doc.collection;
        let l = doc.language;
        Self {
            format_version: doc.manifest_format_version,
            app_name: doc.app_name,
            app_version: doc.app_version,
            exported_at: doc.exported_date,
            collection: CollectionDescriptor {
                id: c.id,
                owner_username: c.owner_username,
                language_code: c.language_code,
                display_name: c.display_name,
                version: c.version,
                image_set_id: c.image_set_id,
                last_updated: c.last_updated_timestamp,
                metadata: c.metadata.unwrap_or_default(),
            },
            owner: doc.repository_owner.map(|o| OwnerDescriptor {
                username: o.username,
                full_name: o.full_name,
                avatar_url: o.avatar_url,
                description: o.description,
                website: o.website,
                location: o.location,
                owner_type: o.owner_type,
            }),
            language: LanguageDescriptor {
                code: l.lc,
                native_name: l.ln,
                english_name: l.ang,
                direction: l.ld,
                is_gateway: l.gw,
                home_country: l.hc,
                region: l.lr,
                catalog_id: l.pk,
                alternate_names: l.alt,
                country_codes: l.cc,
            },
        }
    }
}
