//! Upload folder constraints
//!
//! Every upload targets a named folder. The folder name is both the storage path
//! prefix on the backend and the key into the constraint table below. Lookup is
//! total: folders missing from the table resolve to [`DEFAULT_FOLDER_CONFIG`].

use serde::Serialize;

const BYTES_PER_MB: u64 = 1024 * 1024;

const IMAGE_MIME_BASIC: &[&str] = &["image/jpeg", "image/jpg", "image/png"];
const IMAGE_MIME_ALL: &[&str] = &[
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "image/webp",
];
const IMAGE_MIME_BRANDING: &[&str] = &[
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/svg+xml",
    "image/webp",
];
const IMAGE_MIME_WEB: &[&str] = &["image/jpeg", "image/jpg", "image/png", "image/webp"];
const IMAGE_MIME_ANIMATED: &[&str] = &["image/jpeg", "image/jpg", "image/png", "image/gif"];
const DOCUMENT_MIME: &[&str] = &["application/pdf", "image/jpeg", "image/jpg", "image/png"];
const CSV_MIME: &[&str] = &["text/csv", "application/vnd.ms-excel"];

/// Size and type constraints for one upload folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderConfig {
    /// Maximum file size in megabytes (1 MB = 1024 * 1024 bytes)
    pub max_size_mb: u64,
    /// Human-readable type labels, in display order
    pub accepted_types: &'static [&'static str],
    /// Accepted MIME types
    pub mime_types: &'static [&'static str],
}

impl FolderConfig {
    pub const fn max_size_bytes(&self) -> u64 {
        self.max_size_mb * BYTES_PER_MB
    }

    pub fn accepts_mime(&self, mime_type: &str) -> bool {
        self.mime_types.iter().any(|m| *m == mime_type)
    }

    /// Accepted labels joined for error messages, e.g. `JPEG, PNG`.
    pub fn accepted_types_label(&self) -> String {
        self.accepted_types.join(", ")
    }
}

/// Applied to any folder name the table does not know.
pub const DEFAULT_FOLDER_CONFIG: FolderConfig = FolderConfig {
    max_size_mb: 5,
    accepted_types: &["JPEG", "PNG"],
    mime_types: &["image/jpeg", "image/png"],
};

const BUILTIN_FOLDERS: &[(&str, FolderConfig)] = &[
    (
        "profile-images",
        FolderConfig {
            max_size_mb: 5,
            accepted_types: &["JPEG", "PNG", "GIF", "WebP"],
            mime_types: IMAGE_MIME_ALL,
        },
    ),
    (
        "student-images",
        FolderConfig {
            max_size_mb: 5,
            accepted_types: &["JPEG", "PNG"],
            mime_types: IMAGE_MIME_BASIC,
        },
    ),
    (
        "institute-images",
        FolderConfig {
            max_size_mb: 10,
            accepted_types: &["JPEG", "PNG", "SVG", "WebP"],
            mime_types: IMAGE_MIME_BRANDING,
        },
    ),
    (
        "organization-images",
        FolderConfig {
            max_size_mb: 10,
            accepted_types: &["JPEG", "PNG", "SVG", "WebP"],
            mime_types: IMAGE_MIME_BRANDING,
        },
    ),
    (
        "subject-images",
        FolderConfig {
            max_size_mb: 5,
            accepted_types: &["JPEG", "PNG", "WebP"],
            mime_types: IMAGE_MIME_WEB,
        },
    ),
    (
        "card-images",
        FolderConfig {
            max_size_mb: 5,
            accepted_types: &["JPEG", "PNG"],
            mime_types: IMAGE_MIME_BASIC,
        },
    ),
    (
        "lecture-covers",
        FolderConfig {
            max_size_mb: 10,
            accepted_types: &["JPEG", "PNG", "WebP"],
            mime_types: IMAGE_MIME_WEB,
        },
    ),
    (
        "notification-images",
        FolderConfig {
            max_size_mb: 5,
            accepted_types: &["JPEG", "PNG", "GIF"],
            mime_types: IMAGE_MIME_ANIMATED,
        },
    ),
    (
        "homework-files",
        FolderConfig {
            max_size_mb: 20,
            accepted_types: &["PDF", "JPEG", "PNG"],
            mime_types: DOCUMENT_MIME,
        },
    ),
    (
        "correction-files",
        FolderConfig {
            max_size_mb: 20,
            accepted_types: &["PDF", "JPEG", "PNG"],
            mime_types: DOCUMENT_MIME,
        },
    ),
    (
        "structured-lecture-documents",
        FolderConfig {
            max_size_mb: 20,
            accepted_types: &["PDF", "JPEG", "PNG"],
            mime_types: DOCUMENT_MIME,
        },
    ),
    (
        "payment-slips",
        FolderConfig {
            max_size_mb: 10,
            accepted_types: &["PDF", "JPEG", "PNG"],
            mime_types: DOCUMENT_MIME,
        },
    ),
    (
        "id-documents",
        FolderConfig {
            max_size_mb: 10,
            accepted_types: &["PDF", "JPEG", "PNG"],
            mime_types: DOCUMENT_MIME,
        },
    ),
    (
        "bulk-imports",
        FolderConfig {
            max_size_mb: 10,
            accepted_types: &["CSV"],
            mime_types: CSV_MIME,
        },
    ),
];

/// Immutable folder name to constraint mapping.
#[derive(Debug, Clone, Copy)]
pub struct FolderTable {
    entries: &'static [(&'static str, FolderConfig)],
    fallback: FolderConfig,
}

impl FolderTable {
    /// Table of every folder the backend issues signed URLs for.
    pub const fn builtin() -> Self {
        Self {
            entries: BUILTIN_FOLDERS,
            fallback: DEFAULT_FOLDER_CONFIG,
        }
    }

    pub const fn new(
        entries: &'static [(&'static str, FolderConfig)],
        fallback: FolderConfig,
    ) -> Self {
        Self { entries, fallback }
    }

    /// Resolve a folder's constraints. Exact, case-sensitive match; never fails.
    pub fn get(&self, folder: &str) -> &FolderConfig {
        self.entries
            .iter()
            .find(|(name, _)| *name == folder)
            .map(|(_, config)| config)
            .unwrap_or(&self.fallback)
    }

    pub fn contains(&self, folder: &str) -> bool {
        self.entries.iter().any(|(name, _)| *name == folder)
    }

    pub fn fallback(&self) -> &FolderConfig {
        &self.fallback
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &FolderConfig)> + '_ {
        self.entries.iter().map(|(name, config)| (*name, config))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for FolderTable {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_folders_resolve() {
        let table = FolderTable::builtin();

        let profile = table.get("profile-images");
        assert_eq!(profile.max_size_mb, 5);
        assert_eq!(profile.accepted_types, &["JPEG", "PNG", "GIF", "WebP"]);

        let institute = table.get("institute-images");
        assert_eq!(institute.max_size_mb, 10);
        assert!(institute.accepts_mime("image/svg+xml"));

        let homework = table.get("homework-files");
        assert_eq!(homework.max_size_mb, 20);
        assert!(homework.accepts_mime("application/pdf"));

        let lecture_docs = table.get("structured-lecture-documents");
        assert_eq!(lecture_docs.max_size_mb, 20);
        assert_eq!(lecture_docs.accepted_types, &["PDF", "JPEG", "PNG"]);
    }

    #[test]
    fn unknown_folder_falls_back_to_default() {
        let table = FolderTable::builtin();
        let config = table.get("no-such-folder");
        assert_eq!(*config, DEFAULT_FOLDER_CONFIG);
        assert_eq!(config.max_size_mb, 5);
        assert_eq!(config.accepted_types, &["JPEG", "PNG"]);
        assert!(!table.contains("no-such-folder"));
    }

    #[test]
    fn lookup_is_case_sensitive() {
        let table = FolderTable::builtin();
        assert_eq!(*table.get("Homework-Files"), DEFAULT_FOLDER_CONFIG);
    }

    #[test]
    fn max_size_bytes_uses_binary_megabytes() {
        assert_eq!(DEFAULT_FOLDER_CONFIG.max_size_bytes(), 5 * 1024 * 1024);
        assert_eq!(
            FolderTable::builtin().get("homework-files").max_size_bytes(),
            20_971_520
        );
    }

    #[test]
    fn every_builtin_label_list_is_non_empty() {
        let table = FolderTable::builtin();
        assert!(!table.is_empty());
        for (name, config) in table.iter() {
            assert!(!config.accepted_types.is_empty(), "{} has no labels", name);
            assert!(!config.mime_types.is_empty(), "{} has no MIME types", name);
        }
    }

    #[test]
    fn custom_table_uses_its_own_fallback() {
        const ENTRIES: &[(&str, FolderConfig)] = &[(
            "avatars",
            FolderConfig {
                max_size_mb: 1,
                accepted_types: &["PNG"],
                mime_types: &["image/png"],
            },
        )];
        const FALLBACK: FolderConfig = FolderConfig {
            max_size_mb: 2,
            accepted_types: &["PDF"],
            mime_types: &["application/pdf"],
        };
        let table = FolderTable::new(ENTRIES, FALLBACK);
        assert_eq!(table.get("avatars").max_size_mb, 1);
        assert_eq!(*table.get("other"), FALLBACK);
        assert_eq!(table.len(), 1);
    }
}
