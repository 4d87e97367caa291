//! User profile and onboarding data models.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The finalized record handed to the identity holder when onboarding ends.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub email: String,
    pub full_name: String,
    /// Display reference for the profile image, empty until onboarding completes.
    pub image_ref: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl UserProfile {
    /// Whether this is a finalized profile rather than the empty placeholder.
    pub fn is_complete(&self) -> bool {
        self.completed_at.is_some()
    }
}

/// An uploaded file as handed over by the host's file picker.
#[derive(Clone)]
pub struct ImageFile {
    pub file_name: String,
    /// Content type reported by the picker, if any.
    pub mime_type: Option<String>,
    pub data: Vec<u8>,
}

impl ImageFile {
    pub fn new(file_name: impl Into<String>, mime_type: Option<&str>, data: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.map(String::from),
            data,
        }
    }

    /// Wrap bytes read from `path`, guessing the content type from its
    /// extension.
    pub fn from_path(path: &Path, data: Vec<u8>) -> Self {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::new(file_name, mime_guess::from_path(path).first_raw(), data)
    }
}

impl std::fmt::Debug for ImageFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageFile")
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field("len", &self.data.len())
            .finish()
    }
}

/// Stable reference to an accepted image, renderable by the host.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageRef(String);

impl ImageRef {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ImageRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_profile_is_empty_placeholder() {
        let p = UserProfile::default();
        assert!(p.email.is_empty());
        assert!(p.full_name.is_empty());
        assert!(p.image_ref.is_empty());
        assert!(!p.is_complete());
    }

    #[test]
    fn profile_json_omits_missing_completion_time() {
        let json = serde_json::to_value(UserProfile::default()).unwrap();
        assert!(json.get("completed_at").is_none());
        assert_eq!(json["email"], "");
    }

    #[test]
    fn completed_profile_serde_roundtrip() {
        let profile = UserProfile {
            email: "jane@example.com".into(),
            full_name: "Jane Doe".into(),
            image_ref: "blob:onboarding/abc".into(),
            completed_at: Some(Utc::now()),
        };
        let json = serde_json::to_string(&profile).unwrap();
        let parsed: UserProfile = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, profile);
        assert!(parsed.is_complete());
    }

    #[test]
    fn image_file_debug_hides_bytes() {
        let file = ImageFile::new("me.png", Some("image/png"), vec![0x89, 0x50, 0x4e, 0x47]);
        let debug = format!("{file:?}");
        assert!(debug.contains("me.png"));
        assert!(debug.contains("len: 4"));
    }

    #[test]
    fn image_ref_serializes_as_plain_string() {
        let r = ImageRef::new("blob:onboarding/1");
        assert_eq!(serde_json::to_string(&r).unwrap(), "\"blob:onboarding/1\"");
        assert_eq!(r.to_string(), "blob:onboarding/1");
    }

    #[test]
    fn content_type_is_guessed_from_extension() {
        for name in ["a.png", "a.JPG", "a.bmp", "a.tiff", "a.ico", "a.webp", "a.svg"] {
            let file = ImageFile::from_path(Path::new(name), Vec::new());
            let mime = file.mime_type.unwrap_or_default();
            assert!(mime.starts_with("image/"), "{name} guessed as {mime:?}");
        }
    }

    #[test]
    fn from_path_keeps_file_name_and_flags_non_images() {
        let file = ImageFile::from_path(Path::new("/tmp/docs/cv.pdf"), vec![1, 2]);
        assert_eq!(file.file_name, "cv.pdf");
        assert_eq!(file.mime_type.as_deref(), Some("application/pdf"));
        assert_eq!(file.data, vec![1, 2]);

        let bare = ImageFile::from_path(Path::new("avatar"), Vec::new());
        assert!(bare.mime_type.is_none());
    }
}
