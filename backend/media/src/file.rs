use std::path::{Path, PathBuf};

use bytes::Bytes;

use crate::mime_detect::{detect_mime_type, resolve_media_type};
use crate::MediaError;

/// Where an image's bytes live.
#[derive(Debug, Clone)]
pub enum ImageData {
    /// Already in memory, e.g. an uploaded multipart field.
    InMemory(Bytes),
    /// On disk; read only when the contents are needed.
    OnDisk(PathBuf),
}

/// A file-like input: a name, a declared media type, and its contents.
#[derive(Debug, Clone)]
pub struct ImageFile {
    name: String,
    media_type: String,
    data: ImageData,
}

impl ImageFile {
    /// Build from uploaded bytes; an absent or generic declared type is
    /// resolved from the bytes and the name.
    pub fn from_bytes(name: impl Into<String>, declared: Option<&str>, bytes: Bytes) -> Self {
        let name = name.into();
        let media_type = resolve_media_type(declared, &name, &bytes);
        Self {
            name,
            media_type,
            data: ImageData::InMemory(bytes),
        }
    }

    /// Reference a file on disk. The media type comes from the extension;
    /// the contents are not touched until [`ImageFile::read_all`].
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self {
            name,
            media_type: detect_mime_type(path).to_string(),
            data: ImageData::OnDisk(path.to_path_buf()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    /// Read the full contents.
    pub async fn read_all(&self) -> Result<Bytes, MediaError> {
        match &self.data {
            ImageData::InMemory(bytes) => Ok(bytes.clone()),
            ImageData::OnDisk(path) => tokio::fs::read(path)
                .await
                .map(Bytes::from)
                .map_err(|source| MediaError::Unreadable {
                    name: self.name.clone(),
                    source,
                }),
        }
    }
}
