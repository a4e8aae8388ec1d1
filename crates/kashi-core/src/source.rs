//! Image sources: files picked by the user and blobs produced by edits.

/// MIME type of every blob produced by the exporter.
pub const JPEG_MIME: &str = "image/jpeg";

/// A file chosen through the native file picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    /// File name as reported by the picker (e.g. `"IMG_0042.HEIC"`).
    pub name: String,
    /// Declared MIME type (may be empty when the platform does not know it).
    pub mime: String,
    /// Raw file contents.
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            bytes,
        }
    }
}

/// Encoded image bytes produced by an edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedBlob {
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl EncodedBlob {
    /// Wrap JPEG bytes.
    pub fn jpeg(bytes: Vec<u8>) -> Self {
        Self {
            mime: JPEG_MIME.to_string(),
            bytes,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Content of one listing photo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// Untouched file from the picker.
    File(SelectedFile),
    /// Output of a saved edit.
    Blob(EncodedBlob),
}

impl ImageSource {
    pub fn bytes(&self) -> &[u8] {
        match self {
            ImageSource::File(file) => &file.bytes,
            ImageSource::Blob(blob) => &blob.bytes,
        }
    }

    pub fn mime(&self) -> &str {
        match self {
            ImageSource::File(file) => &file.mime,
            ImageSource::Blob(blob) => &blob.mime,
        }
    }

    /// True once the content has been replaced by an edit.
    pub fn is_edited(&self) -> bool {
        matches!(self, ImageSource::Blob(_))
    }

    /// File extension used for storage keys.
    ///
    /// Known image MIME types win; otherwise the picked file's own extension
    /// is used, and `"jpg"` as the last resort.
    pub fn extension(&self) -> String {
        let from_mime = match self.mime() {
            "image/jpeg" | "image/jpg" => Some("jpg"),
            "image/png" => Some("png"),
            "image/webp" => Some("webp"),
            "image/gif" => Some("gif"),
            "image/heic" => Some("heic"),
            _ => None,
        };
        if let Some(ext) = from_mime {
            return ext.to_string();
        }
        match self {
            ImageSource::File(file) => file
                .name
                .rsplit_once('.')
                .map(|(_, ext)| ext.to_ascii_lowercase())
                .filter(|ext| !ext.is_empty())
                .unwrap_or_else(|| "jpg".to_string()),
            ImageSource::Blob(_) => "jpg".to_string(),
        }
    }
}

impl From<SelectedFile> for ImageSource {
    fn from(file: SelectedFile) -> Self {
        ImageSource::File(file)
    }
}

impl From<EncodedBlob> for ImageSource {
    fn from(blob: EncodedBlob) -> Self {
        ImageSource::Blob(blob)
    }
}
