/// The recognized image formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Jpg,
    Jpeg,
    Png,
    Gif,
    Webp,
}

impl ImageFormat {
    /// Probe order when looking up a level image; the first match wins.
    pub const PROBE_ORDER: [ImageFormat; 5] = [
        ImageFormat::Jpg,
        ImageFormat::Jpeg,
        ImageFormat::Png,
        ImageFormat::Gif,
        ImageFormat::Webp,
    ];

    /// File extension including the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpg => ".jpg",
            Self::Jpeg => ".jpeg",
            Self::Png => ".png",
            Self::Gif => ".gif",
            Self::Webp => ".webp",
        }
    }

    /// Map an upload content type to the stored format.
    ///
    /// Returns `None` for anything that is not `image/*`. Unrecognized image
    /// types are stored as `.jpg`, which mislabels e.g. `image/bmp` content.
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let mime = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        if !mime.starts_with("image/") {
            return None;
        }
        Some(match mime.as_str() {
            "image/png" => Self::Png,
            "image/gif" => Self::Gif,
            "image/webp" => Self::Webp,
            _ => Self::Jpg,
        })
    }
}
