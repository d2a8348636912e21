//! Image reference extraction: direct file URLs and drive share links.

use std::sync::LazyLock;

use regex::Regex;

/// An image URL found in a message, plus the surrounding text with the URL
/// removed — the caption to render alongside the image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    pub url: String,
    pub remaining_text: String,
}

/// HTTP(S) URL ending in a known image extension, with an optional query
/// string. Deliberately no trailing boundary: this mirrors the extraction
/// grammar, so text glued directly after the extension is treated as caption
/// rather than suppressing the match.
static FILE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)https?://\S+\.(?:jpg|jpeg|png|gif|bmp|webp|svg)(?:\?[^"'\s]*)?"#)
        .expect("image-url pattern compiles")
});

/// Drive share link: recognized host, one of four path shapes, a file id,
/// and any trailing `&key=value` parameters.
static DRIVE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)https?://(?:drive\.google\.com|drive\.usercontent\.google\.com)/(?:file/d/|download\?id=|uc\?id=|thumbnail\?id=)[\w-]+(?:&[^=\s]+=[^&\s]+)*",
    )
    .expect("drive-url pattern compiles")
});

/// File id from the `file/d/<id>` path shape.
static DRIVE_PATH_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)/file/d/([\w-]+)").expect("drive path-id pattern compiles"));

/// File id from the `id=<id>` query parameter (download, uc, thumbnail shapes).
static DRIVE_QUERY_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)[?&]id=([\w-]+)").expect("drive query-id pattern compiles"));

/// Find the first embedded image URL in a message.
///
/// Precedence rule: the direct file-extension grammar is tried before the
/// drive grammar. The drive pattern is greedier and, tried first, would
/// truncate a direct-file URL that happens to sit on a drive host.
/// First match wins; at most one reference per message.
pub fn extract_image(text: &str) -> Option<ImageRef> {
    let m = FILE_URL.find(text).or_else(|| DRIVE_URL.find(text))?;
    let before = text[..m.start()].trim_end();
    let after = text[m.end()..].trim_start();
    let remaining_text = format!("{before} {after}").trim().to_string();
    Some(ImageRef {
        url: m.as_str().to_string(),
        remaining_text,
    })
}

/// Whether the text embeds an image URL. Defined in terms of
/// [`extract_image`] so detection and extraction can never disagree.
pub fn contains_image(text: &str) -> bool {
    extract_image(text).is_some()
}

/// Extract the drive file identifier from a recognized drive URL: the path
/// segment after `file/d/` first, then the `id=` query parameter.
pub fn drive_file_id(url: &str) -> Option<&str> {
    DRIVE_PATH_ID
        .captures(url)
        .or_else(|| DRIVE_QUERY_ID.captures(url))
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Rebuild a direct-view URL from a drive file id. Consumers use this as a
/// one-shot fallback when the primary URL fails to load; after one failed
/// retry the image is dropped rather than retried again.
pub fn direct_view_url(id: &str) -> String {
    format!("https://drive.google.com/uc?id={id}")
}
