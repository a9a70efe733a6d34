use base64::Engine;

/// Sniff an image's mime type from its bytes, falling back to the declared
/// `image/*` type and finally to `image/png`.
pub fn image_mime<'a>(bytes: &[u8], declared: Option<&'a str>) -> &'a str {
    match image::guess_format(bytes) {
        Ok(format) => format.to_mime_type(),
        Err(_) => declared
            .filter(|ct| ct.starts_with("image/"))
            .unwrap_or("image/png"),
    }
}

pub fn data_url(mime: &str, bytes: &[u8]) -> String {
    format!(
        "data:{};base64,{}",
        mime,
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}
