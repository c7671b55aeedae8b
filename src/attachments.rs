use serde::Serialize;

/// Rendering hint for a message attachment. Classification never feeds
/// access control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentKind {
    Image,
    Pdf,
    Other,
}

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "avif", "svg", "bmp"];

pub fn classify_content_type(content_type: &str) -> AttachmentKind {
    let ct = content_type
        .split(';')
        .next()
        .unwrap_or(content_type)
        .trim()
        .to_ascii_lowercase();
    if ct == "application/pdf" {
        AttachmentKind::Pdf
    } else if ct.starts_with("image/") {
        AttachmentKind::Image
    } else {
        AttachmentKind::Other
    }
}

pub fn classify_extension(url: &str) -> AttachmentKind {
    let path = url
        .split(['?', '#'])
        .next()
        .unwrap_or(url)
        .rsplit('/')
        .next()
        .unwrap_or(url);
    let ext = match path.rsplit_once('.') {
        Some((_, e)) if !e.is_empty() => e.to_ascii_lowercase(),
        _ => return AttachmentKind::Other,
    };
    if ext == "pdf" {
        AttachmentKind::Pdf
    } else if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        AttachmentKind::Image
    } else {
        AttachmentKind::Other
    }
}

/// Canonical signal is a HEAD content-type probe; the filename extension is
/// only consulted when the probe fails or the header is missing.
pub async fn classify_url(client: &reqwest::Client, url: &str) -> AttachmentKind {
    match client.head(url).send().await {
        Ok(resp) => match resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
        {
            Some(ct) => classify_content_type(ct),
            None => classify_extension(url),
        },
        Err(e) => {
            log::debug!("attachment probe failed for {url}: {e}");
            classify_extension(url)
        }
    }
}
