//! Detection of anti-bot interstitials served with a 200 status.

/// Challenge pages are small; only the head of the document is scanned.
const SCAN_BYTES: usize = 200_000;

const BLOCK_MARKERS: &[&str] = &[
    "/errors/validatecaptcha",
    "enter the characters you see below",
    "<title>robot check</title>",
    "px-captcha",
    "robot or human?",
    "cf-chl-",
    "<title>just a moment...</title>",
    "<title>attention required! | cloudflare</title>",
    "distil_r_captcha",
    "pardon our interruption",
];

/// Returns the marker that identifies `html` as a CAPTCHA or bot-check page.
pub(crate) fn detect_block_page(html: &str) -> Option<&'static str> {
    let mut end = html.len().min(SCAN_BYTES);
    while !html.is_char_boundary(end) {
        end -= 1;
    }
    let head = html[..end].to_lowercase();
    BLOCK_MARKERS.iter().copied().find(|m| head.contains(m))
}
