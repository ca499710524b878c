use regex::Regex;
use sha1::{Digest, Sha1};
use std::sync::LazyLock;

const ANONYMOUS_NAMESPACE: &str = "anonymous";
const FALLBACK_FILENAME: &str = "file";
const FALLBACK_USER: &str = "user";
/// Hex digits of the id digest appended to a folder that needed sanitizing.
const USER_DIGEST_LEN: usize = 16;

static UNSAFE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9]+").expect("static pattern"));

/// Replaces every run of non-alphanumeric characters with `_`.
pub fn sanitize_segment(raw: &str) -> String {
    UNSAFE_CHARS
        .replace_all(raw, "_")
        .trim_matches('_')
        .to_string()
}

/// Sanitized file stem; the extension is dropped since the provider detects
/// the format itself.
pub fn sanitize_filename(filename: Option<&str>) -> String {
    let name = filename.unwrap_or_default().trim();
    let stem = match name.rfind('.') {
        Some(idx) if idx > 0 && !name[idx + 1..].contains(['/', '\\']) => &name[..idx],
        _ => name,
    };
    let clean = sanitize_segment(stem);
    if clean.is_empty() {
        FALLBACK_FILENAME.to_string()
    } else {
        clean
    }
}

/// Folder holding one user's assets.
///
/// Purely alphanumeric ids are used as they are. Any other id is sanitized and
/// suffixed with a digest of the raw id, so two ids never share a folder:
/// only suffixed folders contain `_`, and the digest tells suffixed ones apart.
pub fn namespace(root: &str, user_id: Option<&str>) -> String {
    let root = root.trim_end_matches('/');
    match user_id.map(str::trim).filter(|id| !id.is_empty()) {
        None => format!("{}/{}", root, ANONYMOUS_NAMESPACE),
        Some(id) if id.chars().all(|c| c.is_ascii_alphanumeric()) => format!("{}/{}", root, id),
        Some(id) => {
            let clean = sanitize_segment(id);
            let label = if clean.is_empty() { FALLBACK_USER } else { clean.as_str() };
            format!("{}/{}_{}", root, label, user_digest(id))
        }
    }
}

fn user_digest(user_id: &str) -> String {
    let digest = hex::encode(Sha1::digest(user_id.as_bytes()));
    digest[..USER_DIGEST_LEN].to_string()
}

/// `{namespace}/{timestamp_ms}_{filename}`.
pub fn asset_public_id(namespace: &str, filename: Option<&str>, timestamp_ms: i64) -> String {
    format!("{}/{}_{}", namespace, timestamp_ms, sanitize_filename(filename))
}

pub fn belongs_to(namespace: &str, public_id: &str) -> bool {
    public_id
        .strip_prefix(namespace)
        .is_some_and(|rest| rest.starts_with('/') && rest.len() > 1)
}
