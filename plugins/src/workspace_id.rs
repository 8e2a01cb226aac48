//! Stable file-name-safe identifiers for workspaces.
//!
//! The id is a readable prefix from the normalized workspace path followed by
//! a digest of the full path, e.g. `/home/me/code/my app` →
//! `home-me-code-my_app-<digest>`. The prefix is lossy; the digest keeps
//! distinct paths apart.

use std::path::Path;

use uuid::Uuid;

const MAX_PREFIX_LEN: usize = 48;
const DIGEST_LEN: usize = 12;
const FALLBACK: &str = "default";

pub fn workspace_id(path: &Path) -> String {
    let full = path.to_string_lossy();
    let raw = full.to_lowercase();

    let (drive, rest) = split_drive(&raw);
    let body = sanitize(&rest.replace(['\\', '/'], "-"));

    let prefix = match (drive, body.is_empty()) {
        (Some(drive), _) => format!("{drive}--{body}"),
        (None, true) => FALLBACK.to_string(),
        (None, false) => body,
    };
    format!("{prefix}-{}", digest(&full))
}

fn digest(path: &str) -> String {
    let mut hex = Uuid::new_v5(&Uuid::NAMESPACE_URL, path.as_bytes())
        .simple()
        .to_string();
    hex.truncate(DIGEST_LEN);
    hex
}

/// Split off a Windows drive letter or a leading unix `/`.
fn split_drive(path: &str) -> (Option<char>, &str) {
    let mut chars = path.chars();
    match (chars.next(), chars.next()) {
        (Some(drive), Some(':')) if drive.is_ascii_alphabetic() => {
            (Some(drive), path.get(2..).unwrap_or("").trim_start_matches(['\\', '/']))
        }
        _ => (None, path.strip_prefix('/').unwrap_or(path)),
    }
}

fn sanitize(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        let c = if c.is_alphanumeric() || c == '-' || c == '_' {
            c
        } else {
            '_'
        };
        // Collapse runs of the same separator.
        if (c == '_' || c == '-') && out.ends_with(c) {
            continue;
        }
        out.push(c);
    }

    let mut out = out.trim_matches(['_', '-']).to_string();
    if out.len() > MAX_PREFIX_LEN {
        let mut cut = MAX_PREFIX_LEN;
        while !out.is_char_boundary(cut) {
            cut -= 1;
        }
        out.truncate(cut);
    }
    out
}
