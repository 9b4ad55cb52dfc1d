//! Archive entry naming.

use std::collections::{HashMap, HashSet};

use reqwest::Url;

/// Name used when a URL has no usable path segment.
const FALLBACK_NAME: &str = "file";

/// Derive the entry base name from a URL's final path segment.
///
/// Query strings and fragments are ignored and the segment is
/// percent-decoded. Characters that would create directories inside the
/// archive are replaced.
pub fn entry_base_name(url: &str) -> String {
    let segment = match Url::parse(url) {
        Ok(parsed) => parsed
            .path_segments()
            .and_then(|mut segments| segments.rfind(|s| !s.is_empty()).map(str::to_string)),
        Err(_) => url
            .split(['?', '#'])
            .next()
            .and_then(|path| path.rsplit('/').find(|s| !s.is_empty()))
            .map(str::to_string),
    };

    let decoded = match segment {
        Some(raw) => urlencoding::decode(&raw)
            .map(|s| s.into_owned())
            .unwrap_or_else(|_| raw.clone()),
        None => return FALLBACK_NAME.to_string(),
    };

    let cleaned: String = decoded
        .chars()
        .map(|c| if matches!(c, '/' | '\\') || c.is_control() { '_' } else { c })
        .collect();

    if cleaned.is_empty() || cleaned == "." || cleaned == ".." {
        FALLBACK_NAME.to_string()
    } else {
        cleaned
    }
}

/// Split `name` into stem and extension (including the dot).
fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) => name.split_at(idx),
        None => (name, ""),
    }
}

/// Assigns unique entry names within one archive.
///
/// The first occurrence of a base name is kept as is; later occurrences get
/// ` (1)`, ` (2)`, ... inserted before the extension, counted per base name.
#[derive(Debug, Default)]
pub struct EntryNamer {
    occurrences: HashMap<String, usize>,
    used: HashSet<String>,
}

impl EntryNamer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve a unique name for an entry whose base name is `base`.
    pub fn assign(&mut self, base: &str) -> String {
        let count = self.occurrences.entry(base.to_string()).or_insert(0);
        let mut candidate = base.to_string();

        if *count > 0 || self.used.contains(&candidate) {
            let (stem, ext) = split_extension(base);
            let mut n = (*count).max(1);
            loop {
                candidate = format!("{} ({}){}", stem, n, ext);
                if !self.used.contains(&candidate) {
                    break;
                }
                n += 1;
            }
        }

        *count += 1;
        self.used.insert(candidate.clone());
        candidate
    }
}
