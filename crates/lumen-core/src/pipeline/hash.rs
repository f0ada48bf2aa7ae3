//! Result-cache keys.

use std::fmt;

use blake3::Hasher;

use crate::types::AnalysisOptions;

/// Cache key covering the image bytes and the full request configuration.
///
/// Two requests share a key only if their bytes are identical and their
/// canonical options (sorted metric set plus edge mode) match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey(blake3::Hash);

impl CacheKey {
    pub fn new(data: &[u8], options: &AnalysisOptions) -> Self {
        let mut hasher = Hasher::new();
        hasher.update(data);
        hasher.update(b"|");
        hasher.update(options.canonical().as_bytes());
        Self(hasher.finalize())
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.to_hex().as_str())
    }
}
