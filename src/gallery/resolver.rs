/// Slot resolution by extension probing
///
/// A slot's file name is known (`{slot}`) but its extension is not. The
/// resolver tries each candidate in priority order and settles on the first
/// one that exists.

use std::future::Future;

use super::Resolution;

/// Existence check for one candidate URL.
///
/// A `false` answer is a candidate miss, never an error.
pub trait Probe: Send + Sync + 'static {
    fn probe(&self, url: &str) -> impl Future<Output = bool> + Send;
}

/// Probe candidates on the local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct FsProbe;

impl Probe for FsProbe {
    async fn probe(&self, url: &str) -> bool {
        match tokio::fs::metadata(url).await {
            Ok(meta) => meta.is_file(),
            Err(_) => false,
        }
    }
}

/// Resolves a slot index to the first existing `{folder}/{slot}.{ext}`.
pub struct SlotResolver<P> {
    probe: P,
    folder: String,
    extensions: Vec<String>,
}

impl<P: Probe> SlotResolver<P> {
    /// Create a resolver over `folder` trying `extensions` in order
    pub fn new(probe: P, folder: impl Into<String>, extensions: Vec<String>) -> Self {
        Self {
            probe,
            folder: folder.into(),
            extensions,
        }
    }

    /// Build the candidate URL for one slot and extension
    pub fn candidate_url(&self, slot: u32, ext: &str) -> String {
        if self.folder.is_empty() {
            return format!("{}.{}", slot, ext);
        }
        format!("{}/{}.{}", self.folder.trim_end_matches('/'), slot, ext)
    }

    /// Probe the candidates for `slot` one after another.
    ///
    /// Candidates are never probed concurrently, and nothing after the first
    /// hit is attempted.
    pub async fn resolve(&self, slot: u32) -> Resolution {
        for ext in &self.extensions {
            let url = self.candidate_url(slot, ext);
            if self.probe.probe(&url).await {
                tracing::debug!(slot, url = %url, "slot resolved");
                return Resolution::Resolved(url);
            }
            tracing::trace!(slot, url = %url, "candidate miss");
        }

        tracing::debug!(slot, tried = self.extensions.len(), "slot absent");
        Resolution::Absent
    }
}
