// SPDX-FileCopyrightText: 2026 Linkrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request-scoped storage for preview images.
//!
//! A source message's photo (or document) is downloaded when its links are
//! queued and kept until the owning request settles. Entries are keyed by
//! request id, never by link text, so two requests for the same link own
//! separate copies.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use linkrelay_core::{InboundMessage, MediaBlob, MediaKind, RelayError, Transport};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::PipelineError;
use crate::request::RequestId;

/// Ownership record for a preserved preview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThumbnailHandle {
    pub owner: RequestId,
    pub kind: MediaKind,
    pub file_name: String,
}

/// Acquisition and release counters. Once every request has settled,
/// `acquired == released`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ThumbnailStats {
    pub acquired: u64,
    pub released: u64,
}

impl ThumbnailStats {
    pub fn live(&self) -> u64 {
        self.acquired.saturating_sub(self.released)
    }
}

enum Backing {
    Memory(Mutex<HashMap<RequestId, Vec<u8>>>),
    Disk(PathBuf),
}

pub struct ThumbnailStore {
    backing: Backing,
    acquired: AtomicU64,
    released: AtomicU64,
}

impl ThumbnailStore {
    /// Keeps previews in an in-process blob map.
    pub fn in_memory() -> Self {
        Self::with_backing(Backing::Memory(Mutex::new(HashMap::new())))
    }

    /// Keeps previews as files under `dir`, creating it if needed.
    ///
    /// Previews left behind by an earlier process are deleted; no request
    /// from that run can still own them.
    pub fn on_disk(dir: impl Into<PathBuf>) -> Result<Self, RelayError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        let swept = sweep_stale(&dir)?;
        if swept > 0 {
            info!(dir = %dir.display(), count = swept, "removed stale thumbnails");
        }
        Ok(Self::with_backing(Backing::Disk(dir)))
    }

    fn with_backing(backing: Backing) -> Self {
        Self {
            backing,
            acquired: AtomicU64::new(0),
            released: AtomicU64::new(0),
        }
    }

    /// Downloads and keeps the preview carried by `message`, owned by `owner`.
    ///
    /// Messages without a photo or document, and failed downloads, yield
    /// `None`; the request then publishes text-only.
    pub async fn capture(
        &self,
        transport: &dyn Transport,
        message: &InboundMessage,
        owner: RequestId,
    ) -> Option<ThumbnailHandle> {
        let attachment = message.attachment.as_ref()?;
        if !attachment.kind.is_preview() {
            debug!(kind = %attachment.kind, "attachment is not a preview, skipping capture");
            return None;
        }

        let bytes = match transport.fetch_media(message).await {
            Ok(bytes) => bytes,
            Err(e) => {
                let err = PipelineError::ThumbnailUnavailable {
                    reason: e.to_string(),
                };
                warn!(request_id = %owner, error = %err, "continuing without thumbnail");
                return None;
            }
        };

        let file_name = attachment
            .file_name
            .clone()
            .unwrap_or_else(|| default_file_name(attachment.kind).to_string());

        self.insert(owner, attachment.kind, file_name, bytes).await
    }

    /// Gives `owner` its own copy of an existing preview.
    pub async fn copy_for(
        &self,
        handle: &ThumbnailHandle,
        owner: RequestId,
    ) -> Option<ThumbnailHandle> {
        match self.resolve(handle).await {
            Ok(blob) => self.insert(owner, blob.kind, blob.file_name, blob.bytes).await,
            Err(e) => {
                warn!(request_id = %owner, error = %e, "could not copy thumbnail");
                None
            }
        }
    }

    async fn insert(
        &self,
        owner: RequestId,
        kind: MediaKind,
        file_name: String,
        bytes: Vec<u8>,
    ) -> Option<ThumbnailHandle> {
        let stored = match &self.backing {
            Backing::Memory(map) => {
                map.lock().await.insert(owner, bytes);
                Ok(())
            }
            Backing::Disk(dir) => tokio::fs::write(blob_path(dir, owner), bytes).await,
        };

        if let Err(e) = stored {
            warn!(request_id = %owner, error = %e, "failed to persist thumbnail");
            return None;
        }

        self.acquired.fetch_add(1, Ordering::Relaxed);
        debug!(request_id = %owner, kind = %kind, "thumbnail captured");
        Some(ThumbnailHandle {
            owner,
            kind,
            file_name,
        })
    }

    /// Loads the preview for publication.
    pub async fn resolve(&self, handle: &ThumbnailHandle) -> Result<MediaBlob, RelayError> {
        let bytes = match &self.backing {
            Backing::Memory(map) => map.lock().await.get(&handle.owner).cloned().ok_or_else(|| {
                RelayError::Media {
                    message: format!("thumbnail for {} is not held", handle.owner),
                }
            })?,
            Backing::Disk(dir) => tokio::fs::read(blob_path(dir, handle.owner)).await?,
        };

        Ok(MediaBlob {
            kind: handle.kind,
            file_name: handle.file_name.clone(),
            bytes,
        })
    }

    /// Deletes the preview. Safe on absent or already-released handles.
    pub async fn release(&self, handle: Option<&ThumbnailHandle>) {
        let Some(handle) = handle else {
            return;
        };

        let removed = match &self.backing {
            Backing::Memory(map) => map.lock().await.remove(&handle.owner).is_some(),
            Backing::Disk(dir) => match tokio::fs::remove_file(blob_path(dir, handle.owner)).await {
                Ok(()) => true,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
                Err(e) => {
                    warn!(request_id = %handle.owner, error = %e, "failed to delete thumbnail");
                    false
                }
            },
        };

        if removed {
            self.released.fetch_add(1, Ordering::Relaxed);
            debug!(request_id = %handle.owner, "thumbnail released");
        }
    }

    pub fn stats(&self) -> ThumbnailStats {
        ThumbnailStats {
            acquired: self.acquired.load(Ordering::Relaxed),
            released: self.released.load(Ordering::Relaxed),
        }
    }
}

fn blob_path(dir: &Path, owner: RequestId) -> PathBuf {
    dir.join(format!("{owner}.bin"))
}

fn sweep_stale(dir: &Path) -> Result<usize, RelayError> {
    let mut swept = 0;
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "bin") {
            std::fs::remove_file(&path)?;
            swept += 1;
        }
    }
    Ok(swept)
}

fn default_file_name(kind: MediaKind) -> &'static str {
    match kind {
        MediaKind::Photo => "thumbnail.jpg",
        _ => "thumbnail",
    }
}
