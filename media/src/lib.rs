//! Blob storage collaborator contract.
//!
//! Videos, evidence frames, and thumbnails live in an external object store.
//! Keys are opaque strings with a fixed layout; a key resolves to a public
//! URL by prefix substitution, and back again. This crate models only the
//! contract plus an in-memory implementation; the production backend is an
//! external collaborator.

use sidequest_types::{ClaimId, UserId};
use std::collections::BTreeMap;
use std::sync::Mutex;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("media backend error: {0}")]
    Backend(String),
}

/// One evidence frame, ready to hand to the multimodal analyzer.
#[derive(Clone, Debug)]
pub struct Frame {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

/// The storage key for a video blob.
pub fn video_key(user: &UserId, file_id: &str) -> String {
    format!("videos/{user}/{file_id}")
}

/// The storage key for an evidence frame.
pub fn frame_key(claim: &ClaimId, index: u32) -> String {
    format!("frames/{claim}/frame_{index:03}.jpg")
}

/// The storage key for a claim's thumbnail.
pub fn thumbnail_key(claim: &ClaimId) -> String {
    format!("thumbnails/{claim}.jpg")
}

/// Trait for the blob storage collaborator.
pub trait MediaStore: Send + Sync {
    /// Store a video blob; returns its public URL.
    fn put_video(
        &self,
        user: &UserId,
        file_id: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, MediaError>;

    /// Fetch a video blob by key. `None` if absent.
    fn get_video(&self, key: &str) -> Result<Option<Vec<u8>>, MediaError>;

    /// Store one evidence frame; returns its key.
    fn put_frame(&self, claim: &ClaimId, index: u32, bytes: Vec<u8>) -> Result<String, MediaError>;

    /// All evidence frames for a claim, in index order. Possibly empty.
    fn get_frames(&self, claim: &ClaimId) -> Result<Vec<Frame>, MediaError>;

    /// Store a claim's thumbnail; returns its public URL.
    fn put_thumbnail(&self, claim: &ClaimId, bytes: Vec<u8>) -> Result<String, MediaError>;

    /// Strip the public URL prefix back to a storage key.
    fn video_key_from_url(&self, url: &str) -> String;
}

/// In-memory media store for tests and dev runs.
pub struct MemoryMediaStore {
    objects: Mutex<BTreeMap<String, (Vec<u8>, String)>>,
    public_url: String,
}

impl MemoryMediaStore {
    pub fn new(public_url: impl Into<String>) -> Self {
        Self {
            objects: Mutex::new(BTreeMap::new()),
            public_url: public_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url_for(&self, key: &str) -> String {
        format!("{}/{key}", self.public_url)
    }
}

impl MediaStore for MemoryMediaStore {
    fn put_video(
        &self,
        user: &UserId,
        file_id: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, MediaError> {
        let key = video_key(user, file_id);
        self.objects
            .lock()
            .unwrap()
            .insert(key.clone(), (bytes, content_type.to_string()));
        Ok(self.url_for(&key))
    }

    fn get_video(&self, key: &str) -> Result<Option<Vec<u8>>, MediaError> {
        Ok(self
            .objects
            .lock()
            .unwrap()
            .get(key)
            .map(|(bytes, _)| bytes.clone()))
    }

    fn put_frame(&self, claim: &ClaimId, index: u32, bytes: Vec<u8>) -> Result<String, MediaError> {
        let key = frame_key(claim, index);
        self.objects
            .lock()
            .unwrap()
            .insert(key.clone(), (bytes, "image/jpeg".to_string()));
        Ok(key)
    }

    fn get_frames(&self, claim: &ClaimId) -> Result<Vec<Frame>, MediaError> {
        let prefix = format!("frames/{claim}/");
        // BTreeMap range keeps frames in index order via the zero-padded key.
        Ok(self
            .objects
            .lock()
            .unwrap()
            .range(prefix.clone()..)
            .take_while(|(k, _)| k.starts_with(&prefix))
            .map(|(_, (bytes, mime))| Frame {
                bytes: bytes.clone(),
                mime_type: mime.clone(),
            })
            .collect())
    }

    fn put_thumbnail(&self, claim: &ClaimId, bytes: Vec<u8>) -> Result<String, MediaError> {
        let key = thumbnail_key(claim);
        self.objects
            .lock()
            .unwrap()
            .insert(key.clone(), (bytes, "image/jpeg".to_string()));
        Ok(self.url_for(&key))
    }

    fn video_key_from_url(&self, url: &str) -> String {
        url.strip_prefix(&format!("{}/", self.public_url))
            .unwrap_or(url)
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claim() -> ClaimId {
        ClaimId::new("c1")
    }

    #[test]
    fn video_round_trips_through_url() {
        let store = MemoryMediaStore::new("https://cdn.example.com/");
        let url = store
            .put_video(&UserId::new("u1"), "f1", b"video-bytes".to_vec(), "video/mp4")
            .unwrap();
        assert_eq!(url, "https://cdn.example.com/videos/u1/f1");

        let key = store.video_key_from_url(&url);
        assert_eq!(key, "videos/u1/f1");
        assert_eq!(store.get_video(&key).unwrap().unwrap(), b"video-bytes");
    }

    #[test]
    fn missing_video_is_none() {
        let store = MemoryMediaStore::new("https://cdn.example.com");
        assert!(store.get_video("videos/u1/missing").unwrap().is_none());
    }

    #[test]
    fn frames_come_back_in_index_order() {
        let store = MemoryMediaStore::new("https://cdn.example.com");
        store.put_frame(&claim(), 2, vec![2]).unwrap();
        store.put_frame(&claim(), 0, vec![0]).unwrap();
        store.put_frame(&claim(), 1, vec![1]).unwrap();

        let frames = store.get_frames(&claim()).unwrap();
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[0].bytes, vec![0]);
        assert_eq!(frames[2].bytes, vec![2]);
    }

    #[test]
    fn frames_do_not_leak_across_claims() {
        let store = MemoryMediaStore::new("https://cdn.example.com");
        store.put_frame(&ClaimId::new("c1"), 0, vec![1]).unwrap();
        store.put_frame(&ClaimId::new("c10"), 0, vec![2]).unwrap();

        let frames = store.get_frames(&ClaimId::new("c1")).unwrap();
        assert_eq!(frames.len(), 1);
    }

    #[test]
    fn frame_keys_are_zero_padded() {
        assert_eq!(frame_key(&claim(), 7), "frames/c1/frame_007.jpg");
        assert_eq!(frame_key(&claim(), 123), "frames/c1/frame_123.jpg");
    }

    #[test]
    fn foreign_url_passes_through_unchanged() {
        let store = MemoryMediaStore::new("https://cdn.example.com");
        assert_eq!(
            store.video_key_from_url("https://other.host/videos/u/f"),
            "https://other.host/videos/u/f"
        );
    }
}
