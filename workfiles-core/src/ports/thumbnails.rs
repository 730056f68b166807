use std::path::PathBuf;

use async_trait::async_trait;
use workfiles_model::{Thumbnail, ThumbnailRequestId};

use crate::error::ThumbnailFetchError;

/// What to download: a remote image field on a tracking-service entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThumbnailRequest {
    pub url: String,
    pub entity_type: String,
    pub entity_id: i64,
    pub field: String,
}

/// Completion of a scoped thumbnail request.
#[derive(Debug)]
pub enum ThumbnailEvent {
    Completed {
        uid: ThumbnailRequestId,
        image: Thumbnail,
    },
    Failed {
        uid: ThumbnailRequestId,
        error: ThumbnailFetchError,
    },
}

impl ThumbnailEvent {
    pub fn uid(&self) -> ThumbnailRequestId {
        match self {
            ThumbnailEvent::Completed { uid, .. }
            | ThumbnailEvent::Failed { uid, .. } => *uid,
        }
    }
}

/// Non-blocking downloader: `request` returns immediately with an id and the
/// outcome later arrives as a [`ThumbnailEvent`] carrying that id.
pub trait ThumbnailDownloader: Send + Sync {
    fn request(&self, request: ThumbnailRequest) -> ThumbnailRequestId;
}

/// The actual transfer, resolving to a local image path.
#[async_trait]
pub trait ThumbnailSource: Send + Sync {
    async fn download(
        &self,
        request: &ThumbnailRequest,
    ) -> Result<PathBuf, ThumbnailFetchError>;
}
