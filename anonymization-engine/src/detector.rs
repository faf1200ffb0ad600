use async_trait::async_trait;

use crate::allow_list::AllowList;
use crate::entity::DetectedSpan;
use crate::error::DetectionError;

/// Entity recognition engine consumed by the orchestrator.
///
/// Implementations return character-offset spans into `text`. Terms in
/// `allow_list` must not be reported.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EntityDetector: Send + Sync {
    async fn detect(&self, text: &str, allow_list: &AllowList) -> Result<Vec<DetectedSpan>, DetectionError>;
}
