//! Video upload and activity recognition.

use axum::extract::{Multipart, State};
use axum::Json;
use serde::Serialize;
use tracing::{debug, info};

use harec_models::{
    ActivityLabel, ActivityScore, ScoreProvenance, ValidationError, VideoSource, MAX_UPLOAD_BYTES,
    VIDEO_MIME_PREFIX,
};
use harec_pipeline::RecognitionOutcome;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Multipart field carrying the video.
pub const VIDEO_FIELD: &str = "video";

/// One ranked activity as shown to users.
#[derive(Debug, Serialize)]
pub struct ActivityResult {
    pub label: ActivityLabel,
    pub confidence: f32,
    /// Confidence to one decimal place
    pub display: String,
    #[serde(rename = "isTop")]
    pub is_top: bool,
}

impl From<&ActivityScore> for ActivityResult {
    fn from(score: &ActivityScore) -> Self {
        Self {
            label: score.label,
            confidence: score.confidence,
            display: score.display_confidence(),
            is_top: score.is_top,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecognizeResponse {
    pub activities: Vec<ActivityResult>,
    pub top_activity: Option<ActivityLabel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provenance: Option<ScoreProvenance>,
}

impl RecognizeResponse {
    pub fn from_outcome(outcome: &RecognitionOutcome, expose_provenance: bool) -> Self {
        Self {
            activities: outcome.scores.iter().map(ActivityResult::from).collect(),
            top_activity: outcome.top().map(|s| s.label),
            provenance: expose_provenance.then_some(outcome.provenance),
        }
    }
}

/// Recognize activities in an uploaded clip.
pub async fn recognize(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<RecognizeResponse>> {
    let source = read_video_field(&mut multipart).await?;
    info!(
        file_name = %source.file_name(),
        size = source.size(),
        content_type = %source.content_type(),
        "Received video upload"
    );

    let outcome = state.recognizer.recognize(&source).await?;
    drop(source);

    let expose = state.recognizer.config().expose_provenance;
    Ok(Json(RecognizeResponse::from_outcome(&outcome, expose)))
}

/// Read the `video` field, rejecting wrong types and oversize uploads
/// without buffering more than the upload limit.
async fn read_video_field(multipart: &mut Multipart) -> ApiResult<VideoSource> {
    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some(VIDEO_FIELD) {
            debug!(field = ?field.name(), "Skipping multipart field");
            continue;
        }

        let file_name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        if !content_type.starts_with(VIDEO_MIME_PREFIX) {
            return Err(ValidationError::InvalidType { content_type }.into());
        }

        let mut bytes = Vec::new();
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| ApiError::bad_request(format!("Failed to read upload: {}", e)))?
        {
            let size = (bytes.len() + chunk.len()) as u64;
            if size > MAX_UPLOAD_BYTES {
                return Err(ValidationError::TooLarge {
                    size,
                    max: MAX_UPLOAD_BYTES,
                }
                .into());
            }
            bytes.extend_from_slice(&chunk);
        }

        return Ok(VideoSource::new(file_name, content_type, bytes));
    }

    Err(ApiError::bad_request(format!(
        "Missing '{}' file field",
        VIDEO_FIELD
    )))
}
