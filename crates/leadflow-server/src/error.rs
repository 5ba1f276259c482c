use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use leadflow_core::error::LeadflowError;

// ---------------------------------------------------------------------------
// AppError — unified error type for HTTP responses
// ---------------------------------------------------------------------------

/// Unified error type for HTTP responses.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl AppError {
    /// Construct a 400 Bad Request error with the given message.
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self(LeadflowError::InvalidStatus(msg.into()).into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = if let Some(e) = self.0.downcast_ref::<LeadflowError>() {
            match e {
                LeadflowError::LeadNotFound(_)
                | LeadflowError::NoteNotFound(_)
                | LeadflowError::PlaybookNotFound(_) => StatusCode::NOT_FOUND,
                LeadflowError::PlaybookExists(_)
                | LeadflowError::AlreadyDeleted(_)
                | LeadflowError::NotDeleted(_) => StatusCode::CONFLICT,
                LeadflowError::NotInitialized
                | LeadflowError::InvalidLeadId(_)
                | LeadflowError::NameRequired
                | LeadflowError::InvalidSlug(_)
                | LeadflowError::InvalidStatus(_)
                | LeadflowError::InvalidStage(_) => StatusCode::BAD_REQUEST,
                LeadflowError::RejectedTransition { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                LeadflowError::Io(_) | LeadflowError::Yaml(_) | LeadflowError::Json(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            }
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };

        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lead_not_found_maps_to_404() {
        let err = AppError(LeadflowError::LeadNotFound("abc".into()).into());
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn playbook_exists_maps_to_409() {
        let err = AppError(LeadflowError::PlaybookExists("demo".into()).into());
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
    }

    #[test]
    fn name_required_maps_to_400() {
        let err = AppError(LeadflowError::NameRequired.into());
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn invalid_status_maps_to_400() {
        let err = AppError(LeadflowError::InvalidStatus("bogus".into()).into());
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn rejected_transition_maps_to_422() {
        let err = AppError(
            LeadflowError::RejectedTransition {
                from: "not_contacted".into(),
                to: "completed".into(),
                reason: "not a suggested transition".into(),
            }
            .into(),
        );
        assert_eq!(
            err.into_response().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn not_initialized_maps_to_400() {
        let err = AppError(LeadflowError::NotInitialized.into());
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn io_error_maps_to_500() {
        let io_err = std::io::Error::other("disk full");
        let err = AppError(LeadflowError::Io(io_err).into());
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn non_domain_error_maps_to_500() {
        let err = AppError(anyhow::anyhow!("something unexpected"));
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn response_body_is_json() {
        let err = AppError(LeadflowError::LeadNotFound("abc".into()).into());
        let response = err.into_response();
        let ct = response
            .headers()
            .get(axum::http::header::CONTENT_TYPE)
            .expect("should have content-type");
        assert!(ct.to_str().unwrap().contains("application/json"));
    }
}
