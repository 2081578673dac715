use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")] Database(#[from] sea_orm::DbErr),

    #[error("Invalid input: {0}")] InvalidInput(String),

    #[error("Could not understand the rule; try a different phrasing.")]
    RuleNotUnderstood,

    #[error("Alert rule not found")]
    RuleNotFound,

    #[error("Data unavailable: {0}")] DataUnavailable(String),

    #[error("Rule evaluation error: {0}")] RuleEvaluation(String),

    #[error("External service error: {0}")] External(String),

    #[error("Configuration error: {0}")] Config(String),

    #[error("Internal error: {0}")] Internal(String),
}

#[derive(serde::Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(serde::Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl AppError {
    pub fn to_error_response(&self) -> ErrorResponse {
        let (code, message, field) = match self {
            AppError::Database(e) => ("DATABASE_ERROR", e.to_string(), None),
            AppError::InvalidInput(msg) => ("INVALID_INPUT", msg.clone(), None),
            AppError::RuleNotUnderstood =>
                ("RULE_NOT_UNDERSTOOD", self.to_string(), Some("text".to_string())),
            AppError::RuleNotFound => ("RULE_NOT_FOUND", self.to_string(), None),
            AppError::DataUnavailable(msg) => ("DATA_UNAVAILABLE", msg.clone(), None),
            AppError::RuleEvaluation(msg) => ("RULE_EVALUATION_ERROR", msg.clone(), None),
            AppError::External(msg) => ("EXTERNAL_ERROR", msg.clone(), None),
            AppError::Config(msg) => ("CONFIG_ERROR", msg.clone(), None),
            AppError::Internal(msg) => ("INTERNAL_ERROR", msg.clone(), None),
        };

        ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                field,
            },
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::RuleNotFound => axum::http::StatusCode::NOT_FOUND,
            AppError::InvalidInput(_) | AppError::RuleNotUnderstood => {
                axum::http::StatusCode::BAD_REQUEST
            }
            AppError::External(_) => axum::http::StatusCode::BAD_GATEWAY,
            _ => axum::http::StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let response = self.to_error_response();
        (status, axum::Json(response)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
