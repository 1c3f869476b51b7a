use analytics::AnalyticsError;
use api_client::error::ApiError;
use core_types::CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ViewError {
    #[error("The request was cancelled.")]
    Cancelled,

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Input(#[from] CoreError),

    #[error(transparent)]
    Analytics(#[from] AnalyticsError),

    #[error("The backend rejected the job: {0}")]
    Rejected(String),
}
