use thiserror::Error;

use crate::FetchError;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("invalid module source: {0}")]
    Invalid(String),
    #[error("module source unavailable: {0}")]
    Unavailable(String),
    #[error("fetch failed")]
    Fetch(#[source] FetchError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[derive(Debug, Error)]
pub enum InstallError {
    #[error("module '{0}' is already installed; pass overwrite to replace it")]
    AlreadyInstalled(String),
    #[error("invalid module source: {0}")]
    InvalidSource(String),
    #[error("fetch failed")]
    FetchFailed(#[source] FetchError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[derive(Debug, Error)]
pub enum UpdateError {
    #[error("module '{0}' is not installed")]
    NotInstalled(String),
    #[error("module source unavailable: {0}")]
    SourceUnavailable(String),
    #[error("invalid module source: {0}")]
    InvalidSource(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[derive(Debug, Error)]
pub enum UninstallError {
    #[error("module '{0}' is not installed")]
    NotInstalled(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<SourceError> for InstallError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::Invalid(reason) => Self::InvalidSource(reason),
            SourceError::Unavailable(reason) => Self::InvalidSource(reason),
            SourceError::Fetch(err) => Self::FetchFailed(err),
            SourceError::Internal(err) => Self::Internal(err),
        }
    }
}

impl From<SourceError> for UpdateError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::Invalid(reason) => Self::InvalidSource(reason),
            SourceError::Unavailable(reason) => Self::SourceUnavailable(reason),
            SourceError::Fetch(err) => Self::SourceUnavailable(format!("{err}")),
            SourceError::Internal(err) => Self::Internal(err),
        }
    }
}
