use folio_core::{AppError, ConfigError, LocationError, NetworkError, ReqwestErrorExt};

use crate::error::LookupError;

impl From<LookupError> for AppError {
    fn from(e: LookupError) -> Self {
        match e {
            LookupError::PermissionDenied => AppError::Location(LocationError::PermissionDenied),
            LookupError::PositionUnavailable(s) => {
                AppError::Location(LocationError::PositionUnavailable(s))
            }
            LookupError::Timeout => AppError::Location(LocationError::Timeout),
            LookupError::Unsupported(_) => AppError::Location(LocationError::Unsupported),
            LookupError::Network(e) => AppError::Network(e.into_network_error()),
            LookupError::Api { status, message } => {
                AppError::Network(NetworkError::ServerError { status, message })
            }
            LookupError::Parse(s) => AppError::Network(NetworkError::InvalidResponse(s)),
            LookupError::NotFound(s) => AppError::Location(LocationError::NotFound(s)),
            LookupError::MissingConfiguration(s) => AppError::Config(ConfigError::MissingSetting(s)),
        }
    }
}
