use thiserror::Error;
use uuid::Uuid;

use crate::error::{ErrorMessage, HttpError};
use axum::http::StatusCode;

/// One variant per business rule so every violation carries its own
/// message and status.
#[derive(Error, Debug)]
pub enum MarketplaceError {
    // Task creation rules
    #[error("datetime_options is required when datetime_known is true")]
    DatetimeOptionsRequired,

    #[error("All datetime_options should be in the future")]
    DatetimeOptionsNotInFuture,

    #[error("No more than 3 datetime_options are allowed")]
    TooManyDatetimeOptions,

    #[error("For datetime_known=false datetime_options should be empty")]
    DatetimeOptionsMustBeEmpty,

    #[error("For event_type=online address shouldn't be present")]
    AddressForbiddenForOnline,

    #[error("For event_type=offline address is required")]
    AddressRequiredForOffline,

    #[error("Address must be at most 128 characters")]
    AddressTooLong,

    #[error("price_offer should be greater than 0")]
    PriceOfferNotPositive,

    #[error("Service {0} does not exist")]
    UnknownService(Uuid),

    // Offer lifecycle rules
    #[error("Task {0} does not exist")]
    UnknownTask(Uuid),

    #[error("You can not offer to help your own task")]
    SelfOffer,

    #[error("Only one offer is allowed per task.")]
    DuplicateOffer,

    #[error("You are blocked by the task owner")]
    BlockedPair,

    // Acceptance workflow rules
    #[error("Offer {0} not found")]
    OfferNotFound(Uuid),

    #[error("You cannot accept another offer for another user's task.")]
    NotTaskOwner,

    #[error("You cannot set status=accepted because there is already accepted offer for this task.")]
    SiblingOfferAccepted,

    // Lookups
    #[error("Task {0} not found")]
    TaskNotFound(Uuid),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl MarketplaceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            MarketplaceError::DatetimeOptionsRequired
            | MarketplaceError::DatetimeOptionsNotInFuture
            | MarketplaceError::TooManyDatetimeOptions
            | MarketplaceError::DatetimeOptionsMustBeEmpty
            | MarketplaceError::AddressForbiddenForOnline
            | MarketplaceError::AddressRequiredForOffline
            | MarketplaceError::AddressTooLong
            | MarketplaceError::PriceOfferNotPositive
            | MarketplaceError::UnknownService(_)
            | MarketplaceError::UnknownTask(_)
            | MarketplaceError::SelfOffer
            | MarketplaceError::DuplicateOffer
            | MarketplaceError::NotTaskOwner
            | MarketplaceError::SiblingOfferAccepted => StatusCode::BAD_REQUEST,

            MarketplaceError::BlockedPair => StatusCode::FORBIDDEN,

            MarketplaceError::OfferNotFound(_) | MarketplaceError::TaskNotFound(_) => {
                StatusCode::NOT_FOUND
            }

            MarketplaceError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<MarketplaceError> for HttpError {
    fn from(error: MarketplaceError) -> Self {
        let message = match &error {
            // Storage details stay in the logs, not in responses
            MarketplaceError::Database(e) => {
                tracing::error!("Database error: {}", e);
                "Internal server error".to_string()
            }
            _ => error.to_string(),
        };

        HttpError::new(message, error.status_code())
    }
}

/// Participant checks share one message with the generic permission error.
pub fn permission_denied() -> HttpError {
    HttpError::forbidden(ErrorMessage::PermissionDenied.to_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offer_rule_violations_are_bad_requests() {
        assert_eq!(
            MarketplaceError::SelfOffer.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            MarketplaceError::DuplicateOffer.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            MarketplaceError::NotTaskOwner.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            MarketplaceError::SiblingOfferAccepted.status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn blocked_pair_is_forbidden() {
        assert_eq!(
            MarketplaceError::BlockedPair.status_code(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn lookups_map_to_not_found() {
        let id = Uuid::new_v4();
        assert_eq!(
            MarketplaceError::OfferNotFound(id).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            MarketplaceError::TaskNotFound(id).status_code(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn messages_match_the_api_contract() {
        assert_eq!(
            MarketplaceError::SelfOffer.to_string(),
            "You can not offer to help your own task"
        );
        assert_eq!(
            MarketplaceError::DuplicateOffer.to_string(),
            "Only one offer is allowed per task."
        );
        assert_eq!(
            MarketplaceError::BlockedPair.to_string(),
            "You are blocked by the task owner"
        );
        assert_eq!(
            MarketplaceError::NotTaskOwner.to_string(),
            "You cannot accept another offer for another user's task."
        );
        assert_eq!(
            MarketplaceError::SiblingOfferAccepted.to_string(),
            "You cannot set status=accepted because there is already accepted offer for this task."
        );
    }

    #[test]
    fn database_errors_do_not_leak_details() {
        let error = MarketplaceError::Database(sqlx::Error::PoolTimedOut);
        let http: HttpError = error.into();
        assert_eq!(http.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(http.message, "Internal server error");
    }
}
