use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::taskdb::OfferWithHelperRow;
use crate::models::marketplacemodel::{EventType, OfferStatus, Task};
use crate::service::error::MarketplaceError;

pub const MAX_DATETIME_OPTIONS: usize = 3;
pub const MAX_ADDRESS_LENGTH: usize = 128;

/// Typed create-task command. The owner never appears here: it is taken
/// from the authenticated profile by the handler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTaskDto {
    pub service: Uuid,
    pub datetime_known: bool,
    #[serde(default)]
    pub datetime_options: Vec<DateTime<Utc>>,
    pub event_type: EventType,
    pub address: Option<String>,
    pub price_offer: i32,
}

impl CreateTaskDto {
    /// Business-rule validation, run in a fixed order so each violation
    /// surfaces as its own distinct error.
    pub fn validate_rules(&self, now: DateTime<Utc>) -> Result<(), MarketplaceError> {
        self.validate_datetime_options(now)?;
        self.validate_event_type_address()?;
        self.validate_price_offer()?;
        Ok(())
    }

    fn validate_datetime_options(&self, now: DateTime<Utc>) -> Result<(), MarketplaceError> {
        if self.datetime_known {
            if self.datetime_options.is_empty() {
                return Err(MarketplaceError::DatetimeOptionsRequired);
            }

            if self.datetime_options.len() > MAX_DATETIME_OPTIONS {
                return Err(MarketplaceError::TooManyDatetimeOptions);
            }

            if self.datetime_options.iter().any(|option| *option <= now) {
                return Err(MarketplaceError::DatetimeOptionsNotInFuture);
            }
        } else if !self.datetime_options.is_empty() {
            return Err(MarketplaceError::DatetimeOptionsMustBeEmpty);
        }

        Ok(())
    }

    fn validate_event_type_address(&self) -> Result<(), MarketplaceError> {
        let address = self.address.as_deref().unwrap_or("");

        match self.event_type {
            EventType::Online => {
                if !address.is_empty() {
                    return Err(MarketplaceError::AddressForbiddenForOnline);
                }
            }
            EventType::Offline => {
                if address.is_empty() {
                    return Err(MarketplaceError::AddressRequiredForOffline);
                }

                if address.len() > MAX_ADDRESS_LENGTH {
                    return Err(MarketplaceError::AddressTooLong);
                }
            }
        }

        Ok(())
    }

    fn validate_price_offer(&self) -> Result<(), MarketplaceError> {
        if self.price_offer <= 0 {
            return Err(MarketplaceError::PriceOfferNotPositive);
        }

        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HelperRefDto {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OfferWithHelperDto {
    pub id: Uuid,
    pub helper: HelperRefDto,
    pub status: OfferStatus,
    pub created_at: DateTime<Utc>,
}

impl OfferWithHelperDto {
    pub fn from_row(row: &OfferWithHelperRow) -> Self {
        OfferWithHelperDto {
            id: row.id,
            helper: HelperRefDto {
                id: row.helper_id,
                name: row.helper_name.to_owned(),
            },
            status: row.status,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TaskWithOffersDto {
    pub id: Uuid,
    pub owner: Option<Uuid>,
    pub service: Uuid,
    pub datetime_known: bool,
    pub datetime_options: Vec<DateTime<Utc>>,
    pub event_type: EventType,
    pub address: Option<String>,
    pub price_offer: i32,
    pub created_at: DateTime<Utc>,
    pub offers: Vec<OfferWithHelperDto>,
}

impl TaskWithOffersDto {
    pub fn from_task(task: &Task, offers: &[OfferWithHelperRow]) -> Self {
        TaskWithOffersDto {
            id: task.id,
            owner: task.owner_id,
            service: task.service_id,
            datetime_known: task.datetime_known,
            datetime_options: task.datetime_options.clone(),
            event_type: task.event_type,
            address: task.address.clone(),
            price_offer: task.price_offer,
            created_at: task.created_at,
            offers: offers.iter().map(OfferWithHelperDto::from_row).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn base_dto() -> CreateTaskDto {
        CreateTaskDto {
            service: Uuid::new_v4(),
            datetime_known: false,
            datetime_options: vec![],
            event_type: EventType::Online,
            address: None,
            price_offer: 25,
        }
    }

    fn now() -> DateTime<Utc> {
        "2025-06-01T12:00:00Z".parse().unwrap()
    }

    #[test]
    fn valid_online_task_passes() {
        assert!(base_dto().validate_rules(now()).is_ok());
    }

    #[test]
    fn datetime_options_required_when_known() {
        let dto = CreateTaskDto {
            datetime_known: true,
            ..base_dto()
        };

        assert!(matches!(
            dto.validate_rules(now()),
            Err(MarketplaceError::DatetimeOptionsRequired)
        ));
    }

    #[test]
    fn datetime_options_must_be_in_the_future() {
        let dto = CreateTaskDto {
            datetime_known: true,
            datetime_options: vec![now() - Duration::days(1)],
            ..base_dto()
        };

        assert!(matches!(
            dto.validate_rules(now()),
            Err(MarketplaceError::DatetimeOptionsNotInFuture)
        ));
    }

    #[test]
    fn at_most_three_datetime_options() {
        let future = now() + Duration::days(1);
        let dto = CreateTaskDto {
            datetime_known: true,
            datetime_options: vec![future, future, future, future],
            ..base_dto()
        };

        assert!(matches!(
            dto.validate_rules(now()),
            Err(MarketplaceError::TooManyDatetimeOptions)
        ));
    }

    #[test]
    fn datetime_options_forbidden_when_unknown() {
        let dto = CreateTaskDto {
            datetime_known: false,
            datetime_options: vec![now() + Duration::days(1)],
            ..base_dto()
        };

        assert!(matches!(
            dto.validate_rules(now()),
            Err(MarketplaceError::DatetimeOptionsMustBeEmpty)
        ));
    }

    #[test]
    fn online_task_rejects_address() {
        let dto = CreateTaskDto {
            address: Some("Main street 1".to_string()),
            ..base_dto()
        };

        assert!(matches!(
            dto.validate_rules(now()),
            Err(MarketplaceError::AddressForbiddenForOnline)
        ));
    }

    #[test]
    fn offline_task_requires_address() {
        let dto = CreateTaskDto {
            event_type: EventType::Offline,
            address: None,
            ..base_dto()
        };

        assert!(matches!(
            dto.validate_rules(now()),
            Err(MarketplaceError::AddressRequiredForOffline)
        ));
    }

    #[test]
    fn offline_address_has_max_length() {
        let dto = CreateTaskDto {
            event_type: EventType::Offline,
            address: Some("a".repeat(MAX_ADDRESS_LENGTH + 1)),
            ..base_dto()
        };

        assert!(matches!(
            dto.validate_rules(now()),
            Err(MarketplaceError::AddressTooLong)
        ));
    }

    #[test]
    fn price_offer_must_be_positive() {
        for price in [0, -5] {
            let dto = CreateTaskDto {
                price_offer: price,
                ..base_dto()
            };

            assert!(matches!(
                dto.validate_rules(now()),
                Err(MarketplaceError::PriceOfferNotPositive)
            ));
        }
    }

    #[test]
    fn rules_run_in_declared_order() {
        // Both the datetime rule and the price rule are violated; the
        // datetime error must win.
        let dto = CreateTaskDto {
            datetime_known: true,
            price_offer: 0,
            ..base_dto()
        };

        assert!(matches!(
            dto.validate_rules(now()),
            Err(MarketplaceError::DatetimeOptionsRequired)
        ));
    }
}
