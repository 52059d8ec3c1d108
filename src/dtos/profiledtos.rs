use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::usermodel::Profile;

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct CreateProfileDto {
    #[validate(length(min = 1, max = 150, message = "Name is required"))]
    pub name: String,

    pub age_above_18: bool,

    pub agreed_with_conditions: bool,

    #[validate(length(min = 1, max = 150, message = "City cannot be empty"))]
    pub city: Option<String>,

    #[serde(default)]
    pub speaking_languages: Vec<String>,
}

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct UpdateProfileDto {
    #[validate(length(min = 1, max = 150, message = "Name cannot be empty"))]
    pub name: Option<String>,

    #[validate(length(min = 1, max = 150, message = "City cannot be empty"))]
    pub city: Option<String>,

    pub speaking_languages: Option<Vec<String>>,

    #[validate(length(min = 1, message = "fcm_token cannot be empty"))]
    pub fcm_token: Option<String>,
}

/// Public view of a profile, stripped of notification and consent fields.
#[derive(Debug, Serialize, Deserialize)]
pub struct ShortProfileDto {
    pub id: Uuid,
    pub name: String,
    pub speaking_languages: Vec<String>,
}

impl ShortProfileDto {
    pub fn from_profile(profile: &Profile) -> Self {
        ShortProfileDto {
            id: profile.id,
            name: profile.name.to_owned(),
            speaking_languages: profile.speaking_languages.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_profile_requires_name() {
        let dto = CreateProfileDto {
            name: "".to_string(),
            age_above_18: true,
            agreed_with_conditions: true,
            ..Default::default()
        };

        assert!(dto.validate().is_err());
    }

    #[test]
    fn update_profile_rejects_empty_fcm_token() {
        let dto = UpdateProfileDto {
            fcm_token: Some("".to_string()),
            ..Default::default()
        };

        assert!(dto.validate().is_err());
    }

    #[test]
    fn update_profile_accepts_absent_fields() {
        let dto = UpdateProfileDto::default();

        assert!(dto.validate().is_ok());
    }
}
