//! Admin settings shapes.
//!
//! `api_keys` is keyed by free-form provider name. Adding a provider must not
//! require a new field here, so providers are never enumerated.

use database::validation::validate_model_id;
use database::{ProviderKeys, SystemSettings};
use serde::{Deserialize, Serialize};

use crate::{Validate, ValidationError};

/// Fields an admin wants to change; absent fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemSettingsUpdate {
    #[serde(default)]
    pub api_keys: Option<ProviderKeys>,
    #[serde(default)]
    pub active_models: Option<Vec<String>>,
}

impl Validate for SystemSettingsUpdate {
    fn validate(&self) -> Result<(), ValidationError> {
        if let Some(keys) = &self.api_keys {
            if keys.keys().any(|provider| provider.trim().is_empty()) {
                return Err(ValidationError::Empty("provider name".to_string()));
            }
        }
        if let Some(models) = &self.active_models {
            for model in models {
                validate_model_id(model)?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemSettingsOut {
    #[serde(default)]
    pub api_keys: ProviderKeys,
    #[serde(default)]
    pub active_models: Vec<String>,
}

impl From<&SystemSettings> for SystemSettingsOut {
    fn from(settings: &SystemSettings) -> Self {
        Self {
            api_keys: settings.api_keys.0.clone(),
            active_models: settings.active_models.0.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_json;
    use database::Json;

    #[test]
    fn test_unseen_provider_accepted() {
        let update = parse_json::<SystemSettingsUpdate>(
            r#"{"api_keys":{"google":"g","brand-new-provider":"k"}}"#,
        )
        .unwrap();
        let keys = update.api_keys.unwrap();
        assert_eq!(keys["brand-new-provider"], "k");
        assert!(update.active_models.is_none());
    }

    #[test]
    fn test_update_rejects_bad_entries() {
        assert!(parse_json::<SystemSettingsUpdate>(r#"{"api_keys":{" ":"k"}}"#).is_err());
        assert!(parse_json::<SystemSettingsUpdate>(r#"{"active_models":["ok",""]}"#).is_err());
        assert!(parse_json::<SystemSettingsUpdate>("{}").is_ok());
    }

    #[test]
    fn test_settings_out_defaults_and_from_entity() {
        let empty: SystemSettingsOut = serde_json::from_str("{}").unwrap();
        assert!(empty.api_keys.is_empty());
        assert!(empty.active_models.is_empty());

        let mut keys = ProviderKeys::new();
        keys.insert("openai".to_string(), "sk".to_string());
        let settings = SystemSettings {
            id: SystemSettings::SINGLETON_ID,
            api_keys: Json(keys.clone()),
            active_models: Json(vec!["gpt-4o".to_string()]),
        };
        let out = SystemSettingsOut::from(&settings);
        assert_eq!(out.api_keys, keys);
        assert_eq!(out.active_models, vec!["gpt-4o".to_string()]);
    }
}
