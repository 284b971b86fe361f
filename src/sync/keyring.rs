use std::collections::HashMap;

use crate::config::ConfigError;

pub(crate) const SERVICE_NAME: &str = "sheetbook";
const KEYRING_ACCOUNT: &str = "google-sheets-api-key";

fn attributes() -> HashMap<&'static str, &'static str> {
    let mut attrs = HashMap::new();
    attrs.insert("service", SERVICE_NAME);
    attrs.insert("account", KEYRING_ACCOUNT);
    attrs
}

async fn open() -> Result<oo7::Keyring, ConfigError> {
    oo7::Keyring::new()
        .await
        .map_err(|e| ConfigError::Keyring(format!("Failed to connect to keyring: {}", e)))
}

/// Store the Google API key in the system keyring via Secret Service.
pub async fn store_api_key(key: &str) -> Result<(), ConfigError> {
    let keyring = open().await?;

    keyring
        .create_item(
            "Sheetbook Google API Key",
            &attributes(),
            key.as_bytes(),
            true, // replace existing
        )
        .await
        .map_err(|e| ConfigError::Keyring(format!("Failed to store API key: {}", e)))?;

    Ok(())
}

/// Load the Google API key from the system keyring.
pub async fn load_api_key() -> Result<Option<String>, ConfigError> {
    let keyring = open().await?;

    let items = keyring
        .search_items(&attributes())
        .await
        .map_err(|e| ConfigError::Keyring(format!("Failed to search keyring: {}", e)))?;

    if let Some(item) = items.first() {
        let secret_bytes = item
            .secret()
            .await
            .map_err(|e| ConfigError::Keyring(format!("Failed to read secret: {}", e)))?;
        let key = String::from_utf8(secret_bytes.to_vec())
            .map_err(|e| ConfigError::Keyring(format!("Invalid UTF-8 in secret: {}", e)))?;
        if !key.is_empty() {
            return Ok(Some(key));
        }
    }

    Ok(None)
}

/// Remove every stored API key.
pub async fn delete_api_key() -> Result<(), ConfigError> {
    let keyring = open().await?;

    let items = keyring
        .search_items(&attributes())
        .await
        .map_err(|e| ConfigError::Keyring(format!("Failed to search keyring: {}", e)))?;

    for item in items {
        item.delete()
            .await
            .map_err(|e| ConfigError::Keyring(format!("Failed to delete API key: {}", e)))?;
    }

    Ok(())
}
