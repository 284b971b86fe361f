use crate::config::{ConfigError, ConfigProvider, SheetCredentials};
use crate::sync::{RowStore, SheetError};
use crate::view::ContactView;

/// Configured/unconfigured gate around the contact view.
///
/// No sheet call is made until both a sheet id and an API key are known.
/// `connect` turns stored credentials into a store.
pub struct Session<P, S, F> {
    provider: P,
    connect: F,
    view: Option<ContactView<S>>,
    notice: Option<String>,
}

impl<P, S, F> Session<P, S, F>
where
    P: ConfigProvider,
    S: RowStore,
    F: Fn(&SheetCredentials) -> Result<S, SheetError>,
{
    /// Read stored configuration and, when complete, load the contacts.
    /// Unreadable configuration leaves the session unconfigured with the
    /// error as its notice.
    pub async fn start(provider: P, connect: F) -> Self {
        let stored = provider.load().await;
        let mut session = Self {
            provider,
            connect,
            view: None,
            notice: None,
        };
        match stored {
            Ok(Some(credentials)) => session.activate(&credentials).await,
            Ok(None) => log::info!("No sheet configured yet"),
            Err(e) => {
                log::warn!("Could not read stored configuration: {}", e);
                session.notice = Some(format!("Error: {}", e));
            }
        }
        session
    }

    async fn activate(&mut self, credentials: &SheetCredentials) {
        match (self.connect)(credentials) {
            Ok(store) => {
                log::info!("Connecting to sheet {}", credentials.sheet_id);
                let mut view = ContactView::new(store);
                view.reload().await;
                self.view = Some(view);
                self.notice = None;
            }
            Err(e) => {
                log::error!("Failed to set up sheet client: {}", e);
                self.notice = Some(format!("Error: {}", e));
            }
        }
    }

    pub fn is_configured(&self) -> bool {
        self.view.is_some()
    }

    pub fn view(&self) -> Option<&ContactView<S>> {
        self.view.as_ref()
    }

    pub fn view_mut(&mut self) -> Option<&mut ContactView<S>> {
        self.view.as_mut()
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// The view's status once configured, otherwise the setup notice.
    pub fn status_text(&self) -> Option<&str> {
        match &self.view {
            Some(view) => view.status_text().or(self.notice.as_deref()),
            None => self.notice.as_deref(),
        }
    }

    /// Persist new credentials and switch to the configured state.
    /// Returns `Ok(false)` when either value is missing.
    pub async fn save_configuration(
        &mut self,
        sheet_id: &str,
        api_key: &str,
    ) -> Result<bool, ConfigError> {
        let Some(credentials) = SheetCredentials::new(sheet_id, api_key) else {
            self.notice = Some("Please enter both Sheet ID and API Key".to_string());
            return Ok(false);
        };

        if let Err(e) = self.provider.save(&credentials).await {
            log::warn!("Failed to save configuration: {}", e);
            self.notice = Some(format!("Error: {}", e));
            return Err(e);
        }
        self.notice = Some("Configuration saved! Loading contacts...".to_string());
        self.activate(&credentials).await;
        Ok(self.view.is_some())
    }

    /// Forget stored credentials and drop every loaded contact.
    /// The contacts are dropped even when clearing the store fails.
    pub async fn reset_configuration(&mut self) -> Result<(), ConfigError> {
        self.view = None;
        self.notice = None;
        if let Err(e) = self.provider.clear().await {
            log::warn!("Failed to clear stored configuration: {}", e);
            self.notice = Some(format!("Error: {}", e));
            return Err(e);
        }
        Ok(())
    }
}
