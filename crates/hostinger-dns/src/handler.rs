//! Challenge handler driven by the certificate client
//!
//! The handler owns the credentials and lazily builds a single
//! [`ZoneRecordManager`] the first time a challenge is created or destroyed.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::api::ZoneApi;
use crate::credentials::Credentials;
use crate::error::ChallengeError;
use crate::hostinger::{ClientOptions, HostingerClient};
use crate::manager::ZoneRecordManager;
use crate::observer::{ChallengeObserver, TracingObserver};

pub const DESCRIPTION: &str =
    "Obtain certificates using a DNS TXT record (if you are using Hostinger for DNS).";

const MORE_INFO: &str = "This plugin configures a DNS TXT record to respond to a dns-01 \
                         challenge using the Hostinger API.";

/// TTL of challenge records, in seconds
pub const DEFAULT_TTL: u32 = 60;

/// Builds the provider API from loaded credentials
pub type ApiFactory =
    Box<dyn Fn(&Credentials) -> Result<Arc<dyn ZoneApi>, ChallengeError> + Send + Sync>;

enum ClientState {
    Uninitialized,
    Ready(Arc<ZoneRecordManager>),
}

/// Answers DNS-01 challenges by creating and removing TXT records
pub struct ChallengeHandler {
    ttl: u32,
    credentials: Option<Credentials>,
    factory: ApiFactory,
    observer: Arc<dyn ChallengeObserver>,
    client: Mutex<ClientState>,
}

impl ChallengeHandler {
    /// Handler talking to the Hostinger API
    pub fn new(options: ClientOptions) -> Self {
        Self::with_api_factory(move |credentials: &Credentials| {
            let client = HostingerClient::new(credentials.api_token(), &options).map_err(|e| {
                ChallengeError::configuration(format!(
                    "Could not initialize Hostinger API client: {}",
                    e
                ))
            })?;
            Ok(Arc::new(client) as Arc<dyn ZoneApi>)
        })
    }

    /// Handler using a custom provider API
    pub fn with_api_factory<F>(factory: F) -> Self
    where
        F: Fn(&Credentials) -> Result<Arc<dyn ZoneApi>, ChallengeError> + Send + Sync + 'static,
    {
        Self {
            ttl: DEFAULT_TTL,
            credentials: None,
            factory: Box::new(factory),
            observer: Arc::new(TracingObserver),
            client: Mutex::new(ClientState::Uninitialized),
        }
    }

    pub fn with_ttl(mut self, ttl: u32) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn ChallengeObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn ttl(&self) -> u32 {
        self.ttl
    }

    pub fn more_info(&self) -> &'static str {
        MORE_INFO
    }

    /// Install the credentials used to build the API client
    ///
    /// Replacing credentials discards any client built from the old ones.
    pub fn setup_credentials(&mut self, credentials: Credentials) {
        tracing::debug!("Credentials set up");
        self.credentials = Some(credentials);
        *self.client.get_mut() = ClientState::Uninitialized;
    }

    pub fn is_prepared(&self) -> bool {
        self.credentials.is_some()
    }

    /// The zone record manager, built on first use
    pub fn prepare_client(&self) -> Result<Arc<ZoneRecordManager>, ChallengeError> {
        let credentials = self
            .credentials
            .as_ref()
            .ok_or_else(|| ChallengeError::precondition("Plugin has not been prepared."))?;

        let mut state = self.client.lock();
        if let ClientState::Ready(manager) = &*state {
            return Ok(manager.clone());
        }

        let api = (self.factory)(credentials)?;
        let manager = Arc::new(ZoneRecordManager::with_observer(api, self.observer.clone()));
        *state = ClientState::Ready(manager.clone());
        tracing::debug!("DNS API client initialized");
        Ok(manager)
    }

    /// Publish `validation` as a TXT record at `validation_name`
    pub async fn create(
        &self,
        domain: &str,
        validation_name: &str,
        validation: &str,
    ) -> Result<(), ChallengeError> {
        tracing::debug!(
            domain = %domain,
            validation_name = %validation_name,
            ttl = self.ttl,
            "Starting DNS challenge"
        );

        self.prepare_client()?
            .upsert_txt(domain, validation_name, validation, self.ttl)
            .await?;

        tracing::info!(domain = %domain, "DNS challenge performed successfully");
        Ok(())
    }

    /// Remove the TXT record at `validation_name`
    ///
    /// Records are matched by name and type only; `_validation` is unused.
    /// Provider failures are logged, only a missing setup is an error.
    pub async fn destroy(
        &self,
        domain: &str,
        validation_name: &str,
        _validation: &str,
    ) -> Result<(), ChallengeError> {
        tracing::debug!(
            domain = %domain,
            validation_name = %validation_name,
            "Starting DNS cleanup"
        );

        self.prepare_client()?
            .delete_txt(domain, validation_name)
            .await;

        tracing::info!(domain = %domain, "DNS challenge cleaned up");
        Ok(())
    }
}
