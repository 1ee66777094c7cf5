//! DNS-01 challenge records on Hostinger DNS
//!
//! This library publishes and removes the `_acme-challenge` TXT records a
//! certificate client needs to prove domain ownership. It resolves the zone a
//! domain belongs to, computes the zone-relative record name, clears any
//! conflicting TXT record and creates the new one without touching the rest
//! of the zone.
//!
//! # Example
//!
//! ```rust,ignore
//! use hostinger_dns::{ChallengeHandler, ClientOptions, Credentials};
//!
//! let mut handler = ChallengeHandler::new(ClientOptions::default());
//! handler.setup_credentials(Credentials::load_from_file("hostinger.ini".as_ref())?);
//!
//! handler
//!     .create("sso.example.com", "_acme-challenge.sso.example.com", "token")
//!     .await?;
//! handler
//!     .destroy("sso.example.com", "_acme-challenge.sso.example.com", "token")
//!     .await?;
//! ```

mod api;
mod credentials;
mod error;
mod handler;
mod hostinger;
mod manager;
mod observer;
mod secret;
mod zone;

#[cfg(test)]
mod testing;

// Re-export public types
pub use api::{ApiError, DnsRecord, RecordFilter, RecordSet, ZoneApi, TXT};
pub use credentials::{Credentials, ACCOUNT_URL, TOKEN_KEY};
pub use error::ChallengeError;
pub use handler::{ApiFactory, ChallengeHandler, DEFAULT_TTL, DESCRIPTION};
pub use hostinger::{ClientOptions, HostingerClient, DEFAULT_API_BASE, DEFAULT_TIMEOUT};
pub use manager::ZoneRecordManager;
pub use observer::{ChallengeEvent, ChallengeObserver, Operation, Stage, TracingObserver};
pub use secret::SecretUri;
pub use zone::{resolve_zone, to_relative_name, RelativeName, Zone, APEX};
