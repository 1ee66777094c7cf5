//! Certbot manual hook actions

use std::time::Duration;

use anyhow::{Context, Result};
use hostinger_dns::ChallengeHandler;

/// ACME challenge record name prefix
pub const ACME_CHALLENGE_RECORD: &str = "_acme-challenge";

/// Validation record name for a domain
///
/// Certbot passes wildcard identifiers as `*.example.com`; their challenge
/// lives under the base domain.
pub fn validation_name(domain: &str) -> String {
    format!("{}.{}", ACME_CHALLENGE_RECORD, base_domain(domain))
}

/// Strip a leading wildcard label
pub fn base_domain(domain: &str) -> &str {
    domain.strip_prefix("*.").unwrap_or(domain)
}

/// Publish the challenge record, then wait for it to propagate
pub async fn auth(
    handler: &ChallengeHandler,
    domain: &str,
    validation: &str,
    propagation: Duration,
) -> Result<()> {
    let domain = base_domain(domain);
    let name = validation_name(domain);

    handler
        .create(domain, &name, validation)
        .await
        .with_context(|| format!("Failed to publish TXT record {}", name))?;

    if !propagation.is_zero() {
        tracing::info!(
            "Waiting {} seconds for DNS changes to propagate",
            propagation.as_secs()
        );
        tokio::time::sleep(propagation).await;
    }

    Ok(())
}

/// Remove the challenge record
pub async fn cleanup(handler: &ChallengeHandler, domain: &str, validation: &str) -> Result<()> {
    let domain = base_domain(domain);
    let name = validation_name(domain);

    handler
        .destroy(domain, &name, validation)
        .await
        .with_context(|| format!("Failed to clean up TXT record {}", name))
}
