use anyhow::{Context, Result};
use rspotify::{ClientCredsSpotify, Config, Credentials};

const CLIENT_ID_VAR: &str = "RSPOTIFY_CLIENT_ID";
const CLIENT_SECRET_VAR: &str = "RSPOTIFY_CLIENT_SECRET";

/// Authenticate against the catalog with the client-credentials flow.
///
/// Only public catalog data is needed, so no user login or browser step is
/// involved. The token refreshes itself once it expires.
pub async fn authenticate() -> Result<ClientCredsSpotify> {
    let credentials = Credentials::from_env().with_context(|| {
        format!("{CLIENT_ID_VAR} and {CLIENT_SECRET_VAR} must be set")
    })?;

    let spotify = ClientCredsSpotify::with_config(
        credentials,
        Config {
            token_cached: false,
            token_refreshing: true,
            ..Default::default()
        },
    );

    tracing::info!("Requesting client-credentials token");
    spotify
        .request_token()
        .await
        .context("client-credentials token request failed")?;

    tracing::debug!("rspotify client initialized");

    Ok(spotify)
}
