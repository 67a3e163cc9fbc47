use color_eyre::eyre::{Result, WrapErr};
use reqwest::Client;
use url::Url;

/// Trigger a refresh/rescan of a Plex library section
///
/// Endpoint: `GET /library/sections/{section_id}/refresh`
///
/// This will start a background scan of the library section.
pub async fn refresh_library_section(
    client: &Client,
    base_url: &Url,
    user_token: &str,
    section_id: &str,
) -> Result<()> {
    let url = base_url.join(&format!("library/sections/{}/refresh", section_id))?;

    client
        .get(url)
        .header("Accept", "application/json")
        .header("X-Plex-Token", user_token)
        .send()
        .await?
        .error_for_status()
        .wrap_err("Failed to refresh library section")?;

    Ok(())
}
