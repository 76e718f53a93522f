//! Gist backup and restore commands

use anyhow::Result;
use tracing::warn;

use super::Session;
use crate::remote_sync::GistClient;

fn client(session: &Session<'_>) -> Option<Result<GistClient>> {
    if !session.config.remote.is_configured() {
        warn!("Remote backup requested without gist id or token");
        return None;
    }
    Some(GistClient::new(&session.config.remote))
}

pub async fn backup(session: &mut Session<'_>) -> Result<String> {
    let Some(client) = client(session) else {
        return Ok(session.t("remote-not-configured", &[]));
    };
    client?.backup(&session.data).await?;

    let gist = session.config.remote.gist_id.clone().unwrap_or_default();
    Ok(session.t("backup-done", &[("gist", gist.as_str())]))
}

/// Replace local data with the backup. The local file is only written once
/// the backup has been downloaded and parsed.
pub async fn restore(session: &mut Session<'_>) -> Result<String> {
    let Some(client) = client(session) else {
        return Ok(session.t("remote-not-configured", &[]));
    };
    let data = client?.restore().await?;

    session.data = data;
    session.save()?;

    let gist = session.config.remote.gist_id.clone().unwrap_or_default();
    Ok(session.t_count(
        "restore-done",
        session.data.recipes.len(),
        &[("gist", gist.as_str())],
    ))
}
