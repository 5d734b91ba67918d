//! External video host seam.
//!
//! The engine only ever creates and deletes assets; transcoding and playback
//! stay on the host's side.

use crate::config::VideoConfig;
use crate::helper::{get_conn, ActionError};
use crate::models::db_operations::video_assets_db_operations;
use crate::DbPool;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VideoHostError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("video host returned {status}: {body}")]
    Api { status: u16, body: String },
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoAsset {
    pub asset_id: String,
    pub playback_id: Option<String>,
}

#[async_trait]
pub trait VideoHost: Send + Sync {
    /// Asks the host to ingest `source_url` as a new asset.
    async fn create_asset(&self, source_url: &str) -> Result<VideoAsset, VideoHostError>;

    /// Deleting an asset the host no longer knows about succeeds.
    async fn delete_asset(&self, asset_id: &str) -> Result<(), VideoHostError>;
}

// --- Mux ---

#[derive(Deserialize)]
struct MuxEnvelope {
    data: MuxAssetData,
}

#[derive(Deserialize)]
struct MuxAssetData {
    id: String,
    #[serde(default)]
    playback_ids: Vec<MuxPlaybackId>,
}

#[derive(Deserialize)]
struct MuxPlaybackId {
    id: String,
}

pub struct MuxVideoHost {
    client: Client,
    api_base: String,
    token_id: String,
    token_secret: String,
}

impl MuxVideoHost {
    pub fn new(config: &VideoConfig) -> Self {
        Self {
            client: Client::new(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            token_id: config.token_id.clone(),
            token_secret: config.token_secret.clone(),
        }
    }

    fn assets_url(&self) -> String {
        format!("{}/video/v1/assets", self.api_base)
    }
}

async fn api_error(response: reqwest::Response) -> VideoHostError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    VideoHostError::Api { status, body }
}

#[async_trait]
impl VideoHost for MuxVideoHost {
    async fn create_asset(&self, source_url: &str) -> Result<VideoAsset, VideoHostError> {
        let response = self
            .client
            .post(self.assets_url())
            .basic_auth(&self.token_id, Some(&self.token_secret))
            .json(&json!({
                "input": source_url,
                "playback_policy": ["public"],
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let envelope: MuxEnvelope = response
            .json()
            .await
            .map_err(|e| VideoHostError::MalformedResponse(e.to_string()))?;

        log::info!("Created video asset {}", envelope.data.id);
        Ok(VideoAsset {
            playback_id: envelope.data.playback_ids.into_iter().next().map(|p| p.id),
            asset_id: envelope.data.id,
        })
    }

    async fn delete_asset(&self, asset_id: &str) -> Result<(), VideoHostError> {
        let response = self
            .client
            .delete(format!("{}/{}", self.assets_url(), asset_id))
            .basic_auth(&self.token_id, Some(&self.token_secret))
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::NOT_FOUND => {
                log::info!("Video asset {} was already gone on the host.", asset_id);
                Ok(())
            }
            _ => Err(api_error(response).await),
        }
    }
}

// --- Remote clean-up after a local change has committed ---

/// Deletes each asset on the host. Failures are recorded as orphans for
/// `setup_cli assets purge-orphans` instead of being returned.
pub async fn release_remote_assets(pool: &DbPool, host: &dyn VideoHost, asset_ids: &[String], reason: &str) {
    for asset_id in asset_ids {
        if let Err(e) = host.delete_asset(asset_id).await {
            log::warn!("Failed to delete video asset {} ({}): {}", asset_id, reason, e);
            record_orphan(pool, asset_id, reason);
        }
    }
}

fn record_orphan(pool: &DbPool, asset_id: &str, reason: &str) {
    let recorded = pool
        .get()
        .map_err(|e| e.to_string())
        .and_then(|conn| {
            video_assets_db_operations::record_orphaned_asset(&conn, asset_id, reason).map_err(|e| e.to_string())
        });
    match recorded {
        Ok(()) => log::info!("Recorded orphaned video asset {}.", asset_id),
        Err(e) => log::error!("Could not record orphaned video asset {}: {}", asset_id, e),
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct PurgeReport {
    pub purged: usize,
    pub remaining: usize,
}

/// Retries every recorded orphan and forgets the ones the host accepted.
pub async fn purge_orphaned_assets(pool: &DbPool, host: &dyn VideoHost) -> Result<PurgeReport, ActionError> {
    let orphans = {
        let conn = get_conn(pool)?;
        video_assets_db_operations::list_orphaned_assets(&conn)?
    };

    let mut report = PurgeReport::default();
    for asset_id in orphans {
        match host.delete_asset(&asset_id).await {
            Ok(()) => {
                let conn = get_conn(pool)?;
                video_assets_db_operations::remove_orphaned_asset(&conn, &asset_id)?;
                report.purged += 1;
            }
            Err(e) => {
                log::warn!("Orphaned video asset {} is still undeletable: {}", asset_id, e);
                report.remaining += 1;
            }
        }
    }
    Ok(report)
}
