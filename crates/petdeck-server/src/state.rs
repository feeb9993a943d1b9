use std::sync::Arc;

use axum::http::HeaderMap;
use chrono::Utc;

use petdeck_catalog::{resolve_bucket, AssetService};
use petdeck_types::Bucket;

use crate::auth::{Credentials, MemberDirectory, StaticMembers};
use crate::config::ServerConfig;
use crate::error::ServerResult;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<AssetService>,
    pub members: Arc<dyn MemberDirectory>,
    pub desktop_mode: bool,
}

impl AppState {
    pub fn new(service: AssetService, members: Arc<dyn MemberDirectory>, desktop_mode: bool) -> Self {
        Self {
            service: Arc::new(service),
            members,
            desktop_mode,
        }
    }

    /// State described by `config`, with its static member table.
    pub fn from_config(config: &ServerConfig) -> ServerResult<Self> {
        let service = config.build_service()?;
        let members = Arc::new(StaticMembers::new(&config.members));
        Ok(Self::new(service, members, config.desktop_mode))
    }

    /// Largest request body buffered before handlers see it.
    pub fn body_limit(&self) -> usize {
        self.service.limits().max_upload_bytes.saturating_mul(2)
    }

    /// Resolve the caller's bucket from request headers.
    pub async fn bucket(&self, headers: &HeaderMap) -> ServerResult<Bucket> {
        let member = if self.desktop_mode {
            None
        } else {
            self.members.lookup(&Credentials::from_headers(headers)).await?
        };
        Ok(resolve_bucket(self.desktop_mode, member.as_ref(), Utc::now())?)
    }
}
