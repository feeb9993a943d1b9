use std::collections::HashMap;

use async_trait::async_trait;
use axum::http::{header, HeaderMap};

use petdeck_types::Member;

use crate::config::MemberRecord;
use crate::error::ServerResult;

/// Cookie carrying the session token.
pub const SESSION_COOKIE: &str = "session_token";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Credentials {
    Bearer(String),
    Anonymous,
}

impl Credentials {
    /// Read the session cookie, falling back to an `Authorization: Bearer` header.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let cookie = headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == SESSION_COOKIE)
            .map(|(_, token)| token.to_string());
        let bearer = || {
            headers
                .get(header::AUTHORIZATION)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.strip_prefix("Bearer "))
                .map(|token| token.trim().to_string())
        };
        match cookie.or_else(bearer) {
            Some(token) if !token.is_empty() => Self::Bearer(token),
            _ => Self::Anonymous,
        }
    }
}

/// The external auth subsystem: resolves credentials to a member record.
#[async_trait]
pub trait MemberDirectory: Send + Sync {
    /// `Ok(None)` when the credentials do not identify a member.
    async fn lookup(&self, credentials: &Credentials) -> ServerResult<Option<Member>>;
}

/// Member table loaded from configuration.
#[derive(Default)]
pub struct StaticMembers {
    by_token: HashMap<String, Member>,
}

impl StaticMembers {
    pub fn new(records: &[MemberRecord]) -> Self {
        Self {
            by_token: records
                .iter()
                .map(|record| (record.token.clone(), record.member()))
                .collect(),
        }
    }
}

#[async_trait]
impl MemberDirectory for StaticMembers {
    async fn lookup(&self, credentials: &Credentials) -> ServerResult<Option<Member>> {
        match credentials {
            Credentials::Bearer(token) => Ok(self.by_token.get(token).cloned()),
            Credentials::Anonymous => Ok(None),
        }
    }
}
