use chrono::{DateTime, Utc};

use petdeck_types::{Bucket, Member};

use crate::error::{CatalogError, CatalogResult};

/// Map the caller to the bucket owning their user layer.
///
/// Desktop mode shares the single `offline` bucket and ignores identity.
/// Otherwise the member must be present, active, and not past expiry.
pub fn resolve_bucket(
    desktop_mode: bool,
    member: Option<&Member>,
    now: DateTime<Utc>,
) -> CatalogResult<Bucket> {
    if desktop_mode {
        return Ok(Bucket::offline());
    }
    let member = member.ok_or(CatalogError::Unauthorized)?;
    if !member.is_active {
        return Err(CatalogError::Forbidden("account is disabled".into()));
    }
    if member.is_expired(now) {
        return Err(CatalogError::Forbidden("account has expired".into()));
    }
    Ok(Bucket::for_member(member.id)?)
}
