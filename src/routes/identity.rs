//! Browser and session identifiers.
//!
//! The front-end keeps a persistent per-browser id and a per-session id in
//! its own storage. It sends whatever it has; valid ids are echoed back and
//! missing or malformed ones are replaced.

use axum::extract::Query;
use axum::response::Json;
use serde::{Deserialize, Serialize};

use crate::services::ident;

#[derive(Debug, Default, Deserialize)]
pub struct IdentityQuery {
    pub browser_id: Option<String>,
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct IdentityResponse {
    pub browser_id: String,
    pub session_id: String,
}

/// `GET /api/identity` — resolve the browser and session ids.
pub async fn identity(Query(query): Query<IdentityQuery>) -> Json<IdentityResponse> {
    Json(IdentityResponse {
        browser_id: ident::reuse_or_generate(query.browser_id.as_deref()),
        session_id: ident::reuse_or_generate(query.session_id.as_deref()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn identity_generates_both_ids() {
        let Json(resp) = identity(Query(IdentityQuery::default())).await;
        assert!(ident::is_valid_id(&resp.browser_id));
        assert!(ident::is_valid_id(&resp.session_id));
        assert_ne!(resp.browser_id, resp.session_id);
    }

    #[tokio::test]
    async fn identity_keeps_valid_browser_id() {
        let query = IdentityQuery { browser_id: Some("Br0wser123".into()), session_id: Some("nope".into()) };
        let Json(resp) = identity(Query(query)).await;
        assert_eq!(resp.browser_id, "Br0wser123");
        assert_ne!(resp.session_id, "nope");
    }
}
