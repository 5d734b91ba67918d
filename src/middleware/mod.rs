use crate::config::Config;
use crate::models::Principal;
use actix_web::{dev, web, FromRequest, HttpRequest};
use std::future::{ready, Ready};

/// The principal forwarded by the auth gateway, if the request carries one we trust.
///
/// Never rejects a request by itself: operations decide what an absent principal means.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaybePrincipal(pub Option<Principal>);

impl MaybePrincipal {
    pub fn as_ref(&self) -> Option<&Principal> {
        self.0.as_ref()
    }
}

fn principal_from_request(req: &HttpRequest) -> Option<Principal> {
    let config = match req.app_data::<web::Data<Config>>() {
        Some(config) => config,
        None => {
            log::error!("Config is not registered as app data; treating request as anonymous.");
            return None;
        }
    };

    let user_id = req
        .headers()
        .get(config.principal_header.as_str())
        .and_then(|v| v.to_str().ok())
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())?;

    // Trust is decided by the socket peer, not X-Forwarded-For, which the caller controls.
    let peer_ip = req.peer_addr().map(|addr| addr.ip().to_string());
    if !config.trusts_gateway(peer_ip.as_deref().unwrap_or_default()) {
        log::warn!(
            "Ignoring {} header from untrusted peer {}",
            config.principal_header,
            peer_ip.as_deref().unwrap_or("<unknown>")
        );
        return None;
    }
    Some(Principal::new(user_id))
}

impl FromRequest for MaybePrincipal {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut dev::Payload) -> Self::Future {
        ready(Ok(MaybePrincipal(principal_from_request(req))))
    }
}
