//! Request Extractors
//!
//! Master-only routes take a [`RequireMaster`] argument; the extractor runs
//! before the body is read and rejects the request with 401 unless the
//! `X-Master-Pin` header carries the configured master PIN.
//!
//! ```ignore
//! async fn delete_prize(_master: RequireMaster, Path(id): Path<String>) -> QuestResult<...> {
//!     // only reached with a valid master PIN
//! }
//! ```

use std::net::SocketAddr;

use axum::extract::{ConnectInfo, FromRequest, FromRequestParts};
use axum::http::request::Parts;
use platform::client::{HeaderError, client_key, required_header};

use crate::application::config::QuestConfig;
use crate::application::master_auth::MasterAuthUseCase;
use crate::domain::repository::QuestStore;
use crate::error::QuestError;
use crate::presentation::handlers::QuestAppState;

pub const MASTER_PIN_HEADER: &str = "x-master-pin";

/// JSON body whose rejections render like every other `QuestError`
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(QuestError))]
pub struct JsonBody<T>(pub T);

/// Per-client bucket key: the peer address, or the first `X-Forwarded-For`
/// hop when the config trusts a fronting proxy
#[derive(Debug, Clone)]
pub struct ClientKey(pub String);

fn client_key_of(parts: &Parts, config: &QuestConfig) -> String {
    let direct_ip = parts
        .extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());
    client_key(&parts.headers, direct_ip, config.trust_forwarded_for)
}

impl<R> FromRequestParts<QuestAppState<R>> for ClientKey
where
    R: QuestStore,
{
    type Rejection = QuestError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &QuestAppState<R>,
    ) -> Result<Self, Self::Rejection> {
        Ok(ClientKey(client_key_of(parts, &state.config)))
    }
}

/// Guard for master-only routes
#[derive(Debug, Clone, Copy)]
pub struct RequireMaster;

impl<R> FromRequestParts<QuestAppState<R>> for RequireMaster
where
    R: QuestStore,
{
    type Rejection = QuestError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &QuestAppState<R>,
    ) -> Result<Self, Self::Rejection> {
        let pin = match required_header(&parts.headers, MASTER_PIN_HEADER) {
            Ok(pin) => Some(pin),
            Err(HeaderError::Missing(_)) => None,
            Err(HeaderError::NotUtf8(_)) => return Err(QuestError::InvalidMasterPin),
        };
        let key = client_key_of(parts, &state.config);

        MasterAuthUseCase::new(state.limiter.clone(), state.config.clone())
            .verify(pin, &key)
            .await?;
        Ok(RequireMaster)
    }
}
