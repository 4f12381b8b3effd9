//! Identity gate middleware and the extractors handlers use to read its
//! verdict.
//!
//! The gate runs before routing reaches any article handler:
//!
//! - no `authtoken` header (or an empty one): the caller is anonymous;
//! - a token the verifier accepts: the caller is that identity;
//! - a token the verifier rejects: `401 Invalid authentication token` and the
//!   handler never runs.
//!
//! Handlers then choose their stance with [`MaybeIdentity`] (anonymous is
//! fine) or [`Authenticated`] (anonymous gets `401 Unauthenticated`).

use std::rc::Rc;
use std::sync::Arc;
use std::task::{Context, Poll};

use actix_web::body::EitherBody;
use actix_web::dev::{Payload, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{FromRequest, HttpMessage, HttpRequest};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::{debug, error, warn};

use crate::domain::ports::{IdentityVerifier, IdentityVerifierError};
use crate::domain::{AuthToken, Error, Identity};

/// Request header carrying the bearer token.
pub const AUTH_TOKEN_HEADER: &str = "authtoken";
/// Message returned when the verifier rejects a token.
pub const INVALID_TOKEN_MESSAGE: &str = "Invalid authentication token";
/// Message returned when a mutating route is called anonymously.
pub const UNAUTHENTICATED_MESSAGE: &str = "Unauthenticated";

/// Request extension recording the gate's verdict.
#[derive(Clone)]
struct GateVerdict(Option<Identity>);

fn map_verifier_error(err: IdentityVerifierError) -> Error {
    match err {
        IdentityVerifierError::Rejected { message } => {
            debug!(reason = %message, "authentication token rejected");
            Error::unauthorized(INVALID_TOKEN_MESSAGE)
        }
        IdentityVerifierError::Unavailable { message } => {
            warn!(reason = %message, "identity provider unavailable");
            Error::service_unavailable("Identity provider unavailable")
        }
    }
}

/// Read the bearer token, treating an absent or empty header as anonymous.
fn read_token(req: &ServiceRequest) -> Result<Option<AuthToken>, Error> {
    let Some(value) = req.headers().get(AUTH_TOKEN_HEADER) else {
        return Ok(None);
    };
    let raw = value.to_str().map_err(|_| {
        debug!("authentication token header is not visible ASCII");
        Error::unauthorized(INVALID_TOKEN_MESSAGE)
    })?;
    Ok(AuthToken::new(raw).ok())
}

/// Middleware resolving the `authtoken` header into an optional identity.
///
/// # Examples
/// ```
/// use std::sync::Arc;
/// use actix_web::App;
/// use articles_backend::domain::ports::FixtureIdentityVerifier;
/// use articles_backend::inbound::http::identity::IdentityGate;
///
/// let app = App::new().wrap(IdentityGate::new(Arc::new(FixtureIdentityVerifier::new())));
/// ```
#[derive(Clone)]
pub struct IdentityGate {
    verifier: Arc<dyn IdentityVerifier>,
}

impl IdentityGate {
    /// Gate requests through `verifier`.
    pub fn new(verifier: Arc<dyn IdentityVerifier>) -> Self {
        Self { verifier }
    }
}

impl<S, B> Transform<S, ServiceRequest> for IdentityGate
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = actix_web::Error;
    type InitError = ();
    type Transform = IdentityGateMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(IdentityGateMiddleware {
            service: Rc::new(service),
            verifier: Arc::clone(&self.verifier),
        }))
    }
}

/// Service wrapper produced by [`IdentityGate`].
pub struct IdentityGateMiddleware<S> {
    service: Rc<S>,
    verifier: Arc<dyn IdentityVerifier>,
}

impl<S, B> Service<ServiceRequest> for IdentityGateMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let verifier = Arc::clone(&self.verifier);
        Box::pin(async move {
            let identity = match read_token(&req) {
                Ok(None) => None,
                Ok(Some(token)) => match verifier.verify(&token).await {
                    Ok(identity) => Some(identity),
                    Err(err) => {
                        let response = req.error_response(map_verifier_error(err));
                        return Ok(response.map_into_right_body());
                    }
                },
                Err(err) => return Ok(req.error_response(err).map_into_right_body()),
            };

            req.extensions_mut().insert(GateVerdict(identity));
            let res = service.call(req).await?;
            Ok(res.map_into_left_body())
        })
    }
}

fn verdict(req: &HttpRequest) -> Result<Option<Identity>, Error> {
    match req.extensions().get::<GateVerdict>() {
        Some(GateVerdict(identity)) => Ok(identity.clone()),
        None => {
            error!(path = %req.path(), "identity gate is not installed for this route");
            Err(Error::internal("identity gate missing"))
        }
    }
}

/// Extractor yielding the caller's identity, or `None` for anonymous callers.
#[derive(Debug, Clone)]
pub struct MaybeIdentity(pub Option<Identity>);

impl FromRequest for MaybeIdentity {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(verdict(req).map(MaybeIdentity))
    }
}

/// Extractor requiring a verified caller; anonymous requests fail with
/// `401 Unauthenticated`.
#[derive(Debug, Clone)]
pub struct Authenticated(pub Identity);

impl FromRequest for Authenticated {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(verdict(req).and_then(|identity| {
            identity
                .map(Authenticated)
                .ok_or_else(|| Error::unauthorized(UNAUTHENTICATED_MESSAGE))
        }))
    }
}
