/// HTTP middleware for platform-service
///
/// `JwtAuth` wraps the API scope: when a request carries an access token it
/// is verified (any failure ends the request with 401) and the account id is
/// stored in request extensions. Requests without a token pass through;
/// handlers that require authentication take the [`UserId`] extractor, which
/// rejects them. Verification is stateless: only the signature and expiry
/// are checked, the credential store is never consulted.
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{Error, FromRequest, HttpMessage, HttpRequest};
use futures::future::{ready, LocalBoxFuture, Ready};
use std::rc::Rc;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::AppError;
use crate::security::tokens::TokenIssuer;

/// Authenticated account id, inserted by [`JwtAuth`]
#[derive(Debug, Clone)]
pub struct UserId(pub Uuid);

#[derive(Clone)]
pub struct JwtAuth {
    issuer: Arc<TokenIssuer>,
}

impl JwtAuth {
    pub fn new(issuer: Arc<TokenIssuer>) -> Self {
        Self { issuer }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtAuthService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthService {
            service: Rc::new(service),
            issuer: Arc::clone(&self.issuer),
        }))
    }
}

pub struct JwtAuthService<S> {
    service: Rc<S>,
    issuer: Arc<TokenIssuer>,
}

impl<S, B> Service<ServiceRequest> for JwtAuthService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let issuer = Arc::clone(&self.issuer);

        Box::pin(async move {
            // Cookie for browser clients, Authorization header for the rest
            let token = req
                .cookie("access_token")
                .map(|cookie| cookie.value().to_string())
                .or_else(|| {
                    req.headers()
                        .get("Authorization")
                        .and_then(|header| header.to_str().ok())
                        .and_then(|header| header.strip_prefix("Bearer "))
                        .map(str::to_string)
                });

            if let Some(token) = token {
                let user_id = issuer.verify_access_token(&token)?;
                req.extensions_mut().insert(UserId(user_id));
            }

            service.call(req).await
        })
    }
}

impl FromRequest for UserId {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        ready(req.extensions().get::<UserId>().cloned().ok_or_else(|| {
            Error::from(AppError::Unauthorized(
                "authentication required".to_string(),
            ))
        }))
    }
}
