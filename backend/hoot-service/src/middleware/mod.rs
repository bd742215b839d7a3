//! HTTP middleware for the hoot service.
//!
//! `JwtAuth` guards the hoot routes: it validates the bearer token against
//! the shared secret and stashes the verified identity in request
//! extensions, where handlers pick it up through the `AuthUser` extractor.
//! Verification is stateless; the "session" is rebuilt from the token on
//! every request.

use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{Error, FromRequest, HttpMessage, HttpRequest};
use bson::oid::ObjectId;
use futures::future::LocalBoxFuture;
use std::future::{ready, Ready};
use std::rc::Rc;

use crate::error::AppError;

/// Verified identity attached to a request after authentication.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: ObjectId,
    pub username: String,
}

/// Actix middleware validating `Authorization: Bearer <token>` headers.
pub struct JwtAuth {
    secret: Rc<String>,
}

impl JwtAuth {
    pub fn new(secret: String) -> Self {
        Self {
            secret: Rc::new(secret),
        }
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
            secret: self.secret.clone(),
        }))
    }
}

pub struct JwtAuthService<S> {
    service: Rc<S>,
    secret: Rc<String>,
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
        let secret = self.secret.clone();

        Box::pin(async move {
            let user = authenticate(&req, &secret)?;
            req.extensions_mut().insert(user);
            service.call(req).await
        })
    }
}

/// Header to verified identity, or the 401 to short-circuit with.
fn authenticate(req: &ServiceRequest, secret: &str) -> Result<AuthUser, AppError> {
    let header = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Authorization header required.".to_string()))?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthorized("Authorization header required.".to_string()))?;

    let claims = jwt_auth::verify_token(token, secret).map_err(|err| {
        tracing::warn!("token verification failed: {err}");
        AppError::Unauthorized("Invalid token.".to_string())
    })?;

    let id = ObjectId::parse_str(&claims.payload.id)
        .map_err(|_| AppError::Unauthorized("Invalid token.".to_string()))?;

    Ok(AuthUser {
        id,
        username: claims.payload.username,
    })
}

impl FromRequest for AuthUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<AuthUser>()
                .cloned()
                .ok_or_else(|| {
                    AppError::Unauthorized("User not authenticated.".to_string()).into()
                }),
        )
    }
}
