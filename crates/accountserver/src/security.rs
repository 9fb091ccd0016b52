//! Response hardening: security headers, CORS and the optional
//! plain-http to https redirect.

use actix_cors::Cors;
use actix_web::body::EitherBody;
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header;
use actix_web::middleware::DefaultHeaders;
use actix_web::{Error, HttpResponse};
use futures_util::future::LocalBoxFuture;
use std::future::{ready, Ready};

pub const CONTENT_SECURITY_POLICY: &str = "default-src 'self'; object-src 'none'";
pub const REFERRER_POLICY: &str = "strict-origin-when-cross-origin";

/// Headers attached to every response that does not already carry them
pub fn headers() -> DefaultHeaders {
    DefaultHeaders::new()
        .add((header::X_FRAME_OPTIONS, "SAMEORIGIN"))
        .add((header::X_CONTENT_TYPE_OPTIONS, "nosniff"))
        .add((header::CONTENT_SECURITY_POLICY, CONTENT_SECURITY_POLICY))
        .add((header::REFERRER_POLICY, REFERRER_POLICY))
        .add((header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"))
}

/// CORS open to any origin
pub fn cors() -> Cors {
    Cors::default()
        .allow_any_origin()
        .send_wildcard()
        .allow_any_method()
        .allow_any_header()
        .max_age(3600)
}

/// Redirects plain-http requests to https when enabled.
///
/// The scheme is taken from the connection info, so `Forwarded` and
/// `X-Forwarded-Proto` set by a terminating proxy are honoured.
#[derive(Debug, Clone, Copy)]
pub struct RedirectHttps {
    enabled: bool,
}

impl RedirectHttps {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RedirectHttps
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RedirectHttpsMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RedirectHttpsMiddleware {
            service,
            enabled: self.enabled,
        }))
    }
}

pub struct RedirectHttpsMiddleware<S> {
    service: S,
    enabled: bool,
}

impl<S, B> Service<ServiceRequest> for RedirectHttpsMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if self.enabled {
            let info = req.connection_info().clone();
            if info.scheme() != "https" {
                let target = req
                    .uri()
                    .path_and_query()
                    .map(|pq| pq.as_str())
                    .unwrap_or("/");
                let location = format!("https://{}{}", info.host(), target);
                tracing::debug!("Redirecting plain-http request to {}", location);

                let (request, _) = req.into_parts();
                let response = HttpResponse::MovedPermanently()
                    .insert_header((header::LOCATION, location))
                    .finish()
                    .map_into_right_body();
                return Box::pin(async move { Ok(ServiceResponse::new(request, response)) });
            }
        }

        let fut = self.service.call(req);
        Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
    }
}
