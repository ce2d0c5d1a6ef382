use actix_http::header::{HeaderName, HeaderValue};
use std::future::{ready, Ready};
use tracing::{trace, Instrument, Level};

use actix_service::{forward_ready, Service, Transform};
use actix_web::dev::{ServiceRequest, ServiceResponse};
use futures_util::future::LocalBoxFuture;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Tags every request span with a request id and echoes the id back in the
/// `x-request-id` response header. An id sent by the client is kept.
pub struct RequestIdMiddleware;

impl<S, B> Transform<S, ServiceRequest> for RequestIdMiddleware
where
  S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error>,
  S::Future: 'static,
  B: 'static,
{
  type Response = ServiceResponse<B>;
  type Error = actix_web::Error;
  type Transform = RequestIdMiddlewareService<S>;
  type InitError = ();
  type Future = Ready<Result<Self::Transform, Self::InitError>>;

  fn new_transform(&self, service: S) -> Self::Future {
    ready(Ok(RequestIdMiddlewareService { service }))
  }
}

pub struct RequestIdMiddlewareService<S> {
  service: S,
}

impl<S, B> Service<ServiceRequest> for RequestIdMiddlewareService<S>
where
  S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error>,
  S::Future: 'static,
  B: 'static,
{
  type Response = ServiceResponse<B>;
  type Error = actix_web::Error;
  type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

  forward_ready!(service);

  fn call(&self, req: ServiceRequest) -> Self::Future {
    let request_id = get_request_id(&req).unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    trace!("request id {} for: {}", request_id, req.path());

    let span = tracing::span!(Level::INFO, "request_id", request_id = %request_id);
    let fut = self.service.call(req);
    Box::pin(
      async move {
        let mut res = fut.await?;
        if let Ok(value) = HeaderValue::from_str(&request_id) {
          res
            .headers_mut()
            .insert(HeaderName::from_static(X_REQUEST_ID), value);
        }
        Ok(res)
      }
      .instrument(span),
    )
  }
}

pub fn get_request_id(req: &ServiceRequest) -> Option<String> {
  match req.headers().get(HeaderName::from_static(X_REQUEST_ID)) {
    Some(h) => match h.to_str() {
      Ok(s) => Some(s.to_owned()),
      Err(e) => {
        tracing::error!("Failed to get request id from header: {}", e);
        None
      },
    },
    None => None,
  }
}
