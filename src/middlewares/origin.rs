use std::future::{Ready, ready};

use actix_web::{
    Error, HttpMessage, HttpRequest,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    http::header,
};
use futures_util::future::LocalBoxFuture;
use url::{Host, Url};

use crate::models::origin::TrafficOrigin;

/// Lets a client mark its own traffic as local regardless of headers.
pub const TRAFFIC_ORIGIN_HEADER: &str = "X-Traffic-Origin";

fn is_loopback_host(host: Host<&str>) -> bool {
    match host {
        Host::Domain(domain) => {
            let domain = domain.to_ascii_lowercase();
            domain == "localhost" || domain.ends_with(".localhost")
        }
        Host::Ipv4(ip) => ip.is_loopback() || ip.is_unspecified(),
        Host::Ipv6(ip) => ip.is_loopback() || ip.is_unspecified(),
    }
}

fn is_local_url(value: &str) -> bool {
    Url::parse(value)
        .ok()
        .and_then(|url| url.host().map(is_loopback_host))
        .unwrap_or(false)
}

/// Decide from the request headers whether this traffic is from a dev machine.
pub fn classify(req: &HttpRequest) -> TrafficOrigin {
    let headers = req.headers();
    let explicit = headers
        .get(TRAFFIC_ORIGIN_HEADER)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.trim().eq_ignore_ascii_case("local"));

    let from_local_page = [header::ORIGIN, header::REFERER]
        .iter()
        .filter_map(|name| headers.get(name))
        .filter_map(|v| v.to_str().ok())
        .any(is_local_url);

    if explicit || from_local_page {
        TrafficOrigin::Local
    } else {
        TrafficOrigin::Production
    }
}

/// The origin the [OriginTagger] attached to `req`, production if untagged.
pub fn request_origin(req: &HttpRequest) -> TrafficOrigin {
    req.extensions()
        .get::<TrafficOrigin>()
        .copied()
        .unwrap_or_default()
}

/// Tags every request with its [TrafficOrigin] in the request extensions.
pub struct OriginTagger;

impl<S, B> Transform<S, ServiceRequest> for OriginTagger
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = OriginTaggerMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(OriginTaggerMiddleware { service }))
    }
}

pub struct OriginTaggerMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for OriginTaggerMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let origin = classify(req.request());
        if !origin.is_canonical() {
            log::debug!("Local traffic: {} {}", req.method(), req.path());
        }
        req.extensions_mut().insert(origin);

        let fut = self.service.call(req);
        Box::pin(async move { fut.await })
    }
}
