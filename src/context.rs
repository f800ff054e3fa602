use actix_web::body::{EitherBody, MessageBody};
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{web, Error, HttpMessage};
use async_trait::async_trait;
use futures_util::future::{ready, LocalBoxFuture, Ready};
use std::rc::Rc;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::models::{Node, ThreadRef};
use crate::routes::AppState;

/// Entities resolved for the current request. Each middleware stage fills in
/// its own field; handlers read them back with the accessors below.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub node: Option<Node>,
    pub thread: Option<ThreadRef>,
    pub user: Option<AuthUser>,
}

impl RequestContext {
    pub fn node(&self) -> Result<&Node, ApiError> {
        self.node.as_ref().ok_or(ApiError::Internal)
    }

    pub fn thread(&self) -> Result<ThreadRef, ApiError> {
        self.thread.ok_or(ApiError::Internal)
    }

    pub fn user(&self) -> Result<&AuthUser, ApiError> {
        self.user.as_ref().ok_or(ApiError::Internal)
    }
}

/// One resolution step. An `Err` short-circuits the request: the error is
/// rendered as the response and the handler never runs.
#[async_trait(?Send)]
pub trait Resolver: 'static {
    async fn resolve(
        &self,
        state: &AppState,
        req: &ServiceRequest,
        ctx: &mut RequestContext,
    ) -> Result<(), ApiError>;
}

/// Wraps a resource so `R` runs before the handler.
pub struct Resolve<R> {
    resolver: Rc<R>,
}

impl<R: Resolver> Resolve<R> {
    pub fn new(resolver: R) -> Self {
        Self { resolver: Rc::new(resolver) }
    }
}

impl<S, B, R> Transform<S, ServiceRequest> for Resolve<R>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
    R: Resolver,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = ResolveMiddleware<S, R>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ResolveMiddleware {
            service: Rc::new(service),
            resolver: self.resolver.clone(),
        }))
    }
}

pub struct ResolveMiddleware<S, R> {
    service: Rc<S>,
    resolver: Rc<R>,
}

impl<S, B, R> Service<ServiceRequest> for ResolveMiddleware<S, R>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
    R: Resolver,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let svc = self.service.clone();
        let resolver = self.resolver.clone();
        Box::pin(async move {
            let state = req.app_data::<web::Data<AppState>>().cloned();
            let Some(state) = state else {
                return Ok(req.error_response(ApiError::Internal).map_into_right_body());
            };
            let mut ctx = req
                .extensions()
                .get::<RequestContext>()
                .cloned()
                .unwrap_or_default();
            let resolved = resolver.resolve(&state, &req, &mut ctx).await;
            if let Err(e) = resolved {
                return Ok(req.error_response(e).map_into_right_body());
            }
            req.extensions_mut().insert(ctx);
            svc.call(req).await.map(ServiceResponse::map_into_left_body)
        })
    }
}
