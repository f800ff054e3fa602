use std::sync::Arc;
use actix_web::{guard, web, HttpResponse};

use crate::auth::{AuthGate, AuthUser, TokenService};
use crate::content;
use crate::context::{RequestContext, Resolve};
use crate::error::ApiError;
use crate::models::*;
use crate::resolve::{NodeCtx, ThreadCtx};
use crate::users;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| ApiError::invalid(err.to_string()).into()),
    )
    .service(web::resource("/tabs").route(web::get().to(list_tabs)))
    .service(
        web::scope("/threads")
            // POST-only; other methods fall through to the slug resources,
            // so a node may be called "posts"
            .service(
                web::resource("/")
                    .guard(guard::Post())
                    .wrap(Resolve::new(AuthGate))
                    .route(web::post().to(create_thread)),
            )
            .service(
                web::resource("/posts")
                    .guard(guard::Post())
                    .wrap(Resolve::new(AuthGate))
                    .route(web::post().to(create_post)),
            )
            .service(
                web::resource("/{nodeSlug}")
                    .wrap(Resolve::new(NodeCtx))
                    .route(web::get().to(list_threads)),
            )
            .service(
                web::resource("/{nodeSlug}/{threadId}")
                    .wrap(Resolve::new(ThreadCtx))
                    .route(web::get().to(list_posts)),
            ),
    )
    .service(
        web::scope("/users")
            .service(web::resource("").route(web::post().to(create_user)))
            .service(web::resource("/token").route(web::post().to(issue_token)))
            .service(
                web::resource("/me")
                    .wrap(Resolve::new(AuthGate))
                    .route(web::get().to(me)),
            ),
    )
    .route("/openapi.json", web::get().to(crate::openapi::openapi_json));
}

/// Shared, read-only application state.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn crate::repo::Repo>,
    pub tokens: TokenService,
    pub tabs: Arc<Vec<Tab>>,
}

impl AppState {
    pub fn new(repo: Arc<dyn crate::repo::Repo>, tokens: TokenService, tabs: Vec<Tab>) -> Self {
        Self { repo, tokens, tabs: Arc::new(tabs) }
    }
}

#[utoipa::path(
    get,
    path = "/tabs",
    responses(
        (status = 200, description = "Configured tabs", body = [Tab])
    )
)]
pub async fn list_tabs(data: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(data.tabs.as_slice())
}

#[utoipa::path(
    get,
    path = "/threads/{nodeSlug}",
    params(("nodeSlug" = String, Path, description = "Node slug")),
    responses(
        (status = 200, description = "Threads of the node", body = [ThreadSummary]),
        (status = 404, description = "Node not found")
    )
)]
pub async fn list_threads(
    data: web::Data<AppState>,
    ctx: web::ReqData<RequestContext>,
) -> Result<HttpResponse, ApiError> {
    let threads = content::list_threads(data.repo.as_ref(), ctx.node()?).await?;
    Ok(HttpResponse::Ok().json(threads))
}

#[utoipa::path(
    get,
    path = "/threads/{nodeSlug}/{threadId}",
    params(
        ("nodeSlug" = String, Path, description = "Node slug"),
        ("threadId" = i64, Path, description = "Thread id")
    ),
    responses(
        (status = 200, description = "Posts of the thread, oldest first", body = [PostView]),
        (status = 404, description = "Thread not found")
    )
)]
pub async fn list_posts(
    data: web::Data<AppState>,
    ctx: web::ReqData<RequestContext>,
) -> Result<HttpResponse, ApiError> {
    let posts = content::list_posts(data.repo.as_ref(), ctx.thread()?).await?;
    Ok(HttpResponse::Ok().json(posts))
}

#[utoipa::path(
    post,
    path = "/threads/",
    request_body = NewThreadRequest,
    responses(
        (status = 201, description = "Thread and opening post created", body = Created),
        (status = 400, description = "Invalid request or authentication failure")
    )
)]
pub async fn create_thread(
    data: web::Data<AppState>,
    ctx: web::ReqData<RequestContext>,
    payload: web::Json<NewThreadRequest>,
) -> Result<HttpResponse, ApiError> {
    let id = content::create_thread(data.repo.as_ref(), ctx.user()?, payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(Created { id }))
}

#[utoipa::path(
    post,
    path = "/threads/posts",
    request_body = NewPostRequest,
    responses(
        (status = 201, description = "Post created", body = Created),
        (status = 400, description = "Invalid request or authentication failure")
    )
)]
pub async fn create_post(
    data: web::Data<AppState>,
    ctx: web::ReqData<RequestContext>,
    payload: web::Json<NewPostRequest>,
) -> Result<HttpResponse, ApiError> {
    let id = content::create_post(data.repo.as_ref(), ctx.user()?, payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(Created { id }))
}

#[utoipa::path(
    post,
    path = "/users",
    request_body = Credentials,
    responses(
        (status = 201, description = "User registered", body = User),
        (status = 400, description = "Invalid request or username exists")
    )
)]
pub async fn create_user(
    data: web::Data<AppState>,
    payload: web::Json<Credentials>,
) -> Result<HttpResponse, ApiError> {
    let user = users::register(data.repo.as_ref(), payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(user))
}

#[utoipa::path(
    post,
    path = "/users/token",
    request_body = Credentials,
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 400, description = "Unknown user or wrong password")
    )
)]
pub async fn issue_token(
    data: web::Data<AppState>,
    payload: web::Json<Credentials>,
) -> Result<HttpResponse, ApiError> {
    let resp = users::login(data.repo.as_ref(), &data.tokens, payload.into_inner()).await?;
    Ok(HttpResponse::Ok().json(resp))
}

#[utoipa::path(
    get,
    path = "/users/me",
    responses(
        (status = 200, description = "Current user", body = AuthUser),
        (status = 400, description = "Authentication failure")
    )
)]
pub async fn me(ctx: web::ReqData<RequestContext>) -> Result<HttpResponse, ApiError> {
    let user: &AuthUser = ctx.user()?;
    Ok(HttpResponse::Ok().json(user))
}
