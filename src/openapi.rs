use actix_web::HttpResponse;
use utoipa::OpenApi;

use crate::auth::AuthUser;
use crate::models::{Created, Credentials, NewPostRequest, NewThreadRequest, PostView, Tab, ThreadSummary, TokenResponse, User};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::list_tabs,
        crate::routes::list_threads,
        crate::routes::list_posts,
        crate::routes::create_thread,
        crate::routes::create_post,
        crate::routes::create_user,
        crate::routes::issue_token,
        crate::routes::me,
    ),
    components(schemas(
        Tab, ThreadSummary, PostView, NewThreadRequest, NewPostRequest,
        Created, Credentials, User, TokenResponse, AuthUser
    )),
    tags(
        (name = "threads", description = "Thread and post operations"),
        (name = "users", description = "Registration and tokens"),
    )
)]
pub struct ApiDoc;

/// Serves the generated document at `/openapi.json`.
pub async fn openapi_json() -> HttpResponse {
    HttpResponse::Ok().json(ApiDoc::openapi())
}
