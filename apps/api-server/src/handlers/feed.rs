//! Feed handler.

use actix_web::{HttpResponse, web};

use social_shared::ApiResponse;

use crate::middleware::context::RequestCtx;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /v1/users/feed - feed of the current identity.
pub async fn get_user_feed(
    state: web::Data<AppState>,
    ctx: RequestCtx,
) -> AppResult<HttpResponse> {
    let feed = state
        .storage
        .posts
        .get_user_feed(&ctx, state.stub_user_id)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(feed)))
}
