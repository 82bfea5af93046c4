//! Per-request store context.

use std::future::{Ready, ready};
use std::ops::Deref;
use std::time::Duration;

use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use social_core::Ctx;
use tokio_util::sync::DropGuard;

use crate::state::AppState;

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Store context bound to the lifetime of one request.
///
/// Carries the configured request deadline. The context is cancelled when
/// the extractor is dropped, which happens when actix drops the handler
/// future because the client went away.
///
/// ```ignore
/// async fn handler(state: web::Data<AppState>, ctx: RequestCtx) -> AppResult<HttpResponse> {
///     let posts = state.storage.posts.list(&ctx).await?;
///     ...
/// }
/// ```
pub struct RequestCtx {
    ctx: Ctx,
    _cancel_on_drop: DropGuard,
}

impl Deref for RequestCtx {
    type Target = Ctx;

    fn deref(&self) -> &Ctx {
        &self.ctx
    }
}

impl FromRequest for RequestCtx {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let timeout = req
            .app_data::<web::Data<AppState>>()
            .map(|state| state.request_timeout)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT);

        let ctx = Ctx::background().with_timeout(timeout);
        let guard = ctx.token().clone().drop_guard();

        ready(Ok(RequestCtx {
            ctx,
            _cancel_on_drop: guard,
        }))
    }
}
