//! HTTP handlers and route configuration.

mod comments;
mod feed;
mod health;
mod posts;
mod users;

use actix_web::web;

use crate::middleware::error::AppError;

/// Malformed JSON bodies answer with an RFC 7807 400.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into())
}

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/v1")
            .route("/health", web::get().to(health::health_check))
            .service(
                web::scope("/posts")
                    .route("", web::post().to(posts::create_post))
                    .route("", web::get().to(posts::list_posts))
                    .route("/{id}", web::get().to(posts::get_post))
                    .route("/{id}", web::patch().to(posts::update_post))
                    .route("/{id}", web::delete().to(posts::delete_post))
                    .route("/{id}/comments", web::post().to(comments::create_comment)),
            )
            .service(
                web::scope("/users")
                    // Registered before /{id} so "feed" is not read as an id.
                    .route("/feed", web::get().to(feed::get_user_feed))
                    .route("", web::post().to(users::create_user))
                    .route("/{id}", web::get().to(users::get_user))
                    .route("/{id}/follow", web::put().to(users::follow_user))
                    .route("/{id}/unfollow", web::put().to(users::unfollow_user)),
            ),
    );
}
