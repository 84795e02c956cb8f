use actix_web::web;
use crate::web::handlers;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/categories", web::get().to(handlers::categories))
            .route("/ask", web::post().to(handlers::ask))
            .route("/chat", web::post().to(handlers::chat))
            .route("/sessions/{id}/conversation", web::get().to(handlers::conversation))
            .route("/sessions/{id}", web::delete().to(handlers::end_session))
    )
    .route("/", web::get().to(handlers::index))
    .route("/health", web::get().to(handlers::health_check))
    .route("/c/{slug}", web::get().to(handlers::category_page))
    .route("/c/{slug}", web::post().to(handlers::submit_page))
    .route("/session/end", web::post().to(handlers::end_page_session));
}
