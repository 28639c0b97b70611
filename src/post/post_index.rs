use super::post_controller::{
    add_comment, create_post, delete_post, get_post, list_posts, remove_comment, report_post,
    reported_posts, toggle_dislike, toggle_like, update_post,
};
use actix_web::web;

pub fn post_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/post")
            .route("", web::get().to(list_posts))
            .route("", web::post().to(create_post))
            .route("/reported", web::get().to(reported_posts))
            .route("/report/{id}", web::put().to(report_post))
            .route("/{id}/toggle-like", web::put().to(toggle_like))
            .route("/{id}/toggle-dislike", web::put().to(toggle_dislike))
            .route("/{id}/comment", web::post().to(add_comment))
            .route("/{id}/comment/{comment_id}", web::delete().to(remove_comment))
            .route("/{id}", web::get().to(get_post))
            .route("/{id}", web::put().to(update_post))
            .route("/{id}", web::delete().to(delete_post)),
    );
}
