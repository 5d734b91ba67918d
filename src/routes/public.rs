use crate::helper::public_helpers;
use crate::routes::respond_read;
use crate::DbPool;
use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;

#[derive(Deserialize)]
pub struct CatalogQuery {
    category: Option<String>,
    title: Option<String>,
}

pub fn config_api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/is_server_active", web::get().to(is_server_active))
            .route("/categories", web::get().to(get_categories))
            .route("/catalog/courses", web::get().to(search_catalog)),
    );
}

async fn is_server_active() -> impl Responder {
    HttpResponse::Ok().body("active")
}

async fn get_categories(pool: web::Data<DbPool>) -> impl Responder {
    respond_read("categories", public_helpers::fetch_categories(&pool))
}

async fn search_catalog(pool: web::Data<DbPool>, query: web::Query<CatalogQuery>) -> impl Responder {
    respond_read(
        "catalog",
        public_helpers::search_published_courses(&pool, query.category.as_deref(), query.title.as_deref()),
    )
}
