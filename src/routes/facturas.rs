use actix_web::{HttpRequest, Responder, routes, web};
use actix_web_flash_messages::IncomingFlashMessages;
use tera::Tera;

use crate::dto::catalogo::SearchQuery;
use crate::models::auth::AuthenticatedUser;
use crate::repository::ApiRepository;
use crate::routes::{
    base_context, ensure_section, page_failure, page_path, query, render_template, session_repo,
};
use crate::services::facturas as facturas_service;

#[routes]
#[get("/facturas")]
#[get("/facturador/facturar")]
pub async fn show_facturas(
    req: HttpRequest,
    user: AuthenticatedUser,
    repo: web::Data<ApiRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    if let Err(response) = ensure_section(&req, &user) {
        return response;
    }

    let params: SearchQuery = query(&req);
    let repo = session_repo(&repo, &user);
    match facturas_service::list_facturas(&repo, &user, params).await {
        Ok(data) => {
            let mut context = base_context(&flash_messages, &user, "facturas");
            context.insert("facturas", &data.facturas);
            context.insert("search_query", &data.search_query);
            context.insert("base_path", &page_path(&user, "facturas"));
            render_template(&tera, "facturas/index.html", &context)
        }
        Err(err) => page_failure(err, &user, &flash_messages, &tera),
    }
}

#[routes]
#[get("/facturas/{id_factura}")]
#[get("/facturador/facturar/{id_factura}")]
pub async fn show_factura(
    req: HttpRequest,
    id_factura: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<ApiRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    if let Err(response) = ensure_section(&req, &user) {
        return response;
    }

    let repo = session_repo(&repo, &user);
    match facturas_service::load_factura(&repo, &user, id_factura.into_inner()).await {
        Ok(factura) => {
            let mut context = base_context(&flash_messages, &user, "facturas");
            context.insert("cliente", factura.nombre_cliente());
            context.insert("factura", &factura);
            context.insert("base_path", &page_path(&user, "facturas"));
            render_template(&tera, "facturas/detalle.html", &context)
        }
        Err(err) => page_failure(err, &user, &flash_messages, &tera),
    }
}
