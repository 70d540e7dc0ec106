use actix_web::{HttpRequest, Responder, routes, web};
use actix_web_flash_messages::IncomingFlashMessages;
use tera::Tera;

use crate::models::auth::AuthenticatedUser;
use crate::repository::ApiRepository;
use crate::routes::{base_context, ensure_section, page_failure, render_template, session_repo};
use crate::services::home as home_service;

#[routes]
#[get("/home")]
#[get("/bodega/home")]
#[get("/facturador/home")]
#[get("/transportista/home")]
#[get("/vendedor/home")]
pub async fn show_home(
    req: HttpRequest,
    user: AuthenticatedUser,
    repo: web::Data<ApiRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let pagina = match ensure_section(&req, &user) {
        Ok(role) => role,
        Err(response) => return response,
    };

    let repo = session_repo(&repo, &user);
    match home_service::load_home(&repo, &user, pagina).await {
        Ok(data) => {
            let mut context = base_context(&flash_messages, &user, "home");
            context.insert("rol", pagina.label());
            context.insert("contadores", &data.contadores);
            render_template(&tera, "home/index.html", &context)
        }
        Err(err) => page_failure(err, &user, &flash_messages, &tera),
    }
}
