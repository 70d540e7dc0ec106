use actix_web::{HttpRequest, HttpResponse, Responder, get, post, routes, web};
use actix_web_flash_messages::IncomingFlashMessages;
use tera::Tera;

use crate::domain::ruta::{ESTADOS_RUTA, TipoRuta};
use crate::dto::catalogo::SearchQuery;
use crate::dto::rutas::DashboardQuery;
use crate::forms::rutas::RutaForm;
use crate::models::auth::AuthenticatedUser;
use crate::notifications::Notificacion;
use crate::repository::ApiRepository;
use crate::routes::{
    action_failure, base_context, ensure_section, page_failure, parse_form, query, redirect,
    render_template, session_repo,
};
use crate::services::rutas as rutas_service;

#[get("/rutas")]
pub async fn show_rutas(
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
    match rutas_service::list_rutas(&repo, &user, params).await {
        Ok(data) => {
            let mut context = base_context(&flash_messages, &user, "rutas");
            context.insert("rutas", &data.rutas);
            context.insert("search_query", &data.search_query);
            render_template(&tera, "rutas/index.html", &context)
        }
        Err(err) => page_failure(err, &user, &flash_messages, &tera),
    }
}

async fn render_ruta_form(
    user: &AuthenticatedUser,
    repo: &ApiRepository,
    id_ruta: Option<i32>,
    flash_messages: &IncomingFlashMessages,
    tera: &Tera,
) -> HttpResponse {
    match rutas_service::load_ruta_form(repo, user, id_ruta).await {
        Ok(data) => {
            let mut context = base_context(flash_messages, user, "rutas");
            context.insert("ruta", &data.ruta);
            context.insert("usuarios", &data.usuarios);
            context.insert("ubicaciones", &data.ubicaciones);
            context.insert("sectores", &data.sectores);
            context.insert("estados", &ESTADOS_RUTA);
            render_template(tera, "rutas/form.html", &context)
        }
        Err(err) => page_failure(err, user, flash_messages, tera),
    }
}

#[get("/rutas/nuevo")]
pub async fn new_ruta(
    req: HttpRequest,
    user: AuthenticatedUser,
    repo: web::Data<ApiRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    if let Err(response) = ensure_section(&req, &user) {
        return response;
    }

    let repo = session_repo(&repo, &user);
    render_ruta_form(&user, &repo, None, &flash_messages, &tera).await
}

#[post("/rutas/nuevo")]
pub async fn create_ruta(
    req: HttpRequest,
    user: AuthenticatedUser,
    repo: web::Data<ApiRepository>,
    body: web::Bytes,
) -> impl Responder {
    if let Err(response) = ensure_section(&req, &user) {
        return response;
    }

    let repo = session_repo(&repo, &user);
    let result = match parse_form::<RutaForm>(&body) {
        Ok(form) => rutas_service::create_ruta(&repo, &user, form).await,
        Err(err) => Err(err),
    };
    match result {
        Ok(ruta) => {
            Notificacion::guardado(&format!("La ruta {}", ruta.nombre)).send();
            redirect("/rutas")
        }
        Err(err) => action_failure(err, &user, "/rutas/nuevo"),
    }
}

#[get("/rutas/{id_ruta}/editar")]
pub async fn edit_ruta(
    req: HttpRequest,
    id_ruta: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<ApiRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    if let Err(response) = ensure_section(&req, &user) {
        return response;
    }

    let repo = session_repo(&repo, &user);
    render_ruta_form(
        &user,
        &repo,
        Some(id_ruta.into_inner()),
        &flash_messages,
        &tera,
    )
    .await
}

#[post("/rutas/{id_ruta}/editar")]
pub async fn update_ruta(
    req: HttpRequest,
    id_ruta: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<ApiRepository>,
    body: web::Bytes,
) -> impl Responder {
    if let Err(response) = ensure_section(&req, &user) {
        return response;
    }

    let id_ruta = id_ruta.into_inner();
    let repo = session_repo(&repo, &user);
    let result = match parse_form::<RutaForm>(&body) {
        Ok(form) => rutas_service::update_ruta(&repo, &user, id_ruta, form).await,
        Err(err) => Err(err),
    };
    match result {
        Ok(ruta) => {
            Notificacion::actualizado(&format!("La ruta {}", ruta.nombre)).send();
            redirect("/rutas")
        }
        Err(err) => action_failure(err, &user, &format!("/rutas/{id_ruta}/editar")),
    }
}

#[post("/rutas/{id_ruta}/eliminar")]
pub async fn delete_ruta(
    req: HttpRequest,
    id_ruta: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<ApiRepository>,
) -> impl Responder {
    if let Err(response) = ensure_section(&req, &user) {
        return response;
    }

    let repo = session_repo(&repo, &user);
    match rutas_service::delete_ruta(&repo, &user, id_ruta.into_inner()).await {
        Ok(()) => {
            Notificacion::eliminado("La ruta").send();
            redirect("/rutas")
        }
        Err(err) => action_failure(err, &user, "/rutas"),
    }
}

async fn render_dashboard(
    req: &HttpRequest,
    user: &AuthenticatedUser,
    repo: &ApiRepository,
    tipo: TipoRuta,
    flash_messages: &IncomingFlashMessages,
    tera: &Tera,
) -> HttpResponse {
    let params: DashboardQuery = query(req);
    let (page_key, titulo) = match tipo {
        TipoRuta::Entrega => ("entregas", "Entregas"),
        TipoRuta::Venta => ("ventas", "Ventas"),
    };
    match rutas_service::load_dashboard(repo, user, tipo, params).await {
        Ok(data) => {
            let mut context = base_context(flash_messages, user, page_key);
            context.insert("titulo", titulo);
            context.insert("base_path", &format!("/{page_key}"));
            context.insert("tipo", &data.tipo);
            context.insert("rutas", &data.rutas);
            context.insert("sectores", &data.sectores);
            context.insert("ubicaciones", &data.ubicaciones);
            context.insert("estadisticas", &data.estadisticas);
            context.insert("resumen_usuarios", &data.resumen_usuarios);
            context.insert("id_ruta", &data.id_ruta);
            context.insert("sector", &data.sector);
            render_template(tera, "rutas/dashboard.html", &context)
        }
        Err(err) => page_failure(err, user, flash_messages, tera),
    }
}

#[get("/entregas")]
pub async fn show_entregas(
    req: HttpRequest,
    user: AuthenticatedUser,
    repo: web::Data<ApiRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    if let Err(response) = ensure_section(&req, &user) {
        return response;
    }

    let repo = session_repo(&repo, &user);
    render_dashboard(
        &req,
        &user,
        &repo,
        TipoRuta::Entrega,
        &flash_messages,
        &tera,
    )
    .await
}

#[get("/ventas")]
pub async fn show_ventas(
    req: HttpRequest,
    user: AuthenticatedUser,
    repo: web::Data<ApiRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    if let Err(response) = ensure_section(&req, &user) {
        return response;
    }

    let repo = session_repo(&repo, &user);
    render_dashboard(&req, &user, &repo, TipoRuta::Venta, &flash_messages, &tera).await
}

/// Routes assigned to the seller or carrier in session.
#[routes]
#[get("/vendedor/rutas")]
#[get("/transportista/rutas")]
pub async fn show_rutas_propias(
    req: HttpRequest,
    user: AuthenticatedUser,
    repo: web::Data<ApiRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    if let Err(response) = ensure_section(&req, &user) {
        return response;
    }

    let repo = session_repo(&repo, &user);
    match rutas_service::load_rutas_propias(&repo, &user).await {
        Ok(data) => {
            let mut context = base_context(&flash_messages, &user, "rutas");
            context.insert("rutas", &data.rutas);
            context.insert("conteo", &data.conteo);
            render_template(&tera, "rutas/propias.html", &context)
        }
        Err(err) => page_failure(err, &user, &flash_messages, &tera),
    }
}
