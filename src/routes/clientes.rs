use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse, Responder, get, post, routes, web};
use actix_web_flash_messages::IncomingFlashMessages;
use tera::Tera;

use crate::domain::usuario::Role;
use crate::dto::clientes::ClientesQuery;
use crate::forms::clientes::{ClienteForm, PrincipalForm};
use crate::models::auth::AuthenticatedUser;
use crate::notifications::Notificacion;
use crate::repository::ApiRepository;
use crate::routes::{
    action_failure, base_context, ensure_section, page_failure, page_path, parse_form, query,
    redirect, render_template, session_repo,
};
use crate::services::clientes as clientes_service;

fn puede_editar(user: &AuthenticatedUser) -> bool {
    matches!(
        user.role(),
        Some(Role::Admin | Role::Vendedor | Role::Facturador)
    )
}

#[routes]
#[get("/clientes")]
#[get("/facturador/clientes")]
#[get("/transportista/clientes")]
#[get("/vendedor/clientes")]
pub async fn show_clientes(
    req: HttpRequest,
    user: AuthenticatedUser,
    repo: web::Data<ApiRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    if let Err(response) = ensure_section(&req, &user) {
        return response;
    }

    let params: ClientesQuery = query(&req);
    let repo = session_repo(&repo, &user);
    match clientes_service::list_clientes(&repo, &user, params).await {
        Ok(data) => {
            let mut context = base_context(&flash_messages, &user, "clientes");
            context.insert("clientes", &data.clientes);
            context.insert("sectores", &data.sectores);
            context.insert("search_query", &data.search_query);
            context.insert("sector", &data.sector);
            context.insert("puede_editar", &puede_editar(&user));
            context.insert("base_path", &page_path(&user, "clientes"));
            render_template(&tera, "clientes/index.html", &context)
        }
        Err(err) => page_failure(err, &user, &flash_messages, &tera),
    }
}

#[routes]
#[get("/clientes/exportar")]
#[get("/facturador/clientes/exportar")]
#[get("/transportista/clientes/exportar")]
#[get("/vendedor/clientes/exportar")]
pub async fn export_clientes(
    req: HttpRequest,
    user: AuthenticatedUser,
    repo: web::Data<ApiRepository>,
) -> impl Responder {
    if let Err(response) = ensure_section(&req, &user) {
        return response;
    }

    let params: ClientesQuery = query(&req);
    let repo = session_repo(&repo, &user);
    match clientes_service::export_clientes(&repo, &user, params).await {
        Ok(csv) => HttpResponse::Ok()
            .content_type("text/csv; charset=utf-8")
            .insert_header((
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"clientes.csv\"",
            ))
            .body(csv),
        Err(err) => action_failure(err, &user, &page_path(&user, "clientes")),
    }
}

#[routes]
#[get("/clientes/nuevo")]
#[get("/facturador/clientes/nuevo")]
#[get("/vendedor/clientes/nuevo")]
pub async fn new_cliente(
    req: HttpRequest,
    user: AuthenticatedUser,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    if let Err(response) = ensure_section(&req, &user) {
        return response;
    }
    if !puede_editar(&user) {
        Notificacion::acceso_restringido().send();
        return redirect(user.home_path());
    }

    let mut context = base_context(&flash_messages, &user, "clientes");
    context.insert("base_path", &page_path(&user, "clientes"));
    render_template(&tera, "clientes/form.html", &context)
}

#[routes]
#[post("/clientes/nuevo")]
#[post("/facturador/clientes/nuevo")]
#[post("/vendedor/clientes/nuevo")]
pub async fn create_cliente(
    req: HttpRequest,
    user: AuthenticatedUser,
    repo: web::Data<ApiRepository>,
    body: web::Bytes,
) -> impl Responder {
    if let Err(response) = ensure_section(&req, &user) {
        return response;
    }

    let base_path = page_path(&user, "clientes");
    let repo = session_repo(&repo, &user);
    let result = match parse_form::<ClienteForm>(&body) {
        Ok(form) => clientes_service::create_cliente(&repo, &user, form).await,
        Err(err) => Err(err),
    };
    match result {
        Ok(cliente) => {
            Notificacion::guardado(&format!("El cliente {}", cliente.nombre)).send();
            redirect(&base_path)
        }
        Err(err) => action_failure(err, &user, &format!("{base_path}/nuevo")),
    }
}

#[get("/clientes/dashboard")]
pub async fn show_dashboard(
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
    match clientes_service::load_dashboard(&repo, &user).await {
        Ok(data) => {
            let mut context = base_context(&flash_messages, &user, "clientes");
            context.insert("estadisticas", &data.estadisticas);
            context.insert("integridad", &data.integridad);
            context.insert("tiene_problemas", &data.integridad.tiene_problemas());
            render_template(&tera, "clientes/dashboard.html", &context)
        }
        Err(err) => page_failure(err, &user, &flash_messages, &tera),
    }
}

#[post("/clientes/reparar")]
pub async fn repair_principales(
    req: HttpRequest,
    user: AuthenticatedUser,
    repo: web::Data<ApiRepository>,
) -> impl Responder {
    if let Err(response) = ensure_section(&req, &user) {
        return response;
    }

    let repo = session_repo(&repo, &user);
    match clientes_service::repair_principales(&repo, &user).await {
        Ok(resultado) => {
            Notificacion::exito(
                "Reparación Completada",
                format!(
                    "{} cliente(s) reparado(s), {} error(es).",
                    resultado.reparados,
                    resultado.errores.len()
                ),
            )
            .send();
            for detalle in &resultado.detalles {
                Notificacion::exito(
                    "Cliente Reparado",
                    format!("{}: {}", detalle.cod_cliente, detalle.accion),
                )
                .send();
            }
            for error in resultado.errores {
                Notificacion::operacion_fallida(&error).send();
            }
            redirect("/clientes/dashboard")
        }
        Err(err) => action_failure(err, &user, "/clientes/dashboard"),
    }
}

#[routes]
#[get("/clientes/{cod_cliente}")]
#[get("/facturador/clientes/{cod_cliente}")]
#[get("/transportista/clientes/{cod_cliente}")]
#[get("/vendedor/clientes/{cod_cliente}")]
pub async fn show_cliente(
    req: HttpRequest,
    cod_cliente: web::Path<String>,
    user: AuthenticatedUser,
    repo: web::Data<ApiRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    if let Err(response) = ensure_section(&req, &user) {
        return response;
    }

    let repo = session_repo(&repo, &user);
    match clientes_service::load_cliente(&repo, &user, &cod_cliente).await {
        Ok(data) => {
            let mut context = base_context(&flash_messages, &user, "clientes");
            context.insert("cliente", &data.cliente);
            context.insert("sugerir_principal", &data.sugerir_principal);
            context.insert("puede_editar", &puede_editar(&user));
            context.insert("base_path", &page_path(&user, "clientes"));
            render_template(&tera, "clientes/detalle.html", &context)
        }
        Err(err) => page_failure(err, &user, &flash_messages, &tera),
    }
}

#[routes]
#[get("/clientes/{cod_cliente}/editar")]
#[get("/facturador/clientes/{cod_cliente}/editar")]
#[get("/vendedor/clientes/{cod_cliente}/editar")]
pub async fn edit_cliente(
    req: HttpRequest,
    cod_cliente: web::Path<String>,
    user: AuthenticatedUser,
    repo: web::Data<ApiRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    if let Err(response) = ensure_section(&req, &user) {
        return response;
    }

    let repo = session_repo(&repo, &user);
    match clientes_service::load_cliente(&repo, &user, &cod_cliente).await {
        Ok(data) => {
            let mut context = base_context(&flash_messages, &user, "clientes");
            context.insert("cliente", &data.cliente);
            context.insert("base_path", &page_path(&user, "clientes"));
            render_template(&tera, "clientes/form.html", &context)
        }
        Err(err) => page_failure(err, &user, &flash_messages, &tera),
    }
}

#[routes]
#[post("/clientes/{cod_cliente}/editar")]
#[post("/facturador/clientes/{cod_cliente}/editar")]
#[post("/vendedor/clientes/{cod_cliente}/editar")]
pub async fn update_cliente(
    req: HttpRequest,
    cod_cliente: web::Path<String>,
    user: AuthenticatedUser,
    repo: web::Data<ApiRepository>,
    body: web::Bytes,
) -> impl Responder {
    if let Err(response) = ensure_section(&req, &user) {
        return response;
    }

    let detalle_path = format!("{}/{}", page_path(&user, "clientes"), cod_cliente);
    let repo = session_repo(&repo, &user);
    let result = match parse_form::<ClienteForm>(&body) {
        Ok(form) => clientes_service::update_cliente(&repo, &user, &cod_cliente, form).await,
        Err(err) => Err(err),
    };
    match result {
        Ok(cliente) => {
            Notificacion::actualizado(&format!("El cliente {}", cliente.nombre)).send();
            redirect(&detalle_path)
        }
        Err(err) => action_failure(err, &user, &format!("{detalle_path}/editar")),
    }
}

#[routes]
#[post("/clientes/{cod_cliente}/principal")]
#[post("/facturador/clientes/{cod_cliente}/principal")]
#[post("/vendedor/clientes/{cod_cliente}/principal")]
pub async fn set_principal(
    req: HttpRequest,
    cod_cliente: web::Path<String>,
    user: AuthenticatedUser,
    repo: web::Data<ApiRepository>,
    web::Form(form): web::Form<PrincipalForm>,
) -> impl Responder {
    if let Err(response) = ensure_section(&req, &user) {
        return response;
    }

    let detalle_path = format!("{}/{}", page_path(&user, "clientes"), cod_cliente);
    let repo = session_repo(&repo, &user);
    match clientes_service::set_principal(&repo, &user, &cod_cliente, form.id_ubicacion).await {
        Ok(()) => {
            Notificacion::actualizado("La ubicación principal").send();
            redirect(&detalle_path)
        }
        Err(err) => action_failure(err, &user, &detalle_path),
    }
}

#[post("/clientes/{cod_cliente}/eliminar")]
pub async fn delete_cliente(
    req: HttpRequest,
    cod_cliente: web::Path<String>,
    user: AuthenticatedUser,
    repo: web::Data<ApiRepository>,
) -> impl Responder {
    if let Err(response) = ensure_section(&req, &user) {
        return response;
    }

    let repo = session_repo(&repo, &user);
    match clientes_service::delete_cliente(&repo, &user, &cod_cliente).await {
        Ok(()) => {
            Notificacion::eliminado("El cliente").send();
            redirect("/clientes")
        }
        Err(err) => action_failure(err, &user, "/clientes"),
    }
}
