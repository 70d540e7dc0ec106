use actix_web::{HttpRequest, HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::IncomingFlashMessages;
use tera::Tera;

use crate::domain::usuario::Role;
use crate::dto::catalogo::SearchQuery;
use crate::dto::usuarios::EmpleadosQuery;
use crate::forms::DescripcionForm;
use crate::forms::usuarios::UsuarioForm;
use crate::models::auth::AuthenticatedUser;
use crate::notifications::Notificacion;
use crate::repository::ApiRepository;
use crate::routes::catalogo::render_descripciones;
use crate::routes::{
    action_failure, base_context, ensure_section, page_failure, parse_form, query, redirect,
    render_template, session_repo,
};
use crate::services::usuarios as usuarios_service;

#[get("/empleados")]
pub async fn show_empleados(
    req: HttpRequest,
    user: AuthenticatedUser,
    repo: web::Data<ApiRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    if let Err(response) = ensure_section(&req, &user) {
        return response;
    }

    let params: EmpleadosQuery = query(&req);
    let repo = session_repo(&repo, &user);
    match usuarios_service::list_empleados(&repo, &user, params).await {
        Ok(data) => {
            let mut context = base_context(&flash_messages, &user, "empleados");
            context.insert("usuarios", &data.usuarios);
            context.insert("roles", &data.roles);
            context.insert("search_query", &data.search_query);
            context.insert("rol", &data.rol);
            render_template(&tera, "usuarios/index.html", &context)
        }
        Err(err) => page_failure(err, &user, &flash_messages, &tera),
    }
}

async fn render_usuario_form(
    user: &AuthenticatedUser,
    repo: &ApiRepository,
    identificacion: Option<&str>,
    flash_messages: &IncomingFlashMessages,
    tera: &Tera,
) -> HttpResponse {
    match usuarios_service::load_usuario_form(repo, user, identificacion).await {
        Ok(data) => {
            let mut context = base_context(flash_messages, user, "empleados");
            context.insert("usuario", &data.usuario);
            context.insert("roles", &data.roles);
            render_template(tera, "usuarios/form.html", &context)
        }
        Err(err) => page_failure(err, user, flash_messages, tera),
    }
}

#[get("/empleados/nuevo")]
pub async fn new_usuario(
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
    render_usuario_form(&user, &repo, None, &flash_messages, &tera).await
}

#[post("/empleados/nuevo")]
pub async fn create_usuario(
    req: HttpRequest,
    user: AuthenticatedUser,
    repo: web::Data<ApiRepository>,
    body: web::Bytes,
) -> impl Responder {
    if let Err(response) = ensure_section(&req, &user) {
        return response;
    }

    let repo = session_repo(&repo, &user);
    let result = match parse_form::<UsuarioForm>(&body) {
        Ok(form) => usuarios_service::create_usuario(&repo, &user, form).await,
        Err(err) => Err(err),
    };
    match result {
        Ok(usuario) => {
            Notificacion::guardado(&format!("El empleado {}", usuario.nombre)).send();
            redirect("/empleados")
        }
        Err(err) => action_failure(err, &user, "/empleados/nuevo"),
    }
}

#[get("/empleados/{identificacion}/editar")]
pub async fn edit_usuario(
    req: HttpRequest,
    identificacion: web::Path<String>,
    user: AuthenticatedUser,
    repo: web::Data<ApiRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    if let Err(response) = ensure_section(&req, &user) {
        return response;
    }

    let repo = session_repo(&repo, &user);
    render_usuario_form(
        &user,
        &repo,
        Some(identificacion.as_str()),
        &flash_messages,
        &tera,
    )
    .await
}

#[post("/empleados/{identificacion}/editar")]
pub async fn update_usuario(
    req: HttpRequest,
    identificacion: web::Path<String>,
    user: AuthenticatedUser,
    repo: web::Data<ApiRepository>,
    body: web::Bytes,
) -> impl Responder {
    if let Err(response) = ensure_section(&req, &user) {
        return response;
    }

    let repo = session_repo(&repo, &user);
    let result = match parse_form::<UsuarioForm>(&body) {
        Ok(form) => usuarios_service::update_usuario(&repo, &user, &identificacion, form).await,
        Err(err) => Err(err),
    };
    match result {
        Ok(usuario) => {
            Notificacion::actualizado(&format!("El empleado {}", usuario.nombre)).send();
            redirect("/empleados")
        }
        Err(err) => action_failure(
            err,
            &user,
            &format!("/empleados/{identificacion}/editar"),
        ),
    }
}

#[post("/empleados/{identificacion}/eliminar")]
pub async fn delete_usuario(
    req: HttpRequest,
    identificacion: web::Path<String>,
    user: AuthenticatedUser,
    repo: web::Data<ApiRepository>,
) -> impl Responder {
    if let Err(response) = ensure_section(&req, &user) {
        return response;
    }

    let repo = session_repo(&repo, &user);
    match usuarios_service::delete_usuario(&repo, &user, &identificacion).await {
        Ok(()) => {
            Notificacion::eliminado("El empleado").send();
            redirect("/empleados")
        }
        Err(err) => action_failure(err, &user, "/empleados"),
    }
}

/// Sellers, as seen by the invoicing section.
#[get("/facturador/vendedor")]
pub async fn show_vendedores(
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
    match usuarios_service::list_por_rol(&repo, &user, Role::Vendedor).await {
        Ok(vendedores) => {
            let mut context = base_context(&flash_messages, &user, "vendedores");
            context.insert("vendedores", &vendedores);
            render_template(&tera, "usuarios/vendedores.html", &context)
        }
        Err(err) => page_failure(err, &user, &flash_messages, &tera),
    }
}

#[get("/roles")]
pub async fn show_roles(
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
    match usuarios_service::list_roles(&repo, &user, params).await {
        Ok(data) => render_descripciones(
            &data,
            "Roles",
            "id_rol",
            "roles",
            &user,
            &flash_messages,
            &tera,
        ),
        Err(err) => page_failure(err, &user, &flash_messages, &tera),
    }
}

#[post("/roles/nuevo")]
pub async fn create_rol(
    req: HttpRequest,
    user: AuthenticatedUser,
    repo: web::Data<ApiRepository>,
    web::Form(form): web::Form<DescripcionForm>,
) -> impl Responder {
    if let Err(response) = ensure_section(&req, &user) {
        return response;
    }

    let repo = session_repo(&repo, &user);
    match usuarios_service::create_rol(&repo, &user, form).await {
        Ok(_) => {
            Notificacion::guardado("El rol").send();
            redirect("/roles")
        }
        Err(err) => action_failure(err, &user, "/roles"),
    }
}

#[post("/roles/{id_rol}/editar")]
pub async fn update_rol(
    req: HttpRequest,
    id_rol: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<ApiRepository>,
    web::Form(form): web::Form<DescripcionForm>,
) -> impl Responder {
    if let Err(response) = ensure_section(&req, &user) {
        return response;
    }

    let repo = session_repo(&repo, &user);
    match usuarios_service::update_rol(&repo, &user, id_rol.into_inner(), form).await {
        Ok(_) => {
            Notificacion::actualizado("El rol").send();
            redirect("/roles")
        }
        Err(err) => action_failure(err, &user, "/roles"),
    }
}

#[post("/roles/{id_rol}/eliminar")]
pub async fn delete_rol(
    req: HttpRequest,
    id_rol: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<ApiRepository>,
) -> impl Responder {
    if let Err(response) = ensure_section(&req, &user) {
        return response;
    }

    let repo = session_repo(&repo, &user);
    match usuarios_service::delete_rol(&repo, &user, id_rol.into_inner()).await {
        Ok(()) => {
            Notificacion::eliminado("El rol").send();
            redirect("/roles")
        }
        Err(err) => action_failure(err, &user, "/roles"),
    }
}
