//! Actix handlers and the helpers they share.

use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse};
use actix_web_flash_messages::{IncomingFlashMessages, Level};
use serde::de::DeserializeOwned;
use tera::{Context, Tera};

use crate::domain::usuario::Role;
use crate::forms;
use crate::models::auth::AuthenticatedUser;
use crate::notifications::Notificacion;
use crate::repository::ApiRepository;
use crate::services::{ServiceError, ServiceResult};

pub mod auth;
pub mod catalogo;
pub mod clientes;
pub mod facturas;
pub mod home;
pub mod pedidos;
pub mod rutas;
pub mod ubicaciones;
pub mod usuarios;

/// Roles whose pages live under their own path prefix.
const SECTIONS: [Role; 4] = [
    Role::Bodeguero,
    Role::Facturador,
    Role::Transportista,
    Role::Vendedor,
];

pub fn alert_level_to_str(level: &Level) -> &'static str {
    match level {
        Level::Error => "danger",
        Level::Warning => "warning",
        Level::Success => "success",
        _ => "info",
    }
}

pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}

pub fn render_template(tera: &Tera, template: &str, context: &Context) -> HttpResponse {
    match tera.render(template, context) {
        Ok(body) => HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(body),
        Err(err) => {
            log::error!("Failed to render template '{template}': {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

pub fn alerts(flash_messages: &IncomingFlashMessages) -> Vec<(String, &'static str)> {
    flash_messages
        .iter()
        .map(|f| (f.content().to_string(), alert_level_to_str(&f.level())))
        .collect()
}

/// Context every authenticated page starts from: alerts, user, sidebar.
pub fn base_context(
    flash_messages: &IncomingFlashMessages,
    user: &AuthenticatedUser,
    current_page: &str,
) -> Context {
    let role = user.role();
    let mut context = Context::new();
    context.insert("alerts", &alerts(flash_messages));
    context.insert("current_user", user);
    context.insert("current_page", current_page);
    context.insert("menu", &role.map(Role::menu).unwrap_or_default());
    context.insert("prefix", role.map_or("", Role::prefix));
    context.insert("home_url", user.home_path());
    context
}

/// Section a request path belongs to.
fn section_of(path: &str) -> Role {
    SECTIONS
        .into_iter()
        .find(|role| {
            path.strip_prefix(role.prefix())
                .is_some_and(|rest| rest.starts_with('/'))
        })
        .unwrap_or(Role::Admin)
}

/// Role of `user` when `req` targets that role's section; otherwise an
/// "Acceso Restringido" redirect to the user's own home.
pub fn ensure_section(req: &HttpRequest, user: &AuthenticatedUser) -> Result<Role, HttpResponse> {
    let section = section_of(req.path());
    match user.role() {
        Some(role) if role == section => Ok(role),
        _ => {
            log::warn!(
                "User {} with role {} denied access to {}",
                user.identificacion,
                user.rol,
                req.path()
            );
            Notificacion::acceso_restringido().send();
            Err(redirect(user.home_path()))
        }
    }
}

/// Sidebar path of the page `key` for the user's role.
pub fn page_path(user: &AuthenticatedUser, key: &str) -> String {
    let Some(role) = user.role() else {
        return "/".to_string();
    };
    role.menu()
        .into_iter()
        .find(|item| item.key == key)
        .map(|item| item.path)
        .unwrap_or_else(|| format!("{}/{key}", role.prefix()))
}

/// Backend client authenticated as the session user.
pub fn session_repo(repo: &ApiRepository, user: &AuthenticatedUser) -> ApiRepository {
    repo.with_token(&user.token)
}

/// Query string parameters; malformed input falls back to the defaults.
pub fn query<T: DeserializeOwned + Default>(req: &HttpRequest) -> T {
    forms::parse(req.query_string().as_bytes()).unwrap_or_else(|err| {
        log::warn!("Ignoring query '{}': {err}", req.query_string());
        T::default()
    })
}

/// Parses an urlencoded body into a form.
pub fn parse_form<T: DeserializeOwned>(body: &[u8]) -> ServiceResult<T> {
    forms::parse(body).map_err(|err| ServiceError::Form(err.to_string()))
}

/// Response for a page whose data could not be loaded.
pub fn page_failure(
    err: ServiceError,
    user: &AuthenticatedUser,
    flash_messages: &IncomingFlashMessages,
    tera: &Tera,
) -> HttpResponse {
    match err {
        ServiceError::SessionExpired => HttpResponse::Unauthorized().finish(),
        ServiceError::Unauthorized => {
            Notificacion::acceso_restringido().send();
            redirect(user.home_path())
        }
        err => {
            log::error!("Failed to load page: {err}");
            let notificacion = err.notificacion();
            let mut context = base_context(flash_messages, user, "error");
            context.insert("titulo", notificacion.titulo);
            context.insert("descripcion", &notificacion.descripcion);
            render_template(tera, "error.html", &context)
        }
    }
}

/// Response for a failed form submission: flash the reason and go `back`.
pub fn action_failure(err: ServiceError, user: &AuthenticatedUser, back: &str) -> HttpResponse {
    match err {
        ServiceError::SessionExpired => HttpResponse::Unauthorized().finish(),
        ServiceError::Unauthorized => {
            Notificacion::acceso_restringido().send();
            redirect(user.home_path())
        }
        err => {
            log::error!("Failed to process {back}: {err}");
            err.notificacion().send();
            redirect(back)
        }
    }
}
