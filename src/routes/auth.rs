use actix_identity::Identity;
use actix_web::{HttpRequest, Responder, get, post, web};
use actix_web_flash_messages::IncomingFlashMessages;
use serde::Deserialize;
use tera::{Context, Tera};

use crate::forms::auth::LoginForm;
use crate::models::auth::AuthenticatedUser;
use crate::models::config::ServerConfig;
use crate::notifications::{Notificacion, mensaje_inicio};
use crate::repository::ApiRepository;
use crate::routes::{alert_level_to_str, alerts, redirect, render_template};
use crate::services::auth::{self as auth_service, LoginError};

#[derive(Deserialize)]
struct LoginQuery {
    message: Option<String>,
}

#[get("/")]
pub async fn show_login(
    user: Option<AuthenticatedUser>,
    params: web::Query<LoginQuery>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    if let Some(user) = user.filter(|u| u.role().is_some()) {
        return redirect(user.home_path());
    }

    let mut alerts = alerts(&flash_messages);
    if let Some(mensaje) = params.message.as_deref().and_then(mensaje_inicio) {
        alerts.push((mensaje.to_string(), alert_level_to_str(&mensaje.nivel)));
    }

    let mut context = Context::new();
    context.insert("alerts", &alerts);
    render_template(&tera, "auth/login.html", &context)
}

#[post("/login")]
pub async fn login(
    req: HttpRequest,
    repo: web::Data<ApiRepository>,
    server_config: web::Data<ServerConfig>,
    web::Form(form): web::Form<LoginForm>,
) -> impl Responder {
    let result = async {
        let login = auth_service::authenticate(repo.get_ref(), form).await?;
        let session = repo.with_token(&login.access_token);
        auth_service::open_session(&session, login, &server_config.api_jwt_secret).await
    }
    .await;

    match result {
        Ok(user) => {
            if let Err(err) = user.login(&req) {
                log::error!("Failed to store the session of {}: {err}", user.identificacion);
                Notificacion::servidor().send();
                return redirect("/");
            }
            log::info!("User {} logged in as {}", user.identificacion, user.rol);
            Notificacion::exito("Bienvenido", format!("Hola, {}", user.nombre)).send();
            redirect(user.home_path())
        }
        Err(LoginError::Form(message)) => {
            Notificacion::validacion(Some(message.as_str())).send();
            redirect("/")
        }
        Err(LoginError::Rejected(reason)) => {
            reason.notificacion().send();
            redirect("/")
        }
    }
}

#[post("/logout")]
pub async fn logout(user: Option<Identity>) -> impl Responder {
    if let Some(user) = user {
        user.logout();
    }
    redirect("/?message=logout")
}
