use actix_web::{HttpRequest, Responder, get, post, web};
use actix_web_flash_messages::IncomingFlashMessages;
use serde::Deserialize;
use tera::Tera;

use crate::dto::ubicaciones::UbicacionesQuery;
use crate::forms::ubicaciones::UbicacionForm;
use crate::models::auth::AuthenticatedUser;
use crate::notifications::Notificacion;
use crate::repository::ApiRepository;
use crate::routes::{
    action_failure, base_context, ensure_section, page_failure, parse_form, query, redirect,
    render_template, session_repo,
};
use crate::services::ubicaciones as ubicaciones_service;

#[derive(Default, Deserialize)]
struct NuevaUbicacionQuery {
    cod_cliente: Option<String>,
}

#[get("/ubicaciones")]
pub async fn show_ubicaciones(
    req: HttpRequest,
    user: AuthenticatedUser,
    repo: web::Data<ApiRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    if let Err(response) = ensure_section(&req, &user) {
        return response;
    }

    let params: UbicacionesQuery = query(&req);
    let repo = session_repo(&repo, &user);
    match ubicaciones_service::list_ubicaciones(&repo, &user, params).await {
        Ok(data) => {
            let mut context = base_context(&flash_messages, &user, "ubicaciones");
            context.insert("ubicaciones", &data.ubicaciones);
            context.insert("clientes", &data.clientes);
            context.insert("sectores", &data.sectores);
            context.insert("estadisticas", &data.estadisticas);
            context.insert("search_query", &data.search_query);
            context.insert("sector", &data.sector);
            context.insert("cod_cliente", &data.cod_cliente);
            render_template(&tera, "ubicaciones/index.html", &context)
        }
        Err(err) => page_failure(err, &user, &flash_messages, &tera),
    }
}

#[get("/ubicaciones/resumen")]
pub async fn show_resumen(
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
    match ubicaciones_service::load_resumen(&repo, &user).await {
        Ok(data) => {
            let mut context = base_context(&flash_messages, &user, "ubicaciones");
            context.insert("resumen", &data.resumen);
            context.insert("integridad", &data.integridad);
            render_template(&tera, "ubicaciones/resumen.html", &context)
        }
        Err(err) => page_failure(err, &user, &flash_messages, &tera),
    }
}

#[get("/ubicaciones/nuevo")]
pub async fn new_ubicacion(
    req: HttpRequest,
    user: AuthenticatedUser,
    repo: web::Data<ApiRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    if let Err(response) = ensure_section(&req, &user) {
        return response;
    }

    let params: NuevaUbicacionQuery = query(&req);
    let repo = session_repo(&repo, &user);
    match ubicaciones_service::load_ubicacion_form(&repo, &user, None).await {
        Ok(mut data) => {
            if let Some(cod_cliente) = params.cod_cliente {
                data.ubicacion.cod_cliente = cod_cliente;
            }
            let mut context = base_context(&flash_messages, &user, "ubicaciones");
            context.insert("ubicacion", &data.ubicacion);
            context.insert("clientes", &data.clientes);
            context.insert("es_nueva", &true);
            render_template(&tera, "ubicaciones/form.html", &context)
        }
        Err(err) => page_failure(err, &user, &flash_messages, &tera),
    }
}

#[post("/ubicaciones/nuevo")]
pub async fn create_ubicacion(
    req: HttpRequest,
    user: AuthenticatedUser,
    repo: web::Data<ApiRepository>,
    body: web::Bytes,
) -> impl Responder {
    if let Err(response) = ensure_section(&req, &user) {
        return response;
    }

    let repo = session_repo(&repo, &user);
    let result = match parse_form::<UbicacionForm>(&body) {
        Ok(form) => ubicaciones_service::create_ubicacion(&repo, &user, form).await,
        Err(err) => Err(err),
    };
    match result {
        Ok(ubicacion) => {
            Notificacion::guardado("La ubicación").send();
            redirect(&format!("/clientes/{}", ubicacion.cod_cliente))
        }
        Err(err) => action_failure(err, &user, "/ubicaciones/nuevo"),
    }
}

#[get("/ubicaciones/{id_ubicacion}/editar")]
pub async fn edit_ubicacion(
    req: HttpRequest,
    id_ubicacion: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<ApiRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    if let Err(response) = ensure_section(&req, &user) {
        return response;
    }

    let repo = session_repo(&repo, &user);
    let id_ubicacion = id_ubicacion.into_inner();
    match ubicaciones_service::load_ubicacion_form(&repo, &user, Some(id_ubicacion)).await {
        Ok(data) => {
            let mut context = base_context(&flash_messages, &user, "ubicaciones");
            context.insert("ubicacion", &data.ubicacion);
            context.insert("clientes", &data.clientes);
            context.insert("es_nueva", &false);
            render_template(&tera, "ubicaciones/form.html", &context)
        }
        Err(err) => page_failure(err, &user, &flash_messages, &tera),
    }
}

#[post("/ubicaciones/{id_ubicacion}/editar")]
pub async fn update_ubicacion(
    req: HttpRequest,
    id_ubicacion: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<ApiRepository>,
    body: web::Bytes,
) -> impl Responder {
    if let Err(response) = ensure_section(&req, &user) {
        return response;
    }

    let id_ubicacion = id_ubicacion.into_inner();
    let repo = session_repo(&repo, &user);
    let result = match parse_form::<UbicacionForm>(&body) {
        Ok(form) => ubicaciones_service::update_ubicacion(&repo, &user, id_ubicacion, form).await,
        Err(err) => Err(err),
    };
    match result {
        Ok(_) => {
            Notificacion::actualizado("La ubicación").send();
            redirect("/ubicaciones")
        }
        Err(err) => action_failure(
            err,
            &user,
            &format!("/ubicaciones/{id_ubicacion}/editar"),
        ),
    }
}

#[post("/ubicaciones/{id_ubicacion}/eliminar")]
pub async fn delete_ubicacion(
    req: HttpRequest,
    id_ubicacion: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<ApiRepository>,
) -> impl Responder {
    if let Err(response) = ensure_section(&req, &user) {
        return response;
    }

    let repo = session_repo(&repo, &user);
    match ubicaciones_service::delete_ubicacion(&repo, &user, id_ubicacion.into_inner()).await {
        Ok(()) => {
            Notificacion::eliminado("La ubicación").send();
            redirect("/ubicaciones")
        }
        Err(err) => action_failure(err, &user, "/ubicaciones"),
    }
}
