use actix_web::{HttpRequest, HttpResponse, Responder, get, post, routes, web};
use actix_web_flash_messages::IncomingFlashMessages;
use chrono::{Local, Utc};
use tera::Tera;

use crate::domain::usuario::Role;
use crate::dto::catalogo::SearchQuery;
use crate::forms::pedidos::{EstadoForm, PedidoForm};
use crate::models::auth::AuthenticatedUser;
use crate::notifications::Notificacion;
use crate::repository::ApiRepository;
use crate::routes::{
    action_failure, base_context, ensure_section, page_failure, page_path, parse_form, query,
    redirect, render_template, session_repo,
};
use crate::services::pedidos as pedidos_service;

fn puede_crear(user: &AuthenticatedUser) -> bool {
    matches!(
        user.role(),
        Some(Role::Admin | Role::Vendedor | Role::Facturador)
    )
}

#[routes]
#[get("/pedidos")]
#[get("/facturador/pedidos")]
#[get("/transportista/pedidos")]
#[get("/vendedor/pedidos")]
pub async fn show_pedidos(
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
    match pedidos_service::list_pedidos(&repo, &user, params).await {
        Ok(data) => {
            let mut context = base_context(&flash_messages, &user, "pedidos");
            context.insert("pedidos", &data.pedidos);
            context.insert("search_query", &data.search_query);
            context.insert("puede_crear", &puede_crear(&user));
            context.insert("es_admin", &(user.role() == Some(Role::Admin)));
            context.insert("base_path", &page_path(&user, "pedidos"));
            render_template(&tera, "pedidos/index.html", &context)
        }
        Err(err) => page_failure(err, &user, &flash_messages, &tera),
    }
}

async fn render_pedido_form(
    user: &AuthenticatedUser,
    repo: &ApiRepository,
    id_pedido: Option<i32>,
    flash_messages: &IncomingFlashMessages,
    tera: &Tera,
) -> HttpResponse {
    match pedidos_service::load_pedido_form(repo, user, id_pedido).await {
        Ok(data) => {
            let mut context = base_context(flash_messages, user, "pedidos");
            context.insert("pedido", &data.pedido);
            context.insert("clientes", &data.clientes);
            context.insert("productos", &data.productos);
            context.insert("ubicaciones", &data.ubicaciones);
            context.insert("base_path", &page_path(user, "pedidos"));
            render_template(tera, "pedidos/form.html", &context)
        }
        Err(err) => page_failure(err, user, flash_messages, tera),
    }
}

#[routes]
#[get("/pedidos/nuevo")]
#[get("/facturador/pedidos/nuevo")]
#[get("/vendedor/pedidos/nuevo")]
pub async fn new_pedido(
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
    render_pedido_form(&user, &repo, None, &flash_messages, &tera).await
}

#[routes]
#[post("/pedidos/nuevo")]
#[post("/facturador/pedidos/nuevo")]
#[post("/vendedor/pedidos/nuevo")]
pub async fn create_pedido(
    req: HttpRequest,
    user: AuthenticatedUser,
    repo: web::Data<ApiRepository>,
    body: web::Bytes,
) -> impl Responder {
    if let Err(response) = ensure_section(&req, &user) {
        return response;
    }

    let base_path = page_path(&user, "pedidos");
    let repo = session_repo(&repo, &user);
    let result = match parse_form::<PedidoForm>(&body) {
        Ok(form) => pedidos_service::create_pedido(&repo, &user, form, Utc::now()).await,
        Err(err) => Err(err),
    };
    match result {
        Ok(pedido) => {
            Notificacion::guardado(&format!("El pedido {}", pedido.numero_pedido)).send();
            redirect(&format!("{base_path}/{}", pedido.id_pedido))
        }
        Err(err) => action_failure(err, &user, &format!("{base_path}/nuevo")),
    }
}

#[routes]
#[get("/pedidos/{id_pedido:\\d+}")]
#[get("/facturador/pedidos/{id_pedido:\\d+}")]
#[get("/transportista/pedidos/{id_pedido:\\d+}")]
#[get("/vendedor/pedidos/{id_pedido:\\d+}")]
pub async fn show_pedido(
    req: HttpRequest,
    id_pedido: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<ApiRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    if let Err(response) = ensure_section(&req, &user) {
        return response;
    }

    let repo = session_repo(&repo, &user);
    match pedidos_service::load_pedido(&repo, &user, id_pedido.into_inner()).await {
        Ok(data) => {
            let mut context = base_context(&flash_messages, &user, "pedidos");
            context.insert("pedido", &data.pedido);
            context.insert("cliente", &data.cliente);
            context.insert("lineas", &data.lineas);
            context.insert("estados", &data.estados);
            context.insert("estado_actual", &data.estado_actual);
            context.insert("estados_disponibles", &data.estados_disponibles);
            context.insert("puede_editar", &puede_crear(&user));
            context.insert("es_admin", &(user.role() == Some(Role::Admin)));
            context.insert("base_path", &page_path(&user, "pedidos"));
            render_template(&tera, "pedidos/detalle.html", &context)
        }
        Err(err) => page_failure(err, &user, &flash_messages, &tera),
    }
}

#[routes]
#[get("/pedidos/{id_pedido}/editar")]
#[get("/facturador/pedidos/{id_pedido}/editar")]
#[get("/vendedor/pedidos/{id_pedido}/editar")]
pub async fn edit_pedido(
    req: HttpRequest,
    id_pedido: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<ApiRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    if let Err(response) = ensure_section(&req, &user) {
        return response;
    }

    let repo = session_repo(&repo, &user);
    render_pedido_form(
        &user,
        &repo,
        Some(id_pedido.into_inner()),
        &flash_messages,
        &tera,
    )
    .await
}

#[routes]
#[post("/pedidos/{id_pedido}/editar")]
#[post("/facturador/pedidos/{id_pedido}/editar")]
#[post("/vendedor/pedidos/{id_pedido}/editar")]
pub async fn update_pedido(
    req: HttpRequest,
    id_pedido: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<ApiRepository>,
    body: web::Bytes,
) -> impl Responder {
    if let Err(response) = ensure_section(&req, &user) {
        return response;
    }

    let id_pedido = id_pedido.into_inner();
    let detalle_path = format!("{}/{id_pedido}", page_path(&user, "pedidos"));
    let repo = session_repo(&repo, &user);
    let result = match parse_form::<PedidoForm>(&body) {
        Ok(form) => {
            pedidos_service::update_pedido(&repo, &user, id_pedido, form, Utc::now()).await
        }
        Err(err) => Err(err),
    };
    match result {
        Ok(pedido) => {
            Notificacion::actualizado(&format!("El pedido {}", pedido.numero_pedido)).send();
            redirect(&detalle_path)
        }
        Err(err) => action_failure(err, &user, &format!("{detalle_path}/editar")),
    }
}

#[routes]
#[post("/pedidos/{id_pedido}/estado")]
#[post("/facturador/pedidos/{id_pedido}/estado")]
#[post("/transportista/pedidos/{id_pedido}/estado")]
pub async fn add_estado(
    req: HttpRequest,
    id_pedido: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<ApiRepository>,
    web::Form(form): web::Form<EstadoForm>,
) -> impl Responder {
    if let Err(response) = ensure_section(&req, &user) {
        return response;
    }

    let id_pedido = id_pedido.into_inner();
    let detalle_path = format!("{}/{id_pedido}", page_path(&user, "pedidos"));
    let repo = session_repo(&repo, &user);
    let hoy = Local::now().date_naive();
    match pedidos_service::add_estado(&repo, &user, id_pedido, form, hoy).await {
        Ok(estado) => {
            Notificacion::exito(
                "Estado Actualizado",
                format!("El pedido pasó a {}.", estado.descripcion),
            )
            .send();
            redirect(&detalle_path)
        }
        Err(err) => action_failure(err, &user, &detalle_path),
    }
}

#[post("/pedidos/{id_pedido}/eliminar")]
pub async fn delete_pedido(
    req: HttpRequest,
    id_pedido: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<ApiRepository>,
) -> impl Responder {
    if let Err(response) = ensure_section(&req, &user) {
        return response;
    }

    let repo = session_repo(&repo, &user);
    match pedidos_service::delete_pedido(&repo, &user, id_pedido.into_inner()).await {
        Ok(()) => {
            Notificacion::eliminado("El pedido").send();
            redirect("/pedidos")
        }
        Err(err) => action_failure(err, &user, "/pedidos"),
    }
}

/// Today's sales of the seller section.
#[get("/vendedor/caja")]
pub async fn show_caja(
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
    let hoy = Local::now().date_naive();
    match pedidos_service::load_caja(&repo, &user, hoy).await {
        Ok(data) => {
            let mut context = base_context(&flash_messages, &user, "caja");
            context.insert("pedidos", &data.pedidos);
            context.insert("resumen", &data.resumen);
            context.insert("hoy", &hoy.format("%Y-%m-%d").to_string());
            render_template(&tera, "pedidos/caja.html", &context)
        }
        Err(err) => page_failure(err, &user, &flash_messages, &tera),
    }
}
