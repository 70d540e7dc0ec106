use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse, Responder, routes, web};
use actix_web_flash_messages::IncomingFlashMessages;
use serde::Serialize;
use tera::Tera;

use crate::domain::producto::FiltroCatalogo;
use crate::domain::usuario::Role;
use crate::dto::catalogo::{DescripcionesPageData, SearchQuery};
use crate::forms::DescripcionForm;
use crate::forms::catalogo::ProductoForm;
use crate::models::auth::AuthenticatedUser;
use crate::notifications::Notificacion;
use crate::repository::ApiRepository;
use crate::routes::{
    action_failure, base_context, ensure_section, page_failure, page_path, parse_form, query,
    redirect, render_template, session_repo,
};
use crate::services::catalogo as catalogo_service;

fn puede_editar(user: &AuthenticatedUser) -> bool {
    matches!(user.role(), Some(Role::Admin | Role::Bodeguero))
}

#[routes]
#[get("/inventario")]
#[get("/bodega/inventario")]
#[get("/vendedor/inventario")]
pub async fn show_inventario(
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
    match catalogo_service::list_inventario(&repo, &user, params).await {
        Ok(data) => {
            let mut context = base_context(&flash_messages, &user, "inventario");
            context.insert("productos", &data.productos);
            context.insert("categorias", &data.categorias);
            context.insert("marcas", &data.marcas);
            context.insert("stock_bajo", &data.stock_bajo);
            context.insert("search_query", &data.search_query);
            context.insert("puede_editar", &puede_editar(&user));
            context.insert("base_path", &page_path(&user, "inventario"));
            render_template(&tera, "catalogo/inventario.html", &context)
        }
        Err(err) => page_failure(err, &user, &flash_messages, &tera),
    }
}

async fn render_producto_form(
    user: &AuthenticatedUser,
    repo: &ApiRepository,
    id_producto: Option<i32>,
    flash_messages: &IncomingFlashMessages,
    tera: &Tera,
) -> HttpResponse {
    match catalogo_service::load_producto_form(repo, user, id_producto).await {
        Ok(data) => {
            let mut context = base_context(flash_messages, user, "inventario");
            context.insert("producto", &data.producto);
            context.insert("categorias", &data.categorias);
            context.insert("marcas", &data.marcas);
            context.insert("base_path", &page_path(user, "inventario"));
            render_template(tera, "catalogo/producto_form.html", &context)
        }
        Err(err) => page_failure(err, user, flash_messages, tera),
    }
}

#[routes]
#[get("/inventario/nuevo")]
#[get("/bodega/inventario/nuevo")]
pub async fn new_producto(
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
    render_producto_form(&user, &repo, None, &flash_messages, &tera).await
}

#[routes]
#[post("/inventario/nuevo")]
#[post("/bodega/inventario/nuevo")]
pub async fn create_producto(
    req: HttpRequest,
    user: AuthenticatedUser,
    repo: web::Data<ApiRepository>,
    body: web::Bytes,
) -> impl Responder {
    if let Err(response) = ensure_section(&req, &user) {
        return response;
    }

    let base_path = page_path(&user, "inventario");
    let repo = session_repo(&repo, &user);
    let result = match parse_form::<ProductoForm>(&body) {
        Ok(form) => catalogo_service::create_producto(&repo, &user, form).await,
        Err(err) => Err(err),
    };
    match result {
        Ok(producto) => {
            Notificacion::guardado(&format!("El producto {}", producto.nombre)).send();
            redirect(&base_path)
        }
        Err(err) => action_failure(err, &user, &format!("{base_path}/nuevo")),
    }
}

#[routes]
#[get("/inventario/{id_producto}/editar")]
#[get("/bodega/inventario/{id_producto}/editar")]
pub async fn edit_producto(
    req: HttpRequest,
    id_producto: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<ApiRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    if let Err(response) = ensure_section(&req, &user) {
        return response;
    }

    let repo = session_repo(&repo, &user);
    render_producto_form(
        &user,
        &repo,
        Some(id_producto.into_inner()),
        &flash_messages,
        &tera,
    )
    .await
}

#[routes]
#[post("/inventario/{id_producto}/editar")]
#[post("/bodega/inventario/{id_producto}/editar")]
pub async fn update_producto(
    req: HttpRequest,
    id_producto: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<ApiRepository>,
    body: web::Bytes,
) -> impl Responder {
    if let Err(response) = ensure_section(&req, &user) {
        return response;
    }

    let id_producto = id_producto.into_inner();
    let base_path = page_path(&user, "inventario");
    let repo = session_repo(&repo, &user);
    let result = match parse_form::<ProductoForm>(&body) {
        Ok(form) => catalogo_service::update_producto(&repo, &user, id_producto, form).await,
        Err(err) => Err(err),
    };
    match result {
        Ok(producto) => {
            Notificacion::actualizado(&format!("El producto {}", producto.nombre)).send();
            redirect(&base_path)
        }
        Err(err) => action_failure(err, &user, &format!("{base_path}/{id_producto}/editar")),
    }
}

#[routes]
#[post("/inventario/{id_producto}/eliminar")]
#[post("/bodega/inventario/{id_producto}/eliminar")]
pub async fn delete_producto(
    req: HttpRequest,
    id_producto: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<ApiRepository>,
) -> impl Responder {
    if let Err(response) = ensure_section(&req, &user) {
        return response;
    }

    let base_path = page_path(&user, "inventario");
    let repo = session_repo(&repo, &user);
    match catalogo_service::delete_producto(&repo, &user, id_producto.into_inner()).await {
        Ok(()) => {
            Notificacion::eliminado("El producto").send();
            redirect(&base_path)
        }
        Err(err) => action_failure(err, &user, &base_path),
    }
}

#[routes]
#[get("/catalogo")]
#[get("/bodega/catalogo")]
#[get("/vendedor/catalogo")]
pub async fn show_catalogo(
    req: HttpRequest,
    user: AuthenticatedUser,
    repo: web::Data<ApiRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    if let Err(response) = ensure_section(&req, &user) {
        return response;
    }

    let filtro: FiltroCatalogo = query(&req);
    let repo = session_repo(&repo, &user);
    match catalogo_service::load_catalogo(&repo, &user, filtro).await {
        Ok(data) => {
            let mut context = base_context(&flash_messages, &user, "catalogo");
            context.insert("productos", &data.productos);
            context.insert("categorias", &data.categorias);
            context.insert("marcas", &data.marcas);
            context.insert("filtro", &data.filtro);
            context.insert("base_path", &page_path(&user, "catalogo"));
            render_template(&tera, "catalogo/catalogo.html", &context)
        }
        Err(err) => page_failure(err, &user, &flash_messages, &tera),
    }
}

#[routes]
#[get("/catalogo/pdf")]
#[get("/bodega/catalogo/pdf")]
#[get("/vendedor/catalogo/pdf")]
pub async fn catalogo_pdf(
    req: HttpRequest,
    user: AuthenticatedUser,
    repo: web::Data<ApiRepository>,
) -> impl Responder {
    if let Err(response) = ensure_section(&req, &user) {
        return response;
    }

    let repo = session_repo(&repo, &user);
    match catalogo_service::catalogo_pdf(&repo, &user).await {
        Ok(pdf) => HttpResponse::Ok()
            .content_type("application/pdf")
            .insert_header((
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"catalogo.pdf\"",
            ))
            .body(pdf),
        Err(err) => action_failure(err, &user, &page_path(&user, "catalogo")),
    }
}

/// Shared list page of categories, brands and roles.
pub(crate) fn render_descripciones<T: Serialize>(
    data: &DescripcionesPageData<T>,
    titulo: &str,
    id_campo: &str,
    page_key: &str,
    user: &AuthenticatedUser,
    flash_messages: &IncomingFlashMessages,
    tera: &Tera,
) -> HttpResponse {
    let mut context = base_context(flash_messages, user, page_key);
    context.insert("titulo", titulo);
    context.insert("id_campo", id_campo);
    context.insert("items", &data.items);
    context.insert("search_query", &data.search_query);
    context.insert("base_path", &page_path(user, page_key));
    render_template(tera, "catalogo/descripciones.html", &context)
}

#[routes]
#[get("/categorias")]
#[get("/bodega/categoria")]
pub async fn show_categorias(
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
    match catalogo_service::list_categorias(&repo, &user, params).await {
        Ok(data) => render_descripciones(
            &data,
            "Categorías",
            "id_categoria",
            "categorias",
            &user,
            &flash_messages,
            &tera,
        ),
        Err(err) => page_failure(err, &user, &flash_messages, &tera),
    }
}

#[routes]
#[post("/categorias/nuevo")]
#[post("/bodega/categoria/nuevo")]
pub async fn create_categoria(
    req: HttpRequest,
    user: AuthenticatedUser,
    repo: web::Data<ApiRepository>,
    web::Form(form): web::Form<DescripcionForm>,
) -> impl Responder {
    if let Err(response) = ensure_section(&req, &user) {
        return response;
    }

    let base_path = page_path(&user, "categorias");
    let repo = session_repo(&repo, &user);
    match catalogo_service::create_categoria(&repo, &user, form).await {
        Ok(_) => {
            Notificacion::guardado("La categoría").send();
            redirect(&base_path)
        }
        Err(err) => action_failure(err, &user, &base_path),
    }
}

#[routes]
#[post("/categorias/{id_categoria}/editar")]
#[post("/bodega/categoria/{id_categoria}/editar")]
pub async fn update_categoria(
    req: HttpRequest,
    id_categoria: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<ApiRepository>,
    web::Form(form): web::Form<DescripcionForm>,
) -> impl Responder {
    if let Err(response) = ensure_section(&req, &user) {
        return response;
    }

    let base_path = page_path(&user, "categorias");
    let repo = session_repo(&repo, &user);
    match catalogo_service::update_categoria(&repo, &user, id_categoria.into_inner(), form).await {
        Ok(_) => {
            Notificacion::actualizado("La categoría").send();
            redirect(&base_path)
        }
        Err(err) => action_failure(err, &user, &base_path),
    }
}

#[routes]
#[post("/categorias/{id_categoria}/eliminar")]
#[post("/bodega/categoria/{id_categoria}/eliminar")]
pub async fn delete_categoria(
    req: HttpRequest,
    id_categoria: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<ApiRepository>,
) -> impl Responder {
    if let Err(response) = ensure_section(&req, &user) {
        return response;
    }

    let base_path = page_path(&user, "categorias");
    let repo = session_repo(&repo, &user);
    match catalogo_service::delete_categoria(&repo, &user, id_categoria.into_inner()).await {
        Ok(()) => {
            Notificacion::eliminado("La categoría").send();
            redirect(&base_path)
        }
        Err(err) => action_failure(err, &user, &base_path),
    }
}

#[routes]
#[get("/marcas")]
#[get("/bodega/marca")]
pub async fn show_marcas(
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
    match catalogo_service::list_marcas(&repo, &user, params).await {
        Ok(data) => render_descripciones(
            &data,
            "Marcas",
            "id_marca",
            "marcas",
            &user,
            &flash_messages,
            &tera,
        ),
        Err(err) => page_failure(err, &user, &flash_messages, &tera),
    }
}

#[routes]
#[post("/marcas/nuevo")]
#[post("/bodega/marca/nuevo")]
pub async fn create_marca(
    req: HttpRequest,
    user: AuthenticatedUser,
    repo: web::Data<ApiRepository>,
    web::Form(form): web::Form<DescripcionForm>,
) -> impl Responder {
    if let Err(response) = ensure_section(&req, &user) {
        return response;
    }

    let base_path = page_path(&user, "marcas");
    let repo = session_repo(&repo, &user);
    match catalogo_service::create_marca(&repo, &user, form).await {
        Ok(_) => {
            Notificacion::guardado("La marca").send();
            redirect(&base_path)
        }
        Err(err) => action_failure(err, &user, &base_path),
    }
}

#[routes]
#[post("/marcas/{id_marca}/editar")]
#[post("/bodega/marca/{id_marca}/editar")]
pub async fn update_marca(
    req: HttpRequest,
    id_marca: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<ApiRepository>,
    web::Form(form): web::Form<DescripcionForm>,
) -> impl Responder {
    if let Err(response) = ensure_section(&req, &user) {
        return response;
    }

    let base_path = page_path(&user, "marcas");
    let repo = session_repo(&repo, &user);
    match catalogo_service::update_marca(&repo, &user, id_marca.into_inner(), form).await {
        Ok(_) => {
            Notificacion::actualizado("La marca").send();
            redirect(&base_path)
        }
        Err(err) => action_failure(err, &user, &base_path),
    }
}

#[routes]
#[post("/marcas/{id_marca}/eliminar")]
#[post("/bodega/marca/{id_marca}/eliminar")]
pub async fn delete_marca(
    req: HttpRequest,
    id_marca: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<ApiRepository>,
) -> impl Responder {
    if let Err(response) = ensure_section(&req, &user) {
        return response;
    }

    let base_path = page_path(&user, "marcas");
    let repo = session_repo(&repo, &user);
    match catalogo_service::delete_marca(&repo, &user, id_marca.into_inner()).await {
        Ok(()) => {
            Notificacion::eliminado("La marca").send();
            redirect(&base_path)
        }
        Err(err) => action_failure(err, &user, &base_path),
    }
}
