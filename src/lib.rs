#[cfg(feature = "server")]
use actix_cors::Cors;
#[cfg(feature = "server")]
use actix_files::Files;
#[cfg(feature = "server")]
use actix_identity::IdentityMiddleware;
#[cfg(feature = "server")]
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
#[cfg(feature = "server")]
use actix_web::cookie::Key;
#[cfg(feature = "server")]
use actix_web::{App, HttpServer, web};
#[cfg(feature = "server")]
use actix_web_flash_messages::{FlashMessagesFramework, storage::CookieMessageStore};
#[cfg(feature = "server")]
use tera::Tera;

#[cfg(feature = "server")]
use crate::middleware::RedirectUnauthorized;
#[cfg(feature = "server")]
use crate::models::config::ServerConfig;
#[cfg(feature = "server")]
use crate::repository::ApiRepository;
#[cfg(feature = "server")]
use crate::routes::{
    auth, catalogo, clientes, facturas, home, pedidos, rutas, ubicaciones, usuarios,
};

pub mod domain;
#[cfg(feature = "server")]
pub mod dto;
#[cfg(feature = "server")]
pub mod forms;
#[cfg(feature = "server")]
pub mod middleware;
#[cfg(feature = "server")]
pub mod models;
#[cfg(feature = "server")]
pub mod notifications;
#[cfg(feature = "server")]
pub mod pagination;
#[cfg(feature = "server")]
pub mod repository;
#[cfg(feature = "server")]
pub mod routes;
#[cfg(feature = "server")]
pub mod services;

/// Builds and runs the Actix-Web HTTP server using the provided configuration.
#[cfg(feature = "server")]
pub async fn run(server_config: ServerConfig) -> std::io::Result<()> {
    // Anonymous backend client; handlers derive per-session clients from it.
    let repo = ApiRepository::new(&server_config.api_base_url, server_config.api_timeout())
        .map_err(|e| std::io::Error::other(format!("Failed to build the API client: {e}")))?;

    // Keys and stores for identity, sessions, and flash messages.
    let secret_key = Key::from(server_config.secret.as_bytes());

    let message_store = CookieMessageStore::builder(secret_key.clone()).build();
    let message_framework = FlashMessagesFramework::builder(message_store).build();

    let tera = Tera::new(&server_config.templates_dir)
        .map_err(|e| std::io::Error::other(format!("Template parsing error(s): {e}")))?;

    let bind_address = (server_config.address.clone(), server_config.port);
    log::info!(
        "Serving on {}:{} against {}",
        bind_address.0,
        bind_address.1,
        server_config.api_base_url
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .wrap(message_framework.clone())
            .wrap(IdentityMiddleware::default())
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), secret_key.clone())
                    .cookie_secure(false) // set to true in prod
                    .cookie_domain(Some(server_config.domain.clone()))
                    .build(),
            )
            .wrap(actix_web::middleware::Compress::default())
            .wrap(actix_web::middleware::Logger::default())
            .service(Files::new("/assets", "./assets"))
            .service(auth::show_login)
            .service(auth::login)
            .service(auth::logout)
            .service(
                web::scope("")
                    .wrap(RedirectUnauthorized)
                    .service(home::show_home)
                    // Literal client paths go before `/clientes/{cod_cliente}`.
                    .service(clientes::show_clientes)
                    .service(clientes::export_clientes)
                    .service(clientes::new_cliente)
                    .service(clientes::create_cliente)
                    .service(clientes::show_dashboard)
                    .service(clientes::repair_principales)
                    .service(clientes::show_cliente)
                    .service(clientes::edit_cliente)
                    .service(clientes::update_cliente)
                    .service(clientes::set_principal)
                    .service(clientes::delete_cliente)
                    .service(ubicaciones::show_ubicaciones)
                    .service(ubicaciones::show_resumen)
                    .service(ubicaciones::new_ubicacion)
                    .service(ubicaciones::create_ubicacion)
                    .service(ubicaciones::edit_ubicacion)
                    .service(ubicaciones::update_ubicacion)
                    .service(ubicaciones::delete_ubicacion)
                    .service(catalogo::show_inventario)
                    .service(catalogo::new_producto)
                    .service(catalogo::create_producto)
                    .service(catalogo::edit_producto)
                    .service(catalogo::update_producto)
                    .service(catalogo::delete_producto)
                    .service(catalogo::show_catalogo)
                    .service(catalogo::catalogo_pdf)
                    .service(catalogo::show_categorias)
                    .service(catalogo::create_categoria)
                    .service(catalogo::update_categoria)
                    .service(catalogo::delete_categoria)
                    .service(catalogo::show_marcas)
                    .service(catalogo::create_marca)
                    .service(catalogo::update_marca)
                    .service(catalogo::delete_marca)
                    .service(usuarios::show_empleados)
                    .service(usuarios::new_usuario)
                    .service(usuarios::create_usuario)
                    .service(usuarios::edit_usuario)
                    .service(usuarios::update_usuario)
                    .service(usuarios::delete_usuario)
                    .service(usuarios::show_vendedores)
                    .service(usuarios::show_roles)
                    .service(usuarios::create_rol)
                    .service(usuarios::update_rol)
                    .service(usuarios::delete_rol)
                    .service(pedidos::show_pedidos)
                    .service(pedidos::new_pedido)
                    .service(pedidos::create_pedido)
                    .service(pedidos::show_pedido)
                    .service(pedidos::edit_pedido)
                    .service(pedidos::update_pedido)
                    .service(pedidos::add_estado)
                    .service(pedidos::delete_pedido)
                    .service(pedidos::show_caja)
                    .service(facturas::show_facturas)
                    .service(facturas::show_factura)
                    .service(rutas::show_rutas)
                    .service(rutas::new_ruta)
                    .service(rutas::create_ruta)
                    .service(rutas::edit_ruta)
                    .service(rutas::update_ruta)
                    .service(rutas::delete_ruta)
                    .service(rutas::show_entregas)
                    .service(rutas::show_ventas)
                    .service(rutas::show_rutas_propias),
            )
            .app_data(web::Data::new(tera.clone()))
            .app_data(web::Data::new(repo.clone()))
            .app_data(web::Data::new(server_config.clone()))
    })
    .bind(bind_address)?
    .run()
    .await
}
