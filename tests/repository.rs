use std::net::TcpListener;
use std::time::Duration;

use actix_web::{App, HttpRequest, HttpResponse, HttpServer, web};
use serde_json::json;

use vendly::domain::cliente::NewCliente;
use vendly::repository::errors::RepositoryError;
use vendly::repository::{ApiRepository, ClienteReader, ClienteWriter};

const TOKEN: &str = "token-de-prueba";

fn authorized(req: &HttpRequest) -> bool {
    req.headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {TOKEN}"))
}

async fn clientes(req: HttpRequest) -> HttpResponse {
    if !authorized(&req) {
        return HttpResponse::Unauthorized().json(json!({"detail": "Token inválido"}));
    }
    HttpResponse::Ok().json(json!([
        {"cod_cliente": "C1", "identificacion": 1711111111, "nombre": "Tienda Ana", "sector": "Norte"},
        {"cod_cliente": "C2", "identificacion": "1722222222", "nombre": "Distribuidora Sur"}
    ]))
}

async fn con_ubicaciones() -> HttpResponse {
    HttpResponse::Ok().json(json!([
        {
            "cod_cliente": "C1",
            "identificacion": "1711111111",
            "nombre": "Tienda Ana",
            "ubicaciones": [{"id_ubicacion": 4, "latitud": -0.18, "longitud": -78.47}]
        }
    ]))
}

async fn cliente(path: web::Path<String>) -> HttpResponse {
    if path.as_str() == "C1" {
        HttpResponse::Ok().json(json!({"cod_cliente": "C1", "identificacion": "1", "nombre": "Tienda Ana"}))
    } else {
        HttpResponse::NotFound().json(json!({"detail": "Cliente no encontrado"}))
    }
}

async fn crear_cliente() -> HttpResponse {
    HttpResponse::UnprocessableEntity().json(json!({
        "detail": [
            {"loc": ["body", "correo"], "msg": "correo inválido", "type": "value_error"},
            {"loc": ["body", "celular"], "msg": "celular muy corto", "type": "value_error"}
        ]
    }))
}

/// Starts a loopback backend and returns its base URL.
fn spawn_backend() -> String {
    let server = HttpServer::new(|| {
        App::new()
            .route("/clientes", web::get().to(clientes))
            .route("/clientes", web::post().to(crear_cliente))
            .route("/clientes/con-ubicaciones", web::get().to(con_ubicaciones))
            .route("/clientes/{cod_cliente}", web::get().to(cliente))
    })
    .workers(1)
    .bind(("127.0.0.1", 0))
    .unwrap();
    let addr = server.addrs()[0];
    actix_web::rt::spawn(server.run());
    format!("http://{addr}")
}

fn nuevo_cliente() -> NewCliente {
    NewCliente {
        cod_cliente: "C9".into(),
        identificacion: "1799999999".into(),
        nombre: "Nuevo".into(),
        direccion: "Av. Amazonas".into(),
        celular: "0999".into(),
        correo: "nuevo".into(),
        tipo_cliente: "natural".into(),
        razon_social: String::new(),
        sector: "Centro".into(),
        id_ubicacion_principal: None,
    }
}

#[actix_web::test]
async fn lists_clients_with_bearer_token() {
    let repo = ApiRepository::new(&spawn_backend(), Duration::from_secs(5))
        .unwrap()
        .with_token(TOKEN);

    let clientes = repo.list_clientes().await.unwrap();
    assert_eq!(clientes.len(), 2);
    assert_eq!(clientes[0].identificacion, "1711111111");
    assert_eq!(clientes[1].sector, "");
    assert!(!repo.session_rejected());
}

#[actix_web::test]
async fn rejected_token_latches_the_copy() {
    let base = ApiRepository::new(&spawn_backend(), Duration::from_secs(5)).unwrap();
    let repo = base.with_token("caducado");

    assert!(matches!(
        repo.list_clientes().await,
        Err(RepositoryError::Unauthorized)
    ));
    assert!(matches!(
        repo.list_clientes().await,
        Err(RepositoryError::Unauthorized)
    ));
    assert!(repo.session_rejected());
    assert!(!base.session_rejected());
}

#[actix_web::test]
async fn missing_client_is_none() {
    let repo = ApiRepository::new(&spawn_backend(), Duration::from_secs(5)).unwrap();

    assert!(repo.get_cliente("C404").await.unwrap().is_none());
    assert_eq!(repo.get_cliente("C1").await.unwrap().unwrap().nombre, "Tienda Ana");
}

#[actix_web::test]
async fn nested_locations_inherit_their_client() {
    let repo = ApiRepository::new(&spawn_backend(), Duration::from_secs(5)).unwrap();

    let filas = repo.list_clientes_con_ubicaciones().await.unwrap();
    let (cliente, ubicaciones) = &filas[0];
    assert_eq!(cliente.cod_cliente, "C1");
    assert_eq!(ubicaciones[0].cod_cliente, "C1");
}

#[actix_web::test]
async fn validation_messages_are_joined() {
    let repo = ApiRepository::new(&spawn_backend(), Duration::from_secs(5)).unwrap();

    match repo.create_cliente(&nuevo_cliente()).await {
        Err(RepositoryError::Validation(detail)) => {
            assert_eq!(detail, "correo inválido; celular muy corto")
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[actix_web::test]
async fn unreachable_backend_is_a_network_error() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let repo =
        ApiRepository::new(&format!("http://127.0.0.1:{port}"), Duration::from_secs(5)).unwrap();

    assert!(matches!(
        repo.list_clientes().await,
        Err(RepositoryError::Network(_))
    ));
}
