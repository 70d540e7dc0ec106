//! Backend access: reader/writer traits per resource and the HTTP-backed
//! [`ApiRepository`] implementing them.
#![allow(async_fn_in_trait)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use reqwest::{Method, RequestBuilder, Response, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::domain::cliente::{Cliente, NewCliente, UpdatePrincipal};
use crate::domain::factura::Factura;
use crate::domain::pedido::{EstadoPedido, NewEstadoPedido, NewPedido, Pedido, UpdatePedido};
use crate::domain::producto::{Categoria, Marca, NewDescripcion, NewProducto, Producto};
use crate::domain::ruta::{NewRuta, Ruta};
use crate::domain::ubicacion::{NewUbicacion, UbicacionCliente};
use crate::domain::usuario::{Credenciales, LoginResponse, NewRol, NewUsuario, Rol, Usuario};
use crate::repository::errors::{RepositoryError, RepositoryResult};

pub mod auth;
pub mod cliente;
pub mod errors;
pub mod factura;
pub mod pedido;
pub mod producto;
pub mod rol;
pub mod ruta;
pub mod ubicacion;
pub mod usuario;

/// HTTP client bound to the backend base URL.
///
/// The application keeps one instance; every request derives a copy carrying
/// the session token through [`ApiRepository::with_token`]. Copies share the
/// connection pool but not the rejection latch.
#[derive(Clone, Debug)]
pub struct ApiRepository {
    client: reqwest::Client,
    base_url: Url,
    token: Option<String>,
    rejected: Arc<AtomicBool>,
}

impl ApiRepository {
    pub fn new(base_url: &str, timeout: Duration) -> RepositoryResult<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| RepositoryError::Network(format!("invalid backend url: {e}")))?;
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url,
            token: None,
            rejected: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Copy that authenticates as the session user.
    pub fn with_token(&self, token: &str) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            token: Some(token.to_string()),
            rejected: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Whether the backend answered 401 to any call made through this copy.
    pub fn session_rejected(&self) -> bool {
        self.rejected.load(Ordering::SeqCst)
    }

    fn url(&self, segments: &[&str]) -> RepositoryResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| RepositoryError::Network("backend url cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> RepositoryResult<RequestBuilder> {
        let builder = self.client.request(method, self.url(segments)?);
        Ok(match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        })
    }

    async fn send(&self, builder: RequestBuilder) -> RepositoryResult<Response> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let err = RepositoryError::from_status(status, &body);
        if matches!(err, RepositoryError::Unauthorized) && !self.rejected.swap(true, Ordering::SeqCst)
        {
            log::warn!("Backend rejected the session token");
        }
        Err(err)
    }

    async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> RepositoryResult<T> {
        let response = self.send(self.request(Method::GET, segments)?).await?;
        Ok(response.json::<T>().await?)
    }

    /// Like [`Self::get`] with 404 mapped to `None`.
    async fn find<T: DeserializeOwned>(&self, segments: &[&str]) -> RepositoryResult<Option<T>> {
        match self.get(segments).await {
            Ok(value) => Ok(Some(value)),
            Err(RepositoryError::NotFound) => Ok(None),
            Err(err) => Err(err),
        }
    }

    async fn post<B, T>(&self, segments: &[&str], body: &B) -> RepositoryResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .send(self.request(Method::POST, segments)?.json(body))
            .await?;
        Ok(response.json::<T>().await?)
    }

    async fn put<B, T>(&self, segments: &[&str], body: &B) -> RepositoryResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .send(self.request(Method::PUT, segments)?.json(body))
            .await?;
        Ok(response.json::<T>().await?)
    }

    /// PUT whose response body is ignored.
    async fn put_empty(&self, segments: &[&str]) -> RepositoryResult<()> {
        self.send(self.request(Method::PUT, segments)?).await?;
        Ok(())
    }

    async fn delete(&self, segments: &[&str]) -> RepositoryResult<()> {
        self.send(self.request(Method::DELETE, segments)?).await?;
        Ok(())
    }

    async fn get_bytes(&self, segments: &[&str]) -> RepositoryResult<Vec<u8>> {
        let response = self.send(self.request(Method::GET, segments)?).await?;
        Ok(response.bytes().await?.to_vec())
    }
}

pub trait AuthReader {
    async fn login(&self, credenciales: &Credenciales) -> RepositoryResult<LoginResponse>;
}

pub trait RolReader {
    async fn list_roles(&self) -> RepositoryResult<Vec<Rol>>;
    async fn get_rol(&self, id_rol: i32) -> RepositoryResult<Option<Rol>>;
}

pub trait RolWriter {
    async fn create_rol(&self, rol: &NewRol) -> RepositoryResult<Rol>;
    async fn update_rol(&self, id_rol: i32, rol: &NewRol) -> RepositoryResult<Rol>;
    async fn delete_rol(&self, id_rol: i32) -> RepositoryResult<()>;
}

pub trait UsuarioReader {
    async fn list_usuarios(&self) -> RepositoryResult<Vec<Usuario>>;
    async fn get_usuario(&self, identificacion: &str) -> RepositoryResult<Option<Usuario>>;
    async fn list_usuarios_por_rol(&self, rol: &str) -> RepositoryResult<Vec<Usuario>>;
}

pub trait UsuarioWriter {
    async fn create_usuario(&self, usuario: &NewUsuario) -> RepositoryResult<Usuario>;
    async fn update_usuario(
        &self,
        identificacion: &str,
        usuario: &NewUsuario,
    ) -> RepositoryResult<Usuario>;
    async fn delete_usuario(&self, identificacion: &str) -> RepositoryResult<()>;
}

pub trait ClienteReader {
    async fn list_clientes(&self) -> RepositoryResult<Vec<Cliente>>;
    async fn get_cliente(&self, cod_cliente: &str) -> RepositoryResult<Option<Cliente>>;
    /// Clients with their locations nested.
    async fn list_clientes_con_ubicaciones(
        &self,
    ) -> RepositoryResult<Vec<(Cliente, Vec<UbicacionCliente>)>>;
}

pub trait ClienteWriter {
    async fn create_cliente(&self, cliente: &NewCliente) -> RepositoryResult<Cliente>;
    async fn update_cliente(&self, cod_cliente: &str, cliente: &NewCliente)
    -> RepositoryResult<Cliente>;
    async fn update_principal(
        &self,
        cod_cliente: &str,
        update: &UpdatePrincipal,
    ) -> RepositoryResult<Cliente>;
    async fn delete_cliente(&self, cod_cliente: &str) -> RepositoryResult<()>;
}

pub trait UbicacionReader {
    async fn list_ubicaciones(&self) -> RepositoryResult<Vec<UbicacionCliente>>;
    async fn get_ubicacion(&self, id_ubicacion: i32) -> RepositoryResult<Option<UbicacionCliente>>;
    async fn list_ubicaciones_cliente(
        &self,
        cod_cliente: &str,
    ) -> RepositoryResult<Vec<UbicacionCliente>>;
}

pub trait UbicacionWriter {
    async fn create_ubicacion(&self, ubicacion: &NewUbicacion)
    -> RepositoryResult<UbicacionCliente>;
    async fn update_ubicacion(
        &self,
        id_ubicacion: i32,
        ubicacion: &NewUbicacion,
    ) -> RepositoryResult<UbicacionCliente>;
    async fn delete_ubicacion(&self, id_ubicacion: i32) -> RepositoryResult<()>;
    /// Dedicated principal endpoint; `NotFound` when the backend lacks it.
    async fn set_ubicacion_principal(
        &self,
        cod_cliente: &str,
        id_ubicacion: i32,
    ) -> RepositoryResult<()>;
}

pub trait CategoriaReader {
    async fn list_categorias(&self) -> RepositoryResult<Vec<Categoria>>;
    async fn get_categoria(&self, id_categoria: i32) -> RepositoryResult<Option<Categoria>>;
}

pub trait CategoriaWriter {
    async fn create_categoria(&self, categoria: &NewDescripcion) -> RepositoryResult<Categoria>;
    async fn update_categoria(
        &self,
        id_categoria: i32,
        categoria: &NewDescripcion,
    ) -> RepositoryResult<Categoria>;
    async fn delete_categoria(&self, id_categoria: i32) -> RepositoryResult<()>;
}

pub trait MarcaReader {
    async fn list_marcas(&self) -> RepositoryResult<Vec<Marca>>;
    async fn get_marca(&self, id_marca: i32) -> RepositoryResult<Option<Marca>>;
}

pub trait MarcaWriter {
    async fn create_marca(&self, marca: &NewDescripcion) -> RepositoryResult<Marca>;
    async fn update_marca(&self, id_marca: i32, marca: &NewDescripcion)
    -> RepositoryResult<Marca>;
    async fn delete_marca(&self, id_marca: i32) -> RepositoryResult<()>;
}

pub trait ProductoReader {
    async fn list_productos(&self) -> RepositoryResult<Vec<Producto>>;
    async fn get_producto(&self, id_producto: i32) -> RepositoryResult<Option<Producto>>;
    /// Catalog rendered as PDF by the backend.
    async fn catalogo_pdf(&self) -> RepositoryResult<Vec<u8>>;
}

pub trait ProductoWriter {
    async fn create_producto(&self, producto: &NewProducto) -> RepositoryResult<Producto>;
    async fn update_producto(
        &self,
        id_producto: i32,
        producto: &NewProducto,
    ) -> RepositoryResult<Producto>;
    async fn delete_producto(&self, id_producto: i32) -> RepositoryResult<()>;
}

pub trait PedidoReader {
    async fn list_pedidos(&self) -> RepositoryResult<Vec<Pedido>>;
    async fn get_pedido(&self, id_pedido: i32) -> RepositoryResult<Option<Pedido>>;
    async fn list_estados_pedido(&self) -> RepositoryResult<Vec<EstadoPedido>>;
}

pub trait PedidoWriter {
    async fn create_pedido(&self, pedido: &NewPedido) -> RepositoryResult<Pedido>;
    async fn update_pedido(&self, id_pedido: i32, pedido: &UpdatePedido)
    -> RepositoryResult<Pedido>;
    async fn delete_pedido(&self, id_pedido: i32) -> RepositoryResult<()>;
    async fn create_estado_pedido(&self, estado: &NewEstadoPedido)
    -> RepositoryResult<EstadoPedido>;
}

pub trait FacturaReader {
    async fn list_facturas(&self) -> RepositoryResult<Vec<Factura>>;
    async fn get_factura(&self, id_factura: i32) -> RepositoryResult<Option<Factura>>;
}

pub trait RutaReader {
    async fn list_rutas(&self) -> RepositoryResult<Vec<Ruta>>;
    async fn get_ruta(&self, id_ruta: i32) -> RepositoryResult<Option<Ruta>>;
    async fn list_rutas_usuario(&self, identificacion: &str) -> RepositoryResult<Vec<Ruta>>;
}

pub trait RutaWriter {
    async fn create_ruta(&self, ruta: &NewRuta) -> RepositoryResult<Ruta>;
    async fn update_ruta(&self, id_ruta: i32, ruta: &NewRuta) -> RepositoryResult<Ruta>;
    async fn delete_ruta(&self, id_ruta: i32) -> RepositoryResult<()>;
}
