use serde::Serialize;

use crate::domain::cliente::Cliente;
use crate::domain::factura::Factura;
use crate::domain::pedido::{DetallePedido, EstadoPedido, Pedido, ResumenCaja};
use crate::domain::producto::Producto;
use crate::domain::ubicacion::UbicacionCliente;
use crate::pagination::Paginated;

/// Order row of the lists: the order, its client name and current estado.
#[derive(Debug, Serialize)]
pub struct FilaPedido {
    pub pedido: Pedido,
    pub cliente: String,
    pub estado: String,
}

#[derive(Debug, Serialize)]
pub struct PedidosPageData {
    pub pedidos: Paginated<FilaPedido>,
    pub search_query: Option<String>,
}

/// Choices offered by the order form.
#[derive(Debug, Serialize)]
pub struct PedidoFormData {
    pub pedido: Option<Pedido>,
    pub clientes: Vec<Cliente>,
    pub productos: Vec<Producto>,
    pub ubicaciones: Vec<UbicacionCliente>,
}

/// Order line joined with its product name.
#[derive(Debug, Serialize)]
pub struct LineaDetalle {
    pub detalle: DetallePedido,
    pub producto: String,
}

#[derive(Debug, Serialize)]
pub struct PedidoDetalle {
    pub pedido: Pedido,
    pub cliente: Option<Cliente>,
    pub lineas: Vec<LineaDetalle>,
    /// History, most recent first.
    pub estados: Vec<EstadoPedido>,
    pub estado_actual: String,
    pub estados_disponibles: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct CajaPageData {
    pub pedidos: Vec<FilaPedido>,
    pub resumen: ResumenCaja,
}

#[derive(Debug, Serialize)]
pub struct FacturasPageData {
    pub facturas: Paginated<Factura>,
    pub search_query: Option<String>,
}
