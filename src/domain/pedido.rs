use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::cliente::Cliente;
use crate::domain::producto::Producto;
use crate::domain::types::round_cents;

/// VAT applied to order subtotals.
pub const IVA: f64 = 0.12;

/// Estado shown when an order has no recorded state.
pub const SIN_ESTADO: &str = "Sin estado";

/// States an operator can move an order through.
pub const ESTADOS_PEDIDO: [&str; 4] = ["Facturado", "Despachado", "Enviado", "Entregado"];

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
pub struct DetallePedido {
    #[serde(default)]
    pub id_detalle_pedido: i32,
    #[serde(default)]
    pub id_pedido: i32,
    pub id_producto: i32,
    pub cantidad: i32,
    pub precio_unitario: f64,
    #[serde(default)]
    pub descuento: f64,
    #[serde(default)]
    pub subtotal_lineal: f64,
    #[serde(default)]
    pub subtotal: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
pub struct Pedido {
    pub id_pedido: i32,
    pub numero_pedido: String,
    pub fecha_pedido: String,
    pub subtotal: f64,
    pub iva: f64,
    pub total: f64,
    pub cod_cliente: String,
    #[serde(default)]
    pub id_ubicacion_entrega: Option<i32>,
    #[serde(default)]
    pub id_ruta_venta: Option<i32>,
    #[serde(default)]
    pub id_ruta_entrega: Option<i32>,
    #[serde(default)]
    pub detalles: Option<Vec<DetallePedido>>,
}

impl Pedido {
    pub fn fecha(&self) -> Option<NaiveDate> {
        parse_fecha(&self.fecha_pedido)
    }
}

/// Recorded state change of an order.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
pub struct EstadoPedido {
    pub id_estado_pedido: i32,
    #[serde(default)]
    pub id_pedido: Option<i32>,
    pub descripcion: String,
    pub fecha_actualizada: String,
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct NewEstadoPedido {
    pub id_pedido: i32,
    pub descripcion: String,
    pub fecha_actualizada: String,
}

/// Line requested by the operator before pricing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineaPedido {
    pub id_producto: i32,
    pub cantidad: i32,
    pub descuento: f64,
}

/// Priced line sent to the backend.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct NewDetallePedido {
    pub id_producto: i32,
    pub cantidad: i32,
    pub precio_unitario: f64,
    pub descuento: f64,
    pub subtotal_lineal: f64,
    pub subtotal: f64,
}

/// Totals of a priced order.
#[derive(Clone, Debug, Default, Serialize, PartialEq)]
pub struct TotalesPedido {
    pub detalles: Vec<NewDetallePedido>,
    pub subtotal: f64,
    pub iva: f64,
    pub total: f64,
}

/// Payload for creating an order.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct NewPedido {
    pub numero_pedido: String,
    pub fecha_pedido: String,
    pub cod_cliente: String,
    pub subtotal: f64,
    pub iva: f64,
    pub total: f64,
    pub id_ubicacion_entrega: Option<i32>,
    pub id_ruta_venta: Option<i32>,
    pub id_ruta_entrega: Option<i32>,
    pub detalle_pedido: Vec<NewDetallePedido>,
}

/// Payload for updating an order; the backend names the lines `detalles`
/// on update.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct UpdatePedido {
    pub numero_pedido: String,
    pub fecha_pedido: String,
    pub cod_cliente: String,
    pub subtotal: f64,
    pub iva: f64,
    pub total: f64,
    pub id_ubicacion_entrega: Option<i32>,
    pub id_ruta_venta: Option<i32>,
    pub id_ruta_entrega: Option<i32>,
    pub detalles: Vec<NewDetallePedido>,
}

impl From<NewPedido> for UpdatePedido {
    fn from(pedido: NewPedido) -> Self {
        Self {
            numero_pedido: pedido.numero_pedido,
            fecha_pedido: pedido.fecha_pedido,
            cod_cliente: pedido.cod_cliente,
            subtotal: pedido.subtotal,
            iva: pedido.iva,
            total: pedido.total,
            id_ubicacion_entrega: pedido.id_ubicacion_entrega,
            id_ruta_venta: pedido.id_ruta_venta,
            id_ruta_entrega: pedido.id_ruta_entrega,
            detalles: pedido.detalle_pedido,
        }
    }
}

/// Reasons an order cannot be priced.
#[derive(Debug, Error, PartialEq)]
pub enum PedidoError {
    #[error("El pedido debe tener al menos un producto")]
    SinLineas,
    #[error("La cantidad debe ser al menos 1")]
    CantidadInvalida,
    #[error("El descuento no puede ser negativo ni mayor al valor de la línea")]
    DescuentoInvalido,
    #[error("Producto {0} no encontrado")]
    ProductoNoEncontrado(i32),
}

/// Prices the requested lines for a client.
///
/// Companies (`juridico`) pay wholesale prices, everybody else retail.
pub fn calcular_totales(
    lineas: &[LineaPedido],
    productos: &[Producto],
    juridico: bool,
) -> Result<TotalesPedido, PedidoError> {
    if lineas.is_empty() {
        return Err(PedidoError::SinLineas);
    }

    let mut totales = TotalesPedido::default();
    for linea in lineas {
        if linea.cantidad < 1 {
            return Err(PedidoError::CantidadInvalida);
        }
        let producto = productos
            .iter()
            .find(|p| p.id_producto == linea.id_producto)
            .ok_or(PedidoError::ProductoNoEncontrado(linea.id_producto))?;

        let precio_unitario = producto.precio_para(juridico);
        let subtotal_lineal = round_cents(f64::from(linea.cantidad) * precio_unitario);
        if !linea.descuento.is_finite()
            || linea.descuento < 0.0
            || linea.descuento > subtotal_lineal
        {
            return Err(PedidoError::DescuentoInvalido);
        }
        let subtotal = round_cents(subtotal_lineal - linea.descuento);

        totales.subtotal += subtotal;
        totales.detalles.push(NewDetallePedido {
            id_producto: linea.id_producto,
            cantidad: linea.cantidad,
            precio_unitario,
            descuento: linea.descuento,
            subtotal_lineal,
            subtotal,
        });
    }

    totales.subtotal = round_cents(totales.subtotal);
    totales.iva = round_cents(totales.subtotal * IVA);
    totales.total = round_cents(totales.subtotal + totales.iva);
    Ok(totales)
}

/// Parses the date part of a backend date or datetime string.
pub fn parse_fecha(value: &str) -> Option<NaiveDate> {
    let date = value.trim().get(..10)?;
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

/// Latest estado per order, keyed by `id_pedido`.
///
/// Ties on the date go to the most recently created record.
pub fn estados_actuales(estados: &[EstadoPedido]) -> HashMap<i32, &EstadoPedido> {
    let mut actuales: HashMap<i32, &EstadoPedido> = HashMap::new();
    for estado in estados {
        let Some(id_pedido) = estado.id_pedido else {
            continue;
        };
        let key = (parse_fecha(&estado.fecha_actualizada), estado.id_estado_pedido);
        match actuales.get(&id_pedido) {
            Some(actual)
                if (parse_fecha(&actual.fecha_actualizada), actual.id_estado_pedido) >= key => {}
            _ => {
                actuales.insert(id_pedido, estado);
            }
        }
    }
    actuales
}

/// Current estado description of an order, or [`SIN_ESTADO`].
pub fn estado_actual<'a>(actuales: &HashMap<i32, &'a EstadoPedido>, id_pedido: i32) -> &'a str {
    actuales
        .get(&id_pedido)
        .map_or(SIN_ESTADO, |e| e.descripcion.as_str())
}

/// Orders whose número or client name contains the term (case-insensitive).
pub fn filtrar_pedidos<'a>(
    pedidos: &'a [Pedido],
    clientes: &[Cliente],
    term: &str,
) -> Vec<&'a Pedido> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return pedidos.iter().collect();
    }
    pedidos
        .iter()
        .filter(|p| {
            p.numero_pedido.to_lowercase().contains(&term)
                || clientes
                    .iter()
                    .find(|c| c.cod_cliente == p.cod_cliente)
                    .is_some_and(|c| c.nombre.to_lowercase().contains(&term))
        })
        .collect()
}

/// Cash register summary of one day.
#[derive(Clone, Debug, Default, Serialize, PartialEq)]
pub struct ResumenCaja {
    pub fecha: String,
    pub cantidad: usize,
    pub subtotal: f64,
    pub iva: f64,
    pub total: f64,
}

/// Orders placed on `hoy` and their summed amounts.
pub fn caja<'a>(pedidos: &'a [Pedido], hoy: NaiveDate) -> (Vec<&'a Pedido>, ResumenCaja) {
    let del_dia: Vec<&Pedido> = pedidos
        .iter()
        .filter(|p| p.fecha() == Some(hoy))
        .collect();

    let mut resumen = ResumenCaja {
        fecha: hoy.format("%Y-%m-%d").to_string(),
        cantidad: del_dia.len(),
        ..Default::default()
    };
    for pedido in &del_dia {
        resumen.subtotal += pedido.subtotal;
        resumen.iva += pedido.iva;
        resumen.total += pedido.total;
    }
    resumen.subtotal = round_cents(resumen.subtotal);
    resumen.iva = round_cents(resumen.iva);
    resumen.total = round_cents(resumen.total);

    (del_dia, resumen)
}

/// Order number used when the operator leaves it blank.
pub fn numero_por_defecto(now: chrono::DateTime<chrono::Utc>) -> String {
    format!("PED-{}", now.timestamp_millis())
}
