use serde::{Deserialize, Serialize};

use crate::domain::cliente::Cliente;
use crate::domain::principal::{IntegridadPrincipales, ResumenCliente};
use crate::domain::ubicacion::{EstadisticasUbicaciones, UbicacionCliente};

#[derive(Debug, Default, Deserialize)]
pub struct UbicacionesQuery {
    pub q: Option<String>,
    pub sector: Option<String>,
    pub cod_cliente: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UbicacionesPageData {
    pub ubicaciones: Vec<UbicacionCliente>,
    /// Clients offered by the form's owner select.
    pub clientes: Vec<Cliente>,
    pub sectores: Vec<String>,
    pub estadisticas: EstadisticasUbicaciones,
    pub search_query: Option<String>,
    pub sector: Option<String>,
    pub cod_cliente: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UbicacionFormData {
    pub ubicacion: UbicacionCliente,
    pub clientes: Vec<Cliente>,
}

/// Per-client summary plus the principal-reference check.
#[derive(Debug, Serialize)]
pub struct UbicacionesResumen {
    pub resumen: Vec<ResumenCliente>,
    pub integridad: IntegridadPrincipales,
}
