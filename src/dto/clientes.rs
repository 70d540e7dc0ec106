use serde::{Deserialize, Serialize};

use crate::domain::cliente::EstadisticasClientes;
use crate::domain::principal::{ClienteConUbicaciones, InformeIntegridad, ResultadoReparacion};
use crate::pagination::Paginated;

/// Query parameters of the clients list.
#[derive(Debug, Default, Deserialize)]
pub struct ClientesQuery {
    /// Free text entered in the search box.
    pub q: Option<String>,
    /// Exact sector filter.
    pub sector: Option<String>,
    pub page: Option<usize>,
}

/// Data required to render the clients list.
#[derive(Debug, Serialize)]
pub struct ClientesPageData {
    pub clientes: Paginated<ClienteConUbicaciones>,
    pub sectores: Vec<String>,
    pub search_query: Option<String>,
    pub sector: Option<String>,
}

/// One client with its locations, for the detail/edit page.
#[derive(Debug, Serialize)]
pub struct ClienteDetalle {
    pub cliente: ClienteConUbicaciones,
    /// Set when the client has locations but no principal.
    pub sugerir_principal: bool,
}

/// Maintenance dashboard of the clients section.
#[derive(Debug, Serialize)]
pub struct ClientesDashboard {
    pub estadisticas: EstadisticasClientes,
    pub integridad: InformeIntegridad,
}

/// Outcome of a principal-location repair, flashed after the run.
#[derive(Debug, Serialize)]
pub struct ReparacionResumen {
    pub resultado: ResultadoReparacion,
}
