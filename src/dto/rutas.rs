use serde::{Deserialize, Serialize};

use crate::domain::ruta::{
    ConteoRutasPropias, EstadisticasRutas, ResumenUsuarioRutas, Ruta, TipoRuta,
};
use crate::domain::ubicacion::UbicacionCliente;
use crate::domain::usuario::Usuario;

#[derive(Debug, Serialize)]
pub struct RutasPageData {
    pub rutas: Vec<Ruta>,
    pub search_query: Option<String>,
}

/// Choices offered by the route form.
#[derive(Debug, Serialize)]
pub struct RutaFormData {
    pub ruta: Option<Ruta>,
    /// Employees that may work routes: sellers and carriers.
    pub usuarios: Vec<Usuario>,
    pub ubicaciones: Vec<UbicacionCliente>,
    pub sectores: Vec<String>,
}

/// Selection on the deliveries/sales dashboards.
#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    pub id_ruta: Option<i32>,
    pub sector: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DashboardRutasData {
    pub tipo: TipoRuta,
    pub rutas: Vec<Ruta>,
    pub sectores: Vec<String>,
    pub ubicaciones: Vec<UbicacionCliente>,
    pub estadisticas: EstadisticasRutas,
    pub resumen_usuarios: Vec<ResumenUsuarioRutas>,
    pub id_ruta: Option<i32>,
    pub sector: Option<String>,
}

/// Routes assigned to the session user.
#[derive(Debug, Serialize)]
pub struct RutasPropiasData {
    pub rutas: Vec<Ruta>,
    pub conteo: ConteoRutasPropias,
}
