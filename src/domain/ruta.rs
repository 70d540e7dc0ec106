//! Sales and delivery routes, their assignments and the dashboards over them.

use std::collections::BTreeSet;
use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::domain::types::opt_string_or_number;
use crate::domain::ubicacion::UbicacionCliente;
use crate::domain::usuario::Role;

/// Route states accepted by the backend.
pub const ESTADOS_RUTA: [&str; 4] = ["planificada", "en_ejecucion", "completada", "cancelada"];

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum TipoRuta {
    #[default]
    Venta,
    Entrega,
}

impl TipoRuta {
    pub fn as_str(self) -> &'static str {
        match self {
            TipoRuta::Venta => "venta",
            TipoRuta::Entrega => "entrega",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "venta" => Some(TipoRuta::Venta),
            "entrega" => Some(TipoRuta::Entrega),
            _ => None,
        }
    }

    /// Role allowed to work a route of this kind.
    pub fn rol_requerido(self) -> Role {
        match self {
            TipoRuta::Venta => Role::Vendedor,
            TipoRuta::Entrega => Role::Transportista,
        }
    }
}

impl Display for TipoRuta {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
pub struct ClienteRuta {
    #[serde(default)]
    pub nombre: String,
    #[serde(default)]
    pub direccion: Option<String>,
    #[serde(default)]
    pub sector: Option<String>,
}

/// Order attached to a delivery route.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
pub struct PedidoRuta {
    pub id_pedido: i32,
    #[serde(default)]
    pub numero_pedido: String,
    #[serde(default)]
    pub fecha_pedido: String,
    #[serde(default)]
    pub cod_cliente: String,
    #[serde(default)]
    pub total: f64,
    #[serde(default)]
    pub estado: String,
    #[serde(default)]
    pub cliente_info: Option<ClienteRuta>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
pub struct UbicacionAsignada {
    #[serde(default)]
    pub direccion: String,
    #[serde(default)]
    pub sector: String,
    #[serde(default)]
    pub latitud: f64,
    #[serde(default)]
    pub longitud: f64,
    #[serde(default)]
    pub referencia: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct UsuarioAsignado {
    #[serde(default)]
    pub nombre: String,
    #[serde(default)]
    pub correo: Option<String>,
}

/// Either a user working the route or a client stop on it.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
pub struct AsignacionRuta {
    #[serde(default)]
    pub id_asignacion: Option<i32>,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub identificacion_usuario: Option<String>,
    #[serde(default)]
    pub tipo_usuario: Option<String>,
    #[serde(default)]
    pub cod_cliente: Option<String>,
    #[serde(default)]
    pub id_ubicacion: Option<i32>,
    #[serde(default)]
    pub orden_visita: Option<i32>,
    #[serde(default)]
    pub ubicacion_info: Option<UbicacionAsignada>,
    #[serde(default)]
    pub usuario: Option<UsuarioAsignado>,
}

impl AsignacionRuta {
    /// Stops are assignments pointing at a client location.
    pub fn es_parada(&self) -> bool {
        self.id_ubicacion.is_some()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
pub struct Ruta {
    pub id_ruta: i32,
    pub nombre: String,
    #[serde(default)]
    pub sector: String,
    #[serde(default)]
    pub direccion: String,
    pub tipo_ruta: TipoRuta,
    #[serde(default)]
    pub estado: String,
    #[serde(default)]
    pub fecha_creacion: String,
    #[serde(default)]
    pub fecha_ejecucion: Option<String>,
    #[serde(default)]
    pub id_pedido: Option<i32>,
    #[serde(default)]
    pub pedido_info: Option<PedidoRuta>,
    #[serde(default)]
    pub asignaciones: Option<Vec<AsignacionRuta>>,
}

impl Ruta {
    pub fn asignaciones(&self) -> &[AsignacionRuta] {
        self.asignaciones.as_deref().unwrap_or_default()
    }

    pub fn paradas(&self) -> usize {
        self.asignaciones().iter().filter(|a| a.es_parada()).count()
    }

    pub fn incluye_ubicacion(&self, id_ubicacion: i32) -> bool {
        self.asignaciones()
            .iter()
            .any(|a| a.id_ubicacion == Some(id_ubicacion))
    }

    pub fn asignada_a(&self, identificacion: &str) -> bool {
        self.asignaciones()
            .iter()
            .any(|a| a.identificacion_usuario.as_deref() == Some(identificacion))
    }

    fn estado_es(&self, estado: &str) -> bool {
        self.estado.trim().eq_ignore_ascii_case(estado)
    }
}

/// Assignment sent when creating or updating a route.
#[derive(Clone, Debug, Serialize, PartialEq, Default)]
pub struct NewAsignacion {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identificacion_usuario: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tipo_usuario: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cod_cliente: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_ubicacion: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orden_visita: Option<i32>,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct NewRuta {
    pub nombre: String,
    pub tipo_ruta: TipoRuta,
    pub sector: String,
    pub direccion: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estado: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fecha_ejecucion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_pedido: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asignaciones: Option<Vec<NewAsignacion>>,
}

pub fn por_sector<'a>(rutas: &'a [Ruta], sector: &str) -> Vec<&'a Ruta> {
    let sector = sector.trim().to_lowercase();
    rutas
        .iter()
        .filter(|r| r.sector.trim().to_lowercase() == sector)
        .collect()
}

pub fn por_tipo(rutas: &[Ruta], tipo: TipoRuta) -> Vec<&Ruta> {
    rutas.iter().filter(|r| r.tipo_ruta == tipo).collect()
}

/// Routes where `identificacion` is assigned.
pub fn por_usuario<'a>(rutas: &'a [Ruta], identificacion: &str) -> Vec<&'a Ruta> {
    rutas.iter().filter(|r| r.asignada_a(identificacion)).collect()
}

/// Whether a user with `rol` may be assigned to a route of `tipo`.
pub fn validar_asignacion(rol: Option<Role>, tipo: TipoRuta) -> bool {
    rol == Some(tipo.rol_requerido())
}

/// Search on nombre, sector and dirección.
pub fn filtrar_rutas<'a>(rutas: &'a [Ruta], term: &str) -> Vec<&'a Ruta> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return rutas.iter().collect();
    }
    rutas
        .iter()
        .filter(|r| {
            r.nombre.to_lowercase().contains(&term)
                || r.sector.to_lowercase().contains(&term)
                || r.direccion.to_lowercase().contains(&term)
        })
        .collect()
}

/// Distinct non-blank sectors of the routes, sorted.
pub fn sectores(rutas: &[&Ruta]) -> Vec<String> {
    rutas
        .iter()
        .map(|r| r.sector.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Selection made on a route dashboard.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SeleccionDashboard {
    pub id_ruta: Option<i32>,
    pub sector: Option<String>,
}

/// Locations to plot on a dashboard.
///
/// A selected route shows its own stops; otherwise a selected sector shows
/// its locations that are stops of a route in that sector; otherwise every
/// location that is a stop of any listed route.
pub fn ubicaciones_dashboard<'a>(
    rutas: &[&Ruta],
    ubicaciones: &'a [UbicacionCliente],
    seleccion: &SeleccionDashboard,
) -> Vec<&'a UbicacionCliente> {
    if let Some(ruta) = seleccion
        .id_ruta
        .and_then(|id| rutas.iter().find(|r| r.id_ruta == id))
    {
        return ubicaciones
            .iter()
            .filter(|u| ruta.incluye_ubicacion(u.id_ubicacion))
            .collect();
    }

    if let Some(sector) = seleccion.sector.as_deref().filter(|s| !s.trim().is_empty()) {
        return ubicaciones
            .iter()
            .filter(|u| {
                u.sector == sector
                    && rutas
                        .iter()
                        .any(|r| r.sector == sector && r.incluye_ubicacion(u.id_ubicacion))
            })
            .collect();
    }

    ubicaciones
        .iter()
        .filter(|u| rutas.iter().any(|r| r.incluye_ubicacion(u.id_ubicacion)))
        .collect()
}

/// Route dashboard aggregates.
#[derive(Clone, Debug, Default, Serialize, PartialEq)]
pub struct EstadisticasRutas {
    pub total_rutas: usize,
    pub planificadas: usize,
    pub en_ejecucion: usize,
    pub completadas: usize,
    pub canceladas: usize,
    pub total_paradas: usize,
    pub usuarios_asignados: usize,
    pub sectores: usize,
    pub promedio_paradas_por_ruta: f64,
}

pub fn estadisticas_rutas(rutas: &[&Ruta]) -> EstadisticasRutas {
    let mut usuarios = BTreeSet::new();
    let mut stats = EstadisticasRutas {
        total_rutas: rutas.len(),
        sectores: sectores(rutas).len(),
        ..Default::default()
    };

    for ruta in rutas {
        if ruta.estado_es("planificada") {
            stats.planificadas += 1;
        } else if ruta.estado_es("en_ejecucion") {
            stats.en_ejecucion += 1;
        } else if ruta.estado_es("completada") {
            stats.completadas += 1;
        } else if ruta.estado_es("cancelada") {
            stats.canceladas += 1;
        }
        stats.total_paradas += ruta.paradas();
        usuarios.extend(
            ruta.asignaciones()
                .iter()
                .filter_map(|a| a.identificacion_usuario.as_deref()),
        );
    }

    stats.usuarios_asignados = usuarios.len();
    if stats.total_rutas > 0 {
        stats.promedio_paradas_por_ruta = stats.total_paradas as f64 / stats.total_rutas as f64;
    }
    stats
}

/// Per-user dashboard row.
#[derive(Clone, Debug, Default, Serialize, PartialEq)]
pub struct ResumenUsuarioRutas {
    pub identificacion_usuario: String,
    pub nombre_usuario: String,
    pub rutas_asignadas: usize,
    pub rutas_completadas: usize,
    pub rutas_en_ejecucion: usize,
    pub total_paradas: usize,
    pub sectores_atendidos: Vec<String>,
    pub clientes_asignados: Vec<String>,
}

/// Groups routes by the users assigned to them, in first-seen order.
pub fn resumen_por_usuario(rutas: &[&Ruta]) -> Vec<ResumenUsuarioRutas> {
    let mut resumen: Vec<ResumenUsuarioRutas> = Vec::new();

    for ruta in rutas {
        let clientes: Vec<&str> = ruta
            .asignaciones()
            .iter()
            .filter_map(|a| a.cod_cliente.as_deref())
            .collect();

        let mut vistos: Vec<&str> = Vec::new();
        for asignacion in ruta.asignaciones() {
            let Some(identificacion) = asignacion.identificacion_usuario.as_deref() else {
                continue;
            };
            // One route counts once per user, however many stops they hold.
            if vistos.contains(&identificacion) {
                continue;
            }
            vistos.push(identificacion);
            let idx = match resumen
                .iter()
                .position(|r| r.identificacion_usuario == identificacion)
            {
                Some(idx) => idx,
                None => {
                    resumen.push(ResumenUsuarioRutas {
                        identificacion_usuario: identificacion.to_string(),
                        nombre_usuario: asignacion
                            .usuario
                            .as_ref()
                            .map(|u| u.nombre.clone())
                            .unwrap_or_default(),
                        ..Default::default()
                    });
                    resumen.len() - 1
                }
            };
            let fila = &mut resumen[idx];
            fila.rutas_asignadas += 1;
            if ruta.estado_es("completada") {
                fila.rutas_completadas += 1;
            }
            if ruta.estado_es("en_ejecucion") {
                fila.rutas_en_ejecucion += 1;
            }
            fila.total_paradas += ruta.paradas();
            let sector = ruta.sector.trim();
            if !sector.is_empty() && !fila.sectores_atendidos.iter().any(|s| s == sector) {
                fila.sectores_atendidos.push(sector.to_string());
            }
            for cod in &clientes {
                if !fila.clientes_asignados.iter().any(|c| c == cod) {
                    fila.clientes_asignados.push((*cod).to_string());
                }
            }
        }
    }

    resumen
}

/// Own routes counted by estado, for the field roles' home pages.
#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
pub struct ConteoRutasPropias {
    pub total: usize,
    pub planificadas: usize,
    pub en_ejecucion: usize,
    pub completadas: usize,
}

pub fn conteo_rutas_propias(rutas: &[Ruta]) -> ConteoRutasPropias {
    ConteoRutasPropias {
        total: rutas.len(),
        planificadas: rutas.iter().filter(|r| r.estado_es("planificada")).count(),
        en_ejecucion: rutas.iter().filter(|r| r.estado_es("en_ejecucion")).count(),
        completadas: rutas.iter().filter(|r| r.estado_es("completada")).count(),
    }
}
