use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::domain::cliente::{Conteo, bump};

/// A delivery/visit location belonging to a client.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
pub struct UbicacionCliente {
    pub id_ubicacion: i32,
    /// Omitted when the location comes nested under its client.
    #[serde(default)]
    pub cod_cliente: String,
    pub latitud: f64,
    pub longitud: f64,
    #[serde(default)]
    pub direccion: String,
    #[serde(default)]
    pub sector: String,
    #[serde(default)]
    pub referencia: Option<String>,
    #[serde(default)]
    pub fecha_registro: Option<String>,
}

impl UbicacionCliente {
    pub fn has_referencia(&self) -> bool {
        self.referencia
            .as_deref()
            .is_some_and(|r| !r.trim().is_empty())
    }

    /// Summary shown next to a client.
    pub fn info(&self) -> UbicacionInfo {
        UbicacionInfo {
            id_ubicacion: self.id_ubicacion,
            direccion: self.direccion.clone(),
            sector: self.sector.clone(),
            latitud: self.latitud,
            longitud: self.longitud,
        }
    }
}

/// Short form of a location used in summaries and route stops.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
pub struct UbicacionInfo {
    pub id_ubicacion: i32,
    #[serde(default)]
    pub direccion: String,
    #[serde(default)]
    pub sector: String,
    #[serde(default)]
    pub latitud: f64,
    #[serde(default)]
    pub longitud: f64,
}

/// Payload for creating or updating a location.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct NewUbicacion {
    pub cod_cliente: String,
    pub latitud: f64,
    pub longitud: f64,
    pub direccion: String,
    pub sector: String,
    pub referencia: Option<String>,
}

/// Locations in `sector`, compared case-insensitively.
pub fn por_sector<'a>(ubicaciones: &'a [UbicacionCliente], sector: &str) -> Vec<&'a UbicacionCliente> {
    let sector = sector.trim().to_lowercase();
    ubicaciones
        .iter()
        .filter(|u| u.sector.trim().to_lowercase() == sector)
        .collect()
}

/// Locations owned by `cod_cliente`.
pub fn por_cliente<'a>(
    ubicaciones: &'a [UbicacionCliente],
    cod_cliente: &str,
) -> Vec<&'a UbicacionCliente> {
    ubicaciones
        .iter()
        .filter(|u| u.cod_cliente == cod_cliente)
        .collect()
}

/// Free-text search over dirección, sector, referencia and client code.
pub fn buscar<'a>(ubicaciones: &'a [UbicacionCliente], texto: &str) -> Vec<&'a UbicacionCliente> {
    let term = texto.trim().to_lowercase();
    if term.is_empty() {
        return ubicaciones.iter().collect();
    }
    ubicaciones
        .iter()
        .filter(|u| {
            u.direccion.to_lowercase().contains(&term)
                || u.sector.to_lowercase().contains(&term)
                || u
                    .referencia
                    .as_deref()
                    .is_some_and(|r| r.to_lowercase().contains(&term))
                || u.cod_cliente.to_lowercase().contains(&term)
        })
        .collect()
}

/// Aggregates shown on the locations dashboard.
#[derive(Clone, Debug, Default, Serialize, PartialEq)]
pub struct EstadisticasUbicaciones {
    pub total_ubicaciones: usize,
    pub clientes_con_ubicaciones: usize,
    pub clientes_con_principal: usize,
    pub clientes_sin_principal: usize,
    pub por_sector: Vec<Conteo>,
    pub clientes_con_multiples: usize,
    pub sin_referencia: usize,
    pub ubicaciones_principales: usize,
}

/// Computes the locations dashboard.
///
/// `principales` holds the `(cod_cliente, id_ubicacion_principal)` pairs of
/// every client; only principals pointing at one of the listed locations are
/// counted.
pub fn estadisticas_ubicaciones(
    ubicaciones: &[UbicacionCliente],
    principales: &[(String, Option<i32>)],
) -> EstadisticasUbicaciones {
    let mut stats = EstadisticasUbicaciones {
        total_ubicaciones: ubicaciones.len(),
        ..Default::default()
    };

    let mut clientes: Vec<(&str, usize)> = Vec::new();
    for ubicacion in ubicaciones {
        match clientes
            .iter_mut()
            .find(|(cod, _)| *cod == ubicacion.cod_cliente)
        {
            Some((_, n)) => *n += 1,
            None => clientes.push((&ubicacion.cod_cliente, 1)),
        }
        let sector = ubicacion.sector.trim();
        bump(
            &mut stats.por_sector,
            if sector.is_empty() { "Sin sector" } else { sector },
        );
        if !ubicacion.has_referencia() {
            stats.sin_referencia += 1;
        }
    }

    stats.clientes_con_ubicaciones = clientes.len();
    stats.clientes_con_multiples = clientes.iter().filter(|(_, n)| *n > 1).count();

    for (cod, _) in &clientes {
        let principal = principales
            .iter()
            .find(|(c, _)| c.as_str() == *cod)
            .and_then(|(_, p)| *p);
        let valida = principal.is_some_and(|id| {
            ubicaciones
                .iter()
                .any(|u| u.id_ubicacion == id && u.cod_cliente == *cod)
        });
        if valida {
            stats.clientes_con_principal += 1;
            stats.ubicaciones_principales += 1;
        } else {
            stats.clientes_sin_principal += 1;
        }
    }

    stats
}

/// Distinct non-blank sectors among the locations, sorted.
pub fn sectores(ubicaciones: &[UbicacionCliente]) -> Vec<String> {
    ubicaciones
        .iter()
        .map(|u| u.sector.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
