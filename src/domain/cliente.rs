use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Client record mirrored from the backend.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
pub struct Cliente {
    pub cod_cliente: String,
    #[serde(deserialize_with = "crate::domain::types::string_or_number")]
    pub identificacion: String,
    pub nombre: String,
    #[serde(default)]
    pub direccion: String,
    #[serde(default)]
    pub celular: String,
    #[serde(default)]
    pub correo: String,
    #[serde(default)]
    pub tipo_cliente: String,
    #[serde(default)]
    pub razon_social: String,
    #[serde(default)]
    pub sector: String,
    #[serde(default)]
    pub fecha_registro: Option<String>,
    #[serde(default)]
    pub id_ubicacion_principal: Option<i32>,
}

impl Cliente {
    /// Wholesale prices apply to companies.
    pub fn is_juridico(&self) -> bool {
        self.tipo_cliente.trim().eq_ignore_ascii_case("juridico")
    }
}

/// Payload for creating or fully updating a client.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct NewCliente {
    pub cod_cliente: String,
    pub identificacion: String,
    pub nombre: String,
    pub direccion: String,
    pub celular: String,
    pub correo: String,
    pub tipo_cliente: String,
    pub razon_social: String,
    pub sector: String,
    pub id_ubicacion_principal: Option<i32>,
}

/// Partial update touching only the principal location.
///
/// `None` serializes as `null`, which clears the reference.
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
pub struct UpdatePrincipal {
    pub id_ubicacion_principal: Option<i32>,
}

/// Clients matching the search box.
///
/// Name, razón social, sector and dirección match case-insensitively; the
/// identificación matches verbatim.
pub fn filter_clientes<'a>(clientes: &'a [Cliente], term: &str) -> Vec<&'a Cliente> {
    let term = term.trim();
    if term.is_empty() {
        return clientes.iter().collect();
    }
    let lowered = term.to_lowercase();
    clientes
        .iter()
        .filter(|c| {
            c.nombre.to_lowercase().contains(&lowered)
                || c.identificacion.contains(term)
                || c.razon_social.to_lowercase().contains(&lowered)
                || c.sector.to_lowercase().contains(&lowered)
                || c.direccion.to_lowercase().contains(&lowered)
        })
        .collect()
}

/// Clients in the given sector (case-insensitive equality).
pub fn filter_por_sector<'a>(clientes: &[&'a Cliente], sector: &str) -> Vec<&'a Cliente> {
    let sector = sector.trim().to_lowercase();
    if sector.is_empty() {
        return clientes.to_vec();
    }
    clientes
        .iter()
        .copied()
        .filter(|c| c.sector.trim().to_lowercase() == sector)
        .collect()
}

/// Distinct non-blank sectors, sorted.
pub fn sectores(clientes: &[Cliente]) -> Vec<String> {
    let mut sectores: Vec<String> = clientes
        .iter()
        .map(|c| c.sector.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    sectores.sort();
    sectores.dedup();
    sectores
}

/// Counts keyed by a label, iterated in insertion order.
#[derive(Clone, Debug, Default, Serialize, PartialEq)]
pub struct Conteo {
    pub etiqueta: String,
    pub cantidad: usize,
}

/// Increments `label` in an insertion-ordered count list.
pub(crate) fn bump(conteos: &mut Vec<Conteo>, label: &str) {
    match conteos.iter_mut().find(|c| c.etiqueta == label) {
        Some(conteo) => conteo.cantidad += 1,
        None => conteos.push(Conteo {
            etiqueta: label.to_string(),
            cantidad: 1,
        }),
    }
}

/// Aggregates shown on the clients dashboard.
#[derive(Clone, Debug, Default, Serialize, PartialEq)]
pub struct EstadisticasClientes {
    pub total_clientes: usize,
    pub con_ubicacion_principal: usize,
    pub sin_ubicacion_principal: usize,
    pub sin_ubicaciones: usize,
    pub con_multiples_ubicaciones: usize,
    pub total_ubicaciones: usize,
    pub promedio_ubicaciones_por_cliente: f64,
    pub por_sector: Vec<Conteo>,
    pub por_tipo_cliente: Vec<Conteo>,
    pub sectores_con_mas_clientes: Vec<Conteo>,
}

/// Computes the dashboard aggregates from `(client, number of locations)`.
pub fn estadisticas_clientes<'a, I>(clientes: I) -> EstadisticasClientes
where
    I: IntoIterator<Item = (&'a Cliente, usize)>,
{
    let mut stats = EstadisticasClientes::default();

    for (cliente, ubicaciones) in clientes {
        stats.total_clientes += 1;
        if cliente.id_ubicacion_principal.is_some() {
            stats.con_ubicacion_principal += 1;
        } else {
            stats.sin_ubicacion_principal += 1;
        }
        if ubicaciones == 0 {
            stats.sin_ubicaciones += 1;
        }
        if ubicaciones > 1 {
            stats.con_multiples_ubicaciones += 1;
        }
        stats.total_ubicaciones += ubicaciones;

        let sector = cliente.sector.trim();
        bump(
            &mut stats.por_sector,
            if sector.is_empty() { "Sin sector" } else { sector },
        );
        let tipo = cliente.tipo_cliente.trim();
        bump(
            &mut stats.por_tipo_cliente,
            if tipo.is_empty() { "Sin tipo" } else { tipo },
        );
    }

    if stats.total_clientes > 0 {
        stats.promedio_ubicaciones_por_cliente =
            stats.total_ubicaciones as f64 / stats.total_clientes as f64;
    }

    let mut top = stats.por_sector.clone();
    // Stable sort keeps first-seen order among ties.
    top.sort_by(|a, b| b.cantidad.cmp(&a.cantidad));
    top.truncate(5);
    stats.sectores_con_mas_clientes = top;

    stats
}

/// Per-sector counts as a map, for templates that index by name.
pub fn conteos_como_mapa(conteos: &[Conteo]) -> BTreeMap<String, usize> {
    conteos
        .iter()
        .map(|c| (c.etiqueta.clone(), c.cantidad))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) fn cliente(cod: &str, nombre: &str, sector: &str) -> Cliente {
        Cliente {
            cod_cliente: cod.to_string(),
            identificacion: format!("17{cod}"),
            nombre: nombre.to_string(),
            direccion: format!("Av. {nombre}"),
            sector: sector.to_string(),
            tipo_cliente: "natural".to_string(),
            ..Cliente::default()
        }
    }

    #[test]
    fn filter_matches_each_field() {
        let mut tienda = cliente("C1", "Tienda Don Lucho", "Norte");
        tienda.razon_social = "Lucho S.A.".to_string();
        let clientes = vec![tienda, cliente("C2", "Bodega Sur", "Quitumbe")];

        assert_eq!(filter_clientes(&clientes, "LUCHO").len(), 1);
        assert_eq!(filter_clientes(&clientes, "s.a.").len(), 1);
        assert_eq!(filter_clientes(&clientes, "quitumbe")[0].cod_cliente, "C2");
        assert_eq!(filter_clientes(&clientes, "17C2")[0].cod_cliente, "C2");
        assert_eq!(filter_clientes(&clientes, "av. bodega")[0].cod_cliente, "C2");
        assert_eq!(filter_clientes(&clientes, "").len(), 2);
        assert!(filter_clientes(&clientes, "inexistente").is_empty());
    }

    #[test]
    fn identificacion_match_is_verbatim() {
        let mut c = cliente("C1", "Ana", "Norte");
        c.identificacion = "17ABC".to_string();
        let clientes = vec![c];
        assert!(filter_clientes(&clientes, "17abc").is_empty());
        assert_eq!(filter_clientes(&clientes, "17ABC").len(), 1);
    }

    #[test]
    fn sector_filter_is_case_insensitive_equality() {
        let clientes = vec![
            cliente("C1", "Ana", "Norte"),
            cliente("C2", "Luis", "Norte Alto"),
        ];
        let all: Vec<&Cliente> = clientes.iter().collect();
        let norte = filter_por_sector(&all, "norte");
        assert_eq!(norte.len(), 1);
        assert_eq!(norte[0].cod_cliente, "C1");
        assert_eq!(filter_por_sector(&all, "").len(), 2);
    }

    #[test]
    fn estadisticas_counts_and_top_sectors() {
        let mut a = cliente("C1", "Ana", "Norte");
        a.id_ubicacion_principal = Some(1);
        let b = cliente("C2", "Luis", "Sur");
        let mut c = cliente("C3", "Eva", "Norte");
        c.tipo_cliente = "juridico".to_string();
        let d = cliente("C4", "Raúl", "");

        let stats = estadisticas_clientes(vec![(&a, 2), (&b, 0), (&c, 1), (&d, 1)]);

        assert_eq!(stats.total_clientes, 4);
        assert_eq!(stats.con_ubicacion_principal, 1);
        assert_eq!(stats.sin_ubicacion_principal, 3);
        assert_eq!(stats.sin_ubicaciones, 1);
        assert_eq!(stats.con_multiples_ubicaciones, 1);
        assert_eq!(stats.total_ubicaciones, 4);
        assert!((stats.promedio_ubicaciones_por_cliente - 1.0).abs() < f64::EPSILON);

        let sectores = conteos_como_mapa(&stats.por_sector);
        assert_eq!(sectores.get("Norte"), Some(&2));
        assert_eq!(sectores.get("Sin sector"), Some(&1));
        assert_eq!(stats.sectores_con_mas_clientes[0].etiqueta, "Norte");
        assert_eq!(stats.sectores_con_mas_clientes[1].etiqueta, "Sur");

        let tipos = conteos_como_mapa(&stats.por_tipo_cliente);
        assert_eq!(tipos.get("juridico"), Some(&1));
        assert_eq!(tipos.get("natural"), Some(&3));
    }

    #[test]
    fn estadisticas_empty_has_zero_average() {
        let stats = estadisticas_clientes(Vec::<(&Cliente, usize)>::new());
        assert_eq!(stats.total_clientes, 0);
        assert_eq!(stats.promedio_ubicaciones_por_cliente, 0.0);
    }

    #[test]
    fn juridico_detection() {
        let mut c = cliente("C1", "Ana", "Norte");
        assert!(!c.is_juridico());
        c.tipo_cliente = "Juridico".to_string();
        assert!(c.is_juridico());
    }
}
