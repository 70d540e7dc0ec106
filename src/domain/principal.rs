//! Reconciliation of a client's principal location against its locations.
//!
//! Everything here is pure: the services fetch clients and locations, ask this
//! module what is wrong and what to change, then issue the REST calls.

use serde::Serialize;

use crate::domain::cliente::Cliente;
use crate::domain::ubicacion::{UbicacionCliente, UbicacionInfo};

/// Location flagged with whether it is the client's principal one.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct UbicacionMarcada {
    #[serde(flatten)]
    pub ubicacion: UbicacionCliente,
    pub es_principal: bool,
}

/// Client together with its marked locations.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct ClienteConUbicaciones {
    #[serde(flatten)]
    pub cliente: Cliente,
    pub ubicaciones: Vec<UbicacionMarcada>,
    pub ubicacion_principal_info: Option<UbicacionInfo>,
}

impl ClienteConUbicaciones {
    /// Marks `ubicaciones` against the client's principal reference.
    ///
    /// Only locations that belong to the client are kept.
    pub fn new(cliente: Cliente, ubicaciones: Vec<UbicacionCliente>) -> Self {
        let principal = cliente.id_ubicacion_principal;
        let ubicaciones: Vec<UbicacionMarcada> = ubicaciones
            .into_iter()
            .filter(|u| u.cod_cliente == cliente.cod_cliente)
            .map(|ubicacion| UbicacionMarcada {
                es_principal: Some(ubicacion.id_ubicacion) == principal,
                ubicacion,
            })
            .collect();
        let ubicacion_principal_info = ubicaciones
            .iter()
            .find(|u| u.es_principal)
            .map(|u| u.ubicacion.info());

        Self {
            cliente,
            ubicaciones,
            ubicacion_principal_info,
        }
    }

    /// Whether the client has locations but none is marked principal.
    pub fn sugerir_principal(&self) -> bool {
        !self.ubicaciones.is_empty() && self.ubicacion_principal_info.is_none()
    }

    fn principal_valida(&self) -> bool {
        self.ubicacion_principal_info.is_some()
    }
}

/// Groups `ubicaciones` under their clients, preserving the client order.
pub fn agrupar(clientes: Vec<Cliente>, ubicaciones: &[UbicacionCliente]) -> Vec<ClienteConUbicaciones> {
    clientes
        .into_iter()
        .map(|cliente| {
            let propias = ubicaciones
                .iter()
                .filter(|u| u.cod_cliente == cliente.cod_cliente)
                .cloned()
                .collect();
            ClienteConUbicaciones::new(cliente, propias)
        })
        .collect()
}

/// A single corrective write for one client.
#[derive(Clone, Debug, PartialEq)]
pub enum Reparacion {
    /// Client had locations but no principal.
    Establecer {
        id_ubicacion: i32,
        direccion: String,
    },
    /// Principal pointed outside the client's locations.
    Reasignar {
        id_ubicacion: i32,
        direccion: String,
    },
    /// Principal pointed somewhere but the client has no locations.
    Limpiar,
}

impl Reparacion {
    /// New value for `id_ubicacion_principal`.
    pub fn nuevo_principal(&self) -> Option<i32> {
        match self {
            Reparacion::Establecer { id_ubicacion, .. }
            | Reparacion::Reasignar { id_ubicacion, .. } => Some(*id_ubicacion),
            Reparacion::Limpiar => None,
        }
    }

    pub fn mensaje(&self) -> String {
        match self {
            Reparacion::Establecer { direccion, .. } => {
                format!("Establecida ubicación principal: {direccion}")
            }
            Reparacion::Reasignar { direccion, .. } => {
                format!("Reasignada ubicación principal: {direccion}")
            }
            Reparacion::Limpiar => "Limpiada ubicación principal (sin ubicaciones)".to_string(),
        }
    }
}

/// Decides what, if anything, must change for one client.
pub fn planificar(cliente: &ClienteConUbicaciones) -> Option<Reparacion> {
    let primera = cliente.ubicaciones.first().map(|u| &u.ubicacion);

    match (cliente.cliente.id_ubicacion_principal, primera) {
        (None, Some(primera)) => Some(Reparacion::Establecer {
            id_ubicacion: primera.id_ubicacion,
            direccion: primera.direccion.clone(),
        }),
        (None, None) => None,
        (Some(_), _) if cliente.principal_valida() => None,
        (Some(_), Some(primera)) => Some(Reparacion::Reasignar {
            id_ubicacion: primera.id_ubicacion,
            direccion: primera.direccion.clone(),
        }),
        (Some(_), None) => Some(Reparacion::Limpiar),
    }
}

/// Per-client outcome line of a repair run.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct DetalleReparacion {
    pub cod_cliente: String,
    pub accion: String,
}

/// Outcome of a repair run.
#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
pub struct ResultadoReparacion {
    pub reparados: usize,
    pub errores: Vec<String>,
    pub detalles: Vec<DetalleReparacion>,
}

impl ResultadoReparacion {
    pub fn registrar_exito(&mut self, cod_cliente: &str, reparacion: &Reparacion) {
        self.reparados += 1;
        self.detalles.push(DetalleReparacion {
            cod_cliente: cod_cliente.to_string(),
            accion: reparacion.mensaje(),
        });
    }

    pub fn registrar_error(&mut self, cod_cliente: &str, error: impl std::fmt::Display) {
        self.errores
            .push(format!("Error al reparar cliente {cod_cliente}: {error}"));
    }
}

/// Whole-dataset consistency report.
#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
pub struct InformeIntegridad {
    pub clientes_sin_ubicacion_principal: Vec<String>,
    pub clientes_con_ubicacion_principal_invalida: Vec<String>,
    pub clientes_sin_ubicaciones: Vec<String>,
    pub ubicaciones_huerfanas: Vec<i32>,
    pub resumen: String,
}

impl InformeIntegridad {
    pub fn tiene_problemas(&self) -> bool {
        !(self.clientes_sin_ubicacion_principal.is_empty()
            && self.clientes_con_ubicacion_principal_invalida.is_empty()
            && self.clientes_sin_ubicaciones.is_empty()
            && self.ubicaciones_huerfanas.is_empty())
    }
}

/// Checks every client against every location.
pub fn verificar_integridad(
    clientes: &[Cliente],
    ubicaciones: &[UbicacionCliente],
) -> InformeIntegridad {
    let mut informe = InformeIntegridad::default();

    for cliente in clientes {
        let mut propias = ubicaciones
            .iter()
            .filter(|u| u.cod_cliente == cliente.cod_cliente)
            .peekable();

        if propias.peek().is_none() {
            informe
                .clientes_sin_ubicaciones
                .push(cliente.cod_cliente.clone());
            continue;
        }

        match cliente.id_ubicacion_principal {
            None => informe
                .clientes_sin_ubicacion_principal
                .push(cliente.cod_cliente.clone()),
            Some(id) => {
                if !propias.any(|u| u.id_ubicacion == id) {
                    informe
                        .clientes_con_ubicacion_principal_invalida
                        .push(cliente.cod_cliente.clone());
                }
            }
        }
    }

    informe.ubicaciones_huerfanas = ubicaciones
        .iter()
        .filter(|u| !clientes.iter().any(|c| c.cod_cliente == u.cod_cliente))
        .map(|u| u.id_ubicacion)
        .collect();

    let problemas: Vec<String> = [
        (informe.clientes_sin_ubicaciones.len(), "clientes sin ubicaciones"),
        (
            informe.clientes_sin_ubicacion_principal.len(),
            "clientes sin ubicación principal",
        ),
        (
            informe.clientes_con_ubicacion_principal_invalida.len(),
            "clientes con ubicación principal inválida",
        ),
        (informe.ubicaciones_huerfanas.len(), "ubicaciones huérfanas"),
    ]
    .into_iter()
    .filter(|(n, _)| *n > 0)
    .map(|(n, label)| format!("{n} {label}"))
    .collect();

    informe.resumen = if problemas.is_empty() {
        "No se encontraron problemas de integridad".to_string()
    } else {
        format!(
            "Se encontraron los siguientes problemas: {}",
            problemas.join(", ")
        )
    };

    informe
}

/// Principal-reference check limited to clients that have locations.
#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
pub struct IntegridadPrincipales {
    pub clientes_sin_ubicacion_principal: Vec<String>,
    pub ubicaciones_principales_invalidas: Vec<String>,
    /// Union of both lists: clients a repair can fix.
    pub clientes_con_ubicaciones_disponibles: Vec<String>,
}

pub fn verificar_principales(
    clientes: &[Cliente],
    ubicaciones: &[UbicacionCliente],
) -> IntegridadPrincipales {
    let mut resultado = IntegridadPrincipales::default();

    for cliente in clientes {
        let propias: Vec<&UbicacionCliente> = ubicaciones
            .iter()
            .filter(|u| u.cod_cliente == cliente.cod_cliente)
            .collect();
        if propias.is_empty() {
            continue;
        }
        let cod = cliente.cod_cliente.clone();
        match cliente.id_ubicacion_principal {
            None => {
                resultado.clientes_sin_ubicacion_principal.push(cod.clone());
                resultado.clientes_con_ubicaciones_disponibles.push(cod);
            }
            Some(id) if !propias.iter().any(|u| u.id_ubicacion == id) => {
                resultado.ubicaciones_principales_invalidas.push(cod.clone());
                resultado.clientes_con_ubicaciones_disponibles.push(cod);
            }
            Some(_) => {}
        }
    }

    resultado
}

/// Per-client location summary row.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct ResumenCliente {
    pub cod_cliente: String,
    pub nombre_cliente: String,
    pub total_ubicaciones: usize,
    pub tiene_ubicacion_principal: bool,
    pub ubicacion_principal: Option<UbicacionInfo>,
    pub ubicaciones: Vec<UbicacionMarcada>,
}

pub fn resumen_por_cliente(
    clientes: Vec<Cliente>,
    ubicaciones: &[UbicacionCliente],
) -> Vec<ResumenCliente> {
    agrupar(clientes, ubicaciones)
        .into_iter()
        .map(|c| ResumenCliente {
            tiene_ubicacion_principal: c.cliente.id_ubicacion_principal.is_some(),
            total_ubicaciones: c.ubicaciones.len(),
            ubicacion_principal: c.ubicacion_principal_info,
            ubicaciones: c.ubicaciones,
            nombre_cliente: c.cliente.nombre,
            cod_cliente: c.cliente.cod_cliente,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cliente(cod: &str, principal: Option<i32>) -> Cliente {
        Cliente {
            cod_cliente: cod.to_string(),
            nombre: format!("Cliente {cod}"),
            id_ubicacion_principal: principal,
            ..Cliente::default()
        }
    }

    fn ubicacion(id: i32, cod: &str) -> UbicacionCliente {
        UbicacionCliente {
            id_ubicacion: id,
            cod_cliente: cod.to_string(),
            direccion: format!("Calle {id}"),
            sector: "Centro".to_string(),
            ..UbicacionCliente::default()
        }
    }

    #[test]
    fn marks_principal_and_exposes_summary() {
        let c = ClienteConUbicaciones::new(
            cliente("C1", Some(2)),
            vec![ubicacion(1, "C1"), ubicacion(2, "C1"), ubicacion(3, "C2")],
        );
        assert_eq!(c.ubicaciones.len(), 2);
        assert!(!c.ubicaciones[0].es_principal);
        assert!(c.ubicaciones[1].es_principal);
        assert_eq!(c.ubicacion_principal_info.as_ref().map(|u| u.id_ubicacion), Some(2));
        assert!(!c.sugerir_principal());
    }

    #[test]
    fn suggests_principal_when_missing() {
        let c = ClienteConUbicaciones::new(cliente("C1", None), vec![ubicacion(1, "C1")]);
        assert!(c.sugerir_principal());
        let vacio = ClienteConUbicaciones::new(cliente("C2", None), vec![]);
        assert!(!vacio.sugerir_principal());
    }

    #[test]
    fn plans_the_three_repairs() {
        let ubicaciones = vec![ubicacion(10, "A"), ubicacion(11, "A"), ubicacion(20, "B")];
        let grupos = agrupar(
            vec![
                cliente("A", None),
                cliente("B", Some(99)),
                cliente("C", Some(5)),
                cliente("D", None),
                cliente("E", Some(20)),
            ],
            &ubicaciones,
        );
        let planes: Vec<Option<Reparacion>> = grupos.iter().map(planificar).collect();

        assert_eq!(
            planes[0],
            Some(Reparacion::Establecer {
                id_ubicacion: 10,
                direccion: "Calle 10".to_string()
            })
        );
        assert_eq!(
            planes[1],
            Some(Reparacion::Reasignar {
                id_ubicacion: 20,
                direccion: "Calle 20".to_string()
            })
        );
        assert_eq!(planes[2], Some(Reparacion::Limpiar));
        assert_eq!(planes[3], None);
        // E points at a location of B
        assert_eq!(
            planes[4],
            Some(Reparacion::Limpiar)
        );
    }

    #[test]
    fn valid_principal_needs_no_repair() {
        let grupos = agrupar(vec![cliente("A", Some(11))], &[ubicacion(10, "A"), ubicacion(11, "A")]);
        assert_eq!(planificar(&grupos[0]), None);
    }

    #[test]
    fn repair_messages() {
        let establecer = Reparacion::Establecer {
            id_ubicacion: 1,
            direccion: "Av. Amazonas".to_string(),
        };
        assert_eq!(
            establecer.mensaje(),
            "Establecida ubicación principal: Av. Amazonas"
        );
        assert_eq!(establecer.nuevo_principal(), Some(1));
        assert_eq!(
            Reparacion::Limpiar.mensaje(),
            "Limpiada ubicación principal (sin ubicaciones)"
        );
        assert_eq!(Reparacion::Limpiar.nuevo_principal(), None);

        let mut resultado = ResultadoReparacion::default();
        resultado.registrar_exito("A", &establecer);
        resultado.registrar_error("B", "Recurso no encontrado");
        assert_eq!(resultado.reparados, 1);
        assert_eq!(resultado.detalles[0].cod_cliente, "A");
        assert_eq!(
            resultado.errores,
            vec!["Error al reparar cliente B: Recurso no encontrado"]
        );
    }

    #[test]
    fn integrity_report_lists_every_category() {
        let clientes = vec![
            cliente("A", None),
            cliente("B", Some(99)),
            cliente("C", None),
            cliente("D", Some(30)),
        ];
        let ubicaciones = vec![
            ubicacion(10, "A"),
            ubicacion(20, "B"),
            ubicacion(30, "D"),
            ubicacion(40, "X"),
        ];

        let informe = verificar_integridad(&clientes, &ubicaciones);

        assert_eq!(informe.clientes_sin_ubicaciones, vec!["C"]);
        assert_eq!(informe.clientes_sin_ubicacion_principal, vec!["A"]);
        assert_eq!(informe.clientes_con_ubicacion_principal_invalida, vec!["B"]);
        assert_eq!(informe.ubicaciones_huerfanas, vec![40]);
        assert!(informe.tiene_problemas());
        assert_eq!(
            informe.resumen,
            "Se encontraron los siguientes problemas: 1 clientes sin ubicaciones, \
             1 clientes sin ubicación principal, 1 clientes con ubicación principal inválida, \
             1 ubicaciones huérfanas"
        );
    }

    #[test]
    fn clean_dataset_reports_no_problems() {
        let informe = verificar_integridad(&[cliente("A", Some(1))], &[ubicacion(1, "A")]);
        assert!(!informe.tiene_problemas());
        assert_eq!(informe.resumen, "No se encontraron problemas de integridad");
    }

    #[test]
    fn principal_check_skips_clients_without_locations() {
        let clientes = vec![
            cliente("A", None),
            cliente("B", Some(9)),
            cliente("C", Some(9)),
            cliente("D", Some(30)),
        ];
        let ubicaciones = vec![ubicacion(10, "A"), ubicacion(20, "B"), ubicacion(30, "D")];

        let resultado = verificar_principales(&clientes, &ubicaciones);

        assert_eq!(resultado.clientes_sin_ubicacion_principal, vec!["A"]);
        assert_eq!(resultado.ubicaciones_principales_invalidas, vec!["B"]);
        assert_eq!(resultado.clientes_con_ubicaciones_disponibles, vec!["A", "B"]);
    }

    #[test]
    fn resumen_por_cliente_counts_locations() {
        let resumen = resumen_por_cliente(
            vec![cliente("A", Some(2)), cliente("B", None)],
            &[ubicacion(1, "A"), ubicacion(2, "A")],
        );
        assert_eq!(resumen[0].total_ubicaciones, 2);
        assert!(resumen[0].tiene_ubicacion_principal);
        assert_eq!(resumen[0].ubicacion_principal.as_ref().map(|u| u.id_ubicacion), Some(2));
        assert_eq!(resumen[1].total_ubicaciones, 0);
        assert!(!resumen[1].tiene_ubicacion_principal);
    }
}
