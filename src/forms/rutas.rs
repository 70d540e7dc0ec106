use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::domain::ruta::{ESTADOS_RUTA, NewAsignacion, NewRuta, TipoRuta};
use crate::domain::types::{clean_text, non_blank};
use crate::domain::ubicacion::UbicacionCliente;
use crate::forms::{blank_as_none, one_of};

fn tipo_ruta(value: &str) -> Result<(), ValidationError> {
    one_of(
        value,
        &["venta", "entrega"],
        "Por favor seleccione el tipo de ruta",
    )
}

fn estado_ruta(value: &str) -> Result<(), ValidationError> {
    one_of(value, &ESTADOS_RUTA, "Estado de ruta desconocido")
}

#[derive(Debug, Deserialize, Validate)]
/// Create/edit form of a route.
///
/// Stops are posted as repeated `id_ubicacion` values in visit order.
pub struct RutaForm {
    #[validate(length(min = 1, message = "Por favor ingrese el nombre"))]
    pub nombre: String,
    #[validate(length(min = 1, message = "Por favor seleccione un sector"))]
    pub sector: String,
    #[validate(length(min = 1, message = "Por favor ingrese la dirección"))]
    pub direccion: String,
    #[validate(custom(function = "tipo_ruta"))]
    pub tipo_ruta: String,
    #[validate(custom(function = "estado_ruta"))]
    pub estado: String,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub fecha_ejecucion: Option<String>,
    #[serde(default)]
    pub id_pedido: Option<i32>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub identificacion_usuario: Option<String>,
    #[serde(default)]
    pub id_ubicacion: Vec<i32>,
}

impl RutaForm {
    pub fn tipo(&self) -> TipoRuta {
        TipoRuta::parse(&self.tipo_ruta).unwrap_or_default()
    }

    pub fn usuario(&self) -> Option<String> {
        non_blank(self.identificacion_usuario.clone())
    }

    /// Builds the payload; each stop becomes one assignment carrying the
    /// assigned employee and the owner of the location.
    pub fn to_new_ruta(&self, ubicaciones: &[UbicacionCliente]) -> NewRuta {
        let tipo = self.tipo();
        let usuario = self.usuario();
        let tipo_usuario = usuario
            .as_ref()
            .map(|_| tipo.rol_requerido().label().to_lowercase());

        let mut asignaciones: Vec<NewAsignacion> = self
            .id_ubicacion
            .iter()
            .enumerate()
            .map(|(orden, id)| NewAsignacion {
                identificacion_usuario: usuario.clone(),
                tipo_usuario: tipo_usuario.clone(),
                cod_cliente: ubicaciones
                    .iter()
                    .find(|u| u.id_ubicacion == *id)
                    .map(|u| u.cod_cliente.clone()),
                id_ubicacion: Some(*id),
                orden_visita: Some(orden as i32 + 1),
            })
            .collect();

        if asignaciones.is_empty() && usuario.is_some() {
            asignaciones.push(NewAsignacion {
                identificacion_usuario: usuario,
                tipo_usuario,
                ..Default::default()
            });
        }

        NewRuta {
            nombre: clean_text(&self.nombre),
            tipo_ruta: tipo,
            sector: clean_text(&self.sector),
            direccion: clean_text(&self.direccion),
            estado: Some(self.estado.trim().to_lowercase()),
            fecha_ejecucion: non_blank(self.fecha_ejecucion.clone()),
            id_pedido: self.id_pedido,
            asignaciones: (!asignaciones.is_empty()).then_some(asignaciones),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::parse;

    fn ubicacion(id: i32, cod: &str) -> UbicacionCliente {
        UbicacionCliente {
            id_ubicacion: id,
            cod_cliente: cod.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn stops_keep_visit_order() {
        let form: RutaForm = parse(
            b"nombre=Norte+1&sector=Norte&direccion=Av.+Prensa&tipo_ruta=entrega\
              &estado=planificada&fecha_ejecucion=&identificacion_usuario=1711111111\
              &id_ubicacion=7&id_ubicacion=3",
        )
        .unwrap();
        assert!(form.validate().is_ok());

        let ruta = form.to_new_ruta(&[ubicacion(3, "C3"), ubicacion(7, "C7")]);
        let asignaciones = ruta.asignaciones.unwrap();
        assert_eq!(ruta.tipo_ruta, TipoRuta::Entrega);
        assert_eq!(ruta.fecha_ejecucion, None);
        assert_eq!(asignaciones[0].id_ubicacion, Some(7));
        assert_eq!(asignaciones[0].cod_cliente.as_deref(), Some("C7"));
        assert_eq!(asignaciones[1].orden_visita, Some(2));
        assert_eq!(
            asignaciones[1].tipo_usuario.as_deref(),
            Some("transportista")
        );
    }

    #[test]
    fn employee_without_stops_gets_one_assignment() {
        let form: RutaForm = parse(
            b"nombre=Sur&sector=Sur&direccion=X&tipo_ruta=venta&estado=planificada\
              &identificacion_usuario=1722222222",
        )
        .unwrap();
        let ruta = form.to_new_ruta(&[]);
        let asignaciones = ruta.asignaciones.unwrap();
        assert_eq!(asignaciones.len(), 1);
        assert_eq!(asignaciones[0].id_ubicacion, None);
    }

    #[test]
    fn rejects_unknown_estado() {
        let form: RutaForm = parse(
            b"nombre=Sur&sector=Sur&direccion=X&tipo_ruta=aerea&estado=perdida",
        )
        .unwrap();
        let err = form.validate().unwrap_err();
        assert!(err.field_errors().contains_key("tipo_ruta"));
        assert!(err.field_errors().contains_key("estado"));
    }
}
