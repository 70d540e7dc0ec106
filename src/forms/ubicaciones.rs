use serde::Deserialize;
use validator::Validate;

use crate::domain::types::{clean_text, non_blank};
use crate::domain::ubicacion::NewUbicacion;
use crate::forms::{blank_as_none, finite};

#[derive(Debug, Deserialize, Validate)]
/// Create/edit form of a client location.
pub struct UbicacionForm {
    #[validate(length(min = 1, message = "Por favor seleccione un cliente"))]
    pub cod_cliente: String,
    #[validate(
        range(min = -90.0, max = 90.0, message = "Latitud fuera de rango"),
        custom(function = "finite")
    )]
    pub latitud: f64,
    #[validate(
        range(min = -180.0, max = 180.0, message = "Longitud fuera de rango"),
        custom(function = "finite")
    )]
    pub longitud: f64,
    #[validate(length(min = 1, message = "Por favor ingrese la dirección"))]
    pub direccion: String,
    #[validate(length(min = 1, message = "Por favor ingrese el sector"))]
    pub sector: String,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub referencia: Option<String>,
}

impl From<UbicacionForm> for NewUbicacion {
    fn from(form: UbicacionForm) -> Self {
        NewUbicacion {
            cod_cliente: form.cod_cliente.trim().to_string(),
            latitud: form.latitud,
            longitud: form.longitud,
            direccion: clean_text(&form.direccion),
            sector: clean_text(&form.sector),
            referencia: non_blank(form.referencia.map(|r| clean_text(&r))),
        }
    }
}
