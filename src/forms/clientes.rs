use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::domain::cliente::NewCliente;
use crate::domain::types::clean_text;
use crate::forms::one_of;

fn tipo_cliente(value: &str) -> Result<(), ValidationError> {
    one_of(
        value,
        &["natural", "juridico"],
        "El tipo de cliente es requerido",
    )
}

#[derive(Debug, Deserialize, Validate)]
/// Create/edit form of a client.
pub struct ClienteForm {
    #[validate(length(
        min = 3,
        max = 50,
        message = "El código debe tener entre 3 y 50 caracteres"
    ))]
    pub cod_cliente: String,
    #[validate(length(min = 10, message = "La identificación debe tener al menos 10 caracteres"))]
    pub identificacion: String,
    #[validate(length(min = 2, message = "El nombre debe tener al menos 2 caracteres"))]
    pub nombre: String,
    #[validate(email(message = "Ingrese un correo válido"))]
    pub correo: String,
    #[validate(length(min = 1, message = "La dirección es requerida"))]
    pub direccion: String,
    #[validate(length(min = 10, message = "El celular debe tener al menos 10 dígitos"))]
    pub celular: String,
    #[validate(custom(function = "tipo_cliente"))]
    pub tipo_cliente: String,
    #[serde(default)]
    #[validate(length(max = 100, message = "La razón social admite máximo 100 caracteres"))]
    pub razon_social: String,
    #[validate(length(min = 1, message = "El sector es requerido"))]
    pub sector: String,
    #[serde(default)]
    pub id_ubicacion_principal: Option<i32>,
}

impl From<ClienteForm> for NewCliente {
    fn from(form: ClienteForm) -> Self {
        NewCliente {
            cod_cliente: form.cod_cliente.trim().to_string(),
            identificacion: form.identificacion.trim().to_string(),
            nombre: clean_text(&form.nombre),
            direccion: clean_text(&form.direccion),
            celular: form.celular.trim().to_string(),
            correo: form.correo.trim().to_lowercase(),
            tipo_cliente: form.tipo_cliente.trim().to_lowercase(),
            razon_social: clean_text(&form.razon_social),
            sector: clean_text(&form.sector),
            id_ubicacion_principal: form.id_ubicacion_principal,
        }
    }
}

#[derive(Deserialize)]
/// Selection of a client's principal location.
pub struct PrincipalForm {
    pub id_ubicacion: i32,
}
