use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::domain::types::{clean_text, non_blank};
use crate::domain::usuario::NewUsuario;
use crate::forms::{FormError, blank_as_none, one_of};

fn estado_usuario(value: &str) -> Result<(), ValidationError> {
    one_of(value, &["activo", "inactivo"], "El estado es requerido")
}

#[derive(Debug, Deserialize, Validate)]
/// Create/edit form of an employee.
pub struct UsuarioForm {
    #[validate(length(min = 10, message = "La identificación debe tener al menos 10 caracteres"))]
    pub identificacion: String,
    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(length(min = 10, message = "El RUC debe tener al menos 10 caracteres"))]
    pub rucempresarial: Option<String>,
    #[validate(length(min = 2, message = "El nombre debe tener al menos 2 caracteres"))]
    pub nombre: String,
    #[validate(email(message = "Ingrese un correo válido"))]
    pub correo: String,
    #[validate(length(min = 10, message = "El celular debe tener al menos 10 dígitos"))]
    pub celular: String,
    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(length(min = 8, message = "La contraseña debe tener al menos 8 caracteres"))]
    pub contrasena: Option<String>,
    #[validate(custom(function = "estado_usuario"))]
    pub estado: String,
    #[validate(range(min = 1, message = "El rol es requerido"))]
    pub id_rol: i32,
}

impl UsuarioForm {
    /// Payload for a new employee; the password is mandatory.
    pub fn to_new_usuario(self) -> Result<NewUsuario, FormError> {
        if non_blank(self.contrasena.clone()).is_none() {
            return Err(FormError::ContrasenaRequerida);
        }
        Ok(self.into_payload())
    }

    /// Payload for an edit; a blank password keeps the stored one.
    pub fn into_payload(self) -> NewUsuario {
        NewUsuario {
            identificacion: self.identificacion.trim().to_string(),
            rucempresarial: non_blank(self.rucempresarial),
            nombre: clean_text(&self.nombre),
            correo: self.correo.trim().to_lowercase(),
            celular: self.celular.trim().to_string(),
            contrasena: self.contrasena.filter(|c| !c.trim().is_empty()),
            estado: self.estado.trim().to_lowercase(),
            id_rol: self.id_rol,
        }
    }
}
