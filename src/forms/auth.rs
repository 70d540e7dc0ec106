use serde::Deserialize;
use validator::Validate;

use crate::domain::usuario::Credenciales;

#[derive(Deserialize, Validate)]
/// Login form of the landing page.
pub struct LoginForm {
    #[validate(length(min = 10, message = "El RUC debe tener al menos 10 caracteres"))]
    pub rucempresarial: String,
    #[validate(email(message = "Ingrese un correo válido"))]
    pub correo: String,
    #[validate(length(min = 8, message = "La contraseña debe tener al menos 8 caracteres"))]
    pub contrasena: String,
}

impl From<LoginForm> for Credenciales {
    fn from(form: LoginForm) -> Self {
        Credenciales {
            rucempresarial: form.rucempresarial.trim().to_string(),
            correo: form.correo.trim().to_string(),
            contrasena: form.contrasena,
        }
    }
}
