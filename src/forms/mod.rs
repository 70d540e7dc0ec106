//! Form definitions backing the Vendly routes.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use thiserror::Error;
use validator::{ValidationError, ValidationErrors};

pub mod auth;
pub mod catalogo;
pub mod clientes;
pub mod pedidos;
pub mod rutas;
pub mod ubicaciones;
pub mod usuarios;

#[derive(Debug, Error)]
/// Errors that can occur when processing form data.
pub enum FormError {
    #[error("{}", mensajes(.0))]
    Validation(#[from] ValidationErrors),

    #[error("Formulario inválido: {0}")]
    Malformed(String),

    #[error("Debe agregar al menos un producto")]
    SinLineas,

    #[error("Las líneas del pedido están incompletas")]
    LineasIncompletas,

    #[error("La contraseña es requerida")]
    ContrasenaRequerida,
}

/// Parses an urlencoded body.
///
/// Unlike `web::Form`, repeated keys fill vectors. An empty value such as
/// `campo=` still reaches an `Option<String>` as `Some("")`; optional text
/// fields opt into [`blank_as_none`].
pub fn parse<T: DeserializeOwned>(payload: &[u8]) -> Result<T, FormError> {
    serde_html_form::from_bytes(payload).map_err(|e| FormError::Malformed(e.to_string()))
}

/// Joins the messages of every failed rule, ordered by field name.
pub fn mensajes(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    fields
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map_or_else(|| format!("{field} es inválido"), |m| m.to_string())
            })
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Reads an optional text field, treating a blank value as absent.
///
/// The value itself is kept untouched so passwords are not trimmed.
pub(crate) fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|v| !v.trim().is_empty()))
}

/// Rejects `NaN` and infinities, which slip through `range` rules.
pub(crate) fn finite(value: f64) -> Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::new("finite").with_message("Ingrese un número válido".into()))
    }
}

/// Rejects values outside `allowed`, ignoring case.
pub(crate) fn one_of(
    value: &str,
    allowed: &[&str],
    message: &'static str,
) -> Result<(), ValidationError> {
    let value = value.trim().to_lowercase();
    if allowed.iter().any(|a| a.to_lowercase() == value) {
        Ok(())
    } else {
        Err(ValidationError::new("one_of").with_message(message.into()))
    }
}

/// Shared rule for `descripcion` of categories, brands and roles.
#[derive(serde::Deserialize, validator::Validate)]
pub struct DescripcionForm {
    #[validate(length(
        min = 2,
        max = 100,
        message = "La descripción debe tener entre 2 y 100 caracteres"
    ))]
    pub descripcion: String,
}

impl DescripcionForm {
    pub fn descripcion(&self) -> String {
        crate::domain::types::clean_text(&self.descripcion)
    }
}
