//! Screen-level operations: role checks, validation and backend calls.

use validator::Validate;

use crate::domain::usuario::Role;
use crate::forms::mensajes;
use crate::models::auth::AuthenticatedUser;

pub mod auth;
pub mod catalogo;
pub mod clientes;
pub mod errors;
pub mod facturas;
pub mod home;
pub mod pedidos;
pub mod rutas;
pub mod ubicaciones;
pub mod usuarios;

pub use errors::{ServiceError, ServiceResult};

/// Role of `user` when it is one of `allowed`.
pub fn check_role(user: &AuthenticatedUser, allowed: &[Role]) -> ServiceResult<Role> {
    match user.role() {
        Some(role) if allowed.contains(&role) => Ok(role),
        _ => Err(ServiceError::Unauthorized),
    }
}

/// Runs the form rules, turning failures into a user message.
pub(crate) fn validate_form<F: Validate>(form: &F) -> ServiceResult<()> {
    form.validate().map_err(|err| {
        log::error!("Failed to validate form: {err}");
        ServiceError::Form(mensajes(&err))
    })
}
