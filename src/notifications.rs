//! User-facing messages shown as flash alerts.

use std::fmt::{Display, Formatter};

use actix_web_flash_messages::{FlashMessage, Level};

use crate::repository::errors::RepositoryError;

const VALIDACION_GENERICA: &str =
    "Datos de entrada inválidos. Verifica la información e intenta nuevamente.";

/// A titled alert.
#[derive(Clone, Debug, PartialEq)]
pub struct Notificacion {
    pub nivel: Level,
    pub titulo: &'static str,
    pub descripcion: String,
}

impl Notificacion {
    fn error(titulo: &'static str, descripcion: impl Into<String>) -> Self {
        Self {
            nivel: Level::Error,
            titulo,
            descripcion: descripcion.into(),
        }
    }

    pub fn exito(titulo: &'static str, descripcion: impl Into<String>) -> Self {
        Self {
            nivel: Level::Success,
            titulo,
            descripcion: descripcion.into(),
        }
    }

    pub fn guardado(item: &str) -> Self {
        Self::exito("Guardado Exitoso", format!("{item} se ha guardado correctamente."))
    }

    pub fn actualizado(item: &str) -> Self {
        Self::exito(
            "Actualizado Exitoso",
            format!("{item} se ha actualizado correctamente."),
        )
    }

    pub fn eliminado(item: &str) -> Self {
        Self::exito(
            "Eliminado Exitoso",
            format!("{item} se ha eliminado correctamente."),
        )
    }

    pub fn login_fallido(titulo: &'static str, descripcion: &str) -> Self {
        Self::error(titulo, descripcion)
    }

    pub fn sesion_expirada() -> Self {
        Self::error(
            "Sesión Expirada",
            "Tu sesión ha caducado por seguridad. Serás redirigido al login para iniciar sesión nuevamente.",
        )
    }

    pub fn permisos_insuficientes() -> Self {
        Self::error(
            "Permisos Insuficientes",
            "No tienes permisos para acceder a esta sección.",
        )
    }

    pub fn acceso_restringido() -> Self {
        Self {
            nivel: Level::Warning,
            titulo: "Acceso Restringido",
            descripcion: "Tu rol no tiene acceso a esta página.".to_string(),
        }
    }

    pub fn no_encontrado() -> Self {
        Self::error(
            "Recurso No Encontrado",
            "El recurso solicitado no existe o ha sido eliminado.",
        )
    }

    pub fn validacion(detalle: Option<&str>) -> Self {
        let detalle = detalle
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .unwrap_or(VALIDACION_GENERICA);
        Self::error("Error de Validación", detalle)
    }

    pub fn servidor() -> Self {
        Self::error(
            "Error del Servidor",
            "Hay un problema temporal con el servidor. Por favor, intenta nuevamente en unos minutos.",
        )
    }

    pub fn conexion() -> Self {
        Self::error(
            "Error de Conexión",
            "No se pudo conectar al servidor. Verifica tu conexión a internet e intenta nuevamente.",
        )
    }

    pub fn tiempo_agotado() -> Self {
        Self::error(
            "Tiempo de Espera Agotado",
            "La petición tardó demasiado en responder. Por favor, intenta nuevamente.",
        )
    }

    pub fn operacion_fallida(detalle: &str) -> Self {
        Self::error(
            "Operación Fallida",
            format!("No se pudo completar la operación: {detalle}. Intenta nuevamente."),
        )
    }

    /// Queues the alert for the next rendered page.
    pub fn send(self) {
        FlashMessage::new(self.to_string(), self.nivel).send();
    }
}

impl Display for Notificacion {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.titulo, self.descripcion)
    }
}

/// Alert for an HTTP status returned by the backend.
pub fn por_estado(status: u16, detalle: Option<&str>) -> Notificacion {
    match status {
        401 => Notificacion::sesion_expirada(),
        403 => Notificacion::permisos_insuficientes(),
        404 => Notificacion::no_encontrado(),
        422 => Notificacion::validacion(detalle),
        s if s >= 500 => Notificacion::servidor(),
        _ => Notificacion::operacion_fallida(detalle.unwrap_or("solicitud rechazada")),
    }
}

/// Alert for a failed backend call.
pub fn por_error(err: &RepositoryError) -> Notificacion {
    match err {
        RepositoryError::Network(_) => Notificacion::conexion(),
        RepositoryError::Timeout => Notificacion::tiempo_agotado(),
        RepositoryError::Decode(_) => Notificacion::operacion_fallida("respuesta inesperada"),
        RepositoryError::Validation(detalle)
        | RepositoryError::BadRequest(detalle)
        | RepositoryError::Credentials(detalle) => {
            por_estado(err.status().unwrap_or(400), Some(detalle))
        }
        other => por_estado(other.status().unwrap_or(500), None),
    }
}

/// Alert for the `?message=` code the login page receives after a redirect.
pub fn mensaje_inicio(codigo: &str) -> Option<Notificacion> {
    match codigo {
        "session-expired" => Some(Notificacion::sesion_expirada()),
        "access-denied" => Some(Notificacion {
            nivel: Level::Warning,
            titulo: "Acceso Denegado",
            descripcion: "Debes iniciar sesión para acceder a esta página.".to_string(),
        }),
        "logout" => Some(Notificacion::exito(
            "Sesión Cerrada Exitosamente",
            "Tu sesión se ha cerrado de forma segura.",
        )),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_statuses_to_titles() {
        assert_eq!(por_estado(401, None).titulo, "Sesión Expirada");
        assert_eq!(por_estado(403, None).titulo, "Permisos Insuficientes");
        assert_eq!(por_estado(404, None).titulo, "Recurso No Encontrado");
        assert_eq!(por_estado(500, None).titulo, "Error del Servidor");
        assert_eq!(por_estado(503, None).titulo, "Error del Servidor");
    }

    #[test]
    fn validation_prefers_backend_detail() {
        let con_detalle = por_estado(422, Some("correo inválido"));
        assert_eq!(con_detalle.titulo, "Error de Validación");
        assert_eq!(con_detalle.descripcion, "correo inválido");

        assert_eq!(por_estado(422, Some("  ")).descripcion, VALIDACION_GENERICA);
        assert_eq!(por_estado(422, None).descripcion, VALIDACION_GENERICA);
    }

    #[test]
    fn transport_failures() {
        assert_eq!(
            por_error(&RepositoryError::Network("refused".into())).titulo,
            "Error de Conexión"
        );
        assert_eq!(
            por_error(&RepositoryError::Timeout).titulo,
            "Tiempo de Espera Agotado"
        );
        assert_eq!(
            por_error(&RepositoryError::Server(502)).titulo,
            "Error del Servidor"
        );
        assert_eq!(por_error(&RepositoryError::Server(502)).nivel, Level::Error);
    }

    #[test]
    fn login_page_messages() {
        assert_eq!(
            mensaje_inicio("session-expired").unwrap().titulo,
            "Sesión Expirada"
        );
        assert_eq!(mensaje_inicio("logout").unwrap().nivel, Level::Success);
        assert!(mensaje_inicio("otro").is_none());
    }
}
