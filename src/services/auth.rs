use thiserror::Error;
use validator::Validate;

use crate::domain::usuario::LoginResponse;
use crate::forms::auth::LoginForm;
use crate::forms::mensajes;
use crate::models::auth::{AuthenticatedUser, token_expiry};
use crate::notifications::Notificacion;
use crate::repository::errors::RepositoryError;
use crate::repository::{AuthReader, RolReader};

/// Why a login attempt failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoginFailure {
    Credentials,
    Inactive,
    Connection,
    Timeout,
    Server,
    Default,
}

impl LoginFailure {
    fn from_repository(err: &RepositoryError) -> Self {
        match err {
            RepositoryError::Credentials(detail) if detail.to_lowercase().contains("inactivo") => {
                LoginFailure::Inactive
            }
            RepositoryError::Credentials(_) => LoginFailure::Credentials,
            RepositoryError::Network(_) => LoginFailure::Connection,
            RepositoryError::Timeout => LoginFailure::Timeout,
            RepositoryError::Server(_) => LoginFailure::Server,
            _ => LoginFailure::Default,
        }
    }

    pub fn notificacion(self) -> Notificacion {
        match self {
            LoginFailure::Credentials => Notificacion::login_fallido(
                "Credenciales Incorrectas",
                "El RUC empresarial, correo electrónico o contraseña son incorrectos.",
            ),
            LoginFailure::Inactive => Notificacion::login_fallido(
                "Cuenta Inactiva",
                "Tu cuenta está temporalmente inactiva. Contacta al administrador del sistema.",
            ),
            LoginFailure::Connection => Notificacion::conexion(),
            LoginFailure::Timeout => Notificacion::tiempo_agotado(),
            LoginFailure::Server => Notificacion::servidor(),
            LoginFailure::Default => Notificacion::login_fallido(
                "Error de Autenticación",
                "Ha ocurrido un error durante el inicio de sesión.",
            ),
        }
    }
}

#[derive(Debug, Error)]
pub enum LoginError {
    #[error("{0}")]
    Form(String),

    #[error("login failed: {0:?}")]
    Rejected(LoginFailure),
}

impl From<RepositoryError> for LoginError {
    fn from(err: RepositoryError) -> Self {
        LoginError::Rejected(LoginFailure::from_repository(&err))
    }
}

/// Validates the form and exchanges the credentials for a token.
pub async fn authenticate<R>(repo: &R, form: LoginForm) -> Result<LoginResponse, LoginError>
where
    R: AuthReader,
{
    if let Err(err) = form.validate() {
        return Err(LoginError::Form(mensajes(&err)));
    }

    let response = repo.login(&form.into()).await.map_err(|err| {
        log::warn!("Login rejected: {err}");
        err
    })?;

    if !response.user.estado.trim().eq_ignore_ascii_case("activo") {
        return Err(LoginError::Rejected(LoginFailure::Inactive));
    }

    Ok(response)
}

/// Builds the session identity of a logged-in employee.
///
/// `repo` must already carry the new token: the role description comes from
/// `/roles/{id}`.
pub async fn open_session<R>(
    repo: &R,
    login: LoginResponse,
    jwt_secret: &str,
) -> Result<AuthenticatedUser, LoginError>
where
    R: RolReader,
{
    let (_, exp) = token_expiry(&login.access_token, jwt_secret).map_err(|err| {
        log::error!("Failed to read token claims: {err}");
        LoginError::Rejected(LoginFailure::Default)
    })?;

    let rol = repo
        .get_rol(login.user.rol)
        .await?
        .map(|rol| rol.descripcion)
        .ok_or_else(|| {
            log::error!("Role {} of user {} not found", login.user.rol, login.user.identificacion);
            LoginError::Rejected(LoginFailure::Default)
        })?;

    Ok(AuthenticatedUser {
        identificacion: login.user.identificacion,
        nombre: login.user.nombre,
        correo: login.user.correo,
        rucempresarial: login.user.rucempresarial,
        rol,
        token: login.access_token,
        exp,
    })
}
