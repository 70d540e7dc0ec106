use serde::{Deserialize, Serialize};

use crate::domain::usuario::{Rol, Usuario};

#[derive(Debug, Default, Deserialize)]
pub struct EmpleadosQuery {
    pub q: Option<String>,
    /// Role description filter.
    pub rol: Option<String>,
}

/// Employee row with its resolved role description.
#[derive(Debug, Serialize)]
pub struct FilaUsuario {
    pub usuario: Usuario,
    pub rol: String,
}

#[derive(Debug, Serialize)]
pub struct EmpleadosPageData {
    pub usuarios: Vec<FilaUsuario>,
    pub roles: Vec<Rol>,
    pub search_query: Option<String>,
    pub rol: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UsuarioFormData {
    pub usuario: Option<Usuario>,
    pub roles: Vec<Rol>,
}
