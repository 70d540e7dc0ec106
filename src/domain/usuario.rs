//! Employees, their roles and the role-based navigation.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::domain::types::{opt_string_or_number, string_or_number};

/// Role record as stored by the backend.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Rol {
    pub id_rol: i32,
    pub descripcion: String,
}

/// Payload for creating or renaming a role.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct NewRol {
    pub descripcion: String,
}

/// Application role that drives the sidebar and page access.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Vendedor,
    Bodeguero,
    Facturador,
    Transportista,
}

impl Role {
    /// Parses a backend role description. `Cajero` is the backend name of the
    /// invoicing role.
    pub fn from_descripcion(descripcion: &str) -> Option<Self> {
        match descripcion.trim().to_lowercase().as_str() {
            "admin" | "administrador" => Some(Role::Admin),
            "vendedor" => Some(Role::Vendedor),
            "bodeguero" => Some(Role::Bodeguero),
            "cajero" | "facturador" => Some(Role::Facturador),
            "transportista" => Some(Role::Transportista),
            _ => None,
        }
    }

    /// Landing page for the role.
    pub fn home_path(self) -> &'static str {
        match self {
            Role::Admin => "/home",
            Role::Bodeguero => "/bodega/home",
            Role::Facturador => "/facturador/home",
            Role::Transportista => "/transportista/home",
            Role::Vendedor => "/vendedor/home",
        }
    }

    /// Path prefix of the role's section (empty for admin).
    pub fn prefix(self) -> &'static str {
        match self {
            Role::Admin => "",
            Role::Bodeguero => "/bodega",
            Role::Facturador => "/facturador",
            Role::Transportista => "/transportista",
            Role::Vendedor => "/vendedor",
        }
    }

    /// Human readable label.
    pub fn label(self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Vendedor => "Vendedor",
            Role::Bodeguero => "Bodeguero",
            Role::Facturador => "Facturador",
            Role::Transportista => "Transportista",
        }
    }

    /// Ordered sidebar entries `(page key, path, label)`.
    pub fn menu(self) -> Vec<MenuItem> {
        let entries: &[(&str, &str, &str)] = match self {
            Role::Admin => &[
                ("home", "/home", "Dashboard"),
                ("catalogo", "/catalogo", "Catálogo"),
                ("inventario", "/inventario", "Inventario"),
                ("clientes", "/clientes", "Clientes"),
                ("ubicaciones", "/ubicaciones", "Ubicaciones"),
                ("empleados", "/empleados", "Empleados"),
                ("pedidos", "/pedidos", "Pedidos"),
                ("facturas", "/facturas", "Facturas"),
                ("entregas", "/entregas", "Entregas"),
                ("rutas", "/rutas", "Rutas"),
                ("categorias", "/categorias", "Categorías"),
                ("marcas", "/marcas", "Marcas"),
                ("roles", "/roles", "Roles"),
            ],
            Role::Bodeguero => &[
                ("home", "/bodega/home", "Home Bodega"),
                ("inventario", "/bodega/inventario", "Inventario Bodega"),
                ("catalogo", "/bodega/catalogo", "Catálogo Bodega"),
                ("categorias", "/bodega/categoria", "Categoría Bodega"),
                ("marcas", "/bodega/marca", "Marca Bodega"),
            ],
            Role::Facturador => &[
                ("home", "/facturador/home", "Home"),
                ("clientes", "/facturador/clientes", "Clientes"),
                ("facturas", "/facturador/facturar", "Facturar"),
                ("pedidos", "/facturador/pedidos", "Pedidos"),
                ("vendedores", "/facturador/vendedor", "Vendedor"),
            ],
            Role::Transportista => &[
                ("home", "/transportista/home", "Home"),
                ("clientes", "/transportista/clientes", "Clientes"),
                ("pedidos", "/transportista/pedidos", "Pedidos"),
                ("rutas", "/transportista/rutas", "Rutas"),
            ],
            Role::Vendedor => &[
                ("home", "/vendedor/home", "Home"),
                ("inventario", "/vendedor/inventario", "Inventario"),
                ("catalogo", "/vendedor/catalogo", "Catálogo"),
                ("clientes", "/vendedor/clientes", "Clientes"),
                ("rutas", "/vendedor/rutas", "Rutas"),
                ("pedidos", "/vendedor/pedidos", "Pedidos"),
                ("caja", "/vendedor/caja", "Caja"),
            ],
        };

        entries
            .iter()
            .map(|(key, path, label)| MenuItem {
                key: (*key).to_string(),
                path: (*path).to_string(),
                label: (*label).to_string(),
            })
            .collect()
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Single sidebar entry.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct MenuItem {
    pub key: String,
    pub path: String,
    pub label: String,
}

/// The backend returns the role either expanded or as its description.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum RolRef {
    Expanded(Rol),
    Name(String),
}

impl RolRef {
    pub fn descripcion(&self) -> &str {
        match self {
            RolRef::Expanded(rol) => &rol.descripcion,
            RolRef::Name(name) => name,
        }
    }
}

/// Employee record.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
pub struct Usuario {
    #[serde(deserialize_with = "string_or_number")]
    pub identificacion: String,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub rucempresarial: Option<String>,
    pub nombre: String,
    pub correo: String,
    #[serde(default)]
    pub celular: String,
    #[serde(default)]
    pub estado: String,
    #[serde(default)]
    pub fecha_actualizacion: Option<String>,
    pub id_rol: i32,
    #[serde(default)]
    pub rol: Option<RolRef>,
}

impl Usuario {
    /// Role description, preferring the embedded role over the id lookup.
    pub fn rol_descripcion<'a>(&'a self, roles: &'a [Rol]) -> Option<&'a str> {
        self.rol.as_ref().map(RolRef::descripcion).or_else(|| {
            roles
                .iter()
                .find(|r| r.id_rol == self.id_rol)
                .map(|r| r.descripcion.as_str())
        })
    }

    pub fn is_active(&self) -> bool {
        self.estado.eq_ignore_ascii_case("activo")
    }
}

/// Payload sent when creating or updating an employee.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct NewUsuario {
    pub identificacion: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rucempresarial: Option<String>,
    pub nombre: String,
    pub correo: String,
    pub celular: String,
    /// Omitted on edit when left blank so the stored password is kept.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contrasena: Option<String>,
    pub estado: String,
    pub id_rol: i32,
}

/// Body of `POST /login`.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct Credenciales {
    pub rucempresarial: String,
    pub correo: String,
    pub contrasena: String,
}

/// User block of the login response.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct UsuarioSesion {
    #[serde(deserialize_with = "string_or_number")]
    pub identificacion: String,
    pub nombre: String,
    pub correo: String,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub rucempresarial: Option<String>,
    #[serde(default)]
    pub estado: String,
    /// Role id.
    pub rol: i32,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
    pub user: UsuarioSesion,
}

/// Employees whose name contains `term` (case-insensitive) or whose
/// identificación contains it verbatim.
pub fn filter_usuarios<'a>(usuarios: &'a [Usuario], term: &str) -> Vec<&'a Usuario> {
    let term = term.trim();
    if term.is_empty() {
        return usuarios.iter().collect();
    }
    let lowered = term.to_lowercase();
    usuarios
        .iter()
        .filter(|u| u.nombre.to_lowercase().contains(&lowered) || u.identificacion.contains(term))
        .collect()
}

/// Roles whose description contains `term` or whose id equals it.
pub fn filter_roles<'a>(roles: &'a [Rol], term: &str) -> Vec<&'a Rol> {
    let term = term.trim();
    if term.is_empty() {
        return roles.iter().collect();
    }
    let lowered = term.to_lowercase();
    roles
        .iter()
        .filter(|r| {
            r.descripcion.to_lowercase().contains(&lowered) || r.id_rol.to_string() == term
        })
        .collect()
}
