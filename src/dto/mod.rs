//! DTO modules that bridge services with templates.

pub mod catalogo;
pub mod clientes;
pub mod home;
pub mod pedidos;
pub mod rutas;
pub mod ubicaciones;
pub mod usuarios;
