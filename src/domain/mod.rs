//! Records mirrored from the Vendly backend and the pure logic over them.

pub mod cliente;
pub mod factura;
pub mod pedido;
pub mod principal;
pub mod producto;
pub mod ruta;
pub mod types;
pub mod ubicacion;
pub mod usuario;
