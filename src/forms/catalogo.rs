use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::domain::producto::NewProducto;
use crate::domain::types::{clean_text, non_blank};
use crate::forms::{blank_as_none, finite, one_of};

fn estado_producto(value: &str) -> Result<(), ValidationError> {
    one_of(value, &["activo", "inactivo"], "El estado es requerido")
}

#[derive(Debug, Deserialize, Validate)]
/// Create/edit form of a product.
pub struct ProductoForm {
    #[validate(length(min = 1, message = "Ingrese el nombre del producto"))]
    pub nombre: String,
    #[validate(range(min = 1, message = "Seleccione la marca"))]
    pub id_marca: i32,
    #[validate(range(min = 1, message = "Seleccione la categoría"))]
    pub id_categoria: i32,
    #[validate(range(min = 0, message = "El stock no puede ser negativo"))]
    pub stock: i64,
    #[validate(
        range(min = 0.0, message = "El precio minorista no puede ser negativo"),
        custom(function = "finite")
    )]
    pub precio_minorista: f64,
    #[validate(
        range(min = 0.0, message = "El precio mayorista no puede ser negativo"),
        custom(function = "finite")
    )]
    pub precio_mayorista: f64,
    #[validate(
        range(min = 0.0, message = "El IVA no puede ser negativo"),
        custom(function = "finite")
    )]
    pub iva: f64,
    #[validate(custom(function = "estado_producto"))]
    pub estado: String,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub imagen: Option<String>,
}

impl From<ProductoForm> for NewProducto {
    fn from(form: ProductoForm) -> Self {
        NewProducto {
            nombre: clean_text(&form.nombre),
            id_marca: form.id_marca,
            stock: form.stock,
            precio_mayorista: form.precio_mayorista,
            precio_minorista: form.precio_minorista,
            id_categoria: form.id_categoria,
            iva: form.iva,
            estado: form.estado.trim().to_lowercase(),
            imagen: non_blank(form.imagen),
        }
    }
}
