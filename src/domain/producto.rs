use serde::{Deserialize, Serialize};

use crate::domain::types::string_or_number;

/// Product category.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Categoria {
    pub id_categoria: i32,
    pub descripcion: String,
}

/// Product brand.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Marca {
    pub id_marca: i32,
    pub descripcion: String,
}

/// Payload shared by categories and brands.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct NewDescripcion {
    pub descripcion: String,
}

/// Catalog product.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
pub struct Producto {
    pub id_producto: i32,
    pub nombre: String,
    pub id_marca: i32,
    #[serde(deserialize_with = "string_or_number")]
    pub stock: String,
    pub precio_mayorista: f64,
    pub precio_minorista: f64,
    pub id_categoria: i32,
    #[serde(default)]
    pub iva: f64,
    #[serde(default)]
    pub estado: String,
    #[serde(default)]
    pub imagen: Option<String>,
    #[serde(default)]
    pub marca: Option<Marca>,
    #[serde(default)]
    pub categoria: Option<Categoria>,
}

impl Producto {
    pub fn is_active(&self) -> bool {
        self.estado.eq_ignore_ascii_case("activo")
    }

    /// Stock as a number; unparsable stock counts as zero.
    pub fn stock_unidades(&self) -> i64 {
        self.stock.trim().parse::<f64>().map(|v| v as i64).unwrap_or(0)
    }

    /// Unit price for a client: wholesale for companies, retail otherwise.
    pub fn precio_para(&self, juridico: bool) -> f64 {
        if juridico {
            self.precio_mayorista
        } else {
            self.precio_minorista
        }
    }

    pub fn marca_descripcion(&self) -> &str {
        self.marca.as_ref().map_or("", |m| m.descripcion.as_str())
    }

    pub fn categoria_descripcion(&self) -> &str {
        self.categoria
            .as_ref()
            .map_or("", |c| c.descripcion.as_str())
    }
}

/// Payload for creating or updating a product.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct NewProducto {
    pub nombre: String,
    pub id_marca: i32,
    pub stock: i64,
    pub precio_mayorista: f64,
    pub precio_minorista: f64,
    pub id_categoria: i32,
    pub iva: f64,
    pub estado: String,
    pub imagen: Option<String>,
}

/// Products below this stock are flagged on the dashboards.
pub const STOCK_BAJO: i64 = 10;

/// Inventory search: text fields match the lowercased term, prices and stock
/// match it verbatim.
pub fn filtrar_productos<'a>(productos: &'a [Producto], term: &str) -> Vec<&'a Producto> {
    let term = term.trim();
    if term.is_empty() {
        return productos.iter().collect();
    }
    let lowered = term.to_lowercase();
    productos
        .iter()
        .filter(|p| {
            p.nombre.to_lowercase().contains(&lowered)
                || p.marca_descripcion().to_lowercase().contains(&lowered)
                || p.categoria_descripcion().to_lowercase().contains(&lowered)
                || p.estado.to_lowercase().contains(&lowered)
                || p.precio_minorista.to_string().contains(term)
                || p.precio_mayorista.to_string().contains(term)
                || p.stock.contains(term)
        })
        .collect()
}

/// Catalog filter criteria. Blank criteria are ignored.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct FiltroCatalogo {
    pub id_categoria: Option<i32>,
    pub id_marca: Option<i32>,
    pub precio_min: Option<f64>,
    pub precio_max: Option<f64>,
}

impl FiltroCatalogo {
    fn admite(&self, producto: &Producto) -> bool {
        if self.id_categoria.is_some_and(|id| id != producto.id_categoria) {
            return false;
        }
        if self.id_marca.is_some_and(|id| id != producto.id_marca) {
            return false;
        }
        if self
            .precio_min
            .is_some_and(|min| producto.precio_minorista < min)
        {
            return false;
        }
        if self
            .precio_max
            .is_some_and(|max| producto.precio_minorista > max)
        {
            return false;
        }
        true
    }
}

/// Active products matching the catalog filter.
pub fn catalogo<'a>(productos: &'a [Producto], filtro: &FiltroCatalogo) -> Vec<&'a Producto> {
    productos
        .iter()
        .filter(|p| p.is_active() && filtro.admite(p))
        .collect()
}

/// Products whose stock is below [`STOCK_BAJO`].
pub fn stock_bajo(productos: &[Producto]) -> usize {
    productos
        .iter()
        .filter(|p| p.stock_unidades() < STOCK_BAJO)
        .count()
}

/// Case-insensitive search on descripción, shared by categories and brands.
pub fn filter_descripcion<'a, T, F>(items: &'a [T], term: &str, descripcion: F) -> Vec<&'a T>
where
    F: Fn(&T) -> &str,
{
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return items.iter().collect();
    }
    items
        .iter()
        .filter(|item| descripcion(item).to_lowercase().contains(&term))
        .collect()
}
