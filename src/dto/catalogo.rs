use serde::{Deserialize, Serialize};

use crate::domain::producto::{Categoria, FiltroCatalogo, Marca, Producto};
use crate::pagination::Paginated;

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
    pub page: Option<usize>,
}

impl SearchQuery {
    /// Trimmed search term, `None` when blank.
    pub fn term(&self) -> Option<String> {
        self.q
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }
}

#[derive(Debug, Serialize)]
pub struct InventarioPageData {
    pub productos: Paginated<Producto>,
    pub categorias: Vec<Categoria>,
    pub marcas: Vec<Marca>,
    pub stock_bajo: usize,
    pub search_query: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProductoFormData {
    pub producto: Option<Producto>,
    pub categorias: Vec<Categoria>,
    pub marcas: Vec<Marca>,
}

#[derive(Debug, Serialize)]
pub struct CatalogoPageData {
    pub productos: Vec<Producto>,
    pub categorias: Vec<Categoria>,
    pub marcas: Vec<Marca>,
    pub filtro: FiltroCatalogo,
}

/// Categories, brands and roles share one list layout.
#[derive(Debug, Serialize)]
pub struct DescripcionesPageData<T> {
    pub items: Vec<T>,
    pub search_query: Option<String>,
}
