use serde::Serialize;

/// One dashboard tile.
#[derive(Debug, Serialize, PartialEq)]
pub struct Contador {
    pub etiqueta: &'static str,
    pub valor: usize,
    /// Page the tile links to.
    pub enlace: String,
}

#[derive(Debug, Serialize)]
pub struct HomePageData {
    pub contadores: Vec<Contador>,
}
