use crate::domain::factura::Factura;
use crate::repository::errors::RepositoryResult;
use crate::repository::{ApiRepository, FacturaReader};

impl FacturaReader for ApiRepository {
    async fn list_facturas(&self) -> RepositoryResult<Vec<Factura>> {
        self.get(&["facturas"]).await
    }

    async fn get_factura(&self, id_factura: i32) -> RepositoryResult<Option<Factura>> {
        self.find(&["facturas", &id_factura.to_string()]).await
    }
}
