use crate::domain::ubicacion::{NewUbicacion, UbicacionCliente};
use crate::repository::errors::RepositoryResult;
use crate::repository::{ApiRepository, UbicacionReader, UbicacionWriter};

impl UbicacionReader for ApiRepository {
    async fn list_ubicaciones(&self) -> RepositoryResult<Vec<UbicacionCliente>> {
        self.get(&["ubicaciones_cliente"]).await
    }

    async fn get_ubicacion(&self, id_ubicacion: i32) -> RepositoryResult<Option<UbicacionCliente>> {
        self.find(&["ubicaciones_cliente", &id_ubicacion.to_string()])
            .await
    }

    async fn list_ubicaciones_cliente(
        &self,
        cod_cliente: &str,
    ) -> RepositoryResult<Vec<UbicacionCliente>> {
        self.get(&["ubicaciones_cliente", "cliente", cod_cliente])
            .await
    }
}

impl UbicacionWriter for ApiRepository {
    async fn create_ubicacion(
        &self,
        ubicacion: &NewUbicacion,
    ) -> RepositoryResult<UbicacionCliente> {
        self.post(&["ubicaciones_cliente"], ubicacion).await
    }

    async fn update_ubicacion(
        &self,
        id_ubicacion: i32,
        ubicacion: &NewUbicacion,
    ) -> RepositoryResult<UbicacionCliente> {
        self.put(&["ubicaciones_cliente", &id_ubicacion.to_string()], ubicacion)
            .await
    }

    async fn delete_ubicacion(&self, id_ubicacion: i32) -> RepositoryResult<()> {
        self.delete(&["ubicaciones_cliente", &id_ubicacion.to_string()])
            .await
    }

    async fn set_ubicacion_principal(
        &self,
        cod_cliente: &str,
        id_ubicacion: i32,
    ) -> RepositoryResult<()> {
        self.put_empty(&[
            "ubicaciones_cliente",
            "cliente",
            cod_cliente,
            "principal",
            &id_ubicacion.to_string(),
        ])
        .await
    }
}
