use crate::domain::ruta::{NewRuta, Ruta};
use crate::repository::errors::RepositoryResult;
use crate::repository::{ApiRepository, RutaReader, RutaWriter};

impl RutaReader for ApiRepository {
    async fn list_rutas(&self) -> RepositoryResult<Vec<Ruta>> {
        self.get(&["rutas"]).await
    }

    async fn get_ruta(&self, id_ruta: i32) -> RepositoryResult<Option<Ruta>> {
        self.find(&["rutas", &id_ruta.to_string()]).await
    }

    async fn list_rutas_usuario(&self, identificacion: &str) -> RepositoryResult<Vec<Ruta>> {
        self.get(&["rutas", "usuario", identificacion]).await
    }
}

impl RutaWriter for ApiRepository {
    async fn create_ruta(&self, ruta: &NewRuta) -> RepositoryResult<Ruta> {
        self.post(&["rutas"], ruta).await
    }

    async fn update_ruta(&self, id_ruta: i32, ruta: &NewRuta) -> RepositoryResult<Ruta> {
        self.put(&["rutas", &id_ruta.to_string()], ruta).await
    }

    async fn delete_ruta(&self, id_ruta: i32) -> RepositoryResult<()> {
        self.delete(&["rutas", &id_ruta.to_string()]).await
    }
}
