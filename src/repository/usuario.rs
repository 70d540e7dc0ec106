use crate::domain::usuario::{NewUsuario, Usuario};
use crate::repository::errors::RepositoryResult;
use crate::repository::{ApiRepository, UsuarioReader, UsuarioWriter};

impl UsuarioReader for ApiRepository {
    async fn list_usuarios(&self) -> RepositoryResult<Vec<Usuario>> {
        self.get(&["usuarios"]).await
    }

    async fn get_usuario(&self, identificacion: &str) -> RepositoryResult<Option<Usuario>> {
        self.find(&["usuarios", identificacion]).await
    }

    async fn list_usuarios_por_rol(&self, rol: &str) -> RepositoryResult<Vec<Usuario>> {
        self.get(&["usuarios", "rol", rol]).await
    }
}

impl UsuarioWriter for ApiRepository {
    async fn create_usuario(&self, usuario: &NewUsuario) -> RepositoryResult<Usuario> {
        self.post(&["usuarios"], usuario).await
    }

    async fn update_usuario(
        &self,
        identificacion: &str,
        usuario: &NewUsuario,
    ) -> RepositoryResult<Usuario> {
        self.put(&["usuarios", identificacion], usuario).await
    }

    async fn delete_usuario(&self, identificacion: &str) -> RepositoryResult<()> {
        self.delete(&["usuarios", identificacion]).await
    }
}
