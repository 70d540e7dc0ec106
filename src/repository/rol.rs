use crate::domain::usuario::{NewRol, Rol};
use crate::repository::errors::RepositoryResult;
use crate::repository::{ApiRepository, RolReader, RolWriter};

impl RolReader for ApiRepository {
    async fn list_roles(&self) -> RepositoryResult<Vec<Rol>> {
        self.get(&["roles"]).await
    }

    async fn get_rol(&self, id_rol: i32) -> RepositoryResult<Option<Rol>> {
        self.find(&["roles", &id_rol.to_string()]).await
    }
}

impl RolWriter for ApiRepository {
    async fn create_rol(&self, rol: &NewRol) -> RepositoryResult<Rol> {
        self.post(&["roles"], rol).await
    }

    async fn update_rol(&self, id_rol: i32, rol: &NewRol) -> RepositoryResult<Rol> {
        self.put(&["roles", &id_rol.to_string()], rol).await
    }

    async fn delete_rol(&self, id_rol: i32) -> RepositoryResult<()> {
        self.delete(&["roles", &id_rol.to_string()]).await
    }
}
