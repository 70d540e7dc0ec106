use serde::Deserialize;

use crate::domain::cliente::{Cliente, NewCliente, UpdatePrincipal};
use crate::domain::ubicacion::UbicacionCliente;
use crate::repository::errors::RepositoryResult;
use crate::repository::{ApiRepository, ClienteReader, ClienteWriter};

/// Row of `GET /clientes/con-ubicaciones`.
#[derive(Deserialize)]
struct ClienteAnidado {
    #[serde(flatten)]
    cliente: Cliente,
    #[serde(default)]
    ubicaciones: Vec<UbicacionCliente>,
}

impl From<ClienteAnidado> for (Cliente, Vec<UbicacionCliente>) {
    fn from(row: ClienteAnidado) -> Self {
        let ClienteAnidado {
            cliente,
            mut ubicaciones,
        } = row;
        for ubicacion in &mut ubicaciones {
            if ubicacion.cod_cliente.is_empty() {
                ubicacion.cod_cliente = cliente.cod_cliente.clone();
            }
        }
        (cliente, ubicaciones)
    }
}

impl ClienteReader for ApiRepository {
    async fn list_clientes(&self) -> RepositoryResult<Vec<Cliente>> {
        self.get(&["clientes"]).await
    }

    async fn get_cliente(&self, cod_cliente: &str) -> RepositoryResult<Option<Cliente>> {
        self.find(&["clientes", cod_cliente]).await
    }

    async fn list_clientes_con_ubicaciones(
        &self,
    ) -> RepositoryResult<Vec<(Cliente, Vec<UbicacionCliente>)>> {
        let rows: Vec<ClienteAnidado> = self.get(&["clientes", "con-ubicaciones"]).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}

impl ClienteWriter for ApiRepository {
    async fn create_cliente(&self, cliente: &NewCliente) -> RepositoryResult<Cliente> {
        self.post(&["clientes"], cliente).await
    }

    async fn update_cliente(
        &self,
        cod_cliente: &str,
        cliente: &NewCliente,
    ) -> RepositoryResult<Cliente> {
        self.put(&["clientes", cod_cliente], cliente).await
    }

    async fn update_principal(
        &self,
        cod_cliente: &str,
        update: &UpdatePrincipal,
    ) -> RepositoryResult<Cliente> {
        self.put(&["clientes", cod_cliente], update).await
    }

    async fn delete_cliente(&self, cod_cliente: &str) -> RepositoryResult<()> {
        self.delete(&["clientes", cod_cliente]).await
    }
}
