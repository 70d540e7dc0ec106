use crate::domain::pedido::{EstadoPedido, NewEstadoPedido, NewPedido, Pedido, UpdatePedido};
use crate::repository::errors::RepositoryResult;
use crate::repository::{ApiRepository, PedidoReader, PedidoWriter};

impl PedidoReader for ApiRepository {
    async fn list_pedidos(&self) -> RepositoryResult<Vec<Pedido>> {
        self.get(&["pedidos"]).await
    }

    async fn get_pedido(&self, id_pedido: i32) -> RepositoryResult<Option<Pedido>> {
        self.find(&["pedidos", &id_pedido.to_string()]).await
    }

    async fn list_estados_pedido(&self) -> RepositoryResult<Vec<EstadoPedido>> {
        self.get(&["estados_pedido"]).await
    }
}

impl PedidoWriter for ApiRepository {
    async fn create_pedido(&self, pedido: &NewPedido) -> RepositoryResult<Pedido> {
        self.post(&["pedidos"], pedido).await
    }

    async fn update_pedido(&self, id_pedido: i32, pedido: &UpdatePedido) -> RepositoryResult<Pedido> {
        self.put(&["pedidos", &id_pedido.to_string()], pedido).await
    }

    async fn delete_pedido(&self, id_pedido: i32) -> RepositoryResult<()> {
        self.delete(&["pedidos", &id_pedido.to_string()]).await
    }

    async fn create_estado_pedido(
        &self,
        estado: &NewEstadoPedido,
    ) -> RepositoryResult<EstadoPedido> {
        self.post(&["estados_pedido"], estado).await
    }
}
