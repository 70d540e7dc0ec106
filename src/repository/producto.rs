use crate::domain::producto::{Categoria, Marca, NewDescripcion, NewProducto, Producto};
use crate::repository::errors::RepositoryResult;
use crate::repository::{
    ApiRepository, CategoriaReader, CategoriaWriter, MarcaReader, MarcaWriter, ProductoReader,
    ProductoWriter,
};

impl ProductoReader for ApiRepository {
    async fn list_productos(&self) -> RepositoryResult<Vec<Producto>> {
        self.get(&["productos"]).await
    }

    async fn get_producto(&self, id_producto: i32) -> RepositoryResult<Option<Producto>> {
        self.find(&["productos", &id_producto.to_string()]).await
    }

    async fn catalogo_pdf(&self) -> RepositoryResult<Vec<u8>> {
        self.get_bytes(&["catalogo", "export", "pdf"]).await
    }
}

impl ProductoWriter for ApiRepository {
    async fn create_producto(&self, producto: &NewProducto) -> RepositoryResult<Producto> {
        self.post(&["productos"], producto).await
    }

    async fn update_producto(
        &self,
        id_producto: i32,
        producto: &NewProducto,
    ) -> RepositoryResult<Producto> {
        self.put(&["productos", &id_producto.to_string()], producto)
            .await
    }

    async fn delete_producto(&self, id_producto: i32) -> RepositoryResult<()> {
        self.delete(&["productos", &id_producto.to_string()]).await
    }
}

impl CategoriaReader for ApiRepository {
    async fn list_categorias(&self) -> RepositoryResult<Vec<Categoria>> {
        self.get(&["categorias"]).await
    }

    async fn get_categoria(&self, id_categoria: i32) -> RepositoryResult<Option<Categoria>> {
        self.find(&["categorias", &id_categoria.to_string()]).await
    }
}

impl CategoriaWriter for ApiRepository {
    async fn create_categoria(&self, categoria: &NewDescripcion) -> RepositoryResult<Categoria> {
        self.post(&["categorias"], categoria).await
    }

    async fn update_categoria(
        &self,
        id_categoria: i32,
        categoria: &NewDescripcion,
    ) -> RepositoryResult<Categoria> {
        self.put(&["categorias", &id_categoria.to_string()], categoria)
            .await
    }

    async fn delete_categoria(&self, id_categoria: i32) -> RepositoryResult<()> {
        self.delete(&["categorias", &id_categoria.to_string()])
            .await
    }
}

impl MarcaReader for ApiRepository {
    async fn list_marcas(&self) -> RepositoryResult<Vec<Marca>> {
        self.get(&["marcas"]).await
    }

    async fn get_marca(&self, id_marca: i32) -> RepositoryResult<Option<Marca>> {
        self.find(&["marcas", &id_marca.to_string()]).await
    }
}

impl MarcaWriter for ApiRepository {
    async fn create_marca(&self, marca: &NewDescripcion) -> RepositoryResult<Marca> {
        self.post(&["marcas"], marca).await
    }

    async fn update_marca(&self, id_marca: i32, marca: &NewDescripcion) -> RepositoryResult<Marca> {
        self.put(&["marcas", &id_marca.to_string()], marca).await
    }

    async fn delete_marca(&self, id_marca: i32) -> RepositoryResult<()> {
        self.delete(&["marcas", &id_marca.to_string()]).await
    }
}
