use crate::domain::producto::{
    Categoria, FiltroCatalogo, Marca, NewDescripcion, NewProducto, Producto, catalogo,
    filter_descripcion, filtrar_productos, stock_bajo,
};
use crate::domain::usuario::Role;
use crate::dto::catalogo::{
    CatalogoPageData, DescripcionesPageData, InventarioPageData, ProductoFormData, SearchQuery,
};
use crate::forms::DescripcionForm;
use crate::forms::catalogo::ProductoForm;
use crate::models::auth::AuthenticatedUser;
use crate::pagination::{DEFAULT_ITEMS_PER_PAGE, Paginated};
use crate::repository::{
    CategoriaReader, CategoriaWriter, MarcaReader, MarcaWriter, ProductoReader, ProductoWriter,
};
use crate::services::{ServiceError, ServiceResult, check_role, validate_form};

const PRODUCT_READERS: &[Role] = &[Role::Admin, Role::Bodeguero, Role::Vendedor];
const WAREHOUSE: &[Role] = &[Role::Admin, Role::Bodeguero];

/// Inventory table: every product, searchable and paginated.
pub async fn list_inventario<R>(
    repo: &R,
    user: &AuthenticatedUser,
    query: SearchQuery,
) -> ServiceResult<InventarioPageData>
where
    R: ProductoReader + CategoriaReader + MarcaReader,
{
    check_role(user, PRODUCT_READERS)?;

    let (productos, categorias, marcas) = futures::try_join!(
        repo.list_productos(),
        repo.list_categorias(),
        repo.list_marcas(),
    )
    .map_err(|err| {
        log::error!("Failed to load inventory: {err}");
        err
    })?;

    let search_query = query.term();
    let visibles: Vec<Producto> =
        filtrar_productos(&productos, search_query.as_deref().unwrap_or_default())
            .into_iter()
            .cloned()
            .collect();

    Ok(InventarioPageData {
        stock_bajo: stock_bajo(&productos),
        productos: Paginated::from_all(
            visibles,
            query.page.unwrap_or(1),
            DEFAULT_ITEMS_PER_PAGE,
        ),
        categorias,
        marcas,
        search_query,
    })
}

pub async fn load_producto_form<R>(
    repo: &R,
    user: &AuthenticatedUser,
    id_producto: Option<i32>,
) -> ServiceResult<ProductoFormData>
where
    R: ProductoReader + CategoriaReader + MarcaReader,
{
    check_role(user, WAREHOUSE)?;

    let (categorias, marcas) = futures::try_join!(repo.list_categorias(), repo.list_marcas())?;
    let producto = match id_producto {
        Some(id) => Some(repo.get_producto(id).await?.ok_or(ServiceError::NotFound)?),
        None => None,
    };

    Ok(ProductoFormData {
        producto,
        categorias,
        marcas,
    })
}

pub async fn create_producto<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: ProductoForm,
) -> ServiceResult<Producto>
where
    R: ProductoWriter,
{
    check_role(user, WAREHOUSE)?;
    validate_form(&form)?;

    let producto = NewProducto::from(form);
    let created = repo.create_producto(&producto).await.map_err(|err| {
        log::error!("Failed to create product {}: {err}", producto.nombre);
        err
    })?;
    Ok(created)
}

pub async fn update_producto<R>(
    repo: &R,
    user: &AuthenticatedUser,
    id_producto: i32,
    form: ProductoForm,
) -> ServiceResult<Producto>
where
    R: ProductoWriter,
{
    check_role(user, WAREHOUSE)?;
    validate_form(&form)?;

    let producto = NewProducto::from(form);
    let updated = repo
        .update_producto(id_producto, &producto)
        .await
        .map_err(|err| {
            log::error!("Failed to update product {id_producto}: {err}");
            err
        })?;
    Ok(updated)
}

pub async fn delete_producto<R>(
    repo: &R,
    user: &AuthenticatedUser,
    id_producto: i32,
) -> ServiceResult<()>
where
    R: ProductoWriter,
{
    check_role(user, WAREHOUSE)?;

    repo.delete_producto(id_producto).await.map_err(|err| {
        log::error!("Failed to delete product {id_producto}: {err}");
        err
    })?;
    Ok(())
}

/// Active products narrowed by category, brand and retail price.
pub async fn load_catalogo<R>(
    repo: &R,
    user: &AuthenticatedUser,
    filtro: FiltroCatalogo,
) -> ServiceResult<CatalogoPageData>
where
    R: ProductoReader + CategoriaReader + MarcaReader,
{
    check_role(user, PRODUCT_READERS)?;

    let (productos, categorias, marcas) = futures::try_join!(
        repo.list_productos(),
        repo.list_categorias(),
        repo.list_marcas(),
    )?;

    Ok(CatalogoPageData {
        productos: catalogo(&productos, &filtro).into_iter().cloned().collect(),
        categorias,
        marcas,
        filtro,
    })
}

/// PDF export of the catalog as produced by the backend.
pub async fn catalogo_pdf<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<Vec<u8>>
where
    R: ProductoReader,
{
    check_role(user, PRODUCT_READERS)?;

    let pdf = repo.catalogo_pdf().await.map_err(|err| {
        log::error!("Failed to export catalog PDF: {err}");
        err
    })?;
    Ok(pdf)
}

fn descripcion_payload(form: &DescripcionForm) -> ServiceResult<NewDescripcion> {
    validate_form(form)?;
    Ok(NewDescripcion {
        descripcion: form.descripcion(),
    })
}

pub async fn list_categorias<R>(
    repo: &R,
    user: &AuthenticatedUser,
    query: SearchQuery,
) -> ServiceResult<DescripcionesPageData<Categoria>>
where
    R: CategoriaReader,
{
    check_role(user, WAREHOUSE)?;

    let categorias = repo.list_categorias().await?;
    let search_query = query.term();
    let items = filter_descripcion(
        &categorias,
        search_query.as_deref().unwrap_or_default(),
        |c: &Categoria| c.descripcion.as_str(),
    )
    .into_iter()
    .cloned()
    .collect();

    Ok(DescripcionesPageData {
        items,
        search_query,
    })
}

pub async fn create_categoria<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: DescripcionForm,
) -> ServiceResult<Categoria>
where
    R: CategoriaWriter,
{
    check_role(user, WAREHOUSE)?;
    let payload = descripcion_payload(&form)?;

    let created = repo.create_categoria(&payload).await.map_err(|err| {
        log::error!("Failed to create category: {err}");
        err
    })?;
    Ok(created)
}

pub async fn update_categoria<R>(
    repo: &R,
    user: &AuthenticatedUser,
    id_categoria: i32,
    form: DescripcionForm,
) -> ServiceResult<Categoria>
where
    R: CategoriaWriter,
{
    check_role(user, WAREHOUSE)?;
    let payload = descripcion_payload(&form)?;

    let updated = repo
        .update_categoria(id_categoria, &payload)
        .await
        .map_err(|err| {
            log::error!("Failed to update category {id_categoria}: {err}");
            err
        })?;
    Ok(updated)
}

pub async fn delete_categoria<R>(
    repo: &R,
    user: &AuthenticatedUser,
    id_categoria: i32,
) -> ServiceResult<()>
where
    R: CategoriaWriter,
{
    check_role(user, WAREHOUSE)?;

    repo.delete_categoria(id_categoria).await.map_err(|err| {
        log::error!("Failed to delete category {id_categoria}: {err}");
        err
    })?;
    Ok(())
}

pub async fn list_marcas<R>(
    repo: &R,
    user: &AuthenticatedUser,
    query: SearchQuery,
) -> ServiceResult<DescripcionesPageData<Marca>>
where
    R: MarcaReader,
{
    check_role(user, WAREHOUSE)?;

    let marcas = repo.list_marcas().await?;
    let search_query = query.term();
    let items = filter_descripcion(
        &marcas,
        search_query.as_deref().unwrap_or_default(),
        |m: &Marca| m.descripcion.as_str(),
    )
    .into_iter()
    .cloned()
    .collect();

    Ok(DescripcionesPageData {
        items,
        search_query,
    })
}

pub async fn create_marca<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: DescripcionForm,
) -> ServiceResult<Marca>
where
    R: MarcaWriter,
{
    check_role(user, WAREHOUSE)?;
    let payload = descripcion_payload(&form)?;

    let created = repo.create_marca(&payload).await.map_err(|err| {
        log::error!("Failed to create brand: {err}");
        err
    })?;
    Ok(created)
}

pub async fn update_marca<R>(
    repo: &R,
    user: &AuthenticatedUser,
    id_marca: i32,
    form: DescripcionForm,
) -> ServiceResult<Marca>
where
    R: MarcaWriter,
{
    check_role(user, WAREHOUSE)?;
    let payload = descripcion_payload(&form)?;

    let updated = repo.update_marca(id_marca, &payload).await.map_err(|err| {
        log::error!("Failed to update brand {id_marca}: {err}");
        err
    })?;
    Ok(updated)
}

pub async fn delete_marca<R>(
    repo: &R,
    user: &AuthenticatedUser,
    id_marca: i32,
) -> ServiceResult<()>
where
    R: MarcaWriter,
{
    check_role(user, WAREHOUSE)?;

    repo.delete_marca(id_marca).await.map_err(|err| {
        log::error!("Failed to delete brand {id_marca}: {err}");
        err
    })?;
    Ok(())
}
