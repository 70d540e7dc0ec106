use crate::domain::factura::{Factura, filtrar_facturas};
use crate::domain::usuario::Role;
use crate::dto::catalogo::SearchQuery;
use crate::dto::pedidos::FacturasPageData;
use crate::models::auth::AuthenticatedUser;
use crate::pagination::{DEFAULT_ITEMS_PER_PAGE, Paginated};
use crate::repository::FacturaReader;
use crate::services::{ServiceError, ServiceResult, check_role};

const READERS: &[Role] = &[Role::Admin, Role::Facturador];

/// Invoices list searchable by número or client.
pub async fn list_facturas<R>(
    repo: &R,
    user: &AuthenticatedUser,
    query: SearchQuery,
) -> ServiceResult<FacturasPageData>
where
    R: FacturaReader,
{
    check_role(user, READERS)?;

    let facturas = repo.list_facturas().await.map_err(|err| {
        log::error!("Failed to list invoices: {err}");
        err
    })?;

    let search_query = query.term();
    let visibles: Vec<Factura> =
        filtrar_facturas(&facturas, search_query.as_deref().unwrap_or_default())
            .into_iter()
            .cloned()
            .collect();

    Ok(FacturasPageData {
        facturas: Paginated::from_all(visibles, query.page.unwrap_or(1), DEFAULT_ITEMS_PER_PAGE),
        search_query,
    })
}

pub async fn load_factura<R>(
    repo: &R,
    user: &AuthenticatedUser,
    id_factura: i32,
) -> ServiceResult<Factura>
where
    R: FacturaReader,
{
    check_role(user, READERS)?;

    repo.get_factura(id_factura)
        .await
        .map_err(|err| {
            log::error!("Failed to load invoice {id_factura}: {err}");
            err
        })?
        .ok_or(ServiceError::NotFound)
}
