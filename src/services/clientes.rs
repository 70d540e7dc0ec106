use crate::domain::cliente::{
    Cliente, NewCliente, UpdatePrincipal, estadisticas_clientes, filter_clientes,
    filter_por_sector, sectores,
};
use crate::domain::principal::{
    ClienteConUbicaciones, ResultadoReparacion, planificar, verificar_integridad,
};
use crate::domain::ubicacion::UbicacionCliente;
use crate::domain::usuario::Role;
use crate::dto::clientes::{ClienteDetalle, ClientesDashboard, ClientesPageData, ClientesQuery};
use crate::forms::clientes::ClienteForm;
use crate::models::auth::AuthenticatedUser;
use crate::pagination::{DEFAULT_ITEMS_PER_PAGE, Paginated};
use crate::repository::errors::RepositoryError;
use crate::repository::{ClienteReader, ClienteWriter, UbicacionReader, UbicacionWriter};
use crate::services::ubicaciones::validar_principal;
use crate::services::{ServiceError, ServiceResult, check_role, validate_form};

const READERS: &[Role] = &[
    Role::Admin,
    Role::Vendedor,
    Role::Facturador,
    Role::Transportista,
];
const WRITERS: &[Role] = &[Role::Admin, Role::Vendedor, Role::Facturador];

const PRINCIPAL_INEXISTENTE: &str = "La ubicación principal especificada no existe";
const PRINCIPAL_AJENA: &str = "La ubicación principal debe pertenecer al cliente";

fn normalize(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Clients matching the query, each with its locations.
async fn matching_clientes<R>(
    repo: &R,
    query: &ClientesQuery,
) -> ServiceResult<(Vec<ClienteConUbicaciones>, Vec<String>)>
where
    R: ClienteReader,
{
    let rows = repo.list_clientes_con_ubicaciones().await.map_err(|err| {
        log::error!("Failed to list clients: {err}");
        err
    })?;

    let clientes: Vec<Cliente> = rows.iter().map(|(c, _)| c.clone()).collect();
    let all_sectores = sectores(&clientes);

    let term = query.q.as_deref().unwrap_or_default();
    let visibles = filter_clientes(&clientes, term);
    let visibles = filter_por_sector(&visibles, query.sector.as_deref().unwrap_or_default());
    let codigos: Vec<&str> = visibles.iter().map(|c| c.cod_cliente.as_str()).collect();

    let items = rows
        .into_iter()
        .filter(|(c, _)| codigos.contains(&c.cod_cliente.as_str()))
        .map(|(c, ubicaciones)| ClienteConUbicaciones::new(c, ubicaciones))
        .collect();

    Ok((items, all_sectores))
}

/// Loads the clients list with search and sector filters.
pub async fn list_clientes<R>(
    repo: &R,
    user: &AuthenticatedUser,
    query: ClientesQuery,
) -> ServiceResult<ClientesPageData>
where
    R: ClienteReader,
{
    check_role(user, READERS)?;

    let query = ClientesQuery {
        q: normalize(query.q),
        sector: normalize(query.sector),
        page: query.page,
    };
    let (items, sectores) = matching_clientes(repo, &query).await?;

    Ok(ClientesPageData {
        clientes: Paginated::from_all(items, query.page.unwrap_or(1), DEFAULT_ITEMS_PER_PAGE),
        sectores,
        search_query: query.q,
        sector: query.sector,
    })
}

/// CSV export of the filtered list.
pub async fn export_clientes<R>(
    repo: &R,
    user: &AuthenticatedUser,
    query: ClientesQuery,
) -> ServiceResult<Vec<u8>>
where
    R: ClienteReader,
{
    check_role(user, READERS)?;

    let (items, _) = matching_clientes(repo, &query).await?;

    let to_form_error = |err: csv::Error| {
        log::error!("Failed to write clients CSV: {err}");
        ServiceError::Form("No se pudo generar el archivo CSV".to_string())
    };

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record([
            "cod_cliente",
            "identificacion",
            "nombre",
            "razon_social",
            "tipo_cliente",
            "correo",
            "celular",
            "direccion",
            "sector",
            "ubicaciones",
            "ubicacion_principal",
        ])
        .map_err(to_form_error)?;

    for item in &items {
        let c = &item.cliente;
        let principal = item
            .ubicacion_principal_info
            .as_ref()
            .map(|u| u.direccion.clone())
            .unwrap_or_default();
        let total = item.ubicaciones.len().to_string();
        writer
            .write_record([
                c.cod_cliente.as_str(),
                c.identificacion.as_str(),
                c.nombre.as_str(),
                c.razon_social.as_str(),
                c.tipo_cliente.as_str(),
                c.correo.as_str(),
                c.celular.as_str(),
                c.direccion.as_str(),
                c.sector.as_str(),
                total.as_str(),
                principal.as_str(),
            ])
            .map_err(to_form_error)?;
    }

    writer.into_inner().map_err(|err| {
        log::error!("Failed to flush clients CSV: {err}");
        ServiceError::Form("No se pudo generar el archivo CSV".to_string())
    })
}

/// One client with its locations marked.
pub async fn load_cliente<R>(
    repo: &R,
    user: &AuthenticatedUser,
    cod_cliente: &str,
) -> ServiceResult<ClienteDetalle>
where
    R: ClienteReader + UbicacionReader,
{
    check_role(user, READERS)?;

    let (cliente, ubicaciones) = futures::try_join!(
        repo.get_cliente(cod_cliente),
        repo.list_ubicaciones_cliente(cod_cliente),
    )?;
    let cliente = cliente.ok_or(ServiceError::NotFound)?;

    let cliente = ClienteConUbicaciones::new(cliente, ubicaciones);
    Ok(ClienteDetalle {
        sugerir_principal: cliente.sugerir_principal(),
        cliente,
    })
}

/// Checks that `id_ubicacion` exists and belongs to `cod_cliente`.
async fn check_principal<R>(repo: &R, cod_cliente: &str, id_ubicacion: i32) -> ServiceResult<()>
where
    R: UbicacionReader,
{
    match repo.get_ubicacion(id_ubicacion).await? {
        None => Err(ServiceError::Form(PRINCIPAL_INEXISTENTE.to_string())),
        Some(ubicacion) if ubicacion.cod_cliente != cod_cliente => {
            Err(ServiceError::Form(PRINCIPAL_AJENA.to_string()))
        }
        Some(_) => Ok(()),
    }
}

pub async fn create_cliente<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: ClienteForm,
) -> ServiceResult<Cliente>
where
    R: ClienteWriter + UbicacionReader,
{
    check_role(user, WRITERS)?;
    validate_form(&form)?;

    let cliente = NewCliente::from(form);
    if let Some(id) = cliente.id_ubicacion_principal {
        check_principal(repo, &cliente.cod_cliente, id).await?;
    }

    let created = repo.create_cliente(&cliente).await.map_err(|err| {
        log::error!("Failed to create client {}: {err}", cliente.cod_cliente);
        err
    })?;
    Ok(created)
}

pub async fn update_cliente<R>(
    repo: &R,
    user: &AuthenticatedUser,
    cod_cliente: &str,
    form: ClienteForm,
) -> ServiceResult<Cliente>
where
    R: ClienteWriter + UbicacionReader,
{
    check_role(user, WRITERS)?;
    validate_form(&form)?;

    let cliente = NewCliente::from(form);
    if let Some(id) = cliente.id_ubicacion_principal {
        check_principal(repo, cod_cliente, id).await?;
    }

    let updated = repo
        .update_cliente(cod_cliente, &cliente)
        .await
        .map_err(|err| {
            log::error!("Failed to update client {cod_cliente}: {err}");
            err
        })?;
    Ok(updated)
}

/// Deletes a client that has no locations left.
pub async fn delete_cliente<R>(
    repo: &R,
    user: &AuthenticatedUser,
    cod_cliente: &str,
) -> ServiceResult<()>
where
    R: ClienteWriter + UbicacionReader,
{
    check_role(user, &[Role::Admin])?;

    let ubicaciones = repo.list_ubicaciones_cliente(cod_cliente).await?;
    if !ubicaciones.is_empty() {
        return Err(ServiceError::Form(format!(
            "No se puede eliminar el cliente. Tiene {} ubicación(es) asociada(s). Elimine primero las ubicaciones.",
            ubicaciones.len()
        )));
    }

    repo.delete_cliente(cod_cliente).await.map_err(|err| {
        log::error!("Failed to delete client {cod_cliente}: {err}");
        err
    })?;
    Ok(())
}

/// Makes `id_ubicacion` the client's principal location.
///
/// Uses the dedicated endpoint and falls back to a partial client update
/// when the backend does not expose it.
pub async fn set_principal<R>(
    repo: &R,
    user: &AuthenticatedUser,
    cod_cliente: &str,
    id_ubicacion: i32,
) -> ServiceResult<()>
where
    R: ClienteWriter + UbicacionReader + UbicacionWriter,
{
    check_role(user, WRITERS)?;

    if !validar_principal(repo, cod_cliente, id_ubicacion).await? {
        return Err(ServiceError::Form(PRINCIPAL_AJENA.to_string()));
    }

    match repo.set_ubicacion_principal(cod_cliente, id_ubicacion).await {
        Ok(()) => Ok(()),
        Err(RepositoryError::NotFound) => {
            log::info!("Principal endpoint missing, updating client {cod_cliente} instead");
            repo.update_principal(
                cod_cliente,
                &UpdatePrincipal {
                    id_ubicacion_principal: Some(id_ubicacion),
                },
            )
            .await?;
            Ok(())
        }
        Err(err) => {
            log::error!("Failed to set principal of {cod_cliente}: {err}");
            Err(err.into())
        }
    }
}

/// Statistics plus the integrity report of clients and locations.
pub async fn load_dashboard<R>(
    repo: &R,
    user: &AuthenticatedUser,
) -> ServiceResult<ClientesDashboard>
where
    R: ClienteReader + UbicacionReader,
{
    check_role(user, &[Role::Admin])?;

    let (rows, clientes, ubicaciones) = futures::try_join!(
        repo.list_clientes_con_ubicaciones(),
        repo.list_clientes(),
        repo.list_ubicaciones(),
    )?;

    let estadisticas = estadisticas_clientes(rows.iter().map(|(c, u)| (c, u.len())));
    let integridad = verificar_integridad(&clientes, &ubicaciones);
    if integridad.tiene_problemas() {
        log::warn!("{}", integridad.resumen);
    }

    Ok(ClientesDashboard {
        estadisticas,
        integridad,
    })
}

/// Fixes missing or dangling principal references, one client at a time.
pub async fn repair_principales<R>(
    repo: &R,
    user: &AuthenticatedUser,
) -> ServiceResult<ResultadoReparacion>
where
    R: ClienteReader + ClienteWriter,
{
    check_role(user, &[Role::Admin])?;

    let rows: Vec<(Cliente, Vec<UbicacionCliente>)> = repo.list_clientes_con_ubicaciones().await?;
    let mut resultado = ResultadoReparacion::default();

    for (cliente, ubicaciones) in rows {
        let cliente = ClienteConUbicaciones::new(cliente, ubicaciones);
        let Some(reparacion) = planificar(&cliente) else {
            continue;
        };
        let cod = &cliente.cliente.cod_cliente;
        let update = UpdatePrincipal {
            id_ubicacion_principal: reparacion.nuevo_principal(),
        };
        match repo.update_principal(cod, &update).await {
            Ok(_) => resultado.registrar_exito(cod, &reparacion),
            Err(RepositoryError::Unauthorized) => return Err(ServiceError::SessionExpired),
            Err(err) => {
                log::error!("Failed to repair client {cod}: {err}");
                resultado.registrar_error(cod, err);
            }
        }
    }

    log::info!(
        "Principal repair: {} fixed, {} failed",
        resultado.reparados,
        resultado.errores.len()
    );
    Ok(resultado)
}
