use crate::domain::cliente::Cliente;
use crate::domain::principal::{resumen_por_cliente, verificar_principales};
use crate::domain::ubicacion::{
    NewUbicacion, UbicacionCliente, buscar, estadisticas_ubicaciones, por_cliente, por_sector,
    sectores,
};
use crate::domain::usuario::Role;
use crate::dto::ubicaciones::{
    UbicacionFormData, UbicacionesPageData, UbicacionesQuery, UbicacionesResumen,
};
use crate::forms::ubicaciones::UbicacionForm;
use crate::models::auth::AuthenticatedUser;
use crate::repository::{ClienteReader, UbicacionReader, UbicacionWriter};
use crate::services::{ServiceError, ServiceResult, check_role, validate_form};

const MANAGERS: &[Role] = &[Role::Admin];

fn normalize(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Locations list with text, sector and owner filters plus the statistics of
/// the whole set.
pub async fn list_ubicaciones<R>(
    repo: &R,
    user: &AuthenticatedUser,
    query: UbicacionesQuery,
) -> ServiceResult<UbicacionesPageData>
where
    R: ClienteReader + UbicacionReader,
{
    check_role(user, MANAGERS)?;

    let (ubicaciones, clientes) =
        futures::try_join!(repo.list_ubicaciones(), repo.list_clientes()).map_err(|err| {
            log::error!("Failed to load locations: {err}");
            err
        })?;

    let search_query = normalize(query.q);
    let sector = normalize(query.sector);
    let cod_cliente = normalize(query.cod_cliente);

    let principales: Vec<(String, Option<i32>)> = clientes
        .iter()
        .map(|c| (c.cod_cliente.clone(), c.id_ubicacion_principal))
        .collect();
    let estadisticas = estadisticas_ubicaciones(&ubicaciones, &principales);

    let mut visibles: Vec<&UbicacionCliente> =
        buscar(&ubicaciones, search_query.as_deref().unwrap_or_default());
    if let Some(sector) = &sector {
        let en_sector = por_sector(&ubicaciones, sector);
        visibles.retain(|u| en_sector.iter().any(|s| s.id_ubicacion == u.id_ubicacion));
    }
    if let Some(cod) = &cod_cliente {
        let propias = por_cliente(&ubicaciones, cod);
        visibles.retain(|u| propias.iter().any(|p| p.id_ubicacion == u.id_ubicacion));
    }
    let visibles: Vec<UbicacionCliente> = visibles.into_iter().cloned().collect();

    Ok(UbicacionesPageData {
        sectores: sectores(&ubicaciones),
        ubicaciones: visibles,
        clientes,
        estadisticas,
        search_query,
        sector,
        cod_cliente,
    })
}

/// Form data for a new location (`None`) or an existing one.
pub async fn load_ubicacion_form<R>(
    repo: &R,
    user: &AuthenticatedUser,
    id_ubicacion: Option<i32>,
) -> ServiceResult<UbicacionFormData>
where
    R: ClienteReader + UbicacionReader,
{
    check_role(user, MANAGERS)?;

    let clientes = repo.list_clientes().await?;
    let ubicacion = match id_ubicacion {
        Some(id) => repo.get_ubicacion(id).await?.ok_or(ServiceError::NotFound)?,
        None => UbicacionCliente::default(),
    };

    Ok(UbicacionFormData {
        ubicacion,
        clientes,
    })
}

pub async fn create_ubicacion<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: UbicacionForm,
) -> ServiceResult<UbicacionCliente>
where
    R: UbicacionWriter,
{
    check_role(user, MANAGERS)?;
    validate_form(&form)?;

    let ubicacion = NewUbicacion::from(form);
    let created = repo.create_ubicacion(&ubicacion).await.map_err(|err| {
        log::error!("Failed to create location for {}: {err}", ubicacion.cod_cliente);
        err
    })?;
    Ok(created)
}

pub async fn update_ubicacion<R>(
    repo: &R,
    user: &AuthenticatedUser,
    id_ubicacion: i32,
    form: UbicacionForm,
) -> ServiceResult<UbicacionCliente>
where
    R: UbicacionWriter,
{
    check_role(user, MANAGERS)?;
    validate_form(&form)?;

    let ubicacion = NewUbicacion::from(form);
    let updated = repo
        .update_ubicacion(id_ubicacion, &ubicacion)
        .await
        .map_err(|err| {
            log::error!("Failed to update location {id_ubicacion}: {err}");
            err
        })?;
    Ok(updated)
}

pub async fn delete_ubicacion<R>(
    repo: &R,
    user: &AuthenticatedUser,
    id_ubicacion: i32,
) -> ServiceResult<()>
where
    R: UbicacionWriter,
{
    check_role(user, MANAGERS)?;

    repo.delete_ubicacion(id_ubicacion).await.map_err(|err| {
        log::error!("Failed to delete location {id_ubicacion}: {err}");
        err
    })?;
    Ok(())
}

/// Whether `id_ubicacion` is one of the locations of `cod_cliente`.
pub async fn validar_principal<R>(
    repo: &R,
    cod_cliente: &str,
    id_ubicacion: i32,
) -> ServiceResult<bool>
where
    R: UbicacionReader,
{
    let ubicaciones = repo.list_ubicaciones_cliente(cod_cliente).await?;
    Ok(ubicaciones.iter().any(|u| u.id_ubicacion == id_ubicacion))
}

/// Per-client summary and principal-reference check.
pub async fn load_resumen<R>(
    repo: &R,
    user: &AuthenticatedUser,
) -> ServiceResult<UbicacionesResumen>
where
    R: ClienteReader + UbicacionReader,
{
    check_role(user, MANAGERS)?;

    let (clientes, ubicaciones): (Vec<Cliente>, Vec<UbicacionCliente>) =
        futures::try_join!(repo.list_clientes(), repo.list_ubicaciones())?;

    let integridad = verificar_principales(&clientes, &ubicaciones);
    Ok(UbicacionesResumen {
        resumen: resumen_por_cliente(clientes, &ubicaciones),
        integridad,
    })
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::repository::errors::{RepositoryError, RepositoryResult};
    use crate::services::test_support::user_with_role;

    #[derive(Default)]
    struct FakeRepo {
        clientes: Vec<Cliente>,
        ubicaciones: RefCell<Vec<UbicacionCliente>>,
        created: RefCell<Vec<NewUbicacion>>,
    }

    impl ClienteReader for FakeRepo {
        async fn list_clientes(&self) -> RepositoryResult<Vec<Cliente>> {
            Ok(self.clientes.clone())
        }

        async fn get_cliente(&self, _cod_cliente: &str) -> RepositoryResult<Option<Cliente>> {
            Ok(None)
        }

        async fn list_clientes_con_ubicaciones(
            &self,
        ) -> RepositoryResult<Vec<(Cliente, Vec<UbicacionCliente>)>> {
            Ok(vec![])
        }
    }

    impl UbicacionReader for FakeRepo {
        async fn list_ubicaciones(&self) -> RepositoryResult<Vec<UbicacionCliente>> {
            Ok(self.ubicaciones.borrow().clone())
        }

        async fn get_ubicacion(
            &self,
            id_ubicacion: i32,
        ) -> RepositoryResult<Option<UbicacionCliente>> {
            Ok(self
                .ubicaciones
                .borrow()
                .iter()
                .find(|u| u.id_ubicacion == id_ubicacion)
                .cloned())
        }

        async fn list_ubicaciones_cliente(
            &self,
            cod_cliente: &str,
        ) -> RepositoryResult<Vec<UbicacionCliente>> {
            Ok(self
                .ubicaciones
                .borrow()
                .iter()
                .filter(|u| u.cod_cliente == cod_cliente)
                .cloned()
                .collect())
        }
    }

    impl UbicacionWriter for FakeRepo {
        async fn create_ubicacion(
            &self,
            ubicacion: &NewUbicacion,
        ) -> RepositoryResult<UbicacionCliente> {
            self.created.borrow_mut().push(ubicacion.clone());
            Ok(UbicacionCliente {
                id_ubicacion: 100,
                cod_cliente: ubicacion.cod_cliente.clone(),
                ..Default::default()
            })
        }

        async fn update_ubicacion(
            &self,
            _id_ubicacion: i32,
            _ubicacion: &NewUbicacion,
        ) -> RepositoryResult<UbicacionCliente> {
            Err(RepositoryError::Validation("sector inválido".to_string()))
        }

        async fn delete_ubicacion(&self, id_ubicacion: i32) -> RepositoryResult<()> {
            self.ubicaciones
                .borrow_mut()
                .retain(|u| u.id_ubicacion != id_ubicacion);
            Ok(())
        }

        async fn set_ubicacion_principal(
            &self,
            _cod_cliente: &str,
            _id_ubicacion: i32,
        ) -> RepositoryResult<()> {
            Ok(())
        }
    }

    fn ubicacion(id: i32, cod: &str, sector: &str, direccion: &str) -> UbicacionCliente {
        UbicacionCliente {
            id_ubicacion: id,
            cod_cliente: cod.to_string(),
            direccion: direccion.to_string(),
            sector: sector.to_string(),
            ..Default::default()
        }
    }

    fn cliente(cod: &str, principal: Option<i32>) -> Cliente {
        Cliente {
            cod_cliente: cod.to_string(),
            nombre: format!("Cliente {cod}"),
            id_ubicacion_principal: principal,
            ..Default::default()
        }
    }

    fn repo() -> FakeRepo {
        let repo = FakeRepo {
            clientes: vec![cliente("A", Some(1)), cliente("B", None)],
            ..Default::default()
        };
        repo.ubicaciones.replace(vec![
            ubicacion(1, "A", "Norte", "Av. Amazonas"),
            ubicacion(2, "A", "Sur", "Calle Quitumbe"),
            ubicacion(3, "B", "norte", "Av. Prensa"),
        ]);
        repo
    }

    #[actix_web::test]
    async fn list_is_admin_only() {
        let result = list_ubicaciones(
            &repo(),
            &user_with_role("Vendedor"),
            UbicacionesQuery::default(),
        )
        .await;
        assert!(matches!(result, Err(ServiceError::Unauthorized)));
    }

    #[actix_web::test]
    async fn list_combines_filters_and_keeps_full_statistics() {
        let data = list_ubicaciones(
            &repo(),
            &user_with_role("Admin"),
            UbicacionesQuery {
                q: Some("av.".to_string()),
                sector: Some("NORTE".to_string()),
                cod_cliente: Some(" ".to_string()),
            },
        )
        .await
        .unwrap();

        let ids: Vec<i32> = data.ubicaciones.iter().map(|u| u.id_ubicacion).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(data.cod_cliente, None);
        assert_eq!(data.estadisticas.total_ubicaciones, 3);
        assert_eq!(data.estadisticas.clientes_con_principal, 1);
        assert_eq!(data.estadisticas.clientes_sin_principal, 1);
        assert_eq!(data.sectores, vec!["Norte", "Sur", "norte"]);
    }

    #[actix_web::test]
    async fn owner_filter_restricts_to_client() {
        let data = list_ubicaciones(
            &repo(),
            &user_with_role("Admin"),
            UbicacionesQuery {
                cod_cliente: Some("B".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(data.ubicaciones.len(), 1);
        assert_eq!(data.ubicaciones[0].id_ubicacion, 3);
    }

    #[actix_web::test]
    async fn form_for_missing_location_is_not_found() {
        let result = load_ubicacion_form(&repo(), &user_with_role("Admin"), Some(42)).await;
        assert!(matches!(result, Err(ServiceError::NotFound)));

        let nuevo = load_ubicacion_form(&repo(), &user_with_role("Admin"), None)
            .await
            .unwrap();
        assert_eq!(nuevo.ubicacion.id_ubicacion, 0);
        assert_eq!(nuevo.clientes.len(), 2);
    }

    #[actix_web::test]
    async fn create_validates_before_calling_backend() {
        let repo = repo();
        let form = UbicacionForm {
            cod_cliente: "A".to_string(),
            latitud: 95.0,
            longitud: -78.4,
            direccion: "Av. Amazonas".to_string(),
            sector: "Norte".to_string(),
            referencia: None,
        };
        let result = create_ubicacion(&repo, &user_with_role("Admin"), form).await;
        match result {
            Err(ServiceError::Form(message)) => assert_eq!(message, "Latitud fuera de rango"),
            other => panic!("unexpected {other:?}"),
        }
        assert!(repo.created.borrow().is_empty());
    }

    #[actix_web::test]
    async fn backend_validation_is_surfaced() {
        let form = UbicacionForm {
            cod_cliente: "A".to_string(),
            latitud: -0.2,
            longitud: -78.4,
            direccion: "Av. Amazonas".to_string(),
            sector: "Norte".to_string(),
            referencia: None,
        };
        let result = update_ubicacion(&repo(), &user_with_role("Admin"), 1, form).await;
        match result {
            Err(ServiceError::Validation(detail)) => assert_eq!(detail, "sector inválido"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[actix_web::test]
    async fn principal_must_belong_to_client() {
        let repo = repo();
        assert!(validar_principal(&repo, "A", 2).await.unwrap());
        assert!(!validar_principal(&repo, "B", 2).await.unwrap());
    }

    #[actix_web::test]
    async fn resumen_reports_clients_needing_repair() {
        let data = load_resumen(&repo(), &user_with_role("Admin"))
            .await
            .unwrap();
        assert_eq!(data.resumen.len(), 2);
        assert_eq!(data.resumen[0].total_ubicaciones, 2);
        assert_eq!(data.integridad.clientes_sin_ubicacion_principal, vec!["B"]);
        assert_eq!(data.integridad.clientes_con_ubicaciones_disponibles, vec!["B"]);
    }
}
