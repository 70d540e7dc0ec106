use crate::domain::ruta::{
    Ruta, SeleccionDashboard, TipoRuta, conteo_rutas_propias, estadisticas_rutas, filtrar_rutas,
    por_tipo, resumen_por_usuario, sectores, ubicaciones_dashboard, validar_asignacion,
};
use crate::domain::ubicacion::{self, UbicacionCliente};
use crate::domain::usuario::{Role, Usuario};
use crate::dto::catalogo::SearchQuery;
use crate::dto::rutas::{
    DashboardQuery, DashboardRutasData, RutaFormData, RutasPageData, RutasPropiasData,
};
use crate::forms::rutas::RutaForm;
use crate::models::auth::AuthenticatedUser;
use crate::repository::{RolReader, RutaReader, RutaWriter, UbicacionReader, UsuarioReader};
use crate::services::{ServiceError, ServiceResult, check_role, validate_form};

const MANAGERS: &[Role] = &[Role::Admin];
const FIELD: &[Role] = &[Role::Vendedor, Role::Transportista];

pub async fn list_rutas<R>(
    repo: &R,
    user: &AuthenticatedUser,
    query: SearchQuery,
) -> ServiceResult<RutasPageData>
where
    R: RutaReader,
{
    check_role(user, MANAGERS)?;

    let rutas = repo.list_rutas().await.map_err(|err| {
        log::error!("Failed to list routes: {err}");
        err
    })?;
    let search_query = query.term();
    let rutas = filtrar_rutas(&rutas, search_query.as_deref().unwrap_or_default())
        .into_iter()
        .cloned()
        .collect();

    Ok(RutasPageData {
        rutas,
        search_query,
    })
}

/// Form choices: sellers and carriers, every location and its sectors.
pub async fn load_ruta_form<R>(
    repo: &R,
    user: &AuthenticatedUser,
    id_ruta: Option<i32>,
) -> ServiceResult<RutaFormData>
where
    R: RutaReader + UsuarioReader + RolReader + UbicacionReader,
{
    check_role(user, MANAGERS)?;

    let (usuarios, roles, ubicaciones) = futures::try_join!(
        repo.list_usuarios(),
        repo.list_roles(),
        repo.list_ubicaciones(),
    )?;
    let ruta = match id_ruta {
        Some(id) => Some(repo.get_ruta(id).await?.ok_or(ServiceError::NotFound)?),
        None => None,
    };

    let usuarios: Vec<Usuario> = usuarios
        .into_iter()
        .filter(|u| {
            matches!(
                u.rol_descripcion(&roles).and_then(Role::from_descripcion),
                Some(Role::Vendedor | Role::Transportista)
            )
        })
        .collect();

    Ok(RutaFormData {
        ruta,
        usuarios,
        sectores: ubicacion::sectores(&ubicaciones),
        ubicaciones,
    })
}

/// Checks that the assigned employee holds the role the route kind needs.
async fn check_asignacion<R>(repo: &R, form: &RutaForm) -> ServiceResult<()>
where
    R: UsuarioReader + RolReader,
{
    let Some(identificacion) = form.usuario() else {
        return Ok(());
    };

    let (usuario, roles) =
        futures::try_join!(repo.get_usuario(&identificacion), repo.list_roles())?;
    let usuario = usuario
        .ok_or_else(|| ServiceError::Form("El usuario asignado no existe".to_string()))?;

    let tipo = form.tipo();
    let rol = usuario
        .rol_descripcion(&roles)
        .and_then(Role::from_descripcion);
    if !validar_asignacion(rol, tipo) {
        return Err(ServiceError::Form(format!(
            "Solo un {} puede ser asignado a una ruta de {}",
            tipo.rol_requerido().label(),
            tipo
        )));
    }
    Ok(())
}

pub async fn create_ruta<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: RutaForm,
) -> ServiceResult<Ruta>
where
    R: RutaWriter + UsuarioReader + RolReader + UbicacionReader,
{
    check_role(user, MANAGERS)?;
    validate_form(&form)?;
    check_asignacion(repo, &form).await?;

    let ubicaciones = repo.list_ubicaciones().await?;
    let ruta = form.to_new_ruta(&ubicaciones);
    let created = repo.create_ruta(&ruta).await.map_err(|err| {
        log::error!("Failed to create route {}: {err}", ruta.nombre);
        err
    })?;
    Ok(created)
}

pub async fn update_ruta<R>(
    repo: &R,
    user: &AuthenticatedUser,
    id_ruta: i32,
    form: RutaForm,
) -> ServiceResult<Ruta>
where
    R: RutaWriter + UsuarioReader + RolReader + UbicacionReader,
{
    check_role(user, MANAGERS)?;
    validate_form(&form)?;
    check_asignacion(repo, &form).await?;

    let ubicaciones = repo.list_ubicaciones().await?;
    let ruta = form.to_new_ruta(&ubicaciones);
    let updated = repo.update_ruta(id_ruta, &ruta).await.map_err(|err| {
        log::error!("Failed to update route {id_ruta}: {err}");
        err
    })?;
    Ok(updated)
}

pub async fn delete_ruta<R>(repo: &R, user: &AuthenticatedUser, id_ruta: i32) -> ServiceResult<()>
where
    R: RutaWriter,
{
    check_role(user, MANAGERS)?;

    repo.delete_ruta(id_ruta).await.map_err(|err| {
        log::error!("Failed to delete route {id_ruta}: {err}");
        err
    })?;
    Ok(())
}

/// Deliveries or sales dashboard over the routes of `tipo`.
pub async fn load_dashboard<R>(
    repo: &R,
    user: &AuthenticatedUser,
    tipo: TipoRuta,
    query: DashboardQuery,
) -> ServiceResult<DashboardRutasData>
where
    R: RutaReader + UbicacionReader,
{
    check_role(user, MANAGERS)?;

    let (rutas, ubicaciones) = futures::try_join!(repo.list_rutas(), repo.list_ubicaciones())
        .map_err(|err| {
            log::error!("Failed to load {tipo} dashboard: {err}");
            err
        })?;

    let del_tipo = por_tipo(&rutas, tipo);
    let seleccion = SeleccionDashboard {
        id_ruta: query.id_ruta,
        sector: query
            .sector
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()),
    };
    let visibles: Vec<UbicacionCliente> = ubicaciones_dashboard(&del_tipo, &ubicaciones, &seleccion)
        .into_iter()
        .cloned()
        .collect();

    Ok(DashboardRutasData {
        tipo,
        sectores: sectores(&del_tipo),
        ubicaciones: visibles,
        estadisticas: estadisticas_rutas(&del_tipo),
        resumen_usuarios: resumen_por_usuario(&del_tipo),
        rutas: del_tipo.into_iter().cloned().collect(),
        id_ruta: seleccion.id_ruta,
        sector: seleccion.sector,
    })
}

/// Routes assigned to the session user.
pub async fn load_rutas_propias<R>(
    repo: &R,
    user: &AuthenticatedUser,
) -> ServiceResult<RutasPropiasData>
where
    R: RutaReader,
{
    check_role(user, FIELD)?;

    let rutas = repo
        .list_rutas_usuario(&user.identificacion)
        .await
        .map_err(|err| {
            log::error!("Failed to list routes of {}: {err}", user.identificacion);
            err
        })?;

    Ok(RutasPropiasData {
        conteo: conteo_rutas_propias(&rutas),
        rutas,
    })
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::domain::ruta::{AsignacionRuta, NewRuta};
    use crate::domain::usuario::Rol;
    use crate::repository::errors::RepositoryResult;
    use crate::services::test_support::user_with_role;

    #[derive(Default)]
    struct FakeRepo {
        rutas: Vec<Ruta>,
        usuarios: Vec<Usuario>,
        roles: Vec<Rol>,
        ubicaciones: Vec<UbicacionCliente>,
        sent: RefCell<Vec<NewRuta>>,
    }

    impl RutaReader for FakeRepo {
        async fn list_rutas(&self) -> RepositoryResult<Vec<Ruta>> {
            Ok(self.rutas.clone())
        }

        async fn get_ruta(&self, id_ruta: i32) -> RepositoryResult<Option<Ruta>> {
            Ok(self.rutas.iter().find(|r| r.id_ruta == id_ruta).cloned())
        }

        async fn list_rutas_usuario(&self, identificacion: &str) -> RepositoryResult<Vec<Ruta>> {
            Ok(self
                .rutas
                .iter()
                .filter(|r| r.asignada_a(identificacion))
                .cloned()
                .collect())
        }
    }

    impl RutaWriter for FakeRepo {
        async fn create_ruta(&self, ruta: &NewRuta) -> RepositoryResult<Ruta> {
            self.sent.borrow_mut().push(ruta.clone());
            Ok(Ruta {
                id_ruta: 10,
                nombre: ruta.nombre.clone(),
                ..Default::default()
            })
        }

        async fn update_ruta(&self, id_ruta: i32, ruta: &NewRuta) -> RepositoryResult<Ruta> {
            self.sent.borrow_mut().push(ruta.clone());
            Ok(Ruta {
                id_ruta,
                ..Default::default()
            })
        }

        async fn delete_ruta(&self, _id_ruta: i32) -> RepositoryResult<()> {
            Ok(())
        }
    }

    impl UsuarioReader for FakeRepo {
        async fn list_usuarios(&self) -> RepositoryResult<Vec<Usuario>> {
            Ok(self.usuarios.clone())
        }

        async fn get_usuario(&self, identificacion: &str) -> RepositoryResult<Option<Usuario>> {
            Ok(self
                .usuarios
                .iter()
                .find(|u| u.identificacion == identificacion)
                .cloned())
        }

        async fn list_usuarios_por_rol(&self, _rol: &str) -> RepositoryResult<Vec<Usuario>> {
            Ok(vec![])
        }
    }

    impl RolReader for FakeRepo {
        async fn list_roles(&self) -> RepositoryResult<Vec<Rol>> {
            Ok(self.roles.clone())
        }

        async fn get_rol(&self, id_rol: i32) -> RepositoryResult<Option<Rol>> {
            Ok(self.roles.iter().find(|r| r.id_rol == id_rol).cloned())
        }
    }

    impl UbicacionReader for FakeRepo {
        async fn list_ubicaciones(&self) -> RepositoryResult<Vec<UbicacionCliente>> {
            Ok(self.ubicaciones.clone())
        }

        async fn get_ubicacion(
            &self,
            id_ubicacion: i32,
        ) -> RepositoryResult<Option<UbicacionCliente>> {
            Ok(self
                .ubicaciones
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
                .iter()
                .filter(|u| u.cod_cliente == cod_cliente)
                .cloned()
                .collect())
        }
    }

    fn usuario(identificacion: &str, nombre: &str, id_rol: i32) -> Usuario {
        Usuario {
            identificacion: identificacion.to_string(),
            nombre: nombre.to_string(),
            id_rol,
            ..Default::default()
        }
    }

    fn ubicacion(id: i32, cod: &str, sector: &str) -> UbicacionCliente {
        UbicacionCliente {
            id_ubicacion: id,
            cod_cliente: cod.to_string(),
            sector: sector.to_string(),
            ..Default::default()
        }
    }

    fn asignacion(identificacion: &str, cod: &str, id_ubicacion: i32) -> AsignacionRuta {
        AsignacionRuta {
            identificacion_usuario: Some(identificacion.to_string()),
            cod_cliente: Some(cod.to_string()),
            id_ubicacion: Some(id_ubicacion),
            ..Default::default()
        }
    }

    fn ruta(id: i32, sector: &str, tipo: TipoRuta, estado: &str, paradas: Vec<AsignacionRuta>) -> Ruta {
        Ruta {
            id_ruta: id,
            nombre: format!("Ruta {id}"),
            sector: sector.to_string(),
            direccion: "Av. Principal".to_string(),
            tipo_ruta: tipo,
            estado: estado.to_string(),
            asignaciones: Some(paradas),
            ..Default::default()
        }
    }

    fn repo() -> FakeRepo {
        FakeRepo {
            rutas: vec![
                ruta(
                    1,
                    "Norte",
                    TipoRuta::Entrega,
                    "planificada",
                    vec![asignacion("T1", "C1", 1), asignacion("T1", "C2", 2)],
                ),
                ruta(
                    2,
                    "Sur",
                    TipoRuta::Entrega,
                    "completada",
                    vec![asignacion("T1", "C3", 3)],
                ),
                ruta(
                    3,
                    "Norte",
                    TipoRuta::Venta,
                    "en_ejecucion",
                    vec![asignacion("V1", "C4", 4)],
                ),
            ],
            usuarios: vec![
                usuario("V1", "Luis", 2),
                usuario("T1", "Eva", 3),
                usuario("A1", "Ana", 1),
            ],
            roles: vec![
                Rol {
                    id_rol: 1,
                    descripcion: "Admin".to_string(),
                },
                Rol {
                    id_rol: 2,
                    descripcion: "Vendedor".to_string(),
                },
                Rol {
                    id_rol: 3,
                    descripcion: "Transportista".to_string(),
                },
            ],
            ubicaciones: vec![
                ubicacion(1, "C1", "Norte"),
                ubicacion(2, "C2", "Norte"),
                ubicacion(3, "C3", "Sur"),
                ubicacion(4, "C4", "Norte"),
            ],
            ..Default::default()
        }
    }

    fn form(tipo: &str, usuario: Option<&str>) -> RutaForm {
        RutaForm {
            nombre: "Norte 2".to_string(),
            sector: "Norte".to_string(),
            direccion: "Av. Prensa".to_string(),
            tipo_ruta: tipo.to_string(),
            estado: "planificada".to_string(),
            fecha_ejecucion: None,
            id_pedido: None,
            identificacion_usuario: usuario.map(str::to_string),
            id_ubicacion: vec![4, 1],
        }
    }

    #[actix_web::test]
    async fn form_offers_only_field_staff() {
        let data = load_ruta_form(&repo(), &user_with_role("Admin"), None)
            .await
            .unwrap();
        let ids: Vec<&str> = data
            .usuarios
            .iter()
            .map(|u| u.identificacion.as_str())
            .collect();
        assert_eq!(ids, vec!["V1", "T1"]);
        assert_eq!(data.sectores, vec!["Norte", "Sur"]);
    }

    #[actix_web::test]
    async fn assignment_must_match_route_kind() {
        let repo = repo();
        let user = user_with_role("Admin");

        match create_ruta(&repo, &user, form("venta", Some("T1"))).await {
            Err(ServiceError::Form(message)) => assert_eq!(
                message,
                "Solo un Vendedor puede ser asignado a una ruta de venta"
            ),
            other => panic!("unexpected {other:?}"),
        }
        match create_ruta(&repo, &user, form("entrega", Some("X9"))).await {
            Err(ServiceError::Form(message)) => {
                assert_eq!(message, "El usuario asignado no existe")
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(repo.sent.borrow().is_empty());

        create_ruta(&repo, &user, form("venta", Some("V1")))
            .await
            .unwrap();
        let sent = &repo.sent.borrow()[0];
        let asignaciones = sent.asignaciones.as_ref().unwrap();
        assert_eq!(asignaciones[0].cod_cliente.as_deref(), Some("C4"));
        assert_eq!(asignaciones[1].orden_visita, Some(2));
    }

    #[actix_web::test]
    async fn unassigned_route_skips_role_check() {
        let repo = repo();
        update_ruta(&repo, &user_with_role("Admin"), 3, form("entrega", None))
            .await
            .unwrap();
        assert_eq!(repo.sent.borrow()[0].tipo_ruta, TipoRuta::Entrega);
    }

    #[actix_web::test]
    async fn deliveries_dashboard_follows_selection() {
        let data = load_dashboard(
            &repo(),
            &user_with_role("Admin"),
            TipoRuta::Entrega,
            DashboardQuery::default(),
        )
        .await
        .unwrap();
        assert_eq!(data.rutas.len(), 2);
        assert_eq!(data.estadisticas.total_paradas, 3);
        assert_eq!(data.estadisticas.usuarios_asignados, 1);
        assert_eq!(data.resumen_usuarios[0].rutas_asignadas, 2);
        let ids: Vec<i32> = data.ubicaciones.iter().map(|u| u.id_ubicacion).collect();
        assert_eq!(ids, vec![1, 2, 3]);

        let por_sector = load_dashboard(
            &repo(),
            &user_with_role("Admin"),
            TipoRuta::Entrega,
            DashboardQuery {
                id_ruta: None,
                sector: Some("Sur".to_string()),
            },
        )
        .await
        .unwrap();
        let ids: Vec<i32> = por_sector.ubicaciones.iter().map(|u| u.id_ubicacion).collect();
        assert_eq!(ids, vec![3]);
        assert_eq!(por_sector.sector.as_deref(), Some("Sur"));

        let ventas = load_dashboard(
            &repo(),
            &user_with_role("Admin"),
            TipoRuta::Venta,
            DashboardQuery {
                id_ruta: Some(3),
                sector: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(ventas.ubicaciones.len(), 1);
        assert_eq!(ventas.ubicaciones[0].id_ubicacion, 4);
    }

    #[actix_web::test]
    async fn field_staff_see_their_own_routes() {
        let mut user = user_with_role("Transportista");
        user.identificacion = "T1".to_string();
        let data = load_rutas_propias(&repo(), &user).await.unwrap();
        assert_eq!(data.rutas.len(), 2);
        assert_eq!(data.conteo.planificadas, 1);
        assert_eq!(data.conteo.completadas, 1);

        let admin = load_rutas_propias(&repo(), &user_with_role("Admin")).await;
        assert!(matches!(admin, Err(ServiceError::Unauthorized)));
    }
}
