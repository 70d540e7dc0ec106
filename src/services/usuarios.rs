use crate::domain::usuario::{NewRol, Rol, Role, Usuario, filter_roles, filter_usuarios};
use crate::dto::catalogo::{DescripcionesPageData, SearchQuery};
use crate::dto::usuarios::{EmpleadosPageData, EmpleadosQuery, FilaUsuario, UsuarioFormData};
use crate::forms::DescripcionForm;
use crate::forms::usuarios::UsuarioForm;
use crate::models::auth::AuthenticatedUser;
use crate::repository::{RolReader, RolWriter, UsuarioReader, UsuarioWriter};
use crate::services::{ServiceError, ServiceResult, check_role, validate_form};

const MANAGERS: &[Role] = &[Role::Admin];

fn normalize(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn filas(usuarios: Vec<Usuario>, roles: &[Rol]) -> Vec<FilaUsuario> {
    usuarios
        .into_iter()
        .map(|usuario| FilaUsuario {
            rol: usuario
                .rol_descripcion(roles)
                .unwrap_or("Sin rol")
                .to_string(),
            usuario,
        })
        .collect()
}

/// Employees list with name/identificación search and role filter.
pub async fn list_empleados<R>(
    repo: &R,
    user: &AuthenticatedUser,
    query: EmpleadosQuery,
) -> ServiceResult<EmpleadosPageData>
where
    R: UsuarioReader + RolReader,
{
    check_role(user, MANAGERS)?;

    let (usuarios, roles) = futures::try_join!(repo.list_usuarios(), repo.list_roles())
        .map_err(|err| {
            log::error!("Failed to load employees: {err}");
            err
        })?;

    let search_query = normalize(query.q);
    let rol = normalize(query.rol);

    let visibles: Vec<Usuario> =
        filter_usuarios(&usuarios, search_query.as_deref().unwrap_or_default())
            .into_iter()
            .filter(|u| match &rol {
                Some(rol) => u
                    .rol_descripcion(&roles)
                    .is_some_and(|d| d.eq_ignore_ascii_case(rol)),
                None => true,
            })
            .cloned()
            .collect();

    Ok(EmpleadosPageData {
        usuarios: filas(visibles, &roles),
        roles,
        search_query,
        rol,
    })
}

pub async fn load_usuario_form<R>(
    repo: &R,
    user: &AuthenticatedUser,
    identificacion: Option<&str>,
) -> ServiceResult<UsuarioFormData>
where
    R: UsuarioReader + RolReader,
{
    check_role(user, MANAGERS)?;

    let roles = repo.list_roles().await?;
    let usuario = match identificacion {
        Some(id) => Some(repo.get_usuario(id).await?.ok_or(ServiceError::NotFound)?),
        None => None,
    };

    Ok(UsuarioFormData { usuario, roles })
}

pub async fn create_usuario<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: UsuarioForm,
) -> ServiceResult<Usuario>
where
    R: UsuarioWriter,
{
    check_role(user, MANAGERS)?;
    validate_form(&form)?;

    let usuario = form
        .to_new_usuario()
        .map_err(|err| ServiceError::Form(err.to_string()))?;
    let created = repo.create_usuario(&usuario).await.map_err(|err| {
        log::error!("Failed to create employee {}: {err}", usuario.identificacion);
        err
    })?;
    Ok(created)
}

pub async fn update_usuario<R>(
    repo: &R,
    user: &AuthenticatedUser,
    identificacion: &str,
    form: UsuarioForm,
) -> ServiceResult<Usuario>
where
    R: UsuarioWriter,
{
    check_role(user, MANAGERS)?;
    validate_form(&form)?;

    let usuario = form.into_payload();
    let updated = repo
        .update_usuario(identificacion, &usuario)
        .await
        .map_err(|err| {
            log::error!("Failed to update employee {identificacion}: {err}");
            err
        })?;
    Ok(updated)
}

pub async fn delete_usuario<R>(
    repo: &R,
    user: &AuthenticatedUser,
    identificacion: &str,
) -> ServiceResult<()>
where
    R: UsuarioWriter,
{
    check_role(user, MANAGERS)?;

    repo.delete_usuario(identificacion).await.map_err(|err| {
        log::error!("Failed to delete employee {identificacion}: {err}");
        err
    })?;
    Ok(())
}

/// Employees holding `rol`, as listed by the backend.
pub async fn list_por_rol<R>(
    repo: &R,
    user: &AuthenticatedUser,
    rol: Role,
) -> ServiceResult<Vec<Usuario>>
where
    R: UsuarioReader,
{
    check_role(user, &[Role::Admin, Role::Facturador])?;

    let usuarios = repo
        .list_usuarios_por_rol(rol.label())
        .await
        .map_err(|err| {
            log::error!("Failed to list employees with role {rol}: {err}");
            err
        })?;
    Ok(usuarios)
}

pub async fn list_roles<R>(
    repo: &R,
    user: &AuthenticatedUser,
    query: SearchQuery,
) -> ServiceResult<DescripcionesPageData<Rol>>
where
    R: RolReader,
{
    check_role(user, MANAGERS)?;

    let roles = repo.list_roles().await?;
    let search_query = query.term();
    let items = filter_roles(&roles, search_query.as_deref().unwrap_or_default())
        .into_iter()
        .cloned()
        .collect();

    Ok(DescripcionesPageData {
        items,
        search_query,
    })
}

pub async fn create_rol<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: DescripcionForm,
) -> ServiceResult<Rol>
where
    R: RolWriter,
{
    check_role(user, MANAGERS)?;
    validate_form(&form)?;

    let rol = NewRol {
        descripcion: form.descripcion(),
    };
    let created = repo.create_rol(&rol).await.map_err(|err| {
        log::error!("Failed to create role {}: {err}", rol.descripcion);
        err
    })?;
    Ok(created)
}

pub async fn update_rol<R>(
    repo: &R,
    user: &AuthenticatedUser,
    id_rol: i32,
    form: DescripcionForm,
) -> ServiceResult<Rol>
where
    R: RolWriter,
{
    check_role(user, MANAGERS)?;
    validate_form(&form)?;

    let rol = NewRol {
        descripcion: form.descripcion(),
    };
    let updated = repo.update_rol(id_rol, &rol).await.map_err(|err| {
        log::error!("Failed to update role {id_rol}: {err}");
        err
    })?;
    Ok(updated)
}

pub async fn delete_rol<R>(repo: &R, user: &AuthenticatedUser, id_rol: i32) -> ServiceResult<()>
where
    R: RolWriter,
{
    check_role(user, MANAGERS)?;

    repo.delete_rol(id_rol).await.map_err(|err| {
        log::error!("Failed to delete role {id_rol}: {err}");
        err
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::domain::usuario::{NewUsuario, RolRef};
    use crate::repository::errors::RepositoryResult;
    use crate::services::test_support::user_with_role;

    #[derive(Default)]
    struct FakeRepo {
        usuarios: Vec<Usuario>,
        roles: Vec<Rol>,
        sent: RefCell<Vec<NewUsuario>>,
        rol_queries: RefCell<Vec<String>>,
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

        async fn list_usuarios_por_rol(&self, rol: &str) -> RepositoryResult<Vec<Usuario>> {
            self.rol_queries.borrow_mut().push(rol.to_string());
            Ok(self.usuarios.iter().take(1).cloned().collect())
        }
    }

    impl UsuarioWriter for FakeRepo {
        async fn create_usuario(&self, usuario: &NewUsuario) -> RepositoryResult<Usuario> {
            self.sent.borrow_mut().push(usuario.clone());
            Ok(Usuario {
                identificacion: usuario.identificacion.clone(),
                nombre: usuario.nombre.clone(),
                ..Default::default()
            })
        }

        async fn update_usuario(
            &self,
            identificacion: &str,
            usuario: &NewUsuario,
        ) -> RepositoryResult<Usuario> {
            self.sent.borrow_mut().push(usuario.clone());
            Ok(Usuario {
                identificacion: identificacion.to_string(),
                ..Default::default()
            })
        }

        async fn delete_usuario(&self, _identificacion: &str) -> RepositoryResult<()> {
            Ok(())
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

    impl RolWriter for FakeRepo {
        async fn create_rol(&self, rol: &NewRol) -> RepositoryResult<Rol> {
            Ok(Rol {
                id_rol: 9,
                descripcion: rol.descripcion.clone(),
            })
        }

        async fn update_rol(&self, id_rol: i32, rol: &NewRol) -> RepositoryResult<Rol> {
            Ok(Rol {
                id_rol,
                descripcion: rol.descripcion.clone(),
            })
        }

        async fn delete_rol(&self, _id_rol: i32) -> RepositoryResult<()> {
            Ok(())
        }
    }

    fn rol(id: i32, descripcion: &str) -> Rol {
        Rol {
            id_rol: id,
            descripcion: descripcion.to_string(),
        }
    }

    fn usuario(identificacion: &str, nombre: &str, id_rol: i32) -> Usuario {
        Usuario {
            identificacion: identificacion.to_string(),
            nombre: nombre.to_string(),
            correo: format!("{}@example.com", nombre.to_lowercase()),
            estado: "activo".to_string(),
            id_rol,
            ..Default::default()
        }
    }

    fn repo() -> FakeRepo {
        let mut embebido = usuario("1700000003", "Eva", 0);
        embebido.rol = Some(RolRef::Name("Bodeguero".to_string()));
        FakeRepo {
            usuarios: vec![
                usuario("1700000001", "Luis", 2),
                usuario("1700000002", "Ana", 1),
                embebido,
            ],
            roles: vec![rol(1, "Admin"), rol(2, "Vendedor")],
            ..Default::default()
        }
    }

    fn form(contrasena: Option<&str>) -> UsuarioForm {
        UsuarioForm {
            identificacion: "1712345678".to_string(),
            rucempresarial: None,
            nombre: "Luis Pérez".to_string(),
            correo: "Luis@Example.com".to_string(),
            celular: "0998765432".to_string(),
            contrasena: contrasena.map(str::to_string),
            estado: "activo".to_string(),
            id_rol: 2,
        }
    }

    #[actix_web::test]
    async fn list_resolves_roles_and_filters() {
        let data = list_empleados(
            &repo(),
            &user_with_role("Admin"),
            EmpleadosQuery {
                q: None,
                rol: Some("vendedor".to_string()),
            },
        )
        .await
        .unwrap();
        assert_eq!(data.usuarios.len(), 1);
        assert_eq!(data.usuarios[0].usuario.nombre, "Luis");
        assert_eq!(data.usuarios[0].rol, "Vendedor");

        let todos = list_empleados(&repo(), &user_with_role("Admin"), EmpleadosQuery::default())
            .await
            .unwrap();
        let roles: Vec<&str> = todos.usuarios.iter().map(|f| f.rol.as_str()).collect();
        assert_eq!(roles, vec!["Vendedor", "Admin", "Bodeguero"]);
    }

    #[actix_web::test]
    async fn employees_are_admin_only() {
        let result =
            list_empleados(&repo(), &user_with_role("Facturador"), EmpleadosQuery::default())
                .await;
        assert!(matches!(result, Err(ServiceError::Unauthorized)));
    }

    #[actix_web::test]
    async fn create_requires_password() {
        let repo = repo();
        match create_usuario(&repo, &user_with_role("Admin"), form(None)).await {
            Err(ServiceError::Form(message)) => {
                assert_eq!(message, "La contraseña es requerida")
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(repo.sent.borrow().is_empty());

        create_usuario(&repo, &user_with_role("Admin"), form(Some("secreta123")))
            .await
            .unwrap();
        let sent = repo.sent.borrow();
        assert_eq!(sent[0].correo, "luis@example.com");
        assert_eq!(sent[0].contrasena.as_deref(), Some("secreta123"));
    }

    #[actix_web::test]
    async fn update_keeps_password_when_blank() {
        let repo = repo();
        update_usuario(&repo, &user_with_role("Admin"), "1712345678", form(None))
            .await
            .unwrap();
        assert_eq!(repo.sent.borrow()[0].contrasena, None);
    }

    #[actix_web::test]
    async fn short_password_fails_validation() {
        let result = update_usuario(
            &repo(),
            &user_with_role("Admin"),
            "1712345678",
            form(Some("123")),
        )
        .await;
        assert!(matches!(result, Err(ServiceError::Form(_))));
    }

    #[actix_web::test]
    async fn invoicers_may_list_sellers() {
        let repo = repo();
        let vendedores = list_por_rol(&repo, &user_with_role("Cajero"), Role::Vendedor)
            .await
            .unwrap();
        assert_eq!(vendedores.len(), 1);
        assert_eq!(*repo.rol_queries.borrow(), vec!["Vendedor".to_string()]);

        let denied = list_por_rol(&repo, &user_with_role("Bodeguero"), Role::Vendedor).await;
        assert!(matches!(denied, Err(ServiceError::Unauthorized)));
    }

    #[actix_web::test]
    async fn roles_search_matches_id() {
        let data = list_roles(
            &repo(),
            &user_with_role("Admin"),
            SearchQuery {
                q: Some("2".to_string()),
                page: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(data.items, vec![rol(2, "Vendedor")]);

        let creado = create_rol(
            &repo(),
            &user_with_role("Admin"),
            DescripcionForm {
                descripcion: "Supervisor".to_string(),
            },
        )
        .await
        .unwrap();
        assert_eq!(creado.descripcion, "Supervisor");
    }
}
