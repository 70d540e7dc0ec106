use crate::domain::producto::stock_bajo;
use crate::domain::ruta::conteo_rutas_propias;
use crate::domain::usuario::Role;
use crate::dto::home::{Contador, HomePageData};
use crate::models::auth::AuthenticatedUser;
use crate::repository::{
    CategoriaReader, ClienteReader, FacturaReader, MarcaReader, PedidoReader, ProductoReader,
    RutaReader, UsuarioReader,
};
use crate::services::{ServiceResult, check_role};

/// Sidebar path of `key` for `role`, or the role's home.
fn enlace(role: Role, key: &str) -> String {
    role.menu()
        .into_iter()
        .find(|item| item.key == key)
        .map(|item| item.path)
        .unwrap_or_else(|| role.home_path().to_string())
}

fn contador(role: Role, etiqueta: &'static str, valor: usize, key: &str) -> Contador {
    Contador {
        etiqueta,
        valor,
        enlace: enlace(role, key),
    }
}

/// Counters of the home page of `pagina`; only users of that role may see it.
pub async fn load_home<R>(
    repo: &R,
    user: &AuthenticatedUser,
    pagina: Role,
) -> ServiceResult<HomePageData>
where
    R: ClienteReader
        + ProductoReader
        + PedidoReader
        + RutaReader
        + UsuarioReader
        + CategoriaReader
        + MarcaReader
        + FacturaReader,
{
    let role = check_role(user, &[pagina])?;

    let contadores = match role {
        Role::Admin => {
            let (clientes, productos, pedidos, rutas, usuarios) = futures::try_join!(
                repo.list_clientes(),
                repo.list_productos(),
                repo.list_pedidos(),
                repo.list_rutas(),
                repo.list_usuarios(),
            )
            .map_err(|err| {
                log::error!("Failed to load admin dashboard: {err}");
                err
            })?;
            vec![
                contador(role, "Clientes", clientes.len(), "clientes"),
                contador(role, "Productos", productos.len(), "inventario"),
                contador(role, "Pedidos", pedidos.len(), "pedidos"),
                contador(role, "Rutas", rutas.len(), "rutas"),
                contador(role, "Empleados", usuarios.len(), "empleados"),
                contador(role, "Stock bajo", stock_bajo(&productos), "inventario"),
            ]
        }
        Role::Bodeguero => {
            let (productos, categorias, marcas) = futures::try_join!(
                repo.list_productos(),
                repo.list_categorias(),
                repo.list_marcas(),
            )
            .map_err(|err| {
                log::error!("Failed to load warehouse dashboard: {err}");
                err
            })?;
            vec![
                contador(role, "Productos", productos.len(), "inventario"),
                contador(role, "Stock bajo", stock_bajo(&productos), "inventario"),
                contador(role, "Categorías", categorias.len(), "categorias"),
                contador(role, "Marcas", marcas.len(), "marcas"),
            ]
        }
        Role::Facturador => {
            let (pedidos, facturas, clientes) = futures::try_join!(
                repo.list_pedidos(),
                repo.list_facturas(),
                repo.list_clientes(),
            )
            .map_err(|err| {
                log::error!("Failed to load invoicing dashboard: {err}");
                err
            })?;
            vec![
                contador(role, "Pedidos", pedidos.len(), "pedidos"),
                contador(role, "Facturas", facturas.len(), "facturas"),
                contador(role, "Clientes", clientes.len(), "clientes"),
            ]
        }
        Role::Transportista | Role::Vendedor => {
            let rutas = repo
                .list_rutas_usuario(&user.identificacion)
                .await
                .map_err(|err| {
                    log::error!("Failed to load routes of {}: {err}", user.identificacion);
                    err
                })?;
            let conteo = conteo_rutas_propias(&rutas);
            vec![
                contador(role, "Mis rutas", conteo.total, "rutas"),
                contador(role, "Planificadas", conteo.planificadas, "rutas"),
                contador(role, "En ejecución", conteo.en_ejecucion, "rutas"),
                contador(role, "Completadas", conteo.completadas, "rutas"),
            ]
        }
    };

    Ok(HomePageData { contadores })
}
