use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};

use crate::domain::cliente::Cliente;
use crate::domain::pedido::{
    ESTADOS_PEDIDO, EstadoPedido, NewEstadoPedido, NewPedido, Pedido, UpdatePedido, caja,
    calcular_totales, estado_actual, estados_actuales, filtrar_pedidos, numero_por_defecto,
    parse_fecha,
};
use crate::domain::producto::Producto;
use crate::domain::types::non_blank;
use crate::domain::usuario::Role;
use crate::dto::catalogo::SearchQuery;
use crate::dto::pedidos::{
    CajaPageData, FilaPedido, LineaDetalle, PedidoDetalle, PedidoFormData, PedidosPageData,
};
use crate::forms::pedidos::{EstadoForm, PedidoForm};
use crate::models::auth::AuthenticatedUser;
use crate::pagination::{DEFAULT_ITEMS_PER_PAGE, Paginated};
use crate::repository::{
    ClienteReader, PedidoReader, PedidoWriter, ProductoReader, UbicacionReader,
};
use crate::services::{ServiceError, ServiceResult, check_role, validate_form};

const READERS: &[Role] = &[
    Role::Admin,
    Role::Facturador,
    Role::Transportista,
    Role::Vendedor,
];
const CREATORS: &[Role] = &[Role::Admin, Role::Vendedor, Role::Facturador];
const STATUS_EDITORS: &[Role] = &[Role::Admin, Role::Facturador, Role::Transportista];

fn filas(
    pedidos: Vec<&Pedido>,
    clientes: &[Cliente],
    actuales: &HashMap<i32, &EstadoPedido>,
) -> Vec<FilaPedido> {
    pedidos
        .into_iter()
        .map(|pedido| FilaPedido {
            cliente: clientes
                .iter()
                .find(|c| c.cod_cliente == pedido.cod_cliente)
                .map_or_else(|| pedido.cod_cliente.clone(), |c| c.nombre.clone()),
            estado: estado_actual(actuales, pedido.id_pedido).to_string(),
            pedido: pedido.clone(),
        })
        .collect()
}

/// Orders list with their client and current estado.
pub async fn list_pedidos<R>(
    repo: &R,
    user: &AuthenticatedUser,
    query: SearchQuery,
) -> ServiceResult<PedidosPageData>
where
    R: PedidoReader + ClienteReader,
{
    check_role(user, READERS)?;

    let (pedidos, clientes, estados) = futures::try_join!(
        repo.list_pedidos(),
        repo.list_clientes(),
        repo.list_estados_pedido(),
    )
    .map_err(|err| {
        log::error!("Failed to load orders: {err}");
        err
    })?;

    let search_query = query.term();
    let actuales = estados_actuales(&estados);
    let visibles = filtrar_pedidos(
        &pedidos,
        &clientes,
        search_query.as_deref().unwrap_or_default(),
    );

    Ok(PedidosPageData {
        pedidos: Paginated::from_all(
            filas(visibles, &clientes, &actuales),
            query.page.unwrap_or(1),
            DEFAULT_ITEMS_PER_PAGE,
        ),
        search_query,
    })
}

pub async fn load_pedido_form<R>(
    repo: &R,
    user: &AuthenticatedUser,
    id_pedido: Option<i32>,
) -> ServiceResult<PedidoFormData>
where
    R: PedidoReader + ClienteReader + ProductoReader + UbicacionReader,
{
    check_role(user, CREATORS)?;

    let (clientes, productos, ubicaciones) = futures::try_join!(
        repo.list_clientes(),
        repo.list_productos(),
        repo.list_ubicaciones(),
    )?;
    let pedido = match id_pedido {
        Some(id) => Some(repo.get_pedido(id).await?.ok_or(ServiceError::NotFound)?),
        None => None,
    };

    Ok(PedidoFormData {
        pedido,
        clientes,
        productos: productos.into_iter().filter(Producto::is_active).collect(),
        ubicaciones,
    })
}

/// Prices the submitted lines for the selected client.
async fn build_pedido<R>(
    repo: &R,
    form: PedidoForm,
    now: DateTime<Utc>,
) -> ServiceResult<NewPedido>
where
    R: ClienteReader + ProductoReader,
{
    validate_form(&form)?;
    let lineas = form
        .lineas()
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    let cod_cliente = form.cod_cliente.trim().to_string();
    let (cliente, productos) =
        futures::try_join!(repo.get_cliente(&cod_cliente), repo.list_productos())?;
    let cliente = cliente
        .ok_or_else(|| ServiceError::Form("El cliente seleccionado no existe".to_string()))?;

    let totales = calcular_totales(&lineas, &productos, cliente.is_juridico())
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    let fecha_pedido = non_blank(form.fecha_pedido)
        .filter(|f| parse_fecha(f).is_some())
        .unwrap_or_else(|| now.format("%Y-%m-%d").to_string());

    Ok(NewPedido {
        numero_pedido: non_blank(form.numero_pedido)
            .unwrap_or_else(|| numero_por_defecto(now)),
        fecha_pedido,
        cod_cliente,
        subtotal: totales.subtotal,
        iva: totales.iva,
        total: totales.total,
        id_ubicacion_entrega: form.id_ubicacion_entrega,
        id_ruta_venta: form.id_ruta_venta,
        id_ruta_entrega: form.id_ruta_entrega,
        detalle_pedido: totales.detalles,
    })
}

pub async fn create_pedido<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: PedidoForm,
    now: DateTime<Utc>,
) -> ServiceResult<Pedido>
where
    R: ClienteReader + ProductoReader + PedidoWriter,
{
    check_role(user, CREATORS)?;

    let pedido = build_pedido(repo, form, now).await?;
    let created = repo.create_pedido(&pedido).await.map_err(|err| {
        log::error!("Failed to create order {}: {err}", pedido.numero_pedido);
        err
    })?;
    log::info!(
        "Order {} created for {} by {}",
        created.numero_pedido,
        created.cod_cliente,
        user.identificacion
    );
    Ok(created)
}

pub async fn update_pedido<R>(
    repo: &R,
    user: &AuthenticatedUser,
    id_pedido: i32,
    form: PedidoForm,
    now: DateTime<Utc>,
) -> ServiceResult<Pedido>
where
    R: ClienteReader + ProductoReader + PedidoWriter,
{
    check_role(user, CREATORS)?;

    let pedido = UpdatePedido::from(build_pedido(repo, form, now).await?);
    let updated = repo
        .update_pedido(id_pedido, &pedido)
        .await
        .map_err(|err| {
            log::error!("Failed to update order {id_pedido}: {err}");
            err
        })?;
    Ok(updated)
}

pub async fn delete_pedido<R>(
    repo: &R,
    user: &AuthenticatedUser,
    id_pedido: i32,
) -> ServiceResult<()>
where
    R: PedidoWriter,
{
    check_role(user, &[Role::Admin])?;

    repo.delete_pedido(id_pedido).await.map_err(|err| {
        log::error!("Failed to delete order {id_pedido}: {err}");
        err
    })?;
    Ok(())
}

/// Order with named lines and its estado history.
pub async fn load_pedido<R>(
    repo: &R,
    user: &AuthenticatedUser,
    id_pedido: i32,
) -> ServiceResult<PedidoDetalle>
where
    R: PedidoReader + ClienteReader + ProductoReader,
{
    let role = check_role(user, READERS)?;

    let pedido = repo
        .get_pedido(id_pedido)
        .await?
        .ok_or(ServiceError::NotFound)?;
    let (cliente, productos, estados) = futures::try_join!(
        repo.get_cliente(&pedido.cod_cliente),
        repo.list_productos(),
        repo.list_estados_pedido(),
    )?;

    let lineas = pedido
        .detalles
        .clone()
        .unwrap_or_default()
        .into_iter()
        .map(|detalle| LineaDetalle {
            producto: productos
                .iter()
                .find(|p| p.id_producto == detalle.id_producto)
                .map_or_else(
                    || format!("Producto {}", detalle.id_producto),
                    |p| p.nombre.clone(),
                ),
            detalle,
        })
        .collect();

    let actual = estado_actual(&estados_actuales(&estados), id_pedido).to_string();
    let mut historial: Vec<EstadoPedido> = estados
        .into_iter()
        .filter(|e| e.id_pedido == Some(id_pedido))
        .collect();
    historial.sort_by(|a, b| {
        (parse_fecha(&b.fecha_actualizada), b.id_estado_pedido)
            .cmp(&(parse_fecha(&a.fecha_actualizada), a.id_estado_pedido))
    });

    Ok(PedidoDetalle {
        pedido,
        cliente,
        lineas,
        estados: historial,
        estado_actual: actual,
        estados_disponibles: if STATUS_EDITORS.contains(&role) {
            ESTADOS_PEDIDO.to_vec()
        } else {
            Vec::new()
        },
    })
}

/// Records a new estado dated `hoy`.
pub async fn add_estado<R>(
    repo: &R,
    user: &AuthenticatedUser,
    id_pedido: i32,
    form: EstadoForm,
    hoy: NaiveDate,
) -> ServiceResult<EstadoPedido>
where
    R: PedidoWriter,
{
    check_role(user, STATUS_EDITORS)?;
    validate_form(&form)?;

    let descripcion = ESTADOS_PEDIDO
        .iter()
        .find(|e| e.eq_ignore_ascii_case(form.descripcion.trim()))
        .map_or_else(|| form.descripcion.trim().to_string(), |e| (*e).to_string());
    let estado = NewEstadoPedido {
        id_pedido,
        descripcion,
        fecha_actualizada: hoy.format("%Y-%m-%d").to_string(),
    };

    let created = repo.create_estado_pedido(&estado).await.map_err(|err| {
        log::error!("Failed to record estado of order {id_pedido}: {err}");
        err
    })?;
    Ok(created)
}

/// Orders placed on `hoy` and their summed totals.
pub async fn load_caja<R>(
    repo: &R,
    user: &AuthenticatedUser,
    hoy: NaiveDate,
) -> ServiceResult<CajaPageData>
where
    R: PedidoReader + ClienteReader,
{
    check_role(user, &[Role::Admin, Role::Vendedor])?;

    let (pedidos, clientes, estados) = futures::try_join!(
        repo.list_pedidos(),
        repo.list_clientes(),
        repo.list_estados_pedido(),
    )?;

    let actuales = estados_actuales(&estados);
    let (del_dia, resumen) = caja(&pedidos, hoy);

    Ok(CajaPageData {
        pedidos: filas(del_dia, &clientes, &actuales),
        resumen,
    })
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use chrono::TimeZone;

    use super::*;
    use crate::domain::pedido::DetallePedido;
    use crate::domain::ubicacion::UbicacionCliente;
    use crate::repository::errors::RepositoryResult;
    use crate::services::test_support::user_with_role;

    #[derive(Default)]
    struct FakeRepo {
        pedidos: Vec<Pedido>,
        clientes: Vec<Cliente>,
        productos: Vec<Producto>,
        estados: Vec<EstadoPedido>,
        created: RefCell<Vec<NewPedido>>,
        updated: RefCell<Vec<(i32, UpdatePedido)>>,
        estados_creados: RefCell<Vec<NewEstadoPedido>>,
    }

    impl PedidoReader for FakeRepo {
        async fn list_pedidos(&self) -> RepositoryResult<Vec<Pedido>> {
            Ok(self.pedidos.clone())
        }

        async fn get_pedido(&self, id_pedido: i32) -> RepositoryResult<Option<Pedido>> {
            Ok(self
                .pedidos
                .iter()
                .find(|p| p.id_pedido == id_pedido)
                .cloned())
        }

        async fn list_estados_pedido(&self) -> RepositoryResult<Vec<EstadoPedido>> {
            Ok(self.estados.clone())
        }
    }

    impl PedidoWriter for FakeRepo {
        async fn create_pedido(&self, pedido: &NewPedido) -> RepositoryResult<Pedido> {
            self.created.borrow_mut().push(pedido.clone());
            Ok(Pedido {
                id_pedido: 50,
                numero_pedido: pedido.numero_pedido.clone(),
                cod_cliente: pedido.cod_cliente.clone(),
                total: pedido.total,
                ..Default::default()
            })
        }

        async fn update_pedido(
            &self,
            id_pedido: i32,
            pedido: &UpdatePedido,
        ) -> RepositoryResult<Pedido> {
            self.updated.borrow_mut().push((id_pedido, pedido.clone()));
            Ok(Pedido {
                id_pedido,
                ..Default::default()
            })
        }

        async fn delete_pedido(&self, _id_pedido: i32) -> RepositoryResult<()> {
            Ok(())
        }

        async fn create_estado_pedido(
            &self,
            estado: &NewEstadoPedido,
        ) -> RepositoryResult<EstadoPedido> {
            self.estados_creados.borrow_mut().push(estado.clone());
            Ok(EstadoPedido {
                id_estado_pedido: 99,
                id_pedido: Some(estado.id_pedido),
                descripcion: estado.descripcion.clone(),
                fecha_actualizada: estado.fecha_actualizada.clone(),
            })
        }
    }

    impl ClienteReader for FakeRepo {
        async fn list_clientes(&self) -> RepositoryResult<Vec<Cliente>> {
            Ok(self.clientes.clone())
        }

        async fn get_cliente(&self, cod_cliente: &str) -> RepositoryResult<Option<Cliente>> {
            Ok(self
                .clientes
                .iter()
                .find(|c| c.cod_cliente == cod_cliente)
                .cloned())
        }

        async fn list_clientes_con_ubicaciones(
            &self,
        ) -> RepositoryResult<Vec<(Cliente, Vec<UbicacionCliente>)>> {
            Ok(vec![])
        }
    }

    impl ProductoReader for FakeRepo {
        async fn list_productos(&self) -> RepositoryResult<Vec<Producto>> {
            Ok(self.productos.clone())
        }

        async fn get_producto(&self, id_producto: i32) -> RepositoryResult<Option<Producto>> {
            Ok(self
                .productos
                .iter()
                .find(|p| p.id_producto == id_producto)
                .cloned())
        }

        async fn catalogo_pdf(&self) -> RepositoryResult<Vec<u8>> {
            Ok(vec![])
        }
    }

    impl UbicacionReader for FakeRepo {
        async fn list_ubicaciones(&self) -> RepositoryResult<Vec<UbicacionCliente>> {
            Ok(vec![])
        }

        async fn get_ubicacion(
            &self,
            _id_ubicacion: i32,
        ) -> RepositoryResult<Option<UbicacionCliente>> {
            Ok(None)
        }

        async fn list_ubicaciones_cliente(
            &self,
            _cod_cliente: &str,
        ) -> RepositoryResult<Vec<UbicacionCliente>> {
            Ok(vec![])
        }
    }

    fn cliente(cod: &str, nombre: &str, tipo: &str) -> Cliente {
        Cliente {
            cod_cliente: cod.to_string(),
            nombre: nombre.to_string(),
            tipo_cliente: tipo.to_string(),
            ..Default::default()
        }
    }

    fn producto(id: i32, nombre: &str, mayorista: f64, minorista: f64, estado: &str) -> Producto {
        Producto {
            id_producto: id,
            nombre: nombre.to_string(),
            precio_mayorista: mayorista,
            precio_minorista: minorista,
            estado: estado.to_string(),
            stock: "50".to_string(),
            ..Default::default()
        }
    }

    fn pedido(id: i32, numero: &str, cod: &str, fecha: &str, total: f64) -> Pedido {
        Pedido {
            id_pedido: id,
            numero_pedido: numero.to_string(),
            fecha_pedido: fecha.to_string(),
            cod_cliente: cod.to_string(),
            subtotal: total,
            iva: 0.0,
            total,
            ..Default::default()
        }
    }

    fn estado(id: i32, id_pedido: i32, descripcion: &str, fecha: &str) -> EstadoPedido {
        EstadoPedido {
            id_estado_pedido: id,
            id_pedido: Some(id_pedido),
            descripcion: descripcion.to_string(),
            fecha_actualizada: fecha.to_string(),
        }
    }

    fn repo() -> FakeRepo {
        let mut con_detalles = pedido(2, "PED-002", "C2", "2024-05-02", 10.0);
        con_detalles.detalles = Some(vec![DetallePedido {
            id_producto: 1,
            cantidad: 2,
            precio_unitario: 5.0,
            subtotal: 10.0,
            ..Default::default()
        }]);
        FakeRepo {
            pedidos: vec![
                pedido(1, "PED-001", "C1", "2024-05-01T09:00:00", 11.2),
                con_detalles,
                pedido(3, "PED-003", "C1", "2024-05-02T18:30:00", 5.5),
            ],
            clientes: vec![
                cliente("C1", "Tienda Ana", "natural"),
                cliente("C2", "Distribuidora Sur", "juridico"),
            ],
            productos: vec![
                producto(1, "Leche", 4.0, 5.0, "activo"),
                producto(2, "Queso", 3.0, 4.0, "inactivo"),
            ],
            estados: vec![
                estado(1, 2, "Facturado", "2024-05-02"),
                estado(2, 2, "Despachado", "2024-05-03"),
                estado(3, 1, "Facturado", "2024-05-01"),
            ],
            ..Default::default()
        }
    }

    fn form(cod: &str, lineas: &[(i32, i32, f64)]) -> PedidoForm {
        PedidoForm {
            cod_cliente: cod.to_string(),
            numero_pedido: None,
            fecha_pedido: None,
            id_ubicacion_entrega: None,
            id_ruta_venta: None,
            id_ruta_entrega: None,
            id_producto: lineas.iter().map(|l| l.0).collect(),
            cantidad: lineas.iter().map(|l| l.1).collect(),
            descuento: lineas.iter().map(|l| l.2).collect(),
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 2, 15, 0, 0).unwrap()
    }

    #[actix_web::test]
    async fn list_shows_client_name_and_current_estado() {
        let data = list_pedidos(
            &repo(),
            &user_with_role("Transportista"),
            SearchQuery {
                q: Some("sur".to_string()),
                page: None,
            },
        )
        .await
        .unwrap();

        assert_eq!(data.pedidos.total, 1);
        let fila = &data.pedidos.items[0];
        assert_eq!(fila.cliente, "Distribuidora Sur");
        assert_eq!(fila.estado, "Despachado");

        let todos = list_pedidos(&repo(), &user_with_role("Admin"), SearchQuery::default())
            .await
            .unwrap();
        assert_eq!(todos.pedidos.items[2].estado, "Sin estado");
    }

    #[actix_web::test]
    async fn warehouse_cannot_see_orders() {
        let result =
            list_pedidos(&repo(), &user_with_role("Bodeguero"), SearchQuery::default()).await;
        assert!(matches!(result, Err(ServiceError::Unauthorized)));
    }

    #[actix_web::test]
    async fn create_prices_lines_for_the_client() {
        let repo = repo();
        let creado = create_pedido(
            &repo,
            &user_with_role("Vendedor"),
            form("C2", &[(1, 3, 2.0)]),
            now(),
        )
        .await
        .unwrap();
        assert_eq!(creado.id_pedido, 50);

        let enviado = &repo.created.borrow()[0];
        assert_eq!(enviado.numero_pedido, format!("PED-{}", now().timestamp_millis()));
        assert_eq!(enviado.fecha_pedido, "2024-05-02");
        assert_eq!(enviado.detalle_pedido[0].precio_unitario, 4.0);
        assert_eq!(enviado.subtotal, 10.0);
        assert_eq!(enviado.iva, 1.2);
        assert_eq!(enviado.total, 11.2);
    }

    #[actix_web::test]
    async fn create_rejects_bad_lines() {
        let repo = repo();
        let user = user_with_role("Admin");

        match create_pedido(&repo, &user, form("C1", &[]), now()).await {
            Err(ServiceError::Form(message)) => {
                assert_eq!(message, "Debe agregar al menos un producto")
            }
            other => panic!("unexpected {other:?}"),
        }
        match create_pedido(&repo, &user, form("C1", &[(1, 1, 9.0)]), now()).await {
            Err(ServiceError::Form(message)) => assert_eq!(
                message,
                "El descuento no puede ser negativo ni mayor al valor de la línea"
            ),
            other => panic!("unexpected {other:?}"),
        }
        match create_pedido(&repo, &user, form("NOPE", &[(1, 1, 0.0)]), now()).await {
            Err(ServiceError::Form(message)) => {
                assert_eq!(message, "El cliente seleccionado no existe")
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(repo.created.borrow().is_empty());
    }

    #[actix_web::test]
    async fn update_keeps_given_number_and_date() {
        let repo = repo();
        let mut form = form("C1", &[(1, 2, 0.0)]);
        form.numero_pedido = Some("PED-001".to_string());
        form.fecha_pedido = Some("2024-05-01".to_string());

        update_pedido(&repo, &user_with_role("Facturador"), 1, form, now())
            .await
            .unwrap();

        let (id, enviado) = &repo.updated.borrow()[0];
        assert_eq!(*id, 1);
        assert_eq!(enviado.numero_pedido, "PED-001");
        assert_eq!(enviado.fecha_pedido, "2024-05-01");
        assert_eq!(enviado.detalles[0].precio_unitario, 5.0);
    }

    #[actix_web::test]
    async fn detail_names_lines_and_orders_history() {
        let detalle = load_pedido(&repo(), &user_with_role("Facturador"), 2)
            .await
            .unwrap();

        assert_eq!(detalle.lineas[0].producto, "Leche");
        assert_eq!(detalle.estado_actual, "Despachado");
        assert_eq!(detalle.estados[0].descripcion, "Despachado");
        assert_eq!(detalle.estados.len(), 2);
        assert_eq!(detalle.estados_disponibles, ESTADOS_PEDIDO.to_vec());
        assert_eq!(detalle.cliente.map(|c| c.nombre), Some("Distribuidora Sur".to_string()));

        let vendedor = load_pedido(&repo(), &user_with_role("Vendedor"), 2)
            .await
            .unwrap();
        assert!(vendedor.estados_disponibles.is_empty());

        let missing = load_pedido(&repo(), &user_with_role("Admin"), 9).await;
        assert!(matches!(missing, Err(ServiceError::NotFound)));
    }

    #[actix_web::test]
    async fn estado_is_dated_today_and_canonical() {
        let repo = repo();
        let hoy = NaiveDate::from_ymd_opt(2024, 5, 4).unwrap();
        add_estado(
            &repo,
            &user_with_role("Transportista"),
            2,
            EstadoForm {
                descripcion: "entregado".to_string(),
            },
            hoy,
        )
        .await
        .unwrap();

        assert_eq!(
            repo.estados_creados.borrow()[0],
            NewEstadoPedido {
                id_pedido: 2,
                descripcion: "Entregado".to_string(),
                fecha_actualizada: "2024-05-04".to_string(),
            }
        );

        let invalido = add_estado(
            &repo,
            &user_with_role("Admin"),
            2,
            EstadoForm {
                descripcion: "Perdido".to_string(),
            },
            hoy,
        )
        .await;
        assert!(matches!(invalido, Err(ServiceError::Form(_))));

        let vendedor = add_estado(
            &repo,
            &user_with_role("Vendedor"),
            2,
            EstadoForm {
                descripcion: "Entregado".to_string(),
            },
            hoy,
        )
        .await;
        assert!(matches!(vendedor, Err(ServiceError::Unauthorized)));
    }

    #[actix_web::test]
    async fn caja_sums_todays_orders() {
        let hoy = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();
        let data = load_caja(&repo(), &user_with_role("Vendedor"), hoy)
            .await
            .unwrap();

        assert_eq!(data.resumen.cantidad, 2);
        assert_eq!(data.resumen.total, 15.5);
        assert_eq!(data.pedidos[1].cliente, "Tienda Ana");
    }
}
