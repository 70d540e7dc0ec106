use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::domain::pedido::{ESTADOS_PEDIDO, LineaPedido};
use crate::forms::{FormError, blank_as_none, one_of};

#[derive(Debug, Deserialize, Validate)]
/// Order form; every product row posts one value into each line vector.
pub struct PedidoForm {
    #[validate(length(min = 1, message = "Seleccione un cliente"))]
    pub cod_cliente: String,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub numero_pedido: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub fecha_pedido: Option<String>,
    #[serde(default)]
    pub id_ubicacion_entrega: Option<i32>,
    #[serde(default)]
    pub id_ruta_venta: Option<i32>,
    #[serde(default)]
    pub id_ruta_entrega: Option<i32>,
    #[serde(default)]
    pub id_producto: Vec<i32>,
    #[serde(default)]
    pub cantidad: Vec<i32>,
    #[serde(default)]
    pub descuento: Vec<f64>,
}

impl PedidoForm {
    /// Zips the line vectors; a missing discount counts as zero.
    pub fn lineas(&self) -> Result<Vec<LineaPedido>, FormError> {
        if self.id_producto.is_empty() {
            return Err(FormError::SinLineas);
        }
        if self.cantidad.len() != self.id_producto.len()
            || self.descuento.len() > self.id_producto.len()
        {
            return Err(FormError::LineasIncompletas);
        }

        Ok(self
            .id_producto
            .iter()
            .zip(&self.cantidad)
            .enumerate()
            .map(|(i, (id_producto, cantidad))| LineaPedido {
                id_producto: *id_producto,
                cantidad: *cantidad,
                descuento: self.descuento.get(i).copied().unwrap_or(0.0),
            })
            .collect())
    }
}

fn estado_pedido(value: &str) -> Result<(), ValidationError> {
    one_of(value, &ESTADOS_PEDIDO, "Estado de pedido desconocido")
}

#[derive(Debug, Deserialize, Validate)]
/// New estado for an order.
pub struct EstadoForm {
    #[validate(custom(function = "estado_pedido"))]
    pub descripcion: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::parse;

    #[test]
    fn zips_repeated_line_fields() {
        let form: PedidoForm = parse(
            b"cod_cliente=CLI001&numero_pedido=&id_ubicacion_entrega=\
              &id_producto=1&cantidad=2&descuento=0.5&id_producto=3&cantidad=1",
        )
        .unwrap();
        assert_eq!(form.numero_pedido, None);
        assert_eq!(form.id_ubicacion_entrega, None);

        let lineas = form.lineas().unwrap();
        assert_eq!(lineas.len(), 2);
        assert_eq!(lineas[0].descuento, 0.5);
        assert_eq!(lineas[1].id_producto, 3);
        assert_eq!(lineas[1].descuento, 0.0);
    }

    #[test]
    fn rejects_missing_lines() {
        let form: PedidoForm = parse(b"cod_cliente=CLI001").unwrap();
        assert!(matches!(form.lineas(), Err(FormError::SinLineas)));

        let form: PedidoForm = parse(b"cod_cliente=CLI001&id_producto=1").unwrap();
        assert!(matches!(form.lineas(), Err(FormError::LineasIncompletas)));
    }

    #[test]
    fn estado_must_be_known() {
        let ok = EstadoForm {
            descripcion: "Despachado".to_string(),
        };
        assert!(ok.validate().is_ok());
        let unknown = EstadoForm {
            descripcion: "Perdido".to_string(),
        };
        assert!(unknown.validate().is_err());
    }
}
