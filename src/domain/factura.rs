use serde::{Deserialize, Serialize};

use crate::domain::types::string_or_number;

/// Client summary embedded in an invoice.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct FacturaCliente {
    #[serde(default)]
    pub nombre: String,
    #[serde(default)]
    pub razon_social: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
pub struct Factura {
    pub id_factura: i32,
    pub cod_cliente: String,
    #[serde(deserialize_with = "string_or_number")]
    pub numero_factura: String,
    pub fecha_emision: String,
    #[serde(default)]
    pub estado: String,
    pub subtotal: f64,
    pub iva: f64,
    pub total: f64,
    #[serde(default)]
    pub cliente: Option<FacturaCliente>,
}

impl Factura {
    pub fn nombre_cliente(&self) -> &str {
        self.cliente.as_ref().map_or("", |c| c.nombre.as_str())
    }
}

/// Invoices whose número, client code or client name contains the term.
pub fn filtrar_facturas<'a>(facturas: &'a [Factura], term: &str) -> Vec<&'a Factura> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return facturas.iter().collect();
    }
    facturas
        .iter()
        .filter(|f| {
            f.numero_factura.to_lowercase().contains(&term)
                || f.cod_cliente.to_lowercase().contains(&term)
                || f.nombre_cliente().to_lowercase().contains(&term)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_and_numeric_numbers() {
        let json = r#"[
            {"id_factura": 1, "cod_cliente": "C1", "numero_factura": 1001,
             "fecha_emision": "2024-05-01", "estado": "emitida",
             "subtotal": 10, "iva": 1.2, "total": 11.2,
             "cliente": {"nombre": "Tienda Rosita", "razon_social": "Rosita S.A."}},
            {"id_factura": 2, "cod_cliente": "C2", "numero_factura": "F-2002",
             "fecha_emision": "2024-05-02", "subtotal": 5, "iva": 0.6, "total": 5.6}
        ]"#;
        let facturas: Vec<Factura> = serde_json::from_str(json).unwrap();

        assert_eq!(facturas[0].numero_factura, "1001");
        assert_eq!(filtrar_facturas(&facturas, "ROSITA")[0].id_factura, 1);
        assert_eq!(filtrar_facturas(&facturas, "f-2002")[0].id_factura, 2);
        assert_eq!(filtrar_facturas(&facturas, "c2")[0].id_factura, 2);
        assert_eq!(filtrar_facturas(&facturas, " ").len(), 2);
    }
}
