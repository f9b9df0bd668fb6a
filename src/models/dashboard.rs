// src/models/dashboard.rs

use serde::Serialize;
use utoipa::ToSchema;

// Stock total por marca para el gráfico del panel.
#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct StockByBrand {
    #[serde(rename = "JAC")]
    pub jac: i64,
    #[serde(rename = "Jetour")]
    pub jetour: i64,
    #[serde(rename = "Karry")]
    pub karry: i64,
    #[serde(rename = "Corp")]
    pub corp: i64,
}

// Bandas de salud de stock: crítico = stock 0, reposición = 0 < stock <= mínimo,
// óptimo = stock > mínimo.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_products: i64,
    pub total_stock: i64,
    pub critical_products: i64,
    pub reorder_products: i64,
    pub optimal_products: i64,
    pub active_alerts: i64,
    pub active_packs: i64,
    pub stock_by_brand: StockByBrand,
}
