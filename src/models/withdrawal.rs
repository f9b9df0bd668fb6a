// src/models/withdrawal.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

// Razones de retiro que maneja marketing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
pub enum WithdrawalReason {
    Entrega,
    Feria,
    Obsequio,
    #[sqlx(rename = "Activación Mall")]
    #[serde(rename = "Activación Mall")]
    ActivacionMall,
    #[sqlx(rename = "Reposición Sucursal")]
    #[serde(rename = "Reposición Sucursal")]
    ReposicionSucursal,
    #[sqlx(rename = "Evento Corporativo")]
    #[serde(rename = "Evento Corporativo")]
    EventoCorporativo,
    Otro,
}

impl WithdrawalReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            WithdrawalReason::Entrega => "Entrega",
            WithdrawalReason::Feria => "Feria",
            WithdrawalReason::Obsequio => "Obsequio",
            WithdrawalReason::ActivacionMall => "Activación Mall",
            WithdrawalReason::ReposicionSucursal => "Reposición Sucursal",
            WithdrawalReason::EventoCorporativo => "Evento Corporativo",
            WithdrawalReason::Otro => "Otro",
        }
    }
}

impl std::fmt::Display for WithdrawalReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// Un retiro es inmutable salvo la única transición completed -> reverted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum WithdrawalStatus {
    Completed,
    Reverted,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Withdrawal {
    pub id: Uuid,
    pub user_id: Uuid,
    pub authorized_by_id: Option<Uuid>,
    pub branch_id: Uuid,
    pub reason: WithdrawalReason,
    pub notes: Option<String>,
    pub status: WithdrawalStatus,
    pub timestamp: DateTime<Utc>,
}

// Línea ya expandida del retiro. `from_pack` conserva de qué pack salió;
// ambas referencias son débiles (un producto borrado queda colgando).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalItem {
    pub id: Uuid,
    pub withdrawal_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i64,
    pub from_pack: Option<Uuid>,
}

// Línea tal como la pide el frontend: un producto suelto o un pack completo.
#[derive(Debug, Clone, Serialize, Deserialize, validator::Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalLineInput {
    pub product_id: Option<Uuid>,
    pub pack_id: Option<Uuid>,
    #[validate(range(min = 1, message = "La cantidad debe ser mayor a cero."))]
    pub quantity: i64,
}

// Resultado de registrar un retiro.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalReceipt {
    pub withdrawal_id: Uuid,
    pub item_count: usize,
}

// --- Vistas enriquecidas para el historial ---

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalItemView {
    pub product_id: Uuid,
    pub quantity: i64,
    pub from_pack: Option<Uuid>,
    pub product_name: String,
    pub product_sku: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalView {
    pub id: Uuid,
    pub user_id: Uuid,
    pub authorized_by_id: Option<Uuid>,
    pub branch_id: Uuid,
    pub reason: WithdrawalReason,
    pub notes: Option<String>,
    pub status: WithdrawalStatus,
    pub timestamp: DateTime<Utc>,
    pub user_name: String,
    pub branch_name: String,
    pub authorizer_name: Option<String>,
    pub items: Vec<WithdrawalItemView>,
}
