// src/models/report.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use utoipa::ToSchema;

use crate::models::withdrawal::{WithdrawalReason, WithdrawalStatus};

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReasonCount {
    pub reason: WithdrawalReason,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BranchCount {
    pub branch: String,
    pub count: i64,
}

// Una línea del reporte de auditoría: un producto retirado, con todo el
// contexto del retiro al que pertenece.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuditReportRow {
    pub fecha: String,
    pub hora: String,
    pub sucursal: String,
    pub usuario: String,
    pub autorizador: String,
    pub razon: WithdrawalReason,
    pub producto: String,
    pub sku: String,
    pub cantidad: i64,
    pub estado: WithdrawalStatus,
    pub notas: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuditReportSummary {
    pub total_withdrawals: usize,
    pub total_items: i64,
    pub by_reason: BTreeMap<String, i64>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuditReportDateRange {
    pub start: String,
    pub end: String,
}

// El reporte devuelve datos listos para exportar; el formato final
// (PDF/CSV) lo arma el consumidor externo.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuditReport {
    pub generated_at: DateTime<Utc>,
    pub date_range: AuditReportDateRange,
    pub summary: AuditReportSummary,
    pub rows: Vec<AuditReportRow>,
}
