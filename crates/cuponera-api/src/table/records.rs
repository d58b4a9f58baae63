// Raw wire record shapes for the table store.
//
// Field names follow the store's Spanish column names. Two backends fed
// this data historically and they disagreed on casing for a handful of
// columns, so the read path accepts every observed spelling via serde
// aliases. Canonical (drift-free) domain types live in `cuponera-core`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored record: store-assigned id plus the table's columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record<T> {
    pub id: String,
    pub fields: T,
}

/// List/read envelope: `{"records": [...]}`.
#[derive(Debug, Deserialize)]
pub(crate) struct RecordList<T> {
    pub records: Vec<Record<T>>,
}

/// Batch-create request body. Each entry is applied independently.
#[derive(Debug, Serialize)]
pub(crate) struct CreateRequest<T> {
    pub records: Vec<NewRecord<T>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct NewRecord<T> {
    pub fields: T,
}

/// Batch-create response: persisted records plus per-record failures.
#[derive(Debug, Deserialize)]
pub(crate) struct CreateResponse<T> {
    pub records: Vec<Record<T>>,
    #[serde(default)]
    pub failed: Vec<FailedRecord>,
}

/// One rejected entry from a batch create, by input index.
#[derive(Debug, Clone, Deserialize)]
pub struct FailedRecord {
    pub index: usize,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub message: Option<String>,
}

impl FailedRecord {
    /// Whether the store rejected this entry over a unique index.
    pub fn is_unique_violation(&self) -> bool {
        self.kind.as_deref() == Some(crate::error::UNIQUE_CONSTRAINT)
    }
}

/// Update request body for `PATCH .../records/{id}`.
#[derive(Debug, Serialize)]
pub(crate) struct UpdateRequest<T> {
    pub fields: T,
}

/// Error body: `{"error": {"type": "...", "message": "..."}}`.
#[derive(Debug, Deserialize)]
pub(crate) struct StoreErrorBody {
    pub error: Option<StoreErrorInner>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StoreErrorInner {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub message: Option<String>,
}

// ── Coupon columns ──────────────────────────────────────────────────

/// Raw `cupones` table columns.
///
/// `estado` stays a plain string here: both lowercase and capitalized
/// values exist in stored data and the core's converter decides what
/// they mean.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouponFields {
    #[serde(rename = "usuarioId", alias = "usuario_id", alias = "ownerId")]
    pub usuario_id: String,

    #[serde(rename = "dui", alias = "nationalId")]
    pub dui: String,

    pub codigo: String,

    #[serde(
        rename = "ofertaId",
        alias = "oferta_id",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub oferta_id: Option<String>,

    #[serde(rename = "tituloOferta", alias = "titulo_oferta")]
    pub titulo_oferta: String,

    #[serde(rename = "empresaOfertante", alias = "empresa")]
    pub empresa_ofertante: String,

    #[serde(rename = "precioRegular", alias = "precio_regular")]
    pub precio_regular: f64,

    #[serde(rename = "precioOferta", alias = "precio_oferta")]
    pub precio_oferta: f64,

    #[serde(rename = "fechaCompra", alias = "fecha_compra")]
    pub fecha_compra: DateTime<Utc>,

    #[serde(
        rename = "fechaLimiteUso",
        alias = "fecha_limite_uso",
        alias = "FechaLimiteUso"
    )]
    pub fecha_limite_uso: DateTime<Utc>,

    #[serde(
        rename = "fechaCanje",
        alias = "fecha_canje",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub fecha_canje: Option<DateTime<Utc>>,

    #[serde(
        rename = "ordenId",
        alias = "orden_id",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub orden_id: Option<String>,

    pub estado: String,
}

/// Partial update for the redemption status mutation.
#[derive(Debug, Clone, Serialize)]
pub struct CouponPatch {
    pub estado: String,
    #[serde(rename = "fechaCanje", skip_serializing_if = "Option::is_none")]
    pub fecha_canje: Option<DateTime<Utc>>,
}

// ── Offer columns ───────────────────────────────────────────────────

/// Raw `ofertas` table columns (read-only to this client).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfferFields {
    pub titulo: String,

    #[serde(default)]
    pub descripcion: Option<String>,

    #[serde(default)]
    pub imagen: Option<String>,

    #[serde(rename = "precioRegular", alias = "precio_regular")]
    pub precio_regular: f64,

    #[serde(rename = "precioOferta", alias = "precioDescuento", alias = "precio_oferta")]
    pub precio_oferta: f64,

    #[serde(
        rename = "porcentajeDescuento",
        alias = "porcentaje_descuento",
        default
    )]
    pub porcentaje_descuento: Option<f64>,

    pub rubro: String,

    #[serde(rename = "fechaInicio", alias = "fecha_inicio", default)]
    pub fecha_inicio: Option<DateTime<Utc>>,

    #[serde(rename = "fechaExpiracion", alias = "fecha_expiracion")]
    pub fecha_expiracion: DateTime<Utc>,

    #[serde(rename = "fechaLimiteUso", alias = "fecha_limite_uso", default)]
    pub fecha_limite_uso: Option<DateTime<Utc>>,

    pub disponible: bool,

    #[serde(rename = "limiteCompra", alias = "limite_compra", default)]
    pub limite_compra: Option<u32>,

    #[serde(rename = "cuponesVendidos", alias = "cupones_vendidos", default)]
    pub cupones_vendidos: Option<u32>,

    #[serde(rename = "empresaOfertante", alias = "empresa")]
    pub empresa_ofertante: String,

    #[serde(rename = "codigoEmpresa", alias = "codigo_empresa")]
    pub codigo_empresa: String,

    #[serde(rename = "otrosDetalles", alias = "otros_detalles", default)]
    pub otros_detalles: Option<String>,
}
