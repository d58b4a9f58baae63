// ── Store-to-domain type conversions ──
//
// Bridges raw `cuponera_api` record types into canonical
// `cuponera_core::model` domain types. Each `From` impl normalizes the
// Spanish wire columns, parses strings into strong types, and fills
// sensible defaults for missing optional data.

use cuponera_api::{CouponFields, OfferFields, Record};

use crate::model::{Coupon, CouponCode, CouponDraft, CouponStatus, Offer};

impl From<Record<CouponFields>> for Coupon {
    fn from(record: Record<CouponFields>) -> Self {
        let f = record.fields;
        // Rows written before status values were constrained can carry
        // arbitrary strings; anything unrecognized is treated as
        // available, matching how such rows have always been shown.
        let status =
            CouponStatus::from_store_value(&f.estado).unwrap_or(CouponStatus::Available);

        Coupon {
            id: record.id,
            owner_id: f.usuario_id,
            national_id: f.dui,
            code: CouponCode::new(f.codigo),
            offer_id: f.oferta_id,
            offer_title: f.titulo_oferta,
            merchant: f.empresa_ofertante,
            regular_price: f.precio_regular,
            offer_price: f.precio_oferta,
            purchased_at: f.fecha_compra,
            use_by: f.fecha_limite_uso,
            redeemed_at: f.fecha_canje,
            order_id: f.orden_id,
            status,
        }
    }
}

impl From<Record<OfferFields>> for Offer {
    fn from(record: Record<OfferFields>) -> Self {
        let f = record.fields;
        Offer {
            id: record.id,
            title: f.titulo,
            description: f.descripcion,
            image_url: f.imagen,
            regular_price: f.precio_regular,
            offer_price: f.precio_oferta,
            discount_percent: f.porcentaje_descuento,
            category: f.rubro,
            starts_at: f.fecha_inicio,
            sale_ends_at: f.fecha_expiracion,
            use_by: f.fecha_limite_uso,
            available: f.disponible,
            purchase_limit: f.limite_compra,
            sold_count: f.cupones_vendidos.unwrap_or(0),
            merchant: f.empresa_ofertante,
            company_code: f.codigo_empresa,
            details: f.otros_detalles,
        }
    }
}

impl From<CouponDraft> for CouponFields {
    fn from(draft: CouponDraft) -> Self {
        CouponFields {
            usuario_id: draft.owner_id,
            dui: draft.national_id,
            codigo: draft.code.as_str().to_owned(),
            oferta_id: Some(draft.offer_id),
            titulo_oferta: draft.offer_title,
            empresa_ofertante: draft.merchant,
            precio_regular: draft.regular_price,
            precio_oferta: draft.offer_price,
            fecha_compra: draft.purchased_at,
            fecha_limite_uso: draft.use_by,
            fecha_canje: None,
            orden_id: Some(draft.order_id),
            estado: CouponStatus::Available.as_store_value().to_owned(),
        }
    }
}
