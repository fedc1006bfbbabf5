use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::database::Order;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxBreakdown {
    #[serde(with = "rust_decimal::serde::float")]
    pub cgst: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub sgst: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub igst: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_tax: Decimal,
}

/// Read-time aggregate over one customer's orders. Never stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatistics {
    pub total_orders: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_revenue: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub average_order_value: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub pending_payments: Decimal,
    pub tax_breakdown: TaxBreakdown,
    pub status_counts: BTreeMap<String, i64>,
    pub payment_status_counts: BTreeMap<String, i64>,
    pub first_order_date: Option<DateTime<Utc>>,
    pub last_order_date: Option<DateTime<Utc>>,
}

impl OrderStatistics {
    /// Cancelled orders count toward the histograms and `totalOrders` but not toward money totals.
    pub fn compute(orders: &[Order]) -> Self {
        let mut stats = OrderStatistics {
            total_orders: orders.len() as i64,
            ..Default::default()
        };

        let mut billable = 0i64;
        for order in orders {
            *stats.status_counts.entry(order.status.to_lowercase()).or_insert(0) += 1;
            *stats
                .payment_status_counts
                .entry(order.payment_status.to_lowercase())
                .or_insert(0) += 1;

            stats.first_order_date = Some(match stats.first_order_date {
                Some(d) if d <= order.created_at => d,
                _ => order.created_at,
            });
            stats.last_order_date = Some(match stats.last_order_date {
                Some(d) if d >= order.created_at => d,
                _ => order.created_at,
            });

            if order.is_cancelled() {
                continue;
            }

            billable += 1;
            stats.total_revenue += order.total;
            stats.tax_breakdown.cgst += order.cgst;
            stats.tax_breakdown.sgst += order.sgst;
            stats.tax_breakdown.igst += order.igst;
            stats.tax_breakdown.total_tax += order.total_tax();

            if !order.is_paid() {
                let outstanding = order.total - order.amount_paid;
                if outstanding > Decimal::ZERO {
                    stats.pending_payments += outstanding;
                }
            }
        }

        if billable > 0 {
            stats.average_order_value = (stats.total_revenue / Decimal::from(billable)).round_dp(2);
        }

        stats
    }
}
