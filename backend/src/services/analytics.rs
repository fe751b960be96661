//! Sales analytics for the back-office dashboard
//!
//! Revenue figures skip cancelled orders. Every method takes the clock
//! reading so the windows can be pinned in tests.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Datelike, Duration, NaiveTime, TimeZone, Timelike, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use shared::{round_half_up, Money, Order, OrderItem, OrderStatus, Product};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::store::{
    collections, timestamp_value, DocumentStore, DocumentStoreExt, Query, SharedStore,
};

/// Upper bound on orders pulled for one aggregate
const SCAN_LIMIT: usize = 1000;
/// Longest daily sales window
const MAX_REPORT_DAYS: i64 = 3650;

/// Best seller of the month
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TopProduct {
    pub nombre: String,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct HourBucket {
    pub hour: u32,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DailySales {
    pub date: String,
    pub total: Money,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StatusCount {
    pub estado: OrderStatus,
    pub count: u64,
}

/// Dashboard headline figures
#[derive(Debug, Clone, Serialize)]
pub struct DashboardKpis {
    pub sales_today: Money,
    pub sales_month: Money,
    pub average_ticket: Money,
    pub total_orders: u64,
    pub top_product: Option<TopProduct>,
    pub peak_hour: String,
}

/// Analytics service
#[derive(Clone)]
pub struct AnalyticsService {
    store: SharedStore,
}

fn start_of_day(now: DateTime<Utc>) -> DateTime<Utc> {
    Utc.from_utc_datetime(&now.date_naive().and_time(NaiveTime::MIN))
}

fn start_of_month(now: DateTime<Utc>) -> DateTime<Utc> {
    let first = now.date_naive().with_day(1).unwrap_or_else(|| now.date_naive());
    Utc.from_utc_datetime(&first.and_time(NaiveTime::MIN))
}

impl AnalyticsService {
    /// Create a new AnalyticsService instance
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Non-cancelled orders created at or after `since`, oldest first
    async fn billable_since(&self, since: DateTime<Utc>) -> AppResult<Vec<Order>> {
        let query = Query::new()
            .greater_than_equal("fecha_creacion", timestamp_value(&since))
            .not_equal("estado", OrderStatus::Cancelado.as_str())
            .order_asc("fecha_creacion")
            .limit(SCAN_LIMIT);
        Ok(self.store.list_models(collections::ORDERS, query).await?)
    }

    pub async fn sales_today(&self, now: DateTime<Utc>) -> AppResult<Money> {
        let orders = self.billable_since(start_of_day(now)).await?;
        Ok(orders.iter().map(|o| o.total).sum::<Money>().normalize())
    }

    pub async fn sales_month(&self, now: DateTime<Utc>) -> AppResult<Money> {
        let orders = self.billable_since(start_of_month(now)).await?;
        Ok(orders.iter().map(|o| o.total).sum::<Money>().normalize())
    }

    /// Mean order total this month, rounded to a whole unit
    pub async fn average_ticket(&self, now: DateTime<Utc>) -> AppResult<Money> {
        let orders = self.billable_since(start_of_month(now)).await?;
        if orders.is_empty() {
            return Ok(Money::ZERO);
        }
        let total: Money = orders.iter().map(|o| o.total).sum();
        Ok(round_half_up(total / Decimal::from(orders.len() as u64)).normalize())
    }

    /// Orders placed this month in any state
    pub async fn total_orders(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let query = Query::new()
            .greater_than_equal("fecha_creacion", timestamp_value(&start_of_month(now)));
        Ok(self.store.count(collections::ORDERS, query).await?)
    }

    /// Product with the most units sold this month
    pub async fn top_product(&self, now: DateTime<Utc>) -> AppResult<Option<TopProduct>> {
        let orders = self.billable_since(start_of_month(now)).await?;
        if orders.is_empty() {
            return Ok(None);
        }

        let mut units: HashMap<Uuid, u64> = HashMap::new();
        for order in &orders {
            let query = Query::new().equal("pedido_id", order.id.to_string());
            let items: Vec<OrderItem> = self
                .store
                .list_models(collections::ORDER_ITEMS, query)
                .await?;
            for item in items {
                *units.entry(item.producto_id).or_default() += u64::from(item.cantidad);
            }
        }

        let Some((producto_id, count)) = units
            .into_iter()
            .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(&a.0)))
        else {
            return Ok(None);
        };

        let product: Option<Product> = self
            .store
            .get_model(collections::PRODUCTS, producto_id)
            .await?;
        Ok(Some(TopProduct {
            nombre: product
                .map(|p| p.nombre)
                .unwrap_or_else(|| "Desconocido".to_string()),
            count,
        }))
    }

    /// Orders per hour of day (UTC) over the last 30 days
    pub async fn peak_hours(&self, now: DateTime<Utc>) -> AppResult<Vec<HourBucket>> {
        let orders = self.billable_since(now - Duration::days(30)).await?;
        let mut counts = [0u64; 24];
        for order in &orders {
            counts[order.fecha_creacion.hour() as usize] += 1;
        }
        Ok(counts
            .iter()
            .enumerate()
            .map(|(hour, count)| HourBucket {
                hour: hour as u32,
                count: *count,
            })
            .collect())
    }

    /// Busiest hour as `"<h>:00"`; the earliest hour wins ties
    pub async fn peak_hour(&self, now: DateTime<Utc>) -> AppResult<String> {
        let buckets = self.peak_hours(now).await?;
        Ok(format!("{}:00", busiest(&buckets)))
    }

    /// Revenue per calendar day for days that had orders
    pub async fn daily_sales(&self, now: DateTime<Utc>, days: i64) -> AppResult<Vec<DailySales>> {
        if !(1..=MAX_REPORT_DAYS).contains(&days) {
            return Err(AppError::invalid_field(
                "days",
                &format!("Days must be between 1 and {}", MAX_REPORT_DAYS),
                &format!("Los días deben estar entre 1 y {}", MAX_REPORT_DAYS),
            ));
        }
        let orders = self.billable_since(now - Duration::days(days)).await?;

        let mut by_day: BTreeMap<String, (Money, u64)> = BTreeMap::new();
        for order in &orders {
            let entry = by_day
                .entry(order.fecha_creacion.format("%Y-%m-%d").to_string())
                .or_insert((Money::ZERO, 0));
            entry.0 += order.total;
            entry.1 += 1;
        }

        Ok(by_day
            .into_iter()
            .map(|(date, (total, count))| DailySales {
                date,
                total: total.normalize(),
                count,
            })
            .collect())
    }

    /// Order count for every state, in lifecycle order
    pub async fn orders_by_status(&self) -> AppResult<Vec<StatusCount>> {
        let mut counts = Vec::with_capacity(OrderStatus::ALL.len());
        for estado in OrderStatus::ALL {
            let query = Query::new().equal("estado", estado.as_str());
            counts.push(StatusCount {
                estado,
                count: self.store.count(collections::ORDERS, query).await?,
            });
        }
        Ok(counts)
    }

    pub async fn kpis(&self, now: DateTime<Utc>) -> AppResult<DashboardKpis> {
        Ok(DashboardKpis {
            sales_today: self.sales_today(now).await?,
            sales_month: self.sales_month(now).await?,
            average_ticket: self.average_ticket(now).await?,
            total_orders: self.total_orders(now).await?,
            top_product: self.top_product(now).await?,
            peak_hour: self.peak_hour(now).await?,
        })
    }

    /// Daily sales as CSV with a `date,total,count` header
    pub async fn daily_sales_csv(&self, now: DateTime<Utc>, days: i64) -> AppResult<String> {
        let rows = self.daily_sales(now, days).await?;
        export_to_csv(&rows)
    }
}

fn busiest(buckets: &[HourBucket]) -> u32 {
    buckets
        .iter()
        .fold(None::<&HourBucket>, |best, b| match best {
            Some(current) if current.count >= b.count => Some(current),
            _ => Some(b),
        })
        .map(|b| b.hour)
        .unwrap_or(0)
}

/// Serialize rows as CSV
pub fn export_to_csv<T: Serialize>(rows: &[T]) -> AppResult<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    for row in rows {
        writer
            .serialize(row)
            .map_err(|e| AppError::Internal(format!("CSV serialization error: {}", e)))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::Internal(format!("CSV writer error: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| AppError::Internal(format!("UTF-8 conversion error: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;
    use shared::PaymentMethod;
    use std::sync::Arc;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    struct Seed {
        service: AnalyticsService,
        store: SharedStore,
    }

    fn seed() -> Seed {
        let store: SharedStore = Arc::new(InMemoryStore::new());
        Seed {
            service: AnalyticsService::new(store.clone()),
            store,
        }
    }

    async fn order(seed: &Seed, total: i64, estado: OrderStatus, fecha: DateTime<Utc>) -> Order {
        let order = Order {
            id: Uuid::new_v4(),
            numero_pedido: format!("JM2603-{:05}", total),
            cliente_id: None,
            subtotal: Money::from(total),
            impuestos: Money::ZERO,
            envio: Money::ZERO,
            descuento: Money::ZERO,
            total: Money::from(total),
            estado,
            direccion_entrega: None,
            metodo_pago: PaymentMethod::Efectivo,
            fecha_creacion: fecha,
            fecha_actualizacion: fecha,
        };
        seed.store
            .create_model(collections::ORDERS, order.id, &order)
            .await
            .unwrap();
        order
    }

    async fn item(seed: &Seed, pedido_id: Uuid, producto_id: Uuid, cantidad: u32) {
        let item = OrderItem {
            id: Uuid::new_v4(),
            pedido_id,
            producto_id,
            cantidad,
            precio_unitario: Money::from(1000),
            total_item: Money::from(1000 * cantidad as i64),
        };
        seed.store
            .create_model(collections::ORDER_ITEMS, item.id, &item)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_sales_windows_skip_cancelled() {
        let seed = seed();
        let now = at(2026, 3, 15, 18);
        order(&seed, 20000, OrderStatus::Entregado, at(2026, 3, 15, 12)).await;
        order(&seed, 10000, OrderStatus::Nuevo, at(2026, 3, 2, 20)).await;
        order(&seed, 99000, OrderStatus::Cancelado, at(2026, 3, 15, 13)).await;
        order(&seed, 50000, OrderStatus::Entregado, at(2026, 2, 27, 12)).await;

        assert_eq!(seed.service.sales_today(now).await.unwrap(), Money::from(20000));
        assert_eq!(seed.service.sales_month(now).await.unwrap(), Money::from(30000));
        assert_eq!(seed.service.average_ticket(now).await.unwrap(), Money::from(15000));
        // Cancelled orders still count as orders placed
        assert_eq!(seed.service.total_orders(now).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_average_ticket_rounds_half_up() {
        let seed = seed();
        let now = at(2026, 3, 15, 18);
        order(&seed, 1000, OrderStatus::Nuevo, at(2026, 3, 10, 9)).await;
        order(&seed, 1001, OrderStatus::Nuevo, at(2026, 3, 10, 9)).await;
        assert_eq!(seed.service.average_ticket(now).await.unwrap(), Money::from(1001));
        assert_eq!(seed.service.average_ticket(at(2026, 5, 1, 0)).await.unwrap(), Money::ZERO);
    }

    #[tokio::test]
    async fn test_top_product_and_unknown_name() {
        let seed = seed();
        let now = at(2026, 3, 15, 18);
        let a = order(&seed, 1000, OrderStatus::Nuevo, at(2026, 3, 10, 9)).await;
        let b = order(&seed, 1000, OrderStatus::Nuevo, at(2026, 3, 11, 9)).await;
        let gone = Uuid::new_v4();
        item(&seed, a.id, gone, 2).await;
        item(&seed, b.id, gone, 3).await;
        item(&seed, b.id, Uuid::new_v4(), 4).await;

        let top = seed.service.top_product(now).await.unwrap().unwrap();
        assert_eq!(
            top,
            TopProduct {
                nombre: "Desconocido".to_string(),
                count: 5
            }
        );
    }

    #[tokio::test]
    async fn test_peak_hours_and_daily_sales() {
        let seed = seed();
        let now = at(2026, 3, 15, 23);
        order(&seed, 1000, OrderStatus::Nuevo, at(2026, 3, 14, 13)).await;
        order(&seed, 2000, OrderStatus::Nuevo, at(2026, 3, 14, 13)).await;
        order(&seed, 3000, OrderStatus::Nuevo, at(2026, 3, 15, 19)).await;

        let buckets = seed.service.peak_hours(now).await.unwrap();
        assert_eq!(buckets.len(), 24);
        assert_eq!(buckets[13].count, 2);
        assert_eq!(seed.service.peak_hour(now).await.unwrap(), "13:00");

        let daily = seed.service.daily_sales(now, 30).await.unwrap();
        assert_eq!(daily.len(), 2);
        assert_eq!(daily[0].date, "2026-03-14");
        assert_eq!(daily[0].total, Money::from(3000));
        assert_eq!(daily[0].count, 2);

        let csv = seed.service.daily_sales_csv(now, 30).await.unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("date,total,count"));
        assert_eq!(lines.next(), Some("2026-03-14,3000,2"));
    }

    #[tokio::test]
    async fn test_daily_sales_rejects_out_of_range_days() {
        let seed = seed();
        let now = at(2026, 3, 15, 18);
        for days in [0, -1, MAX_REPORT_DAYS + 1, 1_000_000_000, i64::MAX] {
            assert!(matches!(
                seed.service.daily_sales(now, days).await.unwrap_err(),
                AppError::Validation { ref field, .. } if field == "days"
            ));
        }
        assert!(seed.service.daily_sales(now, MAX_REPORT_DAYS).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_store() {
        let seed = seed();
        let now = at(2026, 3, 15, 18);
        assert_eq!(seed.service.peak_hour(now).await.unwrap(), "0:00");
        assert!(seed.service.top_product(now).await.unwrap().is_none());
        let by_status = seed.service.orders_by_status().await.unwrap();
        assert_eq!(by_status.len(), 6);
        assert!(by_status.iter().all(|s| s.count == 0));
    }
}
