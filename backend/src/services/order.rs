//! Order lifecycle manager
//!
//! Creates orders (order, line items, first history entry) and moves them
//! through the status state machine. The store has no multi-document
//! transactions, so creation runs as a saga: when a later write fails the
//! earlier ones are deleted again, unless compatibility mode is configured.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use shared::{
    replay_history, CartItem, Money, Order, OrderItem, OrderStatus, PaymentMethod, PricingPolicy,
    StatusHistoryEntry,
};
use uuid::Uuid;

use crate::config::{BoardConfig, Config, OrdersConfig};
use crate::error::{AppError, AppResult};
use crate::services::notification::NotificationService;
use crate::services::order_number::{format_order_number, random_suffix};
use crate::store::{
    collections, timestamp_value, DocumentStore, DocumentStoreExt, Query, SharedStore, StoreError,
};

/// Actor recorded on the creation entry of a guest order
pub const SYSTEM_ACTOR: &str = "system";

/// Default page size for order listings
const DEFAULT_LIST_LIMIT: usize = 100;

/// Order service
#[derive(Clone)]
pub struct OrderService {
    store: SharedStore,
    pricing: PricingPolicy,
    orders: OrdersConfig,
    board: BoardConfig,
    notifications: NotificationService,
}

/// Everything needed to place an order
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub items: Vec<CartItem>,
    pub discount: Money,
    pub direccion_entrega: Option<String>,
    pub metodo_pago: PaymentMethod,
    pub cliente_id: Option<String>,
    pub include_shipping: bool,
}

/// Filters for listing orders
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderFilter {
    pub estado: Option<OrderStatus>,
    pub cliente_id: Option<String>,
    pub limit: Option<usize>,
}

/// One kanban column
#[derive(Debug, Clone, Serialize)]
pub struct BoardColumn {
    pub estado: OrderStatus,
    pub label: &'static str,
    pub color: &'static str,
    pub pedidos: Vec<Order>,
}

/// Kanban projection of the newest orders.
///
/// A client polling every `refresh_interval_secs` sees data at most that old
/// plus one request latency.
#[derive(Debug, Clone, Serialize)]
pub struct BoardSnapshot {
    #[serde(with = "shared::types::timestamp")]
    pub generated_at: DateTime<Utc>,
    pub refresh_interval_secs: u64,
    pub columns: Vec<BoardColumn>,
}

/// Customer tracking page
#[derive(Debug, Clone, Serialize)]
pub struct OrderTracking {
    pub pedido: Order,
    pub items: Vec<OrderItem>,
    pub historial: Vec<StatusHistoryEntry>,
}

/// Consistency report for a single order
#[derive(Debug, Clone, Serialize)]
pub struct OrderAudit {
    pub pedido_id: Uuid,
    pub estado: OrderStatus,
    pub historial_valido: bool,
    pub estado_coincide: bool,
    pub totales_consistentes: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub problema: Option<String>,
}

impl OrderService {
    /// Create a new OrderService instance
    pub fn new(store: SharedStore, config: &Config) -> Self {
        Self {
            notifications: NotificationService::new(store.clone(), &config.notifications),
            store,
            pricing: config.pricing.policy(),
            orders: config.orders.clone(),
            board: config.board.clone(),
        }
    }

    pub fn pricing(&self) -> &PricingPolicy {
        &self.pricing
    }

    // ========================================================================
    // Creation
    // ========================================================================

    /// Price the cart and persist the order, its items and its first history entry
    pub async fn create_order(&self, new_order: NewOrder) -> AppResult<Order> {
        if new_order.items.is_empty() {
            return Err(AppError::invalid_field(
                "items",
                "An order needs at least one item",
                "El pedido debe tener al menos un producto",
            ));
        }

        let totals = self.pricing.calculate_totals(
            &new_order.items,
            new_order.discount,
            new_order.include_shipping,
        )?;
        let now = Utc::now();
        let numero_pedido = self.generate_order_number(now).await?;

        let order = Order {
            id: Uuid::new_v4(),
            numero_pedido,
            cliente_id: new_order.cliente_id,
            subtotal: totals.subtotal,
            impuestos: totals.impuestos,
            envio: totals.envio,
            descuento: totals.descuento,
            total: totals.total,
            estado: OrderStatus::Nuevo,
            direccion_entrega: new_order
                .direccion_entrega
                .filter(|d| !d.trim().is_empty()),
            metodo_pago: new_order.metodo_pago,
            fecha_creacion: now,
            fecha_actualizacion: now,
        };

        // Nothing written yet: a failure here is a plain persistence error
        self.store
            .create_model(collections::ORDERS, order.id, &order)
            .await?;
        let mut written = vec![(collections::ORDERS, order.id)];

        for item in &new_order.items {
            let line = OrderItem {
                id: Uuid::new_v4(),
                pedido_id: order.id,
                producto_id: item.producto.id,
                cantidad: item.cantidad,
                precio_unitario: item.producto.precio,
                total_item: item.line_total().normalize(),
            };
            if let Err(e) = self
                .store
                .create_model(collections::ORDER_ITEMS, line.id, &line)
                .await
            {
                return Err(self
                    .abort_creation(order.id, "writing items", written, e)
                    .await);
            }
            written.push((collections::ORDER_ITEMS, line.id));
        }

        let entry = StatusHistoryEntry {
            id: Uuid::new_v4(),
            pedido_id: order.id,
            estado_anterior: None,
            estado_nuevo: OrderStatus::Nuevo,
            fecha: now,
            cambiado_por: order
                .cliente_id
                .clone()
                .unwrap_or_else(|| SYSTEM_ACTOR.to_string()),
        };
        if let Err(e) = self
            .store
            .create_model(collections::STATUS_HISTORY, entry.id, &entry)
            .await
        {
            return Err(self
                .abort_creation(order.id, "recording history", written, e)
                .await);
        }

        tracing::info!(
            order_id = %order.id,
            numero_pedido = %order.numero_pedido,
            total = %order.total,
            "Order created"
        );

        if let Err(e) = self.notifications.notify_new_order(&order).await {
            tracing::warn!("Failed to notify new order {}: {}", order.numero_pedido, e);
        }

        Ok(order)
    }

    /// Undo the writes of a failed creation (unless in compatibility mode)
    async fn abort_creation(
        &self,
        order_id: Uuid,
        stage: &'static str,
        written: Vec<(&'static str, Uuid)>,
        source: StoreError,
    ) -> AppError {
        let compensated = if self.orders.compensate_partial_failures {
            let mut undone = true;
            for (collection, id) in written.iter().rev() {
                if let Err(e) = self.store.delete(collection, *id).await {
                    tracing::error!("Failed to roll back {} {}: {}", collection, id, e);
                    undone = false;
                }
            }
            undone
        } else {
            false
        };

        tracing::error!(
            order_id = %order_id,
            stage,
            compensated,
            "Order creation failed partway: {}",
            source
        );

        AppError::PartialOrder {
            order_id,
            stage,
            compensated,
            source,
        }
    }

    /// Draw order numbers until one is unused
    async fn generate_order_number(&self, now: DateTime<Utc>) -> AppResult<String> {
        for _ in 0..self.orders.order_number_attempts.max(1) {
            let candidate = format_order_number(now, &random_suffix());
            let taken = self
                .store
                .count(
                    collections::ORDERS,
                    Query::new().equal("numero_pedido", candidate.as_str()),
                )
                .await?;
            if taken == 0 {
                return Ok(candidate);
            }
            tracing::warn!("Order number {} already taken, drawing another", candidate);
        }

        Err(AppError::Conflict {
            resource: "numero_pedido".to_string(),
            message: "Could not allocate a unique order number".to_string(),
            message_es: "No se pudo asignar un número de pedido único".to_string(),
        })
    }

    // ========================================================================
    // Status transitions
    // ========================================================================

    /// Move an order to `nuevo_estado` and record who did it
    pub async fn transition(
        &self,
        order_id: Uuid,
        nuevo_estado: OrderStatus,
        actor: &str,
    ) -> AppResult<Order> {
        let order = self.get(order_id).await?;
        let anterior = order.estado;
        anterior.validate_transition(nuevo_estado)?;

        let now = Utc::now();
        let patch = json!({
            "estado": nuevo_estado.as_str(),
            "fecha_actualizacion": timestamp_value(&now),
        });
        let updated: Order = self
            .store
            .update_if(
                collections::ORDERS,
                order_id,
                "estado",
                json!(anterior.as_str()),
                patch,
            )
            .await?
            .ok_or_else(|| AppError::Conflict {
                resource: "estado".to_string(),
                message: format!(
                    "Order {} changed while it was being updated",
                    order.numero_pedido
                ),
                message_es: format!(
                    "El pedido {} cambió mientras se actualizaba",
                    order.numero_pedido
                ),
            })?
            .into_model()?;

        let entry = StatusHistoryEntry {
            id: Uuid::new_v4(),
            pedido_id: order_id,
            estado_anterior: Some(anterior),
            estado_nuevo: nuevo_estado,
            fecha: now,
            cambiado_por: actor.to_string(),
        };
        if let Err(e) = self
            .store
            .create_model(collections::STATUS_HISTORY, entry.id, &entry)
            .await
        {
            self.revert_transition(&order, nuevo_estado).await;
            return Err(e.into());
        }

        tracing::info!(
            order_id = %order_id,
            from = anterior.as_str(),
            to = nuevo_estado.as_str(),
            actor,
            "Order status changed"
        );

        if let Some(cliente_id) = &updated.cliente_id {
            if let Err(e) = self
                .notifications
                .notify_order_status_change(cliente_id, &updated, nuevo_estado)
                .await
            {
                tracing::warn!(
                    "Failed to notify customer about order {}: {}",
                    updated.numero_pedido,
                    e
                );
            }
        }

        Ok(updated)
    }

    /// Put the previous status back when its history entry could not be written
    async fn revert_transition(&self, original: &Order, applied: OrderStatus) {
        let patch = json!({
            "estado": original.estado.as_str(),
            "fecha_actualizacion": timestamp_value(&original.fecha_actualizacion),
        });
        match self
            .store
            .update_if(
                collections::ORDERS,
                original.id,
                "estado",
                json!(applied.as_str()),
                patch,
            )
            .await
        {
            Ok(Some(_)) => {}
            Ok(None) => tracing::error!(
                "Order {} moved on before its status could be reverted",
                original.id
            ),
            Err(e) => tracing::error!("Failed to revert status of order {}: {}", original.id, e),
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub async fn get(&self, order_id: Uuid) -> AppResult<Order> {
        self.store
            .get_model(collections::ORDERS, order_id)
            .await?
            .ok_or(AppError::OrderNotFound(order_id))
    }

    /// Newest orders first
    pub async fn list(&self, filter: OrderFilter) -> AppResult<Vec<Order>> {
        let mut query = Query::new()
            .order_desc("fecha_creacion")
            .limit(filter.limit.unwrap_or(DEFAULT_LIST_LIMIT));
        if let Some(estado) = filter.estado {
            query = query.equal("estado", estado.as_str());
        }
        if let Some(cliente_id) = filter.cliente_id {
            query = query.equal("cliente_id", cliente_id);
        }

        Ok(self.store.list_models(collections::ORDERS, query).await?)
    }

    pub async fn items(&self, order_id: Uuid) -> AppResult<Vec<OrderItem>> {
        self.get(order_id).await?;
        let query = Query::new().equal("pedido_id", order_id.to_string());
        Ok(self
            .store
            .list_models(collections::ORDER_ITEMS, query)
            .await?)
    }

    /// History entries, oldest first
    pub async fn history(&self, order_id: Uuid) -> AppResult<Vec<StatusHistoryEntry>> {
        self.get(order_id).await?;
        let query = Query::new()
            .equal("pedido_id", order_id.to_string())
            .order_asc("fecha");
        Ok(self
            .store
            .list_models(collections::STATUS_HISTORY, query)
            .await?)
    }

    /// Kanban board. Cancelled orders are left off.
    pub async fn board(&self) -> AppResult<BoardSnapshot> {
        let query = Query::new()
            .not_equal("estado", OrderStatus::Cancelado.as_str())
            .order_desc("fecha_creacion")
            .limit(self.board.fetch_limit);
        let orders: Vec<Order> = self.store.list_models(collections::ORDERS, query).await?;

        let columns = OrderStatus::BOARD_COLUMNS
            .iter()
            .map(|estado| BoardColumn {
                estado: *estado,
                label: estado.label(),
                color: estado.color(),
                pedidos: orders
                    .iter()
                    .filter(|o| o.estado == *estado)
                    .cloned()
                    .collect(),
            })
            .collect();

        Ok(BoardSnapshot {
            generated_at: Utc::now(),
            refresh_interval_secs: self.board.refresh_interval_secs,
            columns,
        })
    }

    /// Orders touched after `since`, oldest change first
    pub async fn changes(&self, since: DateTime<Utc>) -> AppResult<Vec<Order>> {
        let query = Query::new()
            .greater_than("fecha_actualizacion", timestamp_value(&since))
            .order_asc("fecha_actualizacion")
            .limit(self.board.fetch_limit);
        Ok(self.store.list_models(collections::ORDERS, query).await?)
    }

    pub async fn tracking(&self, order_id: Uuid) -> AppResult<OrderTracking> {
        let pedido = self.get(order_id).await?;
        let items = self.items(order_id).await?;
        let historial = self.history(order_id).await?;
        Ok(OrderTracking {
            pedido,
            items,
            historial,
        })
    }

    /// Replay the history and compare it with the stored order
    pub async fn audit(&self, order_id: Uuid) -> AppResult<OrderAudit> {
        let order = self.get(order_id).await?;
        let history = self.history(order_id).await?;

        let (historial_valido, estado_coincide, problema) = match replay_history(&history) {
            Ok(replayed) if replayed == order.estado => (true, true, None),
            Ok(replayed) => (
                true,
                false,
                Some(format!(
                    "history ends in {} but the order is {}",
                    replayed, order.estado
                )),
            ),
            Err(e) => (false, false, Some(e.to_string())),
        };

        Ok(OrderAudit {
            pedido_id: order.id,
            estado: order.estado,
            historial_valido,
            estado_coincide,
            totales_consistentes: order.totals_consistent(),
            problema,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;
    use shared::ProductSnapshot;
    use std::sync::Arc;

    struct Fixture {
        memory: Arc<InMemoryStore>,
        service: OrderService,
        notifications: NotificationService,
    }

    fn fixture_with(config: Config) -> Fixture {
        let memory = Arc::new(InMemoryStore::new());
        let store: SharedStore = memory.clone();
        Fixture {
            service: OrderService::new(store.clone(), &config),
            notifications: NotificationService::new(store, &config.notifications),
            memory,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(Config::for_tests())
    }

    fn line(precio: i64, cantidad: u32) -> CartItem {
        CartItem::new(
            ProductSnapshot {
                id: Uuid::new_v4(),
                nombre: "Plato".to_string(),
                precio: Money::from(precio),
            },
            cantidad,
        )
    }

    fn new_order(cliente_id: Option<&str>) -> NewOrder {
        NewOrder {
            items: vec![line(10000, 2), line(3000, 1)],
            discount: Money::ZERO,
            direccion_entrega: Some("Calle 10 #5-20".to_string()),
            metodo_pago: PaymentMethod::Efectivo,
            cliente_id: cliente_id.map(str::to_string),
            include_shipping: true,
        }
    }

    async fn walk(service: &OrderService, id: Uuid, path: &[OrderStatus]) {
        for estado in path {
            service.transition(id, *estado, "admin").await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_create_order_persists_items_and_history() {
        let f = fixture();
        let order = f.service.create_order(new_order(None)).await.unwrap();

        assert_eq!(order.estado, OrderStatus::Nuevo);
        assert_eq!(order.subtotal, Money::from(23000));
        assert_eq!(order.impuestos, Money::from(1840));
        assert_eq!(order.envio, Money::from(5000));
        assert_eq!(order.total, Money::from(29840));
        assert!(order.totals_consistent());

        let items = f.service.items(order.id).await.unwrap();
        assert_eq!(items.len(), 2);
        assert!(items.iter().any(|i| i.total_item == Money::from(20000)));

        let history = f.service.history(order.id).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].estado_anterior, None);
        assert_eq!(history[0].cambiado_por, SYSTEM_ACTOR);

        let inbox = f.notifications.list("admin").await.unwrap();
        assert_eq!(inbox.len(), 1);
        assert!(inbox[0].mensaje.contains(&order.numero_pedido));
    }

    #[tokio::test]
    async fn test_create_order_requires_items() {
        let f = fixture();
        let mut input = new_order(None);
        input.items.clear();
        let err = f.service.create_order(input).await.unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_full_lifecycle_history_is_valid_walk() {
        let f = fixture();
        let order = f.service.create_order(new_order(Some("cliente-7"))).await.unwrap();
        walk(
            &f.service,
            order.id,
            &[
                OrderStatus::Confirmado,
                OrderStatus::EnPreparacion,
                OrderStatus::EnCamino,
                OrderStatus::Entregado,
            ],
        )
        .await;

        let history = f.service.history(order.id).await.unwrap();
        assert_eq!(history.len(), 5);
        assert_eq!(history[0].cambiado_por, "cliente-7");
        assert_eq!(replay_history(&history).unwrap(), OrderStatus::Entregado);

        let stored = f.service.get(order.id).await.unwrap();
        assert_eq!(stored.estado, OrderStatus::Entregado);
        assert!(stored.totals_consistent());

        let audit = f.service.audit(order.id).await.unwrap();
        assert!(audit.historial_valido && audit.estado_coincide && audit.totales_consistentes);

        // One status notification per transition
        let inbox = f.notifications.list("cliente-7").await.unwrap();
        assert_eq!(inbox.len(), 4);
    }

    #[tokio::test]
    async fn test_terminal_states_reject_every_target() {
        let f = fixture();
        let delivered = f.service.create_order(new_order(None)).await.unwrap();
        walk(
            &f.service,
            delivered.id,
            &[
                OrderStatus::Confirmado,
                OrderStatus::EnPreparacion,
                OrderStatus::EnCamino,
                OrderStatus::Entregado,
            ],
        )
        .await;
        let cancelled = f.service.create_order(new_order(None)).await.unwrap();
        walk(&f.service, cancelled.id, &[OrderStatus::Cancelado]).await;

        for id in [delivered.id, cancelled.id] {
            let before = f.service.get(id).await.unwrap();
            for target in OrderStatus::ALL {
                let err = f.service.transition(id, target, "admin").await.unwrap_err();
                assert!(matches!(err, AppError::InvalidTransition(_)));
            }
            assert_eq!(f.service.get(id).await.unwrap(), before);
        }
    }

    #[tokio::test]
    async fn test_out_for_delivery_cannot_be_cancelled() {
        let f = fixture();
        let order = f.service.create_order(new_order(None)).await.unwrap();
        walk(
            &f.service,
            order.id,
            &[
                OrderStatus::Confirmado,
                OrderStatus::EnPreparacion,
                OrderStatus::EnCamino,
            ],
        )
        .await;

        match f
            .service
            .transition(order.id, OrderStatus::Cancelado, "admin")
            .await
        {
            Err(AppError::InvalidTransition(e)) => {
                assert_eq!(e.from, OrderStatus::EnCamino);
                assert_eq!(e.allowed, vec![OrderStatus::Entregado]);
            }
            other => panic!("expected InvalidTransition, got {:?}", other),
        }
        assert_eq!(
            f.service.get(order.id).await.unwrap().estado,
            OrderStatus::EnCamino
        );
    }

    #[tokio::test]
    async fn test_unknown_order() {
        let f = fixture();
        let id = Uuid::new_v4();
        let err = f
            .service
            .transition(id, OrderStatus::Confirmado, "admin")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::OrderNotFound(missing) if missing == id));
        assert!(matches!(
            f.service.tracking(id).await.unwrap_err(),
            AppError::OrderNotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_partial_creation_is_rolled_back() {
        let f = fixture();
        f.memory.fail_collection(collections::STATUS_HISTORY).await;

        let err = f.service.create_order(new_order(None)).await.unwrap_err();
        match err {
            AppError::PartialOrder {
                stage, compensated, ..
            } => {
                assert_eq!(stage, "recording history");
                assert!(compensated);
            }
            other => panic!("expected PartialOrder, got {:?}", other),
        }

        assert_eq!(f.memory.count(collections::ORDERS, Query::new()).await.unwrap(), 0);
        assert_eq!(
            f.memory
                .count(collections::ORDER_ITEMS, Query::new())
                .await
                .unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn test_partial_creation_left_in_place_in_compat_mode() {
        let mut config = Config::for_tests();
        config.orders.compensate_partial_failures = false;
        let f = fixture_with(config);
        f.memory.fail_collection(collections::ORDER_ITEMS).await;

        let err = f.service.create_order(new_order(None)).await.unwrap_err();
        let order_id = match err {
            AppError::PartialOrder {
                order_id,
                stage,
                compensated,
                ..
            } => {
                assert_eq!(stage, "writing items");
                assert!(!compensated);
                order_id
            }
            other => panic!("expected PartialOrder, got {:?}", other),
        };

        // The orphan order is still there, without items or history
        f.memory.clear_faults().await;
        assert!(f.service.get(order_id).await.is_ok());
        assert!(f.service.items(order_id).await.unwrap().is_empty());
        let audit = f.service.audit(order_id).await.unwrap();
        assert!(!audit.historial_valido);
    }

    #[tokio::test]
    async fn test_failed_order_write_is_plain_persistence_error() {
        let f = fixture();
        f.memory.fail_collection(collections::ORDERS).await;
        let err = f.service.create_order(new_order(None)).await.unwrap_err();
        assert!(matches!(err, AppError::Persistence(_)));
    }

    #[tokio::test]
    async fn test_transition_reverted_when_history_fails() {
        let f = fixture();
        let order = f.service.create_order(new_order(None)).await.unwrap();
        f.memory.fail_collection(collections::STATUS_HISTORY).await;

        let err = f
            .service
            .transition(order.id, OrderStatus::Confirmado, "admin")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Persistence(_)));

        f.memory.clear_faults().await;
        let stored = f.service.get(order.id).await.unwrap();
        assert_eq!(stored.estado, OrderStatus::Nuevo);
        assert!(f.service.audit(order.id).await.unwrap().estado_coincide);
    }

    #[tokio::test]
    async fn test_board_excludes_cancelled_orders() {
        let f = fixture();
        let kept = f.service.create_order(new_order(None)).await.unwrap();
        let confirmed = f.service.create_order(new_order(None)).await.unwrap();
        let dropped = f.service.create_order(new_order(None)).await.unwrap();
        walk(&f.service, confirmed.id, &[OrderStatus::Confirmado]).await;
        walk(&f.service, dropped.id, &[OrderStatus::Cancelado]).await;

        let board = f.service.board().await.unwrap();
        assert_eq!(board.refresh_interval_secs, 15);
        assert_eq!(board.columns.len(), 5);
        assert!(board.columns.iter().all(|c| c.estado != OrderStatus::Cancelado));

        let ids: Vec<Uuid> = board
            .columns
            .iter()
            .flat_map(|c| c.pedidos.iter().map(|o| o.id))
            .collect();
        assert!(ids.contains(&kept.id));
        assert!(ids.contains(&confirmed.id));
        assert!(!ids.contains(&dropped.id));
        assert_eq!(board.columns[1].pedidos[0].id, confirmed.id);
    }

    #[tokio::test]
    async fn test_changes_since() {
        let f = fixture();
        let old = f.service.create_order(new_order(None)).await.unwrap();
        let since = Utc::now();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let fresh = f.service.create_order(new_order(None)).await.unwrap();

        let changed = f.service.changes(since).await.unwrap();
        assert_eq!(changed.len(), 1);
        assert_eq!(changed[0].id, fresh.id);

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let since = Utc::now();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        walk(&f.service, old.id, &[OrderStatus::Confirmado]).await;
        let changed = f.service.changes(since).await.unwrap();
        assert_eq!(changed.len(), 1);
        assert_eq!(changed[0].id, old.id);
    }

    #[tokio::test]
    async fn test_list_filters() {
        let f = fixture();
        let mine = f.service.create_order(new_order(Some("cliente-1"))).await.unwrap();
        f.service.create_order(new_order(Some("cliente-2"))).await.unwrap();
        walk(&f.service, mine.id, &[OrderStatus::Confirmado]).await;

        let by_customer = f
            .service
            .list(OrderFilter {
                cliente_id: Some("cliente-1".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_customer.len(), 1);

        let confirmed = f
            .service
            .list(OrderFilter {
                estado: Some(OrderStatus::Confirmado),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(confirmed.len(), 1);
        assert_eq!(confirmed[0].id, mine.id);

        let limited = f
            .service
            .list(OrderFilter {
                limit: Some(1),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(limited.len(), 1);
    }
}
