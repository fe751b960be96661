//! Notification service
//!
//! Every notification is stored in the recipient's inbox. Email and push
//! copies go to the outbound relay when one is configured, and are only
//! logged otherwise.

use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use shared::{Notification, NotificationChannel, NotificationKind, Order, OrderStatus, Product};
use uuid::Uuid;
use validator::Validate;

use crate::config::NotificationsConfig;
use crate::error::{AppError, AppResult};
use crate::external::webhook::{DeliveryRequest, WebhookClient};
use crate::store::{collections, DocumentStore, DocumentStoreExt, Query, SharedStore};

/// Inbox page size
const LIST_LIMIT: usize = 50;

/// Notification service
#[derive(Clone)]
pub struct NotificationService {
    store: SharedStore,
    relay: Option<WebhookClient>,
    admin_user_id: String,
}

/// Input for sending a notification
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SendNotificationInput {
    #[validate(length(min = 1))]
    pub usuario_id: String,
    pub tipo: NotificationKind,
    #[validate(length(min = 1, max = 200))]
    pub titulo: String,
    #[validate(length(max = 1000))]
    pub mensaje: String,
    #[serde(default = "default_channels")]
    pub canales: Vec<NotificationChannel>,
}

fn default_channels() -> Vec<NotificationChannel> {
    vec![NotificationChannel::Internal]
}

impl NotificationService {
    /// Create a new NotificationService instance
    pub fn new(store: SharedStore, config: &NotificationsConfig) -> Self {
        Self {
            store,
            relay: config.webhook_url.clone().map(WebhookClient::new),
            admin_user_id: config.admin_user_id.clone(),
        }
    }

    pub fn admin_user_id(&self) -> &str {
        &self.admin_user_id
    }

    // ========================================================================
    // Delivery
    // ========================================================================

    /// Store the notification, then fan out to the external channels
    pub async fn send(&self, input: SendNotificationInput) -> AppResult<Notification> {
        input.validate()?;

        let notification = Notification {
            id: Uuid::new_v4(),
            usuario_id: input.usuario_id,
            tipo: input.tipo,
            titulo: input.titulo,
            mensaje: input.mensaje,
            leida: false,
            fecha: Utc::now(),
        };
        self.store
            .create_model(collections::NOTIFICATIONS, notification.id, &notification)
            .await?;

        for channel in input
            .canales
            .iter()
            .filter(|c| **c != NotificationChannel::Internal)
        {
            self.deliver_external(*channel, &notification).await;
        }

        Ok(notification)
    }

    async fn deliver_external(&self, channel: NotificationChannel, notification: &Notification) {
        let Some(relay) = &self.relay else {
            tracing::info!(
                channel = channel.as_str(),
                to = %notification.usuario_id,
                "{}: {}",
                notification.titulo,
                notification.mensaje
            );
            return;
        };

        let request = DeliveryRequest {
            channel: channel.as_str().to_string(),
            to: notification.usuario_id.clone(),
            title: notification.titulo.clone(),
            message: notification.mensaje.clone(),
        };
        if let Err(e) = relay.deliver(&request).await {
            tracing::warn!(
                "Failed to deliver {} notification {}: {}",
                channel.as_str(),
                notification.id,
                e
            );
        }
    }

    // ========================================================================
    // Inbox
    // ========================================================================

    /// Newest notifications for a user
    pub async fn list(&self, usuario_id: &str) -> AppResult<Vec<Notification>> {
        let query = Query::new()
            .equal("usuario_id", usuario_id)
            .order_desc("fecha")
            .limit(LIST_LIMIT);
        Ok(self
            .store
            .list_models(collections::NOTIFICATIONS, query)
            .await?)
    }

    pub async fn list_unread(&self, usuario_id: &str) -> AppResult<Vec<Notification>> {
        let query = Query::new()
            .equal("usuario_id", usuario_id)
            .equal("leida", false)
            .order_desc("fecha")
            .limit(LIST_LIMIT);
        Ok(self
            .store
            .list_models(collections::NOTIFICATIONS, query)
            .await?)
    }

    pub async fn unread_count(&self, usuario_id: &str) -> AppResult<u64> {
        let query = Query::new()
            .equal("usuario_id", usuario_id)
            .equal("leida", false);
        Ok(self.store.count(collections::NOTIFICATIONS, query).await?)
    }

    /// Mark one of the user's notifications as read
    pub async fn mark_as_read(&self, usuario_id: &str, id: Uuid) -> AppResult<()> {
        let notification: Notification = self
            .store
            .get_model(collections::NOTIFICATIONS, id)
            .await?
            .filter(|n: &Notification| n.usuario_id == usuario_id)
            .ok_or_else(|| AppError::NotFound("Notification".to_string()))?;

        if !notification.leida {
            self.store
                .update(collections::NOTIFICATIONS, id, json!({ "leida": true }))
                .await?;
        }
        Ok(())
    }

    /// Mark every unread notification as read; returns how many changed
    pub async fn mark_all_as_read(&self, usuario_id: &str) -> AppResult<u64> {
        let query = Query::new()
            .equal("usuario_id", usuario_id)
            .equal("leida", false);
        let unread = self.store.list(collections::NOTIFICATIONS, query).await?;

        let mut updated = 0;
        for doc in unread {
            self.store
                .update(collections::NOTIFICATIONS, doc.id, json!({ "leida": true }))
                .await?;
            updated += 1;
        }
        Ok(updated)
    }

    // ========================================================================
    // Pre-built events
    // ========================================================================

    pub async fn notify_new_order(&self, order: &Order) -> AppResult<Notification> {
        self.send(SendNotificationInput {
            usuario_id: self.admin_user_id.clone(),
            tipo: NotificationKind::PedidoNuevo,
            titulo: "Nuevo Pedido".to_string(),
            mensaje: format!("Se ha recibido el pedido #{}", order.numero_pedido),
            canales: vec![NotificationChannel::Internal, NotificationChannel::Push],
        })
        .await
    }

    pub async fn notify_order_status_change(
        &self,
        cliente_id: &str,
        order: &Order,
        nuevo_estado: OrderStatus,
    ) -> AppResult<Notification> {
        self.send(SendNotificationInput {
            usuario_id: cliente_id.to_string(),
            tipo: NotificationKind::EstadoPedido,
            titulo: "Actualización de Pedido".to_string(),
            mensaje: format!(
                "Tu pedido #{} ha cambiado a: {}",
                order.numero_pedido,
                nuevo_estado.label()
            ),
            canales: default_channels(),
        })
        .await
    }

    pub async fn notify_low_stock(&self, product: &Product) -> AppResult<Notification> {
        self.send(SendNotificationInput {
            usuario_id: self.admin_user_id.clone(),
            tipo: NotificationKind::StockBajo,
            titulo: "Stock Bajo".to_string(),
            mensaje: format!(
                "{} tiene solo {} unidades restantes",
                product.nombre, product.stock
            ),
            canales: vec![NotificationChannel::Internal, NotificationChannel::Email],
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::store::InMemoryStore;
    use std::sync::Arc;

    fn service() -> NotificationService {
        let store: SharedStore = Arc::new(InMemoryStore::new());
        NotificationService::new(store, &Config::for_tests().notifications)
    }

    fn input(usuario_id: &str, titulo: &str) -> SendNotificationInput {
        SendNotificationInput {
            usuario_id: usuario_id.to_string(),
            tipo: NotificationKind::General,
            titulo: titulo.to_string(),
            mensaje: "Hola".to_string(),
            canales: vec![NotificationChannel::Internal, NotificationChannel::Email],
        }
    }

    #[tokio::test]
    async fn test_send_stores_internal_copy() {
        let service = service();
        let sent = service.send(input("cliente-1", "Bienvenido")).await.unwrap();
        assert!(!sent.leida);

        let inbox = service.list("cliente-1").await.unwrap();
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0].id, sent.id);
        assert!(service.list("cliente-2").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_send_rejects_empty_title() {
        let service = service();
        let err = service.send(input("cliente-1", "")).await.unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_mark_as_read_flow() {
        let service = service();
        let first = service.send(input("cliente-1", "Uno")).await.unwrap();
        service.send(input("cliente-1", "Dos")).await.unwrap();
        service.send(input("cliente-1", "Tres")).await.unwrap();

        service.mark_as_read("cliente-1", first.id).await.unwrap();
        assert_eq!(service.list_unread("cliente-1").await.unwrap().len(), 2);

        // Another user's inbox is off limits
        let err = service.mark_as_read("cliente-2", first.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        assert_eq!(service.mark_all_as_read("cliente-1").await.unwrap(), 2);
        assert_eq!(service.unread_count("cliente-1").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_low_stock_goes_to_admin() {
        let service = service();
        let product = Product {
            id: Uuid::new_v4(),
            nombre: "Tacos al Pastor".to_string(),
            descripcion: String::new(),
            precio: 12000.into(),
            categoria_id: Uuid::new_v4(),
            imagen_url: String::new(),
            disponible: true,
            destacado: false,
            etiquetas: vec![],
            stock: 3,
            ingredientes: vec![],
            opciones: serde_json::Value::Null,
        };
        let sent = service.notify_low_stock(&product).await.unwrap();
        assert_eq!(sent.usuario_id, "admin");
        assert_eq!(sent.tipo, NotificationKind::StockBajo);
        assert_eq!(sent.mensaje, "Tacos al Pastor tiene solo 3 unidades restantes");
    }
}
