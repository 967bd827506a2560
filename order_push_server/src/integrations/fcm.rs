use async_trait::async_trait;
use fcm_tools::{
    AndroidConfig,
    AndroidMessagePriority,
    AndroidNotification,
    FcmClient,
    FcmError,
    Message,
    NotificationPriority,
    Visibility,
};
use log::*;

use crate::traits::PushNotifier;

pub const NEW_ORDERS_TITLE: &str = "سفارش جدید غذارسان";
pub const ORDERS_CHANNEL_ID: &str = "orders_channel";
pub const ORDER_COUNT_KEY: &str = "orderCount";
const NEW_ORDERS_TTL: &str = "60s";

pub fn new_orders_body(order_count: usize) -> String {
    format!("شما {order_count} سفارش جدید دارید")
}

/// Builds the "you have new orders" push message: high priority, heads-up on the app's orders channel, and dropped by
/// FCM if it cannot be delivered within a minute.
pub fn new_orders_message(push_token: &str, order_count: usize) -> Message {
    let android = AndroidConfig {
        priority: AndroidMessagePriority::High,
        ttl: Some(NEW_ORDERS_TTL.to_string()),
        notification: Some(AndroidNotification {
            channel_id: Some(ORDERS_CHANNEL_ID.to_string()),
            notification_priority: Some(NotificationPriority::PriorityMax),
            default_sound: true,
            default_vibrate_timings: true,
            visibility: Some(Visibility::Public),
        }),
    };
    Message::new(push_token, NEW_ORDERS_TITLE, new_orders_body(order_count))
        .with_android(android)
        .with_data(ORDER_COUNT_KEY, order_count)
}

#[async_trait]
impl PushNotifier for FcmClient {
    async fn notify_new_orders(&self, push_token: &str, order_count: usize) -> Result<String, FcmError> {
        let message = new_orders_message(push_token, order_count);
        trace!("📲️ Message payload: {message:?}");
        self.send(&message).await
    }
}
