// src/models/kitchen.rs

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::models::inventory::OrderReceipt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KitchenEventKind {
    NewOrder, // "NEW_ORDER"
}

// Wire shape pushed to every kitchen display:
// {"type":"NEW_ORDER","product":"Latte","quantity":3,"store":"S1","time":"08:15:02"}
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KitchenEvent {
    #[serde(rename = "type")]
    pub kind: KitchenEventKind,
    pub product: String,
    pub quantity: i32,
    pub store: String,
    pub time: String,
}

impl KitchenEvent {
    pub fn new_order(receipt: &OrderReceipt, at: DateTime<Local>) -> Self {
        Self {
            kind: KitchenEventKind::NewOrder,
            product: receipt.product_name.clone(),
            quantity: receipt.quantity,
            store: receipt.store_name.clone(),
            time: at.format("%H:%M:%S").to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn new_order_event_has_display_wire_shape() {
        let receipt = OrderReceipt {
            store_name: "S1".to_string(),
            product_name: "Latte".to_string(),
            quantity: 3,
        };
        let at = Local.with_ymd_and_hms(2025, 3, 1, 8, 15, 2).unwrap();

        let json = serde_json::to_value(KitchenEvent::new_order(&receipt, at)).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "type": "NEW_ORDER",
                "product": "Latte",
                "quantity": 3,
                "store": "S1",
                "time": "08:15:02",
            })
        );
    }
}
