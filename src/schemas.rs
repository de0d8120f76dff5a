use serde::Serialize;
use uuid::Uuid;

use crate::db::models::Category;

/// Category mutation pushed to every connected WebSocket client. Delivery is
/// best-effort: no acknowledgment, no replay for late subscribers.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryEvent {
    pub event: String,
    pub data: serde_json::Value,
}

impl CategoryEvent {
    pub fn added(category: &Category) -> Self {
        Self {
            event: "categoryAdded".to_string(),
            data: serde_json::to_value(category).unwrap_or(serde_json::Value::Null),
        }
    }

    pub fn updated(category: &Category) -> Self {
        Self {
            event: "categoryUpdated".to_string(),
            data: serde_json::to_value(category).unwrap_or(serde_json::Value::Null),
        }
    }

    pub fn deleted(id: Uuid) -> Self {
        Self {
            event: "categoryDeleted".to_string(),
            data: serde_json::Value::String(id.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_added_event_carries_full_record() {
        let category = Category::new("Sadaqah".to_string());
        let event = CategoryEvent::added(&category);

        assert_eq!(event.event, "categoryAdded");
        assert_eq!(event.data["name"], "Sadaqah");
        assert_eq!(event.data["id"], category.id.to_string());
    }

    #[test]
    fn test_deleted_event_carries_only_id() {
        let id = Uuid::new_v4();
        let event = CategoryEvent::deleted(id);

        assert_eq!(event.event, "categoryDeleted");
        assert_eq!(event.data, serde_json::Value::String(id.to_string()));
    }
}
