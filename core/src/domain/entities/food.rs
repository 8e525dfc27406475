//! Food catalog entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::Nutrients;

/// A food with its nutrients per serving.
///
/// Foods without an owner belong to the shared catalog and are read-only for
/// users; foods with an owner are custom entries visible only to that user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Food {
    pub id: Uuid,
    pub owner_id: Option<Uuid>,
    pub name: String,
    pub brand: Option<String>,
    pub serving_size: f64,
    pub serving_unit: String,
    pub nutrients: Nutrients,
    pub barcode: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Food {
    pub fn new(
        owner_id: Option<Uuid>,
        name: String,
        brand: Option<String>,
        serving_size: f64,
        serving_unit: String,
        nutrients: Nutrients,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner_id,
            name,
            brand,
            serving_size,
            serving_unit,
            nutrients,
            barcode: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Shared catalog entries and the user's own foods are visible
    pub fn is_visible_to(&self, user_id: Uuid) -> bool {
        self.owner_id.map_or(true, |owner| owner == user_id)
    }

    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.owner_id == Some(user_id)
    }

    /// Case-insensitive match on name or brand
    pub fn matches_query(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.name.to_lowercase().contains(&query)
            || self
                .brand
                .as_ref()
                .map_or(false, |brand| brand.to_lowercase().contains(&query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visibility() {
        let owner = Uuid::new_v4();
        let custom = Food::new(Some(owner), "Protein bar".into(), None, 1.0, "bar".into(), Nutrients::default());
        let shared = Food::new(None, "Apple".into(), None, 182.0, "g".into(), Nutrients::default());

        assert!(custom.is_visible_to(owner));
        assert!(!custom.is_visible_to(Uuid::new_v4()));
        assert!(shared.is_visible_to(owner));
        assert!(!shared.is_owned_by(owner));
    }

    #[test]
    fn test_matches_query_on_brand() {
        let mut food = Food::new(None, "Greek yogurt".into(), None, 170.0, "g".into(), Nutrients::default());
        food.brand = Some("Fage".into());
        assert!(food.matches_query("YOG"));
        assert!(food.matches_query("fage"));
        assert!(!food.matches_query("milk"));
    }
}
