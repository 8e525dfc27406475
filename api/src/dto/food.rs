use serde::Deserialize;
use validator::Validate;

use nl_core::domain::value_objects::Nutrients;
use nl_core::services::nutrition::NewFood;
use nl_shared::types::Pagination;

/// Body of `POST /api/v1/foods` and `PUT /api/v1/foods/{id}`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct FoodRequest {
    #[validate(length(min = 1, max = 200, message = "Name must be 1 to 200 characters"))]
    pub name: String,
    #[validate(length(max = 100, message = "Brand must be at most 100 characters"))]
    pub brand: Option<String>,
    #[validate(range(exclusive_min = 0.0, message = "Serving size must be positive"))]
    pub serving_size: f64,
    #[validate(length(min = 1, max = 20, message = "Serving unit must be 1 to 20 characters"))]
    pub serving_unit: String,
    /// Per serving
    pub nutrients: Nutrients,
    #[validate(length(max = 50))]
    pub barcode: Option<String>,
}

impl From<FoodRequest> for NewFood {
    fn from(request: FoodRequest) -> Self {
        NewFood {
            name: request.name,
            brand: request.brand,
            serving_size: request.serving_size,
            serving_unit: request.serving_unit,
            nutrients: request.nutrients,
            barcode: request.barcode,
        }
    }
}

/// `GET /api/v1/foods` query string
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FoodSearchQuery {
    pub q: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl FoodSearchQuery {
    pub fn pagination(&self) -> Pagination {
        let defaults = Pagination::default();
        Pagination::new(
            self.page.unwrap_or(defaults.page),
            self.per_page.unwrap_or(defaults.per_page),
        )
    }
}
