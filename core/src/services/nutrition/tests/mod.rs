mod food_log_tests;

use crate::domain::value_objects::Nutrients;
use crate::services::nutrition::NewFood;

pub(super) fn oats() -> NewFood {
    NewFood {
        name: "Rolled oats".into(),
        brand: Some("  Miller ".into()),
        serving_size: 40.0,
        serving_unit: "g".into(),
        nutrients: Nutrients {
            calories: 150.0,
            protein_g: 5.0,
            carbohydrates_g: 27.0,
            fat_g: 2.5,
            fiber_g: 4.0,
            sugar_g: 0.5,
            sodium_mg: 0.0,
        },
        barcode: None,
    }
}
