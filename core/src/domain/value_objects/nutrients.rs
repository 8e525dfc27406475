//! Nutrient amounts and their aggregation.

use serde::{Deserialize, Serialize};
use std::iter::Sum;
use std::ops::Add;

/// kcal per gram of protein
pub const KCAL_PER_G_PROTEIN: f64 = 4.0;
/// kcal per gram of carbohydrate
pub const KCAL_PER_G_CARBS: f64 = 4.0;
/// kcal per gram of fat
pub const KCAL_PER_G_FAT: f64 = 9.0;

/// Nutrient amounts for a serving, a log entry, or a total
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Nutrients {
    pub calories: f64,
    pub protein_g: f64,
    pub carbohydrates_g: f64,
    pub fat_g: f64,
    #[serde(default)]
    pub fiber_g: f64,
    #[serde(default)]
    pub sugar_g: f64,
    #[serde(default)]
    pub sodium_mg: f64,
}

impl Nutrients {
    /// Multiply every amount by `factor` (servings)
    pub fn scale(&self, factor: f64) -> Self {
        Self {
            calories: self.calories * factor,
            protein_g: self.protein_g * factor,
            carbohydrates_g: self.carbohydrates_g * factor,
            fat_g: self.fat_g * factor,
            fiber_g: self.fiber_g * factor,
            sugar_g: self.sugar_g * factor,
            sodium_mg: self.sodium_mg * factor,
        }
    }

    /// Round every amount to two decimals for presentation
    pub fn rounded(&self) -> Self {
        Self {
            calories: round2(self.calories),
            protein_g: round2(self.protein_g),
            carbohydrates_g: round2(self.carbohydrates_g),
            fat_g: round2(self.fat_g),
            fiber_g: round2(self.fiber_g),
            sugar_g: round2(self.sugar_g),
            sodium_mg: round2(self.sodium_mg),
        }
    }

    /// All amounts finite and non-negative
    pub fn is_valid(&self) -> bool {
        [
            self.calories,
            self.protein_g,
            self.carbohydrates_g,
            self.fat_g,
            self.fiber_g,
            self.sugar_g,
            self.sodium_mg,
        ]
        .iter()
        .all(|v| v.is_finite() && *v >= 0.0)
    }

    /// Share of energy from each macronutrient, computed from grams
    pub fn macro_percentages(&self) -> MacroPercentages {
        let protein = self.protein_g * KCAL_PER_G_PROTEIN;
        let carbs = self.carbohydrates_g * KCAL_PER_G_CARBS;
        let fat = self.fat_g * KCAL_PER_G_FAT;
        let total = protein + carbs + fat;
        if total <= 0.0 {
            return MacroPercentages::default();
        }
        MacroPercentages {
            protein_percent: round2(protein / total * 100.0),
            carbs_percent: round2(carbs / total * 100.0),
            fat_percent: round2(fat / total * 100.0),
        }
    }
}

impl Add for Nutrients {
    type Output = Nutrients;

    fn add(self, other: Nutrients) -> Nutrients {
        Nutrients {
            calories: self.calories + other.calories,
            protein_g: self.protein_g + other.protein_g,
            carbohydrates_g: self.carbohydrates_g + other.carbohydrates_g,
            fat_g: self.fat_g + other.fat_g,
            fiber_g: self.fiber_g + other.fiber_g,
            sugar_g: self.sugar_g + other.sugar_g,
            sodium_mg: self.sodium_mg + other.sodium_mg,
        }
    }
}

impl Sum for Nutrients {
    fn sum<I: Iterator<Item = Nutrients>>(iter: I) -> Self {
        iter.fold(Nutrients::default(), Add::add)
    }
}

impl<'a> Sum<&'a Nutrients> for Nutrients {
    fn sum<I: Iterator<Item = &'a Nutrients>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

/// Macronutrient percentage breakdown
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MacroPercentages {
    pub protein_percent: f64,
    pub carbs_percent: f64,
    pub fat_percent: f64,
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
