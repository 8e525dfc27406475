//! In-memory implementation of FoodRepository

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use nl_shared::types::Pagination;

use crate::domain::entities::food::Food;
use crate::errors::DomainError;

use super::trait_::FoodRepository;

#[derive(Default)]
pub struct InMemoryFoodRepository {
    foods: Arc<RwLock<HashMap<Uuid, Food>>>,
}

impl InMemoryFoodRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FoodRepository for InMemoryFoodRepository {
    async fn create(&self, food: Food) -> Result<Food, DomainError> {
        self.foods.write().await.insert(food.id, food.clone());
        Ok(food)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Food>, DomainError> {
        Ok(self.foods.read().await.get(&id).cloned())
    }

    async fn update(&self, food: Food) -> Result<Food, DomainError> {
        let mut foods = self.foods.write().await;
        if !foods.contains_key(&food.id) {
            return Err(DomainError::not_found("Food"));
        }
        foods.insert(food.id, food.clone());
        Ok(food)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        Ok(self.foods.write().await.remove(&id).is_some())
    }

    async fn search(
        &self,
        user_id: Uuid,
        query: Option<&str>,
        pagination: &Pagination,
    ) -> Result<(Vec<Food>, u64), DomainError> {
        let foods = self.foods.read().await;
        let mut matches: Vec<Food> = foods
            .values()
            .filter(|f| f.is_visible_to(user_id))
            .filter(|f| query.map_or(true, |q| f.matches_query(q)))
            .cloned()
            .collect();
        matches.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));

        let total = matches.len() as u64;
        let page = matches
            .into_iter()
            .skip(pagination.offset() as usize)
            .take(pagination.limit() as usize)
            .collect();
        Ok((page, total))
    }
}
