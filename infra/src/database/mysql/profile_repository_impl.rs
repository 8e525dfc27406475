//! MySQL implementation of the ProfileRepository trait.

use async_trait::async_trait;
use sqlx::mysql::MySqlRow;
use sqlx::MySqlPool;
use uuid::Uuid;

use nl_core::domain::entities::profile::UserProfile;
use nl_core::errors::DomainError;
use nl_core::repositories::ProfileRepository;

use super::{encode_string_list, get, get_optional_enum, get_string_list, get_uuid};
use crate::database::map_sqlx_error;

pub struct MySqlProfileRepository {
    pool: MySqlPool,
}

impl MySqlProfileRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    fn row_to_profile(row: &MySqlRow) -> Result<UserProfile, DomainError> {
        Ok(UserProfile {
            user_id: get_uuid(row, "user_id")?,
            date_of_birth: get(row, "date_of_birth")?,
            gender: get_optional_enum(row, "gender")?,
            height_cm: get(row, "height_cm")?,
            activity_level: get_optional_enum(row, "activity_level")?,
            goal: get_optional_enum(row, "goal")?,
            daily_calorie_target: get(row, "daily_calorie_target")?,
            protein_target_g: get(row, "protein_target_g")?,
            carbs_target_g: get(row, "carbs_target_g")?,
            fat_target_g: get(row, "fat_target_g")?,
            dietary_preferences: get_string_list(row, "dietary_preferences")?,
            allergies: get_string_list(row, "allergies")?,
            timezone: get(row, "timezone")?,
            created_at: get(row, "created_at")?,
            updated_at: get(row, "updated_at")?,
        })
    }
}

#[async_trait]
impl ProfileRepository for MySqlProfileRepository {
    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<UserProfile>, DomainError> {
        let query = r#"
            SELECT user_id, date_of_birth, gender, height_cm, activity_level, goal,
                   daily_calorie_target, protein_target_g, carbs_target_g, fat_target_g,
                   dietary_preferences, allergies, timezone, created_at, updated_at
            FROM user_profiles
            WHERE user_id = ?
            LIMIT 1
        "#;

        let row = sqlx::query(query)
            .bind(user_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find profile", e))?;

        row.as_ref().map(Self::row_to_profile).transpose()
    }

    async fn upsert(&self, profile: UserProfile) -> Result<UserProfile, DomainError> {
        // created_at is left untouched on update
        let query = r#"
            INSERT INTO user_profiles (
                user_id, date_of_birth, gender, height_cm, activity_level, goal,
                daily_calorie_target, protein_target_g, carbs_target_g, fat_target_g,
                dietary_preferences, allergies, timezone, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON DUPLICATE KEY UPDATE
                date_of_birth = VALUES(date_of_birth),
                gender = VALUES(gender),
                height_cm = VALUES(height_cm),
                activity_level = VALUES(activity_level),
                goal = VALUES(goal),
                daily_calorie_target = VALUES(daily_calorie_target),
                protein_target_g = VALUES(protein_target_g),
                carbs_target_g = VALUES(carbs_target_g),
                fat_target_g = VALUES(fat_target_g),
                dietary_preferences = VALUES(dietary_preferences),
                allergies = VALUES(allergies),
                timezone = VALUES(timezone),
                updated_at = VALUES(updated_at)
        "#;

        sqlx::query(query)
            .bind(profile.user_id.to_string())
            .bind(profile.date_of_birth)
            .bind(profile.gender.map(|g| g.as_str()))
            .bind(profile.height_cm)
            .bind(profile.activity_level.map(|a| a.as_str()))
            .bind(profile.goal.map(|g| g.as_str()))
            .bind(profile.daily_calorie_target)
            .bind(profile.protein_target_g)
            .bind(profile.carbs_target_g)
            .bind(profile.fat_target_g)
            .bind(encode_string_list(&profile.dietary_preferences)?)
            .bind(encode_string_list(&profile.allergies)?)
            .bind(&profile.timezone)
            .bind(profile.created_at)
            .bind(profile.updated_at)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("save profile", e))?;

        Ok(profile)
    }

    async fn delete(&self, user_id: Uuid) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM user_profiles WHERE user_id = ?")
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete profile", e))?;

        Ok(result.rows_affected() > 0)
    }
}
