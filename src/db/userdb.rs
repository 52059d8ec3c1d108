// db/userdb.rs
use async_trait::async_trait;
use sqlx::Error;
use uuid::Uuid;

use super::db::DBClient;
use crate::dtos::profiledtos::{CreateProfileDto, UpdateProfileDto};
use crate::models::usermodel::{Block, Profile, User};

#[async_trait]
pub trait UserExt {
    async fn get_user(&self, user_id: Uuid) -> Result<Option<User>, Error>;

    async fn get_profile(&self, profile_id: Uuid) -> Result<Option<Profile>, Error>;

    async fn get_profile_by_user(&self, user_id: Uuid) -> Result<Option<Profile>, Error>;

    async fn create_profile(&self, user_id: Uuid, dto: &CreateProfileDto)
        -> Result<Profile, Error>;

    async fn update_profile(
        &self,
        profile_id: Uuid,
        dto: &UpdateProfileDto,
    ) -> Result<Profile, Error>;

    async fn delete_profile(&self, profile_id: Uuid) -> Result<(), Error>;

    async fn clear_fcm_token(&self, profile_id: Uuid) -> Result<(), Error>;

    /// Every profile holding a registered device token, minus the excluded
    /// one. Used for new-task broadcasts.
    async fn profiles_with_fcm_token(&self, exclude: Uuid) -> Result<Vec<Profile>, Error>;

    /// True when either profile blocks the other.
    async fn is_blocked_pair(&self, profile_a: Uuid, profile_b: Uuid) -> Result<bool, Error>;

    async fn block_exists(&self, blocking: Uuid, blocked: Uuid) -> Result<bool, Error>;

    /// Records the block and deletes all offers between the two profiles in
    /// both directions, in one transaction. Assignments, chats and messages
    /// go with the offers through the cascade chain; tasks are preserved.
    async fn create_block(&self, blocking: Uuid, blocked: Uuid) -> Result<Block, Error>;
}

#[async_trait]
impl UserExt for DBClient {
    async fn get_user(&self, user_id: Uuid) -> Result<Option<User>, Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, name, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_profile(&self, profile_id: Uuid) -> Result<Option<Profile>, Error> {
        sqlx::query_as::<_, Profile>(
            r#"
            SELECT id, user_id, name, age_above_18, agreed_with_conditions,
                   city, speaking_languages, fcm_token, created_at, updated_at
            FROM profiles
            WHERE id = $1
            "#,
        )
        .bind(profile_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_profile_by_user(&self, user_id: Uuid) -> Result<Option<Profile>, Error> {
        sqlx::query_as::<_, Profile>(
            r#"
            SELECT id, user_id, name, age_above_18, agreed_with_conditions,
                   city, speaking_languages, fcm_token, created_at, updated_at
            FROM profiles
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn create_profile(
        &self,
        user_id: Uuid,
        dto: &CreateProfileDto,
    ) -> Result<Profile, Error> {
        sqlx::query_as::<_, Profile>(
            r#"
            INSERT INTO profiles
                (user_id, name, age_above_18, agreed_with_conditions, city, speaking_languages)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, user_id, name, age_above_18, agreed_with_conditions,
                      city, speaking_languages, fcm_token, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(&dto.name)
        .bind(dto.age_above_18)
        .bind(dto.agreed_with_conditions)
        .bind(&dto.city)
        .bind(&dto.speaking_languages)
        .fetch_one(&self.pool)
        .await
    }

    async fn update_profile(
        &self,
        profile_id: Uuid,
        dto: &UpdateProfileDto,
    ) -> Result<Profile, Error> {
        sqlx::query_as::<_, Profile>(
            r#"
            UPDATE profiles
            SET name = COALESCE($2, name),
                city = COALESCE($3, city),
                speaking_languages = COALESCE($4, speaking_languages),
                fcm_token = COALESCE($5, fcm_token),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, user_id, name, age_above_18, agreed_with_conditions,
                      city, speaking_languages, fcm_token, created_at, updated_at
            "#,
        )
        .bind(profile_id)
        .bind(&dto.name)
        .bind(&dto.city)
        .bind(&dto.speaking_languages)
        .bind(&dto.fcm_token)
        .fetch_one(&self.pool)
        .await
    }

    async fn delete_profile(&self, profile_id: Uuid) -> Result<(), Error> {
        let mut tx = self.pool.begin().await?;

        // Offers on this profile's tasks would otherwise outlive it: the
        // task itself survives with owner_id nulled, so the cascade chain
        // to assignments/chats/messages has to start here. Offers held as
        // helper cascade through the helper FK.
        sqlx::query(
            r#"
            DELETE FROM offers o
            USING tasks t
            WHERE o.task_id = t.id
              AND t.owner_id = $1
            "#,
        )
        .bind(profile_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM profiles WHERE id = $1")
            .bind(profile_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn clear_fcm_token(&self, profile_id: Uuid) -> Result<(), Error> {
        sqlx::query("UPDATE profiles SET fcm_token = NULL, updated_at = NOW() WHERE id = $1")
            .bind(profile_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn profiles_with_fcm_token(&self, exclude: Uuid) -> Result<Vec<Profile>, Error> {
        sqlx::query_as::<_, Profile>(
            r#"
            SELECT id, user_id, name, age_above_18, agreed_with_conditions,
                   city, speaking_languages, fcm_token, created_at, updated_at
            FROM profiles
            WHERE fcm_token IS NOT NULL
              AND fcm_token != ''
              AND id != $1
            "#,
        )
        .bind(exclude)
        .fetch_all(&self.pool)
        .await
    }

    async fn is_blocked_pair(&self, profile_a: Uuid, profile_b: Uuid) -> Result<bool, Error> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM blocks
                WHERE (blocking_profile_id = $1 AND blocked_profile_id = $2)
                   OR (blocking_profile_id = $2 AND blocked_profile_id = $1)
            )
            "#,
        )
        .bind(profile_a)
        .bind(profile_b)
        .fetch_one(&self.pool)
        .await
    }

    async fn block_exists(&self, blocking: Uuid, blocked: Uuid) -> Result<bool, Error> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM blocks
                WHERE blocking_profile_id = $1 AND blocked_profile_id = $2
            )
            "#,
        )
        .bind(blocking)
        .bind(blocked)
        .fetch_one(&self.pool)
        .await
    }

    async fn create_block(&self, blocking: Uuid, blocked: Uuid) -> Result<Block, Error> {
        let mut tx = self.pool.begin().await?;

        let block = sqlx::query_as::<_, Block>(
            r#"
            INSERT INTO blocks (blocking_profile_id, blocked_profile_id)
            VALUES ($1, $2)
            RETURNING id, blocking_profile_id, blocked_profile_id, created_at
            "#,
        )
        .bind(blocking)
        .bind(blocked)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            DELETE FROM offers o
            USING tasks t
            WHERE o.task_id = t.id
              AND ((o.helper_id = $1 AND t.owner_id = $2)
                OR (o.helper_id = $2 AND t.owner_id = $1))
            "#,
        )
        .bind(blocking)
        .bind(blocked)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(block)
    }
}
