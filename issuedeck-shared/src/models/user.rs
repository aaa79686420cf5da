/// User model and database operations
///
/// Users own projects, issues, and comments, and gain read access to
/// projects through contributor rows.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     username VARCHAR(150) NOT NULL UNIQUE,
///     email CITEXT UNIQUE,
///     password_hash VARCHAR(255) NOT NULL,
///     birth_date DATE,
///     consent BOOLEAN NOT NULL DEFAULT FALSE,
///     can_be_contacted BOOLEAN NOT NULL DEFAULT FALSE,
///     can_data_be_shared BOOLEAN NOT NULL DEFAULT FALSE,
///     is_active BOOLEAN NOT NULL DEFAULT TRUE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Compliance rules
///
/// - Registrants must be at least [`MINIMUM_AGE`] years old (exactly 15
///   is accepted).
/// - `can_be_contacted` / `can_data_be_shared` require `consent`.
/// - Account deletion anonymizes the row in place instead of removing
///   it, so authored projects/issues/comments keep a valid author.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Minimum age (in years) required to register
pub const MINIMUM_AGE: i32 = 15;

/// User model representing an account
///
/// Passwords are stored as Argon2id hashes, never in plaintext.
/// `email` and `birth_date` are nullable because anonymized accounts
/// have them cleared.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID (UUID v4)
    pub id: Uuid,

    /// Username (unique; replaced with a synthetic value on anonymization)
    pub username: String,

    /// Email address (case-insensitive via CITEXT, unique, nullable)
    pub email: Option<String>,

    /// Argon2id password hash
    pub password_hash: String,

    /// Date of birth (used for the minimum-age rule)
    pub birth_date: Option<NaiveDate>,

    /// Whether the user consented to data processing
    pub consent: bool,

    /// Whether the user may be contacted (requires consent)
    pub can_be_contacted: bool,

    /// Whether the user's data may be shared (requires consent)
    pub can_data_be_shared: bool,

    /// False once the account has been anonymized
    pub is_active: bool,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// When the account was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// Username (must be unique)
    pub username: String,

    /// Email address
    pub email: String,

    /// Argon2id password hash (NOT the plaintext password)
    pub password_hash: String,

    /// Date of birth
    pub birth_date: NaiveDate,

    /// Consent to data processing
    pub consent: bool,

    /// Contact permission
    pub can_be_contacted: bool,

    /// Data-sharing permission
    pub can_data_be_shared: bool,
}

/// Input for updating an existing user
///
/// All fields are optional. Only non-None fields will be updated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUser {
    /// New email address
    pub email: Option<String>,

    /// New password hash
    pub password_hash: Option<String>,

    /// New consent value
    pub consent: Option<bool>,

    /// New contact permission
    pub can_be_contacted: Option<bool>,

    /// New data-sharing permission
    pub can_data_be_shared: Option<bool>,
}

/// Computes a person's age in whole years on a given date
pub fn age_on(birth_date: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - birth_date.year();
    if (today.month(), today.day()) < (birth_date.month(), birth_date.day()) {
        age -= 1;
    }
    age
}

/// Validates that a registrant meets the minimum-age rule
///
/// An age of exactly [`MINIMUM_AGE`] is accepted.
pub fn validate_birth_date(birth_date: NaiveDate, today: NaiveDate) -> Result<(), String> {
    if age_on(birth_date, today) < MINIMUM_AGE {
        return Err(format!(
            "You must be at least {} years old to register",
            MINIMUM_AGE
        ));
    }

    Ok(())
}

/// Validates the coherence of the consent flags
///
/// If the user wants to be contacted or share data, the global consent
/// flag must be set.
pub fn validate_consent(
    consent: bool,
    can_be_contacted: bool,
    can_data_be_shared: bool,
) -> Result<(), String> {
    if (can_be_contacted || can_data_be_shared) && !consent {
        return Err("Consent is required to enable contact or data-sharing options".to_string());
    }

    Ok(())
}

const USER_COLUMNS: &str = "id, username, email, password_hash, birth_date, consent, \
     can_be_contacted, can_data_be_shared, is_active, created_at, updated_at";

impl User {
    /// Creates a new user in the database
    ///
    /// Domain validation (age, consent coherence) is expected to have
    /// run before this call.
    ///
    /// # Errors
    ///
    /// Returns an error if the username or email already exists (unique
    /// constraint violation) or the database is unreachable.
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password_hash, birth_date,
                               consent, can_be_contacted, can_data_be_shared)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, username, email, password_hash, birth_date, consent,
                      can_be_contacted, can_data_be_shared, is_active, created_at, updated_at
            "#,
        )
        .bind(data.username)
        .bind(data.email)
        .bind(data.password_hash)
        .bind(data.birth_date)
        .bind(data.consent)
        .bind(data.can_be_contacted)
        .bind(data.can_data_be_shared)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by username
    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE username = $1",
            USER_COLUMNS
        ))
        .bind(username)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Updates an existing user
    ///
    /// Only non-None fields in `data` will be updated. The `updated_at`
    /// timestamp is automatically set to the current time.
    ///
    /// # Returns
    ///
    /// The updated user if found, None if the user doesn't exist
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateUser,
    ) -> Result<Option<Self>, sqlx::Error> {
        // Build dynamic update query based on which fields are present
        let mut query = String::from("UPDATE users SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.email.is_some() {
            bind_count += 1;
            query.push_str(&format!(", email = ${}", bind_count));
        }
        if data.password_hash.is_some() {
            bind_count += 1;
            query.push_str(&format!(", password_hash = ${}", bind_count));
        }
        if data.consent.is_some() {
            bind_count += 1;
            query.push_str(&format!(", consent = ${}", bind_count));
        }
        if data.can_be_contacted.is_some() {
            bind_count += 1;
            query.push_str(&format!(", can_be_contacted = ${}", bind_count));
        }
        if data.can_data_be_shared.is_some() {
            bind_count += 1;
            query.push_str(&format!(", can_data_be_shared = ${}", bind_count));
        }

        query.push_str(&format!(
            " WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        ));

        let mut q = sqlx::query_as::<_, User>(&query).bind(id);

        if let Some(email) = data.email {
            q = q.bind(email);
        }
        if let Some(password_hash) = data.password_hash {
            q = q.bind(password_hash);
        }
        if let Some(consent) = data.consent {
            q = q.bind(consent);
        }
        if let Some(can_be_contacted) = data.can_be_contacted {
            q = q.bind(can_be_contacted);
        }
        if let Some(can_data_be_shared) = data.can_data_be_shared {
            q = q.bind(can_data_be_shared);
        }

        let user = q.fetch_optional(pool).await?;

        Ok(user)
    }

    /// Anonymizes a user's personal data in place (right-to-be-forgotten)
    ///
    /// Replaces the username with a synthetic unique value, clears email
    /// and birth date, resets every consent flag, and deactivates the
    /// account. The row itself survives so authored projects, issues,
    /// and comments keep a valid author reference.
    ///
    /// # Returns
    ///
    /// The anonymized user if found, None if the user doesn't exist
    pub async fn anonymize(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET username = 'deleted-user-' || left(id::text, 8),
                email = NULL,
                birth_date = NULL,
                consent = FALSE,
                can_be_contacted = FALSE,
                can_data_be_shared = FALSE,
                is_active = FALSE,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_age_on_before_birthday() {
        // Birthday hasn't happened yet this year
        assert_eq!(age_on(date(2000, 6, 15), date(2020, 6, 14)), 19);
    }

    #[test]
    fn test_age_on_birthday() {
        assert_eq!(age_on(date(2000, 6, 15), date(2020, 6, 15)), 20);
    }

    #[test]
    fn test_age_on_after_birthday() {
        assert_eq!(age_on(date(2000, 6, 15), date(2020, 6, 16)), 20);
    }

    #[test]
    fn test_validate_birth_date_underage_rejected() {
        // 14 years and 364 days old
        let result = validate_birth_date(date(2010, 1, 2), date(2025, 1, 1));
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("15"));
    }

    #[test]
    fn test_validate_birth_date_exactly_fifteen_accepted() {
        assert!(validate_birth_date(date(2010, 1, 1), date(2025, 1, 1)).is_ok());
    }

    #[test]
    fn test_validate_birth_date_adult_accepted() {
        assert!(validate_birth_date(date(1990, 3, 3), date(2025, 1, 1)).is_ok());
    }

    #[test]
    fn test_validate_consent_coherence() {
        // No flags set: consent not required
        assert!(validate_consent(false, false, false).is_ok());

        // Flags set with consent
        assert!(validate_consent(true, true, false).is_ok());
        assert!(validate_consent(true, false, true).is_ok());
        assert!(validate_consent(true, true, true).is_ok());

        // Flags set without consent
        assert!(validate_consent(false, true, false).is_err());
        assert!(validate_consent(false, false, true).is_err());
        assert!(validate_consent(false, true, true).is_err());
    }

    #[test]
    fn test_update_user_default() {
        let update = UpdateUser::default();
        assert!(update.email.is_none());
        assert!(update.password_hash.is_none());
        assert!(update.consent.is_none());
        assert!(update.can_be_contacted.is_none());
        assert!(update.can_data_be_shared.is_none());
    }
}
