use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::BigDecimal;
use std::collections::HashMap;
use utoipa::ToSchema;
use uuid::Uuid;

/// Immutable record of a confirmed donation. Created only by the payment
/// confirmation flow; `payment_ref_id` is unique per completed checkout
/// session. JSON field names preserve the original wire contract.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, ToSchema)]
pub struct Donor {
    pub id: Uuid,
    pub user_id: String,
    pub name: String,
    pub number: String,
    pub email: String,
    pub category: String,
    #[serde(with = "decimal_number")]
    #[schema(value_type = f64)]
    pub amount: BigDecimal,
    #[serde(rename = "paymentMethod")]
    pub payment_method: String,
    #[serde(rename = "paymentRefId")]
    pub payment_ref_id: String,
    #[serde(rename = "paymentDate")]
    pub payment_date: DateTime<Utc>,
    pub status: String,
    #[serde(rename = "receiptUrl")]
    pub receipt_url: Option<String>,
}

impl Donor {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_id: String,
        name: String,
        number: String,
        email: String,
        category: String,
        amount: BigDecimal,
        payment_method: String,
        payment_ref_id: String,
        receipt_url: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            name,
            number,
            email,
            category,
            amount,
            payment_method,
            payment_ref_id,
            payment_date: Utc::now(),
            status: "success".to_string(),
            receipt_url,
        }
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, ToSchema)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
}

impl Category {
    pub fn new(name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
        }
    }
}

/// Full user row. The password hash is never serialized; responses that need
/// a user body use [`PublicUser`].
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: Uuid,
    pub unique_id: String,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub photo: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: String,
    pub session_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(
        full_name: String,
        email: String,
        phone: String,
        password_hash: String,
        photo: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            unique_id: Uuid::new_v4().to_string(),
            full_name,
            email,
            phone,
            photo,
            password_hash,
            role: "user".to_string(),
            session_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }
}

/// Client-facing user view. `id` carries the opaque `unique_id`, matching the
/// session-user shape the original clients were built against.
#[derive(Debug, Clone, Serialize)]
pub struct PublicUser {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub photo: Option<String>,
    pub role: String,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.unique_id.clone(),
            full_name: user.full_name.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
            photo: user.photo.clone(),
            role: user.role.clone(),
        }
    }
}

/// One month of prayer times, keyed by (month, year). Day entries live in a
/// JSONB array; merge semantics are day-level (see the prayer handlers).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PrayerSchedule {
    pub id: Uuid,
    pub month: String,
    pub year: String,
    pub days: sqlx::types::Json<Vec<PrayerDay>>,
}

impl PrayerSchedule {
    pub fn new(month: String, year: String, days: Vec<PrayerDay>) -> Self {
        Self {
            id: Uuid::new_v4(),
            month,
            year,
            days: sqlx::types::Json(days),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PrayerTimesPair {
    #[serde(rename = "azanTime")]
    pub azan_time: String,
    #[serde(rename = "salatTime")]
    pub salat_time: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PrayerDay {
    pub date: String,
    pub day: String,
    #[serde(rename = "Fajr")]
    pub fajr: PrayerTimesPair,
    #[serde(rename = "Dhuhr")]
    pub dhuhr: PrayerTimesPair,
    #[serde(rename = "Asr")]
    pub asr: PrayerTimesPair,
    #[serde(rename = "Maghrib")]
    pub maghrib: PrayerTimesPair,
    #[serde(rename = "Isha")]
    pub isha: PrayerTimesPair,
    #[serde(rename = "Jumma", skip_serializing_if = "Option::is_none")]
    pub jumma: Option<PrayerTimesPair>,
}

impl PrayerDay {
    /// Overwrites only the prayers already present on this day. A Jumma
    /// update is skipped when the day has none.
    pub fn apply_updates(&mut self, updates: &HashMap<String, PrayerTimesPair>) {
        for (prayer, times) in updates {
            match prayer.as_str() {
                "Fajr" => self.fajr = times.clone(),
                "Dhuhr" => self.dhuhr = times.clone(),
                "Asr" => self.asr = times.clone(),
                "Maghrib" => self.maghrib = times.clone(),
                "Isha" => self.isha = times.clone(),
                "Jumma" => {
                    if self.jumma.is_some() {
                        self.jumma = Some(times.clone());
                    }
                }
                _ => {}
            }
        }
    }
}

/// Serializes donation amounts as JSON numbers, matching the original wire
/// contract (clients expect `amount: 50`, not a string).
pub mod decimal_number {
    use bigdecimal::{BigDecimal, FromPrimitive, ToPrimitive};
    use serde::{Deserialize, Deserializer, Serializer, de::Error as DeError, ser::Error as SerError};

    pub fn serialize<S: Serializer>(value: &BigDecimal, serializer: S) -> Result<S::Ok, S::Error> {
        let float = value
            .to_f64()
            .ok_or_else(|| S::Error::custom("amount out of f64 range"))?;
        serializer.serialize_f64(float)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BigDecimal, D::Error> {
        let float = f64::deserialize(deserializer)?;
        BigDecimal::from_f64(float).ok_or_else(|| D::Error::custom("invalid amount"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pair(azan: &str, salat: &str) -> PrayerTimesPair {
        PrayerTimesPair {
            azan_time: azan.to_string(),
            salat_time: salat.to_string(),
        }
    }

    fn sample_day(date: &str, jumma: Option<PrayerTimesPair>) -> PrayerDay {
        PrayerDay {
            date: date.to_string(),
            day: "Friday".to_string(),
            fajr: pair("05:10", "05:30"),
            dhuhr: pair("13:00", "13:15"),
            asr: pair("16:30", "16:45"),
            maghrib: pair("19:40", "19:45"),
            isha: pair("21:00", "21:15"),
            jumma,
        }
    }

    #[test]
    fn test_donor_serializes_wire_field_names() {
        let donor = Donor::new(
            "u1".to_string(),
            "A".to_string(),
            "1".to_string(),
            "a@x.com".to_string(),
            "Zakat".to_string(),
            "50".parse().unwrap(),
            "card".to_string(),
            "pi_1".to_string(),
            None,
        );

        let value = serde_json::to_value(&donor).unwrap();
        assert_eq!(value["paymentRefId"], "pi_1");
        assert_eq!(value["paymentMethod"], "card");
        assert_eq!(value["amount"], json!(50.0));
        assert_eq!(value["status"], "success");
        assert!(value.get("payment_ref_id").is_none());
    }

    #[test]
    fn test_user_never_serializes_password_hash() {
        let user = User::new(
            "Test User".to_string(),
            "t@x.com".to_string(),
            "123".to_string(),
            "$2b$10$hash".to_string(),
            None,
        );

        let value = serde_json::to_value(&user).unwrap();
        assert!(value.get("password_hash").is_none());
        assert_eq!(value["email"], "t@x.com");
    }

    #[test]
    fn test_public_user_id_is_unique_id() {
        let user = User::new(
            "Test User".to_string(),
            "t@x.com".to_string(),
            "123".to_string(),
            "$2b$10$hash".to_string(),
            None,
        );

        let public = PublicUser::from(&user);
        assert_eq!(public.id, user.unique_id);
    }

    #[test]
    fn test_prayer_day_applies_only_known_prayers() {
        let mut day = sample_day("2026-03-06", None);
        let mut updates = HashMap::new();
        updates.insert("Fajr".to_string(), pair("05:00", "05:20"));
        updates.insert("Brunch".to_string(), pair("11:00", "11:30"));

        day.apply_updates(&updates);
        assert_eq!(day.fajr, pair("05:00", "05:20"));
        assert_eq!(day.dhuhr, pair("13:00", "13:15"));
    }

    #[test]
    fn test_prayer_day_skips_jumma_when_absent() {
        let mut day = sample_day("2026-03-06", None);
        let mut updates = HashMap::new();
        updates.insert("Jumma".to_string(), pair("13:30", "13:45"));

        day.apply_updates(&updates);
        assert!(day.jumma.is_none());
    }

    #[test]
    fn test_prayer_day_updates_jumma_when_present() {
        let mut day = sample_day("2026-03-06", Some(pair("13:00", "13:20")));
        let mut updates = HashMap::new();
        updates.insert("Jumma".to_string(), pair("13:30", "13:45"));

        day.apply_updates(&updates);
        assert_eq!(day.jumma, Some(pair("13:30", "13:45")));
    }
}
