use chrono::{DateTime, Utc};
use rocket::FromForm;
use rocket::serde::{Deserialize, Serialize};
use schemars::JsonSchema;
use std::fmt;
use std::str::FromStr;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Eq, PartialEq, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum MealStatus {
    Open,
    Closed,
    Cancelled,
}

impl MealStatus {
    pub const ALLOWED: &'static str = "open, closed, cancelled";

    pub fn as_str(&self) -> &'static str {
        match self {
            MealStatus::Open => "open",
            MealStatus::Closed => "closed",
            MealStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for MealStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MealStatus {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "open" => Ok(MealStatus::Open),
            "closed" => Ok(MealStatus::Closed),
            "cancelled" => Ok(MealStatus::Cancelled),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Meal {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub cost_per_serving: f64,
    pub servings_total: u32,
    pub servings_available: u32,
    pub ready_at: DateTime<Utc>,
    pub zip: String,
    pub status: MealStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Meal {
    pub fn is_open(&self) -> bool {
        self.status == MealStatus::Open
    }

    pub fn is_free(&self) -> bool {
        self.cost_per_serving == 0.0
    }
}

/// A validated meal ready to be stored; availability starts at `servings_total`.
#[derive(Debug, Clone)]
pub struct NewMeal {
    pub user_id: String,
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub cost_per_serving: f64,
    pub servings_total: u32,
    pub ready_at: DateTime<Utc>,
    pub zip: String,
}

/// Validated field changes for an existing meal. Unset fields are left alone.
#[derive(Debug, Clone, Default)]
pub struct MealChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
    pub cost_per_serving: Option<f64>,
    pub servings_total: Option<u32>,
    pub servings_available: Option<u32>,
    pub ready_at: Option<DateTime<Utc>>,
    pub status: Option<MealStatus>,
}

impl MealChanges {
    /// Applies the changes, bumping `updated_at` when anything was set.
    /// Returns whether the meal changed.
    pub fn apply_to(self, meal: &mut Meal, now: DateTime<Utc>) -> bool {
        let mut changed = false;

        if let Some(title) = self.title {
            meal.title = title;
            changed = true;
        }
        if let Some(description) = self.description {
            meal.description = description;
            changed = true;
        }
        if let Some(tags) = self.tags {
            meal.tags = tags;
            changed = true;
        }
        if let Some(cost) = self.cost_per_serving {
            meal.cost_per_serving = cost;
            changed = true;
        }
        if let Some(total) = self.servings_total {
            meal.servings_total = total;
            changed = true;
        }
        if let Some(available) = self.servings_available {
            meal.servings_available = available;
            changed = true;
        }
        if let Some(ready_at) = self.ready_at {
            meal.ready_at = ready_at;
            changed = true;
        }
        if let Some(status) = self.status {
            meal.status = status;
            changed = true;
        }

        if changed {
            meal.updated_at = now;
        }
        changed
    }
}

/// Listing filters. Only open meals in `zip` are ever returned.
#[derive(Debug, Clone)]
pub struct MealFilters {
    pub zip: String,
    pub from: Option<DateTime<Utc>>,
    pub free_only: bool,
}

impl MealFilters {
    pub fn matches(&self, meal: &Meal) -> bool {
        meal.zip == self.zip && meal.is_open() && self.from.is_none_or(|from| meal.ready_at >= from) && (!self.free_only || meal.is_free())
    }
}

/// Query string accepted by `GET /meals`.
#[derive(FromForm, Debug, Default, JsonSchema)]
pub struct MealQuery {
    pub zip: Option<String>,
    pub from: Option<String>,
    #[field(name = "freeOnly")]
    #[serde(rename = "freeOnly")]
    pub free_only: Option<bool>,
}

#[derive(Deserialize, Debug, Default, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct MealRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
    pub cost_per_serving: Option<f64>,
    pub servings_total: Option<f64>,
    /// RFC 3339 timestamp, or `YYYY-MM-DDTHH:MM` read as UTC
    pub ready_at: Option<String>,
}

/// Partial update of a meal. Fields outside this list are ignored.
#[derive(Deserialize, Debug, Default, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct MealUpdateRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
    pub cost_per_serving: Option<f64>,
    pub servings_total: Option<f64>,
    pub servings_available: Option<f64>,
    pub ready_at: Option<String>,
    pub status: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MealResponse {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub cost_per_serving: f64,
    pub servings_total: u32,
    pub servings_available: u32,
    pub ready_at: DateTime<Utc>,
    pub zip: String,
    pub status: MealStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Meal> for MealResponse {
    fn from(meal: &Meal) -> Self {
        Self {
            id: meal.id.clone(),
            user_id: meal.user_id.clone(),
            title: meal.title.clone(),
            description: meal.description.clone(),
            tags: meal.tags.clone(),
            cost_per_serving: meal.cost_per_serving,
            servings_total: meal.servings_total,
            servings_available: meal.servings_available,
            ready_at: meal.ready_at,
            zip: meal.zip.clone(),
            status: meal.status,
            created_at: meal.created_at,
            updated_at: meal.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn meal() -> Meal {
        let created = Utc.with_ymd_and_hms(2025, 12, 1, 12, 0, 0).unwrap();
        Meal {
            id: "meal_1".to_string(),
            user_id: "user_1".to_string(),
            title: "Pozole".to_string(),
            description: "Red pozole with all the fixings".to_string(),
            tags: vec!["soup".to_string()],
            cost_per_serving: 0.0,
            servings_total: 5,
            servings_available: 5,
            ready_at: Utc.with_ymd_and_hms(2025, 12, 10, 18, 0, 0).unwrap(),
            zip: "93230".to_string(),
            status: MealStatus::Open,
            created_at: created,
            updated_at: created,
        }
    }

    fn filters() -> MealFilters {
        MealFilters {
            zip: "93230".to_string(),
            from: None,
            free_only: false,
        }
    }

    #[test]
    fn status_round_trips_through_its_name() {
        for status in [MealStatus::Open, MealStatus::Closed, MealStatus::Cancelled] {
            assert_eq!(status.as_str().parse::<MealStatus>(), Ok(status));
        }
        assert!("pending".parse::<MealStatus>().is_err());
    }

    #[test]
    fn filters_require_zip_and_open_status() {
        let mut other_zip = meal();
        other_zip.zip = "93245".to_string();
        assert!(!filters().matches(&other_zip));

        let mut closed = meal();
        closed.status = MealStatus::Closed;
        assert!(!filters().matches(&closed));

        assert!(filters().matches(&meal()));
    }

    #[test]
    fn from_filter_keeps_meals_ready_at_or_after() {
        let subject = meal();
        let at = MealFilters {
            from: Some(subject.ready_at),
            ..filters()
        };
        let after = MealFilters {
            from: Some(subject.ready_at + Duration::minutes(1)),
            ..filters()
        };
        assert!(at.matches(&subject));
        assert!(!after.matches(&subject));
    }

    #[test]
    fn free_only_filter_drops_paid_meals() {
        let mut paid = meal();
        paid.cost_per_serving = 4.5;
        let free_only = MealFilters {
            free_only: true,
            ..filters()
        };
        assert!(!free_only.matches(&paid));
        assert!(free_only.matches(&meal()));
    }

    #[test]
    fn empty_changes_leave_updated_at_untouched() {
        let mut subject = meal();
        let before = subject.updated_at;
        let changed = MealChanges::default().apply_to(&mut subject, before + Duration::hours(1));
        assert!(!changed);
        assert_eq!(subject.updated_at, before);
    }

    #[test]
    fn changes_apply_only_set_fields() {
        let mut subject = meal();
        let now = subject.updated_at + Duration::hours(1);
        let changes = MealChanges {
            status: Some(MealStatus::Closed),
            cost_per_serving: Some(3.0),
            ..MealChanges::default()
        };
        assert!(changes.apply_to(&mut subject, now));
        assert_eq!(subject.status, MealStatus::Closed);
        assert_eq!(subject.cost_per_serving, 3.0);
        assert_eq!(subject.title, "Pozole");
        assert_eq!(subject.updated_at, now);
    }

    #[test]
    fn response_uses_camel_case_fields() {
        let json = serde_json::to_value(MealResponse::from(&meal())).unwrap();
        assert_eq!(json["servingsAvailable"], 5);
        assert_eq!(json["costPerServing"], 0.0);
        assert_eq!(json["userId"], "user_1");
        assert_eq!(json["status"], "open");
    }
}
