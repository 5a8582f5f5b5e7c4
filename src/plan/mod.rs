use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod coerce;

pub const MIN_REPS: u32 = 4;
pub const MAX_REPS: u32 = 20;
pub const DEFAULT_REPS: u32 = 12;
pub const DEFAULT_SETS: u32 = 3;
pub const DEFAULT_REST_SECONDS: u32 = 60;
pub const DEFAULT_DURATION_MINUTES: u32 = 60;
pub const DEFAULT_TOTAL_CALORIES: u32 = 2000;
pub const DEFAULT_FOOD_QUANTITY: f64 = 100.0;
pub const DEFAULT_WORKOUT_NAME: &str = "Treino Personalizado";
pub const DEFAULT_NUTRITION_NAME: &str = "Plano Nutricional Personalizado";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MealType::Breakfast => "breakfast",
            MealType::Lunch => "lunch",
            MealType::Dinner => "dinner",
            MealType::Snack => "snack",
        }
    }

    pub fn default_name(&self) -> &'static str {
        match self {
            MealType::Breakfast => "Café da Manhã",
            MealType::Lunch => "Almoço",
            MealType::Dinner => "Jantar",
            MealType::Snack => "Lanche",
        }
    }

    pub fn default_time(&self) -> &'static str {
        match self {
            MealType::Breakfast => "07:00",
            MealType::Lunch => "12:30",
            MealType::Dinner => "19:30",
            MealType::Snack => "16:00",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub name: String,
    pub description: String,
    pub sets: u32,
    pub reps: u32,
    pub rest_seconds: u32,
    pub muscle_groups: Vec<String>,
    pub equipment: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutPlan {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub duration_minutes: u32,
    pub difficulty_level: Difficulty,
    pub exercises: Vec<Exercise>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealFood {
    pub food_name: String,
    pub quantity: f64,
    pub unit: String,
    pub calories_per_unit: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meal {
    pub meal_type: MealType,
    pub name: String,
    pub suggested_time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calories: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protein: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carbs: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fiber: Option<f64>,
    pub foods: Vec<MealFood>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionPlan {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub total_calories: u32,
    pub meals: Vec<Meal>,
    pub created_at: DateTime<Utc>,
}

/// Why a fallback plan was substituted for the model's answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    Overloaded,
    EmptyResponse,
    Communication,
    Unparseable,
    /// Goals only; plans still report a missing key as an error.
    MissingCredential,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", content = "reason", rename_all = "snake_case")]
pub enum PlanSource {
    Ai,
    Fallback(FallbackReason),
}

impl PlanSource {
    pub fn is_fallback(&self) -> bool {
        matches!(self, PlanSource::Fallback(_))
    }
}

/// Result envelope of every generation call.
#[derive(Debug, Clone, Serialize)]
pub struct Generated<T> {
    pub value: T,
    pub source: PlanSource,
    /// Clamps, defaults and coercions applied while normalising.
    pub warnings: Vec<String>,
    #[serde(skip)]
    pub raw_response: Option<String>,
}

impl<T> Generated<T> {
    pub fn ai(value: T, warnings: Vec<String>) -> Self {
        Self { value, source: PlanSource::Ai, warnings, raw_response: None }
    }

    pub fn fallback(value: T, reason: FallbackReason) -> Self {
        Self {
            value,
            source: PlanSource::Fallback(reason),
            warnings: Vec::new(),
            raw_response: None,
        }
    }

    pub fn with_raw_response(mut self, raw: impl Into<String>) -> Self {
        self.raw_response = Some(raw.into());
        self
    }
}
