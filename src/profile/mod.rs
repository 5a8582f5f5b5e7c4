use anyhow::{bail, Context, Result};
use fs_err as fs;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const MIN_GYM_DAYS: u8 = 1;
pub const MAX_GYM_DAYS: u8 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Sedentary,
    Light,
    Moderate,
    Active,
    VeryActive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitnessGoal {
    LoseWeight,
    GainMuscle,
    MaintainWeight,
    ImproveEndurance,
    GeneralFitness,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
        }
    }
}

impl ActivityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "sedentary",
            ActivityLevel::Light => "light",
            ActivityLevel::Moderate => "moderate",
            ActivityLevel::Active => "active",
            ActivityLevel::VeryActive => "very_active",
        }
    }
}

impl FitnessGoal {
    pub fn as_str(&self) -> &'static str {
        match self {
            FitnessGoal::LoseWeight => "lose_weight",
            FitnessGoal::GainMuscle => "gain_muscle",
            FitnessGoal::MaintainWeight => "maintain_weight",
            FitnessGoal::ImproveEndurance => "improve_endurance",
            FitnessGoal::GeneralFitness => "general_fitness",
        }
    }

    /// Plain-language phrasing used inside prompts.
    pub fn describe(&self) -> &'static str {
        match self {
            FitnessGoal::LoseWeight => "lose weight / reduce body fat",
            FitnessGoal::GainMuscle => "gain muscle mass (hypertrophy)",
            FitnessGoal::MaintainWeight => "maintain current weight",
            FitnessGoal::ImproveEndurance => "improve cardiovascular endurance",
            FitnessGoal::GeneralFitness => "improve general fitness",
        }
    }
}

/// User profile as handed over by the caller. Read-only to this crate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub age: u32,
    pub weight_kg: f64,
    pub height_cm: f64,
    pub gender: Gender,
    pub activity_level: ActivityLevel,
    pub fitness_goal: FitnessGoal,
    pub gym_days_per_week: u8,
    #[serde(default)]
    pub allergies: Vec<String>,
    #[serde(default)]
    pub dietary_restrictions: Vec<String>,
}

impl Profile {
    /// Number of workout plans to request, clamped to 1..=7.
    pub fn workout_days(&self) -> usize {
        let days = self.gym_days_per_week.clamp(MIN_GYM_DAYS, MAX_GYM_DAYS);
        if days != self.gym_days_per_week {
            tracing::warn!(
                requested = self.gym_days_per_week,
                clamped = days,
                "gym_days_per_week out of range"
            );
        }
        days as usize
    }

    pub fn validate(&self) -> Result<()> {
        if self.age == 0 {
            bail!("profile age must be positive");
        }
        if !(self.weight_kg > 0.0) {
            bail!("profile weight_kg must be positive (got {})", self.weight_kg);
        }
        if !(self.height_cm > 0.0) {
            bail!("profile height_cm must be positive (got {})", self.height_cm);
        }
        Ok(())
    }

    /// Comma-separated rendering of a free-text set, "none" when empty.
    pub fn list_or_none(items: &[String]) -> String {
        let cleaned: Vec<&str> = items
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect();
        if cleaned.is_empty() {
            "none".to_string()
        } else {
            cleaned.join(", ")
        }
    }
}

/// Load a profile from a JSON, YAML or TOML file, chosen by extension.
pub fn load_profile(path: &Path) -> Result<Profile> {
    let text = fs::read_to_string(path)?;
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    let profile: Profile = match ext.as_str() {
        "yaml" | "yml" => serde_yaml::from_str(&text)
            .with_context(|| format!("invalid YAML profile {}", path.display()))?,
        "toml" => toml::from_str(&text)
            .with_context(|| format!("invalid TOML profile {}", path.display()))?,
        _ => serde_json::from_str(&text)
            .with_context(|| format!("invalid JSON profile {}", path.display()))?,
    };
    profile.validate()?;
    Ok(profile)
}

#[cfg(test)]
pub(crate) fn sample_profile() -> Profile {
    Profile {
        age: 30,
        weight_kg: 80.0,
        height_cm: 178.0,
        gender: Gender::Male,
        activity_level: ActivityLevel::Moderate,
        fitness_goal: FitnessGoal::GainMuscle,
        gym_days_per_week: 3,
        allergies: vec!["amendoim".into()],
        dietary_restrictions: vec!["lactose".into()],
    }
}
