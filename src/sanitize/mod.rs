use chrono::Utc;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::extract::Unparseable;
use crate::fallback::{fallback_nutrition_plan, fallback_workout_plans};
use crate::plan::{
    coerce, Exercise, FallbackReason, Generated, Meal, MealFood, NutritionPlan, WorkoutPlan,
    DEFAULT_DURATION_MINUTES, DEFAULT_FOOD_QUANTITY, DEFAULT_NUTRITION_NAME, DEFAULT_REPS,
    DEFAULT_REST_SECONDS, DEFAULT_SETS, DEFAULT_TOTAL_CALORIES, DEFAULT_WORKOUT_NAME, MAX_REPS,
    MIN_REPS,
};
use crate::profile::Profile;

const MAX_SETS: u32 = 10;
const EXPECTED_MEALS: usize = 4;
const DEFAULT_EXERCISE_NAME: &str = "Exercício";
const DEFAULT_EQUIPMENT: &str = "Peso corporal";
const DEFAULT_UNIT: &str = "g";

/// Normalise parsed model output into workout plans, substituting the canned
/// plans when the candidate is not a usable array.
pub fn normalize_workout_plans(
    parsed: Result<Value, Unparseable>,
    profile: &Profile,
) -> Generated<Vec<WorkoutPlan>> {
    match parsed.and_then(|v| sanitize_workout_plans(&v, profile.workout_days())) {
        Ok((plans, warnings)) => Generated::ai(plans, warnings),
        Err(Unparseable) => {
            tracing::warn!("workout candidate unusable, substituting fallback plans");
            Generated::fallback(fallback_workout_plans(profile), FallbackReason::Unparseable)
        }
    }
}

pub fn normalize_nutrition_plan(
    parsed: Result<Value, Unparseable>,
    profile: &Profile,
) -> Generated<NutritionPlan> {
    match parsed.and_then(|v| sanitize_nutrition_plan(&v)) {
        Ok((plan, warnings)) => Generated::ai(plan, warnings),
        Err(Unparseable) => {
            tracing::warn!("nutrition candidate unusable, substituting fallback plan");
            Generated::fallback(fallback_nutrition_plan(profile), FallbackReason::Unparseable)
        }
    }
}

/// Goal suggestions have no safe canned substitute: failure means no suggestions.
pub fn normalize_goal_suggestions(parsed: Result<Value, Unparseable>) -> Vec<String> {
    let Ok(Value::Array(items)) = parsed else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match item {
            Value::Object(o) => ["goal", "title", "description", "text"]
                .iter()
                .find_map(|k| coerce::text(o.get(*k))),
            other => coerce::text(Some(other)),
        })
        .collect()
}

/// Field-level clean-up of a workout array. Only a structural failure (not an
/// array, or an empty one) is an error; every field defect is repaired and
/// reported as a warning.
pub fn sanitize_workout_plans(
    value: &Value,
    days: usize,
) -> Result<(Vec<WorkoutPlan>, Vec<String>), Unparseable> {
    let items = value.as_array().ok_or(Unparseable)?;
    if items.is_empty() {
        return Err(Unparseable);
    }
    let mut warnings = Vec::new();
    if items.len() > days {
        warnings.push(format!(
            "model returned {} workouts for {} day(s); extra dropped",
            items.len(),
            days
        ));
    }
    let now = Utc::now();
    let plans = items
        .iter()
        .take(days)
        .enumerate()
        .map(|(i, item)| sanitize_workout(item, i, now, &mut warnings))
        .collect();
    Ok((plans, warnings))
}

fn sanitize_workout(
    item: &Value,
    idx: usize,
    now: chrono::DateTime<Utc>,
    warnings: &mut Vec<String>,
) -> WorkoutPlan {
    let empty = Map::new();
    let obj = match item.as_object() {
        Some(o) => o,
        None => {
            warnings.push(format!("workout #{} is not an object; kept empty", idx + 1));
            &empty
        }
    };

    let name = coerce::text(obj.get("name")).unwrap_or_else(|| {
        warnings.push(format!("workout #{} missing name", idx + 1));
        DEFAULT_WORKOUT_NAME.to_string()
    });

    let duration_minutes = match coerce::int(obj.get("duration_minutes")) {
        Some(d) if d > 0 => u32::try_from(d).unwrap_or(DEFAULT_DURATION_MINUTES),
        _ => {
            warnings.push(format!("{name}: duration defaulted to {DEFAULT_DURATION_MINUTES} min"));
            DEFAULT_DURATION_MINUTES
        }
    };

    let raw_difficulty = coerce::text(obj.get("difficulty_level")).unwrap_or_default();
    let difficulty_level = coerce::difficulty(&raw_difficulty).unwrap_or_else(|| {
        warnings.push(format!("{name}: difficulty '{raw_difficulty}' coerced to intermediate"));
        coerce::DEFAULT_DIFFICULTY
    });

    let exercises = match obj.get("exercises") {
        Some(Value::Array(list)) => list
            .iter()
            .enumerate()
            .filter_map(|(j, e)| sanitize_exercise(e, &name, j, warnings))
            .collect(),
        _ => {
            warnings.push(format!("{name}: no exercise list"));
            Vec::new()
        }
    };

    WorkoutPlan {
        id: Uuid::new_v4(),
        name,
        description: coerce::text(obj.get("description")).unwrap_or_default(),
        duration_minutes,
        difficulty_level,
        exercises,
        created_at: now,
    }
}

/// Force a rep count into `[MIN_REPS, MAX_REPS]`; missing or unreadable
/// values take the default.
pub fn clamp_reps(raw: Option<&Value>) -> (u32, Option<String>) {
    match coerce::int(raw) {
        None => (DEFAULT_REPS, Some(format!("reps missing, defaulted to {DEFAULT_REPS}"))),
        Some(r) => {
            let clamped = r.clamp(MIN_REPS as i64, MAX_REPS as i64) as u32;
            if clamped as i64 != r {
                (clamped, Some(format!("reps {r} clamped to {clamped}")))
            } else {
                (clamped, None)
            }
        }
    }
}

fn sanitize_exercise(
    item: &Value,
    workout: &str,
    idx: usize,
    warnings: &mut Vec<String>,
) -> Option<Exercise> {
    let Some(obj) = item.as_object() else {
        warnings.push(format!("{workout}: exercise #{} is not an object; dropped", idx + 1));
        return None;
    };
    let name = coerce::text(obj.get("name")).unwrap_or_else(|| DEFAULT_EXERCISE_NAME.to_string());

    let (reps, note) = clamp_reps(obj.get("reps"));
    if let Some(note) = note {
        warnings.push(format!("{workout} / {name}: {note}"));
    }

    let sets = match coerce::int(obj.get("sets")) {
        Some(s) if s >= 1 => s.min(MAX_SETS as i64) as u32,
        _ => DEFAULT_SETS,
    };
    let rest_seconds = match coerce::int(obj.get("rest_seconds")) {
        Some(r) if r >= 0 => u32::try_from(r).unwrap_or(DEFAULT_REST_SECONDS),
        _ => DEFAULT_REST_SECONDS,
    };

    Some(Exercise {
        description: coerce::text(obj.get("description"))
            .or_else(|| coerce::text(obj.get("instructions")))
            .unwrap_or_default(),
        sets,
        reps,
        rest_seconds,
        muscle_groups: coerce::string_list(obj.get("muscle_groups")),
        equipment: coerce::text(obj.get("equipment")).unwrap_or_else(|| DEFAULT_EQUIPMENT.to_string()),
        name,
    })
}

pub fn sanitize_nutrition_plan(value: &Value) -> Result<(NutritionPlan, Vec<String>), Unparseable> {
    let obj = value.as_object().ok_or(Unparseable)?;
    let mut warnings = Vec::new();

    let total_calories = match coerce::int(obj.get("total_calories")) {
        Some(c) if c > 0 => u32::try_from(c).unwrap_or(DEFAULT_TOTAL_CALORIES),
        _ => {
            warnings.push(format!("total_calories defaulted to {DEFAULT_TOTAL_CALORIES}"));
            DEFAULT_TOTAL_CALORIES
        }
    };

    let meals: Vec<Meal> = match obj.get("meals") {
        Some(Value::Array(list)) => list
            .iter()
            .enumerate()
            .filter_map(|(i, m)| sanitize_meal(m, i, &mut warnings))
            .collect(),
        Some(_) => {
            warnings.push("meals is not a list; no meals kept".to_string());
            Vec::new()
        }
        None => {
            warnings.push("meals missing".to_string());
            Vec::new()
        }
    };
    if !meals.is_empty() && meals.len() != EXPECTED_MEALS {
        warnings.push(format!("expected {EXPECTED_MEALS} meals, got {}", meals.len()));
    }

    let plan = NutritionPlan {
        id: Uuid::new_v4(),
        name: coerce::text(obj.get("name")).unwrap_or_else(|| DEFAULT_NUTRITION_NAME.to_string()),
        description: coerce::text(obj.get("description")).unwrap_or_default(),
        total_calories,
        meals,
        created_at: Utc::now(),
    };
    Ok((plan, warnings))
}

fn sanitize_meal(item: &Value, idx: usize, warnings: &mut Vec<String>) -> Option<Meal> {
    let Some(obj) = item.as_object() else {
        warnings.push(format!("meal #{} is not an object; dropped", idx + 1));
        return None;
    };
    let raw_type = coerce::text(obj.get("meal_type"))
        .or_else(|| coerce::text(obj.get("type")))
        .unwrap_or_default();
    let meal_type = coerce::meal_type(&raw_type).unwrap_or_else(|| {
        warnings.push(format!("meal #{}: type '{raw_type}' coerced to snack", idx + 1));
        coerce::DEFAULT_MEAL_TYPE
    });

    let foods = match obj.get("foods") {
        Some(Value::Array(list)) => list.iter().filter_map(|f| sanitize_food(f, warnings)).collect(),
        _ => Vec::new(),
    };

    Some(Meal {
        meal_type,
        name: coerce::text(obj.get("name")).unwrap_or_else(|| meal_type.default_name().to_string()),
        suggested_time: coerce::text(obj.get("suggested_time"))
            .or_else(|| coerce::text(obj.get("time")))
            .unwrap_or_else(|| meal_type.default_time().to_string()),
        calories: coerce::number(obj.get("calories")),
        protein: coerce::number(obj.get("protein")),
        carbs: coerce::number(obj.get("carbs")),
        fat: coerce::number(obj.get("fat")),
        fiber: coerce::number(obj.get("fiber")),
        foods,
    })
}

fn sanitize_food(item: &Value, warnings: &mut Vec<String>) -> Option<MealFood> {
    let obj = item.as_object()?;
    let food_name = coerce::text(obj.get("food_name")).or_else(|| coerce::text(obj.get("name")))?;
    let quantity = match coerce::number(obj.get("quantity")) {
        Some(q) if q > 0.0 => q,
        _ => {
            warnings.push(format!("{food_name}: quantity defaulted to {DEFAULT_FOOD_QUANTITY}"));
            DEFAULT_FOOD_QUANTITY
        }
    };
    let calories_per_unit = coerce::number(obj.get("calories"))
        .map(|c| c / quantity)
        .or_else(|| coerce::number(obj.get("calories_per_unit")))
        .unwrap_or(0.0);

    Some(MealFood {
        unit: coerce::text(obj.get("unit")).unwrap_or_else(|| DEFAULT_UNIT.to_string()),
        food_name,
        quantity,
        calories_per_unit,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{Difficulty, MealType, PlanSource};
    use crate::profile::sample_profile;
    use serde_json::json;

    #[test]
    fn reps_always_land_inside_bounds() {
        for raw in [json!(1000), json!(0), json!(-3), json!("8-10"), json!("abc"), json!(null), json!(12.7)] {
            let (reps, _) = clamp_reps(Some(&raw));
            assert!((MIN_REPS..=MAX_REPS).contains(&reps), "{raw} -> {reps}");
        }
        assert_eq!(clamp_reps(Some(&json!("8-10"))).0, 8);
        assert_eq!(clamp_reps(Some(&json!(1000))).0, 20);
        assert_eq!(clamp_reps(Some(&json!(0))).0, 4);
        assert_eq!(clamp_reps(None), (DEFAULT_REPS, Some("reps missing, defaulted to 12".into())));
        assert_eq!(clamp_reps(Some(&json!(15))), (15, None));
    }

    #[test]
    fn workout_defaults_and_coercions() {
        let v = json!([
            {"exercises": [{"name": "Supino", "reps": 100, "sets": "4", "muscle_groups": "peito, tríceps"}]},
            {"name": "Treino B - Costas", "difficulty_level": "Avançado", "duration_minutes": 45, "exercises": []}
        ]);
        let (plans, warnings) = sanitize_workout_plans(&v, 3).unwrap();
        assert_eq!(plans.len(), 2);
        assert_eq!(plans[0].name, DEFAULT_WORKOUT_NAME);
        assert_eq!(plans[0].duration_minutes, 60);
        assert_eq!(plans[0].difficulty_level, Difficulty::Intermediate);
        let ex = &plans[0].exercises[0];
        assert_eq!((ex.reps, ex.sets, ex.rest_seconds), (20, 4, 60));
        assert_eq!(ex.muscle_groups, vec!["peito", "tríceps"]);
        assert_eq!(ex.equipment, DEFAULT_EQUIPMENT);
        assert_eq!(plans[1].difficulty_level, Difficulty::Advanced);
        assert_eq!(plans[1].duration_minutes, 45);
        assert!(plans[1].exercises.is_empty());
        assert!(warnings.iter().any(|w| w.contains("reps 100 clamped to 20")));
    }

    #[test]
    fn non_object_entries_become_empty_plans() {
        let (plans, _) = sanitize_workout_plans(&json!(["oops", 3]), 5).unwrap();
        assert_eq!(plans.len(), 2);
        assert!(plans.iter().all(|p| p.exercises.is_empty() && p.name == DEFAULT_WORKOUT_NAME));
    }

    #[test]
    fn extra_workouts_are_truncated_to_days() {
        let v = json!([{"name": "A"}, {"name": "B"}, {"name": "C"}]);
        let (plans, warnings) = sanitize_workout_plans(&v, 2).unwrap();
        assert_eq!(plans.len(), 2);
        assert!(warnings[0].contains("extra dropped"));
    }

    #[test]
    fn non_array_or_empty_workouts_fall_back() {
        let p = sample_profile();
        for parsed in [Ok(json!({"name": "x"})), Ok(json!([])), Err(Unparseable)] {
            let g = normalize_workout_plans(parsed, &p);
            assert_eq!(g.source, PlanSource::Fallback(FallbackReason::Unparseable));
            assert_eq!(g.value.len(), 3);
        }
    }

    #[test]
    fn ai_workouts_are_marked_ai() {
        let g = normalize_workout_plans(Ok(json!([{"name": "Treino A - Full Body"}])), &sample_profile());
        assert_eq!(g.source, PlanSource::Ai);
        assert_eq!(g.value[0].name, "Treino A - Full Body");
    }

    #[test]
    fn nutrition_tolerates_missing_or_bad_meals() {
        let (plan, _) = sanitize_nutrition_plan(&json!({"name": "Plano"})).unwrap();
        assert!(plan.meals.is_empty());
        assert_eq!(plan.total_calories, 2000);

        let (plan, warnings) = sanitize_nutrition_plan(&json!({"meals": "none", "total_calories": "1800 kcal"})).unwrap();
        assert!(plan.meals.is_empty());
        assert_eq!(plan.total_calories, 1800);
        assert!(warnings.iter().any(|w| w.contains("not a list")));
    }

    #[test]
    fn meal_foods_get_per_unit_calories_with_zero_quantity_guard() {
        let v = json!({
            "total_calories": 2200,
            "meals": [{
                "meal_type": "Almoço",
                "calories": "650",
                "foods": [
                    {"food_name": "Arroz", "quantity": 150, "unit": "g", "calories": 195},
                    {"food_name": "Frango", "quantity": 0, "calories": 165},
                    {"name": "Salada"},
                    {"quantity": 10}
                ]
            }, {"meal_type": "brunch"}]
        });
        let (plan, warnings) = sanitize_nutrition_plan(&v).unwrap();
        let lunch = &plan.meals[0];
        assert_eq!(lunch.meal_type, MealType::Lunch);
        assert_eq!(lunch.name, "Almoço");
        assert_eq!(lunch.suggested_time, "12:30");
        assert_eq!(lunch.calories, Some(650.0));
        assert_eq!(lunch.protein, None);
        assert_eq!(lunch.foods.len(), 3);
        assert!((lunch.foods[0].calories_per_unit - 1.3).abs() < 1e-9);
        assert_eq!(lunch.foods[1].quantity, 100.0);
        assert!((lunch.foods[1].calories_per_unit - 1.65).abs() < 1e-9);
        assert_eq!(lunch.foods[2].calories_per_unit, 0.0);
        assert_eq!(lunch.foods[2].unit, "g");
        assert_eq!(plan.meals[1].meal_type, MealType::Snack);
        assert!(warnings.iter().any(|w| w.contains("expected 4 meals, got 2")));
    }

    #[test]
    fn nutrition_non_object_falls_back() {
        let g = normalize_nutrition_plan(Ok(json!([1, 2])), &sample_profile());
        assert!(g.source.is_fallback());
        assert_eq!(g.value.meals.len(), 4);
    }

    #[test]
    fn goal_suggestions_degrade_to_empty() {
        assert!(normalize_goal_suggestions(Err(Unparseable)).is_empty());
        assert!(normalize_goal_suggestions(Ok(json!({"goals": "x"}))).is_empty());
        let goals = normalize_goal_suggestions(Ok(json!([
            "Perder 4 kg em 8 semanas", "  ", {"title": "Correr 5 km"}, {"x": 1}, null
        ])));
        assert_eq!(goals, vec!["Perder 4 kg em 8 semanas", "Correr 5 km"]);
    }
}
