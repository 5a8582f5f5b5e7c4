use crate::plan::{MAX_REPS, MIN_REPS};
use crate::profile::Profile;

fn profile_block(p: &Profile) -> String {
    format!(
"User profile:
- Age: {age}
- Weight: {weight} kg
- Height: {height} cm
- Gender: {gender}
- Activity level: {activity}
- Goal: {goal} ({goal_key})
- Training days per week: {days}",
        age = p.age,
        weight = p.weight_kg,
        height = p.height_cm,
        gender = p.gender.as_str(),
        activity = p.activity_level.as_str(),
        goal = p.fitness_goal.describe(),
        goal_key = p.fitness_goal.as_str(),
        days = p.workout_days(),
    )
}

fn json_only_rules() -> &'static str {
r#"Output rules:
- Respond with JSON ONLY. No Markdown, no code fences, no comments, no text before or after.
- Use exactly the field names shown. Numbers must be plain JSON numbers, not strings or ranges.
- All user-facing text (names, descriptions, instructions) in Brazilian Portuguese."#
}

pub fn build_workout_prompt(p: &Profile) -> String {
    let days = p.workout_days();
    format!(
r#"You are a certified strength and conditioning coach.
Create {days} distinct workout plan(s), one per training day, for the user below.

{profile}

Requirements:
- Return a JSON ARRAY with exactly {days} element(s).
- Name each workout "Treino <Letter> - <Muscle groups>", letters in order starting at A (e.g. "Treino A - Peito e Tríceps").
- Each workout has 5 to 8 exercises and lasts between 30 and 90 minutes.
- "reps" is a single integer between {min_reps} and {max_reps}. Never use ranges like "8-12" or values above {max_reps}.
- "difficulty_level" is one of: "beginner", "intermediate", "advanced".
- Balance muscle groups across the week and match volume to the goal and activity level.

Schema:
[
  {{
    "name": "Treino A - Peito e Tríceps",
    "description": "string",
    "duration_minutes": 60,
    "difficulty_level": "beginner" | "intermediate" | "advanced",
    "exercises": [
      {{
        "name": "string",
        "description": "execution instructions",
        "sets": 3,
        "reps": 12,
        "rest_seconds": 60,
        "muscle_groups": ["string"],
        "equipment": "string"
      }}
    ]
  }}
]

{rules}"#,
        days = days,
        profile = profile_block(p),
        min_reps = MIN_REPS,
        max_reps = MAX_REPS,
        rules = json_only_rules(),
    )
}

pub fn build_nutrition_prompt(p: &Profile) -> String {
    format!(
r#"You are a registered sports nutritionist.
Create one daily nutrition plan for the user below.

{profile}
- Allergies (must NEVER appear in any food): {allergies}
- Dietary restrictions (must be respected): {restrictions}

Requirements:
- Return a single JSON OBJECT.
- Exactly 4 meals, in this order: "breakfast", "lunch", "snack", "dinner".
- "meal_type" is one of: "breakfast", "lunch", "dinner", "snack".
- "total_calories" is an integer matching the goal (deficit to lose weight, surplus to gain muscle).
- Every food has a numeric "quantity", a "unit" (g, ml, unidade, colher) and the total "calories" for that quantity.
- Prefer foods commonly available in Brazil.

Schema:
{{
  "name": "string",
  "description": "string",
  "total_calories": 2000,
  "meals": [
    {{
      "meal_type": "breakfast" | "lunch" | "dinner" | "snack",
      "name": "string",
      "suggested_time": "07:00",
      "calories": 500,
      "protein": 30,
      "carbs": 60,
      "fat": 15,
      "fiber": 8,
      "foods": [
        {{ "food_name": "string", "quantity": 100, "unit": "g", "calories": 150 }}
      ]
    }}
  ]
}}

{rules}"#,
        profile = profile_block(p),
        allergies = Profile::list_or_none(&p.allergies),
        restrictions = Profile::list_or_none(&p.dietary_restrictions),
        rules = json_only_rules(),
    )
}

pub fn build_goal_prompt(p: &Profile) -> String {
    format!(
r#"You are a fitness coach helping a user set realistic goals.

{profile}
- Dietary restrictions: {restrictions}

Suggest 3 to 5 specific, measurable goals for the next 4 to 12 weeks that fit the profile and main goal.
Each goal is one short sentence.

Return a JSON ARRAY of strings, for example:
["Treinar 3 vezes por semana durante 8 semanas", "Beber 2 litros de água por dia"]

{rules}"#,
        profile = profile_block(p),
        restrictions = Profile::list_or_none(&p.dietary_restrictions),
        rules = json_only_rules(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::sample_profile;

    #[test]
    fn workout_prompt_states_day_count_and_rep_bounds() {
        let mut p = sample_profile();
        p.gym_days_per_week = 5;
        let s = build_workout_prompt(&p);
        assert!(s.contains("Create 5 distinct workout plan(s)"));
        assert!(s.contains("exactly 5 element(s)"));
        assert!(s.contains("between 4 and 20"));
        assert!(s.contains("\"beginner\" | \"intermediate\" | \"advanced\""));
        assert!(s.contains("Goal: gain muscle mass (hypertrophy) (gain_muscle)"));
    }

    #[test]
    fn workout_prompt_uses_clamped_days() {
        let mut p = sample_profile();
        p.gym_days_per_week = 12;
        assert!(build_workout_prompt(&p).contains("exactly 7 element(s)"));
    }

    #[test]
    fn nutrition_prompt_lists_allergies_and_meal_contract() {
        let p = sample_profile();
        let s = build_nutrition_prompt(&p);
        assert!(s.contains("must NEVER appear in any food): amendoim"));
        assert!(s.contains("must be respected): lactose"));
        assert!(s.contains("Exactly 4 meals"));
        assert!(s.contains("\"total_calories\": 2000"));
    }

    #[test]
    fn goal_prompt_asks_for_string_array() {
        let mut p = sample_profile();
        p.dietary_restrictions.clear();
        let s = build_goal_prompt(&p);
        assert!(s.contains("JSON ARRAY of strings"));
        assert!(s.contains("Dietary restrictions: none"));
        assert!(s.contains("Weight: 80 kg"));
    }
}
