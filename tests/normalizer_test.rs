use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::json;
use std::sync::Arc;

use fitplan::completion::CompletionClient;
use fitplan::errors::{CompletionError, ProviderError};
use fitplan::plan::{Difficulty, FallbackReason, MealType, PlanSource};
use fitplan::profile::{ActivityLevel, FitnessGoal, Gender, Profile};
use fitplan::provider::CompletionProvider;
use fitplan::retry::RetryPolicy;
use fitplan::service::{FailurePolicy, PlanNormalizer};

type Reply = Box<dyn Fn(&str) -> Result<String, ProviderError> + Send + Sync>;

/// Answers each prompt through a closure and counts the calls.
struct Stub {
    reply: Reply,
    calls: Arc<Mutex<usize>>,
    credential: bool,
}

#[async_trait]
impl CompletionProvider for Stub {
    fn name(&self) -> &str {
        "stub"
    }

    fn has_credential(&self) -> bool {
        self.credential
    }

    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        *self.calls.lock() += 1;
        (self.reply)(prompt)
    }
}

fn normalizer(
    reply: impl Fn(&str) -> Result<String, ProviderError> + Send + Sync + 'static,
    policy: FailurePolicy,
) -> (PlanNormalizer, Arc<Mutex<usize>>) {
    let calls = Arc::new(Mutex::new(0));
    let stub = Stub { reply: Box::new(reply), calls: calls.clone(), credential: true };
    let client = CompletionClient::new(Box::new(stub), RetryPolicy::default());
    (PlanNormalizer::new(client, policy), calls)
}

fn profile(days: u8) -> Profile {
    Profile {
        age: 28,
        weight_kg: 72.5,
        height_cm: 170.0,
        gender: Gender::Female,
        activity_level: ActivityLevel::Active,
        fitness_goal: FitnessGoal::LoseWeight,
        gym_days_per_week: days,
        allergies: vec!["camarão".into()],
        dietary_restrictions: Vec::new(),
    }
}

fn overloaded(_: &str) -> Result<String, ProviderError> {
    Err(ProviderError::with_status(503, "The model is overloaded"))
}

fn is_workout(prompt: &str) -> bool {
    prompt.contains("strength and conditioning coach")
}

fn is_nutrition(prompt: &str) -> bool {
    prompt.contains("sports nutritionist")
}

#[tokio::test(start_paused = true)]
async fn overload_yields_fallback_workouts() {
    let (n, calls) = normalizer(overloaded, FailurePolicy::Fallback);

    let out = n.generate_workout_plan(&profile(3)).await.unwrap();

    assert_eq!(out.source, PlanSource::Fallback(FallbackReason::Overloaded));
    assert_eq!(out.value.len(), 3);
    assert!(out.value.iter().all(|p| p.exercises.len() == 6));
    assert_eq!(*calls.lock(), 3);
}

#[tokio::test(start_paused = true)]
async fn fallback_count_is_capped_by_template_catalog() {
    let (n, _) = normalizer(overloaded, FailurePolicy::Fallback);
    let out = n.generate_workout_plan(&profile(6)).await.unwrap();
    assert_eq!(out.value.len(), 3);

    let out = n.generate_workout_plan(&profile(2)).await.unwrap();
    assert_eq!(out.value.len(), 2);
}

#[tokio::test]
async fn ai_workouts_are_kept_and_clamped() {
    let plans: Vec<_> = (0..5)
        .map(|i| {
            json!({
                "name": format!("Treino {} - Custom", ["A", "B", "C", "D", "E"][i]),
                "description": "x",
                "duration_minutes": 50,
                "difficulty_level": "Avançado",
                "exercises": [
                    {"name": "Agachamento", "sets": 4, "reps": 30, "rest_seconds": 90,
                     "muscle_groups": ["quadríceps"], "equipment": "Barra"},
                    {"name": "Prancha", "sets": 3, "reps": 1, "rest_seconds": 30,
                     "muscle_groups": "core, abdômen"}
                ]
            })
        })
        .collect();
    let answer = format!("Here is your plan:\n```json\n{}\n```", json!(plans));
    let (n, _) = normalizer(move |_| Ok(answer.clone()), FailurePolicy::Fallback);

    let out = n.generate_workout_plan(&profile(5)).await.unwrap();

    assert_eq!(out.source, PlanSource::Ai);
    assert_eq!(out.value.len(), 5);
    assert_eq!(out.value[0].name, "Treino A - Custom");
    assert_eq!(out.value[4].name, "Treino E - Custom");
    for plan in &out.value {
        assert_eq!(plan.difficulty_level, Difficulty::Advanced);
        assert_eq!(plan.exercises[0].reps, 20);
        assert_eq!(plan.exercises[1].reps, 4);
        assert_eq!(plan.exercises[1].muscle_groups, vec!["core", "abdômen"]);
        assert!(plan.exercises.iter().all(|e| (4..=20).contains(&e.reps)));
    }
    assert!(!out.warnings.is_empty());
    assert!(out.raw_response.is_some());
}

#[tokio::test]
async fn prose_without_json_falls_back_as_unparseable() {
    let (n, calls) = normalizer(|_| Ok("Sorry, I cannot help with that.".into()), FailurePolicy::Throw);

    let out = n.generate_workout_plan(&profile(2)).await.unwrap();

    assert_eq!(out.source, PlanSource::Fallback(FallbackReason::Unparseable));
    assert_eq!(out.value.len(), 2);
    assert_eq!(*calls.lock(), 1);
}

#[tokio::test]
async fn nutrition_with_missing_meals_is_repaired() {
    let (n, _) = normalizer(
        |_| Ok(r#"{"name": "Plano Leve", "total_calories": "1800 kcal"}"#.into()),
        FailurePolicy::Fallback,
    );

    let out = n.generate_nutrition_plan(&profile(3)).await.unwrap();

    assert_eq!(out.source, PlanSource::Ai);
    assert_eq!(out.value.name, "Plano Leve");
    assert_eq!(out.value.total_calories, 1800);
    assert!(out.value.meals.is_empty());
    assert!(!out.warnings.is_empty());
}

#[tokio::test]
async fn nutrition_foods_are_normalised() {
    let answer = json!({
        "name": "Plano",
        "description": "d",
        "total_calories": 2100,
        "meals": [{
            "meal_type": "café da manhã",
            "foods": [
                {"food_name": "Aveia", "quantity": 50, "unit": "g", "calories": 190},
                {"food_name": "Banana", "quantity": 0, "calories_per_unit": 0.9},
                {"quantity": 10}
            ]
        }]
    });
    let text = answer.to_string();
    let (n, _) = normalizer(move |_| Ok(text.clone()), FailurePolicy::Fallback);

    let out = n.generate_nutrition_plan(&profile(3)).await.unwrap();
    let meal = &out.value.meals[0];

    assert_eq!(meal.meal_type, MealType::Breakfast);
    assert_eq!(meal.foods.len(), 2);
    assert_eq!(meal.foods[0].calories_per_unit, 3.8);
    assert_eq!(meal.foods[1].quantity, 100.0);
    assert_eq!(meal.foods[1].unit, "g");
}

#[tokio::test(start_paused = true)]
async fn goals_degrade_to_empty() {
    let (n, _) = normalizer(|_| Ok("no json here".into()), FailurePolicy::Fallback);
    let out = n.generate_goal_suggestions(&profile(3)).await.unwrap();
    assert!(out.value.is_empty());
    assert_eq!(out.source, PlanSource::Fallback(FallbackReason::Unparseable));

    let (n, _) = normalizer(overloaded, FailurePolicy::Fallback);
    let out = n.generate_goal_suggestions(&profile(3)).await.unwrap();
    assert!(out.value.is_empty());
    assert_eq!(out.source, PlanSource::Fallback(FallbackReason::Overloaded));
}

#[tokio::test]
async fn goals_from_array() {
    let (n, _) = normalizer(
        |_| Ok(r#"Sugestões: ["Perder 4 kg em 3 meses", "Correr 5 km"]"#.into()),
        FailurePolicy::Fallback,
    );
    let out = n.generate_goal_suggestions(&profile(3)).await.unwrap();
    assert_eq!(out.source, PlanSource::Ai);
    assert_eq!(out.value, vec!["Perder 4 kg em 3 meses", "Correr 5 km"]);
}

#[tokio::test(start_paused = true)]
async fn throw_policy_propagates_completion_errors() {
    let (n, _) = normalizer(overloaded, FailurePolicy::Throw);
    let err = n.generate_nutrition_plan(&profile(3)).await.unwrap_err();
    assert_eq!(err, CompletionError::ServiceOverloaded { attempts: 3 });

    let (n, _) = normalizer(overloaded, FailurePolicy::Fallback);
    let err = n
        .generate_workout_plan_with(&profile(3), FailurePolicy::Throw)
        .await
        .unwrap_err();
    assert_eq!(err, CompletionError::ServiceOverloaded { attempts: 3 });
}

#[tokio::test]
async fn non_retryable_error_is_communication() {
    let (n, calls) = normalizer(
        |_| Err(ProviderError::with_status(400, "API key not valid")),
        FailurePolicy::Fallback,
    );
    let out = n.generate_nutrition_plan(&profile(3)).await.unwrap();
    assert_eq!(out.source, PlanSource::Fallback(FallbackReason::Communication));
    assert_eq!(out.value.meals.len(), 4);
    assert_eq!(*calls.lock(), 1);
}

#[tokio::test]
async fn missing_credential_always_propagates() {
    let calls = Arc::new(Mutex::new(0));
    let stub = Stub { reply: Box::new(overloaded), calls: calls.clone(), credential: false };
    let client = CompletionClient::new(Box::new(stub), RetryPolicy::default());
    let n = PlanNormalizer::new(client, FailurePolicy::Fallback);

    let err = n.generate_workout_plan(&profile(3)).await.unwrap_err();

    assert_eq!(err, CompletionError::MissingCredential("stub".into()));
    assert_eq!(*calls.lock(), 0);
}

#[tokio::test(start_paused = true)]
async fn generate_all_runs_each_generation() {
    let (n, calls) = normalizer(
        |prompt| {
            if is_workout(prompt) {
                Ok(r#"[{"name": "Treino A - Full Body", "exercises": []}]"#.into())
            } else if is_nutrition(prompt) {
                Err(ProviderError::with_status(503, "overloaded"))
            } else {
                Ok(r#"["Dormir 8 horas"]"#.into())
            }
        },
        FailurePolicy::Fallback,
    );

    let bundle = n.generate_all(&profile(1)).await.unwrap();

    assert_eq!(bundle.workouts.source, PlanSource::Ai);
    assert_eq!(bundle.workouts.value[0].name, "Treino A - Full Body");
    assert_eq!(bundle.nutrition.source, PlanSource::Fallback(FallbackReason::Overloaded));
    assert_eq!(bundle.nutrition.value.total_calories, 2000);
    assert_eq!(bundle.goals.value, vec!["Dormir 8 horas"]);
    assert_eq!(*calls.lock(), 1 + 3 + 1);
}

#[tokio::test]
async fn goals_without_credential_resolve_empty() {
    let calls = Arc::new(Mutex::new(0));
    let stub = Stub { reply: Box::new(overloaded), calls: calls.clone(), credential: false };
    let client = CompletionClient::new(Box::new(stub), RetryPolicy::default());
    let n = PlanNormalizer::new(client, FailurePolicy::Fallback);

    let out = n.generate_goal_suggestions(&profile(3)).await.unwrap();

    assert!(out.value.is_empty());
    assert_eq!(out.source, PlanSource::Fallback(FallbackReason::MissingCredential));
    assert_eq!(*calls.lock(), 0);

    let err = n
        .generate_goal_suggestions_with(&profile(3), FailurePolicy::Throw)
        .await
        .unwrap_err();
    assert_eq!(err, CompletionError::MissingCredential("stub".into()));
}
