//! Canned plans substituted when the model is unavailable or its answer
//! cannot be recovered. Templates are constants; every call instantiates them
//! with a fresh id and timestamp.

use chrono::Utc;
use uuid::Uuid;

use crate::plan::{Difficulty, Exercise, Meal, MealFood, MealType, NutritionPlan, WorkoutPlan};
use crate::profile::Profile;

struct ExerciseTemplate {
    name: &'static str,
    description: &'static str,
    sets: u32,
    reps: u32,
    rest_seconds: u32,
    muscle_groups: &'static [&'static str],
    equipment: &'static str,
}

struct WorkoutTemplate {
    name: &'static str,
    description: &'static str,
    duration_minutes: u32,
    exercises: [ExerciseTemplate; 6],
}

struct FoodTemplate {
    food_name: &'static str,
    quantity: f64,
    unit: &'static str,
    calories: f64,
}

struct MealTemplate {
    meal_type: MealType,
    name: &'static str,
    suggested_time: &'static str,
    calories: f64,
    protein: f64,
    carbs: f64,
    fat: f64,
    fiber: f64,
    foods: &'static [FoodTemplate],
}

const WORKOUT_TEMPLATES: [WorkoutTemplate; 3] = [
    WorkoutTemplate {
        name: "Treino A - Peito e Tríceps",
        description: "Treino de empurrar com foco em peitoral, ombro anterior e tríceps.",
        duration_minutes: 60,
        exercises: [
            ExerciseTemplate { name: "Supino Reto", description: "Deite no banco, desça a barra até o peito e empurre até estender os braços.", sets: 4, reps: 10, rest_seconds: 90, muscle_groups: &["peito", "tríceps", "ombros"], equipment: "Barra e banco" },
            ExerciseTemplate { name: "Supino Inclinado com Halteres", description: "Banco a 30 graus, desça os halteres na linha do peito e empurre para cima.", sets: 3, reps: 12, rest_seconds: 75, muscle_groups: &["peito", "ombros"], equipment: "Halteres e banco inclinado" },
            ExerciseTemplate { name: "Crucifixo", description: "Abra os braços com leve flexão nos cotovelos e feche contraindo o peitoral.", sets: 3, reps: 12, rest_seconds: 60, muscle_groups: &["peito"], equipment: "Halteres" },
            ExerciseTemplate { name: "Desenvolvimento com Halteres", description: "Sentado, empurre os halteres acima da cabeça sem travar os cotovelos.", sets: 3, reps: 10, rest_seconds: 75, muscle_groups: &["ombros", "tríceps"], equipment: "Halteres" },
            ExerciseTemplate { name: "Tríceps Pulley", description: "Estenda os cotovelos empurrando a barra para baixo, mantendo os braços junto ao corpo.", sets: 3, reps: 12, rest_seconds: 60, muscle_groups: &["tríceps"], equipment: "Polia" },
            ExerciseTemplate { name: "Tríceps Francês", description: "Com um halter atrás da cabeça, estenda os cotovelos até os braços ficarem retos.", sets: 3, reps: 12, rest_seconds: 60, muscle_groups: &["tríceps"], equipment: "Halter" },
        ],
    },
    WorkoutTemplate {
        name: "Treino B - Costas e Bíceps",
        description: "Treino de puxar com foco em dorsais, trapézio e bíceps.",
        duration_minutes: 60,
        exercises: [
            ExerciseTemplate { name: "Puxada Frontal", description: "Puxe a barra até a parte superior do peito, contraindo as escápulas.", sets: 4, reps: 10, rest_seconds: 90, muscle_groups: &["costas", "bíceps"], equipment: "Polia alta" },
            ExerciseTemplate { name: "Remada Curvada", description: "Tronco inclinado, puxe a barra em direção ao abdômen mantendo a coluna neutra.", sets: 4, reps: 10, rest_seconds: 90, muscle_groups: &["costas", "bíceps"], equipment: "Barra" },
            ExerciseTemplate { name: "Remada Unilateral", description: "Apoie um joelho no banco e puxe o halter em direção ao quadril.", sets: 3, reps: 12, rest_seconds: 60, muscle_groups: &["costas"], equipment: "Halter e banco" },
            ExerciseTemplate { name: "Pulldown com Braços Estendidos", description: "Com os braços estendidos, leve a barra até as coxas contraindo as dorsais.", sets: 3, reps: 12, rest_seconds: 60, muscle_groups: &["costas"], equipment: "Polia alta" },
            ExerciseTemplate { name: "Rosca Direta", description: "Flexione os cotovelos levando a barra até os ombros sem balançar o tronco.", sets: 3, reps: 12, rest_seconds: 60, muscle_groups: &["bíceps"], equipment: "Barra" },
            ExerciseTemplate { name: "Rosca Martelo", description: "Com pegada neutra, flexione os cotovelos alternando os braços.", sets: 3, reps: 12, rest_seconds: 60, muscle_groups: &["bíceps", "antebraços"], equipment: "Halteres" },
        ],
    },
    WorkoutTemplate {
        name: "Treino C - Pernas e Ombros",
        description: "Treino de membros inferiores com complemento de deltoides.",
        duration_minutes: 70,
        exercises: [
            ExerciseTemplate { name: "Agachamento Livre", description: "Desça flexionando quadril e joelhos até as coxas ficarem paralelas ao chão.", sets: 4, reps: 10, rest_seconds: 120, muscle_groups: &["quadríceps", "glúteos"], equipment: "Barra" },
            ExerciseTemplate { name: "Leg Press", description: "Empurre a plataforma estendendo os joelhos sem travá-los no final.", sets: 4, reps: 12, rest_seconds: 90, muscle_groups: &["quadríceps", "glúteos"], equipment: "Leg press" },
            ExerciseTemplate { name: "Stiff", description: "Com joelhos semiflexionados, desça a barra rente às pernas mantendo a coluna neutra.", sets: 3, reps: 10, rest_seconds: 90, muscle_groups: &["posteriores de coxa", "glúteos"], equipment: "Barra" },
            ExerciseTemplate { name: "Cadeira Extensora", description: "Estenda os joelhos até as pernas ficarem retas e desça controlando.", sets: 3, reps: 15, rest_seconds: 60, muscle_groups: &["quadríceps"], equipment: "Cadeira extensora" },
            ExerciseTemplate { name: "Elevação Lateral", description: "Eleve os halteres lateralmente até a altura dos ombros.", sets: 3, reps: 15, rest_seconds: 60, muscle_groups: &["ombros"], equipment: "Halteres" },
            ExerciseTemplate { name: "Panturrilha em Pé", description: "Eleve os calcanhares o máximo possível e desça alongando a panturrilha.", sets: 4, reps: 15, rest_seconds: 45, muscle_groups: &["panturrilhas"], equipment: "Máquina de panturrilha" },
        ],
    },
];

const NUTRITION_NAME: &str = "Plano Nutricional Equilibrado";
const NUTRITION_DESCRIPTION: &str =
    "Plano padrão com quatro refeições balanceadas. Ajuste as porções conforme sua rotina.";
const NUTRITION_TOTAL_CALORIES: u32 = 2000;

const MEAL_TEMPLATES: [MealTemplate; 4] = [
    MealTemplate {
        meal_type: MealType::Breakfast,
        name: "Café da Manhã",
        suggested_time: "07:00",
        calories: 450.0, protein: 25.0, carbs: 55.0, fat: 14.0, fiber: 7.0,
        foods: &[
            FoodTemplate { food_name: "Pão integral", quantity: 2.0, unit: "fatias", calories: 140.0 },
            FoodTemplate { food_name: "Ovos mexidos", quantity: 2.0, unit: "unidades", calories: 156.0 },
            FoodTemplate { food_name: "Mamão", quantity: 150.0, unit: "g", calories: 60.0 },
            FoodTemplate { food_name: "Aveia em flocos", quantity: 25.0, unit: "g", calories: 94.0 },
        ],
    },
    MealTemplate {
        meal_type: MealType::Lunch,
        name: "Almoço",
        suggested_time: "12:30",
        calories: 650.0, protein: 45.0, carbs: 70.0, fat: 18.0, fiber: 10.0,
        foods: &[
            FoodTemplate { food_name: "Arroz integral", quantity: 120.0, unit: "g", calories: 150.0 },
            FoodTemplate { food_name: "Feijão carioca", quantity: 100.0, unit: "g", calories: 76.0 },
            FoodTemplate { food_name: "Peito de frango grelhado", quantity: 150.0, unit: "g", calories: 248.0 },
            FoodTemplate { food_name: "Salada de folhas com azeite", quantity: 100.0, unit: "g", calories: 110.0 },
            FoodTemplate { food_name: "Legumes cozidos", quantity: 100.0, unit: "g", calories: 66.0 },
        ],
    },
    MealTemplate {
        meal_type: MealType::Snack,
        name: "Lanche da Tarde",
        suggested_time: "16:00",
        calories: 300.0, protein: 20.0, carbs: 35.0, fat: 9.0, fiber: 4.0,
        foods: &[
            FoodTemplate { food_name: "Iogurte natural", quantity: 170.0, unit: "g", calories: 100.0 },
            FoodTemplate { food_name: "Banana", quantity: 1.0, unit: "unidade", calories: 90.0 },
            FoodTemplate { food_name: "Castanhas", quantity: 20.0, unit: "g", calories: 110.0 },
        ],
    },
    MealTemplate {
        meal_type: MealType::Dinner,
        name: "Jantar",
        suggested_time: "19:30",
        calories: 600.0, protein: 40.0, carbs: 55.0, fat: 20.0, fiber: 9.0,
        foods: &[
            FoodTemplate { food_name: "Batata-doce cozida", quantity: 150.0, unit: "g", calories: 130.0 },
            FoodTemplate { food_name: "Filé de peixe assado", quantity: 150.0, unit: "g", calories: 210.0 },
            FoodTemplate { food_name: "Brócolis no vapor", quantity: 100.0, unit: "g", calories: 35.0 },
            FoodTemplate { food_name: "Azeite de oliva", quantity: 10.0, unit: "ml", calories: 90.0 },
            FoodTemplate { food_name: "Salada de tomate e pepino", quantity: 150.0, unit: "g", calories: 135.0 },
        ],
    },
];

/// Number of canned workout templates available.
pub const WORKOUT_TEMPLATE_COUNT: usize = WORKOUT_TEMPLATES.len();

/// One canned workout per training day, capped at the template count.
pub fn fallback_workout_plans(profile: &Profile) -> Vec<WorkoutPlan> {
    let count = profile.workout_days().min(WORKOUT_TEMPLATE_COUNT);
    let now = Utc::now();
    WORKOUT_TEMPLATES
        .iter()
        .take(count)
        .map(|t| WorkoutPlan {
            id: Uuid::new_v4(),
            name: t.name.to_string(),
            description: t.description.to_string(),
            duration_minutes: t.duration_minutes,
            difficulty_level: Difficulty::Intermediate,
            exercises: t
                .exercises
                .iter()
                .map(|e| Exercise {
                    name: e.name.to_string(),
                    description: e.description.to_string(),
                    sets: e.sets,
                    reps: e.reps,
                    rest_seconds: e.rest_seconds,
                    muscle_groups: e.muscle_groups.iter().map(|m| m.to_string()).collect(),
                    equipment: e.equipment.to_string(),
                })
                .collect(),
            created_at: now,
        })
        .collect()
}

pub fn fallback_nutrition_plan(_profile: &Profile) -> NutritionPlan {
    NutritionPlan {
        id: Uuid::new_v4(),
        name: NUTRITION_NAME.to_string(),
        description: NUTRITION_DESCRIPTION.to_string(),
        total_calories: NUTRITION_TOTAL_CALORIES,
        meals: MEAL_TEMPLATES
            .iter()
            .map(|m| Meal {
                meal_type: m.meal_type,
                name: m.name.to_string(),
                suggested_time: m.suggested_time.to_string(),
                calories: Some(m.calories),
                protein: Some(m.protein),
                carbs: Some(m.carbs),
                fat: Some(m.fat),
                fiber: Some(m.fiber),
                foods: m
                    .foods
                    .iter()
                    .map(|f| MealFood {
                        food_name: f.food_name.to_string(),
                        quantity: f.quantity,
                        unit: f.unit.to_string(),
                        calories_per_unit: f.calories / f.quantity,
                    })
                    .collect(),
            })
            .collect(),
        created_at: Utc::now(),
    }
}
