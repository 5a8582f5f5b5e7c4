use colored::Colorize;

use crate::plan::{Generated, NutritionPlan, PlanSource, WorkoutPlan};

fn source_tag(source: PlanSource) -> String {
    match source {
        PlanSource::Ai => "[AI]".green().bold().to_string(),
        PlanSource::Fallback(reason) => format!("[FALLBACK: {reason:?}]").yellow().bold().to_string(),
    }
}

fn banner<T>(title: &str, generated: &Generated<T>) {
    println!("\n{}  {}", format!("=== {title} ===").bold(), source_tag(generated.source));
    print_warnings(&generated.warnings);
}

pub fn print_warnings(warnings: &[String]) {
    if warnings.is_empty() {
        return;
    }
    println!("{}", "Sanitizer warnings:".yellow());
    for w in warnings {
        println!(" - {w}");
    }
}

pub fn show_workouts(generated: &Generated<Vec<WorkoutPlan>>) {
    banner("WORKOUT PLANS", generated);
    if generated.value.is_empty() {
        println!("(no plans)");
        return;
    }
    for plan in &generated.value {
        println!(
            "\n{}  ({} min, {})",
            plan.name.bold(),
            plan.duration_minutes,
            plan.difficulty_level.as_str().cyan()
        );
        if !plan.description.is_empty() {
            println!("{}", plan.description.dimmed());
        }
        for (i, ex) in plan.exercises.iter().enumerate() {
            println!(
                "  {}. {}  {}x{}  rest {}s  [{}]",
                i + 1,
                ex.name,
                ex.sets,
                ex.reps,
                ex.rest_seconds,
                ex.equipment
            );
        }
    }
    println!();
}

pub fn show_nutrition(generated: &Generated<NutritionPlan>) {
    banner("NUTRITION PLAN", generated);
    let plan = &generated.value;
    println!("\n{}  ({} kcal)", plan.name.bold(), plan.total_calories);
    for meal in &plan.meals {
        let kcal = meal.calories.map(|c| format!("  {c:.0} kcal")).unwrap_or_default();
        println!(
            "\n{} {}  {}{}",
            meal.suggested_time.cyan(),
            meal.name.bold(),
            meal.meal_type.as_str().dimmed(),
            kcal
        );
        for food in &meal.foods {
            println!("  - {} {} {}", food.quantity, food.unit, food.food_name);
        }
    }
    println!();
}

pub fn show_goals(generated: &Generated<Vec<String>>) {
    banner("GOAL SUGGESTIONS", generated);
    if generated.value.is_empty() {
        println!("(no suggestions)");
    }
    for (i, goal) in generated.value.iter().enumerate() {
        println!("{}. {goal}", i + 1);
    }
    println!();
}
