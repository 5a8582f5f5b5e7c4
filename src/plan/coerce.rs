//! Free-text to enum mapping tables and loose numeric coercion.
//!
//! The model answers in whatever vocabulary it likes ("Intermediário",
//! "medium", "Café da manhã"). Every accepted spelling lives in one table so
//! the mapping can be tested exhaustively; anything else takes the default
//! branch.

use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

use super::{Difficulty, MealType};

const DIFFICULTY_TABLE: &[(&str, Difficulty)] = &[
    ("beginner", Difficulty::Beginner),
    ("iniciante", Difficulty::Beginner),
    ("novice", Difficulty::Beginner),
    ("easy", Difficulty::Beginner),
    ("facil", Difficulty::Beginner),
    ("fácil", Difficulty::Beginner),
    ("basic", Difficulty::Beginner),
    ("basico", Difficulty::Beginner),
    ("básico", Difficulty::Beginner),
    ("intermediate", Difficulty::Intermediate),
    ("intermediario", Difficulty::Intermediate),
    ("intermediário", Difficulty::Intermediate),
    ("medium", Difficulty::Intermediate),
    ("moderate", Difficulty::Intermediate),
    ("moderado", Difficulty::Intermediate),
    ("medio", Difficulty::Intermediate),
    ("médio", Difficulty::Intermediate),
    ("advanced", Difficulty::Advanced),
    ("avancado", Difficulty::Advanced),
    ("avançado", Difficulty::Advanced),
    ("hard", Difficulty::Advanced),
    ("dificil", Difficulty::Advanced),
    ("difícil", Difficulty::Advanced),
    ("expert", Difficulty::Advanced),
];

const MEAL_TYPE_TABLE: &[(&str, MealType)] = &[
    ("breakfast", MealType::Breakfast),
    ("cafe da manha", MealType::Breakfast),
    ("café da manhã", MealType::Breakfast),
    ("cafe_da_manha", MealType::Breakfast),
    ("desjejum", MealType::Breakfast),
    ("lunch", MealType::Lunch),
    ("almoco", MealType::Lunch),
    ("almoço", MealType::Lunch),
    ("dinner", MealType::Dinner),
    ("supper", MealType::Dinner),
    ("jantar", MealType::Dinner),
    ("snack", MealType::Snack),
    ("lanche", MealType::Snack),
    ("lanche da tarde", MealType::Snack),
    ("ceia", MealType::Snack),
    ("pre-workout", MealType::Snack),
    ("post-workout", MealType::Snack),
];

pub const DEFAULT_DIFFICULTY: Difficulty = Difficulty::Intermediate;
pub const DEFAULT_MEAL_TYPE: MealType = MealType::Snack;

fn normalize_key(s: &str) -> String {
    s.to_lowercase()
        .replace(['-', '_'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn lookup<T: Copy>(table: &[(&str, T)], raw: &str) -> Option<T> {
    let key = normalize_key(raw);
    table
        .iter()
        .find(|(k, _)| normalize_key(k) == key)
        .map(|(_, v)| *v)
}

/// Map free text to a difficulty. `None` means the default branch was taken.
pub fn difficulty(raw: &str) -> Option<Difficulty> {
    lookup(DIFFICULTY_TABLE, raw)
}

/// Map free text to a meal type. `None` means the default branch was taken.
pub fn meal_type(raw: &str) -> Option<MealType> {
    lookup(MEAL_TYPE_TABLE, raw)
}

/// Integer out of a loose JSON value: numbers are rounded, strings yield
/// their leading integer after non-digit characters are skipped ("8-10" -> 8,
/// "~12 reps" -> 12).
pub fn int(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.round() as i64)),
        Value::String(s) => leading_int(s),
        _ => None,
    }
}

/// Float out of a loose JSON value; strings like "35g" yield 35.0.
pub fn number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite()),
        Value::String(s) => leading_float(s),
        _ => None,
    }
}

/// Non-empty trimmed string out of a loose JSON value.
pub fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// String list out of either a JSON array or a comma-separated string.
pub fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items.iter().filter_map(|v| text(Some(v))).collect(),
        Some(Value::String(s)) => s
            .split(',')
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

fn int_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+").expect("static regex"))
}

fn float_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+(?:[.,]\d+)?").expect("static regex"))
}

fn leading_int(s: &str) -> Option<i64> {
    int_re().find(s).and_then(|m| m.as_str().parse().ok())
}

fn leading_float(s: &str) -> Option<f64> {
    float_re()
        .find(s)
        .and_then(|m| m.as_str().replace(',', ".").parse().ok())
}
