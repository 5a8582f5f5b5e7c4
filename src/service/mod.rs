//! The produced interface: profile in, normalised plan out.
//!
//! Per request: Prompting -> AwaitingCompletion (-> RetryingCompletion)* ->
//! Parsing -> Validating | FallbackSubstitution -> Done. Field-level defects
//! never abort; only a structural failure or a completion error leads to
//! fallback. Only a plan generation's `MissingCredential`, or any completion
//! error under `FailurePolicy::Throw`, reaches the caller as an error; goal
//! suggestions under `Fallback` always resolve.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::completion::CompletionClient;
use crate::errors::CompletionError;
use crate::extract::{extract_json, Shape};
use crate::fallback::{fallback_nutrition_plan, fallback_workout_plans};
use crate::plan::{FallbackReason, Generated, NutritionPlan, PlanSource, WorkoutPlan};
use crate::profile::Profile;
use crate::prompt::{build_goal_prompt, build_nutrition_prompt, build_workout_prompt};
use crate::sanitize::{normalize_goal_suggestions, normalize_nutrition_plan, normalize_workout_plans};

/// What to do when the completion itself fails.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Substitute canned plans (or no goal suggestions).
    #[default]
    Fallback,
    /// Hand the completion error to the caller.
    Throw,
}

/// The three generations of one profile, run concurrently.
#[derive(Debug, Serialize)]
pub struct PlanBundle {
    pub workouts: Generated<Vec<WorkoutPlan>>,
    pub nutrition: Generated<NutritionPlan>,
    pub goals: Generated<Vec<String>>,
}

#[derive(Clone)]
pub struct PlanNormalizer {
    client: CompletionClient,
    policy: FailurePolicy,
}

impl PlanNormalizer {
    pub fn new(client: CompletionClient, policy: FailurePolicy) -> Self {
        Self { client, policy }
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    pub fn provider_name(&self) -> &str {
        self.client.provider_name()
    }

    pub async fn generate_workout_plan(
        &self,
        profile: &Profile,
    ) -> Result<Generated<Vec<WorkoutPlan>>, CompletionError> {
        self.generate_workout_plan_with(profile, self.policy).await
    }

    pub async fn generate_workout_plan_with(
        &self,
        profile: &Profile,
        policy: FailurePolicy,
    ) -> Result<Generated<Vec<WorkoutPlan>>, CompletionError> {
        let prompt = build_workout_prompt(profile);
        debug!(kind = "workout", bytes = prompt.len(), "prompting");

        let out = match self.client.complete(&prompt).await {
            Ok(text) => {
                debug!(kind = "workout", "parsing");
                normalize_workout_plans(extract_json(&text, Shape::Array), profile)
                    .with_raw_response(text)
            }
            Err(e) => {
                let reason = absorb(e, policy, "workout")?;
                Generated::fallback(fallback_workout_plans(profile), reason)
            }
        };
        done("workout", out.source, out.value.len());
        Ok(out)
    }

    pub async fn generate_nutrition_plan(
        &self,
        profile: &Profile,
    ) -> Result<Generated<NutritionPlan>, CompletionError> {
        self.generate_nutrition_plan_with(profile, self.policy).await
    }

    pub async fn generate_nutrition_plan_with(
        &self,
        profile: &Profile,
        policy: FailurePolicy,
    ) -> Result<Generated<NutritionPlan>, CompletionError> {
        let prompt = build_nutrition_prompt(profile);
        debug!(kind = "nutrition", bytes = prompt.len(), "prompting");

        let out = match self.client.complete(&prompt).await {
            Ok(text) => {
                debug!(kind = "nutrition", "parsing");
                normalize_nutrition_plan(extract_json(&text, Shape::Object), profile)
                    .with_raw_response(text)
            }
            Err(e) => {
                let reason = absorb(e, policy, "nutrition")?;
                Generated::fallback(fallback_nutrition_plan(profile), reason)
            }
        };
        done("nutrition", out.source, out.value.meals.len());
        Ok(out)
    }

    pub async fn generate_goal_suggestions(
        &self,
        profile: &Profile,
    ) -> Result<Generated<Vec<String>>, CompletionError> {
        self.generate_goal_suggestions_with(profile, self.policy).await
    }

    /// Goals degrade to an empty list instead of a canned template. Under
    /// `FailurePolicy::Fallback` this never fails, a missing credential included.
    pub async fn generate_goal_suggestions_with(
        &self,
        profile: &Profile,
        policy: FailurePolicy,
    ) -> Result<Generated<Vec<String>>, CompletionError> {
        let prompt = build_goal_prompt(profile);
        debug!(kind = "goals", bytes = prompt.len(), "prompting");

        let out = match self.client.complete(&prompt).await {
            Ok(text) => {
                debug!(kind = "goals", "parsing");
                let parsed = extract_json(&text, Shape::Array);
                let usable = parsed.is_ok();
                let goals = normalize_goal_suggestions(parsed);
                let out = if usable {
                    Generated::ai(goals, Vec::new())
                } else {
                    Generated::fallback(goals, FallbackReason::Unparseable)
                };
                out.with_raw_response(text)
            }
            Err(CompletionError::MissingCredential(provider)) if policy == FailurePolicy::Fallback => {
                warn!(kind = "goals", %provider, "no credential; no goal suggestions");
                Generated::fallback(Vec::new(), FallbackReason::MissingCredential)
            }
            Err(e) => Generated::fallback(Vec::new(), absorb(e, policy, "goals")?),
        };
        done("goals", out.source, out.value.len());
        Ok(out)
    }

    pub async fn generate_all(&self, profile: &Profile) -> Result<PlanBundle, CompletionError> {
        let (workouts, nutrition, goals) = futures::join!(
            self.generate_workout_plan(profile),
            self.generate_nutrition_plan(profile),
            self.generate_goal_suggestions(profile),
        );
        Ok(PlanBundle { workouts: workouts?, nutrition: nutrition?, goals: goals? })
    }
}

/// Decide whether a completion error is absorbed into a fallback.
fn absorb(
    err: CompletionError,
    policy: FailurePolicy,
    kind: &'static str,
) -> Result<FallbackReason, CompletionError> {
    if err.is_fatal() || policy == FailurePolicy::Throw {
        return Err(propagate(err, kind));
    }
    let reason = match err {
        CompletionError::ServiceOverloaded { .. } => FallbackReason::Overloaded,
        CompletionError::EmptyResponse { .. } => FallbackReason::EmptyResponse,
        CompletionError::Communication(_) | CompletionError::MissingCredential(_) => {
            FallbackReason::Communication
        }
    };
    warn!(kind, error = %err, ?reason, "fallback substitution");
    Ok(reason)
}

fn propagate(err: CompletionError, kind: &'static str) -> CompletionError {
    warn!(kind, error = %err, "completion failed; propagating");
    err
}

fn done(kind: &'static str, source: PlanSource, items: usize) {
    info!(kind, ?source, items, "done");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absorb_respects_policy() {
        let overloaded = CompletionError::ServiceOverloaded { attempts: 3 };
        assert_eq!(absorb(overloaded.clone(), FailurePolicy::Fallback, "t"), Ok(FallbackReason::Overloaded));
        assert_eq!(absorb(overloaded.clone(), FailurePolicy::Throw, "t"), Err(overloaded));

        let comm = CompletionError::Communication("reset".into());
        assert_eq!(absorb(comm, FailurePolicy::Fallback, "t"), Ok(FallbackReason::Communication));

        let empty = CompletionError::EmptyResponse { attempts: 2 };
        assert_eq!(absorb(empty, FailurePolicy::Fallback, "t"), Ok(FallbackReason::EmptyResponse));

        let missing = CompletionError::MissingCredential("gemini".into());
        assert_eq!(absorb(missing.clone(), FailurePolicy::Fallback, "t"), Err(missing));
    }
}
