use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::time::Duration;
use uuid::Uuid;

use fitplan::cli::{Args, Format, Kind};
use fitplan::completion::CompletionClient;
use fitplan::config::Config;
use fitplan::plan::Generated;
use fitplan::profile::{load_profile, Profile};
use fitplan::service::{PlanBundle, PlanNormalizer};
use fitplan::{log, prompt, provider, ux};

fn spinner(enabled: bool, msg: &str) -> Result<ProgressBar> {
    if !enabled {
        return Ok(ProgressBar::hidden());
    }
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::with_template("{spinner:.cyan} {msg} ({elapsed})")?);
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(120));
    Ok(pb)
}

struct Output<'a> {
    cfg: &'a Config,
    args: &'a Args,
    profile: &'a Profile,
    tx: Uuid,
}

impl Output<'_> {
    fn save<T: Serialize>(&self, stage: &str, prompt: &str, generated: &Generated<T>) -> Result<()> {
        if self.args.save_artifacts {
            log::save_stage(&self.cfg.root, self.tx, stage, prompt, generated)
                .with_context(|| format!("saving {stage} artifacts"))?;
        }
        Ok(())
    }

    fn workouts(&self, g: &Generated<Vec<fitplan::plan::WorkoutPlan>>) -> Result<()> {
        self.save("workout", &prompt::build_workout_prompt(self.profile), g)?;
        if self.args.format == Format::Text {
            ux::show_workouts(g);
        }
        Ok(())
    }

    fn nutrition(&self, g: &Generated<fitplan::plan::NutritionPlan>) -> Result<()> {
        self.save("nutrition", &prompt::build_nutrition_prompt(self.profile), g)?;
        if self.args.format == Format::Text {
            ux::show_nutrition(g);
        }
        Ok(())
    }

    fn goals(&self, g: &Generated<Vec<String>>) -> Result<()> {
        self.save("goals", &prompt::build_goal_prompt(self.profile), g)?;
        if self.args.format == Format::Text {
            ux::show_goals(g);
        }
        Ok(())
    }

    fn json<T: Serialize>(&self, value: &T) -> Result<()> {
        if self.args.format == Format::Json {
            println!("{}", serde_json::to_string_pretty(value)?);
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    log::init_tracing(args.debug);

    let mut cfg = Config::load(args.config.as_deref())?;
    cfg.apply_args(&args);
    tracing::debug!(?cfg, "effective config");

    let profile = load_profile(&args.profile)
        .with_context(|| format!("loading profile {}", args.profile.display()))?;

    let prov = provider::make_provider(&cfg, &args.replay)?;
    let client = CompletionClient::new(prov, cfg.retry_policy());
    let normalizer = PlanNormalizer::new(client, cfg.on_failure);

    let tx = Uuid::new_v4();
    tracing::info!(%tx, provider = normalizer.provider_name(), kind = ?args.kind, "generating");
    let out = Output { cfg: &cfg, args: &args, profile: &profile, tx };

    let pb = spinner(args.progress && args.format == Format::Text, "asking the model")?;
    match args.kind {
        Kind::Workout => {
            let g = normalizer.generate_workout_plan(&profile).await;
            pb.finish_and_clear();
            let g = g?;
            out.workouts(&g)?;
            out.json(&g)?;
        }
        Kind::Nutrition => {
            let g = normalizer.generate_nutrition_plan(&profile).await;
            pb.finish_and_clear();
            let g = g?;
            out.nutrition(&g)?;
            out.json(&g)?;
        }
        Kind::Goals => {
            let g = normalizer.generate_goal_suggestions(&profile).await;
            pb.finish_and_clear();
            let g = g?;
            out.goals(&g)?;
            out.json(&g)?;
        }
        Kind::All => {
            let bundle: Result<PlanBundle, _> = normalizer.generate_all(&profile).await;
            pb.finish_and_clear();
            let bundle = bundle?;
            out.workouts(&bundle.workouts)?;
            out.nutrition(&bundle.nutrition)?;
            out.goals(&bundle.goals)?;
            out.json(&bundle)?;
        }
    }

    if args.save_artifacts {
        eprintln!("artifacts: {}", log::tx_dir(&cfg.root, tx).display());
    }
    Ok(())
}
