//! Placement Insight CLI module
//!
//! Command-line interface for training, prediction, explanation and serving.

use clap::{Parser, Subcommand};
use colored::*;
use rayon::prelude::*;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::explainability::{ExplanationSummary, FeatureImpact, ModelKind};
use crate::inference::{PlacementPredictor, PredictionResponse, PredictorConfig};
use crate::preprocessing::{PlacementDataset, StudentRecord};
use crate::server::{run_server, ServerConfig};
use crate::training::{PlacementTrainer, TrainingConfig};

// ─── Styling helpers ───────────────────────────────────────────────────────────

fn dim(s: &str) -> ColoredString   { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }

fn kv(key: &str, val: &str) {
    println!("  {:<22} {}", muted(key), val.white());
}

fn step_run(msg: &str) {
    eprint!("  {} {}... ", accent("›"), msg);
}

fn step_done(detail: &str) {
    eprintln!("{} {}", ok("done"), dim(detail));
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

fn signed(value: f64) -> ColoredString {
    let text = format!("{:+.4}", value);
    if value > 0.0 {
        text.green()
    } else if value < 0.0 {
        text.red()
    } else {
        text.normal()
    }
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "placement")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Placement and salary prediction with exact linear explanations")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Train both models on a placement CSV and write a model bundle
    Train {
        /// Placement dataset (CSV)
        #[arg(short, long)]
        data: PathBuf,

        /// Output bundle file
        #[arg(short, long, default_value = "models/bundle.json")]
        output: PathBuf,

        /// Fraction of rows held out for evaluation
        #[arg(long, default_value = "0.2")]
        test_size: f64,

        /// Split seed
        #[arg(long, default_value = "42")]
        seed: u64,
    },

    /// Predict placement, salary and skill gaps for one or more students
    Predict {
        /// Model bundle
        #[arg(short, long)]
        model: PathBuf,

        /// JSON file with a student object or an array of them
        #[arg(short, long)]
        input: PathBuf,

        /// Skip building the explainer
        #[arg(long)]
        no_explain: bool,
    },

    /// Explain one model's output for a student
    Explain {
        /// Model bundle
        #[arg(short, long)]
        model: PathBuf,

        /// JSON file with a student object
        #[arg(short, long)]
        input: PathBuf,

        /// Model to explain (placement, salary)
        #[arg(short, long, default_value = "placement")]
        kind: ModelKind,
    },

    /// Rank features by mean absolute contribution
    Importance {
        /// Model bundle
        #[arg(short, long)]
        model: PathBuf,

        /// Model to rank (placement, salary)
        #[arg(short, long, default_value = "placement")]
        kind: ModelKind,

        /// Show only the first N features
        #[arg(long)]
        top: Option<usize>,
    },

    /// Start the HTTP server
    Serve {
        /// Model bundle (defaults to MODEL_PATH)
        #[arg(short, long)]
        model: Option<PathBuf>,

        /// Server host (defaults to API_HOST)
        #[arg(long)]
        host: Option<String>,

        /// Server port (defaults to API_PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

fn read_json(path: &Path) -> anyhow::Result<Value> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

fn load_predictor(path: &Path, explain: bool) -> anyhow::Result<PlacementPredictor> {
    step_run("Loading model bundle");
    let start = Instant::now();
    let config = PredictorConfig::default().with_explanations(explain);
    let predictor = PlacementPredictor::load(path, config)?;
    step_done(&format!("{:?}", start.elapsed()));
    Ok(predictor)
}

// ─── Commands ──────────────────────────────────────────────────────────────────

pub fn cmd_train(data: &Path, output: &Path, test_size: f64, seed: u64) -> anyhow::Result<()> {
    section("Train");

    step_run("Loading data");
    let start = Instant::now();
    let dataset = PlacementDataset::from_csv(data)?;
    step_done(&format!(
        "{} rows, {} placed in {:?}",
        dataset.len(),
        dataset.placed_count(),
        start.elapsed()
    ));

    step_run("Fitting placement and salary models");
    let start = Instant::now();
    let config = TrainingConfig::new().with_test_size(test_size).with_seed(seed);
    let bundle = PlacementTrainer::new(config).train(&dataset)?;
    step_done(&format!("{:?}", start.elapsed()));

    step_run(&format!("Saving → {}", output.display()));
    bundle.save(output)?;
    step_done("");

    let fmt = |v: Option<f64>| v.map(|v| format!("{:.4}", v)).unwrap_or_else(|| "n/a".to_string());
    if let Some(m) = &bundle.placement_metrics {
        println!();
        kv("Placement accuracy", &fmt(m.accuracy));
        kv("Placement F1", &fmt(m.f1_score));
    }
    if let Some(m) = &bundle.salary_metrics {
        kv("Salary R²", &fmt(m.r2));
        kv("Salary RMSE", &fmt(m.rmse));
    }
    println!();
    Ok(())
}

pub fn cmd_predict(model: &Path, input: &Path, explain: bool) -> anyhow::Result<()> {
    let predictor = load_predictor(model, explain)?;
    let value = read_json(input)?;

    let output = match value {
        Value::Array(items) => {
            step_run(&format!("Predicting {} students", items.len()));
            let start = Instant::now();
            let responses = items
                .par_iter()
                .map(|item| predictor.predict_json(item))
                .collect::<crate::error::Result<Vec<PredictionResponse>>>()?;
            step_done(&format!("{:?}", start.elapsed()));
            serde_json::to_string_pretty(&responses)?
        }
        item => serde_json::to_string_pretty(&predictor.predict_json(&item)?)?,
    };

    println!("{}", output);
    Ok(())
}

fn print_impacts(title: &str, impacts: &[FeatureImpact]) {
    println!();
    println!("  {}", muted(title));
    if impacts.is_empty() {
        println!("  {}", dim("none"));
    }
    for impact in impacts {
        println!("  {:<26} {:>10.2} {:>14}", impact.feature, impact.value, signed(impact.shap_value));
    }
}

fn print_summary(kind: ModelKind, summary: &ExplanationSummary) {
    section(&format!("Explanation: {}", kind));
    kv("Base value", &format!("{:.4}", summary.base_value));
    kv("Predicted value", &format!("{:.4}", summary.prediction_value));
    print_impacts("Top positive", &summary.top_positive_features);
    print_impacts("Top negative", &summary.top_negative_features);
    println!();
}

pub fn cmd_explain(model: &Path, input: &Path, kind: ModelKind) -> anyhow::Result<()> {
    let predictor = load_predictor(model, true)?;
    let record = StudentRecord::from_json(&read_json(input)?)?;
    let summary = predictor.explain(kind, &record)?;
    print_summary(kind, &summary);
    Ok(())
}

pub fn cmd_importance(model: &Path, kind: ModelKind, top: Option<usize>) -> anyhow::Result<()> {
    let predictor = load_predictor(model, true)?;
    let ranking = predictor.global_importance(kind)?;

    section(&format!("Feature importance: {}", kind));
    println!("  {:>4}  {:<26} {:>14}", muted("Rank"), muted("Feature"), muted("Mean |SHAP|"));
    for entry in ranking.iter().take(top.unwrap_or(ranking.len())) {
        println!("  {:>4}  {:<26} {:>14.4}", entry.rank, entry.feature, entry.importance);
    }
    println!();
    Ok(())
}

pub async fn cmd_serve(model: Option<PathBuf>, host: Option<String>, port: Option<u16>) -> anyhow::Result<()> {
    let mut config = ServerConfig::default();
    if let Some(model) = model {
        config = config.with_model_path(model.to_string_lossy());
    }
    if let Some(host) = host {
        config = config.with_host(host);
    }
    if let Some(port) = port {
        config = config.with_port(port);
    }

    section("Serve");
    kv("Address", &format!("{}:{}", config.host, config.port));
    kv("Model bundle", &config.model_path);
    println!();

    run_server(config, PredictorConfig::default()).await
}
