use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::warn;

use crate::error::PipelineError;
use crate::features::{
    team2_options, toss_winner_options, MatchInput, TossDecision, Team, Venue, WinType,
    FEATURE_COUNT, FEATURE_NAMES, NUMERIC_BOUNDS,
};
use crate::model::WinnerConvention;
use crate::pipeline::{PredictionPipeline, PredictionResult};

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<PredictionPipeline>,
}

/// Build the Axum router for the form page.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/api/options", get(options_handler))
        .route("/api/predict", post(predict_handler))
        .route("/api/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

/// Form fields exactly as the page submits them.
#[derive(Debug, Clone, Deserialize)]
pub struct MatchForm {
    pub team1: String,
    pub team2: String,
    pub venue: String,
    pub toss_winner: String,
    pub toss_decision: String,
    pub win_type: String,
    pub win_margin: i64,
    pub first_innings_score: i64,
    pub second_innings_score: i64,
    pub powerplay_score: i64,
    pub middle_overs_score: i64,
    pub death_overs_score: i64,
}

fn to_count(name: &str, value: i64) -> Result<u32, PipelineError> {
    u32::try_from(value)
        .map_err(|_| PipelineError::InvalidInput(format!("{} must be non-negative, got {}", name, value)))
}

impl TryFrom<MatchForm> for MatchInput {
    type Error = PipelineError;

    fn try_from(form: MatchForm) -> Result<Self, Self::Error> {
        let input = MatchInput {
            team1: form.team1.parse()?,
            team2: form.team2.parse()?,
            venue: form.venue.parse()?,
            toss_winner: form.toss_winner.parse()?,
            toss_decision: form.toss_decision.parse()?,
            win_type: form.win_type.parse()?,
            win_margin: to_count("win_margin", form.win_margin)?,
            first_innings_score: to_count("first_innings_score", form.first_innings_score)?,
            second_innings_score: to_count("second_innings_score", form.second_innings_score)?,
            powerplay_score: to_count("powerplay_score", form.powerplay_score)?,
            middle_overs_score: to_count("middle_overs_score", form.middle_overs_score)?,
            death_overs_score: to_count("death_overs_score", form.death_overs_score)?,
        };
        input.check_constraints()?;
        Ok(input)
    }
}

#[derive(Debug, Deserialize)]
pub struct OptionsQuery {
    pub team1: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct NumericOption {
    pub name: &'static str,
    pub min: u32,
    pub max: u32,
    pub default: u32,
}

/// Everything the page needs to fill its widgets.
#[derive(Debug, Serialize)]
pub struct FormOptions {
    pub teams: Vec<Team>,
    pub team1: Team,
    pub team2: Vec<Team>,
    pub toss_winners: [Team; 2],
    pub venues: Vec<Venue>,
    pub toss_decisions: Vec<TossDecision>,
    pub win_types: Vec<WinType>,
    pub numeric: Vec<NumericOption>,
}

impl FormOptions {
    pub fn for_team1(team1: Team) -> Self {
        let team2 = team2_options(team1);
        // The page preselects the first remaining team as team2.
        let toss_winners = toss_winner_options(team1, team2[0]);
        FormOptions {
            teams: Team::ALL.to_vec(),
            team1,
            team2,
            toss_winners,
            venues: Venue::ALL.to_vec(),
            toss_decisions: TossDecision::ALL.to_vec(),
            win_types: WinType::ALL.to_vec(),
            numeric: NUMERIC_BOUNDS
                .iter()
                .map(|b| NumericOption {
                    name: b.name,
                    min: *b.range.start(),
                    max: *b.range.end(),
                    default: b.default,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub scaler: String,
    pub classifier: String,
    pub label_one_means: WinnerConvention,
    pub features: [&'static str; FEATURE_COUNT],
}

fn error_response(err: PipelineError) -> (StatusCode, String) {
    let status = if err.is_input_error() {
        StatusCode::UNPROCESSABLE_ENTITY
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, err.to_string())
}

/// Serve the form page.
async fn index_handler() -> impl IntoResponse {
    Html(FORM_HTML)
}

/// GET /api/options?team1=Mumbai%20Indians
async fn options_handler(
    Query(query): Query<OptionsQuery>,
) -> Result<Json<FormOptions>, (StatusCode, String)> {
    let team1 = match query.team1.as_deref() {
        Some(label) => label.parse::<Team>().map_err(error_response)?,
        None => Team::ALL[0],
    };
    Ok(Json(FormOptions::for_team1(team1)))
}

/// POST /api/predict
async fn predict_handler(
    State(state): State<Arc<AppState>>,
    Json(form): Json<MatchForm>,
) -> Result<Json<PredictionResult>, (StatusCode, String)> {
    let input = MatchInput::try_from(form).map_err(|e| {
        warn!("Rejected form: {}", e);
        error_response(e)
    })?;
    state.pipeline.run(&input).map(Json).map_err(|e| {
        warn!("Prediction failed: {}", e);
        error_response(e)
    })
}

/// GET /api/health
async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        scaler: state.pipeline.scaler_name().to_string(),
        classifier: state.pipeline.classifier_name().to_string(),
        label_one_means: state.pipeline.convention(),
        features: FEATURE_NAMES,
    })
}

/// Embedded single-file form page (HTML + CSS + JS)
const FORM_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>IPL Match Winner Predictor</title>
<style>
  :root {
    --bg: #0f1117;
    --card: #1a1d27;
    --border: #2a2d3a;
    --accent: #6c63ff;
    --green: #00c896;
    --red: #ff4f6a;
    --text: #e0e0e0;
    --muted: #8888aa;
  }
  * { box-sizing: border-box; margin: 0; padding: 0; }
  body { background: var(--bg); color: var(--text); font-family: 'Segoe UI', system-ui, sans-serif; }
  header { padding: 1rem 2rem; border-bottom: 1px solid var(--border); }
  header h1 { font-size: 1.4rem; font-weight: 700; }
  header p { color: var(--muted); font-size: .9rem; margin-top: .3rem; }
  main { padding: 1.5rem 2rem; max-width: 760px; }
  .panel { background: var(--card); border: 1px solid var(--border); border-radius: 10px; padding: 1.2rem; display: grid; gap: 1rem; }
  .two-col { display: grid; grid-template-columns: 1fr 1fr; gap: 1rem; }
  @media (max-width: 640px) { .two-col { grid-template-columns: 1fr; } }
  label { display: block; color: var(--muted); font-size: .8rem; text-transform: uppercase; letter-spacing: .06em; margin-bottom: .3rem; }
  select, input[type=number] { width: 100%; background: var(--bg); color: var(--text); border: 1px solid var(--border); border-radius: 6px; padding: .5rem; font-size: .95rem; }
  .radios { display: flex; gap: 1.2rem; }
  .radios label { display: inline; text-transform: none; font-size: .95rem; color: var(--text); }
  button { background: var(--accent); color: #fff; border: none; border-radius: 6px; padding: .7rem 1.4rem; font-size: 1rem; font-weight: 600; cursor: pointer; }
  button:disabled { opacity: .5; cursor: wait; }
  #result { margin-top: 1.5rem; padding: 1rem 1.2rem; border-radius: 10px; display: none; }
  #result.ok { display: block; background: rgba(0,200,150,.15); color: var(--green); }
  #result.err { display: block; background: rgba(255,79,106,.15); color: var(--red); }
</style>
</head>
<body>
<header>
  <h1>🏏 IPL Match Winner Predictor</h1>
  <p>Enter match details to predict the winner</p>
</header>
<main>
  <form class="panel" id="match-form">
    <div class="two-col">
      <div><label for="team1">Team 1</label><select id="team1"></select></div>
      <div><label for="team2">Team 2</label><select id="team2"></select></div>
    </div>
    <div><label for="venue">Venue</label><select id="venue"></select></div>
    <div class="two-col">
      <div><label for="toss_winner">Toss Winner</label><select id="toss_winner"></select></div>
      <div><label>Toss Decision</label><div class="radios" id="toss_decision"></div></div>
    </div>
    <div><label for="win_type">Win Type</label><select id="win_type"></select></div>
    <div class="two-col" id="numeric"></div>
    <div><button type="submit" id="submit">Predict Winner</button></div>
  </form>
  <div id="result"></div>
</main>
<script>
const LABELS = {
  win_margin: 'Win Margin (runs/wickets)',
  first_innings_score: 'First Innings Score',
  second_innings_score: 'Second Innings Score',
  powerplay_score: 'Powerplay Score',
  middle_overs_score: 'Middle Overs Score',
  death_overs_score: 'Death Overs Score',
};
const $ = id => document.getElementById(id);

function fill(select, values, keep) {
  const prev = keep ? select.value : null;
  select.innerHTML = values.map(v => `<option>${v}</option>`).join('');
  if (prev && values.includes(prev)) select.value = prev;
}

async function loadOptions(team1) {
  const q = team1 ? '?team1=' + encodeURIComponent(team1) : '';
  const res = await fetch('/api/options' + q);
  if (!res.ok) throw new Error(await res.text());
  return res.json();
}

function refreshToss() {
  fill($('toss_winner'), [$('team1').value, $('team2').value], true);
}

async function onTeam1Change() {
  const opts = await loadOptions($('team1').value);
  fill($('team2'), opts.team2, true);
  refreshToss();
}

async function init() {
  const opts = await loadOptions(null);
  fill($('team1'), opts.teams, false);
  $('team1').value = opts.team1;
  fill($('team2'), opts.team2, false);
  fill($('venue'), opts.venues, false);
  fill($('win_type'), opts.win_types, false);
  refreshToss();
  $('toss_decision').innerHTML = opts.toss_decisions.map((d, i) =>
    `<label><input type="radio" name="toss_decision" value="${d}" ${i === 0 ? 'checked' : ''}> ${d}</label>`
  ).join('');
  $('numeric').innerHTML = opts.numeric.map(n =>
    `<div><label for="${n.name}">${LABELS[n.name] || n.name}</label>` +
    `<input type="number" id="${n.name}" min="${n.min}" max="${n.max}" value="${n.default}" step="1" required></div>`
  ).join('');
  $('team1').addEventListener('change', () => onTeam1Change().catch(showError));
  $('team2').addEventListener('change', refreshToss);
}

function showError(e) {
  const r = $('result');
  r.className = 'err';
  r.textContent = '⚠️ ' + (e.message || e);
}

async function predict(ev) {
  ev.preventDefault();
  const body = {
    team1: $('team1').value,
    team2: $('team2').value,
    venue: $('venue').value,
    toss_winner: $('toss_winner').value,
    toss_decision: document.querySelector('input[name=toss_decision]:checked').value,
    win_type: $('win_type').value,
  };
  for (const name of Object.keys(LABELS)) body[name] = parseInt($(name).value, 10);
  $('submit').disabled = true;
  try {
    const res = await fetch('/api/predict', {
      method: 'POST',
      headers: { 'Content-Type': 'application/json' },
      body: JSON.stringify(body),
    });
    if (!res.ok) throw new Error(await res.text());
    const out = await res.json();
    const r = $('result');
    r.className = 'ok';
    r.innerHTML = `🏆 Predicted Winner: <strong>${out.winner}</strong> ` +
      `<span style="color:var(--muted)">(${(out.probability * 100).toFixed(1)}%)</span>`;
  } catch (e) {
    showError(e);
  } finally {
    $('submit').disabled = false;
  }
}

$('match-form').addEventListener('submit', predict);
init().catch(showError);
</script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::tests::test_pipeline;

    fn state() -> Arc<AppState> {
        Arc::new(AppState {
            pipeline: Arc::new(test_pipeline(WinnerConvention::default())),
        })
    }

    fn form() -> MatchForm {
        MatchForm {
            team1: "Mumbai Indians".into(),
            team2: "Chennai Super Kings".into(),
            venue: "Eden Gardens".into(),
            toss_winner: "Mumbai Indians".into(),
            toss_decision: "bat".into(),
            win_type: "runs".into(),
            win_margin: 20,
            first_innings_score: 160,
            second_innings_score: 150,
            powerplay_score: 50,
            middle_overs_score: 70,
            death_overs_score: 40,
        }
    }

    #[test]
    fn form_converts_to_match_input() {
        let input = MatchInput::try_from(form()).unwrap();
        assert_eq!(input, crate::features::input::sample_input());
    }

    #[test]
    fn unknown_venue_is_unknown_category() {
        let mut f = form();
        f.venue = "Lord's".into();
        assert!(matches!(
            MatchInput::try_from(f),
            Err(PipelineError::UnknownCategory { table: "venue", .. })
        ));
    }

    #[test]
    fn negative_and_oversized_numbers_are_rejected() {
        let mut f = form();
        f.powerplay_score = -1;
        assert!(matches!(
            MatchInput::try_from(f),
            Err(PipelineError::InvalidInput(_))
        ));

        let mut f = form();
        f.win_margin = 201;
        assert!(MatchInput::try_from(f).is_err());

        let mut f = form();
        f.win_margin = 200;
        assert!(MatchInput::try_from(f).is_ok());
    }

    #[test]
    fn options_exclude_team1_from_team2() {
        let opts = FormOptions::for_team1(Team::SunrisersHyderabad);
        assert_eq!(opts.teams.len(), 10);
        assert!(!opts.team2.contains(&Team::SunrisersHyderabad));
        assert_eq!(opts.toss_winners, [Team::SunrisersHyderabad, Team::ChennaiSuperKings]);
        assert_eq!(opts.numeric.len(), 6);
        assert_eq!(opts.numeric[0].max, 200);
    }

    #[tokio::test]
    async fn options_handler_defaults_to_first_team() {
        let Json(opts) = options_handler(Query(OptionsQuery { team1: None }))
            .await
            .unwrap();
        assert_eq!(opts.team1, Team::ChennaiSuperKings);
        assert_eq!(opts.team2[0], Team::MumbaiIndians);
    }

    #[tokio::test]
    async fn options_handler_rejects_unknown_team() {
        let err = options_handler(Query(OptionsQuery {
            team1: Some("Deccan Chargers".into()),
        }))
        .await
        .unwrap_err();
        assert_eq!(err.0, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn predict_handler_returns_winner() {
        let Json(result) = predict_handler(State(state()), Json(form())).await.unwrap();
        assert_eq!(result.winner, Team::MumbaiIndians);
        assert_eq!(result.label, 1);
        assert_eq!(
            result.raw_features.0,
            [1.0, 1.0, 1.0, 0.0, 0.0, 20.0, 160.0, 150.0, 50.0, 70.0, 40.0]
        );
    }

    #[tokio::test]
    async fn predict_handler_rejects_self_match() {
        let mut f = form();
        f.team2 = f.team1.clone();
        let (status, msg) = predict_handler(State(state()), Json(f)).await.unwrap_err();
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(msg.contains("team2"));
    }

    #[tokio::test]
    async fn health_reports_artifacts() {
        let Json(health) = health_handler(State(state())).await;
        assert_eq!(health.status, "ok");
        assert_eq!(health.scaler, "recording");
        assert_eq!(health.classifier, "first-innings");
        assert_eq!(health.features[0], "Teams");
    }

    #[test]
    fn artifact_errors_map_to_server_error() {
        let (status, _) = error_response(PipelineError::InferenceError("x".into()));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
