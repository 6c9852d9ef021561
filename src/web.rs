use axum::{
    extract::{
        rejection::{FormRejection, JsonRejection},
        State,
    },
    http::StatusCode,
    response::Html,
    routing::{get, post},
    Form, Json, Router,
};
use serde_json::json;
use std::fmt::Write as _;

use crate::error::PredictError;
use crate::predictor::{Prediction, Predictor};
use crate::types::{City, MatchState, Options, Team};

// ---------- Server state ----------

#[derive(Clone)]
pub struct AppState {
    pub predictor: Predictor,
    pub log_features: bool,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/predict", post(predict_form))
        .route("/api/predict", post(predict_json))
        .route("/api/options", get(options))
        .with_state(state)
}

fn run(state: &AppState, input: &MatchState) -> Result<Prediction, PredictError> {
    let result = state.predictor.predict(input);
    match &result {
        Ok(p) if state.log_features => tracing::info!(
            "predict batting={} bowling={} city={} runs_left={} balls_left={} wickets={} crr={:.3} rrr={:.3} p_win={:.4}",
            p.input.batting_team, p.input.bowling_team, p.input.city, p.input.runs_left,
            p.input.balls_left, p.input.wickets, p.input.crr, p.input.rrr, p.batting.probability
        ),
        Ok(p) => tracing::debug!(p_win = p.batting.probability, "prediction ok"),
        Err(PredictError::Validation(e)) => tracing::debug!("rejected input: {}", e),
        Err(e) => tracing::warn!(kind = e.kind(), "prediction failed: {}", e),
    }
    result
}

pub type ApiError = (StatusCode, Json<serde_json::Value>);

/// Status and `{ error, kind }` body for a failed pipeline run.
pub fn error_response(e: &PredictError) -> ApiError {
    let status = match e {
        PredictError::Validation(_) | PredictError::MissingValues(_) => StatusCode::UNPROCESSABLE_ENTITY,
        PredictError::PredictionFailed(_) | PredictError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(json!({ "error": e.to_string(), "kind": e.kind() })))
}

// ---------- Handlers ----------

pub async fn index() -> Html<String> {
    Html(render_page(None, None))
}

pub async fn predict_form(
    State(state): State<AppState>,
    payload: Result<Form<MatchState>, FormRejection>,
) -> (StatusCode, Html<String>) {
    match payload {
        Ok(Form(input)) => {
            let outcome = run(&state, &input).map_err(|e| e.to_string());
            (StatusCode::OK, Html(render_page(Some(&input), Some(outcome.as_ref().map_err(String::as_str)))))
        }
        Err(rejection) => {
            let msg = rejection.body_text();
            tracing::debug!("unreadable form: {}", msg);
            (StatusCode::UNPROCESSABLE_ENTITY, Html(render_page(None, Some(Err(&msg)))))
        }
    }
}

pub async fn predict_json(
    State(state): State<AppState>,
    payload: Result<Json<MatchState>, JsonRejection>,
) -> Result<Json<Prediction>, ApiError> {
    let Json(input) = payload.map_err(|rejection| {
        tracing::debug!("unreadable body: {}", rejection.body_text());
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "error": rejection.body_text(), "kind": "invalid_request" })),
        )
    })?;
    run(&state, &input).map(Json).map_err(|e| error_response(&e))
}

pub async fn options() -> Json<Options> {
    Json(Options::sorted())
}

// ---------- Page ----------

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn select<T: Copy + PartialEq + std::fmt::Display>(out: &mut String, name: &str, label: &str, values: &[T], chosen: Option<T>) {
    let _ = write!(out, r#"<label>{label}<select name="{name}">"#);
    for v in values {
        let sel = if Some(*v) == chosen { " selected" } else { "" };
        let v = escape(&v.to_string());
        let _ = write!(out, r#"<option value="{v}"{sel}>{v}</option>"#);
    }
    out.push_str("</select></label>\n");
}

/// Renders the form, keeping the last submission, plus the outcome if any.
pub fn render_page(input: Option<&MatchState>, outcome: Option<Result<&Prediction, &str>>) -> String {
    let mut out = String::from(
        "<!doctype html>\n<html><head><meta charset=\"utf-8\"><title>IPL Win Predictor</title></head><body>\n\
         <h1>IPL Win Predictor</h1>\n<form method=\"post\" action=\"/predict\">\n",
    );

    select(&mut out, "batting_team", "Select the batting team", &Team::sorted(), input.map(|s| s.batting_team));
    select(&mut out, "bowling_team", "Select the bowling team", &Team::sorted(), input.map(|s| s.bowling_team));
    select(&mut out, "city", "Select host city", &City::sorted(), input.map(|s| s.city));

    let target = input.map(|s| s.target).unwrap_or(0);
    let score = input.map(|s| s.score).unwrap_or(0);
    let overs = input.map(|s| s.overs.value()).unwrap_or(0.0);
    let wickets = input.map(|s| s.wickets).unwrap_or(0);
    let _ = write!(
        out,
        "<label>Target<input type=\"number\" name=\"target\" min=\"0\" step=\"1\" value=\"{target}\"></label>\n\
         <label>Current score<input type=\"number\" name=\"score\" min=\"0\" step=\"1\" value=\"{score}\"></label>\n\
         <label>Overs completed<input type=\"number\" name=\"overs\" min=\"0\" max=\"20\" step=\"0.1\" value=\"{overs:.1}\"></label>\n\
         <label>Wickets fallen<input type=\"number\" name=\"wickets\" min=\"0\" max=\"10\" step=\"1\" value=\"{wickets}\"></label>\n\
         <button type=\"submit\">Predict Probability</button>\n</form>\n"
    );

    match outcome {
        Some(Ok(p)) => {
            let _ = write!(
                out,
                "<h2>{}</h2>\n<h2>{}</h2>\n",
                escape(&p.batting.headline()),
                escape(&p.bowling.headline())
            );
            out.push_str("<table><tr>");
            let row = serde_json::to_value(&p.input).unwrap_or_default();
            if let Some(map) = row.as_object() {
                for k in map.keys() {
                    let _ = write!(out, "<th>{}</th>", escape(k));
                }
                out.push_str("</tr><tr>");
                for v in map.values() {
                    let cell = v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string());
                    let _ = write!(out, "<td>{}</td>", escape(&cell));
                }
            }
            out.push_str("</tr></table>\n");
        }
        Some(Err(msg)) => {
            let _ = write!(out, "<p class=\"error\">{}</p>\n", escape(msg));
        }
        None => {}
    }

    out.push_str("</body></html>\n");
    out
}
