/// Integration tests for the prediction pipeline and HTTP handlers
///
/// Run with: cargo test --test integration_tests -- --nocapture

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use ipl_win_predictor::{
    web::{self, AppState},
    City, FeatureVector, LogisticPipeline, MatchState, ModelError, ModelInput, Overs, PredictError,
    Predictor, Team, ValidationError, WinClassifier, WinProbability,
};
use tower::ServiceExt;

fn shipped_model() -> LogisticPipeline {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/models/pipe.json");
    LogisticPipeline::load(path).expect("shipped model should load")
}

fn predictor() -> Predictor {
    Predictor::new(Arc::new(shipped_model()))
}

fn app(predictor: Predictor) -> Router {
    web::router(AppState {
        predictor,
        log_features: false,
    })
}

/// Classifier that always fails with the given error.
struct Broken(fn() -> ModelError);

impl WinClassifier for Broken {
    fn predict_proba(&self, _row: &ModelInput) -> Result<WinProbability, ModelError> {
        Err((self.0)())
    }

    fn name(&self) -> &'static str {
        "broken"
    }
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, String, String) {
    let res = app.oneshot(req).await.expect("router is infallible");
    let status = res.status();
    let content_type = res
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let bytes = to_bytes(res.into_body(), usize::MAX).await.expect("body readable");
    (status, content_type, String::from_utf8(bytes.to_vec()).expect("utf-8 body"))
}

fn post_json(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/predict")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn post_form(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/predict")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

const VALID_JSON: &str = r#"{"batting_team":"Chennai Super Kings","bowling_team":"Royal Challengers Bangalore",
    "city":"Chennai","target":180,"score":100,"overs":15.0,"wickets":2}"#;

fn chase(target: u32, score: u32, overs: f64, wickets: u8) -> MatchState {
    MatchState {
        batting_team: Team::ChennaiSuperKings,
        bowling_team: Team::RoyalChallengersBangalore,
        city: City::Chennai,
        target,
        score,
        overs: Overs::new(overs),
        wickets,
    }
}

#[test]
fn test_mid_innings_scenario() {
    println!("\n=== Test: Mid-innings Scenario ===");
    let state = chase(180, 100, 15.0, 2);
    let p = predictor().predict(&state).expect("valid chase should predict");

    assert_eq!(p.features.runs_left, 80);
    assert_eq!(p.features.balls_left, 30);
    assert_eq!(p.features.wickets_remaining, 8);
    assert_eq!(p.features.total_runs_target, 180);
    assert!((p.features.current_run_rate - 6.667).abs() < 1e-3);
    assert!((p.features.required_run_rate - 16.0).abs() < 1e-9);

    let probs = p.probabilities();
    assert!((probs.win + probs.loss - 1.0).abs() < 1e-9);
    println!("✓ {}", p.batting.headline());
    println!("✓ {}", p.bowling.headline());
}

#[test]
fn test_validation_scenarios() {
    println!("\n=== Test: Validation Scenarios ===");
    let predictor = predictor();

    let tied = predictor.predict(&chase(150, 150, 12.0, 3)).unwrap_err();
    assert!(matches!(tied, PredictError::Validation(ValidationError::TargetNotAboveScore)));

    let no_overs = predictor.predict(&chase(150, 20, 0.0, 0)).unwrap_err();
    assert!(matches!(no_overs, PredictError::Validation(ValidationError::ZeroOvers)));

    let too_many = predictor.predict(&chase(150, 20, 21.0, 0)).unwrap_err();
    assert!(matches!(too_many, PredictError::Validation(ValidationError::OversOutOfRange)));

    println!("✓ each rule rejects independently");
}

#[test]
fn test_final_ball_boundary() {
    println!("\n=== Test: Final Ball Boundary ===");
    let p = predictor()
        .predict(&chase(200, 190, 20.0, 6))
        .expect("20.0 overs is inside the range");
    assert_eq!(p.features.balls_left, 0);
    assert_eq!(p.features.required_run_rate, 0.0);
    assert!(p.batting.probability.is_finite());
    println!("✓ balls_left=0 gives rrr=0");
}

#[test]
fn test_probabilities_track_match_situation() {
    println!("\n=== Test: Probabilities Track Match Situation ===");
    let predictor = predictor();

    let cruising = predictor.predict(&chase(180, 178, 15.0, 1)).unwrap();
    let collapsing = predictor.predict(&chase(200, 100, 18.0, 9)).unwrap();

    println!("  cruising:   {}", cruising.batting.headline());
    println!("  collapsing: {}", collapsing.batting.headline());
    assert!(cruising.batting.probability > 0.5);
    assert!(collapsing.batting.probability < 0.5);

    for p in [&cruising, &collapsing] {
        let probs = p.probabilities();
        assert!((0.0..=1.0).contains(&probs.win));
        assert!((probs.win + probs.loss - 1.0).abs() < 1e-9);
    }
    println!("✓ ordering and sums hold");
}

#[test]
fn test_derivation_is_pure() {
    println!("\n=== Test: Derivation Is Pure ===");
    let state = chase(171, 64, 7.4, 4);
    let first = FeatureVector::derive(&state);
    for _ in 0..10 {
        assert_eq!(FeatureVector::derive(&state), first);
    }
    // 7.4 * 6 = 44.4 -> 44 balls bowled
    assert_eq!(first.balls_left, 76);
    println!("✓ identical input gives identical features");
}

#[tokio::test]
async fn test_json_endpoint() {
    println!("\n=== Test: JSON Endpoint ===");
    let (status, content_type, body) = send(app(predictor()), post_json(VALID_JSON)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(content_type.starts_with("application/json"));
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["batting"]["team"], "Chennai Super Kings");
    assert_eq!(json["input"]["total_runs_x"], 180.0);
    assert_eq!(json["features"]["balls_left"], 30);

    let tied = VALID_JSON.replace(r#""score":100"#, r#""score":180"#);
    let (status, _, body) = send(app(predictor()), post_json(&tied)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["kind"], "validation");
    assert_eq!(json["error"], "Target must be greater than the current score.");
    println!("✓ JSON success and validation bodies correct");
}

#[tokio::test]
async fn test_json_unreadable_bodies() {
    println!("\n=== Test: JSON Unreadable Bodies ===");
    let cases = [
        VALID_JSON.replace("Chennai Super Kings", "Gotham"),
        VALID_JSON.replace(r#""score":100"#, r#""score":-5"#),
        VALID_JSON.replace(r#""overs":15.0,"#, ""),
        "{not json".to_string(),
    ];
    for body in cases {
        let (status, content_type, body) = send(app(predictor()), post_json(&body)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(content_type.starts_with("application/json"), "got {content_type}");
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["kind"], "invalid_request");
        assert!(json["error"].as_str().is_some_and(|e| !e.is_empty()));
        println!("✓ {}", json["error"]);
    }

    let (_, _, body) = send(
        app(predictor()),
        post_json(&VALID_JSON.replace("Chennai Super Kings", "Gotham")),
    )
    .await;
    assert!(body.contains("unknown team"));
}

#[tokio::test]
async fn test_json_model_failures() {
    println!("\n=== Test: JSON Model Failures ===");
    let refused = Predictor::new(Arc::new(Broken(|| ModelError::UnknownCategory {
        column: "city",
        value: "Chennai".into(),
    })));
    let (status, _, body) = send(app(refused), post_json(VALID_JSON)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["kind"], "prediction_failed");

    let garbled = Predictor::new(Arc::new(Broken(|| ModelError::InvalidOutput("NaN".into()))));
    let (status, _, body) = send(app(garbled), post_json(VALID_JSON)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["kind"], "unexpected");
    assert!(json["error"].as_str().unwrap().starts_with("An unexpected error occurred"));
    println!("✓ 500 bodies carry their kind");
}

#[tokio::test]
async fn test_form_endpoint() {
    println!("\n=== Test: Form Endpoint ===");
    let form = "batting_team=Royal+Challengers+Bangalore&bowling_team=Chennai+Super+Kings\
                &city=Bangalore&target=180&score=40&overs=4.3&wickets=1";
    let (status, content_type, page) = send(app(predictor()), post_form(form)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(content_type.starts_with("text/html"));
    assert!(page.contains("Win Probability for Royal Challengers Bangalore:"));
    assert!(page.contains("Win Probability for Chennai Super Kings:"));
    // 4.3 overs -> 25 balls bowled
    assert!(page.contains("<td>95.0</td>"));

    let zero = "batting_team=Mumbai+Indians&bowling_team=Delhi+Capitals&city=Mumbai\
                &target=180&score=0&overs=0&wickets=0";
    let (status, _, page) = send(app(predictor()), post_form(zero)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(page.contains("Overs completed cannot be zero."));
    assert!(!page.contains("Win Probability for"));
    println!("✓ form renders results and validation errors");
}

#[tokio::test]
async fn test_form_unreadable_body() {
    println!("\n=== Test: Form Unreadable Body ===");
    let blank_overs = "batting_team=Mumbai+Indians&bowling_team=Delhi+Capitals&city=Mumbai\
                       &target=180&score=0&overs=&wickets=0";
    let (status, content_type, page) = send(app(predictor()), post_form(blank_overs)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(content_type.starts_with("text/html"));
    assert!(page.contains("Predict Probability"));
    assert!(page.contains(r#"<p class="error">"#));
    assert!(!page.contains("Win Probability for"));
    println!("✓ page kept with error message");
}

#[tokio::test]
async fn test_index_and_options() {
    println!("\n=== Test: Index and Options ===");
    let get = |uri: &str| Request::builder().uri(uri).body(Body::empty()).unwrap();

    let (status, _, page) = send(app(predictor()), get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(page.contains(r#"<option value="Abu Dhabi">"#));

    let (status, _, body) = send(app(predictor()), get("/api/options")).await;
    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["teams"].as_array().unwrap().len(), 8);
    assert_eq!(json["cities"].as_array().unwrap().len(), 29);
    assert_eq!(json["teams"][0], "Chennai Super Kings");
    println!("✓ sorted choices served");
}
