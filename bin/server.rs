// BillSense - Web Server
// REST API with Axum: bill OCR upload + feedback analytics

use anyhow::{Context, Result};
use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use billsense::config::{init_tracing, load_dotenv};
use billsense::{
    AppConfig, BillOutcome, BillProcessor, FeedbackAnalyzer, FeedbackStore, Insights,
    LexiconProvider, PipelineError, SentimentLabel, TesseractExtractor, VERSION,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Largest accepted upload
const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

#[derive(Parser)]
#[command(name = "billsense-server", version, about = "BillSense HTTP API")]
struct ServerArgs {
    #[command(flatten)]
    config: AppConfig,

    /// Address to listen on
    #[arg(long, env = "BILLSENSE_BIND", default_value = "0.0.0.0:8000")]
    bind: String,
}

/// Shared application state
#[derive(Clone)]
struct AppState {
    bills: BillProcessor,
    feedback: FeedbackAnalyzer,
    insights_keyword_limit: usize,
}

impl AppState {
    fn new(config: &AppConfig) -> Self {
        let extractor = TesseractExtractor::new(&config.tesseract_bin, &config.ocr_language);
        let store = Arc::new(FeedbackStore::new());

        AppState {
            bills: BillProcessor::new(Arc::new(extractor)),
            feedback: FeedbackAnalyzer::new(Arc::new(LexiconProvider::new()), store)
                .with_max_keywords(config.max_keywords),
            insights_keyword_limit: config.insights_keyword_limit,
        }
    }
}

/// API Response wrapper: payload fields + success/message at the top level
#[derive(Serialize)]
struct ApiResponse<T> {
    #[serde(flatten)]
    data: T,
    success: bool,
    message: String,
}

impl<T> ApiResponse<T> {
    fn ok(data: T, message: &str) -> Self {
        Self {
            data,
            success: true,
            message: message.to_string(),
        }
    }
}

/// Error body: `{"detail": "..."}`
#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    fn bad_request(detail: impl Into<String>) -> Self {
        ApiError {
            status: StatusCode::BAD_REQUEST,
            detail: detail.into(),
        }
    }

    fn internal(detail: impl Into<String>) -> Self {
        ApiError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            detail: detail.into(),
        }
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        if err.is_input() {
            ApiError::bad_request(err.to_string())
        } else {
            error!("Pipeline failure: {}", err);
            ApiError::internal(err.to_string())
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError {
            status: rejection.status(),
            detail: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}

#[derive(Deserialize)]
struct FeedbackRequest {
    feedback: String,
}

#[derive(Serialize)]
struct FeedbackResponse {
    sentiment: SentimentLabel,
    confidence: f64,
    polarity: f64,
    subjectivity: f64,
    keywords: Vec<String>,
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET / - Service description
async fn root() -> impl IntoResponse {
    Json(json!({
        "message": "BillSense API",
        "version": VERSION,
        "endpoints": ["/api/ocr/bill", "/api/nlp/feedback", "/api/nlp/insights"],
    }))
}

/// GET /health - Health check
async fn health_check() -> impl IntoResponse {
    Json(json!({ "status": "healthy" }))
}

/// POST /api/ocr/bill - Multipart image upload (field "file")
async fn process_bill(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<BillOutcome>, ApiError> {
    let mut upload = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let is_image = field
            .content_type()
            .map(|ct| ct.starts_with("image/"))
            .unwrap_or(false);
        if !is_image {
            return Err(ApiError::bad_request("File must be an image"));
        }

        let filename = field.file_name().unwrap_or("upload").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(format!("Failed to read upload: {}", e)))?;
        upload = Some((filename, bytes));
        break;
    }

    let (filename, bytes) = upload.ok_or_else(|| ApiError::bad_request("Missing file field"))?;
    if bytes.is_empty() {
        return Err(ApiError::bad_request("Empty file uploaded"));
    }

    info!(filename = %filename, size = bytes.len(), "Processing image");

    // tesseract is a blocking subprocess
    let processor = state.bills.clone();
    let outcome = tokio::task::spawn_blocking(move || processor.process_image(&bytes))
        .await
        .map_err(|e| ApiError::internal(format!("Failed to process image: {}", e)))??;

    Ok(Json(outcome))
}

/// POST /api/nlp/feedback - Analyze and record one feedback
async fn analyze_feedback(
    State(state): State<AppState>,
    request: Result<Json<FeedbackRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<FeedbackResponse>>, ApiError> {
    let Json(request) = request?;
    let analysis = state.feedback.analyze(&request.feedback)?;
    let sentiment = &analysis.sentiment;

    let response = FeedbackResponse {
        sentiment: sentiment.label(),
        confidence: round3(sentiment.confidence()),
        polarity: round3(sentiment.polarity()),
        subjectivity: round3(sentiment.subjectivity()),
        keywords: analysis.keywords,
    };

    Ok(Json(ApiResponse::ok(
        response,
        "Feedback analysis completed successfully",
    )))
}

/// GET /api/nlp/insights - Aggregated feedback analytics
async fn get_insights(State(state): State<AppState>) -> Json<ApiResponse<Insights>> {
    info!("Generating feedback insights");
    let insights = state
        .feedback
        .store()
        .insights(state.insights_keyword_limit);

    Json(ApiResponse::ok(insights, "Insights generated successfully"))
}

fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/ocr/bill", post(process_bill))
        .route("/nlp/feedback", post(analyze_feedback))
        .route("/nlp/insights", get(get_insights))
        .with_state(state);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    load_dotenv();
    let args = ServerArgs::parse();
    init_tracing(&args.config.log_level);

    info!(config = ?args.config, "🌐 BillSense - Web Server");

    let app = build_router(AppState::new(&args.config));

    let listener = tokio::net::TcpListener::bind(&args.bind)
        .await
        .with_context(|| format!("Failed to bind to {}", args.bind))?;

    info!("🚀 Server running on http://{}", args.bind);

    axum::serve(listener, app)
        .await
        .context("Server error")?;

    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request};
    use serde_json::Value;
    use tower::ServiceExt;

    const BOUNDARY: &str = "billsense-test-boundary";

    fn app() -> Router {
        build_router(AppState::new(&AppConfig::default()))
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_feedback(text: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/nlp/feedback")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({ "feedback": text }).to_string()))
            .unwrap()
    }

    fn post_upload(content_type: &str, data: &[u8]) -> Request<Body> {
        let mut body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"bill.png\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/api/ocr/bill")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({ "status": "healthy" }));
    }

    #[tokio::test]
    async fn test_root_lists_endpoints() {
        let response = app()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let body = body_json(response).await;
        assert_eq!(body["version"], VERSION);
        assert_eq!(body["endpoints"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_feedback_analysis() {
        let response = app()
            .oneshot(post_feedback(
                "I absolutely love this product! The quality is excellent.",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["sentiment"], "positive");
        assert_eq!(body["success"], true);
        assert!(body["polarity"].as_f64().unwrap() > 0.1);

        let keywords: Vec<&str> = body["keywords"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|k| k.as_str())
            .collect();
        assert!(keywords.contains(&"product"));
        assert!(keywords.contains(&"quality"));
    }

    #[tokio::test]
    async fn test_empty_feedback_is_bad_request() {
        let response = app().oneshot(post_feedback("   ")).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({ "detail": "Feedback text cannot be empty" })
        );
    }

    #[tokio::test]
    async fn test_malformed_feedback_body_gets_detail() {
        let app = app();

        for body in ["{not json", r#"{"text": "wrong field"}"#] {
            let request = Request::builder()
                .method("POST")
                .uri("/api/nlp/feedback")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body))
                .unwrap();

            let response = app.clone().oneshot(request).await.unwrap();
            assert!(response.status().is_client_error());

            let body = body_json(response).await;
            assert!(body["detail"].as_str().is_some_and(|d| !d.is_empty()));
        }
    }

    #[tokio::test]
    async fn test_insights_reflect_submitted_feedback() {
        let app = app();

        for text in [
            "Great service and friendly staff!",
            "Terrible wait, the staff was rude.",
        ] {
            let response = app.clone().oneshot(post_feedback(text)).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/nlp/insights")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let body = body_json(response).await;
        assert_eq!(body["total_feedback"], 2);
        assert_eq!(body["message"], "Insights generated successfully");
        assert_eq!(body["sentiment_distribution"]["positive"], 50.0);
        assert_eq!(body["sentiment_distribution"]["negative"], 50.0);
    }

    #[tokio::test]
    async fn test_empty_insights() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/api/nlp/insights")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let body = body_json(response).await;
        assert_eq!(body["total_feedback"], 0);
        assert_eq!(body["average_confidence"], 0.0);
        assert!(body["top_keywords"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upload_must_be_image() {
        let response = app()
            .oneshot(post_upload("text/plain", b"Haircut $25.00"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await, json!({ "detail": "File must be an image" }));
    }

    #[tokio::test]
    async fn test_empty_upload_rejected() {
        let response = app().oneshot(post_upload("image/png", b"")).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await, json!({ "detail": "Empty file uploaded" }));
    }
}
