use axum::{Router, routing::{get, MethodRouter}};
use crate::handlers::ai_models::{api_root, model_unavailable};
use crate::state::AppState;

const MODEL_ENDPOINTS: &[&str] = &[
    "/api/sustainability-report/",
    "/api/environmental-impact/",
    "/api/business-model/",
    "/api/predict/",
    "/api/generate-text/",
    "/api/generate-image/",
    "/api/sample-data/",
];

pub fn routes() -> Router<AppState> {
    let model = || -> MethodRouter<AppState> { get(model_unavailable).post(model_unavailable) };

    MODEL_ENDPOINTS
        .iter()
        .fold(Router::new().route("/api/", get(api_root)), |router, path| {
            router.route(path, model())
        })
}
