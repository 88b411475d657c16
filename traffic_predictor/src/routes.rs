use std::sync::Arc;

use axum::{
    extract::{rejection::FormRejection, State},
    response::Html,
    routing::{get, post},
    Form, Json, Router,
};
use serde_json::{json, Value};

use crate::model::PredictContext;
use crate::page;
use crate::types::{PageView, PredictForm};

#[derive(Clone)]
pub struct AppState {
    pub ctx: Arc<PredictContext>,
}

impl AppState {
    pub fn new(ctx: PredictContext) -> Self {
        Self { ctx: Arc::new(ctx) }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/predict", post(predict))
        .route("/health", get(health))
        .with_state(state)
}

async fn index() -> Html<String> {
    Html(page::render(&PageView::default()))
}

/// Always answers with the page; failures become an error line.
async fn predict(
    State(state): State<AppState>,
    form: Result<Form<PredictForm>, FormRejection>,
) -> Html<String> {
    let view = match form {
        Err(rejection) => PageView {
            error_text: Some(format!("Error: {rejection}")),
            ..Default::default()
        },
        Ok(Form(form)) => view_for(&state.ctx, &form),
    };
    Html(page::render(&view))
}

pub fn view_for(ctx: &PredictContext, form: &PredictForm) -> PageView {
    match ctx.predict_form(form) {
        Ok(pred) => {
            tracing::debug!(value = pred.value, rounded = pred.rounded, "prediction");
            PageView {
                prediction_text: Some(pred.display_line()),
                notice_text: (!pred.unseen.is_empty()).then(|| {
                    format!(
                        "Note: {} not seen during training, prediction may be less reliable.",
                        pred.unseen.join(" and ")
                    )
                }),
                error_text: None,
            }
        }
        Err(e) => {
            tracing::debug!(error = %e, "prediction failed");
            PageView {
                error_text: Some(format!("Error: {e}")),
                ..Default::default()
            }
        }
    }
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "status": "ok", "run_id": state.ctx.run_id() }))
}
