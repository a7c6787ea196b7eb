use std::sync::Arc;

use actix_web::{get, post, web, HttpRequest, HttpResponse};

use crate::{
    app_state::AppState,
    errors::AppError,
    middleware::request_tag,
    models::{
        domain::GenerationStatus,
        dto::{request::GenerateMcqRequestDto, response::StatsResponse},
    },
};

#[post("/api/v1/generate-mcq")]
pub async fn generate_mcq(
    req: HttpRequest,
    state: web::Data<Arc<AppState>>,
    request: web::Json<GenerateMcqRequestDto>,
) -> Result<HttpResponse, AppError> {
    let tag = request_tag(&req);
    let request = request.into_inner();
    log::info!(
        "[{}] MCQ generation requested by {} on '{}'",
        tag,
        request.username,
        request.topic
    );

    let result = state.generation_service.generate(request).await?;
    log::info!(
        "[{}] MCQ generation finished with status {} ({} question(s), {} error(s))",
        tag,
        result.status,
        result.metadata.total_questions,
        result.errors.len()
    );

    // A failed result still carries the full attempt history for the caller.
    Ok(match result.status {
        GenerationStatus::Failed => HttpResponse::BadGateway().json(result),
        _ => HttpResponse::Ok().json(result),
    })
}

#[post("/api/v1/generate-mcq/batch")]
pub async fn generate_mcq_batch(
    req: HttpRequest,
    state: web::Data<Arc<AppState>>,
    requests: web::Json<Vec<GenerateMcqRequestDto>>,
) -> Result<HttpResponse, AppError> {
    let tag = request_tag(&req);
    let requests = requests.into_inner();
    log::info!("[{}] Batch generation requested for {} topic(s)", tag, requests.len());

    let report = state.generation_service.generate_batch(requests).await?;
    log::info!(
        "[{}] Batch {} finished: {} succeeded, {} partial, {} failed",
        tag,
        report.batch_id,
        report.summary.succeeded,
        report.summary.partial,
        report.summary.failed
    );
    Ok(HttpResponse::Ok().json(report))
}

#[get("/api/v1/generate-mcq/stats")]
pub async fn generation_stats(state: web::Data<Arc<AppState>>) -> HttpResponse {
    HttpResponse::Ok().json(StatsResponse::from(state.config.as_ref()))
}
