use crate::db::Db;
use crate::error::{ApiError, ErrorDetail};
use crate::model::*;
use crate::{application_actions, candidate_actions, job_actions};
use rocket::http::Status;
use rocket::response::status;
use rocket::serde::json::{self, Json};
use rocket::Request;
use rocket_okapi::okapi::openapi3::OpenApi;
use rocket_okapi::{openapi, openapi_get_routes_spec};

pub const WELCOME_MESSAGE: &str = "Welcome to the Job Application Management System";

pub type Payload<'r, T> = Result<Json<T>, json::Error<'r>>;

#[openapi(tag = "Root")]
#[get("/")]
pub async fn read_root() -> Json<RootMessage> {
    Json(RootMessage { msg: WELCOME_MESSAGE.to_string() })
}

// jobs

#[openapi(tag = "Jobs")]
#[post("/jobs/", data = "<payload>")]
pub async fn create_job(db: Db, payload: Payload<'_, JobPayload>) -> Result<Json<Job>, ApiError> {
    let new_job = NewJob::new(payload?.into_inner());
    let job = db.run(move |conn| job_actions::insert(conn, &new_job)).await?;
    info!("created job {}", job.id);
    Ok(Json(job))
}

#[openapi(tag = "Jobs")]
#[get("/jobs/")]
pub async fn get_jobs(db: Db) -> Result<Json<Vec<Job>>, ApiError> {
    db.run(job_actions::find_all).await.map(Json)
}

#[openapi(tag = "Jobs")]
#[get("/jobs/<job_id>")]
pub async fn get_job(db: Db, job_id: i32) -> Result<Json<Job>, ApiError> {
    db.run(move |conn| job_actions::find_by_id(conn, job_id)).await.map(Json)
}

#[openapi(tag = "Jobs")]
#[put("/jobs/<job_id>", data = "<payload>")]
pub async fn update_job(db: Db, job_id: i32, payload: Payload<'_, JobPayload>) -> Result<Json<Job>, ApiError> {
    let payload = payload?.into_inner();
    let job = db.run(move |conn| job_actions::update(conn, job_id, payload)).await?;
    info!("updated job {}", job.id);
    Ok(Json(job))
}

#[openapi(tag = "Jobs")]
#[delete("/jobs/<job_id>")]
pub async fn delete_job(db: Db, job_id: i32) -> Result<status::NoContent, ApiError> {
    db.run(move |conn| job_actions::delete(conn, job_id)).await?;
    info!("deleted job {}", job_id);
    Ok(status::NoContent)
}

// candidates

#[openapi(tag = "Candidates")]
#[post("/candidates/", data = "<payload>")]
pub async fn create_candidate(db: Db, payload: Payload<'_, CandidatePayload>) -> Result<Json<Candidate>, ApiError> {
    let new_candidate = NewCandidate::new(payload?.into_inner());
    let candidate = db.run(move |conn| candidate_actions::insert(conn, &new_candidate)).await?;
    info!("created candidate {}", candidate.id);
    Ok(Json(candidate))
}

#[openapi(tag = "Candidates")]
#[get("/candidates/")]
pub async fn get_candidates(db: Db) -> Result<Json<Vec<Candidate>>, ApiError> {
    db.run(candidate_actions::find_all).await.map(Json)
}

#[openapi(tag = "Candidates")]
#[get("/candidates/<candidate_id>")]
pub async fn get_candidate(db: Db, candidate_id: i32) -> Result<Json<Candidate>, ApiError> {
    db.run(move |conn| candidate_actions::find_by_id(conn, candidate_id)).await.map(Json)
}

// applications

#[openapi(tag = "Applications")]
#[post("/applications/", data = "<payload>")]
pub async fn create_application(db: Db, payload: Payload<'_, ApplicationPayload>) -> Result<Json<Application>, ApiError> {
    let payload = payload?.into_inner();
    let application = db.run(move |conn| application_actions::insert(conn, payload)).await?;
    info!("created application {} for candidate {} on job {}", application.id, application.candidate_id, application.job_id);
    Ok(Json(application))
}

#[openapi(tag = "Applications")]
#[get("/applications/<candidate_id>")]
pub async fn get_applications(db: Db, candidate_id: i32) -> Result<Json<Vec<Application>>, ApiError> {
    db.run(move |conn| application_actions::find_by_candidate(conn, candidate_id)).await.map(Json)
}

#[openapi(tag = "Applications")]
#[put("/applications/<application_id>", data = "<payload>")]
pub async fn update_application(db: Db, application_id: i32, payload: Payload<'_, ApplicationPayload>) -> Result<Json<Application>, ApiError> {
    let payload = payload?.into_inner();
    let application = db.run(move |conn| application_actions::update(conn, application_id, payload)).await?;
    info!("application {} is now {}", application.id, application.status);
    Ok(Json(application))
}

#[openapi(tag = "Applications")]
#[delete("/applications/<application_id>")]
pub async fn delete_application(db: Db, application_id: i32) -> Result<status::NoContent, ApiError> {
    db.run(move |conn| application_actions::delete(conn, application_id)).await?;
    info!("deleted application {}", application_id);
    Ok(status::NoContent)
}

pub fn get_routes_and_docs(settings: &rocket_okapi::settings::OpenApiSettings) -> (Vec<rocket::Route>, OpenApi) {
    openapi_get_routes_spec![settings:
        read_root,
        create_job, get_jobs, get_job, update_job, delete_job,
        create_candidate, get_candidates, get_candidate,
        create_application, get_applications, update_application, delete_application
    ]
}

// catchers answer with the same body shape as ApiError

#[catch(default)]
pub fn default_catcher(status: Status, _request: &Request) -> (Status, Json<ErrorDetail>) {
    (status, Json(ErrorDetail::new(status.reason().unwrap_or("Unknown Error"))))
}

#[catch(404)]
pub fn not_found(_request: &Request) -> Json<ErrorDetail> {
    Json(ErrorDetail::new("Not Found"))
}

#[catch(422)]
pub fn unprocessable_entity(request: &Request) -> Json<ErrorDetail> {
    Json(ErrorDetail::new(format!("Unprocessable request: {}", request.uri())))
}
