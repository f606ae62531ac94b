#[macro_use]
extern crate rocket;
#[macro_use]
extern crate diesel;
extern crate diesel_migrations;
#[macro_use]
extern crate log;

use crate::config::Config;
use crate::db::DbPool;
use dotenvy::dotenv;
use rocket::{Build, Rocket};
use rocket_okapi::{mount_endpoints_and_merged_docs, swagger_ui::*};
use std::error::Error;

mod application_actions;
mod candidate_actions;
mod config;
mod db;
mod error;
mod job_actions;
mod model;
mod openapi;
mod routes;
mod schema;

#[rocket::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv().ok();
    env_logger::init();

    let config = Config::from_env().map_err(|e| {
        error!("{}", e);
        e
    })?;
    debug!("pool size: {}, connection timeout: {:?}", config.pool_max_size, config.connection_timeout);

    let pool = db::create_db_connection_pool(&config).map_err(|e| {
        error!("{}", e);
        e
    })?;
    db::init_db(&pool)?;

    let launch_result = create_server(pool).launch().await;
    match launch_result {
        Ok(_) => info!("Rocket shut down gracefully."),
        Err(err) => warn!("Rocket had an error: {}", err),
    };
    Ok(())
}

pub fn create_server(pool: DbPool) -> Rocket<Build> {
    let mut building_rocket = rocket::build()
        .manage(pool)
        .mount(
            "/docs/",
            make_swagger_ui(&SwaggerUIConfig {
                url: "../openapi.json".to_owned(),
                ..Default::default()
            }),
        )
        .register("/", catchers![routes::default_catcher, routes::not_found, routes::unprocessable_entity]);

    let openapi_settings = rocket_okapi::settings::OpenApiSettings::default();
    let custom_route_spec = (vec![], openapi::custom_openapi_spec());
    mount_endpoints_and_merged_docs! {
        building_rocket, "/".to_owned(), openapi_settings,
        "/external" => custom_route_spec,
        "" => routes::get_routes_and_docs(&openapi_settings),
    };
    building_rocket
}

#[cfg(test)]
mod test {
    use crate::config::Config;
    use crate::create_server;
    use crate::db::{self, DbPool};
    use crate::error::ErrorDetail;
    use crate::model::{Application, ApplicationStatus, Candidate, Job, RootMessage};
    use crate::routes::WELCOME_MESSAGE;
    use diesel::prelude::*;
    use diesel::r2d2::{self, ConnectionManager, CustomizeConnection};
    use rocket::http::{ContentType, Status};
    use rocket::local::blocking::Client;
    use std::time::Duration;

    const UNKNOWN_ID: i32 = i32::MAX;

    /// Never connects until a handler asks for a connection, which then times out quickly.
    fn offline_client() -> Client {
        let manager = ConnectionManager::<PgConnection>::new("postgres://nobody@127.0.0.1:1/unreachable");
        let pool: DbPool = r2d2::Pool::builder()
            .max_size(1)
            .min_idle(Some(0))
            .connection_timeout(Duration::from_millis(250))
            .build_unchecked(manager);
        Client::tracked(create_server(pool)).expect("valid rocket instance")
    }

    #[derive(Debug)]
    struct TestTransaction;

    impl CustomizeConnection<PgConnection, r2d2::Error> for TestTransaction {
        fn on_acquire(&self, conn: &mut PgConnection) -> Result<(), r2d2::Error> {
            conn.begin_test_transaction().map_err(r2d2::Error::QueryError)
        }
    }

    /// Single connection inside a test transaction that is never committed.
    fn database_client() -> Client {
        dotenvy::dotenv().ok();
        let config = Config::from_env().expect("DATABASE_URL must be set to run database tests");
        let manager = ConnectionManager::<PgConnection>::new(config.database_url);
        let pool: DbPool = r2d2::Pool::builder()
            .max_size(1)
            .connection_customizer(Box::new(TestTransaction))
            .build(manager)
            .expect("could not connect to DATABASE_URL");
        db::init_db(&pool).expect("could not run migrations");
        Client::tracked(create_server(pool)).expect("valid rocket instance")
    }

    fn post_json<'c>(client: &'c Client, uri: &'c str, body: &str) -> rocket::local::blocking::LocalResponse<'c> {
        client.post(uri).header(ContentType::JSON).body(body.to_string()).dispatch()
    }

    fn put_json<'c>(client: &'c Client, uri: String, body: &str) -> rocket::local::blocking::LocalResponse<'c> {
        client.put(uri).header(ContentType::JSON).body(body.to_string()).dispatch()
    }

    fn create_job(client: &Client, title: &str) -> Job {
        let body = format!(r#"{{ "title": "{}", "description": "Build things", "company": "Acme" }}"#, title);
        let response = post_json(client, "/jobs/", &body);
        assert_eq!(response.status(), Status::Ok);
        response.into_json::<Job>().expect("job body")
    }

    fn create_candidate(client: &Client, email: &str) -> Candidate {
        let body = format!(r#"{{ "name": "Ann", "email": "{}" }}"#, email);
        let response = post_json(client, "/candidates/", &body);
        assert_eq!(response.status(), Status::Ok);
        response.into_json::<Candidate>().expect("candidate body")
    }

    #[test]
    fn root() {
        let client = offline_client();
        let response = client.get("/").dispatch();
        assert_eq!(response.status(), Status::Ok);
        let body = response.into_json::<RootMessage>().expect("root body");
        assert_eq!(body.msg, WELCOME_MESSAGE);
    }

    #[test]
    fn missing_job_field_is_unprocessable() {
        let client = offline_client();
        let response = post_json(&client, "/jobs/", r#"{ "title": "Engineer", "company": "Acme" }"#);
        assert_eq!(response.status(), Status::UnprocessableEntity);
        let body = response.into_json::<ErrorDetail>().expect("error body");
        assert!(body.detail.contains("missing field `description`"), "{}", body.detail);
    }

    #[test]
    fn invalid_status_is_unprocessable() {
        let client = offline_client();
        let response = post_json(&client, "/applications/", r#"{ "candidate_id": 1, "job_id": 1, "status": "Promoted" }"#);
        assert_eq!(response.status(), Status::UnprocessableEntity);
        let body = response.into_json::<ErrorDetail>().expect("error body");
        assert!(body.detail.contains("unknown variant `Promoted`"), "{}", body.detail);
    }

    #[test]
    fn non_integer_reference_is_unprocessable() {
        let client = offline_client();
        let response = put_json(&client, "/applications/1".to_string(), r#"{ "candidate_id": "one", "job_id": 1 }"#);
        assert_eq!(response.status(), Status::UnprocessableEntity);
    }

    #[test]
    fn unknown_route_is_json_not_found() {
        let client = offline_client();
        let response = client.get("/interviews/").dispatch();
        assert_eq!(response.status(), Status::NotFound);
        let body = response.into_json::<ErrorDetail>().expect("error body");
        assert_eq!(body.detail, "Not Found");
    }

    #[test]
    fn unreachable_store_is_unavailable() {
        let client = offline_client();
        let response = client.get("/jobs/").dispatch();
        assert_eq!(response.status(), Status::ServiceUnavailable);
        assert!(response.into_json::<ErrorDetail>().is_some());
    }

    #[test]
    fn openapi_document() {
        let client = offline_client();
        let response = client.get("/openapi.json").dispatch();
        assert_eq!(response.status(), Status::Ok);
        let document = response.into_json::<serde_json::Value>().expect("openapi body");
        let paths = document["paths"].as_object().expect("paths object");
        assert!(paths.keys().any(|path| path.contains("/jobs/")));
        assert!(paths.keys().any(|path| path.contains("{candidate_id}")));
        let tags = document["tags"].as_array().expect("tags array");
        for name in ["Root", "Jobs", "Candidates", "Applications"] {
            assert!(tags.iter().any(|tag| tag["name"] == name), "missing tag {}", name);
        }
    }

    #[test]
    fn non_integer_path_id_is_json_error() {
        let client = offline_client();
        let response = client.get("/jobs/abc").dispatch();
        assert_eq!(response.status(), Status::UnprocessableEntity);
        let body = response.into_json::<ErrorDetail>().expect("error body");
        assert!(body.detail.contains("/jobs/abc"), "{}", body.detail);
    }

    #[test]
    #[ignore = "requires a PostgreSQL DATABASE_URL"]
    fn job_lifecycle() {
        let client = database_client();
        let job = create_job(&client, "Engineer");
        assert_eq!(job.title, "Engineer");
        assert_eq!(job.created_at, job.updated_at);

        let fetched = client.get(format!("/jobs/{}", job.id)).dispatch().into_json::<Job>().expect("job body");
        assert_eq!(fetched, job);

        let listed = client.get("/jobs/").dispatch().into_json::<Vec<Job>>().expect("job list");
        assert!(listed.contains(&job));

        let response = put_json(
            &client,
            format!("/jobs/{}", job.id),
            r#"{ "title": "Senior Engineer", "description": "Build more things", "company": "Acme Corp" }"#,
        );
        assert_eq!(response.status(), Status::Ok);
        let updated = response.into_json::<Job>().expect("job body");
        assert_eq!(updated.id, job.id);
        assert_eq!(updated.title, "Senior Engineer");
        assert_eq!(updated.description, "Build more things");
        assert_eq!(updated.company, "Acme Corp");
        assert_eq!(updated.created_at, job.created_at);
        assert!(updated.updated_at >= job.updated_at);

        let response = client.delete(format!("/jobs/{}", job.id)).dispatch();
        assert_eq!(response.status(), Status::NoContent);
        assert!(response.into_string().unwrap_or_default().is_empty());

        let response = client.get(format!("/jobs/{}", job.id)).dispatch();
        assert_eq!(response.status(), Status::NotFound);
        assert_eq!(response.into_json::<ErrorDetail>().expect("error body").detail, "Job not found");

        let response = client.delete(format!("/jobs/{}", job.id)).dispatch();
        assert_eq!(response.status(), Status::NotFound);
    }

    #[test]
    #[ignore = "requires a PostgreSQL DATABASE_URL"]
    fn unknown_ids_are_not_found() {
        let client = database_client();
        assert_eq!(client.get(format!("/jobs/{}", UNKNOWN_ID)).dispatch().status(), Status::NotFound);
        assert_eq!(client.get(format!("/candidates/{}", UNKNOWN_ID)).dispatch().status(), Status::NotFound);
        assert_eq!(client.delete(format!("/applications/{}", UNKNOWN_ID)).dispatch().status(), Status::NotFound);

        let response = put_json(&client, format!("/jobs/{}", UNKNOWN_ID), r#"{ "title": "t", "description": "d", "company": "c" }"#);
        assert_eq!(response.status(), Status::NotFound);

        let response = put_json(&client, format!("/applications/{}", UNKNOWN_ID), r#"{ "candidate_id": 1, "job_id": 1 }"#);
        assert_eq!(response.status(), Status::NotFound);
        assert_eq!(response.into_json::<ErrorDetail>().expect("error body").detail, "Application not found");
    }

    #[test]
    #[ignore = "requires a PostgreSQL DATABASE_URL"]
    fn duplicate_email_is_conflict() {
        let client = database_client();
        let first = create_candidate(&client, "duplicate@jobs.test");

        let response = post_json(&client, "/candidates/", r#"{ "name": "Bob", "email": "duplicate@jobs.test", "resume": "cv.pdf" }"#);
        assert_eq!(response.status(), Status::Conflict);

        let fetched = client.get(format!("/candidates/{}", first.id)).dispatch().into_json::<Candidate>().expect("candidate body");
        assert_eq!(fetched, first);
        assert_eq!(fetched.name, "Ann");
        assert_eq!(fetched.resume, None);

        let listed = client.get("/candidates/").dispatch().into_json::<Vec<Candidate>>().expect("candidate list");
        assert_eq!(listed.iter().filter(|c| c.email == "duplicate@jobs.test").count(), 1);
    }

    #[test]
    #[ignore = "requires a PostgreSQL DATABASE_URL"]
    fn application_with_unknown_references_is_not_found() {
        let client = database_client();
        let candidate = create_candidate(&client, "orphan@jobs.test");
        let job = create_job(&client, "Engineer");

        let body = format!(r#"{{ "candidate_id": {}, "job_id": {} }}"#, candidate.id, UNKNOWN_ID);
        let response = post_json(&client, "/applications/", &body);
        assert_eq!(response.status(), Status::NotFound);
        assert_eq!(response.into_json::<ErrorDetail>().expect("error body").detail, "Job not found");

        let body = format!(r#"{{ "candidate_id": {}, "job_id": {} }}"#, UNKNOWN_ID, job.id);
        let response = post_json(&client, "/applications/", &body);
        assert_eq!(response.status(), Status::NotFound);
        assert_eq!(response.into_json::<ErrorDetail>().expect("error body").detail, "Candidate not found");

        let applications = client.get(format!("/applications/{}", candidate.id)).dispatch().into_json::<Vec<Application>>().expect("application list");
        assert!(applications.is_empty());
    }

    #[test]
    #[ignore = "requires a PostgreSQL DATABASE_URL"]
    fn application_update_with_unknown_references_is_not_found() {
        let client = database_client();
        let candidate = create_candidate(&client, "moving@jobs.test");
        let job = create_job(&client, "Engineer");
        let body = format!(r#"{{ "candidate_id": {}, "job_id": {} }}"#, candidate.id, job.id);
        let application = post_json(&client, "/applications/", &body).into_json::<Application>().expect("application body");

        let body = format!(r#"{{ "candidate_id": {}, "job_id": {}, "status": "Hired" }}"#, candidate.id, UNKNOWN_ID);
        let response = put_json(&client, format!("/applications/{}", application.id), &body);
        assert_eq!(response.status(), Status::NotFound);
        assert_eq!(response.into_json::<ErrorDetail>().expect("error body").detail, "Job not found");

        let body = format!(r#"{{ "candidate_id": {}, "job_id": {}, "status": "Hired" }}"#, UNKNOWN_ID, job.id);
        let response = put_json(&client, format!("/applications/{}", application.id), &body);
        assert_eq!(response.status(), Status::NotFound);
        assert_eq!(response.into_json::<ErrorDetail>().expect("error body").detail, "Candidate not found");

        let applications = client.get(format!("/applications/{}", candidate.id)).dispatch().into_json::<Vec<Application>>().expect("application list");
        assert_eq!(applications, vec![application]);
    }

    #[test]
    #[ignore = "requires a PostgreSQL DATABASE_URL"]
    fn applications_for_unknown_candidate_are_empty() {
        let client = database_client();
        let response = client.get(format!("/applications/{}", UNKNOWN_ID)).dispatch();
        assert_eq!(response.status(), Status::Ok);
        assert_eq!(response.into_string().expect("body"), "[]");
    }

    #[test]
    #[ignore = "requires a PostgreSQL DATABASE_URL"]
    fn job_with_applications_cannot_be_deleted() {
        let client = database_client();
        let candidate = create_candidate(&client, "restrict@jobs.test");
        let job = create_job(&client, "Engineer");
        let body = format!(r#"{{ "candidate_id": {}, "job_id": {} }}"#, candidate.id, job.id);
        let application = post_json(&client, "/applications/", &body).into_json::<Application>().expect("application body");

        let response = client.delete(format!("/jobs/{}", job.id)).dispatch();
        assert_eq!(response.status(), Status::Conflict);
        assert_eq!(client.get(format!("/jobs/{}", job.id)).dispatch().status(), Status::Ok);

        assert_eq!(client.delete(format!("/applications/{}", application.id)).dispatch().status(), Status::NoContent);
        assert_eq!(client.delete(format!("/jobs/{}", job.id)).dispatch().status(), Status::NoContent);
    }

    #[test]
    #[ignore = "requires a PostgreSQL DATABASE_URL"]
    fn hiring_scenario() {
        let client = database_client();
        let job = create_job(&client, "Engineer");
        let candidate = create_candidate(&client, "ann@jobs.test");

        let body = format!(r#"{{ "candidate_id": {}, "job_id": {} }}"#, candidate.id, job.id);
        let response = post_json(&client, "/applications/", &body);
        assert_eq!(response.status(), Status::Ok);
        let application = response.into_json::<Application>().expect("application body");
        assert_eq!(application.status, ApplicationStatus::Pending);
        assert_eq!(application.created_at, application.updated_at);

        let body = format!(r#"{{ "candidate_id": {}, "job_id": {}, "status": "Hired" }}"#, candidate.id, job.id);
        let response = put_json(&client, format!("/applications/{}", application.id), &body);
        assert_eq!(response.status(), Status::Ok);
        let hired = response.into_json::<Application>().expect("application body");
        assert_eq!(hired.status, ApplicationStatus::Hired);

        let applications = client.get(format!("/applications/{}", candidate.id)).dispatch().into_json::<Vec<Application>>().expect("application list");
        assert_eq!(applications.len(), 1);
        assert_eq!(applications[0].id, application.id);
        assert_eq!(applications[0].status, ApplicationStatus::Hired);
        assert!(applications[0].updated_at >= application.updated_at);
        assert!(applications[0].updated_at >= applications[0].created_at);

        // no transition guard: a hired application can go back to pending
        let body = format!(r#"{{ "candidate_id": {}, "job_id": {} }}"#, candidate.id, job.id);
        let reverted = put_json(&client, format!("/applications/{}", application.id), &body).into_json::<Application>().expect("application body");
        assert_eq!(reverted.status, ApplicationStatus::Pending);
    }

    #[test]
    #[ignore = "requires a PostgreSQL DATABASE_URL"]
    fn repeated_reads_are_identical() {
        let client = database_client();
        let job = create_job(&client, "Engineer");
        let first = client.get(format!("/jobs/{}", job.id)).dispatch().into_string().expect("body");
        let second = client.get(format!("/jobs/{}", job.id)).dispatch().into_string().expect("body");
        assert_eq!(first, second);
    }
}
