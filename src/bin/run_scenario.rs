#[macro_use]
extern crate log;

use chrono::{NaiveDateTime, Utc};
use clap::Parser;
use reqwest::header;
use reqwest::redirect::Policy;
use reqwest::{Client, Method, StatusCode};
use serde_json::{json, Value};
use std::error::Error;
use std::time::Duration;

/// Walks a job, a candidate and an application through the hiring flow against a running server.
#[derive(Parser, PartialEq, Debug)]
#[clap(author, version, about, long_about = None)]
struct Options {
    #[clap(short, long, default_value = "http://localhost:8000")]
    url: String,

    /// Defaults to a fresh address so repeated runs do not hit the unique email constraint.
    #[clap(short, long)]
    email: Option<String>,

    /// Delete the application and job created by the run.
    #[clap(short, long)]
    cleanup: bool,
}

async fn call(client: &Client, method: Method, url: String, body: Option<Value>, expected: StatusCode) -> Result<Value, Box<dyn Error>> {
    let mut request = client.request(method.clone(), url.as_str());
    if let Some(b) = &body {
        request = request.json(b);
    }
    let response = request.send().await?;
    let status = response.status();
    let data = response.text().await?;
    info!("{} {} -> {}", method, url, status);
    debug!("response.text(): {}", data);
    if status != expected {
        return Err(format!("{} {} returned {} (expected {}): {}", method, url, status, expected, data).into());
    }
    if data.is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(data.as_str())?)
}

fn id_of(value: &Value) -> Result<i64, Box<dyn Error>> {
    value["id"].as_i64().ok_or_else(|| format!("no id in {}", value).into())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let options = Options::parse();
    debug!("{:?}", options);

    let base_url = options.url.trim_end_matches('/').to_string();
    let email = options.email.unwrap_or_else(|| format!("ann+{}@x.com", Utc::now().timestamp_millis()));

    let mut headers = header::HeaderMap::new();
    headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));
    let client = reqwest::Client::builder()
        .redirect(Policy::limited(3))
        .timeout(Duration::from_secs(30))
        .default_headers(headers)
        .build()?;

    let root = call(&client, Method::GET, format!("{}/", base_url), None, StatusCode::OK).await?;
    info!("{}", root["msg"]);

    let job_body = json!({"title": "Engineer", "description": "Build things", "company": "Acme"});
    let job = call(&client, Method::POST, format!("{}/jobs/", base_url), Some(job_body), StatusCode::OK).await?;
    let job_id = id_of(&job)?;

    let candidate_body = json!({"name": "Ann", "email": email});
    let candidate = call(&client, Method::POST, format!("{}/candidates/", base_url), Some(candidate_body), StatusCode::OK).await?;
    let candidate_id = id_of(&candidate)?;

    let application_body = json!({"candidate_id": candidate_id, "job_id": job_id});
    let application = call(&client, Method::POST, format!("{}/applications/", base_url), Some(application_body), StatusCode::OK).await?;
    let application_id = id_of(&application)?;
    if application["status"] != "Pending" {
        return Err(format!("new application has status {}", application["status"]).into());
    }

    let hire_body = json!({"candidate_id": candidate_id, "job_id": job_id, "status": "Hired"});
    call(&client, Method::PUT, format!("{}/applications/{}", base_url, application_id), Some(hire_body), StatusCode::OK).await?;

    let applications = call(&client, Method::GET, format!("{}/applications/{}", base_url, candidate_id), None, StatusCode::OK).await?;
    let hired = applications
        .as_array()
        .and_then(|list| list.iter().find(|a| a["id"] == application_id))
        .ok_or_else(|| format!("application {} missing from candidate {}", application_id, candidate_id))?;
    let created_at: NaiveDateTime = hired["created_at"].as_str().unwrap_or_default().parse()?;
    let updated_at: NaiveDateTime = hired["updated_at"].as_str().unwrap_or_default().parse()?;
    if hired["status"] != "Hired" || updated_at < created_at {
        return Err(format!("unexpected application after update: {}", hired).into());
    }
    info!("application {} for candidate {} on job {} is Hired", application_id, candidate_id, job_id);

    if options.cleanup {
        call(&client, Method::DELETE, format!("{}/applications/{}", base_url, application_id), None, StatusCode::NO_CONTENT).await?;
        call(&client, Method::DELETE, format!("{}/jobs/{}", base_url, job_id), None, StatusCode::NO_CONTENT).await?;
        call(&client, Method::GET, format!("{}/jobs/{}", base_url, job_id), None, StatusCode::NOT_FOUND).await?;
    }

    Ok(())
}
