use crate::{candidate_actions, job_actions};
use crate::error::ApiError;
use crate::model::*;
use crate::schema::applications;
use crate::schema::applications::dsl::*;
use diesel::prelude::*;

fn not_found() -> ApiError {
    ApiError::NotFound("Application not found".to_string())
}

/// Referenced rows stay locked until the transaction ends, so a concurrent delete cannot slip in before the write.
fn check_references(conn: &mut PgConnection, payload: &ApplicationPayload) -> Result<(), ApiError> {
    if !candidate_actions::lock_reference(conn, payload.candidate_id)? {
        return Err(ApiError::NotFound("Candidate not found".to_string()));
    }
    if !job_actions::lock_reference(conn, payload.job_id)? {
        return Err(ApiError::NotFound("Job not found".to_string()));
    }
    Ok(())
}

/// No existence check on the candidate: an unknown `candidate_id` yields an empty list.
pub fn find_by_candidate(conn: &mut PgConnection, cid: i32) -> Result<Vec<Application>, ApiError> {
    let statement = applications.filter(candidate_id.eq(cid)).order(id.asc()).select(Application::as_select());
    Ok(statement.load(conn)?)
}

pub fn insert(conn: &mut PgConnection, payload: ApplicationPayload) -> Result<Application, ApiError> {
    check_references(conn, &payload)?;
    let insert = diesel::insert_into(applications::table).values(NewApplication::new(payload));
    let application: Application = insert.returning(Application::as_returning()).get_result(conn)?;
    debug!("inserted application: {} with status {}", application.id, application.status);
    Ok(application)
}

/// Overwrites references and status; any status may follow any other.
pub fn update(conn: &mut PgConnection, gid: i32, payload: ApplicationPayload) -> Result<Application, ApiError> {
    let locked = applications.filter(id.eq(gid)).select(Application::as_select()).for_update();
    let current: Application = locked.get_result(conn).optional()?.ok_or_else(not_found)?;
    check_references(conn, &payload)?;
    let changes = ApplicationChanges::new(payload, touch(current.updated_at));
    let statement = diesel::update(applications::table.filter(id.eq(gid))).set(&changes);
    let application: Application = statement.returning(Application::as_returning()).get_result(conn)?;
    debug!("application {}: {} -> {}", gid, current.status, application.status);
    Ok(application)
}

pub fn delete(conn: &mut PgConnection, gid: i32) -> Result<(), ApiError> {
    let num_deleted = diesel::delete(applications.filter(id.eq(gid))).execute(conn)?;
    if num_deleted == 0 {
        return Err(not_found());
    }
    debug!("num_deleted: {}", num_deleted);
    Ok(())
}
