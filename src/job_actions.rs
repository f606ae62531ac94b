use crate::error::ApiError;
use crate::model::*;
use crate::schema::jobs;
use crate::schema::jobs::dsl::*;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};

fn not_found() -> ApiError {
    ApiError::NotFound("Job not found".to_string())
}

pub fn find_all(conn: &mut PgConnection) -> Result<Vec<Job>, ApiError> {
    let select_statement = jobs.order(id.asc()).select(Job::as_select());
    Ok(select_statement.load(conn)?)
}

pub fn find_by_id(conn: &mut PgConnection, gid: i32) -> Result<Job, ApiError> {
    let job = jobs.filter(id.eq(gid)).select(Job::as_select());
    job.first(conn).optional()?.ok_or_else(not_found)
}

/// Takes a `FOR KEY SHARE` lock so the job cannot be deleted before the enclosing transaction ends.
pub fn lock_reference(conn: &mut PgConnection, gid: i32) -> Result<bool, ApiError> {
    let locked = jobs.filter(id.eq(gid)).select(id).for_key_share();
    Ok(locked.get_result::<i32>(conn).optional()?.is_some())
}

pub fn insert(conn: &mut PgConnection, new_job: &NewJob) -> Result<Job, ApiError> {
    let insert = diesel::insert_into(jobs::table).values(new_job);
    let job: Job = insert.returning(Job::as_returning()).get_result(conn)?;
    debug!("inserted job: {}", job.id);
    Ok(job)
}

pub fn update(conn: &mut PgConnection, gid: i32, payload: JobPayload) -> Result<Job, ApiError> {
    let locked = jobs.filter(id.eq(gid)).select(Job::as_select()).for_update();
    let current: Job = locked.get_result(conn).optional()?.ok_or_else(not_found)?;
    let changes = JobChanges::new(payload, touch(current.updated_at));
    let statement = diesel::update(jobs::table.filter(id.eq(gid))).set(&changes);
    Ok(statement.returning(Job::as_returning()).get_result(conn)?)
}

/// Deletion is restricted: a job that still has applications is kept and the call fails with `Conflict`.
pub fn delete(conn: &mut PgConnection, gid: i32) -> Result<(), ApiError> {
    let statement = diesel::delete(jobs.filter(id.eq(gid)));
    match statement.execute(conn) {
        Ok(0) => Err(not_found()),
        Ok(num_deleted) => {
            debug!("num_deleted: {}", num_deleted);
            Ok(())
        }
        Err(DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _)) => Err(ApiError::Conflict("Job still has applications".to_string())),
        Err(e) => Err(e.into()),
    }
}
