use crate::error::ApiError;
use crate::model::*;
use crate::schema::candidates;
use crate::schema::candidates::dsl::*;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};

pub fn find_all(conn: &mut PgConnection) -> Result<Vec<Candidate>, ApiError> {
    let select_statement = candidates.order(id.asc()).select(Candidate::as_select());
    Ok(select_statement.load(conn)?)
}

pub fn find_by_id(conn: &mut PgConnection, gid: i32) -> Result<Candidate, ApiError> {
    let candidate = candidates.filter(id.eq(gid)).select(Candidate::as_select());
    candidate.first(conn).optional()?.ok_or_else(|| ApiError::NotFound("Candidate not found".to_string()))
}

/// Takes a `FOR KEY SHARE` lock so the candidate cannot be deleted before the enclosing transaction ends.
pub fn lock_reference(conn: &mut PgConnection, gid: i32) -> Result<bool, ApiError> {
    let locked = candidates.filter(id.eq(gid)).select(id).for_key_share();
    Ok(locked.get_result::<i32>(conn).optional()?.is_some())
}

/// Emails are unique across candidates; a duplicate is a `Conflict` and leaves the existing row untouched.
pub fn insert(conn: &mut PgConnection, new_candidate: &NewCandidate) -> Result<Candidate, ApiError> {
    let insert = diesel::insert_into(candidates::table).values(new_candidate);
    match insert.returning(Candidate::as_returning()).get_result::<Candidate>(conn) {
        Ok(candidate) => {
            debug!("inserted candidate: {}", candidate.id);
            Ok(candidate)
        }
        Err(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
            Err(ApiError::Conflict(format!("Candidate with email {} already exists", new_candidate.email)))
        }
        Err(e) => Err(e.into()),
    }
}
