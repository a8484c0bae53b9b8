//! Plan management, grounded on `audit_plan_service`. Pure CRUD against
//! `audit_plans` — no collaborator touches this path.

use aud_db::plans::{self, NewPlan, PlanPatch};
use aud_schemas::Plan;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AuditError;

pub async fn list_plans(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<Plan>, AuditError> {
    plans::list_plans(pool, limit, offset).await.map_err(|e| AuditError::StateConflict(e.to_string()))
}

pub async fn get_plan(pool: &PgPool, plan_id: Uuid) -> Result<Plan, AuditError> {
    plans::get_plan(pool, plan_id)
        .await
        .map_err(|e| AuditError::StateConflict(e.to_string()))?
        .ok_or_else(|| AuditError::not_found("plan_not_found"))
}

pub async fn create_plan(pool: &PgPool, new: NewPlan) -> Result<Plan, AuditError> {
    plans::create_plan(pool, &new).await.map_err(|e| AuditError::StateConflict(e.to_string()))
}

pub async fn update_plan(pool: &PgPool, plan_id: Uuid, patch: PlanPatch) -> Result<Plan, AuditError> {
    plans::update_plan(pool, plan_id, &patch)
        .await
        .map_err(|e| AuditError::StateConflict(e.to_string()))?
        .ok_or_else(|| AuditError::not_found("plan_not_found"))
}
