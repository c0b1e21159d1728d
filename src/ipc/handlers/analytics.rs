use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::repo::SqliteRepo;
use crate::stats::{self, StatsError};
use rusqlite::Connection;
use serde_json::json;

fn db_conn<'a>(state: &'a AppState, req: &Request) -> Result<&'a Connection, serde_json::Value> {
    state
        .db
        .as_ref()
        .ok_or_else(|| err(&req.id, "no_workspace", "select a workspace first", None))
}

fn handle_global(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match db_conn(state, req) {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    let repo = SqliteRepo::new(conn);
    match stats::global_stats(&repo, None) {
        Ok(meetings) => ok(&req.id, json!({ "meetings": meetings })),
        Err(e) => err(&req.id, "db_query_failed", e.to_string(), None),
    }
}

fn handle_detailed(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match db_conn(state, req) {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    let Some(meet_id) = req.params.get("meetId").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing meetId", None);
    };
    let teacher_name = req.params.get("teacherName").and_then(|v| v.as_str());
    let repo = SqliteRepo::new(conn);
    match stats::detailed_stats(&repo, meet_id, teacher_name) {
        Ok(detailed) => ok(&req.id, json!(detailed)),
        Err(e) => err(&req.id, "db_query_failed", e.to_string(), None),
    }
}

fn handle_single_report(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match db_conn(state, req) {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    let Some(session_id) = req.params.get("meetDbId").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing meetDbId", None);
    };
    let repo = SqliteRepo::new(conn);
    match stats::single_report_stats(&repo, session_id) {
        Ok(report) => ok(&req.id, json!(report)),
        Err(StatsError::NotFound(_)) => err(
            &req.id,
            "not_found",
            format!("session not found: {}", session_id),
            None,
        ),
        Err(StatsError::Repo(e)) => err(&req.id, "db_query_failed", e.to_string(), None),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "analytics.global" => Some(handle_global(state, req)),
        "analytics.detailed" => Some(handle_detailed(state, req)),
        "analytics.singleReport" => Some(handle_single_report(state, req)),
        _ => None,
    }
}
