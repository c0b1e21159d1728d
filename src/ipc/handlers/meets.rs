use crate::db;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn handle_meets_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let meets = match db::load_all_meets(conn) {
        Ok(v) => v,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };
    let meets_json: Vec<serde_json::Value> = meets
        .iter()
        .map(|m| {
            json!({
                "id": m.id,
                "meetId": m.meet_id,
                "date": m.date,
                "startTime": m.start_time,
                "endTime": m.end_time,
                "filename": m.filename,
                "uploadedAt": m.uploaded_at,
                "participantCount": m.participants.len(),
            })
        })
        .collect();
    ok(&req.id, json!({ "meets": meets_json }))
}

fn handle_meet_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let Some(id) = req.params.get("meetDbId").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing meetDbId", None);
    };
    match db::load_meet_by_id(conn, id) {
        Ok(Some(meet)) => ok(&req.id, json!({ "meet": meet })),
        Ok(None) => err(&req.id, "not_found", "session not found", None),
        Err(e) => err(&req.id, "db_query_failed", e.to_string(), None),
    }
}

fn handle_meet_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let Some(id) = req.params.get("meetDbId").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing meetDbId", None);
    };
    match db::delete_meet(conn, id) {
        Ok(true) => ok(&req.id, json!({ "deleted": true })),
        Ok(false) => err(&req.id, "not_found", "session not found", None),
        Err(e) => err(&req.id, "db_update_failed", e.to_string(), None),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "meets.list" => Some(handle_meets_list(state, req)),
        "meets.get" => Some(handle_meet_get(state, req)),
        "meets.delete" => Some(handle_meet_delete(state, req)),
        _ => None,
    }
}
