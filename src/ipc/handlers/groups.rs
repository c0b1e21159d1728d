use crate::db;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::model::Group;
use serde_json::json;

fn handle_groups_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let map = match db::load_group_map(conn) {
        Ok(v) => v,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };
    let mut groups: Vec<&Group> = map.values().collect();
    groups.sort_by(|a, b| a.meet_id.cmp(&b.meet_id));
    ok(&req.id, json!({ "groups": groups }))
}

fn handle_groups_set(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let Some(meet_id) = req.params.get("meetId").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing meetId", None);
    };
    let Some(name) = req.params.get("name").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing name", None);
    };
    let group = Group::new(meet_id, name.trim());
    match db::set_group(conn, &group) {
        Ok(()) => ok(&req.id, json!({ "group": group })),
        Err(e) => err(&req.id, "db_update_failed", e.to_string(), None),
    }
}

fn handle_groups_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let Some(meet_id) = req.params.get("meetId").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing meetId", None);
    };
    match db::delete_group(conn, meet_id) {
        Ok(true) => ok(&req.id, json!({ "deleted": true })),
        Ok(false) => err(&req.id, "not_found", "no group for meetId", None),
        Err(e) => err(&req.id, "db_update_failed", e.to_string(), None),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "groups.list" => Some(handle_groups_list(state, req)),
        "groups.set" => Some(handle_groups_set(state, req)),
        "groups.delete" => Some(handle_groups_delete(state, req)),
        _ => None,
    }
}
