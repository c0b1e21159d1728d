use crate::db;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::model::{Member, Role};
use serde_json::json;
use uuid::Uuid;

fn handle_members_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    match db::load_members(conn) {
        Ok(members) => ok(&req.id, json!({ "members": members })),
        Err(e) => err(&req.id, "db_query_failed", e.to_string(), None),
    }
}

fn handle_members_upsert(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let Some(name) = req.params.get("name").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing name", None);
    };
    let Some(group_name) = req.params.get("groupName").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing groupName", None);
    };
    let member = Member {
        id: req
            .params
            .get("id")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .unwrap_or_else(|| Uuid::new_v4().to_string()),
        name: name.to_string(),
        group_name: group_name.to_string(),
        role: req
            .params
            .get("role")
            .and_then(|v| v.as_str())
            .map(Role::from_str)
            .unwrap_or(Role::Student),
        aliases: req
            .params
            .get("aliases")
            .and_then(|v| v.as_array())
            .map(|arr| {
                arr.iter()
                    .filter_map(|v| v.as_str().map(|s| s.to_string()))
                    .collect()
            })
            .unwrap_or_default(),
        hidden: req
            .params
            .get("hidden")
            .and_then(|v| v.as_bool())
            .unwrap_or(false),
        email: req
            .params
            .get("email")
            .and_then(|v| v.as_str())
            .filter(|s| !s.trim().is_empty())
            .map(|s| s.to_string()),
    };
    match db::upsert_member(conn, &member) {
        Ok(()) => ok(&req.id, json!({ "member": member })),
        Err(e) => err(&req.id, "db_update_failed", e.to_string(), None),
    }
}

fn handle_members_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let Some(id) = req.params.get("id").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing id", None);
    };
    match db::delete_member(conn, id) {
        Ok(true) => ok(&req.id, json!({ "deleted": true })),
        Ok(false) => err(&req.id, "not_found", "member not found", None),
        Err(e) => err(&req.id, "db_update_failed", e.to_string(), None),
    }
}

fn handle_ignored_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    match db::load_ignored_users(conn) {
        Ok(names) => ok(&req.id, json!({ "ignored": names })),
        Err(e) => err(&req.id, "db_query_failed", e.to_string(), None),
    }
}

fn handle_ignored_add(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let Some(name) = req.params.get("name").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing name", None);
    };
    match db::add_ignored_user(conn, name.trim()) {
        Ok(()) => ok(&req.id, json!({ "ok": true })),
        Err(e) => err(&req.id, "db_update_failed", e.to_string(), None),
    }
}

fn handle_ignored_remove(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let Some(name) = req.params.get("name").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing name", None);
    };
    match db::remove_ignored_user(conn, name.trim()) {
        Ok(true) => ok(&req.id, json!({ "ok": true })),
        Ok(false) => err(&req.id, "not_found", "name not in ignored list", None),
        Err(e) => err(&req.id, "db_update_failed", e.to_string(), None),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "members.list" => Some(handle_members_list(state, req)),
        "members.upsert" => Some(handle_members_upsert(state, req)),
        "members.delete" => Some(handle_members_delete(state, req)),
        "ignored.list" => Some(handle_ignored_list(state, req)),
        "ignored.add" => Some(handle_ignored_add(state, req)),
        "ignored.remove" => Some(handle_ignored_remove(state, req)),
        _ => None,
    }
}
