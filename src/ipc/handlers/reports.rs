use crate::attendance::{self, AttendanceError};
use crate::db;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use serde_json::json;
use std::path::PathBuf;

fn handle_report_import(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let Some(path) = req.params.get("path").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing params.path", None);
    };

    let meet = match attendance::read_attendance_csv(&PathBuf::from(path)) {
        Ok(m) => m,
        Err(AttendanceError::Read(e)) => {
            return err(
                &req.id,
                "file_read_failed",
                e.to_string(),
                Some(json!({ "path": path })),
            )
        }
        Err(AttendanceError::InvalidFormat(msg)) => {
            return err(
                &req.id,
                "invalid_attendance_format",
                msg,
                Some(json!({ "path": path })),
            )
        }
    };

    if let Err(e) = db::save_meet(conn, &meet) {
        return err(&req.id, "db_insert_failed", e.to_string(), None);
    }

    ok(
        &req.id,
        json!({
            "meetDbId": meet.id,
            "meetId": meet.meet_id,
            "date": meet.date,
            "startTime": meet.start_time,
            "endTime": meet.end_time,
            "participantCount": meet.participants.len(),
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "reports.importCsv" => Some(handle_report_import(state, req)),
        _ => None,
    }
}
