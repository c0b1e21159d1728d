use crate::db;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::marks::{self, MarksError, MarksSheet};
use crate::model::{Mark, Member, Role, Task};
use chrono::{SecondsFormat, Utc};
use rusqlite::Connection;
use serde_json::json;
use std::collections::HashMap;
use std::path::PathBuf;

struct HandlerErr {
    code: &'static str,
    message: String,
    details: Option<serde_json::Value>,
}

impl HandlerErr {
    fn response(self, id: &str) -> serde_json::Value {
        err(id, self.code, self.message, self.details)
    }
}

fn marks_error(path: &str, e: MarksError) -> HandlerErr {
    match e {
        MarksError::Read(e) => HandlerErr {
            code: "file_read_failed",
            message: e.to_string(),
            details: Some(json!({ "path": path })),
        },
        MarksError::InvalidFormat(msg) => HandlerErr {
            code: "invalid_marks_format",
            message: msg,
            details: Some(json!({ "path": path })),
        },
    }
}

fn db_err(e: anyhow::Error) -> HandlerErr {
    HandlerErr {
        code: "db_update_failed",
        message: e.to_string(),
        details: None,
    }
}

struct ImportCounts {
    tasks: usize,
    students_created: usize,
    marks: usize,
}

/// Persists a parsed sheet: tasks upsert by (group, name, date), students
/// resolve against the roster by name or alias and are created in the
/// sheet's group when unknown, and non-empty cells become marks.
fn persist_sheet(conn: &Connection, sheet: &MarksSheet) -> Result<ImportCounts, HandlerErr> {
    let members = db::load_members(conn).map_err(db_err)?;
    let mut by_name: HashMap<String, String> = HashMap::new();
    for m in &members {
        by_name.entry(m.name.clone()).or_insert_with(|| m.id.clone());
        for a in &m.aliases {
            by_name.entry(a.clone()).or_insert_with(|| m.id.clone());
        }
    }

    let tx = conn.unchecked_transaction().map_err(|e| HandlerErr {
        code: "db_tx_failed",
        message: e.to_string(),
        details: None,
    })?;

    let mut task_ids: Vec<String> = Vec::with_capacity(sheet.tasks.len());
    for t in &sheet.tasks {
        let task = Task {
            id: uuid::Uuid::new_v4().to_string(),
            name: t.name.clone(),
            date: t.date.clone(),
            group_name: sheet.group_name.clone(),
            max_points: t.max_points,
            group_id: None,
        };
        task_ids.push(db::upsert_task(&tx, &task).map_err(db_err)?);
    }

    let created_at = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
    let mut students_created = 0usize;
    let mut marks_count = 0usize;
    for student in &sheet.students {
        let student_id = match by_name.get(&student.name) {
            Some(id) => id.clone(),
            None => {
                let member = Member {
                    id: uuid::Uuid::new_v4().to_string(),
                    name: student.name.clone(),
                    group_name: sheet.group_name.clone(),
                    role: Role::Student,
                    aliases: Vec::new(),
                    hidden: false,
                    email: if student.email.is_empty() {
                        None
                    } else {
                        Some(student.email.clone())
                    },
                };
                db::upsert_member(&tx, &member).map_err(db_err)?;
                by_name.insert(member.name.clone(), member.id.clone());
                students_created += 1;
                member.id
            }
        };

        for m in &student.marks {
            let Some(task_id) = task_ids.get(m.task_index) else {
                continue;
            };
            let mark = Mark {
                id: uuid::Uuid::new_v4().to_string(),
                task_id: task_id.clone(),
                student_id: student_id.clone(),
                score: m.score,
                created_at: created_at.clone(),
                synced: m.synced,
            };
            db::upsert_mark(&tx, &mark).map_err(db_err)?;
            marks_count += 1;
        }
    }

    tx.commit().map_err(|e| HandlerErr {
        code: "db_commit_failed",
        message: e.to_string(),
        details: None,
    })?;

    Ok(ImportCounts {
        tasks: task_ids.len(),
        students_created,
        marks: marks_count,
    })
}

fn handle_validate(state: &mut AppState, req: &Request) -> serde_json::Value {
    if state.db.is_none() {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    }
    let Some(path) = req.params.get("path").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing params.path", None);
    };
    let bytes = match std::fs::read(PathBuf::from(path)) {
        Ok(b) => b,
        Err(e) => {
            return err(
                &req.id,
                "file_read_failed",
                e.to_string(),
                Some(json!({ "path": path })),
            )
        }
    };
    let text = String::from_utf8_lossy(&bytes);
    match marks::validate_marks_csv(&text) {
        Ok(()) => ok(&req.id, json!({ "valid": true })),
        Err(e) => marks_error(path, e).response(&req.id),
    }
}

fn handle_import(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let Some(path) = req.params.get("path").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing params.path", None);
    };

    let sheet = match marks::read_marks_csv(&PathBuf::from(path)) {
        Ok(s) => s,
        Err(e) => return marks_error(path, e).response(&req.id),
    };

    match persist_sheet(conn, &sheet) {
        Ok(counts) => ok(
            &req.id,
            json!({
                "groupName": sheet.group_name,
                "tasksImported": counts.tasks,
                "studentsCreated": counts.students_created,
                "marksImported": counts.marks,
            }),
        ),
        Err(e) => e.response(&req.id),
    }
}

fn handle_grid(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let Some(group_name) = req.params.get("groupName").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing groupName", None);
    };
    let tasks = match db::load_tasks_by_group(conn, group_name) {
        Ok(v) => v,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };
    let mut tasks_json: Vec<serde_json::Value> = Vec::with_capacity(tasks.len());
    for t in &tasks {
        let marks = match db::load_marks_by_task(conn, &t.id) {
            Ok(v) => v,
            Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
        };
        tasks_json.push(json!({
            "task": t,
            "marks": marks,
        }));
    }
    ok(&req.id, json!({ "groupName": group_name, "tasks": tasks_json }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "marksheets.validate" => Some(handle_validate(state, req)),
        "marksheets.importCsv" => Some(handle_import(state, req)),
        "marksheets.grid" => Some(handle_grid(state, req)),
        _ => None,
    }
}
