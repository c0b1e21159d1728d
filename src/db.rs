use rusqlite::{Connection, OptionalExtension};
use std::collections::HashMap;
use std::path::Path;

use crate::model::{Group, Mark, Meet, Member, Participant, Role, Task};

pub const DB_FILENAME: &str = "meetbook.sqlite3";

pub fn open_db(workspace: &Path) -> anyhow::Result<Connection> {
    std::fs::create_dir_all(workspace)?;
    let db_path = workspace.join(DB_FILENAME);
    let conn = Connection::open(db_path)?;
    conn.execute("PRAGMA foreign_keys = ON", [])?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS meets(
            id TEXT PRIMARY KEY,
            meet_id TEXT NOT NULL,
            date TEXT NOT NULL,
            start_time TEXT,
            end_time TEXT,
            filename TEXT NOT NULL,
            uploaded_at TEXT NOT NULL
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_meets_meet_id ON meets(meet_id)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_meets_date ON meets(date)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS participants(
            id TEXT PRIMARY KEY,
            meet_db_id TEXT NOT NULL,
            name TEXT NOT NULL,
            original_name TEXT NOT NULL,
            email TEXT,
            join_time TEXT,
            duration INTEGER NOT NULL,
            sort_order INTEGER NOT NULL,
            FOREIGN KEY(meet_db_id) REFERENCES meets(id)
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_participants_meet ON participants(meet_db_id)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_participants_meet_sort ON participants(meet_db_id, sort_order)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS members(
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            group_name TEXT NOT NULL,
            role TEXT NOT NULL,
            aliases TEXT NOT NULL,
            hidden INTEGER NOT NULL DEFAULT 0
        )",
        [],
    )?;
    // Early workspaces predate the email column. Add it when absent.
    ensure_members_email(&conn)?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_members_group ON members(group_name)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_members_role ON members(role)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS groups(
            meet_id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            course INTEGER
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS tasks(
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            date TEXT NOT NULL,
            group_name TEXT NOT NULL,
            max_points REAL NOT NULL,
            group_id TEXT,
            UNIQUE(group_name, name, date)
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_tasks_group ON tasks(group_name)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS marks(
            id TEXT PRIMARY KEY,
            task_id TEXT NOT NULL,
            student_id TEXT NOT NULL,
            score REAL NOT NULL,
            created_at TEXT NOT NULL,
            synced INTEGER NOT NULL DEFAULT 0,
            FOREIGN KEY(task_id) REFERENCES tasks(id),
            FOREIGN KEY(student_id) REFERENCES members(id),
            UNIQUE(task_id, student_id)
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_marks_task ON marks(task_id)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_marks_student ON marks(student_id)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS ignored_users(
            name TEXT PRIMARY KEY
        )",
        [],
    )?;

    Ok(conn)
}

fn ensure_members_email(conn: &Connection) -> anyhow::Result<()> {
    if table_has_column(conn, "members", "email")? {
        return Ok(());
    }
    conn.execute("ALTER TABLE members ADD COLUMN email TEXT", [])?;
    Ok(())
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> anyhow::Result<bool> {
    let sql = format!("PRAGMA table_info({})", table);
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let name: String = row.get(1)?;
        if name == column {
            return Ok(true);
        }
    }
    Ok(false)
}

pub fn save_meet(conn: &Connection, meet: &Meet) -> anyhow::Result<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "INSERT INTO meets(id, meet_id, date, start_time, end_time, filename, uploaded_at)
         VALUES(?, ?, ?, ?, ?, ?, ?)",
        (
            &meet.id,
            &meet.meet_id,
            &meet.date,
            &meet.start_time,
            &meet.end_time,
            &meet.filename,
            &meet.uploaded_at,
        ),
    )?;
    for (i, p) in meet.participants.iter().enumerate() {
        tx.execute(
            "INSERT INTO participants(id, meet_db_id, name, original_name, email, join_time, duration, sort_order)
             VALUES(?, ?, ?, ?, ?, ?, ?, ?)",
            (
                &p.id,
                &meet.id,
                &p.name,
                &p.original_name,
                &p.email,
                &p.join_time,
                p.duration,
                i as i64,
            ),
        )?;
    }
    tx.commit()?;
    Ok(())
}

fn load_participants(conn: &Connection, meet_db_id: &str) -> anyhow::Result<Vec<Participant>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, original_name, email, join_time, duration
         FROM participants
         WHERE meet_db_id = ?
         ORDER BY sort_order",
    )?;
    let rows = stmt
        .query_map([meet_db_id], |r| {
            Ok(Participant {
                id: r.get(0)?,
                name: r.get(1)?,
                original_name: r.get(2)?,
                email: r.get(3)?,
                join_time: r.get(4)?,
                duration: r.get(5)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

const MEET_COLUMNS: &str = "id, meet_id, date, start_time, end_time, filename, uploaded_at";

fn meet_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Meet> {
    Ok(Meet {
        id: row.get(0)?,
        meet_id: row.get(1)?,
        date: row.get(2)?,
        start_time: row.get(3)?,
        end_time: row.get(4)?,
        filename: row.get(5)?,
        uploaded_at: row.get(6)?,
        participants: Vec::new(),
    })
}

pub fn load_all_meets(conn: &Connection) -> anyhow::Result<Vec<Meet>> {
    let sql = format!("SELECT {} FROM meets ORDER BY date, uploaded_at", MEET_COLUMNS);
    let mut stmt = conn.prepare(&sql)?;
    let mut meets = stmt
        .query_map([], meet_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    for m in &mut meets {
        m.participants = load_participants(conn, &m.id)?;
    }
    Ok(meets)
}

pub fn load_meets_by_meet_id(conn: &Connection, meet_id: &str) -> anyhow::Result<Vec<Meet>> {
    let sql = format!(
        "SELECT {} FROM meets WHERE meet_id = ? ORDER BY date, uploaded_at",
        MEET_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let mut meets = stmt
        .query_map([meet_id], meet_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    for m in &mut meets {
        m.participants = load_participants(conn, &m.id)?;
    }
    Ok(meets)
}

pub fn load_meet_by_id(conn: &Connection, id: &str) -> anyhow::Result<Option<Meet>> {
    let sql = format!("SELECT {} FROM meets WHERE id = ?", MEET_COLUMNS);
    let mut stmt = conn.prepare(&sql)?;
    let meet = stmt.query_row([id], meet_from_row).optional()?;
    match meet {
        Some(mut m) => {
            m.participants = load_participants(conn, &m.id)?;
            Ok(Some(m))
        }
        None => Ok(None),
    }
}

pub fn delete_meet(conn: &Connection, id: &str) -> anyhow::Result<bool> {
    let tx = conn.unchecked_transaction()?;
    tx.execute("DELETE FROM participants WHERE meet_db_id = ?", [id])?;
    let n = tx.execute("DELETE FROM meets WHERE id = ?", [id])?;
    tx.commit()?;
    Ok(n > 0)
}

const MEMBER_COLUMNS: &str = "id, name, group_name, role, aliases, hidden, email";

fn member_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Member> {
    let role: String = row.get(3)?;
    let aliases_json: String = row.get(4)?;
    Ok(Member {
        id: row.get(0)?,
        name: row.get(1)?,
        group_name: row.get(2)?,
        role: Role::from_str(&role),
        aliases: serde_json::from_str(&aliases_json).unwrap_or_default(),
        hidden: row.get::<_, i64>(5)? != 0,
        email: row.get(6)?,
    })
}

pub fn load_members(conn: &Connection) -> anyhow::Result<Vec<Member>> {
    let sql = format!(
        "SELECT {} FROM members ORDER BY group_name, name",
        MEMBER_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let members = stmt
        .query_map([], member_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(members)
}

pub fn load_teachers(conn: &Connection) -> anyhow::Result<Vec<Member>> {
    let sql = format!(
        "SELECT {} FROM members WHERE role = 'teacher' ORDER BY name",
        MEMBER_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let members = stmt
        .query_map([], member_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(members)
}

pub fn upsert_member(conn: &Connection, member: &Member) -> anyhow::Result<()> {
    let aliases = serde_json::to_string(&member.aliases)?;
    conn.execute(
        "INSERT INTO members(id, name, group_name, role, aliases, hidden, email)
         VALUES(?, ?, ?, ?, ?, ?, ?)
         ON CONFLICT(id) DO UPDATE SET
           name = excluded.name,
           group_name = excluded.group_name,
           role = excluded.role,
           aliases = excluded.aliases,
           hidden = excluded.hidden,
           email = excluded.email",
        (
            &member.id,
            &member.name,
            &member.group_name,
            member.role.as_str(),
            &aliases,
            member.hidden as i64,
            &member.email,
        ),
    )?;
    Ok(())
}

pub fn delete_member(conn: &Connection, id: &str) -> anyhow::Result<bool> {
    let tx = conn.unchecked_transaction()?;
    tx.execute("DELETE FROM marks WHERE student_id = ?", [id])?;
    let n = tx.execute("DELETE FROM members WHERE id = ?", [id])?;
    tx.commit()?;
    Ok(n > 0)
}

pub fn load_ignored_users(conn: &Connection) -> anyhow::Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT name FROM ignored_users ORDER BY name")?;
    let names = stmt
        .query_map([], |r| r.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(names)
}

pub fn add_ignored_user(conn: &Connection, name: &str) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO ignored_users(name) VALUES(?) ON CONFLICT(name) DO NOTHING",
        [name],
    )?;
    Ok(())
}

pub fn remove_ignored_user(conn: &Connection, name: &str) -> anyhow::Result<bool> {
    let n = conn.execute("DELETE FROM ignored_users WHERE name = ?", [name])?;
    Ok(n > 0)
}

pub fn set_group(conn: &Connection, group: &Group) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO groups(meet_id, name, course)
         VALUES(?, ?, ?)
         ON CONFLICT(meet_id) DO UPDATE SET
           name = excluded.name,
           course = excluded.course",
        (&group.meet_id, &group.name, group.course),
    )?;
    Ok(())
}

pub fn delete_group(conn: &Connection, meet_id: &str) -> anyhow::Result<bool> {
    let n = conn.execute("DELETE FROM groups WHERE meet_id = ?", [meet_id])?;
    Ok(n > 0)
}

pub fn load_group_map(conn: &Connection) -> anyhow::Result<HashMap<String, Group>> {
    let mut stmt = conn.prepare("SELECT meet_id, name, course FROM groups")?;
    let rows = stmt.query_map([], |r| {
        Ok(Group {
            meet_id: r.get(0)?,
            name: r.get(1)?,
            course: r.get(2)?,
        })
    })?;
    let mut out = HashMap::new();
    for g in rows {
        let g = g?;
        out.insert(g.meet_id.clone(), g);
    }
    Ok(out)
}

/// Upserts by the sheet-visible identity (group, name, date); returns the
/// task's storage id either way.
pub fn upsert_task(conn: &Connection, task: &Task) -> anyhow::Result<String> {
    let existing: Option<String> = conn
        .query_row(
            "SELECT id FROM tasks WHERE group_name = ? AND name = ? AND date = ?",
            (&task.group_name, &task.name, &task.date),
            |r| r.get(0),
        )
        .optional()?;
    if let Some(id) = existing {
        conn.execute(
            "UPDATE tasks SET max_points = ?, group_id = ? WHERE id = ?",
            (task.max_points, &task.group_id, &id),
        )?;
        return Ok(id);
    }
    conn.execute(
        "INSERT INTO tasks(id, name, date, group_name, max_points, group_id)
         VALUES(?, ?, ?, ?, ?, ?)",
        (
            &task.id,
            &task.name,
            &task.date,
            &task.group_name,
            task.max_points,
            &task.group_id,
        ),
    )?;
    Ok(task.id.clone())
}

pub fn load_tasks_by_group(conn: &Connection, group_name: &str) -> anyhow::Result<Vec<Task>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, date, group_name, max_points, group_id
         FROM tasks
         WHERE group_name = ?
         ORDER BY date, name",
    )?;
    let tasks = stmt
        .query_map([group_name], |r| {
            Ok(Task {
                id: r.get(0)?,
                name: r.get(1)?,
                date: r.get(2)?,
                group_name: r.get(3)?,
                max_points: r.get(4)?,
                group_id: r.get(5)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(tasks)
}

pub fn upsert_mark(conn: &Connection, mark: &Mark) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO marks(id, task_id, student_id, score, created_at, synced)
         VALUES(?, ?, ?, ?, ?, ?)
         ON CONFLICT(task_id, student_id) DO UPDATE SET
           score = excluded.score,
           synced = excluded.synced",
        (
            &mark.id,
            &mark.task_id,
            &mark.student_id,
            mark.score,
            &mark.created_at,
            mark.synced as i64,
        ),
    )?;
    Ok(())
}

pub fn load_marks_by_task(conn: &Connection, task_id: &str) -> anyhow::Result<Vec<Mark>> {
    let mut stmt = conn.prepare(
        "SELECT id, task_id, student_id, score, created_at, synced
         FROM marks
         WHERE task_id = ?",
    )?;
    let marks = stmt
        .query_map([task_id], |r| {
            Ok(Mark {
                id: r.get(0)?,
                task_id: r.get(1)?,
                student_id: r.get(2)?,
                score: r.get(3)?,
                created_at: r.get(4)?,
                synced: r.get::<_, i64>(5)? != 0,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(marks)
}
