use std::collections::HashMap;

use rusqlite::Connection;

use crate::db;
use crate::model::{Group, Meet, Member};

/// Read side of the persistence seam the analytics engine runs against.
/// Analytics never mutates through this; writes go through `db` directly
/// from the import handlers.
pub trait Repository {
    fn all_meets(&self) -> anyhow::Result<Vec<Meet>>;
    fn meets_by_meet_id(&self, meet_id: &str) -> anyhow::Result<Vec<Meet>>;
    fn meet_by_id(&self, id: &str) -> anyhow::Result<Option<Meet>>;
    fn ignored_users(&self) -> anyhow::Result<Vec<String>>;
    fn teachers(&self) -> anyhow::Result<Vec<Member>>;
    fn group_map(&self) -> anyhow::Result<HashMap<String, Group>>;
    fn members(&self) -> anyhow::Result<Vec<Member>>;
}

pub struct SqliteRepo<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteRepo<'a> {
    pub fn new(conn: &'a Connection) -> SqliteRepo<'a> {
        SqliteRepo { conn }
    }
}

impl Repository for SqliteRepo<'_> {
    fn all_meets(&self) -> anyhow::Result<Vec<Meet>> {
        db::load_all_meets(self.conn)
    }

    fn meets_by_meet_id(&self, meet_id: &str) -> anyhow::Result<Vec<Meet>> {
        db::load_meets_by_meet_id(self.conn, meet_id)
    }

    fn meet_by_id(&self, id: &str) -> anyhow::Result<Option<Meet>> {
        db::load_meet_by_id(self.conn, id)
    }

    fn ignored_users(&self) -> anyhow::Result<Vec<String>> {
        db::load_ignored_users(self.conn)
    }

    fn teachers(&self) -> anyhow::Result<Vec<Member>> {
        db::load_teachers(self.conn)
    }

    fn group_map(&self) -> anyhow::Result<HashMap<String, Group>> {
        db::load_group_map(self.conn)
    }

    fn members(&self) -> anyhow::Result<Vec<Member>> {
        db::load_members(self.conn)
    }
}
