use serde::{Deserialize, Serialize};

/// One attendee's aggregated presence within one recorded call.
/// `name` is the normalized dedup key; `original_name` is the first spelling
/// seen in the source CSV. `duration` is whole seconds summed across all raw
/// rows that mapped to the same normalized name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub id: String,
    pub name: String,
    pub original_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub join_time: Option<String>,
    pub duration: i64,
}

/// One recorded call occurrence. `meet_id` is the stable room code shared by
/// every session of a recurring meeting; `id` is unique per upload.
/// Participant order is the CSV order and is preserved through storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meet {
    pub id: String,
    pub meet_id: String,
    pub date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    pub filename: String,
    pub uploaded_at: String,
    pub participants: Vec<Participant>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Teacher,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Teacher => "teacher",
        }
    }

    pub fn from_str(s: &str) -> Role {
        if s.eq_ignore_ascii_case("teacher") {
            Role::Teacher
        } else {
            Role::Student
        }
    }
}

/// A roster entry. `aliases` holds alternate spellings that resolve to the
/// same identity during analytics lookups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: String,
    pub name: String,
    pub group_name: String,
    pub role: Role,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub hidden: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Maps a recurring meet code to a cohort. `course` is the first digit found
/// in the group name, when one exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub meet_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course: Option<i64>,
}

impl Group {
    pub fn new(meet_id: impl Into<String>, name: impl Into<String>) -> Group {
        let name = name.into();
        let course = infer_course(&name);
        Group {
            meet_id: meet_id.into(),
            name,
            course,
        }
    }
}

pub fn infer_course(group_name: &str) -> Option<i64> {
    group_name
        .chars()
        .find(|c| c.is_ascii_digit())
        .and_then(|c| c.to_digit(10))
        .map(|d| d as i64)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub name: String,
    pub date: String,
    pub group_name: String,
    pub max_points: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mark {
    pub id: String,
    pub task_id: String,
    pub student_id: String,
    pub score: f64,
    pub created_at: String,
    pub synced: bool,
}
