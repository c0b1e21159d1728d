use std::path::Path;

use crate::csvline::split_record;

#[derive(Debug)]
pub enum MarksError {
    Read(std::io::Error),
    InvalidFormat(String),
}

impl std::fmt::Display for MarksError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MarksError::Read(e) => write!(f, "failed to read marks file: {}", e),
            MarksError::InvalidFormat(msg) => f.write_str(msg),
        }
    }
}

impl std::error::Error for MarksError {}

#[derive(Debug, Clone, PartialEq)]
pub struct SheetTask {
    pub name: String,
    pub date: String,
    pub max_points: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SheetMark {
    // 0-based position among the sheet's task columns.
    pub task_index: usize,
    pub score: f64,
    pub synced: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SheetStudent {
    pub name: String,
    pub email: String,
    pub marks: Vec<SheetMark>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarksSheet {
    pub group_name: String,
    pub tasks: Vec<SheetTask>,
    pub students: Vec<SheetStudent>,
}

const SURNAME_HEADERS: &[&str] = &["surname", "last name", "прізвище"];

// Columns 0..2 are surname, first name, email; tasks start here.
const TASKS_FROM: usize = 3;

pub fn read_marks_csv(path: &Path) -> Result<MarksSheet, MarksError> {
    let bytes = std::fs::read(path).map_err(MarksError::Read)?;
    let text = String::from_utf8_lossy(&bytes);
    let filename = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("marks.csv");
    parse_marks_csv(filename, &text)
}

/// Structural validation only; `parse_marks_csv` runs it before extracting.
pub fn validate_marks_csv(text: &str) -> Result<(), MarksError> {
    let lines = non_empty_lines(text);
    if lines.len() < 4 {
        return Err(MarksError::InvalidFormat(
            "Insufficient lines: expected header, dates, max points and at least one student row."
                .to_string(),
        ));
    }
    let first = lines[0].trim();
    if first.starts_with('*') || first.starts_with("\"*") {
        return Err(MarksError::InvalidFormat(
            "This file looks like a Google Meet report, not a marks sheet.".to_string(),
        ));
    }
    let header = split_record(lines[0]);
    let has_surname = header.iter().any(|c| {
        let h = c.trim().to_lowercase();
        SURNAME_HEADERS.contains(&h.as_str())
    });
    if !has_surname {
        return Err(MarksError::InvalidFormat(
            "Missing \"Surname\" or \"Прізвище\" column.".to_string(),
        ));
    }
    Ok(())
}

/// Parses a grade sheet: row 1 names the columns, row 2 carries per-task
/// dates, row 3 per-task max points, and every following row is one student.
/// Mark cells are sparse; an empty cell records nothing.
pub fn parse_marks_csv(filename: &str, text: &str) -> Result<MarksSheet, MarksError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    validate_marks_csv(text)?;
    let lines = non_empty_lines(text);

    let header = split_record(lines[0]);
    let dates = split_record(lines[1]);
    let max_points = split_record(lines[2]);

    // Unnamed trailing columns are not tasks; remembering each task's source
    // column keeps mark cells aligned when one is skipped.
    let mut tasks: Vec<SheetTask> = Vec::new();
    let mut task_columns: Vec<usize> = Vec::new();
    for i in TASKS_FROM..header.len() {
        let name = header[i].trim();
        if name.is_empty() {
            continue;
        }
        task_columns.push(i);
        tasks.push(SheetTask {
            name: name.to_string(),
            date: dates.get(i).map(|s| s.trim()).unwrap_or("").to_string(),
            max_points: parse_points(max_points.get(i)),
        });
    }

    let mut students: Vec<SheetStudent> = Vec::new();
    for line in &lines[3..] {
        let cells = split_record(line);
        if cells.len() < 3 {
            continue;
        }
        let surname = cells[0].trim();
        let first_name = cells[1].trim();
        if surname.is_empty() || first_name.is_empty() {
            continue;
        }
        let email = cells[2].trim().to_string();
        let name = format!("{} {}", surname, first_name);

        let mut marks: Vec<SheetMark> = Vec::new();
        for (task_index, &col) in task_columns.iter().enumerate() {
            let cell = cells.get(col).map(|s| s.trim()).unwrap_or("");
            if cell.is_empty() {
                continue;
            }
            marks.push(SheetMark {
                task_index,
                score: cell.parse::<f64>().unwrap_or(0.0),
                synced: false,
            });
        }

        students.push(SheetStudent { name, email, marks });
    }

    Ok(MarksSheet {
        group_name: group_name_from_filename(filename),
        tasks,
        students,
    })
}

/// Text before the first underscore names the group the sheet belongs to.
pub fn group_name_from_filename(filename: &str) -> String {
    match filename.split_once('_') {
        Some((before, _)) => before.to_string(),
        None => "Unknown Group".to_string(),
    }
}

fn parse_points(cell: Option<&String>) -> f64 {
    cell.map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(0.0)
}

fn non_empty_lines(text: &str) -> Vec<&str> {
    text.lines().filter(|l| !l.trim().is_empty()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHEET: &str = "\
Surname,First name,Email,Lab 1,Lab 2,Exam
Date,,,2024-02-01,2024-02-15,2024-03-01
Max Points,,,10,12,40
Franko,Ivan,ivan@example.com,8,,35
Ukrainka,Lesia,,10,11,
Shevchenko,Taras,taras@example.com,,,
,,,5,5,5
";

    #[test]
    fn parses_tasks_and_sparse_marks() {
        let sheet = parse_marks_csv("KN-21_marks_2024.csv", SHEET).expect("parse");
        assert_eq!(sheet.group_name, "KN-21");
        assert_eq!(sheet.tasks.len(), 3);
        assert_eq!(sheet.tasks[0].name, "Lab 1");
        assert_eq!(sheet.tasks[0].date, "2024-02-01");
        assert_eq!(sheet.tasks[2].max_points, 40.0);

        assert_eq!(sheet.students.len(), 3);
        let ivan = &sheet.students[0];
        assert_eq!(ivan.name, "Franko Ivan");
        assert_eq!(ivan.email, "ivan@example.com");
        assert_eq!(
            ivan.marks,
            vec![
                SheetMark { task_index: 0, score: 8.0, synced: false },
                SheetMark { task_index: 2, score: 35.0, synced: false },
            ]
        );

        // Blank email is still a student; empty mark cells record nothing.
        assert_eq!(sheet.students[1].name, "Ukrainka Lesia");
        assert_eq!(sheet.students[1].email, "");
        assert_eq!(sheet.students[1].marks.len(), 2);
        assert!(sheet.students[2].marks.is_empty());
    }

    #[test]
    fn blank_max_points_degrade_to_zero() {
        let text = "\
Surname,First name,Email,Lab 1,Lab 2
Date,,,2024-02-01,
Max Points,,,,n/a
Franko,Ivan,,1,2
";
        let sheet = parse_marks_csv("x_y.csv", text).expect("parse");
        assert_eq!(sheet.tasks[0].max_points, 0.0);
        assert_eq!(sheet.tasks[1].max_points, 0.0);
    }

    #[test]
    fn unnamed_columns_do_not_shift_marks() {
        let text = "\
Surname,First name,Email,Lab 1,,Lab 2
Date,,,2024-02-01,,2024-02-15
Max Points,,,10,,12
Franko,Ivan,,8,99,11
";
        let sheet = parse_marks_csv("x_y.csv", text).expect("parse");
        assert_eq!(sheet.tasks.len(), 2);
        assert_eq!(
            sheet.students[0].marks,
            vec![
                SheetMark { task_index: 0, score: 8.0, synced: false },
                SheetMark { task_index: 1, score: 11.0, synced: false },
            ]
        );
    }

    #[test]
    fn filename_without_underscore_is_unknown_group() {
        assert_eq!(group_name_from_filename("marks.csv"), "Unknown Group");
        assert_eq!(group_name_from_filename("KN-21_sheet.csv"), "KN-21");
    }

    #[test]
    fn ukrainian_surname_header_is_accepted() {
        let text = "\
Прізвище,Ім'я,Пошта,Лаб 1
Date,,,2024-02-01
Бали,,,10
Франко,Іван,,9
";
        let sheet = parse_marks_csv("КН-21_бали.csv", text).expect("parse");
        assert_eq!(sheet.students[0].name, "Франко Іван");
        assert_eq!(sheet.students[0].marks[0].score, 9.0);
    }

    #[test]
    fn meet_report_is_rejected() {
        let text = "\
* Meeting code: abc-defg-hij
Full Name,Duration
Ivan Franko,00:30:00
Lesia Ukrainka,00:20:00
";
        let err = validate_marks_csv(text).expect_err("must fail");
        match err {
            MarksError::InvalidFormat(msg) => {
                assert!(msg.contains("looks like a Google Meet report"), "{}", msg)
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn short_files_are_rejected() {
        let err = validate_marks_csv("Surname,First name,Email\nDate\n").expect_err("must fail");
        match err {
            MarksError::InvalidFormat(msg) => {
                assert!(msg.contains("Insufficient lines"), "{}", msg)
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn missing_surname_column_is_rejected() {
        let text = "Name,Email,Lab 1\nDate,,\nMax Points,,\nIvan,,5\n";
        let err = validate_marks_csv(text).expect_err("must fail");
        match err {
            MarksError::InvalidFormat(msg) => {
                assert_eq!(msg, "Missing \"Surname\" or \"Прізвище\" column.")
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
