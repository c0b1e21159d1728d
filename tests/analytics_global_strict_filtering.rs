mod test_support;

use serde_json::json;
use test_support::{request_ok, spawn_sidecar, temp_dir, write_file};

const SESSION_1: &str = "\
* Meeting code: abc-defg-hij
* Created on 2024-03-01 10:00:00
Full Name,Time in call (minutes)
Ivan Franko,30
Hryhorii Skovoroda,60
Some Stranger,20
";

const SESSION_2: &str = "\
* Meeting code: abc-defg-hij
* Created on 2024-03-08 10:00:00
Full Name,Time in call (minutes)
Lesia Ukrainka,40
Hryhorii Skovoroda,60
";

#[test]
fn group_of_four_with_two_teachers_gives_fifty_percent() {
    let workspace = temp_dir("meetbook-global-strict");
    let fixtures = temp_dir("meetbook-global-strict-files");
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );

    // Roster names use the normalized "Last First" ordering the parser keys on.
    let roster = [
        ("Franko Ivan", "student"),
        ("Ukrainka Lesia", "student"),
        ("Skovoroda Hryhorii", "teacher"),
        ("Drahomanov Mykhailo", "teacher"),
    ];
    for (i, (name, role)) in roster.iter().enumerate() {
        let _ = request_ok(
            &mut stdin,
            &mut reader,
            &format!("m{}", i),
            "members.upsert",
            json!({ "name": name, "groupName": "KN-21", "role": role }),
        );
    }
    let group = request_ok(
        &mut stdin,
        &mut reader,
        "g1",
        "groups.set",
        json!({ "meetId": "abc-defg-hij", "name": "KN-21" }),
    );
    assert_eq!(
        group.get("group").and_then(|g| g.get("course")).and_then(|v| v.as_i64()),
        Some(2)
    );

    for (i, text) in [SESSION_1, SESSION_2].iter().enumerate() {
        let path = write_file(&fixtures, &format!("s{}.csv", i), text);
        let _ = request_ok(
            &mut stdin,
            &mut reader,
            &format!("r{}", i),
            "reports.importCsv",
            json!({ "path": path.to_string_lossy() }),
        );
    }

    let stats = request_ok(&mut stdin, &mut reader, "a1", "analytics.global", json!({}));
    let meetings = stats
        .get("meetings")
        .and_then(|v| v.as_array())
        .cloned()
        .unwrap_or_default();
    assert_eq!(meetings.len(), 1);
    let m = &meetings[0];
    assert_eq!(m.get("meetId").and_then(|v| v.as_str()), Some("abc-defg-hij"));
    assert_eq!(m.get("groupName").and_then(|v| v.as_str()), Some("KN-21"));
    assert_eq!(m.get("totalSessions").and_then(|v| v.as_u64()), Some(2));
    assert_eq!(m.get("lastActive").and_then(|v| v.as_str()), Some("2024-03-08"));
    // Teachers are ignored and the stranger fails strict group filtering:
    // one counted student per session over a 2-session, 2-student denominator.
    assert_eq!(
        m.get("totalParticipantAppearances").and_then(|v| v.as_u64()),
        Some(2)
    );
    assert_eq!(
        m.get("uniqueParticipantsCount").and_then(|v| v.as_u64()),
        Some(2)
    );
    assert_eq!(
        m.get("activeParticipantsCount").and_then(|v| v.as_u64()),
        Some(2)
    );
    assert_eq!(
        m.get("attendancePercentage").and_then(|v| v.as_i64()),
        Some(50)
    );
    // Longest counted stays are 30 and 40 minutes.
    assert_eq!(m.get("avgDuration").and_then(|v| v.as_i64()), Some(35));

    let _ = std::fs::remove_dir_all(workspace);
    let _ = std::fs::remove_dir_all(fixtures);
}
