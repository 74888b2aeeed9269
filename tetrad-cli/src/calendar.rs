use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tetrad_core::Task;
use tetrad_core::time::local_to_utc;

pub struct CalendarEvent {
    pub start_utc: DateTime<Utc>,
    pub end_utc: DateTime<Utc>,
    pub summary: String,
    pub description: String,
}

/// Convert scheduled tasks (local wall-clock times in `tz`) into events.
///
/// Unscheduled tasks are skipped.
pub fn tasks_to_events(tasks: &[Task], tz: Tz) -> Result<Vec<CalendarEvent>> {
    let mut events = Vec::new();

    for t in tasks {
        let (Some(start), Some(end)) = (t.scheduled_start, t.scheduled_end) else {
            continue;
        };
        let cfg = t.domain.config();

        events.push(CalendarEvent {
            start_utc: local_to_utc(start, tz).with_context(|| format!("task {}", t.id))?,
            end_utc: local_to_utc(end, tz).with_context(|| format!("task {}", t.id))?,
            summary: format!("[{}] {}", cfg.label, t.title),
            description: format!(
                "TaskId: {}\nDomain: {}\nPriority: {}\nMinutes: {}\n",
                t.id,
                t.domain,
                t.priority.value(),
                t.estimated_minutes
            ),
        });
    }

    Ok(events)
}

/// Emit a minimal ICS calendar containing VEVENT blocks.
///
/// DTSTART/DTEND are UTC.
pub fn events_to_ics(events: &[CalendarEvent]) -> String {
    let mut s = String::new();
    s.push_str("BEGIN:VCALENDAR\nVERSION:2.0\nPRODID:-//Tetrad//EN\n");

    for (i, e) in events.iter().enumerate() {
        let dtstart = e.start_utc.format("%Y%m%dT%H%M%SZ");
        let dtend = e.end_utc.format("%Y%m%dT%H%M%SZ");

        s.push_str("BEGIN:VEVENT\n");
        s.push_str(&format!("UID:tetrad-{}@tetrad\n", i));
        s.push_str(&format!("DTSTART:{}\n", dtstart));
        s.push_str(&format!("DTEND:{}\n", dtend));
        s.push_str(&format!("SUMMARY:{}\n", escape_ics(&e.summary)));
        s.push_str(&format!("DESCRIPTION:{}\n", escape_ics(&e.description)));
        s.push_str("END:VEVENT\n");
    }

    s.push_str("END:VCALENDAR\n");
    s
}

fn escape_ics(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('\n', "\\n")
        .replace(',', "\\,")
        .replace(';', "\\;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tetrad_core::{Domain, Priority};

    #[test]
    fn test_scheduled_tasks_become_utc_events() {
        let tz: Tz = "Asia/Shanghai".parse().unwrap();
        let mut t = Task::new("t1", "写论文, 第二章", Domain::Academic, Priority::DEFAULT, 60).unwrap();
        t.schedule_at(NaiveDate::from_ymd_opt(2026, 3, 2).unwrap().and_hms_opt(8, 0, 0).unwrap());
        let unscheduled = Task::new("t2", "跑步", Domain::Growth, Priority::DEFAULT, 40).unwrap();

        let events = tasks_to_events(&[t, unscheduled], tz).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].start_utc.to_rfc3339(), "2026-03-02T00:00:00+00:00");

        let ics = events_to_ics(&events);
        assert!(ics.contains("DTSTART:20260302T000000Z"));
        assert!(ics.contains("DTEND:20260302T010000Z"));
        assert!(ics.contains("SUMMARY:[学术] 写论文\\, 第二章"));
        assert!(!ics.contains("COLOR:"));
        assert!(ics.ends_with("END:VCALENDAR\n"));
    }
}
