use chrono::NaiveDate;
use meeting_attendance::analytics::{
    DayCell, compute_date_summaries, compute_employee_summaries, compute_global_kpis,
    compute_monthly_matrix, dedupe_records, percentage,
};
use meeting_attendance::model::attendance::{AttendanceRecord, AttendanceStatus::*};
use meeting_attendance::model::employee::Employee;

fn d(month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, month, day).unwrap()
}

fn roster(n: usize) -> Vec<Employee> {
    (1..=n)
        .map(|i| Employee::new(format!("e{i}"), format!("Employee {i}"), "Staff"))
        .collect()
}

fn mixed_records() -> Vec<AttendanceRecord> {
    vec![
        AttendanceRecord::new(d(1, 5), "e1", Present),
        AttendanceRecord::new(d(1, 5), "e2", Late),
        AttendanceRecord::new(d(1, 5), "e3", Absent),
        AttendanceRecord::new(d(1, 12), "e1", Late),
        AttendanceRecord::new(d(1, 12), "e3", Late),
        AttendanceRecord::new(d(2, 2), "e2", Present),
        AttendanceRecord::new(d(2, 2), "e4", Absent),
    ]
}

#[test]
fn empty_inputs_yield_zeroes() {
    let kpis = compute_global_kpis(&[], 0);
    assert_eq!(kpis.days_tracked, 0);
    assert_eq!(kpis.present, 0);
    assert_eq!(kpis.absent, 0);
    assert_eq!(kpis.late, 0);
    assert_eq!(kpis.attendance_rate, 0.0);
    assert_eq!(kpis.late_rate, 0.0);

    assert!(compute_employee_summaries(&[], &[]).is_empty());
    assert!(compute_date_summaries(&[], 0).is_empty());

    let matrix = compute_monthly_matrix(2026, 1, &[], &[], &[]).unwrap();
    assert!(matrix.rows.is_empty());
    assert_eq!(matrix.kpis.overall_attendance_rate, 0.0);
    assert_eq!(matrix.kpis.overall_late_rate, 0.0);
}

#[test]
fn late_never_exceeds_present() {
    let records = mixed_records();

    let kpis = compute_global_kpis(&records, 4);
    assert!(kpis.late <= kpis.present);
    // every late record is also in the present tally
    assert_eq!(kpis.present, 5);
    assert_eq!(kpis.late, 3);

    for s in compute_employee_summaries(&records, &roster(4)) {
        assert!(s.late <= s.present, "{}", s.employee.id);
    }
    for s in compute_date_summaries(&records, 4) {
        assert!(s.late <= s.present, "{}", s.date);
    }

    let matrix =
        compute_monthly_matrix(2026, 1, &records, &[d(1, 5), d(1, 12)], &roster(4)).unwrap();
    for row in &matrix.rows {
        assert!(row.late <= row.present);
    }
    assert!(matrix.kpis.total_late <= matrix.kpis.total_present);
}

#[test]
fn roster_completeness() {
    let records = mixed_records();

    for n in [0, 1, 3, 6] {
        assert_eq!(compute_employee_summaries(&records, &roster(n)).len(), n);
        let matrix = compute_monthly_matrix(2026, 1, &records, &[d(1, 5)], &roster(n)).unwrap();
        assert_eq!(matrix.rows.len(), n);
    }
}

#[test]
fn monthly_absence_inference() {
    let meetings = [d(3, 2), d(3, 9), d(3, 16)];
    let records = vec![
        AttendanceRecord::new(d(3, 2), "e1", Present),
        AttendanceRecord::new(d(3, 9), "e1", Late),
    ];

    let matrix = compute_monthly_matrix(2026, 3, &records, &meetings, &roster(1)).unwrap();
    let row = &matrix.rows[0];

    assert_eq!(row.present, 2);
    assert_eq!(row.absent, 1);
    assert_eq!(row.late, 1);
    assert_eq!(row.attendance_rate, 66.67);
    assert_eq!(row.cells[15], DayCell::Marked { status: Absent, inferred: true });
}

#[test]
fn inference_is_per_employee() {
    let meetings = [d(3, 2), d(3, 9)];
    let records = vec![
        AttendanceRecord::new(d(3, 2), "e1", Present),
        AttendanceRecord::new(d(3, 9), "e2", Present),
    ];

    let matrix = compute_monthly_matrix(2026, 3, &records, &meetings, &roster(3)).unwrap();

    assert_eq!(matrix.rows[0].cells[8], DayCell::Marked { status: Absent, inferred: true });
    assert_eq!(matrix.rows[1].cells[1], DayCell::Marked { status: Absent, inferred: true });
    assert_eq!(matrix.rows[2].absent, 2);
    assert_eq!(matrix.kpis.total_present, 2);
    assert_eq!(matrix.kpis.total_absent, 4);
    assert_eq!(matrix.kpis.overall_attendance_rate, 33.33);
}

#[test]
fn rates_round_to_two_decimals() {
    assert_eq!(percentage(1, 3), 33.33);

    let records = vec![AttendanceRecord::new(d(1, 5), "e1", Present)];
    let kpis = compute_global_kpis(&records, 3);
    assert_eq!(kpis.possible_attendance, 3);
    assert_eq!(kpis.attendance_rate, 33.33);
}

#[test]
fn aggregation_is_idempotent() {
    let records = mixed_records();
    let people = roster(4);
    let meetings = [d(1, 5), d(1, 12), d(1, 19)];

    assert_eq!(compute_global_kpis(&records, 4), compute_global_kpis(&records, 4));
    assert_eq!(
        compute_employee_summaries(&records, &people),
        compute_employee_summaries(&records, &people)
    );
    assert_eq!(compute_date_summaries(&records, 4), compute_date_summaries(&records, 4));

    let first = compute_monthly_matrix(2026, 1, &records, &meetings, &people).unwrap();
    let second = compute_monthly_matrix(2026, 1, &records, &meetings, &people).unwrap();
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn global_kpi_scenario() {
    let records = vec![
        AttendanceRecord::new(d(1, 1), "e1", Present),
        AttendanceRecord::new(d(1, 1), "e2", Absent),
        AttendanceRecord::new(d(1, 2), "e1", Late),
        AttendanceRecord::new(d(1, 2), "e2", Present),
    ];

    let kpis = compute_global_kpis(&records, 2);

    assert_eq!(kpis.days_tracked, 2);
    assert_eq!(kpis.present, 3);
    assert_eq!(kpis.absent, 1);
    assert_eq!(kpis.late, 1);
    assert_eq!(kpis.attendance_rate, 75.0);
    assert_eq!(kpis.late_rate, 33.33);
}

#[test]
fn order_of_records_does_not_matter() {
    let records = mixed_records();
    let mut reversed = records.clone();
    reversed.reverse();

    assert_eq!(compute_global_kpis(&records, 4), compute_global_kpis(&reversed, 4));
    assert_eq!(compute_date_summaries(&records, 4), compute_date_summaries(&reversed, 4));
    assert_eq!(
        compute_employee_summaries(&records, &roster(4)),
        compute_employee_summaries(&reversed, &roster(4))
    );
}

#[test]
fn dedupe_before_aggregating_keeps_last_seen() {
    let records = vec![
        AttendanceRecord::new(d(1, 5), "e1", Absent),
        AttendanceRecord::new(d(1, 5), "e1", Present),
    ];

    let kpis = compute_global_kpis(&dedupe_records(&records), 1);

    assert_eq!(kpis.present, 1);
    assert_eq!(kpis.absent, 0);
    assert_eq!(kpis.attendance_rate, 100.0);
}

#[test]
fn output_serializes_rates_as_numbers() {
    let records = vec![
        AttendanceRecord::new(d(1, 1), "e1", Present),
        AttendanceRecord::new(d(1, 1), "e2", Late),
    ];

    let json = serde_json::to_value(compute_global_kpis(&records, 3)).unwrap();
    assert_eq!(json["attendance_rate"], 66.67);
    assert_eq!(json["late_rate"], 50.0);

    let json = serde_json::to_value(compute_date_summaries(&records, 3)).unwrap();
    assert_eq!(json[0]["date"], "2026-01-01");
    assert_eq!(json[0]["present"], 2);

    let matrix = compute_monthly_matrix(2026, 1, &records, &[d(1, 1)], &roster(1)).unwrap();
    let json = serde_json::to_value(&matrix).unwrap();
    assert_eq!(json["rows"][0]["cells"][0]["kind"], "marked");
    assert_eq!(json["rows"][0]["cells"][0]["status"], "present");
    assert_eq!(json["rows"][0]["cells"][1]["kind"], "not_tracked");
}
