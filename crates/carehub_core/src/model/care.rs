//! Clinical records kept per patient.

use chrono::NaiveDate;

entity! {
    /// Diagnosed condition.
    Condition("condition", "conditions") {
        patient_id: String,
        name: String,
        code: String,
        severity: String,
        onset_date: NaiveDate,
        notes: String,
    }
}

entity! {
    /// Medication prescription with its dosing schedule.
    Medication("medication", "medications") {
        patient_id: String,
        name: String,
        dosage: String,
        frequency: String,
        route: String,
        start_date: NaiveDate,
        end_date: NaiveDate,
    }
}

entity! {
    Report("report", "reports") {
        patient_id: String,
        team_id: String,
        title: String,
        summary: String,
        report_date: NaiveDate,
    }
}

entity! {
    /// Single recorded measurement. `value` is kept verbatim as entered.
    Stat("stat", "stats") {
        patient_id: String,
        name: String,
        value: String,
        unit: String,
        recorded_date: NaiveDate,
    }
}
