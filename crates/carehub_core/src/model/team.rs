//! Care teams, who belongs to them and what they work on.

use chrono::NaiveDate;

entity! {
    Team("team", "teams") {
        name: String,
        description: String,
        owner_id: String,
    }
}

entity! {
    /// Links a user to a team with a role.
    Membership("membership", "memberships") {
        user_id: String,
        team_id: String,
        role: String,
        joined_date: NaiveDate,
    }
}

entity! {
    /// Work item for a team, optionally about a patient.
    Task("task", "tasks") {
        patient_id: String,
        team_id: String,
        assignee_id: String,
        title: String,
        description: String,
        status: String,
        due_date: NaiveDate,
    }
}
