//! Person-scoped records: where someone lives, who they are, and how they
//! are credentialed or billed.

use chrono::NaiveDate;

entity! {
    /// Postal address owned by a user, optionally geocoded.
    Address("address", "addresses") {
        user_id: String,
        address_line1: String,
        address_line2: String,
        city: String,
        state: String,
        postal_code: String,
        country: String,
        latitude: f64,
        longitude: f64,
    }
}

entity! {
    /// Demographic profile attached to a user account.
    Profile("profile", "profiles") {
        user_id: String,
        first_name: String,
        last_name: String,
        date_of_birth: NaiveDate,
        gender: String,
        phone: String,
        email: String,
    }
}

entity! {
    /// Professional healthcare credential (license, certification).
    HcCredential("hcCredential", "hc-credentials") {
        user_id: String,
        credential_type: String,
        issuer: String,
        license_number: String,
        issued_date: NaiveDate,
        expiration_date: NaiveDate,
    }
}

entity! {
    /// Healthcare payment option such as an insurance plan.
    HcPayOption("hcPayOption", "hc-pay-options") {
        patient_id: String,
        payer_name: String,
        plan_name: String,
        member_id: String,
        group_number: String,
        is_primary: bool,
    }
}
