//! Domain model for the twelve flat CRUD entities.
//!
//! # Responsibility
//! - Define the `Entity` contract shared by repositories, search and services.
//! - Generate each record shape from one field list so the entities cannot
//!   drift apart in audit fields, JSON naming or merge semantics.
//!
//! # Invariants
//! - `id` is absent before create and assigned exactly once by the service.
//! - Every non-id attribute is optional; `None` means "not provided".
//! - Audit fields are caller-populated and never computed here.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;

/// Shared contract for every persisted, indexed record.
pub trait Entity:
    Serialize + DeserializeOwned + Debug + Clone + Default + PartialEq + Send + Sync + 'static
{
    /// Singular name used in alerts, errors and logs (e.g. `hcCredential`).
    const ENTITY_NAME: &'static str;
    /// Collection key in the store and URL segment under `/api/`.
    const COLLECTION: &'static str;

    fn id(&self) -> Option<&str>;

    fn set_id(&mut self, id: String);

    /// Copies every provided (`Some`) attribute of `patch` onto `self`.
    ///
    /// `id` is never merged; the caller decides which record is patched.
    fn merge(&mut self, patch: Self);
}

/// Declares one entity struct plus its `Entity` impl.
///
/// Every declared field becomes `Option<T>`; `id` and the four audit fields
/// are appended automatically.
macro_rules! entity {
    (
        $(#[$meta:meta])*
        $name:ident ($entity_name:literal, $collection:literal) {
            $( $(#[$field_meta:meta])* $field:ident : $ty:ty ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, ::serde::Serialize, ::serde::Deserialize)]
        #[serde(rename_all = "camelCase", default)]
        pub struct $name {
            pub id: Option<String>,
            $( $(#[$field_meta])* pub $field: Option<$ty>, )*
            pub created_by: Option<String>,
            pub created_date: Option<::chrono::DateTime<::chrono::Utc>>,
            pub modified_by: Option<String>,
            pub modified_date: Option<::chrono::DateTime<::chrono::Utc>>,
        }

        impl $crate::model::Entity for $name {
            const ENTITY_NAME: &'static str = $entity_name;
            const COLLECTION: &'static str = $collection;

            fn id(&self) -> Option<&str> {
                self.id.as_deref()
            }

            fn set_id(&mut self, id: String) {
                self.id = Some(id);
            }

            fn merge(&mut self, patch: Self) {
                $(
                    if patch.$field.is_some() {
                        self.$field = patch.$field;
                    }
                )*
                if patch.created_by.is_some() {
                    self.created_by = patch.created_by;
                }
                if patch.created_date.is_some() {
                    self.created_date = patch.created_date;
                }
                if patch.modified_by.is_some() {
                    self.modified_by = patch.modified_by;
                }
                if patch.modified_date.is_some() {
                    self.modified_date = patch.modified_date;
                }
            }
        }
    };
}

pub mod care;
pub mod metadata;
pub mod person;
pub mod team;

pub use care::{Condition, Medication, Report, Stat};
pub use metadata::Metadata;
pub use person::{Address, HcCredential, HcPayOption, Profile};
pub use team::{Membership, Task, Team};
