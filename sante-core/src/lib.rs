//! Domain layer of the Dawini patient, clinic, doctor and admin portals.
//!
//! Pure types and policies: roles, records, clinic normalization, theming,
//! the route table and its guard. No I/O happens in this crate.

pub mod chat;
pub mod clinic;
pub mod error;
pub mod geo;
pub mod guard;
pub mod id;
pub mod listing;
pub mod navigation;
pub mod quota;
pub mod records;
pub mod role;
pub mod routes;
pub mod theme;
pub mod user;

pub use chat::{ChatMessage, ChatRole, SseDecoder, StreamEvent, Transcript};
pub use clinic::{usable_clinic_id, Clinic, ClinicDraft, ClinicOrigin, ClinicPayload};
pub use error::{CoreError, Result};
pub use geo::{rank_clinics, top_doctors, GeoPoint, RankedClinic};
pub use guard::{resolve, tenancy_redirect, Decision, NavigationState};
pub use id::RecordId;
pub use listing::unwrap_list;
pub use navigation::{sidebar_links, NavLink};
pub use quota::{PlanTier, StorageQuota};
pub use role::Role;
pub use routes::{paths, RouteEntry, RouteGroup, RouteTable, View};
pub use theme::{Branding, Theme};
pub use user::{AuthResponse, Credentials, Registration, TokenRefresh, User};
