//! Agent certification state
//!
//! Backend truth ([`CertificationRecord`]) and client display state
//! ([`TrainingDisplay`]) are stored side by side and only combined when a
//! view is derived.

pub mod store;
pub mod types;

pub use store::{CertificationMap, CertificationStore, SharedCertificationStore};
pub use types::{
    BadgeState, CertificationDetail, CertificationRecord, TrainingAction, TrainingDisplay,
};
