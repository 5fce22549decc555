//! This file serves as the root for all SeaORM entity modules.
//! We define the data models for the student registry here: operator
//! accounts, the managed student records, the audit trail of mutations,
//! and server-side login sessions.

pub mod audit_log;
pub mod session;
pub mod student;
pub mod user;

pub mod prelude {
    //! A prelude module for easy importing of all entities.
    pub use super::audit_log::Entity as AuditLog;
    pub use super::session::Entity as Session;
    pub use super::student::Entity as Student;
    pub use super::user::Entity as User;
}
