pub mod dashboard;
pub mod department;
pub mod faculty;
pub mod program;
pub mod proposal;
pub mod revision;
pub mod role;
pub mod user;
