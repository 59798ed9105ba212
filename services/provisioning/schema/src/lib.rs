//! sea-orm entities for the tables read or written by the provisioning service.

pub mod academic_years;
pub mod classes;
pub mod parents;
pub mod student_parents;
pub mod students;
pub mod subjects;
pub mod teacher_assignments;
pub mod teachers;
pub mod user_roles;
