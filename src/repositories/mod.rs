pub(crate) mod courses;
pub(crate) mod exams;
pub(crate) mod questions;
pub(crate) mod users;
