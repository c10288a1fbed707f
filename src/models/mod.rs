pub mod department;
pub mod hired_employee;
pub mod job;
pub mod metrics;
