pub mod csv_parser;
pub mod datetime;
pub mod validation;
