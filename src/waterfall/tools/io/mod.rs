pub mod csv_read;
pub mod detect;
pub mod excel_read;
