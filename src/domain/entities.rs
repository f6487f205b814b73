pub mod email;
pub mod sheet_row;
pub mod submission;
