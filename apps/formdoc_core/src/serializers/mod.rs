pub mod api;
pub mod contact;
pub mod double_number;
