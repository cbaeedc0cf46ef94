pub mod contact;
pub mod double_number;
pub mod health;
