pub mod convert;
pub mod health;
pub mod login;
