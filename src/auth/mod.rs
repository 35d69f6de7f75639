pub mod code_input;
pub mod countdown;
pub mod phone;
pub mod session;
