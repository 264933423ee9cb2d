pub mod campaign;
pub mod component;
pub mod contact;
pub mod send_log;
pub mod template;
