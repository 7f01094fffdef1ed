mod register;
pub use register::{register, register_once};
