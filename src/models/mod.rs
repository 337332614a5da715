pub mod appointment;
pub mod doctor;
pub mod enums;
pub mod inventory;
pub mod session;
pub mod transcript;
pub mod user;

pub use appointment::*;
pub use doctor::*;
pub use inventory::*;
pub use session::*;
pub use transcript::*;
pub use user::*;
