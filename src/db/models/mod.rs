pub mod category;
pub mod session;

pub use category::{Category, CategoryInput};
pub use session::{Session, SessionEdit};
