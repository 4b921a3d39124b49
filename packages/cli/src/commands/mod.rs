pub mod check;
pub mod new;
pub mod replay;

pub use check::{check, CheckArgs};
pub use new::{new, NewArgs};
pub use replay::{replay, ReplayArgs};
