pub mod history;
pub mod market;
pub mod prediction;
pub mod sentiment;
pub mod signals;
pub mod technical;

pub use history::*;
pub use market::*;
pub use prediction::*;
pub use sentiment::*;
pub use signals::*;
pub use technical::*;
