mod cycle;
mod domains;
mod fetcher;
mod utils;

pub use cycle::*;
pub use domains::*;
pub use fetcher::*;
pub use utils::*;
