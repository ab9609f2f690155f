pub mod body_map;
pub mod ids;
pub mod response;

pub use body_map::*;
pub use ids::*;
pub use response::*;
