mod requests;
mod responses;

pub use requests::{Coordinates, CoordinatesQuery};
pub use responses::QueryResult;
