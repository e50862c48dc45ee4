mod covid;
mod health;

pub use covid::{covid_data, update_covid_cases};
pub use health::health_check;
