pub mod errors;
pub mod services;
pub mod shared;
pub mod timing;
pub mod utils;
