pub mod export;
pub mod service;
pub mod staff;
