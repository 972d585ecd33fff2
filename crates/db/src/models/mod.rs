pub mod access_request;
pub mod health_record;
pub mod owner;
pub mod user;
