pub mod user;
pub mod blacklisted_token;
