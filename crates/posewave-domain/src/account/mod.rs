mod aggregate;
mod service;
mod value_objects;

pub use aggregate::Account;
pub use service::AccountService;
pub use value_objects::Credentials;
