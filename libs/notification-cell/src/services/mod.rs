pub mod contact;
pub mod dispatcher;
