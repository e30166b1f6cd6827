//! Errors are `anyhow` errors throughout. Failures the API reports are not errors; they arrive
//! as `api::Reply::Failure` and are shown to the user as notices.

pub type Error = anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;
