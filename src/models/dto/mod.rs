pub mod model_output;
pub mod request;
pub mod response;
