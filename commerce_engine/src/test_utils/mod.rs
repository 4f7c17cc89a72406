pub mod fakes;
pub mod prepare_env;
