pub mod env_util;
