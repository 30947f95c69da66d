pub mod bos;
pub mod system_details;
