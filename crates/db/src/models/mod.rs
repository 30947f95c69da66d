pub mod system_details;
