pub mod system_details_repo;

pub use system_details_repo::SystemDetailsRepo;
