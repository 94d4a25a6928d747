mod repository;
pub use repository::Repository as ConnectionRepository;
