pub mod drawing_import_service;
pub mod library_import_service;
pub mod snapshot_service;

pub use drawing_import_service::*;
pub use library_import_service::*;
pub use snapshot_service::*;
