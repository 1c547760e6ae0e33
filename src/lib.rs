pub mod blobs;
pub mod events;
pub mod lambda_structure;
pub mod result;
