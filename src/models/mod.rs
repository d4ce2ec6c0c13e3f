pub mod challenge;
pub mod feedback;
pub mod geometry;
pub mod map;
pub mod submission;
