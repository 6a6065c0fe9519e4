pub mod artist;
pub mod error;
pub mod input;
pub mod search;
pub mod show;
pub mod venue;
