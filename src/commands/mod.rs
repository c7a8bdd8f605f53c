pub mod embed;
pub mod search;
pub mod status;
pub mod viz;
