pub mod classification;
pub mod comment;
pub mod fields;
pub mod ticket;
