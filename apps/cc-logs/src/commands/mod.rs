pub mod replay;
pub mod tail;
