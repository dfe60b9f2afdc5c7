pub mod dates;
pub mod factors;
pub mod lexical;
pub mod names;
pub mod proximity;
pub mod status;
pub mod topics;
