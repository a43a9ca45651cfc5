pub(crate) mod idna;
pub(crate) mod percent_encode;
