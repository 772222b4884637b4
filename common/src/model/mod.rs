pub mod form;
pub mod record;
