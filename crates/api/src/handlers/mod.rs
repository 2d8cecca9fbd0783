pub mod member;
pub mod queue;
pub mod room;
pub mod track;
