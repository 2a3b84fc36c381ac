pub mod amend;
pub mod log;
pub mod pick;
pub mod redo;
pub mod squash;
pub mod undo;
