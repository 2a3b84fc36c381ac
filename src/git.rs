mod id;
mod repo;
mod rev;
mod signature;

pub use id::CommitId;
pub use repo::{CommitWalk, Repo};
pub use rev::{EditRef, RefKind, Rev};
pub use signature::Signature;
