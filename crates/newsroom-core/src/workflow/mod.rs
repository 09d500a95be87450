//! Editorial operations, generic over any [`NewsroomStore`].
//!
//! Each operation loads the entities it needs, applies a state transition
//! from the domain types, and writes the result back. State checks happen
//! after lookup and before any write, so a failed operation persists nothing.
//! Authorization is the caller's concern: these functions assume the caller
//! has already been admitted by the appropriate access policy.
//!
//! [`NewsroomStore`]: crate::store::NewsroomStore

pub mod articles;
pub mod comments;
pub mod subjects;
