// Purpose: the playable instrument and the message stream that drives it
// This layer sits above graph nodes and owns the single voice

#[cfg(feature = "rtrb")]
pub mod controller;
pub mod message;
pub mod mono;
pub mod voice;
