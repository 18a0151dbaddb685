//! Integration tests exercising the SDK end to end over an in-memory
//! validator channel.

pub mod processor_lifecycle;
